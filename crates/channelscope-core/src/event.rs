use serde::{Deserialize, Serialize};

/// Event-name fragments that indicate a submitted lead form.
pub const FORM_EVENTS: &[&str] = &[
    "form_submit",
    "generate_lead",
    "contact_form",
    "form_submission",
    "submit_form",
    "lead_form",
];

/// Event-name fragments that indicate a phone call lead. Checked after
/// [`FORM_EVENTS`].
pub const PHONE_EVENTS: &[&str] = &[
    "phone_click",
    "click_to_call",
    "tel_click",
    "phone_call",
    "call_click",
    "phone",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Form,
    Phone,
}

/// Lead intent of a single event name. At most one flag is ever set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeadIntent {
    pub is_form: bool,
    pub is_phone: bool,
}

impl LeadIntent {
    pub fn kind(&self) -> Option<LeadKind> {
        if self.is_form {
            Some(LeadKind::Form)
        } else if self.is_phone {
            Some(LeadKind::Phone)
        } else {
            None
        }
    }
}

pub fn classify(event_name: &str) -> LeadIntent {
    let name = event_name.to_lowercase();
    if FORM_EVENTS.iter().any(|fragment| name.contains(fragment)) {
        return LeadIntent {
            is_form: true,
            is_phone: false,
        };
    }
    if PHONE_EVENTS.iter().any(|fragment| name.contains(fragment)) {
        return LeadIntent {
            is_form: false,
            is_phone: true,
        };
    }
    LeadIntent::default()
}
