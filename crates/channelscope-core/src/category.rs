//! Marketing channel categorization for (source, medium) pairs.

use serde::{Deserialize, Serialize};

/// AI assistants that send referral traffic. Matched on the label before the
/// first `.`, so `chatgpt.com` matches any source containing `chatgpt`.
pub const LLM_SOURCES: &[&str] = &[
    "chatgpt.com",
    "openai.com",
    "perplexity.ai",
    "claude.ai",
    "gemini.google.com",
    "copilot.microsoft.com",
    "deepseek.com",
    "phind.com",
    "mistral.ai",
];

/// Business listing and directory sites. Same matching as [`LLM_SOURCES`].
pub const LISTING_SOURCES: &[&str] = &[
    "yelp.com",
    "yellowpages.com",
    "angi.com",
    "homeadvisor.com",
    "thumbtack.com",
    "bbb.org",
    "houzz.com",
    "nextdoor.com",
    "tripadvisor.com",
    "mapquest.com",
    "manta.com",
    "superpages.com",
    "porch.com",
];

pub const SEARCH_ENGINES: &[&str] = &[
    "google",
    "bing",
    "yahoo",
    "duckduckgo",
    "baidu",
    "yandex",
    "ecosia",
    "brave",
    "aol",
    "ask",
];

pub const SOCIAL_PLATFORMS: &[&str] = &[
    "facebook",
    "instagram",
    "linkedin",
    "lnkd.in",
    "twitter",
    "tiktok",
    "pinterest",
    "youtube",
    "reddit",
    "snapchat",
    "threads",
];

const PAID_MEDIUMS: &[&str] = &["cpc", "ppc", "paid"];
const DIRECT_MEDIUMS: &[&str] = &["(none)", "direct"];

/// The fixed set of channel categories a source/medium pair can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "organicSearch")]
    OrganicSearch,
    #[serde(rename = "paidSearch")]
    PaidSearch,
    #[serde(rename = "llmAI")]
    LlmAi,
    #[serde(rename = "listings")]
    Listings,
    #[serde(rename = "social")]
    Social,
    #[serde(rename = "referral")]
    Referral,
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    /// All categories in breakdown order.
    pub const ALL: [Category; 8] = [
        Category::OrganicSearch,
        Category::PaidSearch,
        Category::LlmAi,
        Category::Listings,
        Category::Social,
        Category::Referral,
        Category::Direct,
        Category::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::OrganicSearch => "organicSearch",
            Category::PaidSearch => "paidSearch",
            Category::LlmAi => "llmAI",
            Category::Listings => "listings",
            Category::Social => "social",
            Category::Referral => "referral",
            Category::Direct => "direct",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn domain_label(entry: &str) -> &str {
    entry.split('.').next().unwrap_or(entry)
}

fn matches_domain_list(source: &str, list: &[&str]) -> bool {
    list.iter().any(|entry| source.contains(domain_label(entry)))
}

/// Map a session source/medium pair to its channel category.
///
/// Rules are evaluated in order and the first match wins; the ordering is
/// load-bearing (an AI assistant referral is `llmAI`, not `referral`).
pub fn categorize(source: &str, medium: &str) -> Category {
    let source = source.to_lowercase();
    let medium = medium.to_lowercase();

    if matches_domain_list(&source, LLM_SOURCES) {
        return Category::LlmAi;
    }
    if matches_domain_list(&source, LISTING_SOURCES) {
        return Category::Listings;
    }
    if PAID_MEDIUMS.contains(&medium.as_str()) || medium.contains("paid") {
        return Category::PaidSearch;
    }
    if medium == "organic" && SEARCH_ENGINES.iter().any(|engine| source.contains(engine)) {
        return Category::OrganicSearch;
    }
    if medium.contains("social") || SOCIAL_PLATFORMS.iter().any(|p| source.contains(p)) {
        return Category::Social;
    }
    if medium == "referral" {
        return Category::Referral;
    }
    if source == "(direct)" || DIRECT_MEDIUMS.contains(&medium.as_str()) {
        return Category::Direct;
    }
    Category::Other
}
