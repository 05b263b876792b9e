use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use channelscope_core::analytics::{AnalyticsBackend, DateRange};
use channelscope_core::anomaly::DailyMetric;
use channelscope_core::category::Category;
use channelscope_core::event::LeadKind;
use channelscope_core::report::{ReportGateway, ReportRequest, ReportRow};
use channelscope_ga4::queries;
use channelscope_ga4::Ga4Analytics;

type Handler = dyn Fn(&ReportRequest) -> anyhow::Result<Vec<ReportRow>> + Send + Sync;

/// Gateway answering from a closure and recording every request it saw.
struct FakeGateway {
    handler: Box<Handler>,
    calls: Mutex<Vec<ReportRequest>>,
}

impl FakeGateway {
    fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ReportRequest) -> anyhow::Result<Vec<ReportRow>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<ReportRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportGateway for FakeGateway {
    async fn run_report(&self, request: &ReportRequest) -> anyhow::Result<Vec<ReportRow>> {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

fn dims(request: &ReportRequest) -> Vec<&str> {
    request.dimensions.iter().map(String::as_str).collect()
}

fn is_search_console(request: &ReportRequest) -> bool {
    request
        .metrics
        .iter()
        .any(|m| m == "organicGoogleSearchClicks")
}

fn daily(date: &str, sessions: i64, conversions: i64) -> ReportRow {
    ReportRow::new(
        [date.to_string()],
        [
            "10".to_string(),
            "4".to_string(),
            sessions.to_string(),
            "30".to_string(),
            "0.5".to_string(),
            "0.75".to_string(),
            conversions.to_string(),
            "60".to_string(),
        ],
    )
}

fn event(name: &str, count: i64) -> ReportRow {
    ReportRow::new([name.to_string()], [count.to_string()])
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Week of 2026-02-09 has 100 sessions, the week before 80, last year 50.
fn weekly_handler(
    search_ok: bool,
) -> impl Fn(&ReportRequest) -> anyhow::Result<Vec<ReportRow>> + Send + Sync + 'static {
    move |request: &ReportRequest| {
        let sessions = match request.date_range.start_date.as_str() {
            "2026-02-09" => 100,
            "2026-02-02" => 80,
            "2025-02-09" => 50,
            other => anyhow::bail!("unexpected range start {other}"),
        };
        if is_search_console(request) {
            if !search_ok {
                anyhow::bail!("GA4 runReport error 400 Bad Request: search console not linked");
            }
            return Ok(vec![ReportRow::new(
                Vec::<String>::new(),
                [(sessions * 2).to_string(), (sessions * 20).to_string()],
            )]);
        }
        match dims(request).as_slice() {
            ["date"] => Ok(vec![daily("20260209", sessions, 5)]),
            ["eventName"] => Ok(vec![
                event("form_submit", 3),
                event("phone_click", 2),
                event("page_view", 400),
            ]),
            other => anyhow::bail!("unexpected dimensions {other:?}"),
        }
    }
}

#[tokio::test]
async fn overview_sums_days_and_averages_rates() {
    let gateway = FakeGateway::new(|request| match dims(request).as_slice() {
        ["date"] => Ok(vec![daily("20260211", 20, 1), daily("20260210", 10, 2)]),
        other => anyhow::bail!("unexpected dimensions {other:?}"),
    });
    let analytics = Ga4Analytics::new(gateway.clone());

    let range = DateRange::parse("2026-02-10", "2026-02-11").unwrap();
    let overview = analytics.get_overview(&range).await.unwrap();

    assert_eq!(overview.daily.len(), 2);
    assert_eq!(overview.daily[0].date, "2026-02-10");
    assert_eq!(overview.totals.sessions, 30);
    assert_eq!(overview.totals.conversions, 3);
    assert_eq!(overview.totals.bounce_rate, 50.0);
    assert_eq!(overview.totals.days, 2);
    assert_eq!(gateway.calls()[0].date_range, range);
}

#[tokio::test]
async fn sources_pass_limit_and_join_lead_events() {
    let gateway = FakeGateway::new(|request| match dims(request).as_slice() {
        ["sessionSource", "sessionMedium"] => Ok(vec![
            ReportRow::new(["google", "organic"], ["40", "60", "6"]),
            ReportRow::new(["chatgpt.com", "referral"], ["5", "8", "2"]),
        ]),
        ["sessionSource", "sessionMedium", "eventName"] => Ok(vec![
            ReportRow::new(["google", "organic", "form_submit"], ["4"]),
            ReportRow::new(["google", "organic", "click_to_call"], ["1"]),
            ReportRow::new(["chatgpt.com", "referral", "scroll"], ["9"]),
        ]),
        other => anyhow::bail!("unexpected dimensions {other:?}"),
    });
    let analytics = Ga4Analytics::new(gateway.clone());

    let sources = analytics
        .get_traffic_sources(&DateRange::last_days(7), 25)
        .await
        .unwrap();

    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].source, "google");
    assert_eq!(sources[0].category, Category::OrganicSearch);
    assert_eq!(sources[0].form_submissions, 4);
    assert_eq!(sources[0].phone_calls, 1);
    assert_eq!(sources[0].click_to_lead_rate, 10.0);
    assert_eq!(sources[1].category, Category::LlmAi);
    assert_eq!(sources[1].form_submissions + sources[1].phone_calls, 0);

    let traffic_call = gateway
        .calls()
        .into_iter()
        .find(|c| c.dimensions.len() == 2)
        .unwrap();
    assert_eq!(traffic_call.limit, Some(25));
}

#[tokio::test]
async fn breakdown_defaults_to_last_complete_week_and_keeps_every_source() {
    let gateway = FakeGateway::new(|request| match dims(request).as_slice() {
        ["sessionSource", "sessionMedium"] => Ok(vec![
            ReportRow::new(["google", "organic"], ["40", "60", "6"]),
            ReportRow::new(["google", "cpc"], ["10", "12", "1"]),
            ReportRow::new(["chatgpt.com", "referral"], ["5", "8", "2"]),
            ReportRow::new(["yelp.com", "referral"], ["3", "4", "1"]),
            ReportRow::new(["facebook.com", "referral"], ["2", "3", "0"]),
            ReportRow::new(["partner.example", "referral"], ["1", "2", "0"]),
            ReportRow::new(["(direct)", "(none)"], ["20", "25", "3"]),
            ReportRow::new(["newsletter", "email"], ["1", "1", "0"]),
        ]),
        ["sessionSource", "sessionMedium", "eventName"] => Ok(vec![]),
        other => anyhow::bail!("unexpected dimensions {other:?}"),
    });

    // Wednesday 2026-02-18.
    let report = queries::breakdown::get_breakdown_inner(gateway.as_ref(), None, date(2026, 2, 18))
        .await
        .unwrap();

    assert_eq!(report.date_range.start_date, "2026-02-09");
    assert_eq!(report.date_range.end_date, "2026-02-15");
    assert_eq!(report.breakdown.len(), 8);
    for category in Category::ALL {
        assert_eq!(report.breakdown.get(category).len(), 1, "{category}");
    }
    assert_eq!(report.summary.len(), 8);
    assert!(gateway.calls().iter().all(|c| c.limit.is_none()));
}

#[tokio::test]
async fn weekly_report_compares_previous_week_and_last_year() {
    let gateway = FakeGateway::new(weekly_handler(true));

    let report = queries::weekly::get_weekly_report_inner(gateway.as_ref(), None, date(2026, 2, 18))
        .await
        .unwrap();

    assert_eq!(report.current.date_range.start_date, "2026-02-09");
    assert_eq!(report.previous.date_range.start_date, "2026-02-02");
    assert_eq!(report.previous.date_range.end_date, "2026-02-08");
    assert_eq!(report.last_year.date_range.start_date, "2025-02-09");
    assert_eq!(report.last_year.date_range.end_date, "2025-02-15");

    let current = &report.current.totals;
    assert_eq!(current.sessions, 100);
    assert_eq!(current.form_submissions, 3);
    assert_eq!(current.phone_calls, 2);
    assert_eq!(current.clicks, 200);
    assert_eq!(current.impressions, 2000);
    assert_eq!(current.ctr, 10.0);
    assert!(current.search_console_available);

    assert_eq!(report.week_over_week["sessions"], 25.0);
    assert_eq!(report.year_over_year["sessions"], 100.0);
    assert_eq!(report.week_over_week["conversions"], 0.0);
}

#[tokio::test]
async fn search_console_failure_degrades_to_zeros() {
    let gateway = FakeGateway::new(weekly_handler(false));

    let report = queries::weekly::get_weekly_report_inner(gateway.as_ref(), None, date(2026, 2, 18))
        .await
        .unwrap();

    let current = &report.current.totals;
    assert_eq!(current.clicks, 0);
    assert_eq!(current.impressions, 0);
    assert_eq!(current.ctr, 0.0);
    assert_eq!(current.click_to_lead_rate, 0.0);
    assert!(!current.search_console_available);
    assert_eq!(current.sessions, 100);
    assert_eq!(report.week_over_week["clicks"], 0.0);
}

#[tokio::test]
async fn required_query_failure_fails_the_report() {
    let gateway = FakeGateway::new(|request| match dims(request).as_slice() {
        ["date"] => anyhow::bail!("GA4 runReport error 403 Forbidden: permission denied"),
        _ => Ok(vec![]),
    });
    let analytics = Ga4Analytics::new(gateway);

    let range = DateRange::parse("2026-02-09", "2026-02-15").unwrap();
    let err = analytics.get_weekly_report(Some(&range)).await.unwrap_err();
    assert!(format!("{err:#}").contains("permission denied"));
}

#[tokio::test]
async fn relative_weekly_range_is_rejected() {
    let gateway = FakeGateway::new(|_| Ok(vec![]));
    let analytics = Ga4Analytics::new(gateway.clone());

    let result = analytics
        .get_weekly_report(Some(&DateRange::last_days(7)))
        .await;
    assert!(result.is_err());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn compare_periods_reports_changes_between_explicit_ranges() {
    let gateway = FakeGateway::new(weekly_handler(true));
    let analytics = Ga4Analytics::new(gateway);

    let current = DateRange::parse("2026-02-09", "2026-02-15").unwrap();
    let previous = DateRange::parse("2026-02-02", "2026-02-08").unwrap();
    let comparison = analytics.compare_periods(&current, &previous).await.unwrap();

    assert_eq!(comparison.current_range, current);
    assert_eq!(comparison.result.current.sessions, 100);
    assert_eq!(comparison.result.previous.sessions, 80);
    assert_eq!(comparison.result.changes["sessions"], 25.0);
    assert_eq!(comparison.result.changes["form_submissions"], 0.0);
}

#[tokio::test]
async fn anomalies_use_the_lookback_window() {
    let gateway = FakeGateway::new(|request| match dims(request).as_slice() {
        ["date"] => Ok(vec![
            daily("20260201", 10, 0),
            daily("20260202", 10, 0),
            daily("20260203", 10, 0),
            daily("20260204", 10, 0),
            daily("20260205", 10, 0),
            daily("20260206", 50, 0),
        ]),
        other => anyhow::bail!("unexpected dimensions {other:?}"),
    });
    let analytics = Ga4Analytics::new(gateway.clone());

    let result = analytics
        .detect_anomalies(DailyMetric::Sessions, 2.0)
        .await
        .unwrap();

    assert!(result.has_anomaly);
    assert_eq!(result.anomalies.len(), 1);
    assert_eq!(result.anomalies[0].date, "2026-02-06");

    let call = &gateway.calls()[0];
    assert_eq!(call.date_range.start_date, "30daysAgo");
    assert_eq!(call.date_range.end_date, "yesterday");
}

#[tokio::test]
async fn lead_events_keep_only_classified_events() {
    let gateway = FakeGateway::new(|request| match dims(request).as_slice() {
        ["eventName"] => Ok(vec![
            event("page_view", 900),
            event("form_submit", 7),
            event("click_to_call", 12),
        ]),
        other => anyhow::bail!("unexpected dimensions {other:?}"),
    });
    let analytics = Ga4Analytics::new(gateway);

    let events = analytics
        .get_lead_events(&DateRange::last_days(28))
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_name, "click_to_call");
    assert_eq!(events[0].kind, LeadKind::Phone);
    assert_eq!(events[1].kind, LeadKind::Form);
}
