//! Reduction of raw report rows into totals and breakdowns.
//!
//! Each reducer reads rows shaped by one of the column layouts below; the
//! query layer builds its requests from the same constants so the positional
//! indices line up.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::analytics::{
    CategorySummary, ChannelMetrics, DetailedBreakdown, LeadEvent, MetricRow, MetricTotals,
    PageMetrics, SourceMedium, SourceMetrics, WeeklyTotals,
};
use crate::category::{categorize, Category};
use crate::event::{classify, LeadKind};
use crate::report::{normalize_date, ReportRow};

pub const DAILY_DIMENSIONS: [&str; 1] = ["date"];
pub const DAILY_METRICS: [&str; 8] = [
    "activeUsers",
    "newUsers",
    "sessions",
    "screenPageViews",
    "bounceRate",
    "engagementRate",
    "conversions",
    "averageSessionDuration",
];

pub const SOURCE_DIMENSIONS: [&str; 2] = ["sessionSource", "sessionMedium"];
pub const SOURCE_EVENT_DIMENSIONS: [&str; 3] = ["sessionSource", "sessionMedium", "eventName"];
pub const CHANNEL_DIMENSIONS: [&str; 1] = ["sessionDefaultChannelGroup"];
pub const CHANNEL_EVENT_DIMENSIONS: [&str; 2] = ["sessionDefaultChannelGroup", "eventName"];
pub const TRAFFIC_METRICS: [&str; 3] = ["activeUsers", "sessions", "conversions"];

pub const EVENT_DIMENSIONS: [&str; 1] = ["eventName"];
pub const EVENT_METRICS: [&str; 1] = ["eventCount"];

pub const PAGE_DIMENSIONS: [&str; 1] = ["pagePath"];
pub const PAGE_METRICS: [&str; 4] = [
    "screenPageViews",
    "activeUsers",
    "averageSessionDuration",
    "bounceRate",
];

pub const SEARCH_CONSOLE_METRICS: [&str; 2] =
    ["organicGoogleSearchClicks", "organicGoogleSearchImpressions"];

#[derive(Default)]
struct DayAccumulator {
    rows: usize,
    users: i64,
    new_users: i64,
    sessions: i64,
    pageviews: i64,
    conversions: i64,
    bounce_rate: f64,
    engagement_rate: f64,
    avg_session_duration: f64,
}

/// One [`MetricRow`] per date key, ordered by date. Rows are expected in the
/// [`DAILY_DIMENSIONS`]/[`DAILY_METRICS`] layout.
pub fn aggregate_daily(rows: &[ReportRow]) -> Vec<MetricRow> {
    let mut days: BTreeMap<String, DayAccumulator> = BTreeMap::new();
    for row in rows {
        let acc = days.entry(normalize_date(row.dimension(0))).or_default();
        acc.rows += 1;
        acc.users += row.metric_i64(0);
        acc.new_users += row.metric_i64(1);
        acc.sessions += row.metric_i64(2);
        acc.pageviews += row.metric_i64(3);
        acc.bounce_rate += row.metric_pct(4);
        acc.engagement_rate += row.metric_pct(5);
        acc.conversions += row.metric_i64(6);
        acc.avg_session_duration += row.metric_f64(7);
    }

    days.into_iter()
        .map(|(date, acc)| {
            let n = acc.rows.max(1) as f64;
            MetricRow {
                date,
                users: acc.users,
                new_users: acc.new_users,
                sessions: acc.sessions,
                pageviews: acc.pageviews,
                bounce_rate: acc.bounce_rate / n,
                engagement_rate: acc.engagement_rate / n,
                conversions: acc.conversions,
                avg_session_duration: acc.avg_session_duration / n,
            }
        })
        .collect()
}

/// Sum the counts; average the rates per day without weighting by traffic.
pub fn totals(daily: &[MetricRow]) -> MetricTotals {
    let mut totals = MetricTotals {
        days: daily.len(),
        ..Default::default()
    };
    for day in daily {
        totals.users += day.users;
        totals.new_users += day.new_users;
        totals.sessions += day.sessions;
        totals.pageviews += day.pageviews;
        totals.conversions += day.conversions;
        totals.bounce_rate += day.bounce_rate;
        totals.engagement_rate += day.engagement_rate;
        totals.avg_session_duration += day.avg_session_duration;
    }
    if !daily.is_empty() {
        let n = daily.len() as f64;
        totals.bounce_rate /= n;
        totals.engagement_rate /= n;
        totals.avg_session_duration /= n;
    }
    totals
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadCounts {
    pub form_submissions: i64,
    pub phone_calls: i64,
}

impl LeadCounts {
    pub fn total(&self) -> i64 {
        self.form_submissions + self.phone_calls
    }

    fn add(&mut self, kind: LeadKind, count: i64) {
        match kind {
            LeadKind::Form => self.form_submissions += count,
            LeadKind::Phone => self.phone_calls += count,
        }
    }
}

/// Sum event counts into form/phone buckets per key. `event_index` is the
/// dimension holding the event name; the count is metric 0.
pub fn lead_counts_by<K, F>(rows: &[ReportRow], event_index: usize, key: F) -> HashMap<K, LeadCounts>
where
    K: Eq + Hash,
    F: Fn(&ReportRow) -> K,
{
    let mut counts: HashMap<K, LeadCounts> = HashMap::new();
    for row in rows {
        let Some(kind) = classify(row.dimension(event_index)).kind() else {
            continue;
        };
        counts.entry(key(row)).or_default().add(kind, row.metric_i64(0));
    }
    counts
}

/// Lead totals over rows in the [`EVENT_DIMENSIONS`] layout.
pub fn lead_totals(rows: &[ReportRow]) -> LeadCounts {
    lead_counts_by(rows, 0, |_| ())
        .remove(&())
        .unwrap_or_default()
}

/// Breakdown-path lead rate: conversions per session.
pub fn session_lead_rate(conversions: i64, sessions: i64) -> f64 {
    if sessions > 0 {
        conversions as f64 / sessions as f64 * 100.0
    } else {
        0.0
    }
}

/// Weekly-totals lead rate: conversions per search click.
pub fn click_lead_rate(conversions: i64, clicks: i64) -> f64 {
    if clicks > 0 {
        conversions as f64 / clicks as f64 * 100.0
    } else {
        0.0
    }
}

pub fn click_through_rate(clicks: i64, impressions: i64) -> f64 {
    if impressions > 0 {
        clicks as f64 / impressions as f64 * 100.0
    } else {
        0.0
    }
}

fn source_key(row: &ReportRow) -> SourceMedium {
    SourceMedium {
        source: row.dimension(0).to_string(),
        medium: row.dimension(1).to_string(),
    }
}

/// Join traffic rows ([`SOURCE_DIMENSIONS`]/[`TRAFFIC_METRICS`]) with event
/// rows ([`SOURCE_EVENT_DIMENSIONS`]/[`EVENT_METRICS`]) on source/medium.
///
/// Every traffic row yields exactly one entry; output is ordered by sessions
/// descending.
pub fn aggregate_sources(traffic: &[ReportRow], events: &[ReportRow]) -> Vec<SourceMetrics> {
    let leads = lead_counts_by(events, 2, source_key);
    let mut sources: Vec<SourceMetrics> = traffic
        .iter()
        .map(|row| {
            let key = source_key(row);
            let lead = leads.get(&key).copied().unwrap_or_default();
            let sessions = row.metric_i64(1);
            let conversions = row.metric_i64(2);
            SourceMetrics {
                category: categorize(&key.source, &key.medium),
                source: key.source,
                medium: key.medium,
                users: row.metric_i64(0),
                sessions,
                conversions,
                form_submissions: lead.form_submissions,
                phone_calls: lead.phone_calls,
                click_to_lead_rate: session_lead_rate(conversions, sessions),
            }
        })
        .collect();
    sources.sort_by(|a, b| b.sessions.cmp(&a.sessions));
    sources
}

/// Channel-group counterpart of [`aggregate_sources`].
pub fn aggregate_channels(traffic: &[ReportRow], events: &[ReportRow]) -> Vec<ChannelMetrics> {
    let leads = lead_counts_by(events, 1, |row| row.dimension(0).to_string());
    let mut channels: Vec<ChannelMetrics> = traffic
        .iter()
        .map(|row| {
            let channel = row.dimension(0).to_string();
            let lead = leads.get(&channel).copied().unwrap_or_default();
            let sessions = row.metric_i64(1);
            let conversions = row.metric_i64(2);
            ChannelMetrics {
                channel,
                users: row.metric_i64(0),
                sessions,
                conversions,
                form_submissions: lead.form_submissions,
                phone_calls: lead.phone_calls,
                click_to_lead_rate: session_lead_rate(conversions, sessions),
            }
        })
        .collect();
    channels.sort_by(|a, b| b.sessions.cmp(&a.sessions));
    channels
}

/// Place each source in the sequence of its category.
pub fn breakdown(sources: Vec<SourceMetrics>) -> DetailedBreakdown {
    let mut breakdown = DetailedBreakdown::default();
    for source in sources {
        breakdown.get_mut(source.category).push(source);
    }
    for category in Category::ALL {
        breakdown
            .get_mut(category)
            .sort_by(|a, b| b.sessions.cmp(&a.sessions));
    }
    breakdown
}

pub fn category_summary(breakdown: &DetailedBreakdown) -> Vec<CategorySummary> {
    Category::ALL
        .iter()
        .map(|category| {
            let sources = breakdown.get(*category);
            CategorySummary {
                category: *category,
                sources: sources.len(),
                users: sources.iter().map(|s| s.users).sum(),
                sessions: sources.iter().map(|s| s.sessions).sum(),
                conversions: sources.iter().map(|s| s.conversions).sum(),
                leads: sources
                    .iter()
                    .map(|s| s.form_submissions + s.phone_calls)
                    .sum(),
            }
        })
        .collect()
}

pub fn pages(rows: &[ReportRow]) -> Vec<PageMetrics> {
    rows.iter()
        .map(|row| PageMetrics {
            path: row.dimension(0).to_string(),
            pageviews: row.metric_i64(0),
            users: row.metric_i64(1),
            avg_session_duration: row.metric_f64(2),
            bounce_rate: row.metric_pct(3),
        })
        .collect()
}

/// Lead-classified events from [`EVENT_DIMENSIONS`] rows, largest first.
/// Events that are neither form nor phone are dropped.
pub fn lead_events(rows: &[ReportRow]) -> Vec<LeadEvent> {
    let mut counts: BTreeMap<String, (LeadKind, i64)> = BTreeMap::new();
    for row in rows {
        let name = row.dimension(0);
        if let Some(kind) = classify(name).kind() {
            counts.entry(name.to_string()).or_insert((kind, 0)).1 += row.metric_i64(0);
        }
    }
    let mut events: Vec<LeadEvent> = counts
        .into_iter()
        .map(|(event_name, (kind, count))| LeadEvent {
            event_name,
            kind,
            count,
        })
        .collect();
    events.sort_by(|a, b| b.count.cmp(&a.count));
    events
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchConsoleTotals {
    pub clicks: i64,
    pub impressions: i64,
}

/// Sum rows in the [`SEARCH_CONSOLE_METRICS`] layout.
pub fn search_console_totals(rows: &[ReportRow]) -> SearchConsoleTotals {
    rows.iter().fold(SearchConsoleTotals::default(), |acc, row| {
        SearchConsoleTotals {
            clicks: acc.clicks + row.metric_i64(0),
            impressions: acc.impressions + row.metric_i64(1),
        }
    })
}

/// Period totals for the weekly report. `search` is `None` when the search
/// console data was unavailable; its fields then stay zero.
pub fn weekly_totals(
    daily: &[MetricRow],
    leads: LeadCounts,
    search: Option<SearchConsoleTotals>,
) -> WeeklyTotals {
    let base = totals(daily);
    let search_console_available = search.is_some();
    let search = search.unwrap_or_default();
    WeeklyTotals {
        users: base.users,
        new_users: base.new_users,
        sessions: base.sessions,
        pageviews: base.pageviews,
        conversions: base.conversions,
        form_submissions: leads.form_submissions,
        phone_calls: leads.phone_calls,
        bounce_rate: base.bounce_rate,
        engagement_rate: base.engagement_rate,
        avg_session_duration: base.avg_session_duration,
        clicks: search.clicks,
        impressions: search.impressions,
        ctr: click_through_rate(search.clicks, search.impressions),
        click_to_lead_rate: click_lead_rate(base.conversions, search.clicks),
        search_console_available,
    }
}
