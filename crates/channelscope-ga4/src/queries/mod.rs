//! One module per read. Each `*_inner` function issues its reports through a
//! [`ReportGateway`] and folds the rows with the core aggregators.

pub mod anomalies;
pub mod breakdown;
pub mod channels;
pub mod leads;
pub mod overview;
pub mod pages;
pub mod sources;
pub mod weekly;

use anyhow::{Context, Result};

use channelscope_core::report::{ReportGateway, ReportRequest, ReportRow};

/// Run one report, tagging failures with the report name.
pub(crate) async fn run(
    gateway: &dyn ReportGateway,
    request: &ReportRequest,
    report: &'static str,
) -> Result<Vec<ReportRow>> {
    gateway
        .run_report(request)
        .await
        .with_context(|| format!("{report} report failed for {}", request.date_range))
}
