use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date {0:?} (expected YYYY-MM-DD, today, yesterday or NdaysAgo)")]
    InvalidDate(String),

    #[error("end_date must be on or after start_date")]
    InvertedRange,

    #[error("{0:?} is not an ISO date; relative dates cannot be shifted")]
    RelativeDate(String),

    #[error("shifting {0} leaves the supported years 0001..9999")]
    OutOfRange(String),

    #[error("unknown metric {0:?}")]
    UnknownMetric(String),
}
