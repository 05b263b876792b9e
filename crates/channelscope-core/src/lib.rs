//! Source categorization and metrics aggregation for the Channelscope dashboard.
//!
//! Everything in this crate is pure: rows come in from a [`report::ReportGateway`]
//! implementation and leave as the shapes in [`analytics`].

pub mod aggregate;
pub mod analytics;
pub mod anomaly;
pub mod category;
pub mod compare;
pub mod config;
pub mod error;
pub mod event;
pub mod report;
