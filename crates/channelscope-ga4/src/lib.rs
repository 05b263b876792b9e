//! GA4 Data API backend for Channelscope.
//!
//! [`Ga4Client`] speaks the `runReport` wire format; [`Ga4Analytics`] runs the
//! report fan-out for each read and hands the rows to the core aggregators.

pub mod analytics_impl;
pub mod backend;
pub mod client;
pub mod queries;

pub use backend::Ga4Analytics;
pub use client::Ga4Client;
