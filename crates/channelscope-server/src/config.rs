/// Re-export `Config` from `channelscope-core` for use within this crate.
///
/// Environment parsing lives in the core crate so the gateway can build its
/// client from the same struct.
pub use channelscope_core::config::Config;
