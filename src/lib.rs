//! Decision-and-timing engine for a single boss fighting one tracked target.

pub mod combat;
pub mod content;
#[cfg(feature = "dev-tools")]
pub mod debug;
