//! Dip-detection evaluation: RSI, the two-stage dip gate, and the run report.
//!
//! Everything here is pure and synchronous; fetching, throttling and delivery
//! live in `dipwatch-runner`.

pub mod assess;
pub mod classifier;
pub mod format;
pub mod indicator;
pub mod report;
