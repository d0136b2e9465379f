//! Delivery adapters for the run report.

pub mod console;
pub mod email;
