//! Entities, error types and ports shared by every dipwatch crate.
//!
//! Adapters (`dipwatch-feed`, `dipwatch-notify`) implement the ports declared
//! here; the evaluation logic (`dipwatch-signal`) and the scan loop
//! (`dipwatch-runner`) only ever see the traits.

pub mod common;
pub mod config;
pub mod market;
pub mod notify;
pub mod signal;
pub mod tls;

#[cfg(feature = "test-utils")]
pub mod test_utils;
