//! The run loop: fetch both windows per symbol, assess, fold into a report,
//! deliver once.

pub mod retry;
pub mod scanner;
