use thiserror::Error;

/// # Summary
/// Market data errors: transport, upstream API, parsing and unusable series.
///
/// # Invariants
/// - Derives `Error` through `thiserror`.
/// - No variant is fatal to a run; the scanner turns each of them into a per-symbol skip.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Transport failure or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),
    /// The provider answered but reported an error (rate limit, bad key)
    #[error("Upstream error: {0}")]
    Upstream(String),
    /// Body did not match the expected shape, or a price was not a decimal
    #[error("Parse error: {0}")]
    Parse(String),
    /// The series has no samples
    #[error("Insufficient data")]
    InsufficientData,
    /// The series contains a value that cannot be a closing price
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl MarketError {
    /// # Summary
    /// Whether repeating the same request could plausibly succeed.
    ///
    /// # Returns
    /// `true` for `Network` and `Upstream`, `false` for data problems.
    pub fn is_transient(&self) -> bool {
        matches!(self, MarketError::Network(_) | MarketError::Upstream(_))
    }
}
