use chrono::{DateTime, NaiveDate, Utc};

/// # Summary
/// Clock abstraction so the report date and provider date ranges never read
/// the system clock directly.
pub trait TimeProvider: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// # Summary
/// Wall clock used by the binary.
pub struct SystemClock;

impl TimeProvider for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// Clock pinned to one instant, for tests and reproducible report dates.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl TimeProvider for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
