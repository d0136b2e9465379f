use crate::signal::entity::DipThresholds;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

// Two price requests per symbol stay under the free tier's 8 requests per minute
const FREE_TIER_THROTTLE_SECS: u64 = 15;

/// Configuration problems; all of them abort the run before any symbol is fetched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingKey(&'static str),
    #[error("Invalid setting: {0}")]
    Invalid(String),
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Global application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub symbols: Vec<String>,
    pub keys: ApiKeys,
    pub thresholds: DipThresholds,
    pub scan: ScanConfig,
    pub retry: RetryConfig,
    pub email: EmailConfig,
    pub log: LogConfig,
}

/// Provider credentials; both are required before a run starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub twelve_data: Option<String>,
    pub fred: Option<String>,
}

/// Validated provider credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderKeys {
    pub twelve_data: String,
    pub fred: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Pause between two symbols, respects the price API rate limit
    pub throttle_secs: u64,
    /// Stop starting new symbols after this long
    pub run_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// SMTP settings; every field is optional so partial environments still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Complete SMTP settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for the daily rolling log file; console only when unset
    pub dir: Option<String>,
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: ["SPY", "VOO", "VTI", "SMH", "QQQM", "VOOG", "SPMO"]
                .into_iter()
                .map(String::from)
                .collect(),
            keys: ApiKeys::default(),
            thresholds: DipThresholds::default(),
            scan: ScanConfig::default(),
            retry: RetryConfig::default(),
            email: EmailConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            throttle_secs: 15,
            run_timeout_secs: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            filter: "info".to_string(),
        }
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl AppConfig {
    /// # Summary
    /// Returns both provider keys or the first one that is missing.
    ///
    /// # Logic
    /// Blank strings count as missing.
    pub fn provider_keys(&self) -> Result<ProviderKeys, ConfigError> {
        let twelve_data =
            present(&self.keys.twelve_data).ok_or(ConfigError::MissingKey("TWELVE_DATA_API_KEY"))?;
        let fred = present(&self.keys.fred).ok_or(ConfigError::MissingKey("FRED_API_KEY"))?;
        Ok(ProviderKeys { twelve_data, fred })
    }

    /// # Summary
    /// Startup check run before any network traffic.
    ///
    /// # Logic
    /// 1. Both provider keys must be present.
    /// 2. At least one non-blank symbol.
    /// 3. Thresholds must be within 0..=100.
    /// 4. The throttle must be at least one second; anything under the free-tier
    ///    pace is accepted with a warning.
    ///
    /// # Returns
    /// The validated provider keys.
    pub fn validate(&self) -> Result<ProviderKeys, ConfigError> {
        let keys = self.provider_keys()?;

        if self.symbols().is_empty() {
            return Err(ConfigError::Invalid("symbol list is empty".to_string()));
        }

        let t = &self.thresholds;
        let hundred = Decimal::ONE_HUNDRED;
        for (name, value) in [
            ("short_drop_watch", t.short_drop_watch),
            ("short_indicator_confirm", t.short_indicator_confirm),
            ("long_drop_watch", t.long_drop_watch),
            ("long_indicator_confirm", t.long_indicator_confirm),
        ] {
            if value < Decimal::ZERO || value > hundred {
                return Err(ConfigError::Invalid(format!(
                    "thresholds.{} = {} is outside 0..=100",
                    name, value
                )));
            }
        }

        if self.scan.throttle_secs == 0 {
            return Err(ConfigError::Invalid(
                "scan.throttle_secs must be at least 1".to_string(),
            ));
        }
        if self.scan.throttle_secs < FREE_TIER_THROTTLE_SECS {
            warn!(
                throttle_secs = self.scan.throttle_secs,
                free_tier_secs = FREE_TIER_THROTTLE_SECS,
                "Throttle is below the free-tier pace, expect rate-limit skips"
            );
        }

        Ok(keys)
    }

    /// Trimmed, upper-cased, non-blank symbols in configured order.
    pub fn symbols(&self) -> Vec<String> {
        self.symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl EmailConfig {
    /// Complete SMTP settings, or `None` when any required field is absent.
    /// `from` falls back to `user`.
    pub fn smtp(&self) -> Option<SmtpSettings> {
        let user = present(&self.user)?;
        Some(SmtpSettings {
            host: present(&self.host)?,
            port: self.port?,
            from: present(&self.from).unwrap_or_else(|| user.clone()),
            pass: present(&self.pass)?,
            to: present(&self.to)?,
            user,
        })
    }

    /// Names of the environment variables still missing for email delivery.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if present(&self.host).is_none() {
            missing.push("SMTP_HOST");
        }
        if self.port.is_none() {
            missing.push("SMTP_PORT");
        }
        if present(&self.user).is_none() {
            missing.push("SMTP_USER");
        }
        if present(&self.pass).is_none() {
            missing.push("SMTP_PASS");
        }
        if present(&self.to).is_none() {
            missing.push("ALERT_RECIPIENT");
        }
        missing
    }
}
