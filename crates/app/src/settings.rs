use config::{Config, Environment, File};
use dipwatch_core::config::{AppConfig, ConfigError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "DIPWATCH";
const CONFIG_PATH_VAR: &str = "DIPWATCH_CONFIG";
const DEFAULT_CONFIG_NAME: &str = "dipwatch";

// Conventional variable names mapped onto their configuration keys
const LEGACY_VARS: [(&str, &str); 8] = [
    ("TWELVE_DATA_API_KEY", "keys.twelve_data"),
    ("FRED_API_KEY", "keys.fred"),
    ("SMTP_HOST", "email.host"),
    ("SMTP_PORT", "email.port"),
    ("SMTP_USER", "email.user"),
    ("SMTP_PASS", "email.pass"),
    ("SMTP_FROM", "email.from"),
    ("ALERT_RECIPIENT", "email.to"),
];

/// # Summary
/// Loads the configuration from the process environment.
///
/// # Logic
/// Reads `DIPWATCH_CONFIG` for an explicit file path and hands every variable
/// to [`load_from`].
pub fn load() -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = std::env::vars().collect();
    let path = vars.get(CONFIG_PATH_VAR).map(PathBuf::from);
    load_from(path.as_deref(), vars)
}

/// # Summary
/// Builds `AppConfig` from layered sources.
///
/// # Logic
/// Later layers win:
/// 1. `AppConfig::default()`.
/// 2. The TOML file at `path` (required), or `dipwatch.toml` in the working directory (optional).
/// 3. `DIPWATCH__SECTION__KEY` variables; `DIPWATCH__SYMBOLS` is a comma-separated list.
/// 4. The conventional variables (`TWELVE_DATA_API_KEY`, `SMTP_HOST`, ...).
///
/// # Arguments
/// * `path`: explicit configuration file.
/// * `vars`: environment snapshot.
pub fn load_from(
    path: Option<&Path>,
    vars: HashMap<String, String>,
) -> Result<AppConfig, ConfigError> {
    let load_err = |e: config::ConfigError| ConfigError::Load(e.to_string());

    let defaults = Config::try_from(&AppConfig::default()).map_err(load_err)?;
    let mut builder = Config::builder().add_source(defaults);

    builder = match path {
        Some(p) => builder.add_source(File::from(p).required(true)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
    };

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("symbols")
            .try_parsing(true)
            .source(Some(vars.clone())),
    );

    for (var, key) in LEGACY_VARS {
        let value = vars
            .get(var)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        builder = builder.set_override_option(key, value).map_err(load_err)?;
    }

    builder
        .build()
        .map_err(load_err)?
        .try_deserialize()
        .map_err(load_err)
}
