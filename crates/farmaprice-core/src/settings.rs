use std::path::PathBuf;

use crate::error::ConfigError;

/// User agent reported to the target sites. Matches the headless Chrome
/// build the browser transport runs, so both transports present the same
/// identity.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Settings {
    pub stores_path: PathBuf,
    pub user_agent: String,
    /// Per-request transport timeout, seconds.
    pub request_timeout_secs: u64,
    /// Wall-clock deadline for one whole aggregate search, seconds.
    pub search_deadline_secs: u64,
    pub max_per_store: usize,
    pub max_concurrent_stores: usize,
    /// Fixed delay before the browser transport reads the DOM, giving
    /// client-rendered storefronts time to paint results, milliseconds.
    pub render_wait_ms: u64,
}

/// Load settings from environment variables, reading `.env` files first.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but invalid.
pub fn load_settings() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    load_settings_from_env()
}

/// Load settings from environment variables already in the process.
///
/// Unlike [`load_settings`], this does NOT load `.env` files; use it when
/// the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but invalid.
pub fn load_settings_from_env() -> Result<Settings, ConfigError> {
    build_settings(|key| std::env::var(key))
}

/// Build settings using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup, without any
/// `set_var`/`remove_var` juggling.
fn build_settings<F>(lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(value)
    };

    let stores_path = PathBuf::from(or_default("FARMAPRICE_STORES_PATH", "./config/stores.yaml"));
    let user_agent = or_default("FARMAPRICE_USER_AGENT", DEFAULT_USER_AGENT);
    let request_timeout_secs = parse_u64("FARMAPRICE_REQUEST_TIMEOUT_SECS", "10")?;
    let search_deadline_secs = parse_u64("FARMAPRICE_SEARCH_DEADLINE_SECS", "45")?;
    let max_per_store = parse_positive_usize("FARMAPRICE_MAX_PER_STORE", "6")?;
    let max_concurrent_stores = parse_positive_usize("FARMAPRICE_MAX_CONCURRENT_STORES", "8")?;
    let render_wait_ms = parse_u64("FARMAPRICE_RENDER_WAIT_MS", "10000")?;

    Ok(Settings {
        stores_path,
        user_agent,
        request_timeout_secs,
        search_deadline_secs,
        max_per_store,
        max_concurrent_stores,
        render_wait_ms,
    })
}
