//! Configuration loader
//!
//! Builds the application configuration from layered sources.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment when one exists
//! 2. Starts from built-in defaults
//! 3. Overlays the first config file found by [`probe_config_paths`]
//! 4. Overlays any `GLYPHBRIDGE_*` environment variables
//! 5. Validates the result
//!
//! ## Environment Variables
//! - `GLYPHBRIDGE_MAX_RETRIES`: Retries after the first attempt
//! - `GLYPHBRIDGE_BASE_DELAY_MS`: First backoff delay in milliseconds
//! - `GLYPHBRIDGE_MAX_DELAY_MS`: Backoff ceiling in milliseconds
//! - `GLYPHBRIDGE_BACKOFF_MULTIPLIER`: Growth factor between delays
//! - `GLYPHBRIDGE_CLASSIFIER`: `always`, `never`, `unless_permanent`, `transient`, or `classified`
//! - `GLYPHBRIDGE_NOTIFY_ON_RETRY`: Whether retries raise a toast (true/false)
//! - `GLYPHBRIDGE_CIRCUIT_ENABLED`: Whether circuit breaking is on (true/false)
//! - `GLYPHBRIDGE_FAILURE_THRESHOLD`: Failures before a circuit opens
//! - `GLYPHBRIDGE_RESET_TIMEOUT_MS`: Open-state cooldown in milliseconds
//! - `GLYPHBRIDGE_HALF_OPEN_POLICY`: `reopen_at_threshold` or `reopen_immediately`
//! - `GLYPHBRIDGE_RESET_ON_SUCCESS`: Clear the failure count on success (true/false)
//! - `GLYPHBRIDGE_BRIDGE_TIMEOUT_MS`: Per-attempt host call timeout
//! - `GLYPHBRIDGE_LOG_LEVEL`: `EnvFilter` directive
//! - `GLYPHBRIDGE_LOG_FORMAT`: `pretty` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./glyphbridge.toml` or `./glyphbridge.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent directory
//! 4. The same names next to the executable

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use glyphbridge_domain::{Config, GlyphBridgeError, Result};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: &[&str] =
    &["glyphbridge.toml", "glyphbridge.json", "config.toml", "config.json"];

/// Load configuration from every source
///
/// Missing files and variables are not errors; defaults fill the gaps.
///
/// # Errors
/// Returns `GlyphBridgeError::Config` if:
/// - A probed file cannot be read or parsed
/// - An environment variable holds an unparsable value
/// - The merged configuration fails validation
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, starting from defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    tracing::info!(
        max_retries = config.retry.max_retries,
        circuit_enabled = config.circuit.enabled,
        "Configuration loaded"
    );
    Ok(config)
}

/// Load configuration from defaults plus environment variables only
///
/// # Errors
/// Returns `GlyphBridgeError::Config` for unparsable values or an invalid
/// result.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. The format is picked
/// by file extension. Sections and fields missing from the file keep their
/// defaults.
///
/// # Errors
/// Returns `GlyphBridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GlyphBridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GlyphBridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GlyphBridgeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `GlyphBridgeError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(GlyphBridgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Overlay `GLYPHBRIDGE_*` variables onto `config`
///
/// # Errors
/// Returns `GlyphBridgeError::Config` naming the first unparsable variable.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(value) = env_parse("GLYPHBRIDGE_MAX_RETRIES")? {
        config.retry.max_retries = value;
    }
    if let Some(value) = env_parse("GLYPHBRIDGE_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = value;
    }
    if let Some(value) = env_parse("GLYPHBRIDGE_MAX_DELAY_MS")? {
        config.retry.max_delay_ms = value;
    }
    if let Some(value) = env_parse("GLYPHBRIDGE_BACKOFF_MULTIPLIER")? {
        config.retry.backoff_multiplier = value;
    }
    if let Some(value) = env_parse("GLYPHBRIDGE_CLASSIFIER")? {
        config.retry.classifier = value;
    }
    config.retry.notify_on_retry =
        env_bool("GLYPHBRIDGE_NOTIFY_ON_RETRY", config.retry.notify_on_retry);

    config.circuit.enabled = env_bool("GLYPHBRIDGE_CIRCUIT_ENABLED", config.circuit.enabled);
    if let Some(value) = env_parse("GLYPHBRIDGE_FAILURE_THRESHOLD")? {
        config.circuit.failure_threshold = value;
    }
    if let Some(value) = env_parse("GLYPHBRIDGE_RESET_TIMEOUT_MS")? {
        config.circuit.reset_timeout_ms = value;
    }
    if let Some(value) = env_parse("GLYPHBRIDGE_HALF_OPEN_POLICY")? {
        config.circuit.half_open_policy = value;
    }
    config.circuit.reset_on_success =
        env_bool("GLYPHBRIDGE_RESET_ON_SUCCESS", config.circuit.reset_on_success);

    if let Some(value) = env_parse("GLYPHBRIDGE_BRIDGE_TIMEOUT_MS")? {
        config.bridge.timeout_ms = value;
    }

    if let Ok(level) = std::env::var("GLYPHBRIDGE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(value) = env_parse("GLYPHBRIDGE_LOG_FORMAT")? {
        config.logging.format = value;
    }

    Ok(())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `GlyphBridgeError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GlyphBridgeError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
