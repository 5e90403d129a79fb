//! TOML profile loading (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::validation::validate_config;
use super::SystemConfig;

/// Read, parse and validate a profile file.
///
/// # Errors
///
/// `ConfigError::IoError` if the file cannot be read, otherwise the errors of
/// [`parse_config`].
///
/// ```rust,ignore
/// let config = tmc5130::load_config("axis.toml")?;
/// let mut tmc = Tmc5130::builder().from_config(&config).transport(transport).build()?;
/// tmc.configure(&config)?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SystemConfig> {
    match fs::read_to_string(path.as_ref()) {
        Ok(content) => parse_config(&content),
        Err(e) => Err(Error::Config(ConfigError::IoError(truncated(&e.to_string())))),
    }
}

/// Parse and validate a profile held in memory.
///
/// # Errors
///
/// `ConfigError::ParseError` for malformed TOML or out of range fields, and
/// any error of [`validate_config`].
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config = toml::from_str::<SystemConfig>(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncated(e.message()))))?;
    validate_config(&config)?;
    Ok(config)
}

/// Keep as much of `msg` as fits a heapless error string.
fn truncated(msg: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for c in msg.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
