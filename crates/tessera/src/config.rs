//! Startup configuration.
//!
//! Configuration is a JSON file whose path comes from the
//! `TESSERA_CONFIG_PATH` environment variable:
//!
//! ```json
//! {
//!   "session": {
//!     "secret_key": "000102030405060708090a0b0c0d0e0f",
//!     "default_duration_secs": 259200,
//!     "max_duration_secs": 259200
//!   }
//! }
//! ```
//!
//! Everything here is validated once, at startup. A bad secret key is a
//! deployment error: the process refuses to start rather than failing
//! every request later.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;
use tessera_session::{KeyError, SecretKey};

use crate::SessionPolicy;

/// Environment variable holding the path to the JSON config file.
pub const CONFIG_PATH_ENV: &str = "TESSERA_CONFIG_PATH";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `TESSERA_CONFIG_PATH` is unset or empty.
    #[error("config path must be set in TESSERA_CONFIG_PATH")]
    MissingPath,

    /// The config file couldn't be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file isn't valid JSON or is missing fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The session secret key is not 16 bytes of hex.
    #[error("invalid session secret key: {0}")]
    InvalidSecretKey(#[from] KeyError),

    /// A service was built without a secret key.
    #[error("session secret key is not set")]
    MissingSecretKey,

    /// A session duration is zero, negative, out of range, or the default
    /// exceeds the maximum.
    #[error("invalid session duration: {0}")]
    InvalidDuration(String),

    /// The packer splits tokens at a different length than sessions sign.
    #[error("packer message length {actual} does not match signed message length {expected}")]
    PackerLength { expected: usize, actual: usize },
}

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct TesseraConfig {
    pub session: SessionSettings,
}

/// The `session` section.
#[derive(Clone, Deserialize)]
pub struct SessionSettings {
    /// 128-bit key, hex encoded. Generate it with a CSPRNG.
    pub secret_key: String,

    /// Lifetime of a freshly created session, in seconds.
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u64,

    /// Longest renewal window a client may ask for, in seconds.
    #[serde(default = "default_duration_secs")]
    pub max_duration_secs: u64,
}

fn default_duration_secs() -> u64 {
    SessionPolicy::DEFAULT_DURATION_SECS
}

// Hand-written so the key never ends up in logs.
impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("secret_key", &"..")
            .field("default_duration_secs", &self.default_duration_secs)
            .field("max_duration_secs", &self.max_duration_secs)
            .finish()
    }
}

impl TesseraConfig {
    /// Parses configuration from JSON.
    pub fn from_json<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads and parses the config file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Self::from_json(BufReader::new(file))
    }

    /// Reads the config file named by [`CONFIG_PATH_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_path(path),
            _ => Err(ConfigError::MissingPath),
        }
    }

    /// The validated session secret key.
    ///
    /// # Errors
    /// [`ConfigError::InvalidSecretKey`] unless the key is exactly 16 bytes
    /// of hex.
    pub fn secret_key(&self) -> Result<SecretKey, ConfigError> {
        Ok(SecretKey::from_hex(&self.session.secret_key)?)
    }

    /// The validated session duration policy.
    pub fn policy(&self) -> Result<SessionPolicy, ConfigError> {
        let default_duration = seconds(self.session.default_duration_secs, "default_duration_secs")?;
        let max_duration = seconds(self.session.max_duration_secs, "max_duration_secs")?;
        SessionPolicy::new(default_duration, max_duration)
    }
}

fn seconds(secs: u64, field: &str) -> Result<TimeDelta, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| ConfigError::InvalidDuration(format!("{field} is out of range")))
}
