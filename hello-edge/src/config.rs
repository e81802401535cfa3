use lambda_runtime::tracing;
use std::collections::HashMap;
use std::env::{self, VarError};
use thiserror::Error;

pub const NAME_KEY: &str = "NAME";
pub const DEFAULT_NAME: &str = "Unknown";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("value of {0} is not valid unicode")]
    NotUnicode(String),

    #[error("configuration source unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookup of configuration values supplied by the host.
///
/// `Ok(None)` means the key is not set. Implementations must not mutate
/// shared state: the runtime may call `get` from concurrent invocations.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// The process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConfig;

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key.to_string())),
        }
    }
}

/// A fixed set of variables, e.g. the `name`/`value` pairs declared on an
/// edge function deployment.
#[derive(Debug, Default, Clone)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapConfig {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Looks up `key`, substituting `default` when the value is unset, empty or
/// unreadable. Only a failing backend is reported to the caller.
pub fn lookup_or_default(
    source: &dyn ConfigSource,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match source.get(key) {
        Ok(Some(value)) if !value.is_empty() => Ok(value),
        Ok(_) => Ok(default.to_string()),
        Err(ConfigError::NotUnicode(key)) => {
            tracing::warn!(key = %key, default = %default, "config value is not unicode, using default");
            Ok(default.to_string())
        }
        Err(err) => Err(err),
    }
}
