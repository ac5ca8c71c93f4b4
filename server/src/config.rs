//! Relay configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLIENT_QUEUE: usize = 256;
pub const DEFAULT_MAX_NAME_LEN: usize = 64;
pub const DEFAULT_MAX_ROOM_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    /// Capacity of each connection's outbound frame queue.
    pub client_queue: usize,
    pub max_name_len: usize,
    pub max_room_len: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            client_queue: DEFAULT_CLIENT_QUEUE,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            max_room_len: DEFAULT_MAX_ROOM_LEN,
        }
    }
}

impl RelayConfig {
    /// Build typed relay config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `RELAY_CLIENT_QUEUE`: default 256
    /// - `RELAY_MAX_NAME_LEN`: default 64
    /// - `RELAY_MAX_ROOM_LEN`: default 64
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but does not
    /// parse, or when a size is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RelayConfig::from_env`] over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`RelayConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT)?,
            client_queue: env_positive(&lookup, "RELAY_CLIENT_QUEUE", DEFAULT_CLIENT_QUEUE)?,
            max_name_len: env_positive(&lookup, "RELAY_MAX_NAME_LEN", DEFAULT_MAX_NAME_LEN)?,
            max_room_len: env_positive(&lookup, "RELAY_MAX_ROOM_LEN", DEFAULT_MAX_ROOM_LEN)?,
        })
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Sizes must be at least one.
fn env_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    match env_parse(lookup, key, default)? {
        0 => Err(ConfigError::Invalid { key, value: "0".into() }),
        value => Ok(value),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
