//! Runtime settings, read from the environment.
//!
//! | Variable                | Default      | Meaning                                   |
//! |-------------------------|--------------|-------------------------------------------|
//! | `BISTRO_DATA_DIR`       | unset        | Directory for the cart file; unset keeps the cart in memory |
//! | `BISTRO_CHANNEL_BUFFER` | `32`         | Mailbox size of every table               |
//! | `BISTRO_CART_KEY`       | `cart`       | Storage key of the persisted cart         |

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::cart::DEFAULT_CART_KEY;

pub const DEFAULT_CHANNEL_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub channel_buffer: usize,
    pub cart_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
            cart_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Missing or unparsable values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let data_dir = lookup("BISTRO_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        if data_dir.is_none() {
            info!("BISTRO_DATA_DIR not set, cart kept in memory");
        }

        let channel_buffer = try_load(&lookup, "BISTRO_CHANNEL_BUFFER", defaults.channel_buffer);
        let channel_buffer = if channel_buffer == 0 {
            warn!("BISTRO_CHANNEL_BUFFER must be positive, using default: {DEFAULT_CHANNEL_BUFFER}");
            DEFAULT_CHANNEL_BUFFER
        } else {
            channel_buffer
        };

        Self {
            data_dir,
            channel_buffer,
            cart_key: try_load(&lookup, "BISTRO_CART_KEY", defaults.cart_key),
        }
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn test_values_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("BISTRO_DATA_DIR", "/var/lib/bistro"),
            ("BISTRO_CHANNEL_BUFFER", "128"),
            ("BISTRO_CART_KEY", "guest-cart"),
        ]));
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/bistro")));
        assert_eq!(config.channel_buffer, 128);
        assert_eq!(config.cart_key, "guest-cart");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("BISTRO_CHANNEL_BUFFER", "lots")]));
        assert_eq!(config.channel_buffer, DEFAULT_CHANNEL_BUFFER);

        let config = Config::from_lookup(lookup(&[("BISTRO_CHANNEL_BUFFER", "0")]));
        assert_eq!(config.channel_buffer, DEFAULT_CHANNEL_BUFFER);
    }
}
