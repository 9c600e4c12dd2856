//! Shared configuration helpers for the auth and RPC demo components.
//!
//! Every component describes its settings as a serde-deserializable struct
//! implementing [`ServiceConfig`]. [`load`] reads an optional TOML file named
//! by `<PREFIX>CONFIG` and then layers `<PREFIX><KEY>` environment variables on
//! top of it.

use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration that can be loaded from a file and the environment.
pub trait ServiceConfig: DeserializeOwned + Default {
    /// Prefix shared by every environment variable of this configuration,
    /// including the trailing underscore (e.g. `RPC_DEMO_`).
    const PREFIX: &'static str;

    /// Overwrite fields from `<prefix><KEY>` environment variables.
    fn apply_environment_overrides(&mut self, prefix: &str);
}

/// Load `T` from the file named by `<PREFIX>CONFIG` (if set) and apply
/// environment overrides.
pub fn load<T: ServiceConfig>() -> Result<T, ConfigError> {
    let mut config = match env::var(format!("{}CONFIG", T::PREFIX)) {
        Ok(path) if !path.is_empty() => from_file::<T>(path)?,
        _ => T::default(),
    };
    config.apply_environment_overrides(T::PREFIX);
    Ok(config)
}

/// Parse `T` from a TOML file without applying environment overrides.
pub fn from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `target` with the parsed value of `<prefix><key>` when present.
///
/// Unparseable values are logged and ignored so a typo never takes a
/// component down.
pub fn env_override<T>(prefix: &str, key: &str, target: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    let var = format!("{prefix}{key}");
    if let Ok(value) = env::var(&var) {
        match value.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(error) => {
                tracing::warn!(%var, %value, %error, "invalid config override, keeping current value");
            }
        }
    }
}

/// Resolve a port from an environment variable.
///
/// Falls back to the provided default when the variable is missing or cannot be
/// parsed into a `u16`.
pub fn service_port(var: &str, default: u16) -> u16 {
    match env::var(var) {
        Ok(value) => value
            .parse::<u16>()
            .inspect_err(|error| {
                tracing::warn!(%var, %value, %error, "invalid port override, using default");
            })
            .unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        host: String,
        port: u16,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                host: "localhost".to_string(),
                port: 1234,
            }
        }
    }

    impl ServiceConfig for Sample {
        const PREFIX: &'static str = "COMMON_CONFIG_TEST_SAMPLE_";

        fn apply_environment_overrides(&mut self, prefix: &str) {
            env_override(prefix, "HOST", &mut self.host);
            env_override(prefix, "PORT", &mut self.port);
        }
    }

    #[test]
    fn load_without_file_uses_defaults_and_env() {
        env::set_var("COMMON_CONFIG_TEST_SAMPLE_PORT", "4321");
        let config = load::<Sample>().expect("load");
        env::remove_var("COMMON_CONFIG_TEST_SAMPLE_PORT");

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 4321);
    }

    #[test]
    fn invalid_override_keeps_value() {
        let mut port = 1234u16;
        env::set_var("COMMON_CONFIG_TEST_BAD_PORT", "not-a-port");
        env_override("COMMON_CONFIG_TEST_BAD_", "PORT", &mut port);
        env::remove_var("COMMON_CONFIG_TEST_BAD_PORT");
        assert_eq!(port, 1234);
    }

    #[test]
    fn from_file_fills_missing_fields_with_defaults() {
        let path = env::temp_dir().join(format!("common-config-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).expect("create");
        writeln!(file, "host = \"rpc.internal\"").expect("write");
        drop(file);

        let config: Sample = from_file(&path).expect("parse");
        fs::remove_file(&path).ok();

        assert_eq!(
            config,
            Sample {
                host: "rpc.internal".to_string(),
                port: 1234,
            }
        );
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = from_file::<Sample>("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn service_port_falls_back_on_garbage() {
        env::set_var("COMMON_CONFIG_TEST_SERVICE_PORT", "99999");
        assert_eq!(service_port("COMMON_CONFIG_TEST_SERVICE_PORT", 1234), 1234);
        env::remove_var("COMMON_CONFIG_TEST_SERVICE_PORT");
        assert_eq!(service_port("COMMON_CONFIG_TEST_SERVICE_PORT", 1234), 1234);
    }
}
