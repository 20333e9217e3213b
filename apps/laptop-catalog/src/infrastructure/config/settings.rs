//! Catalog Configuration Settings
//!
//! Configuration types for the catalog service, loaded from environment
//! variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CATALOG_GRPC_PORT` | `50051` |
//! | `CATALOG_HEALTH_PORT` | `8081` (0 disables the health server) |
//! | `CATALOG_IMAGE_DIR` | `img` |
//! | `CATALOG_MAX_IMAGE_BYTES` | `1048576` |
//! | `CATALOG_STREAM_BUFFER` | `128` |

use std::path::PathBuf;
use std::str::FromStr;

use crate::application::services::DEFAULT_MAX_IMAGE_SIZE;
use crate::infrastructure::grpc::DEFAULT_STREAM_BUFFER;

/// Server port settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// gRPC server port.
    pub grpc_port: u16,
    /// Health check HTTP port (0 = disabled).
    pub health_port: u16,
    /// Outbound channel capacity of each streaming call.
    pub stream_buffer: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            grpc_port: 50051,
            health_port: 8081,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

/// Image storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Directory uploaded images are written to.
    pub image_dir: PathBuf,
    /// Largest accepted image in bytes.
    pub max_image_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("img"),
            max_image_bytes: DEFAULT_MAX_IMAGE_SIZE,
        }
    }
}

/// Complete catalog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Server settings.
    pub server: ServerSettings,
    /// Image storage settings.
    pub storage: StorageSettings,
}

impl CatalogConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server = ServerSettings {
            grpc_port: parse_var(&lookup, "CATALOG_GRPC_PORT", defaults.server.grpc_port)?,
            health_port: parse_var(&lookup, "CATALOG_HEALTH_PORT", defaults.server.health_port)?,
            stream_buffer: parse_var(
                &lookup,
                "CATALOG_STREAM_BUFFER",
                defaults.server.stream_buffer,
            )?,
        };

        if server.stream_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CATALOG_STREAM_BUFFER".to_string(),
                value: "0".to_string(),
            });
        }

        let image_dir = match lookup("CATALOG_IMAGE_DIR") {
            Some(dir) if dir.trim().is_empty() => {
                return Err(ConfigError::EmptyValue("CATALOG_IMAGE_DIR".to_string()));
            }
            Some(dir) => PathBuf::from(dir),
            None => defaults.storage.image_dir,
        };

        let storage = StorageSettings {
            image_dir,
            max_image_bytes: parse_var(
                &lookup,
                "CATALOG_MAX_IMAGE_BYTES",
                defaults.storage.max_image_bytes,
            )?,
        };

        Ok(Self { server, storage })
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable could not be parsed.
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Rejected value.
        value: String,
    },
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.server.grpc_port, 50051);
        assert_eq!(config.server.health_port, 8081);
        assert_eq!(config.storage.image_dir, PathBuf::from("img"));
        assert_eq!(config.storage.max_image_bytes, 1_048_576);
    }

    #[test]
    fn overrides_from_vars() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("CATALOG_GRPC_PORT", "6000"),
            ("CATALOG_HEALTH_PORT", "0"),
            ("CATALOG_IMAGE_DIR", "/var/lib/catalog/img"),
            ("CATALOG_MAX_IMAGE_BYTES", " 2048 "),
            ("CATALOG_STREAM_BUFFER", "8"),
        ]))
        .unwrap();

        assert_eq!(config.server.grpc_port, 6000);
        assert_eq!(config.server.health_port, 0);
        assert_eq!(config.server.stream_buffer, 8);
        assert_eq!(
            config.storage.image_dir,
            PathBuf::from("/var/lib/catalog/img")
        );
        assert_eq!(config.storage.max_image_bytes, 2048);
    }

    #[test]
    fn malformed_number_is_invalid() {
        let err = CatalogConfig::from_lookup(lookup(&[("CATALOG_GRPC_PORT", "70000")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "CATALOG_GRPC_PORT".to_string(),
                value: "70000".to_string(),
            }
        );
    }

    #[test]
    fn zero_stream_buffer_is_invalid() {
        let err =
            CatalogConfig::from_lookup(lookup(&[("CATALOG_STREAM_BUFFER", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn empty_image_dir_is_rejected() {
        let err = CatalogConfig::from_lookup(lookup(&[("CATALOG_IMAGE_DIR", "  ")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyValue("CATALOG_IMAGE_DIR".to_string())
        );
    }
}
