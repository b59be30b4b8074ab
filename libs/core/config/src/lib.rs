pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment (dev = local/kind, prod = full k8s)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development, // Local dev or kind cluster
    Production,  // Mesh-enabled k8s cluster
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Load an environment variable, falling back to `default` when unset
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load an environment variable or fail with [`ConfigError::MissingEnvVar`]
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse an optional environment variable.
///
/// Unset yields `Ok(None)`; a value that does not parse is an error rather
/// than a silent default.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::ParseError {
                key: key.to_string(),
                details: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Read a boolean switch such as `GRPC_REFLECTION=false`.
///
/// `false`, `0`, `off` and `no` (any case) disable; anything else enables.
pub fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "off" | "no"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("MESH_TEST_VAR", Some("test_value"), || {
            assert_eq!(env_or_default("MESH_TEST_VAR", "default"), "test_value");
        });
        temp_env::with_var_unset("MESH_MISSING_VAR", || {
            assert_eq!(env_or_default("MESH_MISSING_VAR", "default"), "default");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("MESH_MISSING_REQUIRED", || {
            let err = env_required("MESH_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("MESH_MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_parse() {
        temp_env::with_var("MESH_PORT", Some(" 9090 "), || {
            assert_eq!(env_parse::<u16>("MESH_PORT").unwrap(), Some(9090));
        });
        temp_env::with_var_unset("MESH_PORT", || {
            assert_eq!(env_parse::<u16>("MESH_PORT").unwrap(), None);
        });
        temp_env::with_var("MESH_PORT", Some("not-a-port"), || {
            let err = env_parse::<u16>("MESH_PORT").unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "MESH_PORT"));
        });
    }

    #[test]
    fn test_env_flag() {
        temp_env::with_var_unset("MESH_FLAG", || {
            assert!(env_flag("MESH_FLAG", true));
            assert!(!env_flag("MESH_FLAG", false));
        });
        for off in ["false", "0", "OFF", "No"] {
            temp_env::with_var("MESH_FLAG", Some(off), || {
                assert!(!env_flag("MESH_FLAG", true));
            });
        }
        temp_env::with_var("MESH_FLAG", Some("yes"), || {
            assert!(env_flag("MESH_FLAG", false));
        });
    }
}
