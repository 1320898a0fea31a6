//! Process configuration, read once at startup from the environment.

use thiserror::Error;

use mesto_core::UserId;
use mesto_infra::StoreConfig;
use mesto_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Deployment environment. Only `Production` changes behavior: it hides debug detail in error
/// responses and marks the session cookie `Secure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "test" => Some(Self::Test),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

/// Router composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterProfile {
    /// Bearer/cookie authentication and request-schema validation on every route.
    #[default]
    Secured,
    /// Every request acts as `identity`; request schemas are skipped (store rules still apply).
    Simplified { identity: UserId },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("{key} must be set {when}")]
    Missing { key: &'static str, when: &'static str },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub environment: Environment,
    pub profile: RouterProfile,
    /// Accept the `jwt` cookie when the request has no `Authorization` header.
    pub cookie_auth: bool,
    pub store: StoreConfig,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            environment: Environment::Development,
            profile: RouterProfile::Secured,
            cookie_auth: false,
            store: StoreConfig::Memory,
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    /// True when no `JWT_SECRET` was supplied and the insecure default is in effect.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => v.trim().parse().map_err(|_| invalid("PORT", &v, "expected a port number"))?,
            None => defaults.port,
        };

        let environment = match get("APP_ENV").or_else(|| get("NODE_ENV")) {
            Some(v) => Environment::parse(&v)
                .ok_or_else(|| invalid("APP_ENV", &v, "expected development, test or production"))?,
            None => defaults.environment,
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(v) => v,
            None if environment.is_production() => {
                return Err(ConfigError::Missing {
                    key: "JWT_SECRET",
                    when: "in production",
                });
            }
            None => defaults.jwt_secret,
        };

        let profile = match get("ROUTER_PROFILE").as_deref().map(str::trim) {
            None | Some("secured") => RouterProfile::Secured,
            Some("simplified") => {
                let raw = get("DEV_USER_ID").ok_or(ConfigError::Missing {
                    key: "DEV_USER_ID",
                    when: "for the simplified profile",
                })?;
                let identity = raw
                    .trim()
                    .parse()
                    .map_err(|_| invalid("DEV_USER_ID", &raw, "expected a user id"))?;
                RouterProfile::Simplified { identity }
            }
            Some(other) => return Err(invalid("ROUTER_PROFILE", other, "expected secured or simplified")),
        };

        let cookie_auth = match get("AUTH_COOKIE") {
            Some(v) => parse_bool(&v).ok_or_else(|| invalid("AUTH_COOKIE", &v, "expected true or false"))?,
            None => defaults.cookie_auth,
        };

        let store = match get("STORE").as_deref().map(str::trim) {
            None | Some("memory") => StoreConfig::Memory,
            Some("postgres") => StoreConfig::Postgres {
                url: get("DATABASE_URL").ok_or(ConfigError::Missing {
                    key: "DATABASE_URL",
                    when: "when STORE=postgres",
                })?,
            },
            Some(other) => return Err(invalid("STORE", other, "expected memory or postgres")),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse().map_err(|_| invalid("LOG_FORMAT", &v, "expected json or pretty"))?,
            None => defaults.log_format,
        };

        Ok(Self {
            port,
            jwt_secret,
            environment,
            profile,
            cookie_auth,
            store,
            log_format,
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.profile, RouterProfile::Secured);
        assert!(!config.cookie_auth);
        assert_eq!(config.store, StoreConfig::Memory);
    }

    #[test]
    fn reads_every_variable() {
        let user = UserId::new();
        let user_str = user.to_string();
        let config = ApiConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("JWT_SECRET", "s3cret"),
            ("NODE_ENV", "production"),
            ("ROUTER_PROFILE", "simplified"),
            ("DEV_USER_ID", user_str.as_str()),
            ("AUTH_COOKIE", "true"),
            ("STORE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/mesto"),
            ("LOG_FORMAT", "pretty"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(config.environment.is_production());
        assert_eq!(config.profile, RouterProfile::Simplified { identity: user });
        assert!(config.cookie_auth);
        assert_eq!(
            config.store,
            StoreConfig::Postgres {
                url: "postgres://localhost/mesto".into()
            }
        );
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn app_env_wins_over_node_env() {
        let config =
            ApiConfig::from_lookup(lookup(&[("APP_ENV", "test"), ("NODE_ENV", "production")])).unwrap();
        assert_eq!(config.environment, Environment::Test);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("PORT", "http")])),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("ROUTER_PROFILE", "simplified")])),
            Err(ConfigError::Missing { key: "DEV_USER_ID", .. })
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("STORE", "postgres")])),
            Err(ConfigError::Missing { key: "DATABASE_URL", .. })
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("NODE_ENV", "production")])),
            Err(ConfigError::Missing { key: "JWT_SECRET", .. })
        ));
    }
}
