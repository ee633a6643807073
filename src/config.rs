// config.rs
use tracing_subscriber::filter::LevelFilter;

use crate::service::latency::LatencyPolicy;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// Session lifetime in minutes.
    pub jwt_maxage: i64,
    pub port: u16,
    pub log_level: LevelFilter,
    pub seed_fixtures: bool,
    pub latency: LatencyPolicy,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            jwt_secret: "resolvenow-dev-secret".to_string(),
            jwt_maxage: 60,
            port: 8000,
            log_level: LevelFilter::DEBUG,
            seed_fixtures: true,
            latency: LatencyPolicy::none(),
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:8000".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let jwt_secret = lookup("JWT_SECRET_KEY")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET_KEY"))?;

        let jwt_maxage = parse_or("JWT_MAXAGE", &lookup, defaults.jwt_maxage)?;
        let port = parse_or("PORT", &lookup, defaults.port)?;

        let log_level = match lookup("LOG_LEVEL") {
            Some(value) => value.trim().parse::<LevelFilter>().map_err(|_| ConfigError::Invalid {
                name: "LOG_LEVEL",
                value,
            })?,
            None => defaults.log_level,
        };

        let seed_fixtures = parse_or("SEED_FIXTURES", &lookup, defaults.seed_fixtures)?;

        let latency = match lookup("MOCK_LATENCY") {
            Some(value) => LatencyPolicy::from_name(&value).ok_or(ConfigError::Invalid {
                name: "MOCK_LATENCY",
                value,
            })?,
            None => defaults.latency,
        };
        let failure_rate: f64 = parse_or("MOCK_FAILURE_RATE", &lookup, 0.0)?;
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(ConfigError::Invalid {
                name: "MOCK_FAILURE_RATE",
                value: failure_rate.to_string(),
            });
        }

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.allowed_origins,
        };

        Ok(Config {
            jwt_secret,
            jwt_maxage,
            port,
            log_level,
            seed_fixtures,
            latency: latency.with_failure_rate(failure_rate),
            allowed_origins,
        })
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn secret_is_required() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET_KEY")
        );
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("JWT_SECRET_KEY", "s3cret")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.jwt_maxage, 60);
        assert!(config.seed_fixtures);
        assert_eq!(config.log_level, LevelFilter::DEBUG);
        assert_eq!(config.latency.delay_for(crate::service::latency::Operation::Login), Duration::ZERO);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("JWT_SECRET_KEY", "s3cret"),
            ("PORT", "9000"),
            ("LOG_LEVEL", "warn"),
            ("SEED_FIXTURES", "false"),
            ("MOCK_LATENCY", "parity"),
            ("MOCK_FAILURE_RATE", "0.25"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, LevelFilter::WARN);
        assert!(!config.seed_fixtures);
        assert_eq!(config.latency.failure_rate, 0.25);
        assert_eq!(
            config.latency.delay_for(crate::service::latency::Operation::Submit),
            Duration::from_millis(1000)
        );
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            config_from(&[("JWT_SECRET_KEY", "s"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("JWT_SECRET_KEY", "s"), ("MOCK_LATENCY", "slow")]),
            Err(ConfigError::Invalid { name: "MOCK_LATENCY", .. })
        ));
        assert!(matches!(
            config_from(&[("JWT_SECRET_KEY", "s"), ("MOCK_FAILURE_RATE", "2")]),
            Err(ConfigError::Invalid { name: "MOCK_FAILURE_RATE", .. })
        ));
    }
}
