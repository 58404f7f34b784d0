use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::playback::InFlightPolicy;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub host: String,
    pub port: u16,
    pub synthesis_url: String,
    pub synthesis_timeout_secs: u64,
    pub catalog_path: Option<PathBuf>,
    pub static_dir: PathBuf,
    pub in_flight: InFlightPolicy,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            synthesis_url: "http://127.0.0.1:8000/api/generate-sound".to_string(),
            synthesis_timeout_secs: 60,
            catalog_path: None,
            static_dir: PathBuf::from("static"),
            in_flight: InFlightPolicy::Reject,
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source; unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(v) => parse(&v, "PORT")?,
            None => defaults.port,
        };

        let synthesis_timeout_secs = match var("SYNTHESIS_TIMEOUT_SECS") {
            Some(v) => match parse::<u64>(&v, "SYNTHESIS_TIMEOUT_SECS")? {
                0 => return Err(invalid("SYNTHESIS_TIMEOUT_SECS", v)),
                secs => secs,
            },
            None => defaults.synthesis_timeout_secs,
        };

        let in_flight = match var("SUPERSEDE_IN_FLIGHT").as_deref() {
            None | Some("0" | "false" | "no") => InFlightPolicy::Reject,
            Some("1" | "true" | "yes") => InFlightPolicy::Supersede,
            Some(other) => return Err(invalid("SUPERSEDE_IN_FLIGHT", other.to_string())),
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            synthesis_url: var("SYNTHESIS_URL").unwrap_or(defaults.synthesis_url),
            synthesis_timeout_secs,
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
            static_dir: var("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            in_flight,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| invalid("HOST", addr))
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }
}

fn parse<T: std::str::FromStr>(value: &str, name: &'static str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(name, value.to_string()))
}

fn invalid(name: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { name, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<StudioConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StudioConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.addr().unwrap().port(), 3000);
        assert_eq!(config.synthesis_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8085"),
            ("SYNTHESIS_URL", "http://backend/generate"),
            ("SYNTHESIS_TIMEOUT_SECS", "5"),
            ("CATALOG_PATH", "models.json"),
            ("STATIC_DIR", "web"),
            ("SUPERSEDE_IN_FLIGHT", "true"),
        ])
        .unwrap();

        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8085");
        assert_eq!(config.synthesis_url, "http://backend/generate");
        assert_eq!(config.synthesis_timeout(), Duration::from_secs(5));
        assert_eq!(config.catalog_path, Some(PathBuf::from("models.json")));
        assert_eq!(config.static_dir, PathBuf::from("web"));
        assert_eq!(config.in_flight, InFlightPolicy::Supersede);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("PORT", "  "), ("CATALOG_PATH", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.catalog_path, None);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid {
                name: "PORT",
                value: "eighty".into()
            })
        );
        assert!(config_from(&[("SYNTHESIS_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("SUPERSEDE_IN_FLIGHT", "maybe")]).is_err());
        assert!(config_from(&[("HOST", "not a host")])
            .unwrap()
            .addr()
            .is_err());
    }
}
