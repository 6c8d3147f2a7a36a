use serde::{Deserialize, Serialize};

use crate::balance::ReferencePolicy;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// How the engine treats expenses pointing at unknown participants
    pub reference_policy: ReferencePolicy,
    /// Origin allowed by CORS. Any origin is allowed when unset.
    pub allowed_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            reference_policy: ReferencePolicy::Lenient,
            allowed_origin: None,
        }
    }
}

impl Config {
    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(host) = lookup("SPLITSETTLE_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("SPLITSETTLE_PORT") {
            config.port = port
                .parse()
                .map_err(|e| Error::Config(format!("SPLITSETTLE_PORT={port}: {e}")))?;
        }

        if let Some(strict) = lookup("SPLITSETTLE_STRICT_REFERENCES") {
            let strict: bool = strict.parse().map_err(|e| {
                Error::Config(format!("SPLITSETTLE_STRICT_REFERENCES={strict}: {e}"))
            })?;
            config.reference_policy = if strict {
                ReferencePolicy::Strict
            } else {
                ReferencePolicy::Lenient
            };
        }

        if let Some(origin) = lookup("SPLITSETTLE_ALLOWED_ORIGIN") {
            config.allowed_origin = Some(origin).filter(|origin| !origin.is_empty());
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(load(&[]).unwrap(), Config::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("SPLITSETTLE_HOST", "127.0.0.1"),
            ("SPLITSETTLE_PORT", "9000"),
            ("SPLITSETTLE_STRICT_REFERENCES", "true"),
            ("SPLITSETTLE_ALLOWED_ORIGIN", "https://split.example"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 9000));
        assert_eq!(config.reference_policy, ReferencePolicy::Strict);
        assert_eq!(
            config.allowed_origin.as_deref(),
            Some("https://split.example")
        );
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            load(&[("SPLITSETTLE_PORT", "eighty")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            load(&[("SPLITSETTLE_STRICT_REFERENCES", "yes")]),
            Err(Error::Config(_))
        ));
    }
}
