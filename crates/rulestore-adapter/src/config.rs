//! Adapter configuration

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use rulestore_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Key holding the rule list when none is configured
pub const DEFAULT_KEY: &str = "casbin_rules";

/// Connection and key settings for a list adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Redis host
    #[serde(default = "default_host")]
    pub host: String,

    /// Redis port
    #[serde(default = "default_port")]
    pub port: u16,

    /// List key holding every stored rule
    #[serde(default = "default_key")]
    pub key: String,

    /// ACL username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for `AUTH`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Logical database index
    #[serde(default)]
    pub db: i64,
}

impl AdapterConfig {
    /// Config for a host and port with every other setting defaulted
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the list key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database index
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse adapter config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject settings that cannot address a list
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::config("host must not be empty"));
        }
        if self.key.is_empty() {
            return Err(Error::config("key must not be empty"));
        }
        if self.db < 0 {
            return Err(Error::config(format!("db index {} is negative", self.db)));
        }
        Ok(())
    }

    /// Redis connection details for this config
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                username: self.username.clone(),
                password: self.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            key: default_key(),
            username: None,
            password: None,
            db: 0,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.key, "casbin_rules");
        assert_eq!(config.db, 0);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = AdapterConfig::from_yaml("host: redis.internal\npassword: s3cret\n").unwrap();
        assert_eq!(config.host, "redis.internal");
        assert_eq!(config.port, 6379);
        assert_eq!(config.key, DEFAULT_KEY);
        assert_eq!(config.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(AdapterConfig::from_yaml("key: \"\"").is_err());
        assert!(AdapterConfig::from_yaml("db: -1").is_err());
        assert!(AdapterConfig::from_yaml("port: not-a-port").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: 6380\nkey: tenant_rules\ndb: 2").unwrap();

        let config = AdapterConfig::from_file(file.path()).unwrap();
        assert_eq!(config, AdapterConfig::new("127.0.0.1", 6380).with_key("tenant_rules").with_db(2));
    }

    #[test]
    fn test_connection_info() {
        let info = AdapterConfig::new("redis.internal", 6390)
            .with_password("pw")
            .with_db(3)
            .connection_info();

        match info.addr {
            ConnectionAddr::Tcp(host, port) => {
                assert_eq!(host, "redis.internal");
                assert_eq!(port, 6390);
            }
            other => panic!("Wrong address kind: {}", other),
        }
        assert_eq!(info.redis.db, 3);
        assert_eq!(info.redis.password.as_deref(), Some("pw"));
    }
}
