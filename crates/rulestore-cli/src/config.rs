//! CLI configuration

use anyhow::Result;
use rulestore_adapter::AdapterConfig;
use std::path::Path;

use crate::Cli;

/// Load adapter configuration from file and apply CLI/env overrides
pub fn load(cli: &Cli) -> Result<AdapterConfig> {
    // Try to load from file, or use defaults
    let mut config = if Path::new(&cli.config).exists() {
        AdapterConfig::from_file(&cli.config)?
    } else {
        AdapterConfig::default()
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(key) = &cli.key {
        config.key = key.clone();
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    if let Some(db) = cli.db {
        config.db = db;
    }

    config.validate()?;
    Ok(config)
}
