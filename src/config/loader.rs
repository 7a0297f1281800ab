//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::TreasuryConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable pointing at an optional TOML config file.
pub const CONFIG_PATH_ENV_VAR: &str = "TREASURY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then
/// environment overrides; validated before it is returned.
///
/// Without an explicit `path`, `TREASURY_CONFIG` names the file.
pub fn load_config(path: Option<&Path>) -> Result<TreasuryConfig, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV_VAR).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        }
        None => TreasuryConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the environment variables the service understands.
///
/// `lookup` abstracts `std::env::var` so tests do not touch process state.
pub fn apply_env_overrides<F>(config: &mut TreasuryConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("RPC_URL").or_else(|| lookup("ALCHEMY_URL")) {
        config.blockchain.rpc_url = url.trim().to_string();
    }

    if let Some(raw) = lookup("ETH_PRICE_USD") {
        config.pricing.eth_price_usd = raw.trim().parse().map_err(|_| ConfigError::Env {
            var: "ETH_PRICE_USD",
            value: raw.clone(),
        })?;
    }

    if let Some(raw) = lookup("PORT") {
        let port: u16 = raw.trim().parse().map_err(|_| ConfigError::Env {
            var: "PORT",
            value: raw.clone(),
        })?;
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    if let Some(addr) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = addr;
        config.observability.metrics_enabled = true;
    }

    Ok(())
}

/// Replace the port of a `host:port` bind address.
fn with_port(bind_address: &str, port: u16) -> String {
    let host = bind_address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or("0.0.0.0");
    format!("{host}:{port}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TreasuryConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("RPC_URL", " http://node:8545 "),
                ("ETH_PRICE_USD", "2000.5"),
                ("PORT", "9000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.blockchain.rpc_url, "http://node:8545");
        assert_eq!(config.pricing.eth_price_usd, 2000.5);
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
    }

    #[test]
    fn test_alchemy_alias() {
        let mut config = TreasuryConfig::default();
        apply_env_overrides(&mut config, env(&[("ALCHEMY_URL", "https://alchemy/v2/k")])).unwrap();
        assert_eq!(config.blockchain.rpc_url, "https://alchemy/v2/k");

        // RPC_URL wins when both are set
        let mut config = TreasuryConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("ALCHEMY_URL", "https://alchemy/v2/k"), ("RPC_URL", "http://primary")]),
        )
        .unwrap();
        assert_eq!(config.blockchain.rpc_url, "http://primary");
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut config = TreasuryConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:7000"

            [pricing]
            eth_price_usd = 1000.0
            "#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.pricing.eth_price_usd, 1000.0);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pricing]\neth_price_usd = -5.0").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_with_port() {
        assert_eq!(with_port("127.0.0.1:8080", 3000), "127.0.0.1:3000");
        assert_eq!(with_port("garbage", 3000), "0.0.0.0:3000");
    }
}
