use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub keys: KeyConfig,
    #[serde(default)]
    pub token: TokenConfig,
    /// PostgreSQL connection URL for the identity store.
    /// When absent the service keeps identities in memory.
    #[serde(default)]
    pub postgres_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Locations of the PEM-encoded signing key pair.
///
/// Relative paths resolve against the process working directory.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KeyConfig {
    pub private_key_path: String,
    pub public_key_path: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            private_key_path: "privateKey.pem".to_string(),
            public_key_path: "publicKey.pem".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenConfig {
    pub issuer: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "poem-app".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.postgres_url = Some(url);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: bookshelf.log
use_json: false
rotation: never
gateway:
  host: 127.0.0.1
  port: 8080
"#;

    #[test]
    fn test_defaults_for_optional_sections() {
        let config: AppConfig = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(config.keys.private_key_path, "privateKey.pem");
        assert_eq!(config.keys.public_key_path, "publicKey.pem");
        assert_eq!(config.token.issuer, "poem-app");
        assert!(config.postgres_url.is_none());
    }

    #[test]
    fn test_explicit_sections_override_defaults() {
        let yaml = format!(
            "{}keys:\n  private_key_path: /tmp/k/priv.pem\n  public_key_path: /tmp/k/pub.pem\ntoken:\n  issuer: other\n",
            MINIMAL
        );
        let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.keys.private_key_path, "/tmp/k/priv.pem");
        assert_eq!(config.token.issuer, "other");
    }

    #[test]
    fn test_env_files_keep_keys_in_working_directory() {
        for env in ["dev", "prod"] {
            let config = AppConfig::load(env).unwrap();
            assert_eq!(config.keys.private_key_path, "privateKey.pem", "{}", env);
            assert_eq!(config.keys.public_key_path, "publicKey.pem", "{}", env);
            assert_eq!(config.token.issuer, "poem-app", "{}", env);
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::load("does-not-exist").is_err());
    }
}
