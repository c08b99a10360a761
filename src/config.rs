use anyhow::{Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(about = "Runs the bookmarks service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookmarks")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

/// Decides how much an internal failure tells the client.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    port: i32,
    #[serde(default)]
    pub environment: Environment,
    api_token: String,
}

impl App {
    pub fn get_port(&self) -> i32 {
        self.port
    }

    pub fn get_api_token(&self) -> &str {
        &self.api_token
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Libsql,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Store {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_database")]
    database: String,
    #[serde(default)]
    pub seed: bool,
    #[serde(default)]
    pub turso_url: Option<String>,
    #[serde(default)]
    pub turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

fn default_database() -> String {
    "bookmarks.db".to_string()
}

fn default_sync_interval() -> u64 {
    60
}

impl Default for Store {
    fn default() -> Self {
        Store {
            backend: Backend::default(),
            database: default_database(),
            seed: false,
            turso_url: None,
            turso_auth_token: None,
            sync_interval_seconds: default_sync_interval(),
        }
    }
}

impl Store {
    pub fn in_memory() -> Self {
        Store {
            backend: Backend::Libsql,
            database: ":memory:".to_string(),
            ..Default::default()
        }
    }

    pub fn get_db(&self) -> &str {
        &self.database
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct Validation {
    /// Format check for `url`. Off until the product asks for it.
    #[serde(default)]
    pub check_urls: bool,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub store: Store,
    #[serde(default)]
    pub validation: Validation,
    /// `${VAR}` references with no value in the environment, substituted as empty.
    #[serde(skip)]
    unset_env_vars: Vec<String>,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let (yaml_with_env, unset_env_vars) = Config::substitute_env_vars(yaml_str)?;
        let mut config: Config = serde_yaml::from_str(&yaml_with_env)?;
        config.check()?;
        config.unset_env_vars = unset_env_vars;
        Ok(config)
    }

    pub fn unset_env_vars(&self) -> &[String] {
        &self.unset_env_vars
    }

    fn check(&self) -> Result<()> {
        if self.app.api_token.trim().is_empty() {
            bail!("app.api_token must not be empty");
        }
        if !(1..=65535).contains(&self.app.port) {
            bail!("app.port {} is out of range", self.app.port);
        }
        Ok(())
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<(String, Vec<String>)> {
        let mut result = yaml_str.to_string();
        let mut unset = Vec::new();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find('}') {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        unset.push(var_name.to_string());
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok((result, unset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
app:
  port: 8000
  api_token: secret
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let cfg = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(cfg.app.get_port(), 8000);
        assert_eq!(cfg.app.get_api_token(), "secret");
        assert_eq!(cfg.app.environment, Environment::Production);
        assert_eq!(cfg.store.backend, Backend::Memory);
        assert_eq!(cfg.store.get_db(), "bookmarks.db");
        assert!(!cfg.store.seed);
        assert!(!cfg.validation.check_urls);
    }

    #[test]
    fn test_full_config() {
        let cfg = Config::from_yaml(
            r#"
app:
  port: 9090
  environment: development
  api_token: abc
store:
  backend: libsql
  database: ":memory:"
validation:
  check_urls: true
"#,
        )
        .unwrap();
        assert!(cfg.app.environment.is_development());
        assert_eq!(cfg.store.backend, Backend::Libsql);
        assert_eq!(cfg.store.get_db(), ":memory:");
        assert_eq!(cfg.store.sync_interval_seconds, 60);
        assert!(cfg.validation.check_urls);
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let err = Config::from_yaml("app:\n  port: 8000\n  api_token: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn test_unset_var_falls_back_to_default() {
        let cfg = Config::from_yaml(
            "app:\n  port: 8000\n  api_token: ${BOOKMARKS_TEST_SURELY_UNSET_TOKEN:-fallback}\n",
        )
        .unwrap();
        assert_eq!(cfg.app.get_api_token(), "fallback");
    }

    #[test]
    fn test_set_var_is_substituted() {
        let path = env::var("PATH").unwrap();
        let (out, unset) = Config::substitute_env_vars("value: ${PATH}").unwrap();
        assert_eq!(out, format!("value: {}", path));
        assert!(unset.is_empty());
    }

    #[test]
    fn test_unset_var_is_reported() {
        let cfg = Config::from_yaml(
            "app:\n  port: 8000\n  api_token: secret\nstore:\n  database: \"${BOOKMARKS_TEST_SURELY_UNSET_DB}bookmarks.db\"\n",
        )
        .unwrap();
        assert_eq!(cfg.store.get_db(), "bookmarks.db");
        assert_eq!(cfg.unset_env_vars(), ["BOOKMARKS_TEST_SURELY_UNSET_DB".to_string()]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let cfg = Config::new(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.app.get_api_token(), "secret");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::new("/definitely/not/here/config.yaml").is_err());
    }
}
