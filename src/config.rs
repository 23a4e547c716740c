use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "libreria")]
#[command(about = "Runs the libreria catalog service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".libreria")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_database() -> String {
    "catalog.db".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for App {
    fn default() -> Self {
        App {
            database: default_database(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// In-memory databases are kept as-is, file names are resolved against the data directory.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        if self.database == ":memory:" {
            PathBuf::from(&self.database)
        } else {
            data_dir.join(&self.database)
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for Log {
    fn default() -> Self {
        Log {
            format: LogFormat::default(),
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Loads the config file at `path`, falling back to defaults when it does not exist.
    pub fn new(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            let Some(end) = result[actual_start..].find('}') else {
                break;
            };
            let var_name = &result[actual_start + 2..actual_start + end];

            // ${VAR:-default}
            let env_value = match var_name.split_once(":-") {
                Some((actual_var, default_val)) => {
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                }
                None => env::var(var_name).unwrap_or_else(|_| {
                    tracing::warn!(var = var_name, "environment variable not found");
                    String::new()
                }),
            };

            result.replace_range(actual_start..actual_start + end + 1, &env_value);
            offset = actual_start + env_value.len();
        }

        Ok(result)
    }
}
