use std::path::{Path, PathBuf};

use config::{Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// products.json 和 history.json 所在目录
    pub data_dir: PathBuf,
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// pretty | json
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                request_timeout_secs: 30,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
                history_limit: pricing::HISTORY_LIMIT,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl Config {
    /// 加载配置：内置默认值 -> `<dir>/application.toml`（可选）-> `APP__` 环境变量
    ///
    /// `config_dir` 为空时读取 `CONFIG_PATH`，再没有就用 `./config`。
    pub fn load(config_dir: Option<&str>) -> Result<Self, AppError> {
        let config_path = match config_dir {
            Some(dir) => dir.to_string(),
            None => dotenvy::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string()),
        };

        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(File::from(Path::new(&config_path).join("application.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let config: Config = config.try_deserialize()?;

        Ok(config)
    }

    pub fn products_path(&self) -> PathBuf {
        self.storage.data_dir.join("products.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.storage.data_dir.join("history.json")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
