use crate::common::AppResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use url::Url;

const CONFIG_FILE: &str = "config.toml";

// 全局配置实例
static CONFIG: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub token_url: String,        // 获取 token 的地址
    pub availability_url: String, // 查询可用日期的地址 (不含 sku 参数)
    pub skus: Vec<String>,        // 查询的 sku 列表
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api: ApiConfig {
                token_url: "https://disneyland.disney.go.com/com-shared/api/get-token/".to_string(),
                availability_url:
                    "https://cme-dlr.wdprapps.disney.com/availability/api/v2/availabilities/"
                        .to_string(),
                skus: vec!["66282".to_string(), "66283".to_string()],
                user_agent:
                    "Mozilla/5.0 (X11; Linux x86_64; rv:98.0) Gecko/20100101 Firefox/98.0"
                        .to_string(),
            },
            storage: StorageConfig {
                output_file: PathBuf::from("availability.json"),
            },
            log: LogConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn global() -> &'static Settings {
        CONFIG.get_or_init(|| {
            Self::load_from(CONFIG_FILE).unwrap_or_else(|e| {
                panic!("Failed to initialize config: {}", e);
            })
        })
    }

    /// 读取配置文件，不存在时使用默认配置 (不写出文件)
    pub fn load_from(path: impl AsRef<Path>) -> AppResult<Self> {
        let config = match fs::read_to_string(path.as_ref()) {
            Ok(content) => toml::from_str(&content)?,
            Err(_) => Settings::default(),
        };

        Ok(config)
    }
}

impl ApiConfig {
    /// 带上全部 sku 查询参数的完整地址
    pub fn availability_endpoint(&self) -> AppResult<Url> {
        let mut url = Url::parse(&self.availability_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            for sku in &self.skus {
                pairs.append_pair("sku", sku);
            }
        }
        Ok(url)
    }
}
