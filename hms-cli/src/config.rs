//! 配置管理
//!
//! 加载顺序：内置默认值 → 可选的TOML配置文件 → `HMS__` 前缀的环境变量，
//! 例如 `HMS__API__BASE_URL=http://backend:8000`。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use hms_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// 门户完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// 后端接口配置
    pub api: ApiConfig,
    /// 会话存储配置
    pub session: SessionConfig,
    /// 页面行为配置
    pub portal: PageConfig,
}

/// 后端接口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 后端根地址
    pub base_url: String,
    /// 请求超时时间（秒）
    pub request_timeout_secs: u64,
}

/// 会话存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 会话文件路径
    pub storage_path: String,
}

/// 页面行为配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// 提交成功后跳转前的等待时间（毫秒）
    pub redirect_delay_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                request_timeout_secs: 30,
            },
            session: SessionConfig {
                storage_path: "./.hms/session.json".to_string(),
            },
            portal: PageConfig {
                redirect_delay_ms: 1500,
            },
        }
    }
}

impl PortalConfig {
    /// 加载配置；`path` 给出时文件必须存在，否则尝试当前目录下可选的 `hms.toml`
    pub fn load(path: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name("hms").required(false),
        };

        let settings = Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.request_timeout_secs", defaults.api.request_timeout_secs)?
            .set_default("session.storage_path", defaults.session.storage_path)?
            .set_default("portal.redirect_delay_ms", defaults.portal.redirect_delay_ms)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("HMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        let config: PortalConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        ConfigValidator::new().validate(&config)?;
        info!("Configuration loaded, backend at {}", config.api.base_url);
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            request_timeout: Duration::from_secs(self.api.request_timeout_secs),
        }
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.portal.redirect_delay_ms)
    }

    /// 以TOML格式输出生效的配置
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    rules: Vec<ValidationRule>,
}

#[derive(Debug)]
struct ValidationRule {
    field_path: &'static str,
    check: fn(&PortalConfig) -> bool,
    error_message: &'static str,
}

impl ConfigValidator {
    pub fn new() -> Self {
        let rules = vec![
            ValidationRule {
                field_path: "api.base_url",
                check: |config| !config.api.base_url.trim().is_empty(),
                error_message: "API base URL cannot be empty",
            },
            ValidationRule {
                field_path: "api.request_timeout_secs",
                check: |config| config.api.request_timeout_secs > 0,
                error_message: "Request timeout cannot be 0",
            },
            ValidationRule {
                field_path: "session.storage_path",
                check: |config| !config.session.storage_path.trim().is_empty(),
                error_message: "Session storage path cannot be empty",
            },
        ];

        Self { rules }
    }

    pub fn validate(&self, config: &PortalConfig) -> Result<()> {
        for rule in &self.rules {
            if !(rule.check)(config) {
                error!("Configuration validation failed for {}", rule.field_path);
                anyhow::bail!("{}: {}", rule.field_path, rule.error_message);
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
