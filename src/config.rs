use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError, FileError};
use crate::workflow::RetryPolicy;

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "ROBOT_ORDER_CONFIG";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 下单页面 URL
    pub target_url: String,
    /// 订单 CSV 下载地址
    pub orders_csv_url: String,
    /// 订单 CSV 本地缓存文件（每次运行覆盖）
    pub orders_cache_file: String,
    /// 输出根目录
    pub output_dir: String,
    /// 每次页面交互前的延迟（毫秒）
    pub slow_mo_ms: u64,
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 浏览器可执行文件路径，不填则自动查找
    pub chrome_executable: Option<String>,
    /// 浏览器调试端口；设置后连接已有浏览器而不是启动新的
    pub browser_debug_port: Option<u16>,
    /// 提交订单最多尝试次数
    pub submit_max_attempts: u32,
    /// 两次提交之间的等待（毫秒）
    pub submit_backoff_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 页面元素选择器
    pub selectors: FormSelectors,
}

/// 下单页面用到的全部选择器
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FormSelectors {
    pub head: String,
    /// body 是单选框，实际选择器为 `{body_radio_prefix}{body}`
    pub body_radio_prefix: String,
    pub legs: String,
    pub address: String,
    pub preview: String,
    pub order: String,
    pub receipt: String,
    pub preview_image: String,
    pub order_another: String,
    pub popup: String,
    pub popup_close: String,
}

impl Default for FormSelectors {
    fn default() -> Self {
        Self {
            head: "#head".to_string(),
            body_radio_prefix: "#id-body-".to_string(),
            legs: "input[placeholder='Enter the part number for the legs']".to_string(),
            address: "#address".to_string(),
            preview: "#preview".to_string(),
            order: "#order".to_string(),
            receipt: "#receipt".to_string(),
            preview_image: "#robot-preview-image".to_string(),
            order_another: "#order-another".to_string(),
            popup: ".modal-content".to_string(),
            popup_close: ".modal-content button".to_string(),
        }
    }
}

impl FormSelectors {
    pub fn body_radio(&self, body: &str) -> String {
        format!("{}{}", self.body_radio_prefix, body)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://robotsparebinindustries.com/#/robot-order".to_string(),
            orders_csv_url: "https://robotsparebinindustries.com/orders.csv".to_string(),
            orders_cache_file: "orders.csv".to_string(),
            output_dir: "output".to_string(),
            slow_mo_ms: 100,
            headless: true,
            chrome_executable: None,
            browser_debug_port: None,
            submit_max_attempts: 5,
            submit_backoff_ms: 1000,
            verbose_logging: false,
            selectors: FormSelectors::default(),
        }
    }
}

impl Config {
    /// 加载配置：可选的 TOML 文件 → 环境变量覆盖 → 校验
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> AppResult<Self> {
        let config = Self::default().with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，缺失的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content).map_err(|source| {
            FileError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
            .into()
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            target_url: std::env::var("TARGET_URL").unwrap_or(self.target_url),
            orders_csv_url: std::env::var("ORDERS_CSV_URL").unwrap_or(self.orders_csv_url),
            orders_cache_file: std::env::var("ORDERS_CACHE_FILE").unwrap_or(self.orders_cache_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            slow_mo_ms: env_parse("SLOW_MO_MS", "u64")?.unwrap_or(self.slow_mo_ms),
            headless: env_parse("HEADLESS", "bool")?.unwrap_or(self.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(self.chrome_executable),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", "u16")?.or(self.browser_debug_port),
            submit_max_attempts: env_parse("SUBMIT_MAX_ATTEMPTS", "u32")?.unwrap_or(self.submit_max_attempts),
            submit_backoff_ms: env_parse("SUBMIT_BACKOFF_MS", "u64")?.unwrap_or(self.submit_backoff_ms),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            selectors: self.selectors,
        })
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.submit_max_attempts == 0 {
            return Err(invalid("submit_max_attempts", "至少需要尝试 1 次"));
        }
        if self.target_url.trim().is_empty() {
            return Err(invalid("target_url", "不能为空"));
        }
        if self.orders_csv_url.trim().is_empty() {
            return Err(invalid("orders_csv_url", "不能为空"));
        }
        if self.output_dir.trim().is_empty() {
            return Err(invalid("output_dir", "不能为空"));
        }
        Ok(())
    }

    pub fn slow_mo(&self) -> Duration {
        Duration::from_millis(self.slow_mo_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.submit_max_attempts,
            Duration::from_millis(self.submit_backoff_ms),
        )
    }
}

fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::AppError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
