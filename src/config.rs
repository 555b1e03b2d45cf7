use crate::error::{AppError, AppResult, ConfigError};
use crate::services::prompts::{DEFAULT_CHECK_PROMPT, DEFAULT_MODIFY_PROMPT};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "proofreader.toml";

/// 程序配置
///
/// 所有组件都在构造时接收一份配置，不读取任何全局状态。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    /// 单次调用的最大尝试次数
    pub max_retries: usize,
    /// 两次尝试之间的固定间隔
    pub retry_delay_ms: u64,
    /// 遇到 429 时额外暂停的时间
    pub rate_limit_pause_ms: u64,
    /// 单个 HTTP 请求的超时
    pub request_timeout_secs: u64,
    // --- 调度配置 ---
    /// 同时校对的条目数量
    pub max_workers: usize,
    /// 单个条目的处理超时
    pub item_timeout_secs: u64,
    /// 进度检查间隔
    pub poll_interval_ms: u64,
    /// 每批条目数量
    pub batch_size: usize,
    // --- 文件配置 ---
    pub en_folder: String,
    pub zh_folder: String,
    pub modified_folder: String,
    pub report_folder: String,
    /// 非交互式文件选择（"all" 或 "1 3 4"），为空时从标准输入读取
    pub file_selection: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 提示词模板 ---
    pub check_prompt: String,
    pub modify_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://yunwu.ai/v1".to_string(),
            llm_model_name: "gpt-5.2".to_string(),
            temperature: 0.0,
            max_retries: 3,
            retry_delay_ms: 2000,
            rate_limit_pause_ms: 5000,
            request_timeout_secs: 30,
            max_workers: 3,
            item_timeout_secs: 120,
            poll_interval_ms: 500,
            batch_size: 3,
            en_folder: "input_en".to_string(),
            zh_folder: "input_zh-sc".to_string(),
            modified_folder: "output/en_modified".to_string(),
            report_folder: "report".to_string(),
            file_selection: None,
            verbose_logging: false,
            check_prompt: DEFAULT_CHECK_PROMPT.to_string(),
            modify_prompt: DEFAULT_MODIFY_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置文件（可选）→ 环境变量，最后校验
    pub fn load() -> AppResult<Self> {
        let base = Self::load_base(std::env::var("PROOFREADER_CONFIG").ok())?;
        let config = base.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 读取基础配置
    ///
    /// 显式指定的路径必须存在；未指定时默认文件缺失则使用默认值。
    fn load_base(explicit: Option<String>) -> AppResult<Self> {
        if let Some(path) = explicit {
            info!("📄 读取配置文件: {}", path);
            return Self::from_file(&path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            info!("📄 读取配置文件: {}", DEFAULT_CONFIG_FILE);
            Self::from_file(DEFAULT_CONFIG_FILE)
        } else {
            debug!("未找到配置文件 {}，使用默认配置", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            })
        })
    }

    /// 使用环境变量覆盖配置
    pub fn apply_env(self) -> AppResult<Self> {
        let mut config = Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.temperature),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_retries),
            retry_delay_ms: std::env::var("RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.retry_delay_ms),
            rate_limit_pause_ms: std::env::var("RATE_LIMIT_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.rate_limit_pause_ms),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            max_workers: std::env::var("MAX_WORKERS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_workers),
            item_timeout_secs: std::env::var("ITEM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.item_timeout_secs),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.poll_interval_ms),
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.batch_size),
            en_folder: std::env::var("EN_FOLDER").unwrap_or(self.en_folder),
            zh_folder: std::env::var("ZH_FOLDER").unwrap_or(self.zh_folder),
            modified_folder: std::env::var("MODIFIED_FOLDER").unwrap_or(self.modified_folder),
            report_folder: std::env::var("REPORT_FOLDER").unwrap_or(self.report_folder),
            file_selection: std::env::var("FILE_SELECTION").ok().or(self.file_selection),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            check_prompt: self.check_prompt,
            modify_prompt: self.modify_prompt,
        };

        if let Ok(path) = std::env::var("CHECK_PROMPT_FILE") {
            config.check_prompt = std::fs::read_to_string(&path).map_err(|e| AppError::file_read_failed(&path, e))?;
        }
        if let Ok(path) = std::env::var("MODIFY_PROMPT_FILE") {
            config.modify_prompt = std::fs::read_to_string(&path).map_err(|e| AppError::file_read_failed(&path, e))?;
        }

        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.max_workers == 0 {
            return Err(AppError::invalid_config("max_workers", self.max_workers, "必须大于 0"));
        }
        if self.batch_size == 0 {
            return Err(AppError::invalid_config("batch_size", self.batch_size, "必须大于 0"));
        }
        if self.max_retries == 0 {
            return Err(AppError::invalid_config("max_retries", self.max_retries, "必须大于 0"));
        }
        if self.item_timeout_secs == 0 {
            return Err(AppError::invalid_config("item_timeout_secs", self.item_timeout_secs, "必须大于 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::invalid_config("request_timeout_secs", self.request_timeout_secs, "必须大于 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(AppError::invalid_config("poll_interval_ms", self.poll_interval_ms, "必须大于 0"));
        }
        if self.check_prompt.trim().is_empty() {
            return Err(ConfigError::Missing { key: "check_prompt".to_string() }.into());
        }
        if self.modify_prompt.trim().is_empty() {
            return Err(ConfigError::Missing { key: "modify_prompt".to_string() }.into());
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rate_limit_pause(&self) -> Duration {
        Duration::from_millis(self.rate_limit_pause_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.item_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
