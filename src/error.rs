use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远程文本服务错误（重试耗尽）
    #[error("远程服务错误: {0}")]
    Remote(#[from] RemoteServiceError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 翻译数据结构错误
    #[error("数据错误: {0}")]
    Data(#[from] DataError),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 远程文本服务调用失败
///
/// 只在所有重试都失败之后产生，携带最后一次尝试的失败原因。
#[derive(Debug, Clone, Error)]
#[error("远程服务调用失败 (已尝试 {attempts} 次): {last}")]
pub struct RemoteServiceError {
    pub attempts: usize,
    pub last: AttemptFailure,
}

/// 单次请求的失败原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    /// 请求超时
    #[error("API请求超时")]
    Timeout,
    /// 网络连接错误
    #[error("网络连接错误: {0}")]
    Connection(String),
    /// 速率限制 (HTTP 429)
    #[error("遇到速率限制 (HTTP 429)")]
    RateLimited,
    /// 非 200 响应
    #[error("API请求失败: {status} {body}")]
    BadStatus { status: u16, body: String },
    /// 响应体不是 JSON
    #[error("API返回不是JSON: {body}")]
    NotJson { body: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {key} 的值 '{value}' 不合法: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
    /// 缺少必要配置
    #[error("缺少必要配置: {key}")]
    Missing { key: String },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端构建失败: {0}")]
    ClientBuildFailed(#[source] reqwest::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("JSON格式错误 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 翻译数据结构错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 顶层不是数组
    #[error("文件 {path} 的顶层结构不是数组")]
    NotAnArray { path: String },
    /// 条目数量不一致
    #[error("条目数量不一致: {source_len} != {target_len}")]
    LengthMismatch { source_len: usize, target_len: usize },
    /// 找不到文本字段
    #[error("{side} 第{index}条找不到文本字段 (message/text/content/dialogue)")]
    MissingTextField { side: &'static str, index: usize },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建配置值不合法错误
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            expected: expected.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_carries_last_failure() {
        let err = RemoteServiceError {
            attempts: 3,
            last: AttemptFailure::BadStatus {
                status: 502,
                body: "bad gateway".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("3"));
        assert!(msg.contains("502"));
        assert!(msg.contains("bad gateway"));
    }

    #[test]
    fn test_app_error_from_remote() {
        let err: AppError = RemoteServiceError {
            attempts: 1,
            last: AttemptFailure::Timeout,
        }
        .into();
        assert!(matches!(err, AppError::Remote(_)));
    }
}
