/// LLM API 客户端
///
/// 封装与文本生成接口的交互：拼装请求、重试、解包响应
use crate::config::Config;
use crate::error::{AppResult, AttemptFailure, ConfigError, RemoteServiceError};
use crate::services::response_parser::flatten_content;
use crate::utils::logging::truncate_text;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

/// 远程文本服务
///
/// 输入一组消息，输出纯文本。失败只在重试耗尽后返回。
#[async_trait]
pub trait TextService: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, RemoteServiceError>;
}

/// 请求体
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: String,
    temperature: f32,
}

/// 两种已知的响应格式
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// `{"content": ...}`
    Content(Value),
    /// `{"output": [item, ...]}`，保留第一项
    Output(Value),
    /// 其他格式
    Unknown(Value),
}

impl ResponseEnvelope {
    pub fn decode(payload: Value) -> Self {
        if let Some(content) = payload.get("content") {
            return ResponseEnvelope::Content(content.clone());
        }
        match payload
            .get("output")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
        {
            Some(first) => ResponseEnvelope::Output(first.clone()),
            None => ResponseEnvelope::Unknown(payload),
        }
    }

    /// 提取文本，任何格式都能得到一个字符串
    pub fn into_text(self) -> String {
        match self {
            ResponseEnvelope::Content(content) => flatten_content(&content),
            ResponseEnvelope::Output(Value::Object(item)) => item
                .get("content")
                .or_else(|| item.get("text"))
                .map(flatten_content)
                .unwrap_or_default(),
            ResponseEnvelope::Output(other) => flatten_content(&other),
            ResponseEnvelope::Unknown(payload) => payload.to_string(),
        }
    }
}

/// LLM 客户端
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model_name: String,
    temperature: f32,
    max_retries: usize,
    retry_delay: Duration,
    rate_limit_pause: Duration,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.llm_api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "llm_api_key".to_string(),
            }
            .into());
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::ClientBuildFailed)?;

        Ok(Self {
            http,
            api_key: config.llm_api_key.clone(),
            endpoint: format!("{}/responses", config.llm_api_base_url.trim_end_matches('/')),
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
            rate_limit_pause: config.rate_limit_pause(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 单次请求
    async fn attempt(&self, input: &str) -> Result<String, AttemptFailure> {
        let body = ResponsesRequest {
            model: &self.model_name,
            input: input.to_string(),
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(AttemptFailure::RateLimited);
        }

        let text = response.text().await.map_err(classify_request_error)?;
        if status != 200 {
            return Err(AttemptFailure::BadStatus { status, body: text });
        }

        let payload: Value =
            serde_json::from_str(&text).map_err(|_| AttemptFailure::NotJson { body: text.clone() })?;

        Ok(ResponseEnvelope::decode(payload).into_text())
    }
}

#[async_trait]
impl TextService for LlmClient {
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, RemoteServiceError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        let input = build_transcript(messages);
        debug!("请求内容长度: {} 字符", input.chars().count());

        let mut last = AttemptFailure::Connection("未发起请求".to_string());
        for attempt in 1..=self.max_retries {
            match self.attempt(&input).await {
                Ok(text) => {
                    debug!("LLM API 调用成功 (第 {} 次尝试)", attempt);
                    return Ok(text);
                }
                Err(failure) => {
                    warn!(
                        "LLM API 调用失败 (尝试 {}/{}): {}",
                        attempt,
                        self.max_retries,
                        truncate_text(&failure.to_string(), 200)
                    );
                    if attempt < self.max_retries {
                        if failure == AttemptFailure::RateLimited {
                            warn!("⚠️ 遇到速率限制，等待 {:?} 后重试...", self.rate_limit_pause);
                            sleep(self.rate_limit_pause).await;
                        }
                        sleep(self.retry_delay).await;
                    }
                    last = failure;
                }
            }
        }

        Err(RemoteServiceError {
            attempts: self.max_retries,
            last,
        })
    }
}

/// 把消息列表拼成一段带角色标记的文本
pub fn build_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("[{}]: {}\n", m.role, m.content))
        .collect()
}

fn classify_request_error(err: reqwest::Error) -> AttemptFailure {
    if err.is_timeout() {
        AttemptFailure::Timeout
    } else {
        AttemptFailure::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_transcript() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("你好")];
        assert_eq!(build_transcript(&messages), "[system]: be brief\n[user]: 你好\n");
        assert_eq!(build_transcript(&[]), "");
    }

    #[test]
    fn test_envelope_content_string() {
        let env = ResponseEnvelope::decode(json!({"content": "{\"score\": 90}"}));
        assert!(matches!(env, ResponseEnvelope::Content(_)));
        assert_eq!(env.into_text(), "{\"score\": 90}");
    }

    #[test]
    fn test_envelope_content_blocks() {
        let env = ResponseEnvelope::decode(json!({"content": [{"type": "text", "text": "hello"}]}));
        assert_eq!(env.into_text(), "hello");
    }

    #[test]
    fn test_envelope_output_nested_content() {
        let payload = json!({
            "id": "resp_1",
            "output": [{"type": "message", "content": [{"type": "output_text", "text": "{\"score\": 61}"}]}]
        });
        assert_eq!(ResponseEnvelope::decode(payload).into_text(), "{\"score\": 61}");
    }

    #[test]
    fn test_envelope_output_text_field() {
        let payload = json!({"output": [{"text": "plain"}]});
        assert_eq!(ResponseEnvelope::decode(payload).into_text(), "plain");

        let payload = json!({"output": ["bare string"]});
        assert_eq!(ResponseEnvelope::decode(payload).into_text(), "bare string");

        let payload = json!({"output": [{"role": "assistant"}]});
        assert_eq!(ResponseEnvelope::decode(payload).into_text(), "");
    }

    #[test]
    fn test_envelope_unknown_shape_renders_payload() {
        let payload = json!({"choices": [1], "output": []});
        let env = ResponseEnvelope::decode(payload.clone());
        assert!(matches!(env, ResponseEnvelope::Unknown(_)));
        assert_eq!(env.into_text(), payload.to_string());

        assert_eq!(ResponseEnvelope::decode(json!(7)).into_text(), "7");
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = Config::default();
        assert!(LlmClient::new(&config).is_err());

        let config = Config {
            llm_api_key: "sk-test".to_string(),
            llm_api_base_url: "http://localhost:9/v1/".to_string(),
            ..Config::default()
        };
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/v1/responses");
    }
}
