//! 修改策略 - 业务能力层
//!
//! 根据评分决定是否需要第二轮调用来修改译文。
//! 不论修改是否成功，原译文都不会丢失。

use crate::clients::{ChatMessage, TextService};
use crate::models::proof::{ModificationLevel, RevisionResult};
use crate::services::prompts::PromptTemplates;
use crate::services::response_parser::parse_response;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_STYLE_APPLIED: &str = "unspecified style";
pub const DEFAULT_CHANGES_REASON: &str = "automatic revision";
pub const HIGH_SCORE_REASON: &str = "score high enough";

/// 是否需要修改
pub fn needs_revision(score: u32) -> bool {
    ModificationLevel::from_score(score) != ModificationLevel::None
}

/// 修改策略
pub struct RevisionPolicy {
    client: Arc<dyn TextService>,
    prompts: PromptTemplates,
}

impl RevisionPolicy {
    pub fn new(client: Arc<dyn TextService>, prompts: PromptTemplates) -> Self {
        Self { client, prompts }
    }

    /// 根据分数修改译文
    pub async fn decide(&self, source: &str, target: &str, score: u32) -> RevisionResult {
        if !needs_revision(score) {
            return RevisionResult::unchanged(target, HIGH_SCORE_REASON);
        }

        let level = ModificationLevel::from_score(score);
        debug!("分数 {} 需要修改，修改级别: {}", score, level);

        let prompt = self.prompts.render_modify(source, target, score, level.guidance());
        match self.client.send(&[ChatMessage::user(prompt)]).await {
            Ok(raw) => revision_from_response(&raw, target),
            Err(e) => {
                warn!("⚠️ 修改译文失败，保留原译文: {}", e);
                RevisionResult::unchanged(target, format!("revision failed: {}", e))
            }
        }
    }
}

/// 把修改响应转换为结果，缺失字段使用默认值
fn revision_from_response(raw: &str, target: &str) -> RevisionResult {
    let parsed = parse_response(raw);

    let text_field = |key: &str| {
        parsed
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    RevisionResult {
        modified_text: text_field("modified_text").unwrap_or_else(|| target.to_string()),
        style_applied: text_field("style_applied").unwrap_or_else(|| DEFAULT_STYLE_APPLIED.to_string()),
        changes_reason: text_field("changes_reason").unwrap_or_else(|| DEFAULT_CHANGES_REASON.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AttemptFailure, RemoteServiceError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 固定返回的模拟服务，同时记录调用次数和最后一次的提示词
    struct FixedService {
        reply: Result<String, RemoteServiceError>,
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
    }

    impl FixedService {
        fn new(reply: Result<String, RemoteServiceError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl TextService for FixedService {
        async fn send(&self, messages: &[ChatMessage]) -> Result<String, RemoteServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = messages[0].content.clone();
            self.reply.clone()
        }
    }

    fn policy(service: Arc<FixedService>) -> RevisionPolicy {
        RevisionPolicy::new(service, PromptTemplates::new("", "{source_text}|{target_text}|{score}|{guidance}"))
    }

    #[tokio::test]
    async fn test_high_score_skips_remote_call() {
        let service = FixedService::new(Ok("{}".to_string()));
        let result = policy(service.clone()).decide("源", "Target", 85).await;
        assert_eq!(result, RevisionResult::unchanged("Target", HIGH_SCORE_REASON));
        assert_eq!(result.style_applied, "unchanged");
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_low_score_uses_revision() {
        let service = FixedService::new(Ok(
            r#"{"modified_text":"The weather is nice today.","style_applied":"game-standard","changes_reason":"grammar fix"}"#
                .to_string(),
        ));
        let result = policy(service.clone()).decide("今天天气很好", "Today weather is good", 60).await;
        assert_eq!(result.modified_text, "The weather is nice today.");
        assert_eq!(result.style_applied, "game-standard");
        assert_eq!(result.changes_reason, "grammar fix");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *service.last_prompt.lock().unwrap(),
            "今天天气很好|Today weather is good|60|适度润色"
        );
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults() {
        let service = FixedService::new(Ok("好的：{\"note\": \"nothing\"}".to_string()));
        let result = policy(service).decide("源", "Target", 40).await;
        assert_eq!(result.modified_text, "Target");
        assert_eq!(result.style_applied, DEFAULT_STYLE_APPLIED);
        assert_eq!(result.changes_reason, DEFAULT_CHANGES_REASON);
    }

    #[tokio::test]
    async fn test_unparseable_revision_keeps_target() {
        let service = FixedService::new(Ok("I cannot help with that".to_string()));
        let result = policy(service).decide("源", "Target", 10).await;
        assert_eq!(result.modified_text, "Target");
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_target() {
        let service = FixedService::new(Err(RemoteServiceError {
            attempts: 3,
            last: AttemptFailure::Timeout,
        }));
        let result = policy(service).decide("源", "Target", 70).await;
        assert_eq!(result.modified_text, "Target");
        assert!(result.changes_reason.starts_with("revision failed"));
    }

    #[test]
    fn test_needs_revision_threshold() {
        assert!(needs_revision(84));
        assert!(!needs_revision(85));
        assert!(needs_revision(0));
    }
}
