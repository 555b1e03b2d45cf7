#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use translation_proofreader::error::{AttemptFailure, RemoteServiceError};
use translation_proofreader::services::PromptTemplates;
use translation_proofreader::{ChatMessage, ProofFlow, TextService};

pub const CHECK_TEMPLATE: &str = "CHECK\n{source_text}\n{target_text}";
pub const MODIFY_TEMPLATE: &str = "MODIFY\n{source_text}\n{target_text}";

/// 单条原文的脚本
#[derive(Clone)]
pub struct Script {
    pub delay: Duration,
    pub check: Result<String, RemoteServiceError>,
    pub modify: String,
}

impl Script {
    pub fn check(reply: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            check: Ok(reply.to_string()),
            modify: "{}".to_string(),
        }
    }

    pub fn score(score: u32) -> Self {
        Self::check(&format!("{{\"score\": {}, \"is_correct\": {}}}", score, score >= 85))
    }

    pub fn failing() -> Self {
        Self {
            delay: Duration::ZERO,
            check: Err(RemoteServiceError {
                attempts: 3,
                last: AttemptFailure::BadStatus {
                    status: 500,
                    body: "internal error".to_string(),
                },
            }),
            modify: "{}".to_string(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_modify(mut self, reply: &str) -> Self {
        self.modify = reply.to_string();
        self
    }
}

/// 按原文返回预设响应的模拟服务
#[derive(Default)]
pub struct ScriptedService {
    scripts: HashMap<String, Script>,
    pub check_calls: AtomicUsize,
    pub modify_calls: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, source: &str, script: Script) -> Self {
        self.scripts.insert(source.to_string(), script);
        self
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn modify_calls(&self) -> usize {
        self.modify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextService for ScriptedService {
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, RemoteServiceError> {
        let prompt = &messages[0].content;
        let mut lines = prompt.lines();
        let kind = lines.next().unwrap_or_default();
        let source = lines.next().unwrap_or_default();
        let script = self
            .scripts
            .get(source)
            .cloned()
            .unwrap_or_else(|| Script::check("no script for this source"));

        if kind == "CHECK" {
            self.check_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(script.delay).await;
            script.check
        } else {
            self.modify_calls.fetch_add(1, Ordering::SeqCst);
            Ok(script.modify)
        }
    }
}

pub fn templates() -> PromptTemplates {
    PromptTemplates::new(CHECK_TEMPLATE, MODIFY_TEMPLATE)
}

pub fn flow(service: Arc<ScriptedService>) -> Arc<ProofFlow> {
    Arc::new(ProofFlow::new(service, templates()))
}
