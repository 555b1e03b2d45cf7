//! 条目校对流程 - 流程层
//!
//! 核心职责：定义"一条翻译"的完整处理流程
//!
//! 流程顺序：
//! 1. 校对提示词 → 远程服务 → 解析 → 评分
//! 2. 修改策略（分数不足时第二次调用）
//! 3. 组装报告

use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::{ChatMessage, TextService};
use crate::error::AppResult;
use crate::models::proof::{CheckResult, ProofItem, ProofReport};
use crate::services::prompts::PromptTemplates;
use crate::services::response_parser::parse_response;
use crate::services::revision_policy::RevisionPolicy;
use crate::utils::logging::truncate_text;

/// 条目校对流程
///
/// - 不持有任何可变状态，可以在多个任务间共享
/// - 第一次调用失败返回错误，由调度层转换为错误报告
/// - 修改阶段的失败在修改策略内部消化
pub struct ProofFlow {
    client: Arc<dyn TextService>,
    prompts: PromptTemplates,
    revision: RevisionPolicy,
}

impl ProofFlow {
    pub fn new(client: Arc<dyn TextService>, prompts: PromptTemplates) -> Self {
        Self {
            revision: RevisionPolicy::new(Arc::clone(&client), prompts.clone()),
            client,
            prompts,
        }
    }

    /// 第一轮：校对评分
    pub async fn check(&self, item: &ProofItem) -> AppResult<CheckResult> {
        let prompt = self.prompts.render_check(&item.source, &item.target);
        let raw = self.client.send(&[ChatMessage::user(prompt)]).await?;
        debug!("[条目 {}] 校对响应: {}", item.index, truncate_text(&raw, 120));
        Ok(CheckResult::from_map(&parse_response(&raw)))
    }

    pub async fn run(&self, item: &ProofItem) -> AppResult<ProofReport> {
        let check = self.check(item).await?;
        info!("[条目 {}] 评分: {}", item.index, check.score);

        let revision = self.revision.decide(&item.source, &item.target, check.score).await;
        let report = ProofReport::assemble(item, check, revision);
        if report.is_modified() {
            info!(
                "[条目 {}] ✏️ 已修改 ({}): {}",
                item.index,
                report.modification_level,
                truncate_text(&report.modified_text, 60)
            );
        }

        Ok(report)
    }
}
