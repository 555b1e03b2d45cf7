//! 批次调度器 - 编排层
//!
//! ## 职责
//!
//! 把一个批次的条目分发给并发任务，收集结果并按原始顺序返回。
//!
//! ## 核心功能
//!
//! 1. **并发控制**：使用 Semaphore 限制同时处理的条目数量
//! 2. **单条超时**：每个条目在独立的超时内完成，超时记为超时报告
//! 3. **故障隔离**：单个条目出错只影响自身，转换为错误报告
//! 4. **顺序恢复**：完成顺序不确定，最后按 `original_index` 排序
//!
//! 每个输入条目都恰好产生一份报告。

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::proof::{ProofItem, ProofReport};
use crate::workflow::ProofFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 调度参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub max_workers: usize,
    pub item_timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&Config> for SchedulerSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_workers: config.max_workers,
            item_timeout: config.item_timeout(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// 批次调度器
pub struct BatchScheduler {
    flow: Arc<ProofFlow>,
    semaphore: Arc<Semaphore>,
    settings: SchedulerSettings,
}

impl BatchScheduler {
    /// 创建调度器，参数不合法时失败
    pub fn new(flow: Arc<ProofFlow>, settings: SchedulerSettings) -> AppResult<Self> {
        if settings.max_workers == 0 {
            return Err(AppError::invalid_config("max_workers", 0, "必须大于 0"));
        }
        if settings.item_timeout.is_zero() {
            return Err(AppError::invalid_config("item_timeout", "0", "必须大于 0"));
        }
        if settings.poll_interval.is_zero() {
            return Err(AppError::invalid_config("poll_interval", "0", "必须大于 0"));
        }

        Ok(Self {
            flow,
            semaphore: Arc::new(Semaphore::new(settings.max_workers)),
            settings,
        })
    }

    /// 处理一个批次，返回按 `original_index` 升序排列的报告
    pub async fn process(&self, batch: &[ProofItem]) -> AppResult<Vec<ProofReport>> {
        let total = batch.len();
        let mut tasks = JoinSet::new();

        // 为本批创建并发任务
        for (slot, item) in batch.iter().enumerate() {
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(format!("工作池已关闭: {}", e)))?;

            let flow = Arc::clone(&self.flow);
            let item = item.clone();
            let item_timeout = self.settings.item_timeout;

            tasks.spawn(async move {
                let _permit = permit;
                let report = match timeout(item_timeout, flow.run(&item)).await {
                    Ok(Ok(report)) => report,
                    Ok(Err(e)) => {
                        error!("[条目 {}] ❌ 处理过程中发生错误: {}", item.index, e);
                        ProofReport::failed(&item, &e.to_string())
                    }
                    Err(_) => {
                        warn!("[条目 {}] ⏱️ 处理超时 ({:?})，保留原译文", item.index, item_timeout);
                        ProofReport::timed_out(&item, item_timeout)
                    }
                };
                (slot, report)
            });
        }

        // 等待本批所有任务完成
        let mut slots: Vec<Option<ProofReport>> = (0..total).map(|_| None).collect();
        let mut completed = 0;
        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok((slot, report))) => {
                        slots[slot] = Some(report);
                        completed += 1;
                    }
                    Some(Err(e)) => {
                        error!("任务执行失败: {}", e);
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    debug!("批次进度: {}/{}", completed, total);
                }
            }
        }

        let mut reports: Vec<ProofReport> = slots
            .into_iter()
            .zip(batch)
            .map(|(report, item)| {
                report.unwrap_or_else(|| {
                    error!("[条目 {}] 任务异常终止，生成错误报告", item.index);
                    ProofReport::failed(item, "任务异常终止")
                })
            })
            .collect();
        reports.sort_by_key(|r| r.original_index);

        info!("✓ 批次完成: {}/{} 条", reports.len(), total);
        Ok(reports)
    }
}
