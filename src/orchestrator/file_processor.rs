//! 单个文件对处理器 - 编排层
//!
//! 读取一对中英文文件，合并为条目列表，按批次交给调度器。

use crate::error::AppResult;
use crate::models::loaders::{load_json_records, merge_records, validate_structure, FilePair};
use crate::models::proof::ProofReport;
use crate::orchestrator::batch_processor::BatchScheduler;
use serde_json::Value;
use tracing::{error, info, warn};

/// 文件对处理结果
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub pair: FilePair,
    /// 未经改动的译文记录，用于生成修改副本
    pub original_records: Vec<Value>,
    pub reports: Vec<ProofReport>,
}

/// 处理单个文件对
///
/// 文件读取或结构校验失败时返回 `Ok(None)`，由调用方跳过该文件。
pub async fn process_file_pair(
    scheduler: &BatchScheduler,
    pair: &FilePair,
    batch_size: usize,
) -> AppResult<Option<FileOutcome>> {
    info!(
        "\n🔄 正在处理文件对: {} <-> {}",
        pair.en_file.display(),
        pair.zh_file.display()
    );

    let (src, tgt) = match (load_json_records(&pair.zh_file).await, load_json_records(&pair.en_file).await) {
        (Ok(src), Ok(tgt)) => (src, tgt),
        (Err(e), _) | (_, Err(e)) => {
            error!("❌ 读取文件失败: {}", e);
            return Ok(None);
        }
    };

    info!("📄 中文条数: {}", src.len());
    info!("📄 英文条数: {}", tgt.len());

    if let Err(e) = validate_structure(&src, &tgt) {
        error!("❌ 数据结构验证失败: {}", e);
        return Ok(None);
    }

    let merged = merge_records(&src, &tgt);
    if merged.is_empty() {
        warn!("❌ 没有有效的数据可以处理");
        return Ok(None);
    }
    info!("✅ 合并完成，共 {} 条待校对", merged.len());

    let batch_size = batch_size.max(1);
    let total_batches = merged.len().div_ceil(batch_size);
    let mut reports = Vec::with_capacity(merged.len());

    for (batch_idx, batch) in merged.chunks(batch_size).enumerate() {
        info!("📦 处理批次 {}/{} ({} 条)", batch_idx + 1, total_batches, batch.len());
        reports.extend(scheduler.process(batch).await?);
    }

    Ok(Some(FileOutcome {
        pair: pair.clone(),
        original_records: tgt,
        reports,
    }))
}
