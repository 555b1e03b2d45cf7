//! 报告写入服务 - 业务能力层
//!
//! 负责汇总统计、生成修改后的译文副本和报告文件。输入文件从不改动。

use crate::error::{AppError, AppResult};
use crate::models::loaders::detect_text_field;
use crate::models::proof::ProofReport;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 汇总报告文件名
pub const SUMMARY_FILE_NAME: &str = "summary_report.json";

/// 汇总统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_items: usize,
    pub correct_items: usize,
    pub incorrect_items: usize,
    /// 百分比，保留两位小数
    pub accuracy_rate: f64,
    pub average_score: f64,
    pub issue_statistics: BTreeMap<String, usize>,
    pub modification_statistics: BTreeMap<String, usize>,
}

impl Summary {
    pub fn from_reports(reports: &[ProofReport]) -> Self {
        let total_items = reports.len();
        let correct_items = reports.iter().filter(|r| r.is_correct).count();

        let (accuracy_rate, average_score) = if total_items == 0 {
            (0.0, 0.0)
        } else {
            let score_sum: u64 = reports.iter().map(|r| u64::from(r.score)).sum();
            (
                round2(correct_items as f64 / total_items as f64 * 100.0),
                round2(score_sum as f64 / total_items as f64),
            )
        };

        let mut issue_statistics = BTreeMap::new();
        let mut modification_statistics = BTreeMap::new();
        for report in reports {
            *modification_statistics
                .entry(report.modification_level.as_str().to_string())
                .or_insert(0) += 1;
            for issue in &report.issues {
                *issue_statistics.entry(issue.kind.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total_items,
            correct_items,
            incorrect_items: total_items - correct_items,
            accuracy_rate,
            average_score,
            issue_statistics,
            modification_statistics,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 把修改结果写回原始译文记录，返回修改条数
pub fn apply_modifications(records: &mut [Value], reports: &[ProofReport]) -> usize {
    let mut modified = 0;
    for report in reports.iter().filter(|r| r.is_modified()) {
        let Some(record) = records.get_mut(report.original_index) else {
            continue;
        };
        if let Some(field) = detect_text_field(record) {
            record[field] = Value::String(report.modified_text.clone());
            modified += 1;
        }
    }
    modified
}

/// 报告写入服务
pub struct ReportWriter {
    modified_dir: PathBuf,
    report_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(modified_dir: impl Into<PathBuf>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            modified_dir: modified_dir.into(),
            report_dir: report_dir.into(),
        }
    }

    /// 创建输出目录
    pub async fn prepare(&self) -> AppResult<()> {
        for dir in [&self.modified_dir, &self.report_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;
        }
        Ok(())
    }

    /// 写入单个文件的修改副本和报告，返回修改条数
    pub async fn write_file_outputs(
        &self,
        file_name: &str,
        base_name: &str,
        original_records: &[Value],
        reports: &[ProofReport],
    ) -> AppResult<usize> {
        let mut records = original_records.to_vec();
        let modified_count = apply_modifications(&mut records, reports);

        save_json(&self.modified_dir.join(file_name), &records).await?;

        let file_report = json!({
            "file_info": {
                "filename": file_name,
                "base_name": base_name,
                "total_items": reports.len(),
                "modified_items": modified_count,
            },
            "reports": reports,
        });
        save_json(&self.report_dir.join(format!("{}_report.json", base_name)), &file_report).await?;

        Ok(modified_count)
    }

    /// 写入汇总报告，返回文件路径
    pub async fn write_summary(&self, reports: &[ProofReport]) -> AppResult<(Summary, PathBuf)> {
        let summary = Summary::from_reports(reports);
        let path = self.report_dir.join(SUMMARY_FILE_NAME);
        let document = json!({
            "summary": &summary,
            "generated_at": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "detailed_reports": reports,
        });
        save_json(&path, &document).await?;
        Ok((summary, path))
    }
}

async fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> AppResult<()> {
    let content = serde_json::to_string_pretty(data).map_err(|e| AppError::Other(e.to_string()))?;
    fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    debug!("已写入: {}", path.display());
    Ok(())
}
