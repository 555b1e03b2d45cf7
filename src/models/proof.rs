//! 校对数据模型
//!
//! `ProofItem` 是输入，`ProofReport` 是输出，中间产物是 `CheckResult` 和 `RevisionResult`。

use crate::models::style::StyleType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// 一条待校对的原文/译文对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofItem {
    /// 在原始文件中的位置，输出按它排序
    pub index: usize,
    #[serde(default)]
    pub name: Option<String>,
    pub source: String,
    pub target: String,
}

impl ProofItem {
    pub fn new(index: usize, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            index,
            name: None,
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// 校对发现的问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

impl Issue {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
        }
    }
}

/// 修改级别，完全由分数决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationLevel {
    None,
    Minor,
    Moderate,
    Major,
}

impl ModificationLevel {
    /// 分数阈值：85 / 75 / 50
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => ModificationLevel::None,
            75..=84 => ModificationLevel::Minor,
            50..=74 => ModificationLevel::Moderate,
            _ => ModificationLevel::Major,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModificationLevel::None => "none",
            ModificationLevel::Minor => "minor",
            ModificationLevel::Moderate => "moderate",
            ModificationLevel::Major => "major",
        }
    }

    /// 写进修改提示词的力度说明
    pub fn guidance(self) -> &'static str {
        match self {
            ModificationLevel::None => "不修改",
            ModificationLevel::Minor => "少量修正",
            ModificationLevel::Moderate => "适度润色",
            ModificationLevel::Major => "大幅修改",
        }
    }
}

impl std::fmt::Display for ModificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 第一轮校对的结构化结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub score: u32,
    pub is_correct: bool,
    pub style_type: String,
    pub comment: String,
    pub issues: Vec<Issue>,
    /// 解析失败时保留的原始响应片段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl CheckResult {
    /// 从解析后的 JSON 对象构造，缺失字段取默认值
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            score: map.get("score").map(score_from_value).unwrap_or(0),
            is_correct: map.get("is_correct").map(bool_from_value).unwrap_or(false),
            style_type: map
                .get("style_type")
                .and_then(Value::as_str)
                .map(StyleType::normalize)
                .unwrap_or_default(),
            comment: map.get("comment").map(text_from_value).unwrap_or_default(),
            issues: map.get("issues").map(issues_from_value).unwrap_or_default(),
            raw_response: map
                .get("raw_response")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// 修改结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionResult {
    pub modified_text: String,
    pub style_applied: String,
    pub changes_reason: String,
}

impl RevisionResult {
    /// 原文保持不变
    pub fn unchanged(target: &str, reason: impl Into<String>) -> Self {
        Self {
            modified_text: target.to_string(),
            style_applied: "unchanged".to_string(),
            changes_reason: reason.into(),
        }
    }
}

/// 单个条目的最终报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofReport {
    pub original_index: usize,
    pub name: Option<String>,
    pub source_text: String,
    pub target_text: String,
    pub score: u32,
    pub is_correct: bool,
    pub style_type: String,
    pub comment: String,
    pub issues: Vec<Issue>,
    pub modified_text: String,
    pub style_applied: String,
    pub changes_reason: String,
    pub modification_level: ModificationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ProofReport {
    /// 合并输入条目、校对结果和修改结果
    pub fn assemble(item: &ProofItem, check: CheckResult, revision: RevisionResult) -> Self {
        Self {
            original_index: item.index,
            name: item.name.clone(),
            source_text: item.source.clone(),
            target_text: item.target.clone(),
            score: check.score,
            is_correct: check.is_correct,
            style_type: check.style_type,
            comment: check.comment,
            issues: check.issues,
            modified_text: revision.modified_text,
            style_applied: revision.style_applied,
            changes_reason: revision.changes_reason,
            modification_level: ModificationLevel::from_score(check.score),
            error: None,
            raw_response: check.raw_response,
        }
    }

    /// 处理出错时的报告，译文保持原样
    pub fn failed(item: &ProofItem, error: &str) -> Self {
        let check = CheckResult {
            comment: format!("处理出错: {}", error),
            ..CheckResult::default()
        };
        let mut report = Self::assemble(item, check, RevisionResult::unchanged(&item.target, "processing failed"));
        report.error = Some(error.to_string());
        report
    }

    /// 处理超时时的报告，译文保持原样
    pub fn timed_out(item: &ProofItem, timeout: Duration) -> Self {
        let description = format!("处理超时 (>{:.1}s)", timeout.as_secs_f64());
        let check = CheckResult {
            comment: description.clone(),
            issues: vec![Issue::new("timeout", description.clone())],
            ..CheckResult::default()
        };
        let mut report = Self::assemble(item, check, RevisionResult::unchanged(&item.target, "processing timed out"));
        report.error = Some(description);
        report
    }

    /// 译文是否被改动
    pub fn is_modified(&self) -> bool {
        self.modified_text != self.target_text
    }
}

// ========== 宽松字段解析 ==========

fn score_from_value(value: &Value) -> u32 {
    let raw = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.round() as i64)
            .unwrap_or(0),
        _ => 0,
    };
    raw.clamp(0, 100) as u32
}

fn bool_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn text_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn issues_from_value(value: &Value) -> Vec<Issue> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(obj) => Issue {
                kind: obj
                    .get("type")
                    .map(text_from_value)
                    .unwrap_or_else(|| "unknown".to_string()),
                description: obj.get("description").map(text_from_value).unwrap_or_default(),
            },
            other => Issue::new("unknown", text_from_value(other)),
        })
        .collect()
}
