//! 模型响应解析 - 业务能力层
//!
//! 把模型返回的自由文本转换为 JSON 对象。模型经常在 JSON 前后附带说明文字或
//! 代码块标记，这里按顺序尝试：整体解析 → 截取第一个 `{` 到最后一个 `}` → 兜底结果。
//! 任何输入都不会导致失败，返回值里一定有 `score` 和 `comment`。

use crate::utils::logging::truncate_text;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// 兜底结果的评语
pub const FORMAT_ERROR_COMMENT: &str = "response format error";

/// 兜底结果中保留的原始响应长度
const RAW_PREVIEW_CHARS: usize = 200;

static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON span pattern is valid"));

/// 把富结构（例如内容块列表）展开成文本
///
/// 列表取第一个元素的 `text` 字段，取不到时渲染整个值。
pub fn flatten_content(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => match items.first() {
            Some(Value::Object(block)) => match block.get("text") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => value.to_string(),
            },
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// 解析任意 JSON 值形式的响应
pub fn parse_value(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        other => parse_response(&flatten_content(other)),
    }
}

/// 解析文本响应
pub fn parse_response(raw: &str) -> Map<String, Value> {
    if let Some(map) = parse_object(raw.trim()) {
        return map;
    }

    if let Some(span) = JSON_SPAN.find(raw) {
        if let Some(map) = parse_object(span.as_str()) {
            debug!("从响应中截取到 JSON 片段 ({} 字符)", span.as_str().chars().count());
            return map;
        }
    }

    warn!("⚠️ 无法从模型响应中解析 JSON: {}", truncate_text(raw, 80));
    fallback(raw)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn fallback(raw: &str) -> Map<String, Value> {
    let value = json!({
        "is_correct": false,
        "issues": [],
        "score": 0,
        "comment": FORMAT_ERROR_COMMENT,
        "raw_response": truncate_text(raw, RAW_PREVIEW_CHARS),
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
