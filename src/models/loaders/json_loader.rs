use crate::error::{AppError, AppResult, DataError, FileError};
use crate::models::proof::ProofItem;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 可识别的文本字段，按优先级排列
pub const POSSIBLE_TEXT_FIELDS: [&str; 4] = ["message", "text", "content", "dialogue"];

/// 一对中英文文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub base_name: String,
    pub en_file: PathBuf,
    pub zh_file: PathBuf,
}

impl FilePair {
    /// 英文文件名（修改后的副本沿用此名）
    pub fn en_file_name(&self) -> String {
        self.en_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.json", self.base_name))
    }
}

/// 检测条目的文本字段，值为 null 的字段不算
pub fn detect_text_field(record: &Value) -> Option<&'static str> {
    let obj = record.as_object()?;
    POSSIBLE_TEXT_FIELDS
        .iter()
        .copied()
        .find(|field| obj.get(*field).is_some_and(|v| !v.is_null()))
}

/// 把字段值转换为去除首尾空白的文本
pub fn extract_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => match items.first() {
            None => String::new(),
            Some(Value::String(_)) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| match v {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
            Some(first) => first.to_string().trim().to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// 读取 JSON 数组文件
pub async fn load_json_records(path: &Path) -> AppResult<Vec<Value>> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&display, e))?;

    let value: Value = serde_json::from_str(&content).map_err(|source| {
        AppError::File(FileError::JsonParseFailed {
            path: display.clone(),
            source,
        })
    })?;

    match value {
        Value::Array(records) => Ok(records),
        _ => Err(DataError::NotAnArray { path: display }.into()),
    }
}

/// 校验中英文数据结构是否一致
pub fn validate_structure(src: &[Value], tgt: &[Value]) -> Result<(), DataError> {
    if src.len() != tgt.len() {
        return Err(DataError::LengthMismatch {
            source_len: src.len(),
            target_len: tgt.len(),
        });
    }

    for (i, (s, t)) in src.iter().zip(tgt).enumerate() {
        if detect_text_field(s).is_none() {
            return Err(DataError::MissingTextField { side: "source", index: i });
        }
        if detect_text_field(t).is_none() {
            return Err(DataError::MissingTextField { side: "target", index: i });
        }

        let source_name = s.get("name").and_then(Value::as_str).filter(|n| !n.is_empty());
        let target_name = t.get("name").and_then(Value::as_str).filter(|n| !n.is_empty());
        if let (Some(sn), Some(tn)) = (source_name, target_name) {
            if sn != tn {
                tracing::warn!("⚠ 第{}条 name 不一致: {} != {}", i, sn, tn);
            }
        }
    }

    Ok(())
}

/// 合并中英文记录为待校对条目，文本为空的条目会被跳过
pub fn merge_records(src: &[Value], tgt: &[Value]) -> Vec<ProofItem> {
    let mut merged = Vec::new();

    for (i, (s, t)) in src.iter().zip(tgt).enumerate() {
        let (Some(source_field), Some(target_field)) = (detect_text_field(s), detect_text_field(t)) else {
            tracing::warn!("⚠ 第{}条字段异常，跳过", i);
            continue;
        };

        let source_text = extract_text(&s[source_field]);
        let target_text = extract_text(&t[target_field]);

        if source_text.is_empty() || target_text.is_empty() {
            tracing::warn!("⚠ 第{}条文本内容为空，跳过", i);
            continue;
        }

        merged.push(ProofItem {
            index: i,
            name: s.get("name").and_then(Value::as_str).map(str::to_string),
            source: source_text,
            target: target_text,
        });
    }

    merged
}

/// 去掉文件名中的语言后缀
fn base_name(file_name: &str, suffix: &str) -> String {
    file_name.replace(suffix, "").replace(".json", "")
}

async fn collect_json_files(folder: &Path, suffix: &str) -> AppResult<BTreeMap<String, PathBuf>> {
    let is_dir = fs::metadata(folder).await.map(|m| m.is_dir()).unwrap_or(false);
    if !is_dir {
        return Err(FileError::DirectoryNotFound {
            path: folder.display().to_string(),
        }
        .into());
    }

    let mut files = BTreeMap::new();
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder.display().to_string(), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder.display().to_string(), e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.insert(base_name(name, suffix), path.clone());
        }
    }

    Ok(files)
}

/// 查找匹配的中英文文件对，按 base_name 排序
pub async fn find_matching_files(en_folder: &Path, zh_folder: &Path) -> AppResult<Vec<FilePair>> {
    let en_files = collect_json_files(en_folder, "_en.json").await?;
    let mut zh_files = collect_json_files(zh_folder, "_zh-sc.json").await?;

    let pairs = en_files
        .into_iter()
        .filter_map(|(base_name, en_file)| {
            zh_files.remove(&base_name).map(|zh_file| FilePair {
                base_name,
                en_file,
                zh_file,
            })
        })
        .collect();

    Ok(pairs)
}

/// 解析用户的文件选择
///
/// `all` 选择全部；否则为空格分隔的 1 起始编号，越界编号被忽略。
/// 含非数字时返回 `None`。
pub fn parse_selection(input: &str, total: usize) -> Option<Vec<usize>> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Some((0..total).collect());
    }

    let mut selected = Vec::new();
    for token in input.split_whitespace() {
        let number: usize = token.parse().ok()?;
        if (1..=total).contains(&number) {
            selected.push(number - 1);
        }
    }
    Some(selected)
}
