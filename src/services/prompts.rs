//! 提示词模板
//!
//! 模板使用具名占位符，渲染时做纯文本替换，模板中的 JSON 花括号不需要转义。

use crate::config::Config;

/// 校对评分提示词
pub const DEFAULT_CHECK_PROMPT: &str = r#"你是翻译校对员，请评估以下翻译质量并返回JSON：

中文: {source_text}
英文: {target_text}

返回格式：
{
    "score": 0-100的整数分数,
    "is_correct": true/false,
    "style_type": "game-standard / formal / casual / literary / technical 之一",
    "comment": "简要评价",
    "issues": [{"type": "问题类型", "description": "问题描述"}]
}

要求：必须返回有效的JSON"#;

/// 翻译修改提示词
pub const DEFAULT_MODIFY_PROMPT: &str = r#"你是翻译编辑，请根据评分修改英文翻译：

中文: {source_text}
英文: {target_text}
当前评分: {score}
修改力度: {guidance}

修改策略：
分数<50：大幅修改
50-75：适度润色
75-85：少量修正
≥85：不修改

返回格式：
{
    "modified_text": "修改后的英文翻译",
    "style_applied": "采用的风格",
    "changes_reason": "修改原因"
}

要求：必须返回有效的JSON，modified_text是完整的新翻译"#;

/// 校对与修改两套模板
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub check: String,
    pub modify: String,
}

impl PromptTemplates {
    pub fn new(check: impl Into<String>, modify: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            modify: modify.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.check_prompt.clone(), config.modify_prompt.clone())
    }

    /// 渲染校对提示词
    pub fn render_check(&self, source_text: &str, target_text: &str) -> String {
        fill(&self.check, &[("{source_text}", source_text), ("{target_text}", target_text)])
    }

    /// 渲染修改提示词
    pub fn render_modify(
        &self,
        source_text: &str,
        target_text: &str,
        score: u32,
        guidance: &str,
    ) -> String {
        let score = score.to_string();
        fill(
            &self.modify,
            &[
                ("{source_text}", source_text),
                ("{target_text}", target_text),
                ("{score}", score.as_str()),
                ("{guidance}", guidance),
            ],
        )
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_PROMPT, DEFAULT_MODIFY_PROMPT)
    }
}

// 单次扫描替换，避免被替换进来的文本里的占位符再次被展开
fn fill(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'outer: while !rest.is_empty() {
        for (key, value) in pairs {
            if let Some(stripped) = rest.strip_prefix(key) {
                out.push_str(value);
                rest = stripped;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_check_fills_placeholders() {
        let prompts = PromptTemplates::default();
        let prompt = prompts.render_check("今天天气很好", "Today weather is good");
        assert!(prompt.contains("中文: 今天天气很好"));
        assert!(prompt.contains("英文: Today weather is good"));
        assert!(prompt.contains("\"score\""));
        assert!(!prompt.contains("{source_text}"));
    }

    #[test]
    fn test_render_modify_includes_score_and_guidance() {
        let prompts = PromptTemplates::new("", "S={source_text} T={target_text} {score}/{guidance}");
        let prompt = prompts.render_modify("源", "tgt", 60, "适度润色");
        assert_eq!(prompt, "S=源 T=tgt 60/适度润色");
    }

    #[test]
    fn test_injected_text_is_not_expanded_again() {
        let prompts = PromptTemplates::new("{source_text} | {target_text}", "");
        let prompt = prompts.render_check("literal {target_text}", "x");
        assert_eq!(prompt, "literal {target_text} | x");
    }
}
