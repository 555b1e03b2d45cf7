use phf::phf_map;

/// 译文风格标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleType {
    /// 游戏标准用语
    GameStandard,
    /// 正式书面
    Formal,
    /// 口语化
    Casual,
    /// 文学化
    Literary,
    /// 技术文档
    Technical,
}

/// 模型可能返回的风格写法（全部小写）
static STYLE_ALIASES: phf::Map<&'static str, StyleType> = phf_map! {
    "game-standard" => StyleType::GameStandard,
    "game_standard" => StyleType::GameStandard,
    "game standard" => StyleType::GameStandard,
    "game" => StyleType::GameStandard,
    "游戏标准" => StyleType::GameStandard,
    "游戏" => StyleType::GameStandard,
    "formal" => StyleType::Formal,
    "正式" => StyleType::Formal,
    "书面" => StyleType::Formal,
    "casual" => StyleType::Casual,
    "informal" => StyleType::Casual,
    "口语" => StyleType::Casual,
    "口语化" => StyleType::Casual,
    "literary" => StyleType::Literary,
    "文学" => StyleType::Literary,
    "文学化" => StyleType::Literary,
    "technical" => StyleType::Technical,
    "技术" => StyleType::Technical,
};

impl StyleType {
    /// 获取标准标签
    pub fn label(self) -> &'static str {
        match self {
            StyleType::GameStandard => "game-standard",
            StyleType::Formal => "formal",
            StyleType::Casual => "casual",
            StyleType::Literary => "literary",
            StyleType::Technical => "technical",
        }
    }

    /// 从模型返回的文本解析风格
    pub fn parse(raw: &str) -> Option<Self> {
        STYLE_ALIASES.get(raw.trim().to_lowercase().as_str()).copied()
    }

    /// 规范化风格标签，无法识别时原样保留
    pub fn normalize(raw: &str) -> String {
        match Self::parse(raw) {
            Some(style) => style.label().to_string(),
            None => raw.trim().to_string(),
        }
    }
}

impl std::fmt::Display for StyleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
