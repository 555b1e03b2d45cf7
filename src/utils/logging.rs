/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::config::Config;
use crate::services::report_writer::Summary;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug 或 info 级别。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 翻译校对模式");
    info!("🤖 模型: {}", config.llm_model_name);
    info!("📊 最大并发数: {}", config.max_workers);
    info!("📦 每批条目数: {}", config.batch_size);
    info!("⏱️ 单条超时: {}s", config.item_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 记录单个文件的处理结果
pub fn log_file_complete(file_name: &str, total: usize, modified: usize) {
    info!("📁 {}: 共 {} 条，修改了 {} 条", file_name, total, modified);
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &Summary, total_modified: usize, config: &Config, summary_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("✅ 校对完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📊 总条数: {}", summary.total_items);
    info!("✅ 正确条数: {}", summary.correct_items);
    info!("❌ 错误条数: {}", summary.incorrect_items);
    info!("📈 准确率: {}%", summary.accuracy_rate);
    info!("⭐ 平均分: {}", summary.average_score);
    info!("✏️  总共修改条目: {}条", total_modified);
    info!("\n📂 输出位置:");
    info!("  修改后的文件: {}", config.modified_folder);
    info!("  单独报告文件: {}", config.report_folder);
    info!("  总报告文件: {}", summary_path.display());
    info!("📁 输入文件夹: {}, {} (未修改)", config.en_folder, config.zh_folder);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 超长时返回前 `max_len` 个字符加 `...`
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
