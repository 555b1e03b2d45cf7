use crate::clients::{LlmClient, TextService};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::loaders::{find_matching_files, parse_selection, FilePair};
use crate::orchestrator::{process_file_pair, BatchScheduler, FileOutcome, SchedulerSettings};
use crate::services::{PromptTemplates, ReportWriter};
use crate::utils::logging;
use crate::workflow::ProofFlow;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    scheduler: BatchScheduler,
    writer: ReportWriter,
}

impl App {
    /// 使用真实的 LLM 客户端初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        let client = LlmClient::new(&config)?;
        Self::with_client(config, Arc::new(client))
    }

    /// 使用指定的文本服务初始化应用
    pub fn with_client(config: Config, client: Arc<dyn TextService>) -> AppResult<Self> {
        config.validate()?;
        logging::log_startup(&config);

        let flow = ProofFlow::new(client, PromptTemplates::from_config(&config));
        let scheduler = BatchScheduler::new(Arc::new(flow), SchedulerSettings::from(&config))?;
        let writer = ReportWriter::new(&config.modified_folder, &config.report_folder);

        Ok(Self {
            config,
            scheduler,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<()> {
        info!("🔄 正在扫描输入文件夹...");

        for folder in [&self.config.en_folder, &self.config.zh_folder] {
            let is_dir = tokio::fs::metadata(folder).await.map(|m| m.is_dir()).unwrap_or(false);
            if !is_dir {
                error!("❌ 输入文件夹不存在: {}", folder);
                return Ok(());
            }
        }

        let pairs = find_matching_files(
            Path::new(&self.config.en_folder),
            Path::new(&self.config.zh_folder),
        )
        .await?;
        if pairs.is_empty() {
            warn!("❌ 没有找到匹配的文件对");
            return Ok(());
        }

        let selected = self.select_pairs(&pairs).await?;
        if selected.is_empty() {
            warn!("❌ 没有选择要处理的文件");
            return Ok(());
        }
        info!("\n✅ 已选择 {} 个文件对进行处理", selected.len());

        self.writer.prepare().await?;

        let mut outcomes = Vec::new();
        for pair in &selected {
            if let Some(outcome) = process_file_pair(&self.scheduler, pair, self.config.batch_size).await? {
                outcomes.push(outcome);
            }
        }

        if outcomes.is_empty() {
            warn!("❌ 没有成功处理任何文件");
            return Ok(());
        }

        self.write_reports(&outcomes).await
    }

    /// 选择要处理的文件对
    async fn select_pairs(&self, pairs: &[FilePair]) -> AppResult<Vec<FilePair>> {
        info!("\n📋 可用的文件对:");
        for (i, pair) in pairs.iter().enumerate() {
            info!("{}. {}", i + 1, pair.base_name);
            info!("   中文: {}", pair.zh_file.display());
            info!("   英文: {}", pair.en_file.display());
        }

        let input = match &self.config.file_selection {
            Some(selection) => selection.clone(),
            None => read_selection_from_stdin().await?,
        };

        match parse_selection(&input, pairs.len()) {
            Some(indices) => Ok(indices.into_iter().map(|i| pairs[i].clone()).collect()),
            None => {
                warn!("❌ 输入格式错误，请输入数字或'all'");
                Ok(Vec::new())
            }
        }
    }

    /// 写入修改副本、单文件报告和汇总报告
    async fn write_reports(&self, outcomes: &[FileOutcome]) -> AppResult<()> {
        let mut total_modified = 0;
        let mut all_reports = Vec::new();

        for outcome in outcomes {
            let file_name = outcome.pair.en_file_name();
            let modified = self
                .writer
                .write_file_outputs(
                    &file_name,
                    &outcome.pair.base_name,
                    &outcome.original_records,
                    &outcome.reports,
                )
                .await?;
            total_modified += modified;
            all_reports.extend(outcome.reports.iter().cloned());
            logging::log_file_complete(&file_name, outcome.reports.len(), modified);
        }

        let (summary, summary_path) = self.writer.write_summary(&all_reports).await?;
        logging::print_final_stats(&summary, total_modified, &self.config, &summary_path);
        Ok(())
    }
}

async fn read_selection_from_stdin() -> AppResult<String> {
    println!("\n💡 输入选项编号(用空格分隔)，或输入'all'处理所有文件:");
    println!("请选择: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|e| crate::error::AppError::file_read_failed("<stdin>", e))?;
    Ok(line)
}
