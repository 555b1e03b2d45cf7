//! # Translation Proofreader
//!
//! 批量校对机器翻译，并按评分调用 LLM 修改译文
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与远程文本服务交互，负责重试和响应解包
//! - `TextService` - 远程服务的抽象，测试时可替换
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个条目
//! - `response_parser` - 把模型输出解析为 JSON 对象
//! - `RevisionPolicy` - 按评分决定是否修改
//! - `ReportWriter` - 汇总统计与报告文件
//!
//! ### ③ 流程层（Workflow）
//! - `ProofFlow` - 一条翻译的完整流程（校对 → 修改 → 组装报告）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批次调度，管理并发、超时和顺序
//! - `orchestrator/file_processor` - 单个文件对的读取、合并和分批
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{ChatMessage, LlmClient, TextService};
pub use config::Config;
pub use error::{AppError, AppResult, RemoteServiceError};
pub use models::{CheckResult, ModificationLevel, ProofItem, ProofReport, RevisionResult};
pub use orchestrator::{BatchScheduler, SchedulerSettings};
pub use workflow::ProofFlow;
