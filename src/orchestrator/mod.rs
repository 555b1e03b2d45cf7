//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批次调度器
//! - 控制并发数量（Semaphore）
//! - 单条超时、故障隔离
//! - 按原始顺序返回报告
//!
//! ### `file_processor` - 单个文件对处理器
//! - 读取、校验、合并中英文记录
//! - 分批交给调度器
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<FilePair>)
//!     ↓
//! file_processor (处理 Vec<ProofItem>)
//!     ↓
//! batch_processor (处理一个批次)
//!     ↓
//! workflow::ProofFlow (处理单个 ProofItem)
//!     ↓
//! services / clients
//! ```

pub mod batch_processor;
pub mod file_processor;

pub use batch_processor::{BatchScheduler, SchedulerSettings};
pub use file_processor::{process_file_pair, FileOutcome};
