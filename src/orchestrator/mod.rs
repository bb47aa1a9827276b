//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 顺序处理一组上传的文件
//! - 暂存文件、调用 worker、分类结果
//! - 控制相邻文件之间的等待
//!
//! ### `list_processor` - 列表模式处理器
//! - 读取 pdfs.txt，跳过已处理的条目
//! - 下载或定位文件后交给 worker
//! - 成功后追加处理记录
//!
//! ### `worker_runner` - worker 子进程
//! - 每个文件一个独立进程，浏览器事件循环不进入编排层
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor / list_processor (处理 Vec<文件>)
//!     ↓ 子进程
//! form_worker → workflow::run_single_file (处理单个文件)
//!     ↓
//! workflow::SubmissionFlow → services / infrastructure
//! ```

pub mod batch_processor;
pub mod list_processor;
pub mod progress;
pub mod worker_runner;

pub use batch_processor::BatchProcessor;
pub use list_processor::ListProcessor;
pub use progress::{BatchObserver, NoopObserver};
pub use worker_runner::{ProcessWorker, WorkerRunner, CONFIG_PATH_ENV, WORKER_BIN_NAME};
