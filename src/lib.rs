//! # PDF Bulk Uploader
//!
//! 把一批 PDF 逐个提交到固定网页表单的自动化工具
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 启动无头浏览器，每次 worker 运行独占一个实例
//! - `infrastructure/` - `JsExecutor` 持有 Page，实现 `FormPage` 页面操作
//!
//! ### ② 业务能力层（Services）
//! - `captcha` - 算术验证码求解
//! - `staging` - 上传文件暂存
//! - `history` - 已处理标识记录（列表模式）
//! - `source_list` - 读取 pdfs.txt、下载或定位文件
//!
//! ### ③ 流程层（Workflow）
//! - `SubmissionFlow` - 一份 PDF 的完整提交流程（打开 → 填写 → 上传 → 验证码 → 提交 → 确认）
//! - `run_single_file` - worker 进程的主体，负责浏览器的获取与释放
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchProcessor` - 顺序处理一批文件，每个文件启动一个 worker 子进程
//! - `ListProcessor` - 列表模式
//!
//! ## 进程约定
//!
//! 编排层以 `form_worker <绝对路径>` 启动 worker。退出码为 0 且 stdout 含有
//! `Submission successful!` 时视为成功，其余情况见 [`models::SubmissionResult::classify`]

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{StatusCategory, SubmissionRequest, SubmissionResult, UploadedFile, SUCCESS_MARKER};
pub use orchestrator::{BatchProcessor, ListProcessor, ProcessWorker};
pub use workflow::{run_single_file, SubmissionFlow, SubmissionOutcome};
