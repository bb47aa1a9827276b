//! worker 子进程调用
//!
//! 每个文件启动一个独立的 worker 进程，浏览器会话和编排层互不共享事件循环

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, WorkerError};
use crate::models::{SubmissionRequest, WorkerOutput};

/// worker 可执行文件的默认名称
pub const WORKER_BIN_NAME: &str = "form_worker";

/// 传给 worker 的配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "PDF_UPLOADER_CONFIG";

/// 运行一次 worker 并取回其输出
#[async_trait]
pub trait WorkerRunner: Send + Sync {
    async fn run(&self, request: &SubmissionRequest) -> AppResult<WorkerOutput>;
}

/// 以子进程方式运行 worker：`<program> [leading_args...] <file_path>`
#[derive(Debug, Clone)]
pub struct ProcessWorker {
    program: PathBuf,
    leading_args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ProcessWorker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// 在文件路径之前追加固定参数
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// 根据配置定位 worker：优先使用 `worker_program`，否则找当前程序旁边的 form_worker
    ///
    /// 这里不检查程序是否存在，启动失败会在每个文件的结果里记为 Error
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let program = match &config.worker_program {
            Some(program) => program.clone(),
            None => default_worker_path()?,
        };
        Ok(Self::new(program))
    }
}

fn default_worker_path() -> AppResult<PathBuf> {
    let current = std::env::current_exe()
        .map_err(|e| AppError::file_read_failed("current_exe", e))?;
    let dir = current
        .parent()
        .ok_or_else(|| AppError::Worker(WorkerError::ProgramNotFound(current.display().to_string())))?;
    Ok(dir.join(format!("{}{}", WORKER_BIN_NAME, std::env::consts::EXE_SUFFIX)))
}

#[async_trait]
impl WorkerRunner for ProcessWorker {
    async fn run(&self, request: &SubmissionRequest) -> AppResult<WorkerOutput> {
        debug!(
            "启动 worker: {} {}",
            self.program.display(),
            request.file_path.display()
        );

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(&request.file_path)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                AppError::Worker(WorkerError::SpawnFailed {
                    program: self.program.display().to_string(),
                    source: Box::new(e),
                })
            })?;

        Ok(WorkerOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
