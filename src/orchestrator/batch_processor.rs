//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **顺序处理**：一次只处理一个文件，结果顺序与输入一致
//! 2. **暂存文件**：按原名写入暂存目录（从磁盘读取的文件在轮到它时才读取）
//! 3. **进程隔离**：每个文件启动一个 worker 子进程
//! 4. **结果分类**：根据退出码和输出判定 Success / Warning / Failed / Error
//! 5. **节奏控制**：相邻两个文件之间等待固定时间
//!
//! 单个文件出错只影响它自己的结果，不会中断后续文件

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{SubmissionRequest, SubmissionResult, UploadedFile};
use crate::orchestrator::progress::BatchObserver;
use crate::orchestrator::worker_runner::WorkerRunner;
use crate::services::StagingArea;

/// 批量处理器
pub struct BatchProcessor<R: WorkerRunner> {
    config: Config,
    runner: R,
    staging: StagingArea,
}

impl<R: WorkerRunner> BatchProcessor<R> {
    pub fn new(config: Config, runner: R) -> Self {
        let staging = StagingArea::new(config.staging_dir.clone());
        Self {
            config,
            runner,
            staging,
        }
    }

    /// 依次处理所有文件，每个文件恰好对应一条结果
    pub async fn process_files(
        &self,
        files: &[UploadedFile],
        observer: &dyn BatchObserver,
    ) -> Vec<SubmissionResult> {
        let items: Vec<_> = files.iter().map(BatchItem::Loaded).collect();
        self.process_items(&items, observer).await
    }

    /// 依次处理磁盘上的文件；读取失败只记为该文件的 Error
    pub async fn process_paths(
        &self,
        paths: &[PathBuf],
        observer: &dyn BatchObserver,
    ) -> Vec<SubmissionResult> {
        let items: Vec<_> = paths.iter().map(|p| BatchItem::OnDisk(p.as_path())).collect();
        self.process_items(&items, observer).await
    }

    async fn process_items(
        &self,
        items: &[BatchItem<'_>],
        observer: &dyn BatchObserver,
    ) -> Vec<SubmissionResult> {
        let total = items.len();
        let delay = self.config.delay();
        let mut results = Vec::with_capacity(total);

        observer.on_batch_start(total);

        for (idx, item) in items.iter().enumerate() {
            let index = idx + 1;
            let name = item.name();
            info!("[{}/{}] 处理中: {}", index, total, name);
            observer.on_file_start(index, total, &name);

            let result = match self.process_item(item).await {
                Ok(result) => result,
                Err(e) => {
                    error!("[{}/{}] ❌ 处理 {} 出错: {}", index, total, name, e);
                    SubmissionResult::error(&name, e)
                }
            };

            info!("[{}/{}] {} → {}", index, total, name, result.status);
            observer.on_file_complete(index, total, &result);
            results.push(result);

            wait_between(index, total, delay, observer).await;
        }

        observer.on_batch_complete(&results);
        results
    }

    async fn process_item(&self, item: &BatchItem<'_>) -> AppResult<SubmissionResult> {
        let file = match item {
            BatchItem::Loaded(file) => Cow::Borrowed(*file),
            BatchItem::OnDisk(path) => Cow::Owned(UploadedFile::read_pdf(path).await?),
        };

        let file_path = self.staging.stage(&file).await?;
        let assumed_url = self.config.assumed_url(&file.name);

        let output = self.runner.run(&SubmissionRequest::new(file_path)).await?;

        Ok(SubmissionResult::classify(&file.name, &output, assumed_url))
    }
}

/// 批次中的一项：已在内存中，或轮到时再从磁盘读取
enum BatchItem<'a> {
    Loaded(&'a UploadedFile),
    OnDisk(&'a Path),
}

impl BatchItem<'_> {
    fn name(&self) -> String {
        match self {
            BatchItem::Loaded(file) => file.name.clone(),
            BatchItem::OnDisk(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

/// 不是最后一个文件且间隔大于 0 时等待
pub(crate) async fn wait_between(
    index: usize,
    total: usize,
    delay: Duration,
    observer: &dyn BatchObserver,
) {
    if index < total && !delay.is_zero() {
        info!("⏳ 等待 {} 秒...", delay.as_secs());
        observer.on_delay(delay);
        tokio::time::sleep(delay).await;
    }
}
