//! 列表模式处理器 - 编排层
//!
//! 从 pdfs.txt 读取 URL 或本地路径，跳过 upload_history.txt 中已记录的条目，
//! 成功提交后把条目追加到记录中

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{SubmissionRequest, SubmissionResult};
use crate::orchestrator::batch_processor::wait_between;
use crate::orchestrator::progress::BatchObserver;
use crate::orchestrator::worker_runner::WorkerRunner;
use crate::services::{load_sources, resolve_source, HistoryLog};

/// 列表模式处理器
pub struct ListProcessor<R: WorkerRunner> {
    config: Config,
    runner: R,
    history: HistoryLog,
}

impl<R: WorkerRunner> ListProcessor<R> {
    pub fn new(config: Config, runner: R) -> Self {
        let history = HistoryLog::with_path(config.history_file.clone());
        Self {
            config,
            runner,
            history,
        }
    }

    /// 处理列表中所有未处理过的条目
    ///
    /// 列表文件不存在时返回错误；单个条目的错误只记录在其结果中
    pub async fn run(&self, observer: &dyn BatchObserver) -> AppResult<Vec<SubmissionResult>> {
        let sources = load_sources(&self.config.source_list_file).await?;
        let processed = self.history.load().await?;
        info!(
            "📋 列表共 {} 条，已处理记录 {} 条",
            sources.len(),
            processed.len()
        );

        let pending = self.pending_sources(&sources, &processed, observer);
        let total = pending.len();
        let delay = self.config.delay();
        let mut results = Vec::with_capacity(total);

        observer.on_batch_start(total);

        for (idx, source) in pending.iter().enumerate() {
            let index = idx + 1;
            info!("[{}/{}] 处理中: {}", index, total, source);
            observer.on_file_start(index, total, source);

            let result = match self.process_source(source).await {
                Ok(result) => result,
                Err(e) => {
                    error!("[{}/{}] ❌ 处理 {} 出错: {}", index, total, source, e);
                    SubmissionResult::error(display_name(source), e)
                }
            };

            if result.is_success() {
                if let Err(e) = self.history.mark_as_processed(source).await {
                    error!("写入处理记录失败 {}: {}", source, e);
                }
            }

            info!("[{}/{}] {} → {}", index, total, source, result.status);
            observer.on_file_complete(index, total, &result);
            results.push(result);

            wait_between(index, total, delay, observer).await;
        }

        observer.on_batch_complete(&results);
        Ok(results)
    }

    /// 去掉已处理和重复的条目，保持原顺序
    fn pending_sources(
        &self,
        sources: &[String],
        processed: &HashSet<String>,
        observer: &dyn BatchObserver,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for source in sources {
            if processed.contains(source) {
                info!("⏭️ 已处理过，跳过: {}", source);
                observer.on_skip(source);
                continue;
            }
            if seen.insert(source.clone()) {
                pending.push(source.clone());
            }
        }

        pending
    }

    async fn process_source(&self, source: &str) -> AppResult<SubmissionResult> {
        let name = display_name(source);

        let Some(file_path) = resolve_source(source, &self.config.staging_dir).await? else {
            warn!("⚠️ 无法获取文件: {}", source);
            return Ok(SubmissionResult::error(name, format!("File not available: {}", source)));
        };

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(name);
        let assumed_url = self.config.assumed_url(&file_name);

        let output = self.runner.run(&SubmissionRequest::new(file_path)).await?;

        Ok(SubmissionResult::classify(file_name, &output, assumed_url))
    }
}

/// 条目的显示名：URL 或路径的最后一段
fn display_name(source: &str) -> String {
    let trimmed = source.trim_end_matches(['/', '\\']);
    Path::new(trimmed)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StatusCategory, WorkerOutput};
    use crate::orchestrator::NoopObserver;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// 记录调用并总是返回成功的假 worker
    struct CountingRunner {
        calls: Mutex<Vec<PathBuf>>,
        stdout: String,
    }

    impl CountingRunner {
        fn succeeding() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                stdout: "Submission successful! Response: Thank you".to_string(),
            }
        }

        fn warning() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                stdout: "Skipping submission due to captcha failure.".to_string(),
            }
        }

        fn called_names(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl WorkerRunner for CountingRunner {
        async fn run(&self, request: &SubmissionRequest) -> AppResult<WorkerOutput> {
            self.calls.lock().unwrap().push(request.file_path.clone());
            Ok(WorkerOutput {
                exit_code: Some(0),
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        config: Config,
    }

    impl Fixture {
        /// 在临时目录里创建若干 PDF 和一个空的列表文件
        fn new(pdfs: &[&str]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            for pdf in pdfs {
                std::fs::write(dir.path().join(pdf), b"%PDF").unwrap();
            }
            std::fs::write(dir.path().join("pdfs.txt"), "").unwrap();

            let config = Config {
                source_list_file: dir.path().join("pdfs.txt"),
                history_file: dir.path().join("upload_history.txt"),
                staging_dir: dir.path().join("downloads"),
                delay_seconds: 0,
                ..Config::default()
            };
            Self { dir, config }
        }

        fn path(&self, name: &str) -> String {
            self.dir.path().join(name).to_string_lossy().to_string()
        }
    }

    #[tokio::test]
    async fn test_skips_already_processed_identifier() {
        let fixture = Fixture::new(&["a.pdf", "b.pdf"]);
        let a = fixture.path("a.pdf");
        let b = fixture.path("b.pdf");
        std::fs::write(&fixture.config.source_list_file, format!("{}\n{}\n", a, b)).unwrap();
        std::fs::write(&fixture.config.history_file, format!("{}\n", a)).unwrap();

        let processor = ListProcessor::new(fixture.config.clone(), CountingRunner::succeeding());
        let results = processor.run(&NoopObserver).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_name, "b.pdf");
        assert_eq!(processor.runner.called_names(), vec!["b.pdf"]);
    }

    #[tokio::test]
    async fn test_success_is_recorded_and_rerun_skips() {
        let setup = Fixture::new(&["a.pdf"]);
        let a = setup.path("a.pdf");
        std::fs::write(&setup.config.source_list_file, format!("# comment\n{}\n", a)).unwrap();

        let first = ListProcessor::new(setup.config.clone(), CountingRunner::succeeding());
        let results = first.run(&NoopObserver).await.unwrap();
        assert_eq!(results[0].status, StatusCategory::Success);

        let history = std::fs::read_to_string(&setup.config.history_file).unwrap();
        assert_eq!(history.trim(), a);

        let second = ListProcessor::new(setup.config.clone(), CountingRunner::succeeding());
        let results = second.run(&NoopObserver).await.unwrap();
        assert!(results.is_empty());
        assert!(second.runner.called_names().is_empty());
    }

    #[tokio::test]
    async fn test_warning_is_not_recorded() {
        let setup = Fixture::new(&["a.pdf"]);
        std::fs::write(&setup.config.source_list_file, setup.path("a.pdf")).unwrap();

        let processor = ListProcessor::new(setup.config.clone(), CountingRunner::warning());
        let results = processor.run(&NoopObserver).await.unwrap();

        assert_eq!(results[0].status, StatusCategory::Warning);
        assert!(!setup.config.history_file.exists());
    }

    #[tokio::test]
    async fn test_missing_local_file_is_error_result() {
        let setup = Fixture::new(&[]);
        let missing = setup.path("missing.pdf");
        std::fs::write(&setup.config.source_list_file, &missing).unwrap();

        let processor = ListProcessor::new(setup.config.clone(), CountingRunner::succeeding());
        let results = processor.run(&NoopObserver).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, StatusCategory::Error);
        assert_eq!(results[0].file_name, "missing.pdf");
        assert!(processor.runner.called_names().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_entries_processed_once() {
        let setup = Fixture::new(&["a.pdf"]);
        let a = setup.path("a.pdf");
        std::fs::write(&setup.config.source_list_file, format!("{}\n{}\n", a, a)).unwrap();

        let processor = ListProcessor::new(setup.config.clone(), CountingRunner::succeeding());
        let results = processor.run(&NoopObserver).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(processor.runner.called_names(), vec!["a.pdf"]);
    }

    #[tokio::test]
    async fn test_missing_list_file_is_error() {
        let setup = Fixture::new(&[]);
        std::fs::remove_file(&setup.config.source_list_file).unwrap();

        let processor = ListProcessor::new(setup.config.clone(), CountingRunner::succeeding());
        assert!(processor.run(&NoopObserver).await.is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("https://example.com/files/a.pdf"), "a.pdf");
        assert_eq!(display_name("docs/b.pdf"), "b.pdf");
        assert_eq!(display_name("c.pdf"), "c.pdf");
    }
}
