use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::models::{StatusCategory, SubmissionResult};
use crate::orchestrator::BatchObserver;

/// 终端进度条
///
/// 显示已完成比例，每个文件完成后打印一行结果
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold} [{bar:40.green/238}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("上传");
        Self { bar }
    }

    /// 不显示任何内容（用于 --quiet）
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchObserver for CliProgress {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn on_file_start(&self, index: usize, total: usize, file_name: &str) {
        self.bar
            .set_message(format!("处理中 ({}/{}): {}...", index, total, file_name));
    }

    fn on_file_complete(&self, _index: usize, _total: usize, result: &SubmissionResult) {
        let mark = match result.status {
            StatusCategory::Success => "✓",
            StatusCategory::Warning => "⚠",
            StatusCategory::Failed | StatusCategory::Error => "✗",
        };
        self.bar
            .println(format!("  {} {}  {}", mark, result.file_name, result.status));
        self.bar.inc(1);
    }

    fn on_delay(&self, delay: Duration) {
        self.bar
            .set_message(format!("等待 {} 秒...", delay.as_secs()));
    }

    fn on_skip(&self, identifier: &str) {
        self.bar.println(format!("  ⏭ 已处理过，跳过: {}", identifier));
    }

    fn on_batch_complete(&self, _results: &[SubmissionResult]) {
        self.bar.finish_with_message("全部处理完成!");
    }
}
