//! 日志工具模块
//!
//! 提供运行日志文件和统计输出的辅助函数

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{StatusCategory, SubmissionResult};

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub warning: usize,
    pub failed: usize,
    pub error: usize,
    pub total: usize,
}

impl ProcessingStats {
    pub fn from_results(results: &[SubmissionResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Default::default()
            },
            |mut stats, result| {
                match result.status {
                    StatusCategory::Success => stats.success += 1,
                    StatusCategory::Warning => stats.warning += 1,
                    StatusCategory::Failed => stats.failed += 1,
                    StatusCategory::Error => stats.error += 1,
                }
                stats
            },
        )
    }
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &Path) -> Result<()> {
    let log_header = format!(
        "{}\nPDF 上传日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path.display()))?;
    Ok(())
}

/// 向日志文件追加一条结果
pub fn append_result(log_file_path: &Path, result: &SubmissionResult) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path.display()))?;

    writeln!(
        file,
        "[{}] {} | {} | {} | {}",
        chrono::Local::now().format("%H:%M:%S"),
        result.file_name,
        result.status,
        result.assumed_url.as_deref().unwrap_or("-"),
        truncate_text(result.details.trim(), 200)
    )?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `mode`: 运行模式
/// - `delay_seconds`: 两次提交之间的间隔
pub fn log_startup(mode: &str, delay_seconds: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", mode);
    info!("⏱️ 提交间隔: {} 秒", delay_seconds);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &ProcessingStats, log_file_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("⚠️ 警告: {}", stats.warning);
    info!("❌ 失败: {}", stats.failed);
    info!("❌ 出错: {}", stats.error);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
