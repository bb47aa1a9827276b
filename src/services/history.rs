//! 处理记录服务 - 业务能力层
//!
//! 只负责读写 upload_history.txt，一行一个已处理的标识，只追加不修改

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult};

/// 已处理标识记录
pub struct HistoryLog {
    history_file_path: PathBuf,
}

impl HistoryLog {
    /// 使用指定文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            history_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.history_file_path
    }

    /// 读取所有已处理的标识，文件不存在时返回空集合
    pub async fn load(&self) -> AppResult<HashSet<String>> {
        if !self.history_file_path.exists() {
            return Ok(HashSet::new());
        }

        let content = tokio::fs::read_to_string(&self.history_file_path)
            .await
            .map_err(|e| AppError::file_read_failed(self.history_file_path.display().to_string(), e))?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// 追加一条已处理标识
    pub async fn mark_as_processed(&self, identifier: &str) -> AppResult<()> {
        debug!("记录已处理: {}", identifier);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_file_path)
            .map_err(|e| AppError::file_write_failed(self.history_file_path.display().to_string(), e))?;

        writeln!(file, "{}", identifier)
            .map_err(|e| AppError::file_write_failed(self.history_file_path.display().to_string(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLog::with_path(dir.path().join("history.txt"));
        assert!(history.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLog::with_path(dir.path().join("history.txt"));

        history.mark_as_processed("a.pdf").await.unwrap();
        history.mark_as_processed("https://example.com/b.pdf").await.unwrap();
        history.mark_as_processed("a.pdf").await.unwrap();

        let processed = history.load().await.unwrap();
        assert_eq!(processed.len(), 2);
        assert!(processed.contains("a.pdf"));
        assert!(processed.contains("https://example.com/b.pdf"));

        let raw = std::fs::read_to_string(history.path()).unwrap();
        assert_eq!(raw.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_load_ignores_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        std::fs::write(&path, "  a.pdf  \n\n   \nb.pdf\n").unwrap();

        let processed = HistoryLog::with_path(&path).load().await.unwrap();
        assert_eq!(processed.len(), 2);
        assert!(processed.contains("a.pdf"));
    }
}
