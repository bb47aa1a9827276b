//! 上传文件暂存服务 - 业务能力层
//!
//! 把待上传的文件按原名写入暂存目录，交给 worker 使用。暂存文件不会被清理

use std::path::PathBuf;

use tracing::debug;

use crate::error::{AppError, AppResult, FileError};
use crate::models::UploadedFile;

/// 暂存目录
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 写入文件并返回其绝对路径，目录不存在时自动创建
    pub async fn stage(&self, file: &UploadedFile) -> AppResult<PathBuf> {
        let name = validate_file_name(&file.name)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.dir.display().to_string(), e))?;

        let path = self.dir.join(name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        let absolute = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        debug!("已暂存: {} ({} 字节)", absolute.display(), file.bytes.len());

        Ok(absolute)
    }
}

/// 文件名只能是单独的一段，不能带目录
pub fn validate_file_name(name: &str) -> AppResult<&str> {
    let trimmed = name.trim();
    let is_plain = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !trimmed.contains('/')
        && !trimmed.contains('\\');

    if is_plain {
        Ok(trimmed)
    } else {
        Err(AppError::File(FileError::InvalidFileName(name.to_string())))
    }
}
