use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, FileError};

/// worker 确认提交成功时在 stdout 输出的标记
///
/// 编排层只依据这个子串判断是否成功
pub const SUCCESS_MARKER: &str = "Submission successful!";

/// 单个待上传的文件（文件名 + 内容）
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// 从磁盘读取一个 PDF，只接受 `.pdf` 扩展名
    pub async fn read_pdf(path: &Path) -> AppResult<Self> {
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(AppError::File(FileError::NotPdf(path.display().to_string())));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AppError::File(FileError::InvalidFileName(path.display().to_string())))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        Ok(Self::new(name, bytes))
    }
}

/// 提交请求：worker 处理的一份 PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// PDF 的绝对路径
    pub file_path: PathBuf,
}

impl SubmissionRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }
}

/// worker 子进程的输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerOutput {
    /// 被信号终止时没有退出码
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl WorkerOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 合并后的原始输出，用于排查问题
    pub fn raw(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n--- stderr ---\n{}", self.stdout, self.stderr),
        }
    }
}

/// 提交结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCategory {
    /// 看到了确认信息
    Success,
    /// worker 正常退出但没有确认信息
    Warning,
    /// worker 非零退出
    Failed,
    /// 编排本身出错（写文件、启动进程等）
    Error,
}

impl StatusCategory {
    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::Success => "✅ Success",
            StatusCategory::Warning => "⚠️ Completed with Warning",
            StatusCategory::Failed => "❌ Failed",
            StatusCategory::Error => "❌ Error",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 单个文件的提交结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionResult {
    pub file_name: String,
    pub status: StatusCategory,
    /// 推测的上传地址，仅成功时给出
    pub assumed_url: Option<String>,
    pub details: String,
    pub raw_output: String,
}

impl SubmissionResult {
    /// 根据 worker 的退出码和输出进行分类
    ///
    /// - 退出码非 0 → Failed，详情为 stderr
    /// - 退出码 0 且 stdout 含成功标记 → Success，附带推测地址
    /// - 退出码 0 但没有标记 → Warning，不附带地址
    pub fn classify(file_name: impl Into<String>, output: &WorkerOutput, assumed_url: String) -> Self {
        let file_name = file_name.into();
        let raw_output = output.raw();

        if !output.success() {
            return Self {
                file_name,
                status: StatusCategory::Failed,
                assumed_url: None,
                details: format!("Error: {}", output.stderr),
                raw_output,
            };
        }

        if output.stdout.contains(SUCCESS_MARKER) {
            Self {
                file_name,
                status: StatusCategory::Success,
                assumed_url: Some(assumed_url),
                details: "Processed via subprocess".to_string(),
                raw_output,
            }
        } else {
            Self {
                file_name,
                status: StatusCategory::Warning,
                assumed_url: None,
                details: "Script finished but success msg not found. Check logs.".to_string(),
                raw_output,
            }
        }
    }

    /// 编排过程中出错
    pub fn error(file_name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            file_name: file_name.into(),
            status: StatusCategory::Error,
            assumed_url: None,
            details: error.to_string(),
            raw_output: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StatusCategory::Success
    }
}
