//! 单文件提交 - worker 进程的主体
//!
//! 每次调用独占一个浏览器实例，无论结果如何都会关闭浏览器

use std::path::Path;

use tracing::{error, info};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::infrastructure::JsExecutor;
use crate::models::SubmissionRequest;
use crate::workflow::submission_flow::{SubmissionFlow, SubmissionOutcome};

/// 为一个文件完成一次完整的表单提交
pub async fn run_single_file(config: &Config, file_path: &Path) -> AppResult<SubmissionOutcome> {
    let request = build_request(file_path)?;
    info!("📄 开始处理: {}", request.file_path.display());

    let mut session = BrowserSession::launch(config).await?;

    let result = submit_in_session(&mut session, config, &request).await;

    session.close().await;

    if let Err(e) = &result {
        error!("处理 {} 时出错: {}", request.file_path.display(), e);
    }
    result
}

async fn submit_in_session(
    session: &mut BrowserSession,
    config: &Config,
    request: &SubmissionRequest,
) -> AppResult<SubmissionOutcome> {
    let page = session.new_isolated_page().await?;
    let executor = JsExecutor::new(page);
    SubmissionFlow::new(config).run(&executor, request).await
}

/// 检查文件存在并转成绝对路径
fn build_request(file_path: &Path) -> AppResult<SubmissionRequest> {
    if !file_path.is_file() {
        return Err(AppError::File(FileError::NotFound {
            path: file_path.display().to_string(),
        }));
    }

    let absolute = file_path
        .canonicalize()
        .map_err(|e| AppError::file_read_failed(file_path.display().to_string(), e))?;
    Ok(SubmissionRequest::new(absolute))
}
