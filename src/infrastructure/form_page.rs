use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppResult;

/// 提交流程需要的页面操作
///
/// 生产环境由 [`crate::infrastructure::JsExecutor`] 实现
#[async_trait]
pub trait FormPage: Send + Sync {
    /// 导航到 URL
    async fn goto(&self, url: &str) -> AppResult<()>;

    /// 等待元素出现，超时返回 `BrowserError::Timeout`
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> AppResult<()>;

    /// 填写输入框
    async fn fill(&self, selector: &str, value: &str) -> AppResult<()>;

    /// 给文件输入框设置文件
    async fn attach_file(&self, selector: &str, file_path: &Path) -> AppResult<()>;

    /// 读取元素的可见文本
    async fn inner_text(&self, selector: &str) -> AppResult<String>;

    /// 点击元素
    async fn click(&self, selector: &str) -> AppResult<()>;
}
