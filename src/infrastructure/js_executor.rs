//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"和操作表单元素的能力

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::form_page::FormPage;

/// 轮询元素的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 实现 [`FormPage`]，供提交流程调用
/// - 不认识验证码 / 提交结果
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    async fn element(&self, selector: &str) -> AppResult<Element> {
        self.page
            .find_element(selector)
            .await
            .map_err(|_| AppError::Browser(BrowserError::SelectorNotFound(selector.to_string())))
    }
}

#[async_trait]
impl FormPage for JsExecutor {
    async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await.map_err(|e| {
            AppError::Browser(BrowserError::NavigationFailed {
                url: url.to_string(),
                source: Box::new(e),
            })
        })?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> AppResult<()> {
        debug!("等待元素: {} (超时 {:?})", selector, timeout);
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            AppError::Browser(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            })
        })
    }

    async fn fill(&self, selector: &str, value: &str) -> AppResult<()> {
        // 直接赋值并触发 input/change，表单脚本依赖这些事件做校验
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) {{
                    return false;
                }}
                el.focus();
                el.value = {value};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                el.dispatchEvent(new KeyboardEvent('keyup', {{ bubbles: true }}));
                el.blur();
                return true;
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            value = serde_json::to_string(value)?,
        );

        let filled: bool = self.eval_as(js_code).await?;
        if !filled {
            return Err(AppError::Browser(BrowserError::SelectorNotFound(
                selector.to_string(),
            )));
        }
        Ok(())
    }

    async fn attach_file(&self, selector: &str, file_path: &Path) -> AppResult<()> {
        let element = self.element(selector).await?;

        let params = SetFileInputFilesParams::builder()
            .files(vec![file_path.to_string_lossy().to_string()])
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(|e| AppError::Browser(BrowserError::ConfigurationFailed(e)))?;

        self.page.execute(params).await?;
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> AppResult<String> {
        let element = self.element(selector).await?;
        let text = element.inner_text().await?;
        Ok(text.unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        self.element(selector).await?.click().await?;
        Ok(())
    }
}
