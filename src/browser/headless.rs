use chromiumoxide::cdp::browser_protocol::target::{CreateBrowserContextParams, CreateTargetParams};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};

/// 一次 worker 运行独占的浏览器会话
///
/// 持有浏览器进程和事件处理任务，结束时必须调用 [`BrowserSession::close`]
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// 启动无头浏览器
    pub async fn launch(config: &Config) -> AppResult<Self> {
        info!("🚀 启动无头浏览器...");

        let browser_config = build_browser_config(config)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            AppError::Browser(BrowserError::LaunchFailed {
                source: Box::new(e),
            })
        })?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 添加短暂延迟以等待浏览器状态同步
        sleep(tokio::time::Duration::from_millis(300)).await;

        Ok(Self { browser, handler })
    }

    /// 在全新的隔离上下文中创建空白页面
    pub async fn new_isolated_page(&mut self) -> AppResult<Page> {
        let context_id = self
            .browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await
            .map_err(|e| {
                error!("创建浏览器上下文失败: {}", e);
                AppError::Browser(BrowserError::PageCreationFailed {
                    source: Box::new(e),
                })
            })?;
        debug!("浏览器上下文已创建: {:?}", context_id);

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id)
            .build()
            .map_err(|e| AppError::Browser(BrowserError::ConfigurationFailed(e)))?;

        let page = self.browser.new_page(target).await.map_err(|e| {
            error!("创建页面失败: {}", e);
            AppError::Browser(BrowserError::PageCreationFailed {
                source: Box::new(e),
            })
        })?;
        debug!("页面创建成功");

        Ok(page)
    }

    /// 关闭浏览器并回收进程
    ///
    /// 关闭失败只记录日志，不影响提交结果
    pub async fn close(mut self) {
        debug!("正在关闭浏览器...");
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler.abort();
        debug!("浏览器已关闭");
    }
}

/// 根据配置生成浏览器启动参数
fn build_browser_config(config: &Config) -> AppResult<BrowserConfig> {
    let mut builder = BrowserConfig::builder();

    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(executable) = &config.chrome_executable {
        debug!("使用指定的浏览器: {}", executable.display());
        builder = builder.chrome_executable(executable);
    }

    builder
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ])
        .build()
        .map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            AppError::Browser(BrowserError::ConfigurationFailed(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_with_default_detection() {
        // chromiumoxide 在找不到浏览器时会返回错误，这里只检查错误类型
        let config = Config::default();
        if let Err(e) = build_browser_config(&config) {
            assert!(matches!(
                e,
                AppError::Browser(BrowserError::ConfigurationFailed(_))
            ));
        }
    }

    #[test]
    fn test_build_config_with_explicit_executable() {
        let config = Config {
            chrome_executable: Some("/usr/bin/true".into()),
            ..Config::default()
        };
        assert!(build_browser_config(&config).is_ok());
    }
}
