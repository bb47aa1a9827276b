//! 表单提交流程 - 流程层
//!
//! 核心职责：定义"一份 PDF"的完整提交流程
//!
//! 流程顺序：
//! 1. 打开表单，等待名字输入框出现
//! 2. 填写身份信息
//! 3. 上传文件
//! 4. 求解算术验证码（失败则不提交）
//! 5. 提交并等待确认信息

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{Config, FormSelectors, Identity};
use crate::error::AppResult;
use crate::infrastructure::FormPage;
use crate::models::{SubmissionRequest, SUCCESS_MARKER};
use crate::services::solve_math_captcha;

/// 单次提交经过的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Launched,
    FormLoaded,
    FieldsFilled,
    FileAttached,
    CaptchaSolved,
    CaptchaFailed,
    Submitted,
    Confirmed,
    ConfirmationTimeout,
}

impl SubmissionStage {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStage::CaptchaFailed
                | SubmissionStage::Confirmed
                | SubmissionStage::ConfirmationTimeout
        )
    }
}

/// 提交结果
///
/// 流程中的其他错误以 `Err` 返回，由进程边界统一处理
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 看到确认信息
    Confirmed { response: String },
    /// 验证码无法求解，没有提交
    CaptchaUnsolvable { question: String },
    /// 已提交但未等到确认信息
    ConfirmationTimeout,
}

impl SubmissionOutcome {
    /// 对应的终止阶段
    pub fn stage(&self) -> SubmissionStage {
        match self {
            SubmissionOutcome::Confirmed { .. } => SubmissionStage::Confirmed,
            SubmissionOutcome::CaptchaUnsolvable { .. } => SubmissionStage::CaptchaFailed,
            SubmissionOutcome::ConfirmationTimeout => SubmissionStage::ConfirmationTimeout,
        }
    }
}

/// worker 写到 stdout 的那一行，编排层依据它判断结果
impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionOutcome::Confirmed { response } => {
                write!(f, "{} Response: {}", SUCCESS_MARKER, response)
            }
            SubmissionOutcome::CaptchaUnsolvable { .. } => {
                write!(f, "Skipping submission due to captcha failure.")
            }
            SubmissionOutcome::ConfirmationTimeout => {
                write!(f, "Warning: Confirmation message timeout. Moving to next...")
            }
        }
    }
}

/// 表单提交流程
///
/// - 编排一次完整的表单提交
/// - 不持有任何资源（page），只依赖 [`FormPage`] 能力
pub struct SubmissionFlow {
    form_url: String,
    selectors: FormSelectors,
    identity: Identity,
    element_timeout: Duration,
    confirmation_timeout: Duration,
    settle_pause: Duration,
}

impl SubmissionFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            form_url: config.form_url.clone(),
            selectors: config.selectors.clone(),
            identity: config.identity.clone(),
            element_timeout: config.element_timeout(),
            confirmation_timeout: config.confirmation_timeout(),
            settle_pause: config.settle_pause(),
        }
    }

    pub async fn run(
        &self,
        page: &dyn FormPage,
        request: &SubmissionRequest,
    ) -> AppResult<SubmissionOutcome> {
        enter(SubmissionStage::Launched);
        info!("📝 打开表单并填写: {}", request.file_path.display());

        // ========== 1. 加载表单 ==========
        page.goto(&self.form_url).await?;
        page.wait_for_selector(&self.selectors.first_name, self.element_timeout)
            .await?;
        enter(SubmissionStage::FormLoaded);

        // ========== 2. 身份信息 ==========
        page.fill(&self.selectors.first_name, &self.identity.first_name)
            .await?;
        page.fill(&self.selectors.last_name, &self.identity.last_name)
            .await?;
        page.fill(&self.selectors.email, &self.identity.email).await?;
        enter(SubmissionStage::FieldsFilled);

        // ========== 3. 上传文件 ==========
        info!(
            "📎 上传文件: {}",
            request
                .file_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        );
        page.attach_file(&self.selectors.file_upload, &request.file_path)
            .await?;
        enter(SubmissionStage::FileAttached);

        // ========== 4. 验证码 ==========
        let question = match page.inner_text(&self.selectors.captcha_label).await {
            Ok(text) => text,
            Err(e) => {
                warn!("读取验证码题目失败: {}", e);
                String::new()
            }
        };
        info!("🧮 验证码题目: {}", question.trim());

        let Some(answer) = solve_math_captcha(&question) else {
            enter(SubmissionStage::CaptchaFailed);
            warn!("⚠️ 无法求解验证码，跳过提交");
            return Ok(SubmissionOutcome::CaptchaUnsolvable { question });
        };
        info!("✓ 验证码答案: {}", answer);

        page.fill(&self.selectors.captcha_answer, &answer).await?;
        enter(SubmissionStage::CaptchaSolved);

        // 等待页面脚本完成校验
        tokio::time::sleep(self.settle_pause).await;

        // ========== 5. 提交并等待确认 ==========
        page.click(&self.selectors.submit).await?;
        enter(SubmissionStage::Submitted);
        info!("📤 表单已提交");

        match self.wait_for_confirmation(page).await {
            Ok(response) => {
                enter(SubmissionStage::Confirmed);
                info!("✅ 收到确认信息");
                Ok(SubmissionOutcome::Confirmed { response })
            }
            Err(e) => {
                enter(SubmissionStage::ConfirmationTimeout);
                warn!("⚠️ 未等到确认信息: {}", e);
                Ok(SubmissionOutcome::ConfirmationTimeout)
            }
        }
    }

    async fn wait_for_confirmation(&self, page: &dyn FormPage) -> AppResult<String> {
        page.wait_for_selector(&self.selectors.confirmation, self.confirmation_timeout)
            .await?;
        let text = page.inner_text(&self.selectors.confirmation).await?;
        Ok(text.trim().to_string())
    }
}

fn enter(stage: SubmissionStage) {
    debug!("阶段: {:?}", stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, BrowserError};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// 记录所有调用（及调用时刻）的假页面
    struct FakePage {
        selectors: FormSelectors,
        captcha_text: Option<String>,
        form_loads: bool,
        confirmation: Option<String>,
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl FakePage {
        fn new(captcha_text: &str) -> Self {
            Self {
                selectors: FormSelectors::default(),
                captcha_text: Some(captcha_text.to_string()),
                form_loads: true,
                confirmation: Some("Thank you".to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }

        fn called_at(&self, prefix: &str) -> Instant {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .find(|(c, _)| c.starts_with(prefix))
                .map(|(_, at)| *at)
                .unwrap()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push((call, Instant::now()));
        }

        fn timeout(selector: &str, timeout: Duration) -> AppError {
            AppError::Browser(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            })
        }
    }

    #[async_trait]
    impl FormPage for FakePage {
        async fn goto(&self, url: &str) -> AppResult<()> {
            self.record(format!("goto {}", url));
            Ok(())
        }

        async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> AppResult<()> {
            self.record(format!("wait {}", selector));
            if selector == self.selectors.first_name && !self.form_loads {
                return Err(Self::timeout(selector, timeout));
            }
            if selector == self.selectors.confirmation && self.confirmation.is_none() {
                return Err(Self::timeout(selector, timeout));
            }
            Ok(())
        }

        async fn fill(&self, selector: &str, value: &str) -> AppResult<()> {
            self.record(format!("fill {}={}", selector, value));
            Ok(())
        }

        async fn attach_file(&self, selector: &str, file_path: &Path) -> AppResult<()> {
            self.record(format!("attach {}={}", selector, file_path.display()));
            Ok(())
        }

        async fn inner_text(&self, selector: &str) -> AppResult<String> {
            if selector == self.selectors.captcha_label {
                return self
                    .captcha_text
                    .clone()
                    .ok_or_else(|| AppError::Browser(BrowserError::SelectorNotFound(selector.to_string())));
            }
            if selector == self.selectors.confirmation {
                return Ok(self.confirmation.clone().unwrap_or_default());
            }
            Ok(String::new())
        }

        async fn click(&self, selector: &str) -> AppResult<()> {
            self.record(format!("click {}", selector));
            Ok(())
        }
    }

    fn flow() -> SubmissionFlow {
        SubmissionFlow::new(&Config {
            settle_pause_ms: 0,
            ..Config::default()
        })
    }

    fn request() -> SubmissionRequest {
        SubmissionRequest::new("/tmp/uploads/a.pdf")
    }

    #[tokio::test]
    async fn test_confirmed_submission() {
        let page = FakePage::new("Math: 5 + 7 = ?");
        let outcome = flow().run(&page, &request()).await.unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::Confirmed {
                response: "Thank you".to_string()
            }
        );
        assert_eq!(
            outcome.to_string(),
            "Submission successful! Response: Thank you"
        );

        let calls = page.calls();
        assert_eq!(
            calls,
            vec![
                "goto https://curtiscenter.math.ucla.edu/ammp-unofficial-transcript/",
                "wait #nf-field-1660",
                "fill #nf-field-1660=Test",
                "fill #nf-field-1661=User",
                "fill #nf-field-1662=test@example.com",
                "attach #nf-field-1666=/tmp/uploads/a.pdf",
                "fill #nf-field-2851=12",
                "click #nf-field-1667",
                "wait .nf-response-msg",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_between_captcha_answer_and_submit() {
        let flow = SubmissionFlow::new(&Config {
            settle_pause_ms: 1000,
            ..Config::default()
        });
        let page = FakePage::new("3 + 4");
        flow.run(&page, &request()).await.unwrap();

        let answered = page.called_at("fill #nf-field-2851");
        let clicked = page.called_at("click #nf-field-1667");
        assert!(clicked.duration_since(answered) >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_unsolvable_captcha_never_submits() {
        let page = FakePage::new("What is five plus seven?");
        let outcome = flow().run(&page, &request()).await.unwrap();

        assert_eq!(outcome.stage(), SubmissionStage::CaptchaFailed);
        assert!(!outcome.to_string().contains(SUCCESS_MARKER));
        assert!(page.calls().iter().all(|c| !c.starts_with("click")));
        assert!(page.calls().iter().all(|c| !c.contains("#nf-field-2851")));
    }

    #[tokio::test]
    async fn test_missing_captcha_label_is_unsolvable() {
        let mut page = FakePage::new("");
        page.captcha_text = None;
        let outcome = flow().run(&page, &request()).await.unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::CaptchaUnsolvable {
                question: String::new()
            }
        );
    }

    #[tokio::test]
    async fn test_confirmation_timeout() {
        let mut page = FakePage::new("1 + 1 = ?");
        page.confirmation = None;
        let outcome = flow().run(&page, &request()).await.unwrap();

        assert_eq!(outcome, SubmissionOutcome::ConfirmationTimeout);
        assert!(outcome.stage().is_terminal());
        assert!(!outcome.to_string().contains(SUCCESS_MARKER));
        assert!(page.calls().contains(&"click #nf-field-1667".to_string()));
    }

    #[tokio::test]
    async fn test_form_load_timeout_is_error() {
        let mut page = FakePage::new("1 + 1 = ?");
        page.form_loads = false;
        let err = flow().run(&page, &request()).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(page.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_custom_identity() {
        let config = Config {
            settle_pause_ms: 0,
            identity: Identity {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
            },
            ..Config::default()
        };
        let page = FakePage::new("2 + 2");
        SubmissionFlow::new(&config).run(&page, &request()).await.unwrap();

        let calls = page.calls();
        assert!(calls.contains(&"fill #nf-field-1660=Ada".to_string()));
        assert!(calls.contains(&"fill #nf-field-1662=ada@example.com".to_string()));
    }
}
