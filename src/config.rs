use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 表单字段选择器
///
/// 这些选择器对应线上表单的 DOM，表单改版后需要同步修改
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormSelectors {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub file_upload: String,
    /// 算术验证码的题目 label
    pub captcha_label: String,
    pub captcha_answer: String,
    pub submit: String,
    /// 提交后出现的确认信息
    pub confirmation: String,
}

impl Default for FormSelectors {
    fn default() -> Self {
        Self {
            first_name: "#nf-field-1660".to_string(),
            last_name: "#nf-field-1661".to_string(),
            email: "#nf-field-1662".to_string(),
            file_upload: "#nf-field-1666".to_string(),
            captcha_label: r#"label[id^="nf-label-field-2851"]"#.to_string(),
            captcha_answer: "#nf-field-2851".to_string(),
            submit: "#nf-field-1667".to_string(),
            confirmation: ".nf-response-msg".to_string(),
        }
    }
}

/// 提交者身份信息（所有提交共用同一组值）
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@example.com".to_string(),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 目标表单URL
    pub form_url: String,
    /// 上传文件在服务器上的目录（仅用于推测URL，不做校验）
    pub upload_url_base: String,
    pub selectors: FormSelectors,
    pub identity: Identity,
    /// 上传文件的暂存目录
    pub staging_dir: PathBuf,
    /// 已处理标识的记录文件（列表模式使用）
    pub history_file: PathBuf,
    /// 待处理 PDF 列表文件（列表模式使用）
    pub source_list_file: PathBuf,
    /// 子进程 worker 可执行文件，未设置时使用与当前程序同目录的 form_worker
    pub worker_program: Option<PathBuf>,
    /// 浏览器可执行文件，未设置时由 chromiumoxide 自动查找
    pub chrome_executable: Option<PathBuf>,
    pub headless: bool,
    /// 等待表单元素出现的超时（秒）
    pub element_timeout_secs: u64,
    /// 等待确认信息的超时（秒）
    pub confirmation_timeout_secs: u64,
    /// 填写验证码后、点击提交前的停顿（毫秒）
    pub settle_pause_ms: u64,
    /// 两次提交之间的间隔（秒）
    pub delay_seconds: u64,
    /// 输出日志文件
    pub output_log_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

/// 两次提交之间允许的最大间隔（秒）
pub const MAX_DELAY_SECONDS: u64 = 30;

impl Default for Config {
    fn default() -> Self {
        Self {
            form_url: "https://curtiscenter.math.ucla.edu/ammp-unofficial-transcript/".to_string(),
            upload_url_base: "https://curtiscenter.math.ucla.edu/wp-content/uploads/ninja-forms/76/1"
                .to_string(),
            selectors: FormSelectors::default(),
            identity: Identity::default(),
            staging_dir: PathBuf::from("temp_uploads"),
            history_file: PathBuf::from("upload_history.txt"),
            source_list_file: PathBuf::from("pdfs.txt"),
            worker_program: None,
            chrome_executable: None,
            headless: true,
            element_timeout_secs: 30,
            confirmation_timeout_secs: 15,
            settle_pause_ms: 1000,
            delay_seconds: 2,
            output_log_file: PathBuf::from("output.txt"),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 仅使用默认值和环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 加载配置：默认值 → TOML 文件（可选） → 环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        let default = self;
        let config = Self {
            form_url: env_string("FORM_URL").unwrap_or(default.form_url),
            upload_url_base: env_string("UPLOAD_URL_BASE").unwrap_or(default.upload_url_base),
            selectors: default.selectors,
            identity: Identity {
                first_name: env_string("FIRST_NAME").unwrap_or(default.identity.first_name),
                last_name: env_string("LAST_NAME").unwrap_or(default.identity.last_name),
                email: env_string("EMAIL").unwrap_or(default.identity.email),
            },
            staging_dir: env_string("STAGING_DIR").map(PathBuf::from).unwrap_or(default.staging_dir),
            history_file: env_string("HISTORY_FILE").map(PathBuf::from).unwrap_or(default.history_file),
            source_list_file: env_string("PDF_LIST_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.source_list_file),
            worker_program: env_string("WORKER_PROGRAM").map(PathBuf::from).or(default.worker_program),
            chrome_executable: env_string("CHROME_EXECUTABLE")
                .map(PathBuf::from)
                .or(default.chrome_executable),
            headless: env_parsed("HEADLESS", "bool")?.unwrap_or(default.headless),
            element_timeout_secs: env_parsed("ELEMENT_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.element_timeout_secs),
            confirmation_timeout_secs: env_parsed("CONFIRMATION_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.confirmation_timeout_secs),
            settle_pause_ms: env_parsed("SETTLE_PAUSE_MS", "u64")?.unwrap_or(default.settle_pause_ms),
            delay_seconds: env_parsed("DELAY_SECONDS", "u64")?.unwrap_or(default.delay_seconds),
            output_log_file: env_string("OUTPUT_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.output_log_file),
            verbose_logging: env_parsed("VERBOSE_LOGGING", "bool")?.unwrap_or(default.verbose_logging),
        };
        config.validate()?;
        Ok(config)
    }

    /// 检查取值范围
    pub fn validate(&self) -> AppResult<()> {
        if self.delay_seconds > MAX_DELAY_SECONDS {
            return Err(AppError::Config(ConfigError::OutOfRange {
                field: "delay_seconds".to_string(),
                value: self.delay_seconds,
                max: MAX_DELAY_SECONDS,
            }));
        }
        Ok(())
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn settle_pause(&self) -> Duration {
        Duration::from_millis(self.settle_pause_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_seconds)
    }

    /// 推测上传后的文件地址
    ///
    /// 只是按服务器目录规则拼接，并未真正验证文件是否存在于该地址
    pub fn assumed_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.upload_url_base.trim_end_matches('/'), file_name)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match env_string(name) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
    }
}
