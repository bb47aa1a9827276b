//! 日志初始化
//!
//! 日志统一写到 stderr，worker 的 stdout 只留给提交结果

use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

/// 使用默认级别 `info` 初始化日志
pub fn init() {
    init_with_level(false);
}

/// 初始化日志，`verbose` 为真时默认级别为 `debug`
///
/// `RUST_LOG` 优先于默认级别。重复调用时忽略（测试中常见）
///
/// stderr 不是终端时（例如被编排层捕获）不输出颜色控制符
pub fn init_with_level(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
