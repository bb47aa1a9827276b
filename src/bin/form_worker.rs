//! 单文件提交 worker
//!
//! 用法：`form_worker <file_path>`
//!
//! 确认成功时 stdout 输出 `Submission successful! Response: ...`；
//! 验证码无法求解或确认超时时输出提示并以 0 退出；其他错误写入 stderr 并以非 0 退出

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pdf_bulk_uploader::orchestrator::CONFIG_PATH_ENV;
use pdf_bulk_uploader::{logger, run_single_file, Config};

#[derive(Parser, Debug)]
#[command(name = "form_worker", about = "把一个 PDF 提交到表单")]
struct Args {
    /// 要上传的 PDF 路径
    file_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("加载配置失败")?;

    logger::init_with_level(config.verbose_logging);

    let outcome = run_single_file(&config, &args.file_path)
        .await
        .with_context(|| format!("Error processing {}", args.file_path.display()))?;

    println!("{}", outcome);

    Ok(())
}
