use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pdf_bulk_uploader::config::MAX_DELAY_SECONDS;
use pdf_bulk_uploader::orchestrator::CONFIG_PATH_ENV;
use pdf_bulk_uploader::ui::{render_raw_logs, render_results, CliProgress};
use pdf_bulk_uploader::utils::logging::{
    append_result, init_log_file, log_startup, print_final_stats, ProcessingStats,
};
use pdf_bulk_uploader::{
    logger, BatchProcessor, Config, ListProcessor, ProcessWorker, SubmissionResult,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "pdf_bulk_uploader",
    version,
    about = "把多个 PDF 逐个自动提交到表单"
)]
struct Cli {
    /// TOML 配置文件
    #[arg(long, short, global = true, env = "PDF_UPLOADER_CONFIG")]
    config: Option<PathBuf>,

    /// 显示调试日志
    #[arg(long, short, global = true)]
    verbose: bool,

    /// 不显示进度条
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 上传指定的 PDF 文件
    Upload {
        /// 要上传的 PDF 文件（可多个）
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },
    /// 处理列表文件（pdfs.txt）中尚未处理的条目
    List {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// 两次提交之间的间隔（秒，0-30）
    #[arg(long, short, value_parser = clap::value_parser!(u64).range(0..=MAX_DELAY_SECONDS))]
    delay: Option<u64>,

    /// 把结果写成 JSON 报告
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("加载配置失败")?;
    logger::init_with_level(cli.verbose || config.verbose_logging);

    let run = match &cli.command {
        Command::Upload { run, .. } | Command::List { run } => run,
    };
    if let Some(delay) = run.delay {
        config.delay_seconds = delay;
    }

    let worker = build_worker(&config, cli.config.as_deref())?;
    let progress = if cli.quiet {
        CliProgress::hidden()
    } else {
        CliProgress::new()
    };

    init_log_file(&config.output_log_file)?;

    let results = match &cli.command {
        Command::Upload { files, .. } => {
            log_startup("批量上传模式", config.delay_seconds);
            info!("📄 待处理文件: {}", files.len());
            BatchProcessor::new(config.clone(), worker)
                .process_paths(files, &progress)
                .await
        }
        Command::List { .. } => {
            log_startup("列表模式", config.delay_seconds);
            ListProcessor::new(config.clone(), worker)
                .run(&progress)
                .await
                .context("列表模式运行失败")?
        }
    };

    for result in &results {
        append_result(&config.output_log_file, result)?;
    }

    print_results(&results);

    if let Some(report) = &run.report {
        write_report(report, &results)?;
        info!("📝 报告已写入: {}", report.display());
    }

    print_final_stats(&ProcessingStats::from_results(&results), &config.output_log_file);

    Ok(())
}

fn build_worker(config: &Config, config_path: Option<&Path>) -> Result<ProcessWorker> {
    let worker = ProcessWorker::from_config(config).context("找不到 worker 程序")?;
    Ok(match config_path {
        Some(path) => {
            let absolute = path
                .canonicalize()
                .with_context(|| format!("无法访问配置文件: {}", path.display()))?;
            worker.with_env(CONFIG_PATH_ENV, absolute.to_string_lossy())
        }
        None => worker,
    })
}

fn print_results(results: &[SubmissionResult]) {
    if results.is_empty() {
        println!("没有需要处理的文件");
        return;
    }

    println!("\nSubmission Results\n");
    print!("{}", render_results(results));

    let raw_logs = render_raw_logs(results);
    if !raw_logs.is_empty() {
        println!("\nRaw output of unsuccessful submissions:\n");
        print!("{}", raw_logs);
    }
}

fn write_report(path: &Path, results: &[SubmissionResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json).with_context(|| format!("无法写入报告: {}", path.display()))?;
    Ok(())
}
