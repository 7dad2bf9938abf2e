//! # 示例应用程序
//!
//! 演示组件发现、分层配置和依赖注入

mod components;

use clap::{Parser, ValueEnum};
use components::{ServerSettings, WelcomeService};
use infrastructure_composition::{Infrastructure, LoggingConfig};
use tracing::info;

/// 日志格式
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// 开发环境格式
    Dev,
    /// 生产环境 JSON 格式
    Prod,
}

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "组件容器示例应用")]
struct Args {
    /// 配置目录
    #[arg(short, long, default_value = "config")]
    config_dir: String,

    /// 激活环境，覆盖配置文件中的 server.profile
    #[arg(short, long)]
    profile: Option<String>,

    /// 日志格式
    #[arg(long, value_enum, default_value_t = LogFormat::Dev)]
    log_format: LogFormat,

    /// 欢迎请求次数
    #[arg(short, long, default_value_t = 2)]
    requests: u32,

    /// 启动后等待 Ctrl+C 再退出
    #[arg(long)]
    wait: bool,

    /// 配置覆盖项，形如 `--server.port=9000`
    #[arg(last = true)]
    overrides: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = match args.log_format {
        LogFormat::Dev => LoggingConfig::development(),
        LogFormat::Prod => LoggingConfig::production(),
    };
    let mut builder = Infrastructure::builder()
        .with_args(args.overrides.iter().cloned())
        .with_config_dir(&args.config_dir)
        .with_logging(logging)
        .add_package(module_path!())
        .scan_catalog();
    if let Some(profile) = &args.profile {
        builder = builder.with_profile(profile.clone());
    }
    let infrastructure = builder.build()?;

    let report = infrastructure.start().await?;
    info!(
        discovered = report.discovered,
        registered = report.registered,
        materialized = report.materialized,
        elapsed_ms = report.elapsed().num_milliseconds(),
        "容器就绪"
    );

    if let Some(server) = infrastructure.get_bean::<ServerSettings>()? {
        info!(port = server.port.get(), hosts = ?server.hosts.get(), "服务配置");
    }
    if let Some(welcome) = infrastructure.get_bean::<WelcomeService>()? {
        for _ in 0..args.requests {
            if let Some(message) = welcome.welcome() {
                println!("{}", message);
            }
        }
    }
    info!(beans = ?infrastructure.container().bean_names()?, "已注册组件");

    if args.wait {
        info!("等待退出信号");
        tokio::signal::ctrl_c().await?;
    }

    infrastructure.stop().await?;
    info!("应用已关闭");
    Ok(())
}
