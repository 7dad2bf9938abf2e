//! # 基础设施组合层
//!
//! 将分层配置环境、日志和应用容器组合成一个可运行的整体。
//!
//! ## 主要功能
//!
//! - **基础设施构建器**: 使用构建者模式组装配置源、发现条件和容器策略
//! - **日志初始化**: 开发 / 生产两套 `tracing` 输出配置
//! - **生命周期管理**: 驱动容器初始化，停止时清理全部组件
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{Infrastructure, LoggingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let infrastructure = Infrastructure::builder()
//!         .with_args(std::env::args().skip(1))
//!         .with_config_dir("config")
//!         .with_logging(LoggingConfig::development())
//!         .scan_catalog()
//!         .build()?;
//!
//!     infrastructure.start().await?;
//!
//!     let port: Option<u16> = infrastructure.get_config("server.port")?;
//!     println!("端口: {:?}", port);
//!
//!     infrastructure.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod infrastructure;


// 重新导出主要类型
pub use builder::{InfrastructureBuilder, LoggingConfig, DUPLICATE_POLICY_KEY, REQUIRED_POLICY_KEY};
pub use infrastructure::{Infrastructure, InfrastructureMetrics, InfrastructureStatus};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
