//! # Configuration Abstractions
//!
//! 配置抽象层，定义容器读取配置所需的核心接口。
//!
//! ## 核心接口
//!
//! - [`ConfigurationEnvironment`] - 分层键值配置环境
//! - [`PropertySource`] - 单个配置源

pub mod environment;
pub mod provider;

pub use environment::*;
pub use provider::*;
