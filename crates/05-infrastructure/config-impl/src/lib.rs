//! # Configuration Implementation
//!
//! 配置环境的具体实现，提供各种配置源和启动加载流程。
//!
//! ## 主要组件
//!
//! - [`LayeredEnvironment`] - 按优先级合并的分层环境
//! - [`EnvironmentLoader`] - 命令行 / 启动文件 / 环境文件 / 环境变量的组装
//! - [`FilePropertySource`] - properties / TOML / YAML / JSON 文件配置源
//! - [`CommandLinePropertySource`] - `--key=value` 命令行配置源
//! - [`EnvironmentVariablePropertySource`] - 环境变量配置源
//! - [`MapPropertySource`] - 内存配置源

pub mod loader;
pub mod manager;
pub mod providers;

pub use loader::*;
pub use manager::*;
pub use providers::*;
