//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件注册、注入和发现的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`Injector`] - 注入单元接口
//! - [`TypeDiscoverer`] - 类型发现器接口
//! - [`BeanFactory`] - 组件查询接口

pub mod container;
pub mod discovery;
pub mod injector;
pub mod registry;

pub use container::*;
pub use discovery::*;
pub use injector::*;
pub use registry::*;
