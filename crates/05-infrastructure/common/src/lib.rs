//! # Infrastructure Common
//!
//! 这个 crate 提供了组件容器基础设施层的公共类型和工具。
//!
//! ## 核心组件
//!
//! - [`Component`] - 组件基础 trait，声明组件的描述符
//! - [`ComponentDescriptor`] - 组件可注入表面的声明式元数据
//! - [`Inject`] / [`Value`] / [`Property`] - 可注入字段槽位
//! - [`ContainerState`] - 容器初始化状态机
//! - [`Candidate`] - 发现阶段的候选类型
//!
//! ## 设计原则
//!
//! - 描述符一次构建，不在注入过程中反射类型
//! - 组件角色用枚举表达，在发现阶段确定
//! - 不提供全局容器，每个容器都是独立的值

pub mod component;
pub mod descriptor;
pub mod discovery;
pub mod errors;
pub mod lifecycle;
pub mod metadata;
pub mod slot;

pub use component::*;
pub use descriptor::*;
pub use discovery::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
pub use slot::*;
