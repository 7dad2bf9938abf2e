//! # Component Macros
//!
//! 为组件结构体生成 `Component` 描述符的派生宏。
//!
//! ## 属性
//!
//! 类型级 `#[component(...)]`：
//!
//! - `name = "id"` - 自定义组件标识
//! - `configuration` - 标记为配置源，其工厂方法在物化阶段执行
//! - `properties = "prefix"` - 标记为外部绑定组件，`Property<T>` 字段按前缀绑定
//! - `implements(dyn A, dyn B)` - 声明实现的接口
//! - `bean = "method"` - 声明工厂方法，可重复
//! - `init = "method"` - 声明初始化方法，返回 `()` 或 `Result<(), E>`，可重复
//! - `customize = path` - 以 `fn(DescriptorBuilder<Self>) -> DescriptorBuilder<Self>` 追加声明
//! - `scan` - 程序启动时提交到进程级候选目录，要求类型实现 `Default` 且调用方依赖 `ctor`
//!
//! 字段级：
//!
//! - `#[inject]` / `#[inject(named = "id", required)]` - `Inject<T>` 字段，`T` 为 `dyn Trait` 时按接口解析
//! - `#[value("${key}")]` / `#[value("${key}", default = "v")]` - `Value` 字段
//! - `#[property(name = "key")]` - 覆盖 `Property<T>` 字段的配置键
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use infrastructure_common::{Inject, Value};
//!
//! #[derive(Default, Component)]
//! #[component(implements(dyn Notifier), scan)]
//! pub struct AlertService {
//!     #[inject(named = "sms")]
//!     notifier: Inject<dyn Notifier>,
//!     #[value("${alert.threshold}", default = "3")]
//!     threshold: Value,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件派生宏
///
/// 为结构体实现 `infrastructure_common::Component`，按字段属性生成描述符。
#[proc_macro_derive(Component, attributes(component, inject, value, property))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
