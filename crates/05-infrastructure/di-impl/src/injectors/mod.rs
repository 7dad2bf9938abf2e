//! 注入单元实现
//!
//! 标准流水线按以下顺序执行：
//! 1. [`FieldInjector`] - 组件依赖字段
//! 2. [`ValueInjector`] - `${key}` 标量值
//! 3. [`PropertyInjector`] - 前缀绑定配置
//! 4. [`FactoryMethodInjector`] - 配置源工厂方法物化

mod factory;
mod field;
mod property;
mod value;

pub use factory::FactoryMethodInjector;
pub use field::FieldInjector;
pub use property::PropertyInjector;
pub use value::ValueInjector;
