//! 元数据定义
//!
//! 提供组件和类型的元数据信息

use std::any::TypeId;
use std::fmt;

/// 类型信息
///
/// `name` 是类型的规范名称（完整路径），同时作为组件的默认标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 规范类型名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 模块路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息，支持 `dyn Trait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        let name = canonical_name(std::any::type_name::<T>());
        let module_path = module_of(&name);
        Self {
            name,
            id: TypeId::of::<T>(),
            module_path,
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        let head = self.name.split('<').next().unwrap_or(&self.name);
        let start = head.rfind("::").map_or(0, |idx| idx + 2);
        &self.name[start..]
    }

    /// 模块路径是否位于给定包（模块前缀）之下
    pub fn in_package(&self, package: &str) -> bool {
        let package = package.trim_end_matches("::");
        package.is_empty()
            || self.module_path == package
            || self
                .module_path
                .strip_prefix(package)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 去掉 trait object 的 `dyn ` 前缀和自动 trait 约束
fn canonical_name(raw: &str) -> String {
    match raw.strip_prefix("dyn ") {
        Some(rest) => rest.split(" + ").next().unwrap_or(rest).to_string(),
        None => raw.to_string(),
    }
}

fn module_of(name: &str) -> String {
    let head = name.split('<').next().unwrap_or(name);
    head.rsplit_once("::")
        .map(|(module, _)| module.to_string())
        .unwrap_or_default()
}
