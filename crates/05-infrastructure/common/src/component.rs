//! 组件基础接口定义
//!
//! 提供所有托管组件必须实现的基础 trait 以及组件角色分类

use crate::descriptor::{ComponentDescriptor, DescriptorBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件基础 trait
///
/// 组件通过 [`Component::describe`] 一次性声明自己的可注入表面，
/// 容器不会在运行期反射类型结构。通常由 `#[derive(Component)]` 生成。
pub trait Component: Send + Sync + 'static {
    /// 构建组件描述符
    fn describe() -> ComponentDescriptor;

    /// 以默认标识开始构建描述符
    fn descriptor_builder() -> DescriptorBuilder<Self>
    where
        Self: Sized,
    {
        DescriptorBuilder::new()
    }
}

/// 组件角色，在发现阶段确定并保存在描述符中
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentRole {
    /// 普通组件
    Component,
    /// 配置源：其工厂方法会被物化为新的组件
    ConfigurationSource,
    /// 外部绑定组件：字段按 `prefix.<field>` 从配置环境绑定
    PropertyBound {
        /// 配置前缀
        prefix: String,
    },
}

impl ComponentRole {
    /// 对应的角色标记
    pub fn marker(&self) -> RoleMarker {
        match self {
            Self::Component => RoleMarker::Component,
            Self::ConfigurationSource => RoleMarker::ConfigurationSource,
            Self::PropertyBound { .. } => RoleMarker::PropertyBound,
        }
    }

    /// 绑定前缀（仅外部绑定组件）
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Self::PropertyBound { prefix } => Some(prefix),
            _ => None,
        }
    }

    /// 是否为配置源
    pub fn is_configuration_source(&self) -> bool {
        matches!(self, Self::ConfigurationSource)
    }
}

impl Default for ComponentRole {
    fn default() -> Self {
        Self::Component
    }
}

/// 不带参数的角色标记，用于发现阶段的过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleMarker {
    /// 普通组件
    Component,
    /// 配置源
    ConfigurationSource,
    /// 外部绑定组件
    PropertyBound,
}

impl RoleMarker {
    /// 全部标记
    pub const ALL: [RoleMarker; 3] = [
        RoleMarker::Component,
        RoleMarker::ConfigurationSource,
        RoleMarker::PropertyBound,
    ];
}

impl fmt::Display for RoleMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Component => "component",
            Self::ConfigurationSource => "configuration",
            Self::PropertyBound => "properties",
        };
        f.write_str(name)
    }
}
