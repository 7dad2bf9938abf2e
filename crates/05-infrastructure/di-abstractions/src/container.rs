//! 容器抽象接口
//!
//! 容器策略配置与对外的组件查询接口。

use infrastructure_common::{BeanHandle, BeanRef, ContainerResult, ContainerState, TypeInfo};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::sync::Arc;

/// 必需依赖策略
///
/// 决定零候选的组件依赖字段是致命错误还是保持未设置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredPolicy {
    /// 字段声明为必需时致命
    #[default]
    FieldDeclared,
    /// 所有依赖字段都视为必需
    AllRequired,
    /// 所有依赖字段都视为可选
    NoneRequired,
}

impl RequiredPolicy {
    /// 字段缺少依赖时是否致命
    pub fn is_required(self, declared: bool) -> bool {
        match self {
            Self::FieldDeclared => declared,
            Self::AllRequired => true,
            Self::NoneRequired => false,
        }
    }
}

/// 重复标识策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 覆盖旧条目并记录警告
    #[default]
    Overwrite,
    /// 拒绝重复注册，致命
    Reject,
}

/// 容器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 必需依赖策略
    pub required_policy: RequiredPolicy,
    /// 重复标识策略
    pub duplicate_policy: DuplicatePolicy,
}

impl ContainerConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置必需依赖策略
    pub fn with_required_policy(mut self, policy: RequiredPolicy) -> Self {
        self.required_policy = policy;
        self
    }

    /// 设置重复标识策略
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// 组件查询接口
///
/// 查询与移除在 `UNINITIALIZED` 和 `FAILED` 状态下返回前置条件错误。
pub trait BeanFactory: Send + Sync {
    /// 当前容器状态
    fn state(&self) -> ContainerState;

    /// 按标识查询
    fn get_bean_by_name(&self, identifier: &str) -> ContainerResult<Option<BeanRef>>;

    /// 查询所有可视为目标类型的组件，按注册顺序
    fn get_beans_by_type_id(&self, target: TypeId) -> ContainerResult<Vec<BeanHandle>>;

    /// 移除组件，返回是否存在
    fn remove_bean(&self, identifier: &str) -> ContainerResult<bool>;

    /// 移除所有组件
    fn remove_all(&self) -> ContainerResult<()>;
}

impl<'a> dyn BeanFactory + 'a {
    /// 以规范类型名查询具体类型组件
    pub fn get<T: Send + Sync + 'static>(&self) -> ContainerResult<Option<Arc<T>>> {
        Ok(self
            .get_bean_by_name(&TypeInfo::of::<T>().name)?
            .and_then(|bean| bean.downcast::<T>().ok()))
    }

    /// 查询所有可视为 `T` 的组件
    pub fn get_all<T: ?Sized + 'static>(&self) -> ContainerResult<Vec<Arc<T>>> {
        Ok(self
            .get_beans_by_type_id(TypeId::of::<T>())?
            .into_iter()
            .filter_map(|handle| handle.downcast::<Arc<T>>().ok().map(|arc| *arc))
            .collect())
    }
}
