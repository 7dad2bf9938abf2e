//! 组件发现抽象接口
//!
//! 发现器根据包集合、角色标记和类型过滤器挑选候选类型，
//! 并通过无参构造函数实例化。

use async_trait::async_trait;
use infrastructure_common::{BeanRef, Candidate, ComponentDescriptor, ComponentResult, RoleMarker};
use std::fmt;
use std::sync::Arc;

/// 类型过滤器
///
/// 多个过滤器之间是“或”关系：未注册任何过滤器，或至少一个过滤器接受时，候选类型通过。
pub trait TypeFilter: Send + Sync {
    /// 是否接受候选类型
    fn accepts(&self, candidate: &Candidate) -> bool;
}

impl<F> TypeFilter for F
where
    F: Fn(&Candidate) -> bool + Send + Sync,
{
    fn accepts(&self, candidate: &Candidate) -> bool {
        self(candidate)
    }
}

/// 发现条件
#[derive(Clone)]
pub struct DiscoveryCriteria {
    /// 包（模块路径）集合，为空表示不限制
    pub packages: Vec<String>,
    /// 识别的角色标记
    pub markers: Vec<RoleMarker>,
    /// 类型过滤器
    pub filters: Vec<Arc<dyn TypeFilter>>,
}

impl DiscoveryCriteria {
    /// 创建发现条件，默认识别所有角色标记
    pub fn new() -> Self {
        Self {
            packages: Vec::new(),
            markers: RoleMarker::ALL.to_vec(),
            filters: Vec::new(),
        }
    }

    /// 添加包
    pub fn add_package<S: Into<String>>(mut self, package: S) -> Self {
        self.packages.push(package.into());
        self
    }

    /// 替换识别的角色标记
    pub fn with_markers<I: IntoIterator<Item = RoleMarker>>(mut self, markers: I) -> Self {
        self.markers = markers.into_iter().collect();
        self
    }

    /// 添加类型过滤器
    pub fn add_filter<F: TypeFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// 候选类型是否满足过滤器
    pub fn passes_filters(&self, candidate: &Candidate) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.accepts(candidate))
    }
}

impl Default for DiscoveryCriteria {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DiscoveryCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryCriteria")
            .field("packages", &self.packages)
            .field("markers", &self.markers)
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// 发现并实例化的组件
pub struct DiscoveredComponent {
    /// 组件描述符
    pub descriptor: ComponentDescriptor,
    /// 新构造的实例
    pub instance: BeanRef,
}

impl fmt::Debug for DiscoveredComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredComponent")
            .field("identifier", &self.descriptor.identifier())
            .finish()
    }
}

/// 类型发现器 trait
#[async_trait]
pub trait TypeDiscoverer: Send + Sync {
    /// 发现器名称
    fn name(&self) -> &str;

    /// 发现组件；构造失败的候选类型被丢弃，不视为错误
    async fn discover(&self, criteria: &DiscoveryCriteria) -> ComponentResult<Vec<DiscoveredComponent>>;
}
