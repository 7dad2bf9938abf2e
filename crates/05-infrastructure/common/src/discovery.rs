//! 候选组件与类型目录
//!
//! Rust 没有运行期类路径扫描，候选类型通过目录显式提交：
//! 手工构造 [`Candidate`]，或由 `#[component(scan)]` 在程序启动时
//! 调用 [`submit_candidate`] 登记到进程级目录。目录只保存类型，
//! 不保存实例，每个容器各自构造自己的单例。

use crate::component::{Component, RoleMarker};
use crate::descriptor::{BeanRef, ComponentDescriptor};
use crate::errors::{BoxError, DependencyError};
use crate::metadata::TypeInfo;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// 无参构造函数
pub type Constructor = Arc<dyn Fn() -> Result<BeanRef, BoxError> + Send + Sync>;

/// 候选类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// 可实例化的具体类型
    Concrete,
    /// 抽象类型
    Abstract,
    /// 接口
    Interface,
    /// 枚举
    Enum,
}

/// 发现阶段的候选类型
#[derive(Clone)]
pub struct Candidate {
    type_info: TypeInfo,
    kind: CandidateKind,
    descriptor: Option<ComponentDescriptor>,
    constructor: Option<Constructor>,
}

impl Candidate {
    /// 可通过 `Default` 构造的组件
    pub fn of<T: Component + Default>() -> Self {
        Self::with_constructor(|| Ok(T::default()))
    }

    /// 使用自定义（可能失败的）无参构造函数
    pub fn with_constructor<T, F>(constructor: F) -> Self
    where
        T: Component,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let constructor: Constructor =
            Arc::new(move || constructor().map(|instance| Arc::new(instance) as BeanRef));
        Self {
            type_info: TypeInfo::of::<T>(),
            kind: CandidateKind::Concrete,
            descriptor: Some(T::describe()),
            constructor: Some(constructor),
        }
    }

    /// 没有可用无参构造函数的组件
    pub fn without_constructor<T: Component>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            kind: CandidateKind::Concrete,
            descriptor: Some(T::describe()),
            constructor: None,
        }
    }

    /// 非具体类型，发现阶段总会被排除
    pub fn non_concrete<T: ?Sized + 'static>(kind: CandidateKind) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            kind,
            descriptor: None,
            constructor: None,
        }
    }

    /// 类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 种类
    pub fn kind(&self) -> CandidateKind {
        self.kind
    }

    /// 角色标记，没有描述符的类型不携带标记
    pub fn marker(&self) -> Option<RoleMarker> {
        self.descriptor.as_ref().map(|d| d.role().marker())
    }

    /// 描述符
    pub fn descriptor(&self) -> Option<&ComponentDescriptor> {
        self.descriptor.as_ref()
    }

    /// 调用无参构造函数
    pub fn construct(&self) -> Result<BeanRef, DependencyError> {
        let constructor = self.constructor.as_ref().ok_or_else(|| {
            DependencyError::construction(&self.type_info.name, "没有可用的无参构造函数")
        })?;
        constructor().map_err(|e| DependencyError::construction(&self.type_info.name, e.to_string()))
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("type", &self.type_info.name)
            .field("kind", &self.kind)
            .field("marker", &self.marker())
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// 进程级候选类型目录
static CANDIDATE_CATALOG: Lazy<RwLock<Vec<fn() -> Candidate>>> =
    Lazy::new(|| RwLock::new(Vec::new()));

/// 向目录提交候选类型
pub fn submit_candidate(factory: fn() -> Candidate) {
    CANDIDATE_CATALOG.write().push(factory);
}

/// 目录中所有候选类型，按提交顺序
pub fn catalog_candidates() -> Vec<Candidate> {
    CANDIDATE_CATALOG.read().iter().map(|factory| factory()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Clock;

    impl Component for Clock {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder().build()
        }
    }

    trait Marker {}

    #[test]
    fn test_candidate_construct() {
        let candidate = Candidate::of::<Clock>();
        assert_eq!(candidate.kind(), CandidateKind::Concrete);
        assert_eq!(candidate.marker(), Some(RoleMarker::Component));
        let bean = candidate.construct().unwrap();
        assert!(bean.downcast::<Clock>().is_ok());
    }

    #[test]
    fn test_missing_and_failing_constructor() {
        let missing = Candidate::without_constructor::<Clock>();
        assert!(matches!(
            missing.construct(),
            Err(DependencyError::ConstructionFailed { .. })
        ));

        let failing = Candidate::with_constructor::<Clock, _>(|| Err("boom".into()));
        let err = failing.construct().unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_non_concrete_has_no_marker() {
        let candidate = Candidate::non_concrete::<dyn Marker>(CandidateKind::Interface);
        assert_eq!(candidate.marker(), None);
        assert!(candidate.construct().is_err());
    }

    #[test]
    fn test_catalog_submission() {
        fn clock() -> Candidate {
            Candidate::of::<Clock>()
        }
        submit_candidate(clock);
        assert!(catalog_candidates()
            .iter()
            .any(|c| c.type_info().id == std::any::TypeId::of::<Clock>()));
    }
}
