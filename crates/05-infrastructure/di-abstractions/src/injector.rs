//! 注入单元抽象接口
//!
//! 每个注入单元只处理一类依赖，不跨调用保存状态。单元按流水线中的
//! 顺序对每个注册表条目执行，输入是本轮的只读注册表快照。

use crate::container::ContainerConfig;
use crate::registry::{RegistryEntry, RegistrySnapshot};
use config_abstractions::ConfigurationEnvironment;
use infrastructure_common::{BeanRef, ComponentDescriptor, DependencyResult, ProducedBean};
use std::fmt;

/// 注入单元所属阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionStage {
    /// 注入轮次：写入字段
    Wiring,
    /// 物化步骤：在两轮注入之间产出新组件
    Materialization,
}

/// 注入轮次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionPass {
    /// 物化之前的第一轮
    First,
    /// 物化之后的第二轮，也用于就绪后新增的组件
    Second,
}

impl InjectionPass {
    /// 是否为最后一轮；必需依赖只在最后一轮判定缺失
    pub fn is_final(self) -> bool {
        matches!(self, Self::Second)
    }
}

/// 注入上下文，每轮每个条目新建一次
pub struct InjectionContext<'a> {
    /// 目标条目
    pub entry: &'a RegistryEntry,
    /// 本轮注册表快照
    pub registry: &'a RegistrySnapshot,
    /// 配置环境
    pub environment: &'a dyn ConfigurationEnvironment,
    /// 容器配置
    pub config: &'a ContainerConfig,
    /// 当前轮次
    pub pass: InjectionPass,
}

impl<'a> InjectionContext<'a> {
    /// 创建上下文
    pub fn new(
        entry: &'a RegistryEntry,
        registry: &'a RegistrySnapshot,
        environment: &'a dyn ConfigurationEnvironment,
        config: &'a ContainerConfig,
        pass: InjectionPass,
    ) -> Self {
        Self {
            entry,
            registry,
            environment,
            config,
            pass,
        }
    }

    /// 目标描述符
    pub fn descriptor(&self) -> &ComponentDescriptor {
        self.entry.descriptor()
    }

    /// 目标实例
    pub fn instance(&self) -> &BeanRef {
        self.entry.instance()
    }

    /// 目标标识
    pub fn identifier(&self) -> &str {
        self.entry.identifier()
    }
}

impl fmt::Debug for InjectionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionContext")
            .field("entry", self.entry)
            .field("registry", &self.registry.len())
            .field("pass", &self.pass)
            .finish()
    }
}

/// 注入结果
#[derive(Debug, Default)]
pub struct InjectionOutcome {
    /// 物化产出的新组件
    pub materialized: Vec<ProducedBean>,
}

impl InjectionOutcome {
    /// 没有产出
    pub fn empty() -> Self {
        Self::default()
    }

    /// 带产出
    pub fn with_materialized(materialized: Vec<ProducedBean>) -> Self {
        Self { materialized }
    }
}

/// 注入单元 trait
pub trait Injector: Send + Sync {
    /// 单元名称
    fn name(&self) -> &str;

    /// 所属阶段
    fn stage(&self) -> InjectionStage {
        InjectionStage::Wiring
    }

    /// 处理一个条目；目标不携带相关角色或字段时为空操作
    fn inject(&self, context: &InjectionContext<'_>) -> DependencyResult<InjectionOutcome>;
}
