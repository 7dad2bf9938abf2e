//! 注入流水线
//!
//! 注入单元在构建时显式排序。一轮注入先对注册表做一次快照，然后按
//! 注册顺序对每个条目依次执行所有注入轮次单元；第一个致命错误终止本轮。

use crate::injectors::{FactoryMethodInjector, FieldInjector, PropertyInjector, ValueInjector};
use config_abstractions::ConfigurationEnvironment;
use di_abstractions::{
    ContainerConfig, InjectionContext, InjectionPass, InjectionStage, Injector, RegistryEntry,
    RegistrySnapshot,
};
use infrastructure_common::{DependencyResult, ProducedBean};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 注入流水线
#[derive(Clone, Default)]
pub struct InjectionPipeline {
    units: Vec<Arc<dyn Injector>>,
}

impl InjectionPipeline {
    /// 创建空流水线
    pub fn new() -> Self {
        Self::default()
    }

    /// 标准流水线：字段、标量值、结构化配置、工厂方法
    pub fn standard() -> Self {
        Self::new()
            .with_unit(FieldInjector::new())
            .with_unit(ValueInjector::new())
            .with_unit(PropertyInjector::new())
            .with_unit(FactoryMethodInjector::new())
    }

    /// 追加注入单元
    pub fn with_unit<I: Injector + 'static>(mut self, unit: I) -> Self {
        self.units.push(Arc::new(unit));
        self
    }

    /// 追加共享的注入单元
    pub fn with_shared_unit(mut self, unit: Arc<dyn Injector>) -> Self {
        self.units.push(unit);
        self
    }

    /// 单元名称，按执行顺序
    pub fn unit_names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name()).collect()
    }

    fn stage(&self, stage: InjectionStage) -> impl Iterator<Item = &Arc<dyn Injector>> {
        self.units.iter().filter(move |u| u.stage() == stage)
    }

    /// 对快照中的全部条目执行一轮注入，返回处理的条目数
    pub fn wire(
        &self,
        snapshot: &RegistrySnapshot,
        environment: &dyn ConfigurationEnvironment,
        config: &ContainerConfig,
        pass: InjectionPass,
    ) -> DependencyResult<usize> {
        info!(pass = ?pass, entries = snapshot.len(), "开始注入");
        for entry in snapshot.entries() {
            self.wire_entry(entry, snapshot, environment, config, pass)?;
        }
        Ok(snapshot.len())
    }

    /// 对单个条目执行所有注入轮次单元
    pub fn wire_entry(
        &self,
        entry: &RegistryEntry,
        snapshot: &RegistrySnapshot,
        environment: &dyn ConfigurationEnvironment,
        config: &ContainerConfig,
        pass: InjectionPass,
    ) -> DependencyResult<()> {
        let context = InjectionContext::new(entry, snapshot, environment, config, pass);
        for unit in self.stage(InjectionStage::Wiring) {
            debug!(unit = unit.name(), component = entry.identifier(), "执行注入单元");
            unit.inject(&context)?;
        }
        Ok(())
    }

    /// 对快照中的全部条目执行物化，返回产出的新组件
    pub fn materialize(
        &self,
        snapshot: &RegistrySnapshot,
        environment: &dyn ConfigurationEnvironment,
        config: &ContainerConfig,
    ) -> DependencyResult<Vec<ProducedBean>> {
        let mut produced = Vec::new();
        for entry in snapshot.entries() {
            produced.extend(self.materialize_entry(entry, snapshot, environment, config)?);
        }
        Ok(produced)
    }

    /// 对单个条目执行所有物化单元
    pub fn materialize_entry(
        &self,
        entry: &RegistryEntry,
        snapshot: &RegistrySnapshot,
        environment: &dyn ConfigurationEnvironment,
        config: &ContainerConfig,
    ) -> DependencyResult<Vec<ProducedBean>> {
        let context =
            InjectionContext::new(entry, snapshot, environment, config, InjectionPass::First);
        let mut produced = Vec::new();
        for unit in self.stage(InjectionStage::Materialization) {
            produced.extend(unit.inject(&context)?.materialized);
        }
        Ok(produced)
    }
}

impl fmt::Debug for InjectionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPipeline")
            .field("units", &self.unit_names())
            .finish()
    }
}
