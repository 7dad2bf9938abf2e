//! 配置源工厂方法物化

use di_abstractions::{InjectionContext, InjectionOutcome, InjectionStage, Injector};
use infrastructure_common::{DependencyError, DependencyResult, MethodKind};
use tracing::{debug, info};

/// 工厂方法物化单元
///
/// 对配置源组件的每个工厂方法调用一次，产出的新组件由容器在两轮注入
/// 之间注册。无返回值的工厂方法属于静态配置错误。
#[derive(Debug, Default, Clone, Copy)]
pub struct FactoryMethodInjector;

impl FactoryMethodInjector {
    /// 创建物化单元
    pub fn new() -> Self {
        Self
    }
}

impl Injector for FactoryMethodInjector {
    fn name(&self) -> &str {
        "factory"
    }

    fn stage(&self) -> InjectionStage {
        InjectionStage::Materialization
    }

    fn inject(&self, context: &InjectionContext<'_>) -> DependencyResult<InjectionOutcome> {
        let descriptor = context.descriptor();
        if !descriptor.role().is_configuration_source() {
            return Ok(InjectionOutcome::empty());
        }

        let type_name = &descriptor.type_info().name;
        let mut materialized = Vec::new();
        for method in descriptor.methods().iter().filter(|m| m.bean) {
            if let MethodKind::Unit { .. } = method.kind {
                return Err(DependencyError::factory(
                    type_name,
                    &method.name,
                    "工厂方法没有返回值",
                ));
            }

            debug!(component = context.identifier(), method = method.name.as_str(), "调用工厂方法");
            let produced = method
                .invoke(context.instance(), context.registry)
                .map_err(|e| DependencyError::factory(type_name, &method.name, e.to_string()))?;
            if let Some(produced) = produced {
                info!(
                    component = context.identifier(),
                    method = method.name.as_str(),
                    produced = produced.descriptor.identifier(),
                    "物化组件"
                );
                materialized.push(produced);
            }
        }
        Ok(InjectionOutcome::with_materialized(materialized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injectors::test_support::{context, entry_of, environment};
    use di_abstractions::{ContainerConfig, RegistrySnapshot};
    use infrastructure_common::{BeanLookup, Component, ComponentDescriptor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Pool {
        size: usize,
    }

    impl Component for Pool {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder().build()
        }
    }

    #[derive(Default)]
    struct Limits;

    impl Component for Limits {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder().build()
        }
    }

    #[derive(Default)]
    struct PoolConfiguration {
        calls: AtomicUsize,
    }

    impl Component for PoolConfiguration {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .configuration()
                .bean("pool", |c: &PoolConfiguration| {
                    c.calls.fetch_add(1, Ordering::SeqCst);
                    Pool { size: 4 }
                })
                .bean_with("limited_pool", |_: &PoolConfiguration, lookup: &dyn BeanLookup| {
                    lookup
                        .get::<Limits>()
                        .map(|_| Pool { size: 1 })
                        .ok_or_else(|| "缺少 Limits".into())
                })
                .method("helper", |_: &PoolConfiguration| Ok(()))
                .build()
        }
    }

    #[derive(Default)]
    struct BrokenConfiguration;

    impl Component for BrokenConfiguration {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .configuration()
                .method("reset", |_: &BrokenConfiguration| Ok(()))
                .mark_bean("reset")
                .build()
        }
    }

    #[test]
    fn test_producers_invoked_once() {
        let target = entry_of(PoolConfiguration::default());
        let snapshot = RegistrySnapshot::from_entries(vec![target.clone(), entry_of(Limits)]);
        let env = environment(&[]);
        let config = ContainerConfig::default();

        let outcome = FactoryMethodInjector
            .inject(&context(&target, &snapshot, &env, &config))
            .unwrap();
        assert_eq!(outcome.materialized.len(), 2);
        let sizes: Vec<usize> = outcome
            .materialized
            .iter()
            .map(|p| p.instance.clone().downcast::<Pool>().unwrap().size)
            .collect();
        assert_eq!(sizes, vec![4, 1]);

        let configuration = target
            .instance()
            .clone()
            .downcast::<PoolConfiguration>()
            .unwrap();
        assert_eq!(configuration.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_producer_names_type_and_method() {
        let target = entry_of(PoolConfiguration::default());
        let snapshot = RegistrySnapshot::from_entries(vec![target.clone()]);
        let env = environment(&[]);
        let config = ContainerConfig::default();

        let err = FactoryMethodInjector
            .inject(&context(&target, &snapshot, &env, &config))
            .unwrap_err();
        match err {
            DependencyError::FactoryInvocation { type_name, method, .. } => {
                assert!(type_name.ends_with("PoolConfiguration"));
                assert_eq!(method, "limited_pool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_void_factory_method_is_fatal() {
        let target = entry_of(BrokenConfiguration);
        let snapshot = RegistrySnapshot::from_entries(vec![target.clone()]);
        let env = environment(&[]);
        let config = ContainerConfig::default();

        let err = FactoryMethodInjector
            .inject(&context(&target, &snapshot, &env, &config))
            .unwrap_err();
        assert!(err.to_string().contains("BrokenConfiguration#reset"));
    }

    #[test]
    fn test_plain_component_is_noop() {
        let target = entry_of(Limits);
        let snapshot = RegistrySnapshot::from_entries(vec![target.clone()]);
        let env = environment(&[]);
        let config = ContainerConfig::default();
        let outcome = FactoryMethodInjector
            .inject(&context(&target, &snapshot, &env, &config))
            .unwrap();
        assert!(outcome.materialized.is_empty());
    }
}
