//! 应用容器的集成测试

use config_impl::{LayeredEnvironment, MapPropertySource};
use di_abstractions::RequiredPolicy;
use di_impl::{ApplicationContainer, CatalogDiscoverer};
use infrastructure_common::{
    Candidate, Component, ComponentDescriptor, ContainerError, ContainerState, DependencyError,
    Inject, InjectOptions, Property, Value,
};
use std::collections::BTreeMap;
use std::sync::Arc;

trait Notifier: Send + Sync {
    fn channel(&self) -> String;
}

/// 组件 A：没有依赖
#[derive(Default)]
struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn channel(&self) -> String {
        "email".to_string()
    }
}

impl Component for EmailNotifier {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .implements::<dyn Notifier, _>(|bean| bean as Arc<dyn Notifier>)
            .build()
    }
}

#[derive(Default)]
struct SmsNotifier;

impl Notifier for SmsNotifier {
    fn channel(&self) -> String {
        "sms".to_string()
    }
}

impl Component for SmsNotifier {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .named("sms")
            .implements::<dyn Notifier, _>(|bean| bean as Arc<dyn Notifier>)
            .build()
    }
}

/// 组件 B：依赖接口 `Notifier`
#[derive(Default)]
struct AlertService {
    notifier: Inject<dyn Notifier>,
    port: Value,
}

impl Component for AlertService {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .inject_interface("notifier", |s: &AlertService| &s.notifier)
            .value("port", "${server.port}", None, |s: &AlertService| &s.port)
            .build()
    }
}

#[derive(Default)]
struct PinnedAlertService {
    notifier: Inject<dyn Notifier>,
}

impl Component for PinnedAlertService {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .inject_interface_with(
                "notifier",
                InjectOptions::new().named("sms"),
                |s: &PinnedAlertService| &s.notifier,
            )
            .build()
    }
}

struct Pool {
    size: u32,
}

impl Component for Pool {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder().build()
    }
}

#[derive(Default)]
struct PoolConfiguration;

impl Component for PoolConfiguration {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .configuration()
            .bean("pool", |_: &PoolConfiguration| Pool { size: 8 })
            .build()
    }
}

#[derive(Default)]
struct Worker {
    pool: Inject<Pool>,
}

impl Component for Worker {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .inject("pool", |w: &Worker| &w.pool)
            .build()
    }
}

#[derive(Default)]
struct Routing {
    items: Property<Vec<String>>,
    map: Property<BTreeMap<String, String>>,
}

impl Component for Routing {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .properties("prefix")
            .property("items", |r: &Routing| &r.items)
            .property("map", |r: &Routing| &r.map)
            .build()
    }
}

fn environment(pairs: &[(&str, &str)]) -> LayeredEnvironment {
    LayeredEnvironment::new().with_source(MapPropertySource::from_pairs("test", pairs.to_vec()))
}

#[tokio::test]
async fn test_interface_dependency_resolves_single_implementor() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .environment(environment(&[("server.port", "8080")]))
        .bean::<EmailNotifier>()
        .bean::<AlertService>()
        .build();
    container.initialize().await?;

    let a = container.get_bean::<EmailNotifier>()?.expect("A registered");
    let b = container.get_bean::<AlertService>()?.expect("B registered");
    let injected = b.notifier.get().expect("dependency injected");
    assert_eq!(injected.channel(), "email");
    assert!(std::ptr::eq(
        Arc::as_ptr(&injected) as *const (),
        Arc::as_ptr(&a) as *const ()
    ));
    assert_eq!(b.port.get().as_deref(), Some("8080"));
    Ok(())
}

#[tokio::test]
async fn test_multiple_implementors_without_qualifier_fail() {
    let container = ApplicationContainer::builder()
        .bean::<EmailNotifier>()
        .bean::<SmsNotifier>()
        .bean::<AlertService>()
        .build();

    let err = container.initialize().await.unwrap_err();
    match err.as_dependency() {
        Some(DependencyError::AmbiguousDependency { component, field, .. }) => {
            assert!(component.ends_with("AlertService"));
            assert_eq!(field, "notifier");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(container.state(), ContainerState::Failed);
    assert!(matches!(
        container.get_bean_by_name("sms"),
        Err(ContainerError::Precondition { .. })
    ));
}

#[tokio::test]
async fn test_qualifier_selects_implementor() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .bean::<EmailNotifier>()
        .bean::<SmsNotifier>()
        .bean::<PinnedAlertService>()
        .build();
    container.initialize().await?;

    let service = container.get_bean::<PinnedAlertService>()?.expect("registered");
    assert_eq!(service.notifier.get().expect("injected").channel(), "sms");
    assert_eq!(container.get_beans_by_type::<dyn Notifier>()?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_factory_bean_is_materialized_and_injectable() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .discoverer(CatalogDiscoverer::with_candidates(vec![
            Candidate::of::<Worker>(),
            Candidate::of::<PoolConfiguration>(),
        ]))
        .required_policy(RequiredPolicy::AllRequired)
        .build();
    let report = container.initialize().await?;
    assert_eq!(report.materialized, 1);

    let pools = container.get_beans_by_type::<Pool>()?;
    assert_eq!(pools.len(), 1);
    let worker = container.get_bean::<Worker>()?.expect("registered");
    assert_eq!(worker.pool.get().expect("injected in pass 2").size, 8);
    Ok(())
}

#[tokio::test]
async fn test_list_and_map_binding() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .environment(environment(&[
            ("prefix.items[2]", "c"),
            ("prefix.map.key2", "y"),
            ("prefix.items[0]", "a"),
            ("prefix.map.key1", "x"),
            ("prefix.items[1]", "b"),
        ]))
        .bean::<Routing>()
        .build();
    container.initialize().await?;

    let routing = container.get_bean::<Routing>()?.expect("registered");
    assert_eq!(routing.items.get(), vec!["a", "b", "c"]);
    let map = routing.map.get();
    assert_eq!(map.get("key1").map(String::as_str), Some("x"));
    assert_eq!(map.get("key2").map(String::as_str), Some("y"));
    assert_eq!(map.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_remove_all_is_idempotent() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .bean::<EmailNotifier>()
        .bean::<AlertService>()
        .build();
    container.initialize().await?;

    container.remove_all()?;
    container.remove_all()?;
    assert!(container.get_bean::<EmailNotifier>()?.is_none());
    assert!(container.get_bean::<AlertService>()?.is_none());
    assert!(container.get_beans_by_type::<dyn Notifier>()?.is_empty());
    Ok(())
}

#[test]
fn test_independent_containers() {
    tokio_test::block_on(async {
        let first = ApplicationContainer::builder().bean::<EmailNotifier>().build();
        let second = ApplicationContainer::builder().bean::<SmsNotifier>().build();
        first.initialize().await.unwrap();
        second.initialize().await.unwrap();

        assert_ne!(first.id(), second.id());
        assert!(first.get_bean::<SmsNotifier>().unwrap().is_none());
        assert!(second.get_bean_by_name("sms").unwrap().is_some());
    });
}
