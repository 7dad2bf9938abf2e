//! 派生宏生成的描述符在容器中的端到端行为

use component_macros::Component;
use config_impl::{LayeredEnvironment, MapPropertySource};
use di_abstractions::RequiredPolicy;
use di_impl::{ApplicationContainer, CatalogDiscoverer};
use infrastructure_common::{
    Candidate, Component, ComponentRole, DependencyError, Inject, Property, Value,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Notifier: Send + Sync {
    fn channel(&self) -> &'static str;
}

#[derive(Default, Component)]
#[component(implements(dyn Notifier))]
struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }
}

#[derive(Default, Component)]
#[component(name = "sms", implements(dyn Notifier))]
struct SmsNotifier;

impl Notifier for SmsNotifier {
    fn channel(&self) -> &'static str {
        "sms"
    }
}

#[derive(Default, Component)]
#[component(init = "start")]
struct AlertService {
    #[inject(named = "sms")]
    notifier: Inject<dyn Notifier>,
    #[value("${alert.threshold}", default = "3")]
    threshold: Value,
    #[value("${alert.channel}")]
    channel: Value,
    started: AtomicUsize,
}

impl AlertService {
    fn start(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
}

struct Pool {
    size: usize,
}

impl Component for Pool {
    fn describe() -> infrastructure_common::ComponentDescriptor {
        Self::descriptor_builder().build()
    }
}

#[derive(Default, Component)]
#[component(configuration, bean = "pool")]
struct PoolConfiguration {
    #[value("${pool.size}", default = "4")]
    size: Value,
}

impl PoolConfiguration {
    fn pool(&self) -> Pool {
        Pool {
            size: self.size.parse().unwrap_or(1),
        }
    }
}

#[derive(Default, Component)]
struct Worker {
    #[inject(required)]
    pool: Inject<Pool>,
}

#[derive(Default, Component)]
#[component(properties = "routing")]
struct Routing {
    hosts: Property<Vec<String>>,
    #[property(name = "header")]
    headers: Property<BTreeMap<String, String>>,
    timeout: Property<u64>,
}

#[derive(Default, Component)]
#[component(init = "fail")]
struct Broken;

impl Broken {
    fn fail(&self) -> Result<(), String> {
        Err("连接被拒绝".to_string())
    }
}

mod scanned {
    use super::*;

    #[derive(Default, Component)]
    #[component(scan)]
    pub struct Clock;

    #[derive(Default, Component)]
    #[component(scan)]
    pub struct Scheduler {
        #[inject(required)]
        pub clock: Inject<Clock>,
    }
}

fn environment(pairs: &[(&str, &str)]) -> LayeredEnvironment {
    LayeredEnvironment::new().with_source(MapPropertySource::from_pairs("test", pairs.to_vec()))
}

#[test]
fn test_descriptor_shape() {
    let descriptor = SmsNotifier::describe();
    assert_eq!(descriptor.identifier(), "sms");
    assert!(descriptor.is_assignable_to(std::any::TypeId::of::<dyn Notifier>()));

    let descriptor = Routing::describe();
    assert!(matches!(
        descriptor.role(),
        ComponentRole::PropertyBound { prefix } if prefix == "routing"
    ));
    assert_eq!(descriptor.fields().len(), 3);

    let descriptor = PoolConfiguration::describe();
    assert_eq!(*descriptor.role(), ComponentRole::ConfigurationSource);
    assert!(descriptor.method("pool").is_some());
}

#[tokio::test]
async fn test_derived_components_are_wired() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .environment(environment(&[("alert.channel", "ops")]))
        .bean::<EmailNotifier>()
        .bean::<SmsNotifier>()
        .bean::<AlertService>()
        .build();
    container.initialize().await?;

    let service = container.get_bean::<AlertService>()?.expect("registered");
    assert_eq!(service.notifier.get().expect("injected").channel(), "sms");
    assert_eq!(service.threshold.parse::<u32>(), Some(3));
    assert_eq!(service.channel.get().as_deref(), Some("ops"));
    assert_eq!(service.started.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_factory_method_from_derive() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .environment(environment(&[("pool.size", "16")]))
        .discoverer(CatalogDiscoverer::with_candidates(vec![
            Candidate::of::<Worker>(),
            Candidate::of::<PoolConfiguration>(),
        ]))
        .build();
    let report = container.initialize().await?;
    assert_eq!(report.materialized, 1);

    let worker = container.get_bean::<Worker>()?.expect("registered");
    assert_eq!(worker.pool.get().expect("injected in pass 2").size, 16);
    Ok(())
}

#[tokio::test]
async fn test_property_binding_from_derive() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .environment(environment(&[
            ("routing.hosts[1]", "b"),
            ("routing.hosts[0]", "a"),
            ("routing.header.x-trace", "on"),
            ("routing.timeout", "30"),
        ]))
        .bean::<Routing>()
        .build();
    container.initialize().await?;

    let routing = container.get_bean::<Routing>()?.expect("registered");
    assert_eq!(routing.hosts.get(), vec!["a", "b"]);
    assert_eq!(
        routing.headers.get().get("x-trace").map(String::as_str),
        Some("on")
    );
    assert_eq!(routing.timeout.get(), 30);
    Ok(())
}

#[tokio::test]
async fn test_failing_init_method_fails_container() {
    let container = ApplicationContainer::builder().bean::<Broken>().build();
    let err = container.initialize().await.unwrap_err();
    assert!(matches!(
        err.as_dependency(),
        Some(DependencyError::InitMethodFailed { method, .. }) if method == "fail"
    ));
}

#[tokio::test]
async fn test_scanned_components_are_discovered() -> anyhow::Result<()> {
    let container = Arc::new(
        ApplicationContainer::builder()
            .scan_catalog()
            .add_package(module_path!().to_string() + "::scanned")
            .required_policy(RequiredPolicy::FieldDeclared)
            .build(),
    );
    let report = container.spawn_initialize().wait().await?;
    assert_eq!(report.discovered, 2);

    let scheduler = container.get_bean::<scanned::Scheduler>()?.expect("discovered");
    let clock = container.get_bean::<scanned::Clock>()?.expect("discovered");
    assert!(Arc::ptr_eq(&scheduler.clock.get().expect("injected"), &clock));
    Ok(())
}
