//! 应用容器对外接口的集中集成测试

use config_impl::{LayeredEnvironment, MapPropertySource};
use di_abstractions::{BeanFactory, ComponentRegistry, DuplicatePolicy};
use di_impl::{ApplicationContainer, InMemoryRegistry};
use infrastructure_common::{
    Component, ComponentDescriptor, ContainerError, ContainerState, DependencyError, Inject,
    InjectOptions, Value,
};
use std::any::TypeId;
use std::sync::Arc;

trait Repository: Send + Sync {
    fn table(&self) -> String;
}

#[derive(Default)]
struct UserRepository;

impl Repository for UserRepository {
    fn table(&self) -> String {
        "users".to_string()
    }
}

impl Component for UserRepository {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .named("userRepository")
            .implements::<dyn Repository, _>(|bean| bean as Arc<dyn Repository>)
            .build()
    }
}

#[derive(Default)]
struct UserService {
    repository: Inject<dyn Repository>,
    region: Value,
}

impl Component for UserService {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .inject_interface_with(
                "repository",
                InjectOptions::new().required(true),
                |s: &UserService| &s.repository,
            )
            .value("region", "${app.region}", Some("cn-north"), |s: &UserService| {
                &s.region
            })
            .build()
    }
}

/// 就绪后追加、依赖已有组件的组件
#[derive(Default)]
struct ReportJob {
    service: Inject<UserService>,
}

impl Component for ReportJob {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .inject("service", |j: &ReportJob| &j.service)
            .build()
    }
}

/// 就绪后追加时缺少必需依赖
#[derive(Default)]
struct AuditJob {
    sink: Inject<OrderRepository>,
}

impl Component for AuditJob {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .named("auditJob")
            .inject_with(
                "sink",
                InjectOptions::new().named("auditSink").required(true),
                |j: &AuditJob| &j.sink,
            )
            .build()
    }
}

#[derive(Default)]
struct OrderRepository;

impl Repository for OrderRepository {
    fn table(&self) -> String {
        "orders".to_string()
    }
}

impl Component for OrderRepository {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder()
            .named("userRepository")
            .implements::<dyn Repository, _>(|bean| bean as Arc<dyn Repository>)
            .build()
    }
}

async fn ready_container() -> anyhow::Result<ApplicationContainer> {
    let container = ApplicationContainer::builder()
        .environment(
            LayeredEnvironment::new()
                .with_source(MapPropertySource::from_pairs("test", [("app.region", "eu-west")])),
        )
        .bean::<UserRepository>()
        .bean::<UserService>()
        .build();
    container.initialize().await?;
    Ok(container)
}

#[tokio::test]
async fn test_bean_factory_trait_object() -> anyhow::Result<()> {
    let container = ready_container().await?;
    let factory: &dyn BeanFactory = &container;

    assert_eq!(factory.state(), ContainerState::Ready);
    let service = factory.get::<UserService>()?.expect("registered");
    assert_eq!(service.repository.get().expect("injected").table(), "users");
    assert_eq!(service.region.get().as_deref(), Some("eu-west"));

    let repositories = factory.get_all::<dyn Repository>()?;
    assert_eq!(repositories.len(), 1);
    assert!(factory.get_bean_by_name("userRepository")?.is_some());
    assert!(factory.get_beans_by_type_id(TypeId::of::<String>())?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_add_after_ready_wires_against_registry() -> anyhow::Result<()> {
    let container = ready_container().await?;
    container.add_bean::<ReportJob>()?;

    let job = container.get_bean::<ReportJob>()?.expect("activated");
    let service = container.get_bean::<UserService>()?.expect("registered");
    assert!(Arc::ptr_eq(&job.service.get().expect("injected"), &service));
    Ok(())
}

#[tokio::test]
async fn test_failed_add_after_ready_rolls_back() -> anyhow::Result<()> {
    let container = ready_container().await?;
    let before = container.bean_names()?;

    let err = container.add_bean::<AuditJob>().unwrap_err();
    assert!(matches!(
        err.as_dependency(),
        Some(DependencyError::MissingDependency { field, .. }) if field == "sink"
    ));
    assert_eq!(container.state(), ContainerState::Ready);
    assert!(!container.contains_bean("auditJob")?);
    assert_eq!(container.bean_names()?, before);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_policy_reject() {
    let container = ApplicationContainer::builder()
        .duplicate_policy(DuplicatePolicy::Reject)
        .bean::<UserRepository>()
        .bean::<OrderRepository>()
        .build();

    let err = container.initialize().await.unwrap_err();
    assert!(matches!(
        err.as_dependency(),
        Some(DependencyError::DuplicateComponent { identifier }) if identifier == "userRepository"
    ));
    assert_eq!(container.state(), ContainerState::Failed);
}

#[tokio::test]
async fn test_duplicate_policy_overwrite_keeps_latest() -> anyhow::Result<()> {
    let container = ApplicationContainer::builder()
        .bean::<UserRepository>()
        .bean::<OrderRepository>()
        .build();
    container.initialize().await?;

    let repository = container
        .get_named::<dyn Repository>("userRepository")?
        .expect("registered");
    assert_eq!(repository.table(), "orders");
    assert_eq!(container.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_lookups_before_initialize_are_rejected() {
    let container = ApplicationContainer::builder().bean::<UserRepository>().build();
    assert!(matches!(
        container.get_bean::<UserRepository>(),
        Err(ContainerError::Precondition {
            state: ContainerState::Uninitialized,
            ..
        })
    ));
    assert!(container.remove_all().is_err());
}

#[tokio::test]
async fn test_remove_bean_then_lookup() -> anyhow::Result<()> {
    let container = ready_container().await?;
    assert!(container.remove_bean("userRepository")?);
    assert!(!container.remove_bean("userRepository")?);
    assert!(container.get_beans_by_type::<dyn Repository>()?.is_empty());

    // 已注入的引用不受移除影响
    let service = container.get_bean::<UserService>()?.expect("registered");
    assert!(service.repository.is_set());
    Ok(())
}

#[test]
fn test_registry_through_trait() {
    let registry: Box<dyn ComponentRegistry> = Box::new(InMemoryRegistry::new());
    let descriptor = Arc::new(UserRepository::describe());
    registry.register("userRepository", descriptor.clone(), Arc::new(UserRepository));
    registry.register("second", descriptor, Arc::new(UserRepository));

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.lookup_assignable(TypeId::of::<dyn Repository>()).len(), 2);
    assert_eq!(registry.identifiers(), vec!["userRepository", "second"]);

    registry.remove("userRepository");
    assert!(!registry.contains("userRepository"));
    registry.clear();
    assert!(registry.is_empty());
}
