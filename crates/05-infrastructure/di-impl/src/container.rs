//! 应用容器
//!
//! 容器独占注册表并驱动初始化状态机：
//!
//! ```text
//! UNINITIALIZED → DISCOVERING → REGISTERED → INJECTED_PASS1
//!               → MATERIALIZED → INJECTED_PASS2 → READY
//! ```
//!
//! 任一阶段的致命错误使容器进入 `FAILED` 并保留原因，之后所有查询
//! 都返回前置条件错误。

use crate::catalog::CatalogDiscoverer;
use crate::pipeline::InjectionPipeline;
use crate::registry::InMemoryRegistry;
use chrono::{DateTime, Utc};
use config_abstractions::{ConfigurationEnvironment, EmptyEnvironment};
use di_abstractions::{
    BeanFactory, ComponentRegistry, ContainerConfig, DiscoveryCriteria, DuplicatePolicy,
    InjectionPass, Injector, RegistryEntry, RegistrySnapshot, RequiredPolicy, TypeDiscoverer,
    TypeFilter,
};
use infrastructure_common::{
    BeanHandle, BeanRef, Component, ComponentDescriptor, ContainerError, ContainerResult,
    ContainerState, DependencyError, DependencyResult, TypeInfo,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 初始化报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializationReport {
    /// 容器ID
    pub container_id: Uuid,
    /// 发现阶段构造的组件数
    pub discovered: usize,
    /// 就绪时注册表中的组件数
    pub registered: usize,
    /// 物化产出的组件数
    pub materialized: usize,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 完成时间
    pub finished_at: DateTime<Utc>,
}

impl InitializationReport {
    /// 初始化耗时
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// 后台初始化任务
#[derive(Debug)]
pub struct StartupTask {
    handle: JoinHandle<ContainerResult<InitializationReport>>,
}

impl StartupTask {
    /// 等待初始化完成
    pub async fn wait(self) -> ContainerResult<InitializationReport> {
        self.handle.await.map_err(|e| ContainerError::TaskFailed {
            message: e.to_string(),
        })?
    }

    /// 任务是否已结束
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

struct PendingBean {
    descriptor: ComponentDescriptor,
    instance: BeanRef,
}

/// 应用容器
///
/// 由应用入口显式创建并传递，不存在全局实例；测试可以创建相互独立的容器。
pub struct ApplicationContainer {
    id: Uuid,
    state: RwLock<ContainerState>,
    failure: RwLock<Option<ContainerError>>,
    registry: InMemoryRegistry,
    environment: Arc<dyn ConfigurationEnvironment>,
    discoverer: Option<Arc<dyn TypeDiscoverer>>,
    criteria: DiscoveryCriteria,
    pipeline: InjectionPipeline,
    config: ContainerConfig,
    pending: Mutex<Vec<PendingBean>>,
    mutation: Mutex<()>,
}

impl ApplicationContainer {
    /// 创建构建器
    pub fn builder() -> ApplicationContainerBuilder {
        ApplicationContainerBuilder::new()
    }

    /// 容器ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 当前状态
    pub fn state(&self) -> ContainerState {
        *self.state.read()
    }

    /// 是否已就绪
    pub fn is_ready(&self) -> bool {
        self.state() == ContainerState::Ready
    }

    /// 初始化失败的原因
    pub fn failure(&self) -> Option<ContainerError> {
        self.failure.read().clone()
    }

    /// 配置环境
    pub fn environment(&self) -> &Arc<dyn ConfigurationEnvironment> {
        &self.environment
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 注入流水线
    pub fn pipeline(&self) -> &InjectionPipeline {
        &self.pipeline
    }

    fn transition(&self, to: ContainerState) {
        let mut state = self.state.write();
        let from = *state;
        info!(container = %self.id, from = %from, to = %to, "容器状态变更");
        *state = to;
    }

    fn fail(&self, cause: ContainerError) {
        error!(container = %self.id, error = %cause, "容器初始化失败");
        *self.failure.write() = Some(cause);
        self.transition(ContainerState::Failed);
    }

    fn ensure_usable(&self, operation: &'static str) -> ContainerResult<()> {
        let state = self.state();
        if state.allows_lookup() {
            Ok(())
        } else {
            Err(ContainerError::precondition(state, operation))
        }
    }

    /// 执行完整的初始化状态机
    ///
    /// 只能在 `UNINITIALIZED` 状态调用一次。
    pub async fn initialize(&self) -> ContainerResult<InitializationReport> {
        {
            let mut state = self.state.write();
            if *state != ContainerState::Uninitialized {
                return Err(ContainerError::precondition(*state, "initialize"));
            }
            info!(container = %self.id, "开始初始化容器");
            *state = ContainerState::Discovering;
        }

        let started_at = Utc::now();
        match self.run_phases(started_at).await {
            Ok(report) => {
                info!(
                    container = %self.id,
                    registered = report.registered,
                    materialized = report.materialized,
                    elapsed_ms = report.elapsed().num_milliseconds(),
                    "容器就绪"
                );
                Ok(report)
            }
            Err(e) => {
                self.fail(e.clone());
                Err(e)
            }
        }
    }

    /// 在后台任务中执行初始化，调用方不被阻塞
    pub fn spawn_initialize(self: &Arc<Self>) -> StartupTask {
        let container = Arc::clone(self);
        StartupTask {
            handle: tokio::spawn(async move { container.initialize().await }),
        }
    }

    async fn run_phases(&self, started_at: DateTime<Utc>) -> ContainerResult<InitializationReport> {
        let discovered = match &self.discoverer {
            Some(discoverer) => {
                info!(discoverer = discoverer.name(), criteria = ?self.criteria, "开始组件发现");
                discoverer.discover(&self.criteria).await?
            }
            None => Vec::new(),
        };
        let discovered_count = discovered.len();
        for component in discovered {
            self.register(Arc::new(component.descriptor), component.instance)?;
        }
        let pending = std::mem::take(&mut *self.pending.lock());
        for bean in pending {
            self.register(Arc::new(bean.descriptor), bean.instance)?;
        }
        self.transition(ContainerState::Registered);

        let snapshot = self.registry.snapshot();
        self.pipeline.wire(
            &snapshot,
            self.environment.as_ref(),
            &self.config,
            InjectionPass::First,
        )?;
        self.transition(ContainerState::InjectedPass1);

        let produced =
            self.pipeline
                .materialize(&snapshot, self.environment.as_ref(), &self.config)?;
        let materialized = produced.len();
        for bean in produced {
            self.register(Arc::new(bean.descriptor), bean.instance)?;
        }
        self.transition(ContainerState::Materialized);

        let snapshot = self.registry.snapshot();
        self.pipeline.wire(
            &snapshot,
            self.environment.as_ref(),
            &self.config,
            InjectionPass::Second,
        )?;
        self.transition(ContainerState::InjectedPass2);

        for entry in snapshot.entries() {
            run_init_methods(entry, &snapshot)?;
        }
        self.transition(ContainerState::Ready);

        Ok(InitializationReport {
            container_id: self.id,
            discovered: discovered_count,
            registered: self.registry.len(),
            materialized,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// 按重复标识策略写入注册表
    fn register(&self, descriptor: Arc<ComponentDescriptor>, instance: BeanRef) -> DependencyResult<()> {
        let identifier = descriptor.identifier().to_string();
        if self.config.duplicate_policy == DuplicatePolicy::Reject && self.registry.contains(&identifier) {
            return Err(DependencyError::DuplicateComponent { identifier });
        }
        let role = descriptor.role().marker();
        if self.registry.register(&identifier, descriptor, instance).is_some() {
            warn!(identifier = identifier.as_str(), "组件标识重复，覆盖旧条目");
        }
        info!(identifier = identifier.as_str(), role = %role, "注册组件");
        Ok(())
    }

    /// 注册一个 `Default` 构造的组件
    pub fn add_bean<T: Component + Default>(&self) -> ContainerResult<()> {
        self.add_described(T::describe(), Arc::new(T::default()))
    }

    /// 注册一个现成实例
    pub fn add_instance<T: Component>(&self, instance: T) -> ContainerResult<()> {
        self.add_described(T::describe(), Arc::new(instance))
    }

    /// 以给定描述符注册实例
    ///
    /// `UNINITIALIZED` 时排队，在发现阶段注册；`READY` 时立即注册、物化并注入，
    /// 失败时回滚本次写入并保持就绪。
    pub fn add_described(&self, descriptor: ComponentDescriptor, instance: BeanRef) -> ContainerResult<()> {
        let state = self.state.read();
        let current = *state;
        match current {
            ContainerState::Uninitialized => {
                debug!(identifier = descriptor.identifier(), "组件加入待注册队列");
                self.pending.lock().push(PendingBean {
                    descriptor,
                    instance,
                });
                Ok(())
            }
            ContainerState::Ready => {
                drop(state);
                let _guard = self.mutation.lock();
                self.activate(descriptor, instance).map_err(ContainerError::from)
            }
            other => Err(ContainerError::precondition(other, "add_bean")),
        }
    }

    /// 就绪后注册组件：物化其工厂方法，注入新条目并执行初始化方法
    fn activate(&self, descriptor: ComponentDescriptor, instance: BeanRef) -> DependencyResult<()> {
        let mut written: Vec<(String, Option<RegistryEntry>)> = Vec::new();
        let result = self.activate_inner(descriptor, instance, &mut written);
        if result.is_err() {
            for (identifier, previous) in written.into_iter().rev() {
                match previous {
                    Some(entry) => {
                        self.registry.register(
                            &identifier,
                            entry.descriptor().clone(),
                            entry.instance().clone(),
                        );
                    }
                    None => {
                        self.registry.remove(&identifier);
                    }
                }
                warn!(identifier = identifier.as_str(), "回滚组件注册");
            }
        }
        result
    }

    fn activate_inner(
        &self,
        descriptor: ComponentDescriptor,
        instance: BeanRef,
        written: &mut Vec<(String, Option<RegistryEntry>)>,
    ) -> DependencyResult<()> {
        let identifier = descriptor.identifier().to_string();
        written.push((identifier.clone(), self.registry.lookup_exact(&identifier)));
        self.register(Arc::new(descriptor), instance)?;

        let snapshot = self.registry.snapshot();
        let Some(entry) = snapshot.lookup_exact(&identifier) else {
            return Ok(());
        };
        let produced = self.pipeline.materialize_entry(
            entry,
            &snapshot,
            self.environment.as_ref(),
            &self.config,
        )?;
        let mut added = vec![identifier];
        for bean in produced {
            let produced_id = bean.descriptor.identifier().to_string();
            written.push((produced_id.clone(), self.registry.lookup_exact(&produced_id)));
            self.register(Arc::new(bean.descriptor), bean.instance)?;
            added.push(produced_id);
        }

        let snapshot = self.registry.snapshot();
        for identifier in &added {
            if let Some(entry) = snapshot.lookup_exact(identifier) {
                self.pipeline.wire_entry(
                    entry,
                    &snapshot,
                    self.environment.as_ref(),
                    &self.config,
                    InjectionPass::Second,
                )?;
            }
        }
        for identifier in &added {
            if let Some(entry) = snapshot.lookup_exact(identifier) {
                run_init_methods(entry, &snapshot)?;
            }
        }
        Ok(())
    }

    /// 按标识查询
    pub fn get_bean_by_name(&self, identifier: &str) -> ContainerResult<Option<BeanRef>> {
        self.ensure_usable("get_bean")?;
        Ok(self
            .registry
            .lookup_exact(identifier)
            .map(|entry| entry.instance().clone()))
    }

    /// 按标识查询并以 `T` 视图返回，`T` 可以是具体类型或 `dyn Trait`
    pub fn get_named<T: ?Sized + 'static>(&self, identifier: &str) -> ContainerResult<Option<Arc<T>>> {
        self.ensure_usable("get_bean")?;
        Ok(self
            .registry
            .lookup_exact(identifier)
            .and_then(|entry| entry.view_as::<T>()))
    }

    /// 以规范类型名精确查询
    pub fn get_bean<T: Send + Sync + 'static>(&self) -> ContainerResult<Option<Arc<T>>> {
        self.get_named::<T>(&TypeInfo::of::<T>().name)
    }

    /// 查询所有可视为 `T` 的组件，按注册顺序
    pub fn get_beans_by_type<T: ?Sized + 'static>(&self) -> ContainerResult<Vec<Arc<T>>> {
        self.ensure_usable("get_beans_by_type")?;
        Ok(self
            .registry
            .lookup_assignable(TypeId::of::<T>())
            .iter()
            .filter_map(|entry| entry.view_as::<T>())
            .collect())
    }

    /// 是否包含标识
    pub fn contains_bean(&self, identifier: &str) -> ContainerResult<bool> {
        self.ensure_usable("contains_bean")?;
        Ok(self.registry.contains(identifier))
    }

    /// 所有标识，按注册顺序
    pub fn bean_names(&self) -> ContainerResult<Vec<String>> {
        self.ensure_usable("bean_names")?;
        Ok(self.registry.identifiers())
    }

    /// 组件描述符
    pub fn descriptor(&self, identifier: &str) -> ContainerResult<Option<Arc<ComponentDescriptor>>> {
        self.ensure_usable("descriptor")?;
        Ok(self
            .registry
            .lookup_exact(identifier)
            .map(|entry| entry.descriptor().clone()))
    }

    /// 移除组件，返回是否存在
    pub fn remove_bean(&self, identifier: &str) -> ContainerResult<bool> {
        self.ensure_usable("remove_bean")?;
        let removed = self.registry.remove(identifier).is_some();
        if removed {
            info!(identifier, "移除组件");
        }
        Ok(removed)
    }

    /// 移除所有组件
    pub fn remove_all(&self) -> ContainerResult<()> {
        self.ensure_usable("remove_all")?;
        let count = self.registry.len();
        self.registry.clear();
        info!(count, "移除所有组件");
        Ok(())
    }

    /// 注册表中的组件数
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

/// 按声明顺序执行初始化方法
fn run_init_methods(
    entry: &RegistryEntry,
    snapshot: &RegistrySnapshot,
) -> DependencyResult<()> {
    let descriptor = entry.descriptor();
    for name in descriptor.init_methods() {
        let failed = |message: String| DependencyError::InitMethodFailed {
            type_name: descriptor.type_info().name.clone(),
            method: name.clone(),
            message,
        };
        let method = descriptor
            .method(name)
            .ok_or_else(|| failed("方法不存在".to_string()))?;
        method
            .invoke(entry.instance(), snapshot)
            .map_err(|e| failed(e.to_string()))?;
        debug!(component = entry.identifier(), method = name.as_str(), "执行初始化方法");
    }
    Ok(())
}

impl fmt::Debug for ApplicationContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContainer")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("beans", &self.registry.len())
            .field("pipeline", &self.pipeline)
            .field("config", &self.config)
            .finish()
    }
}

impl BeanFactory for ApplicationContainer {
    fn state(&self) -> ContainerState {
        ApplicationContainer::state(self)
    }

    fn get_bean_by_name(&self, identifier: &str) -> ContainerResult<Option<BeanRef>> {
        ApplicationContainer::get_bean_by_name(self, identifier)
    }

    fn get_beans_by_type_id(&self, target: TypeId) -> ContainerResult<Vec<BeanHandle>> {
        self.ensure_usable("get_beans_by_type")?;
        Ok(self
            .registry
            .lookup_assignable(target)
            .iter()
            .filter_map(|entry| entry.view(target))
            .collect())
    }

    fn remove_bean(&self, identifier: &str) -> ContainerResult<bool> {
        ApplicationContainer::remove_bean(self, identifier)
    }

    fn remove_all(&self) -> ContainerResult<()> {
        ApplicationContainer::remove_all(self)
    }
}

/// 应用容器构建器
pub struct ApplicationContainerBuilder {
    environment: Arc<dyn ConfigurationEnvironment>,
    discoverer: Option<Arc<dyn TypeDiscoverer>>,
    criteria: DiscoveryCriteria,
    pipeline: InjectionPipeline,
    config: ContainerConfig,
    pending: Vec<PendingBean>,
}

impl Default for ApplicationContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationContainerBuilder {
    /// 创建构建器：空环境、无发现器、标准流水线
    pub fn new() -> Self {
        Self {
            environment: Arc::new(EmptyEnvironment),
            discoverer: None,
            criteria: DiscoveryCriteria::new(),
            pipeline: InjectionPipeline::standard(),
            config: ContainerConfig::default(),
            pending: Vec::new(),
        }
    }

    /// 设置配置环境
    pub fn environment<E: ConfigurationEnvironment + 'static>(mut self, environment: E) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    /// 设置共享的配置环境
    pub fn shared_environment(mut self, environment: Arc<dyn ConfigurationEnvironment>) -> Self {
        self.environment = environment;
        self
    }

    /// 设置类型发现器
    pub fn discoverer<D: TypeDiscoverer + 'static>(mut self, discoverer: D) -> Self {
        self.discoverer = Some(Arc::new(discoverer));
        self
    }

    /// 使用进程级候选目录发现组件
    pub fn scan_catalog(self) -> Self {
        self.discoverer(CatalogDiscoverer::from_catalog())
    }

    /// 设置发现条件
    pub fn criteria(mut self, criteria: DiscoveryCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// 添加发现包
    pub fn add_package<S: Into<String>>(mut self, package: S) -> Self {
        self.criteria = self.criteria.add_package(package);
        self
    }

    /// 添加类型过滤器
    pub fn add_filter<F: TypeFilter + 'static>(mut self, filter: F) -> Self {
        self.criteria = self.criteria.add_filter(filter);
        self
    }

    /// 替换注入流水线
    pub fn pipeline(mut self, pipeline: InjectionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// 在流水线末尾追加注入单元
    pub fn add_injector<I: Injector + 'static>(mut self, injector: I) -> Self {
        self.pipeline = self.pipeline.with_unit(injector);
        self
    }

    /// 设置容器配置
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置必需依赖策略
    pub fn required_policy(mut self, policy: RequiredPolicy) -> Self {
        self.config.required_policy = policy;
        self
    }

    /// 设置重复标识策略
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_policy = policy;
        self
    }

    /// 预注册 `Default` 构造的组件
    pub fn bean<T: Component + Default>(self) -> Self {
        self.described(T::describe(), Arc::new(T::default()))
    }

    /// 预注册现成实例
    pub fn instance<T: Component>(self, instance: T) -> Self {
        self.described(T::describe(), Arc::new(instance))
    }

    /// 以给定描述符预注册实例
    pub fn described(mut self, descriptor: ComponentDescriptor, instance: BeanRef) -> Self {
        self.pending.push(PendingBean {
            descriptor,
            instance,
        });
        self
    }

    /// 构建容器
    pub fn build(self) -> ApplicationContainer {
        let id = Uuid::new_v4();
        info!(
            container = %id,
            pipeline = ?self.pipeline.unit_names(),
            preregistered = self.pending.len(),
            "创建容器"
        );
        ApplicationContainer {
            id,
            state: RwLock::new(ContainerState::Uninitialized),
            failure: RwLock::new(None),
            registry: InMemoryRegistry::new(),
            environment: self.environment,
            discoverer: self.discoverer,
            criteria: self.criteria,
            pipeline: self.pipeline,
            config: self.config,
            pending: Mutex::new(self.pending),
            mutation: Mutex::new(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::{Candidate, Inject, InjectOptions, Property, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Once;

    static INIT_LOGGER: Once = Once::new();

    fn init_test_logger() {
        INIT_LOGGER.call_once(|| {
            tracing_subscriber::fmt()
                .with_env_filter("debug")
                .with_test_writer()
                .try_init()
                .ok();
        });
    }

    trait Repository: Send + Sync {
        fn kind(&self) -> &'static str;
    }

    #[derive(Default)]
    struct MemoryRepository;

    impl Repository for MemoryRepository {
        fn kind(&self) -> &'static str {
            "memory"
        }
    }

    impl Component for MemoryRepository {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .implements::<dyn Repository, _>(|b| b as Arc<dyn Repository>)
                .build()
        }
    }

    #[derive(Default)]
    struct DiskRepository;

    impl Repository for DiskRepository {
        fn kind(&self) -> &'static str {
            "disk"
        }
    }

    impl Component for DiskRepository {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .named("disk")
                .implements::<dyn Repository, _>(|b| b as Arc<dyn Repository>)
                .build()
        }
    }

    #[derive(Default)]
    struct UserService {
        repository: Inject<dyn Repository>,
        region: Value,
        started: AtomicUsize,
    }

    impl Component for UserService {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .inject_interface("repository", |s: &UserService| &s.repository)
                .value("region", "${app.region}", Some("local"), |s: &UserService| &s.region)
                .method("start", |s: &UserService| {
                    s.started.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .init("start")
                .build()
        }
    }

    struct Connection {
        url: String,
    }

    #[derive(Default)]
    struct ConnectionConfiguration;

    impl Component for ConnectionConfiguration {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .configuration()
                .plain_bean("connection", |_: &ConnectionConfiguration| Connection {
                    url: "mem://".to_string(),
                })
                .build()
        }
    }

    #[derive(Default)]
    struct Consumer {
        connection: Inject<Connection>,
    }

    impl Component for Consumer {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .inject_with("connection", InjectOptions::new().required(true), |c: &Consumer| {
                    &c.connection
                })
                .build()
        }
    }

    #[derive(Default)]
    struct Limits {
        hosts: Property<Vec<String>>,
    }

    impl Component for Limits {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .properties("limits")
                .property("hosts", |l: &Limits| &l.hosts)
                .build()
        }
    }

    #[tokio::test]
    async fn test_full_initialization() {
        init_test_logger();
        let env: HashMap<String, String> = [
            ("app.region", "eu"),
            ("limits.hosts[1]", "b"),
            ("limits.hosts[0]", "a"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let container = ApplicationContainer::builder()
            .environment(env)
            .discoverer(CatalogDiscoverer::with_candidates(vec![
                Candidate::of::<UserService>(),
                Candidate::of::<MemoryRepository>(),
                Candidate::of::<ConnectionConfiguration>(),
                Candidate::of::<Consumer>(),
            ]))
            .bean::<Limits>()
            .build();
        assert_eq!(container.state(), ContainerState::Uninitialized);

        let report = container.initialize().await.unwrap();
        assert_eq!(container.state(), ContainerState::Ready);
        assert_eq!(report.discovered, 4);
        assert_eq!(report.materialized, 1);
        assert_eq!(report.registered, 6);

        let service = container.get_bean::<UserService>().unwrap().unwrap();
        assert_eq!(service.repository.get().unwrap().kind(), "memory");
        assert_eq!(service.region.get().as_deref(), Some("eu"));
        assert_eq!(service.started.load(Ordering::SeqCst), 1);

        let consumer = container.get_bean::<Consumer>().unwrap().unwrap();
        assert_eq!(consumer.connection.get().unwrap().url, "mem://");
        assert_eq!(container.get_beans_by_type::<Connection>().unwrap().len(), 1);

        let limits = container.get_bean::<Limits>().unwrap().unwrap();
        assert_eq!(limits.hosts.get(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_ambiguity_fails_container() {
        init_test_logger();
        let container = ApplicationContainer::builder()
            .bean::<UserService>()
            .bean::<MemoryRepository>()
            .bean::<DiskRepository>()
            .build();

        let err = container.initialize().await.unwrap_err();
        assert!(matches!(
            err.as_dependency(),
            Some(DependencyError::AmbiguousDependency { .. })
        ));
        assert_eq!(container.state(), ContainerState::Failed);
        assert!(container.failure().is_some());
        assert!(matches!(
            container.get_bean::<UserService>(),
            Err(ContainerError::Precondition { state: ContainerState::Failed, .. })
        ));
        assert!(container.initialize().await.is_err());
    }

    #[tokio::test]
    async fn test_preconditions_before_initialization() {
        let container = ApplicationContainer::builder().build();
        assert!(matches!(
            container.get_bean_by_name("anything"),
            Err(ContainerError::Precondition { state: ContainerState::Uninitialized, .. })
        ));
        assert!(container.remove_all().is_err());
        container.add_bean::<MemoryRepository>().unwrap();
        container.initialize().await.unwrap();
        assert!(container.get_bean::<MemoryRepository>().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_all_then_lookup_is_absent() {
        let container = ApplicationContainer::builder()
            .bean::<MemoryRepository>()
            .bean::<DiskRepository>()
            .build();
        container.initialize().await.unwrap();

        assert!(container.remove_bean("disk").unwrap());
        assert!(!container.remove_bean("disk").unwrap());
        container.remove_all().unwrap();
        assert!(container.get_bean_by_name("disk").unwrap().is_none());
        assert!(container.get_bean::<MemoryRepository>().unwrap().is_none());
        assert!(container.is_empty());
    }

    #[tokio::test]
    async fn test_add_bean_after_ready_is_wired() {
        let container = ApplicationContainer::builder()
            .bean::<MemoryRepository>()
            .build();
        container.initialize().await.unwrap();

        container.add_bean::<UserService>().unwrap();
        let service = container.get_bean::<UserService>().unwrap().unwrap();
        assert_eq!(service.repository.get().unwrap().kind(), "memory");
        assert_eq!(service.region.get().as_deref(), Some("local"));
        assert_eq!(service.started.load(Ordering::SeqCst), 1);

        container.add_bean::<ConnectionConfiguration>().unwrap();
        assert_eq!(container.get_beans_by_type::<Connection>().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_add_after_ready_rolls_back() {
        let container = ApplicationContainer::builder()
            .bean::<MemoryRepository>()
            .bean::<DiskRepository>()
            .build();
        container.initialize().await.unwrap();

        let err = container.add_bean::<UserService>().unwrap_err();
        assert!(matches!(
            err.as_dependency(),
            Some(DependencyError::AmbiguousDependency { .. })
        ));
        assert!(container.is_ready());
        assert!(container.get_bean::<UserService>().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_policy() {
        let overwrite = ApplicationContainer::builder()
            .bean::<MemoryRepository>()
            .bean::<MemoryRepository>()
            .build();
        overwrite.initialize().await.unwrap();
        assert_eq!(overwrite.len(), 1);

        let reject = ApplicationContainer::builder()
            .duplicate_policy(DuplicatePolicy::Reject)
            .bean::<MemoryRepository>()
            .bean::<MemoryRepository>()
            .build();
        let err = reject.initialize().await.unwrap_err();
        assert!(matches!(
            err.as_dependency(),
            Some(DependencyError::DuplicateComponent { .. })
        ));
    }

    #[tokio::test]
    async fn test_spawned_initialization() {
        let container = Arc::new(
            ApplicationContainer::builder()
                .bean::<MemoryRepository>()
                .build(),
        );
        let task = container.spawn_initialize();
        let report = task.wait().await.unwrap();
        assert_eq!(report.container_id, container.id());
        assert!(container.is_ready());

        let factory: &dyn BeanFactory = &*container;
        assert_eq!(factory.get_all::<dyn Repository>().unwrap().len(), 1);
        assert!(factory.get::<MemoryRepository>().unwrap().is_some());
    }
}
