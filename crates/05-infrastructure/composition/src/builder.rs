//! 基础设施构建器

use crate::infrastructure::Infrastructure;
use config_abstractions::{ConfigurationEnvironment, PropertySource};
use config_impl::EnvironmentLoader;
use di_abstractions::{ContainerConfig, DuplicatePolicy, RequiredPolicy, TypeFilter};
use di_impl::{ApplicationContainer, CatalogDiscoverer, InjectionPipeline};
use infrastructure_common::{
    BeanRef, Candidate, Component, ComponentDescriptor, InfrastructureError, InfrastructureResult,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 必需依赖策略配置键
pub const REQUIRED_POLICY_KEY: &str = "container.required-policy";
/// 重复标识策略配置键
pub const DUPLICATE_POLICY_KEY: &str = "container.duplicate-policy";

/// 基础设施构建器
///
/// 组装配置环境、日志和应用容器。容器策略未显式设置时从配置环境读取
/// `container.required-policy` 和 `container.duplicate-policy`。
pub struct InfrastructureBuilder {
    /// 环境加载器
    loader: EnvironmentLoader,
    /// 日志配置，`None` 表示不初始化日志
    logging: Option<LoggingConfig>,
    /// 发现包
    packages: Vec<String>,
    /// 显式候选类型
    candidates: Vec<Candidate>,
    /// 是否使用进程级候选目录
    scan_catalog: bool,
    /// 类型过滤器
    filters: Vec<Arc<dyn TypeFilter>>,
    /// 必需依赖策略
    required_policy: Option<RequiredPolicy>,
    /// 重复标识策略
    duplicate_policy: Option<DuplicatePolicy>,
    /// 注入流水线
    pipeline: InjectionPipeline,
    /// 预注册组件
    beans: Vec<(ComponentDescriptor, BeanRef)>,
}

impl InfrastructureBuilder {
    /// 创建新的基础设施构建器
    pub fn new() -> Self {
        Self {
            loader: EnvironmentLoader::new(),
            logging: None,
            packages: Vec::new(),
            candidates: Vec::new(),
            scan_catalog: false,
            filters: Vec::new(),
            required_policy: None,
            duplicate_policy: None,
            pipeline: InjectionPipeline::standard(),
            beans: Vec::new(),
        }
    }

    /// 设置命令行参数（不含程序名）
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loader = self.loader.with_args(args);
        self
    }

    /// 设置配置目录
    pub fn with_config_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        let dir: PathBuf = dir.as_ref().to_path_buf();
        info!("配置目录: {}", dir.display());
        self.loader = self.loader.with_config_dir(dir);
        self
    }

    /// 显式指定激活环境
    pub fn with_profile<S: Into<String>>(mut self, profile: S) -> Self {
        self.loader = self.loader.with_profile(profile);
        self
    }

    /// 设置环境变量前缀
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.loader = self.loader.with_env_prefix(prefix);
        self
    }

    /// 不读取环境变量
    pub fn without_env_vars(mut self) -> Self {
        self.loader = self.loader.without_env_vars();
        self
    }

    /// 添加默认配置
    pub fn with_default<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.loader = self.loader.with_default(key, value);
        self
    }

    /// 添加自定义配置源
    pub fn add_property_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        info!("添加自定义配置源: {}", source.name());
        self.loader = self.loader.with_source(source);
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 添加发现包
    pub fn add_package<S: Into<String>>(mut self, package: S) -> Self {
        self.packages.push(package.into());
        self
    }

    /// 添加候选类型
    pub fn add_candidate(mut self, candidate: Candidate) -> Self {
        debug!("添加候选类型: {}", candidate.type_info());
        self.candidates.push(candidate);
        self
    }

    /// 从进程级候选目录发现组件
    pub fn scan_catalog(mut self) -> Self {
        self.scan_catalog = true;
        self
    }

    /// 添加类型过滤器
    pub fn add_filter<F: TypeFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// 设置必需依赖策略
    pub fn required_policy(mut self, policy: RequiredPolicy) -> Self {
        self.required_policy = Some(policy);
        self
    }

    /// 设置重复标识策略
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = Some(policy);
        self
    }

    /// 替换注入流水线
    pub fn with_pipeline(mut self, pipeline: InjectionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// 预注册 `Default` 构造的组件
    pub fn bean<T: Component + Default>(mut self) -> Self {
        self.beans.push((T::describe(), Arc::new(T::default())));
        self
    }

    /// 预注册现成实例
    pub fn instance<T: Component>(mut self, instance: T) -> Self {
        self.beans.push((T::describe(), Arc::new(instance)));
        self
    }

    /// 构建基础设施实例
    pub fn build(self) -> InfrastructureResult<Infrastructure> {
        if let Some(logging) = &self.logging {
            initialize_logging(logging)?;
        }
        info!("开始构建基础设施");

        let environment = Arc::new(self.loader.load()?);
        let config = ContainerConfig {
            required_policy: match self.required_policy {
                Some(policy) => policy,
                None => policy_from(environment.as_ref(), REQUIRED_POLICY_KEY)?.unwrap_or_default(),
            },
            duplicate_policy: match self.duplicate_policy {
                Some(policy) => policy,
                None => {
                    policy_from(environment.as_ref(), DUPLICATE_POLICY_KEY)?.unwrap_or_default()
                }
            },
        };
        info!(
            required = ?config.required_policy,
            duplicate = ?config.duplicate_policy,
            "容器策略"
        );

        let mut container = ApplicationContainer::builder()
            .shared_environment(environment.clone())
            .pipeline(self.pipeline)
            .config(config);

        let discoverer = match (self.scan_catalog, self.candidates.is_empty()) {
            (false, true) => None,
            (false, false) => Some(CatalogDiscoverer::with_candidates(self.candidates)),
            (true, _) => Some(
                self.candidates
                    .into_iter()
                    .fold(CatalogDiscoverer::from_catalog(), CatalogDiscoverer::add_candidate),
            ),
        };
        if let Some(discoverer) = discoverer {
            container = container.discoverer(discoverer);
        }
        for package in self.packages {
            container = container.add_package(package);
        }
        for filter in self.filters {
            container = container.add_filter(move |candidate: &Candidate| filter.accepts(candidate));
        }
        for (descriptor, instance) in self.beans {
            container = container.described(descriptor, instance);
        }

        let infrastructure = Infrastructure::new(environment, Arc::new(container.build()));
        info!("基础设施构建完成");
        Ok(infrastructure)
    }
}

impl Default for InfrastructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 从配置环境读取策略，取值为 `snake_case` 或 `kebab-case` 名称
fn policy_from<P: DeserializeOwned>(
    environment: &dyn ConfigurationEnvironment,
    key: &str,
) -> InfrastructureResult<Option<P>> {
    let Some(raw) = environment.get(key) else {
        return Ok(None);
    };
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map(Some)
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("无效的容器策略 {}={}: {}", key, raw, e),
        })
}

/// 初始化日志系统
fn initialize_logging(config: &LoggingConfig) -> InfrastructureResult<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(config.level)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 按名称选择日志配置：`production`/`prod` 为生产配置，其余为开发配置
    pub fn for_profile(profile: &str) -> Self {
        match profile {
            "production" | "prod" => Self::production(),
            _ => Self::development(),
        }
    }
}
