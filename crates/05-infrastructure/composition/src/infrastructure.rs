//! 基础设施主入口

use crate::builder::InfrastructureBuilder;
use config_abstractions::ConfigurationEnvironment;
use config_impl::LayeredEnvironment;
use di_impl::{ApplicationContainer, InitializationReport};
use infrastructure_common::{InfrastructureError, InfrastructureResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 应用基础设施
///
/// 持有分层配置环境和应用容器，负责启动和停止容器。
pub struct Infrastructure {
    /// 配置环境
    environment: Arc<LayeredEnvironment>,
    /// 应用容器
    container: Arc<ApplicationContainer>,
    /// 运行状态
    status: Arc<RwLock<InfrastructureStatus>>,
    /// 统计信息
    metrics: Arc<RwLock<InfrastructureMetrics>>,
}

impl Infrastructure {
    /// 创建基础设施构建器
    pub fn builder() -> InfrastructureBuilder {
        InfrastructureBuilder::new()
    }

    pub(crate) fn new(
        environment: Arc<LayeredEnvironment>,
        container: Arc<ApplicationContainer>,
    ) -> Self {
        let metrics = InfrastructureMetrics {
            config_sources_count: environment.source_count(),
            ..InfrastructureMetrics::default()
        };
        Self {
            environment,
            container,
            status: Arc::new(RwLock::new(InfrastructureStatus::Initialized)),
            metrics: Arc::new(RwLock::new(metrics)),
        }
    }

    /// 启动基础设施，驱动容器完成初始化
    pub async fn start(&self) -> InfrastructureResult<InitializationReport> {
        info!(container = %self.container.id(), "启动基础设施");

        {
            let mut status = self.status.write().await;
            if *status != InfrastructureStatus::Initialized {
                return Err(InfrastructureError::BootstrapFailed {
                    message: format!("基础设施状态为 {:?}，无法启动", *status),
                });
            }
            *status = InfrastructureStatus::Starting;
        }
        self.metrics.write().await.start_time = Some(chrono::Utc::now());

        match self.container.initialize().await {
            Ok(report) => {
                {
                    let mut metrics = self.metrics.write().await;
                    metrics.registered_components_count = report.registered;
                    metrics.materialized_components_count = report.materialized;
                }
                *self.status.write().await = InfrastructureStatus::Running;
                info!(
                    registered = report.registered,
                    materialized = report.materialized,
                    "基础设施启动完成"
                );
                Ok(report)
            }
            Err(e) => {
                error!("容器初始化失败: {}", e);
                *self.status.write().await = InfrastructureStatus::Failed;
                Err(e.into())
            }
        }
    }

    /// 在后台任务中启动基础设施
    pub fn start_in_background(
        self: &Arc<Self>,
    ) -> JoinHandle<InfrastructureResult<InitializationReport>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.start().await })
    }

    /// 停止基础设施，移除容器中的全部组件
    ///
    /// 只有 `Running` 或 `Failed` 状态可以停止。
    pub async fn stop(&self) -> InfrastructureResult<()> {
        info!("停止基础设施");
        {
            let mut status = self.status.write().await;
            if !matches!(
                *status,
                InfrastructureStatus::Running | InfrastructureStatus::Failed
            ) {
                return Err(InfrastructureError::BootstrapFailed {
                    message: format!("基础设施状态为 {:?}，无法停止", *status),
                });
            }
            *status = InfrastructureStatus::Stopping;
        }

        if self.container.state().allows_lookup() {
            self.container.remove_all()?;
        } else {
            warn!(state = %self.container.state(), "容器不可用，跳过组件清理");
        }

        *self.status.write().await = InfrastructureStatus::Stopped;
        self.metrics.write().await.stop_time = Some(chrono::Utc::now());
        info!("基础设施停止完成");
        Ok(())
    }

    /// 获取并解析配置值
    pub fn get_config<T>(&self, key: &str) -> InfrastructureResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let environment: &dyn ConfigurationEnvironment = self.environment.as_ref();
        Ok(environment.get_typed(key)?)
    }

    /// 获取指定类型的组件
    pub fn get_bean<T: Send + Sync + 'static>(&self) -> InfrastructureResult<Option<Arc<T>>> {
        Ok(self.container.get_bean::<T>()?)
    }

    /// 获取所有可赋值给 `T` 的组件
    pub fn get_beans<T: ?Sized + 'static>(&self) -> InfrastructureResult<Vec<Arc<T>>> {
        Ok(self.container.get_beans_by_type::<T>()?)
    }

    /// 获取运行状态
    pub async fn status(&self) -> InfrastructureStatus {
        *self.status.read().await
    }

    /// 获取统计信息
    pub async fn metrics(&self) -> InfrastructureMetrics {
        self.metrics.read().await.clone()
    }

    /// 获取配置环境
    pub fn environment(&self) -> &Arc<LayeredEnvironment> {
        &self.environment
    }

    /// 获取应用容器
    pub fn container(&self) -> &Arc<ApplicationContainer> {
        &self.container
    }
}

/// 基础设施运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfrastructureStatus {
    /// 已初始化
    Initialized,
    /// 启动中
    Starting,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
    /// 失败
    Failed,
}

/// 基础设施统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfrastructureMetrics {
    /// 启动时间
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 停止时间
    pub stop_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 就绪时注册的组件数量
    pub registered_components_count: usize,
    /// 工厂方法产出的组件数量
    pub materialized_components_count: usize,
    /// 配置源数量
    pub config_sources_count: usize,
}

impl InfrastructureMetrics {
    /// 计算运行时间
    pub fn uptime(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => Some(stop - start),
            (Some(start), None) => Some(chrono::Utc::now() - start),
            _ => None,
        }
    }
}
