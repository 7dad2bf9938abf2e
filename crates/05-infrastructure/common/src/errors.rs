//! 错误类型定义

use crate::lifecycle::ContainerState;
use thiserror::Error;

/// 装箱的动态错误，用于组件构造函数和工厂方法
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("配置类型转换失败: {key}, 原因: {message}")]
    TypeConversionError { key: String, message: String },

    #[error("配置绑定失败: {key}, 原因: {message}")]
    BindingError { key: String, message: String },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl Into<BoxError>) -> Self {
        Self::ParseError {
            source: source.into(),
        }
    }

    /// 创建绑定错误
    pub fn binding_error(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BindingError {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("依赖存在歧义: {component}.{field} ({target}) 匹配到多个候选 {candidates:?}，且未指定限定名")]
    AmbiguousDependency {
        component: String,
        field: String,
        target: String,
        candidates: Vec<String>,
    },

    #[error("缺少必需依赖: {component}.{field} ({target}) 未找到候选组件")]
    MissingDependency {
        component: String,
        field: String,
        target: String,
    },

    #[error("组件构造失败: {type_name}, 原因: {message}")]
    ConstructionFailed { type_name: String, message: String },

    #[error("工厂方法调用失败: {type_name}#{method}, 原因: {message}")]
    FactoryInvocation {
        type_name: String,
        method: String,
        message: String,
    },

    #[error("初始化方法调用失败: {type_name}#{method}, 原因: {message}")]
    InitMethodFailed {
        type_name: String,
        method: String,
        message: String,
    },

    #[error("组件标识重复: {identifier}")]
    DuplicateComponent { identifier: String },

    #[error("组件类型不匹配: {identifier} 无法视为 {expected}")]
    TypeMismatch { identifier: String, expected: String },
}

impl DependencyError {
    /// 创建歧义依赖错误
    pub fn ambiguous(
        component: impl Into<String>,
        field: impl Into<String>,
        target: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        Self::AmbiguousDependency {
            component: component.into(),
            field: field.into(),
            target: target.into(),
            candidates,
        }
    }

    /// 创建缺少依赖错误
    pub fn missing(
        component: impl Into<String>,
        field: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::MissingDependency {
            component: component.into(),
            field: field.into(),
            target: target.into(),
        }
    }

    /// 创建构造失败错误
    pub fn construction(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// 创建工厂方法调用错误
    pub fn factory(
        type_name: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FactoryInvocation {
            type_name: type_name.into(),
            method: method.into(),
            message: message.into(),
        }
    }
}

/// 组件发现错误类型
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    #[error("组件发现失败: {message}")]
    DiscoveryError { message: String },

    #[error("组件元数据无效: {message}")]
    InvalidMetadata { message: String },
}

impl ComponentError {
    /// 创建发现错误
    pub fn discovery_error(message: impl Into<String>) -> Self {
        Self::DiscoveryError {
            message: message.into(),
        }
    }
}

/// 容器错误类型
#[derive(Error, Debug, Clone)]
pub enum ContainerError {
    #[error("容器状态不允许该操作: {operation} (当前状态: {state})")]
    Precondition {
        state: ContainerState,
        operation: &'static str,
    },

    #[error("依赖注入失败: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },

    #[error("组件发现失败: {source}")]
    Discovery {
        #[from]
        source: ComponentError,
    },

    #[error("容器启动任务异常终止: {message}")]
    TaskFailed { message: String },
}

impl ContainerError {
    /// 创建前置条件错误
    pub fn precondition(state: ContainerState, operation: &'static str) -> Self {
        Self::Precondition { state, operation }
    }

    /// 内部的依赖错误（如果有）
    pub fn as_dependency(&self) -> Option<&DependencyError> {
        match self {
            Self::Dependency { source } => Some(source),
            _ => None,
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("容器错误: {source}")]
    ContainerError {
        #[from]
        source: ContainerError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ComponentResult<T> = Result<T, ComponentError>;
pub type ContainerResult<T> = Result<T, ContainerError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
