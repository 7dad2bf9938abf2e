//! # 依赖注入具体实现
//!
//! 提供内存注册表、标准注入单元、注入流水线、候选目录发现器以及
//! 驱动初始化状态机的应用容器。
//!
//! ```rust,ignore
//! let container = ApplicationContainer::builder()
//!     .environment(environment)
//!     .scan_catalog()
//!     .build();
//! container.initialize().await?;
//! let service = container.get_bean::<UserService>()?;
//! ```

pub mod catalog;
pub mod container;
pub mod injectors;
pub mod pipeline;
pub mod registry;

pub use catalog::CatalogDiscoverer;
pub use container::{
    ApplicationContainer, ApplicationContainerBuilder, InitializationReport, StartupTask,
};
pub use injectors::{FactoryMethodInjector, FieldInjector, PropertyInjector, ValueInjector};
pub use pipeline::InjectionPipeline;
pub use registry::InMemoryRegistry;
