//! 示例组件

use component_macros::Component;
use infrastructure_common::{Component, ComponentDescriptor, Inject, Property, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// 问候接口
pub trait Greeter: Send + Sync {
    /// 生成问候语
    fn greet(&self, target: &str) -> String;
}

/// 控制台问候实现
#[derive(Default, Component)]
#[component(name = "consoleGreeter", implements(dyn Greeter), scan)]
pub struct ConsoleGreeter {
    #[value("${greeting.prefix}", default = "")]
    prefix: Value,
}

impl Greeter for ConsoleGreeter {
    fn greet(&self, target: &str) -> String {
        let prefix = self.prefix.get().unwrap_or_default();
        format!("{} 你好, {}!", prefix, target).trim().to_string()
    }
}

/// 服务端口与监听地址
#[derive(Default, Component)]
#[component(properties = "server", scan)]
pub struct ServerSettings {
    /// 端口
    pub port: Property<u16>,
    /// 监听地址
    pub hosts: Property<Vec<String>>,
}

/// 请求计数器，由配置源产出
pub struct RequestCounter {
    count: AtomicU64,
}

impl RequestCounter {
    /// 计数加一并返回新值
    pub fn hit(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Component for RequestCounter {
    fn describe() -> ComponentDescriptor {
        Self::descriptor_builder().build()
    }
}

/// 计数器配置源
#[derive(Default, Component)]
#[component(configuration, bean = "request_counter", scan)]
pub struct CounterConfiguration;

impl CounterConfiguration {
    fn request_counter(&self) -> RequestCounter {
        RequestCounter {
            count: AtomicU64::new(0),
        }
    }
}

/// 应用入口服务
#[derive(Default, Component)]
#[component(init = "announce", scan)]
pub struct WelcomeService {
    #[inject(required)]
    greeter: Inject<dyn Greeter>,
    #[inject(required)]
    counter: Inject<RequestCounter>,
    #[value("${greeting.target}", default = "stranger")]
    target: Value,
}

impl WelcomeService {
    fn announce(&self) -> Result<(), String> {
        if self.greeter.is_set() {
            tracing::info!("欢迎服务已就绪");
            Ok(())
        } else {
            Err("问候实现未注入".to_string())
        }
    }

    /// 处理一次欢迎请求
    pub fn welcome(&self) -> Option<String> {
        let greeter = self.greeter.get()?;
        let counter = self.counter.get()?;
        let target = self.target.get().unwrap_or_default();
        Some(format!("#{} {}", counter.hit(), greeter.greet(&target)))
    }
}
