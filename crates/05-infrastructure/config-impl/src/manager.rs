//! 分层配置环境实现

use config_abstractions::{ConfigurationEnvironment, PropertySource};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// 占位符递归展开的最大深度
pub const MAX_PLACEHOLDER_DEPTH: usize = 8;

/// 分层配置环境
///
/// 协调多个配置源，按优先级从高到低查找；值中的 `${other.key}`
/// 会被替换为对应配置，无法解析的占位符原样保留。
#[derive(Default, Clone)]
pub struct LayeredEnvironment {
    /// 配置源列表（按优先级排序，高优先级在前）
    sources: Vec<Arc<dyn PropertySource>>,
}

impl fmt::Debug for LayeredEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredEnvironment")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl LayeredEnvironment {
    /// 创建空环境
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加配置源
    pub fn with_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        self.add_source(Arc::new(source));
        self
    }

    /// 注册配置源
    pub fn add_source(&mut self, source: Arc<dyn PropertySource>) {
        info!(
            "注册配置源: {} (优先级 {})",
            source.name(),
            source.priority()
        );
        self.sources.push(source);
        // 稳定排序，同优先级保持注册顺序
        self.sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// 配置源名称，按优先级从高到低
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// 配置源数量
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// 获取未展开的原始值
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.sources.iter().find_map(|source| source.get(key))
    }

    /// 展开值中的占位符
    pub fn expand(&self, value: &str) -> String {
        self.expand_value(value, 0)
    }

    fn expand_value(&self, value: &str, depth: usize) -> String {
        if !value.contains("${") {
            return value.to_string();
        }
        if depth >= MAX_PLACEHOLDER_DEPTH {
            warn!("占位符展开超过最大深度 {}: {}", MAX_PLACEHOLDER_DEPTH, value);
            return value.to_string();
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let key = after[..end].trim();
            match self.get_raw(key) {
                Some(resolved) => out.push_str(&self.expand_value(&resolved, depth + 1)),
                None => out.push_str(&rest[start..start + end + 3]),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

impl ConfigurationEnvironment for LayeredEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.get_raw(key).map(|value| self.expand(&value))
    }

    fn to_map(&self) -> HashMap<String, String> {
        let mut merged = HashMap::new();
        // 低优先级先写入，高优先级覆盖
        for source in self.sources.iter().rev() {
            merged.extend(source.to_map());
        }
        merged
            .into_iter()
            .map(|(key, value)| {
                let expanded = self.expand(&value);
                (key, expanded)
            })
            .collect()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .sources
            .iter()
            .flat_map(|source| source.keys())
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}
