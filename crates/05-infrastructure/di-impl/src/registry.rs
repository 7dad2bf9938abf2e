//! 内存组件注册表

use di_abstractions::{ComponentRegistry, RegistryEntry, RegistrySnapshot};
use indexmap::IndexMap;
use infrastructure_common::{BeanRef, ComponentDescriptor};
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

/// 内存组件注册表
///
/// 单个读写锁保护有序映射，条目按插入顺序保存；覆盖已有标识时
/// 保持原位置。
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: RwLock<IndexMap<String, RegistryEntry>>,
}

impl InMemoryRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentRegistry for InMemoryRegistry {
    fn register(
        &self,
        identifier: &str,
        descriptor: Arc<ComponentDescriptor>,
        instance: BeanRef,
    ) -> Option<RegistryEntry> {
        let entry = RegistryEntry::new(identifier, descriptor, instance);
        let previous = self.entries.write().insert(identifier.to_string(), entry);
        debug!(identifier, replaced = previous.is_some(), "注册表写入");
        previous
    }

    fn lookup_exact(&self, identifier: &str) -> Option<RegistryEntry> {
        self.entries.read().get(identifier).cloned()
    }

    fn lookup_assignable(&self, target: TypeId) -> Vec<RegistryEntry> {
        self.entries
            .read()
            .values()
            .filter(|entry| entry.is_assignable_to(target))
            .cloned()
            .collect()
    }

    fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }

    fn remove(&self, identifier: &str) -> Option<RegistryEntry> {
        self.entries.write().shift_remove(identifier)
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn identifiers(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::from_entries(self.entries.read().values().cloned().collect())
    }
}
