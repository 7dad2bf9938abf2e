//! 组件注册表抽象接口

use infrastructure_common::{BeanHandle, BeanLookup, BeanRef, ComponentDescriptor};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 注册表条目：标识 → (实例, 描述符)
///
/// 实例与描述符作为一个整体写入和移除，读者不会看到只写了一半的条目。
#[derive(Clone)]
pub struct RegistryEntry {
    identifier: String,
    instance: BeanRef,
    descriptor: Arc<ComponentDescriptor>,
}

impl RegistryEntry {
    /// 创建条目
    pub fn new(
        identifier: impl Into<String>,
        descriptor: Arc<ComponentDescriptor>,
        instance: BeanRef,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            instance,
            descriptor,
        }
    }

    /// 组件标识
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 组件实例
    pub fn instance(&self) -> &BeanRef {
        &self.instance
    }

    /// 组件描述符
    pub fn descriptor(&self) -> &Arc<ComponentDescriptor> {
        &self.descriptor
    }

    /// 是否可赋值给目标类型
    pub fn is_assignable_to(&self, target: TypeId) -> bool {
        self.descriptor.is_assignable_to(target)
    }

    /// 以目标类型视图取出实例
    pub fn view(&self, target: TypeId) -> Option<BeanHandle> {
        self.descriptor.cast(&self.instance, target)
    }

    /// 以 `T` 视图取出实例，`T` 可以是具体类型或 `dyn Trait`
    pub fn view_as<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.view(TypeId::of::<T>())?
            .downcast::<Arc<T>>()
            .ok()
            .map(|arc| *arc)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("identifier", &self.identifier)
            .field("type", &self.descriptor.type_info().name)
            .field("role", self.descriptor.role())
            .finish()
    }
}

/// 组件注册表 trait
///
/// 写操作持有排他锁，读操作持有共享锁；`lookup_assignable` 按注册顺序返回。
pub trait ComponentRegistry: Send + Sync {
    /// 插入或覆盖条目，返回被覆盖的旧条目
    fn register(
        &self,
        identifier: &str,
        descriptor: Arc<ComponentDescriptor>,
        instance: BeanRef,
    ) -> Option<RegistryEntry>;

    /// 按标识精确查询
    fn lookup_exact(&self, identifier: &str) -> Option<RegistryEntry>;

    /// 查询所有可赋值给目标类型的条目，按注册顺序
    fn lookup_assignable(&self, target: TypeId) -> Vec<RegistryEntry>;

    /// 是否包含标识
    fn contains(&self, identifier: &str) -> bool {
        self.lookup_exact(identifier).is_some()
    }

    /// 移除条目
    fn remove(&self, identifier: &str) -> Option<RegistryEntry>;

    /// 清空注册表
    fn clear(&self);

    /// 条目数量
    fn len(&self) -> usize;

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 所有标识，按注册顺序
    fn identifiers(&self) -> Vec<String>;

    /// 只读快照
    fn snapshot(&self) -> RegistrySnapshot;
}

/// 注册表只读快照，按注册顺序保存条目
#[derive(Clone, Default)]
pub struct RegistrySnapshot {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl RegistrySnapshot {
    /// 从有序条目创建快照
    pub fn from_entries(entries: Vec<RegistryEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.identifier.clone(), position))
            .collect();
        Self { entries, index }
    }

    /// 按标识精确查询
    pub fn lookup_exact(&self, identifier: &str) -> Option<&RegistryEntry> {
        self.index.get(identifier).map(|&position| &self.entries[position])
    }

    /// 查询所有可赋值给目标类型的条目，按注册顺序
    pub fn lookup_assignable(&self, target: TypeId) -> Vec<&RegistryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.is_assignable_to(target))
            .collect()
    }

    /// 全部条目
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RegistrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.identifier()))
            .finish()
    }
}

impl BeanLookup for RegistrySnapshot {
    fn lookup(&self, identifier: &str) -> Option<BeanRef> {
        self.lookup_exact(identifier).map(|entry| entry.instance.clone())
    }

    fn lookup_view(&self, target: TypeId) -> Vec<BeanHandle> {
        self.entries
            .iter()
            .filter_map(|entry| entry.view(target))
            .collect()
    }
}
