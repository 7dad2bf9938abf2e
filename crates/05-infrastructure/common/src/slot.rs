//! 可注入字段槽位
//!
//! 组件实例注册后以 `Arc` 共享，注入器只能通过内部可变性回填字段。
//! 每种槽位对应一类依赖：
//!
//! - [`Inject`] - 其他组件（具体类型或 `dyn Trait`）
//! - [`Value`] - `${key}` 形式的标量配置值
//! - [`Property`] - 按前缀绑定的结构化配置

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 组件依赖槽位
pub struct Inject<T: ?Sized> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> Inject<T> {
    /// 创建空槽位
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// 获取已注入的依赖
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    /// 是否已注入
    pub fn is_set(&self) -> bool {
        self.slot.read().is_some()
    }

    /// 写入依赖
    pub fn set(&self, value: Arc<T>) {
        *self.slot.write() = Some(value);
    }

    /// 清空依赖
    pub fn clear(&self) {
        *self.slot.write() = None;
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<T>())
            .field("set", &self.is_set())
            .finish()
    }
}

/// 标量配置值槽位
#[derive(Default)]
pub struct Value {
    slot: RwLock<Option<String>>,
}

impl Value {
    /// 创建空槽位
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已注入的值
    pub fn get(&self) -> Option<String> {
        self.slot.read().clone()
    }

    /// 获取值并解析为目标类型
    pub fn parse<T: FromStr>(&self) -> Option<T> {
        self.slot.read().as_deref().and_then(|raw| raw.parse().ok())
    }

    /// 写入值，`None` 表示缺省
    pub fn set(&self, value: Option<String>) {
        *self.slot.write() = value;
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&*self.slot.read()).finish()
    }
}

/// 结构化配置的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    /// `P.field`
    Scalar,
    /// `P.field[i]`
    List,
    /// `P.field.<sub>`
    Map,
}

/// 从环境中收集到的原始配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// 单个值
    Scalar(String),
    /// 按下标排序后的值序列
    List(Vec<String>),
    /// 去掉前缀后的子键映射
    Map(BTreeMap<String, String>),
}

/// 可从配置绑定的类型
pub trait Bindable: Default + Clone + Send + Sync + 'static {
    /// 绑定时需要收集的配置形态
    const SHAPE: PropertyShape;

    /// 从原始配置转换
    fn from_bound(value: BoundValue) -> Result<Self, String>;
}

/// 可由单个字符串解析的类型
pub trait ScalarValue: Sized {
    /// 解析字符串
    fn parse_scalar(raw: &str) -> Result<Self, String>;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScalarValue for $ty {
                fn parse_scalar(raw: &str) -> Result<Self, String> {
                    raw.trim()
                        .parse::<$ty>()
                        .map_err(|e| format!("无法将 '{}' 解析为 {}: {}", raw, stringify!($ty), e))
                }
            }

            impl Bindable for $ty {
                const SHAPE: PropertyShape = PropertyShape::Scalar;

                fn from_bound(value: BoundValue) -> Result<Self, String> {
                    match value {
                        BoundValue::Scalar(raw) => <$ty as ScalarValue>::parse_scalar(&raw),
                        other => Err(format!("期望单值配置，实际为 {:?}", other)),
                    }
                }
            }
        )*
    };
}

impl_scalar!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl ScalarValue for String {
    fn parse_scalar(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl Bindable for String {
    const SHAPE: PropertyShape = PropertyShape::Scalar;

    fn from_bound(value: BoundValue) -> Result<Self, String> {
        match value {
            BoundValue::Scalar(raw) => Ok(raw),
            other => Err(format!("期望单值配置，实际为 {:?}", other)),
        }
    }
}

impl<T> Bindable for Vec<T>
where
    T: ScalarValue + Clone + Send + Sync + 'static,
{
    const SHAPE: PropertyShape = PropertyShape::List;

    fn from_bound(value: BoundValue) -> Result<Self, String> {
        match value {
            BoundValue::List(items) => items.iter().map(|item| T::parse_scalar(item)).collect(),
            other => Err(format!("期望列表配置，实际为 {:?}", other)),
        }
    }
}

impl<T> Bindable for HashMap<String, T>
where
    T: ScalarValue + Clone + Send + Sync + 'static,
{
    const SHAPE: PropertyShape = PropertyShape::Map;

    fn from_bound(value: BoundValue) -> Result<Self, String> {
        match value {
            BoundValue::Map(entries) => entries
                .into_iter()
                .map(|(key, raw)| T::parse_scalar(&raw).map(|parsed| (key, parsed)))
                .collect(),
            other => Err(format!("期望映射配置，实际为 {:?}", other)),
        }
    }
}

impl<T> Bindable for BTreeMap<String, T>
where
    T: ScalarValue + Clone + Send + Sync + 'static,
{
    const SHAPE: PropertyShape = PropertyShape::Map;

    fn from_bound(value: BoundValue) -> Result<Self, String> {
        match value {
            BoundValue::Map(entries) => entries
                .into_iter()
                .map(|(key, raw)| T::parse_scalar(&raw).map(|parsed| (key, parsed)))
                .collect(),
            other => Err(format!("期望映射配置，实际为 {:?}", other)),
        }
    }
}

/// 结构化配置槽位，未绑定时保持 `T::default()`
pub struct Property<T: Bindable> {
    slot: RwLock<T>,
}

impl<T: Bindable> Property<T> {
    /// 创建零值槽位
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(T::default()),
        }
    }

    /// 获取当前值
    pub fn get(&self) -> T {
        self.slot.read().clone()
    }

    /// 写入值
    pub fn set(&self, value: T) {
        *self.slot.write() = value;
    }

    /// 从原始配置转换并写入；失败时保持原值
    pub fn bind(&self, value: BoundValue) -> Result<(), String> {
        let parsed = T::from_bound(value)?;
        self.set(parsed);
        Ok(())
    }
}

impl<T: Bindable> Default for Property<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Bindable + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.slot.read()).finish()
    }
}
