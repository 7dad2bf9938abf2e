//! 前缀绑定配置注入

use di_abstractions::{InjectionContext, InjectionOutcome, Injector};
use infrastructure_common::{
    BoundValue, ConfigError, DependencyResult, FieldKind, PropertyField, PropertyShape,
};
use config_abstractions::ConfigurationEnvironment;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 结构化配置绑定单元
///
/// 只处理外部绑定组件。前缀为 `P` 时，字段 `f` 绑定到：
/// - 单值：`P.f`
/// - 列表：`P.f[i]`，按下标数值排序，允许下标不连续
/// - 映射：`P.f.<sub>`，子键去掉 `P.f.` 前缀
///
/// 任一下标格式错误或类型转换失败时整个字段不绑定，只记录警告，字段保持零值。
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyInjector;

impl PropertyInjector {
    /// 创建注入单元
    pub fn new() -> Self {
        Self
    }
}

/// 收集字段对应的原始配置，没有任何配置时返回 `None`
fn collect(
    environment: &dyn ConfigurationEnvironment,
    base: &str,
    shape: PropertyShape,
) -> Option<BoundValue> {
    match shape {
        PropertyShape::Scalar => environment.get(base).map(BoundValue::Scalar),
        PropertyShape::List => {
            let prefix = format!("{}[", base);
            let mut indexed: Vec<(usize, String)> = Vec::new();
            for key in environment.keys_with_prefix(&prefix) {
                match parse_index(&key[prefix.len()..]) {
                    Some(index) => {
                        if let Some(value) = environment.get(&key) {
                            indexed.push((index, value));
                        }
                    }
                    None => {
                        warn!(
                            "{}",
                            ConfigError::binding_error(&key, "列表下标格式错误，字段保持零值")
                        );
                        return None;
                    }
                }
            }
            if indexed.is_empty() {
                return None;
            }
            indexed.sort_by_key(|(index, _)| *index);
            Some(BoundValue::List(
                indexed.into_iter().map(|(_, value)| value).collect(),
            ))
        }
        PropertyShape::Map => {
            let prefix = format!("{}.", base);
            let entries: BTreeMap<String, String> = environment
                .keys_with_prefix(&prefix)
                .into_iter()
                .filter_map(|key| {
                    let sub = key[prefix.len()..].to_string();
                    if sub.is_empty() {
                        return None;
                    }
                    environment.get(&key).map(|value| (sub, value))
                })
                .collect();
            (!entries.is_empty()).then_some(BoundValue::Map(entries))
        }
    }
}

/// 解析 `3]` 形式的剩余部分
fn parse_index(rest: &str) -> Option<usize> {
    let digits = rest.strip_suffix(']')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn bind_field(context: &InjectionContext<'_>, prefix: &str, name: &str, field: &PropertyField) {
    let base = format!("{}.{}", prefix, field.key);
    let Some(value) = collect(context.environment, &base, field.shape) else {
        debug!(
            component = context.identifier(),
            field = name,
            key = base.as_str(),
            "没有对应配置，字段保持零值"
        );
        return;
    };

    match field.bind(context.instance(), value) {
        Ok(()) => debug!(
            component = context.identifier(),
            field = name,
            key = base.as_str(),
            "绑定配置"
        ),
        Err(message) => warn!(
            component = context.identifier(),
            field = name,
            "{}",
            ConfigError::binding_error(base, message)
        ),
    }
}

impl Injector for PropertyInjector {
    fn name(&self) -> &str {
        "property"
    }

    fn inject(&self, context: &InjectionContext<'_>) -> DependencyResult<InjectionOutcome> {
        let Some(prefix) = context.descriptor().role().prefix() else {
            return Ok(InjectionOutcome::empty());
        };
        for descriptor in context.descriptor().fields() {
            if let FieldKind::Property(field) = &descriptor.kind {
                bind_field(context, prefix, &descriptor.name, field);
            }
        }
        Ok(InjectionOutcome::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injectors::test_support::{context, entry_of, environment};
    use di_abstractions::{ContainerConfig, RegistrySnapshot};
    use infrastructure_common::{Component, ComponentDescriptor, Property};
    use std::collections::HashMap;

    #[derive(Default)]
    struct PoolSettings {
        name: Property<String>,
        size: Property<u32>,
        items: Property<Vec<String>>,
        ports: Property<Vec<u16>>,
        labels: Property<HashMap<String, String>>,
        weights: Property<BTreeMap<String, i32>>,
    }

    impl Component for PoolSettings {
        fn describe() -> ComponentDescriptor {
            Self::descriptor_builder()
                .properties("pool")
                .property("name", |p: &PoolSettings| &p.name)
                .property("size", |p: &PoolSettings| &p.size)
                .property("items", |p: &PoolSettings| &p.items)
                .property("ports", |p: &PoolSettings| &p.ports)
                .property_as("labels", "map", |p: &PoolSettings| &p.labels)
                .property("weights", |p: &PoolSettings| &p.weights)
                .build()
        }
    }

    fn bind(pairs: &[(&str, &str)]) -> std::sync::Arc<PoolSettings> {
        let target = entry_of(PoolSettings::default());
        let snapshot = RegistrySnapshot::from_entries(vec![target.clone()]);
        let env = environment(pairs);
        let config = ContainerConfig::default();
        PropertyInjector
            .inject(&context(&target, &snapshot, &env, &config))
            .unwrap();
        target.instance().clone().downcast::<PoolSettings>().unwrap()
    }

    #[test]
    fn test_list_binding_orders_by_index() {
        let settings = bind(&[
            ("pool.items[2]", "c"),
            ("pool.items[0]", "a"),
            ("pool.items[1]", "b"),
            ("pool.ports[10]", "10"),
            ("pool.ports[9]", "9"),
            ("pool.ports[12]", "12"),
        ]);
        assert_eq!(settings.items.get(), vec!["a", "b", "c"]);
        assert_eq!(settings.ports.get(), vec![9, 10, 12]);
    }

    #[test]
    fn test_map_and_scalar_binding() {
        let settings = bind(&[
            ("pool.name", "primary"),
            ("pool.size", "16"),
            ("pool.map.key1", "x"),
            ("pool.map.key2", "y"),
            ("pool.weights.a.b", "3"),
        ]);
        assert_eq!(settings.name.get(), "primary");
        assert_eq!(settings.size.get(), 16);
        let labels = settings.labels.get();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["key1"], "x");
        assert_eq!(labels["key2"], "y");
        assert_eq!(settings.weights.get().get("a.b"), Some(&3));
    }

    #[test]
    fn test_malformed_entries_keep_zero_value() {
        let settings = bind(&[
            ("pool.size", "many"),
            ("pool.items[x]", "bad"),
            ("pool.items[1]", "ignored"),
            ("pool.ports[0]", "not-a-port"),
        ]);
        assert_eq!(settings.size.get(), 0);
        assert!(settings.items.get().is_empty());
        assert!(settings.ports.get().is_empty());
    }

    #[test]
    fn test_index_gaps_are_allowed() {
        let settings = bind(&[("pool.items[3]", "d"), ("pool.items[0]", "a")]);
        assert_eq!(settings.items.get(), vec!["a", "d"]);
    }

    #[test]
    fn test_plain_component_is_ignored() {
        #[derive(Default)]
        struct Plain {
            name: Property<String>,
        }
        impl Component for Plain {
            fn describe() -> ComponentDescriptor {
                Self::descriptor_builder()
                    .property("name", |p: &Plain| &p.name)
                    .build()
            }
        }

        let target = entry_of(Plain::default());
        let snapshot = RegistrySnapshot::from_entries(vec![target.clone()]);
        let env = environment(&[("name", "x"), (".name", "y")]);
        let config = ContainerConfig::default();
        PropertyInjector
            .inject(&context(&target, &snapshot, &env, &config))
            .unwrap();
        let plain = target.instance().clone().downcast::<Plain>().unwrap();
        assert!(plain.name.get().is_empty());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0]"), Some(0));
        assert_eq!(parse_index("15]"), Some(15));
        assert_eq!(parse_index("]"), None);
        assert_eq!(parse_index("1].name"), None);
        assert_eq!(parse_index("-1]"), None);
    }
}
