//! `${key}` 标量值注入

use di_abstractions::{InjectionContext, InjectionOutcome, Injector};
use infrastructure_common::{DependencyResult, FieldKind};
use tracing::{debug, warn};

/// 标量值注入单元
///
/// 只处理 `${key}` 形式的表达式：命中时注入配置值，未命中时注入默认值。
/// 其他表达式保持原样，不做解析。
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueInjector;

impl ValueInjector {
    /// 创建注入单元
    pub fn new() -> Self {
        Self
    }
}

impl Injector for ValueInjector {
    fn name(&self) -> &str {
        "value"
    }

    fn inject(&self, context: &InjectionContext<'_>) -> DependencyResult<InjectionOutcome> {
        for descriptor in context.descriptor().fields() {
            let FieldKind::Value(field) = &descriptor.kind else {
                continue;
            };
            let Some(key) = field.placeholder_key() else {
                debug!(
                    component = context.identifier(),
                    field = descriptor.name.as_str(),
                    expression = field.expression.as_str(),
                    "不是占位符表达式，跳过"
                );
                continue;
            };

            let value = context
                .environment
                .get(key)
                .or_else(|| field.default.clone());
            debug!(
                component = context.identifier(),
                field = descriptor.name.as_str(),
                key,
                found = value.is_some(),
                "注入配置值"
            );
            if !field.assign(context.instance(), value) {
                warn!(
                    component = context.identifier(),
                    field = descriptor.name.as_str(),
                    "实例类型与描述符不一致，跳过"
                );
            }
        }
        Ok(InjectionOutcome::empty())
    }
}
