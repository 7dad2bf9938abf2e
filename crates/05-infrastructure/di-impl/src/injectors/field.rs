//! 组件依赖字段注入

use di_abstractions::{InjectionContext, InjectionOutcome, Injector, RegistryEntry};
use infrastructure_common::{
    BeanHandle, DependencyError, DependencyResult, FieldKind, InjectField,
};
use tracing::{debug, warn};

/// 组件依赖字段注入单元
///
/// 查询键为字段的限定名，没有限定名时为依赖类型的规范名称。
/// 具体类型按键精确查询；接口类型按可赋值性查询，多于一个候选时
/// 必须依靠限定名消除歧义。
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldInjector;

impl FieldInjector {
    /// 创建注入单元
    pub fn new() -> Self {
        Self
    }

    fn resolve(
        &self,
        context: &InjectionContext<'_>,
        field_name: &str,
        field: &InjectField,
    ) -> DependencyResult<Option<BeanHandle>> {
        let target = field.target.id;

        if !field.interface {
            return context
                .registry
                .lookup_exact(field.lookup_key())
                .map(|entry| view_of(entry, field))
                .transpose();
        }

        let candidates = context.registry.lookup_assignable(target);
        match candidates.as_slice() {
            [] => Ok(None),
            [only] => view_of(only, field).map(Some),
            many => {
                let Some(qualifier) = &field.qualifier else {
                    return Err(DependencyError::ambiguous(
                        context.identifier(),
                        field_name,
                        &field.target.name,
                        many.iter().map(|e| e.identifier().to_string()).collect(),
                    ));
                };
                debug!(
                    component = context.identifier(),
                    field = field_name,
                    qualifier = qualifier.as_str(),
                    candidates = many.len(),
                    "按限定名消除歧义"
                );
                context
                    .registry
                    .lookup_exact(qualifier)
                    .map(|entry| view_of(entry, field))
                    .transpose()
            }
        }
    }
}

fn view_of(entry: &RegistryEntry, field: &InjectField) -> DependencyResult<BeanHandle> {
    entry
        .view(field.target.id)
        .ok_or_else(|| DependencyError::TypeMismatch {
            identifier: entry.identifier().to_string(),
            expected: field.target.name.clone(),
        })
}

impl Injector for FieldInjector {
    fn name(&self) -> &str {
        "field"
    }

    fn inject(&self, context: &InjectionContext<'_>) -> DependencyResult<InjectionOutcome> {
        for descriptor in context.descriptor().fields() {
            let FieldKind::Inject(field) = &descriptor.kind else {
                continue;
            };

            match self.resolve(context, &descriptor.name, field)? {
                Some(handle) => {
                    if field.assign(context.instance(), handle) {
                        debug!(
                            component = context.identifier(),
                            field = descriptor.name.as_str(),
                            target = field.target.name.as_str(),
                            "注入依赖"
                        );
                    } else {
                        warn!(
                            component = context.identifier(),
                            field = descriptor.name.as_str(),
                            "依赖类型与字段不匹配，字段保持未设置"
                        );
                    }
                }
                None if context.pass.is_final()
                    && context.config.required_policy.is_required(field.required) =>
                {
                    return Err(DependencyError::missing(
                        context.identifier(),
                        &descriptor.name,
                        &field.target.name,
                    ));
                }
                None => debug!(
                    component = context.identifier(),
                    field = descriptor.name.as_str(),
                    key = field.lookup_key(),
                    "未找到依赖，字段保持未设置"
                ),
            }
        }
        Ok(InjectionOutcome::empty())
    }
}
