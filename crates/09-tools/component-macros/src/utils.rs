//! 宏工具函数

use proc_macro2::Span;
use syn::{GenericArgument, Ident, PathArguments, Type};

/// 字段槽位类型
#[derive(Debug)]
pub enum SlotKind<'a> {
    /// `Inject<T>`，`interface` 表示目标为 trait 对象
    Inject { target: &'a Type, interface: bool },
    /// `Value`
    Value,
    /// `Property<T>`
    Property,
    /// 其他类型
    Other,
}

/// 按字段类型的最后一段判断槽位
pub fn slot_kind(ty: &Type) -> SlotKind<'_> {
    let Type::Path(type_path) = ty else {
        return SlotKind::Other;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return SlotKind::Other;
    };
    match segment.ident.to_string().as_str() {
        "Inject" => match extract_generic_type(ty) {
            Some(target) => SlotKind::Inject {
                target,
                interface: is_trait_object(target),
            },
            None => SlotKind::Other,
        },
        "Value" if segment.arguments.is_empty() => SlotKind::Value,
        "Property" => SlotKind::Property,
        _ => SlotKind::Other,
    }
}

/// 从类型中提取第一个泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

/// 是否为 trait 对象类型（`dyn Trait`）
pub fn is_trait_object(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(_) => true,
        Type::Paren(inner) => is_trait_object(&inner.elem),
        Type::Group(inner) => is_trait_object(&inner.elem),
        _ => false,
    }
}

/// 将驼峰命名转换为蛇形命名
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev_is_lower = chars.get(i - 1).map_or(false, |c| c.is_lowercase());
            let next_is_lower = chars.get(i + 1).map_or(false, |c| c.is_lowercase());

            if prev_is_lower || next_is_lower {
                result.push('_');
            }
        }
        result.push(ch.to_lowercase().next().unwrap_or(ch));
    }

    result
}

/// 生成候选类型提交函数名
pub fn submit_fn_ident(struct_name: &Ident) -> Ident {
    Ident::new(
        &format!("__submit_component_{}", to_snake_case(&struct_name.to_string())),
        Span::call_site(),
    )
}
