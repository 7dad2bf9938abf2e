//! `#[derive(Component)]` 实现

use crate::utils::{slot_kind, submit_fn_ident, SlotKind};
use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Meta, Path, Result, Token,
    Type,
};

/// 类型级 `#[component(...)]` 参数
#[derive(Default)]
pub struct ComponentArgs {
    /// 自定义组件标识
    pub name: Option<LitStr>,
    /// 配置源
    pub configuration: bool,
    /// 外部绑定前缀
    pub properties: Option<LitStr>,
    /// 实现的接口
    pub implements: Vec<Type>,
    /// 工厂方法
    pub beans: Vec<LitStr>,
    /// 初始化方法
    pub inits: Vec<LitStr>,
    /// 描述符定制函数
    pub customize: Option<Path>,
    /// 是否提交到候选目录
    pub scan: bool,
}

impl ComponentArgs {
    /// 从类型属性解析
    pub fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut args = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("component")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    args.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("configuration") {
                    args.configuration = true;
                } else if meta.path.is_ident("properties") {
                    args.properties = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("implements") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let types = content.parse_terminated(Type::parse, Token![,])?;
                    args.implements.extend(types);
                } else if meta.path.is_ident("bean") {
                    args.beans.push(meta.value()?.parse()?);
                } else if meta.path.is_ident("init") {
                    args.inits.push(meta.value()?.parse()?);
                } else if meta.path.is_ident("customize") {
                    args.customize = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("scan") {
                    args.scan = true;
                } else {
                    return Err(meta.error("未知的 component 参数"));
                }
                Ok(())
            })?;
        }
        if args.configuration && args.properties.is_some() {
            return Err(Error::new(
                proc_macro2::Span::call_site(),
                "configuration 与 properties 不能同时使用",
            ));
        }
        Ok(args)
    }
}

/// 字段级 `#[inject(...)]` 参数
#[derive(Default)]
struct InjectArgs {
    named: Option<LitStr>,
    required: bool,
}

/// 字段级 `#[value("${key}", default = "...")]` 参数
struct ValueArgs {
    expression: LitStr,
    default: Option<LitStr>,
}

fn attribute<'a>(field: &'a Field, name: &str) -> Option<&'a Attribute> {
    field.attrs.iter().find(|a| a.path().is_ident(name))
}

fn parse_inject(attr: &Attribute) -> Result<InjectArgs> {
    let mut args = InjectArgs::default();
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(args);
    }
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("named") {
            args.named = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("required") {
            args.required = true;
        } else {
            return Err(meta.error("未知的 inject 参数"));
        }
        Ok(())
    })?;
    Ok(args)
}

fn parse_value(attr: &Attribute) -> Result<ValueArgs> {
    attr.parse_args_with(|input: ParseStream<'_>| {
        let expression: LitStr = input.parse()?;
        let mut default = None;
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if !input.is_empty() {
                let key: Ident = input.parse()?;
                if key != "default" {
                    return Err(Error::new(key.span(), "未知的 value 参数"));
                }
                input.parse::<Token![=]>()?;
                default = Some(input.parse()?);
            }
        }
        Ok(ValueArgs {
            expression,
            default,
        })
    })
}

fn parse_property_key(attr: &Attribute) -> Result<Option<LitStr>> {
    let mut key = None;
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(key);
    }
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            key = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("未知的 property 参数"))
        }
    })?;
    Ok(key)
}

/// 为单个字段生成描述符构建调用
fn field_registration(field: &Field, args: &ComponentArgs) -> Result<Option<TokenStream>> {
    let Some(ident) = &field.ident else {
        return Ok(None);
    };
    let field_name = ident.to_string();
    let kind = slot_kind(&field.ty);

    if let Some(attr) = attribute(field, "inject") {
        let SlotKind::Inject { target, interface } = kind else {
            return Err(Error::new(field.ty.span(), "#[inject] 字段的类型必须是 Inject<T>"));
        };
        let inject = parse_inject(attr)?;
        let named = inject.named.map(|q| quote!(.named(#q)));
        let required = inject.required;
        let method = if interface {
            quote!(inject_interface_with)
        } else {
            quote!(inject_with)
        };
        return Ok(Some(quote_spanned! {field.span()=>
            .#method::<#target, _>(
                #field_name,
                ::infrastructure_common::InjectOptions::new() #named .required(#required),
                |component: &Self| &component.#ident,
            )
        }));
    }

    if let Some(attr) = attribute(field, "value") {
        if !matches!(kind, SlotKind::Value) {
            return Err(Error::new(field.ty.span(), "#[value] 字段的类型必须是 Value"));
        }
        let ValueArgs {
            expression,
            default,
        } = parse_value(attr)?;
        let default = match default {
            Some(d) => quote!(::std::option::Option::Some(#d)),
            None => quote!(::std::option::Option::None),
        };
        return Ok(Some(quote_spanned! {field.span()=>
            .value(#field_name, #expression, #default, |component: &Self| &component.#ident)
        }));
    }

    let property_attr = attribute(field, "property");
    if let SlotKind::Property = kind {
        if args.properties.is_none() {
            return match property_attr {
                Some(attr) => Err(Error::new(
                    attr.span(),
                    "#[property] 需要类型声明 #[component(properties = \"...\")]",
                )),
                None => Ok(None),
            };
        }
        let key = match property_attr {
            Some(attr) => parse_property_key(attr)?,
            None => None,
        }
        .map_or_else(|| quote!(#field_name), |k| quote!(#k));
        return Ok(Some(quote_spanned! {field.span()=>
            .property_as(#field_name, #key, |component: &Self| &component.#ident)
        }));
    }
    if let Some(attr) = property_attr {
        return Err(Error::new(attr.span(), "#[property] 字段的类型必须是 Property<T>"));
    }

    Ok(None)
}

/// 展开 `#[derive(Component)]`
pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new(input.generics.span(), "组件类型不能带泛型参数"));
    }
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(Error::new(input.span(), "组件必须是具名字段结构体或单元结构体"))
            }
        },
        _ => return Err(Error::new(input.span(), "只有结构体可以派生 Component")),
    };

    let args = ComponentArgs::from_attributes(&input.attrs)?;

    let mut chain = Vec::new();
    if let Some(name) = &args.name {
        chain.push(quote!(.named(#name)));
    }
    if args.configuration {
        chain.push(quote!(.configuration()));
    }
    if let Some(prefix) = &args.properties {
        chain.push(quote!(.properties(#prefix)));
    }
    for interface in &args.implements {
        chain.push(quote! {
            .implements::<#interface, _>(
                |bean: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#interface> { bean },
            )
        });
    }
    for field in &fields {
        if let Some(tokens) = field_registration(field, &args)? {
            chain.push(tokens);
        }
    }
    for bean in &args.beans {
        let method: Ident = bean.parse()?;
        chain.push(quote!(.bean(#bean, |component: &Self| component.#method())));
    }
    for init in &args.inits {
        let method: Ident = init.parse()?;
        chain.push(quote! {
            .method(#init, |component: &Self| {
                ::infrastructure_common::MethodOutcome::into_outcome(component.#method())
            })
            .init(#init)
        });
    }

    let customize = args.customize.as_ref().map(|path| {
        quote!(let builder = #path(builder);)
    });

    let submit = args.scan.then(|| {
        let fn_name = submit_fn_ident(struct_name);
        quote! {
            #[::ctor::ctor]
            fn #fn_name() {
                ::infrastructure_common::submit_candidate(
                    ::infrastructure_common::Candidate::of::<#struct_name>,
                );
            }
        }
    });

    Ok(quote! {
        impl ::infrastructure_common::Component for #struct_name {
            fn describe() -> ::infrastructure_common::ComponentDescriptor {
                let builder = <Self as ::infrastructure_common::Component>::descriptor_builder()
                    #(#chain)*;
                #customize
                builder.build()
            }
        }

        #submit
    })
}
