//! 组件描述符
//!
//! 描述符是组件可注入表面的声明式元数据：标识、类型、角色、可注入字段、
//! 方法、可视为的类型（自身、实现的接口、父类型投影）以及初始化方法。
//! 描述符在发现或物化时构建一次，之后不再改变；字段写入通过描述符中
//! 保存的类型擦除闭包完成。

use crate::component::{Component, ComponentRole};
use crate::errors::BoxError;
use crate::metadata::TypeInfo;
use crate::slot::{Bindable, BoundValue, Inject, Property, PropertyShape, Value};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 注册表中保存的组件实例（具体类型擦除后的单例）
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// 以某个视图类型持有的实例，内部为 `Arc<View>`
pub type BeanHandle = Box<dyn Any + Send + Sync>;

/// 视图转换函数
pub type CastFn = Arc<dyn Fn(&BeanRef) -> Option<BeanHandle> + Send + Sync>;

/// 组件依赖字段写入函数
pub type InjectSetter = Arc<dyn Fn(&BeanRef, BeanHandle) -> bool + Send + Sync>;

/// 标量值字段写入函数
pub type ValueSetter = Arc<dyn Fn(&BeanRef, Option<String>) -> bool + Send + Sync>;

/// 结构化配置字段写入函数
pub type PropertySetter = Arc<dyn Fn(&BeanRef, BoundValue) -> Result<(), String> + Send + Sync>;

/// 工厂方法调用函数
pub type ProducerFn =
    Arc<dyn Fn(&BeanRef, &dyn BeanLookup) -> Result<ProducedBean, BoxError> + Send + Sync>;

/// 无返回值方法调用函数
pub type UnitFn = Arc<dyn Fn(&BeanRef) -> Result<(), BoxError> + Send + Sync>;

/// 只读组件查询接口，供带参数的工厂方法解析依赖
pub trait BeanLookup: Send + Sync {
    /// 按标识精确查询
    fn lookup(&self, identifier: &str) -> Option<BeanRef>;

    /// 查询所有可视为目标类型的实例，按注册顺序
    fn lookup_view(&self, target: TypeId) -> Vec<BeanHandle>;
}

impl<'a> dyn BeanLookup + 'a {
    /// 按规范类型名查询具体类型实例
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.lookup(&TypeInfo::of::<T>().name)?.downcast::<T>().ok()
    }

    /// 查询所有可视为 `T` 的实例
    pub fn get_all<T: ?Sized + 'static>(&self) -> Vec<Arc<T>> {
        self.lookup_view(TypeId::of::<T>())
            .into_iter()
            .filter_map(|handle| handle.downcast::<Arc<T>>().ok().map(|arc| *arc))
            .collect()
    }
}

/// 视图种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// 具体类型本身
    Concrete,
    /// 实现的接口（`dyn Trait`）
    Interface,
    /// 声明的父类型投影
    Supertype,
}

/// 组件可被视为的一个类型
#[derive(Clone)]
pub struct TypeView {
    type_info: TypeInfo,
    kind: ViewKind,
    cast: CastFn,
}

impl TypeView {
    /// 创建视图
    pub fn new<F>(type_info: TypeInfo, kind: ViewKind, cast: F) -> Self
    where
        F: Fn(&BeanRef) -> Option<BeanHandle> + Send + Sync + 'static,
    {
        Self {
            type_info,
            kind,
            cast: Arc::new(cast),
        }
    }

    /// 具体类型视图
    pub fn concrete<T: Send + Sync + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), ViewKind::Concrete, |bean: &BeanRef| {
            bean.clone()
                .downcast::<T>()
                .ok()
                .map(|arc| Box::new(arc) as BeanHandle)
        })
    }

    /// 视图类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 视图种类
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// 将实例转换为此视图
    pub fn project(&self, bean: &BeanRef) -> Option<BeanHandle> {
        (self.cast)(bean)
    }
}

impl fmt::Debug for TypeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeView")
            .field("type", &self.type_info.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// 组件依赖字段
#[derive(Clone)]
pub struct InjectField {
    /// 字段声明的依赖类型
    pub target: TypeInfo,
    /// 依赖类型是否为接口
    pub interface: bool,
    /// 显式限定名
    pub qualifier: Option<String>,
    /// 字段是否声明为必需
    pub required: bool,
    setter: InjectSetter,
}

impl InjectField {
    /// 查询键：限定名优先，否则为依赖类型的规范名称
    pub fn lookup_key(&self) -> &str {
        self.qualifier.as_deref().unwrap_or(&self.target.name)
    }

    /// 写入依赖，`handle` 必须是目标类型的视图
    pub fn assign(&self, bean: &BeanRef, handle: BeanHandle) -> bool {
        (self.setter)(bean, handle)
    }
}

/// 标量值字段
#[derive(Clone)]
pub struct ValueField {
    /// 值表达式，例如 `${server.port}`
    pub expression: String,
    /// 配置缺失时的默认值
    pub default: Option<String>,
    setter: ValueSetter,
}

impl ValueField {
    /// 表达式为 `${key}` 时返回 `key`
    pub fn placeholder_key(&self) -> Option<&str> {
        let key = self
            .expression
            .trim()
            .strip_prefix("${")?
            .strip_suffix('}')?
            .trim();
        (!key.is_empty()).then_some(key)
    }

    /// 写入值
    pub fn assign(&self, bean: &BeanRef, value: Option<String>) -> bool {
        (self.setter)(bean, value)
    }
}

/// 结构化配置字段
#[derive(Clone)]
pub struct PropertyField {
    /// 前缀之后的键名，默认为字段名
    pub key: String,
    /// 收集形态
    pub shape: PropertyShape,
    setter: PropertySetter,
}

impl PropertyField {
    /// 转换并写入
    pub fn bind(&self, bean: &BeanRef, value: BoundValue) -> Result<(), String> {
        (self.setter)(bean, value)
    }
}

/// 字段依赖类别
#[derive(Clone)]
pub enum FieldKind {
    /// 组件依赖
    Inject(InjectField),
    /// `${key}` 标量值
    Value(ValueField),
    /// 前缀绑定配置
    Property(PropertyField),
}

/// 可注入字段描述
#[derive(Clone)]
pub struct FieldDescriptor {
    /// 字段名
    pub name: String,
    /// 依赖类别
    pub kind: FieldKind,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("FieldDescriptor");
        out.field("name", &self.name);
        match &self.kind {
            FieldKind::Inject(field) => out
                .field("inject", &field.target.name)
                .field("interface", &field.interface)
                .field("qualifier", &field.qualifier)
                .field("required", &field.required),
            FieldKind::Value(field) => out
                .field("value", &field.expression)
                .field("default", &field.default),
            FieldKind::Property(field) => out
                .field("property", &field.key)
                .field("shape", &field.shape),
        };
        out.finish()
    }
}

/// 工厂方法产出的实例及其描述符
pub struct ProducedBean {
    /// 产出实例的描述符
    pub descriptor: ComponentDescriptor,
    /// 产出实例
    pub instance: BeanRef,
}

impl ProducedBean {
    /// 创建产出
    pub fn new(descriptor: ComponentDescriptor, instance: BeanRef) -> Self {
        Self {
            descriptor,
            instance,
        }
    }
}

impl fmt::Debug for ProducedBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducedBean")
            .field("identifier", &self.descriptor.identifier())
            .finish()
    }
}

/// 方法种类
#[derive(Clone)]
pub enum MethodKind {
    /// 有返回值
    Producer {
        /// 返回类型
        returns: TypeInfo,
        /// 调用函数
        invoke: ProducerFn,
    },
    /// 无返回值
    Unit {
        /// 调用函数
        invoke: UnitFn,
    },
}

/// 方法描述
#[derive(Clone)]
pub struct MethodDescriptor {
    /// 方法名
    pub name: String,
    /// 是否标记为工厂方法
    pub bean: bool,
    /// 方法种类
    pub kind: MethodKind,
}

impl MethodDescriptor {
    /// 返回类型，无返回值时为 `None`
    pub fn returns(&self) -> Option<&TypeInfo> {
        match &self.kind {
            MethodKind::Producer { returns, .. } => Some(returns),
            MethodKind::Unit { .. } => None,
        }
    }

    /// 调用方法；无返回值方法返回 `Ok(None)`
    pub fn invoke(
        &self,
        bean: &BeanRef,
        lookup: &dyn BeanLookup,
    ) -> Result<Option<ProducedBean>, BoxError> {
        match &self.kind {
            MethodKind::Producer { invoke, .. } => invoke(bean, lookup).map(Some),
            MethodKind::Unit { invoke } => invoke(bean).map(|()| None),
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("bean", &self.bean)
            .field("returns", &self.returns().map(|t| t.name.as_str()))
            .finish()
    }
}

/// 无返回值方法的结果，`()` 与 `Result<(), E>` 都可作为初始化方法的返回类型
pub trait MethodOutcome {
    /// 转换为统一结果
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl MethodOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> MethodOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// 字段依赖选项
#[derive(Debug, Clone, Default)]
pub struct InjectOptions {
    /// 显式限定名
    pub qualifier: Option<String>,
    /// 是否必需
    pub required: bool,
}

impl InjectOptions {
    /// 创建默认选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置限定名
    pub fn named(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// 设置是否必需
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// 组件描述符
#[derive(Clone)]
pub struct ComponentDescriptor {
    identifier: String,
    type_info: TypeInfo,
    role: ComponentRole,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    views: Vec<TypeView>,
    supertype: Option<TypeInfo>,
    init_methods: Vec<String>,
}

impl ComponentDescriptor {
    /// 开始构建 `T` 的描述符
    pub fn builder<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new()
    }

    /// 没有可注入表面的描述符，只能按自身类型查询
    pub fn bare<T: Send + Sync + 'static>() -> Self {
        DescriptorBuilder::<T>::new().build()
    }

    /// 组件标识
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 具体类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 组件角色
    pub fn role(&self) -> &ComponentRole {
        &self.role
    }

    /// 可注入字段
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// 声明的方法
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// 按名称查找方法
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// 所有视图
    pub fn views(&self) -> &[TypeView] {
        &self.views
    }

    /// 实现的接口
    pub fn interfaces(&self) -> impl Iterator<Item = &TypeInfo> {
        self.views
            .iter()
            .filter(|v| v.kind == ViewKind::Interface)
            .map(|v| &v.type_info)
    }

    /// 声明的父类型
    pub fn supertype(&self) -> Option<&TypeInfo> {
        self.supertype.as_ref()
    }

    /// 初始化方法名，按声明顺序
    pub fn init_methods(&self) -> &[String] {
        &self.init_methods
    }

    /// 目标类型的视图
    pub fn view(&self, target: TypeId) -> Option<&TypeView> {
        self.views.iter().find(|v| v.type_info.id == target)
    }

    /// 是否可赋值给目标类型
    pub fn is_assignable_to(&self, target: TypeId) -> bool {
        self.view(target).is_some()
    }

    /// 将实例转换为目标类型视图
    pub fn cast(&self, bean: &BeanRef, target: TypeId) -> Option<BeanHandle> {
        self.view(target)?.project(bean)
    }

    /// 替换标识
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("identifier", &self.identifier)
            .field("type", &self.type_info.name)
            .field("role", &self.role)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("views", &self.views)
            .field("supertype", &self.supertype.as_ref().map(|t| t.name.as_str()))
            .field("init_methods", &self.init_methods)
            .finish()
    }
}

fn component_of<T: 'static>(bean: &BeanRef) -> Result<&T, BoxError> {
    (**bean)
        .downcast_ref::<T>()
        .ok_or_else(|| format!("实例类型不是 {}", std::any::type_name::<T>()).into())
}

/// 描述符构建器
pub struct DescriptorBuilder<T> {
    descriptor: ComponentDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    /// 以规范类型名为标识创建构建器
    pub fn new() -> Self {
        let type_info = TypeInfo::of::<T>();
        Self {
            descriptor: ComponentDescriptor {
                identifier: type_info.name.clone(),
                type_info,
                role: ComponentRole::Component,
                fields: Vec::new(),
                methods: Vec::new(),
                views: vec![TypeView::concrete::<T>()],
                supertype: None,
                init_methods: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// 自定义标识
    pub fn named(mut self, identifier: impl Into<String>) -> Self {
        self.descriptor.identifier = identifier.into();
        self
    }

    /// 设置角色
    pub fn role(mut self, role: ComponentRole) -> Self {
        self.descriptor.role = role;
        self
    }

    /// 标记为配置源
    pub fn configuration(self) -> Self {
        self.role(ComponentRole::ConfigurationSource)
    }

    /// 标记为外部绑定组件
    pub fn properties(self, prefix: impl Into<String>) -> Self {
        self.role(ComponentRole::PropertyBound {
            prefix: prefix.into(),
        })
    }

    fn push_view(&mut self, view: TypeView) {
        let id = view.type_info.id;
        self.descriptor.views.retain(|v| v.type_info.id != id);
        self.descriptor.views.push(view);
    }

    /// 声明实现的接口
    pub fn implements<I, F>(mut self, cast: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let view = TypeView::new(TypeInfo::of::<I>(), ViewKind::Interface, move |bean: &BeanRef| {
            let concrete = bean.clone().downcast::<T>().ok()?;
            Some(Box::new(cast(concrete)) as BeanHandle)
        });
        self.push_view(view);
        self
    }

    /// 声明父类型，`project` 给出父类型部分
    pub fn extends<B, F>(mut self, project: F) -> Self
    where
        B: ?Sized + Send + Sync + 'static,
        F: Fn(&T) -> Arc<B> + Send + Sync + 'static,
    {
        self.descriptor.supertype = Some(TypeInfo::of::<B>());
        let view = TypeView::new(TypeInfo::of::<B>(), ViewKind::Supertype, move |bean: &BeanRef| {
            let concrete = (**bean).downcast_ref::<T>()?;
            Some(Box::new(project(concrete)) as BeanHandle)
        });
        self.push_view(view);
        self
    }

    fn push_inject<X, F>(
        mut self,
        field: &str,
        interface: bool,
        options: InjectOptions,
        accessor: F,
    ) -> Self
    where
        X: ?Sized + Send + Sync + 'static,
        F: Fn(&T) -> &Inject<X> + Send + Sync + 'static,
    {
        let setter: InjectSetter = Arc::new(move |bean: &BeanRef, handle: BeanHandle| {
            let Some(component) = (**bean).downcast_ref::<T>() else {
                return false;
            };
            match handle.downcast::<Arc<X>>() {
                Ok(dependency) => {
                    accessor(component).set(*dependency);
                    true
                }
                Err(_) => false,
            }
        });
        self.descriptor.fields.push(FieldDescriptor {
            name: field.to_string(),
            kind: FieldKind::Inject(InjectField {
                target: TypeInfo::of::<X>(),
                interface,
                qualifier: options.qualifier,
                required: options.required,
                setter,
            }),
        });
        self
    }

    /// 具体类型依赖字段
    pub fn inject<X, F>(self, field: &str, accessor: F) -> Self
    where
        X: Send + Sync + 'static,
        F: Fn(&T) -> &Inject<X> + Send + Sync + 'static,
    {
        self.push_inject(field, false, InjectOptions::default(), accessor)
    }

    /// 带选项的具体类型依赖字段
    pub fn inject_with<X, F>(self, field: &str, options: InjectOptions, accessor: F) -> Self
    where
        X: Send + Sync + 'static,
        F: Fn(&T) -> &Inject<X> + Send + Sync + 'static,
    {
        self.push_inject(field, false, options, accessor)
    }

    /// 接口依赖字段
    pub fn inject_interface<X, F>(self, field: &str, accessor: F) -> Self
    where
        X: ?Sized + Send + Sync + 'static,
        F: Fn(&T) -> &Inject<X> + Send + Sync + 'static,
    {
        self.push_inject(field, true, InjectOptions::default(), accessor)
    }

    /// 带选项的接口依赖字段
    pub fn inject_interface_with<X, F>(
        self,
        field: &str,
        options: InjectOptions,
        accessor: F,
    ) -> Self
    where
        X: ?Sized + Send + Sync + 'static,
        F: Fn(&T) -> &Inject<X> + Send + Sync + 'static,
    {
        self.push_inject(field, true, options, accessor)
    }

    /// 标量值字段
    pub fn value<F>(mut self, field: &str, expression: &str, default: Option<&str>, accessor: F) -> Self
    where
        F: Fn(&T) -> &Value + Send + Sync + 'static,
    {
        let setter: ValueSetter = Arc::new(move |bean: &BeanRef, value: Option<String>| {
            match (**bean).downcast_ref::<T>() {
                Some(component) => {
                    accessor(component).set(value);
                    true
                }
                None => false,
            }
        });
        self.descriptor.fields.push(FieldDescriptor {
            name: field.to_string(),
            kind: FieldKind::Value(ValueField {
                expression: expression.to_string(),
                default: default.map(str::to_string),
                setter,
            }),
        });
        self
    }

    /// 结构化配置字段，键名为字段名
    pub fn property<V, F>(self, field: &str, accessor: F) -> Self
    where
        V: Bindable,
        F: Fn(&T) -> &Property<V> + Send + Sync + 'static,
    {
        self.property_as(field, field, accessor)
    }

    /// 结构化配置字段，使用自定义键名
    pub fn property_as<V, F>(mut self, field: &str, key: &str, accessor: F) -> Self
    where
        V: Bindable,
        F: Fn(&T) -> &Property<V> + Send + Sync + 'static,
    {
        let setter: PropertySetter = Arc::new(move |bean: &BeanRef, value: BoundValue| {
            let component = (**bean)
                .downcast_ref::<T>()
                .ok_or_else(|| format!("实例类型不是 {}", std::any::type_name::<T>()))?;
            accessor(component).bind(value)
        });
        self.descriptor.fields.push(FieldDescriptor {
            name: field.to_string(),
            kind: FieldKind::Property(PropertyField {
                key: key.to_string(),
                shape: V::SHAPE,
                setter,
            }),
        });
        self
    }

    fn push_method(&mut self, method: MethodDescriptor) {
        self.descriptor.methods.retain(|m| m.name != method.name);
        self.descriptor.methods.push(method);
    }

    /// 无参工厂方法，产出组件
    pub fn bean<R, F>(self, method: &str, produce: F) -> Self
    where
        R: Component,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.bean_with(method, move |component: &T, _: &dyn BeanLookup| {
            Ok(produce(component))
        })
    }

    /// 可从注册表解析参数、可失败的工厂方法
    pub fn bean_with<R, F>(mut self, method: &str, produce: F) -> Self
    where
        R: Component,
        F: Fn(&T, &dyn BeanLookup) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        let invoke: ProducerFn = Arc::new(move |bean: &BeanRef, lookup: &dyn BeanLookup| {
            let produced = produce(component_of::<T>(bean)?, lookup)?;
            Ok(ProducedBean::new(R::describe(), Arc::new(produced)))
        });
        self.push_method(MethodDescriptor {
            name: method.to_string(),
            bean: true,
            kind: MethodKind::Producer {
                returns: TypeInfo::of::<R>(),
                invoke,
            },
        });
        self
    }

    /// 产出非组件值的工厂方法，产出只能按自身类型查询
    pub fn plain_bean<R, F>(mut self, method: &str, produce: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        let invoke: ProducerFn = Arc::new(move |bean: &BeanRef, _: &dyn BeanLookup| {
            let produced = produce(component_of::<T>(bean)?);
            Ok(ProducedBean::new(
                ComponentDescriptor::bare::<R>(),
                Arc::new(produced),
            ))
        });
        self.push_method(MethodDescriptor {
            name: method.to_string(),
            bean: true,
            kind: MethodKind::Producer {
                returns: TypeInfo::of::<R>(),
                invoke,
            },
        });
        self
    }

    /// 无返回值方法
    pub fn method<F>(mut self, method: &str, invoke: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let invoke: UnitFn = Arc::new(move |bean: &BeanRef| invoke(component_of::<T>(bean)?));
        self.push_method(MethodDescriptor {
            name: method.to_string(),
            bean: false,
            kind: MethodKind::Unit { invoke },
        });
        self
    }

    /// 将方法标记为工厂方法；方法不存在时登记一个无返回值的占位方法
    pub fn mark_bean(mut self, method: &str) -> Self {
        match self.descriptor.methods.iter_mut().find(|m| m.name == method) {
            Some(found) => found.bean = true,
            None => self.descriptor.methods.push(MethodDescriptor {
                name: method.to_string(),
                bean: true,
                kind: MethodKind::Unit {
                    invoke: Arc::new(|_: &BeanRef| Ok(())),
                },
            }),
        }
        self
    }

    /// 声明初始化方法
    pub fn init(mut self, method: &str) -> Self {
        self.descriptor.init_methods.push(method.to_string());
        self
    }

    /// 完成构建
    pub fn build(self) -> ComponentDescriptor {
        self.descriptor
    }
}

impl<T: Send + Sync + 'static> Default for DescriptorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
