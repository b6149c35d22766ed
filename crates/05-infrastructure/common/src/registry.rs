//! 实体注册表
//!
//! 注册表在一次注册流程中被填充，之后的注册步骤和外部使用者都可以读取。
//! 有前缀时按 前缀 -> 文件名 -> 子键 分层组织。

use crate::errors::{InvokeError, InvokeResult};
use crate::naming::{CanonicalName, NamingConventions};
use crate::options::OptionSet;
use crate::value::{InjectValue, NamedFn};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 调用上下文
///
/// 相当于被调用函数内部的接收者：方法选项中的 `bind` 对象，以及方法注册表
#[derive(Clone, Copy, Default)]
pub struct InvokeContext<'a> {
    receiver: Option<&'a IndexMap<String, InjectValue>>,
    registry: Option<&'a Registry>,
}

impl<'a> InvokeContext<'a> {
    /// 创建调用上下文
    pub fn new(
        receiver: Option<&'a IndexMap<String, InjectValue>>,
        registry: Option<&'a Registry>,
    ) -> Self {
        Self { receiver, registry }
    }

    /// 读取接收者上的成员
    pub fn bound(&self, key: &str) -> Option<&'a InjectValue> {
        self.receiver.and_then(|receiver| receiver.get(key))
    }

    /// 调用接收者上的函数成员
    pub fn call_bound(&self, key: &str, args: &[Value]) -> InvokeResult<Value> {
        match self.bound(key) {
            Some(InjectValue::Function(func)) => func.call(self, args),
            Some(_) => Err(InvokeError::NotCallable {
                name: key.to_string(),
            }),
            None => Err(InvokeError::NotFound {
                name: key.to_string(),
            }),
        }
    }

    /// 通过注册表调用其他方法
    pub fn call(&self, path: &str, args: &[Value]) -> InvokeResult<Value> {
        match self.registry {
            Some(registry) => registry.call(path, args),
            None => Err(InvokeError::NotFound {
                name: path.to_string(),
            }),
        }
    }

    /// 方法注册表
    pub fn registry(&self) -> Option<&'a Registry> {
        self.registry
    }
}

impl fmt::Debug for InvokeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokeContext")
            .field("receiver", &self.receiver.map(|r| r.keys().collect::<Vec<_>>()))
            .field("has_registry", &self.registry.is_some())
            .finish()
    }
}

/// 已注册的方法
#[derive(Debug, Clone)]
pub struct RegisteredMethod {
    /// 规范名称
    pub name: CanonicalName,
    /// 方法体
    pub method: NamedFn,
    /// 生效的选项（已去掉控制键）
    pub options: OptionSet,
}

impl RegisteredMethod {
    /// 以选项中的 `bind` 作为接收者调用方法
    pub fn invoke(&self, registry: Option<&Registry>, args: &[Value]) -> InvokeResult<Value> {
        let ctx = InvokeContext::new(self.options.bind(), registry);
        self.method.call(&ctx, args)
    }
}

/// 注册表节点
#[derive(Debug, Clone)]
pub enum RegistryNode {
    /// 方法
    Method(RegisteredMethod),
    /// 普通值（应用、绑定）
    Value(InjectValue),
    /// 分组
    Group(IndexMap<String, RegistryNode>),
}

impl RegistryNode {
    /// 作为方法访问
    pub fn as_method(&self) -> Option<&RegisteredMethod> {
        match self {
            Self::Method(method) => Some(method),
            _ => None,
        }
    }

    /// 作为值访问
    pub fn as_value(&self) -> Option<&InjectValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// 作为分组访问
    pub fn as_group(&self) -> Option<&IndexMap<String, RegistryNode>> {
        match self {
            Self::Group(children) => Some(children),
            _ => None,
        }
    }

    /// 转换为注入值，方法节点转换为其函数体
    pub fn to_inject_value(&self) -> InjectValue {
        match self {
            Self::Method(method) => InjectValue::Function(method.method.clone()),
            Self::Value(value) => value.clone(),
            Self::Group(children) => InjectValue::Object(
                children
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_inject_value()))
                    .collect(),
            ),
        }
    }

    /// 转换为 JSON
    pub fn to_json(&self) -> Value {
        match self {
            Self::Method(method) => Value::String(format!("[Method: {}]", method.name)),
            Self::Value(value) => value.to_json(),
            Self::Group(children) => Value::Object(
                children
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn make_group(&mut self) -> &mut IndexMap<String, RegistryNode> {
        if !matches!(self, Self::Group(_)) {
            *self = Self::Group(IndexMap::new());
        }
        match self {
            Self::Group(children) => children,
            _ => unreachable!("节点已被替换为分组"),
        }
    }

    fn collect_names(&self, path: &mut Vec<String>, out: &mut Vec<String>) {
        match self {
            Self::Group(children) => {
                for (key, child) in children {
                    path.push(key.clone());
                    child.collect_names(path, out);
                    path.pop();
                }
            }
            _ => out.push(path.join(".")),
        }
    }
}

/// 实体注册表
///
/// 可克隆的句柄，克隆之间共享同一份数据
#[derive(Clone, Default)]
pub struct Registry {
    root: Arc<RwLock<IndexMap<String, RegistryNode>>>,
}

impl Registry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 确保路径上的分组存在，已存在的分组保持不变
    pub fn ensure_group(&self, segments: &[String]) {
        let mut root = self.root.write();
        Self::group_at(&mut root, segments);
    }

    /// 在规范名称处写入节点，覆盖已有节点
    pub fn insert(&self, name: &CanonicalName, node: RegistryNode) {
        let Some((leaf, parents)) = name.segments().split_last() else {
            return;
        };

        let mut root = self.root.write();
        let group = Self::group_at(&mut root, parents);
        group.insert(leaf.clone(), node);
        debug!("注册表写入: {}", name);
    }

    /// 按点号路径读取节点
    pub fn get(&self, path: &str) -> Option<RegistryNode> {
        self.lookup(&NamingConventions::split_path(path))
    }

    /// 路径是否存在
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// 调用注册表中的函数
    ///
    /// 调用前释放读锁，被调用的方法可以继续通过注册表调用其他方法
    pub fn call(&self, path: &str, args: &[Value]) -> InvokeResult<Value> {
        let node = self.get(path).ok_or_else(|| InvokeError::NotFound {
            name: path.to_string(),
        })?;

        match node {
            RegistryNode::Method(method) => method.invoke(Some(self), args),
            RegistryNode::Value(InjectValue::Function(func)) => {
                func.call(&InvokeContext::new(None, Some(self)), args)
            }
            _ => Err(InvokeError::NotCallable {
                name: path.to_string(),
            }),
        }
    }

    /// 所有叶子节点的规范名称，按写入顺序深度优先
    pub fn canonical_names(&self) -> Vec<String> {
        let root = self.root.read();
        let mut names = Vec::new();
        let mut path = Vec::new();
        for (key, node) in root.iter() {
            path.push(key.clone());
            node.collect_names(&mut path, &mut names);
            path.pop();
        }
        names
    }

    /// 顶层键
    pub fn keys(&self) -> Vec<String> {
        self.root.read().keys().cloned().collect()
    }

    /// 顶层条目数量
    pub fn len(&self) -> usize {
        self.root.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.root.read().is_empty()
    }

    /// 顶层条目的快照
    pub fn snapshot(&self) -> IndexMap<String, RegistryNode> {
        self.root.read().clone()
    }

    /// 转换为有序映射，可作为调用接收者
    pub fn to_object(&self) -> IndexMap<String, InjectValue> {
        self.root
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.to_inject_value()))
            .collect()
    }

    /// 转换为 JSON
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.root
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn lookup(&self, segments: &[String]) -> Option<RegistryNode> {
        let (first, rest) = segments.split_first()?;
        let root = self.root.read();
        let mut node = root.get(first)?;
        for segment in rest {
            node = node.as_group()?.get(segment)?;
        }
        Some(node.clone())
    }

    fn group_at<'g>(
        mut group: &'g mut IndexMap<String, RegistryNode>,
        segments: &[String],
    ) -> &'g mut IndexMap<String, RegistryNode> {
        for segment in segments {
            group = group
                .entry(segment.clone())
                .or_insert_with(|| RegistryNode::Group(IndexMap::new()))
                .make_group();
        }
        group
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.canonical_names())
            .finish()
    }
}

/// 一次注册流程产生的全部注册表
#[derive(Debug, Clone, Default)]
pub struct AutoloadRegistries {
    /// 方法注册表（分层）
    pub methods: Registry,
    /// 应用注册表（扁平）
    pub apps: Registry,
    /// 绑定注册表（扁平）
    pub binds: Registry,
}

impl AutoloadRegistries {
    /// 创建空注册表集合
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::int_arg;
    use serde_json::json;

    fn method(name: &str, options: OptionSet, func: NamedFn) -> RegistryNode {
        RegistryNode::Method(RegisteredMethod {
            name: CanonicalName::parse(name),
            method: func,
            options,
        })
    }

    #[test]
    fn test_insert_builds_hierarchy() {
        let registry = Registry::new();
        let add = NamedFn::new("add", |_ctx, args| Ok(json!(int_arg(args, 0)? + int_arg(args, 1)?)));

        registry.insert(
            &CanonicalName::new(Some("math"), "ops", Some("add")),
            method("math.ops.add", OptionSet::new(), add),
        );

        assert!(registry.get("math").is_some_and(|n| n.as_group().is_some()));
        assert!(registry.contains("math.ops.add"));
        assert_eq!(registry.canonical_names(), vec!["math.ops.add"]);
        assert_eq!(registry.call("math.ops.add", &[json!(2), json!(3)]), Ok(json!(5)));
    }

    #[test]
    fn test_ensure_group_keeps_existing_entries() {
        let registry = Registry::new();
        registry.insert(
            &CanonicalName::parse("main.answer"),
            RegistryNode::Value(InjectValue::data(42)),
        );

        registry.ensure_group(&["main".to_string()]);

        assert_eq!(registry.canonical_names(), vec!["main.answer"]);
    }

    #[test]
    fn test_method_receives_bind_as_receiver() {
        let registry = Registry::new();
        let options = OptionSet::new().with(
            "bind",
            InjectValue::object([(
                "divide",
                InjectValue::function("divide", |_ctx, args| {
                    Ok(json!(int_arg(args, 0)? * int_arg(args, 1)?))
                }),
            )]),
        );
        let divide = NamedFn::new("divide", |ctx, args| ctx.call_bound("divide", args));

        registry.insert(
            &CanonicalName::parse("sample1Method.divide"),
            method("sample1Method.divide", options, divide),
        );

        assert_eq!(
            registry.call("sample1Method.divide", &[json!(4), json!(2)]),
            Ok(json!(8))
        );
    }

    #[test]
    fn test_methods_call_each_other_through_registry() {
        let registry = Registry::new();
        let add = NamedFn::new("add", |_ctx, args| Ok(json!(int_arg(args, 0)? + int_arg(args, 1)?)));
        let use_add = NamedFn::new("useAdd", |ctx, args| ctx.call("sample2Method.add", args));

        registry.insert(
            &CanonicalName::parse("sample2Method.add"),
            method("sample2Method.add", OptionSet::new(), add),
        );
        registry.insert(
            &CanonicalName::parse("sample3Method.useAdd"),
            method("sample3Method.useAdd", OptionSet::new(), use_add),
        );

        assert_eq!(
            registry.call("sample3Method.useAdd", &[json!(5), json!(3)]),
            Ok(json!(8))
        );
    }

    #[test]
    fn test_call_errors() {
        let registry = Registry::new();
        registry.insert(
            &CanonicalName::parse("foo"),
            RegistryNode::Value(InjectValue::data("bar")),
        );

        assert_eq!(
            registry.call("missing", &[]),
            Err(InvokeError::NotFound {
                name: "missing".to_string()
            })
        );
        assert_eq!(
            registry.call("foo", &[]),
            Err(InvokeError::NotCallable {
                name: "foo".to_string()
            })
        );
    }

    #[test]
    fn test_clones_share_state() {
        let registry = Registry::new();
        let handle = registry.clone();
        handle.insert(
            &CanonicalName::parse("foo"),
            RegistryNode::Value(InjectValue::data("bar")),
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.to_json(), json!({"foo": "bar"}));
    }
}
