//! 注入值定义
//!
//! 注入项可以是函数、具名映射或普通数据，对应插件模块可能导出的全部形态

use crate::errors::InvokeError;
use crate::registry::InvokeContext;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// 实体函数类型
///
/// 接收调用上下文（绑定对象与方法注册表）以及 JSON 参数
pub type EntityFn =
    Arc<dyn Fn(&InvokeContext<'_>, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// 带名称的函数
#[derive(Clone)]
pub struct NamedFn {
    /// 函数名称，匿名函数为 `None`
    name: Option<String>,
    /// 函数体
    func: EntityFn,
}

impl NamedFn {
    /// 创建具名函数
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&InvokeContext<'_>, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            name: (!name.is_empty()).then_some(name),
            func: Arc::new(func),
        }
    }

    /// 创建匿名函数
    pub fn anonymous<F>(func: F) -> Self
    where
        F: Fn(&InvokeContext<'_>, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    /// 函数名称
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 调用函数
    pub fn call(&self, ctx: &InvokeContext<'_>, args: &[Value]) -> Result<Value, InvokeError> {
        (self.func)(ctx, args)
    }

    /// 是否指向同一个函数体
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NamedFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedFn")
            .field("name", &self.name)
            .field("func", &"<function>")
            .finish()
    }
}

/// 注入值
#[derive(Clone)]
pub enum InjectValue {
    /// 函数
    Function(NamedFn),
    /// 有序映射，保持枚举顺序
    Object(IndexMap<String, InjectValue>),
    /// 其他数据（字符串、数字、布尔、数组、空值）
    Data(Value),
}

impl InjectValue {
    /// 创建具名函数值
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&InvokeContext<'_>, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self::Function(NamedFn::new(name, func))
    }

    /// 创建有序映射值
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, InjectValue)>,
        K: Into<String>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// 创建数据值
    pub fn data(value: impl Into<Value>) -> Self {
        Self::from(value.into())
    }

    /// 作为函数访问
    pub fn as_function(&self) -> Option<&NamedFn> {
        match self {
            Self::Function(func) => Some(func),
            _ => None,
        }
    }

    /// 作为映射访问
    pub fn as_object(&self) -> Option<&IndexMap<String, InjectValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// 作为布尔值访问
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Data(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// 作为字符串访问
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Data(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// 读取映射中的成员
    pub fn get(&self, key: &str) -> Option<&InjectValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// 是否为函数
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// 是否为映射
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// 值的种类名称，用于日志和验证消息
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Function(_) => "function",
            Self::Object(_) => "object",
            Self::Data(Value::Null) => "null",
            Self::Data(Value::Bool(_)) => "boolean",
            Self::Data(Value::Number(_)) => "number",
            Self::Data(Value::String(_)) => "string",
            Self::Data(Value::Array(_)) => "array",
            Self::Data(Value::Object(_)) => "object",
        }
    }

    /// 转换为 JSON，函数以占位字符串表示
    pub fn to_json(&self) -> Value {
        match self {
            Self::Function(func) => {
                Value::String(format!("[Function: {}]", func.name().unwrap_or("anonymous")))
            }
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Data(value) => value.clone(),
        }
    }
}

impl From<Value> for InjectValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, InjectValue::from(v)))
                    .collect(),
            ),
            other => Self::Data(other),
        }
    }
}

impl From<NamedFn> for InjectValue {
    fn from(func: NamedFn) -> Self {
        Self::Function(func)
    }
}

impl fmt::Debug for InjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(func) => func.fmt(f),
            Self::Object(map) => f.debug_map().entries(map.iter()).finish(),
            Self::Data(value) => write!(f, "{value}"),
        }
    }
}

impl PartialEq for InjectValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Data(a), Self::Data(b)) => a == b,
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for InjectValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for InjectValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// 读取整数参数
pub fn int_arg(args: &[Value], index: usize) -> Result<i64, InvokeError> {
    args.get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| InvokeError::invalid_argument(format!("第 {index} 个参数必须是整数")))
}

/// 读取浮点参数
pub fn float_arg(args: &[Value], index: usize) -> Result<f64, InvokeError> {
    args.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| InvokeError::invalid_argument(format!("第 {index} 个参数必须是数字")))
}
