//! 注入值分类
//!
//! 在注册之前一次性判断模块的形态，以及如何为它确定名称

use autoload_common::{InjectValue, NamedFn, OptionSet};
use indexmap::IndexMap;

const METHOD_KEY: &str = "method";
const OPTIONS_KEY: &str = "options";
const NAME_KEY: &str = "name";

/// 方法模块的形态
#[derive(Debug, Clone)]
pub enum MethodShape {
    /// 单个函数
    PlainFunction(NamedFn),
    /// `{method, options?}` 形式的单个方法
    MethodWithOptions {
        method: NamedFn,
        options: Option<OptionSet>,
    },
    /// 多个具名子方法的映射
    NamedMapping(IndexMap<String, InjectValue>),
    /// 无法注册的值，直接跳过
    Unusable,
}

impl MethodShape {
    /// 对模块整体分类
    pub fn classify(value: &InjectValue) -> Self {
        match value {
            InjectValue::Function(func) => Self::PlainFunction(func.clone()),
            InjectValue::Object(map) => match map.get(METHOD_KEY) {
                Some(InjectValue::Function(method)) => Self::MethodWithOptions {
                    method: method.clone(),
                    options: options_of(map),
                },
                // 声明了 options 却没有可用的 method
                _ if map.contains_key(OPTIONS_KEY) => Self::Unusable,
                _ => Self::NamedMapping(map.clone()),
            },
            InjectValue::Data(_) => Self::Unusable,
        }
    }

    /// 对映射中的单个成员分类，成员不再展开为映射
    pub fn classify_member(value: &InjectValue) -> Self {
        match Self::classify(value) {
            Self::NamedMapping(_) => Self::Unusable,
            shape => shape,
        }
    }

    /// 取出方法体和调用点选项
    pub fn into_method(self) -> Option<(NamedFn, Option<OptionSet>)> {
        match self {
            Self::PlainFunction(method) => Some((method, None)),
            Self::MethodWithOptions { method, options } => Some((method, options)),
            Self::NamedMapping(_) | Self::Unusable => None,
        }
    }
}

fn options_of(map: &IndexMap<String, InjectValue>) -> Option<OptionSet> {
    map.get(OPTIONS_KEY)
        .and_then(InjectValue::as_object)
        .map(|options| OptionSet::from(options.clone()))
}

/// 字面值方法的名称：函数名、`name` 成员或 `method` 函数的名称
pub fn literal_method_name(value: &InjectValue) -> Option<String> {
    match value {
        InjectValue::Function(func) => func.name().map(ToString::to_string),
        InjectValue::Object(map) => map
            .get(NAME_KEY)
            .and_then(InjectValue::as_str)
            .or_else(|| {
                map.get(METHOD_KEY)
                    .and_then(InjectValue::as_function)
                    .and_then(NamedFn::name)
            })
            .map(ToString::to_string),
        InjectValue::Data(_) => None,
    }
}

/// 字面值实体（处理器、应用、绑定）的名称：函数名或 `name` 成员
pub fn literal_entity_name(value: &InjectValue) -> Option<String> {
    match value {
        InjectValue::Function(func) => func.name().map(ToString::to_string),
        InjectValue::Object(map) => map
            .get(NAME_KEY)
            .and_then(InjectValue::as_str)
            .map(ToString::to_string),
        InjectValue::Data(_) => None,
    }
}
