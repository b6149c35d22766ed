//! 注入描述定义
//!
//! 描述要加载什么以及如何加载：模式、忽略模式、前缀和选项

use crate::options::OptionSet;
use crate::value::{InjectValue, NamedFn};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// 实体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    /// 服务器方法
    Methods,
    /// 请求处理器
    Handlers,
    /// 路由
    Routes,
    /// 应用共享值
    Apps,
    /// 绑定对象
    Binds,
}

impl EntityCategory {
    /// 注册顺序，各类别之间严格串行
    pub const REGISTRATION_ORDER: [EntityCategory; 5] = [
        EntityCategory::Methods,
        EntityCategory::Handlers,
        EntityCategory::Routes,
        EntityCategory::Apps,
        EntityCategory::Binds,
    ];

    /// 配置中的字段名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Methods => "methods",
            Self::Handlers => "handlers",
            Self::Routes => "routes",
            Self::Apps => "apps",
            Self::Binds => "binds",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 包含项
///
/// 字符串总是被视为 glob 模式，其余值原样传递
#[derive(Debug, Clone, PartialEq)]
pub enum IncludeEntry {
    /// glob 模式
    Pattern(String),
    /// 字面值（函数或映射）
    Literal(InjectValue),
}

impl From<&str> for IncludeEntry {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_string())
    }
}

impl From<String> for IncludeEntry {
    fn from(pattern: String) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<InjectValue> for IncludeEntry {
    fn from(value: InjectValue) -> Self {
        match value {
            InjectValue::Data(Value::String(pattern)) => Self::Pattern(pattern),
            other => Self::Literal(other),
        }
    }
}

impl From<NamedFn> for IncludeEntry {
    fn from(func: NamedFn) -> Self {
        Self::Literal(InjectValue::Function(func))
    }
}

impl<'de> Deserialize<'de> for IncludeEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|value| Self::from(InjectValue::from(value)))
    }
}

/// 注入描述
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectSpec {
    /// 规范名称前缀
    #[serde(default)]
    pub prefix: Option<String>,
    /// 包含项列表
    pub includes: Vec<IncludeEntry>,
    /// 忽略模式列表
    #[serde(default)]
    pub ignores: Vec<String>,
    /// 配置级选项
    #[serde(default)]
    pub options: Option<OptionSet>,
}

impl InjectSpec {
    /// 创建空的注入描述
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置前缀
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// 添加包含项
    pub fn include(mut self, entry: impl Into<IncludeEntry>) -> Self {
        self.includes.push(entry.into());
        self
    }

    /// 添加忽略模式
    pub fn ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignores.push(pattern.into());
        self
    }

    /// 设置配置级选项
    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = Some(options);
        self
    }
}

/// 插件选项
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AutoloadOptions {
    /// 模式解析和模块加载的基础目录
    #[serde(default)]
    pub relative_to: Option<PathBuf>,
    /// 路由
    #[serde(default)]
    pub routes: Vec<InjectSpec>,
    /// 处理器
    #[serde(default)]
    pub handlers: Vec<InjectSpec>,
    /// 方法
    #[serde(default)]
    pub methods: Vec<InjectSpec>,
    /// 绑定
    #[serde(default)]
    pub binds: Vec<InjectSpec>,
    /// 应用共享值
    #[serde(default)]
    pub apps: Vec<InjectSpec>,
}

impl AutoloadOptions {
    /// 创建空选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置基础目录
    pub fn with_relative_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.relative_to = Some(path.into());
        self
    }

    /// 添加指定类别的注入描述
    pub fn add(mut self, category: EntityCategory, spec: InjectSpec) -> Self {
        self.specs_mut(category).push(spec);
        self
    }

    /// 添加方法注入描述
    pub fn add_methods(self, spec: InjectSpec) -> Self {
        self.add(EntityCategory::Methods, spec)
    }

    /// 添加处理器注入描述
    pub fn add_handlers(self, spec: InjectSpec) -> Self {
        self.add(EntityCategory::Handlers, spec)
    }

    /// 添加路由注入描述
    pub fn add_routes(self, spec: InjectSpec) -> Self {
        self.add(EntityCategory::Routes, spec)
    }

    /// 添加应用注入描述
    pub fn add_apps(self, spec: InjectSpec) -> Self {
        self.add(EntityCategory::Apps, spec)
    }

    /// 添加绑定注入描述
    pub fn add_binds(self, spec: InjectSpec) -> Self {
        self.add(EntityCategory::Binds, spec)
    }

    /// 获取指定类别的注入描述
    pub fn specs(&self, category: EntityCategory) -> &[InjectSpec] {
        match category {
            EntityCategory::Methods => &self.methods,
            EntityCategory::Handlers => &self.handlers,
            EntityCategory::Routes => &self.routes,
            EntityCategory::Apps => &self.apps,
            EntityCategory::Binds => &self.binds,
        }
    }

    fn specs_mut(&mut self, category: EntityCategory) -> &mut Vec<InjectSpec> {
        match category {
            EntityCategory::Methods => &mut self.methods,
            EntityCategory::Handlers => &mut self.handlers,
            EntityCategory::Routes => &mut self.routes,
            EntityCategory::Apps => &mut self.apps,
            EntityCategory::Binds => &mut self.binds,
        }
    }
}
