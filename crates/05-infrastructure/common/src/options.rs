//! 选项集定义
//!
//! 选项集是选项名到值的有序映射，`override` 与 `merge` 为控制键，
//! 只影响选项合并，不会传递给注册调用

use crate::value::InjectValue;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 覆盖控制键
pub const OVERRIDE_KEY: &str = "override";

/// 合并控制键
pub const MERGE_KEY: &str = "merge";

/// 全部控制键
pub const CONTROL_KEYS: [&str; 2] = [OVERRIDE_KEY, MERGE_KEY];

/// 判断是否为控制键
pub fn is_control_key(key: &str) -> bool {
    CONTROL_KEYS.contains(&key)
}

/// 选项集
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    entries: IndexMap<String, InjectValue>,
}

impl OptionSet {
    /// 创建空选项集
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加选项（构建者风格）
    pub fn with(mut self, key: impl Into<String>, value: impl Into<InjectValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// 设置覆盖控制键
    pub fn with_override(self, enabled: bool) -> Self {
        self.with(OVERRIDE_KEY, InjectValue::data(enabled))
    }

    /// 设置合并控制键
    pub fn with_merge(self, enabled: bool) -> Self {
        self.with(MERGE_KEY, InjectValue::data(enabled))
    }

    /// 插入选项
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<InjectValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// 获取选项
    pub fn get(&self, key: &str) -> Option<&InjectValue> {
        self.entries.get(key)
    }

    /// 是否定义了指定选项
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 按插入顺序遍历选项名
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 按插入顺序遍历选项
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InjectValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 选项数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `override` 控制键是否为真
    pub fn is_override(&self) -> bool {
        self.flag(OVERRIDE_KEY)
    }

    /// `merge` 控制键是否为真
    pub fn is_merge(&self) -> bool {
        self.flag(MERGE_KEY)
    }

    /// 去掉控制键后的选项集
    pub fn without_control_keys(&self) -> Self {
        self.entries
            .iter()
            .filter(|(key, _)| !is_control_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// `bind` 选项，作为调用时的接收者
    pub fn bind(&self) -> Option<&IndexMap<String, InjectValue>> {
        self.get("bind").and_then(InjectValue::as_object)
    }

    /// 转换为 JSON
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(InjectValue::as_bool).unwrap_or(false)
    }
}

impl<K: Into<String>> FromIterator<(K, InjectValue)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, InjectValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<IndexMap<String, InjectValue>> for OptionSet {
    fn from(entries: IndexMap<String, InjectValue>) -> Self {
        Self { entries }
    }
}

impl<'de> Deserialize<'de> for OptionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(k, v)| (k, InjectValue::from(v)))
            .collect())
    }
}

impl Serialize for OptionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
