//! 命名约定
//!
//! 规范名称由可选前缀、基础标识符和可选子键以点号连接而成

use std::fmt;
use std::path::Path;

/// 规范名称
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    segments: Vec<String>,
}

impl CanonicalName {
    /// 由前缀、基础标识符和子键组成规范名称
    ///
    /// 各部分中的点号同样拆分为独立的段，与 [`CanonicalName::parse`] 的结果一致
    pub fn new(prefix: Option<&str>, base: &str, subkey: Option<&str>) -> Self {
        let segments = [prefix, Some(base), subkey]
            .into_iter()
            .flatten()
            .flat_map(NamingConventions::split_path)
            .collect();
        Self { segments }
    }

    /// 解析点号路径
    pub fn parse(path: &str) -> Self {
        Self {
            segments: NamingConventions::split_path(path),
        }
    }

    /// 名称的各段
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 最后一段
    pub fn leaf(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// 命名约定规范
#[derive(Debug)]
pub struct NamingConventions;

impl NamingConventions {
    /// 从文件路径提取基础标识符（不含扩展名的文件名）
    pub fn base_name_from_path(path: &str) -> Option<String> {
        Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
    }

    /// 按点号拆分路径，忽略空段
    pub fn split_path(path: &str) -> Vec<String> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// 校验前缀格式
    pub fn is_valid_prefix(prefix: &str) -> bool {
        !prefix.is_empty() && prefix.split('.').all(|segment| !segment.is_empty())
    }
}
