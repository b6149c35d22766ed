//! 注入项解析器
//!
//! 把注入描述展开为有序的待加载项：字符串按 glob 模式展开为文件路径，
//! 函数和映射等字面值原样保留在原来的位置

use crate::collector::{execute_and_collect_each, Collect};
use autoload_abstractions::{FileMatcher, MatchRequest};
use autoload_common::{IncludeEntry, InjectSpec, InjectValue, ResolutionError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// 解析后的注入项
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedItem {
    /// 相对于基础目录的文件路径，需要通过模块加载器加载
    Path(String),
    /// 字面值
    Literal(InjectValue),
}

/// 注入项解析器
pub struct ItemResolver {
    matcher: Arc<dyn FileMatcher>,
    base: PathBuf,
}

impl ItemResolver {
    /// 创建新的解析器
    pub fn new(matcher: Arc<dyn FileMatcher>, base: impl Into<PathBuf>) -> Self {
        Self {
            matcher,
            base: base.into(),
        }
    }

    /// 基础目录
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// 展开注入描述中的全部包含项，保持声明顺序
    pub async fn get_items(&self, spec: &InjectSpec) -> Result<Vec<ResolvedItem>, ResolutionError> {
        let this = self;
        let ignores = &spec.ignores;

        let items = execute_and_collect_each(&spec.includes, move |entry| async move {
            match entry {
                IncludeEntry::Literal(value) => Ok(Collect::One(ResolvedItem::Literal(value.clone()))),
                IncludeEntry::Pattern(pattern) => this
                    .run_glob(pattern, ignores)
                    .await
                    .map(|files| Collect::Many(files.into_iter().map(ResolvedItem::Path).collect())),
            }
        })
        .await?;

        debug!("注入描述解析出 {} 项", items.len());
        Ok(items)
    }

    /// 展开单个 glob 模式
    ///
    /// 匹配器自身报错时原样返回该错误；只有在没有底层错误且没有匹配时才报告无匹配
    pub async fn run_glob(
        &self,
        pattern: &str,
        ignores: &[String],
    ) -> Result<Vec<String>, ResolutionError> {
        let request = MatchRequest::new(pattern, &self.base).with_ignores(ignores.to_vec());
        let files = self.matcher.find(&request).await?;

        if files.is_empty() {
            return Err(ResolutionError::NoMatches {
                pattern: pattern.to_string(),
            });
        }

        debug!("模式 {} 匹配到 {} 个文件", pattern, files.len());
        Ok(files)
    }
}
