//! 基于 glob 的文件匹配器

use async_trait::async_trait;
use autoload_abstractions::{FileMatcher, MatchRequest};
use autoload_common::ResolutionError;
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path};
use tracing::debug;

/// glob 文件匹配器
///
/// 结果为相对于基础目录、以 `/` 分隔的路径，顺序与 glob 遍历顺序一致。
/// 遍历中无法读取的条目视为匹配器错误
#[derive(Debug, Clone, Copy)]
pub struct GlobFileMatcher {
    options: MatchOptions,
}

impl GlobFileMatcher {
    /// 创建新的匹配器
    ///
    /// `*` 不跨越路径分隔符，隐藏文件需要显式写出前导点号
    pub fn new() -> Self {
        Self {
            options: MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: true,
            },
        }
    }

    fn compile_ignores(ignores: &[String]) -> Result<Vec<Pattern>, ResolutionError> {
        ignores
            .iter()
            .map(|ignore| {
                Pattern::new(ignore).map_err(|e| ResolutionError::MatcherFailed {
                    pattern: ignore.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn to_relative(path: &Path, cwd: &Path) -> String {
        match path.strip_prefix(cwd) {
            Ok(relative) => relative
                .components()
                .filter_map(|component| match component {
                    Component::Normal(part) => Some(part.to_string_lossy()),
                    Component::ParentDir => Some("..".into()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }
}

impl Default for GlobFileMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileMatcher for GlobFileMatcher {
    async fn find(&self, request: &MatchRequest) -> Result<Vec<String>, ResolutionError> {
        let matcher_failed = |message: String| ResolutionError::MatcherFailed {
            pattern: request.pattern.clone(),
            message,
        };

        let ignores = Self::compile_ignores(&request.ignores)?;
        let full_pattern = Path::new(&Pattern::escape(&request.cwd.to_string_lossy()))
            .join(&request.pattern)
            .to_string_lossy()
            .into_owned();

        let entries = glob::glob_with(&full_pattern, self.options)
            .map_err(|e| matcher_failed(e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| matcher_failed(e.to_string()))?;
            if request.nodir && path.is_dir() {
                continue;
            }

            let relative = Self::to_relative(&path, &request.cwd);
            if ignores
                .iter()
                .any(|ignore| ignore.matches_with(&relative, self.options))
            {
                debug!("忽略文件: {}", relative);
                continue;
            }

            files.push(relative);
        }

        debug!("模式 {} 在 {} 下匹配到 {} 个文件", request.pattern, request.cwd.display(), files.len());
        Ok(files)
    }

    fn name(&self) -> &str {
        "glob"
    }
}
