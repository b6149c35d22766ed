//! 文件匹配抽象接口

use async_trait::async_trait;
use autoload_common::ResolutionError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 文件匹配请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    /// glob 模式
    pub pattern: String,
    /// 忽略模式
    pub ignores: Vec<String>,
    /// 基础目录
    pub cwd: PathBuf,
    /// 是否排除目录
    pub nodir: bool,
}

impl MatchRequest {
    /// 创建新的匹配请求，默认排除目录
    pub fn new(pattern: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            ignores: Vec::new(),
            cwd: cwd.into(),
            nodir: true,
        }
    }

    /// 设置忽略模式
    pub fn with_ignores(mut self, ignores: Vec<String>) -> Self {
        self.ignores = ignores;
        self
    }

    /// 设置是否排除目录
    pub fn with_nodir(mut self, nodir: bool) -> Self {
        self.nodir = nodir;
        self
    }
}

/// 文件匹配器 trait
///
/// 返回相对于基础目录、以 `/` 分隔的路径。没有匹配时可以返回空列表，
/// 是否视为错误由调用方决定；匹配器自身的错误以 [`ResolutionError::MatcherFailed`] 报告
#[async_trait]
pub trait FileMatcher: Send + Sync {
    /// 查找匹配的文件
    async fn find(&self, request: &MatchRequest) -> Result<Vec<String>, ResolutionError>;

    /// 获取匹配器名称
    fn name(&self) -> &str;
}
