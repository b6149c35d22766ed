//! 模块加载抽象接口
//!
//! 把匹配到的文件路径转换为注入值

use async_trait::async_trait;
use autoload_common::{InjectValue, LoadError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 模块加载请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRequest {
    /// 匹配器返回的相对路径（`/` 分隔）
    pub relative: String,
    /// 基础目录拼接后的绝对路径
    pub absolute: PathBuf,
}

impl ModuleRequest {
    /// 由基础目录和相对路径创建请求
    pub fn new(base: &Path, relative: impl Into<String>) -> Self {
        let relative = relative.into();
        let absolute = base.join(&relative);
        Self { relative, absolute }
    }

    /// 文件扩展名（小写）
    pub fn extension(&self) -> Option<String> {
        self.absolute
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

/// 模块加载器 trait
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// 加载模块
    async fn load(&self, request: &ModuleRequest) -> Result<InjectValue, LoadError>;

    /// 获取加载器名称
    fn name(&self) -> &str;
}
