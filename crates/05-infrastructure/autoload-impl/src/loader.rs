//! 模块加载器实现
//!
//! - [`StaticModuleLoader`] 内存中的模块表，编译进程序的函数模块在启动前登记
//! - [`DataFileLoader`] 读取 JSON / TOML / YAML 数据文件
//! - [`ChainedModuleLoader`] 依次尝试多个加载器

use async_trait::async_trait;
use autoload_abstractions::{ModuleLoader, ModuleRequest};
use autoload_common::{InjectValue, LoadError};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::debug;

/// 静态模块加载器
///
/// 以匹配器返回的相对路径作为键
#[derive(Default)]
pub struct StaticModuleLoader {
    modules: RwLock<IndexMap<String, InjectValue>>,
}

impl StaticModuleLoader {
    /// 创建空的模块表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记模块（构建者风格）
    pub fn with_module(self, path: impl Into<String>, module: impl Into<InjectValue>) -> Self {
        self.register(path, module);
        self
    }

    /// 登记模块，同一路径的旧模块被替换
    pub fn register(&self, path: impl Into<String>, module: impl Into<InjectValue>) {
        let path = normalize(&path.into());
        debug!("登记静态模块: {}", path);
        self.modules.write().insert(path, module.into());
    }

    /// 已登记的模块路径
    pub fn paths(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }

    /// 已登记的模块数量
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches("./").replace('\\', "/")
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn load(&self, request: &ModuleRequest) -> Result<InjectValue, LoadError> {
        self.modules
            .read()
            .get(&normalize(&request.relative))
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: request.relative.clone(),
            })
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// 数据文件加载器
///
/// 根据扩展名选择格式，JSON 对象转换为有序映射
#[derive(Debug, Default, Clone)]
pub struct DataFileLoader;

impl DataFileLoader {
    /// 创建新的数据文件加载器
    pub fn new() -> Self {
        Self
    }

    /// 是否支持该扩展名
    pub fn supports(extension: &str) -> bool {
        matches!(extension, "json" | "toml" | "yaml" | "yml")
    }

    fn parse(request: &ModuleRequest, extension: &str, content: &str) -> Result<Value, LoadError> {
        let parse_failed = |message: String| LoadError::ParseFailed {
            path: request.relative.clone(),
            message,
        };

        match extension {
            "json" => serde_json::from_str(content).map_err(|e| parse_failed(e.to_string())),
            "toml" => toml::from_str(content).map_err(|e| parse_failed(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| parse_failed(e.to_string())),
            _ => Err(LoadError::UnsupportedFormat {
                path: request.relative.clone(),
            }),
        }
    }
}

#[async_trait]
impl ModuleLoader for DataFileLoader {
    async fn load(&self, request: &ModuleRequest) -> Result<InjectValue, LoadError> {
        let extension = request.extension().unwrap_or_default();
        if !Self::supports(&extension) {
            return Err(LoadError::UnsupportedFormat {
                path: request.relative.clone(),
            });
        }

        let content = tokio::fs::read_to_string(&request.absolute)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => LoadError::NotFound {
                    path: request.relative.clone(),
                },
                _ => LoadError::ReadFailed {
                    path: request.relative.clone(),
                    source,
                },
            })?;

        debug!("加载数据文件: {}", request.absolute.display());
        Self::parse(request, &extension, &content).map(InjectValue::from)
    }

    fn name(&self) -> &str {
        "data-file"
    }
}

/// 链式模块加载器
///
/// 按顺序尝试，加载器报告模块不存在或格式不支持时交给下一个
#[derive(Default, Clone)]
pub struct ChainedModuleLoader {
    loaders: Vec<Arc<dyn ModuleLoader>>,
}

impl ChainedModuleLoader {
    /// 创建空的加载器链
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加加载器
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loaders.push(loader);
        self
    }
}

#[async_trait]
impl ModuleLoader for ChainedModuleLoader {
    async fn load(&self, request: &ModuleRequest) -> Result<InjectValue, LoadError> {
        for loader in &self.loaders {
            match loader.load(request).await {
                Err(LoadError::NotFound { .. } | LoadError::UnsupportedFormat { .. }) => {
                    debug!("加载器 {} 无法提供模块 {}", loader.name(), request.relative);
                }
                result => return result,
            }
        }

        Err(LoadError::NotFound {
            path: request.relative.clone(),
        })
    }

    fn name(&self) -> &str {
        "chained"
    }
}
