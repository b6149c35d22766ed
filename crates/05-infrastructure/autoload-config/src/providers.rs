//! 选项文件加载实现

use autoload_common::{AutoloadOptions, ConfigError, ConfigResult, ValidationError};
use config::{Config, Environment};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "AUTOLOAD";

/// 基础目录对应的环境变量键（经 `config` 转为小写）
const RELATIVE_TO_KEY: &str = "relativeto";

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// 选项文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsFileFormat {
    /// JSON 文件
    Json,
    /// TOML 文件
    Toml,
    /// YAML 文件（`.yaml` / `.yml`）
    Yaml,
}

impl OptionsFileFormat {
    /// 根据文件扩展名判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// 把文本解析为中间 JSON 值
    fn parse(self, content: &str) -> ConfigResult<Value> {
        let parsed: Result<Value, BoxedError> = match self {
            Self::Json => serde_json::from_str(content).map_err(|e| Box::new(e) as BoxedError),
            Self::Toml => toml::from_str(content).map_err(|e| Box::new(e) as BoxedError),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| Box::new(e) as BoxedError),
        };
        parsed.map_err(|source| ConfigError::ParseError { source })
    }
}

/// 选项文件加载器
///
/// 文件只能描述模式和数据字面值，函数需要由模块加载器提供
#[derive(Debug, Clone)]
pub struct OptionsFileLoader {
    env_prefix: String,
}

impl OptionsFileLoader {
    /// 使用默认环境变量前缀创建加载器
    pub fn new() -> Self {
        Self::with_env_prefix(DEFAULT_ENV_PREFIX)
    }

    /// 使用指定环境变量前缀创建加载器
    pub fn with_env_prefix(prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: prefix.into(),
        }
    }

    /// 环境变量前缀
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// 从文件加载选项，格式由扩展名决定
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<AutoloadOptions> {
        let path = path.as_ref();
        let format = OptionsFileFormat::from_path(path).ok_or_else(|| {
            ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }
        })?;

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("加载选项文件: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let options = Self::parse_str(&content, format)?;
        info!("选项文件加载完成: {}", path.display());
        Ok(options)
    }

    /// 从文本解析选项
    pub fn parse_str(content: &str, format: OptionsFileFormat) -> ConfigResult<AutoloadOptions> {
        let value = format.parse(content)?;
        Self::from_value(value)
    }

    /// 从 JSON 值构造选项
    pub fn from_value(value: Value) -> ConfigResult<AutoloadOptions> {
        serde_json::from_value(value).map_err(|e| ConfigError::ValidationError {
            source: ValidationError::new(format!("选项结构无效: {}", e)),
        })
    }

    /// 分层加载选项
    ///
    /// 文件可选，不存在时从空选项开始；随后由 `<前缀>_RELATIVETO`
    /// 环境变量覆盖基础目录
    pub fn load_layered(&self, path: Option<&Path>) -> ConfigResult<AutoloadOptions> {
        let mut options = match path {
            Some(path) if path.exists() => Self::load(path)?,
            Some(path) => {
                debug!("选项文件不存在，使用空选项: {}", path.display());
                AutoloadOptions::new()
            }
            None => AutoloadOptions::new(),
        };

        if let Some(relative_to) = self.env_relative_to()? {
            debug!("环境变量覆盖基础目录: {}", relative_to.display());
            options.relative_to = Some(relative_to);
        }

        Ok(options)
    }

    fn env_relative_to(&self) -> ConfigResult<Option<PathBuf>> {
        let settings = Config::builder()
            .add_source(Environment::with_prefix(&self.env_prefix))
            .build()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;

        match settings.get_string(RELATIVE_TO_KEY) {
            Ok(value) if value.trim().is_empty() => Err(ConfigError::ValidationError {
                source: ValidationError::invalid_field_value(
                    "relativeTo",
                    value,
                    "基础目录不能为空",
                ),
            }),
            Ok(value) => Ok(Some(PathBuf::from(value))),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(ConfigError::ParseError {
                source: Box::new(e),
            }),
        }
    }
}

impl Default for OptionsFileLoader {
    fn default() -> Self {
        Self::new()
    }
}
