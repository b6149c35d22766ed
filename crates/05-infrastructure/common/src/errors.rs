//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("不支持的配置文件格式: {path}")]
    UnsupportedFormat { path: String },

    #[error("配置验证失败: {source}")]
    ValidationError {
        #[from]
        source: ValidationError,
    },
}

/// 验证错误类型
///
/// 在任何注册副作用发生之前产生
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("验证失败: {message}")]
    ValidationFailed { message: String },

    #[error("必需字段缺失: {field_name}")]
    RequiredFieldMissing { field_name: String },

    #[error("字段值无效: {field_name}, 值: {value}, 原因: {reason}")]
    InvalidFieldValue {
        field_name: String,
        value: String,
        reason: String,
    },

    #[error("未知字段: {field_name}")]
    UnknownField { field_name: String },
}

impl ValidationError {
    /// 创建新的验证错误
    pub fn new(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// 创建必需字段缺失错误
    pub fn required_field_missing(field_name: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field_name: field_name.into(),
        }
    }

    /// 创建字段值无效错误
    pub fn invalid_field_value(
        field_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            field_name: field_name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 创建未知字段错误
    pub fn unknown_field(field_name: impl Into<String>) -> Self {
        Self::UnknownField {
            field_name: field_name.into(),
        }
    }

    /// 将多个验证错误合并为一个
    pub fn combine(errors: Vec<ValidationError>) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::ValidationFailed { message }
    }
}

/// 文件解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// 模式没有匹配到任何文件
    #[error("无法从模式中获取文件: {pattern}")]
    NoMatches { pattern: String },

    /// 底层匹配器自身报告的错误
    #[error("文件匹配失败: {pattern}, 原因: {message}")]
    MatcherFailed { pattern: String, message: String },
}

impl ResolutionError {
    /// 出错的模式
    pub fn pattern(&self) -> &str {
        match self {
            Self::NoMatches { pattern } | Self::MatcherFailed { pattern, .. } => pattern,
        }
    }
}

/// 命名错误类型
///
/// 每个类别有独立的错误消息
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("无法识别应用名称，请参考应用加载 API")]
    App,

    #[error("无法识别绑定名称，请参考绑定加载 API")]
    Bind,

    #[error("无法识别方法名称，请参考方法加载 API")]
    Method,

    #[error("无法识别处理器名称，请参考处理器加载 API")]
    Handler,
}

/// 模块加载错误类型
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("模块不存在: {path}")]
    NotFound { path: String },

    #[error("模块读取失败: {path}, 原因: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("模块解析失败: {path}, 原因: {message}")]
    ParseFailed { path: String, message: String },

    #[error("不支持的模块格式: {path}")]
    UnsupportedFormat { path: String },
}

/// 宿主框架错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("宿主拒绝注册: {operation} {name}, 原因: {message}")]
    Rejected {
        operation: String,
        name: String,
        message: String,
    },

    #[error("宿主调用失败: {message}")]
    Failed { message: String },
}

impl HostError {
    /// 创建拒绝注册错误
    pub fn rejected(
        operation: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            operation: operation.into(),
            name: name.into(),
            message: message.into(),
        }
    }
}

/// 方法调用错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("方法未注册: {name}")]
    NotFound { name: String },

    #[error("注册项不可调用: {name}")]
    NotCallable { name: String },

    #[error("参数无效: {message}")]
    InvalidArgument { message: String },

    #[error("方法执行失败: {message}")]
    Failed { message: String },
}

impl InvokeError {
    /// 创建参数无效错误
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// 创建执行失败错误
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// 自动加载错误类型
///
/// 注册流程中所有错误最终汇聚到此类型，已注册的实体不会回滚
#[derive(Error, Debug)]
pub enum AutoloadError {
    #[error("验证错误: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("解析错误: {source}")]
    Resolution {
        #[from]
        source: ResolutionError,
    },

    #[error("命名错误: {source}")]
    Naming {
        #[from]
        source: NamingError,
    },

    #[error("加载错误: {source}")]
    Load {
        #[from]
        source: LoadError,
    },

    #[error("宿主错误: {source}")]
    Host {
        #[from]
        source: HostError,
    },

    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("插件启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type InvokeResult<T> = Result<T, InvokeError>;
pub type AutoloadResult<T> = Result<T, AutoloadError>;
