//! # Autoload Common
//!
//! 这个 crate 提供了 Lorn Autoload 的公共数据模型和错误类型。
//!
//! ## 核心组件
//!
//! - [`InjectValue`] - 插件模块导出的值（函数、映射或数据）
//! - [`OptionSet`] - 注册选项及其控制键
//! - [`InjectSpec`] / [`AutoloadOptions`] - 注入描述
//! - [`Registry`] - 分层实体注册表
//! - [`CanonicalName`] - 规范名称
//!
//! ## 设计原则
//!
//! - 约定优于配置：名称来自文件名和映射键
//! - 注册表只增不减，失败时保留已注册的实体

pub mod errors;
pub mod naming;
pub mod options;
pub mod registry;
pub mod spec;
pub mod value;

pub use errors::*;
pub use naming::*;
pub use options::*;
pub use registry::*;
pub use spec::*;
pub use value::*;
