//! # 自动加载配置
//!
//! 从 JSON、TOML、YAML 文件以及环境变量加载插件选项
//!
//! ## 主要组件
//!
//! - [`OptionsFileLoader`] - 选项文件加载器
//! - [`OptionsFileFormat`] - 选项文件格式

pub mod providers;

pub use providers::*;
