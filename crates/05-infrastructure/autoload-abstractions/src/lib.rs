//! # Autoload Abstractions
//!
//! 自动加载的协作者抽象层，定义注册流程依赖的外部能力接口。
//!
//! ## 核心接口
//!
//! - [`HostServer`] - 宿主框架的注册接口
//! - [`ModuleLoader`] - 模块加载接口
//! - [`FileMatcher`] - 文件模式匹配接口

pub mod host;
pub mod loader;
pub mod matcher;

pub use host::*;
pub use loader::*;
pub use matcher::*;
