//! # 自动加载具体实现
//!
//! 提供按约定发现并注册服务器方法、处理器、路由、应用值和绑定的插件实现
//!
//! ## 核心组件
//!
//! - [`collector`] - 顺序异步收集器
//! - [`ItemResolver`] - 注入项解析器
//! - [`build_options`] - 选项合并引擎
//! - [`EntityInjector`] - 实体注入器
//! - [`AutoloadPlugin`] - 插件入口

pub mod classify;
pub mod collector;
pub mod host;
pub mod injector;
pub mod loader;
pub mod logging;
pub mod matcher;
pub mod merge;
pub mod plugin;
pub mod resolver;
pub mod validation;

pub use classify::MethodShape;
pub use collector::{execute_and_collect_each, execute_each, Collect};
pub use host::MemoryHost;
pub use injector::EntityInjector;
pub use loader::{ChainedModuleLoader, DataFileLoader, StaticModuleLoader};
pub use logging::LoggingConfig;
pub use matcher::GlobFileMatcher;
pub use merge::{build_option_helper, build_options};
pub use plugin::{AutoloadPlugin, AutoloadPluginBuilder, PLUGIN_NAME, PLUGIN_VERSION};
pub use resolver::{ItemResolver, ResolvedItem};
pub use validation::OptionsValidator;

#[cfg(test)]
mod tests;
