//! 自动加载插件入口

use crate::collector::execute_each;
use crate::injector::EntityInjector;
use crate::loader::DataFileLoader;
use crate::logging::LoggingConfig;
use crate::matcher::GlobFileMatcher;
use crate::resolver::ItemResolver;
use crate::validation::OptionsValidator;
use autoload_abstractions::{FileMatcher, HostServer, ModuleLoader};
use autoload_common::{
    AutoloadError, AutoloadOptions, AutoloadRegistries, AutoloadResult, EntityCategory,
};
use parking_lot::RwLock;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 插件名称
pub const PLUGIN_NAME: &str = "lorn-autoload";

/// 插件版本
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 自动加载插件
///
/// 每次调用 [`AutoloadPlugin::register`] 都会创建新的注册表，
/// 注册失败时已写入的条目保留，可以通过 [`AutoloadPlugin::registries`] 读取
pub struct AutoloadPlugin {
    matcher: Arc<dyn FileMatcher>,
    loader: Arc<dyn ModuleLoader>,
    validator: OptionsValidator,
    registries: RwLock<Option<AutoloadRegistries>>,
}

impl AutoloadPlugin {
    /// 使用默认的 glob 匹配器和数据文件加载器创建插件
    pub fn new() -> Self {
        Self {
            matcher: Arc::new(GlobFileMatcher::new()),
            loader: Arc::new(DataFileLoader::new()),
            validator: OptionsValidator::new(),
            registries: RwLock::new(None),
        }
    }

    /// 创建插件构建器
    pub fn builder() -> AutoloadPluginBuilder {
        AutoloadPluginBuilder::new()
    }

    /// 插件名称
    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// 插件版本
    pub fn version(&self) -> &'static str {
        PLUGIN_VERSION
    }

    /// 最近一次注册流程的注册表
    pub fn registries(&self) -> Option<AutoloadRegistries> {
        self.registries.read().clone()
    }

    /// 执行一次注册流程
    ///
    /// 先验证选项，验证失败时不产生任何副作用；之后按
    /// 方法、处理器、路由、应用、绑定的顺序串行注入
    pub async fn register(
        &self,
        host: Arc<dyn HostServer>,
        options: &AutoloadOptions,
    ) -> AutoloadResult<AutoloadRegistries> {
        self.validator.validate(options)?;

        let base = Self::resolve_base(options)?;
        info!("插件 {} 开始注册到 {}，基础目录: {}", PLUGIN_NAME, host.name(), base.display());

        let registries = AutoloadRegistries::new();
        *self.registries.write() = Some(registries.clone());

        let injector = EntityInjector::new(
            host,
            self.loader.clone(),
            ItemResolver::new(self.matcher.clone(), base),
            registries.clone(),
        );

        let injector = &injector;
        execute_each(EntityCategory::REGISTRATION_ORDER, move |category| async move {
            injector.inject(category, options.specs(category)).await?;
            Ok::<_, AutoloadError>(ControlFlow::Continue(()))
        })
        .await?;

        info!(
            "插件 {} 注册完成，方法 {} 个，应用 {} 个，绑定 {} 个",
            PLUGIN_NAME,
            registries.methods.canonical_names().len(),
            registries.apps.len(),
            registries.binds.len()
        );
        Ok(registries)
    }

    fn resolve_base(options: &AutoloadOptions) -> AutoloadResult<PathBuf> {
        match &options.relative_to {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().map_err(|e| AutoloadError::BootstrapFailed {
                message: format!("无法获取当前工作目录: {}", e),
            }),
        }
    }
}

impl Default for AutoloadPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// 自动加载插件构建器
pub struct AutoloadPluginBuilder {
    matcher: Option<Arc<dyn FileMatcher>>,
    loader: Option<Arc<dyn ModuleLoader>>,
    logging_enabled: bool,
    logging_config: LoggingConfig,
}

impl AutoloadPluginBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            matcher: None,
            loader: None,
            logging_enabled: false,
            logging_config: LoggingConfig::default(),
        }
    }

    /// 设置文件匹配器
    pub fn with_matcher(mut self, matcher: Arc<dyn FileMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// 设置模块加载器
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// 启用日志初始化
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建插件
    pub fn build(self) -> AutoloadResult<AutoloadPlugin> {
        // 只有在明确配置了日志时才初始化，避免测试中重复初始化
        if self.logging_enabled {
            self.logging_config.try_init()?;
        }

        let plugin = AutoloadPlugin::new();
        Ok(AutoloadPlugin {
            matcher: self.matcher.unwrap_or(plugin.matcher),
            loader: self.loader.unwrap_or(plugin.loader),
            ..plugin
        })
    }
}

impl Default for AutoloadPluginBuilder {
    fn default() -> Self {
        Self::new()
    }
}
