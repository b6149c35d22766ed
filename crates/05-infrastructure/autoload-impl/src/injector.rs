//! 实体注入器
//!
//! 对每个类别按相同的流程处理：解析注入描述、逐项分类、确定名称、合并选项、
//! 调用宿主注册并写入注册表。全部步骤严格串行

use crate::classify::{literal_entity_name, literal_method_name, MethodShape};
use crate::collector::execute_each;
use crate::merge::build_options;
use crate::resolver::{ItemResolver, ResolvedItem};
use autoload_abstractions::{HostServer, ModuleLoader, ModuleRequest};
use autoload_common::{
    AutoloadError, AutoloadRegistries, AutoloadResult, CanonicalName, EntityCategory, InjectSpec,
    InjectValue, NamedFn, NamingConventions, NamingError, OptionSet, RegisteredMethod, Registry,
    RegistryNode,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 加载后的模块及其候选名称
struct LoadedItem {
    module: InjectValue,
    name: Option<String>,
}

/// 实体注入器
pub struct EntityInjector {
    host: Arc<dyn HostServer>,
    loader: Arc<dyn ModuleLoader>,
    resolver: ItemResolver,
    registries: AutoloadRegistries,
}

impl EntityInjector {
    /// 创建新的注入器
    pub fn new(
        host: Arc<dyn HostServer>,
        loader: Arc<dyn ModuleLoader>,
        resolver: ItemResolver,
        registries: AutoloadRegistries,
    ) -> Self {
        Self {
            host,
            loader,
            resolver,
            registries,
        }
    }

    /// 本次注册流程的注册表
    pub fn registries(&self) -> &AutoloadRegistries {
        &self.registries
    }

    /// 注入一个类别的全部注入描述
    pub async fn inject(&self, category: EntityCategory, specs: &[InjectSpec]) -> AutoloadResult<()> {
        if specs.is_empty() {
            debug!("类别 {} 没有注入描述", category);
        } else {
            info!("开始注入 {}，共 {} 个注入描述", category, specs.len());
        }

        match category {
            EntityCategory::Methods => self.inject_methods(specs).await,
            EntityCategory::Handlers => self.inject_handlers(specs).await,
            EntityCategory::Routes => self.inject_routes(specs).await,
            EntityCategory::Apps => self.inject_apps(specs).await,
            EntityCategory::Binds => self.inject_binds(specs).await,
        }
    }

    /// 注入服务器方法
    pub async fn inject_methods(&self, specs: &[InjectSpec]) -> AutoloadResult<()> {
        let this = self;
        execute_each(specs, move |spec| async move {
            let items = this.resolver.get_items(spec).await?;

            if let Some(prefix) = spec.prefix.as_deref() {
                this.registries
                    .methods
                    .ensure_group(&NamingConventions::split_path(prefix));
            }

            execute_each(items, move |item| async move {
                this.inject_method_item(spec, item).await?;
                Ok::<_, AutoloadError>(ControlFlow::Continue(()))
            })
            .await?;

            Ok::<_, AutoloadError>(ControlFlow::Continue(()))
        })
        .await
    }

    async fn inject_method_item(&self, spec: &InjectSpec, item: ResolvedItem) -> AutoloadResult<()> {
        let loaded = self.load_item(item, literal_method_name).await?;
        let LoadedItem { module, name } = loaded;
        let base = name.ok_or(NamingError::Method)?;
        let prefix = spec.prefix.as_deref();
        let config = spec.options.as_ref();

        match MethodShape::classify(&module) {
            MethodShape::NamedMapping(members) => {
                let group = CanonicalName::new(prefix, &base, None);
                self.registries.methods.ensure_group(group.segments());

                for (key, member) in &members {
                    match MethodShape::classify_member(member).into_method() {
                        Some((method, call)) => {
                            let name = CanonicalName::new(prefix, &base, Some(key));
                            self.register_method(name, method, config, call.as_ref()).await?;
                        }
                        None => warn!("跳过无效的方法成员: {}.{} ({})", base, key, member.kind()),
                    }
                }
            }
            shape => match shape.into_method() {
                Some((method, call)) => {
                    let name = CanonicalName::new(prefix, &base, None);
                    self.register_method(name, method, config, call.as_ref()).await?;
                }
                None => warn!("跳过无法识别的方法模块: {} ({})", base, module.kind()),
            },
        }

        Ok(())
    }

    async fn register_method(
        &self,
        name: CanonicalName,
        method: NamedFn,
        config: Option<&OptionSet>,
        call: Option<&OptionSet>,
    ) -> AutoloadResult<()> {
        let options = build_options(config, call);
        let method_name = name.to_string();

        self.host
            .register_method(&method_name, method.clone(), &options)
            .await?;

        self.registries.methods.insert(
            &name,
            RegistryNode::Method(RegisteredMethod {
                name: name.clone(),
                method,
                options,
            }),
        );
        info!("注册方法: {}", method_name);
        Ok(())
    }

    /// 注入请求处理器
    pub async fn inject_handlers(&self, specs: &[InjectSpec]) -> AutoloadResult<()> {
        let this = self;
        execute_each(specs, move |spec| async move {
            let items = this.resolver.get_items(spec).await?;

            execute_each(items, move |item| async move {
                let LoadedItem { module, name } = this.load_item(item, literal_entity_name).await?;
                let name = name.ok_or(NamingError::Handler)?;

                this.host.decorate_handler(&name, module).await?;
                info!("装饰处理器: {}", name);
                Ok::<_, AutoloadError>(ControlFlow::Continue(()))
            })
            .await?;

            Ok::<_, AutoloadError>(ControlFlow::Continue(()))
        })
        .await
    }

    /// 注入路由
    pub async fn inject_routes(&self, specs: &[InjectSpec]) -> AutoloadResult<()> {
        let this = self;
        execute_each(specs, move |spec| async move {
            let items = this.resolver.get_items(spec).await?;

            execute_each(items, move |item| async move {
                let route = match item {
                    ResolvedItem::Literal(value) => value,
                    ResolvedItem::Path(path) => this.load_module(&path).await?,
                };

                this.host.register_route(route).await?;
                debug!("注册路由");
                Ok::<_, AutoloadError>(ControlFlow::Continue(()))
            })
            .await?;

            Ok::<_, AutoloadError>(ControlFlow::Continue(()))
        })
        .await
    }

    /// 注入应用共享值
    pub async fn inject_apps(&self, specs: &[InjectSpec]) -> AutoloadResult<()> {
        let this = self;
        execute_each(specs, move |spec| async move {
            let items = this.resolver.get_items(spec).await?;

            execute_each(items, move |item| async move {
                for (name, value) in this.named_entries(item, NamingError::App).await? {
                    this.host.set_app(&name, value.clone()).await?;
                    this.registries
                        .apps
                        .insert(&CanonicalName::new(None, &name, None), RegistryNode::Value(value));
                    info!("设置应用值: {}", name);
                }
                Ok::<_, AutoloadError>(ControlFlow::Continue(()))
            })
            .await?;

            Ok::<_, AutoloadError>(ControlFlow::Continue(()))
        })
        .await
    }

    /// 注入绑定对象
    ///
    /// 全部绑定收集完成后，只要存在绑定就向宿主应用一次
    pub async fn inject_binds(&self, specs: &[InjectSpec]) -> AutoloadResult<()> {
        let this = self;
        execute_each(specs, move |spec| async move {
            let items = this.resolver.get_items(spec).await?;

            execute_each(items, move |item| async move {
                for (name, value) in this.named_entries(item, NamingError::Bind).await? {
                    this.registries
                        .binds
                        .insert(&CanonicalName::new(None, &name, None), RegistryNode::Value(value));
                    debug!("记录绑定: {}", name);
                }
                Ok::<_, AutoloadError>(ControlFlow::Continue(()))
            })
            .await?;

            Ok::<_, AutoloadError>(ControlFlow::Continue(()))
        })
        .await?;

        self.apply_binds(&self.registries.binds).await
    }

    async fn apply_binds(&self, binds: &Registry) -> AutoloadResult<()> {
        if binds.is_empty() {
            return Ok(());
        }

        self.host.apply_binds(binds).await?;
        info!("应用绑定: {:?}", binds.keys());
        Ok(())
    }

    /// 应用和绑定共用的命名规则
    ///
    /// 映射的每个键各自成为一个条目；其余值需要能确定名称
    async fn named_entries(
        &self,
        item: ResolvedItem,
        missing: NamingError,
    ) -> AutoloadResult<Vec<(String, InjectValue)>> {
        let LoadedItem { module, name } = self.load_item(item, literal_entity_name).await?;

        match module {
            InjectValue::Object(members) => Ok(members.into_iter().collect()),
            module => {
                let name = name.ok_or(missing)?;
                Ok(vec![(name, module)])
            }
        }
    }

    async fn load_item(
        &self,
        item: ResolvedItem,
        literal_name: fn(&InjectValue) -> Option<String>,
    ) -> AutoloadResult<LoadedItem> {
        match item {
            ResolvedItem::Literal(module) => {
                let name = literal_name(&module);
                Ok(LoadedItem { module, name })
            }
            ResolvedItem::Path(path) => {
                let module = self.load_module(&path).await?;
                let name = NamingConventions::base_name_from_path(&path);
                Ok(LoadedItem { module, name })
            }
        }
    }

    async fn load_module(&self, path: &str) -> AutoloadResult<InjectValue> {
        let request = ModuleRequest::new(self.resolver.base(), path);
        debug!("加载模块: {}", request.absolute.display());
        Ok(self.loader.load(&request).await?)
    }
}
