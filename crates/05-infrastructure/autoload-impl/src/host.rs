//! 内存宿主实现
//!
//! 记录全部注册调用，并可以调用已注册的方法，用于演示程序和测试

use async_trait::async_trait;
use autoload_abstractions::HostServer;
use autoload_common::{
    CanonicalName, HostError, InjectValue, InvokeContext, InvokeError, NamedFn, OptionSet,
    RegisteredMethod, Registry, RegistryNode,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Default)]
struct HostState {
    routes: Vec<InjectValue>,
    handlers: IndexMap<String, InjectValue>,
    apps: IndexMap<String, InjectValue>,
    binds: Option<Registry>,
    bind_calls: usize,
}

/// 内存宿主
///
/// 方法按点号名称分层保存，与宿主暴露给使用者的方法树一致
pub struct MemoryHost {
    name: String,
    methods: Registry,
    method_names: RwLock<Vec<String>>,
    state: RwLock<HostState>,
    rejected: HashSet<String>,
}

impl MemoryHost {
    /// 创建新的内存宿主
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Registry::new(),
            method_names: RwLock::new(Vec::new()),
            state: RwLock::new(HostState::default()),
            rejected: HashSet::new(),
        }
    }

    /// 拒绝注册指定名称的方法或处理器
    pub fn with_rejected(mut self, name: impl Into<String>) -> Self {
        self.rejected.insert(name.into());
        self
    }

    /// 宿主上的方法树
    pub fn methods(&self) -> &Registry {
        &self.methods
    }

    /// 按注册顺序列出方法名称
    pub fn method_names(&self) -> Vec<String> {
        self.method_names.read().clone()
    }

    /// 方法注册时的生效选项
    pub fn method_options(&self, name: &str) -> Option<OptionSet> {
        self.methods
            .get(name)
            .and_then(|node| node.as_method().map(|method| method.options.clone()))
    }

    /// 调用已注册的方法
    ///
    /// 方法选项中有 `bind` 时以其作为接收者，否则使用宿主上应用的绑定
    pub fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let node = self.methods.get(name).ok_or_else(|| InvokeError::NotFound {
            name: name.to_string(),
        })?;
        let method = node.as_method().ok_or_else(|| InvokeError::NotCallable {
            name: name.to_string(),
        })?;

        let host_binds = self.state.read().binds.as_ref().map(Registry::to_object);
        let receiver = method.options.bind().or(host_binds.as_ref());
        let ctx = InvokeContext::new(receiver, Some(&self.methods));
        method.method.call(&ctx, args)
    }

    /// 已注册的路由描述
    pub fn routes(&self) -> Vec<InjectValue> {
        self.state.read().routes.clone()
    }

    /// 已装饰的处理器名称
    pub fn handler_names(&self) -> Vec<String> {
        self.state.read().handlers.keys().cloned().collect()
    }

    /// 获取处理器
    pub fn handler(&self, name: &str) -> Option<InjectValue> {
        self.state.read().handlers.get(name).cloned()
    }

    /// 获取应用共享值
    pub fn app(&self, name: &str) -> Option<InjectValue> {
        self.state.read().apps.get(name).cloned()
    }

    /// 全部应用共享值
    pub fn apps(&self) -> IndexMap<String, InjectValue> {
        self.state.read().apps.clone()
    }

    /// 应用到宿主的绑定
    pub fn binds(&self) -> Option<Registry> {
        self.state.read().binds.clone()
    }

    /// 应用绑定的次数
    pub fn bind_calls(&self) -> usize {
        self.state.read().bind_calls
    }

    fn check_rejected(&self, operation: &str, name: &str) -> Result<(), HostError> {
        if self.rejected.contains(name) {
            return Err(HostError::rejected(operation, name, "宿主配置为拒绝该名称"));
        }
        Ok(())
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl HostServer for MemoryHost {
    fn name(&self) -> &str {
        &self.name
    }

    async fn register_method(
        &self,
        name: &str,
        method: NamedFn,
        options: &OptionSet,
    ) -> Result<(), HostError> {
        self.check_rejected("method", name)?;
        if self.methods.contains(name) {
            return Err(HostError::rejected("method", name, "服务器方法名称已存在"));
        }

        let canonical = CanonicalName::parse(name);
        self.methods.insert(
            &canonical,
            RegistryNode::Method(RegisteredMethod {
                name: canonical.clone(),
                method,
                options: options.clone(),
            }),
        );
        self.method_names.write().push(name.to_string());
        debug!("宿主 {} 注册方法: {}", self.name, name);
        Ok(())
    }

    async fn register_route(&self, route: InjectValue) -> Result<(), HostError> {
        let mut state = self.state.write();
        match route {
            InjectValue::Data(Value::Array(routes)) => {
                state.routes.extend(routes.into_iter().map(InjectValue::from));
            }
            route => state.routes.push(route),
        }
        Ok(())
    }

    async fn decorate_handler(&self, name: &str, handler: InjectValue) -> Result<(), HostError> {
        self.check_rejected("handler", name)?;
        let mut state = self.state.write();
        if state.handlers.contains_key(name) {
            return Err(HostError::rejected("handler", name, "处理器名称已存在"));
        }
        state.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    async fn apply_binds(&self, binds: &Registry) -> Result<(), HostError> {
        let mut state = self.state.write();
        state.binds = Some(binds.clone());
        state.bind_calls += 1;
        info!("宿主 {} 应用 {} 个绑定", self.name, binds.len());
        Ok(())
    }

    async fn set_app(&self, name: &str, value: InjectValue) -> Result<(), HostError> {
        self.state.write().apps.insert(name.to_string(), value);
        Ok(())
    }
}
