//! 宿主框架抽象接口
//!
//! 注册流程只通过这里的能力驱动宿主，与宿主使用回调、异步还是直接返回无关

use async_trait::async_trait;
use autoload_common::{HostError, InjectValue, NamedFn, OptionSet, Registry};

/// 宿主框架 trait
///
/// 任何一个调用返回错误都会终止本次注册流程
#[async_trait]
pub trait HostServer: Send + Sync {
    /// 宿主名称
    fn name(&self) -> &str;

    /// 注册服务器方法
    ///
    /// `options` 为合并后的生效选项，不含控制键
    async fn register_method(
        &self,
        name: &str,
        method: NamedFn,
        options: &OptionSet,
    ) -> Result<(), HostError>;

    /// 注册路由描述（单个或列表）
    async fn register_route(&self, route: InjectValue) -> Result<(), HostError>;

    /// 以指定名称装饰请求处理器
    async fn decorate_handler(&self, name: &str, handler: InjectValue) -> Result<(), HostError>;

    /// 应用绑定对象，绑定成为已注册函数的调用接收者
    async fn apply_binds(&self, binds: &Registry) -> Result<(), HostError>;

    /// 设置应用共享值
    async fn set_app(&self, name: &str, value: InjectValue) -> Result<(), HostError>;
}
