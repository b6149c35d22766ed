//! # 示例应用程序
//!
//! 演示如何使用自动加载插件把方法、处理器、路由、应用值和绑定注册到宿主

use anyhow::{Context, Result};
use autoload_common::{
    float_arg, int_arg, AutoloadOptions, InjectSpec, InjectValue, InvokeError, OptionSet,
};
use autoload_config::OptionsFileLoader;
use autoload_impl::{
    AutoloadPlugin, ChainedModuleLoader, DataFileLoader, LoggingConfig, MemoryHost,
    StaticModuleLoader,
};
use clap::Parser;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn Autoload 示例应用")]
struct Args {
    /// 选项文件路径，不存在时使用内置演示选项
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// 覆盖基础目录
    #[arg(long)]
    relative_to: Option<PathBuf>,

    /// 环境变量前缀
    #[arg(long, default_value = "AUTOLOAD")]
    env_prefix: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 日志格式
    #[arg(long)]
    json_logs: bool,

    /// 注册完成后调用的方法，例如 `math.add`
    #[arg(long)]
    call: Option<String>,

    /// 调用参数，JSON 数组
    #[arg(long, default_value = "[]")]
    args: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = tracing::Level::from_str(&args.log_level)
        .with_context(|| format!("无效的日志级别: {}", args.log_level))?;
    let mut logging = LoggingConfig::default().with_level(level);
    logging.json_format = args.json_logs;

    let plugin = AutoloadPlugin::builder()
        .with_loader(Arc::new(demo_loader()))
        .with_logging(logging)
        .build()?;

    let options = load_options(&args)?;
    let host = Arc::new(MemoryHost::new("example-app"));

    info!("启动 {} {}", plugin.name(), plugin.version());
    let registries = plugin.register(host.clone(), &options).await?;

    let summary = json!({
        "methods": registries.methods.to_json(),
        "handlers": host.handler_names(),
        "routes": host.routes().iter().map(InjectValue::to_json).collect::<Vec<_>>(),
        "apps": registries.apps.to_json(),
        "binds": registries.binds.to_json(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(name) = &args.call {
        let call_args: Vec<Value> =
            serde_json::from_str(&args.args).context("调用参数必须是 JSON 数组")?;
        let result = host.call_method(name, &call_args)?;
        println!("{} => {}", name, result);
    }

    Ok(())
}

/// 加载选项
fn load_options(args: &Args) -> Result<AutoloadOptions> {
    let loader = OptionsFileLoader::with_env_prefix(&args.env_prefix);
    let mut options = match &args.options {
        Some(path) => loader
            .load_layered(Some(path))
            .with_context(|| format!("加载选项文件失败: {}", path.display()))?,
        None => {
            info!("未指定选项文件，使用内置演示选项");
            demo_options()
        }
    };

    if let Some(relative_to) = &args.relative_to {
        options.relative_to = Some(relative_to.clone());
    }
    Ok(options)
}

/// 内置演示选项，只使用字面值
fn demo_options() -> AutoloadOptions {
    AutoloadOptions::new()
        .add_methods(
            InjectSpec::new()
                .with_prefix("math")
                .include(add_method())
                .include(multiply_method())
                .include(divide_method()),
        )
        .add_methods(
            InjectSpec::new()
                .include(greet_method())
                .with_options(OptionSet::new().with("bind", db_module())),
        )
        .add_handlers(InjectSpec::new().include(InjectValue::function(
            "echo",
            |_ctx, args| Ok(args.first().cloned().unwrap_or(Value::Null)),
        )))
        .add_routes(InjectSpec::new().include(InjectValue::from(json!({
            "method": "GET",
            "path": "/health",
            "handler": {"echo": "ok"}
        }))))
        .add_apps(InjectSpec::new().include(InjectValue::from(json!({
            "title": "Lorn Autoload",
            "debug": false
        }))))
        .add_binds(InjectSpec::new().include(db_module()))
}

/// 编译进程序的模块，供选项文件中的模式引用
fn demo_loader() -> ChainedModuleLoader {
    let modules = StaticModuleLoader::new()
        .with_module("methods/math.js", math_module())
        .with_module("methods/greet.js", greet_method())
        .with_module("binds/db.js", db_module());

    ChainedModuleLoader::new()
        .with_loader(Arc::new(modules))
        .with_loader(Arc::new(DataFileLoader::new()))
}

fn math_module() -> InjectValue {
    InjectValue::object([
        ("add", add_method()),
        ("multiply", multiply_method()),
        ("divide", divide_method()),
    ])
}

fn add_method() -> InjectValue {
    InjectValue::function("add", |_ctx, args| {
        Ok(json!(int_arg(args, 0)? + int_arg(args, 1)?))
    })
}

fn multiply_method() -> InjectValue {
    InjectValue::function("multiply", |_ctx, args| {
        Ok(json!(int_arg(args, 0)? * int_arg(args, 1)?))
    })
}

/// 带调用选项的方法，名称取自 `method` 函数
fn divide_method() -> InjectValue {
    InjectValue::object([
        ("options", InjectValue::from(json!({"cache": {"expiresIn": 60000}}))),
        (
            "method",
            InjectValue::function("divide", |_ctx, args| {
                let divisor = float_arg(args, 1)?;
                if divisor == 0.0 {
                    return Err(InvokeError::invalid_argument("除数不能为零"));
                }
                Ok(json!(float_arg(args, 0)? / divisor))
            }),
        ),
    ])
}

fn greet_method() -> InjectValue {
    InjectValue::function("greet", |ctx, args| {
        let name = args.first().and_then(Value::as_str).unwrap_or("world");
        let store = ctx.call_bound("store", &[])?;
        let store = store.as_str().unwrap_or("unknown");
        Ok(json!(format!("hello {} from {}", name, store)))
    })
}

fn db_module() -> InjectValue {
    InjectValue::object([(
        "store",
        InjectValue::function("store", |_ctx, _args| Ok(json!("memory"))),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_options_register_on_memory_host() {
        let plugin = AutoloadPlugin::builder()
            .with_loader(Arc::new(demo_loader()))
            .build()
            .unwrap();
        let host = Arc::new(MemoryHost::new("example-app"));

        let registries = plugin.register(host.clone(), &demo_options()).await.unwrap();

        assert_eq!(
            registries.methods.canonical_names(),
            vec!["math.add", "math.multiply", "math.divide", "greet"]
        );
        assert_eq!(host.call_method("math.add", &[json!(2), json!(3)]).unwrap(), json!(5));
        assert_eq!(
            host.method_options("math.divide").map(|o| o.to_json()),
            Some(json!({"cache": {"expiresIn": 60000}}))
        );
        assert_eq!(
            host.call_method("greet", &[json!("lorn")]).unwrap(),
            json!("hello lorn from memory")
        );
        assert_eq!(host.handler_names(), vec!["echo"]);
        assert_eq!(host.routes().len(), 1);
        assert_eq!(registries.apps.keys(), vec!["title", "debug"]);
        assert_eq!(registries.binds.keys(), vec!["store"]);
    }
}
