//! 注册流程测试


use super::*;
use autoload_common::{AutoloadOptions, InjectValue, InvokeError, NamedFn};
use serde_json::{json, Value};
use std::fs;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// 测试夹具：临时目录中的占位文件加上对应的静态模块
pub(crate) struct Fixture {
    pub dir: TempDir,
    pub modules: Arc<StaticModuleLoader>,
}

impl Fixture {
    /// 创建包含示例方法模块的夹具
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().expect("创建临时目录失败"),
            modules: Arc::new(StaticModuleLoader::new()),
        };

        fixture.module("methods/sample1Method.js", sample1_method());
        fixture.module("methods/subdir/sample2Method.js", sample2_method());
        fixture.module("methods/subdir/sample8Method.js", sample8_method());
        fixture.module("methods/subdir/sample9Method.js", sample9_method());
        fixture
    }

    /// 写入占位文件并登记模块
    pub fn module(&self, path: &str, module: InjectValue) {
        self.touch(path, "");
        self.modules.register(path, module);
    }

    /// 写入文件
    pub fn touch(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("创建目录失败");
        }
        fs::write(full, content).expect("写入文件失败");
    }

    /// 使用夹具模块的插件
    pub fn plugin(&self) -> AutoloadPlugin {
        let loader = ChainedModuleLoader::new()
            .with_loader(self.modules.clone())
            .with_loader(Arc::new(DataFileLoader::new()));

        AutoloadPlugin::builder()
            .with_loader(Arc::new(loader))
            .build()
            .expect("构建插件失败")
    }

    /// 以夹具目录为基础目录的选项
    pub fn options(&self) -> AutoloadOptions {
        AutoloadOptions::new().with_relative_to(self.dir.path())
    }
}

/// 把参数渲染为字符串，字符串参数不带引号
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn add_fn(name: &str) -> NamedFn {
    NamedFn::new(name, |_ctx, args| {
        Ok(json!(autoload_common::int_arg(args, 0)? + autoload_common::int_arg(args, 1)?))
    })
}

fn cache_options() -> InjectValue {
    InjectValue::from(json!({"cache": {"expiresIn": 60000, "generateTimeout": 60000}}))
}

fn sample1_method() -> InjectValue {
    let counter = Arc::new(AtomicI64::new(0));

    let divide_options = InjectValue::object([
        (
            "cache",
            InjectValue::from(json!({"expiresIn": 60000, "generateTimeout": 60000})),
        ),
        (
            "bind",
            InjectValue::object([(
                "divide",
                InjectValue::function("divide", |_ctx, args| {
                    let divisor = autoload_common::int_arg(args, 1)?;
                    if divisor == 0 {
                        return Err(InvokeError::invalid_argument("除数不能为零"));
                    }
                    Ok(json!(autoload_common::int_arg(args, 0)? / divisor))
                }),
            )]),
        ),
    ]);

    InjectValue::object([
        (
            "square",
            InjectValue::function("square", |_ctx, args| {
                let x = autoload_common::int_arg(args, 0)?;
                Ok(json!(x * x))
            }),
        ),
        (
            "isEven",
            InjectValue::function("isEven", |_ctx, args| {
                Ok(json!(autoload_common::int_arg(args, 0)? % 2 == 0))
            }),
        ),
        (
            "increment",
            InjectValue::object([
                ("options", cache_options()),
                (
                    "method",
                    InjectValue::function("increment", move |_ctx, _args| {
                        Ok(json!(counter.fetch_add(1, Ordering::SeqCst) + 1))
                    }),
                ),
            ]),
        ),
        (
            "divide",
            InjectValue::object([
                ("options", divide_options),
                (
                    "method",
                    InjectValue::function("divide", |ctx, args| ctx.call_bound("divide", args)),
                ),
            ]),
        ),
        (
            "thisWillBeNotRegistered",
            InjectValue::object([
                ("options", cache_options()),
                (
                    "something",
                    InjectValue::function("something", |_ctx, _args| Ok(json!(1))),
                ),
            ]),
        ),
    ])
}

fn sample2_method() -> InjectValue {
    InjectValue::object([
        ("add", InjectValue::Function(add_fn("add"))),
        (
            "multiply",
            InjectValue::function("multiply", |_ctx, args| {
                Ok(json!(autoload_common::int_arg(args, 0)? * autoload_common::int_arg(args, 1)?))
            }),
        ),
    ])
}

/// 接收者上有 `operation` 时交给它处理，否则原样返回参数
pub(crate) fn sample8_method() -> InjectValue {
    InjectValue::function("sample8Method", |ctx, args| {
        if ctx.bound("operation").is_some_and(InjectValue::is_function) {
            return ctx.call_bound("operation", args);
        }
        Ok(args.first().cloned().unwrap_or(Value::Null))
    })
}

fn sample9_method() -> InjectValue {
    InjectValue::object([
        (
            "sample8Method",
            InjectValue::function("sample8Method", |ctx, args| ctx.call("sample8Method", args)),
        ),
        (
            "increment",
            InjectValue::function("increment", |ctx, args| ctx.call("sample1Method.increment", args)),
        ),
    ])
}

/// 在参数后追加后缀的绑定操作
pub(crate) fn suffix_operation(suffix: &'static str) -> InjectValue {
    InjectValue::object([(
        "operation",
        InjectValue::function("operation", move |_ctx, args| {
            Ok(json!(format!("{}{}", text(args.first().unwrap_or(&Value::Null)), suffix)))
        }),
    )])
}
