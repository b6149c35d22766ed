//! 自动加载端到端集成测试
use anyhow::Result;
use async_trait::async_trait;
use autoload_abstractions::{FileMatcher, MatchRequest};
use autoload_common::{
    AutoloadError, AutoloadOptions, InjectSpec, InjectValue, OptionSet, ResolutionError,
};
use autoload_config::OptionsFileLoader;
use autoload_impl::{
    build_options, AutoloadPlugin, ChainedModuleLoader, DataFileLoader, MemoryHost,
    StaticModuleLoader,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn math_module() -> InjectValue {
    InjectValue::object([
        (
            "add",
            InjectValue::function("add", |_ctx, args| {
                Ok(json!(
                    autoload_common::int_arg(args, 0)? + autoload_common::int_arg(args, 1)?
                ))
            }),
        ),
        (
            "double",
            InjectValue::object([
                ("options", InjectValue::from(json!({"cache": {"expiresIn": 10}}))),
                (
                    "method",
                    InjectValue::function("double", |ctx, args| {
                        let value = ctx.call("math.add", &[args[0].clone(), args[0].clone()])?;
                        Ok(value)
                    }),
                ),
            ]),
        ),
    ])
}

fn plugin_with(modules: StaticModuleLoader) -> AutoloadPlugin {
    let loader = ChainedModuleLoader::new()
        .with_loader(Arc::new(modules))
        .with_loader(Arc::new(DataFileLoader::new()));
    AutoloadPlugin::builder()
        .with_loader(Arc::new(loader))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_options_file_drives_full_registration() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path();
    write(root, "lib/math.js", "");
    write(root, "lib/skip.js", "");
    write(root, "routes/users.json", r#"[{"method": "GET", "path": "/users"}, {"method": "POST", "path": "/users"}]"#);
    write(root, "apps/settings.yaml", "title: demo\nlimits:\n  max: 3\n");
    write(
        root,
        "autoload.json",
        &json!({
            "relativeTo": root,
            "methods": [{
                "prefix": "math",
                "includes": ["lib/*.js"],
                "ignores": ["lib/skip.js"],
                "options": {"callback": false, "merge": true}
            }],
            "routes": [{"includes": ["routes/*.json"]}],
            "apps": [{"includes": ["apps/*.yaml"]}]
        })
        .to_string(),
    );

    let options = OptionsFileLoader::load(root.join("autoload.json"))?;
    let plugin = plugin_with(StaticModuleLoader::new().with_module("lib/math.js", math_module()));
    let host = Arc::new(MemoryHost::default());

    let registries = plugin.register(host.clone(), &options).await?;

    assert_eq!(
        registries.methods.canonical_names(),
        vec!["math.math.add", "math.math.double"]
    );
    assert_eq!(
        host.method_options("math.math.double").map(|o| o.to_json()),
        Some(json!({"cache": {"expiresIn": 10}, "callback": false}))
    );
    assert_eq!(host.routes().len(), 2);
    assert_eq!(registries.apps.keys(), vec!["title", "limits"]);
    assert_eq!(
        registries.apps.get("limits").and_then(|n| n.as_value().map(InjectValue::to_json)),
        Some(json!({"max": 3}))
    );
    Ok(())
}

#[tokio::test]
async fn test_methods_call_each_other_through_registry() -> Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "math.js", "");
    let options = AutoloadOptions::new()
        .with_relative_to(dir.path())
        .add_methods(InjectSpec::new().include("math.js"));
    let plugin = plugin_with(StaticModuleLoader::new().with_module("math.js", math_module()));
    let host = Arc::new(MemoryHost::default());

    let registries = plugin.register(host.clone(), &options).await?;

    assert_eq!(registries.methods.call("math.double", &[json!(21)])?, json!(42));
    assert_eq!(host.call_method("math.double", &[json!(4)])?, json!(8));
    Ok(())
}

#[tokio::test]
async fn test_directories_are_not_matched() -> Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "routes/health.json", r#"{"method": "GET", "path": "/health"}"#);
    fs::create_dir_all(dir.path().join("routes/nested.json"))?;
    let options = AutoloadOptions::new()
        .with_relative_to(dir.path())
        .add_routes(InjectSpec::new().include("routes/*.json"));
    let host = Arc::new(MemoryHost::default());

    AutoloadPlugin::new().register(host.clone(), &options).await?;

    let routes = host.routes();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].get("path").and_then(InjectValue::as_str), Some("/health"));
    Ok(())
}

#[tokio::test]
async fn test_patterns_may_reach_parent_directory() -> Result<()> {
    let dir = TempDir::new()?;
    let app = dir.path().join("app");
    fs::create_dir_all(&app)?;
    write(dir.path(), "shared/routes.json", r#"{"method": "GET", "path": "/shared"}"#);
    let options = AutoloadOptions::new()
        .with_relative_to(&app)
        .add_routes(InjectSpec::new().include("../shared/*.json"));
    let host = Arc::new(MemoryHost::default());

    AutoloadPlugin::new().register(host.clone(), &options).await?;

    let routes = host.routes();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].get("path").and_then(InjectValue::as_str), Some("/shared"));
    Ok(())
}

#[tokio::test]
async fn test_fully_ignored_pattern_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "apps/only.json", r#"{"a": 1}"#);
    let options = AutoloadOptions::new().with_relative_to(dir.path()).add_apps(
        InjectSpec::new()
            .include("apps/*.json")
            .ignore("apps/only.json"),
    );

    let error = AutoloadPlugin::new()
        .register(Arc::new(MemoryHost::default()), &options)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AutoloadError::Resolution {
            source: ResolutionError::NoMatches { ref pattern }
        } if pattern == "apps/*.json"
    ));
    Ok(())
}

/// 返回固定路径的匹配器
struct VirtualMatcher;

#[async_trait]
impl FileMatcher for VirtualMatcher {
    async fn find(&self, request: &MatchRequest) -> Result<Vec<String>, ResolutionError> {
        match request.pattern.as_str() {
            "virtual/*" => Ok(vec!["virtual/tools.js".to_string()]),
            "broken/*" => Err(ResolutionError::MatcherFailed {
                pattern: request.pattern.clone(),
                message: "backend unavailable".to_string(),
            }),
            _ => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "virtual"
    }
}

#[tokio::test]
async fn test_custom_matcher_and_loader() -> Result<()> {
    let modules = StaticModuleLoader::new().with_module(
        "virtual/tools.js",
        InjectValue::function("", |_ctx, _args| Ok(json!("tool"))),
    );
    let plugin = AutoloadPlugin::builder()
        .with_matcher(Arc::new(VirtualMatcher))
        .with_loader(Arc::new(modules))
        .build()?;
    let options = AutoloadOptions::new()
        .with_relative_to("/nowhere")
        .add_methods(InjectSpec::new().with_prefix("v").include("virtual/*"));
    let host = Arc::new(MemoryHost::default());

    let registries = plugin.register(host.clone(), &options).await?;
    assert_eq!(registries.methods.call("v.tools", &[])?, json!("tool"));

    let broken = AutoloadOptions::new()
        .with_relative_to("/nowhere")
        .add_handlers(InjectSpec::new().include("broken/*"));
    let error = plugin
        .register(Arc::new(MemoryHost::default()), &broken)
        .await
        .unwrap_err();
    assert!(error.to_string().contains("backend unavailable"));
    Ok(())
}

#[test]
fn test_option_precedence_end_to_end() {
    let call = OptionSet::new()
        .with("cache", InjectValue::from(json!({"expiresIn": 1})))
        .with("callback", InjectValue::data(true));
    let config = OptionSet::new()
        .with("cache", InjectValue::from(json!({"expiresIn": 2})))
        .with("generateKey", InjectValue::data(Value::Null));

    assert_eq!(build_options(Some(&config), Some(&call)).to_json(), call.to_json());
    assert_eq!(
        build_options(Some(&config.clone().with_override(true)), Some(&call)).to_json(),
        config.to_json()
    );
    assert_eq!(
        build_options(Some(&config.clone().with_merge(true)), Some(&call)).to_json(),
        json!({"cache": {"expiresIn": 1}, "callback": true, "generateKey": null})
    );
    assert_eq!(
        build_options(
            Some(&config.clone().with_merge(true).with_override(true)),
            Some(&call)
        )
        .to_json(),
        json!({"cache": {"expiresIn": 2}, "callback": true, "generateKey": null})
    );
}
