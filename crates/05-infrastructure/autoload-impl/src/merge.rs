//! 选项合并引擎
//!
//! 由配置级选项和调用点选项计算方法注册时的生效选项。优先级依次为：
//!
//! 1. 没有配置级选项：结果就是调用点选项
//! 2. 没有调用点选项，或配置级 `override` 为真且 `merge` 不为真：结果是去掉控制键的配置级选项
//! 3. 两者都有且配置级 `merge` 为真：逐键合并
//! 4. 其余情况：调用点选项整体生效

use autoload_common::{is_control_key, OptionSet};
use tracing::debug;

/// 计算生效选项
pub fn build_options(config: Option<&OptionSet>, call: Option<&OptionSet>) -> OptionSet {
    let Some(config) = config else {
        return call.cloned().unwrap_or_default();
    };

    match call {
        None => config.without_control_keys(),
        Some(_) if config.is_override() && !config.is_merge() => {
            debug!("配置级选项覆盖调用点选项");
            config.without_control_keys()
        }
        Some(call) if config.is_merge() => {
            debug!("逐键合并配置级选项与调用点选项");
            build_option_helper(config, call)
        }
        Some(call) => call.clone(),
    }
}

/// 逐键合并
///
/// 只有一方定义的键取该方的值；两方都定义时，配置级 `override` 为真取配置值，否则取调用点的值。
/// 结果的键顺序为调用点的键在前，之后是配置级独有的键
pub fn build_option_helper(config: &OptionSet, call: &OptionSet) -> OptionSet {
    let mut merged = OptionSet::new();
    let prefer_config = config.is_override();

    for key in call.keys().chain(config.keys()) {
        if is_control_key(key) || merged.contains_key(key) {
            continue;
        }

        let from_call = call.get(key);
        let from_config = config.get(key);

        let chosen = match (from_call, from_config) {
            (None, config_value) => config_value,
            (Some(_), Some(config_value)) if prefer_config => Some(config_value),
            (call_value, _) => call_value,
        };

        if let Some(value) = chosen {
            merged.insert(key, value.clone());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoload_common::InjectValue;
    use serde_json::json;

    fn options(value: serde_json::Value) -> OptionSet {
        serde_json::from_value(value).expect("应该是合法的选项")
    }

    #[test]
    fn test_no_config_returns_call_options() {
        let call = options(json!({"cache": {"expiresIn": 10}, "override": true}));

        assert_eq!(build_options(None, Some(&call)), call);
        assert!(build_options(None, None).is_empty());
    }

    #[test]
    fn test_config_without_call_is_stripped() {
        let config = options(json!({"callback": false, "override": false, "merge": true}));

        let result = build_options(Some(&config), None);
        assert_eq!(result, options(json!({"callback": false})));
    }

    #[test]
    fn test_call_wins_without_override_or_merge() {
        let config = options(json!({"callback": false, "override": false, "merge": false}));
        let call = options(json!({"cache": {"expiresIn": 5}}));

        assert_eq!(build_options(Some(&config), Some(&call)), call);
    }

    #[test]
    fn test_override_without_merge_uses_config() {
        let config = options(json!({"callback": false, "override": true}));
        let call = options(json!({"callback": true, "cache": {"expiresIn": 5}}));

        assert_eq!(
            build_options(Some(&config), Some(&call)),
            options(json!({"callback": false}))
        );
    }

    #[test]
    fn test_merge_without_override_prefers_call_on_conflict() {
        let config = options(json!({"callback": false, "bind": {"a": 1}, "merge": true}));
        let call = options(json!({"callback": true, "cache": {"expiresIn": 5}}));

        let result = build_options(Some(&config), Some(&call));
        assert_eq!(
            result,
            options(json!({"callback": true, "cache": {"expiresIn": 5}, "bind": {"a": 1}}))
        );
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["callback", "cache", "bind"]);
    }

    #[test]
    fn test_merge_with_override_prefers_config_on_conflict() {
        let config = options(json!({
            "callback": false,
            "bind": {"a": 1},
            "override": true,
            "merge": true
        }));
        let call = options(json!({"callback": true, "cache": {"expiresIn": 5}}));

        let result = build_options(Some(&config), Some(&call));
        assert_eq!(
            result,
            options(json!({"callback": false, "cache": {"expiresIn": 5}, "bind": {"a": 1}}))
        );
        assert!(!result.contains_key("override"));
        assert!(!result.contains_key("merge"));
    }

    #[test]
    fn test_merge_keeps_falsy_call_values() {
        let config = OptionSet::new()
            .with("callback", InjectValue::data(true))
            .with_merge(true);
        let call = OptionSet::new().with("callback", InjectValue::data(false));

        let result = build_option_helper(&config, &call);
        assert_eq!(result.get("callback").and_then(InjectValue::as_bool), Some(false));
    }

    #[test]
    fn test_merge_drops_call_control_keys() {
        let config = OptionSet::new().with_merge(true);
        let call = OptionSet::new()
            .with("callback", InjectValue::data(true))
            .with_override(true);

        let result = build_options(Some(&config), Some(&call));
        assert_eq!(result, options(json!({"callback": true})));
    }
}
