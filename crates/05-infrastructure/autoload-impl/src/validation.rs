//! 插件选项验证
//!
//! 在任何注册副作用之前执行，收集全部违规后一次性报告

use autoload_common::{
    AutoloadOptions, EntityCategory, InjectSpec, InjectValue, NamingConventions, ValidationError,
    ValidationResult, MERGE_KEY, OVERRIDE_KEY,
};
use tracing::{debug, warn};

/// 选项值的期望类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedKind {
    Object,
    Function,
    Boolean,
}

impl ExpectedKind {
    fn accepts(self, value: &InjectValue) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Function => value.is_function(),
            Self::Boolean => value.as_bool().is_some(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Function => "function",
            Self::Boolean => "boolean",
        }
    }
}

/// 允许的方法选项及其类型
const OPTION_SCHEMA: [(&str, ExpectedKind); 6] = [
    ("bind", ExpectedKind::Object),
    ("cache", ExpectedKind::Object),
    ("generateKey", ExpectedKind::Function),
    ("callback", ExpectedKind::Boolean),
    (OVERRIDE_KEY, ExpectedKind::Boolean),
    (MERGE_KEY, ExpectedKind::Boolean),
];

/// 插件选项验证器
#[derive(Debug, Default)]
pub struct OptionsValidator;

impl OptionsValidator {
    /// 创建新的验证器
    pub fn new() -> Self {
        Self
    }

    /// 验证插件选项
    pub fn validate(&self, options: &AutoloadOptions) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if options
            .relative_to
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            errors.push(ValidationError::invalid_field_value(
                "relativeTo",
                "",
                "不能为空",
            ));
        }

        for category in EntityCategory::REGISTRATION_ORDER {
            for (index, spec) in options.specs(category).iter().enumerate() {
                let field = format!("{}[{}]", category, index);
                Self::validate_spec(&field, spec, &mut errors);
            }
        }

        if errors.is_empty() {
            debug!("插件选项验证通过");
            return Ok(());
        }

        warn!("插件选项验证失败，共 {} 处错误", errors.len());
        Err(ValidationError::combine(errors))
    }

    fn validate_spec(field: &str, spec: &InjectSpec, errors: &mut Vec<ValidationError>) {
        if spec.includes.is_empty() {
            errors.push(ValidationError::required_field_missing(format!("{field}.includes")));
        }

        if let Some(prefix) = &spec.prefix {
            if !NamingConventions::is_valid_prefix(prefix) {
                errors.push(ValidationError::invalid_field_value(
                    format!("{field}.prefix"),
                    prefix,
                    "前缀不能为空，且不能包含空的点号分段",
                ));
            }
        }

        for (index, ignore) in spec.ignores.iter().enumerate() {
            if ignore.is_empty() {
                errors.push(ValidationError::invalid_field_value(
                    format!("{field}.ignores[{index}]"),
                    "",
                    "忽略模式不能为空",
                ));
            }
        }

        let Some(options) = &spec.options else {
            return;
        };

        for (key, value) in options.iter() {
            match OPTION_SCHEMA.iter().find(|(name, _)| *name == key) {
                Some((_, expected)) if expected.accepts(value) => {}
                Some((_, expected)) => errors.push(ValidationError::invalid_field_value(
                    format!("{field}.options.{key}"),
                    value.kind(),
                    format!("必须是 {}", expected.as_str()),
                )),
                None => errors.push(ValidationError::unknown_field(format!(
                    "{field}.options.{key}"
                ))),
            }
        }
    }
}
