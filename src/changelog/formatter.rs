//! Change-log line rendering for resource mutations.
//!
//! # Responsibilities
//! - Render one audit line per create/update/delete event
//! - Expose request headers and the affected resource to the templates
//! - Fall back to built-in templates when none are configured
//!
//! # Design Decisions
//! - Templates are handlebars strings compiled once at construction
//! - HTML escaping is disabled; these lines go to logs, not browsers
//! - Non-strict rendering: missing variables interpolate as empty, so a
//!   formatter call never fails a request

use axum::http::HeaderMap;
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, TemplateError,
};
use serde_json::{json, Map, Value};

use crate::config::schema::LogTemplatesConfig;
use crate::flags::model::FeatureFlag;

const DEFAULT_CREATED: &str = "{{type}} created: {{json_stringify resource}}";
const DEFAULT_UPDATED: &str =
    "{{type}} updated; previous: {{json_stringify previous_resource}}, new: {{json_stringify new_resource}}";
const DEFAULT_DELETED: &str = "{{type}} deleted: {{key}}";

/// Renders audit lines for resource mutations via configurable templates.
pub struct ChangeLogFormatter {
    registry: Handlebars<'static>,
}

impl ChangeLogFormatter {
    pub fn new(templates: &LogTemplatesConfig) -> Result<Self, Box<TemplateError>> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("json_stringify", Box::new(json_stringify));

        registry.register_template_string(
            "created",
            templates.created.as_deref().unwrap_or(DEFAULT_CREATED),
        )?;
        registry.register_template_string(
            "updated",
            templates.updated.as_deref().unwrap_or(DEFAULT_UPDATED),
        )?;
        registry.register_template_string(
            "deleted",
            templates.deleted.as_deref().unwrap_or(DEFAULT_DELETED),
        )?;

        Ok(Self { registry })
    }

    pub fn created(&self, headers: &HeaderMap, resource_type: &str, resource: &FeatureFlag) -> String {
        self.render(
            "created",
            json!({
                "headers": headers_value(headers),
                "type": resource_type,
                "resource": resource.to_value(),
            }),
            || format!("{resource_type} created"),
        )
    }

    pub fn updated(
        &self,
        headers: &HeaderMap,
        resource_type: &str,
        previous: &FeatureFlag,
        new: &FeatureFlag,
    ) -> String {
        self.render(
            "updated",
            json!({
                "headers": headers_value(headers),
                "type": resource_type,
                "previous_resource": previous.to_value(),
                "new_resource": new.to_value(),
            }),
            || format!("{resource_type} updated"),
        )
    }

    pub fn deleted(&self, headers: &HeaderMap, resource_type: &str, key: &str) -> String {
        self.render(
            "deleted",
            json!({
                "headers": headers_value(headers),
                "type": resource_type,
                "key": key,
            }),
            || format!("{resource_type} deleted: {key}"),
        )
    }

    fn render(&self, template: &str, data: Value, fallback: impl FnOnce() -> String) -> String {
        match self.registry.render(template, &data) {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(template, %error, "change-log template failed to render");
                fallback()
            }
        }
    }
}

/// Header map as a JSON object of lowercased name to value. Non-UTF-8
/// values are skipped.
fn headers_value(headers: &HeaderMap) -> Value {
    let mut object = Map::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            object.insert(name.as_str().to_string(), Value::String(value.to_string()));
        }
    }
    Value::Object(object)
}

/// `{{json_stringify value}}` writes the value as compact JSON.
fn json_stringify(
    helper: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = helper
        .param(0)
        .map(|param| param.value().clone())
        .unwrap_or(Value::Null);
    out.write(&value.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::model::{FlagConfiguration, FlagState};
    use axum::http::HeaderValue;
    use serde_json::json;

    fn formatter(templates: LogTemplatesConfig) -> ChangeLogFormatter {
        ChangeLogFormatter::new(&templates).unwrap()
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-auth-request-email",
            HeaderValue::from_static("john@example.com"),
        );
        headers
    }

    fn flag(state: FlagState, default_variant: &str) -> FeatureFlag {
        FeatureFlag::new(
            "test_flag",
            FlagConfiguration {
                state,
                variants: json!({"on": true, "off": false})
                    .as_object()
                    .cloned()
                    .unwrap(),
                default_variant: Some(default_variant.to_string()),
                targeting: None,
                metadata: None,
            },
        )
    }

    #[test]
    fn created_uses_the_default_template() {
        let line = formatter(LogTemplatesConfig::default()).created(
            &headers(),
            "Flag",
            &flag(FlagState::Enabled, "on"),
        );
        assert_eq!(
            line,
            "Flag created: {\"key\":\"test_flag\",\"state\":\"ENABLED\",\
             \"variants\":{\"on\":true,\"off\":false},\"defaultVariant\":\"on\"}"
        );
    }

    #[test]
    fn updated_uses_the_default_template() {
        let line = formatter(LogTemplatesConfig::default()).updated(
            &headers(),
            "Flag",
            &flag(FlagState::Disabled, "off"),
            &flag(FlagState::Enabled, "on"),
        );
        assert_eq!(
            line,
            "Flag updated; previous: {\"key\":\"test_flag\",\"state\":\"DISABLED\",\
             \"variants\":{\"on\":true,\"off\":false},\"defaultVariant\":\"off\"}, \
             new: {\"key\":\"test_flag\",\"state\":\"ENABLED\",\
             \"variants\":{\"on\":true,\"off\":false},\"defaultVariant\":\"on\"}"
        );
    }

    #[test]
    fn deleted_uses_the_default_template() {
        let line = formatter(LogTemplatesConfig::default()).deleted(&headers(), "Flag", "test_flag");
        assert_eq!(line, "Flag deleted: test_flag");
    }

    #[test]
    fn configured_templates_interpolate_headers_and_fields() {
        let templates = LogTemplatesConfig {
            created: Some(
                "{{headers.[x-auth-request-email]}} created {{resource.key}}".to_string(),
            ),
            updated: Some(
                "{{headers.[x-auth-request-email]}} updated {{new_resource.key}}".to_string(),
            ),
            deleted: Some("{{headers.[x-auth-request-email]}} deleted {{key}}".to_string()),
        };
        let formatter = formatter(templates);
        let resource = flag(FlagState::Enabled, "on");

        assert_eq!(
            formatter.created(&headers(), "Flag", &resource),
            "john@example.com created test_flag"
        );
        assert_eq!(
            formatter.updated(&headers(), "Flag", &resource, &resource),
            "john@example.com updated test_flag"
        );
        assert_eq!(
            formatter.deleted(&headers(), "Flag", "test_flag"),
            "john@example.com deleted test_flag"
        );
    }

    #[test]
    fn missing_variables_render_as_empty() {
        let templates = LogTemplatesConfig {
            deleted: Some("{{headers.[x-missing]}}deleted {{key}}".to_string()),
            ..LogTemplatesConfig::default()
        };
        let line = formatter(templates).deleted(&HeaderMap::new(), "Flag", "k");
        assert_eq!(line, "deleted k");
    }

    #[test]
    fn invalid_template_fails_at_construction() {
        let templates = LogTemplatesConfig {
            created: Some("{{#if}}".to_string()),
            ..LogTemplatesConfig::default()
        };
        assert!(ChangeLogFormatter::new(&templates).is_err());
    }
}
