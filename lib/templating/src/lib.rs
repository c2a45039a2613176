mod filters;

use std::collections::BTreeMap;
use std::error::Error;

use minijinja::Environment;
use serde::Serialize;
use serde_json::{to_value, Value};
use thiserror::Error;

pub use crate::filters::identifier;

#[remain::sorted]
#[derive(Debug, Error)]
pub enum TemplatingError {
    #[error("json serialize/deserialize error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Creating a Context from a Value/Serialize requires it being a JSON object")]
    TemplateContextError(),

    /// Error that may occur while template operations such as parse and render.
    #[error("Template error: `{0}`")]
    TemplateError(#[from] minijinja::Error),

    /// Error that may occur while parsing the template.
    #[error("Template parse error:\n{0}")]
    TemplateParseError(String),
}

pub type TemplatingResult<T> = Result<T, TemplatingError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateContext {
    pub data: BTreeMap<String, Value>,
}

impl TemplateContext {
    /// Initializes an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a serde-json `Value` and convert it into a `Context` with no overhead/cloning.
    pub fn from_value(obj: Value) -> TemplatingResult<Self> {
        match obj {
            Value::Object(m) => Ok(TemplateContext {
                data: m.into_iter().collect(),
            }),
            _ => Err(TemplatingError::TemplateContextError()),
        }
    }

    /// Takes something that impl Serialize and create a context with it.
    pub fn from_serialize(value: impl Serialize) -> TemplatingResult<Self> {
        TemplateContext::from_value(to_value(value)?)
    }

    /// Converts the `val` parameter to `Value` and insert it into the context.
    pub fn insert<T: Serialize + ?Sized, S: Into<String>>(
        &mut self,
        key: S,
        val: &T,
    ) -> TemplatingResult<()> {
        self.data.insert(key.into(), to_value(val)?);
        Ok(())
    }

    pub fn contains_key(&self, index: &str) -> bool {
        self.data.contains_key(index)
    }
}

/// A minijinja environment with the DSL filters registered.
#[derive(Debug)]
pub struct Templates<'a> {
    env: Environment<'a>,
}

impl<'a> Templates<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_filter("identifier", |value: String| filters::identifier(&value));
        env.add_filter("quote", |value: String| filters::quote(&value));
        // descriptors are not html
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.set_keep_trailing_newline(true);

        Self { env }
    }

    /// Registers a named template, surfacing the underlying syntax error when it fails to parse.
    pub fn add_template(&mut self, name: &'a str, source: String) -> TemplatingResult<()> {
        if let Err(e) = self.env.add_template_owned(name, source) {
            return if let Some(error_source) = e.source() {
                Err(TemplatingError::TemplateParseError(error_source.to_string()))
            } else {
                Err(TemplatingError::TemplateError(e))
            };
        }

        Ok(())
    }

    /// Renders a previously registered template.
    pub fn render(&self, template: &str, context: &TemplateContext) -> TemplatingResult<String> {
        let tmpl = self.env.get_template(template)?;
        Ok(tmpl.render(&context.data)?)
    }

    /// Renders a template source that is not kept around.
    pub fn one_off(template: &str, context: &TemplateContext) -> TemplatingResult<String> {
        Ok(Templates::new().env.render_str(template, &context.data)?)
    }
}

impl Default for Templates<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::{TemplateContext, Templates, TemplatingError};

    #[test]
    fn should_render_context_values_and_filters() {
        let mut context = TemplateContext::new();
        context.insert("workspace_path", "catalog-workspace.json").unwrap();
        context.insert("name", "Order Service!").unwrap();

        let rendered = Templates::one_off(
            "workspace extends {{ workspace_path }} {\n    !element {{ name | identifier }} {\n    }\n}\n",
            &context,
        )
        .unwrap();

        insta::assert_snapshot!(rendered.trim_end(), @r###"
        workspace extends catalog-workspace.json {
            !element OrderService {
            }
        }
        "###);
    }

    #[test]
    fn should_not_html_escape() {
        let mut context = TemplateContext::new();
        context.insert("name", "R&D <core>").unwrap();

        let rendered = Templates::one_off("{{ name | quote }}", &context).unwrap();
        assert_eq!("\"R&D <core>\"", rendered);
    }

    #[test]
    fn should_keep_dsl_braces_verbatim() {
        let rendered = Templates::one_off("model {\n}\n", &TemplateContext::new()).unwrap();
        assert_eq!("model {\n}\n", rendered);
    }

    #[test]
    fn invalid_template_returns_parse_error() {
        let mut templates = Templates::new();
        let result = templates.add_template("broken", "{% if %}".to_string());
        assert!(matches!(
            result,
            Err(TemplatingError::TemplateParseError(_)) | Err(TemplatingError::TemplateError(_))
        ));
    }

    #[test]
    fn context_requires_object() {
        assert!(TemplateContext::from_serialize(vec![1, 2]).is_err());
        let context = TemplateContext::from_serialize(serde_json::json!({"a": 1})).unwrap();
        assert!(context.contains_key("a"));
    }
}
