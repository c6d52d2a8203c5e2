//! Template rendering with minijinja.
//!
//! Templates are loaded from the configured template directory. Names the
//! directory does not provide fall back to the built-in templates, so a site
//! can override `base.html` without shipping anything else.

use std::path::Path;

use minijinja::{Environment, Value, path_loader};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use scriv_site::{ConvertError, TemplateRenderer};

/// Characters that cannot appear raw in a quoted `href`.
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'&');

/// Templates compiled into the binary.
const BUILTIN: &[(&str, &str)] = &[("base.html", include_str!("templates/base.html"))];

/// Template renderer backed by a minijinja environment.
///
/// HTML templates are auto-escaped; mark trusted markup with `|safe` and
/// write links through the `url` filter.
#[derive(Debug)]
pub struct JinjaTemplates {
    env: Environment<'static>,
}

impl JinjaTemplates {
    /// Create a renderer loading from `template_dir` before the built-ins.
    pub fn new(template_dir: Option<&Path>) -> Self {
        let mut env = Environment::new();
        let dir_loader = template_dir.map(path_loader);
        env.set_loader(move |name| {
            if let Some(load) = &dir_loader
                && let Some(source) = load(name)?
            {
                return Ok(Some(source));
            }
            Ok(builtin(name).map(str::to_owned))
        });
        env.add_filter("url", url_filter);
        Self { env }
    }
}

fn builtin(name: &str) -> Option<&'static str> {
    BUILTIN
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| *source)
}

/// Percent-encode a link and mark it safe for an attribute.
fn url_filter(value: &str) -> Value {
    Value::from_safe_string(utf8_percent_encode(value, URL_UNSAFE).to_string())
}

impl TemplateRenderer for JinjaTemplates {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, ConvertError> {
        let failed = |err: minijinja::Error| ConvertError::Template {
            name: name.to_owned(),
            message: err.to_string(),
        };
        self.env
            .get_template(name)
            .map_err(failed)?
            .render(context)
            .map_err(failed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn context() -> serde_json::Value {
        json!({
            "content": "<p>Hello</p>",
            "title": "A <b> page",
            "site": { "title": "Docs" },
            "root": "../",
            "stylesheets": ["../css/highlight.css"],
            "nav": [
                { "title": "Home", "url": "../", "is_page": true, "is_active": false, "children": [] },
                { "title": "Topics", "url": null, "is_page": false, "is_active": true, "children": [
                    { "title": "Topic A", "url": ".", "is_page": true, "is_active": true, "children": [] },
                ] },
            ],
            "toc": { "headers": [ { "id": "hello", "name": "Hello", "level": 1, "children": [] } ] },
            "current_page": {
                "title": "Topic A",
                "url": ".",
                "previous": { "title": "Home", "url": "../" },
                "next": null,
            },
        })
    }

    #[test]
    fn test_builtin_base_template() {
        let html = JinjaTemplates::new(None).render("base.html", &context()).unwrap();

        assert!(html.contains("<main>\n<p>Hello</p>\n</main>"));
        assert!(html.contains("<title>A &lt;b&gt; page - Docs</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="../css/highlight.css">"#));
        assert!(html.contains(r#"<li class="active"><span>Topics</span>"#));
        assert!(html.contains(r#"<li class="active"><a href=".">Topic A</a>"#));
        assert!(html.contains(r##"<a href="#hello">Hello</a>"##));
        assert!(html.contains(r#"<a rel="prev" href="../">Home</a>"#));
        assert!(!html.contains(r#"rel="next""#));
    }

    #[test]
    fn test_url_filter_encodes_unsafe_characters() {
        assert_eq!(
            url_filter("my docs/a \"b\"/").to_string(),
            "my%20docs/a%20%22b%22/"
        );
        assert_eq!(url_filter("../b/#intro").to_string(), "../b/#intro");
    }

    #[test]
    fn test_template_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.html"), "[{{ title }}]").unwrap();

        let html = JinjaTemplates::new(Some(dir.path()))
            .render("base.html", &json!({ "title": "Custom" }))
            .unwrap();

        assert_eq!(html, "[Custom]");
    }

    #[test]
    fn test_template_dir_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();

        let html = JinjaTemplates::new(Some(dir.path()))
            .render("base.html", &context())
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_missing_template() {
        let err = JinjaTemplates::new(None)
            .render("nope.html", &json!({}))
            .unwrap_err();

        assert!(matches!(err, ConvertError::Template { ref name, .. } if name == "nope.html"));
    }
}
