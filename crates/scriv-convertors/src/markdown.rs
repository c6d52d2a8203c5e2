//! Markdown pages.
//!
//! Every matching source becomes a directory-style page: `foo.md` is written
//! to `foo/index.html` so it is served at `foo/`. A source named after the
//! index file (`index.md`) stays in its own directory.

use std::path::Path;

use glob::Pattern;
use scriv_config::{Config, ConfigError};
use scriv_renderer::MarkdownRenderer;
use scriv_site::{ConvertError, Convertor, Environment, File, Header, TableOfContents};
use serde_json::json;

/// Template every page is rendered into.
const PAGE_TEMPLATE: &str = "base.html";

/// Renders markdown sources into HTML pages.
#[derive(Debug)]
pub struct MarkdownPages {
    pattern: Pattern,
    index_file: String,
    renderer: MarkdownRenderer,
}

impl MarkdownPages {
    /// Create a convertor for sources matching `pattern`.
    pub fn new(pattern: Pattern, index_file: impl Into<String>, renderer: MarkdownRenderer) -> Self {
        Self {
            pattern,
            index_file: index_file.into(),
            renderer,
        }
    }

    /// Create a convertor from the `[markdown]` and `[build]` sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `markdown.pattern` is not a
    /// valid glob.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let pattern = Pattern::new(&config.markdown.pattern).map_err(|e| {
            ConfigError::Validation(format!("markdown.pattern: {e}"))
        })?;
        let renderer = MarkdownRenderer::new()
            .with_gfm(config.markdown.gfm)
            .with_permalinks(config.markdown.permalinks);

        Ok(Self::new(
            pattern,
            config.build_resolved.index_file.clone(),
            renderer,
        ))
    }

    fn index_stem(&self) -> &str {
        stem(&self.index_file)
    }
}

/// File name without its last extension.
fn stem(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

impl Convertor for MarkdownPages {
    fn name(&self) -> &str {
        "markdown-pages"
    }

    fn should_handle(&self, input_path: &str) -> bool {
        self.pattern.matches(input_path)
    }

    fn output_path(&self, input_path: &str) -> String {
        let (dir, name) = input_path.rsplit_once('/').unwrap_or(("", input_path));
        let page = stem(name);

        let page_dir = if page == self.index_stem() {
            dir.to_owned()
        } else if dir.is_empty() {
            page.to_owned()
        } else {
            format!("{dir}/{page}")
        };

        if page_dir.is_empty() {
            self.index_file.clone()
        } else {
            format!("{page_dir}/{}", self.index_file)
        }
    }

    /// Outline of the page's headings.
    ///
    /// Links are resolved here too, so a planned site has no dangling
    /// references left for the convert pass to find.
    fn build_toc(
        &self,
        file: &File,
        env: &Environment<'_>,
    ) -> Result<Option<TableOfContents>, ConvertError> {
        let source = file.read_input_text()?;
        let page = self.renderer.render(&source, |url| env.resolve(url, file))?;

        Ok(Some(TableOfContents::from_flat(
            page.toc
                .into_iter()
                .map(|entry| Header::new(entry.id, entry.title, entry.level)),
        )))
    }

    fn convert(&self, file: &File, env: &Environment<'_>) -> Result<(), ConvertError> {
        let source = file.read_input_text()?;
        let page = self.renderer.render(&source, |url| env.resolve(url, file))?;

        let current_page = env.page_context();
        let title = page
            .title
            .or_else(|| current_page.as_ref().map(|p| p.title.clone()))
            .unwrap_or_else(|| fallback_title(file));

        let stylesheets: Vec<String> = env
            .registry()
            .iter()
            .filter(|f| f.is_synthetic() && f.output_path().ends_with(".css"))
            .map(|f| env.file_url(f))
            .collect();

        let context = json!({
            "content": page.html,
            "title": title,
            "toc": env.toc(file),
            "nav": env.nav_items(),
            "current_page": current_page,
            "stylesheets": stylesheets,
            "root": env.root_url(),
            "site": {
                "title": env.site_title(),
                "url": env.resolver().base_url(),
            },
        });

        let html = env.render(PAGE_TEMPLATE, &context)?;
        file.write_output_text(&html)?;

        tracing::debug!(path = %file.input_path(), url = %file.url(), "Rendered page");
        Ok(())
    }
}

/// Title for a page with no H1 and no nav entry.
fn fallback_title(file: &File) -> String {
    Path::new(file.input_path())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
