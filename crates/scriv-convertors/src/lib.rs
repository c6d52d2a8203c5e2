//! Built-in convertors for scriv.
//!
//! - [`MarkdownPages`] (`markdown-pages`): markdown sources rendered into
//!   directory-style HTML pages through the `base.html` template
//! - [`CodeHighlight`] (`code-highlight`): the stylesheet for highlighted code
//! - [`StaticFiles`] (`static-files`): everything else, copied unchanged
//!
//! [`site_builder`] wires the configured convertors, the minijinja
//! templates and the build options into a ready [`SiteBuilder`].

mod catalog;
mod highlight;
mod markdown;
mod static_files;
mod templates;

use std::sync::Arc;

use scriv_config::{Config, ConfigError};
use scriv_site::{BuildOptions, SiteBuilder};

pub use catalog::{ConvertorKind, ConvertorSet};
pub use highlight::{CodeHighlight, HighlightStyle};
pub use markdown::MarkdownPages;
pub use static_files::StaticFiles;
pub use templates::JinjaTemplates;

/// Create a builder for the site described by `config`.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] if a convertor is unknown or
/// misconfigured.
pub fn site_builder(config: &Config) -> Result<SiteBuilder, ConfigError> {
    let convertors = ConvertorSet::from_config(config)?;
    tracing::info!(convertors = %convertors.names().join(", "), "Using convertors");
    let templates = Arc::new(JinjaTemplates::new(
        config.build_resolved.template_dir.as_deref(),
    ));
    Ok(convertors.into_builder(BuildOptions::from_config(config), templates))
}
