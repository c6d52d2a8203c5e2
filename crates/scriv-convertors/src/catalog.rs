//! Convertor selection from configuration.
//!
//! Convertors are named in `scriv.toml` by stable identifiers. Each
//! identifier maps to one [`ConvertorKind`]; unknown identifiers are
//! configuration errors.

use std::str::FromStr;
use std::sync::Arc;

use scriv_config::{Config, ConfigError, Unmatched};
use scriv_site::{BuildOptions, Convertor, SiteBuilder, TemplateRenderer};

use crate::highlight::{CodeHighlight, HighlightStyle};
use crate::markdown::MarkdownPages;
use crate::static_files::StaticFiles;

/// Built-in convertor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertorKind {
    /// `markdown-pages`
    MarkdownPages,
    /// `code-highlight`
    CodeHighlight,
    /// `static-files`
    StaticFiles,
}

impl ConvertorKind {
    /// Identifier used in configuration.
    pub fn id(self) -> &'static str {
        match self {
            Self::MarkdownPages => "markdown-pages",
            Self::CodeHighlight => "code-highlight",
            Self::StaticFiles => "static-files",
        }
    }

    fn create(self, config: &Config) -> Result<Arc<dyn Convertor>, ConfigError> {
        Ok(match self {
            Self::MarkdownPages => Arc::new(MarkdownPages::from_config(config)?),
            Self::CodeHighlight => Arc::new(CodeHighlight::new(
                config.highlight.style.parse::<HighlightStyle>()?,
                config.highlight.path.clone(),
            )),
            Self::StaticFiles => Arc::new(StaticFiles),
        })
    }
}

impl FromStr for ConvertorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::MarkdownPages, Self::CodeHighlight, Self::StaticFiles]
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| ConfigError::Validation(format!("unknown convertor '{s}'")))
    }
}

/// Convertors configured for a build, in priority order.
pub struct ConvertorSet {
    /// Convertors tried in order for every file.
    pub convertors: Vec<Arc<dyn Convertor>>,
    /// Convertor for files none of the above claims.
    pub fallback: Option<Arc<dyn Convertor>>,
}

impl ConvertorSet {
    /// Instantiate the configured convertors.
    ///
    /// With `unmatched = "copy"` and no `static-files` entry, a
    /// [`StaticFiles`] fallback is added.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for unknown identifiers and
    /// invalid convertor settings.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let kinds = config
            .convertors
            .iter()
            .map(|id| id.parse::<ConvertorKind>())
            .collect::<Result<Vec<_>, _>>()?;

        let convertors = kinds
            .iter()
            .map(|kind| kind.create(config))
            .collect::<Result<Vec<_>, _>>()?;

        let fallback = (config.build_resolved.unmatched == Unmatched::Copy
            && !kinds.contains(&ConvertorKind::StaticFiles))
        .then(|| Arc::new(StaticFiles) as Arc<dyn Convertor>);

        tracing::debug!(
            convertors = ?config.convertors,
            fallback = fallback.is_some(),
            "Convertors configured"
        );

        Ok(Self {
            convertors,
            fallback,
        })
    }

    /// Create a builder running these convertors.
    pub fn into_builder(
        self,
        options: BuildOptions,
        templates: Arc<dyn TemplateRenderer>,
    ) -> SiteBuilder {
        let builder = SiteBuilder::new(options, self.convertors, templates);
        match self.fallback {
            Some(fallback) => builder.with_fallback(fallback),
            None => builder,
        }
    }

    /// Identifiers of the convertors, in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.convertors.iter().map(|c| c.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config(toml: &str) -> Config {
        Config::from_toml(toml, Path::new("/p")).unwrap()
    }

    #[test]
    fn test_default_convertors() {
        let set = ConvertorSet::from_config(&config("")).unwrap();

        assert_eq!(set.names(), vec!["markdown-pages", "static-files"]);
        assert!(set.fallback.is_none());
    }

    #[test]
    fn test_copy_fallback_added() {
        let set = ConvertorSet::from_config(&config(
            "convertors = [\"markdown-pages\", \"code-highlight\"]",
        ))
        .unwrap();

        assert_eq!(set.names(), vec!["markdown-pages", "code-highlight"]);
        assert_eq!(set.fallback.unwrap().name(), "static-files");
    }

    #[test]
    fn test_no_fallback_when_coverage_required() {
        let set = ConvertorSet::from_config(&config(
            "convertors = [\"markdown-pages\"]\n[build]\nunmatched = \"error\"",
        ))
        .unwrap();

        assert!(set.fallback.is_none());
    }

    #[test]
    fn test_unknown_convertor() {
        let err = ConvertorSet::from_config(&config("convertors = [\"latex\"]"))
            .err()
            .unwrap();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("latex"));
    }

    #[test]
    fn test_unknown_highlight_style() {
        let err = ConvertorSet::from_config(&config(
            "convertors = [\"code-highlight\"]\n[highlight]\nstyle = \"neon\"",
        ))
        .err()
        .unwrap();

        assert!(err.to_string().contains("neon"));
    }

    #[test]
    fn test_kind_ids_round_trip() {
        for kind in [
            ConvertorKind::MarkdownPages,
            ConvertorKind::CodeHighlight,
            ConvertorKind::StaticFiles,
        ] {
            assert_eq!(kind.id().parse::<ConvertorKind>().unwrap(), kind);
        }
    }
}
