//! Pluggable content handlers.
//!
//! A [`Convertor`] claims source files by path, names their output, and
//! produces the output when asked. Convertors are shared by every file they
//! handle and hold no per-file state.

use crate::env::Environment;
use crate::file::File;
use crate::toc::TableOfContents;
use crate::url::ResolveError;

/// Error raised while converting one file.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Reading the source or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A hyperlink in the source points nowhere.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Template rendering failed.
    #[error("template '{name}' failed: {message}")]
    Template {
        /// Template name.
        name: String,
        /// Renderer message.
        message: String,
    },
}

/// Content handler for a class of source files.
pub trait Convertor: Send + Sync {
    /// Stable identifier used in configuration.
    fn name(&self) -> &str;

    /// True if this convertor handles the source at `input_path`.
    fn should_handle(&self, input_path: &str) -> bool;

    /// Output path for the source at `input_path`.
    fn output_path(&self, input_path: &str) -> String;

    /// Output paths this convertor generates without a source file.
    fn extra_paths(&self) -> Vec<String> {
        Vec::new()
    }

    /// Outline of `file`, for convertors that produce pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn build_toc(
        &self,
        _file: &File,
        _env: &Environment<'_>,
    ) -> Result<Option<TableOfContents>, ConvertError> {
        Ok(None)
    }

    /// Produce the output for `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, link resolution, rendering or writing fails.
    fn convert(&self, file: &File, env: &Environment<'_>) -> Result<(), ConvertError>;
}

/// Template rendering capability supplied by the templating layer.
pub trait TemplateRenderer: Send + Sync {
    /// Render the template `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Template`] if the template is missing or fails.
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, ConvertError>;
}
