//! Configuration management for scriv.
//!
//! Parses `scriv.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.url`
//! - `site.title`

mod expand;
mod nav;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use nav::{NavEntry, NavTarget};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override input directory.
    pub input_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override base URL.
    pub base_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "scriv.toml";

/// Convertors used when the config file does not list any.
const DEFAULT_CONVERTORS: &[&str] = &["markdown-pages", "static-files"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Convertor identifiers, in priority order.
    pub convertors: Vec<String>,
    /// Site-wide settings.
    pub site: SiteConfig,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Markdown rendering options.
    pub markdown: MarkdownConfig,
    /// Highlight stylesheet options.
    pub highlight: HighlightConfig,
    /// Raw navigation table.
    nav: toml::Table,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Parsed navigation entries (set after loading).
    #[serde(skip)]
    pub nav_resolved: Vec<NavEntry>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site-wide settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title shown by templates.
    pub title: String,
    /// Base URL. `None` produces relative URLs everywhere.
    pub url: Option<String>,
}

/// Policy for files no convertor claims.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Unmatched {
    /// Copy the file unchanged.
    #[default]
    Copy,
    /// Fail the build.
    Error,
}

/// Raw build configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    input_dir: Option<String>,
    output_dir: Option<String>,
    template_dir: Option<String>,
    theme_dir: Option<String>,
    index_file: Option<String>,
    unmatched: Option<Unmatched>,
    parallel: Option<bool>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug)]
pub struct BuildConfig {
    /// Directory of source documents.
    pub input_dir: PathBuf,
    /// Directory receiving generated artifacts.
    pub output_dir: PathBuf,
    /// Directory searched for templates.
    pub template_dir: Option<PathBuf>,
    /// Shared tree merged beneath `input_dir`.
    pub theme_dir: Option<PathBuf>,
    /// File name that makes an output path a directory-style URL.
    pub index_file: String,
    /// What to do with files no convertor handles.
    pub unmatched: Unmatched,
    /// Convert files on a thread pool.
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("site"),
            template_dir: None,
            theme_dir: None,
            index_file: "index.html".to_owned(),
            unmatched: Unmatched::Copy,
            parallel: false,
        }
    }
}

/// Markdown rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Emit a permalink anchor inside each heading.
    pub permalinks: bool,
    /// Glob selecting the source files rendered as pages.
    pub pattern: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            permalinks: true,
            pattern: "**/*.md".to_owned(),
        }
    }
}

/// Code highlight stylesheet options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Style name.
    pub style: String,
    /// Output path of the generated stylesheet.
    pub path: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            style: "friendly".to_owned(),
            path: "css/highlight.css".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a base URL to be host-relative or use http:// or https://.
fn require_base_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with('/') && !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with /, http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `scriv.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from TOML text, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion, or validation fails.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        config.resolve(base)?;
        config.validate()?;

        Ok(config)
    }

    /// Base URL, if one is configured.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.site.url.as_deref()
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(input_dir) = &settings.input_dir {
            self.build_resolved.input_dir.clone_from(input_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.site.url = Some(base_url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            convertors: DEFAULT_CONVERTORS.iter().map(|&c| c.to_owned()).collect(),
            site: SiteConfig::default(),
            build: BuildConfigRaw::default(),
            markdown: MarkdownConfig::default(),
            highlight: HighlightConfig::default(),
            nav: toml::Table::new(),
            build_resolved: BuildConfig {
                input_dir: base.join("docs"),
                output_dir: base.join("site"),
                ..BuildConfig::default()
            },
            nav_resolved: Vec::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_build()?;
        require_non_empty(&self.markdown.pattern, "markdown.pattern")?;
        self.validate_highlight()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.site.url {
            require_non_empty(url, "site.url")?;
            require_base_url(url, "site.url")?;
        }
        Ok(())
    }

    /// Validate build configuration.
    fn validate_build(&self) -> Result<(), ConfigError> {
        if self.convertors.is_empty() {
            return Err(ConfigError::Validation(
                "convertors must list at least one convertor".to_owned(),
            ));
        }

        let index_file = &self.build_resolved.index_file;
        require_non_empty(index_file, "build.index_file")?;
        if index_file.contains('/') || index_file.contains('\\') {
            return Err(ConfigError::Validation(
                "build.index_file must be a file name, not a path".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate highlight configuration.
    fn validate_highlight(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.highlight.style, "highlight.style")?;
        require_non_empty(&self.highlight.path, "highlight.path")?;
        if self.highlight.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "highlight.path must be relative to the output directory".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.title = expand::expand_env(&self.site.title, "site.title")?;

        if let Some(ref url) = self.site.url {
            self.site.url = Some(expand::expand_env(url, "site.url")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory and parse the nav table.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));
        let defaults = BuildConfig::default();

        self.build_resolved = BuildConfig {
            input_dir: resolve(self.build.input_dir.as_deref(), "docs"),
            output_dir: resolve(self.build.output_dir.as_deref(), "site"),
            template_dir: self.build.template_dir.as_deref().map(|d| config_dir.join(d)),
            theme_dir: self.build.theme_dir.as_deref().map(|d| config_dir.join(d)),
            index_file: self.build.index_file.clone().unwrap_or(defaults.index_file),
            unmatched: self.build.unmatched.unwrap_or(defaults.unmatched),
            parallel: self.build.parallel.unwrap_or(defaults.parallel),
        };

        self.nav_resolved = nav::parse_nav(&self.nav, "nav")?;

        Ok(())
    }
}
