//! Build orchestration.
//!
//! A build runs three passes, each depending on the complete output of the
//! one before:
//!
//! 1. Gather: walk the theme and input trees, assign a convertor to every
//!    file and register convertor-contributed extra paths.
//! 2. Plan: build the navigation and collect page outlines.
//! 3. Convert: hand every file to its convertor, with the navigation
//!    activated for that file.
//!
//! Any failure aborts the build.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use scriv_config::{Config, NavEntry};

use crate::convertor::{ConvertError, Convertor, TemplateRenderer};
use crate::env::Environment;
use crate::file::{File, SiteLayout, path_to_slashes};
use crate::nav::{NavError, NavTree};
use crate::registry::{FileRegistry, RegistryError};
use crate::toc::TableOfContents;

/// Build failure.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Filesystem access failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// No convertor claims a source file and there is no fallback.
    #[error("no convertor handles {0}")]
    Unhandled(String),
    /// Two files produce the same URL.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Navigation references a missing file.
    #[error(transparent)]
    Nav(#[from] NavError),
    /// A convertor failed.
    #[error("failed to convert {path}: {source}")]
    Convert {
        /// Origin of the file being converted.
        path: String,
        /// Underlying error.
        #[source]
        source: ConvertError,
    },
}

impl BuildError {
    fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    fn convert(file: &File) -> impl FnOnce(ConvertError) -> Self + '_ {
        move |source| Self::Convert {
            path: file.origin().to_owned(),
            source,
        }
    }
}

/// Build inputs resolved from configuration.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Source tree.
    pub input_dir: PathBuf,
    /// Generated tree.
    pub output_dir: PathBuf,
    /// Shared tree gathered beneath `input_dir`.
    pub theme_dir: Option<PathBuf>,
    /// File name of directory-style outputs.
    pub index_file: String,
    /// Base URL for absolute links.
    pub base_url: Option<String>,
    /// Convert files on the rayon thread pool.
    pub parallel: bool,
    /// Site title handed to templates.
    pub site_title: String,
    /// Navigation entries.
    pub nav: Vec<NavEntry>,
}

impl BuildOptions {
    /// Options with default index file and no theme, base URL or nav.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            theme_dir: None,
            index_file: "index.html".to_owned(),
            base_url: None,
            parallel: false,
            site_title: String::new(),
            nav: Vec::new(),
        }
    }

    /// Take every build setting from `config`.
    pub fn from_config(config: &Config) -> Self {
        let build = &config.build_resolved;
        Self {
            input_dir: build.input_dir.clone(),
            output_dir: build.output_dir.clone(),
            theme_dir: build.theme_dir.clone(),
            index_file: build.index_file.clone(),
            base_url: config.base_url().map(str::to_owned),
            parallel: build.parallel,
            site_title: config.site.title.clone(),
            nav: config.nav_resolved.clone(),
        }
    }
}

/// Result of the gather and plan passes.
#[derive(Debug)]
pub struct SitePlan {
    /// Every file of the build in conversion order.
    pub registry: FileRegistry,
    /// Navigation tree.
    pub nav: NavTree,
    /// Page outlines keyed by output path.
    pub tocs: HashMap<String, TableOfContents>,
}

/// Counts reported after a build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Files written.
    pub files: usize,
    /// Pages listed in the navigation.
    pub pages: usize,
}

/// Drives a build from source tree to generated site.
pub struct SiteBuilder {
    options: BuildOptions,
    convertors: Vec<Arc<dyn Convertor>>,
    fallback: Option<Arc<dyn Convertor>>,
    templates: Arc<dyn TemplateRenderer>,
}

impl SiteBuilder {
    /// Create a builder. `convertors` are tried in order for every file.
    pub fn new(
        options: BuildOptions,
        convertors: Vec<Arc<dyn Convertor>>,
        templates: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            options,
            convertors,
            fallback: None,
            templates,
        }
    }

    /// Handle files no convertor claims with `fallback` instead of failing.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn Convertor>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Build options.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Gather every file and register extra paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a tree cannot be read, a file is unhandled, or two
    /// files produce the same URL.
    pub fn gather(&self) -> Result<FileRegistry, BuildError> {
        let input_layout = Arc::new(self.layout(&self.options.input_dir));

        let mut registry = match &self.options.theme_dir {
            Some(theme_dir) => {
                let mut registry = self.gather_tree(Arc::new(self.layout(theme_dir)))?;
                registry.merge(self.gather_tree(Arc::clone(&input_layout))?)?;
                registry
            }
            None => self.gather_tree(Arc::clone(&input_layout))?,
        };

        for convertor in &self.convertors {
            for path in convertor.extra_paths() {
                tracing::debug!(path = %path, convertor = convertor.name(), "Extra path");
                registry.append(File::synthetic(
                    path,
                    Arc::clone(&input_layout),
                    Arc::clone(convertor),
                ))?;
            }
        }

        tracing::info!(files = registry.len(), "Gathered files");
        Ok(registry)
    }

    /// Run the gather pass, build the navigation and collect outlines.
    ///
    /// Nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error from gathering, a broken nav reference, or a
    /// convertor failing to produce an outline.
    pub fn plan(&self) -> Result<SitePlan, BuildError> {
        let registry = self.gather()?;
        let nav = NavTree::build(&self.options.nav, &registry)?;
        let tocs = self.collect_tocs(&registry, &nav)?;

        Ok(SitePlan {
            registry,
            nav,
            tocs,
        })
    }

    /// Plan and convert every file.
    ///
    /// # Errors
    ///
    /// Returns the first error from planning or conversion.
    pub fn build(&self) -> Result<BuildSummary, BuildError> {
        let plan = self.plan()?;

        fs::create_dir_all(&self.options.output_dir)
            .map_err(BuildError::io(&self.options.output_dir))?;

        let files = plan.registry.files();
        if self.options.parallel {
            files
                .par_iter()
                .try_for_each(|file| self.convert_one(file, &plan))?;
        } else {
            for file in files {
                self.convert_one(file, &plan)?;
            }
        }

        let summary = BuildSummary {
            files: files.len(),
            pages: plan.nav.pages().len(),
        };
        tracing::info!(
            files = summary.files,
            pages = summary.pages,
            output = %self.options.output_dir.display(),
            "Build complete"
        );
        Ok(summary)
    }

    fn layout(&self, input_dir: &Path) -> SiteLayout {
        SiteLayout::new(
            input_dir,
            &self.options.output_dir,
            self.options.index_file.clone(),
        )
    }

    fn gather_tree(&self, layout: Arc<SiteLayout>) -> Result<FileRegistry, BuildError> {
        let mut paths = Vec::new();
        walk(&layout.input_dir, &layout.input_dir, &mut paths)?;

        let mut registry = FileRegistry::new();
        for input_path in paths {
            let convertor = self.select(&input_path)?;
            let output_path = convertor.output_path(&input_path);
            registry.append(File::new(
                input_path,
                output_path,
                Arc::clone(&layout),
                Arc::clone(convertor),
            ))?;
        }

        tracing::debug!(
            root = %layout.input_dir.display(),
            files = registry.len(),
            "Walked tree"
        );
        Ok(registry)
    }

    fn select(&self, input_path: &str) -> Result<&Arc<dyn Convertor>, BuildError> {
        self.convertors
            .iter()
            .find(|c| c.should_handle(input_path))
            .or(self.fallback.as_ref())
            .ok_or_else(|| BuildError::Unhandled(input_path.to_owned()))
    }

    fn collect_tocs(
        &self,
        registry: &FileRegistry,
        nav: &NavTree,
    ) -> Result<HashMap<String, TableOfContents>, BuildError> {
        let none = HashMap::new();
        let mut tocs = HashMap::new();

        for file in registry {
            let env = self.environment(file, registry, nav, &none);
            let toc = file
                .convertor()
                .build_toc(file, &env)
                .map_err(BuildError::convert(file))?;
            env.deactivate();

            if let Some(toc) = toc {
                tocs.insert(file.output_path().to_owned(), toc);
            }
        }

        Ok(tocs)
    }

    fn convert_one(&self, file: &File, plan: &SitePlan) -> Result<(), BuildError> {
        let output = file.full_output_path();
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
        }

        tracing::debug!(path = %file.origin(), convertor = file.convertor().name(), "Converting");

        let env = self.environment(file, &plan.registry, &plan.nav, &plan.tocs);
        file.convertor()
            .convert(file, &env)
            .map_err(BuildError::convert(file))?;
        env.deactivate();

        Ok(())
    }

    fn environment<'a>(
        &'a self,
        file: &'a File,
        registry: &'a FileRegistry,
        nav: &'a NavTree,
        tocs: &'a HashMap<String, TableOfContents>,
    ) -> Environment<'a> {
        Environment::new(
            file,
            registry,
            nav,
            self.options.base_url.as_deref(),
            self.templates.as_ref(),
            tocs,
            &self.options.site_title,
        )
    }
}

/// Collect slash-separated paths of every file under `dir`, relative to `root`.
///
/// Entries are visited in name order, depth first. Hidden entries are skipped.
fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), BuildError> {
    let mut entries = fs::read_dir(dir)
        .map_err(BuildError::io(dir))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(BuildError::io(dir))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map_err(BuildError::io(&path))?
            .is_dir();
        if is_dir {
            walk(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(path_to_slashes(relative));
        }
    }

    Ok(())
}
