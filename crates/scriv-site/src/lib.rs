//! File, navigation and URL core of scriv.
//!
//! This crate provides:
//! - [`File`] and [`FileRegistry`]: every source-to-output mapping of a build
//! - [`NavTree`]: the configured navigation, cross-linked to files
//! - [`UrlResolver`]: rewriting of hyperlinks written in source documents
//! - [`SiteBuilder`]: the gather, plan and convert passes
//!
//! Content handling is delegated to [`Convertor`] implementations, which
//! receive an [`Environment`] for each file they convert.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use scriv_site::{BuildOptions, Convertor, SiteBuilder, TemplateRenderer};
//!
//! # fn convertors() -> Vec<Arc<dyn Convertor>> { Vec::new() }
//! # fn templates() -> Arc<dyn TemplateRenderer> { unimplemented!() }
//! let options = BuildOptions::new("docs", "site");
//! let summary = SiteBuilder::new(options, convertors(), templates()).build()?;
//! println!("{} files", summary.files);
//! # Ok(())
//! # }
//! ```

mod builder;
mod convertor;
mod env;
mod file;
mod nav;
mod registry;
#[cfg(test)]
mod test_support;
mod toc;
mod url;

pub use builder::{BuildError, BuildOptions, BuildSummary, SiteBuilder, SitePlan};
pub use convertor::{ConvertError, Convertor, TemplateRenderer};
pub use env::{Environment, NavItemContext, PageContext, PageLink};
pub use file::{File, SiteLayout};
pub use nav::{ActiveNav, NavError, NavId, NavKind, NavNode, NavTree};
pub use registry::{FileRegistry, LookupError, RegistryError};
pub use toc::{Header, TableOfContents};
pub use url::{ResolveError, UrlResolver, relative_path};
