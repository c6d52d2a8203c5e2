//! Per-conversion environment.
//!
//! Everything a [`Convertor`](crate::Convertor) may consult while producing
//! one file: registry lookups, the URL resolver bound to the build's base
//! URL, the navigation as seen from the file being rendered, page outlines
//! and template rendering.

use std::collections::HashMap;

use serde::Serialize;

use crate::convertor::{ConvertError, TemplateRenderer};
use crate::file::File;
use crate::nav::{ActiveNav, NavId, NavTree};
use crate::registry::FileRegistry;
use crate::toc::TableOfContents;
use crate::url::{ResolveError, UrlResolver, join_base, relative_path};

/// Navigation entry prepared for templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItemContext {
    /// Display title.
    pub title: String,
    /// Link from the current page, `None` for groups.
    pub url: Option<String>,
    /// True for pages.
    pub is_page: bool,
    /// True for the current page and the groups containing it.
    pub is_active: bool,
    /// Nested entries of a group.
    pub children: Vec<NavItemContext>,
}

/// Link to a neighbouring page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// Nav title.
    pub title: String,
    /// Link from the current page.
    pub url: String,
}

/// The current page as placed in the navigation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Nav title.
    pub title: String,
    /// Link to itself.
    pub url: String,
    /// Preceding page in document order.
    pub previous: Option<PageLink>,
    /// Following page in document order.
    pub next: Option<PageLink>,
}

/// Services available to a convertor while it handles one file.
pub struct Environment<'a> {
    registry: &'a FileRegistry,
    active: ActiveNav<'a>,
    resolver: UrlResolver<'a>,
    templates: &'a dyn TemplateRenderer,
    tocs: &'a HashMap<String, TableOfContents>,
    site_title: &'a str,
}

impl<'a> Environment<'a> {
    /// Create the environment for converting `file`.
    pub fn new(
        file: &'a File,
        registry: &'a FileRegistry,
        nav: &'a NavTree,
        base_url: Option<&'a str>,
        templates: &'a dyn TemplateRenderer,
        tocs: &'a HashMap<String, TableOfContents>,
        site_title: &'a str,
    ) -> Self {
        Self {
            registry,
            active: nav.activate(file),
            resolver: UrlResolver::new(registry, base_url),
            templates,
            tocs,
            site_title,
        }
    }

    /// File being converted.
    pub fn file(&self) -> &'a File {
        self.active.file()
    }

    /// Every file of the build.
    pub fn registry(&self) -> &'a FileRegistry {
        self.registry
    }

    /// Navigation tree.
    pub fn nav(&self) -> &'a NavTree {
        self.active.tree()
    }

    /// Navigation as seen from the file being converted.
    pub fn active_nav(&self) -> &ActiveNav<'a> {
        &self.active
    }

    /// Resolver bound to the build's base URL.
    pub fn resolver(&self) -> UrlResolver<'a> {
        self.resolver
    }

    /// Site title from configuration.
    pub fn site_title(&self) -> &'a str {
        self.site_title
    }

    /// Resolve `hyperlink` as written in `from`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the link names no registered file.
    pub fn resolve(&self, hyperlink: &str, from: &File) -> Result<String, ResolveError> {
        self.resolver.resolve(hyperlink, from)
    }

    /// URL of `target` as seen from the file being converted.
    pub fn file_url(&self, target: &File) -> String {
        self.resolver.file_url(target, self.file())
    }

    /// URL of the site root as seen from the file being converted.
    ///
    /// Always ends with `/`, so output paths can be appended directly.
    pub fn root_url(&self) -> String {
        if let Some(base) = self.resolver.base_url() {
            return join_base(base, "/");
        }
        match relative_path(&self.file().url(), "/").trim_end_matches('/') {
            "." => "./".to_owned(),
            path => format!("{path}/"),
        }
    }

    /// Outline collected for `file`, if its convertor produced one.
    pub fn toc(&self, file: &File) -> Option<&'a TableOfContents> {
        self.tocs.get(file.output_path())
    }

    /// Render a template.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Template`] if rendering fails.
    pub fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, ConvertError> {
        self.templates.render(name, context)
    }

    /// Navigation prepared for templates.
    pub fn nav_items(&self) -> Vec<NavItemContext> {
        self.items(self.nav().roots())
    }

    fn items(&self, ids: &[NavId]) -> Vec<NavItemContext> {
        ids.iter()
            .map(|&id| {
                let node = self.nav().node(id);
                NavItemContext {
                    title: node.title().to_owned(),
                    url: self.active.url_for(id, &self.resolver),
                    is_page: node.is_page(),
                    is_active: self.active.is_active(id),
                    children: self.items(node.children()),
                }
            })
            .collect()
    }

    /// The current page within the navigation, if it has an entry.
    pub fn page_context(&self) -> Option<PageContext> {
        let id = self.active.page()?;
        let link = |id: NavId| {
            Some(PageLink {
                title: self.nav().node(id).title().to_owned(),
                url: self.active.url_for(id, &self.resolver)?,
            })
        };
        let current = link(id)?;

        Some(PageContext {
            title: current.title,
            url: current.url,
            previous: self.active.previous().and_then(link),
            next: self.active.next().and_then(link),
        })
    }

    /// End the conversion of this file.
    pub fn deactivate(self) {
        self.active.deactivate();
    }
}
