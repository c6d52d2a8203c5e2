//! Site navigation tree.
//!
//! Built from the configured `[nav]` entries and cross-linked to files in the
//! [`FileRegistry`]. The tree is immutable once built.
//!
//! # Architecture
//!
//! Nodes are stored in a flat `Vec<NavNode>` with parent links tracked by
//! [`NavId`] indices. This provides:
//! - O(d) ancestor walks where d is the node depth
//! - O(1) page lookup by output path
//! - O(1) previous/next lookup through the flattened page order
//!
//! # Activation
//!
//! The page currently being rendered is not a flag on the tree. Instead,
//! [`NavTree::activate`] returns an [`ActiveNav`] view holding the path from
//! that page up to its root. Each conversion gets its own view, so no state
//! is shared between conversions and nothing has to be reset afterwards.

use std::collections::HashMap;

use scriv_config::{NavEntry, NavTarget};

use crate::file::File;
use crate::registry::FileRegistry;
use crate::url::UrlResolver;

/// Navigation error.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// A nav entry points at an input path not present in the registry.
    #[error("nav entry '{title}' points to missing file '{path}'")]
    BrokenReference {
        /// Entry title.
        title: String,
        /// Configured input path.
        path: String,
    },
}

/// Index of a node within a [`NavTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NavId(usize);

/// Node payload.
#[derive(Debug)]
pub enum NavKind {
    /// Menu group with ordered children.
    Group {
        /// Child node ids in document order.
        children: Vec<NavId>,
    },
    /// Link to a page.
    Page {
        /// File the page renders.
        file: File,
    },
}

/// A node in the navigation tree.
#[derive(Debug)]
pub struct NavNode {
    title: String,
    kind: NavKind,
    parent: Option<NavId>,
}

impl NavNode {
    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Node payload.
    pub fn kind(&self) -> &NavKind {
        &self.kind
    }

    /// Parent group, `None` for top-level nodes.
    pub fn parent(&self) -> Option<NavId> {
        self.parent
    }

    /// True for page nodes.
    pub fn is_page(&self) -> bool {
        matches!(self.kind, NavKind::Page { .. })
    }

    /// File of a page node.
    pub fn file(&self) -> Option<&File> {
        match &self.kind {
            NavKind::Page { file } => Some(file),
            NavKind::Group { .. } => None,
        }
    }

    /// Children of a group node, empty for pages.
    pub fn children(&self) -> &[NavId] {
        match &self.kind {
            NavKind::Group { children } => children,
            NavKind::Page { .. } => &[],
        }
    }
}

/// Ordered forest of navigation groups and pages.
#[derive(Debug, Default)]
pub struct NavTree {
    nodes: Vec<NavNode>,
    roots: Vec<NavId>,
    pages: Vec<NavId>,
    page_positions: HashMap<NavId, usize>,
    by_output_path: HashMap<String, NavId>,
}

impl NavTree {
    /// Build the tree from configured entries.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::BrokenReference`] if an entry names an input path
    /// that is not in `registry`.
    pub fn build(entries: &[NavEntry], registry: &FileRegistry) -> Result<Self, NavError> {
        let mut tree = Self::default();
        tree.roots = tree.add_entries(entries, registry)?;
        tree.index_pages();

        tracing::debug!(
            nodes = tree.nodes.len(),
            pages = tree.pages.len(),
            "Navigation built"
        );

        Ok(tree)
    }

    /// Add entries at one level and return their ids.
    ///
    /// Group children are created before the group itself, and get their
    /// parent link when the group is pushed.
    fn add_entries(
        &mut self,
        entries: &[NavEntry],
        registry: &FileRegistry,
    ) -> Result<Vec<NavId>, NavError> {
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let kind = match &entry.target {
                NavTarget::Page(path) => {
                    let file = registry.get_by_input_path(path).map_err(|_| {
                        NavError::BrokenReference {
                            title: entry.title.clone(),
                            path: path.clone(),
                        }
                    })?;
                    NavKind::Page { file: file.clone() }
                }
                NavTarget::Group(children) => NavKind::Group {
                    children: self.add_entries(children, registry)?,
                },
            };
            ids.push(self.push_node(entry.title.clone(), kind));
        }
        Ok(ids)
    }

    fn push_node(&mut self, title: String, kind: NavKind) -> NavId {
        let id = NavId(self.nodes.len());
        if let NavKind::Group { children } = &kind {
            for &child in children {
                self.nodes[child.0].parent = Some(id);
            }
        }
        self.nodes.push(NavNode {
            title,
            kind,
            parent: None,
        });
        id
    }

    /// Flatten pages in document order and index them.
    fn index_pages(&mut self) {
        fn walk(tree: &NavTree, id: NavId, out: &mut Vec<NavId>) {
            match &tree.nodes[id.0].kind {
                NavKind::Page { .. } => out.push(id),
                NavKind::Group { children } => {
                    for &child in children {
                        walk(tree, child, out);
                    }
                }
            }
        }

        let mut pages = Vec::new();
        for &root in &self.roots {
            walk(self, root, &mut pages);
        }

        for (position, &id) in pages.iter().enumerate() {
            self.page_positions.insert(id, position);
            if let Some(file) = self.nodes[id.0].file() {
                // First nav entry for a file is the one that gets activated
                self.by_output_path
                    .entry(file.output_path().to_owned())
                    .or_insert(id);
            }
        }
        self.pages = pages;
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another tree.
    pub fn node(&self, id: NavId) -> &NavNode {
        &self.nodes[id.0]
    }

    /// Top-level node ids.
    pub fn roots(&self) -> &[NavId] {
        &self.roots
    }

    /// All page ids in document order.
    pub fn pages(&self) -> &[NavId] {
        &self.pages
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// True if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Page preceding `id` in document order.
    pub fn previous(&self, id: NavId) -> Option<NavId> {
        let position = *self.page_positions.get(&id)?;
        position.checked_sub(1).map(|p| self.pages[p])
    }

    /// Page following `id` in document order.
    pub fn next(&self, id: NavId) -> Option<NavId> {
        let position = *self.page_positions.get(&id)?;
        self.pages.get(position + 1).copied()
    }

    /// Nav page rendering `file`, if any.
    pub fn page_for(&self, file: &File) -> Option<NavId> {
        self.by_output_path.get(file.output_path()).copied()
    }

    /// Ids from `id` up to its root, starting with `id`.
    pub fn ancestors(&self, id: NavId) -> impl Iterator<Item = NavId> + '_ {
        std::iter::successors(Some(id), |&current| self.nodes[current.0].parent)
    }

    /// Mark `file` as the page being rendered.
    ///
    /// The returned view answers [`ActiveNav::is_active`] for the page and
    /// every group above it. Files without a nav entry produce a view where
    /// nothing is active.
    pub fn activate<'a>(&'a self, file: &'a File) -> ActiveNav<'a> {
        let page = self.page_for(file);
        let path = page
            .map(|id| self.ancestors(id).collect())
            .unwrap_or_default();
        ActiveNav {
            tree: self,
            file,
            page,
            path,
        }
    }
}

/// Navigation as seen while one page is being rendered.
#[derive(Debug)]
pub struct ActiveNav<'a> {
    tree: &'a NavTree,
    file: &'a File,
    page: Option<NavId>,
    path: Vec<NavId>,
}

impl<'a> ActiveNav<'a> {
    /// The tree this view belongs to.
    pub fn tree(&self) -> &'a NavTree {
        self.tree
    }

    /// File being rendered.
    pub fn file(&self) -> &'a File {
        self.file
    }

    /// Active page, if the file being rendered is in the nav.
    pub fn page(&self) -> Option<NavId> {
        self.page
    }

    /// True if `id` is the active page or one of its ancestors.
    pub fn is_active(&self, id: NavId) -> bool {
        self.path.contains(&id)
    }

    /// Active path from the page up to its root.
    pub fn path(&self) -> &[NavId] {
        &self.path
    }

    /// Page before the active page.
    pub fn previous(&self) -> Option<NavId> {
        self.page.and_then(|id| self.tree.previous(id))
    }

    /// Page after the active page.
    pub fn next(&self) -> Option<NavId> {
        self.page.and_then(|id| self.tree.next(id))
    }

    /// Link to page `id` from the file being rendered.
    ///
    /// The active page links to itself as `.`. Returns `None` for groups.
    pub fn url_for(&self, id: NavId, resolver: &UrlResolver<'_>) -> Option<String> {
        let target = self.tree.node(id).file()?;
        Some(resolver.file_url(target, self.file))
    }

    /// End the activation.
    pub fn deactivate(self) {
        if let Some(id) = self.page {
            tracing::trace!(page = %self.tree.node(id).title(), "Deactivated");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{page, topics_registry};

    fn topics_nav() -> Vec<NavEntry> {
        vec![
            NavEntry::page("Home", "index.md"),
            NavEntry::group(
                "Topics",
                vec![
                    NavEntry::page("Topic A", "topics/a.md"),
                    NavEntry::page("Topic B", "topics/b.md"),
                ],
            ),
        ]
    }

    fn titles(tree: &NavTree, ids: &[NavId]) -> Vec<String> {
        ids.iter().map(|&id| tree.node(id).title().to_owned()).collect()
    }

    #[test]
    fn test_build_structure() {
        let registry = topics_registry();
        let tree = NavTree::build(&topics_nav(), &registry).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(titles(&tree, tree.roots()), vec!["Home", "Topics"]);

        let home = tree.roots()[0];
        let topics = tree.roots()[1];
        assert!(tree.node(home).is_page());
        assert_eq!(
            tree.node(home).file().unwrap(),
            registry.get_by_input_path("index.md").unwrap()
        );
        assert!(!tree.node(topics).is_page());
        assert_eq!(
            titles(&tree, tree.node(topics).children()),
            vec!["Topic A", "Topic B"]
        );
    }

    #[test]
    fn test_parent_links() {
        let tree = NavTree::build(&topics_nav(), &topics_registry()).unwrap();
        let home = tree.roots()[0];
        let topics = tree.roots()[1];
        let topic_a = tree.node(topics).children()[0];
        let topic_b = tree.node(topics).children()[1];

        assert_eq!(tree.node(home).parent(), None);
        assert_eq!(tree.node(topics).parent(), None);
        assert_eq!(tree.node(topic_a).parent(), Some(topics));
        assert_eq!(tree.node(topic_b).parent(), Some(topics));
    }

    #[test]
    fn test_broken_reference() {
        let entries = vec![NavEntry::group(
            "Guide",
            vec![NavEntry::page("Missing", "guide/missing.md")],
        )];

        let err = NavTree::build(&entries, &topics_registry()).unwrap_err();

        let NavError::BrokenReference { title, path } = err;
        assert_eq!(title, "Missing");
        assert_eq!(path, "guide/missing.md");
    }

    #[test]
    fn test_pages_flattened_with_previous_next() {
        let tree = NavTree::build(&topics_nav(), &topics_registry()).unwrap();
        let pages = tree.pages();

        assert_eq!(titles(&tree, pages), vec!["Home", "Topic A", "Topic B"]);
        assert_eq!(tree.previous(pages[0]), None);
        assert_eq!(tree.next(pages[0]), Some(pages[1]));
        assert_eq!(tree.previous(pages[1]), Some(pages[0]));
        assert_eq!(tree.next(pages[1]), Some(pages[2]));
        assert_eq!(tree.next(pages[2]), None);
        // Groups are not part of the page sequence
        assert_eq!(tree.next(tree.roots()[1]), None);
    }

    #[test]
    fn test_empty_nav() {
        let tree = NavTree::build(&[], &topics_registry()).unwrap();

        assert!(tree.is_empty());
        assert!(tree.pages().is_empty());
    }

    #[test]
    fn test_activate_page_and_ancestors() {
        let registry = topics_registry();
        let tree = NavTree::build(&topics_nav(), &registry).unwrap();
        let home = tree.roots()[0];
        let topics = tree.roots()[1];
        let topic_a = tree.node(topics).children()[0];
        let topic_b = tree.node(topics).children()[1];

        let active = tree.activate(registry.get_by_input_path("index.md").unwrap());
        assert!(active.is_active(home));
        assert!(!active.is_active(topics));
        assert!(!active.is_active(topic_a));
        active.deactivate();

        let active = tree.activate(registry.get_by_input_path("topics/a.md").unwrap());
        assert!(!active.is_active(home));
        assert!(active.is_active(topics));
        assert!(active.is_active(topic_a));
        assert!(!active.is_active(topic_b));
        assert_eq!(active.path(), &[topic_a, topics]);
        assert_eq!(active.previous(), Some(home));
        assert_eq!(active.next(), Some(topic_b));
        active.deactivate();

        let active = tree.activate(registry.get_by_input_path("topics/b.md").unwrap());
        assert!(!active.is_active(home));
        assert!(active.is_active(topics));
        assert!(!active.is_active(topic_a));
        assert!(active.is_active(topic_b));
        active.deactivate();
    }

    #[test]
    fn test_activation_leaves_no_residue() {
        let registry = topics_registry();
        let tree = NavTree::build(&topics_nav(), &registry).unwrap();
        let a = registry.get_by_input_path("topics/a.md").unwrap();
        let b = registry.get_by_input_path("topics/b.md").unwrap();

        tree.activate(a).deactivate();
        let active_b = tree.activate(b);

        let topic_a = tree.node(tree.roots()[1]).children()[0];
        assert!(!active_b.is_active(topic_a));
        // Views are independent: two can coexist without interfering
        let active_a = tree.activate(a);
        assert!(active_a.is_active(topic_a));
        assert!(!active_b.is_active(topic_a));
    }

    #[test]
    fn test_activate_file_outside_nav() {
        let mut registry = topics_registry();
        registry.append(page("img/logo.png", "img/logo.png")).unwrap();
        let tree = NavTree::build(&topics_nav(), &registry).unwrap();

        let active = tree.activate(registry.get_by_input_path("img/logo.png").unwrap());

        assert_eq!(active.page(), None);
        assert!(active.path().is_empty());
        assert!(tree.pages().iter().all(|&id| !active.is_active(id)));
        assert_eq!(active.previous(), None);
        assert_eq!(active.next(), None);
    }

    #[test]
    fn test_url_for_relative_to_active_file() {
        let registry = topics_registry();
        let tree = NavTree::build(&topics_nav(), &registry).unwrap();
        let pages = tree.pages().to_vec();
        let resolver = UrlResolver::new(&registry, None);

        let active = tree.activate(registry.get_by_input_path("topics/a.md").unwrap());
        let urls: Vec<_> = pages
            .iter()
            .map(|&id| active.url_for(id, &resolver).unwrap())
            .collect();
        assert_eq!(urls, vec!["../../", ".", "../b/"]);
        assert_eq!(active.url_for(tree.roots()[1], &resolver), None);

        let absolute = UrlResolver::new(&registry, Some("https://example.com"));
        assert_eq!(
            active.url_for(pages[2], &absolute).unwrap(),
            "https://example.com/topics/b/"
        );
    }

    #[test]
    fn test_ancestors() {
        let entries = vec![NavEntry::group(
            "Outer",
            vec![NavEntry::group(
                "Inner",
                vec![NavEntry::page("Deep", "topics/a.md")],
            )],
        )];
        let tree = NavTree::build(&entries, &topics_registry()).unwrap();
        let deep = tree.pages()[0];

        let chain: Vec<_> = tree.ancestors(deep).collect();

        assert_eq!(titles(&tree, &chain), vec!["Deep", "Inner", "Outer"]);
    }
}
