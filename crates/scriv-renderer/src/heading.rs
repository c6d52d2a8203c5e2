//! Heading anchors and outline collection.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::HeadingLevel;

/// Outline entry for one heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

/// Assigns unique ids to headings and records the outline.
#[derive(Debug, Default)]
pub(crate) struct Headings {
    title: Option<String>,
    toc: Vec<TocEntry>,
    id_counts: HashMap<String, usize>,
    used_ids: HashSet<String>,
}

impl Headings {
    /// Record a completed heading and return its anchor id.
    ///
    /// The first H1 also becomes the page title.
    pub(crate) fn complete(&mut self, level: HeadingLevel, text: &str) -> String {
        let level = heading_level_to_num(level);
        let title = text.trim();
        let id = self.unique_id(title);

        if level == 1 && self.title.is_none() {
            self.title = Some(title.to_owned());
        }
        self.toc.push(TocEntry {
            level,
            title: title.to_owned(),
            id: id.clone(),
        });

        id
    }

    /// Consume the state, returning the title and outline.
    pub(crate) fn finish(self) -> (Option<String>, Vec<TocEntry>) {
        (self.title, self.toc)
    }

    fn unique_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("section");
        }
        // A suffixed id may collide with another heading's own slug
        let mut suffix = self.id_counts.get(&base).copied().unwrap_or(0);
        let mut id = base.clone();
        while self.used_ids.contains(&id) {
            suffix += 1;
            id = format!("{base}-{suffix}");
        }
        self.id_counts.insert(base, suffix);
        self.used_ids.insert(id.clone());
        id
    }
}

/// Convert text to a URL-safe slug.
///
/// Lowercases ASCII letters and digits, collapses whitespace, dashes and
/// underscores to single dashes, and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  API_reference -- v2 "), "api-reference-v2");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("¿¡!"), "");
    }

    #[test]
    fn test_unique_ids() {
        let mut headings = Headings::default();

        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ"), "faq");
        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ"), "faq-1");
        assert_eq!(headings.complete(HeadingLevel::H3, "!!!"), "section");
        assert_eq!(headings.complete(HeadingLevel::H3, "???"), "section-1");
    }

    #[test]
    fn test_suffixed_id_never_repeats_a_slug() {
        let mut headings = Headings::default();

        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ"), "faq");
        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ"), "faq-1");
        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ 1"), "faq-1-1");
        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ"), "faq-2");
    }

    #[test]
    fn test_own_slug_taken_by_earlier_suffix() {
        let mut headings = Headings::default();

        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ 1"), "faq-1");
        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ"), "faq");
        assert_eq!(headings.complete(HeadingLevel::H2, "FAQ"), "faq-2");
    }

    #[test]
    fn test_first_h1_is_title() {
        let mut headings = Headings::default();
        headings.complete(HeadingLevel::H2, "Intro");
        headings.complete(HeadingLevel::H1, " Title ");
        headings.complete(HeadingLevel::H1, "Second");

        let (title, toc) = headings.finish();

        assert_eq!(title.as_deref(), Some("Title"));
        assert_eq!(toc.len(), 3);
        assert_eq!(toc[1].level, 1);
        assert_eq!(toc[1].title, "Title");
    }
}
