//! Per-page heading outline.

use serde::Serialize;

/// A heading and the headings nested beneath it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Anchor id.
    pub id: String,
    /// Heading text.
    pub name: String,
    /// Heading level (1-6).
    pub level: u8,
    /// Nested headings.
    pub children: Vec<Header>,
}

impl Header {
    /// Create a heading with no children.
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            children: Vec::new(),
        }
    }
}

/// Nested outline of a page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    /// Top-level headings.
    pub headers: Vec<Header>,
}

impl TableOfContents {
    /// Nest headings given in document order.
    ///
    /// A heading becomes a child of the closest preceding heading with a
    /// lower level. Skipped levels nest directly (an h4 after an h2 is the
    /// h2's child).
    pub fn from_flat(headers: impl IntoIterator<Item = Header>) -> Self {
        let mut roots: Vec<Header> = Vec::new();
        // Open headings from the outermost to the innermost
        let mut stack: Vec<Header> = Vec::new();

        for header in headers {
            while stack.last().is_some_and(|open| open.level >= header.level) {
                close(&mut stack, &mut roots);
            }
            stack.push(header);
        }
        while !stack.is_empty() {
            close(&mut stack, &mut roots);
        }

        Self { headers: roots }
    }

    /// True if the page has no headings.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

fn close(stack: &mut Vec<Header>, roots: &mut Vec<Header>) {
    if let Some(done) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}
