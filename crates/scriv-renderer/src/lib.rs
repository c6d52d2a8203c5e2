//! Markdown rendering for scriv pages.
//!
//! [`MarkdownRenderer`] turns markdown into HTML with pulldown-cmark while
//! doing the two things a documentation page needs beyond plain rendering:
//!
//! - every link and image target is passed through a caller-supplied
//!   function, so links between source documents can be rewritten to the
//!   URLs of the generated pages
//! - headings get unique anchor ids and are collected into a flat outline
//!
//! # Example
//!
//! ```
//! use scriv_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new()
//!     .render("# Hello\n\nSee [the guide](guide.md).", |url| {
//!         Ok::<_, std::convert::Infallible>(url.replace(".md", "/"))
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains(r#"href="guide/""#));
//! ```

mod heading;
mod renderer;

pub use heading::{TocEntry, slugify};
pub use renderer::{MarkdownRenderer, RenderResult};
