//! Markdown renderer with link rewriting.

use pulldown_cmark::{CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd, html};

use crate::heading::{Headings, TocEntry};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Text of the first H1 heading.
    pub title: Option<String>,
    /// Every heading in document order.
    pub toc: Vec<TocEntry>,
}

/// Heading whose events are still being collected.
struct OpenHeading<'a> {
    level: HeadingLevel,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    /// Position of the placeholder start event in the output.
    start: usize,
    text: String,
}

/// Markdown to HTML renderer.
///
/// Stateless between calls; one renderer can render any number of pages.
#[derive(Clone, Copy, Debug)]
pub struct MarkdownRenderer {
    gfm: bool,
    permalinks: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with GFM enabled and permalinks disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            permalinks: false,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Append a `¶` anchor linking to each heading.
    #[must_use]
    pub fn with_permalinks(mut self, enabled: bool) -> Self {
        self.permalinks = enabled;
        self
    }

    /// Parser options for the configured features.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render `markdown`, passing every link and image target through `link`.
    ///
    /// Email autolinks are left alone.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `link`.
    pub fn render<F, E>(&self, markdown: &str, mut link: F) -> Result<RenderResult, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let mut headings = Headings::default();
        let mut open: Option<OpenHeading<'_>> = None;
        let mut events: Vec<Event<'_>> = Vec::new();

        for event in Parser::new_ext(markdown, self.parser_options()) {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    classes,
                    attrs,
                    ..
                }) => {
                    open = Some(OpenHeading {
                        level,
                        classes,
                        attrs,
                        start: events.len(),
                        text: String::new(),
                    });
                    // Replaced once the heading text, and so its id, is known
                    events.push(Event::SoftBreak);
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(heading) = open.take() {
                        let id = headings.complete(heading.level, &heading.text);
                        if self.permalinks {
                            events.push(Event::Html(
                                format!(
                                    r##"<a class="headerlink" href="#{id}" title="Permanent link">¶</a>"##
                                )
                                .into(),
                            ));
                        }
                        events[heading.start] = Event::Start(Tag::Heading {
                            level: heading.level,
                            id: Some(id.into()),
                            classes: heading.classes,
                            attrs: heading.attrs,
                        });
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                Event::Text(ref text) | Event::Code(ref text) => {
                    if let Some(heading) = open.as_mut() {
                        heading.text.push_str(text);
                    }
                    events.push(event);
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let dest_url = if link_type == LinkType::Email {
                        dest_url
                    } else {
                        link(&dest_url)?.into()
                    };
                    events.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url: link(&dest_url)?.into(),
                        title,
                        id,
                    }));
                }
                other => events.push(other),
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());

        let (title, toc) = headings.finish();
        Ok(RenderResult {
            html: output,
            title,
            toc,
        })
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use pretty_assertions::assert_eq;

    use super::*;

    fn render(markdown: &str) -> RenderResult {
        MarkdownRenderer::new()
            .render(markdown, |url| Ok::<_, Infallible>(url.to_owned()))
            .unwrap()
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render("Hello, world!").html.trim(), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_id() {
        let result = render("## Section Title");

        assert_eq!(
            result.html.trim(),
            r#"<h2 id="section-title">Section Title</h2>"#
        );
        assert_eq!(
            result.toc,
            vec![TocEntry {
                level: 2,
                title: "Section Title".to_owned(),
                id: "section-title".to_owned(),
            }]
        );
    }

    #[test]
    fn test_title_from_first_h1() {
        let result = render("# My Title\n\nSome content\n\n## Section\n\n# Other");

        assert_eq!(result.title.as_deref(), Some("My Title"));
        assert!(result.html.contains(r#"<h1 id="my-title">My Title</h1>"#));
        assert_eq!(result.toc.len(), 3);
    }

    #[test]
    fn test_no_title_without_h1() {
        assert_eq!(render("## Only a section").title, None);
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render("## FAQ\n\n## FAQ\n\n## FAQ");

        let ids: Vec<_> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
        assert!(result.html.contains(r#"<h2 id="faq-2">"#));
    }

    #[test]
    fn test_heading_ids_unique_when_slug_matches_suffix() {
        let result = render("## FAQ\n\n## FAQ\n\n## FAQ 1\n");

        let ids: Vec<_> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-1-1"]);
        assert!(result.html.contains(r#"<h2 id="faq-1-1">FAQ 1</h2>"#));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `npm`");

        assert!(result.html.contains("<code>npm</code>"));
        assert_eq!(result.toc[0].title, "Install npm");
        assert_eq!(result.toc[0].id, "install-npm");
    }

    #[test]
    fn test_permalinks() {
        let result = MarkdownRenderer::new()
            .with_permalinks(true)
            .render("## Usage", |url| Ok::<_, Infallible>(url.to_owned()))
            .unwrap();

        assert_eq!(
            result.html.trim(),
            r##"<h2 id="usage">Usage<a class="headerlink" href="#usage" title="Permanent link">¶</a></h2>"##
        );
    }

    #[test]
    fn test_links_and_images_rewritten() {
        let result = MarkdownRenderer::new()
            .render(
                "[Guide](guide.md#setup) ![Logo](img/logo.png \"Logo\")",
                |url| Ok::<_, Infallible>(format!("/x/{url}")),
            )
            .unwrap();

        assert!(result.html.contains(r##"href="/x/guide.md#setup""##));
        assert!(result.html.contains(r#"src="/x/img/logo.png""#));
        assert!(result.html.contains(r#"title="Logo""#));
    }

    #[test]
    fn test_reference_links_rewritten() {
        let result = MarkdownRenderer::new()
            .render("[Guide][g]\n\n[g]: guide.md", |url| {
                Ok::<_, Infallible>(url.replace(".md", "/"))
            })
            .unwrap();

        assert!(result.html.contains(r#"href="guide/""#));
    }

    #[test]
    fn test_email_autolink_untouched() {
        let mut seen = Vec::new();
        let result = MarkdownRenderer::new()
            .render("<team@example.com> <https://example.com>", |url| {
                seen.push(url.to_owned());
                Ok::<_, Infallible>(url.to_owned())
            })
            .unwrap();

        assert_eq!(seen, vec!["https://example.com"]);
        assert!(result.html.contains(r#"href="mailto:team@example.com""#));
    }

    #[test]
    fn test_link_error_propagates() {
        let result = MarkdownRenderer::new().render("[a](ok.md) [b](missing.md)", |url| {
            if url == "missing.md" {
                Err(format!("unresolved {url}"))
            } else {
                Ok(url.to_owned())
            }
        });

        assert_eq!(result.unwrap_err(), "unresolved missing.md");
    }

    #[test]
    fn test_gfm_toggle() {
        let table = "| a | b |\n|---|---|\n| 1 | 2 |";

        assert!(render(table).html.contains("<table>"));

        let plain = MarkdownRenderer::new()
            .with_gfm(false)
            .render(table, |url| Ok::<_, Infallible>(url.to_owned()))
            .unwrap();
        assert!(!plain.html.contains("<table>"));
    }

    #[test]
    fn test_task_list() {
        let result = render("- [x] done\n- [ ] todo");

        assert!(result.html.contains(r#"type="checkbox""#));
    }
}
