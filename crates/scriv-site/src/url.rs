//! Hyperlink resolution.
//!
//! Turns a link written in a source document into the URL the generated
//! page should contain. Local links are looked up in the [`FileRegistry`]
//! and then formatted either relative to the referencing page or absolute
//! against a base URL. External links, pure fragments and pure queries pass
//! through untouched.
//!
//! Resolution only reads the registry, so one resolver can serve any number
//! of concurrent conversions.

use percent_encoding::percent_decode_str;

use crate::file::File;
use crate::registry::{FileRegistry, LookupError};

/// A hyperlink whose target is not part of the site.
#[derive(Debug, thiserror::Error)]
#[error("unresolved reference '{reference}' in {from}")]
pub struct ResolveError {
    /// Hyperlink as written.
    pub reference: String,
    /// Origin of the referencing file.
    pub from: String,
    /// Failed lookup.
    #[source]
    pub source: LookupError,
}

/// Components of a hyperlink.
#[derive(Debug, Default, PartialEq, Eq)]
struct Hyperlink<'a> {
    scheme: &'a str,
    netloc: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> Hyperlink<'a> {
    fn parse(link: &'a str) -> Self {
        let (rest, fragment) = match link.split_once('#') {
            Some((rest, fragment)) => (rest, non_empty(fragment)),
            None => (link, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, non_empty(query)),
            None => (rest, None),
        };
        let (scheme, rest) = split_scheme(rest);
        let (netloc, path) = match rest.strip_prefix("//") {
            Some(authority) => authority.split_at(authority.find('/').unwrap_or(authority.len())),
            None => ("", rest),
        };

        Self {
            scheme,
            netloc,
            path,
            query,
            fragment,
        }
    }

    fn is_external(&self) -> bool {
        !self.scheme.is_empty() || !self.netloc.is_empty()
    }

    /// Append the query and fragment of this link to `path`.
    fn with_suffix(&self, mut path: String) -> String {
        if let Some(query) = self.query {
            path.push('?');
            path.push_str(query);
        }
        if let Some(fragment) = self.fragment {
            path.push('#');
            path.push_str(fragment);
        }
        path
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Split `scheme:` off the front of a link (RFC 3986 scheme characters).
fn split_scheme(link: &str) -> (&str, &str) {
    if let Some((scheme, rest)) = link.split_once(':') {
        let mut chars = scheme.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            return (scheme, rest);
        }
    }
    ("", link)
}

/// Resolves hyperlinks against a registry.
#[derive(Clone, Copy, Debug)]
pub struct UrlResolver<'a> {
    registry: &'a FileRegistry,
    base_url: Option<&'a str>,
}

impl<'a> UrlResolver<'a> {
    /// Create a resolver. Without `base_url` every local link is relative.
    pub fn new(registry: &'a FileRegistry, base_url: Option<&'a str>) -> Self {
        Self { registry, base_url }
    }

    /// Base URL links are made absolute against.
    pub fn base_url(&self) -> Option<&'a str> {
        self.base_url
    }

    /// Resolve `hyperlink` as written in `from`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if a local link names no registered file.
    pub fn resolve(&self, hyperlink: &str, from: &File) -> Result<String, ResolveError> {
        let link = Hyperlink::parse(hyperlink);
        if link.is_external() || link.path.is_empty() {
            return Ok(hyperlink.to_owned());
        }

        let target = self.lookup(link.path, from).map_err(|source| ResolveError {
            reference: hyperlink.to_owned(),
            from: from.origin().to_owned(),
            source,
        })?;

        Ok(link.with_suffix(self.file_url(target, from)))
    }

    /// URL of `target` as seen from `from`.
    pub fn file_url(&self, target: &File, from: &File) -> String {
        let target_url = target.url();
        if let Some(base) = self.base_url {
            return join_base(base, &target_url);
        }

        let from_url = from.url();
        if target_url == from_url {
            return ".".to_owned();
        }
        let mut path = relative_path(&from_url, &target_url);
        if target_url.ends_with('/') && !path.ends_with('/') && path != "." {
            path.push('/');
        }
        path
    }

    fn lookup(&self, path: &str, from: &File) -> Result<&'a File, LookupError> {
        let decoded = percent_decode_str(path).decode_utf8_lossy();

        if decoded.starts_with('/') {
            // Built URL first, then a source path written from the input root
            return self
                .registry
                .get_by_url(&decoded)
                .or_else(|err| {
                    self.registry
                        .get_by_input_path(decoded.trim_start_matches('/'))
                        .map_err(|_| err)
                });
        }

        let base = from.input_path().rsplit_once('/').map_or("", |(dir, _)| dir);
        let joined = join_relative(base, &decoded)
            .ok_or_else(|| LookupError::InputPath(decoded.clone().into_owned()))?;
        self.registry.get_by_input_path(&joined)
    }
}

/// Join `relative` onto directory `base`, collapsing `.` and `..`.
///
/// Returns `None` if `..` climbs above the root.
fn join_relative(base: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(component),
        }
    }
    Some(segments.join("/"))
}

/// Treat `base` as the site root and append the root-relative `url`.
pub(crate) fn join_base(base: &str, url: &str) -> String {
    let base = base.split(['?', '#']).next().unwrap_or_default();
    format!("{}{url}", base.trim_end_matches('/'))
}

/// Compute a relative URL from one page URL to another (RFC 3986).
///
/// The last segment of `from` is the current document, so the base directory
/// is everything before it. A trailing slash means every segment is the
/// directory. Returns `.` when both name the same directory.
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = "../".repeat(from_dir.len() - common);
    let down = to_segs[common..].join("/");

    let result = format!("{ups}{down}");
    if result.is_empty() {
        ".".to_owned()
    } else {
        result
    }
}
