//! Navigation section of `scriv.toml`.
//!
//! The `[nav]` table maps titles to either an input path (a page) or a
//! nested table (a group). Table order is document order, so the parsed
//! entries keep the order the author wrote them in.

use crate::ConfigError;

/// One entry of the configured navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavEntry {
    /// Display title (the TOML key).
    pub title: String,
    /// What the entry points at.
    pub target: NavTarget,
}

/// Target of a navigation entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavTarget {
    /// Input path of a page, relative to the input root.
    Page(String),
    /// Nested group of entries.
    Group(Vec<NavEntry>),
}

impl NavEntry {
    /// Create a page entry.
    pub fn page(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            target: NavTarget::Page(path.into()),
        }
    }

    /// Create a group entry.
    pub fn group(title: impl Into<String>, children: Vec<NavEntry>) -> Self {
        Self {
            title: title.into(),
            target: NavTarget::Group(children),
        }
    }
}

/// Convert the raw `[nav]` table into navigation entries.
///
/// `field` is the dotted key of `table`, used in validation messages.
pub(crate) fn parse_nav(table: &toml::Table, field: &str) -> Result<Vec<NavEntry>, ConfigError> {
    table
        .iter()
        .map(|(title, value)| {
            let key = format!("{field}.{title}");
            match value {
                toml::Value::String(path) => {
                    if path.is_empty() {
                        return Err(ConfigError::Validation(format!(
                            "{key} cannot be empty"
                        )));
                    }
                    Ok(NavEntry::page(title.clone(), path.clone()))
                }
                toml::Value::Table(children) => {
                    Ok(NavEntry::group(title.clone(), parse_nav(children, &key)?))
                }
                other => Err(ConfigError::Validation(format!(
                    "{key} must be a path or a table, got {}",
                    other.type_str()
                ))),
            }
        })
        .collect()
}
