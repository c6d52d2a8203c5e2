//! Ordered collection of every file in a build.
//!
//! The registry keeps files in insertion order with two lookup indexes:
//! input path and URL. Appending a file whose input path is already present
//! replaces the earlier entry, which is how a documentation tree overrides a
//! shared theme tree.
//!
//! # Architecture
//!
//! Files live in a flat `Vec<File>`; both indexes map to positions in that
//! vector. Replacement removes the old entry and pushes the new one to the
//! end, so positions are rebuilt after every replacement.

use std::collections::HashMap;

use crate::file::File;

/// Lookup failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No file has this input path.
    #[error("no file with input path '{0}'")]
    InputPath(String),
    /// No file produces this URL.
    #[error("no file with URL '{0}'")]
    Url(String),
}

/// Registry insertion failure.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two different files produce the same URL.
    #[error("{existing} and {incoming} both produce URL {url}")]
    DuplicateOutput {
        /// Contested URL.
        url: String,
        /// Origin of the file already registered.
        existing: String,
        /// Origin of the file being added.
        incoming: String,
    },
}

/// Ordered set of files with override-by-input-path semantics.
#[derive(Clone, Debug, Default)]
pub struct FileRegistry {
    files: Vec<File>,
    by_input_path: HashMap<String, usize>,
    by_url: HashMap<String, usize>,
}

impl FileRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from files in order.
    pub fn from_files(files: impl IntoIterator<Item = File>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for file in files {
            registry.append(file)?;
        }
        Ok(registry)
    }

    /// Insert a file, replacing any file with the same input path.
    ///
    /// The new file takes the last position. Synthetic files never replace
    /// one another.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateOutput`] if another file already
    /// produces the same URL.
    pub fn append(&mut self, file: File) -> Result<(), RegistryError> {
        let url = file.url();
        let replaced = if file.is_synthetic() {
            None
        } else {
            self.by_input_path.get(file.input_path()).copied()
        };

        if let Some(&existing) = self.by_url.get(&url)
            && Some(existing) != replaced
        {
            return Err(RegistryError::DuplicateOutput {
                url,
                existing: self.files[existing].origin().to_owned(),
                incoming: file.origin().to_owned(),
            });
        }

        if let Some(idx) = replaced {
            tracing::debug!(input_path = %file.input_path(), "Overriding file");
            self.files.remove(idx);
            self.files.push(file);
            self.reindex();
        } else {
            let idx = self.files.len();
            if !file.is_synthetic() {
                self.by_input_path.insert(file.input_path().to_owned(), idx);
            }
            self.by_url.insert(url, idx);
            self.files.push(file);
        }

        Ok(())
    }

    /// Append every file of `other` after this registry's files.
    ///
    /// Files from `other` win on input path collisions.
    pub fn merge(&mut self, other: FileRegistry) -> Result<(), RegistryError> {
        for file in other.files {
            self.append(file)?;
        }
        Ok(())
    }

    /// Look up a file by its input path.
    pub fn get_by_input_path(&self, path: &str) -> Result<&File, LookupError> {
        self.by_input_path
            .get(path)
            .map(|&i| &self.files[i])
            .ok_or_else(|| LookupError::InputPath(path.to_owned()))
    }

    /// Look up a file by its URL (e.g., "/", "/topics/a/").
    pub fn get_by_url(&self, url: &str) -> Result<&File, LookupError> {
        self.by_url
            .get(url)
            .map(|&i| &self.files[i])
            .ok_or_else(|| LookupError::Url(url.to_owned()))
    }

    /// File at `index` in registry order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&File> {
        self.files.get(index)
    }

    /// All files in registry order.
    #[must_use]
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Iterate files in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, File> {
        self.files.iter()
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if no files are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn reindex(&mut self) {
        self.by_input_path.clear();
        self.by_url.clear();
        for (idx, file) in self.files.iter().enumerate() {
            if !file.is_synthetic() {
                self.by_input_path.insert(file.input_path().to_owned(), idx);
            }
            self.by_url.insert(file.url(), idx);
        }
    }
}

impl PartialEq for FileRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.files == other.files
    }
}

impl<'a> IntoIterator for &'a FileRegistry {
    type Item = &'a File;
    type IntoIter = std::slice::Iter<'a, File>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
