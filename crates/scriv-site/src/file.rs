//! Source-to-output file mapping.
//!
//! A [`File`] pairs a path under the input root with the path its convertor
//! writes under the output root. Both paths are slash-separated and relative.
//! The URL is derived from the output path on demand and never stored.

use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::convertor::Convertor;

/// Root directories and index naming shared by every file of one tree.
#[derive(Debug, PartialEq, Eq)]
pub struct SiteLayout {
    /// Root of the source tree.
    pub input_dir: PathBuf,
    /// Root of the generated tree.
    pub output_dir: PathBuf,
    /// File name that turns an output path into a directory-style URL.
    pub index_file: String,
}

impl SiteLayout {
    /// Create a layout.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        index_file: impl Into<String>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            index_file: index_file.into(),
        }
    }
}

/// One unit of content: a source path, its output path, and its convertor.
///
/// Files are immutable once created. Two files are equal when their input
/// path, output path and both root directories match; the convertor does
/// not take part in equality.
#[derive(Clone)]
pub struct File {
    input_path: String,
    output_path: String,
    layout: Arc<SiteLayout>,
    convertor: Arc<dyn Convertor>,
}

impl File {
    /// Create a file backed by a source document.
    pub fn new(
        input_path: impl Into<String>,
        output_path: impl Into<String>,
        layout: Arc<SiteLayout>,
        convertor: Arc<dyn Convertor>,
    ) -> Self {
        Self {
            input_path: normalize_separators(input_path.into()),
            output_path: normalize_separators(output_path.into()),
            layout,
            convertor,
        }
    }

    /// Create a file with no source, contributed by a convertor.
    pub fn synthetic(
        output_path: impl Into<String>,
        layout: Arc<SiteLayout>,
        convertor: Arc<dyn Convertor>,
    ) -> Self {
        Self::new(String::new(), output_path, layout, convertor)
    }

    /// Path relative to the input root. Empty for synthetic files.
    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    /// Path relative to the output root.
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// Layout this file belongs to.
    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Convertor responsible for producing this file's output.
    pub fn convertor(&self) -> &Arc<dyn Convertor> {
        &self.convertor
    }

    /// True if the file has no source document.
    pub fn is_synthetic(&self) -> bool {
        self.input_path.is_empty()
    }

    /// Input path, or the output path for synthetic files. Used in diagnostics.
    pub fn origin(&self) -> &str {
        if self.is_synthetic() {
            &self.output_path
        } else {
            &self.input_path
        }
    }

    /// Root-relative URL of the generated artifact.
    ///
    /// - `index.html` → `/`
    /// - `topics/a/index.html` → `/topics/a/`
    /// - `img/favicon.ico` → `/img/favicon.ico`
    pub fn url(&self) -> String {
        let index = self.layout.index_file.as_str();
        match self.output_path.rsplit_once('/') {
            Some((dir, name)) if name == index => format!("/{dir}/"),
            None if self.output_path == index => "/".to_owned(),
            _ => format!("/{}", self.output_path),
        }
    }

    /// Absolute location of the source document.
    pub fn full_input_path(&self) -> PathBuf {
        self.layout.input_dir.join(&self.input_path)
    }

    /// Absolute location of the generated artifact.
    pub fn full_output_path(&self) -> PathBuf {
        self.layout.output_dir.join(&self.output_path)
    }

    /// Read the source document as UTF-8 text.
    pub fn read_input_text(&self) -> io::Result<String> {
        fs::read_to_string(self.full_input_path())
    }

    /// Write `text` to the output location.
    pub fn write_output_text(&self, text: &str) -> io::Result<()> {
        fs::write(self.full_output_path(), text)
    }

    /// Copy the source document byte-for-byte to the output location.
    pub fn copy_input_to_output(&self) -> io::Result<u64> {
        fs::copy(self.full_input_path(), self.full_output_path())
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.input_path == other.input_path
            && self.output_path == other.output_path
            && self.layout.input_dir == other.layout.input_dir
            && self.layout.output_dir == other.layout.output_dir
    }
}

impl Eq for File {}

impl Hash for File {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.output_path.hash(state);
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .field("input_dir", &self.layout.input_dir)
            .field("output_dir", &self.layout.output_dir)
            .field("convertor", &self.convertor.name())
            .finish()
    }
}

/// Join path components with `/`, the separator used for every stored path.
pub(crate) fn path_to_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_separators(path: String) -> String {
    if path.contains('\\') {
        path.replace('\\', "/")
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{NullConvertor, layout, page};

    #[test]
    fn test_root_index_url() {
        assert_eq!(page("index.md", "index.html").url(), "/");
    }

    #[test]
    fn test_nested_index_url_is_directory_style() {
        let file = page("topics/a.md", "topics/a/index.html");
        assert_eq!(file.url(), "/topics/a/");
        assert!(file.url().ends_with('/'));
    }

    #[test]
    fn test_non_index_url_is_output_path() {
        assert_eq!(page("page.html", "page.html").url(), "/page.html");
        assert_eq!(page("img/logo.png", "img/logo.png").url(), "/img/logo.png");
    }

    #[test]
    fn test_index_lookalike_is_not_index() {
        assert_eq!(page("a/myindex.html", "a/myindex.html").url(), "/a/myindex.html");
    }

    #[test]
    fn test_custom_index_file() {
        let layout = Arc::new(SiteLayout::new("in", "out", "default.htm"));
        let file = File::new("a.md", "a/default.htm", layout, Arc::new(NullConvertor));
        assert_eq!(file.url(), "/a/");
    }

    #[test]
    fn test_backslashes_normalized() {
        let file = page("topics\\a.md", "topics\\a\\index.html");
        assert_eq!(file.input_path(), "topics/a.md");
        assert_eq!(file.output_path(), "topics/a/index.html");
    }

    #[test]
    fn test_equality_ignores_convertor_but_not_roots() {
        let a = page("a.md", "a/index.html");
        let b = page("a.md", "a/index.html");
        assert_eq!(a, b);

        let other_root = File::new(
            "a.md",
            "a/index.html",
            Arc::new(SiteLayout::new("theme", "build", "index.html")),
            Arc::new(NullConvertor),
        );
        assert_ne!(a, other_root);
    }

    #[test]
    fn test_synthetic_file() {
        let file = File::synthetic("css/highlight.css", layout(), Arc::new(NullConvertor));
        assert!(file.is_synthetic());
        assert_eq!(file.input_path(), "");
        assert_eq!(file.origin(), "css/highlight.css");
        assert_eq!(file.url(), "/css/highlight.css");
    }

    #[test]
    fn test_full_paths_join_roots() {
        let file = page("topics/a.md", "topics/a/index.html");
        assert_eq!(file.full_input_path(), PathBuf::from("input/topics/a.md"));
        assert_eq!(
            file.full_output_path(),
            PathBuf::from("output/topics/a/index.html")
        );
    }

    #[test]
    fn test_read_write_copy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(input.join("a.txt"), "aaa").unwrap();
        let layout = Arc::new(SiteLayout::new(&input, &output, "index.html"));

        let file = File::new("a.txt", "a.txt", Arc::clone(&layout), Arc::new(NullConvertor));
        assert_eq!(file.read_input_text().unwrap(), "aaa");
        assert_eq!(file.copy_input_to_output().unwrap(), 3);
        assert_eq!(fs::read_to_string(output.join("a.txt")).unwrap(), "aaa");

        let generated = File::synthetic("b.txt", layout, Arc::new(NullConvertor));
        generated.write_output_text("bbb").unwrap();
        assert_eq!(fs::read_to_string(output.join("b.txt")).unwrap(), "bbb");
    }

    #[test]
    fn test_path_to_slashes() {
        assert_eq!(path_to_slashes(Path::new("a/b/c.md")), "a/b/c.md");
        assert_eq!(path_to_slashes(Path::new("c.md")), "c.md");
    }
}
