//! Fixtures shared by unit tests.

use std::sync::Arc;

use crate::convertor::{ConvertError, Convertor};
use crate::env::Environment;
use crate::file::{File, SiteLayout};
use crate::registry::FileRegistry;

/// Convertor that claims nothing and writes nothing.
#[derive(Debug)]
pub(crate) struct NullConvertor;

impl Convertor for NullConvertor {
    fn name(&self) -> &str {
        "null"
    }

    fn should_handle(&self, _input_path: &str) -> bool {
        false
    }

    fn output_path(&self, input_path: &str) -> String {
        input_path.to_owned()
    }

    fn convert(&self, _file: &File, _env: &Environment<'_>) -> Result<(), ConvertError> {
        Ok(())
    }
}

/// Layout rooted at `input` and `output` with `index.html` indexes.
pub(crate) fn layout() -> Arc<SiteLayout> {
    Arc::new(SiteLayout::new("input", "output", "index.html"))
}

/// File in the default layout.
pub(crate) fn page(input: &str, output: &str) -> File {
    File::new(input, output, layout(), Arc::new(NullConvertor))
}

/// Registry of the small topics site used across tests.
pub(crate) fn topics_registry() -> FileRegistry {
    FileRegistry::from_files([
        page("index.md", "index.html"),
        page("topics/a.md", "topics/a/index.html"),
        page("topics/b.md", "topics/b/index.html"),
    ])
    .expect("topics registry has unique URLs")
}
