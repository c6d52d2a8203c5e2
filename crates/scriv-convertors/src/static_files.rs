//! Byte-for-byte copies of source files.

use scriv_site::{ConvertError, Convertor, Environment, File};

/// Copies every file it is given to the same relative output path.
#[derive(Debug, Default)]
pub struct StaticFiles;

impl Convertor for StaticFiles {
    fn name(&self) -> &str {
        "static-files"
    }

    fn should_handle(&self, _input_path: &str) -> bool {
        true
    }

    fn output_path(&self, input_path: &str) -> String {
        input_path.to_owned()
    }

    fn convert(&self, file: &File, _env: &Environment<'_>) -> Result<(), ConvertError> {
        let bytes = file.copy_input_to_output()?;
        tracing::debug!(path = %file.input_path(), bytes, "Copied");
        Ok(())
    }
}
