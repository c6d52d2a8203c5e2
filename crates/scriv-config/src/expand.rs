//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key for error reporting.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(
            expand_env("https://example.com/", "site.url").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        let value = expand_env("${SCRIV_TEST_SURELY_UNSET_VAR:-/docs/}", "site.url").unwrap();
        assert_eq!(value, "/docs/");
    }

    #[test]
    fn test_unset_without_default_is_error() {
        let err = expand_env("${SCRIV_TEST_SURELY_UNSET_VAR}", "site.url").unwrap_err();

        match err {
            ConfigError::EnvVar { field, message } => {
                assert_eq!(field, "site.url");
                assert!(message.contains("SCRIV_TEST_SURELY_UNSET_VAR"));
            }
            other => panic!("Expected EnvVar error, got {other:?}"),
        }
    }
}
