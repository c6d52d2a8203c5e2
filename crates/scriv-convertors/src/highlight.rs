//! Stylesheet for highlighted code blocks.
//!
//! Nothing in scriv tokenizes code. The rules target the Pygments-style
//! markup (`.highlight` with `.k`, `.s` and similar token spans) produced by
//! an external highlighter or a custom template; plain
//! `<pre><code class="language-x">` blocks only pick up the block rule.

use std::str::FromStr;

use scriv_config::ConfigError;
use scriv_site::{ConvertError, Convertor, Environment, File};

/// Named colour scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightStyle {
    /// Light background.
    Friendly,
    /// Dark background.
    Monokai,
}

impl HighlightStyle {
    /// Stylesheet text.
    pub fn css(self) -> &'static str {
        match self {
            Self::Friendly => FRIENDLY_CSS,
            Self::Monokai => MONOKAI_CSS,
        }
    }
}

impl FromStr for HighlightStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "friendly" => Ok(Self::Friendly),
            "monokai" => Ok(Self::Monokai),
            other => Err(ConfigError::Validation(format!(
                "highlight.style: unknown style '{other}' (expected friendly or monokai)"
            ))),
        }
    }
}

/// Writes the stylesheet of one [`HighlightStyle`] to a fixed output path.
#[derive(Debug)]
pub struct CodeHighlight {
    style: HighlightStyle,
    path: String,
}

impl CodeHighlight {
    /// Create a convertor writing `style` to `path` under the output root.
    pub fn new(style: HighlightStyle, path: impl Into<String>) -> Self {
        Self {
            style,
            path: path.into(),
        }
    }
}

impl Convertor for CodeHighlight {
    fn name(&self) -> &str {
        "code-highlight"
    }

    fn should_handle(&self, _input_path: &str) -> bool {
        false
    }

    fn output_path(&self, input_path: &str) -> String {
        input_path.to_owned()
    }

    fn extra_paths(&self) -> Vec<String> {
        vec![self.path.clone()]
    }

    fn convert(&self, file: &File, _env: &Environment<'_>) -> Result<(), ConvertError> {
        file.write_output_text(self.style.css())?;
        Ok(())
    }
}

const FRIENDLY_CSS: &str = "\
.highlight { background: #f0f0f0; }
.highlight .c { color: #60a0b0; font-style: italic; }
.highlight .err { border: 1px solid #ff0000; }
.highlight .k { color: #007020; font-weight: bold; }
.highlight .o { color: #666666; }
.highlight .cm { color: #60a0b0; font-style: italic; }
.highlight .cp { color: #007020; }
.highlight .c1 { color: #60a0b0; font-style: italic; }
.highlight .gd { color: #a00000; }
.highlight .gi { color: #00a000; }
.highlight .kt { color: #902000; }
.highlight .m { color: #40a070; }
.highlight .s { color: #4070a0; }
.highlight .na { color: #4070a0; }
.highlight .nb { color: #007020; }
.highlight .nc { color: #0e84b5; font-weight: bold; }
.highlight .nf { color: #06287e; }
.highlight .nt { color: #062873; font-weight: bold; }
.highlight .nv { color: #bb60d5; }
.highlight .w { color: #bbbbbb; }
.highlight .s2 { color: #4070a0; }
.highlight .se { color: #4070a0; font-weight: bold; }
";

const MONOKAI_CSS: &str = "\
.highlight { background: #272822; color: #f8f8f2; }
.highlight .c { color: #75715e; }
.highlight .err { color: #960050; background-color: #1e0010; }
.highlight .k { color: #66d9ef; }
.highlight .o { color: #f92672; }
.highlight .cm { color: #75715e; }
.highlight .cp { color: #75715e; }
.highlight .c1 { color: #75715e; }
.highlight .gd { color: #f92672; }
.highlight .gi { color: #a6e22e; }
.highlight .kt { color: #66d9ef; }
.highlight .m { color: #ae81ff; }
.highlight .s { color: #e6db74; }
.highlight .na { color: #a6e22e; }
.highlight .nb { color: #f8f8f2; }
.highlight .nc { color: #a6e22e; }
.highlight .nf { color: #a6e22e; }
.highlight .nt { color: #f92672; }
.highlight .nv { color: #f8f8f2; }
.highlight .w { color: #f8f8f2; }
.highlight .s2 { color: #e6db74; }
.highlight .se { color: #ae81ff; }
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_from_str() {
        assert_eq!("friendly".parse::<HighlightStyle>().unwrap(), HighlightStyle::Friendly);
        assert_eq!("monokai".parse::<HighlightStyle>().unwrap(), HighlightStyle::Monokai);

        let err = "solarized".parse::<HighlightStyle>().unwrap_err();
        assert!(err.to_string().contains("solarized"));
    }

    #[test]
    fn test_contributes_extra_path_only() {
        let convertor = CodeHighlight::new(HighlightStyle::Monokai, "css/code.css");

        assert!(!convertor.should_handle("css/code.css"));
        assert_eq!(convertor.extra_paths(), vec!["css/code.css"]);
        assert!(HighlightStyle::Monokai.css().contains("#272822"));
    }
}
