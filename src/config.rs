//! Converter options, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, Flavor};
use crate::error::Error;

pub const DEFAULT_MAXIMUM_NESTING_LEVEL: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    pub flavor: Flavor,
    /// `<br>` / `<hr>` instead of `<br />` / `<hr />`
    pub html5: bool,
    pub maximum_nesting_level: usize,
    /// Render every newline inside a paragraph as a line break
    pub enable_newlines: bool,
    /// Emit `start="N"` on ordered lists that do not start at 1
    pub keep_list_start_number: bool,
    /// Put special attributes of code blocks on `<pre>` rather than `<code>`
    pub code_attributes_on_pre: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            flavor: Flavor::default(),
            html5: false,
            maximum_nesting_level: DEFAULT_MAXIMUM_NESTING_LEVEL,
            enable_newlines: false,
            keep_list_start_number: false,
            code_attributes_on_pre: false,
        }
    }
}

impl Options {
    pub fn new(flavor: Flavor) -> Self {
        Options {
            flavor,
            ..Options::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: Options = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.maximum_nesting_level == 0 {
            return Err(Error::InvalidNestingLevel);
        }
        Ok(())
    }

    pub fn dialect(&self) -> &'static Dialect {
        self.flavor.dialect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults() {
        let options = Options::from_json(r#"{"flavor": "gfm", "enable-newlines": true}"#).unwrap();
        assert_eq!(options.flavor, Flavor::Gfm);
        assert!(options.enable_newlines);
        assert!(!options.html5);
        assert_eq!(options.maximum_nesting_level, 32);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(Options::from_json("{"), Err(Error::Options(_))));
        assert!(matches!(
            Options::from_json(r#"{"maximum-nesting-level": 0}"#),
            Err(Error::InvalidNestingLevel)
        ));
        assert!(Options::from_json(r#"{"flavor": "github"}"#).is_ok());
    }
}
