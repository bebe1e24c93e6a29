//! Compiled signature patterns.

use regex::Regex;
use std::fmt;

/// A regular expression compiled once and matched at the start of a text.
///
/// A text matches when some match of the pattern begins at offset 0; the
/// pattern does not have to cover the whole text. `OpenSSH.*` therefore
/// matches `OpenSSH_6.6.1p1` but not `Dropbear OpenSSH`.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }

    /// Pattern source as configured.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern matches at the beginning of `text`.
    pub fn matches_start(&self, text: &str) -> bool {
        // Leftmost-first search: a match at offset 0 is always the one found.
        self.regex.find(text).is_some_and(|m| m.start() == 0)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
