//! Language detection and Tree-sitter grammar selection.

use std::fmt;
use std::path::Path;

/// Languages supported for syntactic analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// Go source files (`.go`).
    #[default]
    Go,
}

impl SupportedLanguage {
    /// Detects the language from a file extension.
    ///
    /// Returns `None` if the extension is not recognised.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("go") {
            Some(Self::Go)
        } else {
            None
        }
    }

    /// Detects the language from a file path by examining its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the Tree-sitter language grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Go => tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Go => "go",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("go", Some(SupportedLanguage::Go))]
    #[case("GO", Some(SupportedLanguage::Go))]
    #[case("rs", None)]
    #[case("mod", None)]
    fn from_extension_recognises_go(#[case] ext: &str, #[case] expected: Option<SupportedLanguage>) {
        assert_eq!(SupportedLanguage::from_extension(ext), expected);
    }

    #[rstest]
    #[case("cmd/server/main.go", Some(SupportedLanguage::Go))]
    #[case("go.mod", None)]
    #[case("Makefile", None)]
    fn from_path_uses_the_extension(
        #[case] path: &str,
        #[case] expected: Option<SupportedLanguage>,
    ) {
        assert_eq!(SupportedLanguage::from_path(Path::new(path)), expected);
    }
}
