//! Error types for Go source parsing and extraction.

use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors from syntactic analysis operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInitError {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter did not produce a syntax tree.
    #[error("failed to parse {language}: {message}")]
    ParseError {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// The source contains error nodes and cannot be trusted for extraction.
    #[error("{count} syntax error(s), first at line {line}, column {column}: {message} near '{context}'")]
    InvalidSource {
        /// Number of error nodes found.
        count: usize,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Description of the first error.
        message: String,
        /// Source text covered by the first error.
        context: String,
    },

    /// The file has no `package` clause.
    #[error("source file has no package clause")]
    MissingPackageClause,
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInitError {
            language,
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParseError {
            language,
            message: message.into(),
        }
    }

    /// Creates an invalid source error from the first reported syntax error.
    #[must_use]
    pub fn invalid_source(
        count: usize,
        line: u32,
        column: u32,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidSource {
            count,
            line,
            column,
            message: message.into(),
            context: context.into(),
        }
    }
}
