//! Recoverable problems reported alongside best-effort results.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::descriptor::FunctionId;

/// A problem that was logged and skipped rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// A source file could not be read or parsed; none of its functions
    /// were indexed.
    #[error("skipped {path}: {message}")]
    FileParse {
        /// File that was skipped.
        path: Utf8PathBuf,
        /// Why it was skipped.
        message: String,
    },

    /// A function's declaration could not be re-read during resolution; it
    /// has no call sites.
    #[error("could not re-read {id} in {path}: {message}")]
    FunctionReparse {
        /// Function whose calls are missing.
        id: FunctionId,
        /// File the declaration came from.
        path: Utf8PathBuf,
        /// Why resolution failed.
        message: String,
    },

    /// Two declarations produced the same canonical identity; the later one
    /// was dropped.
    #[error("duplicate function {id}: kept {kept}:{kept_line}, skipped {skipped}:{skipped_line}")]
    DuplicateIdentity {
        /// Shared identity.
        id: FunctionId,
        /// File of the declaration that was kept.
        kept: Utf8PathBuf,
        /// Line of the declaration that was kept.
        kept_line: u32,
        /// File of the declaration that was dropped.
        skipped: Utf8PathBuf,
        /// Line of the declaration that was dropped.
        skipped_line: u32,
    },

    /// A coverage profile line did not match the expected format.
    #[error("malformed coverage line {line_number}: {text}")]
    MalformedCoverageLine {
        /// One-based line number in the profile.
        line_number: usize,
        /// Offending line.
        text: String,
    },
}

impl Diagnostic {
    /// Creates a new `FileParse` diagnostic.
    #[must_use]
    pub fn file_parse(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::FileParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `FunctionReparse` diagnostic.
    #[must_use]
    pub fn function_reparse(
        id: FunctionId,
        path: impl Into<Utf8PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::FunctionReparse {
            id,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `MalformedCoverageLine` diagnostic.
    #[must_use]
    pub fn malformed_coverage_line(line_number: usize, text: impl Into<String>) -> Self {
        Self::MalformedCoverageLine {
            line_number,
            text: text.into(),
        }
    }
}
