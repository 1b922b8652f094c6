//! Tree-sitter powered Go source extraction for the gocall toolchain.
//!
//! This crate turns Go source text into the lexical facts the call-graph
//! pipeline consumes:
//!
//! - **Declarations** via [`SourceSummary`]: package name, imports and one
//!   [`FunctionDecl`] per function or method
//! - **Imports** via [`ImportTable`]: alias to import path, with the last
//!   path segment as the default alias
//! - **Calls** via [`function_calls`]: every call expression in a function
//!   body as a [`RawCall`], nested calls attached to the call whose
//!   arguments contain them
//!
//! Nothing here knows about other files; classification against the whole
//! project happens in `gocall-graph`.
//!
//! # Example
//!
//! ```
//! use gocall_syntax::{Parser, SourceSummary, function_calls};
//!
//! let mut parser = Parser::go()?;
//! let parsed = parser.parse("package main\n\nfunc main() { run() }\n")?;
//! let summary = SourceSummary::from_parse(&parsed)?;
//! let calls = function_calls(&parsed, "main", 3).unwrap_or_default();
//! assert_eq!(summary.package, "main");
//! assert_eq!(calls.len(), 1);
//! # Ok::<(), gocall_syntax::SyntaxError>(())
//! ```

mod builtins;
mod calls;
mod declarations;
mod error;
mod imports;
mod language;
mod parser;
mod position;

pub use builtins::{BUILTIN_FUNCTIONS, PREDECLARED_TYPES, is_builtin};
pub use calls::{CallTarget, InvocationMode, RawCall, calls_in, function_calls};
pub use declarations::{
    FunctionDecl, Parameter, SourceSummary, find_declaration, function_declarations,
    normalise_receiver, package_name,
};
pub use error::SyntaxError;
pub use imports::{ImportTable, default_alias};
pub use language::SupportedLanguage;
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};

#[cfg(test)]
mod tests;
