//! Crate-level tests for gocall-syntax.
