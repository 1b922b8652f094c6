//! Layered configuration for the gocall toolchain.
//!
//! Values are resolved by `ortho_config` with the usual precedence: built-in
//! defaults, then a TOML file (`--config-path` or `GOCALL_CONFIG_PATH`), then
//! `GOCALL_*` environment variables, then command-line flags.
//!
//! The same [`Config`] drives the source indexer (vendor directory, test file
//! policy, worker threads), the DOT renderer, and telemetry initialisation.

mod defaults;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_VENDOR_DIR, default_log_filter, default_log_filter_string,
    default_log_format, default_vendor_dir,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the CLI and the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "GOCALL")]
pub struct Config {
    /// Tracing filter expression, for example `warn` or `gocall_graph=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records written to stderr.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Directory name skipped wherever it appears in the source tree.
    #[ortho_config(default = default_vendor_dir())]
    pub vendor_dir: String,
    /// Index `_test.go` files alongside production sources.
    #[ortho_config(default = false)]
    pub include_tests: bool,
    /// Worker threads for parsing; zero lets rayon pick.
    #[ortho_config(default = 0)]
    pub threads: usize,
    /// Draw external, method and unresolved targets in rendered graphs.
    #[ortho_config(default = true)]
    pub show_external: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            vendor_dir: default_vendor_dir(),
            include_tests: false,
            threads: 0,
            show_external: true,
        }
    }
}

impl Config {
    /// Loads configuration from the given argument list, the environment and
    /// any discovered configuration file.
    ///
    /// The first element of `args` is treated as the binary name.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a source cannot be read or merged.
    pub fn load_from_args<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::load_from_iter(args)
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the vendor directory name skipped during indexing.
    #[must_use]
    pub fn vendor_dir(&self) -> &str {
        &self.vendor_dir
    }

    /// Returns the worker thread count, or `None` when rayon should decide.
    #[must_use]
    pub const fn thread_count(&self) -> Option<usize> {
        if self.threads == 0 {
            None
        } else {
            Some(self.threads)
        }
    }

    /// Checks values that the loader accepts syntactically but that the
    /// pipeline cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }
        if self.vendor_dir.is_empty() || self.vendor_dir.contains(['/', '\\']) {
            return Err(ConfigError::InvalidVendorDir {
                value: self.vendor_dir.clone(),
            });
        }
        Ok(())
    }
}

/// Semantic validation failures for a loaded [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The log filter was blank.
    #[error("log filter must not be empty")]
    EmptyLogFilter,
    /// The vendor directory was empty or contained a path separator.
    #[error("vendor directory must be a single directory name, got '{value}'")]
    InvalidVendorDir {
        /// Rejected value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.vendor_dir(), DEFAULT_VENDOR_DIR);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.show_external);
        assert!(!config.include_tests);
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    #[case(0, None)]
    #[case(4, Some(4))]
    fn thread_count_treats_zero_as_automatic(#[case] threads: usize, #[case] expected: Option<usize>) {
        let config = Config {
            threads,
            ..Config::default()
        };
        assert_eq!(config.thread_count(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("third_party/vendor")]
    fn validate_rejects_unusable_vendor_dirs(#[case] value: &str) {
        let config = Config {
            vendor_dir: value.to_owned(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidVendorDir { .. })
        ));
    }

    #[test]
    fn validate_rejects_blank_log_filter() {
        let config = Config {
            log_filter: "  ".to_owned(),
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyLogFilter));
    }
}
