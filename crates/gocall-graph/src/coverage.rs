//! Go coverage profile parsing and per-function coverage classification.
//!
//! Profiles are the text files written by `go test -coverprofile`. Each data
//! line has the form `file:startLine.startCol,endLine.endCol numStmts count`;
//! the two-field form without the statement count is also accepted.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use camino::Utf8Path;
use tracing::{debug, info};

use crate::COVERAGE_TARGET;
use crate::descriptor::{FunctionDescriptor, FunctionId};
use crate::diagnostics::Diagnostic;
use crate::error::GraphError;
use crate::indexer::IndexedProject;

/// One instrumented block from a coverage profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageBlock {
    /// First line of the block (one-based).
    pub start_line: u32,
    /// Column on the first line.
    pub start_col: u32,
    /// Last line of the block (one-based, inclusive).
    pub end_line: u32,
    /// Column on the last line.
    pub end_col: u32,
    /// Number of statements; zero when the profile omitted it.
    pub statements: u32,
    /// Execution count.
    pub hits: u64,
}

impl CoverageBlock {
    /// Whether the block was executed and overlaps `start..=end`.
    #[must_use]
    pub const fn covers(&self, start: u32, end: u32) -> bool {
        self.hits > 0 && self.start_line <= end && self.end_line >= start
    }
}

/// Parsed coverage profile keyed by the file names recorded in it.
#[derive(Debug, Clone, Default)]
pub struct CoverageProfile {
    mode: Option<String>,
    blocks: BTreeMap<String, Vec<CoverageBlock>>,
    diagnostics: Vec<Diagnostic>,
}

impl CoverageProfile {
    /// Parses profile text. Malformed lines are skipped and reported.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut profile = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(mode) = line.strip_prefix("mode:") {
                profile.mode = Some(mode.trim().to_owned());
                continue;
            }
            let line_number = index + 1;
            match parse_block_line(line) {
                Some((file, block)) => profile.blocks.entry(file.to_owned()).or_default().push(block),
                None => {
                    debug!(
                        target: COVERAGE_TARGET,
                        line_number,
                        text = line,
                        "skipping malformed coverage line"
                    );
                    profile
                        .diagnostics
                        .push(Diagnostic::malformed_coverage_line(line_number, line));
                }
            }
        }
        profile
    }

    /// Reads and parses the profile at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CoverageProfileOpen`] when the file cannot be
    /// read.
    pub fn load(path: &Utf8Path) -> Result<Self, GraphError> {
        let text =
            fs::read_to_string(path).map_err(|err| GraphError::coverage_profile_open(path, err))?;
        Ok(Self::parse(&text))
    }

    /// The `mode:` header value, when present.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    /// Blocks recorded for `file`, exactly as named in the profile.
    #[must_use]
    pub fn blocks_for(&self, file: &str) -> Option<&[CoverageBlock]> {
        self.blocks.get(file).map(Vec::as_slice)
    }

    /// File names recorded in the profile.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// Lines that could not be parsed.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn parse_block_line(line: &str) -> Option<(&str, CoverageBlock)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (location, statements, hits) = match fields.as_slice() {
        [location, statements, hits] => (*location, statements.parse().ok()?, *hits),
        [location, hits] => (*location, 0, *hits),
        _ => return None,
    };
    let (file, range) = location.rsplit_once(':')?;
    if file.is_empty() {
        return None;
    }
    let (start, end) = range.split_once(',')?;
    let (start_line, start_col) = parse_position(start)?;
    let (end_line, end_col) = parse_position(end)?;
    Some((
        file,
        CoverageBlock {
            start_line,
            start_col,
            end_line,
            end_col,
            statements,
            hits: hits.parse().ok()?,
        },
    ))
}

fn parse_position(text: &str) -> Option<(u32, u32)> {
    let (line, column) = text.split_once('.')?;
    Some((line.parse().ok()?, column.parse().ok()?))
}

/// Coverage status of every indexed function.
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    results: BTreeMap<FunctionId, bool>,
    diagnostics: Vec<Diagnostic>,
}

impl CoverageReport {
    /// Classifies every function in `project` against `profile`.
    #[must_use]
    pub fn from_profile(project: &IndexedProject, profile: &CoverageProfile) -> Self {
        let results = project
            .registry()
            .iter()
            .map(|descriptor| {
                let covered = blocks_for_descriptor(project, profile, descriptor)
                    .is_some_and(|blocks| is_covered(descriptor, blocks));
                (descriptor.id().clone(), covered)
            })
            .collect();
        Self {
            results,
            diagnostics: profile.diagnostics().to_vec(),
        }
    }

    /// Whether `id` is covered; `None` when it was never indexed.
    #[must_use]
    pub fn is_covered(&self, id: &FunctionId) -> Option<bool> {
        self.results.get(id).copied()
    }

    /// Every classified function with its status, in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&FunctionId, bool)> {
        self.results.iter().map(|(id, covered)| (id, *covered))
    }

    /// Identities of functions with no executed block.
    #[must_use]
    pub fn untested(&self) -> BTreeSet<&FunctionId> {
        self.results
            .iter()
            .filter(|(_, covered)| !**covered)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of covered functions.
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.results.values().filter(|covered| **covered).count()
    }

    /// Malformed profile lines.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// A function is covered when it has a body and an executed block overlaps
/// its declaration span.
#[must_use]
pub fn is_covered(descriptor: &FunctionDescriptor, blocks: &[CoverageBlock]) -> bool {
    descriptor.has_body
        && blocks
            .iter()
            .any(|block| block.covers(descriptor.start_line, descriptor.end_line))
}

fn blocks_for_descriptor<'a>(
    project: &IndexedProject,
    profile: &'a CoverageProfile,
    descriptor: &FunctionDescriptor,
) -> Option<&'a [CoverageBlock]> {
    let file = descriptor.file();
    let qualified = file
        .file_name()
        .map(|name| format!("{}/{name}", descriptor.package_path));
    qualified
        .as_deref()
        .and_then(|name| profile.blocks_for(name))
        .or_else(|| profile.blocks_for(file.as_str()))
        .or_else(|| profile.blocks_for(project.relative_path(file).as_str()))
}

/// Loads the profile at `path` and classifies every indexed function.
///
/// # Errors
///
/// Returns [`GraphError::CoverageProfileOpen`] when the profile cannot be
/// read.
pub fn analyze_coverage(path: &Utf8Path, project: &IndexedProject) -> Result<CoverageReport, GraphError> {
    let profile = CoverageProfile::load(path)?;
    let report = CoverageReport::from_profile(project, &profile);
    info!(
        target: COVERAGE_TARGET,
        profile = %path,
        functions = report.results.len(),
        covered = report.covered_count(),
        malformed = report.diagnostics.len(),
        "coverage analysed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gocall_syntax::FunctionDecl;
    use rstest::rstest;

    fn descriptor(start_line: u32, end_line: u32, has_body: bool) -> FunctionDescriptor {
        FunctionDescriptor::from_decl(
            "main",
            "example.com/app",
            "/src/app/main.go",
            FunctionDecl {
                name: "Run".to_owned(),
                receiver: None,
                parameters: Vec::new(),
                returns: Vec::new(),
                start_line,
                end_line,
                has_body,
            },
        )
    }

    fn block(start_line: u32, end_line: u32, hits: u64) -> CoverageBlock {
        CoverageBlock {
            start_line,
            start_col: 1,
            end_line,
            end_col: 2,
            statements: 1,
            hits,
        }
    }

    #[test]
    fn parses_three_field_lines() {
        let profile = CoverageProfile::parse(
            "mode: set\nexample.com/app/main.go:10.2,12.3 2 1\nexample.com/app/main.go:14.1,15.2 1 0\n",
        );
        assert_eq!(profile.mode(), Some("set"));
        let blocks = profile
            .blocks_for("example.com/app/main.go")
            .expect("blocks for main.go");
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks.first(),
            Some(&CoverageBlock {
                start_line: 10,
                start_col: 2,
                end_line: 12,
                end_col: 3,
                statements: 2,
                hits: 1,
            })
        );
        assert!(profile.diagnostics().is_empty());
    }

    #[test]
    fn accepts_two_field_lines() {
        let profile = CoverageProfile::parse("pkg/a.go:3.1,4.2 7\n");
        let blocks = profile.blocks_for("pkg/a.go").expect("blocks for a.go");
        assert_eq!(blocks.first().map(|b| (b.statements, b.hits)), Some((0, 7)));
    }

    #[rstest]
    #[case("pkg/a.go 1 1")]
    #[case("pkg/a.go:3.1-4.2 1 1")]
    #[case("pkg/a.go:3,4.2 1 1")]
    #[case("pkg/a.go:3.1,4.2 1 many")]
    #[case(":3.1,4.2 1 1")]
    #[case("pkg/a.go:3.1,4.2")]
    fn malformed_lines_become_diagnostics(#[case] line: &str) {
        let profile = CoverageProfile::parse(&format!("mode: count\n{line}\n"));
        assert_eq!(profile.files().count(), 0);
        assert_eq!(
            profile.diagnostics(),
            &[Diagnostic::malformed_coverage_line(2, line)]
        );
    }

    #[rstest]
    #[case(vec![block(25, 30, 5)], false)]
    #[case(vec![block(12, 14, 0)], false)]
    #[case(vec![block(12, 14, 3)], true)]
    #[case(vec![block(5, 10, 1)], true)]
    #[case(vec![block(20, 22, 1)], true)]
    #[case(Vec::new(), false)]
    fn coverage_requires_an_executed_overlapping_block(
        #[case] blocks: Vec<CoverageBlock>,
        #[case] expected: bool,
    ) {
        assert_eq!(is_covered(&descriptor(10, 20, true), &blocks), expected);
    }

    #[test]
    fn bodiless_declarations_are_untested() {
        assert!(!is_covered(&descriptor(10, 10, false), &[block(1, 50, 9)]));
    }

    #[test]
    fn missing_profile_is_an_open_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8Path::from_path(dir.path())
            .expect("utf-8 temp dir")
            .join("missing.out");
        let err = CoverageProfile::load(&path).expect_err("profile should be missing");
        assert!(matches!(err, GraphError::CoverageProfileOpen { .. }));
    }
}
