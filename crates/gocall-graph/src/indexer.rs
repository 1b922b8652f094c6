//! Source indexing: discovery, parallel parsing and registry population.

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use gocall_syntax::{ImportTable, Parser, SourceSummary, SupportedLanguage, default_alias};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::INDEX_TARGET;
use crate::descriptor::FunctionDescriptor;
use crate::diagnostics::Diagnostic;
use crate::error::GraphError;
use crate::manifest::ModuleManifest;
use crate::pool::run_in_pool;
use crate::registry::{FunctionRegistry, RegistryBuilder};

/// Directory skipped by default.
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Source selection and parallelism settings for [`index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Directory name skipped wherever it occurs.
    pub vendor_dir: String,
    /// Whether `_test.go` files are indexed.
    pub include_tests: bool,
    /// Worker count; `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            vendor_dir: DEFAULT_VENDOR_DIR.to_owned(),
            include_tests: false,
            threads: None,
        }
    }
}

impl IndexOptions {
    /// Sets the skipped vendor directory name.
    #[must_use]
    pub fn with_vendor_dir(mut self, vendor_dir: impl Into<String>) -> Self {
        self.vendor_dir = vendor_dir.into();
        self
    }

    /// Includes or excludes `_test.go` files.
    #[must_use]
    pub const fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub const fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }
}

/// Per-file facts kept for resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Declared package name.
    pub package: String,
    /// Import path of the file's directory.
    pub package_path: String,
    /// Imports visible in the file.
    pub imports: ImportTable,
}

/// Output of [`index`]: the frozen registry plus the context resolution
/// needs.
#[derive(Debug, Clone)]
pub struct IndexedProject {
    root: Utf8PathBuf,
    manifest: ModuleManifest,
    registry: FunctionRegistry,
    files: BTreeMap<Utf8PathBuf, SourceFile>,
    diagnostics: Vec<Diagnostic>,
    options: IndexOptions,
}

impl IndexedProject {
    /// Canonical project root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Module manifest governing the project.
    #[must_use]
    pub const fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    /// Declared module path.
    #[must_use]
    pub fn module_path(&self) -> &str {
        self.manifest.module()
    }

    /// Every indexed function.
    #[must_use]
    pub const fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Facts for a successfully parsed file.
    #[must_use]
    pub fn source_file(&self, path: &Utf8Path) -> Option<&SourceFile> {
        self.files.get(path)
    }

    /// Files skipped and identities dropped while indexing.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Options the project was indexed with.
    #[must_use]
    pub const fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// `path` relative to the project root, or unchanged when outside it.
    #[must_use]
    pub fn relative_path<'a>(&self, path: &'a Utf8Path) -> &'a Utf8Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Indexes every Go source file under `root`.
///
/// Unreadable or unparseable files are skipped and reported as diagnostics.
///
/// # Errors
///
/// Fails when the root cannot be read, when no usable `go.mod` exists at or
/// above it, or when the parser or worker pool cannot start.
pub fn index(root: &Utf8Path, options: &IndexOptions) -> Result<IndexedProject, GraphError> {
    let root = canonical_root(root)?;
    let manifest = ModuleManifest::discover(&root)?;
    Parser::go()?;
    debug!(
        target: INDEX_TARGET,
        root = %root,
        module = manifest.module(),
        manifest = %manifest.path(),
        "resolved module manifest"
    );

    let sources = discover_sources(&root, options);
    let parsed = run_in_pool(options.threads, || parse_sources(&sources))?;

    let packages = PackageQualifiers::collect(&root, &manifest, &parsed);
    let mut builder = RegistryBuilder::new();
    let mut files = BTreeMap::new();
    let mut diagnostics = Vec::new();
    for (path, outcome) in parsed {
        match outcome {
            Ok(summary) => {
                let package_path = directory_import_path(&root, &manifest, &path);
                let key = package_key(&package_path, &summary.package);
                let qualifier = packages.qualifier(&key, &summary.package);
                builder.record_package(key, qualifier);
                for decl in summary.functions {
                    let descriptor = FunctionDescriptor::from_decl(
                        qualifier,
                        package_path.clone(),
                        path.clone(),
                        decl,
                    );
                    if let Err(diagnostic) = builder.insert(descriptor) {
                        diagnostics.push(diagnostic);
                    }
                }
                files.insert(
                    path,
                    SourceFile {
                        package: summary.package,
                        package_path,
                        imports: summary.imports,
                    },
                );
            }
            Err(diagnostic) => {
                warn!(target: INDEX_TARGET, %diagnostic, "skipping source file");
                diagnostics.push(diagnostic);
            }
        }
    }

    let registry = builder.freeze();
    info!(
        target: INDEX_TARGET,
        files = files.len(),
        skipped = sources.len().saturating_sub(files.len()),
        functions = registry.len(),
        "indexed project"
    );

    Ok(IndexedProject {
        root,
        manifest,
        registry,
        files,
        diagnostics,
        options: options.clone(),
    })
}

fn directory_import_path(root: &Utf8Path, manifest: &ModuleManifest, path: &Utf8Path) -> String {
    manifest.import_path_for(path.parent().unwrap_or(root))
}

/// Key under which a package is registered: its directory's import path,
/// suffixed with `_test` for an external test package such as `util_test`
/// declared in `util/`.
fn package_key(package_path: &str, package: &str) -> String {
    if package.ends_with("_test") && default_alias(package_path) != package {
        format!("{package_path}_test")
    } else {
        package_path.to_owned()
    }
}

/// Identity qualifier of every indexed package.
///
/// A package is qualified by its declared name unless another package
/// declares the same name, as `cmd/a` and `cmd/b` both declaring `main` do.
/// Such packages are qualified by their import path instead.
struct PackageQualifiers {
    by_key: BTreeMap<String, (String, String)>,
}

impl PackageQualifiers {
    fn collect(root: &Utf8Path, manifest: &ModuleManifest, parsed: &[ParsedSource]) -> Self {
        let mut names: BTreeMap<String, String> = BTreeMap::new();
        for (path, outcome) in parsed {
            if let Ok(summary) = outcome {
                let package_path = directory_import_path(root, manifest, path);
                names
                    .entry(package_key(&package_path, &summary.package))
                    .or_insert_with(|| summary.package.clone());
            }
        }

        let mut sharing: BTreeMap<&str, usize> = BTreeMap::new();
        for name in names.values() {
            *sharing.entry(name.as_str()).or_default() += 1;
        }
        let by_key = names
            .iter()
            .map(|(key, name)| {
                let qualifier = if sharing.get(name.as_str()).copied().unwrap_or_default() > 1 {
                    debug!(target: INDEX_TARGET, package = %name, import_path = %key, "qualifying shared package name");
                    key.clone()
                } else {
                    name.clone()
                };
                (key.clone(), (name.clone(), qualifier))
            })
            .collect();
        Self { by_key }
    }

    /// Qualifier for a file at `key` declaring `package`; a file whose name
    /// disagrees with its directory keeps its own declared name.
    fn qualifier<'a>(&'a self, key: &str, package: &'a str) -> &'a str {
        match self.by_key.get(key) {
            Some((name, qualifier)) if name == package => qualifier.as_str(),
            _ => package,
        }
    }
}

fn canonical_root(root: &Utf8Path) -> Result<Utf8PathBuf, GraphError> {
    let canonical = root
        .canonicalize_utf8()
        .map_err(|error| GraphError::root_inaccessible(root, error))?;
    fs::read_dir(&canonical).map_err(|error| GraphError::root_inaccessible(root, error))?;
    Ok(canonical)
}

/// Lists the Go files under `root` that `options` selects, sorted by path.
///
/// Hidden directories and the vendor directory are pruned. Entries that
/// cannot be read or whose paths are not UTF-8 are logged and skipped.
#[must_use]
pub fn discover_sources(root: &Utf8Path, options: &IndexOptions) -> Vec<Utf8PathBuf> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned_dir(entry, options));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(target: INDEX_TARGET, error = %error, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) if is_selected_source(&path, options) => sources.push(path),
            Ok(_) => {}
            Err(path) => {
                warn!(target: INDEX_TARGET, path = %path.display(), "skipping non UTF-8 path");
            }
        }
    }
    sources.sort();
    sources
}

fn is_pruned_dir(entry: &DirEntry, options: &IndexOptions) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name == options.vendor_dir)
}

fn is_selected_source(path: &Utf8Path, options: &IndexOptions) -> bool {
    SupportedLanguage::from_path(path.as_std_path()).is_some()
        && (options.include_tests
            || !path
                .file_name()
                .is_some_and(|name| name.ends_with("_test.go")))
}

type ParsedSource = (Utf8PathBuf, Result<SourceSummary, Diagnostic>);

fn parse_sources(sources: &[Utf8PathBuf]) -> Vec<ParsedSource> {
    sources
        .par_iter()
        .map_init(Parser::go, |parser, path| {
            let outcome = match parser {
                Ok(parser) => parse_source(parser, path),
                Err(error) => Err(Diagnostic::file_parse(path.clone(), error.to_string())),
            };
            (path.clone(), outcome)
        })
        .collect()
}

fn parse_source(parser: &mut Parser, path: &Utf8Path) -> Result<SourceSummary, Diagnostic> {
    let source = fs::read_to_string(path)
        .map_err(|error| Diagnostic::file_parse(path, error.to_string()))?;
    let parsed = parser
        .parse(&source)
        .map_err(|error| Diagnostic::file_parse(path, error.to_string()))?;
    SourceSummary::from_parse(&parsed).map_err(|error| Diagnostic::file_parse(path, error.to_string()))
}
