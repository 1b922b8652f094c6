//! Call resolution.
//!
//! Each indexed file is re-parsed once and every function in it is located
//! by name and start line. The raw calls in its body are then classified
//! against the frozen registry and the file's import table.

use std::collections::BTreeMap;
use std::fs;

use camino::Utf8Path;
use gocall_syntax::{CallTarget, ImportTable, Parser, RawCall, default_alias, function_calls, is_builtin};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::RESOLVE_TARGET;
use crate::call_site::{CallKind, CallSite, ExternalOrigin, flatten_all};
use crate::descriptor::{FunctionDescriptor, FunctionId};
use crate::diagnostics::Diagnostic;
use crate::indexer::IndexedProject;
use crate::manifest::ModuleManifest;
use crate::pool::run_in_pool;
use crate::registry::FunctionRegistry;

/// Call sites for every indexed function.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    calls: BTreeMap<FunctionId, Vec<CallSite>>,
    diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Top-level call sites of `id`; empty when unknown or unresolved.
    #[must_use]
    pub fn calls_of(&self, id: &FunctionId) -> &[CallSite] {
        self.calls.get(id).map_or(&[], Vec::as_slice)
    }

    /// Iterates over functions and their call sites in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&FunctionId, &[CallSite])> {
        self.calls.iter().map(|(id, sites)| (id, sites.as_slice()))
    }

    /// Functions whose bodies could not be re-read.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of call sites including nested ones.
    #[must_use]
    pub fn call_site_count(&self) -> usize {
        self.calls.values().map(|sites| flatten_all(sites).len()).sum()
    }

    /// Records the call sites of `id`, replacing earlier ones.
    pub fn insert(&mut self, id: FunctionId, sites: Vec<CallSite>) {
        self.calls.insert(id, sites);
    }
}

/// Classifies the calls of every function in `project`.
///
/// Functions whose file can no longer be read or parsed, or whose
/// declaration has moved, get no call sites and a
/// [`Diagnostic::FunctionReparse`].
#[must_use]
pub fn resolve(project: &IndexedProject) -> Resolution {
    let registry = project.registry();
    let files: Vec<(&Utf8Path, Vec<&FunctionDescriptor>)> = registry.by_file().into_iter().collect();

    let work = || {
        files
            .par_iter()
            .map_init(Parser::go, |parser, (path, functions)| {
                let imports = project
                    .source_file(path)
                    .map(|file| &file.imports);
                match parser {
                    Ok(parser) => resolve_file(parser, path, functions, imports, project),
                    Err(error) => reparse_failures(path, functions, &error.to_string()),
                }
            })
            .collect::<Vec<_>>()
    };
    let per_file = run_in_pool(project.options().threads, work).unwrap_or_else(|error| {
        warn!(target: RESOLVE_TARGET, %error, "falling back to the global worker pool");
        work()
    });

    let mut resolution = Resolution::default();
    for outcome in per_file {
        for (id, sites) in outcome.calls {
            resolution.insert(id, sites);
        }
        resolution.diagnostics.extend(outcome.diagnostics);
    }
    info!(
        target: RESOLVE_TARGET,
        functions = resolution.calls.len(),
        call_sites = resolution.call_site_count(),
        failures = resolution.diagnostics.len(),
        "resolved calls"
    );
    resolution
}

#[derive(Default)]
struct FileOutcome {
    calls: Vec<(FunctionId, Vec<CallSite>)>,
    diagnostics: Vec<Diagnostic>,
}

fn resolve_file(
    parser: &mut Parser,
    path: &Utf8Path,
    functions: &[&FunctionDescriptor],
    imports: Option<&ImportTable>,
    project: &IndexedProject,
) -> FileOutcome {
    let parsed = match fs::read_to_string(path)
        .map_err(|error| error.to_string())
        .and_then(|source| parser.parse(&source).map_err(|error| error.to_string()))
    {
        Ok(parsed) if !parsed.has_errors() => parsed,
        Ok(_) => return reparse_failures(path, functions, "file no longer parses cleanly"),
        Err(message) => return reparse_failures(path, functions, &message),
    };

    let empty = ImportTable::new();
    let mut outcome = FileOutcome::default();
    for descriptor in functions {
        let classifier = Classifier {
            registry: project.registry(),
            manifest: project.manifest(),
            imports: imports.unwrap_or(&empty),
            package: descriptor.package(),
        };
        match function_calls(&parsed, descriptor.name(), descriptor.start_line) {
            Some(raw) => {
                let sites = classifier.classify_all(raw);
                debug!(
                    target: RESOLVE_TARGET,
                    function = %descriptor.id(),
                    call_sites = sites.len(),
                    "classified function body"
                );
                outcome.calls.push((descriptor.id().clone(), sites));
            }
            None => {
                let diagnostic = Diagnostic::function_reparse(
                    descriptor.id().clone(),
                    path,
                    format!("declaration not found at line {}", descriptor.start_line),
                );
                warn!(target: RESOLVE_TARGET, %diagnostic, "skipping function");
                outcome.calls.push((descriptor.id().clone(), Vec::new()));
                outcome.diagnostics.push(diagnostic);
            }
        }
    }
    outcome
}

fn reparse_failures(path: &Utf8Path, functions: &[&FunctionDescriptor], message: &str) -> FileOutcome {
    let mut outcome = FileOutcome::default();
    for descriptor in functions {
        let diagnostic = Diagnostic::function_reparse(descriptor.id().clone(), path, message);
        warn!(target: RESOLVE_TARGET, %diagnostic, "skipping function");
        outcome.calls.push((descriptor.id().clone(), Vec::new()));
        outcome.diagnostics.push(diagnostic);
    }
    outcome
}

/// Classifies raw calls found in one function body.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    /// Every indexed function.
    pub registry: &'a FunctionRegistry,
    /// Module owning the project.
    pub manifest: &'a ModuleManifest,
    /// Imports of the file being resolved.
    pub imports: &'a ImportTable,
    /// Package of the function being resolved.
    pub package: &'a str,
}

impl Classifier<'_> {
    /// Classifies `raw` calls in order.
    ///
    /// Built-in functions and conversions are not call sites; calls found in
    /// their arguments take their place in the list.
    #[must_use]
    pub fn classify_all(&self, raw: Vec<RawCall>) -> Vec<CallSite> {
        let mut sites = Vec::with_capacity(raw.len());
        for call in raw {
            let kind = match &call.target {
                CallTarget::Identifier(name) if self.is_unshadowed_builtin(name) => None,
                CallTarget::Conversion(_) => None,
                target => Some(self.classify(target)),
            };
            let nested = self.classify_all(call.nested);
            match kind {
                Some(kind) => {
                    trace!(target: RESOLVE_TARGET, line = call.line, kind = kind.label(), callee = %kind, "classified call");
                    sites.push(CallSite {
                        kind,
                        line: call.line,
                        text: call.text,
                        arguments: call.arguments,
                        nested,
                        mode: call.mode,
                    });
                }
                None => sites.extend(nested),
            }
        }
        sites
    }

    /// Classifies a single call target.
    #[must_use]
    pub fn classify(&self, target: &CallTarget) -> CallKind {
        match target {
            CallTarget::Identifier(name) => self.classify_identifier(name),
            CallTarget::Selector {
                operand,
                field,
                qualified,
            } => {
                if *qualified
                    && let Some(import_path) = self.package_import(operand)
                {
                    self.classify_package_call(import_path, field)
                } else {
                    CallKind::Method {
                        receiver: operand.clone(),
                        method: field.clone(),
                    }
                }
            }
            CallTarget::Literal => CallKind::Literal,
            CallTarget::Conversion(text) | CallTarget::Other(text) => CallKind::External {
                function: text.clone(),
                origin: ExternalOrigin::Unknown,
            },
        }
    }

    /// A project function of the same name in the caller's package shadows
    /// the built-in.
    fn is_unshadowed_builtin(&self, name: &str) -> bool {
        is_builtin(name) && self.registry.lookup_function(self.package, name).is_none()
    }

    fn classify_identifier(&self, name: &str) -> CallKind {
        match self.registry.lookup_function(self.package, name) {
            Some(descriptor) => CallKind::Local(descriptor.id().clone()),
            None => CallKind::External {
                function: name.to_owned(),
                origin: ExternalOrigin::Unknown,
            },
        }
    }

    fn package_import(&self, alias: &str) -> Option<&str> {
        if alias == "_" || alias == "." {
            return None;
        }
        self.imports.resolve(alias)
    }

    fn classify_package_call(&self, import_path: &str, function: &str) -> CallKind {
        if !self.manifest.owns(import_path) {
            return CallKind::External {
                function: function.to_owned(),
                origin: ExternalOrigin::Import {
                    import_path: import_path.to_owned(),
                },
            };
        }
        let package = self
            .registry
            .package_at(import_path)
            .unwrap_or_else(|| default_alias(import_path));
        match self.registry.lookup_function(package, function) {
            Some(descriptor) => CallKind::CrossModule(descriptor.id().clone()),
            None => CallKind::External {
                function: function.to_owned(),
                origin: ExternalOrigin::Missing {
                    import_path: import_path.to_owned(),
                },
            },
        }
    }
}
