//! The function registry and its builder.
//!
//! Indexing fills a [`RegistryBuilder`]; [`RegistryBuilder::freeze`] turns it
//! into an immutable [`FunctionRegistry`]. Resolution only ever sees the
//! frozen form, so every declaration is known before any call is classified.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;

use crate::INDEX_TARGET;
use crate::descriptor::{FunctionDescriptor, FunctionId};
use crate::diagnostics::Diagnostic;

/// Mutable registry used while indexing.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    functions: BTreeMap<FunctionId, FunctionDescriptor>,
    packages: BTreeMap<String, String>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
            packages: BTreeMap::new(),
        }
    }

    /// Adds a descriptor unless its identity is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`Diagnostic::DuplicateIdentity`] when an earlier declaration
    /// owns the identity; the registry keeps the earlier one.
    pub fn insert(&mut self, descriptor: FunctionDescriptor) -> Result<(), Diagnostic> {
        if let Some(existing) = self.functions.get(descriptor.id()) {
            let diagnostic = Diagnostic::DuplicateIdentity {
                id: descriptor.id().clone(),
                kept: existing.file.clone(),
                kept_line: existing.start_line,
                skipped: descriptor.file.clone(),
                skipped_line: descriptor.start_line,
            };
            warn!(target: INDEX_TARGET, %diagnostic, "duplicate function identity");
            return Err(diagnostic);
        }
        self.functions.insert(descriptor.id().clone(), descriptor);
        Ok(())
    }

    /// Records the identity qualifier of the package at `import_path`.
    ///
    /// The first qualifier recorded for a path wins.
    pub fn record_package(&mut self, import_path: impl Into<String>, qualifier: impl Into<String>) {
        self.packages.entry(import_path.into()).or_insert_with(|| qualifier.into());
    }

    /// Number of functions added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns whether nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Finishes indexing.
    #[must_use]
    pub fn freeze(self) -> FunctionRegistry {
        FunctionRegistry {
            functions: self.functions,
            packages: self.packages,
        }
    }
}

/// Immutable lookup table of every indexed function.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<FunctionId, FunctionDescriptor>,
    packages: BTreeMap<String, String>,
}

impl FunctionRegistry {
    /// Returns the descriptor for `id`.
    #[must_use]
    pub fn get(&self, id: &FunctionId) -> Option<&FunctionDescriptor> {
        self.functions.get(id)
    }

    /// Returns whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &FunctionId) -> bool {
        self.functions.contains_key(id)
    }

    /// Looks up a free function by package and name.
    #[must_use]
    pub fn lookup_function(&self, package: &str, name: &str) -> Option<&FunctionDescriptor> {
        self.get(&FunctionId::function(package, name))
    }

    /// Identity qualifier of the package at `import_path`, when the path was
    /// indexed.
    #[must_use]
    pub fn package_at(&self, import_path: &str) -> Option<&str> {
        self.packages.get(import_path).map(String::as_str)
    }

    /// Iterates over descriptors in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        self.functions.values()
    }

    /// Groups descriptors by file, files in path order and functions in
    /// line order.
    #[must_use]
    pub fn by_file(&self) -> BTreeMap<&Utf8Path, Vec<&FunctionDescriptor>> {
        let mut files: BTreeMap<&Utf8Path, Vec<&FunctionDescriptor>> = BTreeMap::new();
        for descriptor in self.functions.values() {
            files
                .entry(descriptor.file.as_path())
                .or_default()
                .push(descriptor);
        }
        for functions in files.values_mut() {
            functions.sort_by_key(|descriptor| descriptor.start_line);
        }
        files
    }

    /// Files that contributed at least one function.
    #[must_use]
    pub fn files(&self) -> Vec<Utf8PathBuf> {
        self.by_file().into_keys().map(Utf8Path::to_path_buf).collect()
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
