//! Per-file import tables.
//!
//! An [`ImportTable`] maps the name a file uses to refer to an imported
//! package onto that package's import path. Selector calls consult it to
//! tell `pkg.Fn()` apart from `value.Method()`.

use std::collections::BTreeMap;

use crate::parser::ParseResult;
use crate::position::node_text;

/// Alias to import path mapping for a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    aliases: BTreeMap<String, String>,
}

impl ImportTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// Builds the table from a parsed file's import declarations.
    ///
    /// Imports without an explicit name are keyed by the last segment of the
    /// import path. Dot and blank imports are recorded under `.` and `_`.
    #[must_use]
    pub fn from_parse(parsed: &ParseResult) -> Self {
        let mut table = Self::new();
        let source = parsed.source();
        let root = parsed.root_node();
        let mut cursor = root.walk();
        for declaration in root
            .named_children(&mut cursor)
            .filter(|node| node.kind() == "import_declaration")
        {
            let mut spec_cursor = declaration.walk();
            for child in declaration.named_children(&mut spec_cursor) {
                match child.kind() {
                    "import_spec" => table.insert_spec(child, source),
                    "import_spec_list" => {
                        let mut list_cursor = child.walk();
                        for spec in child
                            .named_children(&mut list_cursor)
                            .filter(|node| node.kind() == "import_spec")
                        {
                            table.insert_spec(spec, source);
                        }
                    }
                    _ => {}
                }
            }
        }
        table
    }

    fn insert_spec(&mut self, spec: tree_sitter::Node<'_>, source: &str) {
        let Some(path_node) = spec.child_by_field_name("path") else {
            return;
        };
        let path = node_text(path_node, source)
            .trim_matches(|c| c == '"' || c == '`')
            .to_owned();
        if path.is_empty() {
            return;
        }
        let alias = spec
            .child_by_field_name("name")
            .map_or_else(|| default_alias(&path).to_owned(), |name| node_text(name, source));
        self.insert(alias, path);
    }

    /// Records `alias` as referring to `path`, replacing any earlier entry.
    pub fn insert(&mut self, alias: impl Into<String>, path: impl Into<String>) {
        self.aliases.insert(alias.into(), path.into());
    }

    /// Returns the import path bound to `alias`.
    #[must_use]
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Returns whether `alias` names an imported package.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// Iterates over `(alias, path)` pairs in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, path)| (alias.as_str(), path.as_str()))
    }

    /// Number of recorded imports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns whether the table has no imports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Name a file uses for an import that carries no explicit alias.
#[must_use]
pub fn default_alias(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
