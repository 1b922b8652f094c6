//! Function and method declarations.
//!
//! [`SourceSummary`] is everything the indexer needs from one file: the
//! declared package, the import table and a [`FunctionDecl`] per top-level
//! function or method.

use crate::error::SyntaxError;
use crate::imports::ImportTable;
use crate::parser::ParseResult;
use crate::position::{end_line, node_text, start_line};

/// A named (or anonymous) parameter with its declared type text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name; empty for unnamed parameters.
    pub name: String,
    /// Type as written, with `...` prefixed for variadic parameters.
    pub type_text: String,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
        }
    }
}

/// A top-level `func` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Declared function or method name.
    pub name: String,
    /// Normalised receiver type for methods.
    pub receiver: Option<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Result types in declaration order; named results render as `name type`.
    pub returns: Vec<String>,
    /// One-based line of the `func` keyword.
    pub start_line: u32,
    /// One-based line of the closing brace (or of the signature when bodiless).
    pub end_line: u32,
    /// Whether the declaration has a body.
    pub has_body: bool,
}

/// Declarations extracted from a single Go file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    /// Name from the `package` clause.
    pub package: String,
    /// Imports visible in the file.
    pub imports: ImportTable,
    /// Functions and methods in source order.
    pub functions: Vec<FunctionDecl>,
}

impl SourceSummary {
    /// Extracts the summary from a parse result.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidSource`] when the tree contains error
    /// nodes and [`SyntaxError::MissingPackageClause`] when the file declares
    /// no package.
    pub fn from_parse(parsed: &ParseResult) -> Result<Self, SyntaxError> {
        parsed.ensure_valid()?;
        let package = package_name(parsed).ok_or(SyntaxError::MissingPackageClause)?;
        Ok(Self {
            package,
            imports: ImportTable::from_parse(parsed),
            functions: function_declarations(parsed),
        })
    }
}

/// Returns the name declared by the file's `package` clause.
#[must_use]
pub fn package_name(parsed: &ParseResult) -> Option<String> {
    let root = parsed.root_node();
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|node| node.kind() == "package_clause")?;
    let mut clause_cursor = clause.walk();
    let identifier = clause
        .named_children(&mut clause_cursor)
        .find(|node| node.kind() == "package_identifier")?;
    Some(node_text(identifier, parsed.source()))
}

/// Extracts every top-level function and method declaration.
#[must_use]
pub fn function_declarations(parsed: &ParseResult) -> Vec<FunctionDecl> {
    let source = parsed.source();
    let root = parsed.root_node();
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .filter(|node| is_function_declaration(*node))
        .filter_map(|node| read_declaration(node, source))
        .collect()
}

/// Locates the declaration node for `name` starting on `line`.
#[must_use]
pub fn find_declaration<'tree>(
    parsed: &'tree ParseResult,
    name: &str,
    line: u32,
) -> Option<tree_sitter::Node<'tree>> {
    let source = parsed.source();
    let root = parsed.root_node();
    let mut cursor = root.walk();
    root.named_children(&mut cursor).find(|node| {
        is_function_declaration(*node)
            && start_line(*node) == line
            && node
                .child_by_field_name("name")
                .is_some_and(|ident| node_text(ident, source) == name)
    })
}

fn is_function_declaration(node: tree_sitter::Node<'_>) -> bool {
    matches!(node.kind(), "function_declaration" | "method_declaration")
}

fn read_declaration(node: tree_sitter::Node<'_>, source: &str) -> Option<FunctionDecl> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|list| receiver_type(list, source));
    let parameters = node
        .child_by_field_name("parameters")
        .map(|list| parameter_list(list, source))
        .unwrap_or_default();
    let returns = node
        .child_by_field_name("result")
        .map(|result| result_list(result, source))
        .unwrap_or_default();

    Some(FunctionDecl {
        name,
        receiver,
        parameters,
        returns,
        start_line: start_line(node),
        end_line: end_line(node),
        has_body: node.child_by_field_name("body").is_some(),
    })
}

fn receiver_type(list: tree_sitter::Node<'_>, source: &str) -> Option<String> {
    let mut cursor = list.walk();
    let declaration = list
        .named_children(&mut cursor)
        .find(|node| node.kind() == "parameter_declaration")?;
    let type_node = declaration.child_by_field_name("type")?;
    let normalised = normalise_receiver(&node_text(type_node, source));
    (!normalised.is_empty()).then_some(normalised)
}

/// Reduces a receiver type expression to its bare type name.
///
/// Pointer markers, parentheses and generic type parameters are removed, so
/// `*Stack[T]` and `Stack[T]` both become `Stack`.
#[must_use]
pub fn normalise_receiver(type_text: &str) -> String {
    let stripped = type_text
        .trim()
        .trim_start_matches(['(', '*', ' '])
        .trim_end_matches(')');
    let bare = stripped.split('[').next().unwrap_or(stripped);
    bare.trim().to_owned()
}

fn parameter_list(list: tree_sitter::Node<'_>, source: &str) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = list.walk();
    for declaration in list.named_children(&mut cursor) {
        let type_text = match declaration.kind() {
            "parameter_declaration" => declaration
                .child_by_field_name("type")
                .map(|node| node_text(node, source)),
            "variadic_parameter_declaration" => declaration
                .child_by_field_name("type")
                .map(|node| format!("...{}", node_text(node, source))),
            _ => None,
        };
        let Some(type_text) = type_text else {
            continue;
        };
        let mut name_cursor = declaration.walk();
        let names: Vec<String> = declaration
            .children_by_field_name("name", &mut name_cursor)
            .map(|node| node_text(node, source))
            .collect();
        if names.is_empty() {
            parameters.push(Parameter::new("", type_text));
        } else {
            parameters.extend(
                names
                    .into_iter()
                    .map(|name| Parameter::new(name, type_text.clone())),
            );
        }
    }
    parameters
}

fn result_list(result: tree_sitter::Node<'_>, source: &str) -> Vec<String> {
    if result.kind() != "parameter_list" {
        return vec![node_text(result, source)];
    }
    parameter_list(result, source)
        .into_iter()
        .map(|parameter| {
            if parameter.name.is_empty() {
                parameter.type_text
            } else {
                format!("{} {}", parameter.name, parameter.type_text)
            }
        })
        .collect()
}
