//! Call-expression extraction.
//!
//! Calls are extracted lexically, without consulting any registry. Each
//! [`RawCall`] records the shape of its target so a resolver can classify it
//! later.
//!
//! The walk stops at every call expression it meets. Calls hidden inside
//! that expression's arguments are collected as its nested calls instead,
//! each argument scanned independently, so no call is reported twice. The
//! target expression is never scanned: in `a.B().C()` only `C` is a call
//! site, with `a.B()` as its receiver text.

use std::fmt;

use crate::declarations::find_declaration;
use crate::parser::ParseResult;
use crate::position::{node_text, start_line};

/// How a call is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvocationMode {
    /// Evaluated in place.
    #[default]
    Direct,
    /// Scheduled by a `defer` statement.
    Deferred,
    /// Started by a `go` statement.
    Concurrent,
}

impl InvocationMode {
    /// Lower-case label for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Deferred => "defer",
            Self::Concurrent => "go",
        }
    }
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical shape of the expression being called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// A bare identifier such as `helper`.
    Identifier(String),
    /// A selector `operand.field`.
    Selector {
        /// Source text of the operand.
        operand: String,
        /// Selected name.
        field: String,
        /// Whether the operand is a plain identifier, and so may be an
        /// import alias.
        qualified: bool,
    },
    /// An immediately invoked function literal.
    Literal,
    /// A conversion to a composite or named type expression.
    Conversion(String),
    /// Any other callable expression, by source text.
    Other(String),
}

impl CallTarget {
    /// Short human-readable rendering of the target.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => name.clone(),
            Self::Selector { operand, field, .. } => format!("{operand}.{field}"),
            Self::Literal => "func literal".to_owned(),
            Self::Conversion(text) | Self::Other(text) => text.clone(),
        }
    }
}

/// One call expression before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    /// Shape of the called expression.
    pub target: CallTarget,
    /// One-based line of the call, or of its `defer`/`go` statement.
    pub line: u32,
    /// Full source text of the call expression.
    pub text: String,
    /// Argument expressions as written.
    pub arguments: Vec<String>,
    /// Outermost calls found in the arguments, then in an invoked literal's
    /// body.
    pub nested: Vec<RawCall>,
    /// Scheduling mode.
    pub mode: InvocationMode,
}

/// Extracts the top-level calls in the body of the function named `name`
/// declared on `line`.
///
/// Returns `None` when no such declaration exists, and an empty list for a
/// declaration without a body.
#[must_use]
pub fn function_calls(parsed: &ParseResult, name: &str, line: u32) -> Option<Vec<RawCall>> {
    let declaration = find_declaration(parsed, name, line)?;
    Some(
        declaration
            .child_by_field_name("body")
            .map(|body| calls_in(body, parsed.source()))
            .unwrap_or_default(),
    )
}

/// Extracts the outermost calls beneath `node`.
#[must_use]
pub fn calls_in(node: tree_sitter::Node<'_>, source: &str) -> Vec<RawCall> {
    let mut calls = Vec::new();
    walk(node, source, &mut calls);
    calls
}

fn walk(node: tree_sitter::Node<'_>, source: &str, out: &mut Vec<RawCall>) {
    if is_call(node) {
        out.push(read_call(node, source, InvocationMode::Direct, start_line(node)));
        return;
    }
    match node.kind() {
        "defer_statement" | "go_statement" => {
            let mode = if node.kind() == "defer_statement" {
                InvocationMode::Deferred
            } else {
                InvocationMode::Concurrent
            };
            let line = start_line(node);
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if is_call(child) {
                    out.push(read_call(child, source, mode, line));
                } else {
                    walk(child, source, out);
                }
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                walk(child, source, out);
            }
        }
    }
}

/// Whether `node` invokes something.
///
/// A single-argument generic instantiation such as `Map[int](xs)` parses as
/// a conversion to a `generic_type`; it is read as a call to `Map`.
fn is_call(node: tree_sitter::Node<'_>) -> bool {
    match node.kind() {
        "call_expression" => true,
        "type_conversion_expression" => generic_base(node).is_some(),
        _ => false,
    }
}

fn generic_base(conversion: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    conversion
        .child_by_field_name("type")
        .filter(|ty| ty.kind() == "generic_type")
        .and_then(|ty| ty.child_by_field_name("type"))
}

fn read_call(
    node: tree_sitter::Node<'_>,
    source: &str,
    mode: InvocationMode,
    line: u32,
) -> RawCall {
    if node.kind() == "type_conversion_expression" {
        return read_generic_call(node, source, mode, line);
    }

    let target_node = node.child_by_field_name("function").map(unwrap_parens);
    let target = target_node.map_or_else(
        || CallTarget::Other(String::new()),
        |target| classify_target(target, source),
    );

    let mut arguments = Vec::new();
    let mut nested = Vec::new();
    if let Some(list) = node.child_by_field_name("arguments") {
        let mut cursor = list.walk();
        for argument in list
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
        {
            arguments.push(node_text(argument, source));
            walk(argument, source, &mut nested);
        }
    }
    if target == CallTarget::Literal
        && let Some(body) = target_node.and_then(|literal| literal.child_by_field_name("body"))
    {
        walk(body, source, &mut nested);
    }

    RawCall {
        target,
        line,
        text: node_text(node, source),
        arguments,
        nested,
        mode,
    }
}

fn read_generic_call(
    node: tree_sitter::Node<'_>,
    source: &str,
    mode: InvocationMode,
    line: u32,
) -> RawCall {
    let target = generic_base(node).map_or_else(
        || CallTarget::Other(node_text(node, source)),
        |base| classify_generic_base(base, source),
    );
    let mut arguments = Vec::new();
    let mut nested = Vec::new();
    if let Some(operand) = node.child_by_field_name("operand") {
        arguments.push(node_text(operand, source));
        walk(operand, source, &mut nested);
    }
    RawCall {
        target,
        line,
        text: node_text(node, source),
        arguments,
        nested,
        mode,
    }
}

fn unwrap_parens(node: tree_sitter::Node<'_>) -> tree_sitter::Node<'_> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        match current.named_child(0) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

fn classify_target(node: tree_sitter::Node<'_>, source: &str) -> CallTarget {
    match node.kind() {
        "identifier" => CallTarget::Identifier(node_text(node, source)),
        "selector_expression" => {
            let operand = node.child_by_field_name("operand");
            let field = node.child_by_field_name("field");
            match (operand, field) {
                (Some(operand), Some(field)) => CallTarget::Selector {
                    qualified: operand.kind() == "identifier",
                    operand: node_text(operand, source),
                    field: node_text(field, source),
                },
                _ => CallTarget::Other(node_text(node, source)),
            }
        }
        "func_literal" => CallTarget::Literal,
        kind if kind.ends_with("_type") || kind == "type_identifier" => {
            CallTarget::Conversion(node_text(node, source))
        }
        _ => CallTarget::Other(node_text(node, source)),
    }
}

fn classify_generic_base(base: tree_sitter::Node<'_>, source: &str) -> CallTarget {
    match base.kind() {
        "type_identifier" => CallTarget::Identifier(node_text(base, source)),
        "qualified_type" => {
            let package = base.child_by_field_name("package");
            let name = base.child_by_field_name("name");
            match (package, name) {
                (Some(package), Some(name)) => CallTarget::Selector {
                    operand: node_text(package, source),
                    field: node_text(name, source),
                    qualified: true,
                },
                _ => CallTarget::Other(node_text(base, source)),
            }
        }
        _ => CallTarget::Other(node_text(base, source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use rstest::rstest;

    fn calls_for(body: &str) -> Vec<RawCall> {
        let source = format!("package main\n\nfunc subject() {{\n{body}\n}}\n");
        let mut parser = Parser::go().expect("parser init");
        let parsed = parser.parse(&source).expect("parse");
        assert!(!parsed.has_errors(), "fixture should parse: {source}");
        function_calls(&parsed, "subject", 3).expect("declaration")
    }

    fn targets(calls: &[RawCall]) -> Vec<String> {
        calls.iter().map(|call| call.target.describe()).collect()
    }

    #[test]
    fn empty_body_has_no_calls() {
        assert!(calls_for("\tx := 1\n\t_ = x").is_empty());
    }

    #[test]
    fn nested_arguments_are_not_reported_at_top_level() {
        let calls = calls_for("\tOuter(Inner1(), Inner2(x))");
        let [outer] = calls.as_slice() else {
            panic!("expected one top-level call, got {calls:?}");
        };
        assert_eq!(outer.target, CallTarget::Identifier("Outer".to_owned()));
        assert_eq!(targets(&outer.nested), vec!["Inner1", "Inner2"]);
        assert_eq!(outer.arguments, vec!["Inner1()".to_owned(), "Inner2(x)".to_owned()]);
        assert_eq!(outer.line, 4);
    }

    #[test]
    fn nesting_recurses_through_arguments() {
        let calls = calls_for("\ta(b(c(d())))");
        let [a] = calls.as_slice() else {
            panic!("expected one call");
        };
        let [b] = a.nested.as_slice() else {
            panic!("expected one nested call");
        };
        let [c] = b.nested.as_slice() else {
            panic!("expected one nested call");
        };
        assert_eq!(targets(&c.nested), vec!["d"]);
    }

    #[test]
    fn selector_operand_text_is_kept_opaque() {
        let calls = calls_for("\tclient.Session().Store().Save(item)");
        let [save] = calls.as_slice() else {
            panic!("expected one call, got {calls:?}");
        };
        assert_eq!(
            save.target,
            CallTarget::Selector {
                operand: "client.Session().Store()".to_owned(),
                field: "Save".to_owned(),
                qualified: false,
            }
        );
        assert!(save.nested.is_empty());
    }

    #[rstest]
    #[case("\tdefer cleanup()", InvocationMode::Deferred)]
    #[case("\tgo worker(jobs)", InvocationMode::Concurrent)]
    #[case("\trun()", InvocationMode::Direct)]
    fn statements_tag_invocation_mode(#[case] body: &str, #[case] mode: InvocationMode) {
        let calls = calls_for(body);
        let [call] = calls.as_slice() else {
            panic!("expected one call");
        };
        assert_eq!(call.mode, mode);
        assert_eq!(call.line, 4);
    }

    #[test]
    fn invoked_literal_body_becomes_nested_after_arguments() {
        let calls = calls_for("\tfunc(v int) {\n\t\tfirst()\n\t\tsecond(v)\n\t}(seed())");
        let [literal] = calls.as_slice() else {
            panic!("expected one call, got {calls:?}");
        };
        assert_eq!(literal.target, CallTarget::Literal);
        assert_eq!(targets(&literal.nested), vec!["seed", "first", "second"]);
    }

    #[test]
    fn calls_inside_stored_literals_are_found_by_the_walk() {
        let calls = calls_for("\thandler := func() {\n\t\tinner()\n\t}\n\t_ = handler");
        assert_eq!(targets(&calls), vec!["inner"]);
        assert_eq!(calls.first().map(|call| call.line), Some(5));
    }

    #[test]
    fn indexed_targets_fall_back_to_source_text() {
        let calls = calls_for("\thandlers[0]()");
        let [call] = calls.as_slice() else {
            panic!("expected one call");
        };
        assert_eq!(call.target, CallTarget::Other("handlers[0]".to_owned()));
    }

    #[test]
    fn unknown_declarations_yield_none() {
        let mut parser = Parser::go().expect("parser init");
        let parsed = parser.parse("package main\n\nfunc a() {}\n").expect("parse");
        assert!(function_calls(&parsed, "missing", 3).is_none());
    }

    #[test]
    fn single_type_argument_instantiation_is_a_call() {
        let calls = calls_for("\tMap[int](load(xs))");
        let [call] = calls.as_slice() else {
            panic!("expected one call, got {calls:?}");
        };
        assert_eq!(call.target, CallTarget::Identifier("Map".to_owned()));
        assert_eq!(call.arguments, vec!["load(xs)".to_owned()]);
        assert_eq!(targets(&call.nested), vec!["load"]);
    }

    #[rstest]
    #[case("\tslices.Map[int](xs)", InvocationMode::Direct)]
    #[case("\tdefer slices.Map[int](xs)", InvocationMode::Deferred)]
    fn package_qualified_instantiation_is_a_selector(
        #[case] body: &str,
        #[case] mode: InvocationMode,
    ) {
        let calls = calls_for(body);
        let [call] = calls.as_slice() else {
            panic!("expected one call, got {calls:?}");
        };
        assert_eq!(
            call.target,
            CallTarget::Selector {
                operand: "slices".to_owned(),
                field: "Map".to_owned(),
                qualified: true,
            }
        );
        assert_eq!(call.mode, mode);
    }

    #[test]
    fn multiple_type_arguments_keep_the_callee_name() {
        let calls = calls_for("\tPair[int, string](a, b)");
        assert_eq!(targets(&calls), vec!["Pair"]);
    }
}
