//! Graphviz DOT rendering of a [`CallGraph`].
//!
//! Project functions are grouped into clusters: free functions by package,
//! methods by package and receiver. Synthetic targets (external, missing,
//! unresolved, method and literal calls) are drawn outside the clusters with
//! a shape per kind, and can be left out entirely.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use gocall_graph::{CallGraph, CallNode, NodeId, NodeKind};

const PACKAGE_COLOR: &str = "#AED6F1";
const STRUCT_COLOR: &str = "#F9E79F";

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotOptions {
    /// Draw synthetic targets and the edges leading to them.
    pub show_external: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            show_external: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Cluster<'a> {
    Package(&'a str),
    Struct(&'a str, &'a str),
}

impl Cluster<'_> {
    fn name(&self) -> String {
        match self {
            Self::Package(package) => format!("pkg_{package}"),
            Self::Struct(package, receiver) => format!("struct_{package}.{receiver}"),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Package(package) => format!("Package: {package}"),
            Self::Struct(package, receiver) => format!("Struct: {package}.{receiver}"),
        }
    }

    const fn color(&self) -> &'static str {
        match self {
            Self::Package(_) => PACKAGE_COLOR,
            Self::Struct(..) => STRUCT_COLOR,
        }
    }
}

/// Writes `graph` as a DOT digraph.
///
/// Output is ordered by cluster, node ID and edge endpoints so identical
/// graphs always render identically.
///
/// # Errors
///
/// Propagates failures from `out`.
pub fn render_dot(graph: &CallGraph, options: DotOptions, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "digraph G {{")?;
    writeln!(out, "    rankdir=LR;")?;
    writeln!(out, "    node [style=filled, fillcolor=lightgray];")?;
    writeln!(out, "    edge [color=gray50];")?;

    let mut clusters: BTreeMap<Cluster<'_>, Vec<&CallNode>> = BTreeMap::new();
    let mut loose: Vec<&CallNode> = Vec::new();
    for node in graph.sorted_nodes() {
        match (node.kind().is_function(), node.package()) {
            (true, Some(package)) => {
                let cluster = node.receiver().map_or(Cluster::Package(package), |receiver| {
                    Cluster::Struct(package, receiver)
                });
                clusters.entry(cluster).or_default().push(node);
            }
            _ if options.show_external => loose.push(node),
            _ => {}
        }
    }

    let mut drawn: BTreeSet<&NodeId> = BTreeSet::new();
    for (cluster, nodes) in &clusters {
        writeln!(out, "    subgraph cluster_{} {{", sanitize_identifier(&cluster.name()))?;
        writeln!(out, "        style=filled;")?;
        writeln!(out, "        color=\"{}\";", cluster.color())?;
        writeln!(out, "        label=\"{}\";", escape_label(&cluster.label()))?;
        for node in nodes {
            writeln!(out, "        {};", node_statement(node))?;
            drawn.insert(node.id());
        }
        writeln!(out, "    }}")?;
    }

    for node in loose {
        writeln!(out, "    {};", node_statement(node))?;
        drawn.insert(node.id());
    }

    for edge in graph.sorted_edges() {
        if drawn.contains(edge.caller()) && drawn.contains(edge.callee()) {
            writeln!(
                out,
                "    \"{}\" -> \"{}\";",
                sanitize_identifier(edge.caller().as_str()),
                sanitize_identifier(edge.callee().as_str())
            )?;
        }
    }

    writeln!(out, "}}")
}

fn node_statement(node: &CallNode) -> String {
    format!(
        "\"{}\" [label=\"{}\", {}]",
        sanitize_identifier(node.id().as_str()),
        escape_label(node.label()),
        node_attributes(node.kind())
    )
}

const fn node_attributes(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Internal => "shape=rectangle",
        NodeKind::Unindexed => "shape=rectangle, style=\"filled,dashed\"",
        NodeKind::External => "shape=oval",
        NodeKind::Method => "shape=oval, fillcolor=white",
        NodeKind::Missing => "shape=oval, style=\"filled,dashed\"",
        NodeKind::Unknown => "shape=diamond",
        NodeKind::Literal => "shape=note",
    }
}

/// Maps `name` to a DOT identifier: every character other than a letter,
/// digit or underscore becomes `_`, and the byte length of `name` is
/// appended so distinct names stay distinct.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("{safe}_{}", name.len())
}

/// Escapes text for use inside a quoted DOT label.
#[must_use]
pub fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("main.A", "main_A_6")]
    #[case("x/Worker.Run", "x_Worker_Run_12")]
    #[case("ext:fmt.Println", "ext_fmt_Println_15")]
    #[case("", "_0")]
    fn sanitises_identifiers(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(sanitize_identifier(name), expected);
    }

    #[test]
    fn sanitised_names_keep_length_apart() {
        assert_ne!(sanitize_identifier("a.b"), sanitize_identifier("a_b_"));
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("say \"hi\"", "say \\\"hi\\\"")]
    #[case("a\\b", "a\\\\b")]
    #[case("one\r\ntwo", "one\\ntwo")]
    fn escapes_labels(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape_label(text), expected);
    }
}
