//! Shared position conversion helpers.
//!
//! Tree-sitter positions are zero-based. Everything this crate reports uses
//! one-based line and column numbers.

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// One-based line on which `node` starts.
#[must_use]
pub(crate) fn start_line(node: tree_sitter::Node<'_>) -> u32 {
    point_to_one_based(node.start_position()).0
}

/// One-based line on which `node` ends.
#[must_use]
pub(crate) fn end_line(node: tree_sitter::Node<'_>) -> u32 {
    point_to_one_based(node.end_position()).0
}

/// Source text covered by `node`, or an empty string for invalid UTF-8.
#[must_use]
pub(crate) fn node_text(node: tree_sitter::Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes())
        .map(str::to_owned)
        .unwrap_or_default()
}
