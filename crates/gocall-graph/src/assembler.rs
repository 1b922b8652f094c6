//! Folding descriptors and call sites into a [`CallGraph`].

use tracing::info;

use crate::GRAPH_TARGET;
use crate::call_site::{CallKind, CallSite, ExternalOrigin};
use crate::edge::EdgeKind;
use crate::graph::CallGraph;
use crate::node::{CallNode, NodeId, NodeKind};
use crate::registry::FunctionRegistry;
use crate::resolver::Resolution;

/// Builds the call graph for `registry` from the call sites in `resolution`.
///
/// Every descriptor becomes an internal node, even when it makes no calls.
/// Nested call sites produce edges from the enclosing function just like
/// top-level ones. Each literal invocation gets a node of its own, keyed by
/// its caller and its position among that caller's literals.
#[must_use]
pub fn assemble(registry: &FunctionRegistry, resolution: &Resolution) -> CallGraph {
    let mut graph = CallGraph::new();
    for descriptor in registry.iter() {
        graph.add_node(CallNode::internal(descriptor));
    }

    for (caller_id, sites) in resolution.iter() {
        let caller = graph.ensure_node(
            registry
                .get(caller_id)
                .map_or_else(|| CallNode::unindexed(caller_id), CallNode::internal),
        );
        let mut literals = 0_usize;
        for site in sites {
            site.visit(&mut |visited| add_site(&mut graph, &caller, visited, &mut literals));
        }
    }

    info!(
        target: GRAPH_TARGET,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "assembled call graph"
    );
    graph
}

fn add_site(graph: &mut CallGraph, caller: &NodeId, site: &CallSite, literals: &mut usize) {
    if matches!(site.kind, CallKind::Literal) {
        *literals += 1;
    }
    let callee = graph.ensure_node(target_node(caller, site, *literals));
    graph.add_call(caller, &callee, EdgeKind::for_call(&site.kind), site.line, site.mode);
}

fn target_node(caller: &NodeId, site: &CallSite, literal_ordinal: usize) -> CallNode {
    match &site.kind {
        CallKind::Local(id) | CallKind::CrossModule(id) => CallNode::unindexed(id),
        CallKind::Method { receiver, method } => {
            let label = format!("{receiver}.{method}");
            CallNode::synthetic(NodeKind::Method, &label, label.clone())
        }
        CallKind::External { origin, .. } => {
            let kind = match origin {
                ExternalOrigin::Unknown => NodeKind::Unknown,
                ExternalOrigin::Missing { .. } => NodeKind::Missing,
                ExternalOrigin::Import { .. } => NodeKind::External,
            };
            let label = site.kind.to_string();
            CallNode::synthetic(kind, &label, label.clone())
        }
        CallKind::Literal => CallNode::synthetic(
            NodeKind::Literal,
            &format!("{caller}#{literal_ordinal}"),
            format!("func literal (line {})", site.line),
        ),
    }
}
