//! Unit tests for the gocall-graph crate.

// Tests use caller/callee terminology which triggers similar_names lint
#![expect(
    clippy::similar_names,
    reason = "caller/callee are domain terms for tests"
)]


use gocall_syntax::{FunctionDecl, InvocationMode};

use crate::call_site::{CallKind, CallSite, ExternalOrigin};
use crate::descriptor::{FunctionDescriptor, FunctionId};
use crate::registry::{FunctionRegistry, RegistryBuilder};

fn descriptor(package: &str, receiver: Option<&str>, name: &str, line: u32) -> FunctionDescriptor {
    FunctionDescriptor::from_decl(
        package,
        format!("example.com/app/{package}"),
        format!("/src/app/{package}/{package}.go"),
        FunctionDecl {
            name: name.to_owned(),
            receiver: receiver.map(str::to_owned),
            parameters: Vec::new(),
            returns: Vec::new(),
            start_line: line,
            end_line: line + 2,
            has_body: true,
        },
    )
}

fn registry(descriptors: Vec<FunctionDescriptor>) -> FunctionRegistry {
    let mut builder = RegistryBuilder::new();
    for descriptor in descriptors {
        builder
            .insert(descriptor)
            .unwrap_or_else(|diagnostic| panic!("unexpected duplicate: {diagnostic}"));
    }
    builder.freeze()
}

fn site(kind: CallKind, line: u32) -> CallSite {
    CallSite {
        kind,
        line,
        text: String::new(),
        arguments: Vec::new(),
        nested: Vec::new(),
        mode: InvocationMode::Direct,
    }
}

mod graph_tests {
    use gocall_syntax::InvocationMode;

    use super::descriptor;
    use crate::edge::EdgeKind;
    use crate::graph::{CallGraph, Direction};
    use crate::node::{CallNode, NodeKind};

    fn chain() -> CallGraph {
        let mut graph = CallGraph::new();
        for (name, line) in [("a", 1), ("b", 5), ("c", 9)] {
            graph.add_node(CallNode::internal(&descriptor("main", None, name, line)));
        }
        let ids: Vec<_> = graph.sorted_nodes().iter().map(|n| n.id().clone()).collect();
        let [a, b, c] = ids.as_slice() else {
            panic!("expected three nodes");
        };
        assert!(graph.add_call(a, b, EdgeKind::Local, 2, InvocationMode::Direct));
        assert!(graph.add_call(b, c, EdgeKind::Local, 6, InvocationMode::Direct));
        graph
    }

    #[test]
    fn empty_graph_has_no_nodes() {
        let graph = CallGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn can_add_and_retrieve_node() {
        let mut graph = CallGraph::new();
        let node = CallNode::internal(&descriptor("main", None, "main", 3));
        let id = node.id().clone();

        graph.add_node(node);

        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains_node(&id));
        assert_eq!(graph.node(&id).map(CallNode::label), Some("main"));
        assert_eq!(id.as_str(), "main.main");
    }

    #[test]
    fn repeated_pairs_share_one_edge() {
        let mut graph = CallGraph::new();
        let caller = graph.ensure_node(CallNode::internal(&descriptor("main", None, "run", 1)));
        let callee = graph.ensure_node(CallNode::synthetic(NodeKind::External, "fmt.Println", "fmt.Println"));

        assert!(graph.add_call(&caller, &callee, EdgeKind::External, 4, InvocationMode::Direct));
        assert!(graph.add_call(&caller, &callee, EdgeKind::External, 2, InvocationMode::Deferred));
        assert!(graph.add_call(&caller, &callee, EdgeKind::External, 4, InvocationMode::Direct));

        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edges().next().expect("edge");
        assert_eq!(edge.lines(), &[2, 4]);
        assert!(edge.has_mode(InvocationMode::Deferred));
        assert!(!edge.has_mode(InvocationMode::Concurrent));
    }

    #[test]
    fn calls_between_absent_nodes_are_ignored() {
        let mut graph = CallGraph::new();
        let caller = graph.ensure_node(CallNode::internal(&descriptor("main", None, "run", 1)));
        let ghost = CallNode::synthetic(NodeKind::Unknown, "ghost", "ghost");

        assert!(!graph.add_call(&caller, ghost.id(), EdgeKind::External, 2, InvocationMode::Direct));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn ensure_node_keeps_the_first_node() {
        let mut graph = CallGraph::new();
        let internal = CallNode::internal(&descriptor("main", None, "run", 1));
        let id = graph.ensure_node(internal);
        graph.ensure_node(CallNode::unindexed(&super::FunctionId::function("main", "run")));

        assert_eq!(graph.node(&id).map(CallNode::kind), Some(NodeKind::Internal));
    }

    #[test]
    fn reachability_follows_direction() {
        let graph = chain();
        let a = graph.find_by_name("main.a").expect("a").id().clone();
        let c = graph.find_by_name("main.c").expect("c").id().clone();

        let downstream: Vec<_> = graph
            .reachable(&a, Direction::Downstream)
            .iter()
            .map(|n| n.label().to_owned())
            .collect();
        assert_eq!(downstream, ["b", "c"]);

        let upstream: Vec<_> = graph
            .reachable(&c, Direction::Upstream)
            .iter()
            .map(|n| n.label().to_owned())
            .collect();
        assert_eq!(upstream, ["a", "b"]);
    }

    #[test]
    fn callers_and_callees_use_the_indices() {
        let graph = chain();
        let b = graph.find_by_name("b").expect("b").id().clone();

        let callers: Vec<_> = graph.callers_of(&b).map(CallNode::label).collect();
        let callees: Vec<_> = graph.callees_of(&b).map(CallNode::label).collect();
        assert_eq!(callers, ["a"]);
        assert_eq!(callees, ["c"]);
    }

    #[test]
    fn get_node_reports_missing_ids() {
        let graph = CallGraph::new();
        let ghost = CallNode::synthetic(NodeKind::Unknown, "ghost", "ghost");
        assert!(graph.get_node(ghost.id()).is_err());
    }
}

mod assembler_tests {
    use rstest::rstest;

    use super::{descriptor, registry, site};
    use crate::assembler::assemble;
    use crate::call_site::{CallKind, ExternalOrigin};
    use crate::descriptor::FunctionId;
    use crate::edge::EdgeKind;
    use crate::node::NodeKind;
    use crate::resolver::Resolution;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(4)]
    fn every_descriptor_becomes_a_node(#[case] count: u32) {
        let descriptors = (0..count)
            .map(|index| descriptor("main", None, &format!("f{index}"), index * 10 + 1))
            .collect();
        let registry = registry(descriptors);

        let graph = assemble(&registry, &Resolution::default());

        assert_eq!(graph.node_count(), registry.len());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn nested_sites_add_edges_from_the_enclosing_function() {
        let registry = registry(vec![
            descriptor("main", None, "run", 1),
            descriptor("main", None, "Inner", 10),
        ]);
        let mut outer = site(
            CallKind::External {
                function: "Outer".to_owned(),
                origin: ExternalOrigin::Unknown,
            },
            2,
        );
        outer
            .nested
            .push(site(CallKind::Local(FunctionId::function("main", "Inner")), 2));
        let mut resolution = Resolution::default();
        resolution.insert(FunctionId::function("main", "run"), vec![outer]);

        let graph = assemble(&registry, &resolution);

        let run = graph.find_by_name("main.run").expect("run").id().clone();
        let mut callees: Vec<_> = graph
            .outgoing_edges(&run)
            .map(|edge| (edge.kind(), edge.callee().as_str().to_owned()))
            .collect();
        callees.sort_by(|a, b| a.1.cmp(&b.1));
        assert_eq!(
            callees,
            [
                (EdgeKind::Local, "main.Inner".to_owned()),
                (EdgeKind::External, "unknown:Outer".to_owned()),
            ]
        );
    }

    #[test]
    fn same_method_text_shares_a_node_but_literals_do_not() {
        let registry = registry(vec![
            descriptor("main", None, "a", 1),
            descriptor("main", None, "b", 10),
        ]);
        let method = || {
            site(
                CallKind::Method {
                    receiver: "w".to_owned(),
                    method: "Run".to_owned(),
                },
                3,
            )
        };
        let mut resolution = Resolution::default();
        resolution.insert(
            FunctionId::function("main", "a"),
            vec![method(), site(CallKind::Literal, 2)],
        );
        resolution.insert(
            FunctionId::function("main", "b"),
            vec![method(), site(CallKind::Literal, 11)],
        );

        let graph = assemble(&registry, &resolution);

        let kinds: Vec<_> = graph.sorted_nodes().iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds.iter().filter(|kind| **kind == NodeKind::Method).count(),
            1
        );
        assert_eq!(
            kinds.iter().filter(|kind| **kind == NodeKind::Literal).count(),
            2
        );
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn literals_on_one_line_get_separate_nodes() {
        let registry = registry(vec![descriptor("main", None, "run", 1)]);
        let mut resolution = Resolution::default();
        resolution.insert(
            FunctionId::function("main", "run"),
            vec![site(CallKind::Literal, 2), site(CallKind::Literal, 2)],
        );

        let graph = assemble(&registry, &resolution);

        let literals: Vec<String> = graph
            .sorted_nodes()
            .iter()
            .filter(|node| node.kind() == NodeKind::Literal)
            .map(|node| node.id().to_string())
            .collect();
        assert_eq!(literals, ["literal:main.run#1", "literal:main.run#2"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn cross_package_targets_without_descriptors_become_placeholders() {
        let registry = registry(vec![descriptor("main", None, "run", 1)]);
        let mut resolution = Resolution::default();
        resolution.insert(
            FunctionId::function("main", "run"),
            vec![site(
                CallKind::CrossModule(FunctionId::method("store", "DB", "Find")),
                3,
            )],
        );

        let graph = assemble(&registry, &resolution);

        let placeholder = graph.find_by_name("store/DB.Find").expect("placeholder");
        assert_eq!(placeholder.kind(), NodeKind::Unindexed);
        assert_eq!(graph.function_nodes().len(), 2);
    }
}

mod resolver_tests {
    use gocall_syntax::{CallTarget, ImportTable, InvocationMode, RawCall};
    use rstest::rstest;

    use super::{ExternalOrigin, registry};
    use crate::call_site::CallKind;
    use crate::descriptor::FunctionId;
    use crate::manifest::ModuleManifest;
    use crate::resolver::Classifier;

    fn classify(target: CallTarget) -> CallKind {
        let registry = registry(vec![
            super::descriptor("main", None, "helper", 1),
            super::descriptor("store", None, "Open", 1),
        ]);
        let manifest = ModuleManifest::new("/src/app/go.mod", "example.com/app");
        let mut imports = ImportTable::new();
        imports.insert("fmt", "fmt");
        imports.insert("store", "example.com/app/store");
        imports.insert("cache", "example.com/app/cache");
        let classifier = Classifier {
            registry: &registry,
            manifest: &manifest,
            imports: &imports,
            package: "main",
        };
        classifier.classify(&target)
    }

    fn selector(operand: &str, field: &str) -> CallTarget {
        CallTarget::Selector {
            operand: operand.to_owned(),
            field: field.to_owned(),
            qualified: true,
        }
    }

    #[test]
    fn identifiers_resolve_in_the_callers_package() {
        assert_eq!(
            classify(CallTarget::Identifier("helper".to_owned())),
            CallKind::Local(FunctionId::function("main", "helper"))
        );
    }

    #[test]
    fn unknown_identifiers_are_unresolved() {
        assert_eq!(
            classify(CallTarget::Identifier("mystery".to_owned())),
            CallKind::External {
                function: "mystery".to_owned(),
                origin: ExternalOrigin::Unknown,
            }
        );
    }

    #[rstest]
    #[case(selector("fmt", "Println"), "external")]
    #[case(selector("store", "Open"), "cross-module")]
    #[case(selector("cache", "Get"), "missing")]
    #[case(selector("w", "Run"), "method")]
    #[case(CallTarget::Literal, "literal")]
    fn selectors_are_classified_by_operand(#[case] target: CallTarget, #[case] expected: &str) {
        assert_eq!(classify(target).label(), expected);
    }

    #[test]
    fn project_functions_shadow_builtins() {
        let registry = registry(vec![
            super::descriptor("main", None, "max", 1),
            super::descriptor("main", None, "helper", 5),
        ]);
        let manifest = ModuleManifest::new("/src/app/go.mod", "example.com/app");
        let imports = ImportTable::new();
        let classifier = Classifier {
            registry: &registry,
            manifest: &manifest,
            imports: &imports,
            package: "main",
        };
        let call = |name: &str, nested: Vec<RawCall>| RawCall {
            target: CallTarget::Identifier(name.to_owned()),
            line: 9,
            text: format!("{name}()"),
            arguments: Vec::new(),
            nested,
            mode: InvocationMode::Direct,
        };

        let sites = classifier.classify_all(vec![
            call("max", Vec::new()),
            call("len", vec![call("helper", Vec::new())]),
        ]);

        let kinds: Vec<&CallKind> = sites.iter().map(|site| &site.kind).collect();
        assert_eq!(
            kinds,
            [
                &CallKind::Local(FunctionId::function("main", "max")),
                &CallKind::Local(FunctionId::function("main", "helper")),
            ]
        );
    }
}
