//! End-to-end tests for gocall-syntax.
//!
//! These parse realistic Go files through the public API and snapshot the
//! extracted call trees.

use std::fmt::Write as _;

use insta::assert_snapshot;
use rstest::{fixture, rstest};

use gocall_syntax::{Parser, RawCall, SourceSummary, SyntaxError, function_calls};

const SERVER: &str = r#"package server

import (
	"fmt"
	"net/http"

	"example.com/shop/internal/store"
)

type Server struct {
	db *store.DB
}

func (s *Server) Handle(w http.ResponseWriter, r *http.Request) {
	defer r.Body.Close()
	item, err := s.db.Find(parseID(r.URL.Query().Get("id")))
	if err != nil {
		http.Error(w, err.Error(), http.StatusNotFound)
		return
	}
	go audit(func() string { return describe(item) }())
	fmt.Fprintln(w, len(item.Name))
}
"#;

#[fixture]
fn go_parser() -> Parser {
    Parser::go().unwrap_or_else(|err| panic!("parser: {err}"))
}

fn render(calls: &[RawCall], depth: usize, out: &mut String) {
    for call in calls {
        let indent = "  ".repeat(depth);
        writeln!(
            out,
            "{indent}{} @{} [{}]",
            call.target.describe(),
            call.line,
            call.mode
        )
        .unwrap_or_else(|err| panic!("render: {err}"));
        render(&call.nested, depth + 1, out);
    }
}

#[rstest]
fn method_call_tree_snapshot(mut go_parser: Parser) {
    let parsed = go_parser
        .parse(SERVER)
        .unwrap_or_else(|err| panic!("parse: {err}"));
    let summary = SourceSummary::from_parse(&parsed).unwrap_or_else(|err| panic!("{err}"));
    let Some(handle) = summary.functions.first() else {
        panic!("expected a declaration");
    };
    assert_eq!(handle.receiver.as_deref(), Some("Server"));

    let calls = function_calls(&parsed, &handle.name, handle.start_line)
        .unwrap_or_else(|| panic!("declaration should be found"));
    let mut rendered = String::new();
    render(&calls, 0, &mut rendered);

    assert_snapshot!(rendered, @r"
    r.Body.Close @15 [defer]
    s.db.Find @16 [direct]
      parseID @16 [direct]
        r.URL.Query().Get @16 [direct]
    http.Error @18 [direct]
      err.Error @18 [direct]
    audit @21 [go]
      func literal @21 [direct]
        describe @21 [direct]
    fmt.Fprintln @22 [direct]
      len @22 [direct]
    ");
}

#[rstest]
fn summary_records_package_and_imports(mut go_parser: Parser) {
    let parsed = go_parser
        .parse(SERVER)
        .unwrap_or_else(|err| panic!("parse: {err}"));
    let summary = SourceSummary::from_parse(&parsed).unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(summary.package, "server");
    assert_eq!(summary.imports.resolve("store"), Some("example.com/shop/internal/store"));
    assert_eq!(summary.imports.resolve("http"), Some("net/http"));
}

#[rstest]
fn broken_files_are_rejected(mut go_parser: Parser) {
    let parsed = go_parser
        .parse("package broken\n\nfunc half( {\n")
        .unwrap_or_else(|err| panic!("parse: {err}"));

    assert!(matches!(
        SourceSummary::from_parse(&parsed),
        Err(SyntaxError::InvalidSource { .. })
    ));
}
