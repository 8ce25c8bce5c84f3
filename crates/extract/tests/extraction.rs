//! End-to-end extraction over small projects on disk

use pretty_assertions::assert_eq;
use proofctx_extract::{
    DependencyExtractor, DependencyIndex, ExtractError, InMemorySources, SymbolKey,
};
use proofctx_graph::{DepGraph, GraphError};
use proofctx_protocol::StatementRecord;
use proofctx_resolver::{ModuleResolver, ResolverConfig};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use tempfile::TempDir;

fn project(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
    }
    dir
}

fn chain(files: &[&str]) -> DepGraph {
    let mut graph = DepGraph::new();
    for file in files {
        graph.add_node(file);
    }
    for pair in files.windows(2) {
        graph.add_edge(pair[0], pair[1]);
    }
    graph
}

fn extract(
    dir: &TempDir,
    graph: &DepGraph,
    sources: &mut InMemorySources,
) -> Result<DependencyIndex, ExtractError> {
    let config = ResolverConfig::new(dir.path()).with_mapping(".", "");
    let resolver = ModuleResolver::new(config).unwrap();
    DependencyExtractor::new(resolver).run(graph, sources)
}

fn cross_file(index: &DependencyIndex, file: &str, name: &str) -> BTreeMap<String, BTreeSet<String>> {
    index
        .dependencies(&SymbolKey::new(file, name))
        .unwrap()
        .cross_file
        .clone()
}

fn deps(pairs: &[(&str, &[&str])]) -> BTreeMap<String, BTreeSet<String>> {
    pairs
        .iter()
        .map(|(file, names)| {
            (
                file.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            )
        })
        .collect()
}

fn watches(index: &DependencyIndex, file: &str) -> Vec<String> {
    index.file(file).unwrap().import_watches().iter().cloned().collect()
}

#[test]
fn test_unqualified_reference_through_import() {
    let dir = project(&["A.v", "B.v"]);
    let mut sources = InMemorySources::new()
        .with_file("./A.v", vec![StatementRecord::definition("foo", "Definition foo := 1.")])
        .with_file(
            "./B.v",
            vec![
                StatementRecord::source("Require Import A."),
                StatementRecord::definition("bar", "Definition bar := foo.").with_references(["foo"]),
            ],
        );

    let index = extract(&dir, &chain(&["./A.v", "./B.v"]), &mut sources).unwrap();

    assert_eq!(cross_file(&index, "./B.v", "bar"), deps(&[("./A.v", &["foo"])]));
    assert!(cross_file(&index, "./A.v", "foo").is_empty());
}

#[test]
fn test_export_chain_is_visible_to_importer() {
    let dir = project(&["A.v", "B.v", "C.v"]);
    let mut sources = InMemorySources::new()
        .with_file("./B.v", vec![StatementRecord::source("Require Export A.")])
        .with_file("./C.v", vec![StatementRecord::source("Require Import B.")]);

    let index = extract(&dir, &chain(&["./A.v", "./B.v", "./C.v"]), &mut sources).unwrap();

    assert_eq!(watches(&index, "./C.v"), vec!["./A.v", "./B.v"]);
    assert_eq!(
        index.file("./B.v").unwrap().exports().iter().collect::<Vec<_>>(),
        vec!["./A.v"]
    );
}

#[test]
fn test_exports_propagate_across_long_chains() {
    let dir = project(&["A.v", "B.v", "C.v", "D.v"]);
    let mut sources = InMemorySources::new()
        .with_file("./A.v", vec![StatementRecord::definition("base", "Definition base := 0.")])
        .with_file("./B.v", vec![StatementRecord::source("Require Export A.")])
        .with_file("./C.v", vec![StatementRecord::source("Require Export B.")])
        .with_file(
            "./D.v",
            vec![
                StatementRecord::source("Require Import C."),
                StatementRecord::definition("top", "Definition top := base.")
                    .with_references(["base"]),
            ],
        );

    let index = extract(&dir, &chain(&["./A.v", "./B.v", "./C.v", "./D.v"]), &mut sources).unwrap();

    assert!(watches(&index, "./D.v").contains(&"./A.v".to_string()));
    assert_eq!(cross_file(&index, "./D.v", "top"), deps(&[("./A.v", &["base"])]));
}

#[test]
fn test_exports_reach_importers_through_plain_imports() {
    let dir = project(&["A.v", "B.v", "C.v", "D.v"]);
    let mut sources = InMemorySources::new()
        .with_file("./A.v", vec![StatementRecord::definition("foo", "Definition foo := 0.")])
        .with_file("./B.v", vec![StatementRecord::source("Require Export A.")])
        .with_file("./C.v", vec![StatementRecord::source("Require Import B.")])
        .with_file(
            "./D.v",
            vec![
                StatementRecord::source("Require Import C."),
                StatementRecord::definition("bar", "Definition bar := foo.")
                    .with_references(["foo"]),
            ],
        );

    let index = extract(&dir, &chain(&["./A.v", "./B.v", "./C.v", "./D.v"]), &mut sources).unwrap();

    assert_eq!(watches(&index, "./D.v"), vec!["./A.v", "./C.v"]);
    assert_eq!(cross_file(&index, "./D.v", "bar"), deps(&[("./A.v", &["foo"])]));
}

#[test]
fn test_qualified_references_resolve_through_require_alias() {
    let dir = project(&["Data/Tuple.v", "Main.v"]);
    let mut sources = InMemorySources::new()
        .with_file(
            "./Data/Tuple.v",
            vec![StatementRecord::definition("fst", "Definition fst := 1.")],
        )
        .with_file(
            "./Main.v",
            vec![
                StatementRecord::source("Require Data.Tuple."),
                StatementRecord::definition("use_fst", "Definition use_fst := Tuple.fst.")
                    .with_references(["Tuple.fst", "Data.Tuple.fst"]),
            ],
        );

    let index = extract(&dir, &chain(&["./Data/Tuple.v", "./Main.v"]), &mut sources).unwrap();

    assert_eq!(
        cross_file(&index, "./Main.v", "use_fst"),
        deps(&[("./Data/Tuple.v", &["fst"])])
    );
    // A bare Require does not make names visible.
    assert!(watches(&index, "./Main.v").is_empty());
}

#[test]
fn test_external_references_are_skipped() {
    let dir = project(&["A.v", ".opam/lib/coq/Nat.v"]);
    let mut sources = InMemorySources::new().with_file(
        "./A.v",
        vec![
            StatementRecord::source("Require Import Coq.Nat."),
            StatementRecord::definition("two", "Definition two := Nat.add 1 1.")
                .with_references(["Nat.add", "Coq.Nat.add"]),
        ],
    );

    let index = extract(&dir, &chain(&["./A.v"]), &mut sources).unwrap();

    assert!(cross_file(&index, "./A.v", "two").is_empty());
    assert!(watches(&index, "./A.v").is_empty());
}

#[test]
fn test_references_into_own_file_are_dropped() {
    let dir = project(&["A.v"]);
    let mut sources = InMemorySources::new().with_file(
        "./A.v",
        vec![
            StatementRecord::definition("foo", "Definition foo := 1."),
            StatementRecord::definition("bar", "Definition bar := A.foo.")
                .with_references(["A.foo", "foo"]),
        ],
    );

    let index = extract(&dir, &chain(&["./A.v"]), &mut sources).unwrap();

    assert!(cross_file(&index, "./A.v", "bar").is_empty());
}

#[test]
fn test_class_fields_resolve_to_their_class() {
    let dir = project(&["A.v", "B.v"]);
    let mut sources = InMemorySources::new()
        .with_file(
            "./A.v",
            vec![StatementRecord::definition(
                "Monoid",
                "Class Monoid (A : Type) := {\n  op : A -> A -> A;\n  unit : A\n}.",
            )],
        )
        .with_file(
            "./B.v",
            vec![
                StatementRecord::source("Require Import A."),
                StatementRecord::definition("twice", "Definition twice x := op x x.")
                    .with_references(["op"]),
            ],
        );

    let index = extract(&dir, &chain(&["./A.v", "./B.v"]), &mut sources).unwrap();

    assert_eq!(cross_file(&index, "./B.v", "twice"), deps(&[("./A.v", &["Monoid"])]));
}

#[test]
fn test_context_snapshot_precedes_proof() {
    let dir = project(&["A.v"]);
    let mut sources = InMemorySources::new().with_file(
        "./A.v",
        vec![
            StatementRecord::source("Set Implicit Arguments."),
            StatementRecord::definition("x", "Definition x := 1."),
            StatementRecord::definition("x_pos", "Lemma x_pos : x > 0."),
            StatementRecord::definition("x_pos", "Lemma x_pos : x > 0.")
                .with_body("Proof. auto. Qed."),
            StatementRecord::notation("Notation \"'one'\" := x."),
        ],
    );

    let index = extract(&dir, &chain(&["./A.v"]), &mut sources).unwrap();

    let entry = index.symbol(&SymbolKey::new("./A.v", "x_pos")).unwrap();
    assert_eq!(
        entry.dependencies.context_snapshot,
        "Set Implicit Arguments.\nDefinition x := 1.\nLemma x_pos : x > 0.\n"
    );
    assert_eq!(entry.body.as_deref(), Some("Proof. auto. Qed."));
    assert_eq!(index.file("./A.v").unwrap().notations(), ["Notation \"'one'\" := x."]);
}

#[test]
fn test_symbol_graph_closure_becomes_in_file_dependencies() {
    let dir = project(&["A.v"]);
    let mut symbol_graph = DepGraph::new();
    symbol_graph.add_edge("c", "b");
    symbol_graph.add_edge("b", "a");
    let mut sources = InMemorySources::new()
        .with_file(
            "./A.v",
            vec![
                StatementRecord::definition("a", "Definition a := 0."),
                StatementRecord::definition("b", "Definition b := a."),
                StatementRecord::definition("c", "Definition c := b."),
            ],
        )
        .with_symbol_graph("./A.v", symbol_graph);

    let index = extract(&dir, &chain(&["./A.v"]), &mut sources).unwrap();

    let in_file = &index
        .dependencies(&SymbolKey::new("./A.v", "c"))
        .unwrap()
        .in_file;
    assert_eq!(in_file.iter().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_malformed_require_fails_the_run() {
    let dir = project(&["A.v"]);
    let mut sources =
        InMemorySources::new().with_file("./A.v", vec![StatementRecord::source("Require.")]);

    let err = extract(&dir, &chain(&["./A.v"]), &mut sources).unwrap_err();

    assert!(matches!(err, ExtractError::MalformedImport { .. }));
}

#[test]
fn test_cyclic_file_graph_is_fatal() {
    let dir = project(&["A.v", "B.v"]);
    let mut graph = DepGraph::new();
    graph.add_edge("./A.v", "./B.v");
    graph.add_edge("./B.v", "./A.v");

    let err = extract(&dir, &graph, &mut InMemorySources::new()).unwrap_err();

    assert!(matches!(
        err,
        ExtractError::Graph(GraphError::Cycle { emitted: 0, total: 2 })
    ));
}

#[test]
fn test_stats_count_the_run() {
    let dir = project(&["A.v", "B.v"]);
    let mut sources = InMemorySources::new()
        .with_file(
            "./A.v",
            vec![
                StatementRecord::definition("foo", "Lemma foo : True."),
                StatementRecord::definition("foo", "Lemma foo : True.").with_body("Proof. exact I. Qed."),
            ],
        )
        .with_file(
            "./B.v",
            vec![
                StatementRecord::source("Require Import A."),
                StatementRecord::definition("bar", "Lemma bar : True.").with_references(["foo"]),
            ],
        );

    let index = extract(&dir, &chain(&["./A.v", "./B.v"]), &mut sources).unwrap();
    let stats = index.stats();

    assert_eq!(stats.files, 2);
    assert_eq!(stats.symbols, 2);
    assert_eq!(stats.bodies, 1);
    assert_eq!(stats.cross_file_edges, 1);
    assert_eq!(index.processing_order(), ["./A.v", "./B.v"]);
}
