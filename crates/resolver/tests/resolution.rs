//! Resolution through fake lookup sessions and the load-path fallback

use pretty_assertions::assert_eq;
use proofctx_resolver::{
    LookupResponse, LookupSession, ModuleResolver, NameResolver, ResolveError, ResolverConfig,
    ResolverStats, Result, SessionFactory,
};
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Default)]
struct Counters {
    opened: Cell<usize>,
    closed: Cell<usize>,
    requests: Cell<usize>,
}

struct FakeSession {
    responses: HashMap<String, LookupResponse>,
    fail: bool,
    counters: Rc<Counters>,
}

impl LookupSession for FakeSession {
    fn request(&mut self, request: &str) -> Result<LookupResponse> {
        self.counters.requests.set(self.counters.requests.get() + 1);
        if self.fail {
            return Err(ResolveError::session("service crashed"));
        }
        Ok(self
            .responses
            .get(request)
            .cloned()
            .unwrap_or(LookupResponse::NotModule))
    }

    fn close(&mut self) -> Result<()> {
        self.counters.closed.set(self.counters.closed.get() + 1);
        Ok(())
    }
}

struct FakeFactory {
    responses: HashMap<String, LookupResponse>,
    fail: bool,
    counters: Rc<Counters>,
}

impl SessionFactory for FakeFactory {
    fn open(&self) -> Result<Box<dyn LookupSession>> {
        self.counters.opened.set(self.counters.opened.get() + 1);
        Ok(Box::new(FakeSession {
            responses: self.responses.clone(),
            fail: self.fail,
            counters: Rc::clone(&self.counters),
        }))
    }
}

fn project(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(* source *)\n").unwrap();
    }
    dir
}

fn responses(pairs: &[(&str, LookupResponse)]) -> HashMap<String, LookupResponse> {
    pairs
        .iter()
        .map(|(request, response)| (request.to_string(), response.clone()))
        .collect()
}

fn located(artifact: impl Into<PathBuf>) -> LookupResponse {
    LookupResponse::Located(artifact.into())
}

fn root_resolver(dir: &Path) -> ModuleResolver {
    ModuleResolver::new(ResolverConfig::new(dir).with_mapping(".", "")).unwrap()
}

fn resolver_with_service(
    dir: &Path,
    pairs: &[(&str, LookupResponse)],
    fail: bool,
) -> (ModuleResolver, Rc<Counters>) {
    let counters = Rc::new(Counters::default());
    let factory = FakeFactory {
        responses: responses(pairs),
        fail,
        counters: Rc::clone(&counters),
    };
    (root_resolver(dir).with_session_factory(factory), counters)
}

#[test]
fn test_located_artifact_maps_to_source_file() {
    let dir = project(&["theories/A.v"]);
    let (mut resolver, _) =
        resolver_with_service(dir.path(), &[("Require Lib.A.", located("theories/A.vo"))], false);

    assert_eq!(resolver.resolve("Lib.A"), Some(PathBuf::from("theories/A.v")));
}

#[test]
fn test_repeated_resolution_uses_cache() {
    let dir = project(&["A.v"]);
    let (mut resolver, counters) =
        resolver_with_service(dir.path(), &[("Require A.", located("A.vo"))], false);

    let first = resolver.resolve("A");
    let second = resolver.resolve("A.");

    assert_eq!(first, Some(PathBuf::from("A.v")));
    assert_eq!(first, second);
    assert_eq!(counters.requests.get(), 1);
    assert_eq!(counters.opened.get(), 1);
    assert_eq!(
        resolver.stats(),
        ResolverStats {
            requests: 2,
            cache_hits: 1,
            resolved: 1,
            unresolved: 0,
        }
    );
}

#[test]
fn test_definition_name_retries_parent_module() {
    let dir = project(&["A.v"]);
    let (mut resolver, counters) = resolver_with_service(
        dir.path(),
        &[
            ("Require A.foo.", LookupResponse::NotModule),
            ("Require A.", located("A.vo")),
        ],
        false,
    );

    assert_eq!(resolver.resolve("A.foo"), Some(PathBuf::from("A.v")));
    assert_eq!(counters.requests.get(), 2);
}

#[test]
fn test_created_session_is_closed() {
    let dir = project(&["A.v"]);
    let (mut resolver, counters) =
        resolver_with_service(dir.path(), &[("Require A.", located("A.vo"))], false);

    resolver.resolve("A");

    assert_eq!(counters.opened.get(), 1);
    assert_eq!(counters.closed.get(), 1);
}

#[test]
fn test_created_session_is_closed_when_lookup_fails() {
    let dir = project(&["A.v"]);
    let (mut resolver, counters) = resolver_with_service(dir.path(), &[], true);

    // The heuristic still finds the file after the service fails.
    assert_eq!(resolver.resolve("A"), Some(PathBuf::from("A.v")));
    assert_eq!(counters.closed.get(), 1);
}

#[test]
fn test_supplied_session_is_left_open() {
    let dir = project(&["A.v"]);
    let counters = Rc::new(Counters::default());
    let mut session = FakeSession {
        responses: responses(&[("Require A.", located("A.vo"))]),
        fail: false,
        counters: Rc::clone(&counters),
    };
    let mut resolver = root_resolver(dir.path());

    let resolved = resolver.resolve_with("A", Some(&mut session as &mut dyn LookupSession));

    assert_eq!(resolved, Some(PathBuf::from("A.v")));
    assert_eq!(counters.requests.get(), 1);
    assert_eq!(counters.closed.get(), 0);
}

#[test]
fn test_ambiguous_answer_falls_back_to_heuristic() {
    let dir = project(&["A.v"]);
    let (mut resolver, _) = resolver_with_service(
        dir.path(),
        &[(
            "Require A.",
            LookupResponse::Ambiguous(vec![PathBuf::from("x/A.vo"), PathBuf::from("y/A.vo")]),
        )],
        false,
    );

    assert_eq!(resolver.resolve("A"), Some(PathBuf::from("A.v")));
}

#[test]
fn test_external_packages_are_filtered() {
    let dir = project(&[".opam/lib/coq/Nat.v", ".opam/lib/coq/user-contrib/Ext/Tuple.v"]);
    let stdlib = dir.path().join(".opam/lib/coq/Nat.vo");
    let contrib = dir.path().join(".opam/lib/coq/user-contrib/Ext/Tuple.vo");
    let (mut resolver, _) = resolver_with_service(
        dir.path(),
        &[
            ("Require Coq.Nat.", located(stdlib)),
            ("Require Ext.Tuple.", located(contrib)),
        ],
        false,
    );

    assert_eq!(resolver.resolve("Coq.Nat"), None);
    assert_eq!(
        resolver.resolve("Ext.Tuple"),
        Some(PathBuf::from(".opam/lib/coq/user-contrib/Ext/Tuple.v"))
    );
}

#[test]
fn test_external_module_without_source_does_not_fall_back() {
    let dir = project(&["Data/List.v"]);
    let (mut resolver, counters) = resolver_with_service(
        dir.path(),
        &[(
            "Require Coq.Lists.List.",
            located("/home/u/.opam/default/lib/coq/theories/Lists/List.vo"),
        )],
        false,
    );

    assert_eq!(
        resolver.locate_heuristic("Coq.Lists.List.app"),
        Some(PathBuf::from("Data/List.v"))
    );
    assert_eq!(resolver.resolve("Coq.Lists.List.app"), None);
    assert_eq!(counters.requests.get(), 2);
    assert_eq!(resolver.stats().unresolved, 1);
}

#[test]
fn test_blank_name_is_unresolved() {
    let dir = project(&[]);
    let mut resolver = root_resolver(dir.path());

    assert_eq!(resolver.resolve("  . "), None);
    assert_eq!(resolver.stats().requests, 0);
}

#[test]
fn test_export_alias_replaces_cached_miss() {
    let dir = project(&["Data/Tuple.v"]);
    let mut resolver = root_resolver(dir.path());

    assert_eq!(resolver.resolve("T"), None);

    resolver.register_export_alias("T", "Data.Tuple");
    assert_eq!(resolver.resolve("T"), Some(PathBuf::from("Data/Tuple.v")));
}

#[test]
fn test_heuristic_finds_definition_container() {
    let dir = project(&["theories/Data/Tuple.v"]);
    let config = ResolverConfig::new(dir.path()).with_mapping("theories", "Lib");
    let resolver = ModuleResolver::new(config).unwrap();

    assert_eq!(
        resolver.locate_heuristic("Lib.Data.Tuple"),
        Some(PathBuf::from("theories/Data/Tuple.v"))
    );
    assert_eq!(
        resolver.locate_heuristic("Lib.Data.Tuple.fst"),
        Some(PathBuf::from("theories/Data/Tuple.v"))
    );
    assert_eq!(resolver.locate_heuristic("Other.Tuple"), None);
}

#[test]
fn test_heuristic_searches_subtree() {
    let dir = project(&["theories/nested/deep/Deep.v"]);
    let config = ResolverConfig::new(dir.path()).with_mapping("theories", "Lib");
    let resolver = ModuleResolver::new(config).unwrap();

    assert_eq!(
        resolver.locate_heuristic("Lib.Deep"),
        Some(PathBuf::from("theories/nested/deep/Deep.v"))
    );
}

#[test]
fn test_heuristic_retries_when_prefix_names_directory() {
    let dir = project(&["theories/A.v", "Lib.v"]);
    let config = ResolverConfig::new(dir.path())
        .with_mapping("theories", "Lib")
        .with_mapping(".", "");
    let resolver = ModuleResolver::new(config).unwrap();

    assert_eq!(resolver.locate_heuristic("Lib"), Some(PathBuf::from("Lib.v")));
    assert_eq!(
        resolver.locate_heuristic("Lib.A"),
        Some(PathBuf::from("theories/A.v"))
    );
}

#[test]
fn test_heuristic_tie_goes_to_first_mapping() {
    let dir = project(&["one/A.v", "two/A.v"]);
    let config = ResolverConfig::new(dir.path())
        .with_mapping("one", "Lib")
        .with_mapping("two", "Lib");
    let resolver = ModuleResolver::new(config).unwrap();

    assert_eq!(resolver.locate_heuristic("Lib.A"), Some(PathBuf::from("one/A.v")));
}

#[test]
fn test_project_file_configures_load_path() {
    let dir = project(&["src/Core.v"]);
    let project_file = dir.path().join("_CoqProject");
    fs::write(&project_file, "-Q src Core\n-arg -w\nsrc/Core.v\n").unwrap();

    let config = ResolverConfig::from_project_file(&project_file).unwrap();
    let mut resolver = ModuleResolver::new(config).unwrap();

    assert_eq!(resolver.resolve("Core.Core"), Some(PathBuf::from("src/Core.v")));
}
