use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::heuristic;
use crate::paths::{normalize_lexically, relative_to};
use crate::project::LoadPathEntry;
use crate::session::{LookupResponse, LookupSession, ScopedSession, SessionFactory};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolution of dotted names to project source files
pub trait NameResolver {
    /// Project-relative source file defining `qualified_name`, if it is a
    /// project file
    fn resolve(&mut self, qualified_name: &str) -> Option<PathBuf>;

    /// Let the short form `alias` stand for the module `full_name`
    fn register_export_alias(&mut self, alias: &str, full_name: &str);
}

/// Counters for resolver activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub requests: usize,
    pub cache_hits: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// What the name-location service made of a name
enum PrimaryLookup {
    /// A project source file
    Source(PathBuf),

    /// An artifact in the external package area; final, never retried
    External(PathBuf),

    /// No usable answer, so the load path gets a try
    Missing,
}

/// Resolves qualified names through the name-location service, falling back
/// to the load path.
///
/// The cache belongs to the instance: build one resolver per extraction run.
pub struct ModuleResolver {
    config: ResolverConfig,
    root: PathBuf,
    factory: Option<Box<dyn SessionFactory>>,
    cache: HashMap<String, Option<PathBuf>>,
    export_aliases: HashMap<String, String>,
    stats: ResolverStats,
}

impl ModuleResolver {
    /// Create a resolver without a session factory; only the load-path
    /// heuristic runs unless a session is passed to [`Self::resolve_with`].
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate().map_err(ResolveError::Config)?;

        let root = if config.project_root.is_absolute() {
            config.project_root.clone()
        } else {
            std::env::current_dir()?.join(&config.project_root)
        };

        Ok(Self {
            root: normalize_lexically(&root),
            config,
            factory: None,
            cache: HashMap::new(),
            export_aliases: HashMap::new(),
            stats: ResolverStats::default(),
        })
    }

    #[must_use]
    pub fn with_session_factory(mut self, factory: impl SessionFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Resolve `qualified_name`, reusing `session` for primary lookups.
    ///
    /// A supplied session is left open. Without one, a session is opened from
    /// the factory for this call only and closed on every exit path.
    pub fn resolve_with(
        &mut self,
        qualified_name: &str,
        session: Option<&mut dyn LookupSession>,
    ) -> Option<PathBuf> {
        let name = normalize_name(qualified_name);
        if name.is_empty() {
            return None;
        }

        self.stats.requests += 1;
        if let Some(cached) = self.cache.get(&name) {
            self.stats.cache_hits += 1;
            return cached.clone();
        }

        let target = self
            .export_aliases
            .get(&name)
            .cloned()
            .unwrap_or_else(|| name.clone());

        let primary = match session {
            Some(session) => self.lookup_primary(session, &target),
            None => self.lookup_primary_scoped(&target),
        };
        let located = match primary {
            PrimaryLookup::Source(path) => Some(path),
            PrimaryLookup::External(artifact) => {
                log::debug!("{name} is provided by {}, skipping", artifact.display());
                None
            }
            PrimaryLookup::Missing => self.locate_heuristic(&target),
        };

        let result = located.filter(|path| {
            let external = self.config.is_external(path);
            if external {
                log::debug!("{name} resolves outside the project ({}), skipping", path.display());
            }
            !external
        });

        if result.is_some() {
            self.stats.resolved += 1;
        } else {
            self.stats.unresolved += 1;
            log::debug!("Could not resolve {name}");
        }

        if result.is_some() || self.config.cache_misses {
            self.cache.insert(name, result.clone());
        }
        result
    }

    fn lookup_primary_scoped(&self, name: &str) -> PrimaryLookup {
        let Some(factory) = self.factory.as_ref() else {
            return PrimaryLookup::Missing;
        };
        let mut scoped = match factory.open() {
            Ok(session) => ScopedSession::new(session),
            Err(err) => {
                log::debug!("Could not open lookup session for {name}: {err}");
                return PrimaryLookup::Missing;
            }
        };
        self.lookup_primary(scoped.session(), name)
    }

    /// Ask the name-location service where `name` lives.
    ///
    /// Names that are not modules by themselves are retried one segment up.
    /// Failures, ambiguous answers and modules located outside the project
    /// yield `None`.
    pub fn locate_primary(&self, session: &mut dyn LookupSession, name: &str) -> Option<PathBuf> {
        match self.lookup_primary(session, name) {
            PrimaryLookup::Source(path) => Some(path),
            PrimaryLookup::External(_) | PrimaryLookup::Missing => None,
        }
    }

    fn lookup_primary(&self, session: &mut dyn LookupSession, name: &str) -> PrimaryLookup {
        let mut current = normalize_name(name);

        loop {
            match session.request(&format!("Require {current}.")) {
                Ok(LookupResponse::Located(artifact)) => {
                    return self.source_for_artifact(&artifact);
                }
                Ok(LookupResponse::NotModule) => match parent_module(&current) {
                    Some(parent) => current = parent.to_string(),
                    None => return PrimaryLookup::Missing,
                },
                Ok(LookupResponse::Ambiguous(candidates)) => {
                    log::debug!(
                        "Ambiguous lookup for {current}: {} candidates",
                        candidates.len()
                    );
                    return PrimaryLookup::Missing;
                }
                Err(err) => {
                    log::debug!("Lookup for {current} failed: {err}");
                    return PrimaryLookup::Missing;
                }
            }
        }
    }

    /// Locate `name` through the logical load path only
    pub fn locate_heuristic(&self, name: &str) -> Option<PathBuf> {
        let mappings: Vec<&LoadPathEntry> = self.config.load_path.entries().iter().collect();
        heuristic::locate(
            &self.root,
            &mappings,
            &normalize_name(name),
            &self.config.source_extension,
        )
    }

    fn source_for_artifact(&self, artifact: &Path) -> PrimaryLookup {
        let absolute = if artifact.is_absolute() {
            artifact.to_path_buf()
        } else {
            self.root.join(artifact)
        };
        let absolute = normalize_lexically(&absolute);
        if self.config.is_external(&relative_to(&absolute, &self.root)) {
            return PrimaryLookup::External(absolute);
        }

        let source = absolute.with_extension(&self.config.source_extension);
        if !source.is_file() {
            log::debug!("Located artifact has no source file: {}", source.display());
            return PrimaryLookup::Missing;
        }
        PrimaryLookup::Source(relative_to(&source, &self.root))
    }
}

impl NameResolver for ModuleResolver {
    fn resolve(&mut self, qualified_name: &str) -> Option<PathBuf> {
        self.resolve_with(qualified_name, None)
    }

    fn register_export_alias(&mut self, alias: &str, full_name: &str) {
        let alias = normalize_name(alias);
        let full_name = normalize_name(full_name);
        if alias.is_empty() || full_name.is_empty() || alias == full_name {
            return;
        }
        self.export_aliases.insert(alias, full_name);
        // A new alias may turn an earlier miss into a hit.
        self.cache.retain(|_, hit| hit.is_some());
    }
}

/// Trim whitespace and trailing separators
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_string()
}

fn parent_module(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
}
