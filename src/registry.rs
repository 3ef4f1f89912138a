//! The citation registry.
//!
//! A [`CitationRegistry`] owns the parsed bibliography and the citation
//! tracker. [`CitationRegistry::register_cites`] returns a [`Citer`], which
//! wraps a function so that each call records the keys it cites before the
//! function itself runs:
//!
//! ```
//! use bibcite::{CitationRegistry, CiteKeys};
//!
//! let registry = CitationRegistry::new(
//!     "@misc{key1,\n  title = {A title}\n}\n@misc{key2,\n  title = {Another}\n}",
//! )?;
//! let double = registry
//!     .register_cites(CiteKeys::literal(["key1"]))
//!     .wrap_named("double", |x: i32| 2 * x)?;
//!
//! assert!(registry.citations().is_empty());
//! assert_eq!(double(21), 42);
//! assert!(registry.citations()["double()"].contains("key1"));
//! assert!(!registry.active_bibliography().contains("key2"));
//! # Ok::<(), bibcite::CiteError>(())
//! ```

use crate::bibliography::{build_bibliography, is_valid_key, BibEntry, Entries};
use crate::citetrack::{CiteTracker, Citations};
use crate::config::{RegistryConfig, UnknownKeyPolicy};
use crate::error::CiteError;
use crate::fs::{load_file, save_file};
use crate::render::render;
use slog::{debug, o, warn};
use std::collections::BTreeSet;
use std::fmt::Write;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Picks the keys cited by one call.
///
/// Implemented for the closures given to [`CiteKeys::computed`].
pub trait Select<A>: Send + Sync {
    fn select(&self, args: &A) -> BTreeSet<String>;
}

/// A selector closure together with the key collection it returns.
struct Selector<F, K> {
    f: F,
    _keys: PhantomData<fn() -> K>,
}

impl<A, F, K> Select<A> for Selector<F, K>
where
    F: Fn(&A) -> K + Send + Sync,
    K: IntoIterator,
    K::Item: Into<String>,
{
    fn select(&self, args: &A) -> BTreeSet<String> {
        (self.f)(args).into_iter().map(Into::into).collect()
    }
}

/// The keys a wrapped function cites.
pub enum CiteKeys<A> {
    /// The same keys on every call.
    Literal(BTreeSet<String>),
    /// Keys chosen per call from the call's arguments.
    ///
    /// `candidates` lists every key the selector may return. They are checked
    /// against the bibliography when the function is wrapped; an empty set
    /// skips that check.
    Computed {
        selector: Arc<dyn Select<A>>,
        candidates: BTreeSet<String>,
    },
}

impl<A> CiteKeys<A> {
    pub fn literal<I, S>(keys: I) -> CiteKeys<A>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CiteKeys::Literal(keys.into_iter().map(Into::into).collect())
    }

    /// Keys computed from the arguments of each call.
    ///
    /// The selector runs before the wrapped function. If it panics, the panic
    /// reaches the caller and nothing is recorded for that call.
    ///
    /// The selector must be `Send + Sync + 'static` even for single-threaded
    /// use, so that wrapped functions can be shared between threads. A
    /// selector cannot capture an `Rc` or a `RefCell`; capture an `Arc` or a
    /// `Mutex` instead.
    pub fn computed<F, K>(selector: F) -> CiteKeys<A>
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
        K: IntoIterator + 'static,
        K::Item: Into<String>,
    {
        CiteKeys::Computed {
            selector: Arc::new(Selector {
                f: selector,
                _keys: PhantomData,
            }),
            candidates: BTreeSet::new(),
        }
    }

    /// Declare the keys a computed selector can return. Has no effect on
    /// literal keys.
    pub fn with_candidates<I, S>(self, keys: I) -> CiteKeys<A>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self {
            CiteKeys::Computed { selector, .. } => CiteKeys::Computed {
                selector,
                candidates: keys.into_iter().map(Into::into).collect(),
            },
            literal => literal,
        }
    }

    /// The keys that can be checked before any call is made.
    fn declared(&self) -> &BTreeSet<String> {
        match self {
            CiteKeys::Literal(keys) => keys,
            CiteKeys::Computed { candidates, .. } => candidates,
        }
    }

    fn select(&self, args: &A) -> BTreeSet<String> {
        match self {
            CiteKeys::Literal(keys) => keys.clone(),
            CiteKeys::Computed { selector, .. } => selector.select(args),
        }
    }
}

impl<A> From<&str> for CiteKeys<A> {
    fn from(key: &str) -> Self {
        CiteKeys::literal([key])
    }
}

impl<A> From<BTreeSet<String>> for CiteKeys<A> {
    fn from(keys: BTreeSet<String>) -> Self {
        CiteKeys::Literal(keys)
    }
}

/// A bibliography plus a record of which of its entries have been cited.
#[derive(Debug)]
pub struct CitationRegistry {
    full_bibliography: String,
    entries: Arc<Entries>,
    config: RegistryConfig,
    tracker: Arc<Mutex<CiteTracker>>,
}

impl CitationRegistry {
    /// Parse `bibliography` into a new registry with the default configuration.
    pub fn new(bibliography: &str) -> Result<CitationRegistry, CiteError> {
        CitationRegistry::with_config(bibliography, RegistryConfig::default())
    }

    pub fn with_config(
        bibliography: &str,
        config: RegistryConfig,
    ) -> Result<CitationRegistry, CiteError> {
        debug!(slog_scope::logger(), "Starting citation registry...");

        let entries = slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "build_bibliography()")),
            || build_bibliography(bibliography),
        )?;

        Ok(CitationRegistry {
            full_bibliography: bibliography.to_string(),
            entries: Arc::new(entries),
            config,
            tracker: Arc::new(Mutex::new(CiteTracker::new())),
        })
    }

    /// Load a registry from a bibtex file.
    pub fn load(path: &Path) -> Result<CitationRegistry, CiteError> {
        CitationRegistry::load_with_config(path, RegistryConfig::default())
    }

    pub fn load_with_config(
        path: &Path,
        config: RegistryConfig,
    ) -> Result<CitationRegistry, CiteError> {
        let bibliography = load_file(path)?;
        CitationRegistry::with_config(&bibliography, config)
    }

    /// The string the registry was constructed from.
    pub fn full_bibliography(&self) -> &str {
        &self.full_bibliography
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of entries in the bibliography.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Start registering a function that cites `keys`.
    ///
    /// Nothing is checked or recorded until [`Citer::wrap`] or
    /// [`Citer::wrap_named`] is called.
    pub fn register_cites<A, K>(&self, keys: K) -> Citer<A>
    where
        K: Into<CiteKeys<A>>,
    {
        Citer {
            keys: keys.into(),
            entries: Arc::clone(&self.entries),
            unknown_keys: self.config.unknown_keys,
            tracker: Arc::clone(&self.tracker),
        }
    }

    /// A snapshot of the citations recorded so far.
    pub fn citations(&self) -> Citations {
        lock(&self.tracker).citations().clone()
    }

    /// Identifiers of every wrapped function, in wrapping order.
    pub fn wrapped_functions(&self) -> Vec<String> {
        lock(&self.tracker).wrapped().to_vec()
    }

    /// Recorded keys with no entry in the bibliography.
    pub fn unresolved_keys(&self) -> BTreeSet<String> {
        lock(&self.tracker)
            .cited_keys()
            .into_iter()
            .filter(|k| !self.entries.contains_key(*k))
            .map(String::from)
            .collect()
    }

    /// The cited entries rendered as bibtex.
    ///
    /// Returns an empty string if nothing has been cited. Keys without an
    /// entry in the bibliography are skipped.
    pub fn active_bibliography(&self) -> String {
        let tracker = lock(&self.tracker);

        let mut active = Vec::new();
        for key in tracker.cited_keys() {
            match self.entries.get(key) {
                Some(entry) => active.push(entry),
                None => warn!(
                    slog_scope::logger(),
                    "Cited key {} is not in the bibliography; skipping", key
                ),
            }
        }

        slog_scope::scope(&slog_scope::logger().new(o!("fn" => "render()")), || {
            render(&active, &self.config.render)
        })
    }

    /// Write the active bibliography to `path`.
    pub fn save_active_bibliography(&self, path: &Path) -> Result<(), CiteError> {
        save_file(path, &self.active_bibliography())
    }

    /// One line per wrapped function that has cited something, listing its
    /// keys.
    pub fn citation_report(&self) -> String {
        let mut report = String::new();
        for (signature, keys) in lock(&self.tracker).citations() {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            // Writing to a String cannot fail.
            let _ = writeln!(report, "{}: {}", signature, keys.join(", "));
        }
        report
    }

    /// The citations as pretty-printed JSON.
    pub fn citations_json(&self) -> Result<String, CiteError> {
        Ok(serde_json::to_string_pretty(&self.citations())?)
    }
}

/// Wraps functions so that calling them records citations.
///
/// Returned by [`CitationRegistry::register_cites`].
pub struct Citer<A> {
    keys: CiteKeys<A>,
    entries: Arc<Entries>,
    unknown_keys: UnknownKeyPolicy,
    tracker: Arc<Mutex<CiteTracker>>,
}

impl<A> Citer<A> {
    /// Wrap `f`, identifying it by its type name.
    ///
    /// For a fn item this is its module path (`crate::module::name`). Every
    /// closure defined in the same function shares the name
    /// `path::{{closure}}`, and a function pointer is named by its type alone
    /// (`fn(i32) -> i32`), so all pointers of one type share an identifier.
    /// Use [`Citer::wrap_named`] to tell them apart.
    pub fn wrap<F, R>(self, f: F) -> Result<impl Fn(A) -> R, CiteError>
    where
        F: Fn(A) -> R,
    {
        let name = std::any::type_name::<F>();
        self.wrap_named(name, f)
    }

    /// Wrap `f`, identifying it as `name`.
    ///
    /// Fails if a declared key is not a valid key, or is missing from the
    /// bibliography under [`UnknownKeyPolicy::Reject`].
    pub fn wrap_named<F, R>(self, name: &str, f: F) -> Result<impl Fn(A) -> R, CiteError>
    where
        F: Fn(A) -> R,
    {
        let signature = format!("{}()", name);
        self.check_keys(&signature)?;

        debug!(slog_scope::logger(), "Wrapping {}", signature);
        let Citer { keys, tracker, .. } = self;
        lock(&tracker).add_wrapped(&signature);

        Ok(move |args: A| {
            // Recorded before `f` runs.
            let cited = keys.select(&args);
            lock(&tracker).record(&signature, cited);
            f(args)
        })
    }

    fn check_keys(&self, signature: &str) -> Result<(), CiteError> {
        for key in self.keys.declared() {
            if !is_valid_key(key) {
                return Err(CiteError::InvalidKey(key.to_string()));
            }
            if self.entries.contains_key(key) {
                continue;
            }
            match self.unknown_keys {
                UnknownKeyPolicy::Reject => {
                    return Err(CiteError::UnknownKey {
                        key: key.to_string(),
                        signature: signature.to_string(),
                    })
                }
                UnknownKeyPolicy::Record => warn!(
                    slog_scope::logger(),
                    "{} not in bibliography, but occurs for {}", key, signature
                ),
            }
        }
        Ok(())
    }
}

/// Lock the tracker. A poisoned lock is still usable: the tracker only ever
/// grows by set union.
fn lock(tracker: &Mutex<CiteTracker>) -> MutexGuard<'_, CiteTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}
