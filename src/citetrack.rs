//! This module contains the citation tracker.
//!
//! The tracker maps the identifier of each wrapped function to every key cited
//! by calls to it. It only ever grows: a call adds its keys to the function's
//! set and nothing is ever removed.

use slog::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

/// A snapshot of the tracked citations, identifier to keys.
pub type Citations = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Default)]
pub struct CiteTracker {
    citations: Citations,
    wrapped: Vec<String>,
}

impl CiteTracker {
    pub fn new() -> CiteTracker {
        CiteTracker::default()
    }

    /// Union `keys` into the set for `signature`.
    ///
    /// An empty key set leaves the tracker untouched, so a call that cites
    /// nothing does not create an entry.
    pub fn record<I>(&mut self, signature: &str, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut keys = keys.into_iter().peekable();
        if keys.peek().is_none() {
            trace!(slog_scope::logger(), "No keys cited for {}", signature);
            return;
        }

        let cited = self.citations.entry(signature.to_string()).or_default();
        for key in keys {
            if cited.insert(key.clone()) {
                debug!(slog_scope::logger(), "{} cites {}", signature, key);
            }
        }
    }

    /// Note that a function has been wrapped under `signature`.
    pub fn add_wrapped(&mut self, signature: &str) {
        self.wrapped.push(signature.to_string());
    }

    pub fn citations(&self) -> &Citations {
        &self.citations
    }

    pub fn wrapped(&self) -> &[String] {
        &self.wrapped
    }

    /// Every key cited by any call.
    pub fn cited_keys(&self) -> BTreeSet<&str> {
        self.citations
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}
