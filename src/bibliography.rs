//! The module contains functionality related to building the bibliography.
//!
//! Parsing the bibtex grammar is left to the [`biblatex`] crate. Its raw parse
//! is used so field values keep their TeX markup exactly as written (`--`,
//! `\&`, `{...}` case protection); only `@string` abbreviations are expanded.
//! This module turns the raw entries into [`BibEntry`]s keyed by citation key,
//! which is all the registry needs for lookup and re-serialization.

use crate::error::CiteError;
use biblatex::{RawBibliography, RawChunk, Spanned};
use lazy_static::lazy_static;
use regex::Regex;
use slog::{debug, trace};
use std::collections::{BTreeMap, HashMap};

lazy_static! {
    /// Regex for a usable citation key: no whitespace and none of the
    /// characters bibtex treats as delimiters.
    pub static ref CITATION_KEY: Regex = Regex::new(r##"^[^\s,{}()"#%'=\\]+$"##).unwrap();
}

/// One bibtex record.
///
/// Field names and the entry type are lowercased. Values are the source text
/// between the delimiters, with `@string` abbreviations substituted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: String,
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// The parsed bibliography, keyed by citation key.
pub type Entries = BTreeMap<String, BibEntry>;

/// `@string` abbreviations, keyed by lowercase name.
type Abbreviations = HashMap<String, String>;

/// Parse a bibtex string into [`Entries`].
pub fn build_bibliography(input: &str) -> Result<Entries, CiteError> {
    debug!(slog_scope::logger(), "Starting bibtex parsing...");

    let raw = RawBibliography::parse(input).map_err(CiteError::Parse)?;

    // Later abbreviations may refer to earlier ones.
    let mut abbreviations = Abbreviations::new();
    for pair in &raw.abbreviations {
        let value = raw_value(&pair.value.v, &abbreviations);
        abbreviations.insert(pair.key.v.to_lowercase(), value);
    }

    let entries: Entries = raw
        .entries
        .iter()
        .map(|entry| {
            let entry = &entry.v;
            trace!(slog_scope::logger(), "Entry {} parsed", entry.key.v);
            let fields = entry
                .fields
                .iter()
                .map(|pair| {
                    (
                        pair.key.v.to_lowercase(),
                        raw_value(&pair.value.v, &abbreviations),
                    )
                })
                .collect();
            (
                entry.key.v.to_string(),
                BibEntry {
                    key: entry.key.v.to_string(),
                    entry_type: entry.kind.v.to_lowercase(),
                    fields,
                },
            )
        })
        .collect();

    debug!(slog_scope::logger(), "Bibtex parsed: {} entries", entries.len());
    Ok(entries)
}

/// Join the chunks of a field value.
///
/// Text chunks are kept verbatim. An abbreviation with no `@string`
/// definition, such as a month name, is kept as its bare name.
fn raw_value(chunks: &[Spanned<RawChunk>], abbreviations: &Abbreviations) -> String {
    let mut value = String::new();
    for chunk in chunks {
        match &chunk.v {
            RawChunk::Normal(text) => value.push_str(text),
            RawChunk::Abbreviation(name) => match abbreviations.get(&name.to_lowercase()) {
                Some(expanded) => value.push_str(expanded),
                None => value.push_str(name),
            },
        }
    }
    value
}

/// Whether `key` could be a bibtex citation key at all.
pub fn is_valid_key(key: &str) -> bool {
    CITATION_KEY.is_match(key)
}
