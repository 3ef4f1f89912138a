//! Renders [`BibEntry`]s back into bibtex.
//!
//! Output is deterministic: entries come out in citation-key order and fields
//! in field-name order, regardless of the order in the source text.

use crate::bibliography::BibEntry;
use crate::config::RenderConfig;
use slog::debug;

/// Render a collection of entries.
///
/// The entries are sorted by key before rendering. An empty collection
/// renders as an empty string.
pub fn render(entries: &[&BibEntry], config: &RenderConfig) -> String {
    debug!(slog_scope::logger(), "Rendering {} entries...", entries.len());

    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let width = if config.align_values {
        sorted
            .iter()
            .flat_map(|e| e.fields.keys())
            .map(|f| f.chars().count())
            .max()
            .unwrap_or(0)
    } else {
        0
    };

    let mut output = String::new();
    for entry in sorted {
        output.push_str(&render_entry(entry, config, width));
    }

    output
}

/// Render a single entry, padding field names to `width`.
fn render_entry(entry: &BibEntry, config: &RenderConfig, width: usize) -> String {
    let mut stanza = format!("@{}{{{}", entry.entry_type, entry.key);

    // BTreeMap iteration is already sorted by field name.
    for (field, value) in &entry.fields {
        stanza.push_str(",\n");
        stanza.push_str(&config.indent);
        stanza.push_str(&format!("{:<width$} = {{{}}}", field, value, width = width));
    }
    if config.trailing_comma {
        stanza.push(',');
    }
    stanza.push_str("\n}\n");
    stanza.push_str(&config.entry_separator);

    stanza
}
