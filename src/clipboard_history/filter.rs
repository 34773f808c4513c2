//! Case-insensitive search over the history list

use super::types::ClipboardEntry;

/// Order-preserving subsequence of `entries` whose content contains `term`,
/// ignoring case. An empty term returns everything; whitespace is matched
/// literally.
pub fn filter_entries(entries: &[ClipboardEntry], term: &str) -> Vec<ClipboardEntry> {
    if term.is_empty() {
        return entries.to_vec();
    }

    let needle = term.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.content.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
