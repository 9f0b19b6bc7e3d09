use crate::types::RemoteEntry;
use chrono::NaiveDate;

/// Keeps entries whose local modification date is `target`. Entries without a timestamp are dropped.
#[must_use]
pub fn filter_by_date(entries: &[RemoteEntry], target: NaiveDate) -> Vec<RemoteEntry> {
    entries
        .iter()
        .filter(|e| e.modified_at.is_some_and(|ts| ts.date_naive() == target))
        .cloned()
        .collect()
}

/// Keeps entries whose name ends with `ext` (case-sensitive, e.g. ".pgp").
#[must_use]
pub fn filter_by_extension(entries: &[RemoteEntry], ext: &str) -> Vec<RemoteEntry> {
    entries
        .iter()
        .filter(|e| e.name.ends_with(ext))
        .cloned()
        .collect()
}
