//! Typed CSV reading for the reference snapshot tables.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;

use ccdd_model::Result;

/// Normalize a raw header cell: strip the UTF-8 BOM, trim, lowercase, and
/// collapse internal whitespace to underscores so headers line up with the
/// snake_case record fields.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut normalized = String::new();
    for part in trimmed.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push('_');
        }
        normalized.push_str(&part.to_lowercase());
    }
    normalized
}

/// Read a whole CSV table into typed records.
///
/// Headers are normalized before deserialization; cells are trimmed. Rows
/// that are entirely empty are skipped by the csv reader configuration.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)?;
    let headers: StringRecord = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    reader.set_headers(headers);
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
