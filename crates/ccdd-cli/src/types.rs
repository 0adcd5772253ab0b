use std::path::PathBuf;

use ccdd_core::ExclusionCounts;

#[derive(Debug)]
pub struct GenerateResult {
    pub snapshot_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tables: Vec<TableSummary>,
    pub exclusions: ExclusionCounts,
    /// True when the priority filter restricted the tables.
    pub priority_filtered: bool,
    pub unmatched_ranked: usize,
    pub errors: Vec<String>,
    pub has_errors: bool,
}

#[derive(Debug)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    /// Written path, absent on dry runs.
    pub path: Option<PathBuf>,
}
