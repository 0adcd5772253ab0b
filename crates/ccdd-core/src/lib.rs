pub mod corrections;
pub mod crossref;
pub mod dose_form;
pub mod entities;
pub mod ingredient;
pub mod pipeline;
pub mod priority;
pub mod substance_sets;

pub use corrections::{CorrectionTables, DO_NOT_SHARE_SENTINEL, apply_corrections};
pub use crossref::{CrossrefExclusions, build_mapping};
pub use dose_form::DoseFormMap;
pub use entities::{IdInterner, build_ntp_table, build_tm_table, lacks_moiety_identity};
pub use ingredient::{
    CanonicalizeResult, ParsedName, build_moiety_lookup, canonicalize_names, split_parenthetical,
};
pub use pipeline::{
    ExclusionCounts, PipelineOptions, PipelineResult, parse_status_date, run_pipeline,
};
pub use priority::{DEFAULT_TOP_N, PriorityOutcome, filter_tables, partition_ranked};
pub use substance_sets::{build_substance_sets, display_element};
