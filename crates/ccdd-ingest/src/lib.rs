pub mod csv_table;
pub mod snapshot;

pub use csv_table::{normalize_header, read_records};
pub use snapshot::{
    CORRECTIONS_TABLE, DOSE_FORM_MAP_TABLE, DRUG_TABLE, FORM_TABLE, INGREDIENT_TABLE,
    MOIETY_XREF_TABLE, RANKED_USAGE_TABLE, ROUTE_TABLE, SNAPSHOT_TABLES, STATUS_TABLE, Snapshot,
    load_snapshot,
};
