//! Snapshot discovery and loading.
//!
//! A snapshot is a directory of flat CSV tables extracted from the upstream
//! reference feeds. Required tables abort the run when absent; the
//! corrections table defaults to empty and the ranked-usage table is
//! optional because only the priority-filter stage depends on it.

use std::path::Path;

use tracing::warn;

use ccdd_model::{
    CcddError, CorrectionRecord, DoseFormMapRecord, DrugRecord, FormRecord, IngredientRecord,
    MoietyXrefRecord, RankedUsageRecord, Result, RouteRecord, StatusRecord,
};

use crate::csv_table::read_records;

pub const DRUG_TABLE: &str = "drug.csv";
pub const INGREDIENT_TABLE: &str = "ingredient.csv";
pub const FORM_TABLE: &str = "form.csv";
pub const ROUTE_TABLE: &str = "route.csv";
pub const STATUS_TABLE: &str = "status.csv";
pub const CORRECTIONS_TABLE: &str = "corrections.csv";
pub const MOIETY_XREF_TABLE: &str = "moiety_xref.csv";
pub const DOSE_FORM_MAP_TABLE: &str = "dose_form_map.csv";
pub const RANKED_USAGE_TABLE: &str = "ranked_usage.csv";

/// Expected snapshot files with their roles, in load order.
pub const SNAPSHOT_TABLES: &[(&str, &str)] = &[
    (DRUG_TABLE, "Drug products keyed by drug code (DIN, brand, company)"),
    (INGREDIENT_TABLE, "Active ingredient rows with strength and dosage"),
    (FORM_TABLE, "Pharmaceutical form per drug code"),
    (ROUTE_TABLE, "Route of administration per drug code"),
    (STATUS_TABLE, "Product status and effective date"),
    (CORRECTIONS_TABLE, "Manual name/moiety overrides (optional)"),
    (MOIETY_XREF_TABLE, "Precise name to active moiety cross-reference"),
    (DOSE_FORM_MAP_TABLE, "(form, route) to controlled dose form mapping"),
    (RANKED_USAGE_TABLE, "Ranked usage list for the priority filter (optional)"),
];

/// All input tables loaded into memory for one run.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub drugs: Vec<DrugRecord>,
    pub ingredients: Vec<IngredientRecord>,
    pub forms: Vec<FormRecord>,
    pub routes: Vec<RouteRecord>,
    pub statuses: Vec<StatusRecord>,
    pub corrections: Vec<CorrectionRecord>,
    pub moiety_xref: Vec<MoietyXrefRecord>,
    pub dose_form_map: Vec<DoseFormMapRecord>,
    /// `None` when the ranked-usage feed was not part of the snapshot.
    pub ranked_usage: Option<Vec<RankedUsageRecord>>,
}

fn require<T: serde::de::DeserializeOwned>(dir: &Path, table: &str) -> Result<Vec<T>> {
    let path = dir.join(table);
    if !path.is_file() {
        return Err(CcddError::MissingReference {
            table: table.to_string(),
            path,
        });
    }
    read_records(&path)
}

/// Load a full snapshot from a directory of CSV tables.
pub fn load_snapshot(dir: &Path) -> Result<Snapshot> {
    let drugs = require(dir, DRUG_TABLE)?;
    let ingredients = require(dir, INGREDIENT_TABLE)?;
    let forms = require(dir, FORM_TABLE)?;
    let routes = require(dir, ROUTE_TABLE)?;
    let statuses = require(dir, STATUS_TABLE)?;
    let moiety_xref = require(dir, MOIETY_XREF_TABLE)?;
    let dose_form_map = require(dir, DOSE_FORM_MAP_TABLE)?;

    let corrections_path = dir.join(CORRECTIONS_TABLE);
    let corrections = if corrections_path.is_file() {
        read_records(&corrections_path)?
    } else {
        warn!(table = CORRECTIONS_TABLE, "corrections table absent, no overrides applied");
        Vec::new()
    };

    let ranked_path = dir.join(RANKED_USAGE_TABLE);
    let ranked_usage = if ranked_path.is_file() {
        Some(read_records(&ranked_path)?)
    } else {
        warn!(table = RANKED_USAGE_TABLE, "ranked usage table absent, priority filter unavailable");
        None
    };

    Ok(Snapshot {
        drugs,
        ingredients,
        forms,
        routes,
        statuses,
        corrections,
        moiety_xref,
        dose_form_map,
        ranked_usage,
    })
}
