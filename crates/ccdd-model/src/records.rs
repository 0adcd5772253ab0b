//! Raw input records for the reference snapshot.
//!
//! Each struct mirrors one input table column-for-column. Fields are kept as
//! strings at this layer; parsing into typed values happens in the pipeline.

use serde::Deserialize;

/// One row of the drug product table, keyed by `drug_code`.
#[derive(Debug, Clone, Deserialize)]
pub struct DrugRecord {
    pub drug_code: String,
    /// Unique product identifier (DIN).
    pub din: String,
    pub brand_name: String,
    pub company_name: String,
}

/// One active-ingredient row. Many-to-one with the drug table via `drug_code`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientRecord {
    pub drug_code: String,
    pub ingredient_code: String,
    pub ingredient_name: String,
    pub strength: String,
    pub strength_unit: String,
    #[serde(default)]
    pub dosage_value: String,
    #[serde(default)]
    pub dosage_unit: String,
}

/// Pharmaceutical form per drug code.
#[derive(Debug, Clone, Deserialize)]
pub struct FormRecord {
    pub drug_code: String,
    pub pharm_form: String,
}

/// Route of administration per drug code.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub drug_code: String,
    pub route_admin: String,
}

/// Product status and its effective date per drug code.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRecord {
    pub drug_code: String,
    pub status: String,
    #[serde(default)]
    pub status_date: String,
}

/// Manual correction row. Empty override values mean "no override".
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionRecord {
    /// Precise-name key the name override applies to.
    pub source_name: String,
    #[serde(default)]
    pub override_name: String,
    /// Original moiety name the moiety override applies to.
    #[serde(default)]
    pub moiety_source: String,
    #[serde(default)]
    pub moiety_override: String,
}

/// Active-moiety cross-reference row.
#[derive(Debug, Clone, Deserialize)]
pub struct MoietyXrefRecord {
    pub precise_name: String,
    pub moiety_name: String,
    #[serde(default)]
    pub ingredient_unique_id: String,
    #[serde(default)]
    pub moiety_unique_id: String,
}

/// Controlled dose-form mapping row. `route_admin` may be empty, in which
/// case the entry matches on pharmaceutical form alone.
#[derive(Debug, Clone, Deserialize)]
pub struct DoseFormMapRecord {
    pub pharm_form: String,
    #[serde(default)]
    pub route_admin: String,
    pub ntp_dose_form: String,
}

/// One entry of the externally ranked usage list, ordered by rank.
#[derive(Debug, Clone, Deserialize)]
pub struct RankedUsageRecord {
    pub moiety_set: String,
    #[serde(default)]
    pub usage_total: String,
}
