//! Manual correction overrides for canonical names and moieties.
//!
//! The override tables are explicit immutable inputs built once from the
//! corrections snapshot table. Substitutions apply in fixed order: precise
//! name override, moiety override, then the hard-coded salt unification.
//! Later rules may override earlier ones for the same record.

use std::collections::BTreeMap;

use ccdd_model::CorrectionRecord;

/// Moiety override value that blocks sharing rather than substituting.
pub const DO_NOT_SHARE_SENTINEL: &str = "DO NOT SHARE DRUG CODE";

/// Lookup tables built from the corrections input.
#[derive(Debug, Default)]
pub struct CorrectionTables {
    name_overrides: BTreeMap<String, String>,
    moiety_overrides: BTreeMap<String, String>,
}

impl CorrectionTables {
    pub fn from_records(records: &[CorrectionRecord]) -> Self {
        let mut tables = Self::default();
        for record in records {
            let source = record.source_name.trim().to_uppercase();
            let value = record.override_name.trim();
            if !source.is_empty() && !value.is_empty() {
                tables.name_overrides.insert(source, value.to_uppercase());
            }
            let moiety_source = record.moiety_source.trim().to_uppercase();
            let moiety_value = record.moiety_override.trim();
            if !moiety_source.is_empty() && !moiety_value.is_empty() {
                tables
                    .moiety_overrides
                    .insert(moiety_source, moiety_value.to_uppercase());
            }
        }
        tables
    }

    /// Non-empty precise-name override, if one exists.
    pub fn corrected_name(&self, precise_name: &str) -> Option<&str> {
        self.name_overrides.get(precise_name).map(String::as_str)
    }

    /// Moiety override keyed by the original moiety name. The share-guard
    /// sentinel never substitutes.
    pub fn corrected_moiety(&self, moiety_name: &str) -> Option<&str> {
        self.moiety_overrides
            .get(moiety_name)
            .map(String::as_str)
            .filter(|value| *value != DO_NOT_SHARE_SENTINEL)
    }

    pub fn is_empty(&self) -> bool {
        self.name_overrides.is_empty() && self.moiety_overrides.is_empty()
    }
}

/// Apply the full correction sequence to one canonical record.
pub fn apply_corrections(
    tables: &CorrectionTables,
    precise_name: &mut String,
    moiety_name: &mut String,
) {
    if let Some(name) = tables.corrected_name(precise_name) {
        *precise_name = name.to_string();
    }
    if let Some(moiety) = tables.corrected_moiety(moiety_name) {
        *moiety_name = moiety.to_string();
    }
    // Both acyclovir salt variants share one moiety.
    if moiety_name == "ACYCLOVIR SODIUM" {
        *moiety_name = "ACYCLOVIR".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, name: &str, moiety_source: &str, moiety: &str) -> CorrectionRecord {
        CorrectionRecord {
            source_name: source.to_string(),
            override_name: name.to_string(),
            moiety_source: moiety_source.to_string(),
            moiety_override: moiety.to_string(),
        }
    }

    #[test]
    fn name_override_takes_precedence_over_original() {
        let tables =
            CorrectionTables::from_records(&[record("ASA", "ACETYLSALICYLIC ACID", "", "")]);
        let mut name = "ASA".to_string();
        let mut moiety = "ACETYLSALICYLIC ACID".to_string();
        apply_corrections(&tables, &mut name, &mut moiety);
        assert_eq!(name, "ACETYLSALICYLIC ACID");
    }

    #[test]
    fn empty_override_means_no_override() {
        let tables = CorrectionTables::from_records(&[record("ASA", "", "", "")]);
        assert!(tables.corrected_name("ASA").is_none());
    }

    #[test]
    fn share_guard_sentinel_never_substitutes() {
        let tables = CorrectionTables::from_records(&[record(
            "",
            "",
            "INSULIN GLARGINE",
            DO_NOT_SHARE_SENTINEL,
        )]);
        let mut name = "INSULIN GLARGINE".to_string();
        let mut moiety = "INSULIN GLARGINE".to_string();
        apply_corrections(&tables, &mut name, &mut moiety);
        assert_eq!(moiety, "INSULIN GLARGINE");
    }

    #[test]
    fn acyclovir_sodium_unifies_after_overrides() {
        let tables = CorrectionTables::default();
        let mut name = "ACYCLOVIR SODIUM".to_string();
        let mut moiety = "ACYCLOVIR SODIUM".to_string();
        apply_corrections(&tables, &mut name, &mut moiety);
        assert_eq!(moiety, "ACYCLOVIR");
        assert_eq!(name, "ACYCLOVIR SODIUM");
    }

    #[test]
    fn moiety_override_is_keyed_by_original_moiety() {
        let tables = CorrectionTables::from_records(&[record(
            "",
            "",
            "PSEUDOEPHEDRINE HYDROCHLORIDE",
            "PSEUDOEPHEDRINE",
        )]);
        let mut name = "PSEUDOEPHEDRINE HYDROCHLORIDE".to_string();
        let mut moiety = "PSEUDOEPHEDRINE HYDROCHLORIDE".to_string();
        apply_corrections(&tables, &mut name, &mut moiety);
        assert_eq!(moiety, "PSEUDOEPHEDRINE");
    }
}
