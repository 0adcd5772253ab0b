//! Ingredient canonicalization.
//!
//! Raw ingredient names arrive as free text where the precise chemical form
//! is usually a trailing parenthetical qualifier, e.g.
//! `"IBUPROFEN (AS SODIUM)"`. Canonicalization derives one
//! (basis-of-strength, precise-name) pair per ingredient code across all of
//! that code's raw spellings.
//!
//! The parenthetical split is best-effort: ingredients whose precise
//! qualifier is not parenthesized cannot be detected here and rely on the
//! manual correction table instead. Unbalanced parentheses are logged as
//! data-quality warnings and canonicalized as-is.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use ccdd_model::{CanonicalName, IngredientRecord};

static TRAILING_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<basis>.*\S)\s*\((?P<qualifier>[^()]*)\)$").unwrap());

/// A raw name split into basis and optional parenthetical qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub basis: String,
    pub qualifier: Option<String>,
}

/// Split a trailing parenthetical qualifier off a raw ingredient name.
///
/// Returns the full trimmed name as basis when no trailing qualifier is
/// present. An empty qualifier (`"NAME ()"`) counts as absent.
pub fn split_parenthetical(raw: &str) -> ParsedName {
    let trimmed = raw.trim();
    if let Some(captures) = TRAILING_QUALIFIER.captures(trimmed) {
        let qualifier = captures["qualifier"].trim().to_string();
        return ParsedName {
            basis: captures["basis"].trim().to_string(),
            qualifier: if qualifier.is_empty() {
                None
            } else {
                Some(qualifier)
            },
        };
    }
    ParsedName {
        basis: trimmed.to_string(),
        qualifier: None,
    }
}

/// True when a name carries parentheses the qualifier pattern cannot parse.
fn is_unbalanced(name: &str) -> bool {
    let opens = name.matches('(').count();
    let closes = name.matches(')').count();
    opens != closes
}

/// Result of canonicalizing all ingredient rows.
#[derive(Debug, Default)]
pub struct CanonicalizeResult {
    /// Canonical name pair per ingredient code.
    pub names: BTreeMap<String, CanonicalName>,
    /// Count of names flagged as malformed (unbalanced parentheses).
    pub malformed_names: usize,
}

/// Derive canonical (basis, precise) pairs per ingredient code.
///
/// Raw names are uppercased and deduplicated per code. The basis of strength
/// comes from the lexicographically first distinct name with its qualifier
/// stripped; the precise name collects all distinct qualifiers pipe-joined,
/// falling back to the basis name when no qualifier exists.
pub fn canonicalize_names(rows: &[IngredientRecord]) -> CanonicalizeResult {
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        let code = row.ingredient_code.trim();
        let name = row.ingredient_name.trim().to_uppercase();
        if code.is_empty() || name.is_empty() {
            continue;
        }
        grouped.entry(code.to_string()).or_default().insert(name);
    }

    let mut result = CanonicalizeResult::default();
    for (code, raw_names) in grouped {
        let mut basis = String::new();
        let mut qualifiers: BTreeSet<String> = BTreeSet::new();
        for (idx, raw) in raw_names.iter().enumerate() {
            if is_unbalanced(raw) {
                result.malformed_names += 1;
                warn!(
                    ingredient_code = %code,
                    name = %raw,
                    "unbalanced parentheses in ingredient name, canonicalizing as-is"
                );
            }
            let parsed = split_parenthetical(raw);
            if idx == 0 {
                basis = parsed.basis;
            }
            if let Some(qualifier) = parsed.qualifier {
                qualifiers.insert(qualifier);
            }
        }
        let precise_name = if qualifiers.is_empty() {
            basis.clone()
        } else {
            qualifiers.iter().cloned().collect::<Vec<_>>().join("|")
        };
        result.names.insert(
            code.clone(),
            CanonicalName {
                ingredient_code: code,
                basis_of_strength_name: basis,
                precise_name,
            },
        );
    }
    result
}

/// Build the precise-name to active-moiety lookup from the cross-reference
/// table, keyed by uppercase precise name.
pub fn build_moiety_lookup(
    xref: &[ccdd_model::MoietyXrefRecord],
) -> BTreeMap<String, String> {
    let mut lookup = BTreeMap::new();
    for record in xref {
        let key = record.precise_name.trim().to_uppercase();
        let value = record.moiety_name.trim().to_uppercase();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        lookup.entry(key).or_insert(value);
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str) -> IngredientRecord {
        IngredientRecord {
            drug_code: "1".to_string(),
            ingredient_code: code.to_string(),
            ingredient_name: name.to_string(),
            strength: String::new(),
            strength_unit: String::new(),
            dosage_value: String::new(),
            dosage_unit: String::new(),
        }
    }

    #[test]
    fn split_extracts_trailing_qualifier() {
        let parsed = split_parenthetical("IBUPROFEN (AS SODIUM)");
        assert_eq!(parsed.basis, "IBUPROFEN");
        assert_eq!(parsed.qualifier.as_deref(), Some("AS SODIUM"));
    }

    #[test]
    fn split_without_qualifier_returns_whole_name() {
        let parsed = split_parenthetical("  IBUPROFEN ");
        assert_eq!(parsed.basis, "IBUPROFEN");
        assert!(parsed.qualifier.is_none());
    }

    #[test]
    fn split_keeps_inner_parenthetical_in_basis() {
        // Only a trailing qualifier is stripped.
        let parsed = split_parenthetical("VITAMIN B12 (CYANOCOBALAMIN) INJECTION");
        assert_eq!(parsed.basis, "VITAMIN B12 (CYANOCOBALAMIN) INJECTION");
        assert!(parsed.qualifier.is_none());
    }

    #[test]
    fn canonicalize_ibuprofen_scenario() {
        let rows = vec![row("I1", "IBUPROFEN"), row("I1", "IBUPROFEN (AS SODIUM)")];
        let result = canonicalize_names(&rows);
        let canonical = result.names.get("I1").expect("canonical name");
        assert_eq!(canonical.basis_of_strength_name, "IBUPROFEN");
        assert_eq!(canonical.precise_name, "AS SODIUM");
        assert_eq!(result.malformed_names, 0);
    }

    #[test]
    fn precise_name_falls_back_to_basis() {
        let rows = vec![row("I2", "ACETAMINOPHEN")];
        let result = canonicalize_names(&rows);
        let canonical = result.names.get("I2").expect("canonical name");
        assert_eq!(canonical.precise_name, canonical.basis_of_strength_name);
        assert!(!canonical.precise_name.is_empty());
    }

    #[test]
    fn distinct_qualifiers_are_pipe_joined() {
        let rows = vec![
            row("I3", "AMPHOTERICIN B (LIPOSOMAL)"),
            row("I3", "AMPHOTERICIN B (DEOXYCHOLATE)"),
        ];
        let result = canonicalize_names(&rows);
        let canonical = result.names.get("I3").expect("canonical name");
        assert_eq!(canonical.basis_of_strength_name, "AMPHOTERICIN B");
        assert_eq!(canonical.precise_name, "DEOXYCHOLATE|LIPOSOMAL");
    }

    #[test]
    fn unbalanced_parentheses_counted_not_fatal() {
        let rows = vec![row("I4", "HEPARIN (AS SODIUM")];
        let result = canonicalize_names(&rows);
        assert_eq!(result.malformed_names, 1);
        let canonical = result.names.get("I4").expect("canonical name");
        assert_eq!(canonical.basis_of_strength_name, "HEPARIN (AS SODIUM");
    }
}
