//! Derived entities of the canonical terminology hierarchy.

use chrono::NaiveDate;

/// Delimiter used when a substance set is serialized to a grouping key.
/// Canonical names never contain this character.
pub const SET_DELIMITER: char = '!';

/// Sentinel element marking an unresolved therapeutic moiety.
pub const SENTINEL_MOIETY: &str = "NA";

/// Product status collapsed to the two states the output tables carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    /// Map a raw status string onto the active/inactive split.
    pub fn from_raw(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            "MARKETED" | "APPROVED" | "ACTIVE" => ProductStatus::Active,
            _ => ProductStatus::Inactive,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "Active",
            ProductStatus::Inactive => "Inactive",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, ProductStatus::Active)
    }
}

/// Canonical (basis-of-strength, precise-name) pair derived for one
/// ingredient code across all of its raw name spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub ingredient_code: String,
    /// Raw name with any trailing parenthetical qualifier stripped.
    pub basis_of_strength_name: String,
    /// Qualifier contents, pipe-joined when several distinct qualifiers
    /// exist. Never empty: falls back to `basis_of_strength_name`.
    pub precise_name: String,
}

/// One canonicalized ingredient occurrence on a specific product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIngredient {
    pub drug_code: String,
    pub ingredient_code: String,
    pub basis_of_strength_name: String,
    pub precise_name: String,
    /// Resolved active moiety, possibly the `"NA"` sentinel.
    pub moiety_name: String,
    pub strength: String,
    pub strength_unit: String,
    pub dosage_value: String,
    pub dosage_unit: String,
}

impl ProductIngredient {
    /// Strength with unit, extended with the dosage denominator when present,
    /// e.g. `"200 MG"` or `"5 MG per 1 ML"`.
    pub fn strength_text(&self) -> String {
        let mut text = String::new();
        let strength = self.strength.trim();
        let unit = self.strength_unit.trim();
        if !strength.is_empty() {
            text.push_str(strength);
        }
        if !unit.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(unit);
        }
        let dosage_value = self.dosage_value.trim();
        let dosage_unit = self.dosage_unit.trim();
        if !dosage_value.is_empty() {
            text.push_str(" per ");
            text.push_str(dosage_value);
            if !dosage_unit.is_empty() {
                text.push(' ');
                text.push_str(dosage_unit);
            }
        }
        text
    }
}

/// The four parallel ordered set-keys for one product, plus the display key.
///
/// Elements are held as genuine ordered sequences; `!`-joined strings are
/// produced only where a grouping or output key is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstanceSets {
    /// Distinct precise names in sorted ingredient order.
    pub substance: Vec<String>,
    /// Distinct basis-of-strength names.
    pub basis: Vec<String>,
    /// Distinct moiety names, possibly containing the `"NA"` sentinel.
    pub moiety: Vec<String>,
    /// Distinct "name strength" elements.
    pub strength_dosage: Vec<String>,
    /// Display elements pairing basis with precise (when they differ) and
    /// the strength text.
    pub display: Vec<String>,
}

/// Serialize an element set to its `!`-joined key form. Only for output and
/// for matching externally serialized keys; grouping stays on the element
/// vectors themselves.
pub fn join_set_key(elements: &[String]) -> String {
    let mut key = String::new();
    for (idx, element) in elements.iter().enumerate() {
        if idx > 0 {
            key.push(SET_DELIMITER);
        }
        key.push_str(element);
    }
    key
}

impl SubstanceSets {
    pub fn substance_key(&self) -> String {
        join_set_key(&self.substance)
    }

    pub fn basis_key(&self) -> String {
        join_set_key(&self.basis)
    }

    pub fn moiety_key(&self) -> String {
        join_set_key(&self.moiety)
    }

    pub fn strength_dosage_key(&self) -> String {
        join_set_key(&self.strength_dosage)
    }

    pub fn display_key(&self) -> String {
        join_set_key(&self.display)
    }

    /// True when the moiety set contains any unresolved element and must not
    /// receive a therapeutic-moiety identity.
    pub fn has_sentinel_moiety(&self) -> bool {
        self.moiety.iter().any(|name| name == SENTINEL_MOIETY)
    }

    /// Number of distinct ingredients behind this set.
    pub fn ingredient_count(&self) -> usize {
        self.substance.len()
    }
}

/// One drug product with its resolved attributes and substance sets.
#[derive(Debug, Clone)]
pub struct Product {
    pub drug_code: String,
    /// Unique product identifier (DIN).
    pub din: String,
    pub brand_name: String,
    pub company_name: String,
    pub pharm_form: String,
    pub route_admin: String,
    pub status: ProductStatus,
    pub status_date: Option<NaiveDate>,
    /// Controlled dose form, absent when no mapping entry matched.
    pub dose_form: Option<String>,
    pub sets: SubstanceSets,
    pub formal_description: String,
}

/// Named Therapeutic Product: products sharing strength/dosage composition
/// and dose form.
#[derive(Debug, Clone)]
pub struct NtpEntity {
    pub ntp_id: u64,
    pub formal_description: String,
    pub status: ProductStatus,
    pub status_date: Option<NaiveDate>,
    /// Strength/dosage element set the group shares.
    pub strength_dosage: Vec<String>,
    pub dose_form: String,
    /// Set when the group carries more than five distinct ingredients.
    pub over_five_ingredients: bool,
    pub member_count: usize,
}

/// Therapeutic Moiety: products sharing active-moiety composition.
#[derive(Debug, Clone)]
pub struct TmEntity {
    pub tm_id: u64,
    pub formal_description: String,
    pub status: ProductStatus,
    pub status_date: Option<NaiveDate>,
    /// Moiety element set the group shares.
    pub moiety: Vec<String>,
    /// Distinct NTP identities among member products.
    pub ntp_count: usize,
}

/// Join row linking one product to its NTP and TM identities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MappingRow {
    pub product_id: String,
    pub dose_form: String,
    pub ntp_description: String,
    pub ntp_id: u64,
    pub moiety_set: String,
    pub tm_description: String,
    pub tm_id: u64,
}
