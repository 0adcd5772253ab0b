//! NTP and TM entity table builders with stable ID interning.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use ccdd_model::{NtpEntity, Product, ProductStatus, TmEntity};

/// Bijective mapping from canonical key strings to sequential numeric IDs.
///
/// IDs start at a fixed offset and are dense in first-intern order. Callers
/// intern keys in explicit sorted order, so assignments are deterministic
/// within a run. IDs are not persisted across runs.
#[derive(Debug)]
pub struct IdInterner {
    next: u64,
    ids: BTreeMap<String, u64>,
}

impl IdInterner {
    pub const BASE_ID: u64 = 9_000_000;

    pub fn new() -> Self {
        Self {
            next: Self::BASE_ID,
            ids: BTreeMap::new(),
        }
    }

    /// Return the ID for a key, assigning the next sequential ID on first
    /// encounter.
    pub fn intern(&mut self, key: &str) -> u64 {
        if let Some(id) = self.ids.get(key) {
            return *id;
        }
        let id = self.next;
        self.next += 1;
        self.ids.insert(key.to_string(), id);
        id
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for IdInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// True when a product's moiety set cannot carry a therapeutic-moiety
/// identity: no resolved elements at all, or any element is the sentinel.
/// Checked element-wise, never on the serialized key.
pub fn lacks_moiety_identity(product: &Product) -> bool {
    product.sets.moiety.is_empty() || product.sets.has_sentinel_moiety()
}

fn group_status(members: &[&Product]) -> ProductStatus {
    if members.iter().any(|product| product.status.is_active()) {
        ProductStatus::Active
    } else {
        ProductStatus::Inactive
    }
}

fn earliest_date(members: &[&Product]) -> Option<NaiveDate> {
    members.iter().filter_map(|product| product.status_date).min()
}

/// NTP formal description: lowercase display elements joined with "and",
/// followed by the dose form.
fn ntp_description(display_elements: &[String], dose_form: &str) -> String {
    format!("{} {}", display_elements.join(" and "), dose_form).to_lowercase()
}

/// TM formal description: moiety elements joined with the literal "and".
fn tm_description(moiety_elements: &[String]) -> String {
    moiety_elements.join(" and ")
}

/// Group products by (strength/dosage set, dose form) into NTP entities.
///
/// Grouping keys are the element vectors themselves, so element content is
/// never confused with the serialized key form. Products without a resolved
/// dose form or without ingredients never join a group. Groups are visited in
/// sorted key order before interning, so ID assignment is deterministic for a
/// given input population.
pub fn build_ntp_table(products: &[Product], interner: &mut IdInterner) -> Vec<NtpEntity> {
    let mut groups: BTreeMap<(Vec<String>, String), Vec<&Product>> = BTreeMap::new();
    for product in products {
        let Some(dose_form) = product.dose_form.as_deref() else {
            continue;
        };
        if product.sets.strength_dosage.is_empty() {
            continue;
        }
        groups
            .entry((product.sets.strength_dosage.clone(), dose_form.to_string()))
            .or_default()
            .push(product);
    }

    let mut entities = Vec::with_capacity(groups.len());
    for ((strength_dosage, dose_form), members) in groups {
        let formal_description = ntp_description(&members[0].sets.display, &dose_form);
        let ntp_id = interner.intern(&formal_description);
        entities.push(NtpEntity {
            ntp_id,
            formal_description,
            status: group_status(&members),
            status_date: earliest_date(&members),
            strength_dosage,
            dose_form,
            over_five_ingredients: members[0].sets.ingredient_count() > 5,
            member_count: members.len(),
        });
    }
    entities
}

/// Group products by moiety element set into TM entities, excluding products
/// without a moiety identity.
///
/// `product_ntp_ids` maps product identifiers (DIN) to their interned NTP ID
/// and feeds the distinct-NTP count per moiety group.
pub fn build_tm_table(
    products: &[Product],
    product_ntp_ids: &BTreeMap<String, u64>,
    interner: &mut IdInterner,
) -> Vec<TmEntity> {
    let mut groups: BTreeMap<Vec<String>, Vec<&Product>> = BTreeMap::new();
    for product in products {
        if lacks_moiety_identity(product) {
            continue;
        }
        groups
            .entry(product.sets.moiety.clone())
            .or_default()
            .push(product);
    }

    let mut entities = Vec::with_capacity(groups.len());
    for (moiety, members) in groups {
        let formal_description = tm_description(&moiety);
        let tm_id = interner.intern(&formal_description);
        let mut ntp_ids: Vec<u64> = members
            .iter()
            .filter_map(|product| product_ntp_ids.get(&product.din).copied())
            .collect();
        ntp_ids.sort_unstable();
        ntp_ids.dedup();
        entities.push(TmEntity {
            tm_id,
            formal_description,
            status: group_status(&members),
            status_date: earliest_date(&members),
            moiety,
            ntp_count: ntp_ids.len(),
        });
    }
    entities
}
