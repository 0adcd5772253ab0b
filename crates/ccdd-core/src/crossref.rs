//! Cross-reference mapping between products, NTP and TM identities.

use std::collections::{BTreeMap, BTreeSet};

use ccdd_model::{MappingRow, NtpEntity, Product, TmEntity};

use crate::entities::lacks_moiety_identity;

/// Per-product exclusion counts for the mapping build.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossrefExclusions {
    pub missing_dose_form: usize,
    pub sentinel_moiety: usize,
    pub unresolved_identity: usize,
}

/// Build the deduplicated product-to-NTP/TM join table.
///
/// Identities join on the element vectors, not their serialized key form.
/// Products without a dose form cannot resolve an NTP identity; products
/// with a sentinel moiety set never receive a TM identity. Both are counted
/// and excluded rather than aborting.
pub fn build_mapping(
    products: &[Product],
    ntps: &[NtpEntity],
    tms: &[TmEntity],
) -> (Vec<MappingRow>, CrossrefExclusions) {
    let ntp_by_key: BTreeMap<(&[String], &str), &NtpEntity> = ntps
        .iter()
        .map(|ntp| ((ntp.strength_dosage.as_slice(), ntp.dose_form.as_str()), ntp))
        .collect();
    let tm_by_key: BTreeMap<&[String], &TmEntity> = tms
        .iter()
        .map(|tm| (tm.moiety.as_slice(), tm))
        .collect();

    let mut exclusions = CrossrefExclusions::default();
    let mut rows: BTreeSet<MappingRow> = BTreeSet::new();
    for product in products {
        let Some(dose_form) = product.dose_form.as_deref() else {
            exclusions.missing_dose_form += 1;
            continue;
        };
        if lacks_moiety_identity(product) {
            exclusions.sentinel_moiety += 1;
            continue;
        }
        let ntp = ntp_by_key.get(&(product.sets.strength_dosage.as_slice(), dose_form));
        let tm = tm_by_key.get(product.sets.moiety.as_slice());
        let (Some(ntp), Some(tm)) = (ntp, tm) else {
            exclusions.unresolved_identity += 1;
            continue;
        };
        rows.insert(MappingRow {
            product_id: product.din.clone(),
            dose_form: dose_form.to_string(),
            ntp_description: ntp.formal_description.clone(),
            ntp_id: ntp.ntp_id,
            moiety_set: product.sets.moiety_key(),
            tm_description: tm.formal_description.clone(),
            tm_id: tm.tm_id,
        });
    }
    (rows.into_iter().collect(), exclusions)
}
