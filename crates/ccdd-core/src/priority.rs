//! Priority filtering against the externally ranked usage list.

use std::collections::BTreeSet;

use tracing::info;

use ccdd_model::{MappingRow, NtpEntity, Product, RankedUsageRecord, TmEntity, join_set_key};

/// Default number of ranked entries taken from the usage list.
pub const DEFAULT_TOP_N: usize = 250;

/// Result of matching the top-ranked entries against the TM table.
#[derive(Debug, Default)]
pub struct PriorityOutcome {
    /// Moiety-set keys of ranked entries with a TM entity.
    pub matched: BTreeSet<String>,
    /// Ranked entries with no corresponding TM entity. Reported, never
    /// silently dropped.
    pub unmatched: Vec<RankedUsageRecord>,
}

/// Partition the top-N ranked entries into matched and unmatched against the
/// TM table. The ranked list arrives with serialized keys, so TM element sets
/// are serialized here at the boundary; keys compare after trimming and
/// uppercasing.
pub fn partition_ranked(
    ranked: &[RankedUsageRecord],
    top_n: usize,
    tms: &[TmEntity],
) -> PriorityOutcome {
    let tm_keys: BTreeSet<String> = tms
        .iter()
        .map(|tm| join_set_key(&tm.moiety).trim().to_uppercase())
        .collect();
    let mut outcome = PriorityOutcome::default();
    for record in ranked.iter().take(top_n) {
        let key = record.moiety_set.trim().to_uppercase();
        if key.is_empty() {
            continue;
        }
        if tm_keys.contains(&key) {
            outcome.matched.insert(key);
        } else {
            outcome.unmatched.push(record.clone());
        }
    }
    outcome
}

/// Restrict all four tables to the matched moiety sets via set membership on
/// the shared key.
pub fn filter_tables(
    products: &mut Vec<Product>,
    ntps: &mut Vec<NtpEntity>,
    tms: &mut Vec<TmEntity>,
    mapping: &mut Vec<MappingRow>,
    matched: &BTreeSet<String>,
) {
    let before_products = products.len();
    products.retain(|product| matched.contains(&product.sets.moiety_key()));

    let retained_ntp_keys: BTreeSet<(&[String], &str)> = products
        .iter()
        .filter_map(|product| {
            product
                .dose_form
                .as_deref()
                .map(|form| (product.sets.strength_dosage.as_slice(), form))
        })
        .collect();
    ntps.retain(|ntp| {
        retained_ntp_keys.contains(&(ntp.strength_dosage.as_slice(), ntp.dose_form.as_str()))
    });

    tms.retain(|tm| matched.contains(&join_set_key(&tm.moiety)));
    mapping.retain(|row| matched.contains(&row.moiety_set));

    info!(
        matched = matched.len(),
        products_before = before_products,
        products_after = products.len(),
        ntp_after = ntps.len(),
        tm_after = tms.len(),
        mapping_after = mapping.len(),
        "priority filter applied"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccdd_model::ProductStatus;

    fn ranked(key: &str) -> RankedUsageRecord {
        RankedUsageRecord {
            moiety_set: key.to_string(),
            usage_total: "1000".to_string(),
        }
    }

    fn tm(element: &str) -> TmEntity {
        TmEntity {
            tm_id: 9_000_000,
            formal_description: element.to_string(),
            status: ProductStatus::Active,
            status_date: None,
            moiety: vec![element.to_string()],
            ntp_count: 1,
        }
    }

    #[test]
    fn unmatched_ranked_entries_are_reported() {
        let tms = vec![tm("IBUPROFEN")];
        let outcome = partition_ranked(&[ranked("IBUPROFEN"), ranked("UNOBTAINIUM")], 250, &tms);
        assert_eq!(outcome.matched.len(), 1);
        assert!(outcome.matched.contains("IBUPROFEN"));
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(outcome.unmatched[0].moiety_set, "UNOBTAINIUM");
    }

    #[test]
    fn only_top_n_entries_are_considered() {
        let tms = vec![tm("IBUPROFEN"), tm("NAPROXEN")];
        let outcome = partition_ranked(&[ranked("IBUPROFEN"), ranked("NAPROXEN")], 1, &tms);
        assert_eq!(outcome.matched.len(), 1);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn filter_retains_only_matched_tms() {
        let mut products = Vec::new();
        let mut ntps = Vec::new();
        let mut tms = vec![tm("IBUPROFEN"), tm("NAPROXEN")];
        let mut mapping = Vec::new();
        let matched: BTreeSet<String> = ["IBUPROFEN".to_string()].into_iter().collect();
        filter_tables(&mut products, &mut ntps, &mut tms, &mut mapping, &matched);
        assert_eq!(tms.len(), 1);
        assert_eq!(tms[0].moiety, vec!["IBUPROFEN".to_string()]);
    }
}
