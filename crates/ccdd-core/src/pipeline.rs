//! The canonicalization and identity-assignment pipeline.
//!
//! Stages run in a fixed order over the in-memory snapshot:
//! 1. **Canonicalize**: derive (basis, precise) name pairs per ingredient code
//! 2. **Correct**: apply name/moiety overrides and the salt unification
//! 3. **Assemble**: join drug, form, route and status rows into products,
//!    resolve dose forms, and build substance sets
//! 4. **Entities**: derive NTP and TM tables and intern their IDs
//! 5. **Crossref**: build the product-to-NTP/TM mapping table
//! 6. **Priority**: restrict tables to the top-ranked moiety sets
//!
//! Stages never abort on a single bad record; bad records are excluded,
//! counted, and logged. Only a missing required reference table aborts the
//! run, and a missing ranked-usage feed disables stage 6 alone.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, info_span, warn};

use ccdd_ingest::Snapshot;
use ccdd_model::{
    MappingRow, NtpEntity, Product, ProductIngredient, ProductStatus, RankedUsageRecord, Result,
    TmEntity,
};

use crate::corrections::{CorrectionTables, apply_corrections};
use crate::crossref::build_mapping;
use crate::dose_form::DoseFormMap;
use crate::entities::{IdInterner, build_ntp_table, build_tm_table};
use crate::ingredient::{build_moiety_lookup, canonicalize_names};
use crate::priority::{DEFAULT_TOP_N, filter_tables, partition_ranked};
use crate::substance_sets::build_substance_sets;

use ccdd_model::SENTINEL_MOIETY;

/// Options controlling a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of ranked entries the priority filter considers.
    pub top_n: usize,
    /// Apply the priority filter when the ranked-usage table is present.
    pub priority_filter: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            priority_filter: true,
        }
    }
}

/// Counts of records excluded or flagged along the way.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExclusionCounts {
    /// Ingredient names with unbalanced parentheses (canonicalized as-is).
    pub malformed_names: usize,
    /// Products whose (form, route) pair had no dose-form mapping.
    pub missing_dose_form: usize,
    /// Products excluded from TM/mapping because of a sentinel moiety set.
    pub sentinel_moiety_products: usize,
    /// Drug codes with no ingredient rows at all.
    pub products_without_ingredients: usize,
}

/// All tables and reports produced by one run.
#[derive(Debug, Default)]
pub struct PipelineResult {
    pub products: Vec<Product>,
    pub ntps: Vec<NtpEntity>,
    pub tms: Vec<TmEntity>,
    pub mapping: Vec<MappingRow>,
    /// Ranked entries with no TM entity; populated when the filter ran.
    pub unmatched_ranked: Vec<RankedUsageRecord>,
    /// True when the priority filter actually restricted the tables.
    pub priority_filtered: bool,
    pub exclusions: ExclusionCounts,
    /// Non-fatal stage errors, reported alongside the outputs.
    pub errors: Vec<String>,
}

/// Parse a status effective date leniently across the formats seen in the
/// upstream feeds. Unparseable dates resolve to `None`.
pub fn parse_status_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%d-%b-%Y", "%Y%m%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    None
}

fn first_by_code<'a, T>(
    rows: &'a [T],
    code: impl Fn(&'a T) -> &'a str,
) -> BTreeMap<&'a str, &'a T> {
    let mut map = BTreeMap::new();
    for row in rows {
        map.entry(code(row).trim()).or_insert(row);
    }
    map
}

fn product_description(product: &Product) -> String {
    let composition = product.sets.display.join(" and ");
    let form = product
        .dose_form
        .as_deref()
        .unwrap_or(product.pharm_form.as_str());
    format!("{} {} {}", product.brand_name, composition, form).to_lowercase()
}

/// Run the full pipeline over one snapshot.
pub fn run_pipeline(snapshot: &Snapshot, options: &PipelineOptions) -> Result<PipelineResult> {
    let mut result = PipelineResult::default();

    // Stage 1: canonicalize ingredient names
    let canonical_span = info_span!("canonicalize");
    let canonical_start = Instant::now();
    let canonical = canonical_span.in_scope(|| canonicalize_names(&snapshot.ingredients));
    result.exclusions.malformed_names = canonical.malformed_names;
    info!(
        ingredient_codes = canonical.names.len(),
        malformed_names = canonical.malformed_names,
        duration_ms = canonical_start.elapsed().as_millis(),
        "canonicalize complete"
    );

    // Stage 2: corrections and moiety resolution, per ingredient row
    let correct_span = info_span!("correct");
    let _correct_guard = correct_span.enter();
    let correct_start = Instant::now();
    let corrections = CorrectionTables::from_records(&snapshot.corrections);
    let moiety_lookup = build_moiety_lookup(&snapshot.moiety_xref);
    let mut ingredients_by_drug: BTreeMap<String, Vec<ProductIngredient>> = BTreeMap::new();
    let mut unresolved_moieties = 0usize;
    for row in &snapshot.ingredients {
        let Some(canonical_name) = canonical.names.get(row.ingredient_code.trim()) else {
            continue;
        };
        let mut precise_name = canonical_name.precise_name.clone();
        let mut moiety_name = moiety_lookup
            .get(&precise_name)
            .cloned()
            .unwrap_or_else(|| SENTINEL_MOIETY.to_string());
        if moiety_name == SENTINEL_MOIETY {
            unresolved_moieties += 1;
            debug!(
                ingredient_code = %canonical_name.ingredient_code,
                precise_name = %precise_name,
                "no active moiety cross-reference"
            );
        }
        apply_corrections(&corrections, &mut precise_name, &mut moiety_name);
        ingredients_by_drug
            .entry(row.drug_code.trim().to_string())
            .or_default()
            .push(ProductIngredient {
                drug_code: row.drug_code.trim().to_string(),
                ingredient_code: canonical_name.ingredient_code.clone(),
                basis_of_strength_name: canonical_name.basis_of_strength_name.clone(),
                precise_name,
                moiety_name,
                strength: row.strength.trim().to_string(),
                strength_unit: row.strength_unit.trim().to_string(),
                dosage_value: row.dosage_value.trim().to_string(),
                dosage_unit: row.dosage_unit.trim().to_string(),
            });
    }
    drop(_correct_guard);
    info!(
        drug_codes = ingredients_by_drug.len(),
        unresolved_moieties,
        duration_ms = correct_start.elapsed().as_millis(),
        "correct complete"
    );

    // Stage 3: assemble products with dose forms and substance sets
    let assemble_span = info_span!("assemble");
    let _assemble_guard = assemble_span.enter();
    let assemble_start = Instant::now();
    let dose_form_map = DoseFormMap::from_records(&snapshot.dose_form_map);
    let forms = first_by_code(&snapshot.forms, |row| row.drug_code.as_str());
    let routes = first_by_code(&snapshot.routes, |row| row.drug_code.as_str());
    let statuses = first_by_code(&snapshot.statuses, |row| row.drug_code.as_str());

    let mut products = Vec::with_capacity(snapshot.drugs.len());
    for drug in &snapshot.drugs {
        let drug_code = drug.drug_code.trim();
        let pharm_form = forms
            .get(drug_code)
            .map(|row| row.pharm_form.trim().to_string())
            .unwrap_or_default();
        let route_admin = routes
            .get(drug_code)
            .map(|row| row.route_admin.trim().to_string())
            .unwrap_or_default();
        let (status, status_date) = match statuses.get(drug_code) {
            Some(row) => (
                ProductStatus::from_raw(&row.status),
                parse_status_date(&row.status_date),
            ),
            None => (ProductStatus::Inactive, None),
        };
        let dose_form = dose_form_map
            .resolve(&pharm_form, &route_admin)
            .map(String::from);
        if dose_form.is_none() {
            result.exclusions.missing_dose_form += 1;
            debug!(
                drug_code = %drug_code,
                pharm_form = %pharm_form,
                route_admin = %route_admin,
                "no dose form mapping"
            );
        }
        let ingredient_rows = ingredients_by_drug.get(drug_code);
        let sets = match ingredient_rows {
            Some(rows) => build_substance_sets(rows),
            None => {
                result.exclusions.products_without_ingredients += 1;
                warn!(drug_code = %drug_code, "drug code has no ingredient rows");
                Default::default()
            }
        };
        if sets.has_sentinel_moiety() {
            result.exclusions.sentinel_moiety_products += 1;
        }
        let mut product = Product {
            drug_code: drug_code.to_string(),
            din: drug.din.trim().to_string(),
            brand_name: drug.brand_name.trim().to_string(),
            company_name: drug.company_name.trim().to_string(),
            pharm_form,
            route_admin,
            status,
            status_date,
            dose_form,
            sets,
            formal_description: String::new(),
        };
        product.formal_description = product_description(&product);
        products.push(product);
    }
    drop(_assemble_guard);
    info!(
        products = products.len(),
        missing_dose_form = result.exclusions.missing_dose_form,
        sentinel_moiety_products = result.exclusions.sentinel_moiety_products,
        duration_ms = assemble_start.elapsed().as_millis(),
        "assemble complete"
    );

    // Stage 4: entity tables with ID interning
    let entities_span = info_span!("entities");
    let _entities_guard = entities_span.enter();
    let entities_start = Instant::now();
    let mut ntp_interner = IdInterner::new();
    let ntps = build_ntp_table(&products, &mut ntp_interner);

    let ntp_ids_by_key: BTreeMap<(&[String], &str), u64> = ntps
        .iter()
        .map(|ntp| {
            (
                (ntp.strength_dosage.as_slice(), ntp.dose_form.as_str()),
                ntp.ntp_id,
            )
        })
        .collect();
    let mut product_ntp_ids: BTreeMap<String, u64> = BTreeMap::new();
    for product in &products {
        let Some(dose_form) = product.dose_form.as_deref() else {
            continue;
        };
        let key = product.sets.strength_dosage.as_slice();
        if let Some(id) = ntp_ids_by_key.get(&(key, dose_form)) {
            product_ntp_ids.insert(product.din.clone(), *id);
        }
    }

    let mut tm_interner = IdInterner::new();
    let tms = build_tm_table(&products, &product_ntp_ids, &mut tm_interner);
    drop(_entities_guard);
    info!(
        ntp_count = ntps.len(),
        tm_count = tms.len(),
        duration_ms = entities_start.elapsed().as_millis(),
        "entities complete"
    );

    // Stage 5: cross-reference mapping
    let crossref_span = info_span!("crossref");
    let crossref_start = Instant::now();
    let (mapping, crossref_exclusions) =
        crossref_span.in_scope(|| build_mapping(&products, &ntps, &tms));
    info!(
        mapping_rows = mapping.len(),
        missing_dose_form = crossref_exclusions.missing_dose_form,
        sentinel_moiety = crossref_exclusions.sentinel_moiety,
        unresolved_identity = crossref_exclusions.unresolved_identity,
        duration_ms = crossref_start.elapsed().as_millis(),
        "crossref complete"
    );

    result.products = products;
    result.ntps = ntps;
    result.tms = tms;
    result.mapping = mapping;

    // Stage 6: priority filter
    if options.priority_filter {
        match snapshot.ranked_usage.as_deref() {
            Some(ranked) => {
                let priority_span = info_span!("priority");
                let _priority_guard = priority_span.enter();
                let outcome = partition_ranked(ranked, options.top_n, &result.tms);
                filter_tables(
                    &mut result.products,
                    &mut result.ntps,
                    &mut result.tms,
                    &mut result.mapping,
                    &outcome.matched,
                );
                result.unmatched_ranked = outcome.unmatched;
                result.priority_filtered = true;
            }
            None => {
                // Fatal for this stage only: earlier tables stay usable.
                result.errors.push(
                    "ranked usage reference unavailable, tables left unfiltered".to_string(),
                );
                warn!("ranked usage reference unavailable, skipping priority filter");
            }
        }
    }

    Ok(result)
}
