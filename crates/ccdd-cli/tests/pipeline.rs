//! End-to-end pipeline tests over a snapshot folder on disk.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use ccdd_core::{IdInterner, PipelineOptions, run_pipeline};
use ccdd_ingest::load_snapshot;
use ccdd_report::{OutputTables, write_outputs};

fn write_table(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// A small snapshot: two products sharing one ingredient multiset in
/// different row order, plus one product with an unresolvable moiety.
fn write_base_snapshot(dir: &Path) {
    write_table(
        dir,
        "drug.csv",
        "drug_code,din,brand_name,company_name\n\
         1,00000001,ADVIL DUAL,COMPANY A\n\
         2,00000002,MOTRIN PLUS,COMPANY B\n\
         3,00000003,MYSTERY,COMPANY C\n",
    );
    write_table(
        dir,
        "ingredient.csv",
        "drug_code,ingredient_code,ingredient_name,strength,strength_unit,dosage_value,dosage_unit\n\
         1,100,IBUPROFEN,200,MG,,\n\
         1,101,CAFFEINE,50,MG,,\n\
         2,101,CAFFEINE,50,MG,,\n\
         2,100,IBUPROFEN,200,MG,,\n\
         3,102,OBSCURINE,10,MG,,\n",
    );
    write_table(
        dir,
        "form.csv",
        "drug_code,pharm_form\n1,TABLET\n2,TABLET\n3,TABLET\n",
    );
    write_table(
        dir,
        "route.csv",
        "drug_code,route_admin\n1,ORAL\n2,ORAL\n3,ORAL\n",
    );
    write_table(
        dir,
        "status.csv",
        "drug_code,status,status_date\n\
         1,MARKETED,2020-01-01\n\
         2,MARKETED,2019-06-15\n\
         3,MARKETED,2021-03-01\n",
    );
    write_table(
        dir,
        "corrections.csv",
        "source_name,override_name,moiety_source,moiety_override\n",
    );
    write_table(
        dir,
        "moiety_xref.csv",
        "precise_name,moiety_name,ingredient_unique_id,moiety_unique_id\n\
         IBUPROFEN,IBUPROFEN,,\n\
         CAFFEINE,CAFFEINE,,\n",
    );
    write_table(
        dir,
        "dose_form_map.csv",
        "pharm_form,route_admin,ntp_dose_form\nTABLET,ORAL,oral tablet\n",
    );
    write_table(
        dir,
        "ranked_usage.csv",
        "moiety_set,usage_total\nCAFFEINE!IBUPROFEN,1000\nNONEXISTENT,5\n",
    );
}

#[test]
fn end_to_end_generates_filtered_tables() {
    let snapshot_dir = TempDir::new().unwrap();
    write_base_snapshot(snapshot_dir.path());

    let snapshot = load_snapshot(snapshot_dir.path()).unwrap();
    let result = run_pipeline(&snapshot, &PipelineOptions::default()).unwrap();

    assert!(result.priority_filtered);
    assert!(result.errors.is_empty());

    // Identical ingredient multisets in different row order share one NTP.
    assert_eq!(result.ntps.len(), 1);
    let ntp = &result.ntps[0];
    assert_eq!(
        ntp.formal_description,
        "caffeine 50 mg and ibuprofen 200 mg oral tablet"
    );
    assert_eq!(ntp.member_count, 2);
    assert_eq!(ntp.ntp_id, IdInterner::BASE_ID);
    assert_eq!(ntp.status_date.unwrap().to_string(), "2019-06-15");

    assert_eq!(result.tms.len(), 1);
    let tm = &result.tms[0];
    assert_eq!(tm.formal_description, "CAFFEINE and IBUPROFEN");
    assert_eq!(
        tm.moiety,
        vec!["CAFFEINE".to_string(), "IBUPROFEN".to_string()]
    );
    assert_eq!(tm.ntp_count, 1);

    // The sentinel-moiety product falls out of the filtered tables.
    assert_eq!(result.products.len(), 2);
    assert_eq!(result.exclusions.sentinel_moiety_products, 1);
    assert_eq!(result.mapping.len(), 2);
    for row in &result.mapping {
        assert_eq!(row.ntp_id, ntp.ntp_id);
        assert_eq!(row.tm_id, tm.tm_id);
        assert_eq!(row.dose_form, "oral tablet");
    }

    // The ranked entry with no TM lands in the unmatched report.
    assert_eq!(result.unmatched_ranked.len(), 1);
    assert_eq!(result.unmatched_ranked[0].moiety_set, "NONEXISTENT");

    let output_dir = snapshot_dir.path().join("output");
    let written = write_outputs(
        &output_dir,
        OutputTables {
            products: &result.products,
            ntps: &result.ntps,
            tms: &result.tms,
            mapping: &result.mapping,
            unmatched_ranked: &result.unmatched_ranked,
        },
    )
    .unwrap();
    assert_eq!(written.len(), 5);

    let product_csv = fs::read_to_string(output_dir.join("product.csv")).unwrap();
    assert_eq!(product_csv.lines().count(), 3);
    assert!(product_csv.contains("00000001"));
    assert!(product_csv.contains("Active"));

    let unmatched_csv = fs::read_to_string(output_dir.join("top250_nas.csv")).unwrap();
    assert!(unmatched_csv.contains("NONEXISTENT,5"));
}

#[test]
fn missing_ranked_usage_leaves_tables_unfiltered_with_error() {
    let snapshot_dir = TempDir::new().unwrap();
    write_base_snapshot(snapshot_dir.path());
    fs::remove_file(snapshot_dir.path().join("ranked_usage.csv")).unwrap();

    let snapshot = load_snapshot(snapshot_dir.path()).unwrap();
    let result = run_pipeline(&snapshot, &PipelineOptions::default()).unwrap();

    assert!(!result.priority_filtered);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("ranked usage"));
    // All three products survive, including the sentinel-moiety one.
    assert_eq!(result.products.len(), 3);
    assert_eq!(result.ntps.len(), 2);
    assert_eq!(result.tms.len(), 1);
    assert!(result.unmatched_ranked.is_empty());
}

#[test]
fn disabled_priority_filter_keeps_full_tables() {
    let snapshot_dir = TempDir::new().unwrap();
    write_base_snapshot(snapshot_dir.path());

    let snapshot = load_snapshot(snapshot_dir.path()).unwrap();
    let options = PipelineOptions {
        priority_filter: false,
        ..PipelineOptions::default()
    };
    let result = run_pipeline(&snapshot, &options).unwrap();

    assert!(!result.priority_filtered);
    assert!(result.errors.is_empty());
    assert_eq!(result.products.len(), 3);
    assert_eq!(result.ntps.len(), 2);
}

#[test]
fn moiety_override_rescues_unresolved_ingredient() {
    let snapshot_dir = TempDir::new().unwrap();
    write_base_snapshot(snapshot_dir.path());
    write_table(
        snapshot_dir.path(),
        "moiety_xref.csv",
        "precise_name,moiety_name,ingredient_unique_id,moiety_unique_id\n\
         IBUPROFEN,IBUPROFEN,,\n\
         CAFFEINE,CAFFEINE,,\n\
         OBSCURINE,OBSCURINE HYDROCHLORIDE,,\n",
    );
    write_table(
        snapshot_dir.path(),
        "corrections.csv",
        "source_name,override_name,moiety_source,moiety_override\n\
         ,,OBSCURINE HYDROCHLORIDE,OBSCURINE\n",
    );
    write_table(
        snapshot_dir.path(),
        "ranked_usage.csv",
        "moiety_set,usage_total\nCAFFEINE!IBUPROFEN,1000\nOBSCURINE,40\n",
    );

    let snapshot = load_snapshot(snapshot_dir.path()).unwrap();
    let result = run_pipeline(&snapshot, &PipelineOptions::default()).unwrap();

    assert_eq!(result.exclusions.sentinel_moiety_products, 0);
    assert_eq!(result.products.len(), 3);
    assert_eq!(result.tms.len(), 2);
    assert!(
        result
            .tms
            .iter()
            .any(|tm| tm.formal_description == "OBSCURINE")
    );
    assert!(result.unmatched_ranked.is_empty());
}
