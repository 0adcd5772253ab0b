//! Snapshot loading against a temporary directory of CSV tables.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use ccdd_ingest::{load_snapshot, read_records};
use ccdd_model::{CcddError, IngredientRecord};

fn write_table(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write table");
}

fn write_minimal_snapshot(dir: &Path) {
    write_table(
        dir,
        "drug.csv",
        "drug_code,din,brand_name,company_name\n1,00000001,PAINAWAY,ACME PHARMA\n",
    );
    write_table(
        dir,
        "ingredient.csv",
        "drug_code,ingredient_code,ingredient_name,strength,strength_unit,dosage_value,dosage_unit\n\
         1,I1,IBUPROFEN,200,MG,,\n",
    );
    write_table(dir, "form.csv", "drug_code,pharm_form\n1,TABLET\n");
    write_table(dir, "route.csv", "drug_code,route_admin\n1,ORAL\n");
    write_table(
        dir,
        "status.csv",
        "drug_code,status,status_date\n1,MARKETED,2019-04-01\n",
    );
    write_table(
        dir,
        "moiety_xref.csv",
        "precise_name,moiety_name,ingredient_unique_id,moiety_unique_id\nIBUPROFEN,IBUPROFEN,U1,M1\n",
    );
    write_table(
        dir,
        "dose_form_map.csv",
        "pharm_form,route_admin,ntp_dose_form\nTABLET,ORAL,oral tablet\n",
    );
}

#[test]
fn loads_snapshot_without_optional_tables() {
    let dir = tempdir().expect("tempdir");
    write_minimal_snapshot(dir.path());

    let snapshot = load_snapshot(dir.path()).expect("load snapshot");
    assert_eq!(snapshot.drugs.len(), 1);
    assert_eq!(snapshot.ingredients.len(), 1);
    assert!(snapshot.corrections.is_empty());
    assert!(snapshot.ranked_usage.is_none());
}

#[test]
fn missing_required_table_is_reported_by_name() {
    let dir = tempdir().expect("tempdir");
    write_minimal_snapshot(dir.path());
    fs::remove_file(dir.path().join("ingredient.csv")).expect("remove");

    let error = load_snapshot(dir.path()).expect_err("missing table");
    match error {
        CcddError::MissingReference { table, .. } => assert_eq!(table, "ingredient.csv"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ranked_usage_is_loaded_when_present() {
    let dir = tempdir().expect("tempdir");
    write_minimal_snapshot(dir.path());
    write_table(
        dir.path(),
        "ranked_usage.csv",
        "moiety_set,usage_total\nIBUPROFEN,120000\nACETAMINOPHEN,90000\n",
    );

    let snapshot = load_snapshot(dir.path()).expect("load snapshot");
    let ranked = snapshot.ranked_usage.expect("ranked usage present");
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].moiety_set, "IBUPROFEN");
}

#[test]
fn headers_are_normalized_before_deserialization() {
    let dir = tempdir().expect("tempdir");
    write_table(
        dir.path(),
        "ingredient.csv",
        "\u{feff}Drug Code,Ingredient Code,Ingredient Name,Strength,Strength Unit,Dosage Value,Dosage Unit\n\
         7,I9, NAPROXEN SODIUM ,250,MG,,\n",
    );

    let rows: Vec<IngredientRecord> =
        read_records(&dir.path().join("ingredient.csv")).expect("read records");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].drug_code, "7");
    // Cell-level trim is applied by the reader configuration.
    assert_eq!(rows[0].ingredient_name, "NAPROXEN SODIUM");
}
