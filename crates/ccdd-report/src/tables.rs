//! CSV writers for the four output tables and the unmatched-ranked report.
//!
//! The locale display columns are reserved placeholders for later
//! localization and are always written empty.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::Writer;
use tracing::info;

use ccdd_model::{MappingRow, NtpEntity, Product, RankedUsageRecord, Result, TmEntity};

pub const PRODUCT_TABLE_FILE: &str = "product.csv";
pub const NTP_TABLE_FILE: &str = "ntp.csv";
pub const TM_TABLE_FILE: &str = "tm.csv";
pub const MAPPING_TABLE_FILE: &str = "mapping.csv";
pub const UNMATCHED_REPORT_FILE: &str = "top250_nas.csv";

const ENTITY_HEADER: [&str; 6] = [
    "id",
    "formal_description",
    "locale_display_en",
    "locale_display_fr",
    "status",
    "status_effective_date",
];

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn write_product_table(path: &Path, products: &[Product]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "product_id",
        "formal_description",
        "locale_display_en",
        "locale_display_fr",
        "status",
        "status_effective_date",
    ])?;
    for product in products {
        writer.write_record([
            product.din.as_str(),
            product.formal_description.as_str(),
            "",
            "",
            product.status.as_str(),
            &format_date(product.status_date),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_ntp_table(path: &Path, ntps: &[NtpEntity]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    let mut header = ENTITY_HEADER;
    header[0] = "ntp_id";
    writer.write_record(header)?;
    for ntp in ntps {
        writer.write_record([
            &ntp.ntp_id.to_string(),
            ntp.formal_description.as_str(),
            "",
            "",
            ntp.status.as_str(),
            &format_date(ntp.status_date),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_tm_table(path: &Path, tms: &[TmEntity]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    let mut header = ENTITY_HEADER;
    header[0] = "tm_id";
    writer.write_record(header)?;
    for tm in tms {
        writer.write_record([
            &tm.tm_id.to_string(),
            tm.formal_description.as_str(),
            "",
            "",
            tm.status.as_str(),
            &format_date(tm.status_date),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_mapping_table(path: &Path, rows: &[MappingRow]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "product_id",
        "dose_form",
        "ntp_description",
        "ntp_id",
        "moiety_set",
        "tm_description",
        "tm_id",
    ])?;
    for row in rows {
        writer.write_record([
            row.product_id.as_str(),
            row.dose_form.as_str(),
            row.ntp_description.as_str(),
            &row.ntp_id.to_string(),
            row.moiety_set.as_str(),
            row.tm_description.as_str(),
            &row.tm_id.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_unmatched_report(path: &Path, unmatched: &[RankedUsageRecord]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["moiety_set", "usage_total"])?;
    for record in unmatched {
        writer.write_record([record.moiety_set.as_str(), record.usage_total.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Borrowed views of all tables to write in one call.
pub struct OutputTables<'a> {
    pub products: &'a [Product],
    pub ntps: &'a [NtpEntity],
    pub tms: &'a [TmEntity],
    pub mapping: &'a [MappingRow],
    pub unmatched_ranked: &'a [RankedUsageRecord],
}

/// Write all output tables into `output_dir`, creating it when necessary.
/// Returns the written paths in table order.
pub fn write_outputs(output_dir: &Path, tables: OutputTables<'_>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let product_path = output_dir.join(PRODUCT_TABLE_FILE);
    write_product_table(&product_path, tables.products)?;
    written.push(product_path);

    let ntp_path = output_dir.join(NTP_TABLE_FILE);
    write_ntp_table(&ntp_path, tables.ntps)?;
    written.push(ntp_path);

    let tm_path = output_dir.join(TM_TABLE_FILE);
    write_tm_table(&tm_path, tables.tms)?;
    written.push(tm_path);

    let mapping_path = output_dir.join(MAPPING_TABLE_FILE);
    write_mapping_table(&mapping_path, tables.mapping)?;
    written.push(mapping_path);

    let unmatched_path = output_dir.join(UNMATCHED_REPORT_FILE);
    write_unmatched_report(&unmatched_path, tables.unmatched_ranked)?;
    written.push(unmatched_path);

    info!(
        output_dir = %output_dir.display(),
        file_count = written.len(),
        "output tables written"
    );
    Ok(written)
}
