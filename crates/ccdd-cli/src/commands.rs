use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use ccdd_core::{PipelineOptions, run_pipeline};
use ccdd_ingest::{SNAPSHOT_TABLES, load_snapshot};
use ccdd_report::{OutputTables, write_outputs};

use crate::cli::GenerateArgs;
use crate::summary::apply_table_style;
use crate::types::{GenerateResult, TableSummary};

pub fn run_inputs() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Table", "Role"]);
    apply_table_style(&mut table);
    for (file, role) in SNAPSHOT_TABLES {
        table.add_row(vec![(*file).to_string(), (*role).to_string()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_generate(args: &GenerateArgs) -> Result<GenerateResult> {
    let generate_span = info_span!("generate", snapshot_dir = %args.snapshot_dir.display());
    let _generate_guard = generate_span.enter();
    let generate_start = Instant::now();

    let snapshot = load_snapshot(&args.snapshot_dir).context("load snapshot")?;
    info!(
        drugs = snapshot.drugs.len(),
        ingredients = snapshot.ingredients.len(),
        corrections = snapshot.corrections.len(),
        ranked_usage = snapshot.ranked_usage.as_ref().map_or(0, Vec::len),
        "snapshot loaded"
    );

    let options = PipelineOptions {
        top_n: args.top_n,
        priority_filter: !args.no_priority_filter,
    };
    let result = run_pipeline(&snapshot, &options).context("run pipeline")?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.snapshot_dir.join("output"));

    let written = if args.dry_run {
        info!("output skipped (dry run)");
        Vec::new()
    } else {
        write_outputs(
            &output_dir,
            OutputTables {
                products: &result.products,
                ntps: &result.ntps,
                tms: &result.tms,
                mapping: &result.mapping,
                unmatched_ranked: &result.unmatched_ranked,
            },
        )
        .context("write output tables")?
    };

    let row_counts = [
        ("product", result.products.len()),
        ("ntp", result.ntps.len()),
        ("tm", result.tms.len()),
        ("mapping", result.mapping.len()),
        ("top250_nas", result.unmatched_ranked.len()),
    ];
    let tables = row_counts
        .iter()
        .enumerate()
        .map(|(idx, (name, rows))| TableSummary {
            name: (*name).to_string(),
            rows: *rows,
            path: written.get(idx).cloned(),
        })
        .collect();

    let errors = result.errors;
    let has_errors = !errors.is_empty();
    info!(
        product_count = result.products.len(),
        ntp_count = result.ntps.len(),
        tm_count = result.tms.len(),
        mapping_count = result.mapping.len(),
        duration_ms = generate_start.elapsed().as_millis(),
        "generate complete"
    );

    Ok(GenerateResult {
        snapshot_dir: args.snapshot_dir.clone(),
        output_dir,
        tables,
        exclusions: result.exclusions,
        priority_filtered: result.priority_filtered,
        unmatched_ranked: result.unmatched_ranked.len(),
        errors,
        has_errors,
    })
}
