//! Clean command implementation
//!
//! Runs the manual size filter over the catalog, or with `--dry-run` only
//! lists what it would remove.

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde_json::json;

use super::{load_config, report_outcome, run_task};
use crate::cleaner::{CancellationToken, ItemStatus, SizeThresholdCleaner};
use crate::cli::{Context, Output};
use crate::config::FilterConfig;
use crate::library::{JsonLibrary, Library};
use crate::tasks::CleanupTask;

#[derive(Args)]
pub struct CleanArgs {
    /// Minimum file size in megabytes (overrides min_file_size_mb)
    #[arg(long, value_name = "MB")]
    pub min_size: Option<u32>,

    /// Delete files from disk as well as from the catalog
    #[arg(long)]
    pub delete_files: bool,

    /// Only list the items that would be removed
    #[arg(long)]
    pub dry_run: bool,

    /// Run even when the filter is disabled in config
    #[arg(long)]
    pub force: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub async fn execute(args: CleanArgs, ctx: &Context) -> Result<()> {
    let overrides = json!({
        "enabled": if args.force { Some(true) } else { None },
        "min_file_size_mb": args.min_size,
        "library": {
            "delete_files": if args.delete_files { Some(true) } else { None },
        }
    });
    let config = load_config(ctx, overrides)?;
    let library = JsonLibrary::open(&config.library.index_path)?;

    if args.dry_run {
        return dry_run(&config, &library, args.format, &ctx.output);
    }

    let output = &ctx.output;
    let task = CleanupTask::Manual;

    if args.format == OutputFormat::Text {
        output.header(&format!(
            "Removing media smaller than {}",
            config.threshold()
        ));
    }

    let Some(outcome) = run_task(task, config, library, output).await? else {
        if args.format == OutputFormat::Json {
            println!("{}", json!({ "enabled": false }));
        } else {
            output.info("File size filter is disabled; use --force to run it anyway");
        }
        return Ok(());
    };

    match args.format {
        OutputFormat::Text => report_outcome(task, &outcome, output),
        OutputFormat::Json => {
            let report = json!({
                "enabled": true,
                "examined": outcome.examined,
                "skipped_missing": outcome.skipped_missing,
                "marked_for_removal": outcome.marked_for_removal,
                "removed": outcome.removed,
                "failed_to_remove": outcome.failed_to_remove,
                "bytes_removed": outcome.bytes_removed(),
                "cancelled": outcome.cancelled,
                "removed_items": outcome.removal_set().map(|item| json!({
                    "id": item.id,
                    "path": item.path,
                })).collect::<Vec<_>>(),
                "failures": outcome.failures().map(|(item, error)| json!({
                    "id": item.id,
                    "error": error,
                })).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn dry_run(
    config: &FilterConfig,
    library: &JsonLibrary,
    format: OutputFormat,
    output: &Output,
) -> Result<()> {
    let cleaner = SizeThresholdCleaner::new(config.threshold());
    let threshold = cleaner.threshold();
    let items = library.items()?;
    let scan = cleaner.scan(&items, None, &CancellationToken::new());

    if format == OutputFormat::Json {
        let report = json!({
            "dry_run": true,
            "threshold_bytes": threshold.bytes(),
            "examined": scan.examined,
            "skipped_missing": scan.skipped_missing,
            "matches": scan.below_threshold().map(|record| json!({
                "id": record.item.id,
                "path": record.item.path,
                "size": record.status.size(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output.header(&format!("Dry run: media smaller than {}", threshold));

    for record in scan.below_threshold() {
        if let ItemStatus::BelowThreshold { size } = record.status {
            output.list_item(&format!(
                "{} ({})",
                record.item.display_name(),
                humansize::format_size(size, humansize::BINARY)
            ));
        }
    }

    output.blank_line();
    output.key_value("Examined:", &scan.examined.to_string(), false);
    output.key_value("Missing:", &scan.skipped_missing.to_string(), false);
    output.key_value(
        "Would remove:",
        &format!(
            "{} ({})",
            scan.marked_count(),
            humansize::format_size(scan.marked_bytes(), humansize::BINARY)
        ),
        scan.marked_count() > 0,
    );

    if !config.enabled {
        output.warning("File size filter is disabled; a real run needs --force");
    }

    Ok(())
}
