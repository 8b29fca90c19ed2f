//! Command implementations for filesize-filter CLI
//!
//! Each command lives in its own module. The helpers here are shared: config
//! loading with CLI overrides, and running a cleanup task off the async
//! runtime with a progress bar and Ctrl-C cancellation.

use anyhow::{Context as _, Result};
use serde_json::Value;

use crate::cleaner::{CancellationToken, RunOutcome};
use crate::cli::{Context, Output};
use crate::config::FilterConfig;
use crate::library::JsonLibrary;
use crate::tasks::CleanupTask;

pub mod clean;
pub mod config;
pub mod list;
pub mod scan;
pub mod version;

/// Load and validate the configuration, applying command overrides on top
///
/// `overrides` uses the config file's shape; `null` fields are left unset.
/// The global `--index` flag is merged in as `library.index_path`.
pub(crate) fn load_config(ctx: &Context, mut overrides: Value) -> Result<FilterConfig> {
    if let Some(index) = &ctx.index {
        let library = overrides
            .as_object_mut()
            .context("Config overrides must be a table")?
            .entry("library")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Some(library) = library.as_object_mut() {
            library.insert("index_path".to_string(), Value::from(index.display().to_string()));
        }
    }

    let config = FilterConfig::load(ctx.config_path.as_deref(), Some(overrides))?;
    config.validate()?;
    Ok(config)
}

/// Run `task` on the blocking pool, cancelling it on Ctrl-C
pub(crate) async fn run_task(
    task: CleanupTask,
    config: FilterConfig,
    mut library: JsonLibrary,
    output: &Output,
) -> Result<Option<RunOutcome>> {
    let cancel = CancellationToken::new();
    let bar = output.percent_bar(task.name());

    let mut handle = {
        let cancel = cancel.clone();
        let bar = bar.clone();
        tokio::task::spawn_blocking(move || {
            let mut sink = |percent: f64| bar.set_position(percent.round() as u64);
            task.execute(&config, &mut library, Some(&mut sink), &cancel)
        })
    };

    let joined = tokio::select! {
        res = &mut handle => res,
        _ = tokio::signal::ctrl_c() => {
            bar.suspend(|| output.warning("Cancelling after the current item..."));
            cancel.cancel();
            handle.await
        }
    };
    bar.finish_and_clear();

    let outcome = joined.context("Cleanup task panicked")??;
    Ok(outcome)
}

/// Print the counters of a finished run
pub(crate) fn report_outcome(task: CleanupTask, outcome: &RunOutcome, output: &Output) {
    if outcome.cancelled {
        output.warning(&format!("{} was cancelled", task.name()));
    }

    for (item, error) in outcome.failures() {
        output.warning(&format!("Failed to remove {}: {}", item.display_name(), error));
    }

    output.key_value("Examined:", &outcome.examined.to_string(), false);
    output.key_value("Missing:", &outcome.skipped_missing.to_string(), false);
    output.key_value(
        "Below threshold:",
        &outcome.marked_for_removal.to_string(),
        false,
    );
    output.key_value(
        "Removed:",
        &format!(
            "{} ({})",
            outcome.removed,
            humansize::format_size(outcome.bytes_removed(), humansize::BINARY)
        ),
        outcome.removed > 0,
    );
    if outcome.failed_to_remove > 0 {
        output.key_value("Failed:", &outcome.failed_to_remove.to_string(), false);
    }

    if !outcome.cancelled && outcome.failed_to_remove == 0 {
        output.success(&format!("{} complete", task.name()));
    }
}
