use anyhow::Result;
use clap::Args;
use std::fs;

use super::load_config;
use crate::cli::Context;
use crate::library::JsonLibrary;

#[derive(Args)]
pub struct ListArgs {
    /// Only show entries below the configured minimum size
    #[arg(long)]
    pub small: bool,
}

/// Print catalog entries with their current size on disk
pub async fn execute(args: ListArgs, ctx: &Context) -> Result<()> {
    let output = &ctx.output;
    let config = load_config(ctx, serde_json::json!({}))?;
    let threshold = config.threshold();
    let library = JsonLibrary::open(&config.library.index_path)?;

    output.header(&format!("Catalog {}", library.path().display()));

    if library.is_empty() {
        output.info("Catalog is empty; run 'filesize-filter scan' first");
        return Ok(());
    }

    let mut shown = 0;
    for item in library.entries() {
        let size = item
            .resolved_path()
            .and_then(|path| fs::metadata(path).ok())
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len());

        if args.small && !size.is_some_and(|len| threshold.is_below(len)) {
            continue;
        }

        let size_text = match size {
            Some(len) => humansize::format_size(len, humansize::BINARY),
            None => "missing".to_string(),
        };
        output.list_item(&format!("{} [{}] {}", item.display_name(), item.kind, size_text));
        shown += 1;
    }

    output.blank_line();
    output.key_value("Entries:", &format!("{} of {}", shown, library.len()), false);

    Ok(())
}
