//! List command - show entries in the cache store

use crate::cache::{format_bytes, CacheStorage, DiskStorage, EntryInfo};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::PrecacheResult;
use crate::ui::{self, Step, UiContext};
use crate::worker::STORE_NAME;
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> PrecacheResult<()> {
    let root = args
        .store_dir
        .unwrap_or_else(|| ConfigManager::storage_root(config));
    let storage = DiskStorage::new(root);

    let entries = if storage.has(STORE_NAME).await? {
        storage.open(STORE_NAME).await?.entries().await?
    } else {
        Vec::new()
    };

    if entries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step(&ctx, Step::Warn, "No cached entries", Some("run: precache install"));
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &[EntryInfo]) {
    println!(
        "{:<40} {:<8} {:<10} {:<20}",
        style("URL").bold(),
        style("STATUS").bold(),
        style("SIZE").bold(),
        style("CACHED").bold()
    );
    println!("{}", "-".repeat(80));

    for entry in entries {
        let cached = entry.cached_at.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<40} {:<8} {:<10} {:<20}",
            entry.url,
            entry.status,
            format_bytes(entry.size),
            cached
        );
    }

    println!();
    println!("Total: {} entries in {}", entries.len(), STORE_NAME);
}

fn print_plain(entries: &[EntryInfo]) {
    for entry in entries {
        println!("{}", entry.url);
    }
}
