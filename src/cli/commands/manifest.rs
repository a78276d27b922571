//! Manifest command - show what install pre-caches

use crate::error::PrecacheResult;
use crate::ui;
use crate::worker::{Manifest, STORE_NAME};

/// Execute the manifest command
pub fn execute() -> PrecacheResult<()> {
    let manifest = Manifest::builtin();

    ui::key_value("store", STORE_NAME);
    ui::key_value("resources", &manifest.len().to_string());
    for resource in manifest.resources() {
        println!("{}", resource);
    }

    Ok(())
}
