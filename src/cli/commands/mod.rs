//! CLI command implementations

pub mod config;
pub mod fetch;
pub mod install;
pub mod list;
pub mod manifest;

pub use config::execute as config;
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use list::execute as list;
pub use manifest::execute as manifest;

use crate::cli::args::TargetArgs;
use crate::config::Config;

impl TargetArgs {
    /// Layer command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(ref origin) = self.origin {
            config.network.origin = origin.clone();
        }
        if let Some(ref dir) = self.store_dir {
            config.storage.root = Some(dir.clone());
        }
        config
    }
}
