//! Install command - deliver the install signal

use crate::cli::args::InstallArgs;
use crate::config::Config;
use crate::error::PrecacheResult;
use crate::host::create_host;
use crate::ui::{InstallProgress, UiContext};
use crate::worker::RESOURCES;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> PrecacheResult<()> {
    let config = args.target.apply(config);
    let host = create_host(&config)?;

    let progress = InstallProgress::start(
        &UiContext::detect(),
        RESOURCES.len(),
        &config.network.origin,
    );

    match host.install().await {
        Ok(report) => {
            progress.installed(report.entries, &report.store);
            Ok(())
        }
        Err(e) => {
            progress.failed();
            Err(e)
        }
    }
}
