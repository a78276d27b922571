//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{PrecacheError, PrecacheResult};
use crate::network::validate_origin;
use crate::ui::{self, Step, UiContext};
use std::path::PathBuf;

/// Keys accepted by `config set`
const VALID_KEYS: [&str; 6] = [
    "general.log_format",
    "network.origin",
    "network.timeout_secs",
    "storage.root",
    "host.install_attempts",
    "host.retry_delay_ms",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    manager: &ConfigManager,
    config: &Config,
) -> PrecacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let ctx = UiContext::detect();
            let mut config = config.clone();
            if let Err(e) = set_value(&mut config, &key, &value) {
                ui::step(&ctx, Step::Fail, "Cannot set config value", Some(&e.to_string()));
                ui::remark(&ctx, &format!("Valid keys: {}", VALID_KEYS.join(", ")));
                return Err(e);
            }
            manager.save(&config).await?;
            ui::step(&ctx, Step::Ok, &format!("Set {} = {}", key, value), None);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> PrecacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> PrecacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step(
            &ctx,
            Step::Warn,
            &format!("Config already exists at {}", path.display()),
            Some("use --force to overwrite"),
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step(
        &ctx,
        Step::Ok,
        "Configuration initialized",
        Some(&path.display().to_string()),
    );

    Ok(())
}

/// Apply a dot-separated key to the config
fn set_value(config: &mut Config, key: &str, value: &str) -> PrecacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(PrecacheError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },

        ["network", "origin"] => config.network.origin = validate_origin(value)?,
        ["network", "timeout_secs"] => config.network.timeout_secs = parse_u64(value)?,

        ["storage", "root"] => config.storage.root = Some(PathBuf::from(value)),

        ["host", "install_attempts"] => config.host.install_attempts = parse_u32(value)?,
        ["host", "retry_delay_ms"] => config.host.retry_delay_ms = parse_u64(value)?,

        _ => return Err(PrecacheError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_u32(value: &str) -> PrecacheResult<u32> {
    value
        .parse()
        .map_err(|_| PrecacheError::User(format!("Invalid number: {}", value)))
}

fn parse_u64(value: &str) -> PrecacheResult<u64> {
    value
        .parse()
        .map_err(|_| PrecacheError::User(format!("Invalid number: {}", value)))
}
