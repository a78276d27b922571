//! Terminal output for precache commands
//!
//! Uses `cliclack` for interactive output with automatic fallback to plain
//! `[OK]`/`[FAIL]` lines in CI and other non-interactive environments.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{key_value, remark, step, Step};
pub use progress::InstallProgress;
