//! Step lines for command output

use super::context::UiContext;
use console::style;

/// Outcome shown at the start of a step line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ok,
    Warn,
    Fail,
}

impl Step {
    fn tag(self) -> console::StyledObject<&'static str> {
        match self {
            Step::Ok => style("[OK]").green(),
            Step::Warn => style("[WARN]").yellow(),
            Step::Fail => style("[FAIL]").red(),
        }
    }
}

/// Print a step with an optional dimmed detail
///
/// Failures go to stderr so stdout stays usable in pipes.
pub fn step(ctx: &UiContext, kind: Step, message: &str, detail: Option<&str>) {
    let line = match detail {
        Some(detail) if ctx.use_fancy_output() => format!("{} ({})", message, style(detail).dim()),
        Some(detail) => format!("{} ({})", message, detail),
        None => message.to_string(),
    };

    if ctx.use_fancy_output() {
        let _ = match kind {
            Step::Ok => cliclack::log::success(line),
            Step::Warn => cliclack::log::warning(line),
            Step::Fail => cliclack::log::error(line),
        };
    } else if kind == Step::Fail {
        eprintln!("  {} {}", kind.tag(), line);
    } else {
        println!("  {} {}", kind.tag(), line);
    }
}

/// Print a dimmed note under a step
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        let _ = cliclack::log::remark(message);
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Print a `key: value` line
pub fn key_value(key: &str, value: &str) {
    println!("{}: {}", style(key).dim(), value);
}
