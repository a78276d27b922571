//! Install progress: a cliclack spinner on a terminal, plain lines otherwise

use super::context::UiContext;
use console::style;

/// Progress line for one install signal
pub struct InstallProgress {
    spinner: Option<cliclack::ProgressBar>,
}

impl InstallProgress {
    /// Announce the install and start spinning if the terminal allows it
    pub fn start(ctx: &UiContext, resources: usize, origin: &str) -> Self {
        let message = format!("Pre-caching {} resources from {}", resources, origin);
        if ctx.use_fancy_output() {
            let spinner = cliclack::spinner();
            spinner.start(&message);
            Self {
                spinner: Some(spinner),
            }
        } else {
            println!("{} {}", style("...").dim(), message);
            Self { spinner: None }
        }
    }

    /// Report the populated store
    pub fn installed(self, entries: usize, store: &str) {
        let message = format!("Installed {} entries into {}", entries, store);
        match self.spinner {
            Some(spinner) => spinner.stop(message),
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    /// Report a failed install; the error itself is printed by the caller
    pub fn failed(self) {
        match self.spinner {
            Some(spinner) => spinner.error("Install failed"),
            None => eprintln!("{} Install failed", style("[FAIL]").red()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_without_terminal() {
        let ctx = UiContext::non_interactive();
        InstallProgress::start(&ctx, 3, "http://localhost:8080").installed(3, "sw-demo");
        InstallProgress::start(&ctx, 3, "http://localhost:8080").failed();
    }
}
