//! Fetch command - deliver a fetch signal

use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::{PrecacheError, PrecacheResult};
use crate::host::create_host;
use crate::http::{Request, Response};
use std::io::Write;
use tracing::warn;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> PrecacheResult<()> {
    let config = args.target.apply(config);
    let host = create_host(&config)?;

    let mut request = Request::new(args.method, args.identifier);
    request.headers = args.headers;

    let response = host.fetch(request).await?;
    if !response.is_ok() {
        warn!("{} answered with HTTP {}", response.url, response.status);
    }

    if args.include {
        print_head(&response);
    }

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&response.body)
        .and_then(|_| stdout.flush())
        .map_err(|e| PrecacheError::io("writing response body", e))?;

    Ok(())
}

fn print_head(response: &Response) {
    eprintln!("HTTP {}", response.status);
    for (name, value) in &response.headers {
        eprintln!("{}: {}", name, value);
    }
    eprintln!();
}
