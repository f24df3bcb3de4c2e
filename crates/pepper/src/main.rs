mod cli;
mod config;
mod error;
mod observability;
mod output;

use std::future::Future;

use clap::Parser;
use tracing::{debug, warn};
use url::Url;

use pepper_api::{Credentials, SessionClient, TransportConfig};

use crate::cli::Cli;
use crate::config::TerminalPrompt;
use crate::error::{CliError, exit_code};
use crate::observability::Observability;

#[tokio::main]
async fn main() {
    // Parse CLI arguments; usage errors exit 2, --help/--version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_code::USAGE
            } else {
                exit_code::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let observability = Observability::new(cli.verbose, cli.debug_http).init();

    // Ctrl-C at any stage is a clean exit with no output
    match interruptible(run(cli, observability), interrupt_signal()).await {
        None => {
            debug!("interrupted");
            std::process::exit(exit_code::SUCCESS);
        }
        Some(Err(err)) if err.is_interrupted() => {
            debug!("interrupted at prompt");
            std::process::exit(exit_code::SUCCESS);
        }
        Some(Ok(())) => {}
        Some(Err(err)) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    }
}

/// Drive `work` to completion unless `interrupt` fires first.
async fn interruptible<F, I>(work: F, interrupt: I) -> Option<F::Output>
where
    F: Future,
    I: Future<Output = ()>,
{
    tokio::select! {
        out = work => Some(out),
        () = interrupt => None,
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves.
async fn interrupt_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("could not listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}

/// Resolve credentials, authenticate, run the command, print the result.
async fn run(cli: Cli, observability: Observability) -> Result<(), CliError> {
    debug!(level = %observability.level(), debug_http = observability.debug_http(), "starting");
    if cli.timeout {
        debug!("--timeout accepted but not applied");
    }
    if let Some(ref format) = cli.output {
        debug!(format = %format, "output format hint recorded");
    }

    let invocation = config::invocation(&cli);
    let options = config::resolve_options(&cli);

    // Prompts block on the terminal, keep them off the async workers.
    // The password prompt reads Ctrl-C as a key and restores the tty itself.
    let details = tokio::task::spawn_blocking(move || {
        pepper_config::resolve(&options, &TerminalPrompt)
    })
    .await
    .map_err(|e| CliError::Io(std::io::Error::other(e)))??;

    let url: Url = details.url.parse().map_err(|source| CliError::InvalidUrl {
        url: details.url.clone(),
        source,
    })?;

    let transport = TransportConfig::default().with_debug_http(observability.debug_http());
    let client = SessionClient::new(url, &transport).map_err(|source| CliError::Transport {
        url: details.url.clone(),
        source,
    })?;

    let credentials = Credentials {
        username: details.user,
        password: details.pass,
        eauth: details.eauth,
    };
    client
        .login(&credentials)
        .await
        .map_err(|source| CliError::AuthFailed {
            url: details.url.clone(),
            source,
        })?;

    let result = match client.local(&invocation).await {
        Ok(result) => result,
        Err(err) => {
            // Show whatever the server returned before failing
            if let Some(payload) = err.payload() {
                output::print_output(&output::render_json(payload)?)?;
            }
            return Err(CliError::from_execution(&details.url, err));
        }
    };

    output::print_output(&output::render_json(&result)?)?;
    Ok(())
}
