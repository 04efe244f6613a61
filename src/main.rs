//! Merge audit CLI entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use merge_audit::config::{Cli, Command, FetchArgs, ReportArgs};
use merge_audit::{
    AuditError, GitHubClient, ReqwestTransport, SnapshotFetcher, Throttle, generate_report,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Fetch(args) => run_fetch(args),
        Command::Report(args) => run_report(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_empty_result() => {
            tracing::warn!("{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_fetch(args: FetchArgs) -> Result<(), AuditError> {
    let config = args.into_config()?;
    let transport = ReqwestTransport::new(config.token)?;
    let throttle = Throttle::default();
    tracing::info!(
        api_base = %config.locator.api_base(),
        delay_ms = throttle.delay().as_millis(),
        page_size = config.page_size.get(),
        "starting fetch"
    );
    let client = GitHubClient::new(transport, throttle);
    let fetcher = SnapshotFetcher::new(&client, config.page_size);

    fetcher.fetch_into(&config.locator, &config.snapshot_dir)?;
    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), AuditError> {
    let config = args.into_config()?;
    let summary = generate_report(&config)?;

    tracing::info!(
        rows = summary.written,
        skipped = summary.skipped,
        csv = %summary.outputs.csv,
        "report complete"
    );
    Ok(())
}
