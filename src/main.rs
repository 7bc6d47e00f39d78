mod context;
mod outcome;
mod scenarios;

use clap::Parser;
use omrs_client::config::limited_credentials_from_env;
use omrs_client::{ClientConfig, OpenMrsClient};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use context::Context;

/// Runs the patient and visit scenarios against an OpenMRS REST API
///
/// # Environment Variables
/// - `OPENMRS_BASE_URL`: REST root (default: "http://localhost/openmrs/ws/rest/v1")
/// - `OPENMRS_USERNAME` / `OPENMRS_PASSWORD`: admin credentials (default: "admin" / "Admin123")
/// - `OPENMRS_TIMEOUT_SECS`: per-request timeout (default: 30)
/// - `OPENMRS_LIMITED_USERNAME` / `OPENMRS_LIMITED_PASSWORD`: a user without Add Patients and
///   Add Visits; the permission scenarios are skipped when unset
#[derive(Parser)]
#[command(name = "omrs-run")]
#[command(about = "OpenMRS patient and visit scenario suite")]
struct Cli {
    /// Only run scenarios whose name contains this text
    #[arg(long)]
    filter: Option<String>,
    /// Stop at the first failing scenario
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("omrs_run=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    tracing::info!("++ Running scenarios against {}", config.base_url());
    let limited = limited_credentials_from_env();
    if limited.is_none() {
        tracing::warn!("no limited user configured, permission scenarios will be skipped");
    }
    let ctx = Context::new(OpenMrsClient::new(config)?, limited);

    let selected = scenarios::select(cli.filter.as_deref());
    if selected.is_empty() {
        anyhow::bail!("no scenario matches the filter");
    }
    let summary = scenarios::run_all(&ctx, &selected, cli.fail_fast).await;
    println!("\n{summary}");

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["omrs-run", "--filter", "visit", "--fail-fast"]).unwrap();
        assert_eq!(cli.filter.as_deref(), Some("visit"));
        assert!(cli.fail_fast);

        let cli = Cli::try_parse_from(["omrs-run"]).unwrap();
        assert!(cli.filter.is_none());
        assert!(!cli.fail_fast);
    }
}
