//! `cekbpom` - search the product registry and print a JSON result envelope.

mod dump;

use anyhow::{Context, Result};
use cekbpom_core::{AppConfig, SearchField};
use cekbpom_scanner::{
    ReqwestFetcher, ResultEnvelope, RunTiming, ScanError, SearchOrchestrator, TimedEnvelope,
};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "cekbpom",
    about = "Search the product registry across query variants and search fields",
    version
)]
struct Cli {
    /// Query strings; each one is searched in every selected field
    #[arg(required = true)]
    queries: Vec<String>,

    /// Search field (e.g. product_name, brand). Can be repeated.
    #[arg(long = "field", short = 'f')]
    fields: Vec<String>,

    /// Fetch each result's detail page for manufacturer fields
    #[arg(long)]
    enrich: bool,

    /// Directory for a timestamped JSON dump of the run
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Configuration file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Pretty-print the envelope
    #[arg(long)]
    pretty: bool,
}

/// Initialize tracing subscriber for logging; stdout is reserved for the envelope.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "info,cekbpom=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    Ok(config.with_env_overrides())
}

fn resolve_fields(names: &[String], config: &AppConfig) -> Result<Vec<SearchField>, ScanError> {
    if names.is_empty() {
        return Ok(config.search.default_fields.clone());
    }
    names
        .iter()
        .map(|name| {
            name.parse::<SearchField>()
                .map_err(|e| ScanError::Input(e.to_string()))
        })
        .collect()
}

async fn run(cli: &Cli, config: &AppConfig) -> Result<TimedEnvelope> {
    let started_at = Utc::now();
    let fail = |err: ScanError| TimedEnvelope {
        envelope: ResultEnvelope::failure(&err),
        timing: RunTiming::since(started_at),
    };

    let fields = match resolve_fields(&cli.fields, config) {
        Ok(fields) => fields,
        Err(e) => return Ok(fail(e)),
    };

    let fetcher = Arc::new(ReqwestFetcher::new(&config.http).context("failed to build HTTP client")?);
    let orchestrator = match SearchOrchestrator::from_config(fetcher, config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => return Ok(fail(ScanError::Config(e))),
    };

    let enrich = cli.enrich || config.search.enrich;
    Ok(orchestrator.run_timed(&fields, &cli.queries, enrich).await)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::debug!("Starting cekbpom v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_ref())?;
    let timed = run(&cli, &config).await?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&timed.envelope)?
    } else {
        serde_json::to_string(&timed.envelope)?
    };
    println!("{json}");

    if let Some(dir) = cli.dump.as_ref().or(config.output.dump_dir.as_ref()) {
        dump::write_dump(dir, &timed)?;
    }

    tracing::info!(
        "Finished with status {} in {} ms",
        timed.envelope.status,
        timed.timing.duration_ms
    );

    Ok(if timed.envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "cekbpom", "-f", "product_name", "--field", "brand", "--enrich", "--pretty", "hichew",
            "hi-chew",
        ])
        .expect("valid arguments");

        assert_eq!(cli.queries, vec!["hichew", "hi-chew"]);
        assert_eq!(cli.fields, vec!["product_name", "brand"]);
        assert!(cli.enrich);
        assert!(cli.pretty);
        assert!(cli.dump.is_none());
    }

    #[test]
    fn test_queries_required() {
        assert!(Cli::try_parse_from(["cekbpom", "-f", "brand"]).is_err());
    }

    #[test]
    fn test_resolve_fields_defaults_to_config() {
        let config = AppConfig::default();
        let fields = resolve_fields(&[], &config).expect("default fields");
        assert_eq!(fields, vec![SearchField::ProductName]);
    }

    #[test]
    fn test_resolve_fields_rejects_unknown() {
        let config = AppConfig::default();
        let err = resolve_fields(&["brand".to_string(), "flavour".to_string()], &config)
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
