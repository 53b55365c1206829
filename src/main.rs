/*============================================================
  Synavera Project: Depsize
  Module: depsize::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for depsize. Reports the archive size of a Go
    module, and optionally of its direct dependencies, as
    served by a module proxy.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTP GET/HEAD
    requests against the selected proxy only.

  Dependencies:
    clap for CLI parsing, chrono for session stamps.

  Operational Scope:
    Invoked by operators or CI to estimate dependency weight
    before adopting a module.

  Revision History:
    2025-11-12 COD  Authored depsize runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI, environment and file
============================================================*/

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use depsize_core::config::DepsizeConfig;
use depsize_core::logger::Logger;
use depsize_core::modfile::{Manifest, ReplacementTarget};
use depsize_core::report::SizeReport;
use depsize_core::{proxy, DependencyResolver, ModuleRef, ProxyClient, Result};

/// Environment variable holding GOPROXY-style endpoint lists.
const PROXY_ENV: &str = "GOPROXY";

/// Command-line arguments for depsize.
#[derive(Debug, Parser)]
#[command(
    name = "depsize",
    version,
    author = "Synavera Systems",
    about = "Measure Go module archive sizes via the module proxy"
)]
struct Cli {
    /// Module path, e.g. golang.org/x/mod.
    module: String,
    /// Module version; resolved through @latest when omitted.
    version: Option<String>,
    /// Print sizes with SI units instead of raw bytes.
    #[arg(short = 'H', long, action = ArgAction::SetTrue)]
    human: bool,
    /// Also size the module's direct dependencies and print a total.
    #[arg(short = 'R', long, action = ArgAction::SetTrue)]
    recursive: bool,
    /// Emit the report as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Proxy URL (overrides GOPROXY and the config file).
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[depsize] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = DepsizeConfig::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli.log.clone().or_else(|| config.log_path(&session_stamp));
    let logger = Logger::new(log_path, cli.verbose)?;

    let environment = std::env::var(PROXY_ENV).ok();
    let endpoint = proxy::resolve_endpoint(
        cli.proxy.as_deref(),
        environment.as_deref(),
        config.proxy.url.as_deref(),
    );
    let outcome = measure(&cli, &config, &endpoint, &logger).await;
    if let Err(err) = &outcome {
        logger.error("FAILED", err.to_string());
    }
    let report = settle(outcome, logger.finalize())?;

    if cli.json {
        println!("{}", report.render_json()?);
    } else {
        print!("{}", report.render_text(cli.human));
    }

    Ok(ExitCode::SUCCESS)
}

async fn measure(
    cli: &Cli,
    config: &DepsizeConfig,
    endpoint: &str,
    logger: &Logger,
) -> Result<SizeReport> {
    let client = ProxyClient::new(endpoint, &config.proxy)?;
    logger.debug("PROXY", format!("Using module proxy {}", client.base_url()));
    let mut module = ModuleRef::new(&cli.module, cli.version.as_deref())?;

    if module.is_latest() {
        let version = client.latest(module.path()).await?;
        logger.info(
            "LATEST",
            format!("{} resolved to {version}", module.path()),
        );
        module = module.with_version(version);
    }

    let size = client.size(module.path(), module.version()).await?;
    logger.info(
        "SIZE",
        format!("{} {} = {size} bytes", module.path(), module.version()),
    );
    let report = SizeReport::single(module.path().to_string(), module.version().to_string(), size);

    if !cli.recursive {
        return Ok(report);
    }

    let resolver = DependencyResolver::new(client, config.proxy.max_parallel_requests);
    let manifest = resolver.manifest(module.path(), module.version()).await?;
    log_manifest(&manifest, logger);
    let deps = resolver.resolve(&manifest).await?;
    logger.info(
        "DEPS",
        format!("{} direct dependencies sized", deps.len()),
    );
    Ok(report.with_dependencies(deps))
}

fn log_manifest(manifest: &Manifest, logger: &Logger) {
    let indirect = manifest
        .requirements
        .iter()
        .filter(|requirement| requirement.indirect)
        .count();
    logger.debug(
        "GOMOD",
        format!(
            "module={} go={} requires={} (indirect={}) replaces={} excludes={}",
            manifest.module.as_deref().unwrap_or("-"),
            manifest.go_version.as_deref().unwrap_or("-"),
            manifest.requirements.len(),
            indirect,
            manifest.replacements.len(),
            manifest.excludes.len()
        ),
    );
    for replacement in &manifest.replacements {
        if let ReplacementTarget::Local(dir) = &replacement.new {
            logger.warn(
                "LOCAL",
                format!(
                    "{} replaced by local directory {dir}; excluded from sizing",
                    replacement.old
                ),
            );
        }
    }
}

/// The measurement error wins over a failure to seal the log.
fn settle<T>(outcome: Result<T>, finalized: Result<()>) -> Result<T> {
    let value = outcome?;
    finalized?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use depsize_core::DepsizeError;

    use super::*;

    fn hash_failure() -> Result<()> {
        Err(DepsizeError::Filesystem("Failed to write hash file".into()))
    }

    #[test]
    fn resolver_error_is_not_masked_by_log_failure() {
        let outcome: Result<u64> = Err(DepsizeError::ProxyRequest {
            method: "HEAD",
            url: "https://proxy.test/example.com/a/@v/v1.0.0.zip".into(),
            status: 404,
            status_text: "Not Found".into(),
        });
        let err = settle(outcome, hash_failure()).unwrap_err();
        assert!(matches!(err, DepsizeError::ProxyRequest { status: 404, .. }));
    }

    #[test]
    fn log_failure_surfaces_after_success() {
        let err = settle(Ok(7_u64), hash_failure()).unwrap_err();
        assert!(matches!(err, DepsizeError::Filesystem(_)));
        assert_eq!(settle(Ok(7_u64), Ok(())).unwrap(), 7);
    }
}
