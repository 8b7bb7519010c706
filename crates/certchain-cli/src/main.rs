//! CertChain command-line entry point

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use certchain_cli::{run_scenario, Scenario, ScenarioReport};
use certchain_core::logging::{init_tracing, init_tracing_from_config};
use certchain_core::{CertRegistry, RegistryConfig, TokenId};

//-----------------------------------------------------------------------------
// Command Definition
//-----------------------------------------------------------------------------

/// CertChain certificate registry tools
#[derive(Debug, Parser)]
#[command(name = "certchain", about = "Run and inspect certificate registry scenarios")]
struct Cli {
    /// Log at the configured level instead of warnings only
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a scenario and report every step
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Registry configuration; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Exit non-zero if any step misbehaves or the registry is inconsistent
        #[arg(long)]
        fail_on_error: bool,
    },

    /// Execute a scenario and show one record's certificate
    Inspect {
        /// Scenario file
        scenario: PathBuf,

        /// Record to show
        #[arg(short, long)]
        token: TokenId,

        /// Registry configuration; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load and validate a registry configuration
    CheckConfig {
        /// Configuration file
        path: PathBuf,
    },
}

//-----------------------------------------------------------------------------
// Main Function
//-----------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();

    if let Err(err) = dispatch(cli) {
        eprintln!("Error: {}", err);
        for cause in err.chain().skip(1) {
            eprintln!("Caused by: {}", cause);
        }
        process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            scenario,
            config,
            json,
            fail_on_error,
        } => {
            let config = load_config(config.as_deref(), cli.verbose)?;
            let scenario = Scenario::from_toml_file(&scenario)?;
            let (_, report) = run_scenario(&scenario, config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if fail_on_error && !report.is_clean() {
                return Err(anyhow!(
                    "{} step(s) misbehaved in scenario `{}`",
                    report.unexpected().count(),
                    report.name
                ));
            }
            Ok(())
        }
        Command::Inspect {
            scenario,
            token,
            config,
        } => {
            let config = load_config(config.as_deref(), cli.verbose)?;
            let scenario = Scenario::from_toml_file(&scenario)?;
            let (registry, _) = run_scenario(&scenario, config)?;
            print_record(&registry, token)
        }
        Command::CheckConfig { path } => {
            let config = RegistryConfig::from_toml_file(&path)
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            println!(
                "{} ({}) owned by {}: ok",
                config.name, config.symbol, config.registry_owner
            );
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<RegistryConfig> {
    let config = match path {
        Some(path) => RegistryConfig::from_toml_file(path)
            .with_context(|| format!("invalid configuration {}", path.display()))?,
        None => RegistryConfig::default(),
    };

    let initialized = if verbose {
        init_tracing_from_config(&config)
    } else {
        init_tracing(Some("warn"), Some(config.json_logs))
    };
    initialized.map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
    Ok(config)
}

//-----------------------------------------------------------------------------
// Output
//-----------------------------------------------------------------------------

fn print_report(report: &ScenarioReport) {
    if !report.name.is_empty() {
        println!("Scenario: {}", report.name);
    }

    for step in &report.steps {
        let by = step
            .caller
            .as_deref()
            .map(|caller| format!(" by {}", caller))
            .unwrap_or_default();
        let status = match (&step.error, &step.detail) {
            (Some(error), _) => format!("failed [{}] {}", error.error_code, error.message),
            (None, Some(detail)) => format!("ok ({})", detail),
            (None, None) => "ok".to_string(),
        };
        let marker = if step.as_expected() { "" } else { "  <- unexpected" };
        println!("[{}] {}{}: {}{}", step.index, step.action, by, status, marker);

        for event in &step.events {
            println!("      {}", serde_json::to_string(event).unwrap_or_else(|_| event.name().to_string()));
        }
    }

    println!("Total supply: {}", report.total_supply);
    match &report.invariant_violation {
        Some(violation) => println!("Invariants: {}", violation),
        None => println!("Invariants: ok"),
    }
}

fn print_record(registry: &CertRegistry, id: TokenId) -> Result<()> {
    let entry = registry
        .certificate_entry(id)
        .ok_or_else(|| anyhow!("token {} has no certificate", id))?;
    let certificate = &entry.certificate;

    println!("Token {}", id);
    match registry.owner_of(id) {
        Ok(owner) => println!("  owner:       {}", owner),
        Err(_) => println!("  owner:       (burned)"),
    }
    println!("  stage:       {}", entry.stage);
    println!("  company:     {}", certificate.company);
    println!("  auditor:     {}", certificate.auditor);
    println!("  standard:    {}", certificate.standard);
    println!("  agency:      {}", certificate.agency);
    println!("  cost:        {}", certificate.cost);
    println!("  applied at:  {}", certificate.application_timestamp);
    println!("  qms hash:    {}", certificate.qms_hash);
    for (label, slot) in [("audit 1", entry.audits.first), ("audit 2", entry.audits.second)] {
        if slot.timestamp == 0 && slot.report_hash.is_empty() {
            println!("  {}:     -", label);
        } else {
            println!("  {}:     {} at {}", label, slot.report_hash, slot.timestamp);
        }
    }
    Ok(())
}
