use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use credentials::CandidateList;
use envfile::EnvKeys;
use graphdiag_core::{CredentialCandidate, DiagError, DiagnosticReport, Endpoint};
use prober::{GraphClient, ProbeOptions};
use reachability::TcpReachability;
use setup::terminal::TerminalPrompt;
use setup::{ProbeTester, SetupConfig, Wizard};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{OutputFormat, SectionConfig};

#[derive(Debug, Parser)]
#[command(name = "graphdiag", version, about = "Connectivity and credential diagnostics for Bolt graph databases")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./graphdiag.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Show full driver errors and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct Target {
    /// Connection URI (bolt://host[:port])
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    uri: String,
    /// Configured username
    #[arg(long, env = "NEO4J_USER", default_value = "neo4j")]
    user: String,
    /// Configured password
    #[arg(long, env = "NEO4J_PASSWORD", default_value = "", hide_env_values = true, hide_default_value = true)]
    password: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Check reachability, then try configured and default credentials
    Diagnose {
        #[command(flatten)]
        target: Target,
        /// Reachability timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Timeout per credential attempt in milliseconds
        #[arg(long)]
        attempt_timeout_ms: Option<u64>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Sweep configured, default and common credentials until one works
    Discover {
        #[command(flatten)]
        target: Target,
        /// File with newline-delimited passwords to try after the built-in list
        #[arg(long, value_name = "FILE")]
        wordlist: Option<PathBuf>,
        /// Delay between attempts in milliseconds
        #[arg(long)]
        pacing_ms: Option<u64>,
        /// Timeout per credential attempt in milliseconds
        #[arg(long)]
        attempt_timeout_ms: Option<u64>,
        /// Run read/write checks with the credentials found
        #[arg(long, default_value_t = false)]
        smoke: bool,
        /// Node label used by the write checks
        #[arg(long)]
        smoke_label: Option<String>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Connect with the configured credentials and run read/write checks
    Check {
        #[command(flatten)]
        target: Target,
        /// Timeout per credential attempt in milliseconds
        #[arg(long)]
        attempt_timeout_ms: Option<u64>,
        /// Node label used by the write checks
        #[arg(long)]
        smoke_label: Option<String>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Interactively find working credentials and save them to the env file
    Setup {
        #[command(flatten)]
        target: Target,
        /// Env file to update
        #[arg(long, value_name = "FILE")]
        env_file: Option<PathBuf>,
        /// Timeout per credential attempt in milliseconds
        #[arg(long)]
        attempt_timeout_ms: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("GRAPHDIAG_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn probe_options(section: &SectionConfig, timeout_ms: Option<u64>, attempt_timeout_ms: Option<u64>, pacing_ms: Option<u64>) -> ProbeOptions {
    let defaults = ProbeOptions::default();
    ProbeOptions {
        reach_timeout: timeout_ms.or(section.timeout_ms).map(Duration::from_millis).unwrap_or(defaults.reach_timeout),
        attempt_timeout: attempt_timeout_ms
            .or(section.attempt_timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.attempt_timeout),
        pacing: pacing_ms.or(section.pacing_ms).map(Duration::from_millis).unwrap_or(defaults.pacing),
    }
}

fn resolve_format(flag: Option<OutputFormat>, section: &SectionConfig) -> OutputFormat {
    flag.or(section.format).unwrap_or(OutputFormat::Text)
}

/// `check` only ever tries the configured credentials, so they must be complete.
fn check_candidates(target: &Target) -> Result<Vec<CredentialCandidate>, DiagError> {
    if target.password.is_empty() {
        return Err(DiagError::MissingPassword);
    }
    Ok(CandidateList::new().with_configured(&target.user, &target.password).build())
}

/// Print either the report or the fatal error; returns the exit code.
fn emit(result: Result<DiagnosticReport, DiagError>, format: OutputFormat, verbose: bool) -> Result<i32> {
    let keys = EnvKeys::default();
    match (format, result) {
        (OutputFormat::Text, Ok(report)) => {
            print!("{}", render::text(&report, &keys, verbose));
            Ok(report.exit_code())
        }
        (OutputFormat::Json, Ok(report)) => {
            println!("{}", render::json(&report)?);
            Ok(report.exit_code())
        }
        (OutputFormat::Text, Err(e)) => {
            print!("{}", render::fatal_text(&e));
            Ok(1)
        }
        (OutputFormat::Json, Err(e)) => {
            println!("{}", render::fatal_json(&e)?);
            Ok(1)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let loaded_cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let verbose = cli.verbose;
    let client: Box<dyn GraphClient> = prober::default_client();
    let reach = TcpReachability;

    match cli.command {
        Commands::Version => {
            println!("graphdiag {} (core {})", env!("CARGO_PKG_VERSION"), graphdiag_core::version());
            Ok(0)
        }
        Commands::Diagnose { target, timeout_ms, attempt_timeout_ms, format } => {
            let section = loaded_cfg.diagnose.unwrap_or_default();
            let format = resolve_format(format, &section);
            let opts = probe_options(&section, timeout_ms, attempt_timeout_ms, None);
            if format == OutputFormat::Text {
                print!("{}", render::header("Neo4j Diagnostic Report", &target.uri, &target.user, &target.password));
                if target.password.is_empty() {
                    println!("NEO4J_PASSWORD is not set; trying default credentials only");
                }
            }
            let candidates = CandidateList::new()
                .with_configured(&target.user, &target.password)
                .with_defaults()
                .build();
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(prober::diagnose(client.as_ref(), &reach, &target.uri, &candidates, &opts));
            emit(result, format, verbose)
        }
        Commands::Discover { target, wordlist, pacing_ms, attempt_timeout_ms, smoke, smoke_label, format } => {
            let section = loaded_cfg.discover.unwrap_or_default();
            let format = resolve_format(format, &section);
            let opts = probe_options(&section, None, attempt_timeout_ms, pacing_ms);
            let mut list = CandidateList::new()
                .with_configured(&target.user, &target.password)
                .with_defaults()
                .with_common_passwords(&target.user)
                .with_passwords(&target.user, &section.extra_passwords[..]);
            if let Some(path) = wordlist.or(section.wordlist.clone()) {
                list = list.with_wordlist_file(&target.user, &path)?;
            }
            let candidates = list.build();
            debug!(count = candidates.len(), "candidate list built");
            if format == OutputFormat::Text {
                print!("{}", render::header("Neo4j Credential Discovery", &target.uri, &target.user, &target.password));
            }
            let label = smoke_label.or(section.smoke_label.clone()).unwrap_or_else(|| prober::smoke::DEFAULT_LABEL.to_string());
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(async {
                let mut report = prober::diagnose(client.as_ref(), &reach, &target.uri, &candidates, &opts).await?;
                if smoke {
                    if let Some(v) = report.verdict.clone() {
                        report.smoke =
                            prober::smoke::run_for(client.as_ref(), &report.endpoint, &v, &label, opts.attempt_timeout).await;
                    }
                }
                Ok::<_, DiagError>(report)
            });
            emit(result, format, verbose)
        }
        Commands::Check { target, attempt_timeout_ms, smoke_label, format } => {
            let section = loaded_cfg.check.unwrap_or_default();
            let format = resolve_format(format, &section);
            let opts = probe_options(&section, None, attempt_timeout_ms, None);
            if format == OutputFormat::Text {
                print!("{}", render::header("Neo4j Connection Test", &target.uri, &target.user, &target.password));
            }
            let candidates = match check_candidates(&target) {
                Ok(c) => c,
                Err(e) => return emit(Err(e), format, verbose),
            };
            let label = smoke_label.or(section.smoke_label.clone()).unwrap_or_else(|| prober::smoke::DEFAULT_LABEL.to_string());
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(async {
                let mut report = prober::diagnose(client.as_ref(), &reach, &target.uri, &candidates, &opts).await?;
                if let Some(v) = report.verdict.clone() {
                    report.smoke =
                        prober::smoke::run_for(client.as_ref(), &report.endpoint, &v, &label, opts.attempt_timeout).await;
                }
                Ok::<_, DiagError>(report)
            });
            emit(result, format, verbose)
        }
        Commands::Setup { target, env_file, attempt_timeout_ms } => {
            let section = loaded_cfg.setup.unwrap_or_default();
            if !std::io::stdin().is_terminal() {
                return Err(anyhow!("setup requires an interactive terminal; use `graphdiag discover` instead"));
            }
            let endpoint = match Endpoint::parse(&target.uri).and_then(|e| client.ensure_available().map(|_| e)) {
                Ok(e) => e,
                Err(e) => {
                    print!("{}", render::fatal_text(&e));
                    return Ok(1);
                }
            };
            let opts = probe_options(&section, None, attempt_timeout_ms, None);
            print!("{}", render::header("Interactive Neo4j Credential Helper", &target.uri, &target.user, &target.password));
            let mut setup_cfg = SetupConfig::new(target.user.clone(), target.password.clone());
            if let Some(p) = env_file.or(section.env_file.clone()) {
                setup_cfg.env_path = p;
            }
            let tester = ProbeTester { client: client.as_ref(), endpoint, attempt_timeout: opts.attempt_timeout };
            let mut prompt = TerminalPrompt;
            let rt = tokio::runtime::Runtime::new()?;
            let outcome = rt.block_on(Wizard::new(&mut prompt, &tester, setup_cfg).run());
            if outcome.succeeded() {
                println!("Neo4j credentials are working!");
                Ok(0)
            } else {
                println!("Could not establish Neo4j connection");
                println!("Check that the database is started and the credentials are correct");
                Ok(1)
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let code = run(cli)?;
    std::process::exit(code);
}
