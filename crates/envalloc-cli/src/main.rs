use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use envalloc_core::{EngineConfig, Workbook};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Allocates resource usage across unit processes.
#[derive(Parser)]
#[command(name = "envalloc", version)]
#[command(about = "Unit-process allocation and measurement correction for resource workbooks")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive corrected usage, allocation tables and distributions
    Run {
        /// Workbook JSON file
        #[arg(long, short)]
        input: PathBuf,
        /// Engine configuration (defaults to $ENVALLOC_CONFIG_PATH or envalloc.toml)
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Report validation problems without deriving anything
    Validate {
        #[arg(long, short)]
        input: PathBuf,
    },
    /// Describe how usage is allocated
    Explain,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::Run { input, config, pretty } => run(&input, config.as_deref(), pretty),
        Command::Validate { input } => validate(&input),
        Command::Explain => {
            explain();
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("envalloc=info,warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(input: &Path, config: Option<&Path>, pretty: bool) -> Result<()> {
    let config = match config {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    }
    .context("failed to load engine configuration")?;

    let workbook = Workbook::from_path(input)?;
    for issue in workbook.issues() {
        warn!(
            resource = %issue.resource,
            field = issue.error.field(),
            error = %issue.error,
            "Input problem"
        );
    }

    let derived = workbook.derive_all(&config);
    for (resource, checks) in derived.iter().map(|d| (&d.resource, &d.checks)) {
        for check in checks.iter().filter(|c| !c.is_balanced) {
            warn!(
                resource = %resource,
                total_ratio = check.total_ratio,
                deviation = check.deviation,
                "Allocation table does not sum to the target"
            );
        }
    }

    let output = if pretty {
        serde_json::to_string_pretty(&derived)?
    } else {
        serde_json::to_string(&derived)?
    };
    println!("{output}");
    info!(resources = derived.len(), "Derivation complete");
    Ok(())
}

fn validate(input: &Path) -> Result<()> {
    let workbook = Workbook::from_path(input)?;
    let issues = workbook.issues();
    if issues.is_empty() {
        println!("{}: ok ({} resources)", input.display(), workbook.resources.len());
        return Ok(());
    }

    for issue in &issues {
        println!("{}: {} [{}]", issue.resource, issue.error, issue.error.field());
    }
    bail!("{} validation problem(s) in '{}'", issues.len(), input.display())
}

fn explain() {
    println!("envalloc - unit-process allocation engine");
    println!();
    println!("For each resource in a workbook:");
    println!("  1. The measurement scope is the most common scope among measurement entries.");
    println!("  2. With measurement enabled, monthly usage is split across measurement entries");
    println!("     in proportion to their measured amounts.");
    println!("  3. Selected unit processes receive ratios by equipment consumption, production");
    println!("     volume or direct input, rounded and normalized to 100.");
    println!("  4. Building or process measurements produce one allocation table per instance;");
    println!("     sub-process and facility measurements need no allocation.");
    println!("  5. Each table distributes its scope's usage back onto the unit processes.");
}
