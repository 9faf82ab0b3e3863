use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flightpath_cli::commands::check::{handle_check, CheckCommandArgs};
use flightpath_cli::commands::plan::{handle_plan, PlanCommandArgs};
use flightpath_cli::commands::resolve_scenario_path;
use flightpath_cli::output::OutputFormat;
use flightpath_lib::Parallelism;

#[derive(Parser, Debug)]
#[command(author, version, about = "Wind-aware flight trajectory optimizer")]
struct Cli {
    /// Scenario manifest (JSON). Falls back to FLIGHTPATH_SCENARIO.
    #[arg(long, global = true)]
    scenario: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep every Mach and altitude, then report the optimal paths.
    Plan(PlanArgs),
    /// Report per-phase feasibility of a single flight condition.
    Check {
        /// Cruise altitude in feet.
        #[arg(long)]
        altitude: u32,
        /// Cruise Mach number.
        #[arg(long)]
        mach: f64,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Worker threads for the sweep (default: all cores).
    #[arg(long, conflicts_with = "sequential")]
    threads: Option<usize>,
    /// Run the sweep on the calling thread only.
    #[arg(long)]
    sequential: bool,
    /// Cost index of the custom objective.
    #[arg(long = "custom-ci")]
    custom_ci: Option<f64>,
    /// Cost index of the time objective.
    #[arg(long = "time-ci")]
    time_ci: Option<f64>,
    /// Cost index steering the searches.
    #[arg(long = "search-ci")]
    search_ci: Option<f64>,
    /// Required time of arrival, in hours from departure.
    #[arg(long = "rta-hours")]
    rta_hours: Option<f64>,
    /// Lowest Mach allowed when meeting the RTA.
    #[arg(long = "min-mach")]
    min_mach: Option<f64>,
    /// Highest Mach allowed when meeting the RTA.
    #[arg(long = "max-mach")]
    max_mach: Option<f64>,
    /// Ignore the RTA configured in the scenario.
    #[arg(long = "no-rta", conflicts_with = "rta_hours")]
    no_rta: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let scenario = resolve_scenario_path(cli.scenario)?;

    match cli.command {
        Command::Plan(args) => {
            let parallelism = match (args.sequential, args.threads) {
                (true, _) => Parallelism::Sequential,
                (false, Some(0)) => bail!("--threads must be at least 1"),
                (false, Some(n)) => Parallelism::Threads(n),
                (false, None) => Parallelism::Auto,
            };
            handle_plan(&PlanCommandArgs {
                scenario,
                parallelism,
                custom_cost_index: args.custom_ci,
                time_cost_index: args.time_ci,
                search_cost_index: args.search_ci,
                rta_hours: args.rta_hours,
                min_mach: args.min_mach,
                max_mach: args.max_mach,
                no_rta: args.no_rta,
                format: cli.format,
            })
        }
        Command::Check { altitude, mach } => handle_check(&CheckCommandArgs {
            scenario,
            altitude_ft: altitude,
            mach,
            format: cli.format,
        }),
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
