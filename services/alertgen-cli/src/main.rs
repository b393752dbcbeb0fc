use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use alertgen_core::AlertgenConfig;
use commands::{list_scenarios, print_version, run_scenario, send_alert, RunArgs, SendArgs};

#[derive(Parser, Debug)]
#[command(name = "alertgen")]
#[command(about = "Synthetic alert load generator for incident-management services", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a single alert
    Send(SendArgs),

    /// Run or list load scenarios
    Scenario {
        #[command(subcommand)]
        command: ScenarioCommands,
    },

    /// Print version and build information
    Version,
}

#[derive(Subcommand, Debug)]
enum ScenarioCommands {
    /// Run a scenario against a provider
    Run(RunArgs),

    /// List available scenarios
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Send(args) => {
            let config = AlertgenConfig::load()?;
            send_alert(args, &config).await?;
        }
        Commands::Scenario {
            command: ScenarioCommands::Run(args),
        } => {
            let config = AlertgenConfig::load()?;
            run_scenario(args, &config).await?;
        }
        Commands::Scenario {
            command: ScenarioCommands::List,
        } => list_scenarios(),
        Commands::Version => print_version(),
    }

    Ok(())
}

/// Initialize logging
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(env_filter).with_target(false).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario_run_with_params() {
        let cli = Cli::try_parse_from([
            "alertgen",
            "scenario",
            "run",
            "--provider",
            "mock",
            "--name",
            "burst",
            "--count",
            "30",
            "--param",
            "burst_size=5",
            "--param",
            "pause_duration=250",
        ])
        .unwrap();

        let Commands::Scenario {
            command: ScenarioCommands::Run(args),
        } = cli.command
        else {
            panic!("expected scenario run");
        };
        assert_eq!(args.name.as_deref(), Some("burst"));
        assert_eq!(args.count, Some(30));
        assert_eq!(args.params.len(), 2);
        assert_eq!(args.params[0], ("burst_size".to_string(), "5".to_string()));
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["alertgen", "scenario", "list", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_malformed_param_is_rejected() {
        let err = Cli::try_parse_from([
            "alertgen", "scenario", "run", "--provider", "mock", "--param", "burst_size",
        ]);
        assert!(err.is_err());
    }
}
