//! aws-orgs CLI
//!
//! Reports on an AWS Organization and converges it to a spec file.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{AccountsAction, Cli, Commands};
use error::{CliError, Result};
use orgs_aws::AwsOrgClient;

/// Log targets of the AWS SDK and its HTTP stack
const SDK_TARGETS: &[&str] = &[
    "aws_config",
    "aws_sdk_organizations",
    "aws_smithy_runtime",
    "aws_smithy_runtime_api",
    "hyper",
    "hyper_util",
    "rustls",
];

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;
    execute_command(&cli)
}

/// Filter directives for the requested verbosity
fn log_filter(cli: &Cli) -> String {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let mut directives = vec![level.to_string()];
    if !cli.sdk_log {
        directives.extend(SDK_TARGETS.iter().map(|t| format!("{t}=off")));
    }
    directives.join(",")
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_new(log_filter(cli))
        .map_err(|e| CliError::user(format!("Invalid log filter: {e}")))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
    tracing::debug!("Debug logging enabled");
    Ok(())
}

fn aws_client(cli: &Cli) -> Result<AwsOrgClient> {
    Ok(AwsOrgClient::new(cli.region.clone())?)
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Report => commands::run_report(&aws_client(cli)?),
        Commands::Organization {
            spec_file,
            exec,
            json,
        } => {
            // Spec errors surface before any credential lookup
            let spec = commands::load_spec(spec_file)?;
            let client = aws_client(cli)?;
            commands::run_organization(&client, &spec, cli.engine_options(*exec), *json)?;
            Ok(())
        }
        Commands::Accounts { action } => match action {
            AccountsAction::Report => commands::run_accounts_report(&aws_client(cli)?),
            AccountsAction::Create { spec_file, exec } => {
                let spec = commands::load_spec(spec_file)?;
                let client = aws_client(cli)?;
                commands::run_accounts_create(&client, &spec, cli.engine_options(*exec))?;
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_filter_hides_sdk() {
        let cli = Cli::parse_from(["awsorgs", "report"]);
        let filter = log_filter(&cli);
        assert!(filter.starts_with("warn,"));
        assert!(filter.contains("aws_smithy_runtime=off"));
    }

    #[test]
    fn test_debug_wins_over_verbose() {
        let cli = Cli::parse_from(["awsorgs", "-v", "-d", "--sdk-log", "report"]);
        assert_eq!(log_filter(&cli), "debug");
    }

    #[test]
    fn test_verbose_is_info() {
        let cli = Cli::parse_from(["awsorgs", "-v", "report"]);
        assert!(log_filter(&cli).starts_with("info,"));
        assert!(EnvFilter::try_new(log_filter(&cli)).is_ok());
    }

    #[test]
    fn test_cli_error_user() {
        let error = CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
