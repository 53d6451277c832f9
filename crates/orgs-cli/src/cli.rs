//! CLI argument parsing using clap derive

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use orgs_core::{EngineOptions, ExecutionMode, PollConfig};

/// aws-orgs - Manage an AWS Organization from a declarative spec
#[derive(Parser, Debug)]
#[command(name = "awsorgs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log decisions (INFO)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log everything including pagination (DEBUG)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Include AWS SDK log output
    #[arg(long, global = true)]
    pub sdk_log: bool,

    /// Seconds between account-creation status checks
    #[arg(long, global = true, env = "AWSORGS_POLL_INTERVAL", default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Maximum account-creation status checks
    #[arg(long, global = true, env = "AWSORGS_POLL_ATTEMPTS", default_value_t = 5)]
    pub poll_attempts: u32,

    /// AWS region override
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Engine options for a run; `exec` selects apply mode
    pub fn engine_options(&self, exec: bool) -> EngineOptions {
        let mode = if exec {
            ExecutionMode::Apply
        } else {
            ExecutionMode::Plan
        };
        EngineOptions {
            mode,
            poll: PollConfig {
                interval: Duration::from_secs(self.poll_interval_secs),
                attempts: self.poll_attempts,
            },
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the OU tree, service control policies and accounts
    Report,

    /// Converge OUs, policies and account placement to a spec file
    ///
    /// Without --exec nothing is changed; every decision is printed
    /// with a [dry-run] prefix.
    ///
    /// Examples:
    ///   awsorgs organization --spec-file org.yaml          # Preview
    ///   awsorgs organization --spec-file org.yaml --exec   # Apply
    Organization {
        /// Organization spec file (YAML or JSON)
        #[arg(short, long)]
        spec_file: PathBuf,

        /// Issue the changes instead of previewing them
        #[arg(long)]
        exec: bool,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Account listing and provisioning
    Accounts {
        #[command(subcommand)]
        action: AccountsAction,
    },
}

/// Account subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AccountsAction {
    /// List every account in the organization
    Report,

    /// Create accounts listed in the spec but missing from the organization
    Create {
        /// Organization spec file (YAML or JSON)
        #[arg(short, long)]
        spec_file: PathBuf,

        /// Issue the changes instead of previewing them
        #[arg(long)]
        exec: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_report() {
        let cli = Cli::parse_from(["awsorgs", "report"]);
        assert_eq!(cli.command, Commands::Report);
        assert!(!cli.verbose);
        assert!(!cli.debug);
    }

    #[test]
    fn parse_organization_defaults_to_plan() {
        let cli = Cli::parse_from(["awsorgs", "organization", "--spec-file", "org.yaml"]);
        assert_eq!(
            cli.command,
            Commands::Organization {
                spec_file: PathBuf::from("org.yaml"),
                exec: false,
                json: false,
            }
        );
        assert_eq!(cli.engine_options(false).mode, ExecutionMode::Plan);
    }

    #[test]
    fn parse_organization_exec_json() {
        let cli = Cli::parse_from([
            "awsorgs",
            "organization",
            "-s",
            "org.yaml",
            "--exec",
            "--json",
        ]);
        assert!(matches!(
            cli.command,
            Commands::Organization {
                exec: true,
                json: true,
                ..
            }
        ));
    }

    #[test]
    fn parse_accounts_create() {
        let cli = Cli::parse_from(["awsorgs", "accounts", "create", "--spec-file", "org.yaml"]);
        assert_eq!(
            cli.command,
            Commands::Accounts {
                action: AccountsAction::Create {
                    spec_file: PathBuf::from("org.yaml"),
                    exec: false,
                }
            }
        );
    }

    #[test]
    fn parse_accounts_report() {
        let cli = Cli::parse_from(["awsorgs", "accounts", "report"]);
        assert_eq!(
            cli.command,
            Commands::Accounts {
                action: AccountsAction::Report
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "awsorgs",
            "report",
            "-d",
            "--sdk-log",
            "--region",
            "eu-west-1",
        ]);
        assert!(cli.debug);
        assert!(cli.sdk_log);
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn poll_flags_build_options() {
        let cli = Cli::parse_from([
            "awsorgs",
            "--poll-interval-secs",
            "0",
            "--poll-attempts",
            "2",
            "report",
        ]);
        let options = cli.engine_options(true);
        assert_eq!(options.mode, ExecutionMode::Apply);
        assert_eq!(
            options.poll,
            PollConfig {
                interval: Duration::ZERO,
                attempts: 2,
            }
        );
    }

    #[test]
    fn organization_requires_spec_file() {
        let result = Cli::try_parse_from(["awsorgs", "organization"]);
        assert!(result.is_err());
    }
}
