use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "applier")]
#[command(about = "Job application pipeline: fetch, score, tailor, submit, record")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single cycle and print the tally
    RunOnce {
        /// Do everything except submit; records `test` rows
        #[arg(long)]
        dry_run: bool,
    },

    /// Run cycles on an interval until `stop`/`exit` or Ctrl-C
    Schedule {
        /// Minutes between cycles (overrides RUN_INTERVAL_MINUTES)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Serve the HTTP control API
    Serve {
        /// Start the interval scheduler together with the server
        #[arg(long)]
        schedule: bool,
    },

    /// Write the successful-applications CSV snapshot
    Export {
        /// Destination file (overrides EXPORT_PATH)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::try_parse_from(["applier", "run-once", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Command::RunOnce { dry_run: true }));

        let cli = Cli::try_parse_from(["applier", "schedule", "--interval", "15"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Schedule {
                interval: Some(15),
                dry_run: false
            }
        ));

        let cli = Cli::try_parse_from(["applier", "export", "-o", "out.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Export { output: Some(_) }));
    }

    #[test]
    fn test_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["applier", "schedule", "--interval", "0"]).is_err());
    }
}
