//! Command-line argument parsing

use crate::input::DEFAULT_COLUMN;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nit-checker")]
#[command(about = "Bulk taxpayer lookups against the tax registry with JSON reports")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Load settings from this file instead of ./.env
    #[arg(long = "env-file", global = true)]
    pub env_file: Option<PathBuf>,

    /// CSV export of the identifier sheet (overrides EXCEL_FILE_PATH)
    #[arg(long = "input", short = 'i', global = true)]
    pub input: Option<PathBuf>,

    /// Column holding the identifiers
    #[arg(long = "column", default_value = DEFAULT_COLUMN, global = true)]
    pub column: String,

    /// Service to query
    #[arg(long = "service", short = 's', default_value = "inscription", global = true)]
    pub service: String,

    /// Directory for the JSON reports
    #[arg(long = "output-dir", short = 'o', default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Append log lines to this file
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(long = "quiet", short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Split fetched records into "errors" and "success" reports
    Errors,
    /// Report regime data for records without errors
    Monotributo,
    /// Probe a service's health endpoint
    Health {
        /// Service to probe; defaults to --service
        #[arg(value_name = "SERVICE")]
        name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "nit-checker",
            "errors",
            "--input",
            "nits.csv",
            "-o",
            "reports",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Errors);
        assert_eq!(args.input, Some(PathBuf::from("nits.csv")));
        assert_eq!(args.output_dir, PathBuf::from("reports"));
        assert_eq!(args.column, "nro_nit");
        assert!(args.verbose);
    }

    #[test]
    fn health_takes_optional_service() {
        let args = Args::try_parse_from(["nit-checker", "health", "padron"]).unwrap();
        assert_eq!(
            args.command,
            Command::Health {
                name: Some("padron".to_string())
            }
        );
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["nit-checker", "errors", "-v", "-q"]).is_err());
    }
}
