//! `tagport`: runs configured metadata importers over files and upgrades
//! persisted importer blobs.

mod commands;
mod error;

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser, Subcommand};
use exn::ResultExt;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tagport_config::Config;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "tagport", version, about = "Import file metadata from sidecar files")]
struct Cli {
    /// Configuration file (default: config.toml in the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging; repeat for more still
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every configured sidecar importer against each file
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show where each sidecar importer looks for each file's sidecar
    Sidecars {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the configured importers
    Describe,
    /// Upgrade a persisted importer blob to the current version
    Migrate {
        /// File holding the blob, or `-` for standard input
        blob: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut out = io::stdout().lock();
    let config = || Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config);
    match &cli.command {
        Command::Import { files } => {
            let importers = config()?.importers().or_raise(|| ErrorKind::Config)?;
            commands::import(&importers, files, &mut out)
        },
        Command::Sidecars { files } => {
            let importers = config()?.importers().or_raise(|| ErrorKind::Config)?;
            commands::sidecars(&importers, files, &mut out)
        },
        Command::Describe => {
            let config = config()?;
            let services = config.services().or_raise(|| ErrorKind::Config)?;
            let importers = config.importers().or_raise(|| ErrorKind::Config)?;
            commands::describe(&importers, &services, &mut out)
        },
        Command::Migrate { blob } => commands::migrate(blob, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["tagport", "describe"], 0)]
    #[case(&["tagport", "-vv", "describe"], 2)]
    #[case(&["tagport", "describe", "-v"], 1)]
    fn test_verbosity(#[case] args: &[&str], #[case] expected: u8) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, expected);
    }

    #[test]
    fn test_import_requires_files() {
        assert!(Cli::try_parse_from(["tagport", "import"]).is_err());
        let cli = Cli::try_parse_from(["tagport", "-c", "tagport.toml", "import", "a.jpg", "b.jpg"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("tagport.toml")));
        assert!(matches!(&cli.command, Command::Import { files } if files.len() == 2));
    }
}
