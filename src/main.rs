pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod installer;
pub mod logger;
pub mod progress;
pub mod shell;

use clap::Parser;
use cli::{Cli, Commands};
use config::{FileConfig, Settings};
use env_logger::Env;
use installer::Installer;
use logger::Logger;
use shell::{OutputMode, ShellExecutor};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(error::USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Logger::error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    let settings = Settings::resolve(FileConfig::load()?, cli.overrides())?;
    log::debug!("resolved settings: {:?}", settings);

    let client = reqwest::Client::new();

    match cli.command {
        Commands::List => installer::list_programs(&client, &settings.source).await?,
        Commands::Install { program, progress } => {
            let mode = if progress {
                OutputMode::Progress
            } else {
                OutputMode::Inherit
            };
            let installer = Installer::new(
                client,
                settings.source,
                ShellExecutor::new(settings.shell),
                mode,
            );
            let installed = installer.run(&program).await?;
            Logger::success(format!(
                "Installed {} successfully.",
                Logger::highlight(installed)
            ));
        }
    }

    Ok(())
}
