use crate::catalog::{Catalog, ProgramName};
use crate::config::Source;
use crate::error::{EndgetError, Result};
use crate::github;
use crate::logger::Logger;
use crate::shell::{OutputMode, ScriptExecutor};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Where an install currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    /// Validated against the catalog, nothing requested yet.
    Idle,
    /// Downloading the script body.
    Fetching,
    /// The shell has the script. Progress output, if any, happens here.
    Executing,
    Done,
    Failed,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallPhase::Idle => "idle",
            InstallPhase::Fetching => "fetching",
            InstallPhase::Executing => "executing",
            InstallPhase::Done => "done",
            InstallPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Fetches a program's script and runs it through an executor.
pub struct Installer<E> {
    client: Client,
    source: Source,
    executor: E,
    mode: OutputMode,
}

impl<E: ScriptExecutor> Installer<E> {
    /// The executor is where the remote code actually runs. Tests pass in one
    /// that only records what it was given.
    pub fn new(client: Client, source: Source, executor: E, mode: OutputMode) -> Self {
        Self {
            client,
            source,
            executor,
            mode,
        }
    }

    /// Builds the catalog fresh, then installs `name` from it.
    pub async fn run(&self, name: &str) -> Result<ProgramName> {
        let catalog = Catalog::fetch(&self.client, &self.source).await?;
        self.install(&catalog, name).await
    }

    /// Installs a program that must be present in `catalog`.
    ///
    /// The membership check happens before any request to the raw endpoint,
    /// and nothing is executed unless the whole script body was downloaded.
    pub async fn install(&self, catalog: &Catalog, name: &str) -> Result<ProgramName> {
        let program = catalog
            .find(name)
            .cloned()
            .ok_or_else(|| EndgetError::NotFound(name.to_string()))?;

        let mut phase = InstallPhase::Idle;
        let result = self.fetch_and_execute(&program, &mut phase).await;
        let end = if result.is_ok() {
            InstallPhase::Done
        } else {
            InstallPhase::Failed
        };
        advance(&program, &mut phase, end);

        result.map(|()| program)
    }

    async fn fetch_and_execute(&self, program: &ProgramName, phase: &mut InstallPhase) -> Result<()> {
        let url = self.source.script_url(program.as_str());
        Logger::command(
            "install",
            format!("{} from {}", Logger::highlight(program), Logger::remote(&url)),
        );

        advance(program, phase, InstallPhase::Fetching);
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Fetching {}...", Logger::highlight(program)));
        pb.enable_steady_tick(Duration::from_millis(120));

        let script = github::download_script(&self.client, &url).await;
        pb.finish_and_clear();
        let script = script?;

        Logger::info(format!(
            "Running remote script ({} bytes, sha256 {})",
            script.body().len(),
            Logger::dim(script.digest())
        ));

        advance(program, phase, InstallPhase::Executing);
        self.executor.execute(program, &script, self.mode).await
    }
}

/// Moves to the next phase and leaves a debug breadcrumb (`-v` shows them).
fn advance(program: &ProgramName, phase: &mut InstallPhase, next: InstallPhase) {
    debug!("{}: {} -> {}", program, phase, next);
    *phase = next;
}

/// Table of installable programs, one row each.
/// Numbered so people can eyeball how many there are without counting.
pub fn render_catalog(catalog: &Catalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Program"]);
    for (i, program) in catalog.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), program.to_string()]);
    }
    table
}

/// Prints every program the configured repository offers.
///
/// Goes through the same catalog fetch as `install`, so whatever shows up
/// here is exactly what `endget install <name>` will accept.
pub async fn list_programs(client: &Client, source: &Source) -> Result<()> {
    let catalog = Catalog::fetch(client, source).await?;

    Logger::header(format!("Programs in {}/{}", source.owner, source.repo));
    if catalog.is_empty() {
        Logger::info("No programs available.");
        return Ok(());
    }

    println!("{}", render_catalog(&catalog));
    Logger::info(format!("{} programs available", catalog.len()));
    Ok(())
}
