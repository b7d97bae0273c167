use crate::config::Overrides;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "endget")]
#[command(about = "Install shell-script programs from a GitHub repository", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the GitHub API base URL
    #[arg(long, global = true, env = "ENDGET_API_URL")]
    pub api_url: Option<String>,

    /// Override the raw-content base URL scripts are downloaded from
    #[arg(long, global = true, env = "ENDGET_RAW_URL")]
    pub raw_url: Option<String>,

    /// Repository to install from (e.g. RealLava/endget)
    #[arg(long, global = true, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Branch scripts are downloaded from
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Shell used to run downloaded scripts
    #[arg(long, global = true)]
    pub shell: Option<String>,

    /// Print debug diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Download a program's script and run it
    Install {
        /// Program name as shown by `endget list`
        program: String,
        /// Pipe script output through a progress bar
        #[arg(long)]
        progress: bool,
    },
    /// List installable programs
    List,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            raw_url: self.raw_url.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            shell: self.shell.clone(),
        }
    }
}
