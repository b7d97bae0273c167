use crate::error::{EndgetError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_OWNER: &str = "RealLava";
pub const DEFAULT_REPO: &str = "endget";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_DIRECTORY: &str = "applications";
pub const DEFAULT_SHELL: &str = "bash";
pub const SCRIPT_SUFFIX: &str = ".sh";

/// Optional `endget.toml` in the user's config directory.
/// Every key is optional; anything missing falls back to the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub raw_url: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub directory: Option<String>,
    pub shell: Option<String>,
}

impl FileConfig {
    /// Where the config file would live (e.g. `~/.config/endget/endget.toml`).
    /// `None` when the platform has no home directory to speak of.
    pub fn get_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "endget", "endget")
            .map(|dirs| dirs.config_dir().join("endget.toml"))
    }

    /// Loads the config file if there is one. A missing file is not an error.
    pub fn load() -> Result<Self> {
        match Self::get_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Reads and parses a specific file. Unlike `load`, a missing file here is
    /// an error, since somebody asked for this path on purpose.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EndgetError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| EndgetError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Values given on the command line (or through their environment variables).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub raw_url: Option<String>,
    /// `owner/repo`
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub shell: Option<String>,
}

/// Where the catalog and the scripts are served from.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Base of the contents API, usually `https://api.github.com`.
    pub api_url: Url,
    /// Base of the raw file host scripts are downloaded from.
    pub raw_url: Url,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub directory: String,
    pub suffix: String,
}

impl Source {
    /// GitHub contents API endpoint for the program directory.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            trim_base(&self.api_url),
            self.owner,
            self.repo,
            self.directory
        )
    }

    /// Raw download URL for a program. The name is substituted verbatim.
    pub fn script_url(&self, program: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}",
            trim_base(&self.raw_url),
            self.owner,
            self.repo,
            self.branch,
            self.directory,
            program
        )
    }
}

fn trim_base(url: &Url) -> &str {
    url.as_str().trim_end_matches('/')
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: Source,
    pub shell: String,
}

impl Settings {
    /// Layers defaults, then the config file, then command-line overrides.
    ///
    /// `--repo` replaces owner and repo together; mixing an owner from the file
    /// with a repo from the flag would point at a repository nobody asked for.
    /// Base URLs are validated here so a typo fails before any request is made.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let (owner, repo) = match overrides.repo.as_deref() {
            Some(spec) => split_repo(spec)?,
            None => (
                file.owner.unwrap_or_else(|| DEFAULT_OWNER.to_string()),
                file.repo.unwrap_or_else(|| DEFAULT_REPO.to_string()),
            ),
        };

        let api_url = parse_base_url(
            overrides
                .api_url
                .or(file.api_url)
                .as_deref()
                .unwrap_or(DEFAULT_API_URL),
        )?;
        let raw_url = parse_base_url(
            overrides
                .raw_url
                .or(file.raw_url)
                .as_deref()
                .unwrap_or(DEFAULT_RAW_URL),
        )?;

        let branch = overrides
            .branch
            .or(file.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let directory = file
            .directory
            .unwrap_or_else(|| DEFAULT_DIRECTORY.to_string());
        let shell = overrides
            .shell
            .or(file.shell)
            .unwrap_or_else(|| DEFAULT_SHELL.to_string());

        Ok(Self {
            source: Source {
                api_url,
                raw_url,
                owner,
                repo,
                branch,
                directory: directory.trim_matches('/').to_string(),
                suffix: SCRIPT_SUFFIX.to_string(),
            },
            shell,
        })
    }
}

fn split_repo(spec: &str) -> Result<(String, String)> {
    match spec.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(EndgetError::Config(format!(
            "expected repository as owner/repo, got '{}'",
            spec
        ))),
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| EndgetError::Config(format!("'{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(EndgetError::Config(format!(
            "'{}': unsupported scheme '{}'",
            raw, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn defaults_point_at_the_upstream_repository() -> Result<()> {
        let settings = Settings::resolve(FileConfig::default(), Overrides::default())?;
        assert_eq!(
            settings.source.listing_url(),
            "https://api.github.com/repos/RealLava/endget/contents/applications"
        );
        assert_eq!(
            settings.source.script_url("foo"),
            "https://raw.githubusercontent.com/RealLava/endget/main/applications/foo"
        );
        assert_eq!(settings.shell, "bash");
        assert_eq!(settings.source.suffix, ".sh");
        Ok(())
    }

    #[test]
    fn command_line_beats_file() -> Result<()> {
        let file = FileConfig {
            repo: Some("from-file".into()),
            owner: Some("file-owner".into()),
            branch: Some("dev".into()),
            shell: Some("zsh".into()),
            ..Default::default()
        };
        let overrides = Overrides {
            repo: Some("someone/tools".into()),
            shell: Some("sh".into()),
            api_url: Some("http://127.0.0.1:8080/".into()),
            ..Default::default()
        };
        let settings = Settings::resolve(file, overrides)?;
        assert_eq!(settings.source.owner, "someone");
        assert_eq!(settings.source.repo, "tools");
        assert_eq!(settings.source.branch, "dev");
        assert_eq!(settings.shell, "sh");
        assert_eq!(
            settings.source.listing_url(),
            "http://127.0.0.1:8080/repos/someone/tools/contents/applications"
        );
        Ok(())
    }

    #[test]
    fn rejects_malformed_overrides() {
        let bad_repo = Overrides {
            repo: Some("no-slash".into()),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(FileConfig::default(), bad_repo),
            Err(EndgetError::Config(_))
        ));

        let bad_url = Overrides {
            raw_url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(FileConfig::default(), bad_url),
            Err(EndgetError::Config(_))
        ));
    }

    #[test]
    fn loads_partial_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "owner = \"octo\"\ndirectory = \"/scripts/\"")?;

        let config = FileConfig::load_from(file.path())?;
        assert_eq!(config.owner.as_deref(), Some("octo"));
        assert_eq!(config.repo, None);

        let settings = Settings::resolve(config, Overrides::default())?;
        assert_eq!(
            settings.source.script_url("bar"),
            "https://raw.githubusercontent.com/octo/endget/main/scripts/bar"
        );
        Ok(())
    }

    #[test]
    fn broken_file_is_a_config_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "owner = [")?;
        assert!(matches!(
            FileConfig::load_from(file.path()),
            Err(EndgetError::Config(_))
        ));
        Ok(())
    }
}
