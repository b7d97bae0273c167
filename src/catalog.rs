use crate::config::Source;
use crate::error::Result;
use crate::github::{self, GithubFile};
use reqwest::Client;
use std::fmt;

/// A remote file name with the script suffix trimmed off.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramName(String);

impl ProgramName {
    /// Trims `suffix` if present. Names without it are kept as they are.
    pub fn from_file_name(file_name: &str, suffix: &str) -> Self {
        Self(file_name.strip_suffix(suffix).unwrap_or(file_name).to_string())
    }

    /// The bare name, as users type it on the command line.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProgramName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Installable programs, in listing order. Rebuilt on every run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    programs: Vec<ProgramName>,
}

impl Catalog {
    /// Asks GitHub what is in the program directory and turns it into a catalog.
    ///
    /// Every call hits the network. There is no cache, so a program pushed a
    /// second ago shows up on the next run. A failed listing means no catalog at
    /// all, which in turn means nothing gets validated or installed.
    pub async fn fetch(client: &Client, source: &Source) -> Result<Self> {
        let files = github::list_directory(client, source).await?;
        let catalog = Self::from_entries(&files, &source.suffix);
        log::debug!("catalog has {} programs", catalog.len());
        Ok(catalog)
    }

    /// Builds a catalog from listing entries, trimming `suffix` off each name.
    ///
    /// This trims, it does not filter: a README in the directory becomes an
    /// "installable program" too. Whatever GitHub lists, we offer.
    pub fn from_entries(entries: &[GithubFile], suffix: &str) -> Self {
        Self {
            programs: entries
                .iter()
                .map(|file| ProgramName::from_file_name(&file.name, suffix))
                .collect(),
        }
    }

    /// Exact, case-sensitive lookup. `foo.sh` does not find `foo`.
    pub fn find(&self, name: &str) -> Option<&ProgramName> {
        self.programs.iter().find(|p| p.as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Programs in the order the listing returned them.
    pub fn iter(&self) -> impl Iterator<Item = &ProgramName> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, Overrides, Settings};
    use crate::error::EndgetError;
    use mockito::Server;
    use test_log::test;

    fn entries(names: &[&str]) -> Vec<GithubFile> {
        names
            .iter()
            .map(|n| GithubFile {
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn trims_script_suffix_and_keeps_order() {
        let catalog = Catalog::from_entries(&entries(&["foo.sh", "bar.sh", "baz.sh"]), ".sh");
        let names: Vec<&str> = catalog.iter().map(ProgramName::as_str).collect();
        assert_eq!(names, ["foo", "bar", "baz"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn names_without_suffix_pass_through() {
        let catalog = Catalog::from_entries(&entries(&["README.md", "tool", "x.sh.sh"]), ".sh");
        assert!(catalog.contains("README.md"));
        assert!(catalog.contains("tool"));
        // Only one suffix comes off.
        assert!(catalog.contains("x.sh"));
        assert!(!catalog.contains("x"));
    }

    #[test]
    fn lookup_is_exact() {
        let catalog = Catalog::from_entries(&entries(&["foo.sh"]), ".sh");
        assert_eq!(catalog.find("foo").map(ProgramName::as_str), Some("foo"));
        assert!(catalog.find("foo.sh").is_none());
        assert!(catalog.find("Foo").is_none());
        assert!(Catalog::default().is_empty());
    }

    #[test(tokio::test)]
    async fn fetch_builds_catalog_from_listing() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/RealLava/endget/contents/applications")
            .with_status(200)
            .with_body(r#"[{"name":"foo.sh"},{"name":"bar.sh"}]"#)
            .create_async()
            .await;

        let settings = Settings::resolve(
            FileConfig::default(),
            Overrides {
                api_url: Some(server.url()),
                ..Default::default()
            },
        )?;
        let catalog = Catalog::fetch(&Client::new(), &settings.source).await?;
        let names: Vec<String> = catalog.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["foo", "bar"]);
        Ok(())
    }

    #[test(tokio::test)]
    async fn fetch_propagates_listing_errors() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/RealLava/endget/contents/applications")
            .with_status(200)
            .with_body(r#"[{"path":"applications/foo.sh"}]"#)
            .create_async()
            .await;

        let settings = Settings::resolve(
            FileConfig::default(),
            Overrides {
                api_url: Some(server.url()),
                ..Default::default()
            },
        )?;
        let err = Catalog::fetch(&Client::new(), &settings.source)
            .await
            .unwrap_err();
        assert!(matches!(err, EndgetError::Parse(_)));
        Ok(())
    }
}
