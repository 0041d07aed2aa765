//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{BacklinkQuery, TheSeedClient};
use crate::schema::EditSubmitRequest;
use crate::types::Namespace;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.resolve_config()?;
        let client = TheSeedClient::from_config(&config)?;

        let outcome = match &self.cli.command {
            Commands::Fetch { document } => {
                let result = client.fetch_for_edit(document).await?;
                self.emit(&result)
            }
            Commands::Submit {
                document,
                file,
                log,
                edit_token,
            } => {
                let text = read_source(file)?;
                let token = match edit_token {
                    Some(token) => token.clone(),
                    None => {
                        info!(document = %document, "fetching edit token");
                        client.fetch_for_edit(document).await?.token
                    }
                };
                let request = EditSubmitRequest::new(text, log.clone(), token);
                let result = client.submit_edit(document, &request).await?;
                info!(document = %document, rev = result.rev, "edit saved");
                self.emit(&result)
            }
            Commands::Backlinks {
                document,
                namespace,
                flag,
                from,
                until,
            } => {
                let query = BacklinkQuery {
                    namespace: namespace.as_deref().map(resolve_namespace),
                    flag: flag.map(u32::from),
                    from: from.clone(),
                    until: until.clone(),
                };
                let result = client.get_backlinks(document, &query).await?;
                self.emit(&result)
            }
            Commands::Discuss { document } => {
                let threads = client.get_discussions(document).await?;
                self.emit(&threads)
            }
        };

        client.close();
        outcome
    }

    /// Merge the config file with command-line and environment overrides
    fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(token) = &self.cli.token {
            config.token = token.as_str().into();
        }
        if let Some(interval) = self.cli.interval {
            config.interval_seconds = interval;
        }

        if config.base_url.is_empty() {
            return Err(Error::config(
                "Base URL not specified (use --base-url, THESEED_BASE_URL or a config file)",
            ));
        }
        Ok(config)
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}

/// Known keywords map to the wiki's namespace name; anything else is sent as is
fn resolve_namespace(raw: &str) -> String {
    raw.parse::<Namespace>()
        .map_or_else(|_| raw.to_string(), String::from)
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const FILE_CONFIG: &str = "base_url: https://file.example\ntoken: from-file\ninterval_seconds: 2.0";

    fn discuss_cli(config: Option<PathBuf>) -> Cli {
        Cli {
            config,
            base_url: None,
            token: None,
            interval: None,
            format: OutputFormat::Json,
            verbose: false,
            command: Commands::Discuss {
                document: "Sandbox".to_string(),
            },
        }
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_resolve_namespace() {
        assert_eq!(resolve_namespace("category"), "분류");
        assert_eq!(resolve_namespace("틀"), "틀");
        assert_eq!(resolve_namespace("나무위키"), "나무위키");
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = config_file(FILE_CONFIG);

        let mut cli = discuss_cli(Some(file.path().to_path_buf()));
        cli.token = Some("from-flag".to_string());
        cli.interval = Some(0.5);
        let config = Runner::new(cli).resolve_config().unwrap();

        assert_eq!(config.base_url, "https://file.example");
        assert_eq!(config.token.expose(), "from-flag");
        assert_eq!(config.interval_seconds, 0.5);
    }

    #[test]
    fn test_config_file_used_without_overrides() {
        let file = config_file(FILE_CONFIG);

        let config = Runner::new(discuss_cli(Some(file.path().to_path_buf())))
            .resolve_config()
            .unwrap();

        assert_eq!(config.base_url, "https://file.example");
        assert_eq!(config.token.expose(), "from-file");
        assert_eq!(config.interval_seconds, 2.0);
    }

    #[test]
    fn test_missing_base_url_is_config_error() {
        let err = Runner::new(discuss_cli(None)).resolve_config().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_read_source_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "== Heading ==\nbody").unwrap();

        assert_eq!(read_source(file.path()).unwrap(), "== Heading ==\nbody");
    }
}
