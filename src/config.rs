use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::booking::pagination::DEFAULT_PAGE_SIZE;

const STORE_FILE: &str = "db.json";

#[derive(Parser, Debug, Default)]
#[command(name = "carebook", about = "Hospital appointment booking")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Use a remote record store instead of the local data file,
    /// e.g. http://records.internal:8080/api
    #[arg(long)]
    pub provider_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub provider: ProviderConfig,
    pub booking: BookingConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
    /// Mount the record store's REST surface under `/api`.
    pub serve_api: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BookingConfig {
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            serve_api: true,
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref url) = cli.provider_url {
            config.provider.base_url = Some(url.clone());
        }

        if config.store.path.is_none() {
            config.store.path = Some(data_dir.join(STORE_FILE));
        }
        if config.booking.page_size == 0 {
            anyhow::bail!("booking.page_size must be at least 1");
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".carebook")
        })
    }

    pub fn store_path(&self) -> &Path {
        self.store
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new(STORE_FILE))
    }

    /// True when pages are backed by a remote record store.
    pub fn uses_remote_provider(&self) -> bool {
        self.provider.base_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_in(dir: &Path) -> Cli {
        Cli {
            data_dir: Some(dir.to_path_buf()),
            ..Cli::default()
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.store.serve_api);
        assert!(config.store.path.is_none());
        assert!(config.provider.base_url.is_none());
        assert_eq!(config.booking.page_size, 5);
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli_in(Path::new("/tmp/test-carebook"));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-carebook"));
    }

    #[test]
    fn data_dir_defaults_to_dot_carebook() {
        let dir = Config::data_dir(&Cli::default());
        assert!(dir.ends_with(".carebook"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli_in(tmp.path())).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store_path(), tmp.path().join("db.json"));
        assert!(!config.uses_remote_provider());
    }

    #[test]
    fn load_applies_cli_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(9090),
            provider_url: Some("http://records:8080/api".to_string()),
            ..cli_in(tmp.path())
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.provider.base_url.as_deref(),
            Some("http://records:8080/api")
        );
        assert!(config.uses_remote_provider());
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
port = 3001

[store]
path = "/srv/carebook/data.json"
serve_api = false

[booking]
page_size = 10
"#,
        )
        .unwrap();

        let config = Config::load(&cli_in(tmp.path())).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.store_path(), Path::new("/srv/carebook/data.json"));
        assert!(!config.store.serve_api);
        assert_eq!(config.booking.page_size, 10);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "[booking]\npage_size = 0\n").unwrap();
        assert!(Config::load(&cli_in(tmp.path())).is_err());
    }
}
