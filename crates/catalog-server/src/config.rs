use std::path::PathBuf;

use crate::error::Result;
use catalog_app::state::AppConfig;
pub use clap::Parser;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "REST service over a catalog of books, authors and genres")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "CATALOG_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "CATALOG_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "CATALOG_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the service, as visible to clients"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "CATALOG_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/catalog.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "CATALOG_DATA_DIR",
        help = "Data directory for the database, default is system default like ~/.local/share/catalog",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(long, env = "CATALOG_CORS", help = "Enable permissive CORS")]
    pub cors: bool,

    #[arg(
        long,
        env = "CATALOG_SEED",
        help = "Reset the database and fill it with sample data on start"
    )]
    pub seed: bool,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("catalog"))
        .unwrap_or_else(|| PathBuf::from("catalog"))
        .to_string_lossy()
        .to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/catalog.db", self.data_dir))
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            base_url: config.base_url.clone(),
        }
    }
}
