// Configuration module for trendarr
// Handles the TOML configuration file and environment overrides

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "trendarr";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RADARR_URL: &str = "http://localhost:7878";
const DEFAULT_RADARR_ROOT: &str = "/movies";
const DEFAULT_SONARR_URL: &str = "http://localhost:8989";
const DEFAULT_SONARR_ROOT: &str = "/tv";
const DEFAULT_PLEX_URL: &str = "https://app.plex.tv/desktop";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Server configuration
    pub server: ServerConfig,

    /// TMDB discovery source
    pub tmdb: TmdbConfig,

    /// Trakt discovery source
    pub trakt: TraktConfig,

    /// Radarr movie manager
    pub radarr: ManagerSection,

    /// Sonarr series manager
    pub sonarr: ManagerSection,

    pub plex: PlexConfig,

    /// Outbound HTTP settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server port (default: 5000)
    pub port: u16,

    /// Bind address (default: 0.0.0.0)
    pub bind_address: String,

    /// Directory holding the static frontend (default: ./static)
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: "0.0.0.0".to_string(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraktConfig {
    pub client_id: Option<String>,
}

/// A [radarr] or [sonarr] table; unset fields fall back per manager
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManagerSection {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub root_folder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlexConfig {
    /// Base URL for "watch on Plex" links
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout for every upstream request, in seconds (default: 10)
    pub request_timeout_secs: Option<u64>,
}

/// Resolved connection settings for one acquisition manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Base URL without a trailing slash
    pub url: String,
    pub api_key: String,
    /// Root folder used when an add request does not name one
    pub root_folder: String,
}

impl ManagerConfig {
    fn resolve(
        section: ManagerSection,
        prefix: &str,
        default_url: &str,
        default_root: &str,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Self {
        let url = env(&format!("{}_URL", prefix))
            .or(section.url)
            .unwrap_or_else(|| default_url.to_string());
        let api_key = env(&format!("{}_API_KEY", prefix))
            .or(section.api_key)
            .unwrap_or_default();
        let root_folder = env(&format!("{}_ROOT_FOLDER", prefix))
            .or(section.root_folder)
            .unwrap_or_else(|| default_root.to_string());

        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            root_folder,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Application configuration - combines TOML file with environment overrides
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server port
    pub port: u16,

    /// Bind address
    pub bind_address: String,

    /// TMDB API key (empty when unset)
    pub tmdb_api_key: String,

    /// Trakt client id (empty when unset)
    pub trakt_client_id: String,

    pub radarr: ManagerConfig,

    pub sonarr: ManagerConfig,

    /// Plex web app URL handed to the frontend
    pub plex_url: String,

    /// Static frontend directory
    pub static_dir: PathBuf,

    /// Timeout applied to every upstream request
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from TOML file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. TOML config file
    /// 3. Default values
    pub fn load() -> Self {
        let config_path = Self::find_config_path();
        let config_file = Self::load_config_file(&config_path);
        Self::build(config_file, &|key: &str| {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        })
    }

    /// Find config.toml: CONFIG_PATH, then the platform config dir
    fn find_config_path() -> PathBuf {
        if let Ok(path) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(path);
        }

        if let Some(dir) = dirs::config_dir() {
            return dir.join(APP_NAME).join(CONFIG_FILENAME);
        }

        PathBuf::from(CONFIG_FILENAME)
    }

    /// Load and parse the TOML config file
    fn load_config_file(config_path: &Path) -> ConfigFile {
        if !config_path.exists() {
            tracing::debug!(
                "No config file found at {}, using defaults",
                config_path.display()
            );
            return ConfigFile::default();
        }

        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                    ConfigFile::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                ConfigFile::default()
            }
        }
    }

    /// Build configuration from config file with overrides from `env`
    pub(crate) fn build(config_file: ConfigFile, env: &impl Fn(&str) -> Option<String>) -> Self {
        // Port: env > config > default
        let port = env("TRENDARR_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(config_file.server.port);

        // Bind address: env > config > default
        let bind_address =
            env("TRENDARR_BIND_ADDRESS").unwrap_or_else(|| config_file.server.bind_address.clone());

        let tmdb_api_key = env("TMDB_API_KEY")
            .or(config_file.tmdb.api_key)
            .unwrap_or_default();

        let trakt_client_id = env("TRAKT_CLIENT_ID")
            .or(config_file.trakt.client_id)
            .unwrap_or_default();

        let radarr = ManagerConfig::resolve(
            config_file.radarr,
            "RADARR",
            DEFAULT_RADARR_URL,
            DEFAULT_RADARR_ROOT,
            env,
        );
        let sonarr = ManagerConfig::resolve(
            config_file.sonarr,
            "SONARR",
            DEFAULT_SONARR_URL,
            DEFAULT_SONARR_ROOT,
            env,
        );

        let plex_url = env("PLEX_URL")
            .or(config_file.plex.url)
            .unwrap_or_else(|| DEFAULT_PLEX_URL.to_string());

        let static_dir = env("TRENDARR_STATIC_DIR")
            .map(PathBuf::from)
            .or(config_file.server.static_dir)
            .unwrap_or_else(|| PathBuf::from("static"));

        let timeout_secs = env("TRENDARR_REQUEST_TIMEOUT_SECS")
            .and_then(|t| t.parse().ok())
            .or(config_file.http.request_timeout_secs)
            .filter(|&t| t > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            port,
            bind_address,
            tmdb_api_key,
            trakt_client_id,
            radarr,
            sonarr,
            plex_url,
            static_dir,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Log configuration status
    pub fn log_config(&self) {
        tracing::info!("Server listening on {}:{}", self.bind_address, self.port);
        tracing::info!("Static frontend: {}", self.static_dir.display());
        tracing::debug!("Upstream request timeout: {:?}", self.request_timeout);

        if self.tmdb_api_key.is_empty() {
            tracing::warn!("TMDB API key not set, TMDB requests will fail");
            tracing::info!("Hint: Add [tmdb] api_key to config.toml or set TMDB_API_KEY env var");
        }
        if self.trakt_client_id.is_empty() {
            tracing::warn!("Trakt client id not set, Trakt requests will fail");
        }

        for (name, manager) in [("Radarr", &self.radarr), ("Sonarr", &self.sonarr)] {
            if manager.is_configured() {
                tracing::info!("{}: {} (root folder {})", name, manager.url, manager.root_folder);
            } else {
                tracing::warn!("{}: no API key configured ({})", name, manager.url);
            }
        }
    }
}
