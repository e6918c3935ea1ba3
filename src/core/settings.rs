use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MIN_REFRESH_INTERVAL_SECS: u64 = 30;
const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub scrape: ScrapeSettings,
    pub storage: StorageSettings,
    pub server: ServerSettings,
    pub fallback: FallbackSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            scrape: ScrapeSettings::default(),
            storage: StorageSettings::default(),
            server: ServerSettings::default(),
            fallback: FallbackSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub url: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_backoff_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            refresh_interval_secs: 300,
            request_timeout_secs: 15,
            retry_attempts: 3,
            retry_backoff_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityMode {
    /// Take the validity window verbatim from the page, falling back to the
    /// computed calendar window for whichever bound the page omits.
    Scraped,
    /// Always derive the window from calendar arithmetic.
    Computed,
}

impl Default for ValidityMode {
    fn default() -> Self {
        ValidityMode::Scraped
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    pub ticket_number_id: String,
    pub qr_image_id: String,
    pub valid_from_id: String,
    pub valid_until_id: String,
    pub region_id: String,
    pub ticket_class_id: String,
    pub validity: ValidityMode,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            ticket_number_id: "ticketNumber".to_string(),
            qr_image_id: "qrCodeImage".to_string(),
            valid_from_id: "validFrom".to_string(),
            valid_until_id: "validUntil".to_string(),
            region_id: "region".to_string(),
            ticket_class_id: "ticketClass".to_string(),
            validity: ValidityMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ticket_data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    pub ticket_number: String,
    pub region: Option<String>,
    pub ticket_class: Option<String>,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            ticket_number: "unavailable".to_string(),
            region: None,
            ticket_class: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ticket-mirror").join("config.toml"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path().context("Could not determine config directory")?,
        };

        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let settings: Settings = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            tracing::info!(?path, "Loaded config");
            settings
        } else {
            tracing::info!(?path, "Config file not found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides()?;
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("TICKET_URL") {
            self.source.url = url;
        }
        if let Ok(interval) = std::env::var("TICKET_REFRESH_INTERVAL") {
            self.source.refresh_interval_secs = interval
                .parse()
                .context("TICKET_REFRESH_INTERVAL must be a number of seconds")?;
        }
        if let Ok(dir) = std::env::var("TICKET_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Ok(host) = std::env::var("TICKET_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TICKET_PORT") {
            self.server.port = port.parse().context("TICKET_PORT must be a port number")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.url.is_empty() {
            anyhow::bail!("source.url must be set (config file or TICKET_URL)");
        }
        if self.source.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS
            || self.source.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS
        {
            anyhow::bail!(
                "source.refresh_interval_secs must be between {} and {}, got {}",
                MIN_REFRESH_INTERVAL_SECS,
                MAX_REFRESH_INTERVAL_SECS,
                self.source.refresh_interval_secs
            );
        }
        if self.source.retry_attempts == 0 {
            anyhow::bail!("source.retry_attempts must be at least 1");
        }
        if self.source.request_timeout_secs == 0 {
            anyhow::bail!("source.request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}
