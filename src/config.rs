//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\vinyl-scanner\config.toml
//! - macOS: ~/Library/Application Support/vinyl-scanner/config.toml
//! - Linux: ~/.config/vinyl-scanner/config.toml
//!
//! The config file is human-readable and editable. Settings are loaded at
//! startup; credentials can be overridden from the command line or the
//! `DISCOGS_TOKEN` / `LASTFM_API_KEY` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::{ImageQualityGate, ReadinessPolicy};
use crate::enrichment::{HttpSettings, SearchFilters, discogs, http, lastfm};
use crate::recognition::CropBox;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Photo capture and readiness polling
    pub capture: CaptureConfig,

    /// Darkness check before identification
    pub quality: QualityConfig,

    /// Recognition engine selection
    pub recognition: RecognitionConfig,

    /// Discogs catalog search
    pub catalog: CatalogConfig,

    /// Last.fm recommendations
    pub recommendations: RecommendationsConfig,

    /// Shared HTTP transport
    pub http: HttpConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Discogs personal access token
    pub discogs_token: Option<String>,

    /// Last.fm API key (get one at https://www.last.fm/api/account/create)
    pub lastfm_api_key: Option<String>,
}

impl Credentials {
    /// Replace stored credentials with any that were given explicitly.
    pub fn override_with(&mut self, discogs_token: Option<&str>, lastfm_api_key: Option<&str>) {
        if let Some(token) = discogs_token.filter(|t| !t.is_empty()) {
            self.discogs_token = Some(token.to_string());
        }
        if let Some(key) = lastfm_api_key.filter(|k| !k.is_empty()) {
            self.lastfm_api_key = Some(key.to_string());
        }
    }
}

/// Capture and readiness settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Where captured photos are written (None = use the photo in place)
    pub capture_dir: Option<PathBuf>,

    /// Delay between size samples while the file is incomplete
    pub poll_interval_ms: u64,

    /// Samples before giving up with "file not ready"
    pub max_attempts: u32,

    /// Delay between the two samples that must agree
    pub settle_delay_ms: u64,

    /// Smallest file size accepted as a complete photo
    pub min_size_bytes: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let policy = ReadinessPolicy::default();
        Self {
            capture_dir: None,
            poll_interval_ms: policy.interval.as_millis() as u64,
            max_attempts: policy.max_attempts,
            settle_delay_ms: policy.settle_delay.as_millis() as u64,
            min_size_bytes: policy.min_size,
        }
    }
}

impl CaptureConfig {
    pub fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_attempts.max(1),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            min_size: self.min_size_bytes,
        }
    }
}

/// Quality gate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub thumbnail_size: u32,
    pub sample_points: usize,
    /// Average brightness (0-255) below which a photo is "too dark"
    pub min_brightness: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        let gate = ImageQualityGate::default();
        Self {
            thumbnail_size: gate.thumbnail_size,
            sample_points: gate.sample_points,
            min_brightness: gate.min_brightness,
        }
    }
}

impl QualityConfig {
    pub fn gate(&self) -> ImageQualityGate {
        ImageQualityGate {
            thumbnail_size: self.thumbnail_size.max(1),
            sample_points: self.sample_points.max(1),
            min_brightness: self.min_brightness,
        }
    }
}

/// Which engine variant identifies albums
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Run a local command per photo
    #[default]
    Subprocess,
    /// POST the photo to an HTTP endpoint
    Remote,
}

/// Recognition engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub engine: EngineKind,

    /// Program for the subprocess engine
    pub command: PathBuf,

    /// Arguments placed before `<image> <x1> <y1> <x2> <y2>`
    pub args: Vec<String>,

    /// Endpoint for the remote engine
    pub remote_url: Option<String>,

    pub timeout_secs: u64,

    /// Crop box `[x1, y1, x2, y2]`; all zeros uses the full image
    pub crop: [u32; 4],
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Subprocess,
            command: PathBuf::from("python3"),
            args: vec!["predict_from_image.py".to_string()],
            remote_url: None,
            timeout_secs: 60,
            crop: [0; 4],
        }
    }
}

impl RecognitionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn crop_box(&self) -> CropBox {
        let [x1, y1, x2, y2] = self.crop;
        CropBox::new(x1, y1, x2, y2)
    }
}

/// Catalog search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Physical format filter (None = any format)
    pub format: Option<String>,
    pub per_page: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let filters = SearchFilters::default();
        Self {
            base_url: discogs::DEFAULT_BASE_URL.to_string(),
            format: filters.format,
            per_page: filters.per_page,
        }
    }
}

impl CatalogConfig {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            format: self.format.clone().filter(|f| !f.is_empty()),
            per_page: self.per_page.clamp(1, 100),
            ..SearchFilters::default()
        }
    }
}

/// Recommendation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationsConfig {
    pub base_url: String,
    pub similar_limit: u32,
    pub top_tracks_limit: u32,
    /// Bound on each of the three enrichment calls
    pub call_timeout_secs: u64,
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            base_url: lastfm::DEFAULT_BASE_URL.to_string(),
            similar_limit: 10,
            top_tracks_limit: 5,
            call_timeout_secs: 30,
        }
    }
}

impl RecommendationsConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Custom User-Agent (Discogs requires one; the default identifies this app)
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| http::USER_AGENT.to_string()),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vinyl-scanner"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Remote recognition engine selected but no remote_url is set")]
    MissingRemoteUrl,
}

// ============================================================================
// Tests
// ============================================================================
