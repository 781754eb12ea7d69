//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from, in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable TOML file is never fatal: the service logs a
//! warning and starts with defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PRM_ROOT_FOLDER";
/// Environment variable selecting the approval backend
pub const APPROVALS_BACKEND_ENV: &str = "PRM_APPROVALS_BACKEND";
pub const HOSTAWAY_API_KEY_ENV: &str = "HOSTAWAY_API_KEY";
pub const HOSTAWAY_ACCOUNT_ID_ENV: &str = "HOSTAWAY_ACCOUNT_ID";
pub const HOSTAWAY_BASE_URL_ENV: &str = "HOSTAWAY_BASE_URL";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5730;
pub const DEFAULT_HOSTAWAY_BASE_URL: &str = "https://api.hostaway.com/v1";

const DATABASE_FILE: &str = "prm.db";
const APPROVALS_FILE: &str = "review-approvals.json";

/// Bootstrap configuration as read from the TOML file
///
/// Every field is optional so that partial files are accepted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub hostaway: HostawayConfig,

    #[serde(default)]
    pub approvals: ApprovalsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[hostaway]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HostawayConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// `[approvals]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApprovalsConfig {
    #[serde(default)]
    pub backend: ApprovalBackend,
}

/// Where review approval flags are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalBackend {
    /// `approved` column of the reviews table
    #[default]
    Database,
    /// JSON file in the root folder
    File,
}

impl fmt::Display for ApprovalBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalBackend::Database => f.write_str("database"),
            ApprovalBackend::File => f.write_str("file"),
        }
    }
}

impl FromStr for ApprovalBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "database" | "db" => Ok(ApprovalBackend::Database),
            "file" => Ok(ApprovalBackend::File),
            other => Err(Error::Config(format!("Unknown approval backend: {}", other))),
        }
    }
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        // ~/.local/share/prm, ~/Library/Application Support/prm, %LOCALAPPDATA%\prm
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("prm"))
            .unwrap_or_else(|| PathBuf::from("./prm_data"));

        Self {
            root_folder,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
        }
    }
}

/// Default config file location (`~/.config/prm/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("prm").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the config file, falling back to defaults when absent or invalid
pub fn load_toml_config_or_default(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        return TomlConfig::default();
    };

    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return TomlConfig::default();
    }

    match load_toml_config(path) {
        Ok(config) => {
            info!("Loaded config file {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            TomlConfig::default()
        }
    }
}

/// Root folder resolution: CLI, then environment, then TOML, then default
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_value = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Some(path) = env_value(ROOT_FOLDER_ENV) {
            return PathBuf::from(path);
        }

        if let Some(path) = &self.toml_value {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and names the files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn approvals_path(&self) -> PathBuf {
        self.root_folder.join(APPROVALS_FILE)
    }
}

/// Hostaway API credentials and endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostawaySettings {
    pub api_key: String,
    pub account_id: String,
    pub base_url: String,
}

impl HostawaySettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.account_id.trim().is_empty()
    }

    /// Environment overrides TOML; base URL falls back to the public API
    pub fn resolve(config: &HostawayConfig) -> Self {
        Self {
            api_key: env_value(HOSTAWAY_API_KEY_ENV)
                .or_else(|| config.api_key.clone())
                .unwrap_or_default(),
            account_id: env_value(HOSTAWAY_ACCOUNT_ID_ENV)
                .or_else(|| config.account_id.clone())
                .unwrap_or_default(),
            base_url: env_value(HOSTAWAY_BASE_URL_ENV)
                .or_else(|| config.base_url.clone())
                .unwrap_or_else(|| DEFAULT_HOSTAWAY_BASE_URL.to_string()),
        }
    }
}

impl Default for HostawaySettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            account_id: String::new(),
            base_url: DEFAULT_HOSTAWAY_BASE_URL.to_string(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub hostaway: HostawaySettings,
    pub approval_backend: ApprovalBackend,
}

impl ServiceConfig {
    pub fn resolve(cli: CliOverrides, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new()
            .with_cli_arg(cli.root_folder)
            .with_toml(toml)
            .resolve();

        let approval_backend = match env_value(APPROVALS_BACKEND_ENV) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("{}; using {}", e, toml.approvals.backend);
                toml.approvals.backend
            }),
            None => toml.approvals.backend,
        };

        Self {
            root_folder,
            host: cli.host.or_else(|| toml.host.clone()).unwrap_or(defaults.host),
            port: cli.port.or(toml.port).unwrap_or(defaults.port),
            log_level: toml.logging.level.clone(),
            hostaway: HostawaySettings::resolve(&toml.hostaway),
            approval_backend,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Non-empty environment variable value
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
