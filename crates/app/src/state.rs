use std::fs;
use std::path::{Path, PathBuf};

use common::prelude::{Identity, MessengerConfig, Network, SecretKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

pub const APP_NAME: &str = "sahara";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const PEM_HEADER: &str = "-----BEGIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Operator-owned file holding the private scalar, as PEM or hex.
    /// Only its path is recorded here; sahara never writes to it.
    pub key_file: PathBuf,
    /// Network whose base58check prefix our public key is shown with
    #[serde(default)]
    pub network: Network,
    /// Default tracing level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fee rate requested when the node builds a message transaction
    #[serde(default = "default_min_fee_rate")]
    pub min_fee_rate_nanos_per_kb: u64,
    /// Number of messages requested per fetch
    #[serde(default = "default_num_to_fetch")]
    pub num_to_fetch: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_min_fee_rate() -> u64 {
    MessengerConfig::default().min_fee_rate_nanos_per_kb
}

fn default_num_to_fetch() -> u64 {
    MessengerConfig::default().num_to_fetch
}

impl AppConfig {
    /// Default settings reading the key from `key_file`
    pub fn new(key_file: PathBuf) -> Self {
        Self {
            key_file,
            network: Network::default(),
            log_level: default_log_level(),
            min_fee_rate_nanos_per_kb: default_min_fee_rate(),
            num_to_fetch: default_num_to_fetch(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the sahara directory (~/.sahara)
    pub sahara_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the sahara directory path (custom or default ~/.sahara)
    pub fn sahara_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new sahara directory pointing at the operator's key file
    ///
    /// The key file must already exist and parse. Only its absolute path is written,
    /// never its contents.
    pub fn init(custom_path: Option<PathBuf>, mut config: AppConfig) -> Result<Self, StateError> {
        let sahara_dir = Self::sahara_dir(custom_path)?;

        if sahara_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        config.key_file = fs::canonicalize(&config.key_file)
            .map_err(|_| StateError::MissingFile(config.key_file.display().to_string()))?;
        read_key_file(&config.key_file)?;

        fs::create_dir_all(&sahara_dir)?;

        let config_path = sahara_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        tracing::debug!(path = %sahara_dir.display(), "initialized sahara directory");

        Ok(Self {
            sahara_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the sahara directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let sahara_dir = Self::sahara_dir(custom_path)?;

        if !sahara_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = sahara_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            sahara_dir,
            config_path,
            config,
        })
    }

    /// Read the secret key from the operator's key file
    pub fn load_key(&self) -> Result<SecretKey, StateError> {
        read_key_file(&self.config.key_file)
    }

    /// Our key on the configured network
    pub fn identity(&self) -> Result<Identity, StateError> {
        Ok(Identity::new(self.load_key()?, self.config.network))
    }
}

fn read_key_file(path: &Path) -> Result<SecretKey, StateError> {
    if !path.exists() {
        return Err(StateError::MissingFile(path.display().to_string()));
    }
    let contents = Zeroizing::new(fs::read_to_string(path)?);
    let parsed = if contents.trim_start().starts_with(PEM_HEADER) {
        SecretKey::from_pem(&contents)
    } else {
        SecretKey::from_hex(&contents)
    };
    parsed.map_err(|e| StateError::InvalidKey(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("sahara directory not initialized. Run 'sahara init' first")]
    NotInitialized,

    #[error("sahara directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
