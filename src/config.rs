//! Configuration management with validation and defaults
//!
//! Values come from built-in defaults, an optional TOML file and
//! `GAMBLEPRO_*` environment overrides, in that order.

use crate::errors::{ClientResult, ConfigurationError};
use crate::games::types::GameType;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Complete client configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub games: GamesConfig,
    pub wallet: WalletConfig,
    pub logging: LoggingConfig,
}

/// Remote API settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Credential persistence
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Key-value file holding the credential token
    pub token_path: String,
    /// Fixed key the token is stored under
    pub token_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: "./.gamblepro/storage.json".to_string(),
            token_key: "token".to_string(),
        }
    }
}

/// Reveal floors and bet limits
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    pub coin_flip_reveal_ms: u64,
    pub dice_reveal_ms: u64,
    pub roulette_reveal_ms: u64,
    pub slots_reveal_ms: u64,
    pub min_bet: f64,
    /// Preset amounts offered by the bet form
    pub quick_amounts: Vec<f64>,
}

/// Shortest reveal a game may be configured with
pub fn minimum_reveal_ms(game: GameType) -> u64 {
    match game {
        GameType::Roulette => 3000,
        GameType::CoinFlip | GameType::DiceRoll | GameType::Slots => 2000,
    }
}

fn reveal_field(game: GameType) -> &'static str {
    match game {
        GameType::CoinFlip => "coin_flip",
        GameType::DiceRoll => "dice",
        GameType::Roulette => "roulette",
        GameType::Slots => "slots",
    }
}

impl GamesConfig {
    pub fn reveal_ms(&self, game: GameType) -> u64 {
        match game {
            GameType::CoinFlip => self.coin_flip_reveal_ms,
            GameType::DiceRoll => self.dice_reveal_ms,
            GameType::Roulette => self.roulette_reveal_ms,
            GameType::Slots => self.slots_reveal_ms,
        }
    }
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            coin_flip_reveal_ms: 2000,
            dice_reveal_ms: 2000,
            roulette_reveal_ms: 3000,
            slots_reveal_ms: 2000,
            min_bet: 10.0,
            quick_amounts: vec![10.0, 20.0, 50.0, 100.0, 500.0],
        }
    }
}

/// Deposit and withdrawal limits
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub min_deposit: f64,
    pub min_withdrawal: f64,
    /// Public key handed to the checkout widget
    pub checkout_key: Option<String>,
    pub merchant_name: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            min_deposit: 100.0,
            min_withdrawal: 100.0,
            checkout_key: None,
            merchant_name: "GamblePro".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: LogLevel::Info }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Default `EnvFilter` directive for this level
    pub fn filter_directive(&self) -> String {
        let level = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        format!("gamblepro={},reqwest=warn", level)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at a specific API, everything else default
    pub fn for_api(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Minimum on-screen duration before a result is revealed.
    ///
    /// Never shorter than the game's hard minimum, whatever is configured.
    pub fn reveal_floor(&self, game: GameType) -> Duration {
        Duration::from_millis(self.games.reveal_ms(game).max(minimum_reveal_ms(game)))
    }

    /// Validate configuration values
    pub fn validate(&self) -> ClientResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("api.base_url".to_string()).into());
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "api.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout cannot be zero".to_string(),
            }
            .into());
        }

        if self.session.token_key.is_empty() {
            return Err(ConfigurationError::MissingRequired("session.token_key".to_string()).into());
        }

        if !(self.games.min_bet.is_finite() && self.games.min_bet > 0.0) {
            return Err(ConfigurationError::InvalidValue {
                field: "games.min_bet".to_string(),
                value: self.games.min_bet.to_string(),
                reason: "Minimum bet must be positive".to_string(),
            }
            .into());
        }

        for game in GameType::ALL {
            let configured = self.games.reveal_ms(game);
            let minimum = minimum_reveal_ms(game);
            if configured < minimum {
                return Err(ConfigurationError::InvalidValue {
                    field: format!("games.{}_reveal_ms", reveal_field(game)),
                    value: configured.to_string(),
                    reason: format!("{} reveal cannot be shorter than {}ms", game.title(), minimum),
                }
                .into());
            }
        }

        if let Some(bad) = self.games.quick_amounts.iter().find(|a| **a < self.games.min_bet) {
            return Err(ConfigurationError::InvalidValue {
                field: "games.quick_amounts".to_string(),
                value: bad.to_string(),
                reason: "Preset amounts cannot be below the minimum bet".to_string(),
            }
            .into());
        }

        if self.wallet.min_deposit <= 0.0 || self.wallet.min_withdrawal <= 0.0 {
            return Err(ConfigurationError::ValidationFailed(
                "wallet minimums must be positive".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> ClientResult<ClientConfig> {
        let mut config = match self.config_path {
            Some(ref path) if Path::new(path).exists() => self.load_from_file(path)?,
            Some(ref path) => {
                tracing::debug!("Config file {} not found, using defaults", path);
                ClientConfig::default()
            }
            None => ClientConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> ClientResult<ClientConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into()
        })
    }

    fn apply_env_overrides(&self, config: &mut ClientConfig) -> ClientResult<()> {
        if let Ok(url) = env::var("GAMBLEPRO_API_URL") {
            config.api.base_url = url;
        }
        if let Ok(timeout) = env::var("GAMBLEPRO_API_TIMEOUT") {
            config.api.request_timeout_secs = timeout.parse().map_err(|_| {
                ConfigurationError::InvalidValue {
                    field: "GAMBLEPRO_API_TIMEOUT".to_string(),
                    value: timeout,
                    reason: "Invalid timeout value".to_string(),
                }
            })?;
        }
        if let Ok(path) = env::var("GAMBLEPRO_TOKEN_PATH") {
            config.session.token_path = path;
        }
        if let Ok(level) = env::var("GAMBLEPRO_LOG_LEVEL") {
            config.logging.level = level.parse().map_err(|reason| {
                ConfigurationError::InvalidValue {
                    field: "GAMBLEPRO_LOG_LEVEL".to_string(),
                    value: level,
                    reason,
                }
            })?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &ClientConfig, path: &str) -> ClientResult<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into()
        })
    }
}

/// Builder pattern for creating configurations
#[derive(Default)]
pub struct ConfigBuilder {
    config: ClientConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn token_path(mut self, path: impl Into<String>) -> Self {
        self.config.session.token_path = path.into();
        self
    }

    pub fn games(mut self, games: GamesConfig) -> Self {
        self.config.games = games;
        self
    }

    pub fn wallet(mut self, wallet: WalletConfig) -> Self {
        self.config.wallet = wallet;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    let config = ClientConfig::default();
    let body = toml::to_string_pretty(&config).unwrap_or_default();
    format!(
        "# GamblePro client configuration\n\
         # Environment overrides: GAMBLEPRO_API_URL, GAMBLEPRO_API_TIMEOUT,\n\
         # GAMBLEPRO_TOKEN_PATH, GAMBLEPRO_LOG_LEVEL\n\n{}",
        body
    )
}
