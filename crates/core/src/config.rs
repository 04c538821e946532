use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::format::DisplayFormat;

/// Default config file looked up by [`ClientConfig::load`] when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/savings_wallet.toml";

/// Environment variable prefix, e.g. `SAVINGS_WALLET_API_BASE_URL`.
pub const ENV_PREFIX: &str = "SAVINGS_WALLET";

/// Host-level settings for the client core.
///
/// Unlike [`crate::models::session::Session`] this is not user state: it is
/// read once at startup from a TOML file and the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin; `/rest/v1` is appended by the API client.
    pub api_base_url: String,

    /// IANA zone used to render transaction timestamps.
    pub display_timezone: String,

    /// Prefix for money columns and labels.
    pub currency_symbol: String,

    /// How many entries the "recent transactions" list shows.
    pub recent_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            display_timezone: "Asia/Manila".to_string(),
            currency_symbol: "₱".to_string(),
            recent_limit: 5,
        }
    }
}

impl ClientConfig {
    /// Layer defaults ← optional TOML file ← `SAVINGS_WALLET_*` environment,
    /// then validate.
    pub fn load(path: Option<&str>) -> Result<Self, CoreError> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let settings: ClientConfig = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        tracing::debug!(
            api_base_url = %settings.api_base_url,
            timezone = %settings.display_timezone,
            "loaded client config"
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            CoreError::Config(format!("invalid api_base_url '{}': {e}", self.api_base_url))
        })?;
        self.timezone()?;
        if self.currency_symbol.trim().is_empty() {
            return Err(CoreError::Config("currency_symbol must not be empty".into()));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, CoreError> {
        self.display_timezone.parse::<Tz>().map_err(|_| {
            CoreError::Config(format!("unknown timezone '{}'", self.display_timezone))
        })
    }

    /// Rendering settings derived from this config.
    pub fn display_format(&self) -> Result<DisplayFormat, CoreError> {
        Ok(DisplayFormat::new(self.timezone()?, self.currency_symbol.clone()))
    }
}
