//! The configuration structs used to build the AppConfig, and their impls.
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub klaviyo_config: KlaviyoConfig,
    #[serde(default)]
    pub cors_config: CorsConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

/// Everything needed to talk to the Klaviyo API.
/// `api_key` and `list_id` have no defaults in the config files and are expected
/// to come from the environment.
#[derive(Deserialize, Clone, Debug)]
pub struct KlaviyoConfig {
    pub api_base_url: String,
    pub api_key: SecretString,
    pub list_id: String,
    pub revision: String,
    pub custom_source: String,
    pub timeout_millis: u64,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CorsConfig {
    #[serde(default, deserialize_with = "deserialize_origins")]
    pub allowed_origins: Vec<String>,
    /// Answer requests carrying a non-allowed `Origin` with a 403 instead of
    /// just leaving out the `Access-Control-Allow-Origin` header.
    #[serde(default)]
    pub reject_unknown_origins: bool,
}

// ###################################
// ->   IMPLs
// ###################################
impl AppConfig {
    pub(super) fn validate(&self) -> ConfigResult<()> {
        if self.klaviyo_config.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingValue("klaviyo_config.api_key"));
        }
        if self.klaviyo_config.list_id.trim().is_empty() {
            return Err(ConfigError::MissingValue("klaviyo_config.list_id"));
        }
        Ok(())
    }
}

impl KlaviyoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

/// Accepts either a list of origins or a single comma separated string,
/// the latter being easier to pass through an environment variable.
/// A trailing `/` is dropped since browsers never send one in the `Origin` header.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origins {
        List(Vec<String>),
        Csv(String),
    }

    let origins = match Origins::deserialize(deserializer)? {
        Origins::List(list) => list,
        Origins::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(origins
        .iter()
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect())
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}
