use crate::app_config::log_level_wrapper::LoggingConfigLevel;
use crate::app_config::rolling_appender_rotation::RollingAppenderRotation;
use crate::app_config::secret_string::Secret;
use lazy_static::lazy_static;
use schematic::{Config, ConfigLoader};
use std::path::PathBuf;

const CONFIG_PATH_ENV_VAR: &str = "CONFIG_PATH";
const DEFAULT_CONFIG_FILEPATH: &str = "./config/config.yml";

lazy_static! {
  pub static ref APP_CONFIG: AppConfig = AppConfig::new().unwrap();
}

#[derive(Debug, Config, serde::Serialize, serde::Deserialize)]
pub struct AppConfig {
  log_level: LoggingConfigLevel,
  logging_dir: Option<PathBuf>,
  #[setting(default = "")]
  logging_filename_prefix: String,
  #[setting(default = "daily")]
  logging_roll_appender: RollingAppenderRotation,

  #[setting(extend, merge = append_vec, validate = min_length(1), validate = max_length(100))]
  channels: Vec<String>,

  #[setting(required, env = "TWITCH_NICKNAME")]
  twitch_nickname: Option<String>,
  #[setting(required, env = "TWITCH_ACCESS_TOKEN")]
  access_token: Option<Secret>,
  #[setting(required, env = "TWITCH_CLIENT_ID")]
  client_id: Option<Secret>,

  /// How long a repeated subscription notification for the same subscriber
  /// and streak is suppressed, in seconds.
  #[setting(default = 300)]
  subscription_dedup_ttl_seconds: u64,
}

impl AppConfig {
  fn new() -> anyhow::Result<Self> {
    let config = ConfigLoader::<AppConfig>::new()
      .file_optional(get_config_path())
      .unwrap()
      .load()?
      .config;

    Ok(config)
  }

  pub fn log_level(&self) -> &LoggingConfigLevel {
    &self.log_level
  }

  pub fn logging_dir(&self) -> Option<&PathBuf> {
    self.logging_dir.as_ref()
  }

  pub fn logging_filename_prefix(&self) -> &str {
    &self.logging_filename_prefix
  }

  pub fn logging_file_roll_appender(&self) -> &RollingAppenderRotation {
    &self.logging_roll_appender
  }

  pub fn channels(&self) -> &Vec<String> {
    &self.channels
  }

  pub fn twitch_nickname(&self) -> &str {
    self.twitch_nickname.as_ref().unwrap()
  }

  pub fn access_token(&self) -> &Secret {
    self.access_token.as_ref().unwrap()
  }

  pub fn client_id(&self) -> &Secret {
    self.client_id.as_ref().unwrap()
  }

  pub fn subscription_dedup_ttl_seconds(&self) -> u64 {
    self.subscription_dedup_ttl_seconds
  }
}

fn get_config_path() -> PathBuf {
  let Some((_, config_path)) = std::env::vars().find(|(key, _)| key == CONFIG_PATH_ENV_VAR) else {
    return PathBuf::from(DEFAULT_CONFIG_FILEPATH);
  };

  PathBuf::from(config_path)
}
