#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("An error occurred when initializing the config: `{}`", .0)]
  ConfigError(#[from] schematic::ConfigError),

  #[error("{}", .0)]
  UrlParseError(#[from] url::ParseError),

  #[error("{}", .0)]
  ReqwestError(#[from] reqwest::Error),

  #[error("{}", .0)]
  SerdeError(#[from] serde_json::Error),

  #[error("Failed to configure the IRC client. Reason: `{:?}`", .0)]
  IrcError(#[from] irc::error::Error),

  #[error("Login authentication failed for the configured account.")]
  LoginAuthenticationFailed,

  #[error(
    "Failed to get a response from {} after {} attempts.",
    request,
    attempts
  )]
  RanOutOfGetRequestAttempts { request: String, attempts: usize },

  #[error("Attempted to repeat a GET request for a request that could not be cloned. Request: `{}`", .0)]
  RequestCouldNotBeCloned(String),

  #[error("Received an unknown response body structure when querying. Body location: {:?}", .0)]
  UnknownResponseBody(&'static str),

  #[error("Failed to query helix data for the channel with id {:?}", .0)]
  ChannelDoesNotExist(i64),

  #[error("Failed to parse the value {:?} for {} at {}.", value, value_name, location)]
  FailedToParseValue {
    value_name: &'static str,
    location: &'static str,
    value: String,
  },

  #[error("Attempted to get the IRC client stream where there wasn't one.")]
  FailedToGetIrcClientStream,

  #[error("Attempted to get the IRC client where there wasn't one.")]
  FailedToGetIrcClient,
}
