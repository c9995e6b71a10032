use crate::errors::AppError;

pub mod helix;

/// A chat participant with a fully resolved Twitch identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitchUser {
  pub twitch_id: i64,
  pub login_name: String,
  pub display_name: String,
}

/// The channel a line was received for. Resolved once per line and cloned
/// into every event emitted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
  pub twitch_id: i64,
  pub login_name: String,
  pub display_name: String,
}

#[derive(Debug, Clone)]
pub enum UserIdentifier<S: AsRef<str>> {
  Login(S),
  TwitchID(S),
}

impl<'a> From<UserIdentifier<&'a str>> for &'a str {
  fn from(value: UserIdentifier<&'a str>) -> Self {
    match value {
      UserIdentifier::Login(s) => s,
      UserIdentifier::TwitchID(s) => s,
    }
  }
}

/// Identity resolution consumed by the message handler.
///
/// A lookup miss is a soft failure and comes back as `Ok(None)`; only
/// transport or response-shape problems surface as errors.
pub trait IdentityResolver: Send + Sync {
  async fn user_id_by_login(&self, login_name: &str) -> Result<Option<i64>, AppError>;

  async fn user_by_id(&self, twitch_id: i64) -> Result<Option<TwitchUser>, AppError>;

  async fn user_by_login(&self, login_name: &str) -> Result<Option<TwitchUser>, AppError>;

  /// Channel profiles are expected to exist once an id for them is known.
  async fn channel_by_id(&self, twitch_id: i64) -> Result<Channel, AppError>;
}
