use super::{Channel, IdentityResolver, TwitchUser, UserIdentifier};
use crate::app_config::config::APP_CONFIG;
use crate::app_config::secret_string::Secret;
use crate::errors::AppError;
use crate::helper_methods::get_with_retry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

const HELIX_USER_QUERY_URL: &str = "https://api.twitch.tv/helix/users";
const QUERY_ATTEMPTS: usize = 3;
const QUERY_RETRY_WAIT: Duration = Duration::from_secs(1);

/// Resolves users and channels through the Helix `users` endpoint.
///
/// Every successful resolution is remembered in memory so repeated lookups
/// for the same identity don't query Helix again.
#[derive(Debug, Default)]
pub struct HelixResolver {
  http_client: reqwest::Client,
  resolved_users: Mutex<HashMap<i64, TwitchUser>>,
}

impl HelixResolver {
  pub fn new() -> Self {
    Self::default()
  }

  fn cached_by_id(&self, twitch_id: i64) -> Option<TwitchUser> {
    self.resolved_users.lock().unwrap().get(&twitch_id).cloned()
  }

  fn cached_by_login(&self, login_name: &str) -> Option<TwitchUser> {
    self
      .resolved_users
      .lock()
      .unwrap()
      .values()
      .find(|user| user.login_name == login_name)
      .cloned()
  }

  fn remember(&self, user: &TwitchUser) {
    self
      .resolved_users
      .lock()
      .unwrap()
      .insert(user.twitch_id, user.clone());
  }

  /// Queries Helix for every identity passed in.
  ///
  /// Identities Helix doesn't know are missing from the result, not errors.
  async fn query_helix_users<S: AsRef<str>>(
    &self,
    identifiers: &[UserIdentifier<S>],
  ) -> Result<Vec<TwitchUser>, AppError> {
    let mut query_url = Url::parse(HELIX_USER_QUERY_URL)?;

    {
      let mut query_pairs = query_url.query_pairs_mut();

      for identifier in identifiers {
        match identifier {
          UserIdentifier::Login(login_name) => {
            query_pairs.append_pair("login", login_name.as_ref());
          }
          UserIdentifier::TwitchID(twitch_id) => {
            query_pairs.append_pair("id", twitch_id.as_ref());
          }
        }
      }
    }

    let request = self
      .http_client
      .get(query_url)
      .header(
        "Authorization",
        format!(
          "Bearer {}",
          Secret::read_secret_string(APP_CONFIG.access_token().read_value())
        ),
      )
      .header(
        "Client-Id",
        Secret::read_secret_string(APP_CONFIG.client_id().read_value()),
      );

    let response = get_with_retry(request, QUERY_ATTEMPTS, QUERY_RETRY_WAIT).await?;
    let response_body = response.text().await?;

    let Value::Object(response_value) = serde_json::from_str::<Value>(&response_body)? else {
      return Err(AppError::UnknownResponseBody("helix user query"));
    };
    let Some(Value::Array(user_list)) = response_value.get("data") else {
      return Err(AppError::UnknownResponseBody("helix user query data list"));
    };

    let mut resolved_users = vec![];

    for user_entry in user_list {
      let Value::Object(user_entry) = user_entry else {
        continue;
      };

      let Some(Value::String(login_name)) = user_entry.get("login") else {
        tracing::error!("Unknown user entry in a helix response: {:?}", user_entry);
        continue;
      };
      let Some(Value::String(display_name)) = user_entry.get("display_name") else {
        continue;
      };
      let Some(Value::String(twitch_id)) = user_entry.get("id") else {
        continue;
      };
      let Ok(twitch_id) = twitch_id.parse::<i64>() else {
        return Err(AppError::FailedToParseValue {
          value_name: "twitch user id",
          location: "query helix users",
          value: twitch_id.to_owned(),
        });
      };

      let user = TwitchUser {
        twitch_id,
        login_name: login_name.to_owned(),
        display_name: display_name.to_owned(),
      };

      self.remember(&user);
      resolved_users.push(user);
    }

    Ok(resolved_users)
  }

  async fn lookup_by_login(&self, login_name: &str) -> Result<Option<TwitchUser>, AppError> {
    if let Some(user) = self.cached_by_login(login_name) {
      return Ok(Some(user));
    }

    let resolved = self
      .query_helix_users(&[UserIdentifier::Login(login_name)])
      .await?;

    Ok(resolved.into_iter().next())
  }

  async fn lookup_by_id(&self, twitch_id: i64) -> Result<Option<TwitchUser>, AppError> {
    if let Some(user) = self.cached_by_id(twitch_id) {
      return Ok(Some(user));
    }

    let resolved = self
      .query_helix_users(&[UserIdentifier::TwitchID(twitch_id.to_string())])
      .await?;

    Ok(resolved.into_iter().next())
  }
}

impl IdentityResolver for HelixResolver {
  async fn user_id_by_login(&self, login_name: &str) -> Result<Option<i64>, AppError> {
    Ok(
      self
        .lookup_by_login(login_name)
        .await?
        .map(|user| user.twitch_id),
    )
  }

  async fn user_by_id(&self, twitch_id: i64) -> Result<Option<TwitchUser>, AppError> {
    self.lookup_by_id(twitch_id).await
  }

  async fn user_by_login(&self, login_name: &str) -> Result<Option<TwitchUser>, AppError> {
    self.lookup_by_login(login_name).await
  }

  async fn channel_by_id(&self, twitch_id: i64) -> Result<Channel, AppError> {
    let Some(user) = self.lookup_by_id(twitch_id).await? else {
      return Err(AppError::ChannelDoesNotExist(twitch_id));
    };

    Ok(Channel {
      twitch_id: user.twitch_id,
      login_name: user.login_name,
      display_name: user.display_name,
    })
  }
}
