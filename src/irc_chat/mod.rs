use crate::app_config::config::APP_CONFIG;
use crate::app_config::secret_string::Secret;
use crate::errors::AppError;
use crate::events::EventDispatcher;
use crate::users::IdentityResolver;
use irc::client::prelude::*;
use irc::client::ClientStream;
use irc::proto::CapSubCommand;
use message_handler::{sender_nick_from_prefix, MessageHandler};
use std::time::Duration;
use tokio::time::timeout;
use tokio_stream::StreamExt;

pub mod legacy_subscription;
pub mod message_handler;
pub mod permissions;
pub mod room_state;
pub mod sub_tier;
pub mod subscription_history;
pub mod tags;
pub mod whisper;

/// Outbound writes on the active connection. The handler only ever uses
/// this to answer keep-alive pings.
pub trait RawLineSink: Send + Sync {
  fn send_raw_line(&self, line: &str) -> Result<(), AppError>;
}

impl RawLineSink for Sender {
  fn send_raw_line(&self, line: &str) -> Result<(), AppError> {
    self
      .send(Command::Raw(line.to_string(), vec![]))
      .map_err(Into::into)
  }
}

/// The IRC connection to Twitch chat, feeding every received line into a
/// [`MessageHandler`].
pub struct TwitchIrc<Resolver, Dispatcher> {
  irc_client: Option<Client>,
  irc_client_stream: Option<ClientStream>,
  message_handler: MessageHandler<Resolver, Dispatcher, Sender>,
}

impl<Resolver, Dispatcher> TwitchIrc<Resolver, Dispatcher>
where
  Resolver: IdentityResolver,
  Dispatcher: EventDispatcher,
{
  pub async fn new(resolver: Resolver, dispatcher: Dispatcher) -> Result<Self, AppError> {
    tracing::info!("Initializing the Twitch IRC client.");
    let mut irc_client = Self::get_irc_client().await?;
    let irc_client_stream = irc_client.stream()?;
    let message_handler = MessageHandler::new(
      resolver,
      dispatcher,
      irc_client.sender(),
      Duration::from_secs(APP_CONFIG.subscription_dedup_ttl_seconds()),
    );

    Ok(Self {
      irc_client: Some(irc_client),
      irc_client_stream: Some(irc_client_stream),
      message_handler,
    })
  }

  pub async fn reconnect(&mut self) -> Result<(), AppError> {
    tracing::warn!("Reconnecting the IRC client.");

    self.irc_client_stream = None;
    self.irc_client = None;

    let mut irc_client = Self::get_irc_client().await?;
    let irc_client_stream = irc_client.stream()?;

    self.message_handler.set_outbound(irc_client.sender());
    self.irc_client = Some(irc_client);
    self.irc_client_stream = Some(irc_client_stream);

    Ok(())
  }

  async fn get_irc_client() -> Result<Client, AppError> {
    let config = Self::get_config()?;
    let irc_client = Client::from_config(config).await?;
    irc_client.identify()?;

    irc_client.send(Command::CAP(
      None,
      CapSubCommand::REQ,
      Some("twitch.tv/tags twitch.tv/commands twitch.tv/membership".to_string()),
      None,
    ))?;

    Ok(irc_client)
  }

  fn get_config() -> Result<Config, AppError> {
    let password = APP_CONFIG.access_token().read_value();
    let password = Some("oauth:".to_string() + Secret::read_secret_string(password));

    Ok(Config {
      server: Some("irc.chat.twitch.tv".to_string()),
      nickname: Some(APP_CONFIG.twitch_nickname().to_owned()),
      port: Some(6697),
      password,
      use_tls: Some(true),
      channels: Self::get_channels(),
      ping_timeout: Some(20),
      ping_time: Some(60),
      ..Default::default()
    })
  }

  fn get_channels() -> Vec<String> {
    APP_CONFIG
      .channels()
      .iter()
      .map(|channel_name| {
        if !channel_name.starts_with("#") {
          format!("#{channel_name}")
        } else {
          channel_name.to_string()
        }
      })
      .collect()
  }

  fn get_mut_client_stream(&mut self) -> Result<&mut ClientStream, AppError> {
    self
      .irc_client_stream
      .as_mut()
      .ok_or(AppError::FailedToGetIrcClientStream)
  }

  /// Waits for the next message from the chat server and hands it to the
  /// message handler. If nothing arrives within 10 seconds the call returns
  /// without doing anything.
  pub async fn next_message(&mut self) -> Result<(), AppError> {
    let message_result = timeout(
      Duration::from_secs(10),
      self.get_mut_client_stream()?.next(),
    )
    .await;
    let Ok(Some(message_result)) = message_result else {
      tracing::debug!("Did not receive a message.");

      return Ok(());
    };
    let message = message_result?;

    match &message.command {
      Command::JOIN(_, _, _) | Command::PART(_, _) => return Ok(()),
      Command::Response(_, _) => return Ok(()),
      Command::CAP(_, _, _, _) => return Ok(()),
      Command::PONG(_, _) => return Ok(()),
      Command::Raw(command_name, _) if command_name == "USERSTATE" => return Ok(()),
      _ => (),
    }

    self.message_handler.handle_message(&message).await?;

    // The transport surfaces channel messages a second time as structured
    // events on top of the raw line.
    if let Command::PRIVMSG(message_target, message_contents) = &message.command {
      if message_target.starts_with('#') {
        if let Some(sender_nick) = sender_nick_from_prefix(&message.prefix) {
          self
            .message_handler
            .handle_channel_message(message_target, &sender_nick, message_contents, &message)
            .await?;
        }
      }
    }

    Ok(())
  }
}
