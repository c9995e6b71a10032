use super::legacy_subscription::parse_legacy_subscription;
use super::permissions::{permissions_from_tags, CommandPermission};
use super::room_state::{RoomState, RoomStateTracker};
use super::sub_tier::SubTier;
use super::subscription_history::SubscriptionHistory;
use super::tags::{tag_map_from_message, Tag, TagMap};
use super::whisper::parse_whisper;
use super::RawLineSink;
use crate::errors::AppError;
use crate::events::{Cheer, Event, EventDispatcher, Subscription};
use crate::users::{Channel, IdentityResolver, TwitchUser};
use chrono::Utc;
use irc::proto::{Command, Message as IrcMessage, Prefix};
use std::collections::HashSet;
use std::time::Duration;

const KEEPALIVE_PONG_LINE: &str = "PONG :tmi.twitch.tv";
const AUTHENTICATION_FAILED_NOTICE: &str = "Login authentication failed";

/// The commands that arrive as raw lines and carry their channel in the
/// first positional parameter.
const ROUTED_RAW_COMMANDS: &[&str] = &[
  "WHISPER",
  "USERNOTICE",
  "CLEARCHAT",
  "HOSTTARGET",
  "ROOMSTATE",
];

/// Turns every inbound chat line into zero or more domain events.
///
/// This is the only place in the crate that holds state across lines: the
/// subscription history and the per-channel room states. Everything else is
/// recomputed per line from its tags.
pub struct MessageHandler<Resolver, Dispatcher, Sink> {
  resolver: Resolver,
  dispatcher: Dispatcher,
  outbound: Sink,
  subscription_history: SubscriptionHistory,
  room_states: RoomStateTracker,
}

impl<Resolver, Dispatcher, Sink> MessageHandler<Resolver, Dispatcher, Sink>
where
  Resolver: IdentityResolver,
  Dispatcher: EventDispatcher,
  Sink: RawLineSink,
{
  pub fn new(
    resolver: Resolver,
    dispatcher: Dispatcher,
    outbound: Sink,
    dedup_time_to_live: Duration,
  ) -> Self {
    Self {
      resolver,
      dispatcher,
      outbound,
      subscription_history: SubscriptionHistory::new(dedup_time_to_live),
      room_states: RoomStateTracker::new(),
    }
  }

  /// Swaps the outbound writer, used after the transport reconnects.
  pub fn set_outbound(&mut self, outbound: Sink) {
    self.outbound = outbound;
  }

  pub fn room_state_for(&self, channel_twitch_id: i64) -> Option<RoomState> {
    self.room_states.state_for(channel_twitch_id)
  }

  /// Handles one raw line from the chat server.
  ///
  /// Anything that goes wrong inside a line is logged and swallowed so the
  /// next line is unaffected. The only error that escapes is
  /// [`AppError::LoginAuthenticationFailed`], which ends the connection
  /// attempt.
  pub async fn handle_message(&self, message: &IrcMessage) -> Result<(), AppError> {
    if matches!(message.command, Command::PING(..)) {
      self.outbound.send_raw_line(KEEPALIVE_PONG_LINE)?;
      tracing::debug!("Answered a keep-alive ping from the chat server.");

      return Ok(());
    }

    if let Command::NOTICE(notice_target, notice_contents) = &message.command {
      if notice_target == "*" && notice_contents == AUTHENTICATION_FAILED_NOTICE {
        tracing::error!("Login authentication failed.");

        return Err(AppError::LoginAuthenticationFailed);
      }
    }

    let Some((command_name, parameters)) = routed_parts(&message.command) else {
      return Ok(());
    };
    let Some(first_parameter) = parameters.first() else {
      return Ok(());
    };

    let channel_login = first_parameter.replace('#', "");
    let Some(channel) = self.resolve_channel(&channel_login).await? else {
      tracing::error!(
        "Got a {} line for an unknown channel: {:?}",
        command_name,
        channel_login
      );

      return Ok(());
    };

    let tags = tag_map_from_message(message);

    if tags.contains_key(Tag::BAN_REASON) {
      self.handle_moderation(&channel, &tags).await?;
    }

    match command_name {
      "WHISPER" => self.handle_whisper(&tags, message).await,
      "PRIVMSG" => self.handle_privmsg(&channel, &tags, message, &parameters).await,
      "USERNOTICE" => self.handle_user_notice(&channel, &tags, &parameters).await,
      "NOTICE" => {
        self.handle_notice(&channel, &tags);

        Ok(())
      }
      "ROOMSTATE" => {
        self.handle_room_state(&channel, &tags);

        Ok(())
      }
      _ => Ok(()),
    }
  }

  /// Handles one structured channel message from the transport.
  ///
  /// The sender is built straight from the line's tags and nick instead of
  /// being resolved externally; without a user id no identity or permission
  /// can be established and the message is dropped.
  pub async fn handle_channel_message(
    &self,
    channel_name: &str,
    sender_nick: &str,
    message_contents: &str,
    source_line: &IrcMessage,
  ) -> Result<(), AppError> {
    let tags = tag_map_from_message(source_line);

    let Some(sender_twitch_id) = tags.get(Tag::USER_ID) else {
      tracing::debug!(
        "Dropped a channel message without a user id from {:?}.",
        sender_nick
      );

      return Ok(());
    };
    let Ok(sender_twitch_id) = sender_twitch_id.trim().parse::<i64>() else {
      tracing::debug!("Failed to parse a sender user id: {:?}", sender_twitch_id);

      return Ok(());
    };

    let channel_login = channel_name.replace('#', "");
    let Some(channel) = self.resolve_channel(&channel_login).await? else {
      tracing::error!(
        "Got a channel message for an unknown channel: {:?}",
        channel_login
      );

      return Ok(());
    };

    let user = TwitchUser {
      twitch_id: sender_twitch_id,
      login_name: sender_nick.to_lowercase(),
      display_name: tags
        .get(Tag::DISPLAY_NAME)
        .cloned()
        .unwrap_or_else(|| sender_nick.to_string()),
    };
    let permissions = permissions_from_tags(&tags);

    self.dispatcher.dispatch(Event::ChannelMessage {
      channel,
      user,
      message: message_contents.to_string(),
      permissions,
    });

    Ok(())
  }

  async fn resolve_channel(&self, channel_login: &str) -> Result<Option<Channel>, AppError> {
    let Some(channel_twitch_id) = self.resolver.user_id_by_login(channel_login).await? else {
      return Ok(None);
    };

    self
      .resolver
      .channel_by_id(channel_twitch_id)
      .await
      .map(Some)
  }

  async fn handle_moderation(&self, channel: &Channel, tags: &TagMap) -> Result<(), AppError> {
    let Some(ban_reason) = tags.get(Tag::BAN_REASON) else {
      return Ok(());
    };
    let Some(target_user_id) = tags.get(Tag::TARGET_USER_ID) else {
      tracing::debug!("Got a moderation line without a target user id.");

      return Ok(());
    };
    let Ok(target_user_id) = target_user_id.trim().parse::<i64>() else {
      tracing::debug!(
        "Failed to parse a moderation target user id: {:?}",
        target_user_id
      );

      return Ok(());
    };
    let Some(target_user) = self.resolver.user_by_id(target_user_id).await? else {
      return Ok(());
    };

    if let Some(ban_duration) = tags.get(Tag::BAN_DURATION) {
      let Ok(duration_seconds) = ban_duration.trim().parse::<u32>() else {
        tracing::debug!("Failed to parse a timeout duration: {:?}", ban_duration);

        return Ok(());
      };

      self.dispatcher.dispatch(Event::UserTimeout {
        channel: channel.clone(),
        user: target_user,
        duration_seconds,
        reason: ban_reason.clone(),
      });
    } else {
      self.dispatcher.dispatch(Event::UserBan {
        channel: channel.clone(),
        user: target_user,
        reason: ban_reason.clone(),
      });
    }

    Ok(())
  }

  async fn handle_whisper(&self, tags: &TagMap, message: &IrcMessage) -> Result<(), AppError> {
    let raw_line = message.to_string();
    let Some(contents) = parse_whisper(raw_line.trim_end()) else {
      return Ok(());
    };

    let Some(sender_twitch_id) = tags.get(Tag::USER_ID) else {
      tracing::debug!("Got a whisper without a sender user id.");

      return Ok(());
    };
    let Ok(sender_twitch_id) = sender_twitch_id.trim().parse::<i64>() else {
      tracing::debug!("Failed to parse a whisper sender id: {:?}", sender_twitch_id);

      return Ok(());
    };

    let Some(sender) = self.resolver.user_by_id(sender_twitch_id).await? else {
      return Ok(());
    };
    let Some(recipient) = self.resolver.user_by_login(&contents.recipient).await? else {
      return Ok(());
    };

    // Whispers carry no badge or subscriber context.
    let permissions = HashSet::from([CommandPermission::Everyone]);

    self.dispatcher.dispatch(Event::PrivateMessage {
      sender,
      recipient,
      message: contents.message,
      permissions,
    });

    Ok(())
  }

  async fn handle_privmsg(
    &self,
    channel: &Channel,
    tags: &TagMap,
    message: &IrcMessage,
    parameters: &[&str],
  ) -> Result<(), AppError> {
    let raw_line = message.to_string();

    if let Some(notice) = parse_legacy_subscription(raw_line.trim_end()) {
      let Some(subscriber_twitch_id) = self.resolver.user_id_by_login(&notice.username).await?
      else {
        tracing::warn!(
          "Could not resolve the subscriber {:?} from a legacy notification.",
          notice.username
        );

        return Ok(());
      };

      return self
        .announce_subscription(
          subscriber_twitch_id,
          channel,
          notice.streak,
          notice.is_prime,
          None,
          notice.tier,
        )
        .await;
    }

    if let Some(bits) = tags.get(Tag::BITS) {
      let Ok(bits) = bits.trim().parse::<u32>() else {
        tracing::debug!("Failed to parse a bit amount: {:?}", bits);

        return Ok(());
      };
      let Some(user_id) = tags.get(Tag::USER_ID) else {
        tracing::debug!("Got a cheer without a user id.");

        return Ok(());
      };
      let Ok(user_id) = user_id.trim().parse::<i64>() else {
        tracing::debug!("Failed to parse a cheering user id: {:?}", user_id);

        return Ok(());
      };
      let Some(user) = self.resolver.user_by_id(user_id).await? else {
        return Ok(());
      };

      let message_contents = parameters.get(1).unwrap_or(&"").to_string();

      self.announce_cheer(user, channel, bits, message_contents);
    }

    Ok(())
  }

  async fn handle_user_notice(
    &self,
    channel: &Channel,
    tags: &TagMap,
    parameters: &[&str],
  ) -> Result<(), AppError> {
    let (Some(message_id), Some(months_subscribed), Some(_display_name), Some(system_message)) = (
      tags.get(Tag::MESSAGE_ID),
      tags.get(Tag::MONTHS_SUBSCRIBED),
      tags.get(Tag::DISPLAY_NAME),
      tags.get(Tag::SYSTEM_MESSAGE),
    ) else {
      return Ok(());
    };

    if message_id != "resub" {
      return Ok(());
    }

    let Ok(streak) = months_subscribed.trim().parse::<u32>() else {
      tracing::debug!(
        "Failed to parse a resubscription month count: {:?}",
        months_subscribed
      );

      return Ok(());
    };

    if streak <= 1 {
      return Ok(());
    }

    let is_prime = system_message.to_lowercase().contains("twitch prime");
    let subscription_message = parameters.get(1).map(|contents| contents.to_string());
    let tier = SubTier::from(
      tags
        .get(Tag::SUBSCRIPTION_PLAN)
        .map(String::as_str)
        .unwrap_or("1000"),
    );

    let Some(subscriber_twitch_id) = tags.get(Tag::USER_ID) else {
      tracing::debug!("Got a resubscription without a user id.");

      return Ok(());
    };
    let Ok(subscriber_twitch_id) = subscriber_twitch_id.trim().parse::<i64>() else {
      tracing::debug!(
        "Failed to parse a resubscribing user id: {:?}",
        subscriber_twitch_id
      );

      return Ok(());
    };

    self
      .announce_subscription(
        subscriber_twitch_id,
        channel,
        streak,
        is_prime,
        subscription_message,
        tier,
      )
      .await
  }

  fn handle_notice(&self, channel: &Channel, tags: &TagMap) {
    let Some(message_id) = tags.get(Tag::MESSAGE_ID) else {
      tracing::debug!("Got a notice without a message id.");

      return;
    };

    match message_id.as_str() {
      // The hosted target isn't read off this line yet, so the hosting
      // channel stands in for both sides.
      "host_on" => self.dispatcher.dispatch(Event::HostEnter {
        channel: channel.clone(),
        target: channel.clone(),
      }),
      "host_off" => self.dispatcher.dispatch(Event::HostExit {
        channel: channel.clone(),
      }),
      "emote_only_on" | "emote_only_off" | "msg_channel_suspended" | "timeout_success"
      | "ban_success" | "unban_success" => (),
      unknown => tracing::debug!("Got an unhandled notice: {:?}", unknown),
    }
  }

  fn handle_room_state(&self, channel: &Channel, tags: &TagMap) {
    let updated_state = self.room_states.apply_tags(channel.twitch_id, tags);

    tracing::debug!(
      "Updated the room state for {}: {:?}",
      channel.login_name,
      updated_state
    );
  }

  /// Builds a subscription, filters repeated deliveries of it, and
  /// dispatches the survivors.
  async fn announce_subscription(
    &self,
    subscriber_twitch_id: i64,
    channel: &Channel,
    streak: u32,
    is_prime: bool,
    message: Option<String>,
    tier: SubTier,
  ) -> Result<(), AppError> {
    let Some(user) = self.resolver.user_by_id(subscriber_twitch_id).await? else {
      tracing::warn!(
        "Could not resolve the subscriber with id {} for a subscription notification.",
        subscriber_twitch_id
      );

      return Ok(());
    };

    // A first-month subscriber can't attach a message.
    let message = if streak > 1 { message } else { None };

    let subscription = Subscription {
      user,
      streak,
      is_prime,
      message,
      tier,
      created_at: Utc::now(),
    };

    if !self
      .subscription_history
      .check_and_mark(subscription.user.twitch_id, streak)
    {
      tracing::trace!(
        "Suppressed a repeated subscription notification: {:?}",
        subscription
      );

      return Ok(());
    }

    self.dispatcher.dispatch(Event::Subscription {
      channel: channel.clone(),
      subscription,
    });

    Ok(())
  }

  fn announce_cheer(&self, user: TwitchUser, channel: &Channel, bits: u32, message: String) {
    let cheer = Cheer {
      user,
      bits,
      message,
    };

    self.dispatcher.dispatch(Event::Cheer {
      channel: channel.clone(),
      cheer,
    });
  }
}

/// Picks the channel-carrying commands apart into their name and positional
/// parameters. Everything else is not this layer's business.
fn routed_parts(command: &Command) -> Option<(&str, Vec<&str>)> {
  match command {
    Command::PRIVMSG(message_target, contents) => {
      Some(("PRIVMSG", vec![message_target.as_str(), contents.as_str()]))
    }
    Command::NOTICE(notice_target, contents) => {
      Some(("NOTICE", vec![notice_target.as_str(), contents.as_str()]))
    }
    Command::Raw(command_name, parameters)
      if ROUTED_RAW_COMMANDS.contains(&command_name.as_str()) =>
    {
      Some((
        command_name.as_str(),
        parameters.iter().map(String::as_str).collect(),
      ))
    }
    _ => None,
  }
}

/// The nick of whoever sent a message, when the prefix carries one.
pub fn sender_nick_from_prefix(prefix: &Option<Prefix>) -> Option<String> {
  match prefix {
    Some(Prefix::Nickname(nickname, _, _)) => Some(nickname.clone()),
    _ => None,
  }
}
