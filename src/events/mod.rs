use crate::irc_chat::permissions::CommandPermission;
use crate::irc_chat::sub_tier::SubTier;
use crate::users::{Channel, TwitchUser};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::mpsc;

/// One announced subscription, deduplicated before it is dispatched.
///
/// The message is only kept past the first month because Twitch doesn't let
/// a first-time subscriber attach one.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
  pub user: TwitchUser,
  pub streak: u32,
  pub is_prime: bool,
  pub message: Option<String>,
  pub tier: SubTier,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cheer {
  pub user: TwitchUser,
  pub bits: u32,
  pub message: String,
}

/// The domain events this layer produces. Each one is a self-contained
/// record carrying fully resolved identities.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  ChannelMessage {
    channel: Channel,
    user: TwitchUser,
    message: String,
    permissions: HashSet<CommandPermission>,
  },
  PrivateMessage {
    sender: TwitchUser,
    recipient: TwitchUser,
    message: String,
    permissions: HashSet<CommandPermission>,
  },
  Subscription {
    channel: Channel,
    subscription: Subscription,
  },
  Cheer {
    channel: Channel,
    cheer: Cheer,
  },
  UserBan {
    channel: Channel,
    user: TwitchUser,
    reason: String,
  },
  UserTimeout {
    channel: Channel,
    user: TwitchUser,
    duration_seconds: u32,
    reason: String,
  },
  HostEnter {
    channel: Channel,
    target: Channel,
  },
  HostExit {
    channel: Channel,
  },
}

/// Fire-and-forget event delivery. Ordering and delivery guarantees belong
/// to whatever sits behind the implementation.
pub trait EventDispatcher: Send + Sync {
  fn dispatch(&self, event: Event);
}

impl EventDispatcher for mpsc::UnboundedSender<Event> {
  fn dispatch(&self, event: Event) {
    if let Err(error) = self.send(event) {
      tracing::error!("Dropped a domain event, no consumers are listening: {}", error);
    }
  }
}
