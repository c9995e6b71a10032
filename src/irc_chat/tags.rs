use irc::proto::Message as IrcMessage;
use std::collections::HashMap;

/// Tag name to tag value for one message. A tag that arrived without a
/// value has no entry; a tag that arrived with an empty value keeps it.
pub type TagMap = HashMap<String, String>;

pub struct Tag;

impl Tag {
  pub const BADGES: &str = "badges";
  pub const BAN_DURATION: &str = "ban-duration";
  pub const BAN_REASON: &str = "ban-reason";
  pub const BITS: &str = "bits";
  pub const DISPLAY_NAME: &str = "display-name";
  pub const EMOTE_ONLY: &str = "emote-only";
  pub const FOLLOWERS_ONLY: &str = "followers-only";
  pub const MESSAGE_ID: &str = "msg-id";
  pub const MONTHS_SUBSCRIBED: &str = "msg-param-months";
  pub const R9K: &str = "r9k";
  pub const SLOW: &str = "slow";
  pub const SUBS_ONLY: &str = "subs-only";
  pub const SUBSCRIBER: &str = "subscriber";
  pub const SUBSCRIPTION_PLAN: &str = "msg-param-sub-plan";
  pub const SYSTEM_MESSAGE: &str = "system-msg";
  pub const TARGET_USER_ID: &str = "target-user-id";
  pub const TURBO: &str = "turbo";
  pub const USER_ID: &str = "user-id";
}

/// Flattens the tag list of one message into a [`TagMap`].
///
/// A message without tags yields an empty map.
pub fn tag_map_from_message(message: &IrcMessage) -> TagMap {
  let Some(tags) = &message.tags else {
    return TagMap::new();
  };

  tags
    .iter()
    .filter_map(|tag| {
      let value = tag.1.as_ref()?;

      Some((tag.0.clone(), value.clone()))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use irc::proto::message::Tag as IrcTag;
  use irc::proto::{Command, Prefix};

  fn get_message_with_tags(tags: Vec<IrcTag>) -> IrcMessage {
    IrcMessage {
      tags: Some(tags),
      prefix: Some(Prefix::ServerName("tmi.twitch.tv".into())),
      command: Command::Raw("USERNOTICE".into(), vec!["#somechan".into()]),
    }
  }

  #[test]
  fn valueless_tags_are_omitted() {
    let message = get_message_with_tags(vec![
      IrcTag("msg-id".into(), Some("resub".into())),
      IrcTag("flags".into(), None),
    ]);

    let tag_map = tag_map_from_message(&message);

    assert_eq!(tag_map.get("msg-id"), Some(&"resub".to_string()));
    assert!(!tag_map.contains_key("flags"));
  }

  #[test]
  fn empty_values_are_kept() {
    let message = get_message_with_tags(vec![IrcTag("system-msg".into(), Some("".into()))]);

    let tag_map = tag_map_from_message(&message);

    assert_eq!(tag_map.get("system-msg"), Some(&String::new()));
  }

  #[test]
  fn tag_order_does_not_change_the_map() {
    let forwards = get_message_with_tags(vec![
      IrcTag("msg-id".into(), Some("resub".into())),
      IrcTag("user-id".into(), Some("123".into())),
    ]);
    let backwards = get_message_with_tags(vec![
      IrcTag("user-id".into(), Some("123".into())),
      IrcTag("msg-id".into(), Some("resub".into())),
    ]);

    assert_eq!(
      tag_map_from_message(&forwards),
      tag_map_from_message(&backwards)
    );
  }

  #[test]
  fn a_message_without_tags_yields_an_empty_map() {
    let message = IrcMessage {
      tags: None,
      prefix: None,
      command: Command::PING("tmi.twitch.tv".into(), None),
    };

    assert!(tag_map_from_message(&message).is_empty());
  }
}
