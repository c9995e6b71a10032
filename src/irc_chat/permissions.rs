use super::tags::{Tag, TagMap};
use std::collections::HashSet;

/// What a user is allowed to do in the channel a message was sent to.
/// Recomputed from the tags of every message, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandPermission {
  Everyone,
  Subscriber,
  PrimeTurbo,
  Moderator,
  Broadcaster,
}

/// Derives the capability set for the sender of one message.
///
/// Absent tags contribute nothing; everyone always holds
/// [`CommandPermission::Everyone`].
pub fn permissions_from_tags(tags: &TagMap) -> HashSet<CommandPermission> {
  let mut permissions = HashSet::new();

  if let Some(badges) = tags.get(Tag::BADGES) {
    for badge in badges.split(',') {
      match badge {
        "broadcaster/1" => {
          permissions.insert(CommandPermission::Broadcaster);
          permissions.insert(CommandPermission::Moderator);
        }
        "premium/1" => {
          permissions.insert(CommandPermission::PrimeTurbo);
        }
        "moderator/1" => {
          permissions.insert(CommandPermission::Moderator);
        }
        _ => (),
      }
    }
  }

  if tags.get(Tag::TURBO).map(String::as_str) == Some("1") {
    permissions.insert(CommandPermission::PrimeTurbo);
  }

  if tags.get(Tag::SUBSCRIBER).map(String::as_str) == Some("1") {
    permissions.insert(CommandPermission::Subscriber);
  }

  permissions.insert(CommandPermission::Everyone);

  permissions
}

#[cfg(test)]
mod tests {
  use super::*;

  fn get_tag_map(tags: &[(&str, &str)]) -> TagMap {
    tags
      .iter()
      .map(|(name, value)| (name.to_string(), value.to_string()))
      .collect()
  }

  #[test]
  fn broadcaster_badge_implies_moderator() {
    let tags = get_tag_map(&[(Tag::BADGES, "broadcaster/1,moderator/1")]);

    let permissions = permissions_from_tags(&tags);

    let expected_permissions = HashSet::from([
      CommandPermission::Broadcaster,
      CommandPermission::Moderator,
      CommandPermission::Everyone,
    ]);
    assert_eq!(permissions, expected_permissions);
  }

  #[test]
  fn no_tags_yields_everyone_only() {
    let permissions = permissions_from_tags(&TagMap::new());

    assert_eq!(permissions, HashSet::from([CommandPermission::Everyone]));
  }

  #[test]
  fn premium_badge_and_turbo_tag_are_the_same_capability() {
    let tags = get_tag_map(&[(Tag::BADGES, "premium/1"), (Tag::TURBO, "1")]);

    let permissions = permissions_from_tags(&tags);

    let expected_permissions = HashSet::from([
      CommandPermission::PrimeTurbo,
      CommandPermission::Everyone,
    ]);
    assert_eq!(permissions, expected_permissions);
  }

  #[test]
  fn subscriber_tag_grants_subscriber() {
    let tags = get_tag_map(&[(Tag::SUBSCRIBER, "1")]);

    let permissions = permissions_from_tags(&tags);

    assert!(permissions.contains(&CommandPermission::Subscriber));
  }

  #[test]
  fn subscriber_tag_of_zero_grants_nothing() {
    let tags = get_tag_map(&[(Tag::SUBSCRIBER, "0"), (Tag::TURBO, "0")]);

    let permissions = permissions_from_tags(&tags);

    assert_eq!(permissions, HashSet::from([CommandPermission::Everyone]));
  }
}
