use super::sub_tier::SubTier;
use lazy_static::lazy_static;
use regex::Regex;

/// The fixed account Twitch once announced subscriptions through. The
/// subscriber identity comes from the matched username capture, never from
/// this sender.
pub const LEGACY_NOTIFIER_PREFIX: &str = ":twitchnotify";

/// A subscription announced through the deprecated free-text format,
/// superseded by USERNOTICE tags but still parsed for old deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySubscriptionNotice {
  pub username: String,
  pub tier: SubTier,
  pub is_prime: bool,
  pub streak: u32,
}

lazy_static! {
  /// Checked in order; the first full match wins.
  static ref LEGACY_SUBSCRIPTION_PATTERNS: Vec<(Regex, SubTier, bool)> = vec![
    (
      Regex::new(r"^:twitchnotify!twitchnotify@twitchnotify\.tmi\.twitch\.tv PRIVMSG #(?<channel>[a-zA-Z0-9_]{4,25}) :(?<username>[a-zA-Z0-9_]{4,25}) just subscribed with a \$4\.99 sub$").unwrap(),
      SubTier::One,
      false,
    ),
    (
      Regex::new(r"^:twitchnotify!twitchnotify@twitchnotify\.tmi\.twitch\.tv PRIVMSG #(?<channel>[a-zA-Z0-9_]{4,25}) :(?<username>[a-zA-Z0-9_]{4,25}) just subscribed with a \$9\.99 sub$").unwrap(),
      SubTier::Two,
      false,
    ),
    (
      Regex::new(r"^:twitchnotify!twitchnotify@twitchnotify\.tmi\.twitch\.tv PRIVMSG #(?<channel>[a-zA-Z0-9_]{4,25}) :(?<username>[a-zA-Z0-9_]{4,25}) just subscribed with a \$24\.99 sub$").unwrap(),
      SubTier::Three,
      false,
    ),
    (
      Regex::new(r"^:twitchnotify!twitchnotify@twitchnotify\.tmi\.twitch\.tv PRIVMSG #(?<channel>[a-zA-Z0-9_]{4,25}) :(?<username>[a-zA-Z0-9_]{4,25}) just subscribed!$").unwrap(),
      SubTier::One,
      false,
    ),
    (
      Regex::new(r"^:twitchnotify!twitchnotify@twitchnotify\.tmi\.twitch\.tv PRIVMSG #(?<channel>[a-zA-Z0-9_]{4,25}) :(?<username>[a-zA-Z0-9_]{4,25}) just subscribed with Twitch Prime!$").unwrap(),
      SubTier::One,
      true,
    ),
  ];
}

/// Matches one raw line against the known legacy announcement shapes.
///
/// Anything not sent by the legacy notifier account is rejected before the
/// patterns run. No match means the line is some other kind of message.
pub fn parse_legacy_subscription(raw_line: &str) -> Option<LegacySubscriptionNotice> {
  if !raw_line.starts_with(LEGACY_NOTIFIER_PREFIX) {
    return None;
  }

  for (pattern, tier, is_prime) in LEGACY_SUBSCRIPTION_PATTERNS.iter() {
    let Some(captures) = pattern.captures(raw_line) else {
      continue;
    };

    return Some(LegacySubscriptionNotice {
      username: captures.name("username")?.as_str().to_string(),
      tier: *tier,
      is_prime: *is_prime,
      streak: 1,
    });
  }

  None
}

#[cfg(test)]
mod tests {
  use super::*;

  fn get_notification_line(contents: &str) -> String {
    format!(
      ":twitchnotify!twitchnotify@twitchnotify.tmi.twitch.tv PRIVMSG #somechan :{}",
      contents
    )
  }

  #[test]
  fn prime_subscription_is_recognized() {
    let line = get_notification_line("alice just subscribed with Twitch Prime!");

    let notice = parse_legacy_subscription(&line).unwrap();

    assert_eq!(notice.username, "alice");
    assert!(notice.is_prime);
    assert_eq!(notice.tier, SubTier::One);
    assert_eq!(notice.streak, 1);
  }

  #[test]
  fn dollar_tiers_map_to_sub_tiers() {
    let tier_one = get_notification_line("alice just subscribed with a $4.99 sub");
    let tier_two = get_notification_line("alice just subscribed with a $9.99 sub");
    let tier_three = get_notification_line("alice just subscribed with a $24.99 sub");

    assert_eq!(
      parse_legacy_subscription(&tier_one).unwrap().tier,
      SubTier::One
    );
    assert_eq!(
      parse_legacy_subscription(&tier_two).unwrap().tier,
      SubTier::Two
    );
    assert_eq!(
      parse_legacy_subscription(&tier_three).unwrap().tier,
      SubTier::Three
    );
  }

  #[test]
  fn plain_subscription_defaults_to_tier_one() {
    let line = get_notification_line("alice just subscribed!");

    let notice = parse_legacy_subscription(&line).unwrap();

    assert_eq!(notice.tier, SubTier::One);
    assert!(!notice.is_prime);
  }

  #[test]
  fn other_senders_never_match() {
    let line = ":alice!alice@alice.tmi.twitch.tv PRIVMSG #somechan :alice just subscribed!";

    assert_eq!(parse_legacy_subscription(line), None);
  }

  #[test]
  fn ordinary_chat_from_the_notifier_does_not_match() {
    let line = get_notification_line("alice is now hosting somechan.");

    assert_eq!(parse_legacy_subscription(&line), None);
  }
}
