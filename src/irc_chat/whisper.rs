use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
  static ref WHISPER_PATTERN: Regex = Regex::new(
    r"^.+:.+?!.+?@.+?\.tmi\.twitch\.tv WHISPER (?<recipient>[a-zA-Z0-9_]{4,25}) :(?<message>.+)$"
  )
  .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhisperContents {
  pub recipient: String,
  pub message: String,
}

/// Pulls the recipient login and message body out of a raw whisper line.
///
/// The sender isn't part of the match; it comes from the line's tags.
pub fn parse_whisper(raw_line: &str) -> Option<WhisperContents> {
  let captures = WHISPER_PATTERN.captures(raw_line)?;

  Some(WhisperContents {
    recipient: captures.name("recipient")?.as_str().to_string(),
    message: captures.name("message")?.as_str().to_string(),
  })
}
