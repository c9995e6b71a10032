use super::tags::{Tag, TagMap};
use std::collections::HashMap;
use std::sync::Mutex;

/// The moderation modes currently active in one channel's chat room.
///
/// Slow mode is carried as its delay; zero means it is off.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoomState {
  pub subs_only: bool,
  pub r9k: bool,
  pub emote_only: bool,
  pub followers_only: bool,
  pub slow_mode_seconds: u32,
}

/// Tracks the room state of every channel ROOMSTATE lines arrive for.
///
/// Updates are field-level: a tag that isn't on the line leaves the field it
/// controls untouched. Concurrent lines for the same channel serialize on
/// the internal lock.
#[derive(Debug, Default)]
pub struct RoomStateTracker {
  room_states: Mutex<HashMap<i64, RoomState>>,
}

impl RoomStateTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Applies the mode tags of one ROOMSTATE line and returns the resulting
  /// state. "0" turns a mode off, any other value turns it on; slow mode's
  /// value doubles as the delay in seconds.
  pub fn apply_tags(&self, channel_twitch_id: i64, tags: &TagMap) -> RoomState {
    let mut room_states = self.room_states.lock().unwrap();
    let state = room_states.entry(channel_twitch_id).or_default();

    if let Some(value) = tags.get(Tag::SUBS_ONLY) {
      state.subs_only = value != "0";
    }

    if let Some(value) = tags.get(Tag::SLOW) {
      if value == "0" {
        state.slow_mode_seconds = 0;
      } else if let Ok(message_delay) = value.trim().parse::<u32>() {
        state.slow_mode_seconds = message_delay;
      } else {
        tracing::debug!("Ignored an unparsable slow mode delay: {:?}", value);
      }
    }

    if let Some(value) = tags.get(Tag::R9K) {
      state.r9k = value != "0";
    }

    if let Some(value) = tags.get(Tag::EMOTE_ONLY) {
      state.emote_only = value != "0";
    }

    if let Some(value) = tags.get(Tag::FOLLOWERS_ONLY) {
      state.followers_only = value != "0";
    }

    state.clone()
  }

  pub fn state_for(&self, channel_twitch_id: i64) -> Option<RoomState> {
    self
      .room_states
      .lock()
      .unwrap()
      .get(&channel_twitch_id)
      .cloned()
  }
}
