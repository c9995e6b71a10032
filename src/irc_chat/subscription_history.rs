use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Remembers which subscription notifications were recently announced so a
/// repeated delivery of the same one can be suppressed.
///
/// Entries expire a fixed time after insertion, no matter how often they are
/// checked in between. The whole check-and-insert runs under one lock so two
/// concurrent deliveries of the same notification can't both pass.
#[derive(Debug)]
pub struct SubscriptionHistory {
  time_to_live: Duration,
  entries: Mutex<HashMap<String, Instant>>,
}

impl SubscriptionHistory {
  pub fn new(time_to_live: Duration) -> Self {
    Self {
      time_to_live,
      entries: Mutex::new(HashMap::new()),
    }
  }

  /// Returns true if this subscriber/streak pair hasn't been seen within the
  /// configured window, marking it as seen. Returns false for a repeat.
  pub fn check_and_mark(&self, subscriber_twitch_id: i64, streak: u32) -> bool {
    self.check_and_mark_at(subscriber_twitch_id, streak, Instant::now())
  }

  fn check_and_mark_at(&self, subscriber_twitch_id: i64, streak: u32, now: Instant) -> bool {
    let key = format!("{}|{}", subscriber_twitch_id, streak);
    let mut entries = self.entries.lock().unwrap();

    entries.retain(|_, inserted_at| now.duration_since(*inserted_at) < self.time_to_live);

    if entries.contains_key(&key) {
      return false;
    }

    entries.insert(key, now);

    true
  }
}
