#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubTier {
  Unknown,
  One,
  Two,
  Three,
  Prime,
}

impl From<&str> for SubTier {
  fn from(value: &str) -> SubTier {
    match value {
      "1000" => SubTier::One,
      "2000" => SubTier::Two,
      "3000" => SubTier::Three,
      "Prime" => SubTier::Prime,
      _ => SubTier::Unknown,
    }
  }
}

impl std::fmt::Display for SubTier {
  fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(formatter, "{:?}", self)
  }
}
