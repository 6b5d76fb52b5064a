//! Platform trust score, an integer in `[0, 100]`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A trust score clamped to `[0, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TrustScore(u8);

impl TrustScore {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Build a score, clamping anything above 100.
    pub fn new(value: u32) -> Self {
        Self(value.min(100) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Add `boost` points, capped at 100. Never decreases the score.
    pub fn boosted(self, boost: u32) -> Self {
        Self::new(u32::from(self.0).saturating_add(boost))
    }
}

impl fmt::Display for TrustScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TrustScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(u32::from(u8::deserialize(deserializer)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_to_hundred() {
        assert_eq!(TrustScore::new(250).value(), 100);
        assert_eq!(TrustScore::new(42).value(), 42);
    }

    #[test]
    fn boost_caps_and_never_decreases() {
        assert_eq!(TrustScore::new(95).boosted(10).value(), 100);
        assert_eq!(TrustScore::new(20).boosted(0).value(), 20);
        assert_eq!(TrustScore::MAX.boosted(u32::MAX), TrustScore::MAX);
    }
}
