//! Decoder limits.

use serde::{Deserialize, Serialize};

use crate::SMALL_HEADER_SIZE;

/// Default capacity cap for small frames, header included.
pub const DEFAULT_SMALL_CAP: i32 = 1024;

/// Default sanity ceiling for big frames (max positive i32).
pub const DEFAULT_BIG_CEILING: i64 = i32::MAX as i64;

/// Size limits enforced when decoding frame headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLimits {
    /// Maximum `total_size` a small frame may declare.
    pub small_cap: i32,
    /// Maximum `total_size` a big frame may declare.
    pub big_ceiling: i64,
}

impl FrameLimits {
    /// Creates limits with explicit values.
    #[must_use]
    pub fn new(small_cap: i32, big_ceiling: i64) -> Self {
        Self {
            small_cap,
            big_ceiling,
        }
    }

    /// Returns `true` if both limits admit at least a header-only frame.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let header = SMALL_HEADER_SIZE as i64;
        i64::from(self.small_cap) >= header && self.big_ceiling >= header
    }

    /// Largest small-frame body that will decode under these limits.
    #[must_use]
    pub fn max_small_body(&self) -> usize {
        usize::try_from(self.small_cap)
            .unwrap_or(0)
            .saturating_sub(SMALL_HEADER_SIZE)
    }
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            small_cap: DEFAULT_SMALL_CAP,
            big_ceiling: DEFAULT_BIG_CEILING,
        }
    }
}
