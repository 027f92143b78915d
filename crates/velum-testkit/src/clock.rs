//! Controllable test clock.

use async_trait::async_trait;
use parking_lot::Mutex;
use velum_core::effects::{PhysicalTimeEffects, TimeError};

/// Fixed, manually advanced clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: Mutex<u64>,
}

impl FixedClock {
    /// Create starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create starting at an explicit epoch-millisecond instant.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms: Mutex::new(now_ms),
        }
    }

    /// Move the clock forward.
    pub fn advance_ms(&self, delta_ms: u64) {
        *self.now_ms.lock() += delta_ms;
    }

    /// Set the clock to an absolute instant.
    pub fn set_ms(&self, now_ms: u64) {
        *self.now_ms.lock() = now_ms;
    }
}

#[async_trait]
impl PhysicalTimeEffects for FixedClock {
    async fn now_ms(&self) -> Result<u64, TimeError> {
        Ok(*self.now_ms.lock())
    }
}
