//! [`CommandLatch`] – single-slot hand-off from the provider thread to the
//! render tick.
//!
//! Gestures arrive on the provider's own cadence, independent of render
//! ticks.  The latch holds at most one pending symbol: posting overwrites
//! whatever is there, and the tick driver takes it (leaving the slot empty)
//! at the start of each tick.  If several symbols arrive between two ticks
//! only the last one is applied.

use std::sync::{Arc, Mutex, MutexGuard};

use lorikeet_types::GestureSymbol;

/// Last-write-wins gesture slot shared between threads.
///
/// ```
/// use lorikeet_runtime::CommandLatch;
/// use lorikeet_types::GestureSymbol;
///
/// let latch = CommandLatch::new();
/// let producer = latch.clone();
///
/// producer.post(GestureSymbol::Open);
/// producer.post(GestureSymbol::Peace);
///
/// assert_eq!(latch.take(), Some(GestureSymbol::Peace));
/// assert_eq!(latch.take(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandLatch {
    slot: Arc<Mutex<Option<GestureSymbol>>>,
}

impl CommandLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending symbol.
    pub fn post(&self, symbol: GestureSymbol) {
        *self.lock() = Some(symbol);
    }

    /// Remove and return the pending symbol.
    pub fn take(&self) -> Option<GestureSymbol> {
        self.lock().take()
    }

    /// Pending symbol, left in place.
    pub fn peek(&self) -> Option<GestureSymbol> {
        *self.lock()
    }

    // A panic while holding the lock cannot leave an `Option` half-written.
    fn lock(&self) -> MutexGuard<'_, Option<GestureSymbol>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}
