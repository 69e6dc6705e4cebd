// Edge-triggered wake signaling between packet producers and a parked
// dispatch loop

use parking_lot::{Condvar, Mutex};

/// A small set of edge-triggered, coalescing wake sources feeding one
/// parked waiter.
///
/// Each source is one bit in a latch word. `assert` latches the bit and
/// wakes the waiter; asserting an already-latched source changes nothing,
/// so signal bursts coalesce into a single observation. `fetch` parks the
/// caller until at least one source is latched, then consumes and returns
/// exactly one source per call: the lowest set bit, so lower bits preempt
/// higher ones when several are pending. The latch persists across the
/// park, so a wake that races the waiter going to sleep is never lost.
///
/// The waiter must re-check its real work state after every fetch rather
/// than counting signals.
pub struct WakeSet {
    latched: Mutex<u32>,
    wakeup: Condvar,
}

impl WakeSet {
    pub fn new() -> Self {
        Self {
            latched: Mutex::new(0),
            wakeup: Condvar::new(),
        }
    }

    /// Latches `source` (a single-bit mask) and wakes the waiter.
    pub fn assert(&self, source: u32) {
        debug_assert_eq!(source.count_ones(), 1, "wake source must be a single bit");
        let mut latched = self.latched.lock();
        *latched |= source;
        drop(latched);
        self.wakeup.notify_one();
    }

    /// Parks until a source is latched, then consumes and returns the
    /// highest-priority (lowest) latched bit. Other latched bits stay set
    /// for later fetches.
    pub fn fetch(&self) -> u32 {
        let mut latched = self.latched.lock();
        while *latched == 0 {
            self.wakeup.wait(&mut latched);
        }
        let source = 1 << latched.trailing_zeros();
        *latched &= !source;
        source
    }
}

impl Default for WakeSet {
    fn default() -> Self {
        Self::new()
    }
}
