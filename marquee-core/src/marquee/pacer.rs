//! Animation frame pacing
//!
//! Decides whether an animation tick is due on a millisecond clock. A late
//! caller gets one tick, never a burst: missed ticks are dropped. Time spent
//! servicing requests can be credited so the next tick is not pushed back by
//! it, but the credit never exceeds one interval.

/// Tick pacer on a wrapping millisecond clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FramePacer {
    last_tick_ms: u32,
    credit_ms: u32,
}

impl FramePacer {
    /// Start pacing from `now_ms`
    pub const fn new(now_ms: u32) -> Self {
        Self {
            last_tick_ms: now_ms,
            credit_ms: 0,
        }
    }

    /// Restart from `now_ms`, dropping any credit
    pub fn reset(&mut self, now_ms: u32) {
        self.last_tick_ms = now_ms;
        self.credit_ms = 0;
    }

    /// Credit time consumed outside the animation loop
    pub fn credit(&mut self, elapsed_ms: u32) {
        self.credit_ms = self.credit_ms.saturating_add(elapsed_ms);
    }

    /// Check whether a tick is due, consuming it if so
    pub fn poll(&mut self, now_ms: u32, interval_ms: u32) -> bool {
        let elapsed = now_ms.wrapping_sub(self.last_tick_ms);
        let credit = self.credit_ms.min(interval_ms);
        if elapsed.saturating_add(credit) < interval_ms {
            return false;
        }
        self.last_tick_ms = now_ms;
        self.credit_ms = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_on_interval() {
        let mut pacer = FramePacer::new(0);
        assert!(!pacer.poll(19, 20));
        assert!(pacer.poll(20, 20));
        assert!(!pacer.poll(21, 20));
        assert!(pacer.poll(40, 20));
    }

    #[test]
    fn test_late_caller_gets_one_tick() {
        let mut pacer = FramePacer::new(0);
        assert!(pacer.poll(500, 20));
        // No catch-up for the 24 missed ticks
        assert!(!pacer.poll(501, 20));
        assert!(pacer.poll(520, 20));
    }

    #[test]
    fn test_credit_pulls_tick_forward() {
        let mut pacer = FramePacer::new(0);
        pacer.credit(5);
        assert!(!pacer.poll(14, 20));
        assert!(pacer.poll(15, 20));
        // Credit consumed
        assert!(!pacer.poll(30, 20));
    }

    #[test]
    fn test_credit_capped_at_one_interval() {
        let mut pacer = FramePacer::new(0);
        pacer.credit(1_000);
        assert!(pacer.poll(0, 20));
        assert!(!pacer.poll(1, 20));
    }

    #[test]
    fn test_clock_wraparound() {
        let mut pacer = FramePacer::new(u32::MAX - 5);
        assert!(!pacer.poll(u32::MAX, 20));
        assert!(pacer.poll(14, 20));
    }

    #[test]
    fn test_reset_drops_credit() {
        let mut pacer = FramePacer::new(0);
        pacer.credit(10);
        pacer.reset(100);
        assert!(!pacer.poll(110, 20));
        assert!(pacer.poll(120, 20));
    }
}
