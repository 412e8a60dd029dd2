//! Millisecond scheduling primitives for the logic that drives the modem.
//!
//! Neither type touches the AT engine. Every operation has an `_at` variant
//! taking the current [`Instant`] explicitly, the plain variant reads
//! [`Instant::now`].

use embassy_time::{Duration, Instant};

const ZERO: Duration = Duration::from_ticks(0);

/// On-delay timer (TON).
///
/// While the input is held true, elapsed time accumulates. Once it exceeds
/// the preset the output latches true and the elapsed time saturates at the
/// preset, until the input drops, which resets both.
#[derive(Debug, Clone)]
pub struct OnDelay {
    since: Option<Instant>,
    done: bool,
    output: bool,
    elapsed: Duration,
}

impl Default for OnDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl OnDelay {
    pub const fn new() -> Self {
        Self {
            since: None,
            done: false,
            output: false,
            elapsed: ZERO,
        }
    }

    pub fn update(&mut self, input: bool, preset: Duration) -> bool {
        self.update_at(input, preset, Instant::now())
    }

    pub fn update_at(&mut self, input: bool, preset: Duration, now: Instant) -> bool {
        if !input {
            self.reset();
            return false;
        }

        if self.done {
            self.elapsed = preset;
            self.output = true;
            return true;
        }

        let since = *self.since.get_or_insert(now);
        let delta = now.saturating_duration_since(since);
        self.output = delta > preset;
        if self.output {
            self.done = true;
            self.elapsed = preset;
        } else {
            self.elapsed = delta;
        }

        self.output
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Latched output, `Q`.
    pub fn output(&self) -> bool {
        self.output
    }

    /// Elapsed time, `ET`. Saturates at the preset.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Tracks the current state of a caller-side state machine, and when it was
/// entered.
///
/// Transitions are requested with [`StateTracker::request`] and committed on
/// the next [`StateTracker::update`]. The very first update always commits.
#[derive(Debug, Clone)]
pub struct StateTracker<S> {
    current: Option<S>,
    next: S,
    entered: Instant,
    dwell: Duration,
    changed: bool,
}

impl<S: Copy + PartialEq> StateTracker<S> {
    pub const fn new(initial: S) -> Self {
        Self {
            current: None,
            next: initial,
            entered: Instant::from_ticks(0),
            dwell: ZERO,
            changed: true,
        }
    }

    /// Request a transition, committed by the next update.
    pub fn request(&mut self, next: S) {
        self.next = next;
    }

    pub fn update(&mut self) -> S {
        self.update_at(Instant::now())
    }

    pub fn update_at(&mut self, now: Instant) -> S {
        if self.current != Some(self.next) {
            self.changed = true;
            self.current = Some(self.next);
            self.entered = now;
            self.dwell = ZERO;
        } else {
            self.changed = false;
            self.dwell = now.saturating_duration_since(self.entered);
        }

        self.next
    }

    /// Committed state, `None` before the first update.
    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn requested(&self) -> S {
        self.next
    }

    /// Whether the last update committed a transition.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Time spent in the current state as of the last update.
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    pub fn entered(&self) -> Instant {
        self.entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Instant {
        Instant::from_millis(millis)
    }

    const PRESET: Duration = Duration::from_millis(100);

    #[test]
    fn on_delay_accumulates_then_latches() {
        let mut ton = OnDelay::new();

        assert!(!ton.update_at(true, PRESET, ms(1_000)));
        assert_eq!(ton.elapsed(), Duration::from_millis(0));

        assert!(!ton.update_at(true, PRESET, ms(1_060)));
        assert_eq!(ton.elapsed(), Duration::from_millis(60));

        // Reaching the preset exactly is not enough.
        assert!(!ton.update_at(true, PRESET, ms(1_100)));
        assert!(ton.update_at(true, PRESET, ms(1_101)));
        assert!(ton.output());
        assert_eq!(ton.elapsed(), PRESET);

        // Saturated, stays latched.
        assert!(ton.update_at(true, PRESET, ms(5_000)));
        assert_eq!(ton.elapsed(), PRESET);
    }

    #[test]
    fn on_delay_resets_when_input_drops() {
        let mut ton = OnDelay::new();
        ton.update_at(true, PRESET, ms(0));
        assert!(ton.update_at(true, PRESET, ms(200)));

        assert!(!ton.update_at(false, PRESET, ms(210)));
        assert!(!ton.output());
        assert_eq!(ton.elapsed(), Duration::from_millis(0));

        // Timing restarts from the new rising edge.
        assert!(!ton.update_at(true, PRESET, ms(300)));
        assert!(!ton.update_at(true, PRESET, ms(390)));
        assert_eq!(ton.elapsed(), Duration::from_millis(90));
        assert!(ton.update_at(true, PRESET, ms(401)));
    }

    #[test]
    fn state_tracker_first_update_commits() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Step {
            Boot,
            Attach,
        }

        let mut fsm = StateTracker::new(Step::Boot);
        assert_eq!(fsm.current(), None);

        assert_eq!(fsm.update_at(ms(10)), Step::Boot);
        assert!(fsm.changed());
        assert_eq!(fsm.entered(), ms(10));

        assert_eq!(fsm.update_at(ms(35)), Step::Boot);
        assert!(!fsm.changed());
        assert_eq!(fsm.dwell(), Duration::from_millis(25));

        fsm.request(Step::Attach);
        assert_eq!(fsm.requested(), Step::Attach);
        assert_eq!(fsm.update_at(ms(50)), Step::Attach);
        assert!(fsm.changed());
        assert_eq!(fsm.dwell(), Duration::from_millis(0));

        assert_eq!(fsm.update_at(ms(80)), Step::Attach);
        assert!(!fsm.changed());
        assert_eq!(fsm.dwell(), Duration::from_millis(30));
        assert_eq!(fsm.current(), Some(Step::Attach));
    }
}
