//! Per-side chess clock with byoyomi.
//!
//! Pure timer arithmetic, no I/O. All durations are whole seconds; the
//! configuration layer converts from milliseconds before clocks are built.
//! Wall-clock instants are passed in by the caller, which keeps every
//! computation monotonic and lets tests fabricate time.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Initial time allotment for a match, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    /// Main time per side, indexed by [`crate::Side::index`].
    pub main: [u64; 2],
    /// Byoyomi grace period, shared by both sides.
    pub byoyomi: u64,
}

impl TimeControl {
    /// Build a time control from millisecond values, truncating to whole
    /// seconds.
    pub fn from_millis(btime: u64, wtime: u64, byoyomi: u64) -> Self {
        Self {
            main: [btime / 1000, wtime / 1000],
            byoyomi: byoyomi / 1000,
        }
    }
}

/// What a clock would display at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    /// Remaining main time in whole seconds.
    pub main: u64,
    /// Remaining byoyomi in whole seconds; negative means overdrawn.
    pub byoyomi: i64,
}

/// Remaining time for one side.
///
/// Main time never goes negative: once it is exhausted, further consumption
/// is drawn from byoyomi, which may go negative. A negative byoyomi after
/// billing is the loss-on-time condition reported by [`Clock::flagged`].
#[derive(Debug, Clone)]
pub struct Clock {
    remaining_main: u64,
    byoyomi: i64,
    byoyomi_default: u64,
    running_since: Option<Instant>,
}

impl Clock {
    pub fn new(main_secs: u64, byoyomi_secs: u64) -> Self {
        Self {
            remaining_main: main_secs,
            byoyomi: byoyomi_secs as i64,
            byoyomi_default: byoyomi_secs,
            running_since: None,
        }
    }

    /// Start ticking at `now`.
    ///
    /// Starting an already-running clock is a programming error in the state
    /// machine, not a user-facing fault: debug builds assert, release builds
    /// keep the original start instant.
    pub fn start(&mut self, now: Instant) {
        debug_assert!(
            self.running_since.is_none(),
            "clock started while already running"
        );
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Stop the clock and bill the elapsed time.
    ///
    /// While main time remains, any nonzero elapsed time consumes at least
    /// one whole second from it (coarse-grained billing, matching the move
    /// granularity of the protocol). Whatever whole seconds are left over
    /// once main time is exhausted are drawn from byoyomi.
    ///
    /// Returns the whole seconds consumed, for logging. Returns 0 when the
    /// clock was not running.
    pub fn stop_and_consume(&mut self, now: Instant) -> u64 {
        let Some(started) = self.running_since.take() else {
            return 0;
        };

        let mut elapsed = now.duration_since(started).as_secs_f64();
        let mut consumed = 0u64;

        if self.remaining_main > 0 {
            let billed = (elapsed.floor() as i64)
                .max(1)
                .min(self.remaining_main as i64) as u64;
            self.remaining_main -= billed;
            elapsed -= billed as f64;
            consumed += billed;
        }

        let leftover = elapsed.floor().max(0.0) as u64;
        if leftover > 0 {
            self.byoyomi -= leftover as i64;
            consumed += leftover;
        }

        consumed
    }

    /// Stop the clock without billing, for terminations that must not
    /// consume time (resignation, game end on the opponent's action).
    pub fn halt(&mut self) {
        self.running_since = None;
    }

    /// Project what the clock would show at `now`, without mutating state.
    ///
    /// Mirrors the billing arithmetic of [`Clock::stop_and_consume`] so the
    /// observer view counts down in real time. Idempotent for a fixed `now`;
    /// a stopped clock reports its stored values.
    pub fn peek(&self, now: Instant) -> ClockReading {
        let mut main = self.remaining_main;
        let mut byoyomi = self.byoyomi;

        if let Some(started) = self.running_since {
            let mut elapsed = now.duration_since(started).as_secs_f64();
            if elapsed > 0.0 && main > 0 {
                let billed = (elapsed.floor() as i64).max(1).min(main as i64) as u64;
                main -= billed;
                elapsed -= billed as f64;
            }
            byoyomi -= elapsed.floor().max(0.0) as i64;
        }

        ClockReading { main, byoyomi }
    }

    /// Restore byoyomi to its configured value, after a completed move.
    pub fn reset_byoyomi(&mut self) {
        self.byoyomi = self.byoyomi_default as i64;
    }

    /// Whether the last billing overdrew byoyomi: the loss-on-time condition.
    pub fn flagged(&self) -> bool {
        self.byoyomi < 0
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Remaining main time in whole seconds.
    pub fn remaining_main(&self) -> u64 {
        self.remaining_main
    }

    /// Remaining byoyomi in whole seconds; negative means overdrawn.
    pub fn byoyomi(&self) -> i64 {
        self.byoyomi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_time_control_from_millis_truncates() {
        let tc = TimeControl::from_millis(600000, 599999, 30500);
        assert_eq!(tc.main, [600, 599]);
        assert_eq!(tc.byoyomi, 30);
    }

    #[test]
    fn test_whole_second_billing() {
        let mut clock = Clock::new(10, 5);
        let t0 = Instant::now();
        clock.start(t0);
        let consumed = clock.stop_and_consume(t0 + Duration::from_millis(2500));
        assert_eq!(consumed, 2);
        assert_eq!(clock.remaining_main(), 8);
        assert_eq!(clock.byoyomi(), 5);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_fast_move_costs_at_least_one_second() {
        let mut clock = Clock::new(10, 5);
        let t0 = Instant::now();
        clock.start(t0);
        let consumed = clock.stop_and_consume(t0 + Duration::from_millis(300));
        assert_eq!(consumed, 1);
        assert_eq!(clock.remaining_main(), 9);
        assert_eq!(clock.byoyomi(), 5);
    }

    #[test]
    fn test_overflow_into_byoyomi() {
        let mut clock = Clock::new(2, 10);
        let t0 = Instant::now();
        clock.start(t0);
        let consumed = clock.stop_and_consume(t0 + Duration::from_millis(5700));
        // 2s from main, floor(3.7) = 3s from byoyomi
        assert_eq!(consumed, 5);
        assert_eq!(clock.remaining_main(), 0);
        assert_eq!(clock.byoyomi(), 7);
        assert!(!clock.flagged());
    }

    #[test]
    fn test_byoyomi_only_once_main_exhausted() {
        let mut clock = Clock::new(0, 10);
        let t0 = Instant::now();
        clock.start(t0);
        let consumed = clock.stop_and_consume(t0 + secs(4));
        assert_eq!(consumed, 4);
        assert_eq!(clock.remaining_main(), 0);
        assert_eq!(clock.byoyomi(), 6);
    }

    #[test]
    fn test_sub_second_in_byoyomi_is_free() {
        let mut clock = Clock::new(0, 10);
        let t0 = Instant::now();
        clock.start(t0);
        let consumed = clock.stop_and_consume(t0 + Duration::from_millis(900));
        assert_eq!(consumed, 0);
        assert_eq!(clock.byoyomi(), 10);
    }

    #[test]
    fn test_overdrawn_byoyomi_flags_timeout() {
        // 600000ms main, 30000ms byoyomi, one 650-second move:
        // main 600 -> 0, leftover 50 against byoyomi 30 -> -20.
        let tc = TimeControl::from_millis(600000, 600000, 30000);
        let mut clock = Clock::new(tc.main[0], tc.byoyomi);
        let t0 = Instant::now();
        clock.start(t0);
        let consumed = clock.stop_and_consume(t0 + secs(650));
        assert_eq!(consumed, 650);
        assert_eq!(clock.remaining_main(), 0);
        assert_eq!(clock.byoyomi(), -20);
        assert!(clock.flagged());
    }

    #[test]
    fn test_reset_byoyomi_restores_default() {
        let mut clock = Clock::new(0, 10);
        let t0 = Instant::now();
        clock.start(t0);
        clock.stop_and_consume(t0 + secs(4));
        assert_eq!(clock.byoyomi(), 6);
        clock.reset_byoyomi();
        assert_eq!(clock.byoyomi(), 10);
    }

    #[test]
    fn test_halt_bills_nothing() {
        let mut clock = Clock::new(10, 5);
        let t0 = Instant::now();
        clock.start(t0);
        clock.halt();
        assert!(!clock.is_running());
        assert_eq!(clock.remaining_main(), 10);
        assert_eq!(clock.byoyomi(), 5);
    }

    #[test]
    fn test_stop_without_start_is_zero() {
        let mut clock = Clock::new(10, 5);
        assert_eq!(clock.stop_and_consume(Instant::now()), 0);
        assert_eq!(clock.remaining_main(), 10);
    }

    #[test]
    fn test_peek_projects_without_mutating() {
        let mut clock = Clock::new(10, 5);
        let t0 = Instant::now();
        clock.start(t0);

        let reading = clock.peek(t0 + Duration::from_millis(3200));
        assert_eq!(reading, ClockReading { main: 7, byoyomi: 5 });

        // Stored state untouched, still running.
        assert_eq!(clock.remaining_main(), 10);
        assert!(clock.is_running());

        // Idempotent for the same instant.
        let again = clock.peek(t0 + Duration::from_millis(3200));
        assert_eq!(reading, again);
    }

    #[test]
    fn test_peek_counts_down_byoyomi() {
        let mut clock = Clock::new(2, 30);
        let t0 = Instant::now();
        clock.start(t0);
        let reading = clock.peek(t0 + secs(12));
        assert_eq!(reading.main, 0);
        assert_eq!(reading.byoyomi, 20);
    }

    #[test]
    fn test_peek_on_stopped_clock_reports_stored_values() {
        let clock = Clock::new(42, 7);
        let reading = clock.peek(Instant::now() + secs(1000));
        assert_eq!(reading, ClockReading { main: 42, byoyomi: 7 });
    }

    #[test]
    fn test_fast_move_projection_still_shows_one_second_bill() {
        let mut clock = Clock::new(10, 5);
        let t0 = Instant::now();
        clock.start(t0);
        let reading = clock.peek(t0 + Duration::from_millis(400));
        // min-one-second billing applies to the projection as well, and the
        // negative remainder never touches byoyomi.
        assert_eq!(reading, ClockReading { main: 9, byoyomi: 5 });
    }
}
