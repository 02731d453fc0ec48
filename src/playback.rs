use std::fmt;
use std::time::{Duration, Instant};

use crate::config::PlaybackConfig;

// ---------------------------------------------------------------------------
// Playback stepper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => f.write_str("stopped"),
            PlaybackState::Playing => f.write_str("playing"),
            PlaybackState::Paused => f.write_str("paused"),
        }
    }
}

/// What the views should show after a playback transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// The first `n` events of the filtered sequence.
    Prefix(usize),
    /// The whole filtered sequence.
    Full,
}

/// The recurring tick. At most one exists, owned by [`PlaybackStepper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimer {
    period: Duration,
    next_due: Instant,
}

impl TickTimer {
    fn start(now: Instant, period: Duration) -> Self {
        TickTimer {
            period,
            next_due: now + period,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Move to the next period. A late frame does not cause a burst of
    /// catch-up ticks; the schedule restarts from `now`.
    fn advance(&mut self, now: Instant) {
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
    }

    #[cfg(test)]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the next tick fires.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

/// Reveals the filtered sequence one event per tick.
///
/// The cursor counts revealed events and lives in `[0, len]`. Time is passed
/// in explicitly so the stepper stays a plain state machine.
#[derive(Debug, Clone)]
pub struct PlaybackStepper {
    state: PlaybackState,
    cursor: usize,
    interval: Duration,
    min_interval: Duration,
    step: Duration,
    timer: Option<TickTimer>,
}

impl PlaybackStepper {
    pub fn new(config: &PlaybackConfig) -> Self {
        let min_interval = Duration::from_millis(config.min_interval_ms);
        PlaybackStepper {
            state: PlaybackState::Stopped,
            cursor: 0,
            interval: Duration::from_millis(config.initial_interval_ms).max(min_interval),
            min_interval,
            step: Duration::from_millis(config.step_ms),
            timer: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timer(&self) -> Option<&TickTimer> {
        self.timer.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Play button: start when stopped, resume when paused.
    pub fn play(&mut self, now: Instant) {
        match self.state {
            PlaybackState::Stopped => self.start(now),
            PlaybackState::Paused => self.resume(now),
            PlaybackState::Playing => {}
        }
    }

    /// STOPPED → PLAYING with the cursor at 0.
    pub fn start(&mut self, now: Instant) {
        if self.state != PlaybackState::Stopped {
            return;
        }
        self.cursor = 0;
        self.state = PlaybackState::Playing;
        self.schedule(now);
        log::debug!("playback started at {:?}", self.interval);
    }

    /// PLAYING → PAUSED, keeping the cursor.
    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.cancel();
        self.state = PlaybackState::Paused;
        log::debug!("playback paused at cursor {}", self.cursor);
    }

    /// PAUSED → PLAYING from the retained cursor.
    pub fn resume(&mut self, now: Instant) {
        if self.state != PlaybackState::Paused {
            return;
        }
        self.state = PlaybackState::Playing;
        self.schedule(now);
        log::debug!("playback resumed at cursor {}", self.cursor);
    }

    /// Any state → STOPPED. The views must show the full selection afterwards.
    pub fn stop(&mut self) -> Frame {
        self.cancel();
        if self.state != PlaybackState::Stopped {
            log::debug!("playback stopped at cursor {}", self.cursor);
        }
        self.state = PlaybackState::Stopped;
        self.cursor = 0;
        Frame::Full
    }

    /// Shorten the interval by one step, never below the floor.
    pub fn speed_up(&mut self, now: Instant) {
        let faster = self.interval.saturating_sub(self.step).max(self.min_interval);
        self.set_interval(faster, now);
    }

    /// Lengthen the interval by one step. There is no ceiling.
    pub fn slow_down(&mut self, now: Instant) {
        let slower = self.interval + self.step;
        self.set_interval(slower, now);
    }

    fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.is_playing() {
            self.schedule(now);
        }
        log::debug!("playback interval {:?}", self.interval);
    }

    /// Fire the tick if it is due. `len` is the length of the filtered sequence.
    pub fn poll(&mut self, now: Instant, len: usize) -> Option<Frame> {
        let timer = self.timer.as_mut()?;
        if !timer.is_due(now) {
            return None;
        }
        timer.advance(now);
        self.tick(len)
    }

    /// One animation step: reveal `cursor + 1` events and advance. Revealing
    /// the last event stops playback. Does nothing unless playing.
    pub fn tick(&mut self, len: usize) -> Option<Frame> {
        if !self.is_playing() {
            return None;
        }
        if self.cursor >= len {
            return Some(self.stop());
        }
        self.cursor += 1;
        let frame = Frame::Prefix(self.cursor);
        if self.cursor >= len {
            self.stop();
        }
        Some(frame)
    }

    /// The old tick is always dropped before a new one is created.
    fn schedule(&mut self, now: Instant) {
        self.cancel();
        self.timer = Some(TickTimer::start(now, self.interval));
    }

    fn cancel(&mut self) {
        self.timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(initial: u64, floor: u64, step: u64) -> PlaybackConfig {
        PlaybackConfig {
            initial_interval_ms: initial,
            min_interval_ms: floor,
            step_ms: step,
        }
    }

    fn stepper() -> PlaybackStepper {
        PlaybackStepper::new(&config(100, 50, 50))
    }

    #[test]
    fn test_plays_through_in_exactly_n_ticks() {
        let mut s = stepper();
        s.start(Instant::now());

        let mut frames = Vec::new();
        let mut ticks = 0;
        while s.is_playing() {
            frames.extend(s.tick(4));
            ticks += 1;
            assert!(ticks <= 4, "ran past the end");
        }

        assert_eq!(ticks, 4);
        assert_eq!(
            frames,
            vec![Frame::Prefix(1), Frame::Prefix(2), Frame::Prefix(3), Frame::Prefix(4)]
        );
        assert_eq!(s.state(), PlaybackState::Stopped);
        assert_eq!(s.cursor(), 0);
        assert!(s.timer().is_none());
    }

    #[test]
    fn test_empty_sequence_stops_on_first_tick() {
        let mut s = stepper();
        s.start(Instant::now());
        assert_eq!(s.tick(0), Some(Frame::Full));
        assert_eq!(s.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_pause_resume_keeps_cursor() {
        let now = Instant::now();
        let mut s = stepper();
        s.start(now);
        s.tick(10);
        s.tick(10);
        s.tick(10);
        s.pause();
        assert_eq!(s.state(), PlaybackState::Paused);
        assert_eq!(s.cursor(), 3);
        assert!(s.timer().is_none());
        assert_eq!(s.tick(10), None, "paused stepper must not advance");

        s.resume(now);
        assert_eq!(s.cursor(), 3);
        assert_eq!(s.tick(10), Some(Frame::Prefix(4)));
    }

    #[test]
    fn test_play_button_dispatch() {
        let now = Instant::now();
        let mut s = stepper();
        s.play(now);
        assert!(s.is_playing());
        s.tick(5);
        s.pause();
        s.play(now);
        assert!(s.is_playing());
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn test_start_ignored_unless_stopped() {
        let now = Instant::now();
        let mut s = stepper();
        s.start(now);
        s.tick(5);
        s.start(now);
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn test_stop_resets_from_any_state() {
        let now = Instant::now();
        let mut s = stepper();
        assert_eq!(s.stop(), Frame::Full);
        assert_eq!(s.cursor(), 0);

        s.start(now);
        s.tick(5);
        s.tick(5);
        assert_eq!(s.stop(), Frame::Full);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.state(), PlaybackState::Stopped);

        s.start(now);
        s.tick(5);
        s.pause();
        s.stop();
        assert_eq!(s.cursor(), 0);
        assert!(s.timer().is_none());
    }

    #[test]
    fn test_slow_down_has_no_ceiling() {
        let now = Instant::now();
        let mut s = stepper();
        s.slow_down(now);
        s.slow_down(now);
        s.slow_down(now);
        assert_eq!(s.interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_speed_up_respects_floor() {
        let now = Instant::now();
        let mut s = PlaybackStepper::new(&config(120, 50, 50));
        s.speed_up(now);
        assert_eq!(s.interval(), Duration::from_millis(70));
        s.speed_up(now);
        assert_eq!(s.interval(), Duration::from_millis(50));
        s.speed_up(now);
        assert_eq!(s.interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_initial_interval_is_clamped_to_floor() {
        let s = PlaybackStepper::new(&config(10, 50, 50));
        assert_eq!(s.interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_speed_change_while_playing_reschedules() {
        let t0 = Instant::now();
        let mut s = stepper();
        s.start(t0);
        s.tick(10);
        s.tick(10);

        let t1 = t0 + Duration::from_millis(30);
        s.slow_down(t1);
        let timer = s.timer().copied().unwrap();
        assert_eq!(timer.period(), Duration::from_millis(150));
        assert_eq!(timer.remaining(t1), Duration::from_millis(150));
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn test_speed_change_while_paused_does_not_schedule() {
        let now = Instant::now();
        let mut s = stepper();
        s.start(now);
        s.pause();
        s.speed_up(now);
        assert!(s.timer().is_none());
        s.resume(now);
        assert_eq!(s.timer().map(TickTimer::period), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_poll_fires_once_per_period() {
        let t0 = Instant::now();
        let mut s = stepper();
        s.start(t0);

        assert_eq!(s.poll(t0 + Duration::from_millis(99), 3), None);
        assert_eq!(s.poll(t0 + Duration::from_millis(100), 3), Some(Frame::Prefix(1)));
        // same instant again: next tick is not due yet
        assert_eq!(s.poll(t0 + Duration::from_millis(100), 3), None);
        assert_eq!(s.poll(t0 + Duration::from_millis(200), 3), Some(Frame::Prefix(2)));
    }

    #[test]
    fn test_late_poll_does_not_burst() {
        let t0 = Instant::now();
        let mut s = stepper();
        s.start(t0);

        let late = t0 + Duration::from_millis(1_000);
        assert_eq!(s.poll(late, 10), Some(Frame::Prefix(1)));
        assert_eq!(s.poll(late, 10), None);
        let timer = s.timer().copied().unwrap();
        assert_eq!(timer.remaining(late), Duration::from_millis(100));
    }

    #[test]
    fn test_resume_twice_keeps_single_timer() {
        let t0 = Instant::now();
        let mut s = stepper();
        s.start(t0);
        s.pause();
        s.resume(t0);
        s.resume(t0 + Duration::from_millis(10));

        // one timer, still anchored at the first resume
        let timer = s.timer().copied().unwrap();
        assert_eq!(timer.remaining(t0), Duration::from_millis(100));
        assert_eq!(s.poll(t0 + Duration::from_millis(100), 5), Some(Frame::Prefix(1)));
        assert_eq!(s.poll(t0 + Duration::from_millis(100), 5), None);
    }

    #[test]
    fn test_poll_when_stopped_is_noop() {
        let mut s = stepper();
        assert_eq!(s.poll(Instant::now(), 3), None);
    }
}
