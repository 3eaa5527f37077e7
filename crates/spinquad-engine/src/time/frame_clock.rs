use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

/// Timing snapshot handed to the frame callback.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped to the clock's range.
    pub dt: f32,
    /// Exponentially smoothed `dt`.
    pub smoothed_dt: f32,
    pub now: Instant,
    /// Zero-based tick counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// A zero-length first frame, for driving a scene without a clock.
    pub fn first() -> Self {
        Self {
            dt: 0.0,
            smoothed_dt: 0.0,
            now: Instant::now(),
            frame_index: 0,
        }
    }

    /// Frames per second implied by `smoothed_dt`, or 0 before any interval is known.
    pub fn fps(&self) -> f32 {
        if self.smoothed_dt > 0.0 {
            1.0 / self.smoothed_dt
        } else {
            0.0
        }
    }
}

/// Ticks once per redraw.
///
/// The quad advances per frame rather than per second, so the clock only
/// supplies frame indices and pacing for logs.
#[derive(Debug, Clone)]
pub struct FrameClock {
    previous: Instant,
    ticks: u64,
    range: RangeInclusive<Duration>,
    smoothing: f32,
    smoothed_dt: f32,
}

impl FrameClock {
    pub const DEFAULT_RANGE: RangeInclusive<Duration> =
        Duration::from_micros(100)..=Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_range(Self::DEFAULT_RANGE)
    }

    /// `range` bounds every reported `dt`.
    pub fn with_range(range: RangeInclusive<Duration>) -> Self {
        debug_assert!(range.start() <= range.end());
        Self {
            previous: Instant::now(),
            ticks: 0,
            range,
            smoothing: 0.1,
            smoothed_dt: 0.0,
        }
    }

    /// Restarts the interval; used after a resize stalls the loop.
    pub fn reset(&mut self) {
        self.previous = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.record(elapsed, now)
    }

    fn record(&mut self, elapsed: Duration, now: Instant) -> FrameTime {
        let dt = elapsed
            .clamp(*self.range.start(), *self.range.end())
            .as_secs_f32();

        self.smoothed_dt = if self.ticks == 0 {
            dt
        } else {
            self.smoothed_dt + (dt - self.smoothed_dt) * self.smoothing
        };

        let time = FrameTime {
            dt,
            smoothed_dt: self.smoothed_dt,
            now,
            frame_index: self.ticks,
        };
        self.ticks = self.ticks.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_count_up_from_zero() {
        let mut clock = FrameClock::new();
        let indices: Vec<u64> = (0..3).map(|_| clock.tick().frame_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn dt_is_clamped_to_range() {
        let mut clock =
            FrameClock::with_range(Duration::from_millis(5)..=Duration::from_millis(10));
        let now = Instant::now();

        assert_eq!(clock.record(Duration::ZERO, now).dt, 0.005);
        assert_eq!(clock.record(Duration::from_secs(3), now).dt, 0.01);
    }

    #[test]
    fn smoothing_converges_on_steady_rate() {
        let mut clock = FrameClock::new();
        let now = Instant::now();

        let mut time = FrameTime::first();
        for _ in 0..200 {
            time = clock.record(Duration::from_millis(16), now);
        }

        assert!((time.smoothed_dt - 0.016).abs() < 1e-4);
        assert!((time.fps() - 62.5).abs() < 0.5);
    }

    #[test]
    fn first_frame_has_no_rate() {
        assert_eq!(FrameTime::first().fps(), 0.0);
    }
}
