//! Playback-rate driving
//!
//! Each frame the driver samples the speed curve at the current playback
//! position and writes the resulting rate back to the time source.

use crate::curve::SpeedCurve;

/// Default speed multiplier at full curve deflection.
pub const DEFAULT_MAX_SPEED: f32 = 6.0;

/// Something that plays back over time, e.g. a video element.
pub trait TimeSource {
    /// Current playback position in milliseconds
    fn current_time_ms(&self) -> f64;
    /// Total length in milliseconds
    fn duration_ms(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f32);
}

/// Simulated looping clock.
///
/// Advances by wall-clock time scaled by the playback rate and wraps at the
/// end. Useful as a stand-in for a real video element.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    duration_ms: f64,
    current_time_ms: f64,
    rate: f32,
}

impl Ticker {
    pub const DEFAULT_DURATION_MS: f64 = 5000.0;

    pub fn new(duration_ms: f64) -> Self {
        let duration_ms = if duration_ms.is_finite() && duration_ms > 0.0 {
            duration_ms
        } else {
            Self::DEFAULT_DURATION_MS
        };
        Self {
            duration_ms,
            current_time_ms: 0.0,
            rate: 1.0,
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Move the playhead by `elapsed_ms` of wall-clock time.
    pub fn advance(&mut self, elapsed_ms: f64) {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return;
        }
        let next = self.current_time_ms + elapsed_ms * f64::from(self.rate);
        self.current_time_ms = next.rem_euclid(self.duration_ms);
    }

    /// Jump to an absolute position, wrapped into the duration.
    pub fn seek(&mut self, time_ms: f64) {
        if time_ms.is_finite() {
            self.current_time_ms = time_ms.rem_euclid(self.duration_ms);
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION_MS)
    }
}

impl TimeSource for Ticker {
    fn current_time_ms(&self) -> f64 {
        self.current_time_ms
    }

    fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn set_playback_rate(&mut self, rate: f32) {
        if rate.is_finite() {
            self.rate = rate;
        }
    }
}

/// Result of one applied tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
    /// Playback position in `[0, 1]`
    pub normalized_time: f32,
    pub current_time_ms: f64,
    /// Rate written to the time source
    pub speed: f32,
}

impl PlaybackStatus {
    /// Speed as shown next to the canvas, e.g. `4.00x`.
    #[must_use]
    pub fn speed_label(&self) -> String {
        format!("{:.2}x", self.speed)
    }

    /// Position in seconds, e.g. `1.25s`.
    #[must_use]
    pub fn time_label(&self) -> String {
        format!("{:.2}s", self.current_time_ms / 1000.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackDriver {
    max_speed: f32,
}

impl PlaybackDriver {
    pub fn new(max_speed: f32) -> Self {
        let max_speed = if max_speed.is_finite() && max_speed >= 0.0 {
            max_speed
        } else {
            DEFAULT_MAX_SPEED
        };
        Self { max_speed }
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Map a speed bias (positive = faster) to a playback rate.
    ///
    /// Symmetric in the multiplicative sense: `+y` speeds up by the same
    /// factor that `-y` slows down.
    #[must_use]
    #[inline]
    pub fn speed_for(&self, y: f32) -> f32 {
        if y >= 0.0 {
            y * self.max_speed + 1.0
        } else {
            1.0 / (-y * self.max_speed + 1.0)
        }
    }

    /// Sample the curve at the source's position and update its rate.
    ///
    /// Returns `None` and leaves the source untouched when the position is
    /// outside the curve's active window or any value is not finite.
    pub fn tick<S: TimeSource + ?Sized>(
        &self,
        curve: &SpeedCurve,
        source: &mut S,
    ) -> Option<PlaybackStatus> {
        let current = source.current_time_ms();
        let duration = source.duration_ms();
        if !current.is_finite() || !duration.is_finite() || duration <= 0.0 {
            log::trace!("tick skipped, bad timing {current}/{duration}");
            return None;
        }

        let t = (current / duration) as f32;
        let Some(bias) = curve.evaluate(t) else {
            log::trace!("tick skipped, no curve value at t={t}");
            return None;
        };

        // Curve space grows downward, so up on screen means faster.
        let speed = self.speed_for(-bias);
        if !speed.is_finite() {
            return None;
        }

        source.set_playback_rate(speed);
        log::trace!("t={t:.3} speed={speed:.3}");
        Some(PlaybackStatus {
            normalized_time: t,
            current_time_ms: current,
            speed,
        })
    }
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED)
    }
}
