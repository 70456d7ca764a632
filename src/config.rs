use std::time::Duration;

/// Top-level configuration, assembled once at startup from defaults and CLI flags.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub animation: AnimationConfig,
    pub playback: PlaybackConfig,
}

/// Size and pacing of the starfield region.
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    pub width: usize,
    pub height: usize,
    pub star_count: usize,
    pub fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            star_count: 50,
            fps: 30,
        }
    }
}

impl AnimationConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

/// Default timings used when a lyric entry does not override them.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Seconds between typed characters.
    pub char_delay: f32,
    /// Seconds to hold after a completed line.
    pub line_delay: f32,
    /// Seconds to wait on a blank entry without a `pause`.
    pub empty_line_delay: f32,
    pub finale_x: f32,
    pub finale_y: f32,
    pub finale_count: usize,
    /// Seconds to let the finale play out before cleanup.
    pub cooldown: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            char_delay: 0.05,
            line_delay: 0.8,
            empty_line_delay: 1.0,
            finale_x: 40.0,
            finale_y: 12.0,
            finale_count: 80,
            cooldown: 2.0,
        }
    }
}

/// Converts a configured number of seconds into a wait. Negative or
/// non-finite values mean no wait; values too large for a `Duration`
/// saturate instead of panicking.
pub fn seconds(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_period_matches_fps() {
        let config = AnimationConfig::default();
        let period = config.frame_period();
        assert!((period.as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_fps_does_not_divide_by_zero() {
        let config = AnimationConfig {
            fps: 0,
            ..AnimationConfig::default()
        };
        assert_eq!(config.frame_period(), Duration::from_secs(1));
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f32::NAN), Duration::ZERO);
        assert_eq!(seconds(0.5), Duration::from_millis(500));
    }

    #[test]
    fn huge_seconds_saturate() {
        assert_eq!(seconds(1e20), Duration::MAX);
        assert_eq!(seconds(f32::MAX), Duration::MAX);
    }
}
