use super::LyricEntry;
use crate::clock::Clock;
use crate::config::{seconds, PlaybackConfig};
use crate::effects::Effect;
use crate::engine::{AnimationEngine, ExplosionHandle};
use crate::error::Result;
use crate::scene::{Tone, RESET};
use crate::sink::TerminalSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Every entry whose index is a multiple of this sets off a burst.
const EXPLOSION_EVERY: usize = 3;
const DEFAULT_LINE_TONE: Tone = Tone::BrightWhite;

/// Anything that can set off a particle burst.
pub trait Exploder {
    fn explode(&self, x: f32, y: f32, count: usize);
}

impl Exploder for ExplosionHandle {
    fn explode(&self, x: f32, y: f32, count: usize) {
        ExplosionHandle::explode(self, x, y, count);
    }
}

impl Exploder for AnimationEngine {
    fn explode(&self, x: f32, y: f32, count: usize) {
        AnimationEngine::explode(self, x, y, count);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    /// Stopped before the entry at index `at` started.
    Cancelled { at: usize },
}

/// Types lyric entries in order, pacing itself with blocking waits.
pub struct LyricDriver<'a> {
    sink: TerminalSink,
    clock: &'a dyn Clock,
    exploder: &'a dyn Exploder,
    playback: PlaybackConfig,
    cancel: Arc<AtomicBool>,
    rng: fastrand::Rng,
}

impl<'a> LyricDriver<'a> {
    pub fn new(
        sink: TerminalSink,
        clock: &'a dyn Clock,
        exploder: &'a dyn Exploder,
        playback: PlaybackConfig,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sink,
            clock,
            exploder,
            playback,
            cancel,
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Plays every entry, then the finale. The cancel flag is checked before
    /// each entry; a raised flag ends playback without the finale.
    pub fn play(&mut self, entries: &[LyricEntry]) -> Result<PlaybackOutcome> {
        for (index, entry) in entries.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::info!(at = index, "playback cancelled");
                return Ok(PlaybackOutcome::Cancelled { at: index });
            }

            if entry.is_blank() {
                let pause = entry.meta.pause.unwrap_or(self.playback.empty_line_delay);
                self.clock.sleep(seconds(pause));
                continue;
            }

            if index % EXPLOSION_EVERY == 0 {
                self.burst();
            }

            self.render_line(entry)?;

            let line_delay = entry.meta.line_delay.unwrap_or(self.playback.line_delay);
            self.clock.sleep(seconds(line_delay));
        }

        tracing::info!(entries = entries.len(), "playback finished");
        self.exploder.explode(
            self.playback.finale_x,
            self.playback.finale_y,
            self.playback.finale_count,
        );
        self.clock.sleep(seconds(self.playback.cooldown));
        Ok(PlaybackOutcome::Completed)
    }

    /// Random burst inside the part of the screen that is always visible.
    fn burst(&mut self) {
        let x = self.rng.usize(10..=70) as f32;
        let y = self.rng.usize(5..=20) as f32;
        let count = self.rng.usize(15..=30);
        self.exploder.explode(x, y, count);
    }

    fn render_line(&self, entry: &LyricEntry) -> Result<()> {
        let delay = seconds(entry.meta.delay.unwrap_or(self.playback.char_delay));

        match entry.meta.effect() {
            Some(effect) => {
                tracing::debug!(effect = effect.name(), text = %entry.text, "line");
                effect.type_line(&entry.text, delay, &self.sink, self.clock)?;
            }
            None => {
                tracing::debug!(text = %entry.text, "line");
                let tone = entry.meta.color.unwrap_or(DEFAULT_LINE_TONE);
                self.sink.write_str(tone.escape())?;
                Effect::Typewriter.type_line(&entry.text, delay, &self.sink, self.clock)?;
                self.sink.write_str(RESET)?;
            }
        }
        Ok(())
    }
}
