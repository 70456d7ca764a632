//! Off-screen sanity run behind the `test` subcommand. Everything renders into
//! memory and time is virtual except for the engine, which runs for real for a
//! handful of frames.

use crate::clock::ManualClock;
use crate::config::AppConfig;
use crate::effects::Effect;
use crate::engine::AnimationEngine;
use crate::lyrics::{Exploder, LyricDriver, LyricSheet, PlaybackOutcome};
use crate::scene::{ParticleSystem, StarField};
use crate::sink::TerminalSink;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct Check {
    pub name: &'static str,
    pub outcome: std::result::Result<String, String>,
}

impl Check {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub fn run(config: &AppConfig) -> Vec<Check> {
    vec![
        check("particles", || particles(config)),
        check("stars", || stars(config)),
        check("effects", effects),
        check("engine", || engine(config)),
        check("lyrics", || lyrics(config)),
    ]
}

fn check(name: &'static str, f: impl FnOnce() -> std::result::Result<String, String>) -> Check {
    let outcome = f();
    match &outcome {
        Ok(detail) => tracing::debug!(name, %detail, "check passed"),
        Err(detail) => tracing::warn!(name, %detail, "check failed"),
    }
    Check { name, outcome }
}

fn particles(config: &AppConfig) -> std::result::Result<String, String> {
    let mut system = ParticleSystem::new(config.animation.width, config.animation.height);
    system.explode(10.0, 10.0, 5);
    if system.len() != 5 {
        return Err(format!("expected 5 particles, found {}", system.len()));
    }
    for _ in 0..200 {
        system.advance();
    }
    if !system.is_empty() {
        return Err(format!("{} particles outlived their life", system.len()));
    }
    Ok("burst spawned and expired".into())
}

fn stars(config: &AppConfig) -> std::result::Result<String, String> {
    let count = config.animation.star_count;
    let mut field = StarField::new(config.animation.width, config.animation.height);
    field.initialize(count);
    for _ in 0..500 {
        field.advance();
    }
    if field.len() != count {
        return Err(format!("expected {count} stars, found {}", field.len()));
    }
    Ok(format!("{count} stars recycled"))
}

fn effects() -> std::result::Result<String, String> {
    let clock = ManualClock::new();
    let text = "la la";
    let glow = Effect::Glow {
        color: crate::effects::DEFAULT_GLOW,
    };
    for effect in [Effect::Typewriter, Effect::rainbow(), glow] {
        let steps: Vec<_> = effect.emissions(text, Duration::ZERO, &clock).collect();
        if steps.len() != text.chars().count() + 1 {
            return Err(format!("{} produced {} steps", effect.name(), steps.len()));
        }
        if steps.last().map(|step| step.text.as_str()) != Some("\n") {
            return Err(format!("{} did not end the line", effect.name()));
        }
    }
    Ok("typewriter, rainbow, glow".into())
}

fn engine(config: &AppConfig) -> std::result::Result<String, String> {
    let (sink, captured) = TerminalSink::in_memory();
    let mut engine = AnimationEngine::new(config.animation.clone(), sink);
    engine.start().map_err(|err| err.to_string())?;
    engine.explode(
        config.animation.width as f32 / 2.0,
        config.animation.height as f32 / 2.0,
        20,
    );

    let deadline = Instant::now() + Duration::from_secs(2);
    while engine.frames_rendered() < 5 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    engine.stop();

    let frames = engine.frames_rendered();
    if frames < 5 {
        return Err(format!("only {frames} frames rendered"));
    }
    if !captured.contents().contains("\x1b[H") {
        return Err("frames never reached the sink".into());
    }
    Ok(format!("{frames} frames rendered"))
}

#[derive(Default)]
struct Counter(AtomicUsize);

impl Exploder for Counter {
    fn explode(&self, _x: f32, _y: f32, _count: usize) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn lyrics(config: &AppConfig) -> std::result::Result<String, String> {
    let sheet = LyricSheet::builtin().map_err(|err| err.to_string())?;
    let (sink, _captured) = TerminalSink::in_memory();
    let clock = ManualClock::new();
    let counter = Counter::default();

    let outcome = LyricDriver::new(
        sink,
        &clock,
        &counter,
        config.playback.clone(),
        Arc::new(AtomicBool::new(false)),
    )
    .play(&sheet.entries)
    .map_err(|err| err.to_string())?;

    if outcome != PlaybackOutcome::Completed {
        return Err(format!("playback ended with {outcome:?}"));
    }
    Ok(format!(
        "{} lines, {} bursts, {:.1}s of playback",
        sheet.lines(),
        counter.0.load(Ordering::Relaxed),
        clock.total_slept().as_secs_f32()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_checks_pass_with_defaults() {
        let checks = run(&AppConfig::default());
        for check in &checks {
            assert!(check.passed(), "{} failed: {:?}", check.name, check.outcome);
        }
    }
}
