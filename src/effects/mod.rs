use crate::clock::Clock;
use crate::scene::{Tone, BOLD, RESET};
use crate::sink::TerminalSink;
use std::io;
use std::iter::Enumerate;
use std::str::Chars;
use std::time::Duration;

pub const DEFAULT_RAINBOW: [Tone; 5] = [
    Tone::Red,
    Tone::Yellow,
    Tone::Green,
    Tone::Cyan,
    Tone::Magenta,
];
pub const DEFAULT_GLOW: Tone = Tone::BrightCyan;

/// How a lyric line is typed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Characters written verbatim.
    Typewriter,
    /// Each character wrapped in the next palette color.
    Rainbow { palette: Vec<Tone> },
    /// Every character bold in one base color.
    Glow { color: Tone },
}

/// One step of typing: write `text`, then wait `wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub text: String,
    pub wait: Duration,
}

impl Effect {
    pub fn rainbow() -> Self {
        Effect::Rainbow {
            palette: DEFAULT_RAINBOW.to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effect::Typewriter => "typewriter",
            Effect::Rainbow { .. } => "rainbow",
            Effect::Glow { .. } => "glow",
        }
    }

    /// Steps for typing `text`, one per character plus a trailing line break.
    /// Steps are produced lazily so time-dependent styling sees the clock as
    /// it is when the character is actually written.
    pub fn emissions<'a>(
        &'a self,
        text: &'a str,
        delay: Duration,
        clock: &'a dyn Clock,
    ) -> Emissions<'a> {
        Emissions {
            effect: self,
            chars: text.chars().enumerate(),
            delay,
            clock,
            finished: false,
        }
    }

    pub fn type_line(
        &self,
        text: &str,
        delay: Duration,
        sink: &TerminalSink,
        clock: &dyn Clock,
    ) -> io::Result<()> {
        play(self.emissions(text, delay, clock), sink, clock)
    }

    fn style(&self, index: usize, ch: char, clock: &dyn Clock) -> String {
        match self {
            Effect::Typewriter => ch.to_string(),
            Effect::Rainbow { palette } => {
                let palette = if palette.is_empty() { &DEFAULT_RAINBOW[..] } else { &palette[..] };
                let tone = palette[index % palette.len()];
                format!("{}{ch}{RESET}", tone.escape())
            }
            Effect::Glow { color } => {
                // The pulse does not change the output yet: every character
                // gets the same bold base color.
                let intensity = glow_intensity(index, clock.elapsed().as_secs_f32());
                tracing::trace!(index, intensity, "glow");
                format!("{BOLD}{}{ch}{RESET}", color.escape())
            }
        }
    }
}

/// Pulse value in [0, 1] for the character at `index` at time `seconds`.
pub fn glow_intensity(index: usize, seconds: f32) -> f32 {
    0.5 + 0.5 * (index as f32 * 0.5 + seconds * 5.0).sin()
}

pub struct Emissions<'a> {
    effect: &'a Effect,
    chars: Enumerate<Chars<'a>>,
    delay: Duration,
    clock: &'a dyn Clock,
    finished: bool,
}

impl Iterator for Emissions<'_> {
    type Item = Emission;

    fn next(&mut self) -> Option<Emission> {
        if let Some((index, ch)) = self.chars.next() {
            return Some(Emission {
                text: self.effect.style(index, ch, self.clock),
                wait: self.delay,
            });
        }
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(Emission {
            text: "\n".to_string(),
            wait: Duration::ZERO,
        })
    }
}

/// Writes each step to the sink in order and waits after it.
pub fn play(
    emissions: impl IntoIterator<Item = Emission>,
    sink: &TerminalSink,
    clock: &dyn Clock,
) -> io::Result<()> {
    for emission in emissions {
        sink.write_str(&emission.text)?;
        clock.sleep(emission.wait);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const DELAY: Duration = Duration::from_millis(50);

    fn texts(effect: &Effect, text: &str) -> Vec<String> {
        let clock = ManualClock::new();
        effect.emissions(text, DELAY, &clock).map(|e| e.text).collect()
    }

    #[test]
    fn typewriter_emits_verbatim_and_ends_with_newline() {
        let clock = ManualClock::new();
        let steps: Vec<_> = Effect::Typewriter.emissions("hé!", DELAY, &clock).collect();

        let text: String = steps.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(text, "hé!\n");
        assert_eq!(steps.len(), 4);
        assert!(steps[..3].iter().all(|e| e.wait == DELAY));
        assert_eq!(steps[3].wait, Duration::ZERO);
    }

    #[test]
    fn empty_text_still_breaks_the_line() {
        assert_eq!(texts(&Effect::Typewriter, ""), vec!["\n".to_string()]);
    }

    #[test]
    fn rainbow_cycles_the_palette_by_index() {
        let effect = Effect::Rainbow {
            palette: vec![Tone::Red, Tone::Blue],
        };
        let steps = texts(&effect, "abc");

        assert_eq!(steps[0], "\x1b[31ma\x1b[0m");
        assert_eq!(steps[1], "\x1b[34mb\x1b[0m");
        assert_eq!(steps[2], "\x1b[31mc\x1b[0m");
        assert_eq!(steps[3], "\n");
    }

    #[test]
    fn rainbow_with_empty_palette_uses_default() {
        let steps = texts(&Effect::Rainbow { palette: Vec::new() }, "abcdef");
        assert_eq!(steps[0], format!("{}a{RESET}", Tone::Red.escape()));
        assert_eq!(steps[4], format!("{}e{RESET}", Tone::Magenta.escape()));
        assert_eq!(steps[5], format!("{}f{RESET}", Tone::Red.escape()));
    }

    #[test]
    fn glow_applies_bold_base_color_to_every_char() {
        let effect = Effect::Glow { color: Tone::Yellow };
        let steps = texts(&effect, "ok");
        assert_eq!(steps[0], "\x1b[1m\x1b[33mo\x1b[0m");
        assert_eq!(steps[1], "\x1b[1m\x1b[33mk\x1b[0m");
    }

    #[test]
    fn glow_intensity_pulses_between_zero_and_one() {
        assert!((glow_intensity(0, 0.0) - 0.5).abs() < 1e-6);
        let peak = std::f32::consts::FRAC_PI_2 / 5.0;
        assert!((glow_intensity(0, peak) - 1.0).abs() < 1e-5);
        for i in 0..100 {
            let value = glow_intensity(i, i as f32 * 0.37);
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn play_writes_in_order_and_waits_per_char() {
        let (sink, captured) = TerminalSink::in_memory();
        let clock = ManualClock::new();

        Effect::Typewriter.type_line("abc", DELAY, &sink, &clock).unwrap();

        assert_eq!(captured.contents(), "abc\n");
        assert_eq!(clock.sleeps(), vec![DELAY, DELAY, DELAY, Duration::ZERO]);
    }
}
