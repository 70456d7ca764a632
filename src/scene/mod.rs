use serde::Deserialize;

pub mod frame;
pub mod particles;
pub mod stars;

pub use frame::{Cell, FrameBuffer};
pub use particles::{Glyph, Particle, ParticleSystem};
pub use stars::{Star, StarField};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

/// One drawable part of the animation. Layers are updated once per tick and
/// drawn in order, so later layers cover earlier ones.
pub trait Layer {
    fn update(&mut self);
    fn draw(&self, frame: &mut FrameBuffer);
}

/// Named foreground color used for lyric text and particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Tone {
    pub fn escape(self) -> &'static str {
        match self {
            Tone::Red => "\x1b[31m",
            Tone::Green => "\x1b[32m",
            Tone::Yellow => "\x1b[33m",
            Tone::Blue => "\x1b[34m",
            Tone::Magenta => "\x1b[35m",
            Tone::Cyan => "\x1b[36m",
            Tone::White => "\x1b[37m",
            Tone::BrightRed => "\x1b[91m",
            Tone::BrightGreen => "\x1b[92m",
            Tone::BrightYellow => "\x1b[93m",
            Tone::BrightBlue => "\x1b[94m",
            Tone::BrightMagenta => "\x1b[95m",
            Tone::BrightCyan => "\x1b[96m",
            Tone::BrightWhite => "\x1b[97m",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_parse_from_snake_case_names() {
        let tones: Vec<Tone> = serde_json::from_str(r#"["red", "bright_cyan"]"#).unwrap();
        assert_eq!(tones, vec![Tone::Red, Tone::BrightCyan]);
        assert_eq!(Tone::BrightCyan.escape(), "\x1b[96m");
    }
}
