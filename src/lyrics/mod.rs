use crate::effects::{DEFAULT_GLOW, DEFAULT_RAINBOW, Effect};
use crate::error::{Result, VisualizerError};
use crate::scene::Tone;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub mod driver;

pub use driver::{Exploder, LyricDriver, PlaybackOutcome};

const BUILTIN_SHEET: &str = include_str!("../../assets/lyrics.json");
const DEMO_SHEET: &str = include_str!("../../assets/demo.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectName {
    Typewriter,
    Rainbow,
    Glow,
}

/// Per-line settings. Every key is optional; keys not listed here end up in
/// `extra` and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LineMeta {
    /// Seconds per typed character.
    pub delay: Option<f32>,
    /// Seconds to wait on a blank line.
    pub pause: Option<f32>,
    pub effect: Option<EffectName>,
    pub color: Option<Tone>,
    /// Seconds to hold after the line is typed.
    pub line_delay: Option<f32>,
    pub palette: Option<Vec<Tone>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LineMeta {
    /// The effect named by `effect`, with its parameters filled from `palette`
    /// or `color`.
    pub fn effect(&self) -> Option<Effect> {
        let effect = match self.effect? {
            EffectName::Typewriter => Effect::Typewriter,
            EffectName::Rainbow => Effect::Rainbow {
                palette: self.palette.clone().unwrap_or_else(|| DEFAULT_RAINBOW.to_vec()),
            },
            EffectName::Glow => Effect::Glow {
                color: self.color.unwrap_or(DEFAULT_GLOW),
            },
        };
        Some(effect)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawEntry")]
pub struct LyricEntry {
    pub text: String,
    pub meta: LineMeta,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Bare(String),
    Pair(String, LineMeta),
}

impl From<RawEntry> for LyricEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Bare(text) => LyricEntry::new(text, LineMeta::default()),
            RawEntry::Pair(text, meta) => LyricEntry::new(text, meta),
        }
    }
}

impl LyricEntry {
    pub fn new(text: impl Into<String>, meta: LineMeta) -> Self {
        Self {
            text: text.into(),
            meta,
        }
    }

    pub fn line(text: impl Into<String>) -> Self {
        Self::new(text, LineMeta::default())
    }

    pub fn pause(seconds: f32) -> Self {
        Self::new(
            "",
            LineMeta {
                pause: Some(seconds),
                ..LineMeta::default()
            },
        )
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Ordered lyric entries, decoded from a JSON array of `text` or
/// `[text, {meta}]` items.
#[derive(Debug, Clone)]
pub struct LyricSheet {
    pub name: String,
    pub entries: Vec<LyricEntry>,
}

impl LyricSheet {
    pub fn parse(name: impl Into<String>, json: &str) -> Result<Self> {
        let name = name.into();
        match serde_json::from_str(json) {
            Ok(entries) => Ok(Self { name, entries }),
            Err(err) => Err(VisualizerError::lyrics(name, err)),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(path.display().to_string(), &json)
    }

    pub fn builtin() -> Result<Self> {
        Self::parse("built-in", BUILTIN_SHEET)
    }

    pub fn demo() -> Result<Self> {
        Self::parse("demo", DEMO_SHEET)
    }

    pub fn lines(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_blank()).count()
    }
}
