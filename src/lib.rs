//! Terminal lyric visualizer: a starfield and particle animation redrawn on a
//! background thread while lyric lines are typed out underneath it.

pub mod clock;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod lyrics;
pub mod scene;
pub mod selftest;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AnimationConfig, AppConfig, PlaybackConfig};
pub use effects::{Effect, Emission};
pub use engine::{AnimationEngine, ExplosionHandle};
pub use error::{Result, VisualizerError};
pub use lyrics::{Exploder, LineMeta, LyricDriver, LyricEntry, LyricSheet, PlaybackOutcome};
pub use sink::TerminalSink;
