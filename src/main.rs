use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::ResetColor,
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use lyricsaver::selftest;
use lyricsaver::{
    AnimationEngine, AppConfig, LyricDriver, LyricSheet, PlaybackOutcome, Result, SystemClock,
    TerminalSink,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Types song lyrics over a drifting starfield",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,
    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Mode {
    /// Play the lyric sheet (default).
    Run,
    /// Play a short sheet that shows off every effect.
    Demo,
    /// Run an off-screen self check and report the results.
    Test,
}

#[derive(Args, Debug)]
struct Options {
    /// Lyric sheet to play instead of the built-in one (JSON).
    #[arg(long, global = true)]
    lyrics: Option<PathBuf>,
    /// Animation width in columns.
    #[arg(long, global = true)]
    width: Option<usize>,
    /// Animation height in rows.
    #[arg(long, global = true)]
    height: Option<usize>,
    /// Number of background stars.
    #[arg(long, global = true)]
    stars: Option<usize>,
    /// Animation frame rate.
    #[arg(long, global = true)]
    fps: Option<u32>,
    /// Default seconds between typed characters.
    #[arg(long, global = true)]
    char_delay: Option<f32>,
    /// Write diagnostics to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

impl Options {
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        let animation = &mut config.animation;
        if let Some(width) = self.width {
            animation.width = width;
        }
        if let Some(height) = self.height {
            animation.height = height;
        }
        if let Some(stars) = self.stars {
            animation.star_count = stars;
        }
        if let Some(fps) = self.fps {
            animation.fps = fps;
        }
        if let Some(char_delay) = self.char_delay {
            config.playback.char_delay = char_delay;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.options.log_file.as_deref()) {
        eprintln!("lyricsaver: cannot open log file: {err}");
        return ExitCode::FAILURE;
    }

    let config = cli.options.apply(AppConfig::default());
    let mode = cli.mode.unwrap_or(Mode::Run);
    tracing::info!(?mode, ?config, "starting");

    let sheet = match mode {
        Mode::Test => return self_test(&config),
        Mode::Demo => LyricSheet::demo(),
        Mode::Run => match &cli.options.lyrics {
            Some(path) => LyricSheet::load(path),
            None => LyricSheet::builtin(),
        },
    };

    match sheet.and_then(|sheet| perform(&config, &sheet)) {
        Ok(PlaybackOutcome::Completed) => ExitCode::SUCCESS,
        Ok(PlaybackOutcome::Cancelled { .. }) => ExitCode::from(130),
        Err(err) => {
            tracing::error!(%err, "playback failed");
            eprintln!("lyricsaver: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Sets up the screen, runs the animation and the lyrics side by side, and
/// always puts the terminal back afterwards.
fn perform(config: &AppConfig, sheet: &LyricSheet) -> Result<PlaybackOutcome> {
    let sink = TerminalSink::stdout();
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst))?;
    }

    tracing::info!(sheet = %sheet.name, lines = sheet.lines(), "playing");
    setup_terminal(&sink, config)?;

    let mut engine = AnimationEngine::new(config.animation.clone(), sink.clone());
    let outcome = match engine.start() {
        Ok(()) => {
            let clock = SystemClock::new();
            let exploder = engine.handle();
            LyricDriver::new(sink.clone(), &clock, &exploder, config.playback.clone(), cancel)
                .play(&sheet.entries)
        }
        Err(err) => Err(err),
    };
    engine.stop();

    let restored = restore_terminal(&sink);
    let outcome = outcome?;
    restored?;
    Ok(outcome)
}

fn setup_terminal(sink: &TerminalSink, config: &AppConfig) -> std::io::Result<()> {
    // Lyrics are typed below the animation area.
    let lyric_row = u16::try_from(config.animation.height + 1).unwrap_or(u16::MAX);
    sink.with_writer(|out| {
        execute!(
            out,
            EnterAlternateScreen,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, lyric_row)
        )
    })
}

fn restore_terminal(sink: &TerminalSink) -> std::io::Result<()> {
    sink.with_writer(|out| execute!(out, ResetColor, Show, LeaveAlternateScreen))
}

fn self_test(config: &AppConfig) -> ExitCode {
    let checks = selftest::run(config);
    for check in &checks {
        match &check.outcome {
            Ok(detail) => println!("ok    {:<10} {detail}", check.name),
            Err(detail) => println!("FAIL  {:<10} {detail}", check.name),
        }
    }

    if checks.iter().all(selftest::Check::passed) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_tracing(log_file: Option<&Path>) -> std::io::Result<()> {
    // stdout is the display, so diagnostics never go there.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::parse_from([
            "lyricsaver",
            "demo",
            "--width",
            "100",
            "--fps",
            "20",
            "--char-delay",
            "0.02",
        ]);
        assert!(matches!(cli.mode, Some(Mode::Demo)));

        let config = cli.options.apply(AppConfig::default());
        assert_eq!(config.animation.width, 100);
        assert_eq!(config.animation.height, 24);
        assert_eq!(config.animation.fps, 20);
        assert_eq!(config.playback.char_delay, 0.02);
    }

    #[test]
    fn mode_defaults_to_none() {
        let cli = Cli::parse_from(["lyricsaver"]);
        assert!(cli.mode.is_none());
        assert!(cli.options.lyrics.is_none());
    }

    #[test]
    fn terminal_setup_and_restore_write_escapes() {
        let (sink, captured) = TerminalSink::in_memory();
        setup_terminal(&sink, &AppConfig::default()).unwrap();
        restore_terminal(&sink).unwrap();

        let output = captured.contents();
        assert!(output.contains("\x1b[?25l"));
        assert!(output.contains("\x1b[?25h"));
    }
}
