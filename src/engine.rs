use crate::config::AnimationConfig;
use crate::error::{Result, VisualizerError};
use crate::scene::{FrameBuffer, Layer, ParticleSystem, StarField};
use crate::sink::TerminalSink;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How long `stop` waits for the animation thread to acknowledge.
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything a tick touches. Held behind one lock: a tick keeps it for the
/// whole advance/render/write, and explosions append under it.
struct Scene {
    stars: StarField,
    particles: ParticleSystem,
    frame: FrameBuffer,
    star_count: usize,
    stopped: bool,
    frames: u64,
}

enum Tick {
    Rendered,
    Stopped,
}

impl Scene {
    fn tick(&mut self, sink: &TerminalSink) -> io::Result<Tick> {
        if self.stopped {
            return Ok(Tick::Stopped);
        }

        self.particles.update();
        self.stars.update();

        self.frame.clear();
        self.stars.draw(&mut self.frame);
        self.particles.draw(&mut self.frame);
        sink.write_str(self.frame.to_frame_string())?;

        self.frames += 1;
        Ok(Tick::Rendered)
    }
}

fn lock(scene: &Mutex<Scene>) -> MutexGuard<'_, Scene> {
    scene.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Worker {
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

/// Starfield and particle animation redrawn on a background thread at a fixed
/// frame rate.
///
/// The engine is idle until [`start`](Self::start) and returns to idle after
/// [`stop`](Self::stop); it can be started again afterwards.
pub struct AnimationEngine {
    config: AnimationConfig,
    sink: TerminalSink,
    scene: Arc<Mutex<Scene>>,
    worker: Option<Worker>,
}

impl AnimationEngine {
    pub fn new(config: AnimationConfig, sink: TerminalSink) -> Self {
        let scene = Scene {
            stars: StarField::new(config.width, config.height),
            particles: ParticleSystem::new(config.width, config.height),
            frame: FrameBuffer::new(config.width, config.height),
            star_count: config.star_count,
            stopped: true,
            frames: 0,
        };
        Self {
            config,
            sink,
            scene: Arc::new(Mutex::new(scene)),
            worker: None,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            tracing::debug!("animation already running");
            return Ok(());
        }
        // Reaps a loop that ended on a failed tick.
        self.stop();

        {
            let mut scene = lock(&self.scene);
            let count = scene.star_count;
            scene.stars.initialize(count);
            scene.stopped = false;
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();
        let scene = Arc::clone(&self.scene);
        let sink = self.sink.clone();
        let period = self.config.frame_period();

        let spawned = std::thread::Builder::new()
            .name("animation".into())
            .spawn(move || {
                run_loop(&scene, &sink, period, &stop_rx);
                let _ = done_tx.send(());
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                lock(&self.scene).stopped = true;
                return Err(VisualizerError::Thread(err));
            }
        };

        tracing::info!(
            fps = self.config.fps,
            stars = self.config.star_count,
            "animation started"
        );
        self.worker = Some(Worker {
            stop_tx,
            done_rx,
            handle,
        });
        Ok(())
    }

    /// Stops the tick loop. No tick runs once this returns. Calling it on an
    /// idle engine does nothing.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // Waits out a tick in progress; every later tick sees the flag.
        lock(&self.scene).stopped = true;
        let _ = worker.stop_tx.send(());

        match worker.done_rx.recv_timeout(STOP_TIMEOUT) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    tracing::warn!("animation thread panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(timeout = ?STOP_TIMEOUT, "animation thread did not exit in time");
            }
        }

        tracing::info!(frames = self.frames_rendered(), "animation stopped");
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Spawns a burst of particles. Safe to call from any thread at any time;
    /// bursts added while idle are simply never drawn.
    pub fn explode(&self, x: f32, y: f32, count: usize) {
        self.handle().explode(x, y, count);
    }

    /// Cloneable handle for spawning bursts from other threads.
    pub fn handle(&self) -> ExplosionHandle {
        ExplosionHandle {
            scene: Arc::clone(&self.scene),
        }
    }

    pub fn particle_count(&self) -> usize {
        lock(&self.scene).particles.len()
    }

    pub fn frames_rendered(&self) -> u64 {
        lock(&self.scene).frames
    }
}

impl Drop for AnimationEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Clone)]
pub struct ExplosionHandle {
    scene: Arc<Mutex<Scene>>,
}

impl ExplosionHandle {
    pub fn explode(&self, x: f32, y: f32, count: usize) {
        tracing::debug!(x, y, count, "explosion");
        lock(&self.scene).particles.explode(x, y, count);
    }
}

fn run_loop(scene: &Mutex<Scene>, sink: &TerminalSink, period: Duration, stop_rx: &Receiver<()>) {
    loop {
        let started = Instant::now();

        match panic::catch_unwind(AssertUnwindSafe(|| lock(scene).tick(sink))) {
            Ok(Ok(Tick::Rendered)) => {}
            Ok(Ok(Tick::Stopped)) => break,
            Ok(Err(err)) => {
                tracing::error!(%err, "animation tick failed, animation stopped");
                break;
            }
            Err(_) => {
                tracing::error!("animation tick panicked, animation stopped");
                break;
            }
        }

        let wait = period.saturating_sub(started.elapsed());
        match stop_rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
