use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type Writer = Box<dyn Write + Send>;

/// Shared handle to the terminal output stream.
///
/// Both the animation thread and the lyric typing loop write through clones of
/// the same sink. Each call holds the lock for its whole write and flushes
/// before releasing it, so output from one writer stays in order while writes
/// from different writers may interleave between calls.
#[derive(Clone)]
pub struct TerminalSink {
    out: Arc<Mutex<Writer>>,
}

impl TerminalSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(BufWriter::with_capacity(1024 * 64, io::stdout()))
    }

    /// Sink that keeps everything written to it in memory.
    pub fn in_memory() -> (Self, Captured) {
        let captured = Captured::default();
        (Self::new(captured.clone()), captured)
    }

    pub fn write_str(&self, text: &str) -> io::Result<()> {
        let mut out = self.lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    /// Runs `f` against the locked writer and flushes afterwards.
    pub fn with_writer<T>(&self, f: impl FnOnce(&mut Writer) -> io::Result<T>) -> io::Result<T> {
        let mut out = self.lock();
        let value = f(&mut *out)?;
        out.flush()?;
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, Writer> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory byte buffer behind [`TerminalSink::in_memory`].
#[derive(Clone, Default)]
pub struct Captured {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_stream() {
        let (sink, captured) = TerminalSink::in_memory();
        let other = sink.clone();

        sink.write_str("ab").unwrap();
        other.write_str("cd").unwrap();

        assert_eq!(captured.contents(), "abcd");
    }

    #[test]
    fn with_writer_exposes_the_locked_stream() {
        let (sink, captured) = TerminalSink::in_memory();
        sink.with_writer(|out| out.write_all(b"\x1b[?25l")).unwrap();
        assert_eq!(captured.contents(), "\x1b[?25l");

        captured.clear();
        assert!(captured.is_empty());
    }
}
