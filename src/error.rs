/// Result alias that carries the crate's [`VisualizerError`].
pub type Result<T> = std::result::Result<T, VisualizerError>;

#[derive(Debug, thiserror::Error)]
pub enum VisualizerError {
    /// Writing to the terminal or reading a lyric sheet failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A lyric sheet could not be decoded.
    #[error("invalid lyric sheet `{name}`: {source}")]
    Lyrics {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    /// The animation thread could not be spawned.
    #[error("failed to spawn animation thread: {0}")]
    Thread(std::io::Error),
    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl VisualizerError {
    pub fn lyrics(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Lyrics {
            name: name.into(),
            source,
        }
    }
}
