/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, SparkError>;

/// Errors surfaced by the tween engine and particle simulation.
///
/// Simulation math never fails; these only cover caller wiring mistakes.
#[derive(Debug, thiserror::Error)]
pub enum SparkError {
    /// An easing was requested by a name the catalog does not know.
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),
    /// An animation request was rejected before anything was registered.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A render was requested before a drawing surface was attached.
    #[error("not ready: {0}")]
    NotReady(&'static str),
    /// Configuration JSON could not be parsed.
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
}

impl SparkError {
    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }
}
