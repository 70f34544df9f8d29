use thiserror::Error;

/// Failures raised by a data engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failure with a recognized shape: a stable code plus a message
    #[error("engine request failed ({code}): {message}")]
    KnownRequest { code: String, message: String },

    /// Failure with no recognized shape
    #[error("engine request failed: {0}")]
    Unknown(String),

    /// Connecting to or disconnecting from the engine failed
    #[error("engine connection error: {0}")]
    Connection(String),
}

/// Failures raised by the facet layer itself
#[derive(Error, Debug)]
pub enum FacetError {
    #[error("invalid model name: {0}")]
    InvalidModel(String),

    #[error("release without matching acquire")]
    ReleaseUnderflow,

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Route an engine failure to the appropriate log entry.
///
/// Known-shape failures get a structured entry carrying their code;
/// everything else gets a generic entry with the detail at info level.
/// Logging only, never control flow.
pub fn log_engine_error(error: &EngineError, model: &str, context: &str) {
    match error {
        EngineError::KnownRequest { code, message } => {
            tracing::error!(model = %model, context = %context, code = %code, "{message}");
        }
        other => {
            tracing::error!(model = %model, context = %context, "an unknown error occurred");
            tracing::info!(model = %model, "{other}");
        }
    }
}
