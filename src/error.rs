use thiserror::Error;

/// Contract violations raised while building or tracing a scene.
///
/// None of these are transient: they are caused by invalid input and abort
/// whatever operation triggered them. A ray that hits nothing is *not* an
/// error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    #[error("camera look direction does not define a basis")]
    DegenerateBasis,

    #[error("invalid primitive: {0}")]
    InvalidPrimitive(String),

    #[error("invalid camera: {0}")]
    InvalidCamera(String),
}

/// The outcome of rendering a whole frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("trace failed at pixel ({x}, {y}): {source}")]
    Trace {
        x: usize,
        y: usize,
        #[source]
        source: TraceError,
    },

    #[error("render cancelled")]
    Cancelled,

    #[error("failed to start worker threads: {0}")]
    ThreadPool(String),
}

/// Errors produced while loading a scene description.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] TraceError),
}
