use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Transform from frame '{from}' to frame '{to}' not found")]
    TransformNotFound { from: String, to: String },

    #[error("Frame '{0}' does not exist")]
    FrameNotFound(String),

    #[error("Edge from '{child}' to '{parent}' would create a cycle")]
    CyclicFrameGraph { child: String, parent: String },

    #[error("Frame id '{0}' is not a valid frame name")]
    InvalidFrameId(String),

    #[error("Ancestor walk exceeded {0} frames, graph is malformed")]
    DepthLimitExceeded(usize),
}

pub type TransformResult<T> = Result<T, TransformError>;
