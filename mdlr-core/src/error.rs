//! Error types shared across the renderer

/// Convenience result type used across mdlr.
pub type MdlResult<T> = Result<T, MdlError>;

/// Shape errors raised by [`crate::PointMatrix`] operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// A row or operand had the wrong length for the operation.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    Dimension { expected: usize, found: usize },

    /// An identity was requested on a non-square matrix.
    #[error("identity requires a square matrix, got {rows}x{cols}")]
    SquareRequired { rows: usize, cols: usize },
}

/// Errors raised by [`crate::TransformStack`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("cannot pop the base coordinate system")]
    Underflow,
}

/// Top-level error taxonomy.
#[derive(thiserror::Error, Debug)]
pub enum MdlError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Stack(#[from] StackError),

    /// A script line could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Animation settings are missing or contradictory.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("knob `{knob}` has no value at frame {frame}")]
    UndefinedKnob { knob: String, frame: usize },

    #[error("unknown coordinate system `{0}`")]
    UnknownCoordinateSystem(String),

    #[error("mesh error: {0}")]
    Mesh(String),

    #[error("unsupported image format `{0}`")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl MdlError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn mesh(message: impl Into<String>) -> Self {
        Self::Mesh(message.into())
    }
}
