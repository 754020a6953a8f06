use thiserror::Error;

/// Conversion pipeline errors.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Scratch memory could not be reserved at construction. Fatal to the
    /// converter instance; the caller must not go on to convert frames.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// The input does not match the negotiated contract. Recoverable per
    /// frame: skip it and keep the pipeline running.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A transform stage rejected the frame. Recoverable: the frame is
    /// dropped and the published slot keeps its previous contents.
    #[error("conversion failed: {0}")]
    Conversion(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ConvertError>;
