//! Error types for path generation and serialization

use std::io;

/// Errors produced while generating, configuring or (de)serializing a path
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// The curve domain is empty or the sampling step is not positive
    #[error("invalid curve: {0}")]
    InvalidCurve(String),

    /// Geometry evaluated to a non-finite value
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The byte stream is truncated or corrupt
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// The stream was produced with a different format version
    #[error("protocol version mismatch: expected {expected}, found {found}")]
    ProtocolVersion { expected: u16, found: u16 },

    /// The path has more samples than the record count field can hold
    #[error("path with {0} samples is too long to encode")]
    TooManySamples(usize),

    /// A generator parameter was rejected by `configure`
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The transport failed for a reason other than truncation
    #[error("transport error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for PathError {
    fn from(err: io::Error) -> Self {
        // A short read means the producer stopped mid-path
        if err.kind() == io::ErrorKind::UnexpectedEof {
            PathError::MalformedStream(format!("truncated input: {}", err))
        } else {
            PathError::Io(err)
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_eof_maps_to_malformed_stream() {
        let err: PathError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, PathError::MalformedStream(_)));
    }

    #[test]
    fn other_io_errors_stay_transport_errors() {
        let err: PathError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(err, PathError::Io(_)));
    }
}
