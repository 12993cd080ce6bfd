use crate::dtype::DType;
use thiserror::Error;

/// Canonical error codes emitted by the conversion engine. The codes are
/// stable so that callers can branch on them without parsing messages.
pub mod codes {
    /// Axis count outside the range an operation accepts.
    pub const UNSUPPORTED_RANK: &str = "E_UNSUPPORTED_RANK";
    /// Element type outside the five convertible kinds.
    pub const UNSUPPORTED_ELEMENT_KIND: &str = "E_UNSUPPORTED_ELEMENT_KIND";
    /// Matrix with more than one interleaved channel.
    pub const UNSUPPORTED_CHANNEL_COUNT: &str = "E_UNSUPPORTED_CHANNEL_COUNT";
    /// Stack assembly was handed zero planes.
    pub const EMPTY_SEQUENCE: &str = "E_EMPTY_SEQUENCE";
    /// Shapes, lengths, or other size-related constraints were violated.
    pub const SHAPE_MISMATCH: &str = "E_SHAPE_MISMATCH";
    /// Typed access or stacking with an element type that does not match.
    pub const KIND_MISMATCH: &str = "E_KIND_MISMATCH";
    /// Axis or index outside the bounds of an image.
    pub const OUT_OF_BOUNDS: &str = "E_OUT_OF_BOUNDS";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("unsupported rank {rank}: expected {expected}")]
    UnsupportedRank { rank: usize, expected: &'static str },

    #[error("unsupported element kind: {0}")]
    UnsupportedElementKind(String),

    #[error("unsupported channel count {0}: only single-channel matrices are supported")]
    UnsupportedChannelCount(usize),

    #[error("cannot assemble an image from an empty sequence")]
    EmptySequence,

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("element kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: DType, found: DType },

    #[error("axis {axis} out of range for an image with {rank} axes")]
    AxisOutOfRange { axis: usize, rank: usize },

    #[error("index {index} out of bounds for an axis of extent {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl ConvertError {
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::UnsupportedRank { .. } => codes::UNSUPPORTED_RANK,
            ConvertError::UnsupportedElementKind(_) => codes::UNSUPPORTED_ELEMENT_KIND,
            ConvertError::UnsupportedChannelCount(_) => codes::UNSUPPORTED_CHANNEL_COUNT,
            ConvertError::EmptySequence => codes::EMPTY_SEQUENCE,
            ConvertError::ShapeMismatch(_) => codes::SHAPE_MISMATCH,
            ConvertError::KindMismatch { .. } => codes::KIND_MISMATCH,
            ConvertError::AxisOutOfRange { .. } | ConvertError::IndexOutOfBounds { .. } => {
                codes::OUT_OF_BOUNDS
            }
        }
    }
}

/// Convenience function for shape mismatch style errors.
pub fn shape_mismatch(message: impl Into<String>) -> ConvertError {
    ConvertError::ShapeMismatch(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_value() {
        let err = ConvertError::UnsupportedRank {
            rank: 4,
            expected: "1 to 3 axes",
        };
        assert_eq!(err.to_string(), "unsupported rank 4: expected 1 to 3 axes");
        assert_eq!(err.code(), codes::UNSUPPORTED_RANK);

        let err = ConvertError::UnsupportedElementKind("uint16".into());
        assert!(err.to_string().contains("uint16"));

        let err = ConvertError::UnsupportedChannelCount(3);
        assert!(err.to_string().contains('3'));
        assert_eq!(err.code(), codes::UNSUPPORTED_CHANNEL_COUNT);
    }
}
