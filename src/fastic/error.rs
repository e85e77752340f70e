//! Error type for the FastIC+ packet decoders.

use thiserror::Error;

/// Failures turning frames into application packets.
///
/// Parity mismatches are not errors; they are reported as validity flags on
/// the field getters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// An event packet was requested from a non-data frame
    #[error("expected a data frame")]
    NotADataFrame,

    /// A statistics or extension packet was requested from a non-control frame
    #[error("expected a control frame")]
    NotAControlFrame,

    /// The channel field holds a bit pattern outside CH0..CH7/TRIGGER
    #[error("invalid channel bits {bits:#06b}")]
    InvalidChannel { bits: u8 },
}

/// Result type alias using DecodeError
pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert!(DecodeError::NotADataFrame.to_string().contains("data frame"));
        let err = DecodeError::InvalidChannel { bits: 0b1111 };
        assert!(err.to_string().contains("0b1111"));
    }
}
