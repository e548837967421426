//! Error types for bitstream inspection

use crate::types::FrameFormat;

/// Errors that can occur while detecting or walking a bitstream
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BitstreamError {
    /// The stream uses an encoding this crate declines to parse
    #[error("Unsupported bitstream format: {0}")]
    UnsupportedFormat(FrameFormat),

    /// No synchronism header could be confirmed and no frame length was declared
    #[error("Headerless bitstreams are not supported")]
    HeaderlessUnsupported,

    /// A declared frame length exceeds the maximum supported size
    #[error("Frame {frame} declares length {length}, maximum is {max}")]
    FrameLengthOutOfRange {
        /// 1-based ordinal of the offending frame.
        frame: u64,
        /// The declared length, in units.
        length: u32,
        /// The maximum accepted length, in units.
        max: u16,
    },

    /// IO error during read/seek
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BitstreamError {
    fn from(err: std::io::Error) -> Self {
        BitstreamError::Io(err.to_string())
    }
}
