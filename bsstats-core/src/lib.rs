//! # bsstats Core
//!
//! Format detection and frame-size statistics for ITU-T G.192 encoded-speech bitstreams.
//!
//! ## Modules
//!
//! - `constants`: Sync patterns, softbit values and limits
//! - `types`: Core types (FrameFormat, ByteOrder, StreamLayout, Frame)
//! - `sniffer`: Format classification from a stream prefix
//! - `validator`: Header confirmation and rate detection
//! - `walker`: Frame-by-frame cursor
//! - `histogram`: Frame-size histogram and aggregates
//! - `analyzer`: The detection-then-walk pipeline
//! - `encoder`: Synthetic stream encoding

#![warn(missing_docs)]

pub mod analyzer;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod histogram;
pub mod sniffer;
pub mod types;
pub mod validator;
pub mod walker;

// Re-export commonly used types
pub use analyzer::{analyze, analyze_with, detect, Analysis, AnalyzerOptions, Detection, Summary};
pub use error::BitstreamError;
pub use histogram::Histogram;
pub use types::{ByteOrder, Frame, FrameFormat, StreamLayout};

/// Result type alias for bitstream operations
pub type Result<T> = core::result::Result<T, BitstreamError>;
