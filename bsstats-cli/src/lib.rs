//! Library entry for bsstats-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use bsstats_core::FrameFormat;

/// Bitstream format names accepted by `--bs`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// Word-oriented G.192 (16-bit softbits)
    #[default]
    G192,
    /// Byte-oriented G.192
    Byte,
    /// Compact bit-oriented format (detected and rejected)
    Bit,
}

impl From<FormatArg> for FrameFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::G192 => FrameFormat::WordOriented,
            FormatArg::Byte => FrameFormat::ByteOriented,
            FormatArg::Bit => FrameFormat::BitOriented,
        }
    }
}
