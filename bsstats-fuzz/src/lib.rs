//! Fuzzing entry points for bsstats-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_analyze

use bsstats_core::{analyze, AnalyzerOptions, ByteOrder, FrameFormat};
use std::io::Cursor;

pub fn fuzz_analyze(data: &[u8]) {
    // Try to analyze - should never panic
    let _ = analyze(Cursor::new(data), &AnalyzerOptions::default());
}

/// First byte picks the options, the rest is the stream
pub fn fuzz_analyze_with_options(data: &[u8]) {
    let Some((&selector, stream)) = data.split_first() else {
        return;
    };

    let options = AnalyzerOptions {
        assumed_format: match selector & 0x03 {
            0 => FrameFormat::WordOriented,
            1 => FrameFormat::ByteOriented,
            2 => FrameFormat::BitOriented,
            _ => FrameFormat::Compact,
        },
        byte_order: if selector & 0x04 != 0 {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        },
        declared_frame_len: u16::from(selector >> 3),
    };

    let _ = analyze(Cursor::new(stream), &options);
}
