//! Detection-then-walk pipeline

use crate::error::BitstreamError;
use crate::histogram::Histogram;
use crate::sniffer::{sniff_format, FormatMismatch};
use crate::types::{ByteOrder, Frame, FrameFormat, StreamLayout};
use crate::validator::validate_header;
use crate::walker::FrameWalker;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Caller-supplied assumptions about the stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerOptions {
    /// Format the caller expects; the detected format wins on disagreement
    pub assumed_format: FrameFormat,

    /// Byte order of word units; a swapped sync word overrides it
    pub byte_order: ByteOrder,

    /// Frame length for headerless streams (0 when unknown)
    pub declared_frame_len: u16,
}

/// Confirmed layout of a stream, ready for walking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Validated layout
    pub layout: StreamLayout,

    /// Set when the detected format differs from [`AnalyzerOptions::assumed_format`]
    pub mismatch: Option<FormatMismatch>,
}

/// Layout and aggregates of a fully walked stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Validated layout
    pub layout: StreamLayout,

    /// Set when the detected format differs from the assumed one
    pub mismatch: Option<FormatMismatch>,

    /// Frame-size histogram
    pub histogram: Histogram,
}

/// Summary plus the per-frame length sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Layout and aggregates
    #[serde(flatten)]
    pub summary: Summary,

    /// Declared length of every frame, in file order
    pub lengths: Vec<u16>,
}

/// Sniff and validate the stream; leaves `reader` at offset 0
pub fn detect<R: Read + Seek>(
    reader: &mut R,
    options: &AnalyzerOptions,
) -> Result<Detection, BitstreamError> {
    let sniff = sniff_format(reader, options.assumed_format, options.byte_order)?;
    let layout = validate_header(reader, &sniff, options.declared_frame_len)?;

    let mismatch = (layout.format != options.assumed_format).then_some(FormatMismatch {
        assumed: options.assumed_format,
        detected: layout.format,
    });

    #[cfg(feature = "logging")]
    if let Some(m) = mismatch {
        warn!("Switching bitstream format from {} to {}", m.assumed, m.detected);
    }

    Ok(Detection { layout, mismatch })
}

/// Run the whole pipeline, calling `on_frame` for every frame in file order
///
/// Detection errors abort before any frame is walked. The first walking
/// error aborts the run; no partial summary is returned.
pub fn analyze_with<R, F>(
    mut reader: R,
    options: &AnalyzerOptions,
    mut on_frame: F,
) -> Result<Summary, BitstreamError>
where
    R: Read + Seek,
    F: FnMut(&Frame) -> std::io::Result<()>,
{
    let Detection { layout, mismatch } = detect(&mut reader, options)?;

    let mut histogram = Histogram::new();
    for frame in FrameWalker::new(reader, layout)? {
        let frame = frame?;
        histogram.record(&frame);
        on_frame(&frame)?;
    }

    #[cfg(feature = "logging")]
    debug!(
        "Walked {} frames, lengths {}..={}",
        histogram.total_frames(),
        histogram.min_len().unwrap_or(0),
        histogram.max_len()
    );

    Ok(Summary {
        layout,
        mismatch,
        histogram,
    })
}

/// Run the whole pipeline and keep every frame length
pub fn analyze<R: Read + Seek>(
    reader: R,
    options: &AnalyzerOptions,
) -> Result<Analysis, BitstreamError> {
    let mut lengths = Vec::new();
    let summary = analyze_with(reader, options, |frame| {
        lengths.push(frame.length_in_units);
        Ok(())
    })?;

    Ok(Analysis { summary, lengths })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::StreamBuilder;
    use std::io::Cursor;

    #[test]
    fn test_analyze_histogram_example() {
        let stream = StreamBuilder::word()
            .frames(&[10, 20, 10, 20, 20])
            .build()
            .unwrap();
        let analysis = analyze(Cursor::new(stream), &AnalyzerOptions::default()).unwrap();

        assert_eq!(analysis.lengths, vec![10, 20, 10, 20, 20]);
        let h = &analysis.summary.histogram;
        assert_eq!(h.count(10), 2);
        assert_eq!(h.count(20), 3);
        assert_eq!(h.total_frames(), 5);
        assert_eq!(h.max_len(), 20);
        assert_eq!(h.min_len(), Some(10));

        let layout = analysis.summary.layout;
        assert!(layout.has_sync_header);
        assert!(layout.variable_rate);
        assert_eq!(layout.declared_frame_len, 10);
        assert!(analysis.summary.mismatch.is_none());
    }

    #[test]
    fn test_detect_leaves_stream_at_start() {
        let stream = StreamBuilder::word().frames(&[8, 8]).build().unwrap();
        let mut cursor = Cursor::new(stream);
        let detection = detect(&mut cursor, &AnalyzerOptions::default()).unwrap();
        assert!(!detection.layout.variable_rate);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_mismatch_reported() {
        let stream = StreamBuilder::byte().frames(&[16, 16, 16]).build().unwrap();
        let analysis = analyze(Cursor::new(stream), &AnalyzerOptions::default()).unwrap();
        assert_eq!(
            analysis.summary.mismatch,
            Some(FormatMismatch {
                assumed: FrameFormat::WordOriented,
                detected: FrameFormat::ByteOriented,
            })
        );
        assert_eq!(analysis.lengths, vec![16, 16, 16]);
    }

    #[test]
    fn test_byte_stream_resembling_word_sync_keeps_assumed_format() {
        // `21 6B` reads as word sync until the header check falls back
        let stream = StreamBuilder::byte().frames(&[0x6B, 12]).build().unwrap();
        let options = AnalyzerOptions {
            assumed_format: FrameFormat::ByteOriented,
            ..Default::default()
        };

        let mut cursor = Cursor::new(stream);
        let sniff = sniff_format(&mut cursor, options.assumed_format, options.byte_order).unwrap();
        assert!(sniff.mismatch.is_some());

        let detection = detect(&mut cursor, &options).unwrap();
        assert_eq!(detection.layout.format, FrameFormat::ByteOriented);
        assert!(detection.mismatch.is_none());
    }

    #[test]
    fn test_swapped_byte_order_detected() {
        let stream = StreamBuilder::word()
            .byte_order(ByteOrder::Big)
            .frames(&[80, 80])
            .build()
            .unwrap();
        let analysis = analyze(Cursor::new(stream), &AnalyzerOptions::default()).unwrap();
        assert_eq!(analysis.summary.layout.byte_order, ByteOrder::Big);
        assert_eq!(analysis.lengths, vec![80, 80]);
    }

    #[test]
    fn test_callback_error_aborts() {
        let stream = StreamBuilder::word().frames(&[1, 2, 3]).build().unwrap();
        let mut seen = 0;
        let result = analyze_with(Cursor::new(stream), &AnalyzerOptions::default(), |_| {
            seen += 1;
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        });
        assert!(matches!(result, Err(BitstreamError::Io(_))));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_headerless_with_declared_len() {
        let stream = StreamBuilder::word().headerless().frames(&[20, 20, 20]).build().unwrap();
        let options = AnalyzerOptions {
            declared_frame_len: 20,
            ..Default::default()
        };
        let analysis = analyze(Cursor::new(stream), &options).unwrap();
        assert!(!analysis.summary.layout.has_sync_header);
        assert_eq!(analysis.lengths, vec![20, 20, 20]);
    }
}
