//! Header confirmation and rate detection

use crate::constants::HEADER_UNITS;
use crate::error::BitstreamError;
use crate::sniffer::Sniff;
use crate::types::{ByteOrder, FrameFormat, StreamLayout};
use std::io::{Read, Seek, SeekFrom};

#[cfg(feature = "logging")]
use tracing::debug;

/// Outcome of the two-header cross-check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderCheck {
    Confirmed { first_len: u16, second_len: Option<u16> },
    Rejected,
}

/// Read a (sync, length) pair; `None` if the stream ends first
fn read_header<R: Read>(
    reader: &mut R,
    format: FrameFormat,
    order: ByteOrder,
) -> Result<Option<(u16, u16)>, BitstreamError> {
    let Some(sync) = format.read_unit(reader, order)? else {
        return Ok(None);
    };
    let Some(len) = format.read_unit(reader, order)? else {
        return Ok(None);
    };
    Ok(Some((sync, len)))
}

fn check_headers<R: Read + Seek>(
    reader: &mut R,
    format: FrameFormat,
    order: ByteOrder,
) -> Result<HeaderCheck, BitstreamError> {
    let Some((sync, first_len)) = read_header(reader, format, order)? else {
        return Ok(HeaderCheck::Rejected);
    };

    if !format.matches_sync(sync) || first_len == 0 || first_len > format.max_frame_len() {
        #[cfg(feature = "logging")]
        debug!("First header rejected: sync {:#06X}, length {}", sync, first_len);

        return Ok(HeaderCheck::Rejected);
    }

    let payload_bytes = u64::from(first_len) * format.unit_size_bytes();
    reader.seek(SeekFrom::Current(payload_bytes as i64))?;

    let Some(sync) = format.read_unit(reader, order)? else {
        // Single-frame stream, only if the frame ends exactly at end of stream
        let frame_end = HEADER_UNITS * format.unit_size_bytes() + payload_bytes;
        return if reader.seek(SeekFrom::End(0))? == frame_end {
            Ok(HeaderCheck::Confirmed {
                first_len,
                second_len: None,
            })
        } else {
            Ok(HeaderCheck::Rejected)
        };
    };

    if !format.matches_sync(sync) {
        #[cfg(feature = "logging")]
        debug!("No sync after first frame: found {:#06X}", sync);

        return Ok(HeaderCheck::Rejected);
    }

    // The second length may be cut off; the sync alone confirms
    let second_len = format.read_unit(reader, order)?;
    Ok(HeaderCheck::Confirmed {
        first_len,
        second_len,
    })
}

/// Run the header check, retrying as byte-oriented when the sniff allows it
///
/// Returns the format the check settled on when it differs from the sniff.
fn probe_headers<R: Read + Seek>(
    reader: &mut R,
    sniff: &Sniff,
) -> Result<(Option<FrameFormat>, HeaderCheck), BitstreamError> {
    if !sniff.maybe_has_header || !sniff.format.is_self_describing() {
        return Ok((None, HeaderCheck::Rejected));
    }

    let check = check_headers(reader, sniff.format, sniff.byte_order)?;
    if check != HeaderCheck::Rejected || !sniff.byte_fallback {
        return Ok((None, check));
    }

    #[cfg(feature = "logging")]
    debug!("Word header not confirmed, retrying as byte-oriented");

    reader.rewind()?;
    match check_headers(reader, FrameFormat::ByteOriented, sniff.byte_order)? {
        HeaderCheck::Rejected => Ok((None, HeaderCheck::Rejected)),
        confirmed => Ok((Some(FrameFormat::ByteOriented), confirmed)),
    }
}

/// Confirm the sniffed header hypothesis and build the stream layout
///
/// The first header's declared length L1 is used to seek to where the
/// second header should be. A sync word there confirms the header, and
/// `variable_rate` is set when its length differs from L1.
///
/// `declared_frame_len` is an externally supplied frame length used only
/// when no header is confirmed. The reader is rewound to offset 0 on exit.
///
/// Fails with [`BitstreamError::UnsupportedFormat`] for bit-oriented and
/// compact streams, and with [`BitstreamError::HeaderlessUnsupported`] when
/// no header is confirmed and `declared_frame_len` is 0.
pub fn validate_header<R: Read + Seek>(
    reader: &mut R,
    sniff: &Sniff,
    declared_frame_len: u16,
) -> Result<StreamLayout, BitstreamError> {
    let order = sniff.byte_order;

    reader.rewind()?;
    let check = probe_headers(reader, sniff);
    reader.rewind()?;
    let (detected, check) = check?;
    let format = detected.unwrap_or(sniff.format);

    if !format.is_self_describing() {
        return Err(BitstreamError::UnsupportedFormat(format));
    }

    let layout = match check {
        HeaderCheck::Confirmed {
            first_len,
            second_len,
        } => StreamLayout {
            format,
            byte_order: order,
            has_sync_header: true,
            declared_frame_len: first_len,
            variable_rate: second_len.is_some_and(|len| len != first_len),
        },
        HeaderCheck::Rejected => StreamLayout::headerless(format, order, declared_frame_len),
    };

    if !layout.has_sync_header && layout.declared_frame_len == 0 {
        return Err(BitstreamError::HeaderlessUnsupported);
    }

    #[cfg(feature = "logging")]
    debug!(
        "Layout: {} {}, frame length {}, {} rate",
        layout.format,
        if layout.has_sync_header { "with sync header" } else { "headerless" },
        layout.declared_frame_len,
        if layout.variable_rate { "variable" } else { "fixed" }
    );

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::StreamBuilder;
    use std::io::Cursor;

    fn word_sniff() -> Sniff {
        Sniff {
            format: FrameFormat::WordOriented,
            byte_order: ByteOrder::Little,
            maybe_has_header: true,
            byte_fallback: false,
            mismatch: None,
        }
    }

    fn validate(data: Vec<u8>, sniff: Sniff) -> (Result<StreamLayout, BitstreamError>, u64) {
        let mut cursor = Cursor::new(data);
        let result = validate_header(&mut cursor, &sniff, 0);
        (result, cursor.position())
    }

    #[test]
    fn test_fixed_rate() {
        let stream = StreamBuilder::word().frames(&[80, 80, 80]).build().unwrap();
        let (result, pos) = validate(stream.to_vec(), word_sniff());
        let layout = result.unwrap();
        assert!(layout.has_sync_header);
        assert_eq!(layout.declared_frame_len, 80);
        assert!(!layout.variable_rate);
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_variable_rate() {
        let stream = StreamBuilder::word().frames(&[80, 160]).build().unwrap();
        let (result, _) = validate(stream.to_vec(), word_sniff());
        let layout = result.unwrap();
        assert!(layout.has_sync_header);
        assert_eq!(layout.declared_frame_len, 80);
        assert!(layout.variable_rate);
    }

    #[test]
    fn test_byte_oriented() {
        let stream = StreamBuilder::byte().frames(&[40, 40]).build().unwrap();
        let sniff = Sniff {
            format: FrameFormat::ByteOriented,
            ..word_sniff()
        };
        let (result, _) = validate(stream.to_vec(), sniff);
        let layout = result.unwrap();
        assert_eq!(layout.format, FrameFormat::ByteOriented);
        assert_eq!(layout.declared_frame_len, 40);
    }

    #[test]
    fn test_byte_stream_read_as_word_falls_back() {
        // First byte-oriented length is 0x6B, so the probe reads as word sync 0x6B21
        let stream = StreamBuilder::byte().frames(&[0x6B, 20]).build().unwrap();
        let sniff = Sniff {
            byte_fallback: true,
            ..word_sniff()
        };
        let (result, pos) = validate(stream.to_vec(), sniff);
        let layout = result.unwrap();
        assert_eq!(layout.format, FrameFormat::ByteOriented);
        assert_eq!(layout.declared_frame_len, 0x6B);
        assert!(layout.variable_rate);
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_single_frame_with_trailing_garbage_rejected() {
        let mut data = StreamBuilder::word().frames(&[10]).build().unwrap().to_vec();
        data.push(0x55);
        let (result, _) = validate(data, word_sniff());
        assert_eq!(result.unwrap_err(), BitstreamError::HeaderlessUnsupported);
    }

    #[test]
    fn test_single_frame_confirmed() {
        let stream = StreamBuilder::word().frames(&[10]).build().unwrap();
        let (result, _) = validate(stream.to_vec(), word_sniff());
        let layout = result.unwrap();
        assert!(layout.has_sync_header);
        assert!(!layout.variable_rate);
    }

    #[test]
    fn test_second_header_cut_after_sync() {
        let mut data = StreamBuilder::word().frames(&[10]).build().unwrap().to_vec();
        data.extend_from_slice(&[0x21, 0x6B]);
        let (result, pos) = validate(data, word_sniff());
        let layout = result.unwrap();
        assert!(layout.has_sync_header);
        assert_eq!(layout.declared_frame_len, 10);
        assert!(!layout.variable_rate);
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_second_header_cut_inside_sync() {
        let mut data = StreamBuilder::word().frames(&[10]).build().unwrap().to_vec();
        data.push(0x21);
        let (result, _) = validate(data, word_sniff());
        assert_eq!(result.unwrap_err(), BitstreamError::HeaderlessUnsupported);
    }

    #[test]
    fn test_second_sync_missing() {
        // Header claims 4 units but the payload runs on for 8
        let mut data = vec![0x21, 0x6B, 0x04, 0x00];
        for _ in 0..8 {
            data.extend_from_slice(&[0x7F, 0x00]);
        }
        let (result, pos) = validate(data, word_sniff());
        assert_eq!(result.unwrap_err(), BitstreamError::HeaderlessUnsupported);
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_second_sync_missing_with_declared_len() {
        let mut data = vec![0x21, 0x6B, 0x04, 0x00];
        for _ in 0..8 {
            data.extend_from_slice(&[0x7F, 0x00]);
        }
        let mut cursor = Cursor::new(data);
        let layout = validate_header(&mut cursor, &word_sniff(), 6).unwrap();
        assert!(!layout.has_sync_header);
        assert_eq!(layout.declared_frame_len, 6);
    }

    #[test]
    fn test_zero_length_not_confirmed() {
        let data = vec![0x21, 0x6B, 0x00, 0x00, 0x21, 0x6B, 0x00, 0x00];
        let (result, pos) = validate(data, word_sniff());
        assert_eq!(result.unwrap_err(), BitstreamError::HeaderlessUnsupported);
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_oversized_length_not_confirmed() {
        let data = vec![0x21, 0x6B, 0x40, 0x9C];
        let (result, _) = validate(data, word_sniff());
        assert_eq!(result.unwrap_err(), BitstreamError::HeaderlessUnsupported);
    }

    #[test]
    fn test_headerless_sniff_skips_probe() {
        let sniff = Sniff {
            maybe_has_header: false,
            ..word_sniff()
        };
        let stream = StreamBuilder::word().frames(&[8, 8]).build().unwrap();
        let (result, _) = validate(stream.to_vec(), sniff);
        assert_eq!(result.unwrap_err(), BitstreamError::HeaderlessUnsupported);
    }

    #[test]
    fn test_bit_oriented_rejected() {
        let sniff = Sniff {
            format: FrameFormat::BitOriented,
            maybe_has_header: false,
            ..word_sniff()
        };
        let (result, pos) = validate(vec![0x55; 16], sniff);
        assert_eq!(
            result.unwrap_err(),
            BitstreamError::UnsupportedFormat(FrameFormat::BitOriented)
        );
        assert_eq!(pos, 0);
    }
}
