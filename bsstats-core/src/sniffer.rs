//! Format detection from the first bytes of a stream

use crate::constants::{is_byte_softbit, is_word_softbit, PROBE_LEN};
use crate::error::BitstreamError;
use crate::types::{read_full, ByteOrder, FrameFormat};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// The caller's assumed format disagreed with the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMismatch {
    /// Format the caller asked for
    pub assumed: FrameFormat,
    /// Format found in the stream (this one is used)
    pub detected: FrameFormat,
}

/// Result of probing a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniff {
    /// Detected (or, for an empty probe, assumed) format
    pub format: FrameFormat,

    /// Byte order of word units; may differ from the requested order
    pub byte_order: ByteOrder,

    /// The probe starts with a sync header
    pub maybe_has_header: bool,

    /// The probe also reads as a byte-oriented sync header
    ///
    /// Word sync 0x6B2z stored as bytes `2z 6B` is indistinguishable from a
    /// byte-oriented frame of length 0x6B; the validator retries with the
    /// byte-oriented format when the word-oriented header is not confirmed.
    pub byte_fallback: bool,

    /// Set when the probe disagrees with the assumed format
    ///
    /// Provisional: header validation may still settle on the byte-oriented
    /// format, see [`crate::analyzer::detect`] for the final verdict.
    pub mismatch: Option<FormatMismatch>,
}

/// What a probe looks like, before it is reconciled with the caller's guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signature {
    Framed(FrameFormat, ByteOrder),
    Headerless(FrameFormat),
    Compact,
    Unknown,
}

/// Classify the first bytes of a stream
fn classify(probe: &[u8], order: ByteOrder) -> Signature {
    if probe.len() < PROBE_LEN {
        return Signature::Unknown;
    }

    let bytes = [probe[0], probe[1]];
    let word = order.word(bytes);
    let swapped = order.swapped();

    if FrameFormat::WordOriented.matches_sync(word) {
        Signature::Framed(FrameFormat::WordOriented, order)
    } else if FrameFormat::WordOriented.matches_sync(swapped.word(bytes)) {
        Signature::Framed(FrameFormat::WordOriented, swapped)
    } else if is_word_softbit(word) {
        Signature::Headerless(FrameFormat::WordOriented)
    } else if FrameFormat::ByteOriented.matches_sync(u16::from(probe[0])) {
        Signature::Framed(FrameFormat::ByteOriented, order)
    } else if is_byte_softbit(probe[0]) {
        Signature::Headerless(FrameFormat::ByteOriented)
    } else {
        Signature::Compact
    }
}

/// Probe the start of `reader` and classify its encoding
///
/// The reader is rewound to offset 0 before returning, whatever the outcome.
/// A compact signature fails with [`BitstreamError::UnsupportedFormat`].
pub fn sniff_format<R: Read + Seek>(
    reader: &mut R,
    assumed: FrameFormat,
    order: ByteOrder,
) -> Result<Sniff, BitstreamError> {
    reader.rewind()?;
    let mut probe = [0u8; PROBE_LEN];
    let read = read_full(reader, &mut probe);
    reader.rewind()?;
    let probe = &probe[..read?];

    #[cfg(feature = "logging")]
    debug!("Probing {} bytes: {:02X?}", probe.len(), probe);

    let byte_fallback = probe
        .first()
        .is_some_and(|&b| FrameFormat::ByteOriented.matches_sync(u16::from(b)));

    let (format, byte_order, maybe_has_header) = match classify(probe, order) {
        Signature::Framed(format, detected_order) => (format, detected_order, true),
        Signature::Headerless(format) => (format, order, false),
        Signature::Unknown => (assumed, order, false),
        Signature::Compact => {
            #[cfg(feature = "logging")]
            warn!("Stream does not start with a G.192 sync or softbit value");

            return Err(BitstreamError::UnsupportedFormat(FrameFormat::Compact));
        }
    };

    #[cfg(feature = "logging")]
    if byte_order != order {
        warn!("Sync word found in swapped byte order, switching to {:?}", byte_order);
    }

    let mismatch = (format != assumed).then_some(FormatMismatch {
        assumed,
        detected: format,
    });

    #[cfg(feature = "logging")]
    if let Some(m) = mismatch {
        debug!("Probe suggests {} instead of {}", m.detected, m.assumed);
    }

    Ok(Sniff {
        format,
        byte_order,
        maybe_has_header,
        byte_fallback: maybe_has_header && format == FrameFormat::WordOriented && byte_fallback,
        mismatch,
    })
}
