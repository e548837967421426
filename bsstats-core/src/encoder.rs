//! Synthetic G.192 stream encoding

use crate::constants::{
    BYTE_SOFTBIT_ERASED, BYTE_SOFTBIT_ONE, BYTE_SOFTBIT_ZERO, BYTE_SYNC_ERASED, BYTE_SYNC_GOOD,
    WORD_SOFTBIT_ERASED, WORD_SOFTBIT_ONE, WORD_SOFTBIT_ZERO, WORD_SYNC_ERASED, WORD_SYNC_GOOD,
};
use crate::error::BitstreamError;
use crate::types::{ByteOrder, FrameFormat};
use bytes::{BufMut, Bytes, BytesMut};

/// Softbit written at payload position `i` of a good frame
fn payload_bit(i: usize) -> bool {
    i % 3 == 0
}

fn put_unit(buf: &mut BytesMut, format: FrameFormat, order: ByteOrder, unit: u16) {
    match format {
        FrameFormat::WordOriented => buf.put_slice(&order.bytes(unit)),
        _ => buf.put_u8(unit as u8),
    }
}

/// Encode a single frame into `buf`
///
/// The frame layout is:
/// 1. Sync unit (0x6B21 / 0x21, or 0x6B20 / 0x20 when erased), unless headerless
/// 2. Length unit, unless headerless
/// 3. `len` softbit units (all erased-valued when `erased`)
pub fn encode_frame(
    buf: &mut BytesMut,
    format: FrameFormat,
    order: ByteOrder,
    len: u16,
    erased: bool,
    with_header: bool,
) -> Result<(), BitstreamError> {
    let (sync, zero, one, blank) = match format {
        FrameFormat::WordOriented => (
            if erased { WORD_SYNC_ERASED } else { WORD_SYNC_GOOD },
            WORD_SOFTBIT_ZERO,
            WORD_SOFTBIT_ONE,
            WORD_SOFTBIT_ERASED,
        ),
        FrameFormat::ByteOriented => (
            u16::from(if erased { BYTE_SYNC_ERASED } else { BYTE_SYNC_GOOD }),
            u16::from(BYTE_SOFTBIT_ZERO),
            u16::from(BYTE_SOFTBIT_ONE),
            u16::from(BYTE_SOFTBIT_ERASED),
        ),
        other => return Err(BitstreamError::UnsupportedFormat(other)),
    };

    buf.reserve((len as usize + 2) * format.unit_size_bytes() as usize);

    if with_header {
        put_unit(buf, format, order, sync);
        put_unit(buf, format, order, len);
    }

    for i in 0..len as usize {
        let unit = match (erased, payload_bit(i)) {
            (true, _) => blank,
            (false, true) => one,
            (false, false) => zero,
        };
        put_unit(buf, format, order, unit);
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct PlannedFrame {
    len: u16,
    erased: bool,
}

/// Builder for synthetic word- or byte-oriented streams
#[derive(Debug, Clone)]
pub struct StreamBuilder {
    format: FrameFormat,
    byte_order: ByteOrder,
    with_header: bool,
    frames: Vec<PlannedFrame>,
}

impl StreamBuilder {
    /// Create a builder for `format`
    pub fn new(format: FrameFormat) -> Self {
        Self {
            format,
            byte_order: ByteOrder::default(),
            with_header: true,
            frames: Vec::new(),
        }
    }

    /// Builder for a word-oriented (G.192) stream
    pub fn word() -> Self {
        Self::new(FrameFormat::WordOriented)
    }

    /// Builder for a byte-oriented stream
    pub fn byte() -> Self {
        Self::new(FrameFormat::ByteOriented)
    }

    /// Set the byte order of word units
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Omit the sync header of every frame
    pub fn headerless(mut self) -> Self {
        self.with_header = false;
        self
    }

    /// Append a good frame of `len` units
    pub fn frame(mut self, len: u16) -> Self {
        self.frames.push(PlannedFrame { len, erased: false });
        self
    }

    /// Append an erased frame of `len` units
    pub fn erased_frame(mut self, len: u16) -> Self {
        self.frames.push(PlannedFrame { len, erased: true });
        self
    }

    /// Append good frames with the given lengths
    pub fn frames(mut self, lens: &[u16]) -> Self {
        self.frames
            .extend(lens.iter().map(|&len| PlannedFrame { len, erased: false }));
        self
    }

    /// Encode every frame
    pub fn build(self) -> Result<Bytes, BitstreamError> {
        let max = self.format.max_frame_len();
        let mut buf = BytesMut::new();

        for (i, planned) in self.frames.iter().enumerate() {
            if planned.len > max {
                return Err(BitstreamError::FrameLengthOutOfRange {
                    frame: i as u64 + 1,
                    length: u32::from(planned.len),
                    max,
                });
            }
            encode_frame(
                &mut buf,
                self.format,
                self.byte_order,
                planned.len,
                planned.erased,
                self.with_header,
            )?;
        }

        Ok(buf.freeze())
    }
}
