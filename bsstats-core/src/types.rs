//! Core types for G.192 bitstreams

use crate::constants::{
    BYTE_SYNC_MASK, BYTE_SYNC_PATTERN, MAX_BYTE_FRAME_LEN, MAX_FRAME_LEN, WORD_SYNC_MASK,
    WORD_SYNC_PATTERN,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, ErrorKind, Read};
use std::str::FromStr;

/// Binary encodings a bitstream file may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFormat {
    /// G.192 serial format: 16-bit units, sync word 0x6B2z
    #[default]
    WordOriented,
    /// Byte-oriented G.192: 8-bit units, sync byte 0x2z
    ByteOriented,
    /// Packed hardbits with no per-unit framing
    BitOriented,
    /// Table-driven compact encoding
    Compact,
}

impl FrameFormat {
    /// Size of one unit in bytes (0 for formats without byte-aligned units)
    pub const fn unit_size_bytes(&self) -> u64 {
        match self {
            FrameFormat::WordOriented => 2,
            FrameFormat::ByteOriented => 1,
            FrameFormat::BitOriented | FrameFormat::Compact => 0,
        }
    }

    /// Mask applied to a unit before comparing it to [`Self::sync_pattern`]
    pub const fn sync_mask(&self) -> Option<u16> {
        match self {
            FrameFormat::WordOriented => Some(WORD_SYNC_MASK),
            FrameFormat::ByteOriented => Some(BYTE_SYNC_MASK as u16),
            FrameFormat::BitOriented | FrameFormat::Compact => None,
        }
    }

    /// Pattern identifying a sync header unit
    pub const fn sync_pattern(&self) -> Option<u16> {
        match self {
            FrameFormat::WordOriented => Some(WORD_SYNC_PATTERN),
            FrameFormat::ByteOriented => Some(BYTE_SYNC_PATTERN as u16),
            FrameFormat::BitOriented | FrameFormat::Compact => None,
        }
    }

    /// Whether frames carry their own length (the only formats this crate walks)
    pub const fn is_self_describing(&self) -> bool {
        matches!(self, FrameFormat::WordOriented | FrameFormat::ByteOriented)
    }

    /// Largest length the format's header can legitimately declare
    pub const fn max_frame_len(&self) -> u16 {
        match self {
            FrameFormat::ByteOriented => MAX_BYTE_FRAME_LEN,
            _ => MAX_FRAME_LEN,
        }
    }

    /// Check whether `unit` is a sync header for this format
    pub fn matches_sync(&self, unit: u16) -> bool {
        match (self.sync_mask(), self.sync_pattern()) {
            (Some(mask), Some(pattern)) => unit & mask == pattern,
            _ => false,
        }
    }

    /// Short name, as accepted on the command line
    pub const fn name(&self) -> &'static str {
        match self {
            FrameFormat::WordOriented => "g192",
            FrameFormat::ByteOriented => "byte",
            FrameFormat::BitOriented => "bit",
            FrameFormat::Compact => "compact",
        }
    }

    /// Read one unit from `reader`
    ///
    /// Returns `Ok(None)` when fewer bytes than a full unit are available,
    /// which callers treat as end of stream.
    pub fn read_unit<R: Read>(
        &self,
        reader: &mut R,
        order: ByteOrder,
    ) -> io::Result<Option<u16>> {
        match self {
            FrameFormat::WordOriented => {
                let mut buf = [0u8; 2];
                if read_full(reader, &mut buf)? < buf.len() {
                    return Ok(None);
                }
                Ok(Some(order.word(buf)))
            }
            FrameFormat::ByteOriented => {
                let mut buf = [0u8; 1];
                if read_full(reader, &mut buf)? < buf.len() {
                    return Ok(None);
                }
                Ok(Some(u16::from(buf[0])))
            }
            FrameFormat::BitOriented | FrameFormat::Compact => Err(io::Error::new(
                ErrorKind::Unsupported,
                format!("{} streams have no readable units", self.name()),
            )),
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "g192" | "word" => Ok(FrameFormat::WordOriented),
            "byte" => Ok(FrameFormat::ByteOriented),
            "bit" => Ok(FrameFormat::BitOriented),
            "compact" => Ok(FrameFormat::Compact),
            other => Err(format!("unknown bitstream format: {}", other)),
        }
    }
}

/// Storage order of 16-bit units in word-oriented streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    /// Assemble a word from two bytes stored in this order
    pub const fn word(&self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    /// Split a word into two bytes in this order
    pub const fn bytes(&self, word: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => word.to_le_bytes(),
            ByteOrder::Big => word.to_be_bytes(),
        }
    }

    /// The other byte order
    pub const fn swapped(&self) -> Self {
        match self {
            ByteOrder::Little => ByteOrder::Big,
            ByteOrder::Big => ByteOrder::Little,
        }
    }
}

/// Layout of a stream, computed once before walking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLayout {
    /// Confirmed encoding
    pub format: FrameFormat,

    /// Storage order of word units
    pub byte_order: ByteOrder,

    /// Frames start with a sync word + length header
    pub has_sync_header: bool,

    /// First frame's declared length, or the externally declared length
    /// for headerless streams
    pub declared_frame_len: u16,

    /// The first two frames declare different lengths
    pub variable_rate: bool,
}

impl StreamLayout {
    /// Layout with no confirmed header
    pub fn headerless(
        format: FrameFormat,
        byte_order: ByteOrder,
        declared_frame_len: u16,
    ) -> Self {
        Self {
            format,
            byte_order,
            has_sync_header: false,
            declared_frame_len,
            variable_rate: false,
        }
    }
}

/// One frame observed by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// 1-based ordinal in file order
    pub index: u64,

    /// Declared payload length in units
    pub length_in_units: u16,

    /// Byte offset of the frame's first unit
    pub byte_offset: u64,
}

/// Read until `buf` is full or the reader is exhausted
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
