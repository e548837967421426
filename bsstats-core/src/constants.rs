//! Constants and limits for the G.192 bitstream formats

/// Maximum declared frame length, in units (softbits)
pub const MAX_FRAME_LEN: u16 = 32767;

/// Maximum declared frame length for the byte-oriented format
/// The length field is a single byte
pub const MAX_BYTE_FRAME_LEN: u16 = 255;

/// Number of bytes inspected by the format sniffer
pub const PROBE_LEN: usize = 2;

/// Number of units in a synchronism header (sync word + length)
pub const HEADER_UNITS: u64 = 2;

/// Word-oriented sync header: 0x6B2z, z = 0..F
pub const WORD_SYNC_MASK: u16 = 0xFFF0;

/// Pattern matched by the masked word-oriented sync word
pub const WORD_SYNC_PATTERN: u16 = 0x6B20;

/// Word-oriented sync word for a good frame
pub const WORD_SYNC_GOOD: u16 = 0x6B21;

/// Word-oriented sync word for an erased frame
pub const WORD_SYNC_ERASED: u16 = 0x6B20;

/// Byte-oriented sync header: 0x2z, z = 0..F
pub const BYTE_SYNC_MASK: u8 = 0xF0;

/// Pattern matched by the masked byte-oriented sync byte
pub const BYTE_SYNC_PATTERN: u8 = 0x20;

/// Byte-oriented sync byte for a good frame
pub const BYTE_SYNC_GOOD: u8 = 0x21;

/// Byte-oriented sync byte for an erased frame
pub const BYTE_SYNC_ERASED: u8 = 0x20;

/// Softbit representation of hardbit '0' (word-oriented)
pub const WORD_SOFTBIT_ZERO: u16 = 0x007F;

/// Softbit representation of hardbit '1' (word-oriented)
pub const WORD_SOFTBIT_ONE: u16 = 0x0081;

/// Softbit representation of an erased bit (word-oriented)
pub const WORD_SOFTBIT_ERASED: u16 = 0x0000;

/// Softbit representation of hardbit '0' (byte-oriented)
pub const BYTE_SOFTBIT_ZERO: u8 = 0x7F;

/// Softbit representation of hardbit '1' (byte-oriented)
pub const BYTE_SOFTBIT_ONE: u8 = 0x81;

/// Softbit representation of an erased bit (byte-oriented)
pub const BYTE_SOFTBIT_ERASED: u8 = 0x00;

/// Returns true if `word` is a word-oriented softbit value
pub const fn is_word_softbit(word: u16) -> bool {
    matches!(
        word,
        WORD_SOFTBIT_ZERO | WORD_SOFTBIT_ONE | WORD_SOFTBIT_ERASED
    )
}

/// Returns true if `byte` is a byte-oriented softbit value
pub const fn is_byte_softbit(byte: u8) -> bool {
    matches!(
        byte,
        BYTE_SOFTBIT_ZERO | BYTE_SOFTBIT_ONE | BYTE_SOFTBIT_ERASED
    )
}
