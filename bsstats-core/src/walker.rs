//! Frame-by-frame cursor over a validated stream

use crate::constants::HEADER_UNITS;
use crate::error::BitstreamError;
use crate::types::{Frame, StreamLayout};
use std::io::{Read, Seek, SeekFrom};
use std::iter::FusedIterator;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// How the walker finds the next frame
#[derive(Debug, Clone, Copy)]
enum Stride {
    /// Each frame's length comes from its own header
    Headed { payload_bytes: u64 },
    /// Every frame has the externally declared length
    Fixed { frame_bytes: u64, stream_len: u64 },
}

/// Forward-only iterator over the frames of a stream
///
/// Yields frames in file order. The sequence ends at the first short read.
/// A declared length above the format maximum yields one
/// [`BitstreamError::FrameLengthOutOfRange`] and then ends.
pub struct FrameWalker<R> {
    reader: R,
    layout: StreamLayout,
    stride: Stride,
    /// Offset just past the last length field read (or frame walked)
    position: u64,
    frames: u64,
    done: bool,
}

impl<R: Read + Seek> FrameWalker<R> {
    /// Take ownership of `reader` and position it at the first frame
    pub fn new(mut reader: R, layout: StreamLayout) -> Result<Self, BitstreamError> {
        let unit = layout.format.unit_size_bytes();
        if unit == 0 {
            return Err(BitstreamError::UnsupportedFormat(layout.format));
        }

        let stride = if layout.has_sync_header {
            Stride::Headed { payload_bytes: 0 }
        } else if layout.declared_frame_len > 0 {
            let stream_len = reader.seek(SeekFrom::End(0))?;
            Stride::Fixed {
                frame_bytes: u64::from(layout.declared_frame_len) * unit,
                stream_len,
            }
        } else {
            return Err(BitstreamError::HeaderlessUnsupported);
        };
        reader.rewind()?;

        #[cfg(feature = "logging")]
        debug!("Walking {} stream ({:?})", layout.format, stride);

        Ok(Self {
            reader,
            layout,
            stride,
            position: 0,
            frames: 0,
            done: false,
        })
    }

    /// Layout the walker was configured with
    pub fn layout(&self) -> &StreamLayout {
        &self.layout
    }

    /// Number of frames emitted so far
    pub fn frames_walked(&self) -> u64 {
        self.frames
    }

    /// Give the reader back
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn next_headed(&mut self, payload_bytes: u64) -> Result<Option<Frame>, BitstreamError> {
        let format = self.layout.format;
        let unit = format.unit_size_bytes();
        let frame_offset = self.position + payload_bytes;

        // Skip the sync word of the frame about to be read
        self.reader.seek(SeekFrom::Start(frame_offset + unit))?;
        let Some(length) = format.read_unit(&mut self.reader, self.layout.byte_order)? else {
            return Ok(None);
        };

        let max = format.max_frame_len();
        if length > max {
            #[cfg(feature = "logging")]
            warn!(
                "Frame {} at byte {} declares length {}",
                self.frames + 1,
                frame_offset,
                length
            );

            return Err(BitstreamError::FrameLengthOutOfRange {
                frame: self.frames + 1,
                length: u32::from(length),
                max,
            });
        }

        self.position = frame_offset + HEADER_UNITS * unit;
        self.stride = Stride::Headed {
            payload_bytes: u64::from(length) * unit,
        };
        Ok(Some(self.emit(length, frame_offset)))
    }

    fn next_fixed(&mut self, frame_bytes: u64, stream_len: u64) -> Option<Frame> {
        let frame_offset = self.position;
        if frame_offset + frame_bytes > stream_len {
            return None;
        }
        self.position = frame_offset + frame_bytes;
        Some(self.emit(self.layout.declared_frame_len, frame_offset))
    }

    fn emit(&mut self, length_in_units: u16, byte_offset: u64) -> Frame {
        self.frames += 1;
        Frame {
            index: self.frames,
            length_in_units,
            byte_offset,
        }
    }
}

impl<R: Read + Seek> Iterator for FrameWalker<R> {
    type Item = Result<Frame, BitstreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = match self.stride {
            Stride::Headed { payload_bytes } => self.next_headed(payload_bytes),
            Stride::Fixed {
                frame_bytes,
                stream_len,
            } => Ok(self.next_fixed(frame_bytes, stream_len)),
        };

        match step {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                #[cfg(feature = "logging")]
                debug!("End of stream after {} frames", self.frames);

                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> FusedIterator for FrameWalker<R> {}
