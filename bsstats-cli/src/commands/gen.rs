use anyhow::{bail, Context, Result};
use bsstats_core::{encoder::StreamBuilder, ByteOrder, FrameFormat};
use std::fs;
use tracing::info;

/// Write a synthetic framed stream with the given frame lengths
///
/// `erased` holds 1-based frame numbers written with the erased-frame sync
/// word and blank payload.
pub fn execute(
    lengths: &[u16],
    output: &str,
    format: FrameFormat,
    big_endian: bool,
    erased: &[u64],
) -> Result<()> {
    if !format.is_self_describing() {
        bail!("Cannot generate {} streams", format);
    }
    if let Some(bad) = erased.iter().find(|&&n| n == 0 || n > lengths.len() as u64) {
        bail!("Erased frame {} is outside 1..={}", bad, lengths.len());
    }

    info!("Generating {} {} frames into {}", lengths.len(), format, output);

    let order = if big_endian {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };

    let mut builder = StreamBuilder::new(format).byte_order(order);
    for (i, &len) in lengths.iter().enumerate() {
        builder = if erased.contains(&(i as u64 + 1)) {
            builder.erased_frame(len)
        } else {
            builder.frame(len)
        };
    }

    let stream = builder
        .build()
        .with_context(|| "Failed to encode frames")?;

    fs::write(output, &stream)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!("Wrote {} bytes", stream.len());

    Ok(())
}
