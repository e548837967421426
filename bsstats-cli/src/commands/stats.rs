use anyhow::{Context, Result};
use bsstats_core::{analyze_with, AnalyzerOptions, ByteOrder, FrameFormat, Summary};
use colored::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use tracing::{info, warn};

/// Options of the `stats` command
#[derive(Debug, Clone, Default)]
pub struct StatsConfig {
    /// Input bitstream file
    pub input: String,
    /// Frame-length listing file, `-` for stdout
    pub listing: Option<String>,
    /// Format the user expects
    pub format: FrameFormat,
    /// Word units stored most significant byte first
    pub big_endian: bool,
    /// Frame length for headerless streams
    pub frame_len: u16,
    /// Do not print the summary report
    pub quiet: bool,
    /// Do not write the listing
    pub very_quiet: bool,
    /// Write the summary as JSON to this path
    pub json: Option<String>,
}

#[derive(Serialize)]
struct StatsJson<'a> {
    input: &'a str,
    #[serde(flatten)]
    summary: &'a Summary,
    distinct_sizes: u64,
    longest_ratio: f64,
    shortest_ratio: f64,
    extremes_ratio: f64,
}

pub fn execute(config: &StatsConfig) -> Result<Summary> {
    info!("Inspecting bitstream: {}", config.input);

    let file = File::open(&config.input)
        .with_context(|| format!("Could not open input bitstream file: {}", config.input))?;

    let listing_path = if config.very_quiet {
        None
    } else {
        Some(config.listing.as_deref().unwrap_or("-"))
    };

    let mut listing: Option<BufWriter<Box<dyn Write>>> = match listing_path {
        None => None,
        Some("-") => Some(BufWriter::new(Box::new(io::stdout()))),
        Some(path) => {
            let f = File::create(path)
                .with_context(|| format!("Could not open output ASCII file: {}", path))?;
            Some(BufWriter::new(Box::new(f)))
        }
    };

    let options = AnalyzerOptions {
        assumed_format: config.format,
        byte_order: if config.big_endian {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        },
        declared_frame_len: config.frame_len,
    };

    let summary = analyze_with(BufReader::new(file), &options, |frame| match listing.as_mut() {
        Some(out) => writeln!(out, "{}", frame.length_in_units),
        None => Ok(()),
    })
    .with_context(|| format!("Failed to inspect bitstream: {}", config.input))?;

    if let Some(mut out) = listing {
        out.flush().context("Error writing to output ASCII file")?;
    }

    if let Some(m) = summary.mismatch {
        warn!("Assumed format {} but found {}", m.assumed, m.detected);
        eprintln!(
            "{}",
            format!(
                "*** Switching bitstream format from {} to {} ***",
                m.assumed, m.detected
            )
            .yellow()
        );
    }

    info!(
        "Found {} frames ({} format)",
        summary.histogram.total_frames(),
        summary.layout.format
    );

    if !config.quiet {
        let stdout = io::stdout();
        write_report(&mut stdout.lock(), &config.input, listing_path, &summary)?;
    }

    if let Some(json_path) = config.json.as_deref() {
        let h = &summary.histogram;
        let report = StatsJson {
            input: &config.input,
            summary: &summary,
            distinct_sizes: h.distinct_sizes_seen(),
            longest_ratio: h.longest_ratio(),
            shortest_ratio: h.shortest_ratio(),
            extremes_ratio: h.extremes_ratio(),
        };
        let json = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize summary")?;

        fs::write(json_path, json)
            .with_context(|| format!("Failed to write output file: {}", json_path))?;

        info!("Summary written to: {}", json_path);
    }

    Ok(summary)
}

/// Print the classic `#`-prefixed summary report
pub fn write_report<W: Write>(
    out: &mut W,
    input: &str,
    listing: Option<&str>,
    summary: &Summary,
) -> io::Result<()> {
    let h = &summary.histogram;

    writeln!(out, "# -----------------------------------------------------")?;
    writeln!(out, "# Bitstream file: ........... {}", input)?;
    match listing {
        Some("-") => writeln!(out, "# Frame lengths saved in: ... stdout")?,
        Some(path) => writeln!(out, "# Frame lengths saved in: ... {}", path)?,
        None => writeln!(out, "# Frame lengths NOT saved to a file")?,
    }
    writeln!(
        out,
        "# Bitstream format {}...... : {}",
        if summary.layout.has_sync_header {
            "(G.192 header) "
        } else {
            "(headerless) .."
        },
        summary.layout.format
    )?;
    writeln!(
        out,
        "# Frame size count summary (total {} frame sizes found):",
        h.distinct_sizes_seen()
    )?;
    for (len, count) in h.iter() {
        writeln!(out, "# -Frame length {:3} count is {:5}", len, count)?;
    }
    writeln!(out, "# Total number of frames: {}", h.total_frames())?;
    writeln!(
        out,
        "# (Act) Ratio between longest and total frame count is    {:7.3}",
        h.longest_ratio()
    )?;
    writeln!(
        out,
        "# (Efc) Ratio between shortest and total frame count is   {:7.3}",
        h.shortest_ratio()
    )?;

    Ok(())
}
