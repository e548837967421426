use anyhow::Result;
use bsstats_cli::{commands, FormatArg};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bs-stats")]
#[command(
    about = "Report the frame sizes found in a G.192 encoded-speech bitstream",
    long_about = "Reports the frame sizes found in a word- or byte-oriented G.192 \
                  bitstream, one per line, followed by a histogram summary. Compact \
                  and headerless bitstreams are not supported. Multiplexed channels \
                  and erased frames are not reported separately."
)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report frame sizes and statistics of a bitstream
    Stats {
        /// Input encoded speech bitstream file
        input: String,

        /// File receiving one frame length per line (`-` for stdout)
        listing: Option<String>,

        /// Assumed bitstream format
        #[arg(long = "bs", value_enum, default_value_t = FormatArg::G192)]
        format: FormatArg,

        /// Word units are stored most significant byte first
        #[arg(long)]
        big_endian: bool,

        /// Frame length (units) for headerless bitstreams
        #[arg(long, default_value = "0")]
        frame_len: u16,

        /// Quiet operation: no summary report
        #[arg(short, long)]
        quiet: bool,

        /// Very quiet operation: no frame length listing
        #[arg(long = "qq")]
        very_quiet: bool,

        /// Write the summary as JSON to this file
        #[arg(long)]
        json: Option<String>,
    },

    /// Generate a synthetic bitstream
    Gen {
        /// Comma-separated frame lengths
        #[arg(short, long, value_delimiter = ',', required = true)]
        lengths: Vec<u16>,

        /// Output bitstream file
        #[arg(short, long)]
        output: String,

        /// Bitstream format
        #[arg(long = "bs", value_enum, default_value_t = FormatArg::G192)]
        format: FormatArg,

        /// Store word units most significant byte first
        #[arg(long)]
        big_endian: bool,

        /// Comma-separated 1-based numbers of erased frames
        #[arg(long, value_delimiter = ',')]
        erased: Vec<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Stats {
            input,
            listing,
            format,
            big_endian,
            frame_len,
            quiet,
            very_quiet,
            json,
        } => {
            let config = commands::stats::StatsConfig {
                input,
                listing,
                format: format.into(),
                big_endian,
                frame_len,
                quiet,
                very_quiet,
                json,
            };
            commands::stats::execute(&config).map(|_| ())
        }

        Commands::Gen {
            lengths,
            output,
            format,
            big_endian,
            erased,
        } => commands::gen::execute(&lengths, &output, format.into(), big_endian, &erased),
    }
}
