use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::Rgb;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{DecodeConfig, EncodeConfig};
use crate::raw::Stride;

mod config;
mod decode;
mod encode;
mod error;
mod pixel;
mod raw;

/// Convert between images and headerless RGB byte streams.
#[derive(Parser, Debug)]
#[command(name = "rawframes", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten an image into 3 bytes (R, G, B) per pixel, row by row.
    Encode {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(short, long, default_value = config::ENCODE_OUTPUT)]
        output: PathBuf,
    },

    /// Cut a raw stream into fixed-size frames and save each one as a PNG.
    Decode {
        #[arg(short, long, default_value = config::DECODE_INPUT)]
        input: PathBuf,

        #[arg(short, long, default_value = config::DECODE_OUTPUT_DIR)]
        output_dir: PathBuf,

        #[arg(long, default_value_t = config::FRAME_WIDTH)]
        width: u32,

        #[arg(long, default_value_t = config::FRAME_HEIGHT)]
        height: u32,

        /// Stop after this many frames even if input remains.
        #[arg(long, default_value_t = config::MAX_FRAMES)]
        max_frames: u32,

        /// Bytes per pixel in the stream: `padded` (4, last one ignored) or
        /// `packed` (3, what `encode` writes).
        #[arg(long, default_value_t = Stride::Padded)]
        stride: Stride,

        /// Fill color of the frame buffer, as RRGGBB.
        #[arg(long, default_value = "000000", value_parser = config::parse_color)]
        background: Rgb<u8>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rawframes={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(args.command) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Encode { input, output } => {
            let config = EncodeConfig { output };
            let summary = encode::encode_file(&input, &config)
                .with_context(|| format!("Failed to encode {}", input.display()))?;

            println!(
                "{} ({}x{} {}) -> {} ({} bytes)",
                input.display(),
                summary.width,
                summary.height,
                summary.layout,
                config.output.display(),
                summary.bytes
            );
        }
        Command::Decode {
            input,
            output_dir,
            width,
            height,
            max_frames,
            stride,
            background,
        } => {
            let config = DecodeConfig {
                input,
                output_dir,
                width,
                height,
                max_frames,
                stride,
                background,
            };
            let summary = decode::decode_file(&config)
                .with_context(|| format!("Failed to decode {}", config.input.display()))?;

            println!(
                "{} -> {} frames in {}",
                config.input.display(),
                summary.frames,
                config.output_dir.display()
            );
            if summary.dropped > 0 {
                println!("{} trailing pixels did not fill a frame", summary.dropped);
            }
        }
    }

    Ok(())
}
