use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rlad")]
#[command(version = "0.1.0")]
#[command(about = "RLAD audio format converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an audio file to RLAD
    Encode {
        /// Input audio file (wav, mp3, flac, ogg, etc.)
        input: PathBuf,
        /// Output RLAD file
        output: PathBuf,
        /// Enable lossy compression (drops the low 4 bits per sample)
        #[arg(long)]
        lossy: bool,
    },
    /// Decode an RLAD file to WAV
    Decode {
        /// Input RLAD file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
    },
    /// Show information about an RLAD file
    Info {
        /// Input RLAD file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            lossy,
        } => encode(&input, &output, lossy),
        Commands::Decode { input, output } => decode(&input, &output),
        Commands::Info { input } => info(&input),
    }
}

fn encode(input: &PathBuf, output: &PathBuf, lossy: bool) -> Result<()> {
    println!("Reading {}...", input.display());

    let audio_bytes = fs::read(input).context("Failed to read input file")?;

    if lossy {
        println!("Encoding to RLAD (lossy)...");
    } else {
        println!("Encoding to RLAD (lossless)...");
    }

    let rlad_data = rerlad::encode_from_audio(&audio_bytes, lossy)?;
    fs::write(output, &rlad_data).context("Failed to write output file")?;

    let stream_info = rerlad::get_rlad_info(&rlad_data)?;
    println!("Done!");
    println!("  Output: {}", output.display());
    println!(
        "  Size: {} bytes ({:.1}x compression)",
        rlad_data.len(),
        stream_info.compression_ratio
    );

    Ok(())
}

fn decode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());

    let rlad_data = fs::read(input).context("Failed to read RLAD file")?;

    let stream_info = rerlad::get_rlad_info(&rlad_data)?;
    println!("  Sample rate: {} Hz", stream_info.sample_rate);
    println!("  Channels: {}", stream_info.channels);
    println!("  Duration: {:.2}s", stream_info.duration_secs);

    println!("Decoding...");
    let wav_bytes = rerlad::decode_to_wav(&rlad_data)?;

    fs::write(output, wav_bytes).context("Failed to write WAV file")?;

    println!("Done!");
    println!("  Output: {}", output.display());

    Ok(())
}

fn info(input: &PathBuf) -> Result<()> {
    let rlad_data = fs::read(input).context("Failed to read RLAD file")?;
    let stream_info = rerlad::get_rlad_info(&rlad_data)?;

    println!("RLAD Audio File");
    println!("-------------------------------");
    println!("  Mode:        {}", if stream_info.lossless { "lossless" } else { "lossy" });
    println!("  Sample rate: {} Hz", stream_info.sample_rate);
    println!("  Channels:    {}", stream_info.channels);
    println!("  Duration:    {:.2}s", stream_info.duration_secs);
    println!("  Frames:      {}", stream_info.frame_count);
    println!("  Blocks:      {}", stream_info.block_count);
    println!("  File size:   {} bytes", rlad_data.len());
    println!("  Compression: {:.1}x", stream_info.compression_ratio);

    Ok(())
}
