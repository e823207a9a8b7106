//! CLI Module
//!
//! Command-line interface for building and unpacking audio images.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// audimage - pack raw audio into aligned flash images
#[derive(Parser, Debug)]
#[command(name = "audimage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which transcoder turns sources into raw PCM and back
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscoderKind {
    /// External sox binary
    Sox,
    /// Built-in WAV decoder
    Builtin,
}

/// Raw PCM format options shared by compile and decompile
#[derive(clap::Args, Debug, Clone)]
pub struct TranscodeArgs {
    /// Transcoder implementation
    #[arg(long, value_enum, default_value_t = TranscoderKind::Sox)]
    pub transcoder: TranscoderKind,

    /// Path to the sox executable
    #[arg(long, default_value = "sox")]
    pub sox: PathBuf,

    /// Raw sample rate in Hz
    #[arg(long, default_value_t = 11025)]
    pub sample_rate: u32,

    /// Raw bits per sample (8 = unsigned, 16 = signed)
    #[arg(long, default_value_t = 8)]
    pub bits: u16,

    /// Raw channel count
    #[arg(long, default_value_t = 1)]
    pub channels: u16,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an image from every source file in a directory
    #[command(name = "compile")]
    Compile {
        /// Directory holding the source audio files
        input_dir: PathBuf,

        /// Image file to write
        output_file: PathBuf,

        /// Extension of source files to include
        #[arg(short, long, default_value = "wav")]
        extension: String,

        /// Comment stored in the JSON TOC
        #[arg(short, long)]
        comment: Option<String>,

        #[command(flatten)]
        transcode: TranscodeArgs,
    },

    /// Unpack every entry of an image into a directory
    #[command(name = "decompile")]
    Decompile {
        /// Image file to read
        input_file: PathBuf,

        /// Directory for .raw/.wav files and toc.json
        output_dir: PathBuf,

        /// Only write .raw payloads, skip WAV re-encoding
        #[arg(long)]
        raw_only: bool,

        #[command(flatten)]
        transcode: TranscodeArgs,
    },

    /// Print the binary TOC of an image
    #[command(name = "list")]
    List {
        /// Image file to read
        input_file: PathBuf,
    },

    /// Extract the audio track of a video file to WAV using ffmpeg
    #[command(name = "extract-audio")]
    ExtractAudio {
        /// Input media file
        input_file: PathBuf,

        /// WAV file to write
        output_file: PathBuf,

        /// Path to the ffmpeg executable
        #[arg(long, default_value = "ffmpeg")]
        ffmpeg: PathBuf,
    },
}
