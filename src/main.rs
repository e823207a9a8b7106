//! audimage CLI - Audio Image Compiler
//!
//! Command-line interface for building and unpacking audio images.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::debug;

use audimage::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("audimage v{}", env!("CARGO_PKG_VERSION"));

    handle_command(cli.command)
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Compile {
            input_dir,
            output_file,
            extension,
            comment,
            transcode,
        } => commands::compile(
            &input_dir,
            &output_file,
            &extension,
            comment.as_deref(),
            &transcode,
        )
        .with_context(|| format!("compiling {}", input_dir.display())),
        Commands::Decompile {
            input_file,
            output_dir,
            raw_only,
            transcode,
        } => commands::decompile(&input_file, &output_dir, raw_only, &transcode)
            .with_context(|| format!("decompiling {}", input_file.display())),
        Commands::List { input_file } => commands::list(&input_file)
            .with_context(|| format!("listing {}", input_file.display())),
        Commands::ExtractAudio {
            input_file,
            output_file,
            ffmpeg,
        } => commands::extract_audio(&input_file, &output_file, &ffmpeg)
            .with_context(|| format!("extracting audio from {}", input_file.display())),
    }
}
