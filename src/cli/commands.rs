//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::cli::{TranscodeArgs, TranscoderKind};
use crate::error::{AudimageError, Result};
use crate::format::DEFAULT_COMMENT;
use crate::pipeline::{
    compile_directory, decompile_image, list_image, write_image_atomic, CompileOptions,
};
use crate::transcode::{self, RawFormat, SoxTranscoder, Transcoder, WavTranscoder};

/// Build the transcoder selected on the command line
pub fn make_transcoder(args: &TranscodeArgs) -> Result<Box<dyn Transcoder>> {
    let format = RawFormat::new(args.sample_rate, args.bits, args.channels);
    format.validate()?;
    let transcoder: Box<dyn Transcoder> = match args.transcoder {
        TranscoderKind::Sox => Box::new(SoxTranscoder::new(format).with_program(&args.sox)),
        TranscoderKind::Builtin => Box::new(WavTranscoder::new(format)),
    };
    Ok(transcoder)
}

/// Compile a directory of sources into an image file.
pub fn compile(
    input_dir: &Path,
    output_file: &Path,
    extension: &str,
    comment: Option<&str>,
    transcode: &TranscodeArgs,
) -> Result<()> {
    info!(
        "Compiling {} into {}",
        input_dir.display(),
        output_file.display()
    );

    let transcoder = make_transcoder(transcode)?;
    let options = CompileOptions {
        extension: extension.to_string(),
        comment: comment.unwrap_or(DEFAULT_COMMENT).to_string(),
    };

    let image = compile_directory(input_dir, transcoder.as_ref(), &options)?;
    write_image_atomic(output_file, &image.bytes)?;

    for entry in &image.entries {
        println!(
            "{}: offset 0x{:x} size {}",
            entry.name, entry.offset, entry.size
        );
    }
    println!(
        "Image written: {} ({} entries, {} bytes)",
        output_file.display(),
        image.entries.len(),
        image.bytes.len()
    );

    Ok(())
}

/// Unpack an image into a directory.
pub fn decompile(
    input_file: &Path,
    output_dir: &Path,
    raw_only: bool,
    transcode: &TranscodeArgs,
) -> Result<()> {
    info!(
        "Decompiling {} into {}",
        input_file.display(),
        output_dir.display()
    );

    let transcoder = if raw_only {
        None
    } else {
        Some(make_transcoder(transcode)?)
    };

    let report = decompile_image(input_file, output_dir, transcoder.as_deref())?;

    for name in &report.extracted {
        println!("Extracted: {}", name);
    }
    if let Some(toc_path) = &report.toc_path {
        println!("TOC written: {}", toc_path.display());
    }

    if !report.is_complete() {
        for failure in &report.failures {
            warn!("{}", failure);
        }
        return Err(AudimageError::ExtractionIncomplete {
            count: report.failures.len(),
        });
    }

    Ok(())
}

/// Print the binary TOC of an image.
pub fn list(input_file: &Path) -> Result<()> {
    let image = fs::read(input_file).map_err(|e| AudimageError::FileReadError {
        path: input_file.to_path_buf(),
        source: e,
    })?;

    let lines = list_image(&image)?;
    if lines.is_empty() {
        println!("No entries.");
    }
    for line in lines {
        println!("{}", line);
    }

    Ok(())
}

/// Extract the audio track of a media file.
pub fn extract_audio(input_file: &Path, output_file: &Path, ffmpeg: &Path) -> Result<()> {
    transcode::extract_audio(ffmpeg, input_file, output_file)?;
    println!("Audio extracted: {}", output_file.display());
    Ok(())
}
