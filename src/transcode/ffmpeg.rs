//! Audio extraction from video containers via ffmpeg

use std::path::Path;
use std::process::Command;

use log::info;

use crate::error::Result;
use crate::transcode::run_tool;

/// Extract the audio track of `input` into a 44.1 kHz stereo WAV at `output`
///
/// `program` is the ffmpeg executable, usually just `ffmpeg`.
pub fn extract_audio(program: &Path, input: &Path, output: &Path) -> Result<()> {
    info!("Extracting audio: {} -> {}", input.display(), output.display());
    let mut command = Command::new(program);
    command
        .arg("-i")
        .arg(input)
        .args(["-vn", "-ar", "44100", "-ac", "2", "-f", "wav"])
        .arg(output);
    run_tool(&mut command, "ffmpeg")?;
    Ok(())
}
