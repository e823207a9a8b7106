//! Transcoding collaborators
//!
//! The image only stores raw PCM. Turning a source file into raw PCM, and raw
//! PCM back into something playable, is delegated to a [`Transcoder`].

pub mod ffmpeg;
pub mod sox;
pub mod wav;

use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{AudimageError, Result};

pub use ffmpeg::extract_audio;
pub use sox::SoxTranscoder;
pub use wav::WavTranscoder;

/// Raw PCM layout stored in image payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// 8 (unsigned) or 16 (signed little-endian)
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl Default for RawFormat {
    fn default() -> Self {
        RawFormat {
            sample_rate: 11025,
            bits_per_sample: 8,
            channels: 1,
        }
    }
}

impl RawFormat {
    pub fn new(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Self {
        RawFormat {
            sample_rate,
            bits_per_sample,
            channels,
        }
    }

    /// Sample encoding name as sox spells it
    pub fn encoding(&self) -> &'static str {
        if self.bits_per_sample == 8 {
            "unsigned"
        } else {
            "signed"
        }
    }

    /// Bytes per interleaved frame
    pub fn frame_size(&self) -> usize {
        usize::from(self.bits_per_sample / 8) * usize::from(self.channels)
    }

    /// Reject layouts the transcoders cannot produce
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.bits_per_sample, 8 | 16) {
            return Err(AudimageError::UnsupportedFormat {
                format: format!(
                    "{}-bit raw PCM (only 8 and 16 supported)",
                    self.bits_per_sample
                ),
            });
        }
        if self.channels == 0 || self.sample_rate == 0 {
            return Err(AudimageError::UnsupportedFormat {
                format: format!(
                    "{} channels at {} Hz",
                    self.channels, self.sample_rate
                ),
            });
        }
        Ok(())
    }
}

/// Converts between source audio files and raw PCM payloads
pub trait Transcoder {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Read `input` and return raw PCM in the target format
    fn transcode(&self, input: &Path) -> Result<Vec<u8>>;

    /// Wrap raw PCM into a playable file (WAV container)
    fn untranscode(&self, raw: &[u8]) -> Result<Vec<u8>>;
}

/// Run an external tool and return its stdout
pub(crate) fn run_tool(command: &mut Command, tool: &str) -> Result<Vec<u8>> {
    debug!("Running {:?}", command);
    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AudimageError::ToolNotFound {
                    tool: tool.to_string(),
                    source: e,
                }
            } else {
                AudimageError::ToolFailed {
                    tool: tool.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AudimageError::ToolFailed {
            tool: tool.to_string(),
            reason: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let format = RawFormat::default();
        assert_eq!(format.sample_rate, 11025);
        assert_eq!(format.encoding(), "unsigned");
        assert_eq!(format.frame_size(), 1);
        assert!(format.validate().is_ok());
    }

    #[test]
    fn test_sixteen_bit_stereo() {
        let format = RawFormat::new(44100, 16, 2);
        assert_eq!(format.encoding(), "signed");
        assert_eq!(format.frame_size(), 4);
    }

    #[test]
    fn test_validate_rejects_24_bit() {
        let err = RawFormat::new(48000, 24, 1).validate().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert!(RawFormat::new(48000, 8, 0).validate().is_err());
    }

    #[test]
    fn test_missing_tool() {
        let err = run_tool(
            &mut Command::new("audimage-no-such-tool-xyz"),
            "audimage-no-such-tool-xyz",
        )
        .unwrap_err();
        assert!(matches!(err, AudimageError::ToolNotFound { .. }));
    }
}
