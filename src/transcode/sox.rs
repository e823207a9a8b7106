//! sox-backed transcoder

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;

use crate::error::{AudimageError, Result};
use crate::transcode::{run_tool, RawFormat, Transcoder};

/// Transcodes through an external `sox` binary
#[derive(Debug, Clone)]
pub struct SoxTranscoder {
    program: PathBuf,
    format: RawFormat,
}

impl Default for SoxTranscoder {
    fn default() -> Self {
        Self::new(RawFormat::default())
    }
}

impl SoxTranscoder {
    pub fn new(format: RawFormat) -> Self {
        Self {
            program: PathBuf::from("sox"),
            format,
        }
    }

    /// Use a specific sox executable instead of the one on `PATH`
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn format(&self) -> RawFormat {
        self.format
    }

    /// `-r <rate> -e <encoding> -b <bits> -c <channels> -t raw`
    fn raw_args(&self) -> Vec<String> {
        vec![
            "-r".to_string(),
            self.format.sample_rate.to_string(),
            "-e".to_string(),
            self.format.encoding().to_string(),
            "-b".to_string(),
            self.format.bits_per_sample.to_string(),
            "-c".to_string(),
            self.format.channels.to_string(),
            "-t".to_string(),
            "raw".to_string(),
        ]
    }
}

impl Transcoder for SoxTranscoder {
    fn name(&self) -> &str {
        "sox"
    }

    fn transcode(&self, input: &Path) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command.arg(input).args(self.raw_args()).arg("-");
        run_tool(&mut command, "sox")
    }

    fn untranscode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        // sox needs a seekable input for raw data of unknown length
        let mut input = NamedTempFile::new()?;
        input
            .write_all(raw)
            .and_then(|_| input.flush())
            .map_err(|e| AudimageError::FileWriteError {
                path: input.path().to_path_buf(),
                source: e,
            })?;

        let mut command = Command::new(&self.program);
        command
            .args(self.raw_args())
            .arg(input.path())
            .args(["-t", "wav", "-"]);
        run_tool(&mut command, "sox")
    }
}
