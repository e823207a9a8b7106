//! Compile and decompile pipelines
//!
//! Glue between the file system, the transcoder and the pure
//! [`crate::builder`] / [`crate::reader`] functions.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use tempfile::NamedTempFile;

use crate::builder::{AssetInput, BuiltImage, ImageBuilder};
use crate::error::{AudimageError, Result};
use crate::format::{EntryName, DEFAULT_COMMENT};
use crate::reader::{cross_check, ImageReader};
use crate::source::{file_md5, file_size, scan_sources};
use crate::transcode::Transcoder;

/// Settings for [`compile_directory`]
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Extension of source files to pick up (without the dot)
    pub extension: String,
    /// Comment stored in the descriptive TOC
    pub comment: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            extension: "wav".to_string(),
            comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

/// Outcome of [`decompile_image`]
#[derive(Debug, Default)]
pub struct DecompileReport {
    /// Names of entries written to the output directory
    pub extracted: Vec<EntryName>,
    /// Path of the written `toc.json`, if the descriptive TOC was readable
    pub toc_path: Option<PathBuf>,
    /// Per-entry or per-region failures, in the order they happened
    pub failures: Vec<String>,
}

impl DecompileReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Transcode every source in `input_dir` and build an image
///
/// Sources are packed in file-name order.
pub fn compile_directory(
    input_dir: &Path,
    transcoder: &dyn Transcoder,
    options: &CompileOptions,
) -> Result<BuiltImage> {
    let sources = scan_sources(input_dir, &options.extension)?;
    info!(
        "Compiling {} sources from {} with {}",
        sources.len(),
        input_dir.display(),
        transcoder.name()
    );

    let mut builder = ImageBuilder::new().with_comment(options.comment.as_str());
    for source in sources {
        let payload = transcoder.transcode(&source.path)?;
        info!("{}: {} bytes raw", source.name, payload.len());
        builder.add(AssetInput {
            source_size: file_size(&source.path)?,
            source_md5: file_md5(&source.path)?,
            name: source.name,
            payload,
        })?;
    }

    builder.build()
}

/// Write `bytes` to `path` via a temporary file in the same directory
///
/// Either the complete image ends up at `path` or nothing does.
pub fn write_image_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_error = |e| AudimageError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_error)?;
    tmp.write_all(bytes).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;

    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// One line per present entry: `name: offset 0x2000 size 5000`
///
/// Entries that fail to decode are listed with their error instead.
pub fn list_image(image: &[u8]) -> Result<Vec<String>> {
    let reader = ImageReader::new(image)?;
    Ok(reader
        .entries()
        .map(|entry| match entry {
            Ok(e) => format!("{}: offset 0x{:x} size {}", e.name, e.offset, e.size),
            Err(e) => format!("error: {}", e),
        })
        .collect())
}

/// Unpack an image file into `output_dir`
///
/// Writes `<name>.raw` per entry, `<name>.wav` when a transcoder is given,
/// and `toc.json`. A failing entry is logged and recorded in the report;
/// the remaining entries are still extracted. Only a missing or truncated
/// image aborts immediately.
pub fn decompile_image(
    image_path: &Path,
    output_dir: &Path,
    transcoder: Option<&dyn Transcoder>,
) -> Result<DecompileReport> {
    let image = fs::read(image_path).map_err(|e| AudimageError::FileReadError {
        path: image_path.to_path_buf(),
        source: e,
    })?;
    let reader = ImageReader::new(&image)?;

    fs::create_dir_all(output_dir).map_err(|e| AudimageError::FileWriteError {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = DecompileReport::default();
    let mut entries = Vec::new();

    for entry in reader.entries() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("{}", e);
                report.failures.push(e.to_string());
                continue;
            }
        };
        info!(
            "{}: offset 0x{:x} size {}",
            entry.name, entry.offset, entry.size
        );

        match extract_entry(output_dir, &entry.name, entry.payload, transcoder) {
            Ok(()) => report.extracted.push(entry.name.clone()),
            Err(e) => {
                error!("{}: {}", entry.name, e);
                report.failures.push(format!("{}: {}", entry.name, e));
            }
        }
        entries.push(entry);
    }

    match reader.descriptive_toc() {
        Ok(toc) => {
            for mismatch in cross_check(&entries, &toc) {
                warn!("TOC mismatch: {}", mismatch);
            }
            let toc_path = output_dir.join("toc.json");
            let pretty = toc.to_pretty()?;
            fs::write(&toc_path, pretty).map_err(|e| AudimageError::FileWriteError {
                path: toc_path.clone(),
                source: e,
            })?;
            report.toc_path = Some(toc_path);
        }
        Err(e) => {
            error!("{}", e);
            report.failures.push(e.to_string());
        }
    }

    Ok(report)
}

fn extract_entry(
    output_dir: &Path,
    name: &EntryName,
    payload: &[u8],
    transcoder: Option<&dyn Transcoder>,
) -> Result<()> {
    let stem = name.as_file_stem()?;
    let raw_path = output_dir.join(format!("{}.raw", stem));
    fs::write(&raw_path, payload).map_err(|e| AudimageError::FileWriteError {
        path: raw_path,
        source: e,
    })?;

    if let Some(transcoder) = transcoder {
        let wav = transcoder.untranscode(payload)?;
        let wav_path = output_dir.join(format!("{}.wav", stem));
        fs::write(&wav_path, wav).map_err(|e| AudimageError::FileWriteError {
            path: wav_path,
            source: e,
        })?;
    }

    Ok(())
}
