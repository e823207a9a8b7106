//! Source file discovery and fingerprinting

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use walkdir::WalkDir;

use crate::error::{AudimageError, Result};
use crate::format::EntryName;

/// A source file picked up for packing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: EntryName,
}

/// List files in `dir` (not recursive) whose extension is `extension`
///
/// The result is sorted by path, which fixes the order of entries in the
/// image. The extension match is case-sensitive.
pub fn scan_sources(dir: &Path, extension: &str) -> Result<Vec<SourceFile>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            AudimageError::FileReadError {
                path,
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) == Some(extension) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let name = asset_name(&path)?;
            Ok(SourceFile { path, name })
        })
        .collect()
}

/// Asset name for a source file: its base name without extension
pub fn asset_name(path: &Path) -> Result<EntryName> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AudimageError::InvalidName {
            name: path.display().to_string(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;
    EntryName::new(stem)
}

/// Size of a file in bytes
pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| AudimageError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })
}

/// MD5 of a file as lowercase hex
pub fn file_md5(path: &Path) -> Result<String> {
    let read_error = |e| AudimageError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    };
    let mut file = fs::File::open(path).map_err(read_error)?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; 1024 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(read_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in ["horn.wav", "beep.wav", "notes.txt", "engine.wav"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.wav")).unwrap();

        let sources = scan_sources(dir.path(), "wav").unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["beep", "engine", "horn"]);
    }

    #[test]
    fn test_scan_missing_dir() {
        let dir = tempdir().unwrap();
        let err = scan_sources(&dir.path().join("absent"), "wav").unwrap_err();
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
    }

    #[test]
    fn test_asset_name_strips_dir_and_extension() {
        let name = asset_name(Path::new("/tmp/sounds/door.open.wav")).unwrap();
        assert_eq!(name.as_str(), "door.open");
    }

    #[test]
    fn test_asset_name_too_long() {
        let long = format!("{}.wav", "x".repeat(57));
        assert!(matches!(
            asset_name(Path::new(&long)),
            Err(AudimageError::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_file_md5_known_value() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty");
        fs::write(&empty, b"").unwrap();
        assert_eq!(file_md5(&empty).unwrap(), "d41d8cd98f00b204e9800998ecf8427e");

        let abc = dir.path().join("abc");
        fs::write(&abc, b"abc").unwrap();
        assert_eq!(file_md5(&abc).unwrap(), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(file_size(&abc).unwrap(), 3);
    }
}
