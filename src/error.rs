//! Error handling for audimage
//!
//! Every failure belongs to one of three families: bad build input, a
//! malformed image, or a failing external collaborator (transcoder, file
//! system). Nothing here is retried; errors abort the current operation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for audimage operations
pub type Result<T> = std::result::Result<T, AudimageError>;

/// Broad error family, used by callers to decide how to report a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The assets handed to the builder cannot be packed
    Input,
    /// The image bytes are not a well-formed audio image
    Format,
    /// An external tool or the file system failed
    Collaborator,
}

/// Main error type for audimage operations
#[derive(Error, Debug)]
pub enum AudimageError {
    // Input Errors
    #[error("Too many assets: {count} (maximum {max})")]
    TooManyEntries { count: usize, max: usize },

    #[error("Asset name '{name}' is {len} bytes encoded (maximum {max})")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("Asset name {name:?} is not allowed: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Duplicate asset name: {name}")]
    DuplicateName { name: String },

    #[error("Payload of '{name}' does not fit into 32-bit image offsets")]
    PayloadTooLarge { name: String },

    #[error("Descriptive TOC is {len} bytes (maximum {max})")]
    DescriptiveTocOverflow { len: usize, max: usize },

    // Format Errors
    #[error("Image is {len} bytes, too short to hold both TOC regions ({min} bytes)")]
    ImageTooShort { len: usize, min: usize },

    #[error("Entry {slot} ('{name}') spans {offset}..{end}, beyond the image end ({len})")]
    EntryOutOfBounds {
        slot: usize,
        name: String,
        offset: u64,
        end: u64,
        len: usize,
    },

    #[error("Entry {slot} has a name that is not valid UTF-8")]
    UndecodableName {
        slot: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Descriptive TOC region cannot be parsed: {source}")]
    MalformedDescriptiveToc {
        #[source]
        source: serde_json::Error,
    },

    // Collaborator Errors
    #[error("External tool not found: {tool}")]
    ToolNotFound {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("External tool '{tool}' failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("Invalid audio file {path}: {reason}")]
    InvalidAudio {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decompile finished with {count} failed entries")]
    ExtractionIncomplete { count: usize },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AudimageError {
    /// Which error family this belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            AudimageError::TooManyEntries { .. }
            | AudimageError::NameTooLong { .. }
            | AudimageError::InvalidName { .. }
            | AudimageError::DuplicateName { .. }
            | AudimageError::PayloadTooLarge { .. }
            | AudimageError::DescriptiveTocOverflow { .. } => ErrorKind::Input,
            AudimageError::ImageTooShort { .. }
            | AudimageError::EntryOutOfBounds { .. }
            | AudimageError::UndecodableName { .. }
            | AudimageError::MalformedDescriptiveToc { .. } => ErrorKind::Format,
            _ => ErrorKind::Collaborator,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AudimageError::TooManyEntries { .. } => "TOO_MANY_ENTRIES",
            AudimageError::NameTooLong { .. } => "NAME_TOO_LONG",
            AudimageError::InvalidName { .. } => "INVALID_NAME",
            AudimageError::DuplicateName { .. } => "DUPLICATE_NAME",
            AudimageError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            AudimageError::DescriptiveTocOverflow { .. } => "DESCRIPTIVE_TOC_OVERFLOW",
            AudimageError::ImageTooShort { .. } => "IMAGE_TOO_SHORT",
            AudimageError::EntryOutOfBounds { .. } => "ENTRY_OUT_OF_BOUNDS",
            AudimageError::UndecodableName { .. } => "UNDECODABLE_NAME",
            AudimageError::MalformedDescriptiveToc { .. } => "MALFORMED_DESCRIPTIVE_TOC",
            AudimageError::ToolNotFound { .. } => "TOOL_NOT_FOUND",
            AudimageError::ToolFailed { .. } => "TOOL_FAILED",
            AudimageError::InvalidAudio { .. } => "INVALID_AUDIO",
            AudimageError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            AudimageError::FileReadError { .. } => "FILE_READ_ERROR",
            AudimageError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            AudimageError::ExtractionIncomplete { .. } => "EXTRACTION_INCOMPLETE",
            AudimageError::Io(_) => "IO_ERROR",
            AudimageError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AudimageError::TooManyEntries { .. } => vec![
                "Split the input directory into several images",
                "An image holds at most 64 assets",
            ],
            AudimageError::NameTooLong { .. } => vec![
                "Rename the source file to a shorter base name",
                "Names are limited to 56 bytes of UTF-8",
            ],
            AudimageError::DescriptiveTocOverflow { .. } => vec![
                "Use shorter file names or a shorter comment",
                "Split the input directory into several images",
            ],
            AudimageError::ImageTooShort { .. } | AudimageError::EntryOutOfBounds { .. } => vec![
                "The image is truncated or not an audio image",
                "Re-create the image from its sources",
            ],
            AudimageError::ToolNotFound { .. } => vec![
                "Install the tool or pass its path explicitly",
                "Use the built-in transcoder for WAV sources",
            ],
            AudimageError::UnsupportedFormat { .. } => vec![
                "Convert the source to PCM WAV first",
                "Supported raw output: 8-bit unsigned or 16-bit signed",
            ],
            _ => vec![],
        }
    }
}
