//! audimage - Audio Image Compiler
//!
//! Packs up to 64 raw audio payloads into a single seekable image with two
//! redundant tables of contents, and unpacks such images again.
//!
//! # Architecture
//!
//! - [`format`]: layout constants, record codec, JSON TOC document
//! - [`builder`]: payloads in, image bytes out (pure)
//! - [`reader`]: image bytes in, payloads and TOC out (pure)
//! - [`transcode`] and [`source`]: external collaborators (sox, WAV, hashing)
//! - [`pipeline`]: file-level compile/decompile on top of the above

pub mod builder;
pub mod cli;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod reader;
pub mod source;
pub mod transcode;

pub use builder::{build_image, AssetInput, BuiltImage, ImageBuilder, TocEntry};
pub use error::{AudimageError, ErrorKind, Result};
pub use format::{DescriptiveToc, EntryName, TocDocEntry};
pub use reader::{read_image, DecodedImage, ImageEntry, ImageReader, TocMismatch};
