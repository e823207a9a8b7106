//! Image builder
//!
//! Packs an ordered set of raw payloads into one audio image. Assets keep
//! their insertion order; callers sort them by source file name first so the
//! output is deterministic.
//!
//! The whole image is assembled in memory. Writing it out is the caller's
//! job (see [`crate::pipeline::write_image_atomic`]).

use std::collections::HashSet;

use log::debug;

use crate::error::{AudimageError, Result};
use crate::format::{
    pad_to, padded_len, DescriptiveToc, EntryName, TocDocEntry, TocRecord, BINARY_TOC_SIZE,
    DEFAULT_COMMENT, MAX_ENTRIES, PAYLOAD_OFFSET, RECORD_SIZE,
};

/// One asset handed to the builder
#[derive(Debug, Clone)]
pub struct AssetInput {
    pub name: EntryName,
    /// Transcoded raw PCM
    pub payload: Vec<u8>,
    /// Size of the original source file
    pub source_size: u64,
    /// MD5 of the original source file, lowercase hex
    pub source_md5: String,
}

/// Where an asset ended up in the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub name: EntryName,
    pub offset: u32,
    pub size: u32,
    /// Size including the trailing fill up to the next alignment boundary
    pub padded_size: usize,
}

/// A fully assembled image
#[derive(Debug, Clone)]
pub struct BuiltImage {
    pub bytes: Vec<u8>,
    pub entries: Vec<TocEntry>,
    pub toc: DescriptiveToc,
}

/// Collects assets and lays them out into an image
#[derive(Debug)]
pub struct ImageBuilder {
    comment: String,
    assets: Vec<AssetInput>,
    names: HashSet<EntryName>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            comment: DEFAULT_COMMENT.to_string(),
            assets: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Replace the comment stored in the descriptive TOC
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Append one asset
    ///
    /// # Errors
    /// * `DuplicateName` - if an asset with the same name was already added
    /// * `TooManyEntries` - if the image already holds 64 assets
    pub fn add(&mut self, asset: AssetInput) -> Result<&mut Self> {
        if self.names.contains(&asset.name) {
            return Err(AudimageError::DuplicateName {
                name: asset.name.to_string(),
            });
        }
        if self.assets.len() >= MAX_ENTRIES {
            return Err(AudimageError::TooManyEntries {
                count: self.assets.len() + 1,
                max: MAX_ENTRIES,
            });
        }
        self.names.insert(asset.name.clone());
        self.assets.push(asset);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Lay out all assets and serialize the image
    ///
    /// # Errors
    /// * `PayloadTooLarge` - if an offset or size does not fit in 32 bits
    /// * `DescriptiveTocOverflow` - if the JSON TOC exceeds 4096 bytes
    pub fn build(self) -> Result<BuiltImage> {
        let mut toc = DescriptiveToc::new(self.comment);
        toc.entries = self
            .assets
            .iter()
            .map(|asset| TocDocEntry {
                filesize: asset.source_size,
                name: asset.name.to_string(),
                src_md5: asset.source_md5.clone(),
            })
            .collect();
        let toc_region = toc.to_region()?;

        let entries = layout(&self.assets)?;
        let binary_toc = encode_binary_toc(&entries);

        let payload_len: usize = entries.iter().map(|e| e.padded_size).sum();
        let mut bytes = Vec::with_capacity(PAYLOAD_OFFSET + payload_len);
        bytes.extend_from_slice(&binary_toc);
        bytes.extend_from_slice(&toc_region);
        debug_assert_eq!(bytes.len(), PAYLOAD_OFFSET);

        for (asset, entry) in self.assets.iter().zip(&entries) {
            debug_assert_eq!(bytes.len(), entry.offset as usize);
            bytes.extend_from_slice(&asset.payload);
            pad_to(&mut bytes, entry.offset as usize + entry.padded_size);
        }

        debug!(
            "Built image: {} entries, {} bytes",
            entries.len(),
            bytes.len()
        );

        Ok(BuiltImage {
            bytes,
            entries,
            toc,
        })
    }
}

/// Build an image from assets in the given order
pub fn build_image(
    assets: impl IntoIterator<Item = AssetInput>,
    comment: Option<&str>,
) -> Result<BuiltImage> {
    let mut builder = ImageBuilder::new();
    if let Some(comment) = comment {
        builder = builder.with_comment(comment);
    }
    for asset in assets {
        builder.add(asset)?;
    }
    builder.build()
}

/// Assign aligned offsets starting at the payload region
fn layout(assets: &[AssetInput]) -> Result<Vec<TocEntry>> {
    let mut offset = PAYLOAD_OFFSET;
    let mut entries = Vec::with_capacity(assets.len());

    for asset in assets {
        let too_large = || AudimageError::PayloadTooLarge {
            name: asset.name.to_string(),
        };
        let padded_size = padded_len(asset.payload.len()).ok_or_else(too_large)?;
        let start = u32::try_from(offset).map_err(|_| too_large())?;
        let size = u32::try_from(asset.payload.len()).map_err(|_| too_large())?;

        debug!(
            "{}: offset 0x{:x} size {} padded {}",
            asset.name, start, size, padded_size
        );
        entries.push(TocEntry {
            name: asset.name.clone(),
            offset: start,
            size,
            padded_size,
        });
        offset = offset.checked_add(padded_size).ok_or_else(too_large)?;
    }

    Ok(entries)
}

/// Concatenate one record per entry and fill the rest of the region
fn encode_binary_toc(entries: &[TocEntry]) -> Vec<u8> {
    let mut toc = Vec::with_capacity(BINARY_TOC_SIZE);
    for entry in entries {
        let record = TocRecord {
            offset: entry.offset,
            size: entry.size,
            name: entry.name.clone(),
        };
        toc.extend_from_slice(&record.encode());
    }
    debug_assert!(toc.len() <= MAX_ENTRIES * RECORD_SIZE);
    pad_to(&mut toc, BINARY_TOC_SIZE);
    toc
}
