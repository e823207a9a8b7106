//! Image reader
//!
//! Parses an image held in memory. All 64 record slots are scanned front to
//! back; a slot is skipped when its offset is the sentinel, wherever it
//! sits. Payload slices borrow from the image and never include padding.
//!
//! # Access patterns
//!
//! | Method | Behaviour on a bad entry |
//! |--------|--------------------------|
//! | [`read_image`] | aborts with the first error |
//! | [`ImageReader::entries`] | yields the error, continues with the next slot |

use log::warn;

use crate::error::{AudimageError, Result};
use crate::format::{
    DescriptiveToc, EntryName, RecordSlot, TocRecord, ALIGNMENT, DESCRIPTIVE_TOC_OFFSET,
    MAX_ENTRIES, PAYLOAD_OFFSET, RECORD_SIZE,
};

/// One recovered asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry<'a> {
    /// Record slot the entry was found in (0..64)
    pub slot: usize,
    pub name: EntryName,
    pub offset: u32,
    pub size: u32,
    /// Exactly `size` bytes starting at `offset`
    pub payload: &'a [u8],
}

/// Everything recovered from an image
#[derive(Debug, Clone)]
pub struct DecodedImage<'a> {
    pub entries: Vec<ImageEntry<'a>>,
    pub toc: DescriptiveToc,
}

/// A disagreement between the binary and the descriptive TOC
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocMismatch {
    /// The two TOCs list a different number of entries
    Count { binary: usize, descriptive: usize },
    /// Entry `index` has different names in the two TOCs
    Name {
        index: usize,
        binary: String,
        descriptive: String,
    },
}

impl std::fmt::Display for TocMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TocMismatch::Count {
                binary,
                descriptive,
            } => write!(
                f,
                "binary TOC has {} entries, descriptive TOC has {}",
                binary, descriptive
            ),
            TocMismatch::Name {
                index,
                binary,
                descriptive,
            } => write!(
                f,
                "entry {} is '{}' in the binary TOC but '{}' in the descriptive TOC",
                index, binary, descriptive
            ),
        }
    }
}

/// Borrowing reader over a complete image
#[derive(Debug, Clone, Copy)]
pub struct ImageReader<'a> {
    image: &'a [u8],
}

impl<'a> ImageReader<'a> {
    /// Wrap an image buffer
    ///
    /// # Errors
    /// Returns `ImageTooShort` if the buffer cannot hold both TOC regions.
    pub fn new(image: &'a [u8]) -> Result<Self> {
        if image.len() < PAYLOAD_OFFSET {
            return Err(AudimageError::ImageTooShort {
                len: image.len(),
                min: PAYLOAD_OFFSET,
            });
        }
        Ok(Self { image })
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Decode the record in `slot` without touching its payload
    ///
    /// Slots past the end of the table read as empty.
    pub fn record(&self, slot: usize) -> Result<RecordSlot> {
        if slot >= MAX_ENTRIES {
            return Ok(RecordSlot::Empty);
        }
        let start = slot * RECORD_SIZE;
        let mut buf = [0u8; RECORD_SIZE];
        buf.copy_from_slice(&self.image[start..start + RECORD_SIZE]);
        TocRecord::decode(&buf, slot)
    }

    /// Decode the entry in `slot`, `None` for an empty slot
    ///
    /// # Errors
    /// * `UndecodableName` - if the name is not valid UTF-8
    /// * `EntryOutOfBounds` - if `offset + size` lies beyond the image
    pub fn entry(&self, slot: usize) -> Result<Option<ImageEntry<'a>>> {
        let record = match self.record(slot)? {
            RecordSlot::Empty => return Ok(None),
            RecordSlot::Present(record) => record,
        };

        let offset = u64::from(record.offset);
        let end = offset + u64::from(record.size);
        if end > self.image.len() as u64 {
            return Err(AudimageError::EntryOutOfBounds {
                slot,
                name: record.name.to_string(),
                offset,
                end,
                len: self.image.len(),
            });
        }

        if (record.offset as usize) < PAYLOAD_OFFSET || record.offset as usize % ALIGNMENT != 0 {
            warn!(
                "{}: offset 0x{:x} is not an aligned payload-region offset",
                record.name, record.offset
            );
        }

        Ok(Some(ImageEntry {
            slot,
            name: record.name,
            offset: record.offset,
            size: record.size,
            payload: &self.image[offset as usize..end as usize],
        }))
    }

    /// Every present entry in slot order, one result per entry
    pub fn entries(&self) -> impl Iterator<Item = Result<ImageEntry<'a>>> + 'a {
        let reader = *self;
        (0..MAX_ENTRIES).filter_map(move |slot| reader.entry(slot).transpose())
    }

    /// Parse the descriptive TOC region
    ///
    /// # Errors
    /// Returns `MalformedDescriptiveToc` if the region is not a TOC document.
    pub fn descriptive_toc(&self) -> Result<DescriptiveToc> {
        DescriptiveToc::from_region(&self.image[DESCRIPTIVE_TOC_OFFSET..PAYLOAD_OFFSET])
    }
}

/// Read every entry and the descriptive TOC, failing on the first error
pub fn read_image(image: &[u8]) -> Result<DecodedImage<'_>> {
    let reader = ImageReader::new(image)?;
    let entries = reader.entries().collect::<Result<Vec<_>>>()?;
    let toc = reader.descriptive_toc()?;

    for mismatch in cross_check(&entries, &toc) {
        warn!("TOC mismatch: {}", mismatch);
    }

    Ok(DecodedImage { entries, toc })
}

/// Compare the binary TOC entries with the descriptive TOC
///
/// The binary TOC stays authoritative for offsets and sizes; callers decide
/// whether a mismatch matters.
pub fn cross_check(entries: &[ImageEntry<'_>], toc: &DescriptiveToc) -> Vec<TocMismatch> {
    let mut mismatches = Vec::new();
    if entries.len() != toc.entries.len() {
        mismatches.push(TocMismatch::Count {
            binary: entries.len(),
            descriptive: toc.entries.len(),
        });
    }
    for (index, (entry, described)) in entries.iter().zip(&toc.entries).enumerate() {
        if entry.name.as_str() != described.name {
            mismatches.push(TocMismatch::Name {
                index,
                binary: entry.name.to_string(),
                descriptive: described.name.clone(),
            });
        }
    }
    mismatches
}
