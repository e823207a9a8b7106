//! Binary TOC records
//!
//! Layout (64 bytes, little-endian):
//! ```text
//! [0..4]   offset  u32 le  (0xFFFF_FFFF = empty slot)
//! [4..8]   size    u32 le  (unpadded payload length)
//! [8..64]  name    [u8; 56] zero-padded UTF-8
//! ```

use crate::error::Result;
use crate::format::{EntryName, NAME_WIDTH, RECORD_SIZE, SENTINEL_OFFSET};

/// One present entry of the binary TOC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocRecord {
    pub offset: u32,
    pub size: u32,
    pub name: EntryName,
}

/// A decoded record slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSlot {
    Empty,
    Present(TocRecord),
}

impl TocRecord {
    /// Encode the record into a 64-byte buffer
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.offset.to_le_bytes());
        buf[4..8].copy_from_slice(&self.size.to_le_bytes());
        buf[8..RECORD_SIZE].copy_from_slice(&self.name.encode());
        buf
    }

    /// Decode one record slot
    ///
    /// Only the offset field decides emptiness; size and name of an empty
    /// slot are ignored.
    ///
    /// # Errors
    /// Returns `UndecodableName` if a present record's name is not UTF-8.
    pub fn decode(buf: &[u8; RECORD_SIZE], slot: usize) -> Result<RecordSlot> {
        let offset = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if offset == SENTINEL_OFFSET {
            return Ok(RecordSlot::Empty);
        }
        let size = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

        let mut field = [0u8; NAME_WIDTH];
        field.copy_from_slice(&buf[8..RECORD_SIZE]);
        let name = EntryName::decode(&field, slot)?;

        Ok(RecordSlot::Present(TocRecord { offset, size, name }))
    }
}
