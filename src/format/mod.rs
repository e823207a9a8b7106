//! Audio image format model
//!
//! On-disk layout (all offsets absolute, integers little-endian):
//!
//! ```text
//! [0     .. 4096]  binary TOC      64 x 64-byte records, fill 0xFF
//! [4096  .. 8192]  descriptive TOC canonical JSON, fill 0xFF
//! [8192  .. ]      payloads        each padded to a multiple of 4096 with 0xFF
//! ```
//!
//! A record slot is empty when its offset field is `0xFFFF_FFFF`. There is no
//! entry count anywhere in the file.

pub mod name;
pub mod record;
pub mod toc;

pub use name::EntryName;
pub use record::{RecordSlot, TocRecord};
pub use toc::{DescriptiveToc, TocDocEntry, DEFAULT_COMMENT};

/// Size of the binary TOC region at the start of the image
pub const BINARY_TOC_SIZE: usize = 4096;

/// Start of the descriptive (JSON) TOC region
pub const DESCRIPTIVE_TOC_OFFSET: usize = BINARY_TOC_SIZE;

/// Size of the descriptive TOC region
pub const DESCRIPTIVE_TOC_SIZE: usize = 4096;

/// Start of the payload region
pub const PAYLOAD_OFFSET: usize = DESCRIPTIVE_TOC_OFFSET + DESCRIPTIVE_TOC_SIZE;

/// Every payload starts on a multiple of this
pub const ALIGNMENT: usize = 4096;

/// Size of one binary TOC record
pub const RECORD_SIZE: usize = 64;

/// Number of record slots in the binary TOC
pub const MAX_ENTRIES: usize = BINARY_TOC_SIZE / RECORD_SIZE;

/// Width of the zero-padded name field in a record
pub const NAME_WIDTH: usize = 56;

/// Offset value marking an empty record slot
pub const SENTINEL_OFFSET: u32 = u32::MAX;

/// Fill byte for unused TOC space and payload padding
pub const FILL_BYTE: u8 = 0xFF;

/// Round `len` up to the next multiple of [`ALIGNMENT`]
///
/// Returns `None` if the padded length overflows `usize`.
pub fn padded_len(len: usize) -> Option<usize> {
    len.checked_add(ALIGNMENT - 1)
        .map(|n| n / ALIGNMENT * ALIGNMENT)
}

/// Extend `data` with [`FILL_BYTE`] up to `len` bytes
pub(crate) fn pad_to(data: &mut Vec<u8>, len: usize) {
    if data.len() < len {
        data.resize(len, FILL_BYTE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_layout_constants() {
        assert_eq!(MAX_ENTRIES, 64);
        assert_eq!(PAYLOAD_OFFSET, 8192);
        assert_eq!(NAME_WIDTH + 8, RECORD_SIZE);
        assert_eq!(PAYLOAD_OFFSET % ALIGNMENT, 0);
    }

    #[test_case(0, Some(0); "empty")]
    #[test_case(1, Some(4096); "one byte")]
    #[test_case(4096, Some(4096); "exact block")]
    #[test_case(5000, Some(8192); "spills into second block")]
    #[test_case(usize::MAX, None; "overflow")]
    fn test_padded_len(len: usize, expected: Option<usize>) {
        assert_eq!(padded_len(len), expected);
    }

    #[test]
    fn test_pad_to_fills_with_ff() {
        let mut data = vec![1, 2, 3];
        pad_to(&mut data, 6);
        assert_eq!(data, vec![1, 2, 3, 0xFF, 0xFF, 0xFF]);

        // Never truncates
        pad_to(&mut data, 2);
        assert_eq!(data.len(), 6);
    }
}
