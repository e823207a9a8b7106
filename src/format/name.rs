//! Bounded asset names
//!
//! A name lives in a fixed 56-byte field: UTF-8, zero-padded on write,
//! trailing zeros stripped on read. All width checks happen here.

use std::fmt;
use std::path::{Component, Path};

use crate::error::{AudimageError, Result};
use crate::format::NAME_WIDTH;

/// An asset name that is guaranteed to fit the record name field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryName(String);

impl EntryName {
    /// Validate and wrap a name
    ///
    /// # Errors
    /// * `NameTooLong` - if the UTF-8 encoding exceeds 56 bytes
    /// * `InvalidName` - if the name contains a NUL byte, which the
    ///   zero-padding could not preserve
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.len() > NAME_WIDTH {
            return Err(AudimageError::NameTooLong {
                len: name.len(),
                name,
                max: NAME_WIDTH,
            });
        }
        if name.contains('\0') {
            return Err(AudimageError::InvalidName {
                name,
                reason: "contains a NUL byte".to_string(),
            });
        }
        Ok(Self(name))
    }

    /// Encode into the zero-padded record field
    pub fn encode(&self) -> [u8; NAME_WIDTH] {
        let mut field = [0u8; NAME_WIDTH];
        field[..self.0.len()].copy_from_slice(self.0.as_bytes());
        field
    }

    /// Decode a record field, stripping trailing zero padding
    ///
    /// `slot` is only used for error context.
    pub fn decode(field: &[u8; NAME_WIDTH], slot: usize) -> Result<Self> {
        let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let name = std::str::from_utf8(&field[..end])
            .map_err(|e| AudimageError::UndecodableName { slot, source: e })?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a single file-name component
    ///
    /// Names read from an image are untrusted; this is the only form that may
    /// be joined onto an output directory.
    ///
    /// # Errors
    /// Returns `InvalidName` for names with a path separator, `.`, `..`, or
    /// anything else that is not one plain path component.
    pub fn as_file_stem(&self) -> Result<&str> {
        let name = self.0.as_str();
        let reason = if name.contains('/') || name.contains('\\') {
            Some("contains a path separator")
        } else if name == "." || name == ".." {
            Some("refers to a directory")
        } else if !name.is_empty() && !is_plain_component(name) {
            Some("is not a plain file name")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(AudimageError::InvalidName {
                name: self.0.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(name),
        }
    }
}

fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EntryName {
    type Error = AudimageError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_with_zeros() {
        let name = EntryName::new("beep").unwrap();
        let field = name.encode();
        assert_eq!(&field[..4], b"beep");
        assert!(field[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_strips_padding() {
        let name = EntryName::new("horn_short").unwrap();
        let decoded = EntryName::decode(&name.encode(), 0).unwrap();
        assert_eq!(decoded, name);
    }

    #[test]
    fn test_full_width_name_accepted() {
        let exact = "n".repeat(NAME_WIDTH);
        let name = EntryName::new(exact.clone()).unwrap();
        assert_eq!(&name.encode()[..], exact.as_bytes());
    }

    #[test]
    fn test_name_too_long_rejected() {
        let err = EntryName::new("n".repeat(NAME_WIDTH + 1)).unwrap_err();
        assert!(matches!(err, AudimageError::NameTooLong { len: 57, .. }));
    }

    #[test]
    fn test_multibyte_width_counts_bytes() {
        // 19 x 3-byte characters = 57 bytes
        let err = EntryName::new("€".repeat(19)).unwrap_err();
        assert!(matches!(err, AudimageError::NameTooLong { .. }));
        assert!(EntryName::new("€".repeat(18)).is_ok());
    }

    #[test]
    fn test_nul_rejected() {
        let err = EntryName::new("a\0b").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_NAME");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut field = [0u8; NAME_WIDTH];
        field[0] = 0xC3;
        field[1] = 0x28;
        let err = EntryName::decode(&field, 7).unwrap_err();
        assert!(matches!(err, AudimageError::UndecodableName { slot: 7, .. }));
    }

    #[test]
    fn test_file_stem_accepts_plain_names() {
        for name in ["beep", "horn_short", "v1.2", "..hidden", ""] {
            let name = EntryName::new(name).unwrap();
            assert_eq!(name.as_file_stem().unwrap(), name.as_str());
        }
    }

    #[test]
    fn test_file_stem_rejects_path_names() {
        for name in ["../escaped", "/tmp/victim", "a/b", "a\\b", "..", "."] {
            let err = EntryName::new(name).unwrap().as_file_stem().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_NAME", "{:?} should be rejected", name);
        }
    }

    #[test]
    fn test_empty_name() {
        let name = EntryName::new("").unwrap();
        assert_eq!(name.encode(), [0u8; NAME_WIDTH]);
        assert_eq!(EntryName::decode(&name.encode(), 0).unwrap().as_str(), "");
    }
}
