//! Descriptive (JSON) table of contents
//!
//! The document is stored in its canonical form: keys sorted, `", "` and
//! `": "` separators, non-ASCII escaped as `\uXXXX`. The same inputs always
//! produce the same bytes, which keeps whole images byte-reproducible.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};

use crate::error::{AudimageError, Result};
use crate::format::{pad_to, DESCRIPTIVE_TOC_SIZE, FILL_BYTE};

/// Comment stored in every image unless the caller supplies another one
pub const DEFAULT_COMMENT: &str =
    "Audio image, see the binary TOC at offset 0 for payload locations.";

/// One asset as described in the JSON TOC
///
/// Field order is the sorted key order; serialization relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocDocEntry {
    /// Size of the original source file in bytes (before transcoding)
    pub filesize: u64,
    pub name: String,
    /// MD5 of the original source file, lowercase hex
    pub src_md5: String,
}

/// The whole JSON TOC document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptiveToc {
    #[serde(rename = "_comment", default)]
    pub comment: String,
    pub entries: Vec<TocDocEntry>,
}

impl DescriptiveToc {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            entries: Vec::new(),
        }
    }

    /// Serialize to canonical JSON bytes (unpadded)
    pub fn to_canonical(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(DESCRIPTIVE_TOC_SIZE);
        let mut ser = Serializer::with_formatter(&mut out, CanonicalFormatter);
        self.serialize(&mut ser)?;
        Ok(out)
    }

    /// Serialize and pad to exactly one descriptive TOC region
    ///
    /// # Errors
    /// Returns `DescriptiveTocOverflow` if the document exceeds the region.
    pub fn to_region(&self) -> Result<Vec<u8>> {
        let mut region = self.to_canonical()?;
        if region.len() > DESCRIPTIVE_TOC_SIZE {
            return Err(AudimageError::DescriptiveTocOverflow {
                len: region.len(),
                max: DESCRIPTIVE_TOC_SIZE,
            });
        }
        pad_to(&mut region, DESCRIPTIVE_TOC_SIZE);
        Ok(region)
    }

    /// Parse a descriptive TOC region, ignoring trailing fill bytes
    ///
    /// # Errors
    /// Returns `MalformedDescriptiveToc` if the remainder is not a TOC document.
    pub fn from_region(region: &[u8]) -> Result<Self> {
        let end = region
            .iter()
            .rposition(|&b| b != FILL_BYTE)
            .map_or(0, |i| i + 1);
        serde_json::from_slice(&region[..end])
            .map_err(|e| AudimageError::MalformedDescriptiveToc { source: e })
    }

    /// Human-friendly form used for the `toc.json` sidecar
    pub fn to_pretty(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        // Only ASCII escapes and UTF-8 from `String` fields end up in `out`
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

/// DEL is ASCII but still written as `\u007f`
const DEL: u8 = 0x7F;

/// Compact JSON with spaced separators and ASCII-only strings
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
    ) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if fragment.bytes().all(|b| b.is_ascii() && b != DEL) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() && c as u8 != DEL {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toc() -> DescriptiveToc {
        let mut toc = DescriptiveToc::new("hello");
        toc.entries.push(TocDocEntry {
            filesize: 1234,
            name: "a".to_string(),
            src_md5: "0123456789abcdef0123456789abcdef".to_string(),
        });
        toc.entries.push(TocDocEntry {
            filesize: 99,
            name: "b".to_string(),
            src_md5: "fedcba9876543210fedcba9876543210".to_string(),
        });
        toc
    }

    #[test]
    fn test_canonical_form() {
        let bytes = sample_toc().to_canonical().unwrap();
        let expected = concat!(
            r#"{"_comment": "hello", "entries": ["#,
            r#"{"filesize": 1234, "name": "a", "src_md5": "0123456789abcdef0123456789abcdef"}, "#,
            r#"{"filesize": 99, "name": "b", "src_md5": "fedcba9876543210fedcba9876543210"}]}"#
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_empty_entries() {
        let bytes = DescriptiveToc::new("c").to_canonical().unwrap();
        assert_eq!(bytes, br#"{"_comment": "c", "entries": []}"#);
    }

    #[test]
    fn test_non_ascii_escaped() {
        let bytes = DescriptiveToc::new("Grüße 🎵").to_canonical().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.is_ascii());
        assert!(text.contains(r"Gr\u00fc\u00dfe \ud83c\udfb5"));

        // serde_json reads the escapes back
        let parsed: DescriptiveToc = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.comment, "Grüße 🎵");
    }

    #[test]
    fn test_del_escaped() {
        let bytes = DescriptiveToc::new("x\x7fy").to_canonical().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"_comment": "x\u007fy", "entries": []}"#);

        let parsed: DescriptiveToc = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.comment, "x\x7fy");
    }

    #[test]
    fn test_region_roundtrip() {
        let toc = sample_toc();
        let region = toc.to_region().unwrap();
        assert_eq!(region.len(), DESCRIPTIVE_TOC_SIZE);
        assert_eq!(*region.last().unwrap(), FILL_BYTE);
        assert_eq!(DescriptiveToc::from_region(&region).unwrap(), toc);
    }

    #[test]
    fn test_region_overflow() {
        let toc = DescriptiveToc::new("x".repeat(DESCRIPTIVE_TOC_SIZE));
        let err = toc.to_region().unwrap_err();
        assert_eq!(err.error_code(), "DESCRIPTIVE_TOC_OVERFLOW");
    }

    #[test]
    fn test_exactly_full_region_fits() {
        let overhead = DescriptiveToc::new("").to_canonical().unwrap().len();
        let toc = DescriptiveToc::new("x".repeat(DESCRIPTIVE_TOC_SIZE - overhead));
        let region = toc.to_region().unwrap();
        assert_eq!(region.len(), DESCRIPTIVE_TOC_SIZE);
        assert_eq!(DescriptiveToc::from_region(&region).unwrap(), toc);
    }

    #[test]
    fn test_malformed_region() {
        let mut region = b"{\"_comment\": ".to_vec();
        pad_to(&mut region, DESCRIPTIVE_TOC_SIZE);
        let err = DescriptiveToc::from_region(&region).unwrap_err();
        assert!(matches!(err, AudimageError::MalformedDescriptiveToc { .. }));

        let blank = vec![FILL_BYTE; DESCRIPTIVE_TOC_SIZE];
        assert!(DescriptiveToc::from_region(&blank).is_err());
    }

    #[test]
    fn test_pretty_output() {
        let pretty = sample_toc().to_pretty().unwrap();
        assert!(pretty.starts_with("{\n    \"_comment\": \"hello\",\n    \"entries\": ["));
        let parsed: DescriptiveToc = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed, sample_toc());
    }
}
