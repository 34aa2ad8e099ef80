//! Source sniffing: decide which decoder handles an upload.

use serde::{Deserialize, Serialize};

// TIFF constants
const TIFF_MAGIC_LE: [u8; 4] = [0x49, 0x49, 0x2A, 0x00]; // II + 42
const TIFF_MAGIC_BE: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A]; // MM + 42

/// Camera RAW extensions (lowercase, without the dot).
pub const RAW_EXTENSIONS: &[&str] = &[
    "nef", "nrw", // Nikon
    "cr2", "cr3", "crw", // Canon
    "arw", "srf", "sr2", // Sony
    "raf", // Fujifilm
    "orf", // Olympus / OM System
    "rw2", "raw", // Panasonic
    "pef", "ptx", // Pentax
    "x3f", // Sigma
    "rwl", "dng", // Leica / Adobe
    "mrw", // Minolta
    "srw", // Samsung
    "3fr", // Hasselblad
    "dcr", "kdc", // Kodak
    "mef", // Mamiya
    "iiq", // Phase One
];

/// Which decoder family an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Formats decoded directly by the `image` crate.
    Standard,
    /// Camera RAW sensor data.
    Raw,
}

/// Check whether a filename carries a camera RAW extension.
pub fn has_raw_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            RAW_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Check whether the bytes start with the TIFF magic number.
///
/// Most RAW formats (ARW, CR2, NEF, DNG) are TIFF containers, but so are
/// plain TIFF files, so this alone does not identify a RAW file.
#[inline]
pub fn is_tiff(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && (bytes[..4] == TIFF_MAGIC_LE || bytes[..4] == TIFF_MAGIC_BE)
}

/// Check for RAW containers whose magic bytes are unambiguous.
pub fn has_raw_magic(bytes: &[u8]) -> bool {
    // Canon CR3: ISO base media with a "crx " brand
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && &bytes[8..12] == b"crx " {
        return true;
    }
    // Fujifilm RAF
    if bytes.starts_with(b"FUJIFILMCCD-RAW") {
        return true;
    }
    // Olympus ORF
    if bytes.starts_with(b"IIRO") || bytes.starts_with(b"IIRS") || bytes.starts_with(b"MMOR") {
        return true;
    }
    // Panasonic RW2
    bytes.starts_with(&[0x49, 0x49, 0x55, 0x00])
}

/// Classify an upload from its bytes and optional filename.
pub fn sniff(bytes: &[u8], filename: Option<&str>) -> SourceKind {
    if filename.is_some_and(has_raw_extension) || has_raw_magic(bytes) {
        SourceKind::Raw
    } else {
        SourceKind::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_extensions() {
        assert!(has_raw_extension("IMG_0001.CR2"));
        assert!(has_raw_extension("photo.nef"));
        assert!(has_raw_extension("DSC01234.ARW"));
        assert!(has_raw_extension("scan.dng"));
        assert!(!has_raw_extension("photo.jpg"));
        assert!(!has_raw_extension("scan.tif"));
        assert!(!has_raw_extension("no_extension"));
    }

    #[test]
    fn test_is_tiff() {
        assert!(is_tiff(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]));
        assert!(is_tiff(&[0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]));
        assert!(!is_tiff(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_tiff(&[0x49, 0x49]));
    }

    #[test]
    fn test_raw_magic() {
        let mut cr3 = vec![0x00, 0x00, 0x00, 0x18];
        cr3.extend_from_slice(b"ftypcrx ");
        assert!(has_raw_magic(&cr3));
        assert!(has_raw_magic(b"FUJIFILMCCD-RAW 0201"));
        assert!(has_raw_magic(b"IIRO\x08\x00\x00\x00"));
        assert!(has_raw_magic(&[0x49, 0x49, 0x55, 0x00, 0x18, 0x00]));
        assert!(!has_raw_magic(&[0x49, 0x49, 0x2A, 0x00]));
        assert!(!has_raw_magic(&[]));
    }

    #[test]
    fn test_sniff() {
        let tiff = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        assert_eq!(sniff(&tiff, Some("scan.tiff")), SourceKind::Standard);
        assert_eq!(sniff(&tiff, Some("DSC0001.ARW")), SourceKind::Raw);
        assert_eq!(sniff(&tiff, None), SourceKind::Standard);
        assert_eq!(sniff(b"FUJIFILMCCD-RAW", None), SourceKind::Raw);
        assert_eq!(sniff(&[0xFF, 0xD8], Some("a.jpg")), SourceKind::Standard);
    }
}
