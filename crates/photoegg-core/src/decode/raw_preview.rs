//! Embedded JPEG preview extraction for RAW files the developer can't handle.
//!
//! TIFF-based RAW formats (ARW, CR2, NEF, DNG) carry one or more JPEG
//! previews referenced from IFD0, its SubIFDs or IFD1. The largest one wins.
//! When the IFD chain yields nothing, the file is scanned for JPEG markers.

use std::io::{Cursor, Read, Seek, SeekFrom};

use super::sniff::is_tiff;
use super::DecodeError;

// TIFF tag IDs
const TAG_COMPRESSION: u16 = 0x0103;
const TAG_STRIP_OFFSETS: u16 = 0x0111;
const TAG_STRIP_BYTE_COUNTS: u16 = 0x0117;
const TAG_SUBIFD: u16 = 0x014A;
const TAG_JPEG_OFFSET: u16 = 0x0201; // JpegInterchangeFormat
const TAG_JPEG_LENGTH: u16 = 0x0202; // JpegInterchangeFormatLength

// JPEG compression types
const COMPRESSION_JPEG: u32 = 6;
const COMPRESSION_JPEG_OLD: u32 = 7;

const JPEG_START: [u8; 3] = [0xFF, 0xD8, 0xFF];
const JPEG_END: [u8; 2] = [0xFF, 0xD9];

/// Upper bound on IFDs visited, guards against offset cycles.
const MAX_IFDS: usize = 32;
const MAX_IFD_ENTRIES: u16 = 1000;
/// Marker-scan hits smaller than this are thumbnails, not previews.
const MIN_SCANNED_PREVIEW: usize = 16 * 1024;

struct IfdEntry {
    tag: u16,
    count: u32,
    value_offset: u32,
}

/// Extract the largest embedded JPEG preview from a RAW file.
///
/// # Errors
///
/// - `DecodeError::NoThumbnail` - no usable JPEG found
pub fn extract_embedded_preview(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let from_ifds = if is_tiff(bytes) {
        preview_from_ifds(bytes).unwrap_or_default()
    } else {
        Vec::new()
    };

    from_ifds
        .into_iter()
        .max_by_key(|jpeg| jpeg.len())
        .or_else(|| scan_for_jpeg(bytes))
        .ok_or(DecodeError::NoThumbnail)
}

fn preview_from_ifds(bytes: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let little_endian = bytes[0] == b'I';
    let mut cursor = Cursor::new(bytes);
    cursor
        .seek(SeekFrom::Start(4))
        .map_err(|e| DecodeError::CorruptedFile(format!("Failed to seek: {}", e)))?;

    let mut pending = vec![read_u32(&mut cursor, little_endian)?];
    let mut visited = Vec::new();
    let mut candidates = Vec::new();

    while let Some(offset) = pending.pop() {
        if offset == 0 || visited.contains(&offset) || visited.len() >= MAX_IFDS {
            continue;
        }
        visited.push(offset);

        let Ok((entries, next_ifd)) = parse_ifd_at(&mut cursor, offset, little_endian, bytes.len())
        else {
            continue;
        };

        if let Some(jpeg) = jpeg_from_entries(&entries, bytes) {
            candidates.push(jpeg);
        }

        for entry in entries.iter().filter(|e| e.tag == TAG_SUBIFD) {
            pending.extend(subifd_offsets(&mut cursor, entry, little_endian));
        }
        pending.push(next_ifd);
    }

    Ok(candidates)
}

fn subifd_offsets<R: Read + Seek>(reader: &mut R, entry: &IfdEntry, little_endian: bool) -> Vec<u32> {
    if entry.count <= 1 {
        return vec![entry.value_offset];
    }
    if reader
        .seek(SeekFrom::Start(entry.value_offset as u64))
        .is_err()
    {
        return Vec::new();
    }
    (0..entry.count.min(MAX_IFDS as u32))
        .map_while(|_| read_u32(reader, little_endian).ok())
        .collect()
}

fn read_u16<R: Read>(reader: &mut R, little_endian: bool) -> Result<u16, DecodeError> {
    let mut buf = [0u8; 2];
    reader
        .read_exact(&mut buf)
        .map_err(|e| DecodeError::CorruptedFile(format!("Failed to read u16: {}", e)))?;
    Ok(if little_endian {
        u16::from_le_bytes(buf)
    } else {
        u16::from_be_bytes(buf)
    })
}

fn read_u32<R: Read>(reader: &mut R, little_endian: bool) -> Result<u32, DecodeError> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| DecodeError::CorruptedFile(format!("Failed to read u32: {}", e)))?;
    Ok(if little_endian {
        u32::from_le_bytes(buf)
    } else {
        u32::from_be_bytes(buf)
    })
}

fn parse_ifd_at<R: Read + Seek>(
    reader: &mut R,
    offset: u32,
    little_endian: bool,
    file_size: usize,
) -> Result<(Vec<IfdEntry>, u32), DecodeError> {
    reader
        .seek(SeekFrom::Start(offset as u64))
        .map_err(|e| DecodeError::CorruptedFile(format!("Failed to seek to IFD: {}", e)))?;

    let entry_count = read_u16(reader, little_endian)?;
    if entry_count > MAX_IFD_ENTRIES {
        return Err(DecodeError::CorruptedFile(
            "Too many IFD entries".to_string(),
        ));
    }

    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        let tag = read_u16(reader, little_endian)?;
        let typ = read_u16(reader, little_endian)?;
        let count = read_u32(reader, little_endian)?;
        let raw_value = read_u32(reader, little_endian)?;

        // SHORT values are left-aligned in the 4-byte value field
        let value_offset = if typ == 3 && count == 1 {
            if little_endian {
                raw_value & 0xFFFF
            } else {
                raw_value >> 16
            }
        } else {
            raw_value
        };

        if tag != TAG_COMPRESSION && value_offset as usize > file_size {
            continue;
        }

        entries.push(IfdEntry {
            tag,
            count,
            value_offset,
        });
    }

    let next_ifd = read_u32(reader, little_endian).unwrap_or(0);
    Ok((entries, next_ifd))
}

fn jpeg_from_entries(entries: &[IfdEntry], file_bytes: &[u8]) -> Option<Vec<u8>> {
    let value = |tag: u16| {
        entries
            .iter()
            .find(|e| e.tag == tag)
            .map(|e| e.value_offset)
    };

    if let (Some(offset), Some(length)) = (value(TAG_JPEG_OFFSET), value(TAG_JPEG_LENGTH)) {
        if let Some(data) = jpeg_slice(file_bytes, offset, length) {
            return Some(data);
        }
    }

    let is_jpeg = value(TAG_COMPRESSION)
        .is_some_and(|c| c == COMPRESSION_JPEG || c == COMPRESSION_JPEG_OLD);
    match (value(TAG_STRIP_OFFSETS), value(TAG_STRIP_BYTE_COUNTS)) {
        (Some(offset), Some(length)) if is_jpeg => jpeg_slice(file_bytes, offset, length),
        _ => None,
    }
}

/// Bounds-checked slice that must start with a JPEG SOI marker.
fn jpeg_slice(file_bytes: &[u8], offset: u32, length: u32) -> Option<Vec<u8>> {
    let start = offset as usize;
    let end = start.checked_add(length as usize)?;
    let data = file_bytes.get(start..end)?;
    (data.len() >= 2 && data[..2] == JPEG_START[..2]).then(|| data.to_vec())
}

/// Find the largest SOI..EOI run in the file.
///
/// Every run ends at the last EOI, so the largest one starts at the first
/// SOI before it.
fn scan_for_jpeg(bytes: &[u8]) -> Option<Vec<u8>> {
    let end = rfind_end(bytes)?;
    let start = find(&bytes[..end], &JPEG_START)?;
    let candidate = &bytes[start..end];
    (candidate.len() >= MIN_SCANNED_PREVIEW).then(|| candidate.to_vec())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length up to and including the last EOI marker.
fn rfind_end(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(JPEG_END.len())
        .rposition(|w| w == JPEG_END)
        .map(|p| p + JPEG_END.len())
}
