//! Fixtures shared by unit tests: synthetic rasters and hand-built EXIF.

use crate::decode::Raster;
use crate::encode::encode_raster;

/// A raster with a horizontal red ramp, a vertical green ramp and a
/// constant blue channel.
pub fn gradient_raster(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push(((x * 255) / width.max(1)) as u8);
            pixels.push(((y * 255) / height.max(1)) as u8);
            pixels.push(128);
        }
    }
    Raster::new(width, height, pixels)
}

/// High-quality JPEG of a raster, with no EXIF.
pub fn encode_test_jpeg(raster: &Raster) -> Vec<u8> {
    encode_raster(raster, 95).unwrap()
}

/// Insert an EXIF block carrying only an orientation tag.
pub fn with_exif_orientation(jpeg: &[u8], code: u16) -> Vec<u8> {
    ExifBuilder::new()
        .ifd0(0x0112, ExifValue::Short(code))
        .insert_into(jpeg)
}

/// A single EXIF value.
#[derive(Debug, Clone)]
pub enum ExifValue {
    Byte(u8),
    Ascii(&'static str),
    Short(u16),
    Long(u32),
    Rational(Vec<(u32, u32)>),
}

impl ExifValue {
    fn type_code(&self) -> u16 {
        match self {
            ExifValue::Byte(_) => 1,
            ExifValue::Ascii(_) => 2,
            ExifValue::Short(_) => 3,
            ExifValue::Long(_) => 4,
            ExifValue::Rational(_) => 5,
        }
    }

    fn count(&self) -> u32 {
        match self {
            ExifValue::Ascii(s) => s.len() as u32 + 1,
            ExifValue::Rational(values) => values.len() as u32,
            _ => 1,
        }
    }

    fn data(&self) -> Vec<u8> {
        match self {
            ExifValue::Byte(v) => vec![*v],
            ExifValue::Ascii(s) => {
                let mut data = s.as_bytes().to_vec();
                data.push(0);
                data
            }
            ExifValue::Short(v) => v.to_le_bytes().to_vec(),
            ExifValue::Long(v) => v.to_le_bytes().to_vec(),
            ExifValue::Rational(values) => values
                .iter()
                .flat_map(|(num, den)| num.to_le_bytes().into_iter().chain(den.to_le_bytes()))
                .collect(),
        }
    }
}

const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_GPS_IFD: u16 = 0x8825;

/// Builds a little-endian TIFF/EXIF block with IFD0, Exif and GPS IFDs.
#[derive(Debug, Default)]
pub struct ExifBuilder {
    ifd0: Vec<(u16, ExifValue)>,
    exif: Vec<(u16, ExifValue)>,
    gps: Vec<(u16, ExifValue)>,
}

impl ExifBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ifd0(mut self, tag: u16, value: ExifValue) -> Self {
        self.ifd0.push((tag, value));
        self
    }

    pub fn exif(mut self, tag: u16, value: ExifValue) -> Self {
        self.exif.push((tag, value));
        self
    }

    pub fn gps(mut self, tag: u16, value: ExifValue) -> Self {
        self.gps.push((tag, value));
        self
    }

    /// Serialize to a TIFF byte stream.
    pub fn tiff(&self) -> Vec<u8> {
        let ifd_size = |n: usize| 2 + 12 * n + 4;

        let ifd0_count = self.ifd0.len()
            + usize::from(!self.exif.is_empty())
            + usize::from(!self.gps.is_empty());
        let ifd0_offset = 8;
        let exif_offset = ifd0_offset + ifd_size(ifd0_count);
        let exif_size = if self.exif.is_empty() {
            0
        } else {
            ifd_size(self.exif.len())
        };
        let gps_offset = exif_offset + exif_size;
        let gps_size = if self.gps.is_empty() {
            0
        } else {
            ifd_size(self.gps.len())
        };

        let mut data_area = Vec::new();
        let data_start = gps_offset + gps_size;

        let mut ifd0 = self.ifd0.clone();
        if !self.exif.is_empty() {
            ifd0.push((TAG_EXIF_IFD, ExifValue::Long(exif_offset as u32)));
        }
        if !self.gps.is_empty() {
            ifd0.push((TAG_GPS_IFD, ExifValue::Long(gps_offset as u32)));
        }

        let mut out = vec![0x49, 0x49, 0x2A, 0x00];
        out.extend_from_slice(&(ifd0_offset as u32).to_le_bytes());
        write_ifd(&mut out, &ifd0, &mut data_area, data_start);
        for entries in [&self.exif, &self.gps] {
            if !entries.is_empty() {
                write_ifd(&mut out, entries, &mut data_area, data_start);
            }
        }
        out.extend_from_slice(&data_area);
        out
    }

    /// Insert the block as an APP1 segment right after the JPEG SOI marker.
    pub fn insert_into(&self, jpeg: &[u8]) -> Vec<u8> {
        let tiff = self.tiff();
        let segment_len = (2 + 6 + tiff.len()) as u16;

        let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&segment_len.to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(&tiff);
        out.extend_from_slice(&jpeg[2..]);
        out
    }
}

fn write_ifd(
    out: &mut Vec<u8>,
    entries: &[(u16, ExifValue)],
    data_area: &mut Vec<u8>,
    data_start: usize,
) {
    let mut sorted: Vec<&(u16, ExifValue)> = entries.iter().collect();
    sorted.sort_by_key(|(tag, _)| *tag);

    out.extend_from_slice(&(sorted.len() as u16).to_le_bytes());
    for (tag, value) in sorted {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&value.type_code().to_le_bytes());
        out.extend_from_slice(&value.count().to_le_bytes());

        let data = value.data();
        if data.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..data.len()].copy_from_slice(&data);
            out.extend_from_slice(&inline);
        } else {
            let offset = (data_start + data_area.len()) as u32;
            out.extend_from_slice(&offset.to_le_bytes());
            data_area.extend_from_slice(&data);
            if data_area.len() % 2 == 1 {
                data_area.push(0);
            }
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_block_layout() {
        let tiff = ExifBuilder::new()
            .ifd0(0x0112, ExifValue::Short(6))
            .tiff();
        // header + one-entry IFD
        assert_eq!(tiff.len(), 8 + 2 + 12 + 4);
        assert_eq!(&tiff[10..12], &0x0112u16.to_le_bytes());
        assert_eq!(&tiff[18..20], &6u16.to_le_bytes());
    }

    #[test]
    fn test_insert_keeps_jpeg_decodable() {
        let jpeg = encode_test_jpeg(&gradient_raster(16, 8));
        let tagged = with_exif_orientation(&jpeg, 3);
        assert_eq!(&tagged[..4], &[0xFF, 0xD8, 0xFF, 0xE1]);
        let img = image::load_from_memory(&tagged).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
    }
}
