//! GPS fields from the EXIF GPS IFD.

use exif::{Exif, Field, In, Tag, Value};

use super::{ascii, floats};

/// Decoded GPS position and fix details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsInfo {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    /// `HH:MM:SS`, UTC.
    pub timestamp: Option<String>,
    /// `YYYY:MM:DD` as stored.
    pub datestamp: Option<String>,
    pub map_datum: Option<String>,
}

/// Read GPS fields. Missing or malformed values come back as `None`.
pub fn extract_gps(exif: &Exif) -> GpsInfo {
    let field = |tag: Tag| exif.get_field(tag, In::PRIMARY);

    let (latitude, longitude) = coordinates(
        field(Tag::GPSLatitude).and_then(|f| to_decimal(f, field(Tag::GPSLatitudeRef))),
        field(Tag::GPSLongitude).and_then(|f| to_decimal(f, field(Tag::GPSLongitudeRef))),
    );

    let altitude = field(Tag::GPSAltitude)
        .and_then(|f| floats(f).first().copied())
        .map(|alt| {
            // AltitudeRef 1 means below sea level
            let below = field(Tag::GPSAltitudeRef).and_then(|f| f.value.get_uint(0)) == Some(1);
            if below {
                -alt
            } else {
                alt
            }
        });

    let timestamp = field(Tag::GPSTimeStamp).and_then(|f| {
        let parts = floats(f);
        (parts.len() == 3).then(|| {
            format!(
                "{:02}:{:02}:{:02}",
                parts[0] as u32, parts[1] as u32, parts[2] as u32
            )
        })
    });

    GpsInfo {
        latitude,
        longitude,
        altitude,
        timestamp,
        datestamp: field(Tag::GPSDateStamp).and_then(ascii),
        map_datum: field(Tag::GPSMapDatum).and_then(ascii),
    }
}

/// Keep a coordinate pair only if both are present, in range and not (0, 0).
pub fn coordinates(lat: Option<f64>, lon: Option<f64>) -> (Option<f64>, Option<f64>) {
    match (lat, lon) {
        (Some(lat), Some(lon))
            if (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lon)
                && !(lat == 0.0 && lon == 0.0) =>
        {
            (Some(lat), Some(lon))
        }
        _ => (None, None),
    }
}

/// Degrees, degrees+minutes or degrees+minutes+seconds to decimal degrees.
pub fn dms_to_decimal(parts: &[f64], negative: bool) -> Option<f64> {
    let decimal = match parts {
        [] => return None,
        [degrees] => *degrees,
        [degrees, minutes] => degrees + minutes / 60.0,
        [degrees, minutes, seconds, ..] => degrees + minutes / 60.0 + seconds / 3600.0,
    };
    if !decimal.is_finite() {
        return None;
    }
    Some(if negative { -decimal } else { decimal })
}

fn to_decimal(coord: &Field, reference: Option<&Field>) -> Option<f64> {
    let negative = reference
        .and_then(|f| match &f.value {
            Value::Ascii(values) => values.first().and_then(|v| v.first().copied()),
            _ => None,
        })
        .is_some_and(|c| c == b'S' || c == b'W');
    dms_to_decimal(&floats(coord), negative)
}
