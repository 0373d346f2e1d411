//
// overlay.rs
// Dicom-Study-rs
//
// Locates the sixteen overlay plane groups of an image and unpacks their bit-packed data.
//
// Thales Matheus Mendonça Santos - November 2025

use dicom::core::Tag;
use tracing::debug;

use crate::dicom_access::{Dataset, ElementAccess};
use crate::error::FileError;
use crate::models::{Overlay, OverlayKind};
use crate::tags::{
    OVERLAY_COLUMNS, OVERLAY_DATA, OVERLAY_DESCRIPTION, OVERLAY_FIRST_GROUP, OVERLAY_LABEL,
    OVERLAY_ORIGIN, OVERLAY_ROWS, OVERLAY_SLOTS, OVERLAY_TYPE,
};

/// Unpacked bytes allowed across all planes of one image, one byte per pixel.
pub const DEFAULT_MAX_OVERLAY_BYTES: u64 = 128 * 1024 * 1024;

/// Group numbers of every legal overlay slot: 0x6000, 0x6002, ..., 0x601E.
pub fn overlay_groups() -> impl Iterator<Item = u16> {
    (0..OVERLAY_SLOTS).map(|slot| OVERLAY_FIRST_GROUP + slot * 2)
}

/// Decode every overlay plane present in `obj`, in group order.
///
/// Fails when the planes together would unpack to more than `max_bytes`; the check runs
/// before anything is allocated.
pub fn decode_overlays(obj: &Dataset, max_bytes: u64) -> Result<Vec<Overlay>, FileError> {
    let mut unpacked = 0_u64;
    let mut overlays = Vec::new();
    for group in overlay_groups() {
        if let Some(overlay) = decode_plane(obj, group, &mut unpacked, max_bytes)? {
            overlays.push(overlay);
        }
    }
    Ok(overlays)
}

fn decode_plane(
    obj: &Dataset,
    group: u16,
    unpacked: &mut u64,
    max_bytes: u64,
) -> Result<Option<Overlay>, FileError> {
    let Some(rows) = obj.element_u16(Tag(group, OVERLAY_ROWS)).filter(|r| *r > 0) else {
        return Ok(None);
    };
    let columns = obj.element_u16(Tag(group, OVERLAY_COLUMNS)).unwrap_or(0);

    let Some(packed) = obj.element_bytes(Tag(group, OVERLAY_DATA)) else {
        debug!(group = %format!("{group:04X}"), "overlay plane without data, skipped");
        return Ok(None);
    };

    *unpacked += u64::from(rows) * u64::from(columns);
    if *unpacked > max_bytes {
        return Err(FileError::OverlayTooLarge {
            size: *unpacked,
            limit: max_bytes,
        });
    }

    let kind = match obj.element_str(Tag(group, OVERLAY_TYPE)).as_deref() {
        Some("R") => OverlayKind::RegionOfInterest,
        _ => OverlayKind::Graphic,
    };

    let pixels = usize::from(rows) * usize::from(columns);
    Ok(Some(Overlay {
        group,
        rows,
        columns,
        kind,
        origin: read_origin(obj, group),
        label: obj.element_str(Tag(group, OVERLAY_LABEL)),
        description: obj.element_str(Tag(group, OVERLAY_DESCRIPTION)),
        data: unpack_bits(&packed, pixels),
    }))
}

fn read_origin(obj: &Dataset, group: u16) -> [i32; 2] {
    // Malformed or short origins fall back to the top-left pixel.
    obj.element_opt(Tag(group, OVERLAY_ORIGIN))
        .ok()
        .flatten()
        .and_then(|e| e.to_multi_int::<i32>().ok())
        .filter(|values| values.len() >= 2)
        .map(|values| [values[0], values[1]])
        .unwrap_or([1, 1])
}

/// Expand LSB-first packed bits into one 0/1 byte per pixel.
///
/// Always returns exactly `pixels` bytes; pixels past the end of `packed` are 0.
pub fn unpack_bits(packed: &[u8], pixels: usize) -> Vec<u8> {
    (0..pixels)
        .map(|i| match packed.get(i / 8) {
            Some(byte) => (byte >> (i % 8)) & 1,
            None => 0,
        })
        .collect()
}
