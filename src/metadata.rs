use std::path::Path;

use crate::dicom_access::{Dataset, ElementAccess};
use crate::error::FileError;
use crate::models::{Image, Series, SeriesId, SopId, StudyHeader, StudyId, Window};
use crate::overlay::{decode_overlays, DEFAULT_MAX_OVERLAY_BYTES};
use crate::tags;

pub fn require_sop_id(obj: &Dataset) -> Result<SopId, FileError> {
    obj.element_str(tags::SOP_INSTANCE_UID)
        .map(SopId::new)
        .ok_or(FileError::MissingIdentifier("SOPInstanceUID"))
}

/// Study-level fields, or `None` when the file has no study instance UID.
pub fn extract_study_header(obj: &Dataset) -> Option<StudyHeader> {
    let study_id = obj.element_str(tags::STUDY_INSTANCE_UID)?;

    Some(StudyHeader {
        study_id: StudyId::new(study_id),
        patient_name: obj.element_str(tags::PATIENT_NAME),
        patient_id: obj.element_str(tags::PATIENT_ID),
        study_date: obj.element_str(tags::STUDY_DATE),
        description: obj.element_str(tags::STUDY_DESCRIPTION),
        modality: obj.element_str(tags::MODALITY),
        institution: obj.element_str(tags::INSTITUTION_NAME),
        referring_physician: obj.element_str(tags::REFERRING_PHYSICIAN_NAME),
        accession_number: obj.element_str(tags::ACCESSION_NUMBER),
    })
}

/// Series descriptor read from one of its images, with no images attached yet.
pub fn extract_series(obj: &Dataset, series_id: SeriesId) -> Series {
    Series {
        series_id,
        number: obj.element_int(tags::SERIES_NUMBER),
        description: obj.element_str(tags::SERIES_DESCRIPTION),
        body_part: obj.element_str(tags::BODY_PART_EXAMINED),
        modality: obj.element_str(tags::MODALITY),
        images: Vec::new(),
    }
}

pub fn extract_window(obj: &Dataset) -> Option<Window> {
    Some(Window {
        center: obj.element_f64(tags::WINDOW_CENTER)?,
        width: obj.element_f64(tags::WINDOW_WIDTH)?,
    })
}

/// Image fields; `max_overlay_bytes` bounds the unpacked size of all its overlay planes.
pub fn extract_image(
    obj: &Dataset,
    path: &Path,
    max_overlay_bytes: u64,
) -> Result<Image, FileError> {
    let sop_id = require_sop_id(obj)?;
    let series_id = obj
        .element_str(tags::SERIES_INSTANCE_UID)
        .map(SeriesId::new)
        .ok_or(FileError::MissingIdentifier("SeriesInstanceUID"))?;
    let overlays = decode_overlays(obj, max_overlay_bytes)?;

    Ok(Image {
        sop_id,
        series_id,
        sop_class_uid: obj.element_str(tags::SOP_CLASS_UID),
        instance_number: obj.element_int(tags::INSTANCE_NUMBER),
        rows: obj.element_u16(tags::ROWS),
        columns: obj.element_u16(tags::COLUMNS),
        number_of_frames: obj
            .element_int(tags::NUMBER_OF_FRAMES)
            .and_then(|n| u32::try_from(n).ok()),
        window: extract_window(obj),
        slice_location: obj.element_f64(tags::SLICE_LOCATION),
        slice_thickness: obj.element_f64(tags::SLICE_THICKNESS),
        overlays: (!overlays.is_empty()).then_some(overlays),
        path: path.to_path_buf(),
    })
}
