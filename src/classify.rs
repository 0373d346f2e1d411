use serde::Serialize;
use tracing::debug;

use crate::dicom_access::{Dataset, ElementAccess};
use crate::tags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectKind {
    Image,
    StructuredReport,
    KeyObjectSelection,
    PresentationState,
    Unknown,
}

/// Structured report storage classes, key object selection excluded.
pub const STRUCTURED_REPORT_CLASSES: &[&str] = &[
    "1.2.840.10008.5.1.4.1.1.88.11", // Basic Text SR
    "1.2.840.10008.5.1.4.1.1.88.22", // Enhanced SR
    "1.2.840.10008.5.1.4.1.1.88.33", // Comprehensive SR
    "1.2.840.10008.5.1.4.1.1.88.34", // Comprehensive 3D SR
    "1.2.840.10008.5.1.4.1.1.88.35", // Extensible SR
    "1.2.840.10008.5.1.4.1.1.88.40", // Procedure Log
    "1.2.840.10008.5.1.4.1.1.88.50", // Mammography CAD SR
    "1.2.840.10008.5.1.4.1.1.88.65", // Chest CAD SR
    "1.2.840.10008.5.1.4.1.1.88.67", // X-Ray Radiation Dose SR
    "1.2.840.10008.5.1.4.1.1.88.68", // Radiopharmaceutical Radiation Dose SR
    "1.2.840.10008.5.1.4.1.1.88.69", // Colon CAD SR
    "1.2.840.10008.5.1.4.1.1.88.70", // Implantation Plan SR
    "1.2.840.10008.5.1.4.1.1.88.71", // Acquisition Context SR
    "1.2.840.10008.5.1.4.1.1.88.72", // Simplified Adult Echo SR
    "1.2.840.10008.5.1.4.1.1.88.73", // Patient Radiation Dose SR
    "1.2.840.10008.5.1.4.1.1.88.74", // Planned Imaging Agent Administration SR
    "1.2.840.10008.5.1.4.1.1.88.75", // Performed Imaging Agent Administration SR
    "1.2.840.10008.5.1.4.1.1.88.76", // Enhanced X-Ray Radiation Dose SR
];

pub const KEY_OBJECT_SELECTION_CLASSES: &[&str] = &["1.2.840.10008.5.1.4.1.1.88.59"];

pub const PRESENTATION_STATE_CLASSES: &[&str] = &[
    "1.2.840.10008.5.1.4.1.1.11.1",  // Grayscale Softcopy
    "1.2.840.10008.5.1.4.1.1.11.2",  // Color Softcopy
    "1.2.840.10008.5.1.4.1.1.11.3",  // Pseudo-Color Softcopy
    "1.2.840.10008.5.1.4.1.1.11.4",  // Blending Softcopy
    "1.2.840.10008.5.1.4.1.1.11.5",  // XA/XRF Grayscale Softcopy
    "1.2.840.10008.5.1.4.1.1.11.6",  // Grayscale Planar MPR Volumetric
    "1.2.840.10008.5.1.4.1.1.11.7",  // Compositing Planar MPR Volumetric
    "1.2.840.10008.5.1.4.1.1.11.8",  // Advanced Blending
    "1.2.840.10008.5.1.4.1.1.11.9",  // Volume Rendering Volumetric
    "1.2.840.10008.5.1.4.1.1.11.10", // Segmented Volume Rendering Volumetric
    "1.2.840.10008.5.1.4.1.1.11.11", // Multiple Volume Rendering Volumetric
    "1.2.840.10008.5.1.4.1.1.11.12", // Variable Modality LUT Softcopy
];

/// Classify by SOP class UID; anything unlisted is an image only if it carries pixel data.
pub fn classify_uid(sop_class_uid: Option<&str>, has_pixel_data: bool) -> ObjectKind {
    match sop_class_uid {
        Some(uid) if STRUCTURED_REPORT_CLASSES.contains(&uid) => ObjectKind::StructuredReport,
        Some(uid) if KEY_OBJECT_SELECTION_CLASSES.contains(&uid) => ObjectKind::KeyObjectSelection,
        Some(uid) if PRESENTATION_STATE_CLASSES.contains(&uid) => ObjectKind::PresentationState,
        _ if has_pixel_data => ObjectKind::Image,
        _ => ObjectKind::Unknown,
    }
}

pub fn classify(obj: &Dataset) -> ObjectKind {
    // UI values may carry a trailing NUL pad; element_str already trims it.
    let sop_class = obj.element_str(tags::SOP_CLASS_UID);
    let kind = classify_uid(sop_class.as_deref(), obj.has_element(tags::PIXEL_DATA));
    debug!(?kind, sop_class = sop_class.as_deref().unwrap_or("-"), "classified dataset");
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::text;
    use dicom::core::value::PrimitiveValue;
    use dicom::core::{DataElement, VR};

    #[test]
    fn report_key_object_and_presentation_classes_are_distinct() {
        assert_eq!(
            classify_uid(Some("1.2.840.10008.5.1.4.1.1.88.33"), false),
            ObjectKind::StructuredReport
        );
        assert_eq!(
            classify_uid(Some("1.2.840.10008.5.1.4.1.1.88.59"), false),
            ObjectKind::KeyObjectSelection
        );
        assert_eq!(
            classify_uid(Some("1.2.840.10008.5.1.4.1.1.11.1"), false),
            ObjectKind::PresentationState
        );
    }

    #[test]
    fn membership_is_exact() {
        // Prefix of a presentation state class, not a member.
        assert_eq!(
            classify_uid(Some("1.2.840.10008.5.1.4.1.1.11"), false),
            ObjectKind::Unknown
        );
    }

    #[test]
    fn pixel_data_decides_between_image_and_unknown() {
        let mut obj = Dataset::new_empty();
        obj.put(text(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2"));
        assert_eq!(classify(&obj), ObjectKind::Unknown);

        obj.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OB,
            PrimitiveValue::from(vec![0_u8, 1, 2, 3]),
        ));
        assert_eq!(classify(&obj), ObjectKind::Image);
        assert_eq!(classify_uid(None, true), ObjectKind::Image);
    }
}
