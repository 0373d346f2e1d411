//
// tags.rs
// Dicom-Study-rs
//
// Attribute tags read by the decoders, grouped by the object kind that carries them.
//
// Thales Matheus Mendonça Santos - November 2025

use dicom::core::Tag;

// Identification
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);

// Patient / study
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
pub const REFERRING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);

// Series
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);

// Image
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
pub const SLICE_LOCATION: Tag = Tag(0x0020, 0x1041);
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// Structured reporting
pub const CONTENT_SEQUENCE: Tag = Tag(0x0040, 0xA730);
pub const VALUE_TYPE: Tag = Tag(0x0040, 0xA040);
pub const CONCEPT_NAME_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA043);
pub const CONCEPT_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA168);
pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
pub const TEXT_VALUE: Tag = Tag(0x0040, 0xA160);
pub const MEASURED_VALUE_SEQUENCE: Tag = Tag(0x0040, 0xA300);
pub const NUMERIC_VALUE: Tag = Tag(0x0040, 0xA30A);
pub const MEASUREMENT_UNITS_CODE_SEQUENCE: Tag = Tag(0x0040, 0x08EA);
pub const COMPLETION_FLAG: Tag = Tag(0x0040, 0xA491);
pub const VERIFICATION_FLAG: Tag = Tag(0x0040, 0xA493);
pub const VERIFYING_OBSERVER_SEQUENCE: Tag = Tag(0x0040, 0xA073);
pub const VERIFYING_OBSERVER_NAME: Tag = Tag(0x0040, 0xA075);
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);

// References
pub const REFERENCED_SERIES_SEQUENCE: Tag = Tag(0x0008, 0x1115);
pub const REFERENCED_IMAGE_SEQUENCE: Tag = Tag(0x0008, 0x1140);
pub const REFERENCED_SOP_SEQUENCE: Tag = Tag(0x0008, 0x1199);
pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);

// Presentation state
pub const CONTENT_LABEL: Tag = Tag(0x0070, 0x0080);
pub const CONTENT_DESCRIPTION: Tag = Tag(0x0070, 0x0081);
pub const PRESENTATION_CREATION_DATE: Tag = Tag(0x0070, 0x0082);
pub const SOFTCOPY_VOI_LUT_SEQUENCE: Tag = Tag(0x0028, 0x3110);
pub const GRAPHIC_ANNOTATION_SEQUENCE: Tag = Tag(0x0070, 0x0001);
pub const GRAPHIC_LAYER: Tag = Tag(0x0070, 0x0002);
pub const GRAPHIC_ANNOTATION_UNITS: Tag = Tag(0x0070, 0x0005);
pub const UNFORMATTED_TEXT_VALUE: Tag = Tag(0x0070, 0x0006);
pub const TEXT_OBJECT_SEQUENCE: Tag = Tag(0x0070, 0x0008);
pub const GRAPHIC_OBJECT_SEQUENCE: Tag = Tag(0x0070, 0x0009);
pub const BOUNDING_BOX_TOP_LEFT: Tag = Tag(0x0070, 0x0010);
pub const ANCHOR_POINT: Tag = Tag(0x0070, 0x0014);
pub const NUMBER_OF_GRAPHIC_POINTS: Tag = Tag(0x0070, 0x0021);
pub const GRAPHIC_DATA: Tag = Tag(0x0070, 0x0022);
pub const GRAPHIC_TYPE: Tag = Tag(0x0070, 0x0023);
pub const GRAPHIC_FILLED: Tag = Tag(0x0070, 0x0024);

// Overlay planes live in groups 0x6000..=0x601E; element numbers are per slot.
pub const OVERLAY_FIRST_GROUP: u16 = 0x6000;
pub const OVERLAY_SLOTS: u16 = 16;
pub const OVERLAY_ROWS: u16 = 0x0010;
pub const OVERLAY_COLUMNS: u16 = 0x0011;
pub const OVERLAY_DESCRIPTION: u16 = 0x0022;
pub const OVERLAY_TYPE: u16 = 0x0040;
pub const OVERLAY_ORIGIN: u16 = 0x0050;
pub const OVERLAY_LABEL: u16 = 0x1500;
pub const OVERLAY_DATA: u16 = 0x3000;
