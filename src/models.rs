//
// models.rs
// Dicom-Study-rs
//
// Defines the serializable study graph: study, series, images, reports, key objects, presentation states.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

macro_rules! uid_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(uid: impl Into<String>) -> Self {
                Self(uid.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

uid_type!(
    /// Study Instance UID.
    StudyId
);
uid_type!(
    /// Series Instance UID.
    SeriesId
);
uid_type!(
    /// SOP Instance UID of any object in the load.
    SopId
);

/// Window center/width pair; only present when both values parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window {
    pub center: f64,
    pub width: f64,
}

/// Study-level attributes, taken from a single file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyHeader {
    pub study_id: StudyId,
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub study_date: Option<String>,
    pub description: Option<String>,
    pub modality: Option<String>,
    pub institution: Option<String>,
    pub referring_physician: Option<String>,
    pub accession_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Study {
    #[serde(flatten)]
    pub header: StudyHeader,
    pub series: Vec<Series>,
    pub reports: Vec<Report>,
    pub key_objects: Vec<KeyObjectSelection>,
    pub presentation_states: Vec<PresentationState>,
}

impl Study {
    pub fn new(header: StudyHeader) -> Self {
        Self {
            header,
            series: Vec::new(),
            reports: Vec::new(),
            key_objects: Vec::new(),
            presentation_states: Vec::new(),
        }
    }

    pub fn image_count(&self) -> usize {
        self.series.iter().map(|s| s.images.len()).sum()
    }

    pub fn find_image(&self, sop_id: &SopId) -> Option<&Image> {
        self.series
            .iter()
            .flat_map(|s| s.images.iter())
            .find(|image| &image.sop_id == sop_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub series_id: SeriesId,
    pub number: Option<i32>,
    pub description: Option<String>,
    pub body_part: Option<String>,
    pub modality: Option<String>,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub sop_id: SopId,
    pub series_id: SeriesId,
    pub sop_class_uid: Option<String>,
    pub instance_number: Option<i32>,
    pub rows: Option<u16>,
    pub columns: Option<u16>,
    pub number_of_frames: Option<u32>,
    pub window: Option<Window>,
    pub slice_location: Option<f64>,
    pub slice_thickness: Option<f64>,
    pub overlays: Option<Vec<Overlay>>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverlayKind {
    Graphic,
    RegionOfInterest,
}

/// One unpacked overlay plane: `data` holds one 0/1 byte per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlay {
    pub group: u16,
    pub rows: u16,
    pub columns: u16,
    pub kind: OverlayKind,
    /// 1-based (row, column) of the plane's top-left pixel.
    pub origin: [i32; 2],
    pub label: Option<String>,
    pub description: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValueType {
    Text,
    Num,
    Code,
    Container,
    Image,
    /// Any other content item type, kept verbatim.
    Other(String),
}

impl ValueType {
    pub fn from_code(code: &str) -> Self {
        match code {
            "TEXT" => ValueType::Text,
            "NUM" => ValueType::Num,
            "CODE" => ValueType::Code,
            "CONTAINER" => ValueType::Container,
            "IMAGE" => ValueType::Image,
            other => ValueType::Other(other.to_string()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            ValueType::Text => "TEXT",
            ValueType::Num => "NUM",
            ValueType::Code => "CODE",
            ValueType::Container => "CONTAINER",
            ValueType::Image => "IMAGE",
            ValueType::Other(code) => code,
        }
    }
}

/// Node of a structured report content tree.
///
/// `children` is `None` rather than an empty list when nothing nested survived decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub concept_name: String,
    pub value_type: ValueType,
    pub value: String,
    pub unit: Option<String>,
    pub children: Option<Vec<Finding>>,
    pub referenced_image: Option<SopId>,
}

impl Finding {
    /// Depth-first walk over this node and all of its descendants.
    pub fn walk(&self) -> Vec<&Finding> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(children) = &node.children {
                stack.extend(children.iter().rev());
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sop_id: SopId,
    pub series_id: Option<SeriesId>,
    pub title: Option<String>,
    pub findings: Vec<Finding>,
    pub complete: bool,
    pub verified: bool,
    pub content_date: Option<NaiveDate>,
    pub verifying_observer: Option<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyObjectSelection {
    pub sop_id: SopId,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Never empty; entries may point at images absent from the load.
    pub images: Vec<SopId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationState {
    pub sop_id: SopId,
    pub label: Option<String>,
    pub description: Option<String>,
    pub creation_date: Option<String>,
    /// Never empty; entries may point at images absent from the load.
    pub referenced_images: Vec<SopId>,
    pub window: Option<Window>,
    pub annotations: Option<Vec<GraphicAnnotation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GraphicKind {
    Point,
    Polyline,
    Circle,
    Ellipse,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnnotationUnits {
    Pixel,
    Display,
}

/// A graphic or text object; `points` is a flat x,y buffer read per `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphicAnnotation {
    pub kind: GraphicKind,
    pub points: Vec<f32>,
    pub text: Option<String>,
    pub layer: Option<String>,
    pub units: Option<AnnotationUnits>,
    pub filled: bool,
}
