//
// annotation.rs
// Dicom-Study-rs
//
// Decodes presentation states: referenced images, softcopy VOI window and graphic/text annotations.
// Shape geometry is reconstructed on demand from the flat coordinate buffers.
//
// Thales Matheus Mendonça Santos - November 2025

use tracing::debug;

use crate::dicom_access::{Dataset, ElementAccess};
use crate::error::FileError;
use crate::metadata::require_sop_id;
use crate::models::{
    AnnotationUnits, GraphicAnnotation, GraphicKind, PresentationState, Window,
};
use crate::references::{collect_sop_references, dedup_references, SERIES_IMAGE_SEQUENCES};
use crate::tags;

pub fn decode_presentation_state(obj: &Dataset) -> Result<Option<PresentationState>, FileError> {
    let sop_id = require_sop_id(obj)?;

    let mut references =
        collect_sop_references(obj.items(tags::REFERENCED_SERIES_SEQUENCE), SERIES_IMAGE_SEQUENCES);
    references.extend(collect_sop_references(
        obj.items(tags::REFERENCED_IMAGE_SEQUENCE),
        &[],
    ));
    let referenced_images = dedup_references(references);
    if referenced_images.is_empty() {
        debug!(%sop_id, "presentation state without referenced images, dropped");
        return Ok(None);
    }

    let annotations = decode_annotations(obj);

    Ok(Some(PresentationState {
        sop_id,
        label: obj.element_str(tags::CONTENT_LABEL),
        description: obj.element_str(tags::CONTENT_DESCRIPTION),
        creation_date: obj.element_str(tags::PRESENTATION_CREATION_DATE),
        referenced_images,
        window: decode_window(obj),
        annotations: (!annotations.is_empty()).then_some(annotations),
    }))
}

/// Window from the first softcopy VOI LUT item; absent without that sequence.
pub fn decode_window(obj: &Dataset) -> Option<Window> {
    let voi = obj.items(tags::SOFTCOPY_VOI_LUT_SEQUENCE).first()?;
    Some(Window {
        center: voi.element_f64(tags::WINDOW_CENTER)?,
        width: voi.element_f64(tags::WINDOW_WIDTH)?,
    })
}

/// Graphic then text objects of every annotation group, in source order.
pub fn decode_annotations(obj: &Dataset) -> Vec<GraphicAnnotation> {
    let mut out = Vec::new();
    for group in obj.items(tags::GRAPHIC_ANNOTATION_SEQUENCE) {
        let layer = group.element_str(tags::GRAPHIC_LAYER);
        out.extend(
            group
                .items(tags::GRAPHIC_OBJECT_SEQUENCE)
                .iter()
                .filter_map(|item| decode_graphic_object(item, layer.as_deref())),
        );
        out.extend(
            group
                .items(tags::TEXT_OBJECT_SEQUENCE)
                .iter()
                .filter_map(|item| decode_text_object(item, layer.as_deref())),
        );
    }
    out
}

impl GraphicKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "POINT" => GraphicKind::Point,
            "POLYLINE" | "INTERPOLATED" => GraphicKind::Polyline,
            "CIRCLE" => GraphicKind::Circle,
            "ELLIPSE" => GraphicKind::Ellipse,
            _ => GraphicKind::Polyline,
        }
    }
}

fn decode_units(item: &Dataset) -> Option<AnnotationUnits> {
    match item.element_str(tags::GRAPHIC_ANNOTATION_UNITS).as_deref() {
        Some("PIXEL") => Some(AnnotationUnits::Pixel),
        Some("DISPLAY") => Some(AnnotationUnits::Display),
        _ => None,
    }
}

fn decode_graphic_object(item: &Dataset, layer: Option<&str>) -> Option<GraphicAnnotation> {
    let kind = GraphicKind::from_code(item.element_str(tags::GRAPHIC_TYPE).as_deref().unwrap_or(""));

    // A count that overstates the data just yields fewer points.
    let mut points = item.element_f32_values(tags::GRAPHIC_DATA);
    if let Some(count) = item.element_u16(tags::NUMBER_OF_GRAPHIC_POINTS) {
        points.truncate(usize::from(count) * 2);
    }
    points.truncate(points.len() - points.len() % 2);

    if points.is_empty() {
        debug!(?kind, "graphic object without coordinates, skipped");
        return None;
    }

    Some(GraphicAnnotation {
        kind,
        points,
        text: None,
        layer: layer.map(str::to_string),
        units: decode_units(item),
        filled: item.element_str(tags::GRAPHIC_FILLED).as_deref() == Some("Y"),
    })
}

fn decode_text_object(item: &Dataset, layer: Option<&str>) -> Option<GraphicAnnotation> {
    let text = item.element_str(tags::UNFORMATTED_TEXT_VALUE)?;
    let position = read_point(item, tags::ANCHOR_POINT)
        .or_else(|| read_point(item, tags::BOUNDING_BOX_TOP_LEFT))
        .unwrap_or((0.0, 0.0));

    Some(GraphicAnnotation {
        kind: GraphicKind::Text,
        points: vec![position.0, position.1],
        text: Some(text),
        layer: layer.map(str::to_string),
        units: decode_units(item),
        filled: false,
    })
}

fn read_point(item: &Dataset, tag: dicom::core::Tag) -> Option<(f32, f32)> {
    match item.element_f32_values(tag).as_slice() {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    }
}

/// Geometry reconstructed from an annotation's coordinate buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point { x: f32, y: f32 },
    Polyline { points: Vec<(f32, f32)> },
    Circle { center: (f32, f32), radius: f32 },
    Ellipse {
        center: (f32, f32),
        radius_x: f32,
        radius_y: f32,
        /// Angle of the first axis, in radians.
        rotation: f32,
    },
    Text { x: f32, y: f32, text: String },
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

impl GraphicAnnotation {
    pub fn point_pairs(&self) -> Vec<(f32, f32)> {
        self.points.chunks_exact(2).map(|p| (p[0], p[1])).collect()
    }

    /// `None` when the buffer is too short for the shape kind.
    pub fn shape(&self) -> Option<Shape> {
        let pairs = self.point_pairs();
        match self.kind {
            GraphicKind::Point => pairs.first().map(|&(x, y)| Shape::Point { x, y }),
            GraphicKind::Polyline => {
                (!pairs.is_empty()).then_some(Shape::Polyline { points: pairs })
            }
            GraphicKind::Circle => match pairs.as_slice() {
                [center, edge, ..] => Some(Shape::Circle {
                    center: *center,
                    radius: distance(*center, *edge),
                }),
                _ => None,
            },
            GraphicKind::Ellipse => match pairs.as_slice() {
                [a, b, c, d, ..] => Some(Shape::Ellipse {
                    center: ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0),
                    radius_x: distance(*a, *b) / 2.0,
                    radius_y: distance(*c, *d) / 2.0,
                    rotation: (b.1 - a.1).atan2(b.0 - a.0),
                }),
                _ => None,
            },
            GraphicKind::Text => pairs.first().map(|&(x, y)| Shape::Text {
                x,
                y,
                text: self.text.clone().unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{floats, sequence, sop_reference, text};
    use dicom::core::value::PrimitiveValue;
    use dicom::core::{DataElement, VR};

    fn graphic(kind: &str, count: u16, data: &[f32]) -> Dataset {
        let mut item = Dataset::new_empty();
        item.put(text(tags::GRAPHIC_TYPE, VR::CS, kind));
        item.put(text(tags::GRAPHIC_ANNOTATION_UNITS, VR::CS, "PIXEL"));
        item.put(DataElement::new(
            tags::NUMBER_OF_GRAPHIC_POINTS,
            VR::US,
            PrimitiveValue::from(count),
        ));
        item.put(floats(tags::GRAPHIC_DATA, data));
        item
    }

    fn presentation(groups: Vec<Dataset>) -> Dataset {
        let mut series = Dataset::new_empty();
        series.put(sop_reference(tags::REFERENCED_IMAGE_SEQUENCE, "1.2.3"));
        let mut obj = Dataset::new_empty();
        obj.put(text(tags::SOP_INSTANCE_UID, VR::UI, "7.7"));
        obj.put(sequence(tags::REFERENCED_SERIES_SEQUENCE, vec![series]));
        obj.put(sequence(tags::GRAPHIC_ANNOTATION_SEQUENCE, groups));
        obj
    }

    #[test]
    fn circle_reconstructs_center_and_radius() {
        let mut group = Dataset::new_empty();
        group.put(sequence(
            tags::GRAPHIC_OBJECT_SEQUENCE,
            vec![graphic("CIRCLE", 2, &[10.0, 10.0, 13.0, 10.0])],
        ));
        let annotations = decode_annotations(&presentation(vec![group]));
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].units, Some(AnnotationUnits::Pixel));
        assert_eq!(
            annotations[0].shape(),
            Some(Shape::Circle {
                center: (10.0, 10.0),
                radius: 3.0
            })
        );
    }

    #[test]
    fn ellipse_uses_both_axes() {
        let annotation = GraphicAnnotation {
            kind: GraphicKind::Ellipse,
            points: vec![0.0, 0.0, 4.0, 4.0, 3.0, 1.0, 1.0, 3.0],
            text: None,
            layer: None,
            units: None,
            filled: false,
        };
        let Some(Shape::Ellipse {
            center,
            radius_x,
            radius_y,
            rotation,
        }) = annotation.shape()
        else {
            panic!("expected ellipse");
        };
        assert_eq!(center, (2.0, 2.0));
        assert!((radius_x - 8.0_f32.sqrt()).abs() < 1e-5);
        assert!((radius_y - 2.0_f32.sqrt()).abs() < 1e-5);
        assert!((rotation - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn graphic_types_map_with_polyline_fallback() {
        assert_eq!(GraphicKind::from_code("INTERPOLATED"), GraphicKind::Polyline);
        assert_eq!(GraphicKind::from_code("POINT"), GraphicKind::Point);
        assert_eq!(GraphicKind::from_code("SPLINE"), GraphicKind::Polyline);
    }

    #[test]
    fn overstated_point_count_reads_what_is_there() {
        let mut group = Dataset::new_empty();
        group.put(sequence(
            tags::GRAPHIC_OBJECT_SEQUENCE,
            vec![graphic("POLYLINE", 10, &[1.0, 2.0, 3.0, 4.0, 5.0])],
        ));
        let annotations = decode_annotations(&presentation(vec![group]));
        assert_eq!(annotations[0].points, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn understated_point_count_limits_the_read() {
        let mut group = Dataset::new_empty();
        group.put(sequence(
            tags::GRAPHIC_OBJECT_SEQUENCE,
            vec![graphic("POINT", 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])],
        ));
        let annotations = decode_annotations(&presentation(vec![group]));
        assert_eq!(annotations[0].points, [1.0, 2.0]);
        assert_eq!(annotations[0].shape(), Some(Shape::Point { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn large_double_buffer_without_point_count() {
        let values: Vec<f64> = (0..400_000).map(f64::from).collect();
        let mut item = Dataset::new_empty();
        item.put(text(tags::GRAPHIC_TYPE, VR::CS, "POLYLINE"));
        item.put(DataElement::new(
            tags::GRAPHIC_DATA,
            VR::FD,
            PrimitiveValue::F64(values.into()),
        ));
        let mut group = Dataset::new_empty();
        group.put(sequence(tags::GRAPHIC_OBJECT_SEQUENCE, vec![item]));

        let started = std::time::Instant::now();
        let annotations = decode_annotations(&presentation(vec![group]));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        let points = &annotations[0].points;
        assert_eq!(points.len(), 400_000);
        assert_eq!(points[1], 1.0);
        assert_eq!(points[399_999], 399_999.0);
    }

    #[test]
    fn text_position_falls_back_to_origin() {
        let mut anchored = Dataset::new_empty();
        anchored.put(text(tags::UNFORMATTED_TEXT_VALUE, VR::ST, "lesion"));
        anchored.put(floats(tags::ANCHOR_POINT, &[5.0, 6.0]));
        let mut boxed = Dataset::new_empty();
        boxed.put(text(tags::UNFORMATTED_TEXT_VALUE, VR::ST, "boxed"));
        boxed.put(floats(tags::BOUNDING_BOX_TOP_LEFT, &[7.0, 8.0]));
        let mut bare = Dataset::new_empty();
        bare.put(text(tags::UNFORMATTED_TEXT_VALUE, VR::ST, "bare"));
        let empty = Dataset::new_empty();

        let mut group = Dataset::new_empty();
        group.put(text(tags::GRAPHIC_LAYER, VR::CS, "NOTES"));
        group.put(sequence(
            tags::TEXT_OBJECT_SEQUENCE,
            vec![anchored, boxed, bare, empty],
        ));
        let annotations = decode_annotations(&presentation(vec![group]));
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[0].points, [5.0, 6.0]);
        assert_eq!(annotations[1].points, [7.0, 8.0]);
        assert_eq!(annotations[2].points, [0.0, 0.0]);
        assert_eq!(annotations[2].layer.as_deref(), Some("NOTES"));
    }

    #[test]
    fn window_and_references() {
        let mut voi = Dataset::new_empty();
        voi.put(text(tags::WINDOW_CENTER, VR::DS, "40"));
        voi.put(text(tags::WINDOW_WIDTH, VR::DS, "400"));
        let mut obj = presentation(vec![]);
        obj.put(sequence(tags::SOFTCOPY_VOI_LUT_SEQUENCE, vec![voi]));
        obj.put(text(tags::CONTENT_LABEL, VR::CS, "LUNG"));

        let pr = decode_presentation_state(&obj).expect("decode").expect("kept");
        assert_eq!(
            pr.window,
            Some(Window {
                center: 40.0,
                width: 400.0
            })
        );
        assert_eq!(pr.label.as_deref(), Some("LUNG"));
        assert_eq!(pr.referenced_images.len(), 1);
        assert!(pr.annotations.is_none());
    }

    #[test]
    fn presentation_without_voi_or_references() {
        let mut obj = Dataset::new_empty();
        obj.put(text(tags::SOP_INSTANCE_UID, VR::UI, "7.8"));
        assert_eq!(decode_window(&obj), None);
        assert!(decode_presentation_state(&obj).expect("decode").is_none());
    }
}
