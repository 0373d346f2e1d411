//
// summary.rs
// Dicom-Study-rs
//
// Renders human-readable outlines of an assembled study and of single decoded files.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::annotation::{decode_presentation_state, Shape};
use crate::assembler::{read_file, LoadOptions, SkippedFile};
use crate::classify::{classify, ObjectKind};
use crate::content_tree::decode_report;
use crate::dicom_access::ElementAccess;
use crate::metadata::{extract_image, extract_study_header};
use crate::models::{Finding, GraphicAnnotation, Overlay, PresentationState, Study};
use crate::references::decode_key_object;

const MAX_VALUE_LEN: usize = 64;

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

pub fn render_study(study: &Study, skipped: &[SkippedFile]) -> String {
    let mut out = String::new();
    let header = &study.header;
    let _ = writeln!(out, "{}", "=".repeat(80));
    let _ = writeln!(out, "Study {}", header.study_id);
    let _ = writeln!(out, "{}", "=".repeat(80));
    let _ = writeln!(out, "PATIENT");
    let _ = writeln!(out, "  Name: {}", or_na(&header.patient_name));
    let _ = writeln!(out, "  ID:   {}", or_na(&header.patient_id));
    let _ = writeln!(out, "\nSTUDY");
    let _ = writeln!(out, "  Date:        {}", or_na(&header.study_date));
    let _ = writeln!(out, "  Description: {}", or_na(&header.description));
    let _ = writeln!(out, "  Modality:    {}", or_na(&header.modality));
    let _ = writeln!(out, "  Institution: {}", or_na(&header.institution));
    let _ = writeln!(out, "  Referring:   {}", or_na(&header.referring_physician));

    let _ = writeln!(out, "\nSERIES ({})", study.series.len());
    for series in &study.series {
        let _ = writeln!(
            out,
            "  #{} {} [{}] {} image(s)",
            series.number.map_or_else(|| "-".to_string(), |n| n.to_string()),
            or_na(&series.description),
            or_na(&series.modality),
            series.images.len()
        );
        for image in &series.images {
            let overlays = image.overlays.as_ref().map_or(0, Vec::len);
            let _ = writeln!(
                out,
                "    {:>4} {} {}x{}{}",
                image
                    .instance_number
                    .map_or_else(|| "-".to_string(), |n| n.to_string()),
                image.sop_id,
                image.rows.unwrap_or(0),
                image.columns.unwrap_or(0),
                if overlays > 0 {
                    format!(" +{overlays} overlay(s)")
                } else {
                    String::new()
                }
            );
        }
    }

    for report in &study.reports {
        let _ = writeln!(
            out,
            "\nREPORT {} ({}, {})",
            report.title.as_deref().unwrap_or("untitled"),
            if report.complete { "complete" } else { "partial" },
            if report.verified { "verified" } else { "unverified" }
        );
        render_findings(&report.findings, 1, &mut out);
    }

    for ko in &study.key_objects {
        let _ = writeln!(
            out,
            "\nKEY IMAGES {} ({} image(s))",
            ko.title.as_deref().unwrap_or("untitled"),
            ko.images.len()
        );
        for sop_id in &ko.images {
            let status = if study.find_image(sop_id).is_some() {
                ""
            } else {
                " (not loaded)"
            };
            let _ = writeln!(out, "  {sop_id}{status}");
        }
    }

    for pr in &study.presentation_states {
        render_presentation_state(pr, &mut out);
    }

    if !skipped.is_empty() {
        let _ = writeln!(out, "\nSKIPPED ({})", skipped.len());
        for file in skipped {
            let _ = writeln!(out, "  {:?}: {}", file.path, file.error);
        }
    }
    out
}

pub fn render_findings(findings: &[Finding], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for finding in findings {
        let mut line = format!(
            "{}[{}] {}",
            indent,
            finding.value_type.as_code(),
            finding.concept_name
        );
        if finding.value != finding.concept_name && !finding.value.is_empty() {
            let _ = write!(line, ": {}", truncate(&finding.value, MAX_VALUE_LEN));
        }
        if let Some(unit) = &finding.unit {
            let _ = write!(line, " {unit}");
        }
        if let Some(image) = &finding.referenced_image {
            let _ = write!(line, " -> {image}");
        }
        let _ = writeln!(out, "{line}");
        if let Some(children) = &finding.children {
            render_findings(children, depth + 1, out);
        }
    }
}

fn render_presentation_state(pr: &PresentationState, out: &mut String) {
    let _ = writeln!(
        out,
        "\nPRESENTATION {} ({} image(s))",
        pr.label.as_deref().unwrap_or("unlabeled"),
        pr.referenced_images.len()
    );
    if let Some(window) = pr.window {
        let _ = writeln!(out, "  Window: C {} / W {}", window.center, window.width);
    }
    for annotation in pr.annotations.iter().flatten() {
        let _ = writeln!(out, "  {}", describe_annotation(annotation));
    }
}

fn describe_annotation(annotation: &GraphicAnnotation) -> String {
    match annotation.shape() {
        Some(Shape::Point { x, y }) => format!("point ({x:.1}, {y:.1})"),
        Some(Shape::Polyline { points }) => format!("polyline, {} point(s)", points.len()),
        Some(Shape::Circle { center, radius }) => format!(
            "circle center ({:.1}, {:.1}) radius {:.1}",
            center.0, center.1, radius
        ),
        Some(Shape::Ellipse {
            center,
            radius_x,
            radius_y,
            rotation,
        }) => format!(
            "ellipse center ({:.1}, {:.1}) radii {:.1}/{:.1} rotation {:.1}°",
            center.0,
            center.1,
            radius_x,
            radius_y,
            rotation.to_degrees()
        ),
        Some(Shape::Text { x, y, text }) => {
            format!("text \"{}\" at ({x:.1}, {y:.1})", truncate(&text, MAX_VALUE_LEN))
        }
        None => format!("{:?} with {} coordinate(s)", annotation.kind, annotation.points.len()),
    }
}

fn render_overlay(overlay: &Overlay) -> String {
    let set = overlay.data.iter().filter(|b| **b == 1).count();
    format!(
        "overlay {:04X} {:?} {}x{} origin {:?}{} ({} pixel(s) set)",
        overlay.group,
        overlay.kind,
        overlay.rows,
        overlay.columns,
        overlay.origin,
        overlay
            .label
            .as_deref()
            .map(|l| format!(" \"{l}\""))
            .unwrap_or_default(),
        set
    )
}

/// Classify and decode one file, describing whatever it carries.
pub fn inspect_to_string(path: &Path, options: &LoadOptions) -> Result<String> {
    let obj = read_file(path, options).with_context(|| format!("Failed to read {path:?}"))?;
    let kind = classify(&obj);
    let mut out = String::new();
    let _ = writeln!(out, "File: {:?}", path);
    let _ = writeln!(out, "Kind: {:?}", kind);
    if let Some(ts) = obj.transfer_syntax() {
        let _ = writeln!(out, "Transfer Syntax: {ts}");
    }
    if let Some(header) = extract_study_header(&obj) {
        let _ = writeln!(out, "Study: {}", header.study_id);
    }

    match kind {
        ObjectKind::Image => {
            let image = extract_image(&obj, path, options.max_overlay_bytes)?;
            let _ = writeln!(
                out,
                "Image {} in series {} (instance {})",
                image.sop_id,
                image.series_id,
                image
                    .instance_number
                    .map_or_else(|| "-".to_string(), |n| n.to_string())
            );
            for overlay in image.overlays.iter().flatten() {
                let _ = writeln!(out, "  {}", render_overlay(overlay));
            }
        }
        ObjectKind::StructuredReport => {
            let report = decode_report(&obj, path)?;
            let _ = writeln!(out, "Report: {}", report.title.as_deref().unwrap_or("untitled"));
            render_findings(&report.findings, 1, &mut out);
        }
        ObjectKind::KeyObjectSelection => match decode_key_object(&obj)? {
            Some(ko) => {
                let _ = writeln!(out, "Key images: {}", ko.title.as_deref().unwrap_or("untitled"));
                for sop_id in &ko.images {
                    let _ = writeln!(out, "  {sop_id}");
                }
            }
            None => {
                let _ = writeln!(out, "Key object selection without image references");
            }
        },
        ObjectKind::PresentationState => match decode_presentation_state(&obj)? {
            Some(pr) => render_presentation_state(&pr, &mut out),
            None => {
                let _ = writeln!(out, "Presentation state without referenced images");
            }
        },
        ObjectKind::Unknown => {
            let _ = writeln!(out, "Not a supported object kind");
        }
    }
    Ok(out)
}

fn truncate(input: &str, limit: usize) -> String {
    if input.chars().count() <= limit {
        input.to_string()
    } else {
        let mut truncated: String = input.chars().take(limit).collect();
        truncated.push('…');
        truncated
    }
}
