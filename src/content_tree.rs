//
// content_tree.rs
// Dicom-Study-rs
//
// Decodes structured report content sequences into a tree of typed findings.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::dicom_access::{code_meaning, Dataset, ElementAccess};
use crate::error::FileError;
use crate::metadata::require_sop_id;
use crate::models::{Finding, Report, SeriesId, ValueType};
use crate::references::first_referenced_sop;
use crate::tags;

/// Nesting deeper than this is truncated instead of followed.
pub const MAX_CONTENT_DEPTH: usize = 256;

/// Decode the root content sequence, depth-first in source order.
pub fn decode_content_tree(obj: &Dataset) -> Vec<Finding> {
    decode_items(obj.items(tags::CONTENT_SEQUENCE), None, 0)
}

fn decode_items(items: &[Dataset], inherited_name: Option<&str>, depth: usize) -> Vec<Finding> {
    if items.is_empty() {
        return Vec::new();
    }
    if depth >= MAX_CONTENT_DEPTH {
        warn!(depth, dropped = items.len(), "content tree too deep, truncating");
        return Vec::new();
    }
    items
        .iter()
        .filter_map(|item| decode_item(item, inherited_name, depth))
        .collect()
}

fn decode_item(item: &Dataset, inherited_name: Option<&str>, depth: usize) -> Option<Finding> {
    let Some(raw_type) = item.element_str(tags::VALUE_TYPE) else {
        debug!(depth, "content item without value type, skipped");
        return None;
    };
    let value_type = ValueType::from_code(&raw_type);

    let named = code_meaning(item, tags::CONCEPT_NAME_CODE_SEQUENCE)
        .or_else(|| inherited_name.map(str::to_string));
    let concept_name = named.clone().unwrap_or_else(|| raw_type.clone());

    let mut unit = None;
    let mut referenced_image = None;
    let value = match &value_type {
        ValueType::Text => item.element_str(tags::TEXT_VALUE).unwrap_or_default(),
        ValueType::Num => match item.items(tags::MEASURED_VALUE_SEQUENCE).first() {
            Some(measured) => {
                unit = code_meaning(measured, tags::MEASUREMENT_UNITS_CODE_SEQUENCE);
                measured.element_str(tags::NUMERIC_VALUE).unwrap_or_default()
            }
            None => String::new(),
        },
        ValueType::Code => code_meaning(item, tags::CONCEPT_CODE_SEQUENCE).unwrap_or_default(),
        ValueType::Image => {
            referenced_image = first_referenced_sop(item.items(tags::REFERENCED_SOP_SEQUENCE));
            concept_name.clone()
        }
        ValueType::Container | ValueType::Other(_) => concept_name.clone(),
    };

    let children = decode_items(
        item.items(tags::CONTENT_SEQUENCE),
        named.as_deref(),
        depth + 1,
    );

    Some(Finding {
        concept_name,
        value_type,
        value,
        unit,
        children: (!children.is_empty()).then_some(children),
        referenced_image,
    })
}

pub fn decode_report(obj: &Dataset, path: &Path) -> Result<Report, FileError> {
    let sop_id = require_sop_id(obj)?;
    let findings = decode_content_tree(obj);

    Ok(Report {
        sop_id,
        series_id: obj.element_str(tags::SERIES_INSTANCE_UID).map(SeriesId::new),
        title: code_meaning(obj, tags::CONCEPT_NAME_CODE_SEQUENCE),
        findings,
        complete: obj.element_str(tags::COMPLETION_FLAG).as_deref() == Some("COMPLETE"),
        verified: obj.element_str(tags::VERIFICATION_FLAG).as_deref() == Some("VERIFIED"),
        content_date: obj
            .element_str(tags::CONTENT_DATE)
            .and_then(|d| parse_da(&d)),
        verifying_observer: obj
            .items(tags::VERIFYING_OBSERVER_SEQUENCE)
            .first()
            .and_then(|o| o.element_str(tags::VERIFYING_OBSERVER_NAME)),
        path: path.to_path_buf(),
    })
}

fn parse_da(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}
