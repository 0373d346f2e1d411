use std::collections::HashSet;

use dicom::core::Tag;
use tracing::debug;

use crate::content_tree::decode_content_tree;
use crate::dicom_access::{code_meaning, Dataset, ElementAccess};
use crate::error::FileError;
use crate::metadata::require_sop_id;
use crate::models::{Finding, KeyObjectSelection, SopId, ValueType};
use crate::tags;

/// Instance-level sequences nested under a referenced series item.
pub const SERIES_IMAGE_SEQUENCES: &[Tag] = &[
    tags::REFERENCED_IMAGE_SEQUENCE,
    tags::REFERENCED_SOP_SEQUENCE,
];

/// Referenced SOP instance of the first item that names one.
pub fn first_referenced_sop(items: &[Dataset]) -> Option<SopId> {
    items
        .iter()
        .find_map(|item| item.element_str(tags::REFERENCED_SOP_INSTANCE_UID))
        .map(SopId::new)
}

/// Collect referenced SOP instances from a descriptor sequence in encounter order.
///
/// Each item may name an instance itself and may nest a further sequence under `nested`
/// (series -> images). Duplicates are kept.
pub fn collect_sop_references(items: &[Dataset], nested: &[Tag]) -> Vec<SopId> {
    let mut out = Vec::new();
    for item in items {
        if let Some(uid) = item.element_str(tags::REFERENCED_SOP_INSTANCE_UID) {
            out.push(SopId::new(uid));
        }
        for tag in nested {
            for child in item.items(*tag) {
                if let Some(uid) = child.element_str(tags::REFERENCED_SOP_INSTANCE_UID) {
                    out.push(SopId::new(uid));
                }
            }
        }
    }
    out
}

/// Every IMAGE reference in a finding tree, at any depth, in depth-first order.
pub fn image_references(findings: &[Finding]) -> Vec<SopId> {
    findings
        .iter()
        .flat_map(Finding::walk)
        .filter(|f| f.value_type == ValueType::Image)
        .filter_map(|f| f.referenced_image.clone())
        .collect()
}

/// Keep the first occurrence of each reference.
pub fn dedup_references(refs: Vec<SopId>) -> Vec<SopId> {
    let mut seen = HashSet::new();
    refs.into_iter().filter(|r| seen.insert(r.clone())).collect()
}

/// Decode a key object selection; `None` when it marks no images.
pub fn decode_key_object(obj: &Dataset) -> Result<Option<KeyObjectSelection>, FileError> {
    let sop_id = require_sop_id(obj)?;
    let findings = decode_content_tree(obj);
    let images = dedup_references(image_references(&findings));

    if images.is_empty() {
        debug!(%sop_id, "key object selection without image references, dropped");
        return Ok(None);
    }

    let description = findings
        .iter()
        .flat_map(Finding::walk)
        .find(|f| f.value_type == ValueType::Text && !f.value.is_empty())
        .map(|f| f.value.clone());

    Ok(Some(KeyObjectSelection {
        sop_id,
        title: code_meaning(obj, tags::CONCEPT_NAME_CODE_SEQUENCE),
        description,
        images,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{code_item, content_item, sequence, sop_reference, text};
    use dicom::core::VR;

    fn image_item(uid: &str) -> Dataset {
        let mut item = content_item("IMAGE", Some("Image"));
        item.put(sop_reference(tags::REFERENCED_SOP_SEQUENCE, uid));
        item
    }

    fn series_item(uids: &[&str]) -> Dataset {
        let images = uids
            .iter()
            .map(|uid| {
                let mut image = Dataset::new_empty();
                image.put(text(tags::REFERENCED_SOP_INSTANCE_UID, VR::UI, uid));
                image
            })
            .collect();
        let mut series = Dataset::new_empty();
        series.put(sequence(tags::REFERENCED_IMAGE_SEQUENCE, images));
        series
    }

    #[test]
    fn two_level_walk_keeps_order_and_duplicates() {
        let items = vec![series_item(&["1.1", "1.2"]), series_item(&["2.1", "1.1"])];
        let refs = collect_sop_references(&items, SERIES_IMAGE_SEQUENCES);
        let uids: Vec<_> = refs.iter().map(SopId::as_str).collect();
        assert_eq!(uids, ["1.1", "1.2", "2.1", "1.1"]);
        assert_eq!(dedup_references(refs).len(), 3);
    }

    #[test]
    fn key_object_collects_nested_image_leaves() {
        let mut container = content_item("CONTAINER", Some("Key images"));
        container.put(sequence(
            tags::CONTENT_SEQUENCE,
            vec![image_item("9.1"), image_item("9.2")],
        ));
        let mut description = content_item("TEXT", Some("Key Object Description"));
        description.put(text(tags::TEXT_VALUE, VR::UT, "Compare with prior"));

        let mut obj = Dataset::new_empty();
        obj.put(text(tags::SOP_INSTANCE_UID, VR::UI, "5.5"));
        obj.put(sequence(
            tags::CONCEPT_NAME_CODE_SEQUENCE,
            vec![code_item("Of Interest")],
        ));
        obj.put(sequence(
            tags::CONTENT_SEQUENCE,
            vec![description, image_item("9.0"), container],
        ));

        let ko = decode_key_object(&obj).expect("decode").expect("kept");
        let uids: Vec<_> = ko.images.iter().map(SopId::as_str).collect();
        assert_eq!(uids, ["9.0", "9.1", "9.2"]);
        assert_eq!(ko.title.as_deref(), Some("Of Interest"));
        assert_eq!(ko.description.as_deref(), Some("Compare with prior"));
    }

    #[test]
    fn key_object_without_images_is_dropped() {
        let mut obj = Dataset::new_empty();
        obj.put(text(tags::SOP_INSTANCE_UID, VR::UI, "5.6"));
        obj.put(sequence(
            tags::CONTENT_SEQUENCE,
            vec![content_item("TEXT", Some("Note"))],
        ));
        assert!(decode_key_object(&obj).expect("decode").is_none());
    }

    #[test]
    fn key_object_requires_instance_uid() {
        let obj = Dataset::new_empty();
        assert!(matches!(
            decode_key_object(&obj),
            Err(FileError::MissingIdentifier(_))
        ));
    }
}
