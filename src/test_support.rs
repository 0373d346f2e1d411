// Dataset builders shared by the unit tests.

use dicom::core::value::{DataSetSequence, PrimitiveValue};
use dicom::core::{DataElement, Length, Tag, VR};
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::mem::InMemElement;

use crate::dicom_access::Dataset;
use crate::tags;

pub type Element = InMemElement<StandardDataDictionary>;

pub fn text(tag: Tag, vr: VR, value: &str) -> Element {
    DataElement::new(tag, vr, PrimitiveValue::from(value))
}

pub fn floats(tag: Tag, values: &[f32]) -> Element {
    DataElement::new(tag, VR::FL, PrimitiveValue::F32(values.to_vec().into()))
}

pub fn sequence(tag: Tag, items: Vec<Dataset>) -> Element {
    DataElement::new(tag, VR::SQ, DataSetSequence::new(items, Length::UNDEFINED))
}

pub fn code_item(meaning: &str) -> Dataset {
    let mut item = Dataset::new_empty();
    item.put(text(tags::CODE_MEANING, VR::LO, meaning));
    item
}

pub fn concept(meaning: &str) -> Element {
    sequence(tags::CONCEPT_NAME_CODE_SEQUENCE, vec![code_item(meaning)])
}

/// Content item carrying `value_type` and, when given, a concept name.
pub fn content_item(value_type: &str, concept_name: Option<&str>) -> Dataset {
    let mut item = Dataset::new_empty();
    item.put(text(tags::VALUE_TYPE, VR::CS, value_type));
    if let Some(name) = concept_name {
        item.put(concept(name));
    }
    item
}

pub fn sop_reference(tag: Tag, uid: &str) -> Element {
    let mut item = Dataset::new_empty();
    item.put(text(tags::REFERENCED_SOP_INSTANCE_UID, VR::UI, uid));
    sequence(tag, vec![item])
}
