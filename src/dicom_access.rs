use std::borrow::Cow;

use dicom::core::value::{PrimitiveValue, Value};
use dicom::core::Tag;
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::{DefaultDicomObject, InMemDicomObject};

/// Dataset shape produced by the reader, both at the root and inside sequence items.
pub type Dataset = InMemDicomObject<StandardDataDictionary>;

/// Uniform, `Option`-returning queries over a parsed dataset.
///
/// Every decoder goes through this trait, so a missing element, an empty value and a value
/// that fails to convert all read as `None`.
pub trait ElementAccess {
    fn element_str(&self, tag: Tag) -> Option<String>;
    fn element_int(&self, tag: Tag) -> Option<i32>;
    fn element_u16(&self, tag: Tag) -> Option<u16>;
    fn element_f64(&self, tag: Tag) -> Option<f64>;
    /// Binary float at `index` of a multi-valued FL/OF element.
    fn element_f32_at(&self, tag: Tag, index: usize) -> Option<f32>;
    /// Every value of a float element, converted once. Empty when absent or not numeric.
    fn element_f32_values(&self, tag: Tag) -> Vec<f32>;
    /// Items of a sequence element, empty when absent or not a sequence.
    fn items(&self, tag: Tag) -> &[Dataset];
    /// Raw bytes of a bulk element such as overlay data.
    fn element_bytes(&self, tag: Tag) -> Option<Cow<'_, [u8]>>;
    fn has_element(&self, tag: Tag) -> bool;
    fn transfer_syntax(&self) -> Option<String>;
}

impl ElementAccess for Dataset {
    fn element_str(&self, tag: Tag) -> Option<String> {
        self.element_opt(tag)
            .ok()
            .flatten()
            .and_then(|e| e.to_str().ok())
            .map(|s| s.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string())
            .filter(|s| !s.is_empty())
    }

    fn element_int(&self, tag: Tag) -> Option<i32> {
        self.element_opt(tag)
            .ok()
            .flatten()
            .and_then(|e| e.to_int::<i32>().ok())
    }

    fn element_u16(&self, tag: Tag) -> Option<u16> {
        self.element_opt(tag)
            .ok()
            .flatten()
            .and_then(|e| e.to_int::<u16>().ok())
    }

    fn element_f64(&self, tag: Tag) -> Option<f64> {
        self.element_opt(tag)
            .ok()
            .flatten()
            .and_then(|e| e.to_float64().ok())
            .filter(|v| v.is_finite())
    }

    fn element_f32_at(&self, tag: Tag, index: usize) -> Option<f32> {
        let elem = self.element_opt(tag).ok().flatten()?;
        match elem.value() {
            Value::Primitive(PrimitiveValue::F32(values)) => values.get(index).copied(),
            // Implicit VR files with unknown dictionaries keep floats as plain bytes.
            Value::Primitive(PrimitiveValue::U8(bytes)) => bytes
                .chunks_exact(4)
                .nth(index)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            Value::Primitive(other) => other.to_multi_float32().ok()?.get(index).copied(),
            _ => None,
        }
    }

    fn element_f32_values(&self, tag: Tag) -> Vec<f32> {
        let Some(elem) = self.element_opt(tag).ok().flatten() else {
            return Vec::new();
        };
        match elem.value() {
            Value::Primitive(PrimitiveValue::F32(values)) => values.to_vec(),
            Value::Primitive(PrimitiveValue::U8(bytes)) => bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
            Value::Primitive(other) => other.to_multi_float32().unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn items(&self, tag: Tag) -> &[Dataset] {
        self.element_opt(tag)
            .ok()
            .flatten()
            .and_then(|e| e.items())
            .unwrap_or(&[])
    }

    fn element_bytes(&self, tag: Tag) -> Option<Cow<'_, [u8]>> {
        self.element_opt(tag)
            .ok()
            .flatten()
            .and_then(|e| e.to_bytes().ok())
    }

    fn has_element(&self, tag: Tag) -> bool {
        matches!(self.element_opt(tag), Ok(Some(_)))
    }

    fn transfer_syntax(&self) -> Option<String> {
        None
    }
}

impl ElementAccess for DefaultDicomObject {
    fn element_str(&self, tag: Tag) -> Option<String> {
        (**self).element_str(tag)
    }

    fn element_int(&self, tag: Tag) -> Option<i32> {
        (**self).element_int(tag)
    }

    fn element_u16(&self, tag: Tag) -> Option<u16> {
        (**self).element_u16(tag)
    }

    fn element_f64(&self, tag: Tag) -> Option<f64> {
        (**self).element_f64(tag)
    }

    fn element_f32_at(&self, tag: Tag, index: usize) -> Option<f32> {
        (**self).element_f32_at(tag, index)
    }

    fn element_f32_values(&self, tag: Tag) -> Vec<f32> {
        (**self).element_f32_values(tag)
    }

    fn items(&self, tag: Tag) -> &[Dataset] {
        (**self).items(tag)
    }

    fn element_bytes(&self, tag: Tag) -> Option<Cow<'_, [u8]>> {
        (**self).element_bytes(tag)
    }

    fn has_element(&self, tag: Tag) -> bool {
        (**self).has_element(tag)
    }

    fn transfer_syntax(&self) -> Option<String> {
        Some(self.meta().transfer_syntax().to_string())
    }
}

/// Code meaning of the first item of a code sequence.
pub fn code_meaning(obj: &Dataset, sequence: Tag) -> Option<String> {
    obj.items(sequence)
        .first()
        .and_then(|item| item.element_str(crate::tags::CODE_MEANING))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{floats, sequence, text};
    use dicom::core::{DataElement, VR};

    #[test]
    fn missing_and_blank_values_read_as_none() {
        let mut obj = Dataset::new_empty();
        obj.put(text(Tag(0x0010, 0x0010), VR::PN, "  "));
        assert_eq!(obj.element_str(Tag(0x0010, 0x0010)), None);
        assert_eq!(obj.element_str(Tag(0x0010, 0x0020)), None);
        assert_eq!(obj.element_int(Tag(0x0020, 0x0013)), None);
        assert!(obj.items(Tag(0x0040, 0xA730)).is_empty());
    }

    #[test]
    fn numeric_strings_and_binary_ints_convert() {
        let mut obj = Dataset::new_empty();
        obj.put(text(Tag(0x0020, 0x0013), VR::IS, "12 "));
        // Multi-valued strings arrive from the parser already split on the backslash.
        obj.put(DataElement::new(
            Tag(0x0028, 0x1050),
            VR::DS,
            PrimitiveValue::Strs(vec!["40".to_string(), "400".to_string()].into()),
        ));
        obj.put(DataElement::new(
            Tag(0x0028, 0x0010),
            VR::US,
            PrimitiveValue::from(512_u16),
        ));
        assert_eq!(obj.element_int(Tag(0x0020, 0x0013)), Some(12));
        assert_eq!(obj.element_f64(Tag(0x0028, 0x1050)), Some(40.0));
        assert_eq!(obj.element_u16(Tag(0x0028, 0x0010)), Some(512));
    }

    #[test]
    fn float_index_access_stops_at_end_of_values() {
        let mut obj = Dataset::new_empty();
        obj.put(floats(Tag(0x0070, 0x0022), &[1.5, 2.5]));
        assert_eq!(obj.element_f32_at(Tag(0x0070, 0x0022), 1), Some(2.5));
        assert_eq!(obj.element_f32_at(Tag(0x0070, 0x0022), 2), None);

        let mut raw = Dataset::new_empty();
        raw.put(DataElement::new(
            Tag(0x0070, 0x0022),
            VR::UN,
            PrimitiveValue::from(3.0_f32.to_le_bytes().to_vec()),
        ));
        assert_eq!(raw.element_f32_at(Tag(0x0070, 0x0022), 0), Some(3.0));
    }

    #[test]
    fn float_values_convert_any_numeric_representation() {
        let mut obj = Dataset::new_empty();
        obj.put(DataElement::new(
            Tag(0x0070, 0x0022),
            VR::FD,
            PrimitiveValue::F64(vec![1.5_f64, -2.0].into()),
        ));
        assert_eq!(obj.element_f32_values(Tag(0x0070, 0x0022)), [1.5, -2.0]);

        let mut raw = Dataset::new_empty();
        let bytes: Vec<u8> = [4.0_f32, 5.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        raw.put(DataElement::new(Tag(0x0070, 0x0022), VR::UN, PrimitiveValue::from(bytes)));
        assert_eq!(raw.element_f32_values(Tag(0x0070, 0x0022)), [4.0, 5.0]);

        assert!(Dataset::new_empty()
            .element_f32_values(Tag(0x0070, 0x0022))
            .is_empty());
    }

    #[test]
    fn code_meaning_reads_first_item() {
        let mut code = Dataset::new_empty();
        code.put(text(Tag(0x0008, 0x0104), VR::LO, "Impression"));
        let mut obj = Dataset::new_empty();
        obj.put(sequence(Tag(0x0040, 0xA043), vec![code]));
        assert_eq!(
            code_meaning(&obj, Tag(0x0040, 0xA043)).as_deref(),
            Some("Impression")
        );
    }
}
