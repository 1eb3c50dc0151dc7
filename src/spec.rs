/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Field specification types.
//!
//! A [`MessageSpec`] maps field numbers to [`FieldSpec`] rules and governs
//! how the codec lays each field out on the wire. The codec only reads the
//! specification; building it (typically from a configuration file) is the
//! caller's responsibility.
//!
//! Field numbers 0 and 1 are reserved: 0 describes the MTI and 1 the bitmap,
//! both of which the codec generates itself. A specification must therefore
//! contain at least one entry outside those two.
//!
//! Length classes follow the ISO 8583 convention:
//!
//! | class    | wire layout                                  |
//! |----------|----------------------------------------------|
//! | `fixed`  | exactly `max_len` units, padded              |
//! | `llvar`  | 2-digit decimal length prefix, then value    |
//! | `lllvar` | 3-digit decimal length prefix, then value    |
//! | `llllvar`| 4-digit decimal length prefix, then value    |

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

/// Errors from specification construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// The specification contains no entries at all.
    #[error("specification is empty")]
    Empty,
    /// Every entry is field 0 (MTI) or 1 (bitmap); no data field exists.
    #[error("specification needs at least one field other than 0 and 1")]
    NoDataField,
    /// A length-class string is not one of `fixed`/`llvar`/`lllvar`/`llllvar`.
    #[error("{0:?} is not a valid length class")]
    InvalidLengthClass(String),
    /// A variable-length field's `max_len` needs more digits than its
    /// length prefix carries.
    #[error("field {field}: max length {max} does not fit a {width}-digit length prefix")]
    PrefixOverflow {
        /// The offending field number.
        field: u16,
        /// The configured maximum length.
        max: usize,
        /// The prefix width of the field's length class.
        width: usize,
    },
}

/// Content classification of a field, deciding its fixed-width padding.
///
/// Numeric fields are left-padded with `'0'`; everything else is
/// right-padded with `' '`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// Decimal digits (ISO content code `n`).
    Numeric,
    /// Any other content (alphanumeric, special, binary-as-text).
    Other,
}

impl ContentClass {
    /// Map an ISO content-type code to a class: `"n"` is numeric, anything
    /// else is [`ContentClass::Other`].
    #[inline(always)]
    pub fn from_code(code: &str) -> Self {
        if code == "n" {
            ContentClass::Numeric
        } else {
            ContentClass::Other
        }
    }
}

/// Length-encoding classification of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// Exactly `max_len` units, no prefix.
    Fixed,
    /// 2-digit decimal length prefix.
    LlVar,
    /// 3-digit decimal length prefix.
    LllVar,
    /// 4-digit decimal length prefix.
    LlllVar,
}

impl LengthClass {
    /// Number of decimal digits in the length prefix, or `None` for
    /// fixed-length fields.
    #[inline(always)]
    pub fn prefix_width(self) -> Option<usize> {
        match self {
            LengthClass::Fixed => None,
            LengthClass::LlVar => Some(2),
            LengthClass::LllVar => Some(3),
            LengthClass::LlllVar => Some(4),
        }
    }
}

impl FromStr for LengthClass {
    type Err = SpecError;

    /// Parse a length-class string, case-insensitively.
    fn from_str(s: &str) -> Result<Self, SpecError> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(LengthClass::Fixed),
            "llvar" => Ok(LengthClass::LlVar),
            "lllvar" => Ok(LengthClass::LllVar),
            "llllvar" => Ok(LengthClass::LlllVar),
            _ => Err(SpecError::InvalidLengthClass(s.to_string())),
        }
    }
}

/// The wire rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Content classification (drives fixed-width padding).
    pub content: ContentClass,
    /// Length-encoding classification.
    pub length: LengthClass,
    /// Maximum value length; also the exact wire length for fixed fields.
    pub max_len: usize,
    /// Minimum value length. Carried for specification completeness; the
    /// codec does not enforce it.
    pub min_len: usize,
    /// Human-readable field name.
    pub label: String,
}

impl FieldSpec {
    /// Rule for a fixed-length field of exactly `max_len` units.
    pub fn fixed(content: ContentClass, max_len: usize, label: &str) -> Self {
        Self {
            content,
            length: LengthClass::Fixed,
            max_len,
            min_len: 0,
            label: label.to_string(),
        }
    }

    /// Rule for a variable-length field with the given length class.
    ///
    /// `max_len` must fit the class's prefix digits (99/999/9999);
    /// [`MessageSpec::new`] enforces this.
    pub fn var(length: LengthClass, content: ContentClass, max_len: usize, label: &str) -> Self {
        Self {
            content,
            length,
            max_len,
            min_len: 0,
            label: label.to_string(),
        }
    }
}

/// A complete ISO 8583 field specification: field number → rule.
///
/// Validated once at construction and immutable afterwards; share one
/// instance across any number of messages through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSpec {
    fields: HashMap<u16, FieldSpec>,
}

impl MessageSpec {
    /// Build a specification from a field map.
    ///
    /// Fails with [`SpecError::Empty`] when the map has no entries, with
    /// [`SpecError::NoDataField`] when every entry is the reserved field 0
    /// or 1, and with [`SpecError::PrefixOverflow`] when a variable-length
    /// field's `max_len` cannot be written in its prefix digits (an LLVAR
    /// field must keep `max_len` ≤ 99, LLLVAR ≤ 999, LLLLVAR ≤ 9999).
    pub fn new(fields: HashMap<u16, FieldSpec>) -> Result<Self, SpecError> {
        if fields.is_empty() {
            return Err(SpecError::Empty);
        }
        if !fields.keys().any(|&field| field != 0 && field != 1) {
            return Err(SpecError::NoDataField);
        }
        for (&field, rule) in &fields {
            if let Some(width) = rule.length.prefix_width() {
                if rule.max_len >= 10usize.pow(width as u32) {
                    return Err(SpecError::PrefixOverflow {
                        field,
                        max: rule.max_len,
                        width,
                    });
                }
            }
        }
        Ok(Self { fields })
    }

    /// Look up the rule for a field number.
    #[inline(always)]
    pub fn field(&self, number: u16) -> Option<&FieldSpec> {
        self.fields.get(&number)
    }

    /// Number of entries, including any reserved 0/1 metadata entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the specification has no entries. Always `false` for a
    /// constructed spec; provided for API completeness.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn one_field_map() -> HashMap<u16, FieldSpec> {
        let mut fields = HashMap::new();
        fields.insert(3, FieldSpec::fixed(ContentClass::Numeric, 6, "Processing Code"));
        fields
    }

    #[test]
    fn test_new_valid_spec() {
        let spec = MessageSpec::new(one_field_map()).expect("valid spec");
        assert_eq!(spec.len(), 1);
        assert!(spec.field(3).is_some());
        assert!(spec.field(4).is_none());
    }

    #[test]
    fn test_new_empty_spec() {
        assert_eq!(MessageSpec::new(HashMap::new()), Err(SpecError::Empty));
    }

    #[test]
    fn test_new_only_reserved_fields() {
        let mut fields = HashMap::new();
        fields.insert(0, FieldSpec::fixed(ContentClass::Numeric, 4, "MTI"));
        fields.insert(1, FieldSpec::fixed(ContentClass::Other, 16, "Bitmap"));
        assert_eq!(MessageSpec::new(fields), Err(SpecError::NoDataField));
    }

    #[test]
    fn test_new_rejects_max_len_wider_than_prefix() {
        // A 100+ character value cannot be declared in two prefix digits.
        let mut fields = HashMap::new();
        fields.insert(
            11,
            FieldSpec::var(LengthClass::LlVar, ContentClass::Numeric, 150, "System Trace"),
        );
        assert_eq!(
            MessageSpec::new(fields),
            Err(SpecError::PrefixOverflow { field: 11, max: 150, width: 2 }),
        );
    }

    #[test]
    fn test_new_accepts_max_len_at_prefix_capacity() {
        let mut fields = HashMap::new();
        fields.insert(
            11,
            FieldSpec::var(LengthClass::LlVar, ContentClass::Numeric, 99, "System Trace"),
        );
        fields.insert(
            48,
            FieldSpec::var(LengthClass::LlllVar, ContentClass::Other, 9999, "Additional Data"),
        );
        assert!(MessageSpec::new(fields).is_ok());
    }

    #[test]
    fn test_reserved_entries_allowed_alongside_data_fields() {
        let mut fields = one_field_map();
        fields.insert(0, FieldSpec::fixed(ContentClass::Numeric, 4, "MTI"));
        fields.insert(1, FieldSpec::fixed(ContentClass::Other, 16, "Bitmap"));
        let spec = MessageSpec::new(fields).expect("valid spec");
        assert_eq!(spec.len(), 3);
    }

    #[test]
    fn test_length_class_from_str() {
        assert_eq!("fixed".parse(), Ok(LengthClass::Fixed));
        assert_eq!("llvar".parse(), Ok(LengthClass::LlVar));
        assert_eq!("lllvar".parse(), Ok(LengthClass::LllVar));
        assert_eq!("llllvar".parse(), Ok(LengthClass::LlllVar));
    }

    #[test]
    fn test_length_class_from_str_is_case_insensitive() {
        assert_eq!("LLVAR".parse(), Ok(LengthClass::LlVar));
        assert_eq!("Fixed".parse(), Ok(LengthClass::Fixed));
    }

    #[test]
    fn test_length_class_from_str_rejects_unknown() {
        let result: Result<LengthClass, _> = "lvar".parse();
        assert_eq!(result, Err(SpecError::InvalidLengthClass("lvar".to_string())));
    }

    #[test]
    fn test_prefix_width() {
        assert_eq!(LengthClass::Fixed.prefix_width(), None);
        assert_eq!(LengthClass::LlVar.prefix_width(), Some(2));
        assert_eq!(LengthClass::LllVar.prefix_width(), Some(3));
        assert_eq!(LengthClass::LlllVar.prefix_width(), Some(4));
    }

    #[test]
    fn test_content_class_from_code() {
        assert_eq!(ContentClass::from_code("n"), ContentClass::Numeric);
        assert_eq!(ContentClass::from_code("an"), ContentClass::Other);
        assert_eq!(ContentClass::from_code("ans"), ContentClass::Other);
        assert_eq!(ContentClass::from_code(""), ContentClass::Other);
    }
}
