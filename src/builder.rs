/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! ISO 8583 message serializer.
//!
//! Assembles one message from its parts into the wire byte stream.
//!
//! ## Build Flow
//!
//! 1. Snapshot the field store and mark every populated field present in
//!    the bitmap, escalating the tier as field numbers demand.
//! 2. Finalize the bitmap at its tier-correct size (64/128/192 bits, with
//!    continuation bits forced) and render it as hex.
//! 3. Emit the MTI (4 characters), then the bitmap hex, then each field
//!    payload in ascending field-number order — wire order always follows
//!    the bitmap, never insertion order.
//! 4. Fixed-length fields are padded to `max_len`: numeric content is
//!    left-padded with `'0'`, everything else right-padded with `' '`.
//!    Values are never truncated; an over-length value is rejected before
//!    padding.
//! 5. Variable-length fields emit a zero-padded decimal length prefix
//!    (2/3/4 digits for LLVAR/LLLVAR/LLLLVAR), then the raw value.
//!
//! No trailing padding or framing is added after the last payload.

use thiserror::Error;

use crate::bitconv::BitConvError;
use crate::bitmap::{BitmapEngine, BitmapError, Tier, MIN_FIELD};
use crate::mti::Mti;
use crate::spec::{ContentClass, FieldSpec, MessageSpec};
use crate::store::FieldStore;

/// Errors that can occur while marshaling a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// A field value is longer than its configured maximum.
    #[error("failed to marshal field {field} with max length {max} but data length {actual}")]
    FieldTooLong {
        /// The offending field number.
        field: u16,
        /// Configured maximum length.
        max: usize,
        /// Actual value length.
        actual: usize,
    },
    /// A populated field has no entry in the specification.
    #[error("no field spec for field {0}")]
    MissingFieldSpec(u16),
    /// A populated field number is outside the bitmap range.
    #[error(transparent)]
    Bitmap(#[from] BitmapError),
    /// The bitmap could not be rendered as hex.
    #[error(transparent)]
    BitConv(#[from] BitConvError),
}

/// Serialize a message into its wire byte stream.
///
/// Marks every stored field present in `bitmap` (escalating the tier as
/// needed) before emitting, so the bitmap and the payload sequence always
/// agree. At the Tertiary tier, field 65 is the continuation marker for the
/// third block: its bit is emitted but it never carries a payload.
pub(crate) fn marshal(
    spec: &MessageSpec,
    mti: &Mti,
    bitmap: &BitmapEngine,
    store: &FieldStore,
) -> Result<Vec<u8>, MarshalError> {
    let fields = store.snapshot();
    for &field in fields.keys() {
        bitmap.mark_present(field)?;
    }

    let tier = bitmap.tier();
    let bitmap_hex = bitmap.to_wire_hex()?;

    let mut out = Vec::with_capacity(512);
    out.extend_from_slice(mti.as_str().as_bytes());
    out.extend_from_slice(bitmap_hex.as_bytes());

    for field in MIN_FIELD..=tier.bit_count() as u16 {
        // Bit 65 at Tertiary announces the third block, not a payload.
        if tier == Tier::Tertiary && field == 65 {
            continue;
        }
        if !bitmap.is_set(field) {
            continue;
        }

        let rule = spec
            .field(field)
            .ok_or(MarshalError::MissingFieldSpec(field))?;
        let value = fields.get(&field).cloned().unwrap_or_default();
        append_payload(&mut out, field, rule, &value)?;
    }

    Ok(out)
}

/// Append one field payload (prefix + value, or padded value) to `buf`.
fn append_payload(
    buf: &mut Vec<u8>,
    field: u16,
    rule: &FieldSpec,
    value: &str,
) -> Result<(), MarshalError> {
    if value.len() > rule.max_len {
        return Err(MarshalError::FieldTooLong {
            field,
            max: rule.max_len,
            actual: value.len(),
        });
    }

    match rule.length.prefix_width() {
        None => {
            let padded = match rule.content {
                ContentClass::Numeric => left_pad(value, rule.max_len, '0'),
                ContentClass::Other => right_pad(value, rule.max_len, ' '),
            };
            buf.extend_from_slice(padded.as_bytes());
        }
        Some(width) => {
            let prefix = format!("{:0width$}", value.len());
            buf.extend_from_slice(prefix.as_bytes());
            buf.extend_from_slice(value.as_bytes());
        }
    }

    Ok(())
}

/// Left-pad `s` with `pad` up to `len` characters. Values already at or
/// beyond `len` are returned unchanged, never truncated.
#[inline(always)]
fn left_pad(s: &str, len: usize, pad: char) -> String {
    if s.len() >= len {
        return s.to_string();
    }
    let mut padded = String::with_capacity(len);
    for _ in 0..len - s.len() {
        padded.push(pad);
    }
    padded.push_str(s);
    padded
}

/// Right-pad `s` with `pad` up to `len` characters. Values already at or
/// beyond `len` are returned unchanged, never truncated.
#[inline(always)]
fn right_pad(s: &str, len: usize, pad: char) -> String {
    let mut padded = String::with_capacity(len.max(s.len()));
    padded.push_str(s);
    while padded.len() < len {
        padded.push(pad);
    }
    padded
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::LengthClass;
    use std::collections::HashMap;

    fn spec_fields_3_4() -> MessageSpec {
        let mut fields = HashMap::new();
        fields.insert(3, FieldSpec::fixed(ContentClass::Numeric, 6, "Processing Code"));
        fields.insert(4, FieldSpec::fixed(ContentClass::Numeric, 12, "Amount, Transaction"));
        MessageSpec::new(fields).expect("valid spec")
    }

    fn marshal_with(
        spec: &MessageSpec,
        mti: &str,
        values: &[(u16, &str)],
    ) -> Result<String, MarshalError> {
        let mti = Mti::new(mti).expect("valid MTI");
        let bitmap = BitmapEngine::new();
        let store = FieldStore::new();
        for &(field, value) in values {
            store.set(field, value);
        }
        let bytes = marshal(spec, &mti, &bitmap, &store)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn test_marshal_fixed_numeric_fields() {
        let wire = marshal_with(&spec_fields_3_4(), "0200", &[(3, "100700"), (4, "1500")])
            .expect("should marshal");
        assert_eq!(wire, "02003000000000000000100700000000001500");
    }

    #[test]
    fn test_marshal_llvar_field() {
        let mut fields = HashMap::new();
        fields.insert(
            11,
            FieldSpec::var(LengthClass::LlVar, ContentClass::Numeric, 20, "System Trace"),
        );
        let spec = MessageSpec::new(fields).expect("valid spec");

        let wire = marshal_with(&spec, "0200", &[(11, "23edfr")]).expect("should marshal");
        assert_eq!(wire, "020000200000000000000623edfr");
    }

    #[test]
    fn test_marshal_lllvar_and_llllvar_prefix_widths() {
        let mut fields = HashMap::new();
        fields.insert(
            47,
            FieldSpec::var(LengthClass::LllVar, ContentClass::Other, 999, "Reserved"),
        );
        fields.insert(
            48,
            FieldSpec::var(LengthClass::LlllVar, ContentClass::Other, 9999, "Additional Data"),
        );
        let spec = MessageSpec::new(fields).expect("valid spec");

        let wire = marshal_with(&spec, "0200", &[(47, "147"), (48, "12345")])
            .expect("should marshal");
        // Bits 47 and 48 share byte 5 of the primary block (0x03).
        assert_eq!(wire, "02000000000000030000003147000512345");
    }

    #[test]
    fn test_marshal_fixed_other_right_pads_with_spaces() {
        let mut fields = HashMap::new();
        fields.insert(43, FieldSpec::fixed(ContentClass::Other, 8, "Card Acceptor"));
        let spec = MessageSpec::new(fields).expect("valid spec");

        let wire = marshal_with(&spec, "0200", &[(43, "43")]).expect("should marshal");
        assert_eq!(wire, "0200000000000020000043      ");
    }

    #[test]
    fn test_marshal_value_at_max_len_is_unpadded() {
        let wire = marshal_with(&spec_fields_3_4(), "0200", &[(3, "100700")])
            .expect("should marshal");
        assert_eq!(wire, "02002000000000000000100700");
    }

    #[test]
    fn test_marshal_rejects_over_length_value() {
        let result = marshal_with(&spec_fields_3_4(), "0200", &[(3, "1007001")]);
        assert_eq!(
            result,
            Err(MarshalError::FieldTooLong { field: 3, max: 6, actual: 7 }),
        );
    }

    #[test]
    fn test_marshal_missing_field_spec() {
        let result = marshal_with(&spec_fields_3_4(), "0200", &[(3, "100700"), (7, "1")]);
        assert_eq!(result, Err(MarshalError::MissingFieldSpec(7)));
    }

    #[test]
    fn test_marshal_tertiary_emits_three_blocks_and_skips_field_65() {
        let mut fields = HashMap::new();
        fields.insert(3, FieldSpec::fixed(ContentClass::Numeric, 6, "Processing Code"));
        fields.insert(131, FieldSpec::fixed(ContentClass::Numeric, 4, "Reserved"));
        let spec = MessageSpec::new(fields).expect("valid spec");

        let wire = marshal_with(&spec, "0200", &[(3, "100700"), (131, "42")])
            .expect("should marshal");
        // 52 header chars: MTI + 48 hex chars with bits 1, 3, 65 and 131 set.
        assert_eq!(
            wire,
            "0200a000000000000000800000000000000020000000000000001007000042",
        );
    }

    #[test]
    fn test_marshal_empty_message_is_header_only() {
        let wire = marshal_with(&spec_fields_3_4(), "0800", &[]).expect("should marshal");
        assert_eq!(wire, "08000000000000000000");
    }

    #[test]
    fn test_left_pad() {
        assert_eq!(left_pad("1500", 12, '0'), "000000001500");
        assert_eq!(left_pad("123456", 6, '0'), "123456");
        assert_eq!(left_pad("1234567", 6, '0'), "1234567");
    }

    #[test]
    fn test_right_pad() {
        assert_eq!(right_pad("43", 5, ' '), "43   ");
        assert_eq!(right_pad("hello", 5, ' '), "hello");
        assert_eq!(right_pad("hello!", 5, ' '), "hello!");
    }
}
