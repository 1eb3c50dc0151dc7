/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! ISO 8583 wire-format parser.
//!
//! Parses a raw message buffer into MTI, bitmap, and field values.
//!
//! ## Parsing Rules
//!
//! 1. The first 4 characters are the MTI; it must be four decimal digits.
//! 2. The next 16 characters are the primary bitmap as hex (8 bytes).
//! 3. If the primary block's top bit is set, 16 more hex characters follow
//!    as the secondary bitmap block; if *that* block's top bit is also set,
//!    a further 16 characters form the tertiary block.
//! 4. The remaining bytes are field payloads in ascending field-number
//!    order, one per set bitmap bit: fixed-length fields occupy exactly
//!    `max_len` bytes, variable-length fields a 2/3/4-digit decimal length
//!    prefix followed by that many bytes.
//! 5. A variable length declared by the wire is trusted up to the buffer
//!    boundary; `max_len` is an encode-time constraint and is not
//!    re-checked here.
//! 6. Payload bytes must be valid UTF-8; field values are stored as text.
//!
//! Every structural violation fails the whole call with a distinct
//! [`ParseError`]; no partial message is ever produced.

use thiserror::Error;

use crate::bitmap::{wire_bit, BitmapEngine, BitmapError, Tier, MIN_FIELD};
use crate::mti::{Mti, MtiError};
use crate::spec::MessageSpec;
use crate::store::FieldStore;

/// Errors that can occur while parsing a message.
///
/// Not `Eq`: [`hex::FromHexError`] only implements `PartialEq`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The input is shorter than the 20-character minimum header
    /// (MTI + primary bitmap).
    #[error("iso message too short")]
    MessageTooShort,
    /// A bitmap block is not valid hex.
    #[error("invalid bitmap hex: {0}")]
    InvalidBitmapHex(#[from] hex::FromHexError),
    /// The primary block declares a secondary bitmap but fewer than 36
    /// characters exist.
    #[error("data too short for secondary bitmap")]
    SecondaryBitmapTooShort,
    /// The secondary block declares a tertiary bitmap but fewer than 52
    /// characters exist.
    #[error("data too short for tertiary bitmap")]
    TertiaryBitmapTooShort,
    /// The MTI failed validation.
    #[error(transparent)]
    Mti(#[from] MtiError),
    /// The bitmap marks a field with no specification entry.
    #[error("no field spec for field {0}")]
    MissingFieldSpec(u16),
    /// A variable-length prefix extends past the end of the buffer.
    #[error("field {field}: {width}-digit length prefix too short")]
    PrefixTooShort {
        /// The field whose prefix was being read.
        field: u16,
        /// Expected prefix width in digits.
        width: usize,
    },
    /// A variable-length prefix is not an unsigned decimal integer.
    #[error("field {field}: length prefix is not an integer")]
    PrefixNotInteger {
        /// The field whose prefix was being read.
        field: u16,
    },
    /// A payload (fixed or declared) extends past the end of the buffer.
    #[error("field {field}: value too short")]
    ValueTooShort {
        /// The field whose payload was being read.
        field: u16,
    },
    /// A payload contains bytes that are not valid UTF-8.
    #[error("field {field}: value is not valid text")]
    ValueNotText {
        /// The field whose payload was being read.
        field: u16,
    },
    /// A marked field number is outside the bitmap range.
    #[error(transparent)]
    Bitmap(#[from] BitmapError),
}

/// Freshly parsed message state, ready to replace a message's previous
/// mti/bitmap/store wholesale.
#[derive(Debug)]
pub(crate) struct Parsed {
    pub mti: Mti,
    pub bitmap: BitmapEngine,
    pub store: FieldStore,
}

/// Parse a raw ISO 8583 message buffer against a field specification.
///
/// Works directly on the input `&[u8]`; only the owned field values written
/// into the returned store allocate.
pub(crate) fn parse(spec: &MessageSpec, input: &[u8]) -> Result<Parsed, ParseError> {
    if input.len() < Tier::Primary.header_len() {
        return Err(ParseError::MessageTooShort);
    }

    let mti = Mti::extract(input)?;
    mti.validate()?;

    // --- Bitmap blocks: primary, then continuation-declared blocks ---
    let mut blocks = hex::decode(&input[4..20])?;
    if wire_bit(&blocks, 1) {
        if input.len() < Tier::Secondary.header_len() {
            return Err(ParseError::SecondaryBitmapTooShort);
        }
        blocks.extend(hex::decode(&input[20..36])?);

        if wire_bit(&blocks, 65) {
            if input.len() < Tier::Tertiary.header_len() {
                return Err(ParseError::TertiaryBitmapTooShort);
            }
            blocks.extend(hex::decode(&input[36..52])?);
        }
    }
    let tier = Tier::from_wire(wire_bit(&blocks, 1), wire_bit(&blocks, 65));

    let bitmap = BitmapEngine::new();
    bitmap.escalate(tier);
    let store = FieldStore::new();

    // --- Field walk: consume payloads for every set bit ---
    let body = &input[tier.header_len()..];
    let mut pos = 0usize;

    for field in MIN_FIELD..=tier.bit_count() as u16 {
        // Bit 65 at Tertiary announces the third block, not a payload.
        if tier == Tier::Tertiary && field == 65 {
            continue;
        }
        if !wire_bit(&blocks, field) {
            continue;
        }

        let rule = spec
            .field(field)
            .ok_or(ParseError::MissingFieldSpec(field))?;

        let len = match rule.length.prefix_width() {
            None => rule.max_len,
            Some(width) => {
                if pos + width > body.len() {
                    return Err(ParseError::PrefixTooShort { field, width });
                }
                let declared = parse_decimal(&body[pos..pos + width])
                    .ok_or(ParseError::PrefixNotInteger { field })?;
                pos += width;
                declared
            }
        };

        if pos + len > body.len() {
            return Err(ParseError::ValueTooShort { field });
        }

        let value = std::str::from_utf8(&body[pos..pos + len])
            .map_err(|_| ParseError::ValueNotText { field })?;
        bitmap.mark_present(field)?;
        store.set(field, value);
        pos += len;
    }

    Ok(Parsed { mti, bitmap, store })
}

/// Parse a decimal `usize` from ASCII digit bytes (used for length
/// prefixes). Returns `None` if the slice is empty, contains non-digit
/// bytes, or would overflow. No allocation is performed.
#[inline(always)]
fn parse_decimal(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        n = n.checked_mul(10)?.checked_add((b - b'0') as usize)?;
    }
    Some(n)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
