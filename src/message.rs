/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! ISO 8583 message representation.
//!
//! An [`IsoMessage`] owns the four parts of one message: a shared read-only
//! [`MessageSpec`], the [`Mti`], the presence [`BitmapEngine`], and the
//! [`FieldStore`]. Encode and decode go through [`IsoMessage::marshal`] and
//! [`IsoMessage::unmarshal`], which delegate to [`crate::builder`] and
//! [`crate::parser`].
//!
//! Field setters take `&self` and are safe to call from multiple threads
//! populating *distinct* fields before a single marshal. Concurrent writes
//! to the same field are last-writer-wins. Marshal/unmarshal themselves
//! must not race with field mutation; callers serialize those phases.
//!
//! Fields 0, 1, and 65 are never set by callers: the MTI and bitmap are
//! generated by the codec, and bit 65 is the tertiary continuation marker,
//! which announces the third bitmap block and never carries a payload.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bitmap::{BitmapEngine, BitmapError, Tier, MIN_FIELD};
use crate::builder::{self, MarshalError};
use crate::mti::{Mti, MtiError};
use crate::parser::{self, ParseError};
use crate::spec::MessageSpec;
use crate::store::FieldStore;

/// A single ISO 8583 message: MTI + bitmap + field values, bound to a
/// field specification.
#[derive(Debug)]
pub struct IsoMessage {
    spec: Arc<MessageSpec>,
    mti: Mti,
    bitmap: BitmapEngine,
    store: FieldStore,
}

impl IsoMessage {
    /// Create an empty message bound to a shared specification.
    ///
    /// The specification was validated at its own construction; building a
    /// message from it cannot fail.
    pub fn new(spec: Arc<MessageSpec>) -> Self {
        Self {
            spec,
            mti: Mti::default(),
            bitmap: BitmapEngine::new(),
            store: FieldStore::new(),
        }
    }

    /// Create an empty message taking ownership of a specification.
    ///
    /// Convenience over [`IsoMessage::new`] when the spec is not shared.
    pub fn from_spec(spec: MessageSpec) -> Self {
        Self::new(Arc::new(spec))
    }

    /// The specification this message encodes and decodes against.
    #[inline(always)]
    pub fn spec(&self) -> &MessageSpec {
        &self.spec
    }

    /// Validate and set the MTI.
    pub fn set_mti(&mut self, mti: &str) -> Result<(), MtiError> {
        self.mti = Mti::new(mti)?;
        Ok(())
    }

    /// The current MTI value (empty if never set).
    #[inline(always)]
    pub fn mti(&self) -> &str {
        self.mti.as_str()
    }

    /// The current bitmap tier.
    #[inline(always)]
    pub fn tier(&self) -> Tier {
        self.bitmap.tier()
    }

    /// Set a field value, marking its bitmap bit and escalating the tier
    /// when the field number demands it.
    ///
    /// Fails with [`BitmapError::FieldOutOfRange`] unless
    /// 2 ≤ `field` ≤ 192, and with [`BitmapError::ContinuationField`] for
    /// field 65, which is the tertiary continuation marker. Takes `&self`:
    /// distinct fields may be set from parallel threads.
    pub fn set_field(&self, field: u16, value: &str) -> Result<(), BitmapError> {
        self.bitmap.mark_present(field)?;
        self.store.set(field, value);
        Ok(())
    }

    /// The value of a field, or `None` if it is not populated.
    ///
    /// Fails with [`BitmapError::FieldOutOfRange`] when the field number is
    /// outside the bitmap range of the current tier.
    pub fn field(&self, field: u16) -> Result<Option<String>, BitmapError> {
        let max = self.bitmap.tier().bit_count() as u16;
        if !(MIN_FIELD..=max).contains(&field) {
            return Err(BitmapError::FieldOutOfRange { field, min: MIN_FIELD, max });
        }
        Ok(self.store.get(field))
    }

    /// A point-in-time copy of all populated fields.
    #[inline(always)]
    pub fn fields(&self) -> HashMap<u16, String> {
        self.store.snapshot()
    }

    /// Serialize the message to its wire byte stream.
    ///
    /// See [`crate::builder`] for the build flow and error conditions.
    pub fn marshal(&self) -> Result<Vec<u8>, MarshalError> {
        builder::marshal(&self.spec, &self.mti, &self.bitmap, &self.store)
    }

    /// Serialize the message to its wire stream as a `String`.
    ///
    /// Identical content to [`IsoMessage::marshal`], character form.
    pub fn marshal_string(&self) -> Result<String, MarshalError> {
        let bytes = self.marshal()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Parse a wire byte stream into this message, replacing the MTI,
    /// bitmap, and field values wholesale.
    ///
    /// On failure the message should be treated as indeterminate and
    /// discarded or re-parsed. (This implementation parses into fresh state
    /// and swaps on success, but callers must not rely on that.)
    pub fn unmarshal(&mut self, input: &[u8]) -> Result<(), ParseError> {
        let parsed = parser::parse(&self.spec, input)?;
        self.mti = parsed.mti;
        self.bitmap = parsed.bitmap;
        self.store = parsed.store;
        Ok(())
    }

    /// Parse a wire stream supplied as a string slice.
    ///
    /// Identical semantics to [`IsoMessage::unmarshal`].
    #[inline(always)]
    pub fn unmarshal_str(&mut self, input: &str) -> Result<(), ParseError> {
        self.unmarshal(input.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
