/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Presence bitmap state machine.
//!
//! An ISO 8583 message carries up to three 64-bit bitmap blocks announcing
//! which fields follow the header. [`BitmapEngine`] owns that state for one
//! message: which bits are set and which [`Tier`] the message has reached.
//!
//! ## Tiers
//!
//! | tier      | fields  | bitmap size | wire hex chars |
//! |-----------|---------|-------------|----------------|
//! | Primary   | 1–64    | 64 bits     | 16             |
//! | Secondary | 65–128  | 128 bits    | 32             |
//! | Tertiary  | 129–192 | 192 bits    | 48             |
//!
//! The tier escalates the first time a field in a higher range is marked
//! present and never comes back down within a message lifecycle. Bit 1 of a
//! block is the continuation bit: when set, another block follows. The
//! engine forces bit 1 (and bit 65 at Tertiary) whenever the tier requires
//! them.
//!
//! ## Wire indexing
//!
//! Bitmaps are transmitted MSB-first per byte: the bit for 1-based field
//! `i` lives at byte `(i-1)/8`, bit `7 - ((i-1) % 8)`.

use parking_lot::Mutex;
use thiserror::Error;

use crate::bitconv::{self, BitConvError};

/// Lowest field number a caller may set (0 is the MTI, 1 the bitmap).
pub const MIN_FIELD: u16 = 2;

/// Highest field number representable in a tertiary bitmap.
pub const MAX_FIELD: u16 = 192;

/// Errors from bitmap field access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BitmapError {
    /// The field number is outside the valid range for the operation.
    #[error("expected field to be between {min} and {max}, found {field} instead")]
    FieldOutOfRange {
        /// The offending field number.
        field: u16,
        /// Lowest acceptable field number.
        min: u16,
        /// Highest acceptable field number.
        max: u16,
    },
    /// The field number is a bitmap continuation marker (65), which never
    /// carries a payload on the wire.
    #[error("field {0} is a bitmap continuation marker and cannot carry data")]
    ContinuationField(u16),
}

/// Bitmap tier: how many 64-bit blocks the message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Fields 1–64, one block.
    Primary,
    /// Fields 1–128, two blocks.
    Secondary,
    /// Fields 1–192, three blocks.
    Tertiary,
}

impl Tier {
    /// Number of bits in the full bitmap at this tier (64/128/192).
    #[inline(always)]
    pub fn bit_count(self) -> usize {
        match self {
            Tier::Primary => 64,
            Tier::Secondary => 128,
            Tier::Tertiary => 192,
        }
    }

    /// Total message header length at this tier: 4 MTI characters plus
    /// 16 hex characters per bitmap block (20/36/52).
    #[inline(always)]
    pub fn header_len(self) -> usize {
        4 + self.bit_count() / 4
    }

    /// The tier a single field number demands: ≥129 needs Tertiary, ≥65
    /// needs Secondary, anything lower fits in Primary.
    #[inline(always)]
    pub fn for_field(field: u16) -> Self {
        if field >= 129 {
            Tier::Tertiary
        } else if field >= 65 {
            Tier::Secondary
        } else {
            Tier::Primary
        }
    }

    /// Decode the tier from wire continuation bits: the top bit of the
    /// primary block announces a secondary block, and the top bit of the
    /// secondary block announces a tertiary block.
    #[inline(always)]
    pub fn from_wire(primary_top: bool, secondary_top: bool) -> Self {
        match (primary_top, secondary_top) {
            (false, _) => Tier::Primary,
            (true, false) => Tier::Secondary,
            (true, true) => Tier::Tertiary,
        }
    }
}

/// Test the wire bit for a 1-based field number in decoded bitmap bytes.
///
/// MSB-first per byte: field `i` is byte `(i-1)/8`, bit `7 - ((i-1) % 8)`.
/// Fields beyond the supplied bytes read as unset.
#[inline(always)]
pub(crate) fn wire_bit(bytes: &[u8], field: u16) -> bool {
    let index = (field - 1) as usize;
    match bytes.get(index / 8) {
        Some(byte) => byte & (1 << (7 - (index % 8))) != 0,
        None => false,
    }
}

#[derive(Debug)]
struct BitmapState {
    tier: Tier,
    /// One element per field 1..=192, value 0 or 1.
    bits: [u8; MAX_FIELD as usize],
}

impl BitmapState {
    fn new() -> Self {
        Self {
            tier: Tier::Primary,
            bits: [0; MAX_FIELD as usize],
        }
    }

    /// Raise the tier (never lowers it) and force the continuation bits the
    /// new tier requires: bit 1 at Secondary and above, bit 65 at Tertiary.
    fn escalate(&mut self, tier: Tier) {
        self.tier = self.tier.max(tier);
        if self.tier >= Tier::Secondary {
            self.bits[0] = 1;
        }
        if self.tier == Tier::Tertiary {
            self.bits[64] = 1;
        }
    }
}

/// Presence bitmap for one message.
///
/// Interior mutability (a [`Mutex`] around the tier and bits) lets field
/// setters run through `&self` next to the field store, so parallel
/// producers can mark distinct fields concurrently.
#[derive(Debug)]
pub struct BitmapEngine {
    state: Mutex<BitmapState>,
}

impl Default for BitmapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmapEngine {
    /// Create an empty Primary-tier bitmap.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BitmapState::new()),
        }
    }

    /// Mark a field present, escalating the tier when the field number
    /// demands it.
    ///
    /// Fails with [`BitmapError::FieldOutOfRange`] unless
    /// `MIN_FIELD ≤ field ≤ MAX_FIELD`, and with
    /// [`BitmapError::ContinuationField`] for field 65: on the wire, bit 65
    /// announces the tertiary block and never maps to a payload, so it is
    /// only ever set through [`BitmapEngine::escalate`].
    pub fn mark_present(&self, field: u16) -> Result<(), BitmapError> {
        if !(MIN_FIELD..=MAX_FIELD).contains(&field) {
            return Err(BitmapError::FieldOutOfRange {
                field,
                min: MIN_FIELD,
                max: MAX_FIELD,
            });
        }
        if field == 65 {
            return Err(BitmapError::ContinuationField(field));
        }

        let mut state = self.state.lock();
        state.escalate(Tier::for_field(field));
        state.bits[(field - 1) as usize] = 1;
        Ok(())
    }

    /// Raise the tier explicitly, without marking any field.
    ///
    /// Used when decoding a wire bitmap whose continuation bits declare a
    /// tier that no populated field would otherwise demand. Monotonic: a
    /// lower tier than the current one is a no-op.
    pub fn escalate(&self, tier: Tier) {
        self.state.lock().escalate(tier);
    }

    /// The current tier.
    #[inline(always)]
    pub fn tier(&self) -> Tier {
        self.state.lock().tier
    }

    /// Whether the bit for a 1-based field number is set. Out-of-range
    /// field numbers read as unset.
    pub fn is_set(&self, field: u16) -> bool {
        if field == 0 || field > MAX_FIELD {
            return false;
        }
        self.state.lock().bits[(field - 1) as usize] == 1
    }

    /// The bitmap resized to exactly the tier's bit count (64/128/192),
    /// with continuation bits forced.
    pub fn wire_bits(&self) -> Vec<u8> {
        let state = self.state.lock();
        state.bits[..state.tier.bit_count()].to_vec()
    }

    /// The bitmap in its wire hex representation (16/32/48 characters).
    pub fn to_wire_hex(&self) -> Result<String, BitConvError> {
        bitconv::bit_array_to_hex(&self.wire_bits())
    }

    /// Clear all bits and return to the Primary tier.
    pub fn reset(&self) {
        *self.state.lock() = BitmapState::new();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
