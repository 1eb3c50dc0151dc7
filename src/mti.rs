/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Message Type Indicator (MTI).
//!
//! The MTI is the first four characters of every ISO 8583 message and
//! classifies it (e.g. `"0200"` for a financial request, `"0210"` for its
//! response). The codec treats the value as opaque: it only enforces the
//! structural rule of exactly four decimal digits.
//!
//! Extraction and validation are separate steps so that a message whose
//! header is long enough but malformed (`"02x0"`) reports
//! [`MtiError::NotNumeric`] rather than a truncation error.

use thiserror::Error;

/// Number of characters in an MTI.
pub const MTI_LEN: usize = 4;

/// Errors from MTI validation and extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtiError {
    /// The value does not have exactly four characters.
    #[error("MTI must be {MTI_LEN} characters, found {0}")]
    InvalidLength(usize),
    /// The value contains a character outside `0-9`.
    #[error("MTI can only contain decimal digits")]
    NotNumeric,
}

/// A message type indicator value.
///
/// A default-constructed `Mti` is empty and fails [`Mti::validate`]; the
/// value is set through [`crate::IsoMessage::set_mti`] or extracted from an
/// incoming stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mti(String);

impl Mti {
    /// Create an MTI from a string, validating it first.
    pub fn new(value: &str) -> Result<Self, MtiError> {
        let mti = Mti(value.to_string());
        mti.validate()?;
        Ok(mti)
    }

    /// Take the first four bytes of `input` verbatim, without validating
    /// their content.
    ///
    /// Fails with [`MtiError::InvalidLength`] only when fewer than four
    /// bytes are available. Call [`Mti::validate`] afterwards to check the
    /// digits.
    pub fn extract(input: &[u8]) -> Result<Self, MtiError> {
        if input.len() < MTI_LEN {
            return Err(MtiError::InvalidLength(input.len()));
        }
        Ok(Mti(String::from_utf8_lossy(&input[..MTI_LEN]).into_owned()))
    }

    /// Check that the value is exactly four decimal digits.
    pub fn validate(&self) -> Result<(), MtiError> {
        if self.0.len() != MTI_LEN {
            return Err(MtiError::InvalidLength(self.0.len()));
        }
        if !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MtiError::NotNumeric);
        }
        Ok(())
    }

    /// The MTI as a string slice (empty if never set).
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let mti = Mti::new("0200").expect("valid MTI");
        assert_eq!(mti.as_str(), "0200");
    }

    #[test]
    fn test_new_too_short() {
        assert_eq!(Mti::new("020"), Err(MtiError::InvalidLength(3)));
    }

    #[test]
    fn test_new_too_long() {
        assert_eq!(Mti::new("02000"), Err(MtiError::InvalidLength(5)));
    }

    #[test]
    fn test_new_non_numeric() {
        assert_eq!(Mti::new("02x0"), Err(MtiError::NotNumeric));
    }

    #[test]
    fn test_new_rejects_signed_value() {
        // "+200" parses as an integer but is not four digits.
        assert_eq!(Mti::new("+200"), Err(MtiError::NotNumeric));
    }

    #[test]
    fn test_extract_takes_first_four_bytes() {
        let mti = Mti::extract(b"0800rest of the message").expect("long enough");
        assert_eq!(mti.as_str(), "0800");
        assert!(mti.validate().is_ok());
    }

    #[test]
    fn test_extract_does_not_validate_content() {
        let mti = Mti::extract(b"ab12...").expect("long enough");
        assert_eq!(mti.as_str(), "ab12");
        assert_eq!(mti.validate(), Err(MtiError::NotNumeric));
    }

    #[test]
    fn test_extract_too_short() {
        assert_eq!(Mti::extract(b"02"), Err(MtiError::InvalidLength(2)));
    }

    #[test]
    fn test_default_is_empty_and_invalid() {
        let mti = Mti::default();
        assert_eq!(mti.as_str(), "");
        assert_eq!(mti.validate(), Err(MtiError::InvalidLength(0)));
    }
}
