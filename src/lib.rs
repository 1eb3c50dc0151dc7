/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! # ALICE-ISO8583
//!
//! ISO 8583 financial message codec for the ALICE financial system:
//! MTI handling, tiered presence bitmaps (primary/secondary/tertiary),
//! and fixed/LLVAR/LLLVAR/LLLLVAR field packing against a caller-supplied
//! field specification.
//!
//! ## Modules
//!
//! - [`bitconv`] — Hex ↔ bit-array/bit-string conversions
//! - [`spec`]    — [`FieldSpec`] / [`MessageSpec`] field rule types
//! - [`mti`]     — [`Mti`] message type indicator
//! - [`store`]   — [`FieldStore`] concurrency-safe field value map
//! - [`bitmap`]  — [`BitmapEngine`] / [`Tier`] presence bitmap state machine
//! - [`message`] — [`IsoMessage`] aggregate
//! - [`builder`] — Wire-format serializer (marshal)
//! - [`parser`]  — Wire-format parser (unmarshal)
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use alice_iso8583::{ContentClass, FieldSpec, IsoMessage, MessageSpec};
//!
//! let mut fields = HashMap::new();
//! fields.insert(3, FieldSpec::fixed(ContentClass::Numeric, 6, "Processing Code"));
//! fields.insert(4, FieldSpec::fixed(ContentClass::Numeric, 12, "Amount, Transaction"));
//! let spec = MessageSpec::new(fields).unwrap();
//!
//! let mut msg = IsoMessage::from_spec(spec.clone());
//! msg.set_mti("0200").unwrap();
//! msg.set_field(3, "100700").unwrap();
//! msg.set_field(4, "1500").unwrap();
//!
//! let wire = msg.marshal_string().unwrap();
//! assert_eq!(wire, "02003000000000000000100700000000001500");
//!
//! let mut decoded = IsoMessage::from_spec(spec);
//! decoded.unmarshal_str(&wire).unwrap();
//! assert_eq!(decoded.mti(), "0200");
//! assert_eq!(decoded.field(4).unwrap(), Some("000000001500".to_string()));
//! ```

pub mod bitconv;
pub mod bitmap;
pub mod builder;
pub mod message;
pub mod mti;
pub mod parser;
pub mod spec;
pub mod store;

// Re-export the most commonly used types at the crate root.
pub use bitconv::BitConvError;
pub use bitmap::{BitmapEngine, BitmapError, Tier};
pub use builder::MarshalError;
pub use message::IsoMessage;
pub use mti::{Mti, MtiError};
pub use parser::ParseError;
pub use spec::{ContentClass, FieldSpec, LengthClass, MessageSpec, SpecError};
pub use store::FieldStore;

/// ALICE-ISO8583 crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
