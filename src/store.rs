/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Concurrency-safe field value storage.
//!
//! A [`FieldStore`] holds the field-number → value map for one message,
//! guarded by an [`RwLock`] so that parallel producers can populate
//! distinct fields before a single marshal call. Concurrent writes to the
//! *same* field are last-writer-wins; no ordering is guaranteed between
//! same-key writers.
//!
//! Each store belongs to exactly one message and is never shared across
//! messages.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Field-number → value map for a single message.
#[derive(Debug, Default)]
pub struct FieldStore {
    values: RwLock<HashMap<u16, String>>,
}

impl FieldStore {
    /// Create an empty store.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) the value for a field.
    #[inline(always)]
    pub fn set(&self, field: u16, value: &str) {
        self.values.write().insert(field, value.to_string());
    }

    /// The value for a field, cloned out of the lock, or `None` if unset.
    #[inline(always)]
    pub fn get(&self, field: u16) -> Option<String> {
        self.values.read().get(&field).cloned()
    }

    /// A point-in-time copy of the whole map.
    #[inline(always)]
    pub fn snapshot(&self) -> HashMap<u16, String> {
        self.values.read().clone()
    }

    /// Number of populated fields.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether no field is populated.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
