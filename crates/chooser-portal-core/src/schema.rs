// crates/chooser-portal-core/src/schema.rs
// ============================================================================
// Module: Chooser Portal Option Schemas
// Description: Declared option allow-lists and the schema filter projection.
// Purpose: Forward only recognized, correctly typed options to the backend.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Each operation kind declares the option keys it recognizes together with
//! their expected wire types. [`filter_options`] projects a caller dictionary
//! onto such a schema: matching entries are copied, everything else is
//! silently dropped. This is allow-listing, not validation; semantic checks for
//! compound values happen earlier in [`crate::validation`].
//! Invariants:
//! - Filtering never fails and never copies a key absent from the schema.
//! - Copied values are byte-for-byte the caller's values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use crate::core::options::choices_type;
use crate::core::options::filters_type;
use crate::core::variant::VarDict;
use crate::core::variant::VariantType;

// ============================================================================
// SECTION: Schema Types
// ============================================================================

/// One recognized option key and its expected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionKey {
    /// Option key.
    pub key: &'static str,
    /// Expected wire type.
    pub expected: VariantType,
}

impl OptionKey {
    /// Creates a schema entry.
    #[must_use]
    pub const fn new(key: &'static str, expected: VariantType) -> Self {
        Self {
            key,
            expected,
        }
    }
}

/// Ordered set of recognized option keys for one operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSchema {
    /// Entries in declaration order.
    entries: Vec<OptionKey>,
}

impl OptionSchema {
    /// Creates a schema from its entries.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = OptionKey>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the schema entries.
    #[must_use]
    pub fn entries(&self) -> &[OptionKey] {
        &self.entries
    }

    /// Returns the expected type for `key` when it is recognized.
    #[must_use]
    pub fn expected_type(&self, key: &str) -> Option<&VariantType> {
        self.entries.iter().find(|entry| entry.key == key).map(|entry| &entry.expected)
    }
}

// ============================================================================
// SECTION: Declared Schemas
// ============================================================================

/// Options recognized by `OpenFile`.
static OPEN_FILE_OPTIONS: LazyLock<OptionSchema> = LazyLock::new(|| {
    OptionSchema::new([
        OptionKey::new("accept_label", VariantType::Str),
        OptionKey::new("modal", VariantType::Bool),
        OptionKey::new("multiple", VariantType::Bool),
        OptionKey::new("filters", filters_type()),
        OptionKey::new("choices", choices_type()),
    ])
});

/// Options recognized by `SaveFile`.
static SAVE_FILE_OPTIONS: LazyLock<OptionSchema> = LazyLock::new(|| {
    OptionSchema::new([
        OptionKey::new("accept_label", VariantType::Str),
        OptionKey::new("modal", VariantType::Bool),
        OptionKey::new("filters", filters_type()),
        OptionKey::new("current_name", VariantType::Str),
        OptionKey::new("current_folder", VariantType::array(VariantType::Byte)),
        OptionKey::new("current_file", VariantType::array(VariantType::Byte)),
        OptionKey::new("choices", choices_type()),
    ])
});

/// Returns the schema for `OpenFile` calls.
#[must_use]
pub fn open_file_schema() -> &'static OptionSchema {
    &OPEN_FILE_OPTIONS
}

/// Returns the schema for `SaveFile` calls.
#[must_use]
pub fn save_file_schema() -> &'static OptionSchema {
    &SAVE_FILE_OPTIONS
}

// ============================================================================
// SECTION: Schema Filter
// ============================================================================

/// Projects `raw` onto `schema`, dropping unknown and mistyped entries.
#[must_use]
pub fn filter_options(raw: &VarDict, schema: &OptionSchema) -> VarDict {
    schema
        .entries()
        .iter()
        .filter_map(|entry| {
            raw.lookup(entry.key, &entry.expected).map(|value| (entry.key.to_string(), value.clone()))
        })
        .collect()
}
