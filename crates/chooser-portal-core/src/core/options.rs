// crates/chooser-portal-core/src/core/options.rs
// ============================================================================
// Module: Chooser Portal Compound Options
// Description: Typed filter-group and choice models with their wire types.
// Purpose: Give validated compound options a strongly typed representation.
// Dependencies: crate::core::variant
// ============================================================================

//! ## Overview
//! File choosers accept two compound options: `filters` (named groups of glob
//! or content-type patterns, wire type `a(sa(us))`) and `choices` (labeled
//! selectable options with a current value, wire type `a(ssa(ss)s)`). This
//! module defines their typed forms and the conversions to wire values.
//! Validation lives in [`crate::validation`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::variant::Variant;
use crate::core::variant::VariantArray;
use crate::core::variant::VariantType;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Returns the wire type of one filter pattern: `(us)`.
#[must_use]
pub fn filter_pattern_type() -> VariantType {
    VariantType::tuple([VariantType::Uint32, VariantType::Str])
}

/// Returns the wire type of one filter group: `(sa(us))`.
#[must_use]
pub fn filter_group_type() -> VariantType {
    VariantType::tuple([VariantType::Str, VariantType::array(filter_pattern_type())])
}

/// Returns the wire type of a filter list: `a(sa(us))`.
#[must_use]
pub fn filters_type() -> VariantType {
    VariantType::array(filter_group_type())
}

/// Returns the wire type of one choice option: `(ss)`.
#[must_use]
pub fn choice_option_type() -> VariantType {
    VariantType::tuple([VariantType::Str, VariantType::Str])
}

/// Returns the wire type of one choice: `(ssa(ss)s)`.
#[must_use]
pub fn choice_type() -> VariantType {
    VariantType::tuple([
        VariantType::Str,
        VariantType::Str,
        VariantType::array(choice_option_type()),
        VariantType::Str,
    ])
}

/// Returns the wire type of a choice list: `a(ssa(ss)s)`.
#[must_use]
pub fn choices_type() -> VariantType {
    VariantType::array(choice_type())
}

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Pattern kind inside a filter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Shell glob pattern such as `*.png` (wire value `0`).
    Glob,
    /// Content type such as `image/png` (wire value `1`).
    Mime,
}

impl FilterKind {
    /// Returns the filter kind for a wire value.
    #[must_use]
    pub const fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Glob),
            1 => Some(Self::Mime),
            _ => None,
        }
    }

    /// Returns the wire value for the filter kind.
    #[must_use]
    pub const fn wire_value(self) -> u32 {
        match self {
            Self::Glob => 0,
            Self::Mime => 1,
        }
    }
}

/// One pattern of a filter group.
///
/// # Invariants
/// - `pattern` is non-empty once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPattern {
    /// Pattern kind.
    pub kind: FilterKind,
    /// Pattern text.
    pub pattern: String,
}

impl FilterPattern {
    /// Creates a glob pattern.
    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Glob,
            pattern: pattern.into(),
        }
    }

    /// Creates a content-type pattern.
    #[must_use]
    pub fn mime(pattern: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Mime,
            pattern: pattern.into(),
        }
    }

    /// Converts the pattern into its `(us)` wire value.
    #[must_use]
    pub fn to_variant(&self) -> Variant {
        Variant::tuple([
            Variant::Uint32(self.kind.wire_value()),
            Variant::Str(self.pattern.clone()),
        ])
    }
}

/// Named group of filter patterns.
///
/// # Invariants
/// - `name` and `patterns` are non-empty once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
    /// User-visible group name.
    pub name: String,
    /// Ordered patterns.
    pub patterns: Vec<FilterPattern>,
}

impl FilterGroup {
    /// Creates a filter group.
    #[must_use]
    pub fn new(name: impl Into<String>, patterns: Vec<FilterPattern>) -> Self {
        Self {
            name: name.into(),
            patterns,
        }
    }

    /// Converts the group into its `(sa(us))` wire value.
    #[must_use]
    pub fn to_variant(&self) -> Variant {
        Variant::tuple([
            Variant::Str(self.name.clone()),
            typed_array(filter_pattern_type(), self.patterns.iter().map(FilterPattern::to_variant)),
        ])
    }

    /// Converts a list of groups into an `a(sa(us))` wire value.
    #[must_use]
    pub fn list_to_variant(groups: &[Self]) -> Variant {
        typed_array(filter_group_type(), groups.iter().map(Self::to_variant))
    }
}

// ============================================================================
// SECTION: Choices
// ============================================================================

/// One selectable option of a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Option identifier.
    pub id: String,
    /// User-visible label.
    pub label: String,
}

impl ChoiceOption {
    /// Creates a choice option.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Converts the option into its `(ss)` wire value.
    #[must_use]
    pub fn to_variant(&self) -> Variant {
        Variant::tuple([Variant::Str(self.id.clone()), Variant::Str(self.label.clone())])
    }
}

/// Labeled choice presented alongside the file chooser.
///
/// # Invariants
/// - With no options the choice is boolean; `current` is `""`, `"true"` or `"false"`.
/// - With options, `current` is empty or one of the option ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Choice identifier.
    pub id: String,
    /// User-visible label.
    pub label: String,
    /// Ordered options; empty for boolean choices.
    pub options: Vec<ChoiceOption>,
    /// Currently selected option id (or boolean literal).
    pub current: String,
}

impl Choice {
    /// Creates a choice.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        options: Vec<ChoiceOption>,
        current: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            options,
            current: current.into(),
        }
    }

    /// Converts the choice into its `(ssa(ss)s)` wire value.
    #[must_use]
    pub fn to_variant(&self) -> Variant {
        Variant::tuple([
            Variant::Str(self.id.clone()),
            Variant::Str(self.label.clone()),
            typed_array(choice_option_type(), self.options.iter().map(ChoiceOption::to_variant)),
            Variant::Str(self.current.clone()),
        ])
    }

    /// Converts a list of choices into an `a(ssa(ss)s)` wire value.
    #[must_use]
    pub fn list_to_variant(choices: &[Self]) -> Variant {
        typed_array(choice_type(), choices.iter().map(Self::to_variant))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an array whose items are produced by a matching `to_variant` helper.
fn typed_array(element: VariantType, items: impl Iterator<Item = Variant>) -> Variant {
    Variant::Array(VariantArray::from_trusted(element, items.collect()))
}
