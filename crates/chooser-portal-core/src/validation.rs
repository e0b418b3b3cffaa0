// crates/chooser-portal-core/src/validation.rs
// ============================================================================
// Module: Chooser Portal Structural Validators
// Description: Semantic checks for the `filters` and `choices` option values.
// Purpose: Reject malformed compound options before a request is created.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Structural validators inspect the two compound option values that need
//! semantic checking. Each validator first checks the whole value against its
//! wire type, then walks entries in order and stops at the first offending
//! entry. Failures carry a composable reason chain built with
//! [`ValidationError::prefixed`], e.g.
//! `invalid filters: invalid filter: name is empty`.
//! Invariants:
//! - Validation never partially accepts a list.
//! - Successful validation returns the fully decoded typed list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::options::Choice;
use crate::core::options::ChoiceOption;
use crate::core::options::FilterGroup;
use crate::core::options::FilterKind;
use crate::core::options::FilterPattern;
use crate::core::options::choices_type;
use crate::core::options::filters_type;
use crate::core::variant::Variant;
use crate::core::variant::VariantType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Option key carrying filter groups.
pub const FILTERS_KEY: &str = "filters";
/// Option key carrying choices.
pub const CHOICES_KEY: &str = "choices";
/// Allowed `current` values for a choice without options.
const BOOLEAN_CHOICE_VALUES: [&str; 3] = ["", "true", "false"];

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Invalid-argument failure with a human-readable reason chain.
///
/// # Invariants
/// - The message is caller-visible; prefixes are prepended outermost-last.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    /// Creates a validation error with the provided reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// Returns the error with `prefix` prepended to its reason.
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        Self(format!("{prefix}{}", self.0))
    }

    /// Returns the full reason chain.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// SECTION: Type Checks
// ============================================================================

/// Checks that `value` has the expected wire type for `key`.
///
/// # Errors
///
/// Returns [`ValidationError`] naming the expected and actual signatures.
pub fn check_value_type(
    key: &str,
    value: &Variant,
    expected: &VariantType,
) -> Result<(), ValidationError> {
    if value.is_of_type(expected) {
        return Ok(());
    }
    Err(ValidationError::new(format!(
        "expected type for key {key} is {expected}, found {}",
        value.type_of()
    )))
}

// ============================================================================
// SECTION: Filter Validation
// ============================================================================

/// Validates an `a(sa(us))` filter list and decodes it.
///
/// # Errors
///
/// Returns [`ValidationError`] on a type mismatch or the first invalid group,
/// prefixed with `invalid filter: ` for group-level failures.
pub fn validate_filters(value: &Variant) -> Result<Vec<FilterGroup>, ValidationError> {
    check_value_type(FILTERS_KEY, value, &filters_type())?;
    let Some(groups) = value.as_array() else {
        return Err(shape_error(FILTERS_KEY));
    };
    groups
        .items()
        .iter()
        .map(|group| validate_filter(group).map_err(|err| err.prefixed("invalid filter: ")))
        .collect()
}

/// Validates one `(sa(us))` filter group.
fn validate_filter(group: &Variant) -> Result<FilterGroup, ValidationError> {
    let (name, patterns) = match group.as_tuple() {
        Some([Variant::Str(name), Variant::Array(patterns)]) => (name, patterns),
        _ => return Err(shape_error(FILTERS_KEY)),
    };
    if name.is_empty() {
        return Err(ValidationError::new("name is empty"));
    }
    if patterns.is_empty() {
        return Err(ValidationError::new("no filters"));
    }
    let patterns = patterns
        .items()
        .iter()
        .map(validate_pattern)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FilterGroup::new(name.clone(), patterns))
}

/// Validates one `(us)` filter pattern.
fn validate_pattern(pattern: &Variant) -> Result<FilterPattern, ValidationError> {
    let (kind, text) = match pattern.as_tuple() {
        Some([Variant::Uint32(kind), Variant::Str(text)]) => (*kind, text),
        _ => return Err(shape_error(FILTERS_KEY)),
    };
    match FilterKind::from_wire(kind) {
        Some(FilterKind::Glob) if text.is_empty() => {
            Err(ValidationError::new("invalid glob pattern"))
        }
        Some(FilterKind::Mime) if text.is_empty() => {
            Err(ValidationError::new("invalid content type"))
        }
        Some(FilterKind::Glob) => Ok(FilterPattern::glob(text.clone())),
        Some(FilterKind::Mime) => Ok(FilterPattern::mime(text.clone())),
        None => Err(ValidationError::new(format!("invalid filter type: {kind}"))),
    }
}

// ============================================================================
// SECTION: Choice Validation
// ============================================================================

/// Validates an `a(ssa(ss)s)` choice list and decodes it.
///
/// # Errors
///
/// Returns [`ValidationError`] on a type mismatch or the first invalid choice,
/// prefixed with `invalid choice: ` for choice-level failures.
pub fn validate_choices(value: &Variant) -> Result<Vec<Choice>, ValidationError> {
    check_value_type(CHOICES_KEY, value, &choices_type())?;
    let Some(choices) = value.as_array() else {
        return Err(shape_error(CHOICES_KEY));
    };
    choices
        .items()
        .iter()
        .map(|choice| validate_choice(choice).map_err(|err| err.prefixed("invalid choice: ")))
        .collect()
}

/// Validates one `(ssa(ss)s)` choice.
fn validate_choice(choice: &Variant) -> Result<Choice, ValidationError> {
    let (id, label, options, current) = match choice.as_tuple() {
        Some(
            [
                Variant::Str(id),
                Variant::Str(label),
                Variant::Array(options),
                Variant::Str(current),
            ],
        ) => (id, label, options, current),
        _ => return Err(shape_error(CHOICES_KEY)),
    };
    if id.is_empty() {
        return Err(ValidationError::new("id is empty"));
    }
    if label.is_empty() {
        return Err(ValidationError::new("label is empty"));
    }
    if options.is_empty() {
        if !BOOLEAN_CHOICE_VALUES.contains(&current.as_str()) {
            return Err(bad_current(current));
        }
        return Ok(Choice::new(id.clone(), label.clone(), Vec::new(), current.clone()));
    }

    let options = options
        .items()
        .iter()
        .map(validate_choice_option)
        .collect::<Result<Vec<_>, _>>()?;
    if !current.is_empty() && !options.iter().any(|option| option.id == *current) {
        return Err(bad_current(current));
    }
    Ok(Choice::new(id.clone(), label.clone(), options, current.clone()))
}

/// Validates one `(ss)` choice option.
fn validate_choice_option(option: &Variant) -> Result<ChoiceOption, ValidationError> {
    let (id, label) = match option.as_tuple() {
        Some([Variant::Str(id), Variant::Str(label)]) => (id, label),
        _ => return Err(shape_error(CHOICES_KEY)),
    };
    if id.is_empty() {
        return Err(ValidationError::new("option id is empty"));
    }
    if label.is_empty() {
        return Err(ValidationError::new("option label is empty"));
    }
    Ok(ChoiceOption::new(id.clone(), label.clone()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the `bad current option` failure.
fn bad_current(current: &str) -> ValidationError {
    ValidationError::new(format!("bad current option: {current}"))
}

/// Builds a failure for values that passed the type check but not decoding.
fn shape_error(key: &str) -> ValidationError {
    ValidationError::new(format!("malformed value for key {key}"))
}
