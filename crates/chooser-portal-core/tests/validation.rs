// crates/chooser-portal-core/tests/validation.rs
// ============================================================================
// Module: Structural Validator Tests
// Description: Filter and choice list acceptance and rejection rules.
// ============================================================================
//! ## Overview
//! Exercises every rejection rule of the filter and choice validators and the
//! reason chains they produce.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use chooser_portal_core::Choice;
use chooser_portal_core::ChoiceOption;
use chooser_portal_core::FilterGroup;
use chooser_portal_core::FilterKind;
use chooser_portal_core::FilterPattern;
use chooser_portal_core::PortalError;
use chooser_portal_core::Variant;
use chooser_portal_core::core::options::filter_group_type;
use chooser_portal_core::core::options::filter_pattern_type;
use chooser_portal_core::validate_choices;
use chooser_portal_core::validate_filters;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a single-group filter list with raw `(kind, pattern)` entries.
fn raw_filters(name: &str, patterns: &[(u32, &str)]) -> Variant {
    let patterns = Variant::array(
        filter_pattern_type(),
        patterns.iter().map(|(kind, text)| Variant::tuple([Variant::Uint32(*kind), (*text).into()])),
    )
    .unwrap();
    let group = Variant::tuple([name.into(), patterns]);
    Variant::array(filter_group_type(), [group]).unwrap()
}

/// Builds a single-choice list.
fn one_choice(id: &str, label: &str, options: &[(&str, &str)], current: &str) -> Variant {
    let options = options.iter().map(|(id, label)| ChoiceOption::new(*id, *label)).collect();
    Choice::list_to_variant(&[Choice::new(id, label, options, current)])
}

/// Extracts the reason from a filter validation failure.
fn filter_reason(value: &Variant) -> String {
    validate_filters(value).unwrap_err().reason().to_string()
}

/// Extracts the reason from a choice validation failure.
fn choice_reason(value: &Variant) -> String {
    validate_choices(value).unwrap_err().reason().to_string()
}

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Tests that a well-formed filter list is decoded in order.
#[test]
fn accepts_well_formed_filters() {
    let groups = vec![
        FilterGroup::new("Images", vec![FilterPattern::glob("*.png"), FilterPattern::mime("image/jpeg")]),
        FilterGroup::new("Text", vec![FilterPattern::mime("text/plain")]),
    ];
    let decoded = validate_filters(&FilterGroup::list_to_variant(&groups)).unwrap();
    assert_eq!(decoded, groups);
    assert_eq!(decoded[0].patterns[1].kind, FilterKind::Mime);
}

/// Tests that an empty filter list is valid.
#[test]
fn accepts_empty_filter_list() {
    let decoded = validate_filters(&FilterGroup::list_to_variant(&[])).unwrap();
    assert!(decoded.is_empty());
}

/// Tests rejection of an empty group name.
#[test]
fn rejects_empty_filter_name() {
    assert_eq!(filter_reason(&raw_filters("", &[(0, "*.png")])), "invalid filter: name is empty");
}

/// Tests rejection of a group without patterns.
#[test]
fn rejects_group_without_patterns() {
    assert_eq!(filter_reason(&raw_filters("Images", &[])), "invalid filter: no filters");
}

/// Tests rejection of an unknown pattern type.
#[test]
fn rejects_unknown_pattern_type() {
    assert_eq!(
        filter_reason(&raw_filters("Images", &[(0, "*.png"), (7, "*.gif")])),
        "invalid filter: invalid filter type: 7"
    );
}

/// Tests rejection of empty glob and mime patterns.
#[test]
fn rejects_empty_patterns_by_kind() {
    assert_eq!(
        filter_reason(&raw_filters("Images", &[(0, "")])),
        "invalid filter: invalid glob pattern"
    );
    assert_eq!(
        filter_reason(&raw_filters("Images", &[(1, "")])),
        "invalid filter: invalid content type"
    );
}

/// Tests that the first offending group aborts validation.
#[test]
fn first_failure_wins() {
    let groups = [
        FilterGroup::new("Images", vec![FilterPattern::glob("*.png")]),
        FilterGroup::new("", vec![]),
    ];
    assert_eq!(
        filter_reason(&FilterGroup::list_to_variant(&groups)),
        "invalid filter: name is empty"
    );
}

/// Tests the whole-value type check.
#[test]
fn rejects_mistyped_filter_value() {
    assert_eq!(
        filter_reason(&Variant::from("*.png")),
        "expected type for key filters is a(sa(us)), found s"
    );
}

// ============================================================================
// SECTION: Choices
// ============================================================================

/// Tests boolean choices with valid current values.
#[test]
fn accepts_boolean_choices() {
    for current in ["", "true", "false"] {
        let decoded = validate_choices(&one_choice("fmt", "Format", &[], current)).unwrap();
        assert_eq!(decoded[0].current, current);
    }
}

/// Tests rejection of an invalid boolean current value.
#[test]
fn rejects_bad_boolean_current() {
    assert_eq!(
        choice_reason(&one_choice("fmt", "Format", &[], "maybe")),
        "invalid choice: bad current option: maybe"
    );
}

/// Tests choices with sub-options.
#[test]
fn accepts_choice_with_matching_current() {
    let options = [("png", "PNG"), ("jpg", "JPEG")];
    validate_choices(&one_choice("fmt", "Format", &options, "jpg")).unwrap();
    validate_choices(&one_choice("fmt", "Format", &options, "")).unwrap();
}

/// Tests rejection of an unmatched current value.
#[test]
fn rejects_unmatched_current() {
    assert_eq!(
        choice_reason(&one_choice("fmt", "Format", &[("png", "PNG")], "gif")),
        "invalid choice: bad current option: gif"
    );
}

/// Tests rejection of empty ids and labels.
#[test]
fn rejects_empty_ids_and_labels() {
    assert_eq!(choice_reason(&one_choice("", "Format", &[], "")), "invalid choice: id is empty");
    assert_eq!(choice_reason(&one_choice("fmt", "", &[], "")), "invalid choice: label is empty");
    assert_eq!(
        choice_reason(&one_choice("fmt", "Format", &[("", "PNG")], "")),
        "invalid choice: option id is empty"
    );
    assert_eq!(
        choice_reason(&one_choice("fmt", "Format", &[("png", "")], "")),
        "invalid choice: option label is empty"
    );
}

/// Tests the whole-value type check for choices.
#[test]
fn rejects_mistyped_choice_value() {
    assert_eq!(
        choice_reason(&Variant::Bool(true)),
        "expected type for key choices is a(ssa(ss)s), found b"
    );
}

// ============================================================================
// SECTION: Reason Chains
// ============================================================================

/// Tests that handler prefixes compose into the caller-visible message.
#[test]
fn reason_chain_composes_into_invalid_argument() {
    let err = validate_filters(&raw_filters("", &[(0, "*.png")])).unwrap_err();
    let portal: PortalError = err.prefixed("invalid filters: ").into();
    assert_eq!(
        portal,
        PortalError::InvalidArgument("invalid filters: invalid filter: name is empty".to_string())
    );
    assert_eq!(portal.kind(), "invalid_argument");
}
