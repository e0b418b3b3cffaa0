// crates/chooser-portal-core/src/core/mod.rs
// ============================================================================
// Module: Chooser Portal Core Model
// Description: Identifiers, variant values, and typed compound options.
// Purpose: Group the data model shared by validators, schemas, and the broker.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Data model types used across the portal.

pub mod identifiers;
pub mod options;
pub mod variant;

pub use identifiers::AppId;
pub use identifiers::CallerContext;
pub use identifiers::RequestId;
pub use options::Choice;
pub use options::ChoiceOption;
pub use options::FilterGroup;
pub use options::FilterKind;
pub use options::FilterPattern;
pub use variant::VarDict;
pub use variant::Variant;
pub use variant::VariantArray;
pub use variant::VariantError;
pub use variant::VariantType;
