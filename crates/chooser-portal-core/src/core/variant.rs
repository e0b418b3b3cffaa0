// crates/chooser-portal-core/src/core/variant.rs
// ============================================================================
// Module: Chooser Portal Variant Model
// Description: Typed sum-of-cases values and type descriptors for option payloads.
// Purpose: Represent wire dictionaries without dynamic typing at call sites.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Option payloads crossing the portal boundary are string-keyed dictionaries
//! of [`Variant`] values ([`VarDict`]). Every value reports a [`VariantType`]
//! that renders as a compact signature (`s`, `ay`, `a(sa(us))`, `a{sv}`) and
//! can be parsed back from one. Typed arrays carry their element type so an
//! empty array still has a well-defined type.
//! Invariants:
//! - Every item of a [`VariantArray`] has exactly the array's element type.
//! - [`VariantType`] display and parsing round-trip for supported signatures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ============================================================================
// SECTION: Variant Errors
// ============================================================================

/// Errors raised while building variant values or parsing signatures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    /// Type signature could not be parsed.
    #[error("invalid type signature: {0}")]
    InvalidSignature(String),
    /// Array item does not match the declared element type.
    #[error("array element type mismatch (expected {expected}, got {actual})")]
    ElementTypeMismatch {
        /// Declared element signature.
        expected: String,
        /// Offending item signature.
        actual: String,
    },
}

// ============================================================================
// SECTION: Type Descriptors
// ============================================================================

/// Structural type descriptor for [`Variant`] values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantType {
    /// Boolean (`b`).
    Bool,
    /// Unsigned byte (`y`).
    Byte,
    /// Signed 32-bit integer (`i`).
    Int32,
    /// Unsigned 32-bit integer (`u`).
    Uint32,
    /// UTF-8 string (`s`).
    Str,
    /// Object path (`o`).
    ObjectPath,
    /// Boxed value of any type (`v`).
    Variant,
    /// Homogeneous array (`a` + element).
    Array(Box<Self>),
    /// Fixed tuple (`(` ... `)`).
    Tuple(Vec<Self>),
    /// String-keyed variant dictionary (`a{sv}`).
    VarDict,
}

impl VariantType {
    /// Builds an array type for the provided element type.
    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    /// Builds a tuple type from the provided field types.
    #[must_use]
    pub fn tuple(fields: impl IntoIterator<Item = Self>) -> Self {
        Self::Tuple(fields.into_iter().collect())
    }

    /// Returns the compact signature string for this type.
    #[must_use]
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("b"),
            Self::Byte => f.write_str("y"),
            Self::Int32 => f.write_str("i"),
            Self::Uint32 => f.write_str("u"),
            Self::Str => f.write_str("s"),
            Self::ObjectPath => f.write_str("o"),
            Self::Variant => f.write_str("v"),
            Self::Array(element) => write!(f, "a{element}"),
            Self::Tuple(fields) => {
                f.write_str("(")?;
                for field in fields {
                    field.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::VarDict => f.write_str("a{sv}"),
        }
    }
}

impl FromStr for VariantType {
    type Err = VariantError;

    fn from_str(signature: &str) -> Result<Self, Self::Err> {
        let bytes = signature.as_bytes();
        let mut pos = 0;
        let parsed = parse_type(bytes, &mut pos)
            .ok_or_else(|| VariantError::InvalidSignature(signature.to_string()))?;
        if pos != bytes.len() {
            return Err(VariantError::InvalidSignature(signature.to_string()));
        }
        Ok(parsed)
    }
}

/// Parses one complete type starting at `pos`, advancing past it.
fn parse_type(bytes: &[u8], pos: &mut usize) -> Option<VariantType> {
    let head = *bytes.get(*pos)?;
    *pos += 1;
    let parsed = match head {
        b'b' => VariantType::Bool,
        b'y' => VariantType::Byte,
        b'i' => VariantType::Int32,
        b'u' => VariantType::Uint32,
        b's' => VariantType::Str,
        b'o' => VariantType::ObjectPath,
        b'v' => VariantType::Variant,
        b'a' => {
            if bytes.get(*pos..*pos + 4) == Some(b"{sv}".as_slice()) {
                *pos += 4;
                VariantType::VarDict
            } else {
                VariantType::array(parse_type(bytes, pos)?)
            }
        }
        b'(' => {
            let mut fields = Vec::new();
            loop {
                if *bytes.get(*pos)? == b')' {
                    *pos += 1;
                    break;
                }
                fields.push(parse_type(bytes, pos)?);
            }
            VariantType::Tuple(fields)
        }
        _ => return None,
    };
    Some(parsed)
}

// ============================================================================
// SECTION: Values
// ============================================================================

/// Dynamically typed value carried in option dictionaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// Boolean value.
    Bool(bool),
    /// Unsigned byte.
    Byte(u8),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    Uint32(u32),
    /// UTF-8 string.
    Str(String),
    /// Object path string.
    ObjectPath(String),
    /// Byte string (`ay`), e.g. a NUL-terminated file path.
    Bytes(Vec<u8>),
    /// Typed homogeneous array.
    Array(VariantArray),
    /// Fixed tuple.
    Tuple(Vec<Self>),
    /// Nested variant dictionary.
    Dict(VarDict),
    /// Boxed value.
    Boxed(Box<Self>),
}

impl Variant {
    /// Builds a typed array, checking each item against `element`.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::ElementTypeMismatch`] when an item has another type.
    pub fn array(
        element: VariantType,
        items: impl IntoIterator<Item = Self>,
    ) -> Result<Self, VariantError> {
        VariantArray::new(element, items.into_iter().collect()).map(Self::Array)
    }

    /// Builds a string array (`as`).
    #[must_use]
    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(VariantArray::from_trusted(
            VariantType::Str,
            items.into_iter().map(|item| Self::Str(item.into())).collect(),
        ))
    }

    /// Builds a tuple value.
    #[must_use]
    pub fn tuple(fields: impl IntoIterator<Item = Self>) -> Self {
        Self::Tuple(fields.into_iter().collect())
    }

    /// Returns the structural type of the value.
    #[must_use]
    pub fn type_of(&self) -> VariantType {
        match self {
            Self::Bool(_) => VariantType::Bool,
            Self::Byte(_) => VariantType::Byte,
            Self::Int32(_) => VariantType::Int32,
            Self::Uint32(_) => VariantType::Uint32,
            Self::Str(_) => VariantType::Str,
            Self::ObjectPath(_) => VariantType::ObjectPath,
            Self::Bytes(_) => VariantType::array(VariantType::Byte),
            Self::Array(array) => VariantType::array(array.element.clone()),
            Self::Tuple(fields) => VariantType::Tuple(fields.iter().map(Self::type_of).collect()),
            Self::Dict(_) => VariantType::VarDict,
            Self::Boxed(_) => VariantType::Variant,
        }
    }

    /// Returns true when the value has exactly the provided type.
    #[must_use]
    pub fn is_of_type(&self, expected: &VariantType) -> bool {
        match (self, expected) {
            (Self::Array(array), VariantType::Array(element)) => array.element == **element,
            (Self::Bytes(_), VariantType::Array(element)) => **element == VariantType::Byte,
            (Self::Tuple(fields), VariantType::Tuple(types)) => {
                fields.len() == types.len()
                    && fields.iter().zip(types).all(|(field, ty)| field.is_of_type(ty))
            }
            _ => self.type_of() == *expected,
        }
    }

    /// Returns the boolean payload when present.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload for strings and object paths.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) | Self::ObjectPath(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the tuple fields when present.
    #[must_use]
    pub fn as_tuple(&self) -> Option<&[Self]> {
        match self {
            Self::Tuple(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the array payload when present.
    #[must_use]
    pub const fn as_array(&self) -> Option<&VariantArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Self::Uint32(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<u8>> for Variant {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<VarDict> for Variant {
    fn from(value: VarDict) -> Self {
        Self::Dict(value)
    }
}

// ============================================================================
// SECTION: Arrays
// ============================================================================

/// Homogeneous array with an explicit element type.
///
/// # Invariants
/// - Every item satisfies [`Variant::is_of_type`] for `element`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantArray {
    /// Declared element type.
    element: VariantType,
    /// Array items in order.
    items: Vec<Variant>,
}

impl VariantArray {
    /// Creates a typed array, validating every item.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::ElementTypeMismatch`] for the first mistyped item.
    pub fn new(element: VariantType, items: Vec<Variant>) -> Result<Self, VariantError> {
        if let Some(item) = items.iter().find(|item| !item.is_of_type(&element)) {
            return Err(VariantError::ElementTypeMismatch {
                expected: element.signature(),
                actual: item.type_of().signature(),
            });
        }
        Ok(Self {
            element,
            items,
        })
    }

    /// Creates an array from items already known to match `element`.
    pub(crate) const fn from_trusted(element: VariantType, items: Vec<Variant>) -> Self {
        Self {
            element,
            items,
        }
    }

    /// Returns the declared element type.
    #[must_use]
    pub const fn element(&self) -> &VariantType {
        &self.element
    }

    /// Returns the items as a slice.
    #[must_use]
    pub fn items(&self) -> &[Variant] {
        &self.items
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the array has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// SECTION: Dictionaries
// ============================================================================

/// String-keyed dictionary of variants (`a{sv}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarDict(BTreeMap<String, Variant>);

impl VarDict {
    /// Creates an empty dictionary.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the dictionary with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts a value, returning the previous one for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Variant>) -> Option<Variant> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.0.get(key)
    }

    /// Returns the value under `key` only when it has the expected type.
    #[must_use]
    pub fn lookup(&self, key: &str, expected: &VariantType) -> Option<&Variant> {
        self.0.get(key).filter(|value| value.is_of_type(expected))
    }

    /// Returns true when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the dictionary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Variant> {
        self.0.iter()
    }
}

impl FromIterator<(String, Variant)> for VarDict {
    fn from_iter<T: IntoIterator<Item = (String, Variant)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VarDict {
    type Item = (String, Variant);
    type IntoIter = btree_map::IntoIter<String, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VarDict {
    type Item = (&'a String, &'a Variant);
    type IntoIter = btree_map::Iter<'a, String, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    //! Signature parsing and type reporting tests.
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::Variant;
    use super::VariantType;

    #[test]
    fn parses_nested_signatures() {
        for signature in ["s", "ay", "a(sa(us))", "a(ssa(ss)s)", "a{sv}", "aa{sv}", "()", "(ub)"] {
            let parsed: VariantType = signature.parse().unwrap();
            assert_eq!(parsed.signature(), signature);
        }
    }

    #[test]
    fn rejects_truncated_signatures() {
        for signature in ["", "a", "(s", "a(us", "x", "ss", "a{s"] {
            assert!(signature.parse::<VariantType>().is_err(), "{signature}");
        }
    }

    #[test]
    fn empty_typed_array_keeps_element_type() {
        let value = Variant::array(VariantType::Str, []).unwrap();
        assert_eq!(value.type_of().signature(), "as");
    }

    #[test]
    fn bytes_report_byte_array_type() {
        let value = Variant::Bytes(b"/tmp\0".to_vec());
        assert!(value.is_of_type(&VariantType::array(VariantType::Byte)));
        assert!(!value.is_of_type(&VariantType::Str));
    }
}
