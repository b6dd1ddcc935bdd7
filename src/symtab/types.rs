//! Value types and constant values.
//!
//! A [`Type`] is a plain value: duplication is a deep clone and equality is
//! structural, so two separately built `ARRAY[5] OF INTEGER` are the same
//! type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A KPL type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// INTEGER
    Int,
    /// CHAR
    Char,
    /// ARRAY[size] OF element
    Array {
        /// Number of elements, always positive
        size: u32,
        /// Element type
        element: Box<Type>,
    },
}

impl Type {
    /// The INTEGER type.
    pub fn int() -> Self {
        Type::Int
    }

    /// The CHAR type.
    pub fn char() -> Self {
        Type::Char
    }

    /// `ARRAY[size] OF element`.
    pub fn array(size: u32, element: Type) -> Self {
        Type::Array {
            size,
            element: Box::new(element),
        }
    }

    /// Deep copy, independent of `self`.
    pub fn duplicate(&self) -> Self {
        match self {
            Type::Int => Type::Int,
            Type::Char => Type::Char,
            Type::Array { size, element } => Type::Array {
                size: *size,
                element: Box::new(element.duplicate()),
            },
        }
    }

    /// Structural comparison. Sizes are compared before element types.
    pub fn compare(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int) | (Type::Char, Type::Char) => true,
            (
                Type::Array { size: s1, element: e1 },
                Type::Array { size: s2, element: e2 },
            ) => s1 == s2 && e1.compare(e2),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Char => write!(f, "Char"),
            Type::Array { size, element } => write!(f, "Arr({},{})", size, element),
        }
    }
}

/// Value of a declared constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstantValue {
    /// INTEGER value
    Int(i32),
    /// CHAR value, an ASCII byte
    Char(u8),
}

impl ConstantValue {
    /// Type of the value.
    pub fn ty(&self) -> Type {
        match self {
            ConstantValue::Int(_) => Type::Int,
            ConstantValue::Char(_) => Type::Char,
        }
    }

    /// Arithmetic negation; `None` for characters or on overflow.
    pub fn negate(&self) -> Option<ConstantValue> {
        match self {
            ConstantValue::Int(i) => i.checked_neg().map(ConstantValue::Int),
            ConstantValue::Char(_) => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(i) => write!(f, "{}", i),
            ConstantValue::Char(c) => write!(f, "'{}'", *c as char),
        }
    }
}
