//! The runtime's notion of a value, not the user's.
//!
//! Four variants: `Nil`, `Bool`, `Number` (an IEEE-754 `f64`), and `Object`
//! (currently only ever an interned string). There is deliberately no
//! separate "type tag" byte the way the C original carries one inside a
//! tagged union. Rust's enum discriminant already is that tag, so a
//! `match` on `Value` is both the type test and the payload extraction in
//! one step.

use std::fmt;
use std::rc::Rc;

use crate::object::ObjString;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Object(Rc<ObjString>),
}

impl Value {
    /// `nil` and `false` are falsey; everything else, including `0`,
    /// `""`, and `NaN`, is truthy.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Nil) || matches!(self, Value::Bool(false))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&Rc<ObjString>> {
        match self {
            Value::Object(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Value equality as used by `OP_EQUAL`: same variant required, `NaN`
    /// unequal to itself (which `f64`'s own `PartialEq` already gives us),
    /// and object equality by heap identity (sound because strings are
    /// interned, so two equal-content strings are always the same `Rc`).
    pub fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Object(s) => write!(f, "{}", s.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsiness_follows_nil_and_false_only() {
        assert!(Value::Nil.is_falsey());
        assert!(Value::Bool(false).is_falsey());
        assert!(!Value::Bool(true).is_falsey());
        assert!(!Value::Number(0.0).is_falsey());
        assert!(!Value::Object(ObjString::new("")).is_falsey());
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        let nan = Value::Number(f64::NAN);
        assert!(!Value::values_equal(&nan, &nan));
    }

    #[test]
    fn equal_numbers_and_bools_compare_by_value() {
        assert!(Value::values_equal(&Value::Number(1.0), &Value::Number(1.0)));
        assert!(!Value::values_equal(&Value::Number(1.0), &Value::Number(2.0)));
        assert!(Value::values_equal(&Value::Bool(true), &Value::Bool(true)));
        assert!(!Value::values_equal(&Value::Nil, &Value::Bool(false)));
    }

    #[test]
    fn objects_compare_by_identity_not_content() {
        let a = Value::Object(ObjString::new("x"));
        let b = Value::Object(ObjString::new("x"));
        // Two independently allocated strings with equal content are NOT
        // `values_equal` unless they're the same interned handle. That
        // invariant is the table's job to uphold, not Value's.
        assert!(!Value::values_equal(&a, &b));
        let c = a.clone();
        assert!(Value::values_equal(&a, &c));
    }

    #[test]
    fn display_formats_numbers_without_trailing_zero() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(42.5).to_string(), "42.5");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }
}
