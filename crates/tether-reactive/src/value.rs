//! Dynamic values held by the store.
//!
//! # Equality
//!
//! `Value`'s `PartialEq` is *strict equality*: primitives compare by value,
//! objects and arrays by identity (two handles to the same allocation).
//! `NaN` is not equal to itself. This is what the store's write short-circuit
//! uses, so replacing an object with a structurally identical copy still
//! notifies.
//!
//! # Text coercion
//!
//! `Display` renders the text a host shows for a value:
//!
//! | Value | Text |
//! |-------|------|
//! | `Undefined` | `undefined` |
//! | `Null` | `null` |
//! | integral number | no fractional part (`3`, not `3.0`) |
//! | magnitude `>= 1e21` or `< 1e-6` | exponent form (`1e+21`, `1e-7`) |
//! | array | elements joined with `,`, null elements empty |
//! | object | `[object Object]` |

use std::fmt;
use std::rc::Rc;

use crate::store::ReactiveObject;

/// Largest integer an `f64` represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A value stored in a reactive property.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The result of reading a property that does not exist.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// An array snapshot. Elements are not observed; only replacing the
    /// whole array is.
    Array(Rc<[serde_json::Value]>),
    /// A nested reactive object.
    Object(ReactiveObject),
}

impl Value {
    /// Convert plain JSON into a value, wrapping objects (recursively) into
    /// reactive objects.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into()),
            serde_json::Value::Object(map) => Self::Object(ReactiveObject::observe(map)),
        }
    }

    /// Snapshot as plain JSON. `Undefined` and non-finite numbers become
    /// `null`.
    ///
    /// Objects are walked recursively; an object stored inside itself would
    /// not terminate.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serde_json::Value::from(*n as i64)
            }
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.to_vec()),
            Self::Object(obj) => obj.to_json(),
        }
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

fn write_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // Covers -0.
        f.write_str("0")
    } else if (1e-6..1e21).contains(&n.abs()) {
        write!(f, "{n}")
    } else {
        // Shortest round-trip digits in exponent form, with an explicit sign
        // on positive exponents (`1e+21`, `1.5e-7`).
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
            _ => f.write_str(&text),
        }
    }
}

fn write_json_element(json: &serde_json::Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match json {
        serde_json::Value::Null => Ok(()),
        serde_json::Value::Bool(b) => write!(f, "{b}"),
        serde_json::Value::Number(n) => write_number(n.as_f64().unwrap_or(f64::NAN), f),
        serde_json::Value::String(s) => f.write_str(s),
        serde_json::Value::Array(items) => write_joined(items, f),
        serde_json::Value::Object(_) => f.write_str("[object Object]"),
    }
}

fn write_joined(items: &[serde_json::Value], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write_json_element(item, f)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write_number(*n, f),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => write_joined(items, f),
            Self::Object(_) => f.write_str("[object Object]"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(json)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<ReactiveObject> for Value {
    fn from(obj: ReactiveObject) -> Self {
        Self::Object(obj)
    }
}
