//! Runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use quicklens_frontend::ast::{Expr, Param, Stmt};

use crate::env::Env;
use crate::error::RuntimeError;

/// A runtime value. Arrays and objects are reference types (shared,
/// mutable); everything else copies by value.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<String>),
    Array(Rc<RefCell<Vec<Value>>>),
    /// Insertion-ordered properties, matching source declaration order.
    Object(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<Closure>),
    Native(NativeFn),
}

/// A user function value: parameters, body, and the captured environment.
pub struct Closure {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub env: Env,
}

pub enum FunctionBody {
    Block(Rc<Vec<Stmt>>),
    /// Arrow-function expression body.
    Expr(Rc<Expr>),
}

/// A built-in function injected by the sandbox.
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub name: &'static str,
    pub func: fn(&[Value]) -> Result<Value, RuntimeError>,
}

impl Value {
    pub fn string(text: impl Into<String>) -> Value {
        Value::Str(Rc::new(text.into()))
    }

    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn object(properties: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(properties)))
    }

    /// `typeof` operator result.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    /// JavaScript truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Numeric coercion (`ToNumber`, approximately).
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }

    /// Strict (`===`) equality.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Loose (`==`) equality: strict plus the null/undefined pairing and
    /// primitive-to-number coercion. Object-to-primitive comparison is
    /// intentionally left strict.
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Number(_), Value::Str(_) | Value::Bool(_))
            | (Value::Str(_) | Value::Bool(_), Value::Number(_))
            | (Value::Str(_), Value::Bool(_))
            | (Value::Bool(_), Value::Str(_)) => {
                let a = self.to_number();
                let b = other.to_number();
                a == b
            }
            _ => self.strict_equals(other),
        }
    }

    /// True when the value looks like an error object constructed by one
    /// of the injected error constructors.
    pub fn as_error_parts(&self) -> Option<(String, String)> {
        let Value::Object(object) = self else {
            return None;
        };
        let object = object.borrow();
        let name = object.get("name")?;
        let message = object.get("message")?;
        match (name, message) {
            (Value::Str(name), Value::Str(message)) => {
                Some((name.as_ref().clone(), message.as_ref().clone()))
            }
            _ => None,
        }
    }
}

/// Render an f64 the way JavaScript stringifies numbers: integral values
/// without a fraction part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == n.trunc() && n.abs() < 1e21 {
        // -0 renders as plain 0, like JS string conversion
        return format!("{}", n.trunc() as i64);
    }
    format!("{n}")
}

const MAX_DISPLAY_DEPTH: u32 = 4;

impl fmt::Display for Value {
    /// String conversion, approximating JavaScript `String(value)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_depth(f, 0)
    }
}

impl Value {
    fn fmt_with_depth(&self, f: &mut fmt::Formatter<'_>, depth: u32) -> fmt::Result {
        if depth > MAX_DISPLAY_DEPTH {
            return write!(f, "...");
        }
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(elements) => {
                // Array.prototype.toString is join(",")
                match elements.try_borrow() {
                    Ok(elements) => {
                        for (i, element) in elements.iter().enumerate() {
                            if i > 0 {
                                write!(f, ",")?;
                            }
                            if !element.is_nullish() {
                                element.fmt_with_depth(f, depth + 1)?;
                            }
                        }
                        Ok(())
                    }
                    Err(_) => write!(f, "..."),
                }
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(closure) => match &closure.name {
                Some(name) => write!(f, "[function: {name}]"),
                None => write!(f, "[function]"),
            },
            Value::Native(native) => write!(f, "[function: {}]", native.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Depth-capped like Display; cyclic values must never recurse
        // unboundedly through a Debug derive.
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting_matches_js() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::string("x").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
    }

    #[test]
    fn strict_vs_loose_equality() {
        let one = Value::Number(1.0);
        let one_str = Value::string("1");
        assert!(!one.strict_equals(&one_str));
        assert!(one.loose_equals(&one_str));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
    }

    #[test]
    fn arrays_compare_by_reference() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let b = Value::array(vec![Value::Number(1.0)]);
        assert!(!a.strict_equals(&b));
        assert!(a.strict_equals(&a.clone()));
    }

    #[test]
    fn display_joins_arrays_like_js() {
        let v = Value::array(vec![
            Value::Number(1.0),
            Value::string("two"),
            Value::Null,
        ]);
        assert_eq!(v.to_string(), "1,two,");
    }
}
