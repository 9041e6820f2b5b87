//! Runtime failure taxonomy.
//!
//! Every variant renders to the human-readable failure message the engine
//! embeds in an annotation. Nothing here ever escapes the sandbox
//! boundary as a panic.

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// A `throw` in evaluated code. Carries the thrown value so `catch`
    /// clauses can rebind it.
    #[error("{}", thrown_message(.0))]
    Thrown(Value),

    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    /// The sandbox has no module system; `require` and friends land here.
    #[error("module access is not available in the sandbox: {0}")]
    ModuleAccess(String),

    /// Evaluation fuel ran out (infinite or pathologically long loop).
    #[error("evaluation budget exhausted")]
    FuelExhausted,

    #[error("maximum call depth exceeded")]
    CallDepthExceeded,

    /// The call-expression text did not parse. Unreachable when the call
    /// builder upholds its printing contract.
    #[error("malformed call expression: {0}")]
    MalformedCall(String),
}

fn thrown_message(value: &Value) -> String {
    match value.as_error_parts() {
        Some((name, message)) => format!("{name}: {message}"),
        None => format!("Thrown: {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn thrown_error_object_renders_name_and_message() {
        let mut props = IndexMap::new();
        props.insert("name".to_string(), Value::string("Error"));
        props.insert("message".to_string(), Value::string("boom"));
        let err = RuntimeError::Thrown(Value::object(props));
        assert_eq!(err.to_string(), "Error: boom");
    }

    #[test]
    fn thrown_primitive_renders_value() {
        let err = RuntimeError::Thrown(Value::Number(42.0));
        assert_eq!(err.to_string(), "Thrown: 42");
    }
}
