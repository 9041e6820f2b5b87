//! Sandboxed evaluation of a built call expression.
//!
//! Wraps the runtime sandbox: executes the compiled module plus one
//! call-expression text in a fresh context, then serializes the outcome.
//! Exactly one of success or failure is ever produced, and failures are
//! messages, never propagated errors.

use serde_json::{Map, Number, Value as JsonValue};

use quicklens_common::limits;
use quicklens_runtime::{CompiledModule, Sandbox, Value};

/// The outcome of one sandboxed call.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// JSON-compatible textual form of the produced value.
    Value(String),
    /// Human-readable description of the failure.
    Failure(String),
}

impl Evaluation {
    /// The text rendered into an annotation's display line.
    pub fn display(&self) -> &str {
        match self {
            Evaluation::Value(text) | Evaluation::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Evaluation::Failure(_))
    }
}

/// Run one call expression against the compiled module, in a sandbox
/// constructed fresh for this evaluation.
pub fn evaluate(module: &CompiledModule, call_source: &str) -> Evaluation {
    match Sandbox::new().eval(module, call_source) {
        Ok(value) => Evaluation::Value(render_result(&value)),
        Err(error) => Evaluation::Failure(error.to_string()),
    }
}

/// Serialize a runtime value to JSON-compatible text. `undefined` keeps
/// its own spelling at the top level; unserializable values degrade to a
/// best-effort placeholder rather than failing the evaluation.
fn render_result(value: &Value) -> String {
    if matches!(value, Value::Undefined) {
        return "undefined".to_string();
    }
    let json = to_json(value, 0, &mut Vec::new());
    serde_json::to_string(&json).unwrap_or_else(|_| "[unserializable]".to_string())
}

/// Convert a runtime value into a `serde_json` tree with cycle and depth
/// guards. `seen` tracks the reference identity of in-progress arrays and
/// objects.
fn to_json(value: &Value, depth: u32, seen: &mut Vec<usize>) -> JsonValue {
    if depth > limits::MAX_SERIALIZATION_DEPTH {
        return JsonValue::String("[Truncated]".to_string());
    }
    match value {
        Value::Undefined | Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::Str(s) => JsonValue::String(s.as_ref().clone()),
        Value::Array(elements) => {
            let id = elements.as_ptr() as usize;
            if seen.contains(&id) {
                return JsonValue::String("[Circular]".to_string());
            }
            seen.push(id);
            let out = elements
                .borrow()
                .iter()
                .map(|element| to_json(element, depth + 1, seen))
                .collect();
            seen.pop();
            JsonValue::Array(out)
        }
        Value::Object(properties) => {
            let id = properties.as_ptr() as usize;
            if seen.contains(&id) {
                return JsonValue::String("[Circular]".to_string());
            }
            seen.push(id);
            let mut map = Map::new();
            for (name, property) in properties.borrow().iter() {
                map.insert(name.clone(), to_json(property, depth + 1, seen));
            }
            seen.pop();
            JsonValue::Object(map)
        }
        Value::Function(closure) => JsonValue::String(match &closure.name {
            Some(name) => format!("[function: {name}]"),
            None => "[function]".to_string(),
        }),
        Value::Native(native) => JsonValue::String(format!("[function: {}]", native.name)),
    }
}

fn number_to_json(n: f64) -> JsonValue {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9e15 {
        return JsonValue::Number(Number::from(n as i64));
    }
    match Number::from_f64(n) {
        Some(number) => JsonValue::Number(number),
        // NaN / Infinity have no JSON spelling
        None => JsonValue::String(quicklens_runtime::value::format_number(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicklens_frontend::parse_source;
    use quicklens_runtime::compile;

    fn module(source: &str) -> CompiledModule {
        compile(&parse_source(source).expect("parse failed"))
    }

    #[test]
    fn success_is_serialized_json() {
        let module = module("function add(a, b) { return a + b; }");
        assert_eq!(
            evaluate(&module, "add(2, -4)"),
            Evaluation::Value("-2".to_string())
        );
    }

    #[test]
    fn object_results_preserve_property_order() {
        let module = module("function make() { return { y: 1, x: 2 }; }");
        assert_eq!(
            evaluate(&module, "make()"),
            Evaluation::Value("{\"y\":1,\"x\":2}".to_string())
        );
    }

    #[test]
    fn undefined_result_keeps_its_spelling() {
        let module = module("function noop() {}");
        assert_eq!(
            evaluate(&module, "noop()"),
            Evaluation::Value("undefined".to_string())
        );
    }

    #[test]
    fn thrown_error_becomes_failure_with_message() {
        let module = module("function k() { throw new Error(\"boom\"); }");
        let outcome = evaluate(&module, "k()");
        assert!(outcome.is_failure());
        assert!(outcome.display().contains("boom"));
    }

    #[test]
    fn cyclic_structures_degrade_not_crash() {
        let module = module("function cycle() { const o = { self: null }; o.self = o; return o; }");
        let outcome = evaluate(&module, "cycle()");
        let Evaluation::Value(text) = outcome else {
            panic!("expected success");
        };
        assert!(text.contains("[Circular]"));
    }

    #[test]
    fn function_results_degrade_to_placeholder() {
        let module = module("function curry(a) { return (b) => a + b; }");
        let Evaluation::Value(text) = evaluate(&module, "curry(1)") else {
            panic!("expected success");
        };
        assert_eq!(text, "\"[function]\"");
    }

    #[test]
    fn nan_serializes_as_text() {
        let module = module("function bad() { return 0 / 0; }");
        assert_eq!(
            evaluate(&module, "bad()"),
            Evaluation::Value("\"NaN\"".to_string())
        );
    }

    #[test]
    fn sequential_evaluations_are_isolated() {
        let module = module("let n = 0;\nfunction bump() { n = n + 1; return n; }");
        assert_eq!(evaluate(&module, "bump()"), Evaluation::Value("1".to_string()));
        assert_eq!(evaluate(&module, "bump()"), Evaluation::Value("1".to_string()));
    }
}
