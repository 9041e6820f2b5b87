//! The isolated evaluation context.
//!
//! A `Sandbox` run wires together a fresh global environment, a fresh
//! module scope, and a fresh interpreter for every single evaluation.
//! Nothing survives from one call to the next, which is what makes two
//! evaluations of the same module unable to observe each other's writes.
//!
//! The global surface is the explicit allowlist below. There is no module
//! loader: `import` statements are erased during lowering and `require`
//! is bound to a stub that fails the evaluation.

use indexmap::IndexMap;
use tracing::trace;

use quicklens_frontend::parse_expression_text;

use crate::compile::CompiledModule;
use crate::env::Env;
use crate::error::RuntimeError;
use crate::interp::{Flow, Interpreter};
use crate::value::{NativeFn, Value};

/// Sandbox configuration. Stateless across evaluations by construction;
/// the only knob is the fuel handed to each fresh interpreter.
pub struct Sandbox {
    fuel: Option<u64>,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox { fuel: None }
    }

    /// Override the evaluation fuel budget (tests use tiny budgets).
    pub fn with_fuel(fuel: u64) -> Self {
        Sandbox { fuel: Some(fuel) }
    }

    /// Execute `module` and then `call_source` in a freshly constructed
    /// context, returning the call's value or the failure that stopped it.
    pub fn eval(
        &self,
        module: &CompiledModule,
        call_source: &str,
    ) -> Result<Value, RuntimeError> {
        trace!(call = call_source, "sandbox evaluation");
        let call = parse_expression_text(call_source)
            .map_err(|error| RuntimeError::MalformedCall(error.to_string()))?;

        let globals = global_env();
        let module_scope = globals.child();
        let mut interp = match self.fuel {
            Some(fuel) => Interpreter::with_fuel(fuel),
            None => Interpreter::new(),
        };

        // Run the module body; a top-level `return` is meaningless and
        // simply ends module evaluation.
        if let Flow::Return(_) = interp.exec_block(&module.body, &module_scope)? {
            trace!("module body returned at top level");
        }

        interp.eval_expr(&call, &module_scope)
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Sandbox::new()
    }
}

// =============================================================================
// Injected globals
// =============================================================================

fn native(name: &'static str, func: fn(&[Value]) -> Result<Value, RuntimeError>) -> Value {
    Value::Native(NativeFn { name, func })
}

/// Build the global environment: the complete ambient surface evaluated
/// code can see.
fn global_env() -> Env {
    let env = Env::root();

    env.define("undefined", Value::Undefined);
    env.define("NaN", Value::Number(f64::NAN));
    env.define("Infinity", Value::Number(f64::INFINITY));

    env.define("Error", native("Error", |args| error_object("Error", args)));
    env.define(
        "TypeError",
        native("TypeError", |args| error_object("TypeError", args)),
    );
    env.define(
        "RangeError",
        native("RangeError", |args| error_object("RangeError", args)),
    );

    env.define(
        "String",
        native("String", |args| {
            Ok(Value::string(
                args.first().map(|v| v.to_string()).unwrap_or_default(),
            ))
        }),
    );
    env.define(
        "Number",
        native("Number", |args| {
            Ok(Value::Number(
                args.first().map(|v| v.to_number()).unwrap_or(0.0),
            ))
        }),
    );
    env.define(
        "Boolean",
        native("Boolean", |args| {
            Ok(Value::Bool(
                args.first().map(|v| v.is_truthy()).unwrap_or(false),
            ))
        }),
    );
    env.define(
        "isNaN",
        native("isNaN", |args| {
            Ok(Value::Bool(
                args.first().map(|v| v.to_number().is_nan()).unwrap_or(true),
            ))
        }),
    );
    env.define(
        "isFinite",
        native("isFinite", |args| {
            Ok(Value::Bool(
                args.first()
                    .map(|v| v.to_number().is_finite())
                    .unwrap_or(false),
            ))
        }),
    );
    env.define(
        "parseFloat",
        native("parseFloat", |args| {
            Ok(Value::Number(
                args.first().map(|v| v.to_number()).unwrap_or(f64::NAN),
            ))
        }),
    );

    env.define("Math", math_object());
    env.define("Array", array_object());
    env.define("console", console_object());

    // The capability that is explicitly absent.
    env.define(
        "require",
        native("require", |args| {
            let module = args.first().map(|v| v.to_string()).unwrap_or_default();
            Err(RuntimeError::ModuleAccess(format!("require(\"{module}\")")))
        }),
    );

    env
}

fn error_object(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    let message = args.first().map(|v| v.to_string()).unwrap_or_default();
    let mut props = IndexMap::new();
    props.insert("name".to_string(), Value::string(name.to_string()));
    props.insert("message".to_string(), Value::string(message));
    Ok(Value::object(props))
}

fn math_object() -> Value {
    let mut math = IndexMap::new();
    math.insert("PI".to_string(), Value::Number(std::f64::consts::PI));
    math.insert("E".to_string(), Value::Number(std::f64::consts::E));
    math.insert("abs".to_string(), native("abs", |a| unary_math(f64::abs, a)));
    math.insert(
        "floor".to_string(),
        native("floor", |a| unary_math(f64::floor, a)),
    );
    math.insert(
        "ceil".to_string(),
        native("ceil", |a| unary_math(f64::ceil, a)),
    );
    math.insert(
        "round".to_string(),
        native("round", |a| unary_math(f64::round, a)),
    );
    math.insert(
        "trunc".to_string(),
        native("trunc", |a| unary_math(f64::trunc, a)),
    );
    math.insert(
        "sqrt".to_string(),
        native("sqrt", |a| unary_math(f64::sqrt, a)),
    );
    math.insert(
        "sign".to_string(),
        native("sign", |a| {
            unary_math(|n| if n == 0.0 { 0.0 } else { n.signum() }, a)
        }),
    );
    math.insert(
        "pow".to_string(),
        native("pow", |args| {
            let base = args.first().map(|v| v.to_number()).unwrap_or(f64::NAN);
            let exp = args.get(1).map(|v| v.to_number()).unwrap_or(f64::NAN);
            Ok(Value::Number(base.powf(exp)))
        }),
    );
    math.insert(
        "max".to_string(),
        native("max", |args| {
            Ok(Value::Number(
                args.iter()
                    .map(|v| v.to_number())
                    .fold(f64::NEG_INFINITY, f64::max),
            ))
        }),
    );
    math.insert(
        "min".to_string(),
        native("min", |args| {
            Ok(Value::Number(
                args.iter().map(|v| v.to_number()).fold(f64::INFINITY, f64::min),
            ))
        }),
    );
    Value::object(math)
}

fn unary_math(f: impl Fn(f64) -> f64, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(f(args
        .first()
        .map(|v| v.to_number())
        .unwrap_or(f64::NAN))))
}

fn array_object() -> Value {
    let mut array = IndexMap::new();
    array.insert(
        "isArray".to_string(),
        native("isArray", |args| {
            Ok(Value::Bool(matches!(args.first(), Some(Value::Array(_)))))
        }),
    );
    Value::object(array)
}

/// `console.log` and friends are no-ops: present so realistic code runs,
/// wired to nothing so the sandbox emits nothing.
fn console_object() -> Value {
    let noop = |_: &[Value]| -> Result<Value, RuntimeError> { Ok(Value::Undefined) };
    let mut console = IndexMap::new();
    console.insert("log".to_string(), native("log", noop));
    console.insert("warn".to_string(), native("warn", noop));
    console.insert("error".to_string(), native("error", noop));
    Value::object(console)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use quicklens_frontend::parse_source;

    fn module(source: &str) -> CompiledModule {
        compile(&parse_source(source).expect("parse failed"))
    }

    #[test]
    fn evaluates_simple_call() {
        let module = module("function add(a, b) { return a + b; }");
        let value = Sandbox::new().eval(&module, "add(2, 3)").expect("eval failed");
        assert!(matches!(value, Value::Number(n) if n == 5.0));
    }

    #[test]
    fn template_strings_interpolate() {
        let module = module("const greet = (name) => `hello ${name}!`;");
        let value = Sandbox::new()
            .eval(&module, "greet(\"world\")")
            .expect("eval failed");
        assert_eq!(value.to_string(), "hello world!");
    }

    #[test]
    fn thrown_errors_are_captured_not_propagated() {
        let module = module("function k() { throw new Error(\"boom\"); }");
        let error = Sandbox::new().eval(&module, "k()").expect_err("should fail");
        assert!(error.to_string().contains("boom"));
    }

    #[test]
    fn module_level_mutation_does_not_leak_between_evals() {
        let source = "let counter = 0;\nfunction bump() { counter += 1; return counter; }";
        let module = module(source);
        let sandbox = Sandbox::new();
        let first = sandbox.eval(&module, "bump()").expect("eval failed");
        let second = sandbox.eval(&module, "bump()").expect("eval failed");
        assert!(matches!(first, Value::Number(n) if n == 1.0));
        assert!(matches!(second, Value::Number(n) if n == 1.0));
    }

    #[test]
    fn require_is_rejected() {
        let module = module("function load() { return require(\"fs\"); }");
        let error = Sandbox::new().eval(&module, "load()").expect_err("should fail");
        assert!(matches!(error, RuntimeError::ModuleAccess(_)));
    }

    #[test]
    fn infinite_loop_exhausts_fuel() {
        let module = module("function spin() { while (true) {} }");
        let error = Sandbox::with_fuel(10_000)
            .eval(&module, "spin()")
            .expect_err("should fail");
        assert!(matches!(error, RuntimeError::FuelExhausted));
    }

    #[test]
    fn unbounded_recursion_hits_depth_limit() {
        let module = module("function f(n) { return f(n + 1); }");
        let error = Sandbox::new().eval(&module, "f(0)").expect_err("should fail");
        assert!(matches!(error, RuntimeError::CallDepthExceeded));
    }

    #[test]
    fn malformed_call_text_is_reported() {
        let module = module("function f() { return 1; }");
        let error = Sandbox::new().eval(&module, "f(((").expect_err("should fail");
        assert!(matches!(error, RuntimeError::MalformedCall(_)));
    }

    #[test]
    fn closures_capture_module_scope() {
        let module = module(
            "const base = 10;\nconst plus = (n) => base + n;\nfunction apply(n) { return plus(n); }",
        );
        let value = Sandbox::new().eval(&module, "apply(5)").expect("eval failed");
        assert!(matches!(value, Value::Number(n) if n == 15.0));
    }

    #[test]
    fn try_catch_recovers_thrown_error() {
        let module = module(
            "function safe() { try { throw new Error(\"x\"); } catch (e) { return e.message; } }",
        );
        let value = Sandbox::new().eval(&module, "safe()").expect("eval failed");
        assert_eq!(value.to_string(), "x");
    }

    #[test]
    fn array_methods_work() {
        let module = module(
            "function stats(xs) { return { n: xs.length, doubled: xs.map((x) => x * 2).join(\"-\") }; }",
        );
        let value = Sandbox::new()
            .eval(&module, "stats([1, 2, 3])")
            .expect("eval failed");
        let Value::Object(props) = value else {
            panic!("expected object");
        };
        let props = props.borrow();
        assert!(matches!(props.get("n"), Some(Value::Number(n)) if *n == 3.0));
        assert_eq!(props.get("doubled").map(|v| v.to_string()), Some("2-4-6".to_string()));
    }

    #[test]
    fn fuel_exhaustion_is_not_catchable() {
        let module = module(
            "function spin() { try { while (true) {} } catch (e) { return \"caught\"; } }",
        );
        let error = Sandbox::with_fuel(10_000)
            .eval(&module, "spin()")
            .expect_err("should fail");
        assert!(matches!(error, RuntimeError::FuelExhausted));
    }
}
