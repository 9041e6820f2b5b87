//! Tree-walking interpreter for the baseline runtime profile.
//!
//! Every statement and expression charges fuel, and every function call
//! checks depth, so evaluation of arbitrary input terminates with an
//! error instead of wedging or overflowing the host stack.

use std::rc::Rc;

use quicklens_common::limits;
use quicklens_frontend::ast::*;

use crate::env::Env;
use crate::error::RuntimeError;
use crate::value::{Closure, FunctionBody, Value, format_number};

/// Statement completion: how control leaves a statement.
pub enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

pub struct Interpreter {
    fuel: u64,
    depth: u32,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            fuel: limits::EVAL_FUEL_BUDGET,
            depth: 0,
        }
    }

    pub fn with_fuel(fuel: u64) -> Self {
        Interpreter { fuel, depth: 0 }
    }

    fn charge(&mut self) -> Result<(), RuntimeError> {
        if self.fuel == 0 {
            return Err(RuntimeError::FuelExhausted);
        }
        self.fuel -= 1;
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Execute a statement list in `env`. Function declarations are
    /// hoisted: callable before their textual position, like JS.
    pub fn exec_block(&mut self, stmts: &[Stmt], env: &Env) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            if let Stmt::Function(func) = stmt {
                if let Some(name) = &func.name {
                    let closure = self.make_closure(func, env);
                    env.define(name, closure);
                }
            }
        }
        for stmt in stmts {
            if matches!(stmt, Stmt::Function(_)) {
                continue;
            }
            match self.exec_stmt(stmt, env)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &Env) -> Result<Flow, RuntimeError> {
        self.charge()?;
        match stmt {
            Stmt::Function(func) => {
                // Non-hoisted position (single-statement body)
                if let Some(name) = &func.name {
                    let closure = self.make_closure(func, env);
                    env.define(name, closure);
                }
                Ok(Flow::Normal)
            }
            Stmt::Var(var) => {
                let value = match &var.init {
                    Some(init) => self.eval_expr(init, env)?,
                    None => Value::Undefined,
                };
                env.define(&var.name, value);
                Ok(Flow::Normal)
            }
            // Erased by lowering; inert if they ever reach execution.
            Stmt::Interface(_) | Stmt::TypeAlias(_) | Stmt::Import(_) | Stmt::Empty => {
                Ok(Flow::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval_expr(expr, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(value, _) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    self.exec_stmt(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch, env)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body } => {
                while self.eval_expr(cond, env)?.is_truthy() {
                    self.charge()?;
                    match self.exec_stmt(body, env)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                let scope = env.child();
                if let Some(init) = init {
                    self.exec_stmt(init, &scope)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.eval_expr(cond, &scope)?.is_truthy() {
                            break;
                        }
                    }
                    self.charge()?;
                    match self.exec_stmt(body, &scope)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                    if let Some(update) = update {
                        self.eval_expr(update, &scope)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::ForOf {
                binding,
                iterable,
                body,
            } => {
                let iterable = self.eval_expr(iterable, env)?;
                let elements: Vec<Value> = match &iterable {
                    Value::Array(elements) => elements.borrow().clone(),
                    Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
                    other => {
                        return Err(RuntimeError::Type(format!(
                            "{} is not iterable",
                            other.type_of()
                        )));
                    }
                };
                for element in elements {
                    self.charge()?;
                    let scope = env.child();
                    scope.define(binding, element);
                    match self.exec_stmt(body, &scope)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Block(stmts) => {
                let scope = env.child();
                self.exec_block(stmts, &scope)
            }
            Stmt::Throw(expr, _) => {
                let value = self.eval_expr(expr, env)?;
                Err(RuntimeError::Thrown(value))
            }
            Stmt::Try {
                block,
                catch,
                finally,
            } => {
                let scope = env.child();
                let mut outcome = self.exec_block(block, &scope);
                if let (Err(error), Some(clause)) = (&outcome, catch) {
                    // Sandbox budget errors are not catchable by user code.
                    if !matches!(
                        error,
                        RuntimeError::FuelExhausted | RuntimeError::CallDepthExceeded
                    ) {
                        let caught = match error {
                            RuntimeError::Thrown(value) => value.clone(),
                            other => Value::string(other.to_string()),
                        };
                        let scope = env.child();
                        if let Some(binding) = &clause.binding {
                            scope.define(binding, caught);
                        }
                        outcome = self.exec_block(&clause.block, &scope);
                    }
                }
                if let Some(finally) = finally {
                    let scope = env.child();
                    match self.exec_block(finally, &scope)? {
                        Flow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
                outcome
            }
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn eval_expr(&mut self, expr: &Expr, env: &Env) -> Result<Value, RuntimeError> {
        self.charge()?;
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::string(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Ident(name) => env
                .get(name)
                .ok_or_else(|| RuntimeError::Reference(name.clone())),
            Expr::Paren(inner) => self.eval_expr(inner, env),
            Expr::Template(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expr(expr) => {
                            let value = self.eval_expr(expr, env)?;
                            out.push_str(&value.to_string());
                        }
                    }
                }
                Ok(Value::string(out))
            }
            Expr::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element, env)?);
                }
                Ok(Value::array(values))
            }
            Expr::Object(properties) => {
                let mut map = indexmap::IndexMap::new();
                for (key, value) in properties {
                    map.insert(key.clone(), self.eval_expr(value, env)?);
                }
                Ok(Value::object(map))
            }
            Expr::Arrow { params, body } => Ok(Value::Function(Rc::new(Closure {
                name: None,
                params: params.clone(),
                body: match body {
                    ArrowBody::Expr(expr) => FunctionBody::Expr(Rc::new((**expr).clone())),
                    ArrowBody::Block(stmts) => FunctionBody::Block(Rc::new(stmts.clone())),
                },
                env: env.clone(),
            }))),
            Expr::FunctionExpr(func) => Ok(self.make_closure(func, env)),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand, env),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right, env),
            Expr::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    self.eval_expr(then_expr, env)
                } else {
                    self.eval_expr(else_expr, env)
                }
            }
            Expr::Member { object, property } => {
                let object = self.eval_expr(object, env)?;
                Ok(self.get_property(&object, property))
            }
            Expr::Index { object, index } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                Ok(self.get_index(&object, &index))
            }
            Expr::Call { callee, args } => {
                let mut values = Vec::with_capacity(args.len());
                // Method calls dispatch on the receiver without
                // materializing a bound-function value.
                if let Expr::Member { object, property } = callee.as_ref() {
                    let receiver = self.eval_expr(object, env)?;
                    for arg in args {
                        values.push(self.eval_expr(arg, env)?);
                    }
                    return self.call_method(receiver, property, values);
                }
                let callee = self.eval_expr(callee, env)?;
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                self.call_function(callee, values)
            }
            Expr::New { callee, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                let ctor = env
                    .get(callee)
                    .ok_or_else(|| RuntimeError::Reference(callee.clone()))?;
                match ctor {
                    Value::Native(native) => (native.func)(&values),
                    _ => Err(RuntimeError::Type(format!(
                        "`new {callee}` is not supported in the sandbox"
                    ))),
                }
            }
            Expr::Assign { op, target, value } => self.eval_assign(*op, target, value, env),
        }
    }

    fn eval_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        env: &Env,
    ) -> Result<Value, RuntimeError> {
        // `typeof missing` must not throw a reference error.
        if op == UnaryOp::TypeOf {
            if let Expr::Ident(name) = operand {
                return Ok(match env.get(name) {
                    Some(value) => Value::string(value.type_of()),
                    None => Value::string("undefined"),
                });
            }
            let value = self.eval_expr(operand, env)?;
            return Ok(Value::string(value.type_of()));
        }
        let value = self.eval_expr(operand, env)?;
        Ok(match op {
            UnaryOp::Neg => Value::Number(-value.to_number()),
            UnaryOp::Pos => Value::Number(value.to_number()),
            UnaryOp::Not => Value::Bool(!value.is_truthy()),
            UnaryOp::TypeOf => unreachable!("handled above"),
        })
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        env: &Env,
    ) -> Result<Value, RuntimeError> {
        // Short-circuit forms never evaluate the right operand eagerly.
        match op {
            BinaryOp::And => {
                let left = self.eval_expr(left, env)?;
                return if left.is_truthy() {
                    self.eval_expr(right, env)
                } else {
                    Ok(left)
                };
            }
            BinaryOp::Or => {
                let left = self.eval_expr(left, env)?;
                return if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval_expr(right, env)
                };
            }
            BinaryOp::Coalesce => {
                let left = self.eval_expr(left, env)?;
                return if left.is_nullish() {
                    self.eval_expr(right, env)
                } else {
                    Ok(left)
                };
            }
            _ => {}
        }

        let lhs = self.eval_expr(left, env)?;
        let rhs = self.eval_expr(right, env)?;
        Ok(match op {
            BinaryOp::Add => add_values(&lhs, &rhs),
            BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
            BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
            BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
            BinaryOp::Mod => Value::Number(lhs.to_number() % rhs.to_number()),
            BinaryOp::Eq => Value::Bool(lhs.loose_equals(&rhs)),
            BinaryOp::StrictEq => Value::Bool(lhs.strict_equals(&rhs)),
            BinaryOp::Ne => Value::Bool(!lhs.loose_equals(&rhs)),
            BinaryOp::StrictNe => Value::Bool(!lhs.strict_equals(&rhs)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                compare_values(op, &lhs, &rhs)
            }
            BinaryOp::In => {
                let key = lhs.to_string();
                match &rhs {
                    Value::Object(object) => Value::Bool(object.borrow().contains_key(&key)),
                    Value::Array(elements) => {
                        let index = lhs.to_number();
                        Value::Bool(
                            index >= 0.0 && (index as usize) < elements.borrow().len(),
                        )
                    }
                    other => {
                        return Err(RuntimeError::Type(format!(
                            "cannot use `in` on {}",
                            other.type_of()
                        )));
                    }
                }
            }
            BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => unreachable!("handled above"),
        })
    }

    fn eval_assign(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
        env: &Env,
    ) -> Result<Value, RuntimeError> {
        let new_value = |interp: &mut Self, current: Option<Value>| -> Result<Value, RuntimeError> {
            let rhs = interp.eval_expr(value, env)?;
            Ok(match op {
                AssignOp::Assign => rhs,
                AssignOp::Add => add_values(&current.unwrap_or(Value::Undefined), &rhs),
                AssignOp::Sub => Value::Number(
                    current.unwrap_or(Value::Undefined).to_number() - rhs.to_number(),
                ),
                AssignOp::Mul => Value::Number(
                    current.unwrap_or(Value::Undefined).to_number() * rhs.to_number(),
                ),
                AssignOp::Div => Value::Number(
                    current.unwrap_or(Value::Undefined).to_number() / rhs.to_number(),
                ),
            })
        };

        match target {
            Expr::Ident(name) => {
                let current = if op == AssignOp::Assign {
                    None
                } else {
                    Some(
                        env.get(name)
                            .ok_or_else(|| RuntimeError::Reference(name.clone()))?,
                    )
                };
                let result = new_value(self, current)?;
                if !env.set(name, result.clone()) {
                    // Assignment to an undeclared name defines it at the
                    // current scope, close enough to sloppy-mode JS.
                    env.define(name, result.clone());
                }
                Ok(result)
            }
            Expr::Member { object, property } => {
                let object = self.eval_expr(object, env)?;
                let current = (op != AssignOp::Assign).then(|| self.get_property(&object, property));
                let result = new_value(self, current)?;
                self.set_property(&object, property, result.clone())?;
                Ok(result)
            }
            Expr::Index { object, index } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                let current = (op != AssignOp::Assign).then(|| self.get_index(&object, &index));
                let result = new_value(self, current)?;
                self.set_index(&object, &index, result.clone())?;
                Ok(result)
            }
            _ => Err(RuntimeError::Type("invalid assignment target".to_string())),
        }
    }

    // =========================================================================
    // Property access
    // =========================================================================

    fn get_property(&self, object: &Value, property: &str) -> Value {
        match object {
            Value::Str(s) if property == "length" => {
                Value::Number(s.chars().count() as f64)
            }
            Value::Array(elements) if property == "length" => {
                Value::Number(elements.borrow().len() as f64)
            }
            Value::Object(map) => map.borrow().get(property).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    fn set_property(
        &self,
        object: &Value,
        property: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        match object {
            Value::Object(map) => {
                map.borrow_mut().insert(property.to_string(), value);
                Ok(())
            }
            other => Err(RuntimeError::Type(format!(
                "cannot set property `{property}` on {}",
                other.type_of()
            ))),
        }
    }

    fn get_index(&self, object: &Value, index: &Value) -> Value {
        match object {
            Value::Array(elements) => {
                let i = index.to_number();
                if i >= 0.0 && i.fract() == 0.0 {
                    elements
                        .borrow()
                        .get(i as usize)
                        .cloned()
                        .unwrap_or(Value::Undefined)
                } else {
                    Value::Undefined
                }
            }
            Value::Object(map) => map
                .borrow()
                .get(&index.to_string())
                .cloned()
                .unwrap_or(Value::Undefined),
            Value::Str(s) => {
                let i = index.to_number();
                if i >= 0.0 && i.fract() == 0.0 {
                    s.chars()
                        .nth(i as usize)
                        .map(|c| Value::string(c.to_string()))
                        .unwrap_or(Value::Undefined)
                } else {
                    Value::Undefined
                }
            }
            _ => Value::Undefined,
        }
    }

    fn set_index(&self, object: &Value, index: &Value, value: Value) -> Result<(), RuntimeError> {
        match object {
            Value::Array(elements) => {
                let i = index.to_number();
                if i < 0.0 || i.fract() != 0.0 {
                    return Err(RuntimeError::Type("invalid array index".to_string()));
                }
                let i = i as usize;
                let mut elements = elements.borrow_mut();
                if i >= elements.len() {
                    elements.resize(i + 1, Value::Undefined);
                }
                elements[i] = value;
                Ok(())
            }
            Value::Object(map) => {
                map.borrow_mut().insert(index.to_string(), value);
                Ok(())
            }
            other => Err(RuntimeError::Type(format!(
                "cannot index into {}",
                other.type_of()
            ))),
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn make_closure(&self, func: &FunctionDecl, env: &Env) -> Value {
        Value::Function(Rc::new(Closure {
            name: func.name.clone(),
            params: func.params.clone(),
            body: FunctionBody::Block(Rc::new(func.body.clone())),
            env: env.clone(),
        }))
    }

    pub fn call_function(
        &mut self,
        callee: Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(closure) => self.call_closure(&closure, args),
            Value::Native(native) => (native.func)(&args),
            other => Err(RuntimeError::Type(format!(
                "{} is not a function",
                other.type_of()
            ))),
        }
    }

    fn call_closure(&mut self, closure: &Closure, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if self.depth >= limits::MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded);
        }
        self.depth += 1;
        let result = self.call_closure_inner(closure, args);
        self.depth -= 1;
        result
    }

    fn call_closure_inner(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let scope = closure.env.child();
        for (i, param) in closure.params.iter().enumerate() {
            let mut value = args.get(i).cloned().unwrap_or(Value::Undefined);
            if matches!(value, Value::Undefined) {
                if let Some(default) = &param.default_value {
                    value = self.eval_expr(default, &scope)?;
                }
            }
            scope.define(&param.name, value);
        }
        match &closure.body {
            FunctionBody::Expr(expr) => self.eval_expr(expr, &scope),
            FunctionBody::Block(stmts) => match self.exec_block(stmts, &scope)? {
                Flow::Return(value) => Ok(value),
                _ => Ok(Value::Undefined),
            },
        }
    }

    /// Built-in method dispatch on the receiver type, plus calls of
    /// function-valued object properties.
    fn call_method(
        &mut self,
        receiver: Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match &receiver {
            Value::Str(s) => self.call_string_method(s, method, &args),
            Value::Array(_) => self.call_array_method(&receiver, method, args),
            Value::Number(n) => match method {
                "toFixed" => {
                    let digits = args.first().map(|v| v.to_number()).unwrap_or(0.0) as usize;
                    Ok(Value::string(format!("{n:.digits$}")))
                }
                "toString" => Ok(Value::string(format_number(*n))),
                _ => Err(unknown_method("number", method)),
            },
            Value::Object(map) => {
                let member = map.borrow().get(method).cloned();
                match member {
                    Some(function @ (Value::Function(_) | Value::Native(_))) => {
                        self.call_function(function, args)
                    }
                    Some(other) => Err(RuntimeError::Type(format!(
                        "property `{method}` is not a function (got {})",
                        other.type_of()
                    ))),
                    None => Err(unknown_method("object", method)),
                }
            }
            other => Err(RuntimeError::Type(format!(
                "cannot call method `{method}` on {}",
                other.type_of()
            ))),
        }
    }

    fn call_string_method(
        &mut self,
        s: &Rc<String>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let arg_str = |i: usize| args.get(i).map(|v| v.to_string()).unwrap_or_default();
        Ok(match method {
            "toUpperCase" => Value::string(s.to_uppercase()),
            "toLowerCase" => Value::string(s.to_lowercase()),
            "trim" => Value::string(s.trim().to_string()),
            "includes" => Value::Bool(s.contains(&arg_str(0))),
            "startsWith" => Value::Bool(s.starts_with(&arg_str(0))),
            "endsWith" => Value::Bool(s.ends_with(&arg_str(0))),
            "indexOf" => {
                let needle = arg_str(0);
                match s.find(&needle) {
                    Some(byte_idx) => Value::Number(s[..byte_idx].chars().count() as f64),
                    None => Value::Number(-1.0),
                }
            }
            "charAt" => {
                let i = args.first().map(|v| v.to_number()).unwrap_or(0.0);
                s.chars()
                    .nth(i.max(0.0) as usize)
                    .map(|c| Value::string(c.to_string()))
                    .unwrap_or(Value::string(""))
            }
            "slice" => {
                let chars: Vec<char> = s.chars().collect();
                let len = chars.len() as f64;
                let clamp = |v: f64| -> usize {
                    let v = if v < 0.0 { len + v } else { v };
                    v.clamp(0.0, len) as usize
                };
                let start = clamp(args.first().map(|v| v.to_number()).unwrap_or(0.0));
                let end = clamp(args.get(1).map(|v| v.to_number()).unwrap_or(len));
                if start < end {
                    Value::string(chars[start..end].iter().collect::<String>())
                } else {
                    Value::string("")
                }
            }
            "split" => {
                let sep = arg_str(0);
                let parts: Vec<Value> = if sep.is_empty() {
                    s.chars().map(|c| Value::string(c.to_string())).collect()
                } else {
                    s.split(&sep).map(Value::string).collect()
                };
                Value::array(parts)
            }
            "repeat" => {
                let count = args.first().map(|v| v.to_number()).unwrap_or(0.0);
                if count < 0.0 || count > 10_000.0 {
                    return Err(RuntimeError::Type("invalid repeat count".to_string()));
                }
                Value::string(s.repeat(count as usize))
            }
            "concat" => {
                let mut out = s.as_ref().clone();
                for arg in args {
                    out.push_str(&arg.to_string());
                }
                Value::string(out)
            }
            "toString" => Value::string(s.as_ref().clone()),
            _ => return Err(unknown_method("string", method)),
        })
    }

    fn call_array_method(
        &mut self,
        receiver: &Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let Value::Array(elements) = receiver else {
            unreachable!("caller checked the receiver");
        };
        match method {
            "push" => {
                let mut elements = elements.borrow_mut();
                for arg in args {
                    elements.push(arg);
                }
                Ok(Value::Number(elements.len() as f64))
            }
            "pop" => Ok(elements.borrow_mut().pop().unwrap_or(Value::Undefined)),
            "join" => {
                let sep = args
                    .first()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| ",".to_string());
                let joined = elements
                    .borrow()
                    .iter()
                    .map(|v| {
                        if v.is_nullish() {
                            String::new()
                        } else {
                            v.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(&sep);
                Ok(Value::string(joined))
            }
            "includes" => {
                let needle = args.first().cloned().unwrap_or(Value::Undefined);
                Ok(Value::Bool(
                    elements.borrow().iter().any(|v| v.strict_equals(&needle)),
                ))
            }
            "indexOf" => {
                let needle = args.first().cloned().unwrap_or(Value::Undefined);
                let index = elements
                    .borrow()
                    .iter()
                    .position(|v| v.strict_equals(&needle));
                Ok(Value::Number(index.map(|i| i as f64).unwrap_or(-1.0)))
            }
            "slice" => {
                let snapshot = elements.borrow().clone();
                let len = snapshot.len() as f64;
                let clamp = |v: f64| -> usize {
                    let v = if v < 0.0 { len + v } else { v };
                    v.clamp(0.0, len) as usize
                };
                let start = clamp(args.first().map(|v| v.to_number()).unwrap_or(0.0));
                let end = clamp(args.get(1).map(|v| v.to_number()).unwrap_or(len));
                let slice = if start < end {
                    snapshot[start..end].to_vec()
                } else {
                    Vec::new()
                };
                Ok(Value::array(slice))
            }
            "concat" => {
                let mut out = elements.borrow().clone();
                for arg in args {
                    match arg {
                        Value::Array(more) => out.extend(more.borrow().iter().cloned()),
                        other => out.push(other),
                    }
                }
                Ok(Value::array(out))
            }
            "reverse" => {
                elements.borrow_mut().reverse();
                Ok(receiver.clone())
            }
            "map" => {
                let callback = args.into_iter().next().unwrap_or(Value::Undefined);
                let snapshot = elements.borrow().clone();
                let mut out = Vec::with_capacity(snapshot.len());
                for (i, element) in snapshot.into_iter().enumerate() {
                    out.push(
                        self.call_function(callback.clone(), vec![element, Value::Number(i as f64)])?,
                    );
                }
                Ok(Value::array(out))
            }
            "filter" => {
                let callback = args.into_iter().next().unwrap_or(Value::Undefined);
                let snapshot = elements.borrow().clone();
                let mut out = Vec::new();
                for (i, element) in snapshot.into_iter().enumerate() {
                    let keep = self.call_function(
                        callback.clone(),
                        vec![element.clone(), Value::Number(i as f64)],
                    )?;
                    if keep.is_truthy() {
                        out.push(element);
                    }
                }
                Ok(Value::array(out))
            }
            "forEach" => {
                let callback = args.into_iter().next().unwrap_or(Value::Undefined);
                let snapshot = elements.borrow().clone();
                for (i, element) in snapshot.into_iter().enumerate() {
                    self.call_function(callback.clone(), vec![element, Value::Number(i as f64)])?;
                }
                Ok(Value::Undefined)
            }
            _ => Err(unknown_method("array", method)),
        }
    }
}

fn unknown_method(receiver: &str, method: &str) -> RuntimeError {
    RuntimeError::Type(format!("{receiver}.{method} is not a function"))
}

/// `+` with JS semantics: string concatenation when either side is a
/// string (or stringifies structurally), numeric addition otherwise.
fn add_values(lhs: &Value, rhs: &Value) -> Value {
    let stringy = |v: &Value| matches!(v, Value::Str(_) | Value::Array(_) | Value::Object(_));
    if stringy(lhs) || stringy(rhs) {
        Value::string(format!("{lhs}{rhs}"))
    } else {
        Value::Number(lhs.to_number() + rhs.to_number())
    }
}

fn compare_values(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    if let (Value::Str(a), Value::Str(b)) = (lhs, rhs) {
        return Value::Bool(match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Ge => a >= b,
            _ => unreachable!(),
        });
    }
    let a = lhs.to_number();
    let b = rhs.to_number();
    if a.is_nan() || b.is_nan() {
        return Value::Bool(false);
    }
    Value::Bool(match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Ge => a >= b,
        _ => unreachable!(),
    })
}
