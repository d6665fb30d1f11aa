use std::fmt;
use std::rc::Rc;

use crate::Error;
use crate::ast::{TokenKind, Value};
use crate::builtins::{Arity, find_builtin, is_builtin};
use crate::config::Config;
use crate::environment::Environment;
use crate::stack::ensure_sufficient_stack;

/// Result of evaluating an expression
#[derive(Debug, Clone)]
pub enum RuntimeValue {
    Integer(i64),
    Boolean(bool),
    Closure(Rc<Closure>),
}

impl RuntimeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            RuntimeValue::Integer(_) => "integer",
            RuntimeValue::Boolean(_) => "boolean",
            RuntimeValue::Closure(_) => "function",
        }
    }
}

// Functions compare by identity: two separately defined functions are never equal
impl PartialEq for RuntimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeValue::Integer(a), RuntimeValue::Integer(b)) => a == b,
            (RuntimeValue::Boolean(a), RuntimeValue::Boolean(b)) => a == b,
            (RuntimeValue::Closure(a), RuntimeValue::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for RuntimeValue {}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Integer(n) => write!(f, "{n}"),
            RuntimeValue::Boolean(b) => write!(f, "{b}"),
            RuntimeValue::Closure(closure) => write!(f, "{closure}"),
        }
    }
}

impl From<i64> for RuntimeValue {
    fn from(n: i64) -> Self {
        RuntimeValue::Integer(n)
    }
}

impl From<bool> for RuntimeValue {
    fn from(b: bool) -> Self {
        RuntimeValue::Boolean(b)
    }
}

/// User-defined function created by `func`
pub struct Closure {
    pub name: String,
    pub params: Vec<String>,
    /// Body expressions, evaluated in order like `begin`
    pub body: Vec<Value>,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Closure(name={}, params={:?}, body=[",
            self.name, self.params
        )?;
        for (i, expr) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{expr}")?;
        }
        write!(f, "])")
    }
}

impl fmt::Display for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<func {} ({})>", self.name, self.params.join(" "))
    }
}

/// Evaluation depth counter, carried by value down the recursion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    current: usize,
    max: usize,
}

impl Depth {
    pub fn new(max: usize) -> Self {
        Depth { current: 0, max }
    }

    fn next(self) -> Self {
        Depth {
            current: self.current + 1,
            ..self
        }
    }

    fn check(self) -> Result<(), Error> {
        if self.current >= self.max {
            return Err(Error::EvalError(format!(
                "evaluation depth limit exceeded (max: {})",
                self.max
            )));
        }
        Ok(())
    }
}

/// Evaluate an expression tree (public API)
pub fn eval(value: &Value, env: &mut Environment) -> Result<RuntimeValue, Error> {
    eval_with_config(value, env, &Config::default())
}

pub fn eval_with_config(
    value: &Value,
    env: &mut Environment,
    config: &Config,
) -> Result<RuntimeValue, Error> {
    eval_with_depth_tracking(value, env, Depth::new(config.max_eval_depth))
}

/// Evaluate a list expression in call position (public API)
pub fn eval_call(list: &Value, env: &mut Environment) -> Result<RuntimeValue, Error> {
    match list {
        Value::List { items, location } => {
            tracing::trace!(location, operands = items.len().saturating_sub(1), "eval_call");
            eval_list(
                items,
                *location,
                env,
                Depth::new(Config::default().max_eval_depth),
            )
        }
        Value::Literal(token) => Err(Error::TypeError(format!(
            "expected a call expression, found `{token}`"
        ))),
    }
}

/// Evaluate an expression with depth tracking to prevent stack overflow
fn eval_with_depth_tracking(
    value: &Value,
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    depth.check()?;
    ensure_sufficient_stack(|| eval_value(value, env, depth))
}

fn eval_value(
    value: &Value,
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    match value {
        Value::Literal(token) => match token.kind {
            TokenKind::Integer => token
                .value
                .parse::<i64>()
                .map(RuntimeValue::Integer)
                .map_err(|_| Error::ArithmeticError {
                    message: format!("integer literal `{}` does not fit in 64 bits", token.value),
                    location: token.location,
                }),
            TokenKind::Identifier => env.lookup(token),
            // The parser turns every syntax token into list structure
            TokenKind::Syntax => Err(Error::EvalError(format!(
                "unexpected `{}` at offset {}",
                token.value, token.location
            ))),
        },
        Value::List { items, location } => eval_list(items, *location, env, depth),
    }
}

/// Evaluate argument expressions left to right
fn eval_args(
    args: &[Value],
    env: &mut Environment,
    depth: Depth,
) -> Result<Vec<RuntimeValue>, Error> {
    args.iter()
        .map(|arg| eval_with_depth_tracking(arg, env, depth.next()))
        .collect()
}

/// Evaluate expressions in order and return the value of the last
fn eval_sequence(
    exprs: &[Value],
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    let mut last = None;
    for expr in exprs {
        last = Some(eval_with_depth_tracking(expr, env, depth.next())?);
    }
    last.ok_or_else(|| Error::EvalError("cannot evaluate an empty sequence".to_owned()))
}

/// Evaluate a list expression (builtin dispatch or function application)
///
/// An identifier naming a builtin wins over any binding, and the builtin gets
/// the operand expressions unevaluated. Anything else in operator position
/// must produce a closure, whose arguments are evaluated eagerly before the
/// call.
fn eval_list(
    items: &[Value],
    location: usize,
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    let Some((head, arg_exprs)) = items.split_first() else {
        return Err(Error::NotCallable {
            found: "()".to_owned(),
            location,
        });
    };

    let callee = match head {
        Value::Literal(token) if token.kind == TokenKind::Identifier => {
            if let Some(op) = find_builtin(&token.value) {
                tracing::trace!(builtin = op.name, operands = arg_exprs.len(), "builtin call");
                return op.invoke(arg_exprs, env, depth);
            }
            env.lookup(token)?
        }
        Value::Literal(token) => {
            return Err(Error::NotCallable {
                found: token.value.clone(),
                location: token.location,
            });
        }
        // `func` returns the function it defines, so a call can sit in operator position
        Value::List { .. } => eval_with_depth_tracking(head, env, depth.next())?,
    };

    let closure = match callee {
        RuntimeValue::Closure(closure) => closure,
        other => {
            tracing::debug!(callee = %head, kind = other.type_name(), "operator is not a function");
            return Err(Error::NotCallable {
                found: head.to_string(),
                location: head.location(),
            });
        }
    };

    let args = eval_args(arg_exprs, env, depth)?;
    call_closure(&closure, args, env, depth)
}

/// Apply a user function to evaluated arguments.
///
/// The call runs in a fork of the caller's current environment with the
/// parameters bound positionally on top. Everything the caller can see at
/// call time is visible to the body, including functions defined after this
/// one and the caller's own parameters.
fn call_closure(
    closure: &Closure,
    args: Vec<RuntimeValue>,
    caller: &Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    Arity::Exact(closure.params.len()).validate(&closure.name, args.len())?;

    let mut local = caller.fork();
    for (param, arg) in closure.params.iter().zip(args) {
        local.bind(param.clone(), arg);
    }

    tracing::debug!(function = %closure.name, "calling function");
    eval_sequence(&closure.body, &mut local, depth.next())
}

fn expect_integer(op: &str, value: RuntimeValue) -> Result<i64, Error> {
    match value {
        RuntimeValue::Integer(n) => Ok(n),
        other => Err(Error::TypeError(format!(
            "`{op}` expects integer operands, got {} `{other}`",
            other.type_name()
        ))),
    }
}

/// Evaluate `if` special form
pub(crate) fn eval_if(
    args: &[Value],
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    match args {
        [condition_expr, then_expr, else_expr] => {
            let condition = eval_with_depth_tracking(condition_expr, env, depth.next())?;
            match condition {
                RuntimeValue::Boolean(true) => eval_with_depth_tracking(then_expr, env, depth.next()),
                RuntimeValue::Boolean(false) => {
                    eval_with_depth_tracking(else_expr, env, depth.next())
                }
                other => Err(Error::TypeError(format!(
                    "`if` condition must be a boolean, got {} `{other}`",
                    other.type_name()
                ))),
            }
        }
        _ => Err(Error::arity_error("if", Arity::Exact(3), args.len())),
    }
}

/// Evaluate `+`: checked sum of every operand, 0 for none
pub(crate) fn eval_add(
    args: &[Value],
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    let mut sum: i64 = 0;
    for arg in args {
        let n = expect_integer("+", eval_with_depth_tracking(arg, env, depth.next())?)?;
        sum = sum.checked_add(n).ok_or_else(|| Error::ArithmeticError {
            message: "integer overflow in addition".into(),
            location: arg.location(),
        })?;
    }
    Ok(RuntimeValue::Integer(sum))
}

/// Evaluate `-`: the first operand minus each of the rest.
/// A single operand is returned as is, not negated.
pub(crate) fn eval_sub(
    args: &[Value],
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    let [first, rest @ ..] = args else {
        return Err(Error::arity_error("-", Arity::AtLeast(1), 0));
    };

    let mut result = expect_integer("-", eval_with_depth_tracking(first, env, depth.next())?)?;
    for arg in rest {
        let n = expect_integer("-", eval_with_depth_tracking(arg, env, depth.next())?)?;
        result = result.checked_sub(n).ok_or_else(|| Error::ArithmeticError {
            message: "integer overflow in subtraction".into(),
            location: arg.location(),
        })?;
    }
    Ok(RuntimeValue::Integer(result))
}

/// Evaluate `begin`: every operand in the calling environment, in order
pub(crate) fn eval_begin(
    args: &[Value],
    env: &mut Environment,
    depth: Depth,
) -> Result<RuntimeValue, Error> {
    if args.is_empty() {
        return Err(Error::arity_error("begin", Arity::AtLeast(1), 0));
    }
    eval_sequence(args, env, depth)
}

/// Evaluate `func`: define a function in the calling environment and return it
pub(crate) fn eval_func(
    args: &[Value],
    env: &mut Environment,
    _depth: Depth,
) -> Result<RuntimeValue, Error> {
    let [name_expr, params_expr, body @ ..] = args else {
        return Err(Error::arity_error("func", Arity::AtLeast(3), args.len()));
    };
    if body.is_empty() {
        return Err(Error::arity_error("func", Arity::AtLeast(3), args.len()));
    }

    let Some(name) = name_expr.as_identifier() else {
        return Err(Error::TypeError(format!(
            "`func` name must be an identifier, got `{name_expr}`"
        )));
    };
    if is_builtin(name) {
        return Err(Error::EvalError(format!("cannot redefine builtin `{name}`")));
    }

    let Some(param_exprs) = params_expr.as_list() else {
        return Err(Error::TypeError(format!(
            "`func` parameters must be a list, got `{params_expr}`"
        )));
    };
    let mut params: Vec<String> = Vec::with_capacity(param_exprs.len());
    for param in param_exprs {
        let Some(param_name) = param.as_identifier() else {
            return Err(Error::TypeError(format!(
                "parameters of `{name}` must be identifiers, got `{param}`"
            )));
        };
        if params.iter().any(|p| p == param_name) {
            return Err(Error::EvalError(format!(
                "duplicate parameter name `{param_name}` in `{name}`"
            )));
        }
        params.push(param_name.to_owned());
    }

    tracing::debug!(function = name, params = ?params, "defining function");

    // Redefinition silently replaces the earlier binding
    let closure = Rc::new(Closure {
        name: name.to_owned(),
        params,
        body: body.to_vec(),
    });
    env.bind(name, RuntimeValue::Closure(Rc::clone(&closure)));
    Ok(RuntimeValue::Closure(closure))
}
