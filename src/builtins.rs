//! Builtin special-form registry.
//!
//! Builtins receive their operand expressions *unevaluated* together with the
//! calling environment, and decide for themselves what to evaluate and when:
//!
//! ```text
//! (if cond then else)         ; evaluates cond, then exactly one branch
//! (+ a b ...)                 ; sum, zero operands give 0
//! (- a b ...)                 ; a minus the rest, at least one operand
//! (begin e1 e2 ...)           ; evaluates in order, value of the last
//! (func name (p ...) e1 ...)  ; binds a function in the calling environment
//! ```
//!
//! User functions, by contrast, are ordinary bindings and always receive
//! evaluated arguments; see [`crate::evaluator`].
//!
//! The registry is built once on first use and never changes afterwards.
//! Builtin names are reserved: `func` refuses to rebind them.
//!
//! ## Adding New Operations
//!
//! 1. **Implement the form** with the [`SpecialForm`] signature in the evaluator
//! 2. **Add to BUILTIN_OPS** with its name and arity
//! 3. **Add tests** for evaluation order and error conditions

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::Error;
use crate::ast::Value;
use crate::environment::Environment;
use crate::evaluator::{Depth, RuntimeValue, eval_add, eval_begin, eval_func, eval_if, eval_sub};

/// Operand count accepted by a builtin or function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    /// Check `got` operands against this arity for the callable called `name`
    pub fn validate(self, name: &str, got: usize) -> Result<(), Error> {
        let ok = match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::arity_error(name, self, got))
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Builtin implementation: unevaluated operands, the calling environment and
/// the current evaluation depth
pub type SpecialForm = fn(&[Value], &mut Environment, Depth) -> Result<RuntimeValue, Error>;

/// Definition of a builtin operation
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    pub name: &'static str,
    pub form: SpecialForm,
    pub arity: Arity,
}

impl BuiltinOp {
    /// Validate the operand count, then run the form
    pub(crate) fn invoke(
        &self,
        args: &[Value],
        env: &mut Environment,
        depth: Depth,
    ) -> Result<RuntimeValue, Error> {
        self.arity.validate(self.name, args.len())?;
        (self.form)(args, env, depth)
    }
}

/// Global registry of all builtin operations
static BUILTIN_OPS: LazyLock<Vec<BuiltinOp>> = LazyLock::new(|| {
    vec![
        BuiltinOp {
            name: "if",
            form: eval_if,
            arity: Arity::Exact(3),
        },
        BuiltinOp {
            name: "+",
            form: eval_add,
            arity: Arity::AtLeast(0),
        },
        BuiltinOp {
            name: "-",
            form: eval_sub,
            arity: Arity::AtLeast(1),
        },
        BuiltinOp {
            name: "begin",
            form: eval_begin,
            // A sequence with nothing in it has no value to return
            arity: Arity::AtLeast(1),
        },
        BuiltinOp {
            name: "func",
            form: eval_func,
            // Name, parameter list and at least one body expression
            arity: Arity::AtLeast(3),
        },
    ]
});

/// Lazy static map from name to BuiltinOp (private - use find_builtin)
static BUILTIN_INDEX: LazyLock<HashMap<&'static str, &'static BuiltinOp>> = LazyLock::new(|| {
    let ops: &'static [BuiltinOp] = BUILTIN_OPS.as_slice();
    ops.iter().map(|op| (op.name, op)).collect()
});

pub fn builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS.as_slice()
}

pub fn find_builtin(name: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_INDEX.get(name).copied()
}

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_INDEX.contains_key(name)
}
