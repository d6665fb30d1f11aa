use rpds::HashTrieMap;

use crate::Error;
use crate::ast::Token;
use crate::evaluator::RuntimeValue;

/// Name-to-value bindings for one evaluation frame.
///
/// Environments have value semantics: [`Environment::fork`] hands out an
/// independent copy, and binding a name in either copy is never visible in
/// the other. The map is persistent, so a fork shares structure with its
/// origin and costs O(1) instead of copying every binding.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashTrieMap<String, RuntimeValue>,
}

impl Environment {
    /// An environment with no bindings at all
    pub fn new() -> Self {
        Environment {
            bindings: HashTrieMap::new(),
        }
    }

    /// The top-level environment of a program run.
    ///
    /// There is no boolean literal syntax, so `true` and `false` are
    /// ordinary bindings made here.
    pub fn root() -> Self {
        let mut env = Environment::new();
        env.bind("true", RuntimeValue::Boolean(true));
        env.bind("false", RuntimeValue::Boolean(false));
        env
    }

    pub fn get(&self, name: &str) -> Option<&RuntimeValue> {
        self.bindings.get(name)
    }

    /// Resolve an identifier token, failing with `NameError` at its location
    pub fn lookup(&self, token: &Token) -> Result<RuntimeValue, Error> {
        self.get(&token.value)
            .cloned()
            .ok_or_else(|| Error::NameError {
                name: token.value.clone(),
                location: token.location,
            })
    }

    /// Bind `name`, replacing any previous binding in this environment only
    pub fn bind(&mut self, name: impl Into<String>, value: RuntimeValue) {
        self.bindings.insert_mut(name.into(), value);
    }

    /// An independent copy for a new call frame
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.bindings.size()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings as `(name, value)` pairs sorted by name
    pub fn bindings(&self) -> Vec<(String, RuntimeValue)> {
        let mut result: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}
