/// Recursion limits for parsing and evaluation.
///
/// Both the parser and the evaluator recurse once per nesting level and grow
/// the native stack as they go, so the limits bound memory use. Input past a
/// limit is an ordinary error instead of runaway recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum list nesting accepted by the parser
    pub max_parse_depth: usize,
    /// Maximum nested evaluation depth, counting calls and sub-expressions
    pub max_eval_depth: usize,
}

/// Default maximum parse depth
pub const MAX_PARSE_DEPTH: usize = 512;

/// Default maximum evaluation depth.
/// Set higher than the parse depth to leave room for recursive calls.
pub const MAX_EVAL_DEPTH: usize = 1000;

impl Default for Config {
    fn default() -> Self {
        Config {
            max_parse_depth: MAX_PARSE_DEPTH,
            max_eval_depth: MAX_EVAL_DEPTH,
        }
    }
}
