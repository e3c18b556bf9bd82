//! # Formula System
//!
//! The transform module implements the small formula language used by derived
//! fields.
//!
//! ## Components
//!
//! * `ast` - Template segments and the typed expression tree
//! * `parser` - Label-token template compiler and call parser
//! * `interpreter` - Interpreter for the `SUM`, `CONCAT` and `AGE` builtins
//! * `executor` - Evaluates a field's formula against the current form values
//!
//! ## Architecture
//!
//! A derived field names its parents in the formula by a token built from each
//! parent's label. Evaluation proceeds as:
//!
//! 1. Compile the formula into a template of literal text and field references
//! 2. Render the template with the current values
//! 3. Parse the rendered text into a builtin call or a literal
//! 4. Interpret the expression to the stored text
//!
//! Text that is not a recognised call, such as `IF(a > 100, "High", "Low")`,
//! is returned as rendered. Failures produce an empty string.

pub mod ast;
pub mod executor;
pub mod interpreter;
pub mod parser;

// Public re-exports
pub use ast::{Builtin, Expression, Segment, Template};
pub use executor::{evaluate, FormulaExecutor};
pub use interpreter::Interpreter;
pub use parser::{Binding, TransformParser};
