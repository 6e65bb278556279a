//! C rendering, one module per construct family.
//!
//! - [`prelude`]: configuration defines and the embedded runtime template
//! - [`expr`]: lvalue/rvalue expression rendering
//! - [`stmt`]: statement rendering
//! - [`function`]: constants and function definitions
//! - [`rules`]: guard/rule/startstate/property functions, `init`, `explore`
//! - [`print`]: the generated `state_print`

mod expr;
mod function;
mod prelude;
mod print;
mod rules;
mod stmt;

use crate::Emitter;
use sift_diagnostic::Result;

impl Emitter<'_> {
    /// Emit the whole translation unit.
    pub fn emit_translation_unit(&mut self) -> Result<()> {
        self.emit_prelude()?;
        self.emit_runtime();
        self.emit_constants()?;
        self.emit_functions()?;
        self.emit_rules()?;
        self.emit_state_print()?;
        Ok(())
    }
}
