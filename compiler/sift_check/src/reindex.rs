//! State layout: bit offset assignment.

use sift_diagnostic::{Diagnostic, Result};
use sift_ir::{Ast, DeclKind, Model};
use tracing::debug;

/// Assign each state variable its bit offset within the packed state
/// vector, in declaration order, and record the total width on the model.
///
/// Safe to re-run after any AST rewrite; offsets are recomputed from
/// scratch each time.
pub fn reindex(ast: &mut Ast, model: &mut Model) -> Result<()> {
    let mut offset: u64 = 0;
    for &decl in &model.decls {
        let DeclKind::Var {
            ty,
            state_variable: true,
            ..
        } = ast.decl(decl).kind
        else {
            continue;
        };
        let width = ast.type_width(ty).ok_or_else(|| {
            Diagnostic::type_error(
                ast.decl(decl).span,
                "state variable's type has no computable width",
            )
        })?;
        match &mut ast.decl_mut(decl).kind {
            DeclKind::Var { offset: slot, .. } => *slot = offset,
            _ => unreachable!("node kind changed during reindex"),
        }
        offset = offset.checked_add(width).ok_or_else(|| {
            Diagnostic::type_error(ast.decl(decl).span, "state size overflows")
        })?;
    }
    model.state_size_bits = offset;
    debug!(state_size_bits = offset, "assigned state variable offsets");
    Ok(())
}
