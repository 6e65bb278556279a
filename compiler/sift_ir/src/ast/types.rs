//! Type expression nodes and their derived operations.
//!
//! The value encoding shared with the emitted checker lives here too: a
//! field of width `w` stores `0` for "undefined" and `v - lb + 1` for a
//! defined value `v`, so a type with `n` distinct values needs
//! `ceil(log2(n + 1))` bits.

use crate::{Ast, DeclId, ExprId, Name, Span, TypeId};

/// A type expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeExpr {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// `lo..hi`, both bounds inclusive and constant.
    Range { min: ExprId, max: ExprId },

    /// `enum { a, b, c }` - ordered members.
    Enum { members: Vec<(Name, Span)> },

    /// `scalarset(n)` - a symmetry domain, checked as the plain range
    /// `0..n-1`.
    Scalarset { bound: ExprId },

    /// `array [index_type] of element_type`.
    Array { index: TypeId, element: TypeId },

    /// `record f1: t1; f2: t2; end` - fields are `Var` decls with
    /// `state_variable == false`; their in-record offsets are derived, not
    /// stored.
    Record { fields: Vec<DeclId> },

    /// A reference to a `type` declaration, resolved to its referent.
    Named {
        name: Name,
        referent: Option<DeclId>,
    },
}

/// Number of bits needed to distinguish `encodings` values, i.e.
/// `ceil(log2(encodings))`.
fn bits_for(encodings: u128) -> u64 {
    if encodings <= 1 {
        return 0;
    }
    u64::from(u128::BITS - (encodings - 1).leading_zeros())
}

impl Ast {
    /// Chase `Named` references down to a concrete type.
    ///
    /// Returns the input unchanged for unresolved names; resolution errors
    /// are reported by the resolver, not here.
    pub fn resolve_type(&self, ty: TypeId) -> TypeId {
        let mut current = ty;
        loop {
            match &self.type_expr(current).kind {
                TypeKind::Named {
                    referent: Some(decl),
                    ..
                } => match &self.decl(*decl).kind {
                    crate::DeclKind::Type { value } => current = *value,
                    _ => return current,
                },
                _ => return current,
            }
        }
    }

    /// True for types whose values fit in one scalar: ranges, enums and
    /// scalarsets.
    pub fn type_is_simple(&self, ty: TypeId) -> bool {
        matches!(
            self.type_expr(self.resolve_type(ty)).kind,
            TypeKind::Range { .. } | TypeKind::Enum { .. } | TypeKind::Scalarset { .. }
        )
    }

    /// Number of distinct values of the type.
    ///
    /// `None` if a bound is not constant or the count overflows; validation
    /// guarantees neither happens in a checked model.
    pub fn type_count(&self, ty: TypeId) -> Option<u128> {
        match &self.type_expr(self.resolve_type(ty)).kind {
            TypeKind::Range { min, max } => {
                let lo = self.constant_fold(*min)?;
                let hi = self.constant_fold(*max)?;
                if hi < lo {
                    Some(0)
                } else {
                    u128::try_from(hi - lo + 1).ok()
                }
            }
            TypeKind::Enum { members } => Some(members.len() as u128),
            TypeKind::Scalarset { bound } => {
                let b = self.constant_fold(*bound)?;
                u128::try_from(b).ok()
            }
            TypeKind::Array { index, element } => {
                let per_element = self.type_count(*element)?;
                let elements = u32::try_from(self.type_count(*index)?).ok()?;
                per_element.checked_pow(elements)
            }
            TypeKind::Record { fields } => {
                let mut count: u128 = 1;
                for &field in fields {
                    let ty = self.decl(field).declared_type()?;
                    count = count.checked_mul(self.type_count(ty)?)?;
                }
                Some(count)
            }
            TypeKind::Named { .. } => None,
        }
    }

    /// Width of the type in bits within the packed state vector.
    pub fn type_width(&self, ty: TypeId) -> Option<u64> {
        match &self.type_expr(self.resolve_type(ty)).kind {
            TypeKind::Range { .. } | TypeKind::Enum { .. } | TypeKind::Scalarset { .. } => {
                // one extra encoding for "undefined"
                let values = self.type_count(ty)?;
                Some(bits_for(values.checked_add(1)?))
            }
            TypeKind::Array { index, element } => {
                let element_width = self.type_width(*element)?;
                let count = u64::try_from(self.type_count(*index)?).ok()?;
                element_width.checked_mul(count)
            }
            TypeKind::Record { fields } => {
                let mut width: u64 = 0;
                for &field in fields {
                    let ty = self.decl(field).declared_type()?;
                    width = width.checked_add(self.type_width(ty)?)?;
                }
                Some(width)
            }
            TypeKind::Named { .. } => None,
        }
    }

    /// Inclusive lower bound of a simple type's value domain.
    pub fn type_lower_bound(&self, ty: TypeId) -> Option<i128> {
        match &self.type_expr(self.resolve_type(ty)).kind {
            TypeKind::Range { min, .. } => self.constant_fold(*min),
            TypeKind::Enum { .. } | TypeKind::Scalarset { .. } => Some(0),
            _ => None,
        }
    }

    /// Inclusive upper bound of a simple type's value domain.
    pub fn type_upper_bound(&self, ty: TypeId) -> Option<i128> {
        match &self.type_expr(self.resolve_type(ty)).kind {
            TypeKind::Range { max, .. } => self.constant_fold(*max),
            TypeKind::Enum { members } => Some(members.len() as i128 - 1),
            TypeKind::Scalarset { bound } => Some(self.constant_fold(*bound)? - 1),
            _ => None,
        }
    }

    /// Bit offset of a record field within its record, plus the field decl.
    pub fn record_field(&self, record: TypeId, field: Name) -> Option<(u64, DeclId)> {
        let resolved = self.resolve_type(record);
        let TypeKind::Record { fields } = &self.type_expr(resolved).kind else {
            return None;
        };
        let mut offset = 0;
        for &f in fields {
            let decl = self.decl(f);
            let ty = decl.declared_type()?;
            if decl.name == field {
                return Some((offset, f));
            }
            offset += self.type_width(ty)?;
        }
        None
    }

    /// Structural equality of two types: same shape, same children, spans
    /// ignored. Named types compare by what they resolve to.
    pub fn type_eq(&self, a: TypeId, b: TypeId) -> bool {
        let (a, b) = (self.resolve_type(a), self.resolve_type(b));
        if a == b {
            return true;
        }
        match (&self.type_expr(a).kind, &self.type_expr(b).kind) {
            (
                TypeKind::Range {
                    min: amin,
                    max: amax,
                },
                TypeKind::Range {
                    min: bmin,
                    max: bmax,
                },
            ) => self.expr_eq(*amin, *bmin) && self.expr_eq(*amax, *bmax),
            (TypeKind::Enum { members: am }, TypeKind::Enum { members: bm }) => {
                am.len() == bm.len() && am.iter().zip(bm).all(|((a, _), (b, _))| a == b)
            }
            (TypeKind::Scalarset { bound: ab }, TypeKind::Scalarset { bound: bb }) => {
                self.expr_eq(*ab, *bb)
            }
            (
                TypeKind::Array {
                    index: ai,
                    element: ae,
                },
                TypeKind::Array {
                    index: bi,
                    element: be,
                },
            ) => self.type_eq(*ai, *bi) && self.type_eq(*ae, *be),
            (TypeKind::Record { fields: af }, TypeKind::Record { fields: bf }) => {
                af.len() == bf.len()
                    && af.iter().zip(bf).all(|(&a, &b)| {
                        let (da, db) = (self.decl(a), self.decl(b));
                        da.name == db.name
                            && match (da.declared_type(), db.declared_type()) {
                                (Some(ta), Some(tb)) => self.type_eq(ta, tb),
                                _ => false,
                            }
                    })
            }
            _ => false,
        }
    }

    /// Whether `ty` is (or resolves to) the built-in boolean type.
    pub fn type_is_boolean(&self, ty: TypeId) -> bool {
        self.resolve_type(ty) == self.boolean
    }

    /// Whether a value of type `from` can index or be assigned into a slot
    /// of type `to`: both simple with identical bounds, or `from` untyped.
    pub fn type_assignable(&self, to: TypeId, from: Option<TypeId>) -> bool {
        let Some(from) = from else {
            // untyped number; range-checked at runtime
            return self.type_is_simple(to);
        };
        if self.type_eq(to, from) {
            return true;
        }
        // distinct ranges are interchangeable as long as both are ranges;
        // the write-side check enforces the destination bounds
        let to_resolved = self.type_expr(self.resolve_type(to));
        let from_resolved = self.type_expr(self.resolve_type(from));
        matches!(
            (&to_resolved.kind, &from_resolved.kind),
            (TypeKind::Range { .. }, TypeKind::Range { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Expr, ExprKind, Span, StringInterner};
    use proptest::prelude::*;

    #[test]
    fn bits_for_encodings() {
        assert_eq!(bits_for(1), 0);
        assert_eq!(bits_for(2), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(4), 2);
        assert_eq!(bits_for(5), 3);
        assert_eq!(bits_for(256), 8);
        assert_eq!(bits_for(257), 9);
    }

    fn range_type(ast: &mut Ast, lo: i64, hi: i64) -> TypeId {
        let min = ast.alloc_expr(Expr {
            kind: ExprKind::Number(lo),
            span: Span::DUMMY,
        });
        let max = ast.alloc_expr(Expr {
            kind: ExprKind::Number(hi),
            span: Span::DUMMY,
        });
        ast.alloc_type(TypeExpr {
            kind: TypeKind::Range { min, max },
            span: Span::DUMMY,
        })
    }

    #[test]
    fn empty_range_has_zero_width() {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let ty = range_type(&mut ast, 5, 4);
        assert_eq!(ast.type_count(ty), Some(0));
        assert_eq!(ast.type_width(ty), Some(0));
    }

    proptest! {
        /// A range's width is the smallest that distinguishes all of its
        /// values plus the undefined encoding.
        #[test]
        fn range_width_is_minimal_and_sufficient(lo in -1000i64..1000, span in 0i64..2000) {
            let hi = lo + span;
            let mut interner = StringInterner::new();
            let mut ast = Ast::new(&mut interner);
            let ty = range_type(&mut ast, lo, hi);

            let count = ast.type_count(ty).expect("count");
            let width = ast.type_width(ty).expect("width");

            prop_assert_eq!(count, (span as u128) + 1);
            prop_assert!(count + 1 <= 1u128 << width);
            if width > 0 {
                prop_assert!(count + 1 > 1u128 << (width - 1));
            }
            prop_assert_eq!(ast.type_lower_bound(ty), Some(i128::from(lo)));
            prop_assert_eq!(ast.type_upper_bound(ty), Some(i128::from(hi)));
        }

        /// Array widths multiply; record widths add.
        #[test]
        fn aggregate_widths_compose(len in 1i64..64, lo in -10i64..10, span in 0i64..100) {
            let mut interner = StringInterner::new();
            let mut ast = Ast::new(&mut interner);
            let index = range_type(&mut ast, 0, len - 1);
            let element = range_type(&mut ast, lo, lo + span);
            let element_width = ast.type_width(element).expect("element width");
            let array = ast.alloc_type(TypeExpr {
                kind: TypeKind::Array { index, element },
                span: Span::DUMMY,
            });
            prop_assert_eq!(ast.type_width(array), Some(element_width * len as u64));
        }
    }
}
