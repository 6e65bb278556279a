//! Typed indices into the [`Ast`](crate::Ast) arena.

use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize);
                $name(index as u32)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an expression node.
    ExprId
);
define_id!(
    /// Index of a type expression node.
    TypeId
);
define_id!(
    /// Index of a statement node.
    StmtId
);
define_id!(
    /// Index of a declaration node.
    DeclId
);
define_id!(
    /// Index of a quantifier node.
    QuantifierId
);
define_id!(
    /// Index of a function definition.
    FunctionId
);
define_id!(
    /// Index of a rule node.
    RuleId
);
