//! Quantifiers, properties and rules.

use crate::{Ast, DeclId, ExprId, Name, QuantifierId, RuleId, Span, StmtId, TypeId};

/// A quantified binding, as used by rulesets, `for` loops and
/// forall/exists expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quantifier {
    /// The `Binding` declaration this quantifier introduces.
    pub binding: DeclId,
    pub kind: QuantifierKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuantifierKind {
    /// `q: some_type` - iterate the type's value domain.
    Over(TypeId),
    /// `q := from to to [by step]` - iterate an explicit arithmetic range.
    Bounds {
        from: ExprId,
        to: ExprId,
        step: Option<ExprId>,
    },
}

/// How a boolean property is enforced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyCategory {
    /// Must hold in every reachable state.
    Invariant,
    /// Must hold when evaluated.
    Assertion,
    /// Prunes the current state when false, without counting as an error.
    Assumption,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub category: PropertyCategory,
    pub expr: ExprId,
}

/// A top-level rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleKind {
    /// `rule "name" guard ==> decls begin body end`
    Simple {
        name: Option<Name>,
        guard: Option<ExprId>,
        decls: Vec<DeclId>,
        body: Vec<StmtId>,
        /// Alias bindings accumulated by flattening, outermost first.
        aliases: Vec<DeclId>,
        /// Quantifiers accumulated by flattening, innermost first.
        quantifiers: Vec<QuantifierId>,
    },

    /// `startstate "name" decls begin body end`
    StartState {
        name: Option<Name>,
        decls: Vec<DeclId>,
        body: Vec<StmtId>,
        aliases: Vec<DeclId>,
        quantifiers: Vec<QuantifierId>,
    },

    /// `invariant "name" expr` (or assumption).
    Property {
        name: Option<Name>,
        property: Property,
        aliases: Vec<DeclId>,
        quantifiers: Vec<QuantifierId>,
    },

    /// `alias a: e do rules end` - distributes alias bindings over nested
    /// rules.
    AliasGroup {
        aliases: Vec<DeclId>,
        rules: Vec<RuleId>,
    },

    /// `ruleset q do rules end` - distributes quantifiers over nested
    /// rules.
    Ruleset {
        quantifiers: Vec<QuantifierId>,
        rules: Vec<RuleId>,
    },
}

impl Ast {
    /// Decompose a rule into flat `Simple`/`StartState`/`Property` rules,
    /// each carrying its accumulated aliases and quantifiers.
    ///
    /// Outer aliases are prepended (they bind before inner ones) and outer
    /// quantifiers appended, so alias bindings are evaluated inside the
    /// quantifier loops.
    pub fn flatten_rule(&self, rule: RuleId) -> Vec<Rule> {
        let rule = self.rule(rule);
        match &rule.kind {
            RuleKind::Simple { .. } | RuleKind::StartState { .. } | RuleKind::Property { .. } => {
                vec![rule.clone()]
            }
            RuleKind::AliasGroup { aliases, rules } => {
                let mut flat = Vec::new();
                for &inner in rules {
                    for mut f in self.flatten_rule(inner) {
                        let target = match &mut f.kind {
                            RuleKind::Simple { aliases, .. }
                            | RuleKind::StartState { aliases, .. }
                            | RuleKind::Property { aliases, .. } => aliases,
                            _ => continue,
                        };
                        target.splice(0..0, aliases.iter().copied());
                        flat.push(f);
                    }
                }
                flat
            }
            RuleKind::Ruleset { quantifiers, rules } => {
                let mut flat = Vec::new();
                for &inner in rules {
                    for mut f in self.flatten_rule(inner) {
                        let target = match &mut f.kind {
                            RuleKind::Simple { quantifiers, .. }
                            | RuleKind::StartState { quantifiers, .. }
                            | RuleKind::Property { quantifiers, .. } => quantifiers,
                            _ => continue,
                        };
                        target.extend(quantifiers.iter().copied());
                        flat.push(f);
                    }
                }
                flat
            }
        }
    }
}
