use std::{collections::HashSet, rc::Rc};

use rpds::{HashTrieMap, HashTrieSet};

use crate::prelude::*;

pub type TermRef = Rc<Term>;

/// A pure lambda term. Nodes are never mutated once built, so subterms are
/// freely shared between terms through [`TermRef`].
///
/// The derived equality is structural; use [`Term::alpha_eq`] to compare up to
/// renaming of bound variables.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Term {
    /// `x`
    Variable(Identifier),
    /// `(λ x t)`
    Abstract(Identifier, TermRef),
    /// `(t t)`
    Apply(TermRef, TermRef),
}

impl Term {
    /// Builders used for the library definitions and tests.
    pub fn var(name: &str) -> Self {
        Term::Variable(Identifier::new(name.to_string()))
    }

    pub fn abs(var: &str, body: impl Into<TermRef>) -> Self {
        Term::Abstract(Identifier::new(var.to_string()), body.into())
    }

    pub fn apply(lhs: impl Into<TermRef>, rhs: impl Into<TermRef>) -> Self {
        Term::Apply(lhs.into(), rhs.into())
    }

    /// Left-nested application `((head a) b) ...`.
    pub fn apply_all(head: Term, args: impl IntoIterator<Item = Term>) -> Self {
        args.into_iter()
            .fold(head, |lhs, rhs| Term::apply(lhs, rhs))
    }

    pub fn free_variables(&self) -> HashSet<Identifier> {
        fn rec(term: &Term, bound: &HashTrieSet<Identifier>, acc: &mut HashSet<Identifier>) {
            match term {
                Term::Variable(x) => {
                    if !bound.contains(x) {
                        acc.insert(x.clone());
                    }
                }
                Term::Abstract(x, body) => rec(body, &bound.insert(x.clone()), acc),
                Term::Apply(lhs, rhs) => {
                    rec(lhs, bound, acc);
                    rec(rhs, bound, acc);
                }
            }
        }
        let mut acc = HashSet::new();
        rec(self, &HashTrieSet::new(), &mut acc);
        acc
    }

    pub fn is_free(&self, name: &str) -> bool {
        match self {
            Term::Variable(x) => x.as_str() == name,
            Term::Abstract(x, body) => x.as_str() != name && body.is_free(name),
            Term::Apply(lhs, rhs) => lhs.is_free(name) || rhs.is_free(name),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.free_variables().is_empty()
    }

    /// Every name occurring in the term, free, bound or as a binder.
    pub fn names(&self) -> HashSet<Identifier> {
        fn rec(term: &Term, acc: &mut HashSet<Identifier>) {
            match term {
                Term::Variable(x) => {
                    acc.insert(x.clone());
                }
                Term::Abstract(x, body) => {
                    acc.insert(x.clone());
                    rec(body, acc);
                }
                Term::Apply(lhs, rhs) => {
                    rec(lhs, acc);
                    rec(rhs, acc);
                }
            }
        }
        let mut acc = HashSet::new();
        rec(self, &mut acc);
        acc
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        match self {
            Term::Variable(_) => 1,
            Term::Abstract(_, body) => 1 + body.size(),
            Term::Apply(lhs, rhs) => 1 + lhs.size() + rhs.size(),
        }
    }

    /// Equality up to consistent renaming of bound variables. Free variables
    /// must match by name.
    pub fn alpha_eq(&self, other: &Term) -> bool {
        type Scope = HashTrieMap<Identifier, usize>;
        fn rec(lhs: &Term, ls: &Scope, rhs: &Term, rs: &Scope, depth: usize) -> bool {
            match (lhs, rhs) {
                (Term::Variable(x), Term::Variable(y)) => match (ls.get(x), rs.get(y)) {
                    (Some(i), Some(j)) => i == j,
                    (None, None) => x == y,
                    _ => false,
                },
                (Term::Abstract(x, lbody), Term::Abstract(y, rbody)) => rec(
                    lbody,
                    &ls.insert(x.clone(), depth),
                    rbody,
                    &rs.insert(y.clone(), depth),
                    depth + 1,
                ),
                (Term::Apply(lf, la), Term::Apply(rf, ra)) => {
                    rec(lf, ls, rf, rs, depth) && rec(la, ls, ra, rs, depth)
                }
                _ => false,
            }
        }
        rec(self, &Scope::new(), other, &Scope::new(), 0)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Variable(x) => f.write_str(x),
            Term::Abstract(x, body) => f.write_fmt(format_args!("(λ {x} {body})")),
            Term::Apply(lhs, rhs) => f.write_fmt(format_args!("({lhs} {rhs})")),
        }
    }
}
