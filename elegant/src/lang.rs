use std::rc::Rc;

use crate::prelude::*;

#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
pub enum Token {
    #[display(fmt = "(")]
    LParen,
    #[display(fmt = ")")]
    RParen,
    #[display(fmt = "λ")]
    Lambda,

    #[display(fmt = "{_0}")]
    Numeral(Nat),
    /// A name without lowercase letters, such as `PLUS` or `IS_ZERO`.
    #[display(fmt = "{_0}")]
    LibraryName(Identifier),
    #[display(fmt = "{_0}")]
    Name(Identifier),
}

/// Whether `ident` is spelled like a library reference: it has at least one
/// uppercase letter and no lowercase ones.
pub fn is_library_name(ident: &str) -> bool {
    ident.chars().any(|c| c.is_ascii_uppercase()) && !ident.chars().any(|c| c.is_ascii_lowercase())
}

/// A parsed term, before library references and numerals are expanded.
///
/// Only [`Term::Abstract`] introduces a binder, and its parameter comes from a
/// [`Token::Name`], so library names can never be shadowed.
#[derive(Clone, Debug)]
pub enum Term {
    Variable(Identifier),
    Library(Identifier),
    Numeral(Nat),
    Abstract(Spanned<Identifier>, Rc<Spanned<Self>>),
    Apply(Rc<Spanned<Self>>, Rc<Spanned<Self>>),
}

impl Term {
    /// Every ordinary name written in the term, bound or free.
    pub fn names(&self) -> Vec<Identifier> {
        fn rec(term: &Term, acc: &mut Vec<Identifier>) {
            match term {
                Term::Variable(name) => acc.push(name.clone()),
                Term::Library(_) | Term::Numeral(_) => {}
                Term::Abstract(var, body) => {
                    acc.push(var.value().clone());
                    rec(body.value(), acc);
                }
                Term::Apply(lhs, rhs) => {
                    rec(lhs.value(), acc);
                    rec(rhs.value(), acc);
                }
            }
        }
        let mut acc = vec![];
        rec(self, &mut acc);
        acc
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Variable(name) | Term::Library(name) => f.write_str(name),
            Term::Numeral(n) => f.write_fmt(format_args!("{n}")),
            Term::Abstract(var, body) => f.write_fmt(format_args!("(λ {var} {body})")),
            Term::Apply(lhs, rhs) => f.write_fmt(format_args!("({lhs} {rhs})")),
        }
    }
}
