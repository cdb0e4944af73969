use rpds::HashTrieMap;

use crate::{
    evaluator::NameSupply,
    lang,
    library::Library,
    prelude::*,
    term::{Term, TermRef},
};

/// Copy of `term` with every binder renamed to a name fresh in `supply`.
fn freshen(term: &TermRef, supply: &mut NameSupply) -> Term {
    fn rec(
        term: &Term,
        renames: &HashTrieMap<Identifier, Identifier>,
        supply: &mut NameSupply,
    ) -> Term {
        match term {
            Term::Variable(x) => Term::Variable(renames.get(x).unwrap_or(x).clone()),
            Term::Abstract(x, body) => {
                let fresh = supply.fresh(x);
                let body = rec(body, &renames.insert(x.clone(), fresh.clone()), supply);
                Term::Abstract(fresh, body.into())
            }
            Term::Apply(lhs, rhs) => Term::Apply(
                rec(lhs, renames, supply).into(),
                rec(rhs, renames, supply).into(),
            ),
        }
    }
    rec(term, &HashTrieMap::new(), supply)
}

/// Replaces library names and numerals with their definitions.
///
/// Each occurrence gets its own copy whose binders are distinct from every
/// name in the input and from every other copy. User-written names are kept.
pub fn expand(library: &Library, term: &Spanned<lang::Term>) -> Result<Term> {
    fn rec(library: &Library, term: &Spanned<lang::Term>, supply: &mut NameSupply) -> Result<Term> {
        Ok(match term.value() {
            lang::Term::Variable(x) => Term::Variable(x.clone()),
            lang::Term::Library(name) => match library.lookup(name) {
                Some(definition) => freshen(definition, supply),
                None => {
                    return Err(Error::custom(
                        term.span(),
                        format!("Unknown library name {name}"),
                    ))
                }
            },
            lang::Term::Numeral(n) => freshen(&Library::numeral(*n).into(), supply),
            lang::Term::Abstract(var, body) => {
                Term::Abstract(var.value().clone(), rec(library, body, supply)?.into())
            }
            lang::Term::Apply(lhs, rhs) => {
                let lhs = rec(library, lhs, supply)?;
                let rhs = rec(library, rhs, supply)?;
                Term::Apply(lhs.into(), rhs.into())
            }
        })
    }
    let mut supply = NameSupply::avoiding(term.value().names());
    rec(library, term, &mut supply)
}
