use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use thiserror::Error;

use crate::{
    prelude::*,
    term::{Term, TermRef},
};

/// Mints identifiers that collide with nothing it has been told about, nor
/// with anything it minted before.
#[derive(Default, Clone, Debug)]
pub struct NameSupply {
    used: HashSet<Identifier>,
}

impl NameSupply {
    pub fn avoiding(names: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            used: names.into_iter().collect(),
        }
    }

    /// A fresh name resembling `hint`: `y` becomes `y`, `y1`, `y2`, ...
    pub fn fresh(&mut self, hint: &str) -> Identifier {
        let stem = hint.trim_end_matches(|c: char| c.is_ascii_digit());
        let stem = if stem.is_empty() { "v" } else { stem };
        let mut candidate = stem.to_string();
        let mut i = 0;
        while self.used.contains(&candidate) {
            i += 1;
            candidate = format!("{stem}{i}");
        }
        let name = Identifier::new(candidate);
        self.used.insert(name.clone());
        name
    }
}

/// Capture-avoiding `body[name := argument]`.
///
/// Subtrees without a free `name` are returned as-is, so the result shares
/// them with `body`.
pub fn substitute(body: &TermRef, name: &Identifier, argument: &TermRef) -> TermRef {
    let free = argument.free_variables();
    substitute_rec(body, name, argument, &free).unwrap_or_else(|| body.clone())
}

// `None` means nothing was replaced under `body`.
fn substitute_rec(
    body: &TermRef,
    name: &Identifier,
    argument: &TermRef,
    free: &HashSet<Identifier>,
) -> Option<TermRef> {
    match body.as_ref() {
        Term::Variable(x) => (x == name).then(|| argument.clone()),
        Term::Abstract(x, _) if x == name => None,
        Term::Abstract(x, inner) if free.contains(x) && inner.is_free(name) => {
            let mut supply = NameSupply::avoiding(
                inner
                    .names()
                    .into_iter()
                    .chain(argument.names())
                    .chain([name.clone()]),
            );
            let fresh = supply.fresh(x);
            let renamed = substitute(inner, x, &Term::Variable(fresh.clone()).into());
            let inner = substitute_rec(&renamed, name, argument, free).unwrap_or(renamed);
            Some(Term::Abstract(fresh, inner).into())
        }
        Term::Abstract(x, inner) => substitute_rec(inner, name, argument, free)
            .map(|inner| Term::Abstract(x.clone(), inner).into()),
        Term::Apply(lhs, rhs) => {
            let new_lhs = substitute_rec(lhs, name, argument, free);
            let new_rhs = substitute_rec(rhs, name, argument, free);
            if new_lhs.is_none() && new_rhs.is_none() {
                return None;
            }
            Some(
                Term::Apply(
                    new_lhs.unwrap_or_else(|| lhs.clone()),
                    new_rhs.unwrap_or_else(|| rhs.clone()),
                )
                .into(),
            )
        }
    }
}

/// One leftmost-outermost beta step, or `None` if `term` is in normal form.
pub fn step(term: &TermRef) -> Option<TermRef> {
    match term.as_ref() {
        Term::Variable(_) => None,
        Term::Abstract(x, body) => step(body).map(|body| Term::Abstract(x.clone(), body).into()),
        Term::Apply(lhs, rhs) => {
            if let Term::Abstract(x, body) = lhs.as_ref() {
                return Some(substitute(body, x, rhs));
            }
            if let Some(lhs) = step(lhs) {
                return Some(Term::Apply(lhs, rhs.clone()).into());
            }
            step(rhs).map(|rhs| Term::Apply(lhs.clone(), rhs).into())
        }
    }
}

/// The successive terms of a normal-order reduction, excluding the start.
/// Unbounded for terms without a normal form.
pub struct Reduction {
    term: TermRef,
}

impl Reduction {
    pub fn new(term: TermRef) -> Self {
        Self { term }
    }
}

impl Iterator for Reduction {
    type Item = TermRef;
    fn next(&mut self) -> Option<Self::Item> {
        let next = step(&self.term)?;
        self.term = next.clone();
        Some(next)
    }
}

#[derive(Clone, Debug)]
pub struct Budget {
    pub max_steps: usize,
    pub time_limit: Option<Duration>,
    /// Largest term, in nodes, any intermediate step may produce. Shared
    /// subterms count once per occurrence.
    pub max_size: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            time_limit: Some(Duration::from_secs(10)),
            max_size: 20_000,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, derive_more::Display, Debug)]
pub enum Limit {
    #[display(fmt = "step limit of {_0}")]
    Steps(usize),
    #[display(fmt = "time limit of {_0:?}")]
    Time(Duration),
    #[display(fmt = "size limit of {_0} nodes on an intermediate term")]
    Size(usize),
}

#[derive(Error, PartialEq, Eq, Clone, Debug)]
#[error("No normal form found within the {limit} (gave up after {steps} steps)")]
pub struct Divergence {
    pub limit: Limit,
    pub steps: usize,
}

#[derive(Clone, Debug)]
pub struct Normalized {
    pub term: TermRef,
    pub steps: usize,
}

/// Reduces `term` to normal form, calling `on_step` with every intermediate
/// term. Nothing is returned when a limit of `budget` trips first.
pub fn reduce_traced(
    term: TermRef,
    budget: &Budget,
    mut on_step: impl FnMut(usize, &Term),
) -> Result<Normalized, Divergence> {
    let start = Instant::now();
    let mut current = term.clone();
    let mut steps = 0;
    for next in Reduction::new(term) {
        if steps == budget.max_steps {
            return Err(Divergence {
                limit: Limit::Steps(budget.max_steps),
                steps,
            });
        }
        steps += 1;
        if let Some(limit) = budget.time_limit {
            if start.elapsed() > limit {
                return Err(Divergence {
                    limit: Limit::Time(limit),
                    steps,
                });
            }
        }
        if next.size() > budget.max_size {
            return Err(Divergence {
                limit: Limit::Size(budget.max_size),
                steps,
            });
        }
        on_step(steps, &next);
        current = next;
    }
    Ok(Normalized {
        term: current,
        steps,
    })
}

pub fn reduce(term: TermRef, budget: &Budget) -> Result<Normalized, Divergence> {
    reduce_traced(term, budget, |_, _| {})
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::{compiler, library::Library, parser};

    fn term(input: &str) -> TermRef {
        let term = parser::parse_term(input).unwrap();
        compiler::expand(&Library::standard(), &term).unwrap().into()
    }

    fn run(input: &str) -> Result<Normalized, Divergence> {
        reduce(term(input), &Budget::default())
    }

    fn ident(s: &str) -> Identifier {
        Identifier::new(s.to_string())
    }

    const OMEGA: &str = "((λ x (x x)) (λ x (x x)))";

    #[test]
    fn test_name_supply() {
        let mut supply = NameSupply::avoiding([ident("y"), ident("y1"), ident("x")]);
        assert_eq!(supply.fresh("y"), ident("y2"));
        assert_eq!(supply.fresh("y5"), ident("y3"));
        assert_eq!(supply.fresh("z"), ident("z"));
        assert_eq!(supply.fresh("z"), ident("z1"));
        assert_eq!(supply.fresh("x12"), ident("x1"));
    }

    #[test]
    fn test_substitute_avoids_capture() {
        // (λ y (x y))[x := y] must not turn the free y into the bound one.
        let body = term("(λ y (x y))");
        let result = substitute(&body, &ident("x"), &term("y"));
        assert!(result.alpha_eq(&term("(λ z (y z))")));
        assert!(!result.alpha_eq(&term("(λ y (y y))")));
        assert_eq!(result.free_variables(), [ident("y")].into_iter().collect());

        // Nested binders on the path are renamed independently.
        let body = term("(λ y (λ z ((x y) z)))");
        let result = substitute(&body, &ident("x"), &term("(y z)"));
        assert!(result.alpha_eq(&term("(λ a (λ b (((y z) a) b)))")));
    }

    #[test]
    fn test_substitute_shadowing_and_sharing() {
        let body = term("(λ x x)");
        let result = substitute(&body, &ident("x"), &term("y"));
        assert!(Rc::ptr_eq(&body, &result));

        let body = term("(f (λ a a))");
        let result = substitute(&body, &ident("f"), &term("g"));
        assert_eq!(result.to_string(), "(g (λ a a))");
        match (body.as_ref(), result.as_ref()) {
            (Term::Apply(_, before), Term::Apply(_, after)) => assert!(Rc::ptr_eq(before, after)),
            _ => unreachable!(),
        }

        // No rename is needed when the captured name does not occur.
        let body = term("(λ y z)");
        let result = substitute(&body, &ident("x"), &term("y"));
        assert!(Rc::ptr_eq(&body, &result));
    }

    #[test]
    fn test_beta() {
        let cases = [
            ("((λ a a) b)", "b"),
            ("((λ x (x x)) y)", "(y y)"),
            ("((λ a (a b)) (x y))", "((x y) b)"),
            ("((λ a (a a)) (x y))", "((x y) (x y))"),
            ("((λ a (λ b a)) c)", "(λ b c)"),
            ("((λ a (λ b a)) b)", "(λ c b)"),
            ("(λ a (b c))", "(λ a (b c))"),
        ];
        for (input, expected) in cases {
            let normal = run(input).unwrap().term;
            assert!(normal.alpha_eq(&term(expected)), "{input} gave {normal}");
        }
    }

    #[test]
    fn test_normal_order() {
        // The argument diverges but is never needed.
        let result = run(&format!("((λ x y) {OMEGA})")).unwrap();
        assert_eq!(result.term.to_string(), "y");
        assert_eq!(result.steps, 1);

        // Reduction continues under binders and in argument position.
        let result = run("(f (λ x ((λ y y) x)))").unwrap();
        assert_eq!(result.term.to_string(), "(f (λ x x))");

        let first = step(&term("((λ x x) ((λ y y) z))")).unwrap();
        assert_eq!(first.to_string(), "((λ y y) z)");
    }

    #[test]
    fn test_trace() {
        let mut seen = vec![];
        let result = reduce_traced(
            term("(((λ x (λ y (y x))) a) b)"),
            &Budget::default(),
            |i, t| seen.push(format!("{i}: {t}")),
        )
        .unwrap();
        assert_eq!(seen, vec!["1: ((λ y (y a)) b)", "2: (b a)"]);
        assert_eq!(result.steps, 2);
        assert_eq!(
            Reduction::new(term("((λ x x) y)")).collect::<Vec<_>>(),
            vec![term("y")]
        );
    }

    #[test]
    fn test_divergence() {
        let budget = Budget {
            max_steps: 100,
            ..Budget::default()
        };
        assert_eq!(
            reduce(term(OMEGA), &budget).unwrap_err(),
            Divergence {
                limit: Limit::Steps(100),
                steps: 100
            }
        );

        let budget = Budget {
            max_steps: usize::MAX,
            max_size: 50,
            ..Budget::default()
        };
        let growing = "((λ x ((x x) x)) (λ x ((x x) x)))";
        assert_eq!(
            reduce(term(growing), &budget).unwrap_err().limit,
            Limit::Size(50)
        );

        let budget = Budget {
            max_steps: usize::MAX,
            time_limit: Some(Duration::from_millis(20)),
            ..Budget::default()
        };
        assert_eq!(
            reduce(term(OMEGA), &budget).unwrap_err().limit,
            Limit::Time(Duration::from_millis(20))
        );

        // A term needing exactly `max_steps` steps still normalizes.
        let budget = Budget {
            max_steps: 1,
            ..Budget::default()
        };
        assert!(reduce(term("((λ a a) b)"), &budget).is_ok());
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "((λ a (λ b a)) b)",
            "((PLUS 3) 4)",
            "(λ x ((λ y (x y)) x))",
            "((AND TRUE) FALSE)",
        ] {
            let once = run(input).unwrap().term;
            let twice = reduce(once.clone(), &Budget::default()).unwrap();
            assert_eq!(twice.steps, 0);
            assert!(twice.term.alpha_eq(&once));
        }
    }
}
