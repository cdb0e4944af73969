//! Church encodings of booleans, pairs and natural numbers.

use rpds::HashTrieMap;

use crate::{
    prelude::*,
    term::{Term, TermRef},
};

fn v(x: &str) -> Term {
    Term::var(x)
}

// `lam(&["x", "y"], t)` is `(λ x (λ y t))`.
fn lam(params: &[&str], body: Term) -> Term {
    params.iter().rev().fold(body, |body, p| Term::abs(p, body))
}

fn app<const N: usize>(head: Term, args: [Term; N]) -> Term {
    Term::apply_all(head, args)
}

fn church(n: Nat) -> Term {
    let body = (0..n).fold(v("y"), |acc, _| Term::apply(v("f"), acc));
    lam(&["f", "y"], body)
}

fn tru() -> Term {
    lam(&["x", "y"], v("x"))
}

fn fls() -> Term {
    lam(&["x", "y"], v("y"))
}

fn succ() -> Term {
    lam(
        &["n", "f", "y"],
        app(v("f"), [app(v("n"), [v("f"), v("y")])]),
    )
}

fn pair() -> Term {
    lam(&["a", "b", "s"], app(v("s"), [v("a"), v("b")]))
}

fn fst() -> Term {
    lam(&["p"], app(v("p"), [tru()]))
}

fn snd() -> Term {
    lam(&["p"], app(v("p"), [fls()]))
}

// Starting from (0, 0), n shifts of (a, b) -> (b, b + 1) leave n - 1 in the
// first slot; zero shifts leave 0 there.
fn pred() -> Term {
    let shift = lam(
        &["q"],
        app(
            pair(),
            [
                app(snd(), [v("q")]),
                app(succ(), [app(snd(), [v("q")])]),
            ],
        ),
    );
    lam(
        &["n"],
        app(
            fst(),
            [app(v("n"), [shift, app(pair(), [church(0), church(0)])])],
        ),
    )
}

fn definitions() -> Vec<(&'static str, Term)> {
    vec![
        ("TRUE", tru()),
        ("FALSE", fls()),
        ("AND", lam(&["p", "q"], app(v("p"), [v("q"), v("p")]))),
        ("OR", lam(&["p", "q"], app(v("p"), [v("p"), v("q")]))),
        ("NOT", lam(&["p", "a", "z"], app(v("p"), [v("z"), v("a")]))),
        (
            "IF",
            lam(&["c", "t", "e"], app(v("c"), [v("t"), v("e")])),
        ),
        (
            "IS_ZERO",
            lam(&["n"], app(v("n"), [lam(&["x"], fls()), tru()])),
        ),
        ("PAIR", pair()),
        ("FST", fst()),
        ("SND", snd()),
        ("SUCC", succ()),
        ("PRED", pred()),
        (
            "PLUS",
            lam(
                &["m", "n", "f", "y"],
                app(v("m"), [v("f"), app(v("n"), [v("f"), v("y")])]),
            ),
        ),
        // Subtracting past zero saturates because PRED 0 is 0.
        ("MINUS", lam(&["m", "n"], app(v("n"), [pred(), v("m")]))),
        (
            "MULT",
            lam(&["m", "n", "f"], app(v("m"), [app(v("n"), [v("f")])])),
        ),
        ("EXP", lam(&["m", "n"], app(v("n"), [v("m")]))),
    ]
}

/// The fixed table of named combinators. Every definition is closed.
#[derive(Clone, Debug)]
pub struct Library {
    definitions: HashTrieMap<Identifier, TermRef>,
}

impl Library {
    pub fn standard() -> Self {
        let definitions = definitions()
            .into_iter()
            .fold(HashTrieMap::new(), |map, (name, term)| {
                map.insert(Identifier::new(name.to_string()), term.into())
            });
        Self { definitions }
    }

    pub fn lookup(&self, name: &Identifier) -> Option<&TermRef> {
        self.definitions.get(name)
    }

    /// The Church numeral `(λ f (λ y (f ... (f y))))` with `n` applications.
    pub fn numeral(n: Nat) -> Term {
        church(n)
    }

    /// Definitions ordered by name.
    pub fn entries(&self) -> Vec<(&Identifier, &TermRef)> {
        let mut entries = self.definitions.iter().collect::<Vec<_>>();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::standard()
    }
}
