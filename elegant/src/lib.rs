//! Normal-order evaluator for the untyped lambda calculus with a library of
//! Church-encoded combinators and decimal numerals.
//!
//! A line goes through [`parser`], [`compiler`] (library and numeral
//! expansion) and [`evaluator`] (normal-order reduction), and the normal form
//! is printed back in the input syntax.

use std::rc::Rc;

use chumsky::error::SimpleReason;
use thiserror::Error;

pub mod compiler;
pub mod evaluator;
pub mod lang;
pub mod library;
pub mod parser;
pub mod prelude;
pub mod term;

use crate::{
    evaluator::{Budget, Divergence, Normalized},
    library::Library,
    prelude::*,
    term::TermRef,
};

/// One-line summary of a parser or expansion diagnostic.
pub fn describe(e: &Error) -> String {
    let at = e.span().start;
    match e.reason() {
        SimpleReason::Unexpected => {
            let found = e.found().map(String::as_str).unwrap_or("end of the input");
            format!("unexpected {found} at {at}")
        }
        SimpleReason::Unclosed { delimiter, .. } => {
            format!("unclosed {delimiter} before {at}")
        }
        SimpleReason::Custom(msg) => format!("{msg} at {at}"),
    }
}

fn describe_all(es: &[Error]) -> String {
    es.iter().map(describe).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Syntax error: {}", describe_all(.0))]
    Syntax(Vec<Error>),
    #[error("Name error: {}", describe(.0))]
    Name(Error),
    #[error(transparent)]
    Divergence(#[from] Divergence),
}

/// The library together with the reduction budget.
#[derive(Default, Clone, Debug)]
pub struct Evaluator {
    library: Library,
    pub budget: Budget,
}

impl Evaluator {
    pub fn new(budget: Budget) -> Self {
        Self {
            library: Library::standard(),
            budget,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Parses `line` and expands library names and numerals.
    pub fn expand(&self, line: &str) -> Result<TermRef, EvalError> {
        let term = parser::parse_term(line).map_err(EvalError::Syntax)?;
        let term = compiler::expand(&self.library, &term).map_err(EvalError::Name)?;
        Ok(Rc::new(term))
    }

    pub fn normalize(&self, line: &str) -> Result<Normalized, EvalError> {
        let term = self.expand(line)?;
        Ok(evaluator::reduce(term, &self.budget)?)
    }

    pub fn evaluate(&self, line: &str) -> Result<String, EvalError> {
        Ok(self.normalize(line)?.term.to_string())
    }
}

thread_local! {
    static STANDARD: Evaluator = Evaluator::default();
}

/// Evaluates one line with the standard library and the default budget.
pub fn evaluate(line: &str) -> Result<String, EvalError> {
    STANDARD.with(|evaluator| evaluator.evaluate(line))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::Term;

    fn normal_form(input: &str) -> Term {
        match Evaluator::default().normalize(input) {
            Ok(n) => n.term.as_ref().clone(),
            Err(e) => panic!("{input}: {e}"),
        }
    }

    fn assert_numeral(input: &str, n: Nat) {
        let result = normal_form(input);
        assert!(
            result.alpha_eq(&Library::numeral(n)),
            "{input} gave {result}, expected {n}"
        );
    }

    fn assert_alpha(input: &str, expected: &str) {
        let result = normal_form(input);
        let expected = normal_form(expected);
        assert!(result.alpha_eq(&expected), "{input} gave {result}, expected {expected}");
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate("((λ a a) b)").unwrap(), "b");
        assert_eq!(evaluate("  (x y)  ").unwrap(), "(x y)");
        assert_eq!(
            evaluate("(λ a (λ b (λ c d)))").unwrap(),
            "(λ a (λ b (λ c d)))"
        );
        assert_eq!(evaluate("(a (b (c d)))").unwrap(), "(a (b (c d)))");
        assert_eq!(evaluate("07").unwrap(), evaluate("7").unwrap());
        assert_numeral("(SUCC 007)", 8);
        assert_numeral("00", 0);
    }

    #[test]
    fn test_plus() {
        for i in 0..10 {
            for j in 0..10 {
                assert_numeral(&format!("((PLUS {i}) {j})"), i + j);
            }
        }
        assert_numeral("((PLUS ((PLUS ((PLUS 1) 2)) 3)) 4)", 10);
    }

    #[test]
    fn test_minus() {
        for i in 0..12u64 {
            for j in 0..4 {
                assert_numeral(&format!("((MINUS {i}) {j})"), i.saturating_sub(j));
            }
        }
        assert_numeral("((MINUS ((MINUS ((MINUS 4) 1)) 1)) 1)", 1);
        assert_numeral("((MINUS ((MINUS 2) 3)) 1)", 0);
    }

    #[test]
    fn test_mult_exp() {
        for i in 0..5 {
            for j in 0..5 {
                assert_numeral(&format!("((MULT {i}) {j})"), i * j);
            }
        }
        for i in 1..4u64 {
            for j in 1..3u32 {
                assert_numeral(&format!("((EXP {i}) {j})"), i.pow(j));
            }
        }
    }

    #[test]
    fn test_succ_pred() {
        for i in 0..12u64 {
            assert_numeral(&format!("(SUCC (SUCC (SUCC {i})))"), i + 3);
            assert_numeral(&format!("(PRED {i})"), i.saturating_sub(1));
        }
        for i in 3..12 {
            assert_numeral(&format!("(PRED (PRED (PRED {i})))"), i - 3);
        }
    }

    #[test]
    fn test_booleans() {
        let cases = [
            ("((AND TRUE) TRUE)", "TRUE"),
            ("((AND TRUE) FALSE)", "FALSE"),
            ("((AND FALSE) TRUE)", "FALSE"),
            ("((AND FALSE) FALSE)", "FALSE"),
            ("((OR TRUE) TRUE)", "TRUE"),
            ("((OR TRUE) FALSE)", "TRUE"),
            ("((OR FALSE) TRUE)", "TRUE"),
            ("((OR FALSE) FALSE)", "FALSE"),
            ("(NOT TRUE)", "FALSE"),
            ("(NOT FALSE)", "TRUE"),
            ("(IS_ZERO 0)", "TRUE"),
            ("(IS_ZERO 8)", "FALSE"),
            ("(IS_ZERO (PRED 1))", "TRUE"),
            ("(FST ((PAIR a) b))", "a"),
            ("(SND ((PAIR a) b))", "b"),
        ];
        for (input, expected) in cases {
            assert_alpha(input, expected);
        }
        assert_alpha("((AND FALSE) TRUE)", "(λ a (λ b b))");
        assert_alpha("(NOT TRUE)", "(λ a (λ z z))");
    }

    #[test]
    fn test_if() {
        assert_numeral("(((IF TRUE) 5) 8)", 5);
        assert_numeral("(((IF FALSE) 5) 8)", 8);
        assert_alpha("(((IF (IS_ZERO 0)) x) y)", "x");
    }

    #[test]
    fn test_round_trip() {
        let evaluator = Evaluator::default();
        for input in [
            "((λ a (λ b a)) b)",
            "((MULT 2) 3)",
            "(NOT FALSE)",
            "(λ x ((λ y (λ x (y x))) x))",
        ] {
            let normal = evaluator.normalize(input).unwrap().term;
            let reparsed = evaluator.expand(&normal.to_string()).unwrap();
            assert_eq!(normal, reparsed, "{input}");
        }
    }

    #[test]
    fn test_errors() {
        for input in ["", "   ", "(λ x", "(a b c)", "(λ TRUE x)", "a)", "(x . y)"] {
            assert!(
                matches!(evaluate(input), Err(EvalError::Syntax(_))),
                "{input:?}"
            );
        }

        let e = evaluate("((PLUS 1) (FOO 2))").unwrap_err();
        assert!(matches!(e, EvalError::Name(_)));
        assert!(e.to_string().contains("FOO"), "{e}");

        let evaluator = Evaluator::new(Budget {
            max_steps: 1000,
            ..Budget::default()
        });
        let e = evaluator
            .evaluate("((λ x (x x)) (λ x (x x)))")
            .unwrap_err();
        assert!(matches!(e, EvalError::Divergence(Divergence { steps: 1000, .. })));

        // Shared copies of 99 inside the product count against the size limit.
        let e = Evaluator::default().evaluate("((MULT 100) 99)").unwrap_err();
        assert!(matches!(
            e,
            EvalError::Divergence(Divergence {
                limit: evaluator::Limit::Size(_),
                ..
            })
        ));
        assert!(e.to_string().contains("intermediate term"), "{e}");

        let deep = format!("{}x{}", "(a ".repeat(5000), ")".repeat(5000));
        assert!(matches!(evaluate(&deep), Err(EvalError::Syntax(_))));

        // Errors leave the evaluator usable.
        assert_eq!(evaluator.evaluate("((λ a a) b)").unwrap(), "b");
    }
}
