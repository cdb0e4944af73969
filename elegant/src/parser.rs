use std::rc::Rc;

use chumsky::prelude::*;

use crate::{
    lang::{is_library_name, Term, Token},
    prelude::*,
};

pub trait SimpleParser<I: Clone + std::hash::Hash, O>:
    Parser<I, O, Error = Error<I>> + Clone
{
    #[allow(clippy::type_complexity)]
    fn spanned(self) -> chumsky::combinator::MapWithSpan<Self, fn(O, Span) -> Spanned<O>, O>
    where
        Self: Sized,
        I: std::cmp::Eq,
    {
        self.map_with_span(|value, span| Spanned { span, value })
    }

    fn refcounted(self) -> chumsky::combinator::Map<Self, fn(O) -> std::rc::Rc<O>, O>
    where
        Self: Sized,
        I: std::cmp::Eq,
    {
        self.map(Rc::new)
    }
}
impl<I: Clone + std::hash::Hash, O, T> SimpleParser<I, O> for T where
    T: Parser<I, O, Error = Error<I>> + Clone
{
}

pub fn lexer() -> impl SimpleParser<char, Vec<Spanned<Token>>> {
    let symbols = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('λ').or(just('\\')).to(Token::Lambda),
    ));
    let numeral = filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .from_str::<Nat>()
        .try_map(|r, span: Span| match r {
            Ok(n) if n <= MAX_NUMERAL => Ok(Token::Numeral(n)),
            Ok(n) => Err(Error::custom(
                span,
                format!("Numeral {n} is larger than {MAX_NUMERAL}"),
            )),
            Err(e) => Err(Error::custom(span, format!("{e}"))),
        });
    let ident = text::ident().map(Identifier::new).map(|ident| {
        if is_library_name(&ident) {
            Token::LibraryName(ident)
        } else {
            Token::Name(ident)
        }
    });
    let token = choice((symbols, numeral, ident));
    token.spanned().padded().repeated().then_ignore(end())
}

// term        := variable | numeral | application | abstraction
// application := "(" term term ")"
// abstraction := "(" "λ" variable term ")"
fn term_parser() -> impl SimpleParser<Token, Spanned<Term>> {
    recursive(|term: Recursive<_, Spanned<Term>, _>| {
        let parameter = select! { Token::Name(ident) => ident, }
            .spanned()
            .labelled("parameter");

        let atom = select! {
            Token::Name(ident) => Term::Variable(ident),
            Token::LibraryName(ident) => Term::Library(ident),
            Token::Numeral(n) => Term::Numeral(n),
        }
        .labelled("variable");

        let abs = just(Token::Lambda)
            .ignore_then(parameter)
            .then(term.clone().refcounted())
            .map(|(var, body)| Term::Abstract(var, body))
            .labelled("abstraction");

        let apply = term
            .clone()
            .refcounted()
            .then(term.refcounted())
            .map(|(lhs, rhs)| Term::Apply(lhs, rhs))
            .labelled("application");

        let compound = choice((abs, apply)).delimited_by(just(Token::LParen), just(Token::RParen));

        choice((atom, compound)).spanned()
    })
    .labelled("term")
}

fn stringify<I: ToString + Clone + std::hash::Hash + Eq>(es: Vec<Error<I>>) -> Vec<Error> {
    es.into_iter().map(|e| e.map(|e| e.to_string())).collect()
}

pub fn tokenize(s: &str) -> Result<Vec<Spanned<Token>>, Vec<Error>> {
    lexer().parse(s).map_err(stringify)
}

// The term parser recurses once per parenthesis.
fn check_depth(tokens: &[Spanned<Token>]) -> Result<(), Vec<Error>> {
    let mut depth = 0usize;
    for token in tokens {
        match token.value() {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ => continue,
        }
        if depth > MAX_DEPTH {
            return Err(vec![Error::custom(
                token.span(),
                format!("Parentheses nested deeper than {MAX_DEPTH}"),
            )]);
        }
    }
    Ok(())
}

pub fn parse_term(s: &str) -> Result<Spanned<Term>, Vec<Error>> {
    let len = s.chars().count();
    let eoi = Span {
        start: len,
        end: len + 1,
    };
    let tokens = tokenize(s)?;
    check_depth(&tokens)?;
    term_parser()
        .then_ignore(end())
        .parse(chumsky::Stream::from_iter(
            eoi,
            tokens
                .into_iter()
                .map(|Spanned { span, value }| (value, span)),
        ))
        .map_err(stringify)
}
