use std::rc::Rc;

pub type Nat = u64;
pub type Identifier = Rc<String>;

/// Largest numeral literal accepted by the lexer. A numeral expands to a term
/// with one application per unit, so the limit bounds the size of the input.
pub const MAX_NUMERAL: Nat = 1000;

/// Deepest parenthesis nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Character offsets into the input line.
pub type Span = std::ops::Range<usize>;

#[derive(Clone, derive_more::Display, Debug)]
#[display(bound = "T: std::fmt::Display")]
#[display(fmt = "{value}")]
pub struct Spanned<T> {
    pub span: Span,
    pub value: T,
}
impl<T> Spanned<T> {
    pub fn value(&self) -> &T {
        &self.value
    }
    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

pub use chumsky::error::Error as _;
/// Diagnostic produced by the lexer, the parser and library expansion.
pub type Error<I = String> = chumsky::error::Simple<I, Span>;
pub type Result<T, E = Error> = std::result::Result<T, E>;
