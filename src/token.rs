//! The token definition for the filter expression language.

use crate::ast::Operator;

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    /// One segment of a field path, e.g. `jenkins` in `metadata.jenkins.build`
    Segment(&'a str),
    Dot, // .

    /// One of `= ! > < ) ( ~ % * @`
    Operator(Operator),

    /// Everything after the operator, verbatim
    Value(&'a str),

    // Special
    Illegal, // An illegal/unknown character inside the field path
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
