//! Syntax tree for scenario scripts.

use std::fmt;

/// Source location of a token or expression.
///
/// Byte offsets are half-open; `line` and `column` are 1-based and refer
/// to `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Span covering `self` through `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Maps byte offsets to line/column positions.
pub(crate) struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    pub(crate) fn span(&self, start: usize, end: usize) -> Span {
        let line = match self.line_starts.binary_search(&start) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Span {
            start,
            end,
            line: line + 1,
            column: start - self.line_starts[line] + 1,
        }
    }
}

/// A parsed script: an optional leading description and its assignments.
#[derive(Clone, Debug, PartialEq)]
pub struct Script {
    pub description: Option<String>,
    pub statements: Vec<Statement>,
}

/// `name = value;`
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub name: String,
    pub name_span: Span,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    Str(String),
    /// Reference to an earlier binding.
    Ident(String),
    /// `new Constructor(args...)`
    New { constructor: String, args: Vec<Expr> },
    Array(Vec<Expr>),
}
