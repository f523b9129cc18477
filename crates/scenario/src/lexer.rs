//! Tokenization of scenario scripts using logos.
//!
//! Scenario scripts are a tiny assignment language:
//!
//! ```text
//! /* Description of the experiment. */
//! nodeExpansionThreshold = 10;
//! ghostModel = new NeuralNetworkGhostController(new RouletteMoveSelectionStrategy(), 5, true);
//! tasks = [ ghostModel ];
//! ```
//!
//! Whitespace and `//` comments are skipped. Block comments are kept as
//! tokens so the parser can pick up the leading description.

use crate::ast::{LineIndex, Span};
use crate::error::{Result, ScenarioError};
use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[token("new")]
    New,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    /// `var`, `let` or `const`; accepted and ignored.
    #[token("var")]
    #[token("let")]
    #[token("const")]
    Declare,

    #[token("/*", block_comment)]
    BlockComment(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),
    #[regex(
        r"-?(([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+)",
        |lex| lex.slice().parse::<f64>().ok()
    )]
    Float(f64),
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'([^'\\\n]|\\.)*'", |lex| unquote(lex.slice()))]
    Str(String),
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("=")]
    Assign,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::New => f.write_str("`new`"),
            Token::True => f.write_str("`true`"),
            Token::False => f.write_str("`false`"),
            Token::Null => f.write_str("`null`"),
            Token::Declare => f.write_str("declaration keyword"),
            Token::BlockComment(_) => f.write_str("comment"),
            Token::Integer(n) => write!(f, "integer {}", n),
            Token::Float(x) => write!(f, "number {}", x),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Ident(name) => write!(f, "identifier `{}`", name),
            Token::Assign => f.write_str("`=`"),
            Token::Semicolon => f.write_str("`;`"),
            Token::Comma => f.write_str("`,`"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::LBracket => f.write_str("`[`"),
            Token::RBracket => f.write_str("`]`"),
        }
    }
}

/// Consume up to the closing `*/`; unterminated comments are lex errors.
fn block_comment(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let end = lex.remainder().find("*/")?;
    lex.bump(end + 2);
    Some(comment_body(lex.slice()))
}

/// Strip the delimiters and leading `*` gutters from a block comment.
fn comment_body(slice: &str) -> String {
    let inner = &slice[2..slice.len() - 2];
    inner
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim_start).unwrap_or(line)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unquote(slice: &str) -> Option<String> {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }
    Some(out)
}

/// Tokenize a whole script.
///
/// # Errors
/// Returns `ScenarioError::Lex` at the first unrecognized character or
/// unterminated block comment.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();

    for (token, range) in Token::lexer(source).spanned() {
        let span = index.span(range.start, range.end);
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                // Integers too wide for i64 are still numbers.
                if let Some(x) = wide_integer(&source[range.clone()]) {
                    tokens.push((Token::Float(x), span));
                    continue;
                }
                return Err(ScenarioError::Lex {
                    span,
                    found: source[range].to_string(),
                })
            }
        }
    }

    Ok(tokens)
}

fn wide_integer(slice: &str) -> Option<f64> {
    let digits = slice.strip_prefix('-').unwrap_or(slice);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    slice.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            kinds("nodeExpansionThreshold = 10;"),
            vec![
                Token::Ident("nodeExpansionThreshold".into()),
                Token::Assign,
                Token::Integer(10),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_keywords_beat_identifiers() {
        assert_eq!(
            kinds("new newThing true trueish"),
            vec![
                Token::New,
                Token::Ident("newThing".into()),
                Token::True,
                Token::Ident("trueish".into()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("4000 -3 2.5 .5 1e3"),
            vec![
                Token::Integer(4000),
                Token::Integer(-3),
                Token::Float(2.5),
                Token::Float(0.5),
                Token::Float(1000.0),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#""a\"b" 'c'"#),
            vec![Token::Str("a\"b".into()), Token::Str("c".into())]
        );
    }

    #[test]
    fn test_line_comment_skipped() {
        assert_eq!(kinds("// hello\nx"), vec![Token::Ident("x".into())]);
    }

    #[test]
    fn test_block_comment_body() {
        let tokens = kinds("/*\n * Learning ghost model.\n * Second line.\n */");
        assert_eq!(
            tokens,
            vec![Token::BlockComment(
                "Learning ghost model.\nSecond line.".into()
            )]
        );
    }

    #[test]
    fn test_block_comment_with_stars() {
        let tokens = kinds("/** x **/ y");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::Ident("y".into()));
    }

    #[test]
    fn test_lex_error_location() {
        let err = tokenize("a = 1;\nb = #;").unwrap_err();
        match err {
            ScenarioError::Lex { span, found } => {
                assert_eq!(found, "#");
                assert_eq!((span.line, span.column), (2, 5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_block_comment_inline() {
        assert_eq!(
            kinds("/* x */ nodeExpansionThreshold = 1;"),
            vec![
                Token::BlockComment("x".into()),
                Token::Ident("nodeExpansionThreshold".into()),
                Token::Assign,
                Token::Integer(1),
                Token::Semicolon,
            ]
        );
        assert_eq!(kinds("/**/"), vec![Token::BlockComment(String::new())]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert!(matches!(
            tokenize("/* never closed
x = 1;"),
            Err(ScenarioError::Lex { .. })
        ));
    }

    #[test]
    fn test_wide_integer_becomes_float() {
        assert_eq!(
            kinds("100000000000000000000 -99999999999999999999"),
            vec![Token::Float(1e20), Token::Float(-99999999999999999999.0)]
        );
        assert_eq!(kinds("9223372036854775807"), vec![Token::Integer(i64::MAX)]);
    }
}
