//! Hand-written recursive descent parser for scenario scripts.
//!
//! ```text
//! script    := BLOCK_COMMENT? statement*
//! statement := ('var' | 'let' | 'const')? IDENT '=' expr ';'?
//! expr      := INT | FLOAT | 'true' | 'false' | 'null' | STRING | IDENT
//!            | 'new' IDENT '(' (expr (',' expr)*)? ')'
//!            | '[' (expr (',' expr)* ','?)? ']'
//! ```
//!
//! Block comments after the leading one are ignored.

use crate::ast::{Expr, ExprKind, Script, Span, Statement};
use crate::error::{Result, ScenarioError};
use crate::lexer::{tokenize, Token};

/// Token stream with lookahead and span tracking.
struct TokenStream {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    eof: Span,
}

impl TokenStream {
    fn new(tokens: Vec<(Token, Span)>, eof: Span) -> Self {
        Self {
            tokens,
            pos: 0,
            eof,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| *span)
            .unwrap_or(self.eof)
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Span> {
        if self.check(&expected) {
            let span = self.current_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span)> {
        match self.advance() {
            Some((Token::Ident(name), span)) => Ok((name, span)),
            Some(_) => {
                self.pos -= 1;
                Err(self.unexpected(what))
            }
            None => Err(self.unexpected(what)),
        }
    }

    fn unexpected(&self, expected: &str) -> ScenarioError {
        let message = match self.peek() {
            Some(token) => format!("expected {}, found {}", expected, token),
            None => format!("expected {}, found end of input", expected),
        };
        ScenarioError::Parse {
            span: self.current_span(),
            message,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

/// Parse a script's source text.
pub fn parse(source: &str) -> Result<Script> {
    let mut tokens = tokenize(source)?;

    let description = match tokens.first() {
        Some((Token::BlockComment(body), _)) if !body.is_empty() => Some(body.clone()),
        _ => None,
    };
    tokens.retain(|(token, _)| !matches!(token, Token::BlockComment(_)));

    let eof = match tokens.last() {
        Some((_, span)) => Span {
            start: span.end,
            end: span.end,
            line: span.line,
            column: span.column + (span.end - span.start),
        },
        None => Span {
            start: source.len(),
            end: source.len(),
            line: 1,
            column: 1,
        },
    };

    let mut stream = TokenStream::new(tokens, eof);
    let mut statements = Vec::new();
    while !stream.at_end() {
        statements.push(parse_statement(&mut stream)?);
    }

    Ok(Script {
        description,
        statements,
    })
}

fn parse_statement(stream: &mut TokenStream) -> Result<Statement> {
    stream.eat(&Token::Declare);
    let (name, name_span) = stream.expect_ident("option name")?;
    stream.expect(Token::Assign)?;
    let value = parse_expr(stream)?;
    stream.eat(&Token::Semicolon);

    Ok(Statement {
        name,
        name_span,
        value,
    })
}

fn parse_expr(stream: &mut TokenStream) -> Result<Expr> {
    let start = stream.current_span();
    let Some((token, span)) = stream.advance() else {
        return Err(stream.unexpected("a value"));
    };

    let kind = match token {
        Token::Integer(n) => ExprKind::Integer(n),
        Token::Float(x) => ExprKind::Float(x),
        Token::True => ExprKind::Bool(true),
        Token::False => ExprKind::Bool(false),
        Token::Null => ExprKind::Null,
        Token::Str(s) => ExprKind::Str(s),
        Token::Ident(name) => ExprKind::Ident(name),
        Token::New => {
            let (constructor, _) = stream.expect_ident("constructor name")?;
            stream.expect(Token::LParen)?;
            let args = parse_list(stream, Token::RParen, false)?;
            let end = stream.expect(Token::RParen)?;
            return Ok(Expr {
                kind: ExprKind::New { constructor, args },
                span: start.to(end),
            });
        }
        Token::LBracket => {
            let items = parse_list(stream, Token::RBracket, true)?;
            let end = stream.expect(Token::RBracket)?;
            return Ok(Expr {
                kind: ExprKind::Array(items),
                span: start.to(end),
            });
        }
        _ => {
            stream.pos -= 1;
            return Err(stream.unexpected("a value"));
        }
    };

    Ok(Expr { kind, span })
}

/// Comma-separated expressions up to (not including) `close`.
fn parse_list(stream: &mut TokenStream, close: Token, allow_trailing: bool) -> Result<Vec<Expr>> {
    let mut items = Vec::new();
    if stream.check(&close) {
        return Ok(items);
    }

    loop {
        items.push(parse_expr(stream)?);
        if !stream.eat(&Token::Comma) {
            break;
        }
        if allow_trailing && stream.check(&close) {
            break;
        }
    }

    Ok(items)
}
