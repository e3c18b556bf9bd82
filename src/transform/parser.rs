//! Parser for the derived-field formula language.
//!
//! Two entry points:
//! - [`TransformParser::compile`] splits raw formula text into a [`Template`]
//!   by locating whole-word, case-insensitive occurrences of each parent
//!   field's token.
//! - [`TransformParser::parse`] tokenizes rendered text and recognises a
//!   builtin call covering the whole input; any other text becomes a literal.

use std::ops::Range;

use regex::{NoExpand, Regex};

use super::ast::{Builtin, Expression, Segment, Template};
use crate::schema::types::{FieldId, SchemaError};

/// A parent field as seen by the formula: its id and the token that names it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub field_id: FieldId,
    pub token: String,
}

impl Binding {
    pub fn new(field_id: impl Into<FieldId>, token: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            token: token.into(),
        }
    }
}

pub struct TransformParser;

impl TransformParser {
    /// Compiles `formula` against the given bindings, applied in order.
    ///
    /// Earlier bindings claim their occurrences first; text already claimed by
    /// a reference is not searched again by later bindings.
    pub fn compile(formula: &str, bindings: &[Binding]) -> Result<Template, SchemaError> {
        let mut pieces = vec![Piece::Literal(0..formula.len())];

        for binding in bindings {
            if binding.token.is_empty() {
                continue;
            }
            let pattern = token_pattern(&binding.token)?;
            let mut next = Vec::with_capacity(pieces.len());
            for piece in pieces {
                match piece {
                    Piece::Literal(range) => {
                        split_literal(formula, range, &pattern, binding, &mut next)
                    }
                    reference => next.push(reference),
                }
            }
            pieces = next;
        }

        let segments = pieces
            .into_iter()
            .map(|piece| match piece {
                Piece::Literal(range) => Segment::Literal(formula[range].to_string()),
                Piece::Ref(field_id, range) => Segment::FieldRef {
                    field_id,
                    token: formula[range].to_string(),
                },
            })
            .collect();
        Ok(Template { segments })
    }

    /// Parses rendered formula text.
    pub fn parse(text: &str) -> Expression {
        let tokens = Lexer::new(text).tokenize();
        let mut parser = Parser {
            text,
            tokens: &tokens,
            pos: 0,
        };
        parser
            .parse_call()
            .unwrap_or_else(|| Expression::Literal(text.to_string()))
    }

    /// Replaces every token occurrence directly in `formula`, for callers that
    /// only need the substituted text.
    pub fn substitute(formula: &str, token: &str, value: &str) -> Result<String, SchemaError> {
        if token.is_empty() {
            return Ok(formula.to_string());
        }
        let pattern = token_pattern(token)?;
        Ok(pattern.replace_all(formula, NoExpand(value)).into_owned())
    }
}

fn token_pattern(token: &str) -> Result<Regex, SchemaError> {
    let pattern = format!(r"(?i)(?-u:\b){}(?-u:\b)", regex::escape(token));
    Regex::new(&pattern).map_err(|e| {
        SchemaError::InvalidTransform(format!("Cannot build matcher for '{}': {}", token, e))
    })
}

/// Span of the formula text, either unclaimed or claimed by a parent field.
enum Piece {
    Literal(Range<usize>),
    Ref(FieldId, Range<usize>),
}

/// Splits the unclaimed span `range` of `formula` around occurrences of
/// `pattern`. Matching runs on the whole formula so word boundaries at the
/// span edges see the surrounding text.
fn split_literal(
    formula: &str,
    range: Range<usize>,
    pattern: &Regex,
    binding: &Binding,
    out: &mut Vec<Piece>,
) {
    let mut last = range.start;
    while last < range.end {
        let m = match pattern.find_at(formula, last) {
            Some(m) if m.end() <= range.end => m,
            _ => break,
        };
        if m.start() > last {
            out.push(Piece::Literal(last..m.start()));
        }
        out.push(Piece::Ref(binding.field_id.clone(), m.range()));
        last = m.end();
    }
    if last < range.end {
        out.push(Piece::Literal(last..range.end));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    LParen,
    RParen,
    Comma,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

struct Lexer<'a> {
    text: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text }
    }

    fn tokenize(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut chars = self.text.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            let kind = match c {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ',' => TokenKind::Comma,
                c if is_ident_start(c) => {
                    let mut end = start + c.len_utf8();
                    while let Some(&(i, next)) = chars.peek() {
                        if !is_ident_continue(next) {
                            break;
                        }
                        end = i + next.len_utf8();
                        chars.next();
                    }
                    tokens.push(Token {
                        kind: TokenKind::Ident,
                        start,
                        end,
                    });
                    continue;
                }
                _ => TokenKind::Other,
            };

            let end = start + c.len_utf8();
            // Merge runs of uninteresting characters into one token.
            if kind == TokenKind::Other {
                if let Some(prev) = tokens.last_mut() {
                    if prev.kind == TokenKind::Other && prev.end == start {
                        prev.end = end;
                        continue;
                    }
                }
            }
            tokens.push(Token { kind, start, end });
        }

        tokens
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        match self.peek() {
            Some(token) if token.kind == kind => self.advance(),
            _ => None,
        }
    }

    /// call := BUILTIN '(' args ')' <end>
    fn parse_call(&mut self) -> Option<Expression> {
        let name = self.expect(TokenKind::Ident)?;
        let function = Builtin::from_name(&self.text[name.start..name.end])?;
        let open = self.expect(TokenKind::LParen)?;

        let close = *self.tokens.last()?;
        if close.kind != TokenKind::RParen || self.pos >= self.tokens.len() {
            return None;
        }

        let args = self.parse_args(open.end, self.tokens.len() - 1, close.start);
        Some(Expression::Call {
            function,
            args,
            source: self.text.to_string(),
        })
    }

    /// args := text (',' text)*
    ///
    /// Every comma between the outer parentheses separates arguments,
    /// regardless of quoting or nesting.
    fn parse_args(&mut self, inner_start: usize, close_index: usize, inner_end: usize) -> Vec<String> {
        let mut args = Vec::new();
        let mut arg_start = inner_start;
        while self.pos < close_index {
            if let Some(token) = self.advance() {
                if token.kind == TokenKind::Comma {
                    args.push(self.text[arg_start..token.start].to_string());
                    arg_start = token.end;
                }
            }
        }
        args.push(self.text[arg_start..inner_end].to_string());
        args
    }
}
