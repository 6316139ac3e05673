//! Recursive-descent parser for pattern definitions.
//!
//! The parser never fails. Whatever it does not understand is skipped up to the next `;` on
//! the same nesting level (or over a balanced `{ ... }` block) and reported as a
//! [`Diagnostic`]. A `struct` whose braces never close is dropped as a whole.

use log::debug;

use crate::err::Diagnostic;
use crate::pattern::ast::{ArrayLength, BitMember, BitfieldDecl, FieldDecl, Member, Pattern, StructDecl};
use crate::pattern::tokens::{Lexer, Position, Token, TokenKind};

/// Words that can never start a plain field declaration.
const KEYWORDS: &[&str] = &[
    "struct",
    "bitfield",
    "union",
    "enum",
    "using",
    "namespace",
    "fn",
    "if",
    "else",
    "while",
    "for",
    "match",
    "return",
    "break",
    "continue",
    "import",
];

/// Reached the end of the input inside a `{ ... }` block.
struct Unterminated;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
    diagnostics: Vec<Diagnostic>,
}

/// Parses `source` into a syntax tree and the diagnostics gathered along the way.
pub fn parse(source: &str) -> (Pattern, Vec<Diagnostic>) {
    Parser::new(source).parse_pattern()
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        let eof_position = tokens.last().map(|t| t.position).unwrap_or_default();

        Parser {
            tokens,
            pos: 0,
            eof: Token {
                kind: TokenKind::Eof,
                position: eof_position,
            },
            diagnostics,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn position(&self) -> Position {
        self.current().position
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn report_skipped_statement(&mut self) {
        let diagnostic = Diagnostic::SkippedStatement {
            found: self.kind().describe(),
            position: self.position(),
        };
        self.report(diagnostic);
    }

    /// Parses the whole input.
    pub fn parse_pattern(mut self) -> (Pattern, Vec<Diagnostic>) {
        let mut pattern = Pattern::default();

        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => self.advance(),
                TokenKind::Ident(s) if s == "struct" => {
                    if let Some(decl) = self.parse_struct() {
                        pattern.structs.push(decl);
                    }
                }
                TokenKind::OpenBrace => {
                    let position = self.position();
                    self.report(Diagnostic::SkippedBlock { position });
                    // An unterminated block simply runs to the end of the input.
                    let _ = self.skip_block();
                }
                TokenKind::CloseBrace => {
                    self.report_skipped_statement();
                    self.advance();
                }
                _ => {
                    self.report_skipped_statement();
                    self.skip_statement();
                }
            }
        }

        (pattern, self.diagnostics)
    }

    /// Skips to the end of the current statement.
    ///
    /// Stops after the next `;`, after a balanced `{ ... }` block (and its trailing `;`), or
    /// in front of a `}` that closes the enclosing block.
    fn skip_statement(&mut self) {
        loop {
            match self.kind() {
                TokenKind::Eof | TokenKind::CloseBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::OpenBrace => {
                    if self.skip_block().is_ok() && *self.kind() == TokenKind::Semicolon {
                        self.advance();
                    }
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    /// Skips a balanced `{ ... }` block. The current token must be `{`.
    fn skip_block(&mut self) -> Result<(), Unterminated> {
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                TokenKind::Eof => return Err(Unterminated),
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_struct(&mut self) -> Option<StructDecl> {
        let position = self.position();

        let name = match (self.peek_kind(1), self.peek_kind(2)) {
            (TokenKind::Ident(name), TokenKind::OpenBrace) => name.clone(),
            _ => {
                // Forward declarations, inheritance and the like.
                self.report_skipped_statement();
                self.skip_statement();
                return None;
            }
        };

        // `struct`, name, `{`
        self.advance();
        self.advance();
        self.advance();

        let mut members = Vec::new();
        loop {
            match self.kind() {
                TokenKind::CloseBrace => {
                    self.advance();
                    if *self.kind() == TokenKind::Semicolon {
                        self.advance();
                    }
                    debug!("parsed struct `{}` with {} members", name, members.len());
                    return Some(StructDecl {
                        name,
                        members,
                        position,
                    });
                }
                TokenKind::Eof => {
                    self.report(Diagnostic::UnterminatedBlock { name, position });
                    return None;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::Ident(s) if s == "bitfield" && *self.peek_kind(1) == TokenKind::OpenBrace => {
                    match self.parse_bitfield() {
                        Ok(Some(bitfield)) => members.push(Member::Bitfield(bitfield)),
                        Ok(None) => {}
                        Err(Unterminated) => {
                            self.report(Diagnostic::UnterminatedBlock { name, position });
                            return None;
                        }
                    }
                }
                TokenKind::OpenBrace => {
                    let block_position = self.position();
                    self.report(Diagnostic::SkippedBlock {
                        position: block_position,
                    });
                    if self.skip_block().is_err() {
                        self.report(Diagnostic::UnterminatedBlock { name, position });
                        return None;
                    }
                }
                _ => match self.parse_field() {
                    Some(field) => members.push(Member::Field(field)),
                    None => {
                        self.report_skipped_statement();
                        self.skip_statement();
                    }
                },
            }
        }
    }

    /// Parses `<type>[N]? <name>[N]? ;`. Leaves the position untouched on mismatch.
    fn parse_field(&mut self) -> Option<FieldDecl> {
        let start = self.pos;
        let field = self.try_parse_field();
        if field.is_none() {
            self.pos = start;
        }
        field
    }

    fn try_parse_field(&mut self) -> Option<FieldDecl> {
        let position = self.position();

        let type_name = match self.kind() {
            TokenKind::Ident(s) if !KEYWORDS.contains(&s.as_str()) => s.clone(),
            _ => return None,
        };
        self.advance();
        let type_array = self.parse_array_suffix()?;

        let name = match self.kind() {
            TokenKind::Ident(s) => s.clone(),
            _ => return None,
        };
        self.advance();
        let name_array = self.parse_array_suffix()?;

        if *self.kind() != TokenKind::Semicolon {
            return None;
        }
        self.advance();

        let array = match (type_array, name_array) {
            (Some(_), Some(_)) => return None,
            (a, b) => a.or(b),
        };

        Some(FieldDecl {
            name,
            type_name,
            array,
            position,
        })
    }

    /// Parses an optional `[ ... ]` suffix.
    ///
    /// Returns `Some(None)` when there is no suffix and `None` when the suffix is malformed.
    fn parse_array_suffix(&mut self) -> Option<Option<ArrayLength>> {
        if *self.kind() != TokenKind::OpenBracket {
            return Some(None);
        }
        self.advance();

        let mut inner: Vec<TokenKind> = Vec::new();
        loop {
            match self.kind() {
                TokenKind::CloseBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Semicolon
                | TokenKind::OpenBrace
                | TokenKind::CloseBrace
                | TokenKind::OpenBracket
                | TokenKind::Eof => return None,
                other => {
                    inner.push(other.clone());
                    self.advance();
                }
            }
        }

        let length = match inner.as_slice() {
            [TokenKind::Number(n)] => ArrayLength::Fixed(*n),
            tokens => ArrayLength::Unresolved(
                tokens
                    .iter()
                    .map(TokenKind::describe)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        };
        Some(Some(length))
    }

    /// Parses `bitfield { <member> : <bits>; ... } <name>;`. The current token is `bitfield`.
    fn parse_bitfield(&mut self) -> Result<Option<BitfieldDecl>, Unterminated> {
        let position = self.position();
        // `bitfield`, `{`
        self.advance();
        self.advance();

        let mut members = Vec::new();
        loop {
            match self.kind() {
                TokenKind::CloseBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(Unterminated),
                TokenKind::Semicolon => self.advance(),
                TokenKind::OpenBrace => {
                    let block_position = self.position();
                    self.report(Diagnostic::SkippedBlock {
                        position: block_position,
                    });
                    self.skip_block()?;
                }
                TokenKind::Ident(member) if *self.peek_kind(1) == TokenKind::Colon => {
                    let member = member.clone();
                    let member_position = self.position();
                    self.advance();
                    self.advance();

                    if let TokenKind::Number(bits) = *self.kind() {
                        members.push(BitMember { name: member, bits });
                        self.advance();
                        if *self.kind() == TokenKind::Semicolon {
                            self.advance();
                        } else {
                            self.skip_statement();
                        }
                    } else {
                        self.report(Diagnostic::InvalidBitWidth {
                            member,
                            position: member_position,
                        });
                        self.skip_statement();
                    }
                }
                _ => {
                    self.report_skipped_statement();
                    self.skip_statement();
                }
            }
        }

        match (self.kind(), self.peek_kind(1)) {
            (TokenKind::Ident(name), TokenKind::Semicolon) => {
                let name = name.clone();
                self.advance();
                self.advance();
                Ok(Some(BitfieldDecl {
                    name,
                    members,
                    position,
                }))
            }
            _ => {
                self.report(Diagnostic::SkippedStatement {
                    found: "bitfield".to_string(),
                    position,
                });
                self.skip_statement();
                Ok(None)
            }
        }
    }
}
