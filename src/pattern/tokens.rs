use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use log::trace;
use serde::Serialize;

use crate::err::Diagnostic;

/// Location of a token in the definition text (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifiers and keywords (`struct`, `bitfield` are matched by the parser).
    Ident(String),
    /// Decimal or `0x` prefixed integer literal.
    Number(u64),
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Colon,
    Semicolon,
    /// Anything the grammar has no use for: operators, string literals, oversized numbers.
    Other(String),
    Eof,
}

impl TokenKind {
    /// Source-like rendering, used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) | TokenKind::Other(s) => s.clone(),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::OpenBrace => "{".to_string(),
            TokenKind::CloseBrace => "}".to_string(),
            TokenKind::OpenBracket => "[".to_string(),
            TokenKind::CloseBracket => "]".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::Semicolon => ";".to_string(),
            TokenKind::Eof => "<eof>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    finished: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            finished: false,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes the whole input. The returned stream always ends with a single `Eof`.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        for token in self.by_ref() {
            tokens.push(token);
        }
        (tokens, self.diagnostics)
    }

    fn current_position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next().map(|(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.source.len())
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skips whitespace, comments and preprocessor lines.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '#' => self.skip_line(),
                '/' if self.peek_second() == Some('/') => self.skip_line(),
                '/' if self.peek_second() == Some('*') => {
                    let start = self.current_position();
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(c) = self.advance() {
                        if c == '*' && self.peek() == Some('/') {
                            self.advance();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        self.diagnostics
                            .push(Diagnostic::UnterminatedComment { position: start });
                    }
                }
                _ => break,
            }
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
        let end = self.offset();
        let source = self.source;
        &source[start..end]
    }

    fn take_number(&mut self) -> TokenKind {
        let text = self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let digits = text.replace('_', "");
        let parsed = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => digits.parse::<u64>(),
        };

        match parsed {
            Ok(value) => TokenKind::Number(value),
            Err(_) => TokenKind::Other(text.to_string()),
        }
    }

    fn take_string(&mut self, quote: char) -> TokenKind {
        let start = self.offset();
        self.advance();
        while let Some(c) = self.advance() {
            if c == '\\' {
                self.advance();
            } else if c == quote {
                break;
            }
        }
        let end = self.offset();
        let source = self.source;
        TokenKind::Other(source[start..end].to_string())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.skip_trivia();
        let position = self.current_position();

        let kind = match self.peek() {
            None => {
                self.finished = true;
                TokenKind::Eof
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => TokenKind::Ident(
                self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_')
                    .to_string(),
            ),
            Some(c) if c.is_ascii_digit() => self.take_number(),
            Some(q @ ('"' | '\'')) => self.take_string(q),
            Some(c) => {
                self.advance();
                match c {
                    '{' => TokenKind::OpenBrace,
                    '}' => TokenKind::CloseBrace,
                    '[' => TokenKind::OpenBracket,
                    ']' => TokenKind::CloseBracket,
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    c if c.is_ascii_punctuation() => TokenKind::Other(c.to_string()),
                    c => {
                        self.diagnostics.push(Diagnostic::UnexpectedCharacter {
                            character: c,
                            position,
                        });
                        TokenKind::Other(c.to_string())
                    }
                }
            }
        };

        trace!("token {:?} at {}", kind, position);
        Some(Token { kind, position })
    }
}
