//! Tokenizer for the rule document language.
//!
//! Produces a flat token stream with line/column positions and byte
//! spans. Byte spans let the parser recover the exact source text of
//! expressions it does not classify.

use crate::error::ParseDiagnostic;

/// A lexed token kind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Identifier or keyword (`import`, `as`, `true`, ... are
    /// distinguished by the parser).
    Ident(String),
    /// String literal, unescaped.
    Str(String),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Double(f64),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Semi,
    Comma,
    Dot,
    /// Any other operator character (`=`, `+`, `-`, `*`, ...). Only
    /// meaningful inside raw expressions.
    Op(char),
}

/// A token with its source position.
#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Tokenize a source string.
///
/// Lexical errors are collected as diagnostics; the lexer skips the
/// offending character and continues so later errors are reported too.
pub(crate) fn lex(source: &str) -> (Vec<Token>, Vec<ParseDiagnostic>) {
    let mut lexer = Lexer {
        source,
        pos: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
        diagnostics: Vec::new(),
    };
    lexer.run();
    (lexer.tokens, lexer.diagnostics)
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Lexer<'_> {
    fn run(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' || ch == '\n' {
                self.advance();
            } else if self.rest().starts_with("//") {
                self.skip_line_comment();
            } else if self.rest().starts_with("/*") {
                self.skip_block_comment();
            } else if ch == '"' || ch == '\'' {
                self.lex_string(ch);
            } else if ch.is_ascii_digit() || (ch == '.' && self.next_is_digit()) {
                self.lex_number();
            } else if ch.is_alphabetic() || ch == '_' {
                self.lex_identifier();
            } else {
                self.lex_punctuation(ch);
            }
        }
    }

    fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_is_digit(&self) -> bool {
        self.rest()
            .chars()
            .nth(1)
            .is_some_and(|ch| ch.is_ascii_digit())
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize, start: usize) {
        self.tokens.push(Token {
            kind,
            line,
            column,
            start,
            end: self.pos,
        });
    }

    fn diagnostic(&mut self, line: usize, column: usize, message: impl Into<String>) {
        self.diagnostics
            .push(ParseDiagnostic::new(line, column, message));
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        let (line, column) = (self.line, self.column);
        self.advance();
        self.advance();
        loop {
            if self.rest().starts_with("*/") {
                self.advance();
                self.advance();
                return;
            }
            if self.advance().is_none() {
                self.diagnostic(line, column, "unterminated comment");
                return;
            }
        }
    }

    fn lex_string(&mut self, quote: char) {
        let (line, column, start) = (self.line, self.column, self.pos);
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.diagnostic(line, column, "unterminated string");
                    self.push(TokenKind::Str(value), line, column, start);
                    return;
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    self.push(TokenKind::Str(value), line, column, start);
                    return;
                }
                Some('\\') => {
                    self.advance();
                    self.lex_escape(&mut value);
                }
                Some(ch) => {
                    self.advance();
                    value.push(ch);
                }
            }
        }
    }

    fn lex_escape(&mut self, value: &mut String) {
        let (line, column) = (self.line, self.column);
        match self.advance() {
            None => self.diagnostic(line, column, "unterminated escape sequence"),
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('t') => value.push('\t'),
            Some('u') => {
                let start = self.pos;
                for _ in 0..4 {
                    match self.peek() {
                        Some(ch) if ch.is_ascii_hexdigit() => {
                            self.advance();
                        }
                        _ => {
                            self.diagnostic(line, column, "expected 4 hex digits in \\uXXXX");
                            return;
                        }
                    }
                }
                let hex = &self.source[start..self.pos];
                match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => value.push(ch),
                    None => {
                        self.diagnostic(line, column, format!("invalid code point \\u{hex}"));
                    }
                }
            }
            // Passthrough covers \\ \" \' and anything else.
            Some(ch) => value.push(ch),
        }
    }

    fn lex_number(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        let mut is_double = false;

        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.next_is_digit() {
            is_double = true;
            self.advance();
            while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let saved = (self.pos, self.line, self.column);
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                is_double = true;
                while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                    self.advance();
                }
            } else {
                // Not an exponent after all; `e` starts an identifier.
                (self.pos, self.line, self.column) = saved;
            }
        }

        let text = &self.source[start..self.pos];
        let kind = if is_double {
            text.parse::<f64>().map(TokenKind::Double)
        } else {
            text.parse::<i64>()
                .map(TokenKind::Int)
                .or_else(|_| text.parse::<f64>().map(TokenKind::Double))
        };
        match kind {
            Ok(kind) => self.push(kind, line, column, start),
            Err(_) => self.diagnostic(line, column, format!("invalid number: {text}")),
        }
    }

    fn lex_identifier(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        while self
            .peek()
            .is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
        {
            self.advance();
        }
        let text = self.source[start..self.pos].to_string();
        self.push(TokenKind::Ident(text), line, column, start);
    }

    fn lex_punctuation(&mut self, ch: char) {
        let (line, column, start) = (self.line, self.column, self.pos);
        self.advance();
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '=' | '+' | '-' | '*' | '/' | '%' | '<' | '>' | '!' | '&' | '|' | '?' | '^' | '~' => {
                TokenKind::Op(ch)
            }
            _ => {
                self.diagnostic(line, column, format!("unexpected character `{ch}`"));
                return;
            }
        };
        self.push(kind, line, column, start);
    }
}
