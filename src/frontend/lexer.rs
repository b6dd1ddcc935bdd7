//! Lexer for KPL.
//!
//! The lexer converts source text into a stream of tokens. Stray characters
//! come out as [`TokenKind::Invalid`] tokens, which
//! [`Lexer::next_valid_token`] reports and skips; everything else that is
//! malformed is a fatal [`LexerError`].

use crate::frontend::token::{Token, TokenKind, MAX_IDENT_LEN};
use crate::utils::errors::{LexerError, LexerErrorKind};
use crate::utils::location::{SourceLocation, Span};
use log::warn;
use std::iter::Peekable;
use std::str::Chars;

/// Identifiers start with an ASCII letter.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A lexer for tokenizing source code.
pub struct Lexer<'a> {
    /// The source text
    source: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current byte offset
    offset: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Start of current token
    token_start: SourceLocation,
    /// Invalid tokens skipped so far
    diagnostics: Vec<LexerError>,
    /// Whether we've hit EOF
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            token_start: SourceLocation::start(),
            diagnostics: Vec::new(),
            at_eof: false,
        }
    }

    /// Recoverable problems reported while skipping invalid tokens.
    pub fn diagnostics(&self) -> &[LexerError] {
        &self.diagnostics
    }

    /// Take ownership of the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.diagnostics)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }

    fn mark_token_start(&mut self) {
        self.token_start = self.current_location();
    }

    fn make_span(&self) -> Span {
        Span::from_locations(self.token_start, self.current_location())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Peek one character past the current one.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and `(* ... *)` comments.
    fn skip_whitespace(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('(') if self.peek_next() == Some('*') => {
                    self.mark_token_start();
                    self.advance(); // (
                    self.advance(); // *
                    self.skip_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), LexerError> {
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some(')') => {
                    self.advance();
                    return Ok(());
                }
                Some(_) => {}
                None => {
                    return Err(self.make_error("End of file reached inside a comment", LexerErrorKind::EndOfComment));
                }
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let span = self.make_span();
        let lexeme = self.source[span.start_offset..span.end_offset].to_string();
        Token::new(kind, span, lexeme)
    }

    fn make_error(&self, message: &str, kind: LexerErrorKind) -> LexerError {
        LexerError {
            message: message.to_string(),
            span: self.make_span(),
            kind,
        }
    }

    /// Scan an unsigned number literal.
    fn scan_number(&mut self) -> Result<Token, LexerError> {
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
        }

        let token = self.make_token(TokenKind::Number);
        if token.lexeme.parse::<i32>().is_err() {
            return Err(self.make_error(
                &format!("Number '{}' is too large", token.lexeme),
                LexerErrorKind::NumberTooLong,
            ));
        }
        Ok(token)
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self) -> Result<Token, LexerError> {
        while self.peek().map(is_ident_continue).unwrap_or(false) {
            self.advance();
        }

        let span = self.make_span();
        let lexeme = &self.source[span.start_offset..span.end_offset];

        if let Some(kind) = TokenKind::keyword(lexeme) {
            return Ok(Token::new(kind, span, lexeme.to_string()));
        }
        if lexeme.chars().count() > MAX_IDENT_LEN {
            return Err(self.make_error(
                &format!("Identifier '{}' is longer than {} characters", lexeme, MAX_IDENT_LEN),
                LexerErrorKind::IdentTooLong,
            ));
        }
        Ok(Token::new(TokenKind::Ident, span, lexeme.to_string()))
    }

    /// Scan a character literal; the opening quote is already consumed.
    /// The token's lexeme is the character itself.
    fn scan_char(&mut self) -> Result<Token, LexerError> {
        let value = match self.advance() {
            Some(c) if c.is_ascii() && !c.is_ascii_control() => c,
            _ => {
                return Err(self.make_error("Invalid character constant", LexerErrorKind::InvalidCharConstant));
            }
        };
        if !self.match_char('\'') {
            return Err(self.make_error("Invalid character constant", LexerErrorKind::InvalidCharConstant));
        }
        Ok(Token::new(TokenKind::Char, self.make_span(), value.to_string()))
    }

    /// Scan the next token, possibly an [`TokenKind::Invalid`] one.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace()?;
        self.mark_token_start();

        let c = match self.advance() {
            Some(c) => c,
            None => {
                self.at_eof = true;
                return Ok(self.make_token(TokenKind::Eof));
            }
        };

        let kind = match c {
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Eq,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Slash,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LSel,
            ']' => TokenKind::RSel,
            '(' => {
                if self.match_char('.') {
                    TokenKind::LSel
                } else {
                    TokenKind::LParen
                }
            }
            '.' => {
                if self.match_char(')') {
                    TokenKind::RSel
                } else {
                    TokenKind::Period
                }
            }
            ':' => {
                if self.match_char('=') {
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                }
            }
            '<' => {
                if self.match_char('=') {
                    TokenKind::Le
                } else if self.match_char('>') {
                    TokenKind::Neq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenKind::Neq
                } else {
                    TokenKind::Invalid
                }
            }
            '\'' => return self.scan_char(),
            c if c.is_ascii_digit() => return self.scan_number(),
            c if is_ident_start(c) => return self.scan_identifier(),
            _ => TokenKind::Invalid,
        };

        Ok(self.make_token(kind))
    }

    /// Scan the next token that is not [`TokenKind::Invalid`].
    ///
    /// Invalid tokens are logged, recorded in [`Lexer::diagnostics`] and
    /// skipped. Fatal lexical errors are returned as-is.
    pub fn next_valid_token(&mut self) -> Result<Token, LexerError> {
        loop {
            let token = self.next_token()?;
            if token.kind != TokenKind::Invalid {
                return Ok(token);
            }
            let error = LexerError {
                message: format!("Invalid symbol '{}'", token.lexeme),
                span: token.span,
                kind: LexerErrorKind::InvalidSymbol,
            };
            warn!("{}", error);
            self.diagnostics.push(error);
        }
    }

    /// Check if we've reached EOF.
    pub fn is_at_end(&self) -> bool {
        self.at_eof
    }

    /// Collect all valid tokens, up to and including EOF.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_valid_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at_eof {
            None
        } else {
            Some(self.next_valid_token())
        }
    }
}
