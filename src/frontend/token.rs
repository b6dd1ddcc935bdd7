//! Token types for KPL.
//!
//! This module defines all token types produced by the lexer.

use crate::utils::location::Span;
use std::fmt;

/// Maximum number of characters in an identifier.
pub const MAX_IDENT_LEN: usize = 15;

/// A token in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source span
    pub span: Span,
    /// The lexeme (raw text)
    pub lexeme: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, lexeme: String) -> Self {
        Self { kind, span, lexeme }
    }

    /// Check if this is an EOF token.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Check if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }

    /// Source line of the first character.
    pub fn line(&self) -> usize {
        self.span.start_line
    }

    /// Source column of the first character.
    pub fn column(&self) -> usize {
        self.span.start_column
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}:{}", self.line(), self.column(), self.kind.tag())?;
        match self.kind {
            TokenKind::Ident | TokenKind::Number | TokenKind::Char => write!(f, "({})", self.lexeme),
            _ => Ok(()),
        }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Unsigned integer literal
    Number,
    /// Character literal such as `'a'`
    Char,

    /// Identifier
    Ident,

    // Keywords
    /// `program` keyword
    Program,
    /// `const` keyword
    Const,
    /// `type` keyword
    Type,
    /// `var` keyword
    Var,
    /// `integer` keyword
    Integer,
    /// `char` keyword
    CharType,
    /// `array` keyword
    Array,
    /// `of` keyword
    Of,
    /// `function` keyword
    Function,
    /// `procedure` keyword
    Procedure,
    /// `begin` keyword
    Begin,
    /// `end` keyword
    End,
    /// `call` keyword
    Call,
    /// `if` keyword
    If,
    /// `then` keyword
    Then,
    /// `else` keyword
    Else,
    /// `while` keyword
    While,
    /// `do` keyword
    Do,
    /// `for` keyword
    For,
    /// `to` keyword
    To,

    // Symbols
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `.`
    Period,
    /// `,`
    Comma,
    /// `:=`
    Assign,
    /// `=`
    Eq,
    /// `<>` or `!=`
    Neq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Times,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[` or `(.`
    LSel,
    /// `]` or `.)`
    RSel,

    // Special
    /// End of file
    Eof,
    /// Character that starts no token
    Invalid,
}

impl TokenKind {
    /// Check if this is a keyword.
    pub fn is_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Program | Const | Type | Var | Integer | CharType | Array | Of |
            Function | Procedure | Begin | End | Call | If | Then | Else |
            While | Do | For | To
        )
    }

    /// Check if this is one of the six relational operators.
    pub fn is_comparison(&self) -> bool {
        use TokenKind::*;
        matches!(self, Eq | Neq | Lt | Le | Gt | Ge)
    }

    /// Get the keyword for a word, if it is one. Keywords are case-insensitive.
    pub fn keyword(s: &str) -> Option<TokenKind> {
        let kind = match s.to_ascii_uppercase().as_str() {
            "PROGRAM" => TokenKind::Program,
            "CONST" => TokenKind::Const,
            "TYPE" => TokenKind::Type,
            "VAR" => TokenKind::Var,
            "INTEGER" => TokenKind::Integer,
            "CHAR" => TokenKind::CharType,
            "ARRAY" => TokenKind::Array,
            "OF" => TokenKind::Of,
            "FUNCTION" => TokenKind::Function,
            "PROCEDURE" => TokenKind::Procedure,
            "BEGIN" => TokenKind::Begin,
            "END" => TokenKind::End,
            "CALL" => TokenKind::Call,
            "IF" => TokenKind::If,
            "THEN" => TokenKind::Then,
            "ELSE" => TokenKind::Else,
            "WHILE" => TokenKind::While,
            "DO" => TokenKind::Do,
            "FOR" => TokenKind::For,
            "TO" => TokenKind::To,
            _ => return None,
        };
        Some(kind)
    }

    /// Get a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            Char => "character constant",
            Ident => "identifier",
            Program => "PROGRAM",
            Const => "CONST",
            Type => "TYPE",
            Var => "VAR",
            Integer => "INTEGER",
            CharType => "CHAR",
            Array => "ARRAY",
            Of => "OF",
            Function => "FUNCTION",
            Procedure => "PROCEDURE",
            Begin => "BEGIN",
            End => "END",
            Call => "CALL",
            If => "IF",
            Then => "THEN",
            Else => "ELSE",
            While => "WHILE",
            Do => "DO",
            For => "FOR",
            To => "TO",
            Semicolon => ";",
            Colon => ":",
            Period => ".",
            Comma => ",",
            Assign => ":=",
            Eq => "=",
            Neq => "<>",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Slash => "/",
            LParen => "(",
            RParen => ")",
            LSel => "[",
            RSel => "]",
            Eof => "end of file",
            Invalid => "invalid token",
        }
    }

    /// Upper-case tag used when echoing consumed tokens.
    pub fn tag(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "TK_NUMBER",
            Char => "TK_CHAR",
            Ident => "TK_IDENT",
            Eof => "TK_EOF",
            Invalid => "TK_NONE",
            Program => "KW_PROGRAM",
            Const => "KW_CONST",
            Type => "KW_TYPE",
            Var => "KW_VAR",
            Integer => "KW_INTEGER",
            CharType => "KW_CHAR",
            Array => "KW_ARRAY",
            Of => "KW_OF",
            Function => "KW_FUNCTION",
            Procedure => "KW_PROCEDURE",
            Begin => "KW_BEGIN",
            End => "KW_END",
            Call => "KW_CALL",
            If => "KW_IF",
            Then => "KW_THEN",
            Else => "KW_ELSE",
            While => "KW_WHILE",
            Do => "KW_DO",
            For => "KW_FOR",
            To => "KW_TO",
            Semicolon => "SB_SEMICOLON",
            Colon => "SB_COLON",
            Period => "SB_PERIOD",
            Comma => "SB_COMMA",
            Assign => "SB_ASSIGN",
            Eq => "SB_EQ",
            Neq => "SB_NEQ",
            Lt => "SB_LT",
            Le => "SB_LE",
            Gt => "SB_GT",
            Ge => "SB_GE",
            Plus => "SB_PLUS",
            Minus => "SB_MINUS",
            Times => "SB_TIMES",
            Slash => "SB_SLASH",
            LParen => "SB_LPAR",
            RParen => "SB_RPAR",
            LSel => "SB_LSEL",
            RSel => "SB_RSEL",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::location::SourceLocation;

    #[test]
    fn test_keyword_lookup_ignores_case() {
        assert_eq!(TokenKind::keyword("program"), Some(TokenKind::Program));
        assert_eq!(TokenKind::keyword("Begin"), Some(TokenKind::Begin));
        assert_eq!(TokenKind::keyword("CHAR"), Some(TokenKind::CharType));
        assert_eq!(TokenKind::keyword("foobar"), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(TokenKind::While.is_keyword());
        assert!(!TokenKind::Ident.is_keyword());
        assert!(!TokenKind::Plus.is_keyword());
    }

    #[test]
    fn test_comparisons() {
        for kind in [TokenKind::Eq, TokenKind::Neq, TokenKind::Lt, TokenKind::Le, TokenKind::Gt, TokenKind::Ge] {
            assert!(kind.is_comparison());
        }
        assert!(!TokenKind::Assign.is_comparison());
    }

    #[test]
    fn test_token_display() {
        let span = Span::point(SourceLocation::new(4, 2, 40));
        let token = Token::new(TokenKind::Ident, span, "abc".to_string());
        assert_eq!(token.to_string(), "4-2:TK_IDENT(abc)");
        let token = Token::new(TokenKind::Begin, span, "begin".to_string());
        assert_eq!(token.to_string(), "4-2:KW_BEGIN");
    }
}
