//! Error types for the KPL frontend.
//!
//! Every error is fatal to a compilation run: the first one raised by the
//! scanner, the grammar descent or the semantic checker is propagated to the
//! caller unchanged, carrying the position of the token that caused it.

use crate::frontend::token::TokenKind;
use crate::utils::location::{SourceLocation, Span};
use std::fmt;
use thiserror::Error;

/// Top-level error type for a compilation run.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Unrecoverable error during scanning
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    /// Syntax error during the grammar descent
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Name resolution or declaration error
    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),

    /// The source file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Source position of the error, if it has one.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            CompileError::Lexer(e) => Some(e.span.start()),
            CompileError::Parse(e) => Some(e.span.start()),
            CompileError::Semantic(e) => Some(e.span.start()),
            CompileError::Io(_) => None,
        }
    }

    /// The syntax error, if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            CompileError::Parse(e) => Some(e),
            _ => None,
        }
    }

    /// The semantic error, if this is one.
    pub fn as_semantic(&self) -> Option<&SemanticError> {
        match self {
            CompileError::Semantic(e) => Some(e),
            _ => None,
        }
    }

    /// The lexical error, if this is one.
    pub fn as_lexer(&self) -> Option<&LexerError> {
        match self {
            CompileError::Lexer(e) => Some(e),
            _ => None,
        }
    }
}

/// Error during lexical analysis.
#[derive(Error, Debug, Clone)]
pub struct LexerError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of lexer error
    pub kind: LexerErrorKind,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// Kinds of lexer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// Character that starts no token
    InvalidSymbol,
    /// Identifier longer than the maximum identifier length
    IdentTooLong,
    /// Number literal that does not fit a 32-bit integer
    NumberTooLong,
    /// Malformed character literal
    InvalidCharConstant,
    /// Comment not closed before end of file
    EndOfComment,
}

/// Syntax error raised by the grammar descent.
#[derive(Error, Debug, Clone)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// Position of the lookahead token at the point of failure
    pub span: Span,
    /// The kind of parse error
    pub kind: ParseErrorKind,
    /// Token kind a missing-token error was waiting for
    pub expected: Option<TokenKind>,
    /// Token kind actually found
    pub found: TokenKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)?;
        if let Some(expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        write!(f, " (found: {})", self.found)
    }
}

/// Kinds of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A required token is absent
    MissingToken,
    /// No alternative of a type matches
    InvalidType,
    /// Expected INTEGER or CHAR
    InvalidBasicType,
    /// No alternative of a constant matches
    InvalidConstant,
    /// Malformed formal parameter
    InvalidParam,
    /// Token cannot start or follow a statement
    InvalidStatement,
    /// Token cannot start or follow an argument list
    InvalidArguments,
    /// Missing relational operator in a condition
    InvalidComparator,
    /// Token cannot follow an expression
    InvalidExpression,
    /// Token cannot follow a term
    InvalidTerm,
    /// Token cannot start a factor
    InvalidFactor,
}

impl ParseErrorKind {
    /// Default message for this kind.
    pub fn describe(&self) -> &'static str {
        match self {
            ParseErrorKind::MissingToken => "Missing token",
            ParseErrorKind::InvalidType => "Invalid type",
            ParseErrorKind::InvalidBasicType => "Invalid basic type",
            ParseErrorKind::InvalidConstant => "Invalid constant",
            ParseErrorKind::InvalidParam => "Invalid parameter",
            ParseErrorKind::InvalidStatement => "Invalid statement",
            ParseErrorKind::InvalidArguments => "Invalid arguments",
            ParseErrorKind::InvalidComparator => "Invalid comparator",
            ParseErrorKind::InvalidExpression => "Invalid expression",
            ParseErrorKind::InvalidTerm => "Invalid term",
            ParseErrorKind::InvalidFactor => "Invalid factor",
        }
    }
}

/// Name resolution or declaration error.
#[derive(Error, Debug, Clone)]
pub struct SemanticError {
    /// The error message
    pub message: String,
    /// Location of the offending identifier
    pub span: Span,
    /// The kind of semantic error
    pub kind: SemanticErrorKind,
    /// The identifier involved
    pub name: String,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' at {}", self.message, self.name, self.span)
    }
}

/// Kinds of semantic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    /// Name already declared in the current scope
    DuplicateIdent,
    /// Name not declared in any enclosing scope
    UndeclaredIdent,
    /// Constant name not declared
    UndeclaredConstant,
    /// Type name not declared
    UndeclaredType,
    /// Variable name not declared
    UndeclaredVariable,
    /// Function name not declared
    UndeclaredFunction,
    /// Procedure name not declared
    UndeclaredProcedure,
    /// Identifier of a kind not allowed at this position
    InvalidIdent,
    /// Declared, but not a constant
    InvalidConstant,
    /// Declared, but not a type
    InvalidType,
    /// Declared, but not a variable
    InvalidVariable,
    /// Declared, but not a function
    InvalidFunction,
    /// Declared, but not a procedure
    InvalidProcedure,
    /// Identifier cannot be assigned to
    InvalidLValue,
    /// Array size is not positive
    InvalidArraySize,
}

impl SemanticErrorKind {
    /// True for the "not declared anywhere" family.
    pub fn is_undeclared(&self) -> bool {
        use SemanticErrorKind::*;
        matches!(
            self,
            UndeclaredIdent | UndeclaredConstant | UndeclaredType |
            UndeclaredVariable | UndeclaredFunction | UndeclaredProcedure
        )
    }

    /// True for "declared, but of the wrong kind" errors.
    pub fn is_invalid_kind(&self) -> bool {
        use SemanticErrorKind::*;
        matches!(
            self,
            InvalidIdent | InvalidConstant | InvalidType | InvalidVariable |
            InvalidFunction | InvalidProcedure | InvalidLValue
        )
    }

    /// Default message for this kind.
    pub fn describe(&self) -> &'static str {
        use SemanticErrorKind::*;
        match self {
            DuplicateIdent => "Duplicate identifier",
            UndeclaredIdent => "Undeclared identifier",
            UndeclaredConstant => "Undeclared constant",
            UndeclaredType => "Undeclared type",
            UndeclaredVariable => "Undeclared variable",
            UndeclaredFunction => "Undeclared function",
            UndeclaredProcedure => "Undeclared procedure",
            InvalidIdent => "Invalid identifier",
            InvalidConstant => "Invalid constant",
            InvalidType => "Invalid type",
            InvalidVariable => "Invalid variable",
            InvalidFunction => "Invalid function",
            InvalidProcedure => "Invalid procedure",
            InvalidLValue => "Invalid assignment target",
            InvalidArraySize => "Invalid array size",
        }
    }
}

/// Result type using CompileError.
pub type CompileResult<T> = Result<T, CompileError>;
