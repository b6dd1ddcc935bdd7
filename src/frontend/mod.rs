//! Frontend: Lexer, Parser, and semantic checks for KPL.
//!
//! This module turns KPL source text into a populated symbol table.
//!
//! ## Language Overview
//!
//! KPL is a small Pascal-like language with nested subroutines:
//!
//! ```text
//! program Example;
//! const N = 10;
//! type Vec = array[10] of integer;
//! var v: Vec; i: integer;
//!
//! function Square(x: integer): integer;
//! begin
//!     Square := x * x
//! end;
//!
//! begin
//!     for i := 0 to N - 1 do v[i] := Square(i);
//!     call WriteI(v[3])
//! end.
//! ```

pub mod token;
pub mod lexer;
pub mod parser;
pub mod semantic;

// Re-exports
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};

use crate::symtab::{ObjectId, SymbolTable};
use crate::utils::errors::{CompileResult, LexerError};
use crate::CompilerConfig;

/// Result of a successful parse.
#[derive(Debug)]
pub struct Compilation {
    /// Every declared object, including the built-ins
    pub symtab: SymbolTable,
    /// The program object
    pub program: ObjectId,
    /// Consumed tokens, in order; empty unless token tracing is enabled
    pub tokens: Vec<Token>,
    /// Invalid symbols the scanner skipped
    pub diagnostics: Vec<LexerError>,
}

/// Parse a complete program.
pub fn parse(source: &str, config: &CompilerConfig) -> CompileResult<Compilation> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer, *config)?;
    let program = parser.parse_program()?;
    Ok(parser.finish(program))
}
