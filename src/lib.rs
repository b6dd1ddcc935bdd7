//! # kplc - Syntax and Semantic Analyzer for KPL
//!
//! A front end for KPL, a small Pascal-like teaching language:
//! - Scanning into tokens with source positions
//! - Recursive-descent parsing with one token of lookahead
//! - A scope-chained symbol table of programs, constants, types,
//!   variables, functions, procedures and parameters
//! - Declaration and identifier-kind checks during parsing
//!
//! ## Architecture
//!
//! ```text
//! Source → Lexer → Parser ⇄ Semantic checks → SymbolTable
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use kplc::prelude::*;
//!
//! let source = r#"
//!     program Demo;
//!     var x: integer;
//!     begin
//!         x := ReadI;
//!         call WriteI(x * 2)
//!     end.
//! "#;
//!
//! let compilation = kplc::compile(source, &CompilerConfig::default())?;
//! println!("{}", kplc::symtab::print::print_program(&compilation.symtab));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod frontend;
pub mod symtab;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::frontend::{Compilation, Lexer, Parser, Token, TokenKind};
    pub use crate::symtab::{ConstantValue, Object, ObjectAttributes, ObjectId, ObjectKind, ParamMode, SymbolTable, Type};
    pub use crate::utils::errors::*;
    pub use crate::CompilerConfig;
}

pub use frontend::Compilation;

use std::path::Path;
use utils::errors::CompileResult;

/// Configuration for the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Reject assignments to constants, types, procedures and the program.
    /// When off, such assignments are accepted with a warning.
    pub strict_lvalues: bool,
    /// Record every consumed token in [`Compilation::tokens`]
    pub trace_tokens: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strict_lvalues: true,
            trace_tokens: false,
        }
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse and check a KPL program.
pub fn compile(source: &str, config: &CompilerConfig) -> CompileResult<Compilation> {
    frontend::parse(source, config)
}

/// Read a KPL program from `path`, then parse and check it.
pub fn compile_file(path: impl AsRef<Path>, config: &CompilerConfig) -> CompileResult<Compilation> {
    let source = std::fs::read_to_string(path)?;
    compile(&source, config)
}
