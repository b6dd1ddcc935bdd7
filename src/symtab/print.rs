//! Human-readable dump of a symbol table.
//!
//! ```text
//! Program P
//!   Const N = 10
//!   Type T = Arr(10,Int)
//!   Var A : Arr(10,Int)
//!   Function F : Int
//!     Param X : Int
//!   Procedure Q
//!     Param VAR C : Char
//! ```

use crate::symtab::object::{ObjectAttributes, ObjectId, ParamMode};
use crate::symtab::SymbolTable;
use std::fmt::Write;

/// Pretty printer for symbol tables.
pub struct SymbolPrinter<'t> {
    table: &'t SymbolTable,
    /// Indentation level
    indent: usize,
    /// Output buffer
    buffer: String,
}

impl<'t> SymbolPrinter<'t> {
    /// Create a new printer.
    pub fn new(table: &'t SymbolTable) -> Self {
        Self {
            table,
            indent: 0,
            buffer: String::new(),
        }
    }

    /// Take the output.
    pub fn take_output(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buffer.push_str("  ");
        }
    }

    /// Print one object, followed by its scope when it opens one.
    pub fn print_object(&mut self, id: ObjectId) {
        let obj = self.table.object(id);
        self.write_indent();
        match &obj.attrs {
            ObjectAttributes::Program { .. } => {
                writeln!(self.buffer, "Program {}", obj.name).unwrap();
            }
            ObjectAttributes::Constant { value } => {
                writeln!(self.buffer, "Const {} = {}", obj.name, value).unwrap();
            }
            ObjectAttributes::Type { actual_type } => {
                writeln!(self.buffer, "Type {} = {}", obj.name, actual_type).unwrap();
            }
            ObjectAttributes::Variable { ty } => {
                writeln!(self.buffer, "Var {} : {}", obj.name, ty).unwrap();
            }
            ObjectAttributes::Function { return_type: Some(ty), .. } => {
                writeln!(self.buffer, "Function {} : {}", obj.name, ty).unwrap();
            }
            ObjectAttributes::Function { return_type: None, .. } => {
                writeln!(self.buffer, "Function {}", obj.name).unwrap();
            }
            ObjectAttributes::Procedure { .. } => {
                writeln!(self.buffer, "Procedure {}", obj.name).unwrap();
            }
            ObjectAttributes::Parameter { ty, mode, .. } => {
                let prefix = match mode {
                    ParamMode::ByValue => "",
                    ParamMode::ByReference => "VAR ",
                };
                writeln!(self.buffer, "Param {}{} : {}", prefix, obj.name, ty).unwrap();
            }
        }

        if let Some(scope) = obj.scope() {
            self.indent += 1;
            for &child in &self.table.scope(scope).objects {
                self.print_object(child);
            }
            self.indent -= 1;
        }
    }

    /// Print the program tree.
    pub fn print_program(&mut self) {
        if let Some(program) = self.table.program() {
            self.print_object(program);
        }
    }

    /// Print the built-in routines.
    pub fn print_globals(&mut self) {
        for &id in self.table.globals() {
            self.print_object(id);
        }
    }
}

/// Render the program tree of `table`.
pub fn print_program(table: &SymbolTable) -> String {
    let mut printer = SymbolPrinter::new(table);
    printer.print_program();
    printer.take_output()
}
