//! Name resolution and identifier-kind checks.
//!
//! The parser calls these at the point each identifier is consumed, passing
//! the identifier token so that errors point at it. Lookup walks the scope
//! chain from the current scope outward and falls back to the built-ins;
//! the first match wins, so inner declarations shadow outer ones.

use crate::frontend::token::Token;
use crate::symtab::{ObjectId, ObjectKind, SymbolTable};
use crate::utils::errors::{SemanticError, SemanticErrorKind};
use log::warn;

/// Resolve `name` from the current scope outward, then among the built-ins.
pub fn lookup_object(table: &SymbolTable, name: &str) -> Option<ObjectId> {
    let mut scope = table.current_scope();
    while let Some(id) = scope {
        let current = table.scope(id);
        if let Some(obj) = table.find_object(&current.objects, name) {
            return Some(obj);
        }
        scope = current.outer;
    }
    table.find_object(table.globals(), name)
}

fn error(kind: SemanticErrorKind, ident: &Token) -> SemanticError {
    SemanticError {
        message: kind.describe().to_string(),
        span: ident.span,
        kind,
        name: ident.lexeme.clone(),
    }
}

/// Fail if the identifier is already declared in the current scope itself.
/// Outer scopes are not searched, so shadowing is allowed.
pub fn check_fresh_ident(table: &SymbolTable, ident: &Token) -> Result<(), SemanticError> {
    let Some(scope) = table.current_scope() else {
        return Ok(());
    };
    match table.find_object(&table.scope(scope).objects, &ident.lexeme) {
        Some(_) => Err(error(SemanticErrorKind::DuplicateIdent, ident)),
        None => Ok(()),
    }
}

/// Resolve an identifier of any kind.
pub fn check_declared_ident(table: &SymbolTable, ident: &Token) -> Result<ObjectId, SemanticError> {
    lookup_object(table, &ident.lexeme).ok_or_else(|| error(SemanticErrorKind::UndeclaredIdent, ident))
}

fn check_declared_kind(
    table: &SymbolTable,
    ident: &Token,
    expected: ObjectKind,
    undeclared: SemanticErrorKind,
    invalid: SemanticErrorKind,
) -> Result<ObjectId, SemanticError> {
    let obj = lookup_object(table, &ident.lexeme).ok_or_else(|| error(undeclared, ident))?;
    if table.object(obj).kind() != expected {
        return Err(error(invalid, ident));
    }
    Ok(obj)
}

/// Resolve an identifier that must name a constant.
pub fn check_declared_constant(table: &SymbolTable, ident: &Token) -> Result<ObjectId, SemanticError> {
    check_declared_kind(
        table,
        ident,
        ObjectKind::Constant,
        SemanticErrorKind::UndeclaredConstant,
        SemanticErrorKind::InvalidConstant,
    )
}

/// Resolve an identifier that must name a type.
pub fn check_declared_type(table: &SymbolTable, ident: &Token) -> Result<ObjectId, SemanticError> {
    check_declared_kind(
        table,
        ident,
        ObjectKind::Type,
        SemanticErrorKind::UndeclaredType,
        SemanticErrorKind::InvalidType,
    )
}

/// Resolve an identifier that must name a variable.
pub fn check_declared_variable(table: &SymbolTable, ident: &Token) -> Result<ObjectId, SemanticError> {
    check_declared_kind(
        table,
        ident,
        ObjectKind::Variable,
        SemanticErrorKind::UndeclaredVariable,
        SemanticErrorKind::InvalidVariable,
    )
}

/// Resolve an identifier that must name a function.
pub fn check_declared_function(table: &SymbolTable, ident: &Token) -> Result<ObjectId, SemanticError> {
    check_declared_kind(
        table,
        ident,
        ObjectKind::Function,
        SemanticErrorKind::UndeclaredFunction,
        SemanticErrorKind::InvalidFunction,
    )
}

/// Resolve an identifier that must name a procedure.
pub fn check_declared_procedure(table: &SymbolTable, ident: &Token) -> Result<ObjectId, SemanticError> {
    check_declared_kind(
        table,
        ident,
        ObjectKind::Procedure,
        SemanticErrorKind::UndeclaredProcedure,
        SemanticErrorKind::InvalidProcedure,
    )
}

/// Resolve an assignment target.
///
/// Variables and parameters are always accepted. A function name is only
/// accepted inside that function's own body, where assigning to it sets the
/// return value. Constants, types, procedures and the program are rejected
/// with [`SemanticErrorKind::InvalidLValue`] when `strict` is set, and
/// accepted with a warning otherwise.
pub fn check_declared_lvalue_ident(table: &SymbolTable, ident: &Token, strict: bool) -> Result<ObjectId, SemanticError> {
    let obj = check_declared_ident(table, ident)?;
    match table.object(obj).kind() {
        ObjectKind::Variable | ObjectKind::Parameter => {}
        ObjectKind::Function => {
            if table.current_owner() != Some(obj) {
                return Err(error(SemanticErrorKind::InvalidIdent, ident));
            }
        }
        kind if strict => {
            let mut err = error(SemanticErrorKind::InvalidLValue, ident);
            err.message = format!("Cannot assign to {}", kind);
            return Err(err);
        }
        kind => {
            warn!("{}: assignment to {} '{}' accepted", ident.span, kind, ident.lexeme);
        }
    }
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::token::TokenKind;
    use crate::symtab::{ConstantValue, ParamMode, Type};
    use crate::utils::location::{SourceLocation, Span};

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Ident, Span::point(SourceLocation::new(7, 3, 0)), name.to_string())
    }

    /// program P; var x; type T; const C; procedure Q(p); function F
    fn sample() -> (SymbolTable, ObjectId, ObjectId) {
        let mut table = SymbolTable::new();
        let program = table.create_program_object("P");
        table.enter_block(table.object(program).scope().unwrap());

        let x = table.create_variable_object("x", Type::int());
        table.declare_object(x);
        let t = table.create_type_object("T", Type::array(3, Type::int()));
        table.declare_object(t);
        let c = table.create_constant_object("C", ConstantValue::Int(1));
        table.declare_object(c);
        let f = table.create_function_object("F");
        table.set_return_type(f, Type::int());
        table.declare_object(f);

        let q = table.create_procedure_object("Q");
        table.declare_object(q);
        (table, q, f)
    }

    fn kind_of(result: Result<ObjectId, SemanticError>) -> SemanticErrorKind {
        result.unwrap_err().kind
    }

    #[test]
    fn test_lookup_walks_outward_and_shadows() {
        let (mut table, q, _) = sample();
        let outer_x = lookup_object(&table, "x").unwrap();

        table.enter_block(table.object(q).scope().unwrap());
        assert_eq!(lookup_object(&table, "x"), Some(outer_x));

        let inner_x = table.create_variable_object("x", Type::char());
        table.declare_object(inner_x);
        assert_eq!(lookup_object(&table, "X"), Some(inner_x));

        table.exit_block();
        assert_eq!(lookup_object(&table, "x"), Some(outer_x));
    }

    #[test]
    fn test_lookup_falls_back_to_builtins() {
        let (table, _, _) = sample();
        let writeln = lookup_object(&table, "WriteLn").unwrap();
        assert_eq!(table.object(writeln).kind(), ObjectKind::Procedure);
        assert!(lookup_object(&table, "nothing").is_none());
    }

    #[test]
    fn test_local_not_visible_after_block() {
        let (mut table, q, _) = sample();
        table.enter_block(table.object(q).scope().unwrap());
        let local = table.create_variable_object("tmp", Type::int());
        table.declare_object(local);
        assert!(lookup_object(&table, "tmp").is_some());
        table.exit_block();
        assert!(lookup_object(&table, "tmp").is_none());
    }

    #[test]
    fn test_fresh_ident() {
        let (mut table, q, _) = sample();
        let err = check_fresh_ident(&table, &ident("x")).unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::DuplicateIdent);
        assert_eq!(err.span.start_line, 7);
        assert!(check_fresh_ident(&table, &ident("y")).is_ok());

        table.enter_block(table.object(q).scope().unwrap());
        assert!(check_fresh_ident(&table, &ident("x")).is_ok());
    }

    #[test]
    fn test_kind_checks() {
        let (table, _, _) = sample();
        assert!(check_declared_type(&table, &ident("T")).is_ok());
        assert!(check_declared_variable(&table, &ident("x")).is_ok());
        assert!(check_declared_constant(&table, &ident("C")).is_ok());
        assert!(check_declared_function(&table, &ident("readi")).is_ok());
        assert!(check_declared_procedure(&table, &ident("Q")).is_ok());

        assert_eq!(kind_of(check_declared_variable(&table, &ident("T"))), SemanticErrorKind::InvalidVariable);
        assert_eq!(kind_of(check_declared_type(&table, &ident("x"))), SemanticErrorKind::InvalidType);
        assert_eq!(kind_of(check_declared_constant(&table, &ident("x"))), SemanticErrorKind::InvalidConstant);
        assert_eq!(kind_of(check_declared_function(&table, &ident("Q"))), SemanticErrorKind::InvalidFunction);
        assert_eq!(kind_of(check_declared_procedure(&table, &ident("F"))), SemanticErrorKind::InvalidProcedure);

        assert_eq!(kind_of(check_declared_ident(&table, &ident("z"))), SemanticErrorKind::UndeclaredIdent);
        assert_eq!(kind_of(check_declared_type(&table, &ident("z"))), SemanticErrorKind::UndeclaredType);
        assert_eq!(kind_of(check_declared_variable(&table, &ident("z"))), SemanticErrorKind::UndeclaredVariable);
        assert_eq!(kind_of(check_declared_constant(&table, &ident("z"))), SemanticErrorKind::UndeclaredConstant);
        assert_eq!(kind_of(check_declared_function(&table, &ident("z"))), SemanticErrorKind::UndeclaredFunction);
        assert_eq!(kind_of(check_declared_procedure(&table, &ident("z"))), SemanticErrorKind::UndeclaredProcedure);
    }

    #[test]
    fn test_lvalue_function_only_inside_itself() {
        let (mut table, q, f) = sample();
        assert_eq!(kind_of(check_declared_lvalue_ident(&table, &ident("F"), true)), SemanticErrorKind::InvalidIdent);

        table.enter_block(table.object(f).scope().unwrap());
        assert_eq!(check_declared_lvalue_ident(&table, &ident("F"), true).unwrap(), f);
        table.exit_block();

        table.enter_block(table.object(q).scope().unwrap());
        assert_eq!(kind_of(check_declared_lvalue_ident(&table, &ident("F"), true)), SemanticErrorKind::InvalidIdent);
    }

    #[test]
    fn test_lvalue_variables_and_parameters() {
        let (mut table, q, _) = sample();
        assert!(check_declared_lvalue_ident(&table, &ident("x"), true).is_ok());

        table.enter_block(table.object(q).scope().unwrap());
        let p = table.create_parameter_object("p", ParamMode::ByReference, Type::int(), q);
        table.declare_object(p);
        assert_eq!(check_declared_lvalue_ident(&table, &ident("p"), true).unwrap(), p);
    }

    #[test]
    fn test_lvalue_strictness() {
        let (table, _, _) = sample();
        for name in ["T", "C", "Q"] {
            let err = check_declared_lvalue_ident(&table, &ident(name), true).unwrap_err();
            assert_eq!(err.kind, SemanticErrorKind::InvalidLValue, "{}", name);
            assert!(err.kind.is_invalid_kind());
            assert!(check_declared_lvalue_ident(&table, &ident(name), false).is_ok(), "{}", name);
        }
        assert_eq!(kind_of(check_declared_lvalue_ident(&table, &ident("nope"), false)), SemanticErrorKind::UndeclaredIdent);
    }
}
