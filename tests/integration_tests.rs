//! Integration tests for the KPL analyzer.

use kplc::prelude::*;
use kplc::frontend::semantic::lookup_object;
use kplc::symtab::print::print_program;
use kplc::{compile, compile_file};

fn check(source: &str) -> Compilation {
    compile(source, &CompilerConfig::default()).expect("Failed to compile")
}

fn failure(source: &str) -> CompileError {
    match compile(source, &CompilerConfig::default()) {
        Ok(_) => panic!("expected failure for {:?}", source),
        Err(e) => e,
    }
}

/// Find `name` among the declarations of `owner`'s scope.
fn declared_in(compilation: &Compilation, owner: ObjectId, name: &str) -> Option<ObjectId> {
    let table = &compilation.symtab;
    let scope = table.object(owner).scope()?;
    table.find_object(&table.scope(scope).objects, name)
}

#[test]
fn test_scenario_simple_assignment() {
    let c = check("program P; var x: integer; begin x := 1 end.");
    let x = declared_in(&c, c.program, "x").expect("x declared");
    let obj = c.symtab.object(x);
    assert_eq!(obj.kind(), ObjectKind::Variable);
    assert_eq!(obj.ty(), Some(Type::int()));
    assert!(c.symtab.current_scope().is_none());
}

#[test]
fn test_scenario_undeclared_identifier() {
    let err = failure("program P; begin x := 1 end.");
    let semantic = err.as_semantic().expect("semantic error");
    assert_eq!(semantic.kind, SemanticErrorKind::UndeclaredIdent);
    assert_eq!(semantic.name, "x");
    let location = err.location().unwrap();
    assert_eq!((location.line, location.column), (1, 18));
}

#[test]
fn test_scenario_duplicate_identifier() {
    let err = failure("program P; var x: integer; var x: integer; begin end.");
    let semantic = err.as_semantic().expect("semantic error");
    assert_eq!(semantic.kind, SemanticErrorKind::DuplicateIdent);
    assert_eq!(semantic.span.start_column, 32);
}

#[test]
fn test_scenario_array_alias() {
    let c = check("program P; type T = array[3] of integer; var a: T; begin a[0] := 1 end.");
    let a = declared_in(&c, c.program, "a").unwrap();
    let obj = c.symtab.object(a);
    assert_eq!(obj.kind(), ObjectKind::Variable);
    assert_eq!(obj.ty(), Some(Type::array(3, Type::int())));
}

#[test]
fn test_missing_period_position() {
    let err = failure("program P;\nbegin\nend");
    let parse = err.as_parse().expect("parse error");
    assert_eq!(parse.kind, ParseErrorKind::MissingToken);
    assert_eq!(parse.expected, Some(TokenKind::Period));
    assert_eq!(parse.found, TokenKind::Eof);
    assert_eq!(parse.span.start_line, 3);
    assert_eq!(parse.span.start_column, 4);
}

#[test]
fn test_var_entry_missing_type() {
    let err = failure("program P;\nvar\n  x : ;\nbegin end.");
    let parse = err.as_parse().expect("parse error");
    assert_eq!(parse.kind, ParseErrorKind::InvalidType);
    assert_eq!(parse.found, TokenKind::Semicolon);
    assert_eq!((parse.span.start_line, parse.span.start_column), (3, 7));
}

#[test]
fn test_local_not_visible_after_procedure() {
    let err = failure(
        "program P;
         procedure Q;
         var t: integer;
         begin t := 1 end;
         begin t := 2 end.",
    );
    let semantic = err.as_semantic().unwrap();
    assert_eq!(semantic.kind, SemanticErrorKind::UndeclaredIdent);
    assert_eq!(semantic.span.start_line, 5);
}

#[test]
fn test_outer_visible_in_nested_procedure() {
    check(
        "program P;
         var g: integer;
         procedure Q;
           procedure R;
           begin g := g + 1 end;
         begin call R end;
         begin call Q end.",
    );
}

#[test]
fn test_shadowing_in_nested_scope() {
    let c = check(
        "program P;
         var x: integer;
         procedure Q;
         var x: char;
         begin x := 'a' end;
         begin x := 1 end.",
    );
    let outer = declared_in(&c, c.program, "x").unwrap();
    let q = declared_in(&c, c.program, "Q").unwrap();
    let inner = declared_in(&c, q, "x").unwrap();
    assert_ne!(outer, inner);
    assert_eq!(c.symtab.object(outer).ty(), Some(Type::int()));
    assert_eq!(c.symtab.object(inner).ty(), Some(Type::char()));
}

#[test]
fn test_duplicate_across_kinds() {
    let err = failure("program P; const N = 1; var n: integer; begin end.");
    assert_eq!(err.as_semantic().unwrap().kind, SemanticErrorKind::DuplicateIdent);

    let err = failure("program P; procedure Q(a: integer; a: char); begin end; begin end.");
    assert_eq!(err.as_semantic().unwrap().kind, SemanticErrorKind::DuplicateIdent);
}

#[test]
fn test_type_used_as_variable() {
    let err = failure("program P; type T = integer; begin T := 1 end.");
    let semantic = err.as_semantic().unwrap();
    assert_eq!(semantic.kind, SemanticErrorKind::InvalidLValue);
    assert!(semantic.kind.is_invalid_kind());

    let err = failure("program P; type T = integer; var x: integer; begin for T := 1 to 2 do x := 1 end.");
    assert_eq!(err.as_semantic().unwrap().kind, SemanticErrorKind::InvalidVariable);

    check("program P; type T = integer; var x: T; begin x := 1 end.");
}

#[test]
fn test_variable_used_as_type() {
    let err = failure("program P; var x: integer; y: x; begin end.");
    assert_eq!(err.as_semantic().unwrap().kind, SemanticErrorKind::InvalidType);

    let err = failure("program P; var y: Missing; begin end.");
    assert_eq!(err.as_semantic().unwrap().kind, SemanticErrorKind::UndeclaredType);
}

#[test]
fn test_permissive_lvalues() {
    let source = "program P; const C = 1; begin C := 2 end.";
    let err = failure(source);
    assert_eq!(err.as_semantic().unwrap().kind, SemanticErrorKind::InvalidLValue);

    let config = CompilerConfig {
        strict_lvalues: false,
        ..CompilerConfig::default()
    };
    assert!(compile(source, &config).is_ok());
}

#[test]
fn test_type_structural_equality() {
    let a5 = Type::array(5, Type::int());
    assert!(a5.compare(&Type::array(5, Type::int())));
    assert!(!a5.compare(&Type::array(6, Type::int())));
    assert!(!a5.compare(&Type::int()));

    let nested = Type::array(5, Type::array(3, Type::char()));
    assert!(nested.compare(&nested.duplicate()));
    assert!(!nested.compare(&Type::array(5, Type::array(3, Type::int()))));
}

#[test]
fn test_declared_types_are_duplicates() {
    let c = check(
        "program P;
         type Row = array[3] of char;
              Grid = array[5] of Row;
         var g: Grid;
         begin g[0][1] := 'x' end.",
    );
    let grid = declared_in(&c, c.program, "Grid").unwrap();
    let g = declared_in(&c, c.program, "g").unwrap();
    let expected = Type::array(5, Type::array(3, Type::char()));
    assert_eq!(c.symtab.object(grid).ty(), Some(expected.clone()));
    assert!(c.symtab.object(g).ty().unwrap().compare(&expected));
}

#[test]
fn test_nested_subroutines() {
    let source = r#"
        program Nest;
        var total: integer;

        function Outer(n: integer): integer;
        var acc: integer;

            procedure Bump(var v: integer; step: integer);
            begin
                v := v + step
            end;

        begin
            acc := 0;
            call Bump(acc, n);
            Outer := acc
        end;

        begin
            total := Outer(3);
            call WriteI(total);
            call WriteLn
        end.
    "#;
    let c = check(source);
    let table = &c.symtab;

    let outer = declared_in(&c, c.program, "Outer").unwrap();
    assert_eq!(table.object(outer).kind(), ObjectKind::Function);
    assert_eq!(table.object(outer).ty(), Some(Type::int()));
    assert_eq!(table.object(outer).params().len(), 1);

    let bump = declared_in(&c, outer, "Bump").unwrap();
    let params = table.object(bump).params();
    assert_eq!(params.len(), 2);
    assert_eq!(table.object(params[0]).name, "v");
    assert!(matches!(
        table.object(params[0]).attrs,
        ObjectAttributes::Parameter { mode: ParamMode::ByReference, .. }
    ));
    assert!(matches!(
        table.object(params[1]).attrs,
        ObjectAttributes::Parameter { mode: ParamMode::ByValue, owner, .. } if owner == bump
    ));

    let outer_scope = table.object(outer).scope().unwrap();
    let bump_scope = table.object(bump).scope().unwrap();
    assert_eq!(table.scope(bump_scope).outer, Some(outer_scope));
    assert_eq!(table.scope(bump_scope).owner, bump);
    assert!(table.current_scope().is_none());
    assert!(lookup_object(table, "acc").is_none());
}

#[test]
fn test_function_return_assignment() {
    check("program P; function F(x: integer): integer; begin F := x * 2 end; begin end.");

    let err = failure(
        "program P;
         function F: integer; begin F := 1 end;
         procedure Q; begin F := 2 end;
         begin end.",
    );
    let semantic = err.as_semantic().unwrap();
    assert_eq!(semantic.kind, SemanticErrorKind::InvalidIdent);
    assert_eq!(semantic.span.start_line, 3);
}

#[test]
fn test_control_statements() {
    check(
        r#"
        program Control;
        const Limit = 10; Star = '*';
        var i: integer; j: integer; c: char;
        begin
            j := 0;
            for i := 1 to Limit do
                if i / 2 * 2 = i then j := j + i
                else begin
                    c := Star;
                    call WriteC(c)
                end;
            while j > 0 do j := j - 1;
            if j <> Limit then call WriteLn;
            if j != -Limit then ;
            c := ReadC;
            j := -ReadI + Limit
        end.
    "#,
    );
}

#[test]
fn test_invalid_statement_and_comparator() {
    let err = failure("program P; var x: integer; begin do end.");
    assert_eq!(err.as_parse().unwrap().kind, ParseErrorKind::InvalidStatement);

    let err = failure("program P; var x: integer; begin while x := 1 do x := 2 end.");
    assert_eq!(err.as_parse().unwrap().kind, ParseErrorKind::InvalidComparator);
}

#[test]
fn test_builtins_available() {
    let c = check(
        "program P; var c: char; i: integer;
         begin c := ReadC; i := READI; call writei(i); call WriteC(c); call WRITELN end.",
    );
    let readc = lookup_object(&c.symtab, "readc").unwrap();
    assert_eq!(c.symtab.object(readc).ty(), Some(Type::char()));

    let writei = lookup_object(&c.symtab, "WriteI").unwrap();
    let params = c.symtab.object(writei).params();
    assert_eq!(params.len(), 1);
    assert_eq!(c.symtab.object(params[0]).ty(), Some(Type::int()));
}

#[test]
fn test_builtin_can_be_shadowed() {
    check("program P; var WriteLn: integer; begin WriteLn := 1 end.");
}

#[test]
fn test_call_requires_procedure() {
    let err = failure("program P; begin call ReadI end.");
    assert_eq!(err.as_semantic().unwrap().kind, SemanticErrorKind::InvalidProcedure);
}

#[test]
fn test_token_trace() {
    let config = CompilerConfig {
        trace_tokens: true,
        ..CompilerConfig::default()
    };
    let c = compile("program P; var x: integer; begin x := 1 end.", &config).unwrap();
    let rendered: Vec<String> = c.tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(rendered.first().map(String::as_str), Some("1-1:KW_PROGRAM"));
    assert_eq!(rendered[1], "1-9:TK_IDENT(P)");
    assert_eq!(rendered.last().map(String::as_str), Some("1-44:SB_PERIOD"));
    assert_eq!(c.tokens.len(), 14);

    let quiet = check("program P; begin end.");
    assert!(quiet.tokens.is_empty());
}

#[test]
fn test_invalid_symbols_are_skipped() {
    let c = check("program P; var x: integer; begin x := 1 ? end.");
    assert_eq!(c.diagnostics.len(), 1);
    assert_eq!(c.diagnostics[0].kind, LexerErrorKind::InvalidSymbol);
}

#[test]
fn test_non_ascii_identifier_rejected() {
    let err = failure("program P; var \u{e9}: integer; begin \u{e9} := 1 end.");
    let parse = err.as_parse().expect("parse error");
    assert_eq!(parse.kind, ParseErrorKind::MissingToken);
    assert_eq!(parse.expected, Some(TokenKind::Ident));
    assert_eq!(parse.found, TokenKind::Colon);
}

#[test]
fn test_fatal_lexer_error() {
    let err = failure("program P; var averyveryverylongname: integer; begin end.");
    assert_eq!(err.as_lexer().unwrap().kind, LexerErrorKind::IdentTooLong);

    let err = failure("program P; begin (* never closed end.");
    assert_eq!(err.as_lexer().unwrap().kind, LexerErrorKind::EndOfComment);
}

#[test]
fn test_symbol_dump() {
    let c = check(
        "program Demo;
         const N = 10;
         var A: array[10] of integer;
         function F(var X: char): integer; begin F := N end;
         begin end.",
    );
    let expected = "Program Demo\n  Const N = 10\n  Var A : Arr(10,Int)\n  Function F : Int\n    Param VAR X : Char\n";
    assert_eq!(print_program(&c.symtab), expected);
}

#[test]
fn test_clean_releases_everything() {
    let mut c = check(
        "program P; var x: integer;
         procedure Q(a: integer); var b: char; begin b := 'z' end;
         begin x := 1 end.",
    );
    let total = c.symtab.object_count();
    assert_eq!(c.symtab.clean(), total);
    assert_eq!(c.symtab.object_count(), 0);
    assert!(c.symtab.program().is_none());
}

#[test]
fn test_compile_file() {
    let path = std::env::temp_dir().join("kplc_integration_compile_file.kpl");
    std::fs::write(&path, "program FromDisk; begin call WriteLn end.").unwrap();
    let c = compile_file(&path, &CompilerConfig::default()).unwrap();
    assert_eq!(c.symtab.object(c.program).name, "FromDisk");
    let _ = std::fs::remove_file(&path);
}
