//! Parser for KPL.
//!
//! A predictive recursive descent with one token of lookahead. Each
//! `parse_*` routine consumes exactly the tokens of its nonterminal and
//! leaves the lookahead on the first token after it. Optional and repeated
//! productions are chosen on the lookahead's kind; where a production may be
//! empty, the lookahead is checked against the FOLLOW set so that a stray
//! token is reported at the production that cannot accept it.
//!
//! Declarations and identifier uses are checked against the symbol table as
//! they are consumed. The first error stops the parse.
//!
//! ```text
//! program    ::= PROGRAM ident ';' block '.'
//! block      ::= {CONST constDecl+} {TYPE typeDecl+} {VAR varDecl+}
//!                subDecl* BEGIN statements END
//! constDecl  ::= ident '=' constant ';'
//! typeDecl   ::= ident '=' type ';'
//! varDecl    ::= ident ':' type ';'
//! subDecl    ::= FUNCTION ident params ':' basicType ';' block ';'
//!              | PROCEDURE ident params ';' block ';'
//! params     ::= [ '(' param { ';' param } ')' ]
//! param      ::= [VAR] ident ':' basicType
//! type       ::= INTEGER | CHAR | ident | ARRAY '[' number ']' OF type
//! constant   ::= ('+' | '-') constant2 | char | constant2
//! constant2  ::= number | ident
//! statements ::= statement { ';' statement }
//! statement  ::= ident indexes ':=' expression
//!              | CALL ident arguments
//!              | BEGIN statements END
//!              | IF condition THEN statement [ELSE statement]
//!              | WHILE condition DO statement
//!              | FOR ident ':=' expression TO expression DO statement
//!              | (empty)
//! condition  ::= expression relop expression
//! expression ::= ['+' | '-'] term { ('+' | '-') term }
//! term       ::= factor { ('*' | '/') factor }
//! factor     ::= number | char | ident ( arguments | indexes )
//! arguments  ::= [ '(' expression { ',' expression } ')' ]
//! indexes    ::= { '[' expression ']' }
//! ```

use crate::frontend::lexer::Lexer;
use crate::frontend::semantic::{
    check_declared_constant, check_declared_ident, check_declared_lvalue_ident,
    check_declared_procedure, check_declared_type, check_declared_variable, check_fresh_ident,
};
use crate::frontend::token::{Token, TokenKind};
use crate::frontend::Compilation;
use crate::symtab::{ConstantValue, ObjectId, ObjectKind, ParamMode, SymbolTable, Type};
use crate::utils::errors::{CompileError, CompileResult, ParseError, ParseErrorKind, SemanticError, SemanticErrorKind};
use crate::CompilerConfig;
use log::trace;

/// Tokens that may follow a statement.
const STATEMENT_FOLLOW: &[TokenKind] = &[TokenKind::Semicolon, TokenKind::End, TokenKind::Else];

/// Tokens that may follow an expression.
const EXPRESSION_FOLLOW: &[TokenKind] = &[
    TokenKind::RParen,
    TokenKind::Comma,
    TokenKind::RSel,
    TokenKind::Eq,
    TokenKind::Neq,
    TokenKind::Lt,
    TokenKind::Le,
    TokenKind::Gt,
    TokenKind::Ge,
    TokenKind::Semicolon,
    TokenKind::To,
    TokenKind::Do,
    TokenKind::Then,
    TokenKind::Else,
    TokenKind::End,
];

/// Tokens that may follow a term: those following an expression, plus the
/// additive operators.
fn is_term_follow(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Plus | TokenKind::Minus) || EXPRESSION_FOLLOW.contains(&kind)
}

/// Tokens that may follow an empty argument list: those following a term,
/// plus the multiplicative operators.
fn is_arguments_follow(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Times | TokenKind::Slash) || is_term_follow(kind)
}

/// A parser for KPL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    look_ahead: Token,
    symtab: SymbolTable,
    config: CompilerConfig,
    /// Consumed tokens, when tracing is on
    trace: Vec<Token>,
}

impl<'a> Parser<'a> {
    /// Create a parser over `lexer` with a fresh symbol table, reading the
    /// first token as lookahead.
    pub fn new(mut lexer: Lexer<'a>, config: CompilerConfig) -> CompileResult<Self> {
        let look_ahead = lexer.next_valid_token()?;
        Ok(Self {
            lexer,
            look_ahead,
            symtab: SymbolTable::new(),
            config,
            trace: Vec::new(),
        })
    }

    /// Bundle the results of a successful [`Parser::parse_program`].
    pub fn finish(mut self, program: ObjectId) -> Compilation {
        Compilation {
            program,
            tokens: std::mem::take(&mut self.trace),
            diagnostics: self.lexer.take_diagnostics(),
            symtab: self.symtab,
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn check(&self, kind: TokenKind) -> bool {
        self.look_ahead.kind == kind
    }

    /// Read a new lookahead, returning the previous one as the current token.
    fn scan(&mut self) -> CompileResult<Token> {
        let next = self.lexer.next_valid_token()?;
        Ok(std::mem::replace(&mut self.look_ahead, next))
    }

    /// Consume the lookahead if it has the given kind, returning it.
    fn eat(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if !self.check(kind) {
            return Err(self.missing(kind));
        }
        let token = self.scan()?;
        trace!("{}", token);
        if self.config.trace_tokens {
            self.trace.push(token.clone());
        }
        Ok(token)
    }

    fn missing(&self, expected: TokenKind) -> CompileError {
        ParseError {
            message: format!("Missing {}", expected),
            span: self.look_ahead.span,
            kind: ParseErrorKind::MissingToken,
            expected: Some(expected),
            found: self.look_ahead.kind,
        }
        .into()
    }

    /// A parse error at the lookahead.
    fn error(&self, kind: ParseErrorKind) -> CompileError {
        Self::error_at(kind, &self.look_ahead)
    }

    fn error_at(kind: ParseErrorKind, token: &Token) -> CompileError {
        ParseError {
            message: kind.describe().to_string(),
            span: token.span,
            kind,
            expected: None,
            found: token.kind,
        }
        .into()
    }

    fn semantic_error(kind: SemanticErrorKind, token: &Token) -> CompileError {
        SemanticError {
            message: kind.describe().to_string(),
            span: token.span,
            kind,
            name: token.lexeme.clone(),
        }
        .into()
    }

    /// Scope opened by `obj`; programs, functions and procedures have one.
    fn enter_scope_of(&mut self, obj: ObjectId) {
        if let Some(scope) = self.symtab.object(obj).scope() {
            self.symtab.enter_block(scope);
        }
    }

    // ------------------------------------------------------------------
    // Program and blocks
    // ------------------------------------------------------------------

    /// Parse a complete program, ending at end of file.
    pub fn parse_program(&mut self) -> CompileResult<ObjectId> {
        trace!("Parsing a program");
        self.eat(TokenKind::Program)?;
        let name = self.eat(TokenKind::Ident)?;
        let program = self.symtab.create_program_object(&name.lexeme);
        self.enter_scope_of(program);

        self.eat(TokenKind::Semicolon)?;
        self.parse_block()?;
        self.eat(TokenKind::Period)?;
        self.symtab.exit_block();

        if !self.check(TokenKind::Eof) {
            return Err(self.missing(TokenKind::Eof));
        }
        trace!("Program parsed");
        Ok(program)
    }

    fn parse_block(&mut self) -> CompileResult<()> {
        trace!("Parsing a block");
        self.parse_const_section()?;
        self.parse_type_section()?;
        self.parse_var_section()?;
        self.parse_sub_decls()?;

        self.eat(TokenKind::Begin)?;
        self.parse_statements()?;
        self.eat(TokenKind::End)?;
        trace!("Block parsed");
        Ok(())
    }

    fn parse_const_section(&mut self) -> CompileResult<()> {
        while self.check(TokenKind::Const) {
            self.eat(TokenKind::Const)?;
            self.parse_const_decl()?;
            while self.check(TokenKind::Ident) {
                self.parse_const_decl()?;
            }
        }
        Ok(())
    }

    fn parse_type_section(&mut self) -> CompileResult<()> {
        while self.check(TokenKind::Type) {
            self.eat(TokenKind::Type)?;
            self.parse_type_decl()?;
            while self.check(TokenKind::Ident) {
                self.parse_type_decl()?;
            }
        }
        Ok(())
    }

    fn parse_var_section(&mut self) -> CompileResult<()> {
        while self.check(TokenKind::Var) {
            self.eat(TokenKind::Var)?;
            self.parse_var_decl()?;
            while self.check(TokenKind::Ident) {
                self.parse_var_decl()?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_const_decl(&mut self) -> CompileResult<()> {
        let name = self.eat(TokenKind::Ident)?;
        check_fresh_ident(&self.symtab, &name)?;
        self.eat(TokenKind::Eq)?;
        let value = self.parse_constant()?;
        self.eat(TokenKind::Semicolon)?;

        let obj = self.symtab.create_constant_object(&name.lexeme, value);
        self.symtab.declare_object(obj);
        Ok(())
    }

    fn parse_type_decl(&mut self) -> CompileResult<()> {
        let name = self.eat(TokenKind::Ident)?;
        check_fresh_ident(&self.symtab, &name)?;
        self.eat(TokenKind::Eq)?;
        let actual_type = self.parse_type()?;
        self.eat(TokenKind::Semicolon)?;

        let obj = self.symtab.create_type_object(&name.lexeme, actual_type);
        self.symtab.declare_object(obj);
        Ok(())
    }

    fn parse_var_decl(&mut self) -> CompileResult<()> {
        let name = self.eat(TokenKind::Ident)?;
        check_fresh_ident(&self.symtab, &name)?;
        self.eat(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.eat(TokenKind::Semicolon)?;

        let obj = self.symtab.create_variable_object(&name.lexeme, ty);
        self.symtab.declare_object(obj);
        Ok(())
    }

    fn parse_sub_decls(&mut self) -> CompileResult<()> {
        trace!("Parsing subroutines");
        loop {
            match self.look_ahead.kind {
                TokenKind::Function => self.parse_func_decl()?,
                TokenKind::Procedure => self.parse_proc_decl()?,
                _ => break,
            }
        }
        trace!("Subroutines parsed");
        Ok(())
    }

    fn parse_func_decl(&mut self) -> CompileResult<()> {
        trace!("Parsing a function");
        self.eat(TokenKind::Function)?;
        let name = self.eat(TokenKind::Ident)?;
        check_fresh_ident(&self.symtab, &name)?;
        let func = self.symtab.create_function_object(&name.lexeme);
        self.symtab.declare_object(func);
        self.enter_scope_of(func);

        self.parse_params(func)?;
        self.eat(TokenKind::Colon)?;
        let return_type = self.parse_basic_type()?;
        self.symtab.set_return_type(func, return_type);
        self.eat(TokenKind::Semicolon)?;
        self.parse_block()?;
        self.eat(TokenKind::Semicolon)?;

        self.symtab.exit_block();
        trace!("Function parsed");
        Ok(())
    }

    fn parse_proc_decl(&mut self) -> CompileResult<()> {
        trace!("Parsing a procedure");
        self.eat(TokenKind::Procedure)?;
        let name = self.eat(TokenKind::Ident)?;
        check_fresh_ident(&self.symtab, &name)?;
        let proc = self.symtab.create_procedure_object(&name.lexeme);
        self.symtab.declare_object(proc);
        self.enter_scope_of(proc);

        self.parse_params(proc)?;
        self.eat(TokenKind::Semicolon)?;
        self.parse_block()?;
        self.eat(TokenKind::Semicolon)?;

        self.symtab.exit_block();
        trace!("Procedure parsed");
        Ok(())
    }

    fn parse_params(&mut self, owner: ObjectId) -> CompileResult<()> {
        if self.check(TokenKind::LParen) {
            self.eat(TokenKind::LParen)?;
            self.parse_param(owner)?;
            while self.check(TokenKind::Semicolon) {
                self.eat(TokenKind::Semicolon)?;
                self.parse_param(owner)?;
            }
            self.eat(TokenKind::RParen)?;
        }
        Ok(())
    }

    fn parse_param(&mut self, owner: ObjectId) -> CompileResult<()> {
        let mode = match self.look_ahead.kind {
            TokenKind::Ident => ParamMode::ByValue,
            TokenKind::Var => {
                self.eat(TokenKind::Var)?;
                ParamMode::ByReference
            }
            _ => return Err(self.error(ParseErrorKind::InvalidParam)),
        };
        let name = self.eat(TokenKind::Ident)?;
        check_fresh_ident(&self.symtab, &name)?;
        self.eat(TokenKind::Colon)?;
        let ty = self.parse_basic_type()?;

        let param = self.symtab.create_parameter_object(&name.lexeme, mode, ty, owner);
        self.symtab.declare_object(param);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Constants and types
    // ------------------------------------------------------------------

    fn parse_constant(&mut self) -> CompileResult<ConstantValue> {
        match self.look_ahead.kind {
            TokenKind::Plus => {
                self.eat(TokenKind::Plus)?;
                let (value, token) = self.parse_unsigned_constant()?;
                match value {
                    ConstantValue::Int(_) => Ok(value),
                    ConstantValue::Char(_) => Err(Self::semantic_error(SemanticErrorKind::InvalidConstant, &token)),
                }
            }
            TokenKind::Minus => {
                self.eat(TokenKind::Minus)?;
                let (value, token) = self.parse_unsigned_constant()?;
                value
                    .negate()
                    .ok_or_else(|| Self::semantic_error(SemanticErrorKind::InvalidConstant, &token))
            }
            TokenKind::Char => {
                let token = self.eat(TokenKind::Char)?;
                let byte = token
                    .lexeme
                    .bytes()
                    .next()
                    .ok_or_else(|| Self::error_at(ParseErrorKind::InvalidConstant, &token))?;
                Ok(ConstantValue::Char(byte))
            }
            _ => Ok(self.parse_unsigned_constant()?.0),
        }
    }

    /// A number or a named constant, with the token it came from.
    fn parse_unsigned_constant(&mut self) -> CompileResult<(ConstantValue, Token)> {
        match self.look_ahead.kind {
            TokenKind::Number => {
                let token = self.eat(TokenKind::Number)?;
                let value = token
                    .lexeme
                    .parse::<i32>()
                    .map_err(|_| Self::error_at(ParseErrorKind::InvalidConstant, &token))?;
                Ok((ConstantValue::Int(value), token))
            }
            TokenKind::Ident => {
                let token = self.eat(TokenKind::Ident)?;
                let obj = check_declared_constant(&self.symtab, &token)?;
                let value = self
                    .symtab
                    .object(obj)
                    .constant_value()
                    .ok_or_else(|| Self::semantic_error(SemanticErrorKind::InvalidConstant, &token))?;
                Ok((value, token))
            }
            _ => Err(self.error(ParseErrorKind::InvalidConstant)),
        }
    }

    fn parse_type(&mut self) -> CompileResult<Type> {
        match self.look_ahead.kind {
            TokenKind::Integer => {
                self.eat(TokenKind::Integer)?;
                Ok(Type::int())
            }
            TokenKind::CharType => {
                self.eat(TokenKind::CharType)?;
                Ok(Type::char())
            }
            TokenKind::Ident => {
                let token = self.eat(TokenKind::Ident)?;
                let obj = check_declared_type(&self.symtab, &token)?;
                self.symtab
                    .object(obj)
                    .ty()
                    .map(|ty| ty.duplicate())
                    .ok_or_else(|| Self::semantic_error(SemanticErrorKind::InvalidType, &token))
            }
            TokenKind::Array => {
                self.eat(TokenKind::Array)?;
                self.eat(TokenKind::LSel)?;
                let size_token = self.eat(TokenKind::Number)?;
                let size = size_token
                    .lexeme
                    .parse::<u32>()
                    .ok()
                    .filter(|&size| size > 0)
                    .ok_or_else(|| Self::semantic_error(SemanticErrorKind::InvalidArraySize, &size_token))?;
                self.eat(TokenKind::RSel)?;
                self.eat(TokenKind::Of)?;
                let element = self.parse_type()?;
                Ok(Type::array(size, element))
            }
            _ => Err(self.error(ParseErrorKind::InvalidType)),
        }
    }

    fn parse_basic_type(&mut self) -> CompileResult<Type> {
        match self.look_ahead.kind {
            TokenKind::Integer => {
                self.eat(TokenKind::Integer)?;
                Ok(Type::int())
            }
            TokenKind::CharType => {
                self.eat(TokenKind::CharType)?;
                Ok(Type::char())
            }
            _ => Err(self.error(ParseErrorKind::InvalidBasicType)),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statements(&mut self) -> CompileResult<()> {
        self.parse_statement()?;
        while !self.check(TokenKind::End) {
            self.eat(TokenKind::Semicolon)?;
            self.parse_statement()?;
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> CompileResult<()> {
        match self.look_ahead.kind {
            TokenKind::Ident => self.parse_assign_st(),
            TokenKind::Call => self.parse_call_st(),
            TokenKind::Begin => self.parse_group_st(),
            TokenKind::If => self.parse_if_st(),
            TokenKind::While => self.parse_while_st(),
            TokenKind::For => self.parse_for_st(),
            kind if STATEMENT_FOLLOW.contains(&kind) => Ok(()),
            _ => Err(self.error(ParseErrorKind::InvalidStatement)),
        }
    }

    fn parse_assign_st(&mut self) -> CompileResult<()> {
        trace!("Parsing an assign statement");
        self.parse_lvalue()?;
        self.eat(TokenKind::Assign)?;
        self.parse_expression()?;
        trace!("Assign statement parsed");
        Ok(())
    }

    fn parse_lvalue(&mut self) -> CompileResult<ObjectId> {
        let ident = self.eat(TokenKind::Ident)?;
        let obj = check_declared_lvalue_ident(&self.symtab, &ident, self.config.strict_lvalues)?;
        self.parse_indexes()?;
        Ok(obj)
    }

    fn parse_call_st(&mut self) -> CompileResult<()> {
        trace!("Parsing a call statement");
        self.eat(TokenKind::Call)?;
        let ident = self.eat(TokenKind::Ident)?;
        check_declared_procedure(&self.symtab, &ident)?;
        self.parse_arguments()?;
        trace!("Call statement parsed");
        Ok(())
    }

    fn parse_group_st(&mut self) -> CompileResult<()> {
        trace!("Parsing a group statement");
        self.eat(TokenKind::Begin)?;
        self.parse_statements()?;
        self.eat(TokenKind::End)?;
        trace!("Group statement parsed");
        Ok(())
    }

    fn parse_if_st(&mut self) -> CompileResult<()> {
        trace!("Parsing an if statement");
        self.eat(TokenKind::If)?;
        self.parse_condition()?;
        self.eat(TokenKind::Then)?;
        self.parse_statement()?;
        if self.check(TokenKind::Else) {
            self.eat(TokenKind::Else)?;
            self.parse_statement()?;
        }
        trace!("If statement parsed");
        Ok(())
    }

    fn parse_while_st(&mut self) -> CompileResult<()> {
        trace!("Parsing a while statement");
        self.eat(TokenKind::While)?;
        self.parse_condition()?;
        self.eat(TokenKind::Do)?;
        self.parse_statement()?;
        trace!("While statement parsed");
        Ok(())
    }

    fn parse_for_st(&mut self) -> CompileResult<()> {
        trace!("Parsing a for statement");
        self.eat(TokenKind::For)?;
        let ident = self.eat(TokenKind::Ident)?;
        check_declared_variable(&self.symtab, &ident)?;
        self.eat(TokenKind::Assign)?;
        self.parse_expression()?;
        self.eat(TokenKind::To)?;
        self.parse_expression()?;
        self.eat(TokenKind::Do)?;
        self.parse_statement()?;
        trace!("For statement parsed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_arguments(&mut self) -> CompileResult<()> {
        match self.look_ahead.kind {
            TokenKind::LParen => {
                self.eat(TokenKind::LParen)?;
                self.parse_expression()?;
                while self.check(TokenKind::Comma) {
                    self.eat(TokenKind::Comma)?;
                    self.parse_expression()?;
                }
                self.eat(TokenKind::RParen)?;
                Ok(())
            }
            kind if is_arguments_follow(kind) => Ok(()),
            _ => Err(self.error(ParseErrorKind::InvalidArguments)),
        }
    }

    fn parse_condition(&mut self) -> CompileResult<()> {
        self.parse_expression()?;
        let op = self.look_ahead.kind;
        if !op.is_comparison() {
            return Err(self.error(ParseErrorKind::InvalidComparator));
        }
        self.eat(op)?;
        self.parse_expression()
    }

    fn parse_expression(&mut self) -> CompileResult<()> {
        match self.look_ahead.kind {
            TokenKind::Plus => {
                self.eat(TokenKind::Plus)?;
            }
            TokenKind::Minus => {
                self.eat(TokenKind::Minus)?;
            }
            _ => {}
        }
        self.parse_term()?;
        loop {
            match self.look_ahead.kind {
                TokenKind::Plus | TokenKind::Minus => {
                    let op = self.look_ahead.kind;
                    self.eat(op)?;
                    self.parse_term()?;
                }
                kind if EXPRESSION_FOLLOW.contains(&kind) => return Ok(()),
                _ => return Err(self.error(ParseErrorKind::InvalidExpression)),
            }
        }
    }

    fn parse_term(&mut self) -> CompileResult<()> {
        self.parse_factor()?;
        loop {
            match self.look_ahead.kind {
                TokenKind::Times | TokenKind::Slash => {
                    let op = self.look_ahead.kind;
                    self.eat(op)?;
                    self.parse_factor()?;
                }
                kind if is_term_follow(kind) => return Ok(()),
                _ => return Err(self.error(ParseErrorKind::InvalidTerm)),
            }
        }
    }

    fn parse_factor(&mut self) -> CompileResult<()> {
        match self.look_ahead.kind {
            TokenKind::Number => {
                self.eat(TokenKind::Number)?;
                Ok(())
            }
            TokenKind::Char => {
                self.eat(TokenKind::Char)?;
                Ok(())
            }
            TokenKind::Ident => {
                let ident = self.eat(TokenKind::Ident)?;
                let obj = check_declared_ident(&self.symtab, &ident)?;
                match self.symtab.object(obj).kind() {
                    ObjectKind::Function => self.parse_arguments(),
                    ObjectKind::Constant | ObjectKind::Variable | ObjectKind::Parameter => self.parse_indexes(),
                    _ => Err(Self::semantic_error(SemanticErrorKind::InvalidIdent, &ident)),
                }
            }
            _ => Err(self.error(ParseErrorKind::InvalidFactor)),
        }
    }

    fn parse_indexes(&mut self) -> CompileResult<()> {
        while self.check(TokenKind::LSel) {
            self.eat(TokenKind::LSel)?;
            self.parse_expression()?;
            self.eat(TokenKind::RSel)?;
        }
        Ok(())
    }
}
