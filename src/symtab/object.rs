//! Declared objects and the scopes that hold them.

use crate::symtab::types::{ConstantValue, Type};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an [`Object`] in the symbol table arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

/// Index of a [`Scope`] in the symbol table arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) usize);

/// Semantic category of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// The program being compiled
    Program,
    /// Named constant
    Constant,
    /// Named type
    Type,
    /// Variable
    Variable,
    /// Function returning a basic type
    Function,
    /// Procedure
    Procedure,
    /// Formal parameter of a function or procedure
    Parameter,
}

impl ObjectKind {
    /// Lower-case name, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Program => "program",
            ObjectKind::Constant => "constant",
            ObjectKind::Type => "type",
            ObjectKind::Variable => "variable",
            ObjectKind::Function => "function",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Parameter => "parameter",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an argument is passed to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamMode {
    /// Copied in
    ByValue,
    /// Declared with `VAR`
    ByReference,
}

/// Kind-specific data of an object.
///
/// Parameter lists hold ids of objects owned by the subroutine's own scope;
/// they never own anything.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectAttributes {
    /// A program
    Program {
        /// Top-level scope
        scope: ScopeId,
    },
    /// A constant
    Constant {
        /// Value fixed at declaration
        value: ConstantValue,
    },
    /// A type alias
    Type {
        /// The type the name stands for
        actual_type: Type,
    },
    /// A variable
    Variable {
        /// Declared type
        ty: Type,
    },
    /// A function
    Function {
        /// Scope of the parameters and body
        scope: ScopeId,
        /// Formal parameters, in order
        params: Vec<ObjectId>,
        /// Unset until the signature has been parsed
        return_type: Option<Type>,
    },
    /// A procedure
    Procedure {
        /// Scope of the parameters and body
        scope: ScopeId,
        /// Formal parameters, in order
        params: Vec<ObjectId>,
    },
    /// A formal parameter
    Parameter {
        /// Basic type of the parameter
        ty: Type,
        /// Passing mode
        mode: ParamMode,
        /// Function or procedure declaring the parameter
        owner: ObjectId,
    },
}

/// A named declared entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Name as written at the declaration
    pub name: String,
    /// Kind-specific attributes
    pub attrs: ObjectAttributes,
}

impl Object {
    /// The kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match &self.attrs {
            ObjectAttributes::Program { .. } => ObjectKind::Program,
            ObjectAttributes::Constant { .. } => ObjectKind::Constant,
            ObjectAttributes::Type { .. } => ObjectKind::Type,
            ObjectAttributes::Variable { .. } => ObjectKind::Variable,
            ObjectAttributes::Function { .. } => ObjectKind::Function,
            ObjectAttributes::Procedure { .. } => ObjectKind::Procedure,
            ObjectAttributes::Parameter { .. } => ObjectKind::Parameter,
        }
    }

    /// True if `name` denotes this object. Names are case-insensitive.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Scope opened by a program, function or procedure.
    pub fn scope(&self) -> Option<ScopeId> {
        match &self.attrs {
            ObjectAttributes::Program { scope }
            | ObjectAttributes::Function { scope, .. }
            | ObjectAttributes::Procedure { scope, .. } => Some(*scope),
            _ => None,
        }
    }

    /// Formal parameters of a function or procedure, in declaration order.
    pub fn params(&self) -> &[ObjectId] {
        match &self.attrs {
            ObjectAttributes::Function { params, .. } | ObjectAttributes::Procedure { params, .. } => params,
            _ => &[],
        }
    }

    /// Type of a value-carrying object: the variable or parameter type, the
    /// aliased type, the constant's type or the function's return type.
    pub fn ty(&self) -> Option<Type> {
        match &self.attrs {
            ObjectAttributes::Variable { ty } | ObjectAttributes::Parameter { ty, .. } => Some(ty.clone()),
            ObjectAttributes::Type { actual_type } => Some(actual_type.clone()),
            ObjectAttributes::Constant { value } => Some(value.ty()),
            ObjectAttributes::Function { return_type, .. } => return_type.clone(),
            _ => None,
        }
    }

    /// Value of a constant.
    pub fn constant_value(&self) -> Option<ConstantValue> {
        match &self.attrs {
            ObjectAttributes::Constant { value } => Some(*value),
            _ => None,
        }
    }
}

/// An ordered list of declarations belonging to one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    /// Declared objects, in declaration order
    pub objects: Vec<ObjectId>,
    /// Program, function or procedure introducing this scope
    pub owner: ObjectId,
    /// Lexically enclosing scope; `None` at the program level
    pub outer: Option<ScopeId>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new(owner: ObjectId, outer: Option<ScopeId>) -> Self {
        Self {
            objects: Vec::new(),
            owner,
            outer,
        }
    }
}
