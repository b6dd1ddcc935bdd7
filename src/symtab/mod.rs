//! Symbol table: declared objects, nested scopes and the built-in routines.
//!
//! Objects and scopes live in two arenas owned by [`SymbolTable`] and refer
//! to each other through [`ObjectId`] / [`ScopeId`]. Ownership follows
//! declaration: a scope owns the objects declared in it, a program,
//! function or procedure owns the scope it opens, and the global list owns
//! the built-ins. `Scope::outer`, `Scope::owner` and parameter lists are
//! plain lookups.
//!
//! ## Built-ins
//!
//! | Name    | Kind      | Signature        |
//! |---------|-----------|------------------|
//! | READC   | function  | `() -> CHAR`     |
//! | READI   | function  | `() -> INTEGER`  |
//! | WRITEI  | procedure | `(i: INTEGER)`   |
//! | WRITEC  | procedure | `(ch: CHAR)`     |
//! | WRITELN | procedure | `()`             |

pub mod object;
pub mod print;
pub mod types;

pub use object::{Object, ObjectAttributes, ObjectId, ObjectKind, ParamMode, Scope, ScopeId};
pub use print::SymbolPrinter;
pub use types::{ConstantValue, Type};

use log::debug;

/// Symbol table for a single compilation run.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    objects: Vec<Object>,
    scopes: Vec<Scope>,
    program: Option<ObjectId>,
    globals: Vec<ObjectId>,
    current_scope: Option<ScopeId>,
}

impl SymbolTable {
    /// Create a table holding only the built-in routines.
    pub fn new() -> Self {
        let mut table = Self {
            objects: Vec::new(),
            scopes: Vec::new(),
            program: None,
            globals: Vec::new(),
            current_scope: None,
        };
        table.declare_builtins();
        table
    }

    fn declare_builtins(&mut self) {
        let readc = self.create_function_object("READC");
        self.set_return_type(readc, Type::char());
        self.declare_object(readc);

        let readi = self.create_function_object("READI");
        self.set_return_type(readi, Type::int());
        self.declare_object(readi);

        for (name, param, ty) in [("WRITEI", "i", Type::int()), ("WRITEC", "ch", Type::char())] {
            let proc = self.create_procedure_object(name);
            self.declare_object(proc);
            if let Some(scope) = self.object(proc).scope() {
                self.enter_block(scope);
                let param = self.create_parameter_object(param, ParamMode::ByValue, ty, proc);
                self.declare_object(param);
                self.exit_block();
            }
        }

        let writeln = self.create_procedure_object("WRITELN");
        self.declare_object(writeln);
    }

    fn alloc_object(&mut self, name: &str, attrs: ObjectAttributes) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(Object {
            name: name.to_string(),
            attrs,
        });
        id
    }

    /// Build an empty scope under `outer`, attributed to `owner`.
    pub fn create_scope(&mut self, owner: ObjectId, outer: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(owner, outer));
        id
    }

    /// Allocate an object together with the scope it owns.
    fn alloc_scoped_object(&mut self, name: &str, outer: Option<ScopeId>, attrs: impl FnOnce(ScopeId) -> ObjectAttributes) -> ObjectId {
        let id = ObjectId(self.objects.len());
        let scope = self.create_scope(id, outer);
        self.alloc_object(name, attrs(scope))
    }

    /// Create the program object and its top-level scope.
    pub fn create_program_object(&mut self, name: &str) -> ObjectId {
        debug_assert!(self.program.is_none(), "program object created twice");
        let id = self.alloc_scoped_object(name, None, |scope| ObjectAttributes::Program { scope });
        self.program = Some(id);
        id
    }

    /// Create a constant holding `value`.
    pub fn create_constant_object(&mut self, name: &str, value: ConstantValue) -> ObjectId {
        self.alloc_object(name, ObjectAttributes::Constant { value })
    }

    /// Create a type name standing for `actual_type`.
    pub fn create_type_object(&mut self, name: &str, actual_type: Type) -> ObjectId {
        self.alloc_object(name, ObjectAttributes::Type { actual_type })
    }

    /// Create a variable of type `ty`.
    pub fn create_variable_object(&mut self, name: &str, ty: Type) -> ObjectId {
        self.alloc_object(name, ObjectAttributes::Variable { ty })
    }

    /// Create a function whose scope is nested in the current scope.
    /// The return type is set later with [`SymbolTable::set_return_type`].
    pub fn create_function_object(&mut self, name: &str) -> ObjectId {
        let outer = self.current_scope;
        self.alloc_scoped_object(name, outer, |scope| ObjectAttributes::Function {
            scope,
            params: Vec::new(),
            return_type: None,
        })
    }

    /// Create a procedure whose scope is nested in the current scope.
    pub fn create_procedure_object(&mut self, name: &str) -> ObjectId {
        let outer = self.current_scope;
        self.alloc_scoped_object(name, outer, |scope| ObjectAttributes::Procedure {
            scope,
            params: Vec::new(),
        })
    }

    /// Create a formal parameter of `owner`.
    pub fn create_parameter_object(&mut self, name: &str, mode: ParamMode, ty: Type, owner: ObjectId) -> ObjectId {
        self.alloc_object(name, ObjectAttributes::Parameter { ty, mode, owner })
    }

    /// Set the return type of a function. Ignored for other kinds.
    pub fn set_return_type(&mut self, function: ObjectId, ty: Type) {
        if let ObjectAttributes::Function { return_type, .. } = &mut self.objects[function.0].attrs {
            *return_type = Some(ty);
        }
    }

    /// Append `obj` to the current scope, or to the global list when no
    /// block is open. A parameter is also appended to the parameter list of
    /// the routine owning the current scope.
    pub fn declare_object(&mut self, obj: ObjectId) {
        let Some(scope) = self.current_scope else {
            debug!("declare global {} {}", self.objects[obj.0].kind(), self.objects[obj.0].name);
            self.globals.push(obj);
            return;
        };

        if self.objects[obj.0].kind() == ObjectKind::Parameter {
            let owner = self.scopes[scope.0].owner;
            match &mut self.objects[owner.0].attrs {
                ObjectAttributes::Function { params, .. } | ObjectAttributes::Procedure { params, .. } => {
                    params.push(obj);
                }
                _ => {}
            }
        }

        debug!(
            "declare {} {} in scope {}",
            self.objects[obj.0].kind(),
            self.objects[obj.0].name,
            scope.0
        );
        self.scopes[scope.0].objects.push(obj);
    }

    /// Make `scope` the current scope.
    pub fn enter_block(&mut self, scope: ScopeId) {
        debug!("enter scope {}", scope.0);
        self.current_scope = Some(scope);
    }

    /// Return to the outer scope of the current one.
    pub fn exit_block(&mut self) {
        if let Some(scope) = self.current_scope {
            debug!("exit scope {}", scope.0);
            self.current_scope = self.scopes[scope.0].outer;
        }
    }

    /// First object of `list` named `name`.
    pub fn find_object(&self, list: &[ObjectId], name: &str) -> Option<ObjectId> {
        list.iter().copied().find(|id| self.objects[id.0].has_name(name))
    }

    /// The object behind `id`.
    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    /// The scope behind `id`.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// The program object, once the header has been parsed.
    pub fn program(&self) -> Option<ObjectId> {
        self.program
    }

    /// Built-in routines.
    pub fn globals(&self) -> &[ObjectId] {
        &self.globals
    }

    /// Innermost open scope; `None` outside every block.
    pub fn current_scope(&self) -> Option<ScopeId> {
        self.current_scope
    }

    /// Owner of the current scope.
    pub fn current_owner(&self) -> Option<ObjectId> {
        self.current_scope.map(|scope| self.scopes[scope.0].owner)
    }

    /// Number of allocated objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Every object reachable through ownership from the program and the
    /// global list, depth first in declaration order. Parameter lists are
    /// not followed.
    pub fn owned_objects(&self) -> Vec<ObjectId> {
        let mut owned = Vec::new();
        if let Some(program) = self.program {
            self.collect_owned(program, &mut owned);
        }
        for &global in &self.globals {
            self.collect_owned(global, &mut owned);
        }
        owned
    }

    fn collect_owned(&self, id: ObjectId, owned: &mut Vec<ObjectId>) {
        owned.push(id);
        if let Some(scope) = self.objects[id.0].scope() {
            for &child in &self.scopes[scope.0].objects {
                self.collect_owned(child, owned);
            }
        }
    }

    /// Release every object and scope, returning how many objects were
    /// reachable through ownership. The table is empty afterwards.
    pub fn clean(&mut self) -> usize {
        let released = self.owned_objects().len();
        debug!(
            "releasing {} of {} objects and {} scopes",
            released,
            self.object_count(),
            self.scopes.len()
        );
        self.objects.clear();
        self.scopes.clear();
        self.globals.clear();
        self.program = None;
        self.current_scope = None;
        released
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
