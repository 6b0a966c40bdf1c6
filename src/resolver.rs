//! Static resolver pass.
//!
//! This resolver does three things in one AST walk:
//! 1. Mirrors the interpreter's scopes (stack of `HashSet<&str>` of visible names),
//!    opening and closing them only through [`crate::scope`].
//! 2. Reports static errors (misplaced `break`/`continue`/`return`, `this` or
//!    `super` outside a class, a class inheriting from itself).
//! 3. Tells the interpreter, for *each* name occurrence, how many scopes up its
//!    binding lives.  Occurrences it does not record are globals.

use crate::ast::{AssignTarget, Expr, FunctionDecl, Stmt};
use crate::error::{LoxError, Reporter, Result};
use crate::interpreter::Interpreter;
use crate::scope::{self, Scope, Scoped};
use crate::token::Token;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Side‑table from a name occurrence ([`Token::site`]) to its scope distance.
pub type Locals = HashMap<usize, usize>;

/// Are we inside a function body?  Used to validate `return`.  Methods and
/// initializers count as functions; an initializer may still `return` a value,
/// which the call discards.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

/// Are we inside a class body, and does it have a superclass?
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'a, 'interp> {
    interpreter: &'interp mut Interpreter<'a>,
    scopes: Vec<HashSet<&'a str>>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
    errors: Vec<LoxError>,
}

impl<'a, 'interp> Resolver<'a, 'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter<'a>) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements.  Every static error goes to
    /// `reporter`; returns `true` when there were none.
    pub fn resolve(&mut self, statements: &'a [Stmt<'a>], reporter: &mut dyn Reporter) -> bool {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            if let Err(e) = self.resolve_stmt(stmt) {
                self.errors.push(e);
            }
        }

        let errors = std::mem::take(&mut self.errors);

        for error in &errors {
            reporter.report(error);
        }

        errors.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'a Stmt<'a>) -> Result<()> {
        debug!("Resolving stmt: {:?}", std::mem::discriminant(stmt));

        match stmt {
            Stmt::Block(statements) => scope::around(self, stmt, |r| r.resolve_all(statements))?,

            Stmt::Var { name, initializer } => {
                // The initializer runs before the name exists, so it only
                // sees outer bindings.
                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }
                self.declare(name);
            }

            Stmt::Assign { targets, value } => {
                self.resolve_expr(value)?;
                for target in targets {
                    match target {
                        AssignTarget::Name(name) => self.resolve_local(name),
                        AssignTarget::Property { object, .. } => self.resolve_expr(object)?,
                    }
                }
            }

            Stmt::Set { object, value, .. } => {
                self.resolve_expr(object)?;
                self.resolve_expr(value)?;
            }

            Stmt::Function(decl) => {
                // Declared before the body so the function can call itself.
                if let Some(name) = decl.name {
                    self.declare(name);
                }
                self.resolve_function(decl, FunctionType::Function)?;
            }

            Stmt::Expression(expr) => self.resolve_expr(expr)?,

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => scope::around(self, stmt, |r| -> Result<()> {
                r.resolve_expr(condition)?;
                r.resolve_stmt(then_branch)?;
                if let Some(eb) = else_branch.as_deref() {
                    r.resolve_stmt(eb)?;
                }
                Ok(())
            })?,

            Stmt::While { condition, body } => scope::around(self, stmt, |r| {
                r.resolve_expr(condition)?;
                r.resolve_loop_body(body)
            })?,

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => scope::around(self, stmt, |r| -> Result<()> {
                if let Some(init) = initializer {
                    r.resolve_stmt(init)?;
                }
                r.resolve_expr(condition)?;
                r.resolve_expr(increment)?;
                r.resolve_loop_body(body)
            })?,

            Stmt::Break(keyword) | Stmt::Continue(keyword) => {
                if self.loop_depth == 0 {
                    return Err(LoxError::resolve(
                        keyword,
                        format!("Can't use '{}' outside of a loop.", keyword.lexeme),
                    ));
                }
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LoxError::resolve(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }
                self.resolve_expr(value)?;
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods)?,
        }

        Ok(())
    }

    fn resolve_all(&mut self, statements: &'a [Stmt<'a>]) -> Result<()> {
        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    fn resolve_loop_body(&mut self, body: &'a Stmt<'a>) -> Result<()> {
        self.loop_depth += 1;
        let result = self.resolve_stmt(body);
        self.loop_depth -= 1;
        result
    }

    fn resolve_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [FunctionDecl<'a>],
    ) -> Result<()> {
        let enclosing = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);

        let result = match superclass {
            Some(parent) => {
                if let Expr::Variable(parent_name) = parent {
                    if parent_name.lexeme == name.lexeme {
                        self.current_class = enclosing;
                        return Err(LoxError::resolve(
                            parent_name,
                            "A class can't inherit from itself.",
                        ));
                    }
                }

                self.current_class = ClassType::Subclass;
                self.resolve_expr(parent)
                    .and_then(|()| scope::within(self, Scope::Superclass, |r| r.resolve_methods(methods)))
            }

            None => self.resolve_methods(methods),
        };

        self.current_class = enclosing;
        result
    }

    fn resolve_methods(&mut self, methods: &'a [FunctionDecl<'a>]) -> Result<()> {
        for method in methods {
            scope::within(self, Scope::Method, |r| {
                r.resolve_function(method, FunctionType::Function)
            })?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'a Expr<'a>) -> Result<()> {
        match expr {
            Expr::Empty | Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner)?,

            Expr::Unary { right, .. } => self.resolve_expr(right)?,

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            Expr::Comma(operands) => {
                for operand in operands {
                    self.resolve_expr(operand)?;
                }
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.resolve_expr(condition)?;
                self.resolve_expr(then_branch)?;
                self.resolve_expr(else_branch)?;
            }

            Expr::Variable(name) => self.resolve_local(name),

            Expr::Assign { name, value } => {
                self.resolve_expr(value)?;
                self.resolve_local(name);
            }

            Expr::Get { object, .. } => self.resolve_expr(object)?,

            Expr::Call {
                callee, arguments, ..
            } => {
                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
                self.resolve_expr(callee)?;
            }

            Expr::Function(decl) => self.resolve_function(decl, FunctionType::Function)?,

            Expr::This(keyword) => {
                if self.current_class == ClassType::None {
                    return Err(LoxError::resolve(
                        keyword,
                        "Can't use 'this' outside of a class.",
                    ));
                }
                self.resolve_local(keyword);
            }

            Expr::Super { keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        return Err(LoxError::resolve(
                            keyword,
                            "Can't use 'super' outside of a class.",
                        ))
                    }
                    ClassType::Class => {
                        return Err(LoxError::resolve(
                            keyword,
                            "Can't use 'super' in a class with no superclass.",
                        ))
                    }
                    ClassType::Subclass => {}
                }
                self.resolve_local(keyword);
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a call scope for a function’s parameters + body.  Loops outside
    /// the function do not make `break` legal inside it.
    fn resolve_function(&mut self, decl: &'a FunctionDecl<'a>, kind: FunctionType) -> Result<()> {
        let enclosing_function = self.current_function;
        let enclosing_loops = self.loop_depth;
        self.current_function = kind;
        self.loop_depth = 0;

        let result = scope::within(self, Scope::Call, |r| {
            for param in &decl.params {
                r.declare(param);
            }
            r.resolve_all(&decl.body)
        });

        self.current_function = enclosing_function;
        self.loop_depth = enclosing_loops;
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    /// Make `name` visible from here to the end of the innermost scope.
    /// Globals are not tracked.
    fn declare(&mut self, name: &Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme);
        }
    }

    /// Record this name occurrence as a local at depth `d`, or leave it
    /// unrecorded (a global) if no scope declares it.
    fn resolve_local(&mut self, name: &Token<'a>) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains(name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.note_local(name, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}

impl<'a, 'interp> Scoped for Resolver<'a, 'interp> {
    fn open(&mut self, scope: Scope) {
        let mut names: HashSet<&'a str> = HashSet::new();

        if let Some(implicit) = scope.implicit_binding() {
            names.insert(implicit);
        }

        self.scopes.push(names);
    }

    fn close(&mut self, _scope: Scope) {
        self.scopes.pop();
    }
}
