//! Abstract syntax tree.
//!
//! Two closed node families, [`Expr`] and [`Stmt`], walked by exhaustive
//! `match` in the printer, resolver and interpreter.  Nodes borrow their
//! tokens from the token slice the [`Parser`](crate::parser::Parser) ran
//! over, so a tree never outlives its source.

use serde::Serialize;

use crate::token::Token;

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and
/// do **not** retain a reference to the originating [`Token`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Parameters and body shared by named functions, methods and function
/// literals.  Closures keep a reference to the declaration, never a copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl<'a> {
    /// `None` for an anonymous `fun (…) { … }` literal.
    pub name: Option<&'a Token<'a>>,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<&'a Token<'a>>,

    pub body: Vec<Stmt<'a>>,
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr<'a> {
    /// Placeholder where the grammar allows an expression to be left out
    /// (`for (;;)` clauses, bare `return`).
    Empty,

    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`, `s * 3`
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// `a, b, c` ‑ every operand is evaluated, the last one is the value.
    Comma(Vec<Expr<'a>>),

    /// `condition ? then_branch : else_branch`
    Ternary {
        condition: Box<Expr<'a>>,
        /// The `?` token ‑ retained for error reporting.
        question: &'a Token<'a>,
        then_branch: Box<Expr<'a>>,
        else_branch: Box<Expr<'a>>,
    },

    /// Variable access.
    Variable(&'a Token<'a>),

    /// Expression‑level assignment to a plain name: `identifier "=" expression`
    Assign {
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// object.property
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// Function‑ or method‑call expression
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: &'a Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// Anonymous function literal: `fun (a, b) { … }`.
    Function(Box<FunctionDecl<'a>>),

    /// The `this` keyword inside a method.
    This(&'a Token<'a>),

    /// `super.method`
    Super {
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },
}

/// One left‑hand side of an assignment chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AssignTarget<'a> {
    Name(&'a Token<'a>),

    Property {
        object: Expr<'a>,
        name: &'a Token<'a>,
    },
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a
/// sequence of these nodes returned by
/// [`Parser::parse`](crate::parser::Parser::parse).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt<'a> {
    /// Stand‑alone expression.
    Expression(Expr<'a>),

    /// Variable declaration: `"var" IDENT ("=" initializer)?`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    /// `a = b = obj.c = value` ‑ `value` is evaluated once and stored into
    /// every target, left to right.
    Assign {
        targets: Vec<AssignTarget<'a>>,
        value: Expr<'a>,
    },

    /// `object.name = value`
    Set {
        object: Expr<'a>,
        name: &'a Token<'a>,
        value: Expr<'a>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt<'a>>),

    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    /// `condition` and `increment` are [`Expr::Empty`] when left out.
    For {
        initializer: Option<Box<Stmt<'a>>>,
        condition: Expr<'a>,
        increment: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    Break(&'a Token<'a>),

    Continue(&'a Token<'a>),

    /// Named function declaration.
    Function(FunctionDecl<'a>),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: &'a Token<'a>,

        /// [`Expr::Empty`] ⇒ `nil` is returned.
        value: Expr<'a>,
    },

    Class {
        name: &'a Token<'a>,
        /// Always an [`Expr::Variable`] when present.
        superclass: Option<Expr<'a>>,
        methods: Vec<FunctionDecl<'a>>,
    },
}
