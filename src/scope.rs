//! Where scopes open and close.
//!
//! The resolver and the interpreter must agree exactly on scope shape, or a
//! resolved distance lands on the wrong frame at runtime.  Both passes take
//! their answers from this module: [`Scope::around`] says which statements
//! open a scope, and [`within`] is the only way either pass enters one.
//!
//! | Construct                       | Scope          | Holds                          |
//! |---------------------------------|----------------|--------------------------------|
//! | `{ … }`                         | `Block`        | its declarations               |
//! | whole `if` statement            | `Conditional`  | declarations in either branch  |
//! | whole `while` / `for` statement | `Loop`         | `for` initializer, body decls  |
//! | function call                   | `Call`         | parameters and body locals     |
//! | bound method                    | `Method`       | `this`                         |
//! | class with a superclass         | `Superclass`   | `super`                        |

use crate::ast::Stmt;

/// Every kind of lexical scope the language has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Block,
    Conditional,
    Loop,
    Call,
    Method,
    Superclass,
}

impl Scope {
    /// The scope `stmt` opens around its own execution, if any.
    pub fn around(stmt: &Stmt<'_>) -> Option<Scope> {
        match stmt {
            Stmt::Block(_) => Some(Scope::Block),
            Stmt::If { .. } => Some(Scope::Conditional),
            Stmt::While { .. } | Stmt::For { .. } => Some(Scope::Loop),
            _ => None,
        }
    }

    /// Name bound implicitly when this scope opens.
    pub fn implicit_binding(self) -> Option<&'static str> {
        match self {
            Scope::Method => Some(THIS),
            Scope::Superclass => Some(SUPER),
            _ => None,
        }
    }
}

pub const THIS: &str = "this";
pub const SUPER: &str = "super";

/// A pass that tracks scopes: the resolver's stack of name sets, or the
/// interpreter's environment chain.
pub trait Scoped {
    fn open(&mut self, scope: Scope);

    fn close(&mut self, scope: Scope);
}

/// Run `body` inside `scope`.  The scope is closed on every exit path,
/// including early returns of `Err`.
pub fn within<S, T, E, F>(pass: &mut S, scope: Scope, body: F) -> Result<T, E>
where
    S: Scoped + ?Sized,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    pass.open(scope);

    let result = body(pass);

    pass.close(scope);

    result
}

/// Like [`within`], but only opens a scope when `stmt` calls for one.
pub fn around<S, T, E, F>(pass: &mut S, stmt: &Stmt<'_>, body: F) -> Result<T, E>
where
    S: Scoped + ?Sized,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    match Scope::around(stmt) {
        Some(scope) => within(pass, scope, body),
        None => body(pass),
    }
}
