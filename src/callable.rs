//! Callables and the class/instance object model.
//!
//! Three things can be called: host routines ([`NativeFunction`]), user
//! closures ([`LoxFunction`]) and classes ([`LoxClass`], which construct
//! instances).  All of them answer the same [`Callable`] contract so the
//! interpreter checks arity and dispatches in one place.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::scope::Scope;
use crate::token::Token;
use crate::value::Value;

/// Name of the method that constructs instances.
pub const INITIALIZER: &str = "init";

pub trait Callable<'a> {
    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    /// Invoke with already‑evaluated arguments.  `call_site` locates any
    /// runtime error raised by the callee itself.
    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        call_site: &Token<'_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>>;
}

/// Signature of a host routine.
pub type NativeFn =
    for<'a> fn(&mut Interpreter<'a>, &[Value<'a>]) -> std::result::Result<Value<'a>, String>;

/// A host routine exposed to scripts.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &str, arity: usize, func: NativeFn) -> Self {
        Self {
            name: name.to_string(),
            arity,
            func,
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}/{}>", self.name, self.arity)
    }
}

impl<'a> Callable<'a> for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        call_site: &Token<'_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(interpreter, &arguments).map_err(|message| LoxError::runtime(call_site, message))
    }
}

/// A user function paired with the frame it was declared in.
pub struct LoxFunction<'a> {
    pub declaration: &'a FunctionDecl<'a>,
    pub closure: Rc<RefCell<Environment<'a>>>,
    /// Set for `init` methods: calls always yield the bound instance.
    pub is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn new(
        declaration: &'a FunctionDecl<'a>,
        closure: Rc<RefCell<Environment<'a>>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    /// Same body and parameters, with `this` bound to `instance` in a frame
    /// between the closure and every future call frame.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance<'a>>>) -> LoxFunction<'a> {
        let frame = Environment::child_of(&self.closure);

        if let Some(this) = Scope::Method.implicit_binding() {
            frame.borrow_mut().define(this, Value::Instance(instance));
        }

        LoxFunction {
            declaration: self.declaration,
            closure: frame,
            is_initializer: self.is_initializer,
        }
    }
}

impl<'a> Callable<'a> for LoxFunction<'a> {
    fn name(&self) -> &str {
        self.declaration.name.map_or("<anonymous>", |name| name.lexeme)
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        call_site: &Token<'_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        interpreter.call_function(self, call_site, arguments)
    }
}

pub struct LoxClass<'a> {
    pub name: String,
    pub superclass: Option<Rc<LoxClass<'a>>>,
    pub methods: HashMap<String, Rc<LoxFunction<'a>>>,
}

impl<'a> LoxClass<'a> {
    pub fn new(
        name: &str,
        superclass: Option<Rc<LoxClass<'a>>>,
        methods: HashMap<String, Rc<LoxFunction<'a>>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            superclass,
            methods,
        }
    }

    /// Looks `name` up on this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction<'a>>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }
}

/// Classes are called through their `Rc` so instances can share the class.
impl<'a> Callable<'a> for Rc<LoxClass<'a>> {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |initializer| initializer.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        call_site: &Token<'_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Instantiating class '{}'", self.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(self))));

        if let Some(initializer) = self.find_method(INITIALIZER) {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, call_site, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

pub struct LoxInstance<'a> {
    pub class: Rc<LoxClass<'a>>,
    fields: HashMap<String, Value<'a>>,
}

impl<'a> LoxInstance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Field first, then a method of the class bound to `instance`.
    pub fn get(instance: &Rc<RefCell<LoxInstance<'a>>>, name: &Token<'_>) -> Result<Value<'a>> {
        let method = {
            let this = instance.borrow();

            if let Some(value) = this.fields.get(name.lexeme) {
                return Ok(value.clone());
            }

            this.class.find_method(name.lexeme)
        };

        match method {
            Some(method) => Ok(Value::Function(Rc::new(method.bind(Rc::clone(instance))))),
            None => Err(LoxError::runtime(
                name,
                format!("Undefined property '{}'.", name.lexeme),
            )),
        }
    }

    pub fn set(&mut self, name: &Token<'_>, value: Value<'a>) {
        self.fields.insert(name.lexeme.to_string(), value);
    }
}
