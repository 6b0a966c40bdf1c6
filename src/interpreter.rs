//! Tree‑walking evaluator.
//!
//! Statements execute to a [`Flow`]: `Normal`, or one of the three signals
//! (`Break`, `Continue`, `Return`) that travel back up through `execute`
//! until a loop or call boundary consumes them.  Language runtime errors are
//! the `Err` side of the crate [`Result`] and stop the program.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{AssignTarget, Expr, FunctionDecl, LiteralValue, Stmt};
use crate::builtins;
use crate::callable::{Callable, LoxClass, LoxFunction, LoxInstance, NativeFunction, INITIALIZER};
use crate::environment::Environment;
use crate::error::{LoxError, Reporter, Result};
use crate::resolver::Locals;
use crate::scope::{self, Scope, Scoped, SUPER, THIS};
use crate::stack;
use crate::token::{Token, TokenType};
use crate::value::{format_number, Value};

/// Longest text (in bytes) a repeat may build.
const MAX_TEXT_LEN: usize = 1 << 28;

/// Nested user calls allowed before the program is stopped.
const MAX_CALL_DEPTH: usize = 1000;

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Flow<'a> {
    Normal,
    Break(&'a Token<'a>),
    Continue(&'a Token<'a>),
    Return {
        keyword: &'a Token<'a>,
        value: Value<'a>,
    },
}

pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment<'a>>>,
    environment: Rc<RefCell<Environment<'a>>>,
    locals: Locals,
    out: Box<dyn Write>,
    /// User calls currently on the Rust stack.
    depth: usize,
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Interpreter<'a> {
    /// Interpreter writing to stdout, with the standard natives installed.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Interpreter writing to `out`, with the standard natives installed.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        let mut interpreter = Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
            depth: 0,
        };

        interpreter.install(builtins::standard());
        interpreter
    }

    /// Installs every native into the global scope under its own name.
    pub fn install(&mut self, natives: Vec<NativeFunction>) {
        for native in natives {
            debug!("Defining native function '{}'", native.name);

            let name = native.name.clone();
            self.globals
                .borrow_mut()
                .define(&name, Value::Native(Rc::new(native)));
        }
    }

    /// Sink for program output (used by the printing natives).
    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Called by the resolver: the name at `token` lives `depth` scopes up.
    pub fn note_local(&mut self, token: &Token<'_>, depth: usize) {
        self.locals.insert(token.site(), depth);
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error is reported and stops execution of the remaining statements.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>], reporter: &mut dyn Reporter) {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            let outcome = match self.execute(stmt) {
                Ok(Flow::Normal) => Ok(()),
                Ok(Flow::Break(keyword) | Flow::Continue(keyword)) => Err(outside_loop(keyword)),
                Ok(Flow::Return { keyword, .. }) => Err(LoxError::runtime(
                    keyword,
                    "Can't return from top-level code.",
                )),
                Err(e) => Err(e),
            };

            if let Err(e) = outcome {
                debug!("Runtime debug: {}", e);
                reporter.report(&e);
                self.flush(reporter);
                return;
            }
        }

        self.flush(reporter);

        info!("Interpretation completed successfully");
    }

    fn flush(&mut self, reporter: &mut dyn Reporter) {
        if let Err(e) = self.out.flush() {
            reporter.report(&LoxError::from(e));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &'a Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Assign { targets, value } => {
                let value = self.evaluate(value)?;
                for target in targets {
                    match target {
                        AssignTarget::Name(name) => self.assign_or_declare(name, value.clone())?,
                        AssignTarget::Property { object, name } => {
                            let object = self.evaluate(object)?;
                            self.set_property(object, name, value.clone())?;
                        }
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                if !matches!(object, Value::Instance(_)) {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                }
                let value = self.evaluate(value)?;
                self.set_property(object, name, value)?;
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                scope::around(self, stmt, |interp| interp.execute_all(statements))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => scope::around(self, stmt, |interp| -> Result<Flow<'a>> {
                if interp.evaluate(condition)?.is_truthy() {
                    interp.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    interp.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }),

            Stmt::While { condition, body } => scope::around(self, stmt, |interp| -> Result<Flow<'a>> {
                while interp.evaluate(condition)?.is_truthy() {
                    match interp.execute(body)? {
                        Flow::Break(_) => break,
                        Flow::Normal | Flow::Continue(_) => {}
                        flow @ Flow::Return { .. } => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }),

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => scope::around(self, stmt, |interp| -> Result<Flow<'a>> {
                if let Some(init) = initializer {
                    interp.execute(init)?;
                }
                loop {
                    if !matches!(condition, Expr::Empty)
                        && !interp.evaluate(condition)?.is_truthy()
                    {
                        break;
                    }
                    match interp.execute(body)? {
                        Flow::Break(_) => break,
                        // `continue` still runs the increment.
                        Flow::Normal | Flow::Continue(_) => {}
                        flow @ Flow::Return { .. } => return Ok(flow),
                    }
                    interp.evaluate(increment)?;
                }
                Ok(Flow::Normal)
            }),

            Stmt::Break(keyword) => Ok(Flow::Break(keyword)),

            Stmt::Continue(keyword) => Ok(Flow::Continue(keyword)),

            Stmt::Function(decl) => {
                if let Some(name) = decl.name {
                    // Bound first so the body can refer to itself by name.
                    self.environment.borrow_mut().define(name.lexeme, Value::Nil);
                    let function = LoxFunction::new(decl, Rc::clone(&self.environment), false);
                    self.environment
                        .borrow_mut()
                        .define(name.lexeme, Value::Function(Rc::new(function)));
                    info!(
                        "Function '{}' defined with {} parameters",
                        name.lexeme,
                        decl.params.len()
                    );
                }
                Ok(Flow::Normal)
            }

            Stmt::Return { keyword, value } => {
                let value = self.evaluate(value)?;
                debug!("Returning value: {}", value);
                Ok(Flow::Return { keyword, value })
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                self.execute_class(name, superclass.as_ref(), methods)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Runs `statements` in the current environment, stopping at the first
    /// signal.
    pub fn execute_all(&mut self, statements: &'a [Stmt<'a>]) -> Result<Flow<'a>> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal)
    }

    fn execute_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [FunctionDecl<'a>],
    ) -> Result<()> {
        let parent: Option<Rc<LoxClass<'a>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let token = match expr {
                        Expr::Variable(token) => *token,
                        _ => name,
                    };
                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        let build = |interp: &mut Self| -> Result<HashMap<String, Rc<LoxFunction<'a>>>> {
            let mut table = HashMap::new();
            for method in methods {
                if let Some(method_name) = method.name {
                    let function = LoxFunction::new(
                        method,
                        Rc::clone(&interp.environment),
                        method_name.lexeme == INITIALIZER,
                    );
                    table.insert(method_name.lexeme.to_string(), Rc::new(function));
                }
            }
            Ok(table)
        };

        let table = match &parent {
            Some(parent) => scope::within(self, Scope::Superclass, |interp| {
                interp
                    .environment
                    .borrow_mut()
                    .define(SUPER, Value::Class(Rc::clone(parent)));
                build(interp)
            })?,
            None => build(self)?,
        };

        let class = LoxClass::new(name.lexeme, parent, table);

        info!("Class '{}' defined", name.lexeme);

        self.environment
            .borrow_mut()
            .define(name.lexeme, Value::Class(Rc::new(class)));

        Ok(())
    }

    /// Runs a user function: a call frame on top of its closure holds the
    /// parameters, the body runs in that frame, and the caller's environment
    /// comes back afterwards whatever happened.  Recursion deeper than
    /// [`MAX_CALL_DEPTH`] is a runtime error at `call_site`.
    pub fn call_function(
        &mut self,
        function: &LoxFunction<'a>,
        call_site: &Token<'_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(call_site, "Stack overflow."));
        }

        self.depth += 1;
        let result = stack::ensure_sufficient_stack(|| self.run_function(function, arguments));
        self.depth -= 1;

        result
    }

    fn run_function(
        &mut self,
        function: &LoxFunction<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        let saved = std::mem::replace(&mut self.environment, Rc::clone(&function.closure));

        let declaration = function.declaration;
        let outcome = scope::within(self, Scope::Call, |interp| {
            for (param, argument) in declaration.params.iter().zip(arguments) {
                interp.environment.borrow_mut().define(param.lexeme, argument);
            }
            interp.execute_all(&declaration.body)
        });

        self.environment = saved;

        let flow = outcome?;

        if function.is_initializer {
            return Ok(Environment::get_at(&function.closure, 0, THIS).unwrap_or(Value::Nil));
        }

        match flow {
            Flow::Return { value, .. } => Ok(value),
            Flow::Normal => Ok(Value::Nil),
            Flow::Break(keyword) | Flow::Continue(keyword) => Err(outside_loop(keyword)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Empty => Ok(Value::Nil),

            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let decided = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Comma(operands) => {
                let mut last = Value::Nil;
                for operand in operands {
                    last = self.evaluate(operand)?;
                }
                Ok(last)
            }

            Expr::Ternary {
                condition,
                question,
                then_branch,
                else_branch,
            } => match self.evaluate(condition)? {
                Value::Bool(true) => self.evaluate(then_branch),
                Value::Bool(false) => self.evaluate(else_branch),
                _ => Err(LoxError::runtime(
                    question,
                    "Ternary condition must be a boolean.",
                )),
            },

            Expr::Variable(name) => self.look_up_variable(name),

            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.assign_variable(name, value.clone())?;
                Ok(value)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }
                let callee = self.evaluate(callee)?;
                self.call_value(callee, paren, values)
            }

            Expr::Function(decl) => {
                let function = LoxFunction::new(decl, Rc::clone(&self.environment), false);
                Ok(Value::Function(Rc::new(function)))
            }

            Expr::This(keyword) => self.look_up_variable(keyword),

            Expr::Super { keyword, method } => self.evaluate_super(keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &'a Token<'a>, right: &'a Expr<'a>) -> Result<Value<'a>> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_super(&mut self, keyword: &'a Token<'a>, method: &'a Token<'a>) -> Result<Value<'a>> {
        let distance = *self
            .locals
            .get(&keyword.site())
            .ok_or_else(|| LoxError::runtime(keyword, "Can't use 'super' outside of a class."))?;

        let superclass = match Environment::get_at(&self.environment, distance, SUPER) {
            Some(Value::Class(class)) => class,
            _ => return Err(LoxError::runtime(keyword, "Superclass must be a class.")),
        };

        // `this` always sits in the frame just inside the `super` frame.
        let instance = match distance
            .checked_sub(1)
            .and_then(|d| Environment::get_at(&self.environment, d, THIS))
        {
            Some(Value::Instance(instance)) => instance,
            _ => return Err(LoxError::runtime(keyword, "Can't use 'super' outside of a method.")),
        };

        match superclass.find_method(method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
            None => Err(LoxError::runtime(
                method,
                format!(
                    "Undefined property '{}' on superclass '{}'.",
                    method.lexeme, superclass.name
                ),
            )),
        }
    }

    fn call_value(
        &mut self,
        callee: Value<'a>,
        paren: &'a Token<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        match &callee {
            Value::Native(native) => self.invoke(&**native, paren, arguments),
            Value::Function(function) => self.invoke(&**function, paren, arguments),
            Value::Class(class) => self.invoke(class, paren, arguments),
            _ => Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    /// Arity check, then dispatch.
    fn invoke(
        &mut self,
        callable: &dyn Callable<'a>,
        paren: &'a Token<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        if arguments.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            ));
        }

        debug!("Calling '{}' with {} argument(s)", callable.name(), arguments.len());

        callable.call(self, paren, arguments)
    }

    fn look_up_variable(&self, name: &'a Token<'a>) -> Result<Value<'a>> {
        match self.locals.get(&name.site()) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name.lexeme)
                .ok_or_else(|| {
                    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
                }),
            None => self.globals.borrow().get(name),
        }
    }

    fn assign_variable(&mut self, name: &'a Token<'a>, value: Value<'a>) -> Result<()> {
        match self.locals.get(&name.site()) {
            Some(&distance) => {
                if Environment::assign_at(&self.environment, distance, name.lexeme, value) {
                    Ok(())
                } else {
                    Err(LoxError::runtime(
                        name,
                        format!("Undefined variable '{}'.", name.lexeme),
                    ))
                }
            }
            None => self.globals.borrow_mut().assign(name, value),
        }
    }

    /// Statement-level assignment.  A name with no local binding is a global,
    /// created on first assignment if the program never declared it.
    fn assign_or_declare(&mut self, name: &'a Token<'a>, value: Value<'a>) -> Result<()> {
        if self.locals.contains_key(&name.site()) {
            return self.assign_variable(name, value);
        }

        debug!("Assigning global '{}' = {}", name.lexeme, value);
        self.globals.borrow_mut().define(name.lexeme, value);
        Ok(())
    }

    fn set_property(&mut self, object: Value<'a>, name: &'a Token<'a>, value: Value<'a>) -> Result<()> {
        match object {
            Value::Instance(instance) => {
                instance.borrow_mut().set(name, value);
                Ok(())
            }
            _ => Err(LoxError::runtime(name, "Only instances have fields.")),
        }
    }
}

impl<'a> Scoped for Interpreter<'a> {
    fn open(&mut self, scope: Scope) {
        debug!("Entering {:?} scope", scope);
        self.environment = Environment::child_of(&self.environment);
    }

    fn close(&mut self, scope: Scope) {
        debug!("Leaving {:?} scope", scope);
        let parent = self.environment.borrow().enclosing();
        if let Some(parent) = parent {
            self.environment = parent;
        }
    }
}

/// A `break` or `continue` escaped every loop.  Only reachable when the
/// resolver did not run.
fn outside_loop(keyword: &Token<'_>) -> LoxError {
    LoxError::runtime(
        keyword,
        format!("Can't use '{}' outside of a loop.", keyword.lexeme),
    )
}

/// Binary operator semantics.  No implicit conversions except number → text
/// for `+`.
fn binary<'a>(operator: &Token<'_>, left: Value<'a>, right: Value<'a>) -> Result<Value<'a>> {
    use Value::{Bool, Number};

    match operator.token_type {
        TokenType::EQUAL_EQUAL => return Ok(Bool(left == right)),
        TokenType::BANG_EQUAL => return Ok(Bool(left != right)),
        TokenType::PLUS => return plus(operator, left, right),
        TokenType::STAR => {
            if let (Value::String(text), Number(count)) = (&left, &right) {
                return repeat(operator, text, *count);
            }
        }
        _ => {}
    }

    let (a, b) = match (left, right) {
        (Number(a), Number(b)) => (a, b),
        _ => {
            let message = match operator.token_type {
                TokenType::STAR => "Operands must be numbers, or a text and a number.",
                _ => "Operands must be numbers.",
            };
            return Err(LoxError::runtime(operator, message));
        }
    };

    match operator.token_type {
        TokenType::MINUS => Ok(Number(a - b)),
        TokenType::STAR => Ok(Number(a * b)),
        TokenType::SLASH if b == 0.0 => Err(LoxError::runtime(operator, "Division by zero.")),
        TokenType::SLASH => Ok(Number(a / b)),
        TokenType::PERCENT if b == 0.0 => Err(LoxError::runtime(operator, "Modulo by zero.")),
        TokenType::PERCENT => Ok(Number(a % b)),
        TokenType::CARET => Ok(Number(a.powf(b))),
        TokenType::GREATER => Ok(Bool(a > b)),
        TokenType::GREATER_EQUAL => Ok(Bool(a >= b)),
        TokenType::LESS => Ok(Bool(a < b)),
        TokenType::LESS_EQUAL => Ok(Bool(a <= b)),
        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}

fn plus<'a>(operator: &Token<'_>, left: Value<'a>, right: Value<'a>) -> Result<Value<'a>> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            Ok(Value::String(a))
        }
        (Value::String(mut a), Value::Number(b)) => {
            format_number(b, &mut a).map_err(|_| LoxError::runtime(operator, "Cannot format number."))?;
            Ok(Value::String(a))
        }
        (Value::Number(a), Value::String(b)) => {
            let mut text = String::new();
            format_number(a, &mut text).map_err(|_| LoxError::runtime(operator, "Cannot format number."))?;
            text.push_str(&b);
            Ok(Value::String(text))
        }
        _ => Err(LoxError::runtime(
            operator,
            "Operands must be two numbers, or text and a number.",
        )),
    }
}

fn repeat<'a>(operator: &Token<'_>, text: &str, count: f64) -> Result<Value<'a>> {
    if count < 0.0 || count.fract() != 0.0 || !count.is_finite() {
        return Err(LoxError::runtime(
            operator,
            "Repeat count must be a non-negative integer.",
        ));
    }

    let too_large = || LoxError::runtime(operator, "Repeat result is too large.");

    if count > usize::MAX as f64 {
        return Err(too_large());
    }
    let count = count as usize;

    match text.len().checked_mul(count) {
        Some(len) if len <= MAX_TEXT_LEN => Ok(Value::String(text.repeat(count))),
        _ => Err(too_large()),
    }
}
