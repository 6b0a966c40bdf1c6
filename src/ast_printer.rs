use crate::ast::{AssignTarget, Expr, FunctionDecl, LiteralValue, Stmt};

/// Renders expressions and statements in parenthesised prefix form, e.g.
/// `(+ 1.0 (group (* 2.0 3.0)))` or `(var a (call f 1.0))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            Expr::Empty => "_".into(),

            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                // 3 → 3.0
                LiteralValue::Number(n) if n.fract() == 0.0 => format!("{:.1}", n),

                LiteralValue::Number(n) => n.to_string(),
            },

            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            Expr::Comma(operands) => Self::parenthesize("comma", operands.iter().map(Self::print)),

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => format!(
                "(?: {} {} {})",
                Self::print(condition),
                Self::print(then_branch),
                Self::print(else_branch)
            ),

            Expr::Variable(name) => name.lexeme.into(),

            Expr::Assign { name, value } => format!("(= {} {})", name.lexeme, Self::print(value)),

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Call {
                callee, arguments, ..
            } => Self::parenthesize(
                "call",
                std::iter::once(Self::print(callee)).chain(arguments.iter().map(Self::print)),
            ),

            Expr::Function(decl) => Self::function(decl),

            Expr::This(_) => "this".into(),

            Expr::Super { method, .. } => format!("(. super {})", method.lexeme),
        }
    }

    pub fn print_stmt(stmt: &Stmt<'_>) -> String {
        match stmt {
            Stmt::Expression(expr) => Self::print(expr),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Assign { targets, value } => Self::parenthesize(
                "=",
                targets
                    .iter()
                    .map(|target| match target {
                        AssignTarget::Name(name) => name.lexeme.to_string(),
                        AssignTarget::Property { object, name } => {
                            format!("(. {} {})", Self::print(object), name.lexeme)
                        }
                    })
                    .chain(std::iter::once(Self::print(value))),
            ),

            Stmt::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            Stmt::Block(statements) => {
                Self::parenthesize("block", statements.iter().map(Self::print_stmt))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut parts = vec![Self::print(condition), Self::print_stmt(then_branch)];
                if let Some(else_branch) = else_branch {
                    parts.push(Self::print_stmt(else_branch));
                }
                Self::parenthesize("if", parts)
            }

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                Self::print(condition),
                Self::print_stmt(body)
            ),

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => format!(
                "(for {} {} {} {})",
                initializer
                    .as_deref()
                    .map_or_else(|| "_".to_string(), Self::print_stmt),
                Self::print(condition),
                Self::print(increment),
                Self::print_stmt(body)
            ),

            Stmt::Break(_) => "(break)".into(),

            Stmt::Continue(_) => "(continue)".into(),

            Stmt::Function(decl) => Self::function(decl),

            Stmt::Return { value, .. } => match value {
                Expr::Empty => "(return)".into(),
                value => format!("(return {})", Self::print(value)),
            },

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let head = match superclass {
                    Some(parent) => format!("class {} < {}", name.lexeme, Self::print(parent)),
                    None => format!("class {}", name.lexeme),
                };
                Self::parenthesize(&head, methods.iter().map(Self::function))
            }
        }
    }

    /// `(fun name (a b) body…)`; anonymous literals omit the name.
    fn function(decl: &FunctionDecl<'_>) -> String {
        let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme).collect();

        let head = match decl.name {
            Some(name) => format!("fun {} ({})", name.lexeme, params.join(" ")),
            None => format!("fun ({})", params.join(" ")),
        };

        Self::parenthesize(&head, decl.body.iter().map(Self::print_stmt))
    }

    fn parenthesize(head: &str, parts: impl IntoIterator<Item = String>) -> String {
        let mut s = format!("({}", head);
        for part in parts {
            s.push(' ');
            s.push_str(&part);
        }
        s.push(')');
        s
    }
}
