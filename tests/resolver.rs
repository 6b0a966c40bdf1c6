#[cfg(test)]
mod resolver_tests {
    use loxwalk as lox;

    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::runner::{run_captured, Status};
    use lox::scanner::scan;
    use pretty_assertions::assert_eq;

    /// Resolves `source` without running it and returns the rendered errors.
    fn resolve_errors(source: &str) -> Vec<String> {
        let (tokens, _) = scan(source);

        let mut parse_errors: Vec<LoxError> = Vec::new();
        let statements = Parser::new(&tokens).parse(&mut parse_errors);
        assert!(parse_errors.is_empty(), "unexpected syntax errors: {:?}", parse_errors);

        let mut interpreter = Interpreter::with_output(Box::new(std::io::sink()));
        let mut errors: Vec<LoxError> = Vec::new();
        let clean = Resolver::new(&mut interpreter).resolve(&statements, &mut errors);

        assert_eq!(clean, errors.is_empty());

        errors.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_well_formed_program_has_no_errors() {
        let errors = resolve_errors(
            r#"
            class A { greet() { return "A" } }
            class B < A { greet() { return super.greet() + this.name } }
            fun f(n) { while (n > 0) { n = n - 1 if (n == 2) break } return n }
            "#,
        );

        assert_eq!(errors, Vec::<String>::new());
    }

    #[test]
    fn test_break_outside_loop() {
        assert_eq!(
            resolve_errors("break"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop.".to_string()]
        );
    }

    #[test]
    fn test_continue_inside_function_inside_loop() {
        // A function body starts a fresh loop context.
        assert_eq!(
            resolve_errors("while (true) { fun f() { continue } }"),
            vec!["[line 1] Error at 'continue': Can't use 'continue' outside of a loop.".to_string()]
        );
    }

    #[test]
    fn test_return_at_top_level() {
        assert_eq!(
            resolve_errors("return 1"),
            vec!["[line 1] Error at 'return': Can't return from top-level code.".to_string()]
        );
    }

    #[test]
    fn test_this_outside_class() {
        assert_eq!(
            resolve_errors("fun f() { return this }"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class.".to_string()]
        );
    }

    #[test]
    fn test_super_misuse() {
        assert_eq!(
            resolve_errors("super.x()"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class.".to_string()]
        );
        assert_eq!(
            resolve_errors("class A { f() { super.f() } }"),
            vec![
                "[line 1] Error at 'super': Can't use 'super' in a class with no superclass."
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_class_inheriting_from_itself() {
        assert_eq!(
            resolve_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself.".to_string()]
        );
    }

    #[test]
    fn test_every_error_is_reported() {
        let errors = resolve_errors("break\ncontinue\nreturn");

        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_resolve_errors_prevent_interpretation() {
        let run = run_captured("println(\"never\")\nbreak");

        assert_eq!(run.output, "");
        assert_eq!(run.status, Status::StaticError);
        assert_eq!(run.errors.len(), 1);
    }

    #[test]
    fn test_unresolved_signals_are_runtime_errors() {
        let cases = [
            ("break", "Can't use 'break' outside of a loop.\n[line 1] at 'break'"),
            ("continue", "Can't use 'continue' outside of a loop.\n[line 1] at 'continue'"),
            ("return 1", "Can't return from top-level code.\n[line 1] at 'return'"),
            (
                "fun f() { break }\nf()",
                "Can't use 'break' outside of a loop.\n[line 1] at 'break'",
            ),
        ];

        for (source, expected) in cases {
            let (tokens, _) = scan(source);
            let mut parse_errors: Vec<LoxError> = Vec::new();
            let statements = Parser::new(&tokens).parse(&mut parse_errors);
            assert!(parse_errors.is_empty(), "unexpected syntax errors: {:?}", parse_errors);

            // Skips the resolver, so the signal reaches the top level.
            let mut interpreter = Interpreter::with_output(Box::new(std::io::sink()));
            let mut errors: Vec<LoxError> = Vec::new();
            interpreter.interpret(&statements, &mut errors);

            assert_eq!(errors.len(), 1, "{}: {:?}", source, errors);
            assert!(errors[0].is_runtime());
            assert_eq!(errors[0].to_string(), expected);
        }
    }

    #[test]
    fn test_redeclaration_is_allowed() {
        let run = run_captured("{ var a = 1 var a = a + 1 println(a) }");

        assert_eq!(run.output, "2\n");
        assert_eq!(run.status, Status::Ok);
    }
}
