#[cfg(test)]
mod parser_tests {
    use loxwalk as lox;

    use lox::ast::{AssignTarget, Stmt};
    use lox::ast_printer::AstPrinter;
    use lox::error::LoxError;
    use lox::parser::Parser;
    use lox::scanner::scan;
    use pretty_assertions::assert_eq;

    /// Parses `source` and returns each statement in prefix form plus the
    /// syntax errors, rendered.
    fn parse(source: &str) -> (Vec<String>, Vec<String>) {
        let (tokens, lex_errors) = scan(source);
        assert!(lex_errors.is_empty(), "unexpected lexical errors: {:?}", lex_errors);

        let mut errors: Vec<LoxError> = Vec::new();
        let statements = Parser::new(&tokens).parse(&mut errors);

        (
            statements.iter().map(AstPrinter::print_stmt).collect(),
            errors.iter().map(ToString::to_string).collect(),
        )
    }

    fn assert_parses(source: &str, expected: &[&str]) {
        let (printed, errors) = parse(source);

        assert_eq!(errors, Vec::<String>::new());
        assert_eq!(printed, expected);
    }

    #[test]
    fn test_precedence() {
        assert_parses("1 + 2 * 3", &["(+ 1.0 (* 2.0 3.0))"]);
        assert_parses("(1 + 2) * 3", &["(* (group (+ 1.0 2.0)) 3.0)"]);
        assert_parses("2 ^ 3 % 4 - -1", &["(- (% (^ 2.0 3.0) 4.0) (- 1.0))"]);
        assert_parses("a or b and !c == d < e", &["(or a (and b (== (! c) (< d e))))"]);
    }

    #[test]
    fn test_ternary_is_right_associative() {
        assert_parses("a ? b : c ? d : e", &["(?: a b (?: c d e))"]);
    }

    #[test]
    fn test_comma_expression() {
        assert_parses("a, b, c", &["(comma a b c)"]);
        assert_parses("f((a, b), c)", &["(call f (group (comma a b)) c)"]);
    }

    #[test]
    fn test_semicolons_are_optional() {
        assert_parses("var a = 1 var b = 2;", &["(var a 1.0)", "(var b 2.0)"]);
    }

    #[test]
    fn test_assignment_chain_statement() {
        assert_parses("var a a = b = c = 7", &["(var a)", "(= a b c 7.0)"]);
    }

    #[test]
    fn test_single_property_target_is_a_set() {
        let (tokens, _) = scan("obj.x = 1");
        let mut errors: Vec<LoxError> = Vec::new();
        let statements = Parser::new(&tokens).parse(&mut errors);

        assert!(errors.is_empty());
        assert!(matches!(&statements[0], Stmt::Set { name, .. } if name.lexeme == "x"));
    }

    #[test]
    fn test_mixed_chain_is_an_assignment() {
        let (tokens, _) = scan("a = obj.x = 1");
        let mut errors: Vec<LoxError> = Vec::new();
        let statements = Parser::new(&tokens).parse(&mut errors);

        assert!(errors.is_empty());
        match &statements[0] {
            Stmt::Assign { targets, .. } => {
                assert_eq!(targets.len(), 2);
                assert!(matches!(targets[0], AssignTarget::Name(_)));
                assert!(matches!(targets[1], AssignTarget::Property { .. }));
            }
            other => panic!("expected an assignment chain, got {:?}", other),
        }
    }

    #[test]
    fn test_for_loop_clauses() {
        assert_parses(
            "for (var i = 0; i < 3; i = i + 1) print(i)",
            &["(for (var i 0.0) (< i 3.0) (= i (+ i 1.0)) (call print i))"],
        );
        assert_parses("for (;;) break", &["(for _ _ _ (break))"]);
    }

    #[test]
    fn test_functions_and_classes() {
        assert_parses(
            "fun add(a, b) { return a + b }",
            &["(fun add (a b) (return (+ a b)))"],
        );
        assert_parses(
            "class B < A { init(x) { this.x = x } greet() { return super.greet() } }",
            &["(class B < A (fun init (x) (= (. this x) x)) (fun greet () (return (call (. super greet)))))"],
        );
        assert_parses("var f = fun (n) { return }", &["(var f (fun (n) (return)))"]);
    }

    #[test]
    fn test_if_else_and_while() {
        assert_parses(
            "if (a) { b } else c\nwhile (x) continue",
            &["(if a (block b) c)", "(while x (continue))"],
        );
    }

    #[test]
    fn test_missing_left_operand() {
        let (_, errors) = parse("+ 1");

        assert_eq!(
            errors,
            vec!["[line 1] Error at '+': Missing left operand for '+'.".to_string()]
        );
    }

    #[test]
    fn test_unclosed_group_reports_at_end() {
        let (_, errors) = parse("(1 + 2");

        assert_eq!(
            errors,
            vec!["[line 1] Error at end: Expected ')' after expression.".to_string()]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (_, errors) = parse("1 = 2");

        assert_eq!(
            errors,
            vec!["[line 1] Error at '=': Invalid assignment target.".to_string()]
        );
    }

    #[test]
    fn test_ternary_requires_both_branches() {
        let (_, errors) = parse("a ? b");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Expected ':'"), "got {:?}", errors);
    }

    #[test]
    fn test_recovery_keeps_the_good_statements() {
        let (printed, errors) = parse("var a = 1\nvar = 2\nvar c = 3");

        assert_eq!(printed, vec!["(var a 1.0)", "(var c 3.0)"]);
        assert_eq!(
            errors,
            vec!["[line 2] Error at '=': Expected variable name.".to_string()]
        );
    }

    #[test]
    fn test_recovery_inside_a_block() {
        let (printed, errors) = parse("{ var a = 1 var = 2 }\nvar b = 3");

        assert_eq!(printed, vec!["(block (var a 1.0))", "(var b 3.0)"]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_too_many_parameters_is_reported_but_parsed() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        let (printed, errors) = parse(&source);

        assert_eq!(printed.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't have more than 255 parameters."));
    }
}
