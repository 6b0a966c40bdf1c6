#[cfg(test)]
mod interpreter_tests {
    use loxwalk as lox;

    use lox::error::LoxError;
    use lox::runner::{decode, run_captured, Status};
    use pretty_assertions::assert_eq;

    /// Runs `source` and asserts it finished cleanly with `expected` output.
    fn assert_output(source: &str, expected: &str) {
        let run = run_captured(source);

        assert_eq!(run.errors.iter().map(ToString::to_string).collect::<Vec<_>>(), Vec::<String>::new());
        assert_eq!(run.status, Status::Ok);
        assert_eq!(run.output, expected);
    }

    /// Runs `source` and returns the single runtime error message it stopped on.
    fn runtime_error(source: &str) -> String {
        let run = run_captured(source);

        assert_eq!(run.status, Status::RuntimeError);
        assert_eq!(run.errors.len(), 1, "errors: {:?}", run.errors);

        run.errors[0].to_string()
    }

    #[test]
    fn test_arithmetic() {
        assert_output(
            "println(1 + 2) println(7 - 10) println(2 * 3.5) println(7 / 2) println(2 ^ 10) println(-7 % 3)",
            "3\n-3\n7\n3.5\n1024\n-1\n",
        );
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        assert_eq!(runtime_error("println(1 / 0)"), "Division by zero.\n[line 1] at '/'");
        assert_eq!(runtime_error("println(1 % 0)"), "Modulo by zero.\n[line 1] at '%'");
    }

    #[test]
    fn test_truthiness_table() {
        assert_output(
            r#"
            println(!!0)
            println(!!1)
            println(!!"false")
            println(!!"true")
            println(!!"")
            println(!!nil)
            println(!!clock)
            "#,
            "false\ntrue\nfalse\ntrue\ntrue\nfalse\ntrue\n",
        );
    }

    #[test]
    fn test_logical_operators_yield_the_deciding_operand() {
        assert_output(
            r#"println(nil or "fallback") println(0 and "never") println(1 and 2)"#,
            "fallback\n0\n2\n",
        );
    }

    #[test]
    fn test_text_concatenation_and_repeat() {
        assert_output(
            r#"println("a" + 1) println(1 + "a") println("x" + 2.5) println("ab" * 3) println("s" + "t")"#,
            "a1\n1a\nx2.5\nababab\nst\n",
        );
    }

    #[test]
    fn test_repeat_count_must_be_a_whole_number() {
        assert_eq!(
            runtime_error(r#"println("ab" * 1.5)"#),
            "Repeat count must be a non-negative integer.\n[line 1] at '*'"
        );
    }

    #[test]
    fn test_repeat_result_size_is_capped() {
        assert_eq!(
            runtime_error(r#"println("ab" * 10000000000000000000)"#),
            "Repeat result is too large.\n[line 1] at '*'"
        );
        assert_eq!(
            runtime_error(r#"var big = "a" * 1000000000"#),
            "Repeat result is too large.\n[line 1] at '*'"
        );
        assert_output(r#"println("" * 1000000000)"#, "\n");
    }

    #[test]
    fn test_operand_type_errors() {
        assert_eq!(
            runtime_error(r#"println(-"x")"#),
            "Operand must be a number.\n[line 1] at '-'"
        );
        assert_eq!(
            runtime_error("println(true < 1)"),
            "Operands must be numbers.\n[line 1] at '<'"
        );
    }

    #[test]
    fn test_equality_never_coerces() {
        assert_output(
            r#"println(1 == 1) println(1 == "1") println(nil == nil) println(nil == false) println(clock == clock)"#,
            "true\nfalse\ntrue\nfalse\ntrue\n",
        );
    }

    #[test]
    fn test_ternary_requires_a_boolean() {
        assert_output(r#"println(1 < 2 ? "yes" : "no")"#, "yes\n");
        assert_eq!(
            runtime_error(r#"println(1 ? "yes" : "no")"#),
            "Ternary condition must be a boolean.\n[line 1] at '?'"
        );
    }

    #[test]
    fn test_comma_yields_last_operand() {
        assert_output("var x = (1, 2, 3) println(x)", "3\n");
    }

    #[test]
    fn test_chained_assignment() {
        assert_output(
            "var a a = b = c = 7 println(a) println(b) println(c)",
            "7\n7\n7\n",
        );
    }

    #[test]
    fn test_assignment_statement_declares_globals_from_any_scope() {
        assert_output(
            r#"
            fun setup() { total = 0 }
            setup()
            { total = total + 5 }
            println(total)
            "#,
            "5\n",
        );
    }

    #[test]
    fn test_chained_assignment_into_locals_and_fields() {
        assert_output(
            r#"
            class Box {}
            {
                var box = Box()
                var n
                n = box.value = "shared"
                println(n)
                println(box.value)
            }
            "#,
            "shared\nshared\n",
        );
    }

    #[test]
    fn test_shadowing_in_blocks() {
        assert_output(
            r#"
            var a = "outer"
            {
                var a = "inner"
                println(a)
            }
            println(a)
            "#,
            "inner\nouter\n",
        );
    }

    #[test]
    fn test_initializer_sees_the_outer_binding() {
        assert_output(
            r#"
            var a = "outer"
            {
                var a = a + "!"
                println(a)
            }
            "#,
            "outer!\n",
        );
    }

    #[test]
    fn test_closure_keeps_resolved_binding() {
        assert_output(
            r#"
            var a = "global"
            {
                fun show() { println(a) }
                show()
                var a = "block"
                show()
            }
            "#,
            "global\nglobal\n",
        );
    }

    #[test]
    fn test_closures_capture_their_frame() {
        assert_output(
            r#"
            fun counter() {
                var count = 0
                fun tick() {
                    count = count + 1
                    return count
                }
                return tick
            }

            var first = counter()
            var second = counter()
            println(first())
            println(first())
            println(second())
            "#,
            "1\n2\n1\n",
        );
    }

    #[test]
    fn test_closures_sharing_a_variable_see_each_other() {
        assert_output(
            r#"
            var get
            var set
            fun make() {
                var shared = "before"
                get = fun () { return shared }
                set = fun (v) { shared = v }
            }
            make()
            set("after")
            println(get())
            "#,
            "after\n",
        );
    }

    #[test]
    fn test_recursion() {
        assert_output(
            r#"
            fun fib(n) { if (n < 2) return n return fib(n - 1) + fib(n - 2) }
            println(fib(15))
            "#,
            "610\n",
        );
    }

    #[test]
    fn test_runaway_recursion_is_a_stack_overflow() {
        assert_eq!(
            runtime_error("fun f(n) { return f(n + 1) }\nf(0)"),
            "Stack overflow.\n[line 1] at ')'"
        );
    }

    #[test]
    fn test_deep_recursion_below_the_limit() {
        assert_output(
            r#"
            fun count(n) { if (n == 0) return 0 return 1 + count(n - 1) }
            println(count(900))
            println(count(900))
            "#,
            "900\n900\n",
        );
    }

    #[test]
    fn test_loop_control() {
        assert_output(
            "for (var i = 0; i < 5; i = i + 1) { if (i == 2) continue; if (i == 4) break; print(i) }",
            "013",
        );
    }

    #[test]
    fn test_while_with_break_and_continue() {
        assert_output(
            r#"
            var i = 0
            while (true) {
                i = i + 1
                if (i % 2 == 0) continue
                if (i > 7) break
                print(i)
            }
            "#,
            "1357",
        );
    }

    #[test]
    fn test_return_from_inside_a_loop() {
        assert_output(
            r#"
            fun find() {
                for (var i = 0; ; i = i + 1) {
                    while (true) { if (i == 3) return i break }
                }
            }
            println(find())
            "#,
            "3\n",
        );
    }

    #[test]
    fn test_function_values_display() {
        assert_output(
            "fun f() {} println(f) println(fun () {}) println(clock)",
            "<fn f>\n<fn>\n<native fn clock>\n",
        );
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            runtime_error("fun f(a, b) {} f(1)"),
            "Expected 2 arguments but got 1.\n[line 1] at ')'"
        );
    }

    #[test]
    fn test_calling_a_non_callable() {
        assert_eq!(
            runtime_error(r#""text"()"#),
            "Can only call functions and classes.\n[line 1] at ')'"
        );
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            runtime_error("println(missing)"),
            "Undefined variable 'missing'.\n[line 1] at 'missing'"
        );
        assert_eq!(
            runtime_error("(missing = 1)"),
            "Undefined variable 'missing'.\n[line 1] at 'missing'"
        );
    }

    #[test]
    fn test_source_must_be_utf8() {
        assert!(matches!(decode(b"println(\"\xff\")"), Err(LoxError::Utf8(_))));
        assert_eq!(decode("println(\"é\")".as_bytes()).ok(), Some("println(\"é\")"));
    }

    #[test]
    fn test_runtime_error_stops_the_program() {
        let run = run_captured("print(1)\nprint(nil + 1)\nprint(2)");

        assert_eq!(run.status, Status::RuntimeError);
        assert_eq!(run.output, "1");
        assert_eq!(run.errors[0].line(), Some(2));
    }

    #[test]
    fn test_parse_error_recovery_runs_the_good_statements() {
        let run = run_captured("println(\"first\")\nvar = 3\nprintln(\"second\")");

        assert_eq!(run.output, "first\nsecond\n");
        assert_eq!(run.errors.len(), 1);
        assert_eq!(run.status, Status::StaticError);
        assert_eq!(run.status.exit_code(), 65);
    }
}
