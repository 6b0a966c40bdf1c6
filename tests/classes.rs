#[cfg(test)]
mod class_tests {
    use loxwalk as lox;

    use lox::runner::{run_captured, Status};
    use pretty_assertions::assert_eq;

    fn assert_output(source: &str, expected: &str) {
        let run = run_captured(source);

        assert_eq!(run.errors.iter().map(ToString::to_string).collect::<Vec<_>>(), Vec::<String>::new());
        assert_eq!(run.status, Status::Ok);
        assert_eq!(run.output, expected);
    }

    fn runtime_error(source: &str) -> String {
        let run = run_captured(source);

        assert_eq!(run.status, Status::RuntimeError);
        assert_eq!(run.errors.len(), 1, "errors: {:?}", run.errors);

        run.errors[0].to_string()
    }

    #[test]
    fn test_fields_and_methods() {
        assert_output(
            r#"
            class Point {
                init(x, y) { this.x = x  this.y = y }
                sum() { return this.x + this.y }
            }
            var p = Point(3, 4)
            println(p.sum())
            p.x = 10
            println(p.sum())
            println(p)
            println(Point)
            "#,
            "7\n14\nPoint instance\nPoint\n",
        );
    }

    #[test]
    fn test_fields_shadow_methods() {
        assert_output(
            r#"
            class A { m() { return "method" } }
            var a = A()
            println(a.m())
            a.m = fun () { return "field" }
            println(a.m())
            "#,
            "method\nfield\n",
        );
    }

    #[test]
    fn test_bound_method_remembers_its_instance() {
        assert_output(
            r#"
            class Greeter {
                init(name) { this.name = name }
                greet() { println("hi " + this.name) }
            }
            var g = Greeter("ada").greet
            g()
            "#,
            "hi ada\n",
        );
    }

    #[test]
    fn test_super_dispatches_to_the_parent_with_this_bound() {
        assert_output(
            r#"
            class A {
                greet() { return "A greets " + this.name }
            }
            class B < A {
                init(name) { this.name = name }
                greet() { return "B, then " + super.greet() }
            }
            println(B("bee").greet())
            "#,
            "B, then A greets bee\n",
        );
    }

    #[test]
    fn test_super_skips_overrides_in_deeper_subclasses() {
        assert_output(
            r#"
            class A { who() { return "A" } }
            class B < A { who() { return "B>" + super.who() } }
            class C < B { who() { return "C>" + super.who() } }
            println(C().who())
            "#,
            "C>B>A\n",
        );
    }

    #[test]
    fn test_inherited_methods_and_initializer() {
        assert_output(
            r#"
            class Base { init(v) { this.v = v } get() { return this.v } }
            class Derived < Base {}
            println(Derived(5).get())
            "#,
            "5\n",
        );
    }

    #[test]
    fn test_initializer_always_yields_the_instance() {
        assert_output(
            r#"
            class C {
                init() {
                    this.ready = true
                    return 42
                }
            }
            var c = C()
            println(c)
            println(c.ready)
            println(c.init())
            "#,
            "C instance\ntrue\nC instance\n",
        );
    }

    #[test]
    fn test_class_arity_comes_from_init() {
        assert_eq!(
            runtime_error("class P { init(a) {} } P()"),
            "Expected 1 arguments but got 0.\n[line 1] at ')'"
        );
        assert_eq!(
            runtime_error("class Q {} Q(1)"),
            "Expected 0 arguments but got 1.\n[line 1] at ')'"
        );
    }

    #[test]
    fn test_undefined_property() {
        assert_eq!(
            runtime_error("class A {} println(A().nope)"),
            "Undefined property 'nope'.\n[line 1] at 'nope'"
        );
    }

    #[test]
    fn test_properties_on_non_instances() {
        assert_eq!(
            runtime_error("var n = 1 println(n.x)"),
            "Only instances have properties.\n[line 1] at 'x'"
        );
        assert_eq!(
            runtime_error("var n = 1 n.x = 2"),
            "Only instances have fields.\n[line 1] at 'x'"
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        assert_eq!(
            runtime_error("var NotAClass = 1 class A < NotAClass {}"),
            "Superclass must be a class.\n[line 1] at 'NotAClass'"
        );
    }

    #[test]
    fn test_missing_super_method_names_the_superclass() {
        assert_eq!(
            runtime_error("class A {} class B < A { m() { return super.m() } } B().m()"),
            "Undefined property 'm' on superclass 'A'.\n[line 1] at 'm'"
        );
    }

    #[test]
    fn test_instances_compare_by_identity() {
        assert_output(
            r#"
            class A {}
            var a = A()
            var b = a
            println(a == b)
            println(a == A())
            "#,
            "true\nfalse\n",
        );
    }

    #[test]
    fn test_methods_close_over_class_scope() {
        assert_output(
            r#"
            {
                var suffix = "!"
                class Shout { say(s) { return s + suffix } }
                println(Shout().say("hey"))
            }
            "#,
            "hey!\n",
        );
    }
}
