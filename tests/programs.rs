use mojilang::error::{Error, RuntimeErrorKind};
use mojilang::run_with_io;
use pretty_assertions::assert_eq;

fn output_of(source: &str) -> String {
    output_with_input(source, "")
}

fn output_with_input(source: &str, input: &str) -> String {
    let mut output: Vec<u8> = Vec::new();
    if let Err(e) = run_with_io(source, &mut output, input.as_bytes()) {
        panic!("program failed: {}\n{}", e, source);
    }
    String::from_utf8(output).expect("output is utf-8")
}

fn error_of(source: &str) -> Error {
    let mut output: Vec<u8> = Vec::new();
    match run_with_io(source, &mut output, "".as_bytes()) {
        Ok(()) => panic!("program should have failed:\n{}", source),
        Err(e) => e,
    }
}

#[test]
fn countdown_loop() {
    let source = r#"
    🥸 i ✍️ 10;
    🔁(i ☝️ 0) {
        🗣️(i);
        i ✍️ i ➖ 1;
    }
    🗣️("Blast off!");
    "#;
    assert_eq!(
        output_of(source),
        "10.0\n9.0\n8.0\n7.0\n6.0\n5.0\n4.0\n3.0\n2.0\n1.0\nBlast off!\n"
    );
}

#[test]
fn loop_with_false_condition_never_runs() {
    let source = r#"
    🥸 i ✍️ 0;
    🔁(i ☝️ 0) {
        🗣️("This should not print.");
    }
    🗣️("Loop ended.");
    "#;
    assert_eq!(output_of(source), "Loop ended.\n");
}

#[test]
fn break_inside_conditional_leaves_loop() {
    let source = r#"
    🥸 i ✍️ 5;
    🔁(i ☝️ 0) {
        🗣️(i);
        🤔(i 🤝 3) {
            💥;
        }
        i ✍️ i ➖ 1;
    }
    🗣️("Loop exited.");
    "#;
    assert_eq!(output_of(source), "5.0\n4.0\n3.0\nLoop exited.\n");
}

#[test]
fn continue_skips_even_numbers() {
    let source = r#"
    🥸 i ✍️ 6;
    🔁(i ☝️ 0) {
        i ✍️ i ➖ 1;
        🤔(i 🍕 2 🤝 0) {
            🤓;
        }
        🗣️(i);
    }
    🗣️("Loop completed.");
    "#;
    assert_eq!(output_of(source), "5.0\n3.0\n1.0\nLoop completed.\n");
}

#[test]
fn function_results_in_expressions() {
    let source = r#"
    🛠 sum(🥸 num1, 🥸 num2) {
      🫡 num1 ➕ num2;
    }

    🗣️(👀sum(1, 2) ➕ 2);
    🗣️(👀sum(2, 3) ➕ 3);
    🗣️(6 ➕ 👀sum(1, 2));
    "#;
    assert_eq!(output_of(source), "5.0\n8.0\n9.0\n");
}

#[test]
fn multiple_functions_with_ascii_operators() {
    let source = r#"
    🛠️sum(🥸 num1, 🥸 num2) {
    🫡 num1 + num2;
    }

    🛠️isEqual(🥸 num1, 🥸 num2) {
    🫡 num1 == num2;
    }

    🥸 summed_numbers = 👀sum(3, 2);
    🗣️ summed_numbers;
    🥸 are_equal = 👀isEqual(summed_numbers, 5);
    🗣️ are_equal;
    "#;
    assert_eq!(output_of(source), "5.0\n😤\n");
}

#[test]
fn recursive_fibonacci() {
    let source = r#"
    🛠️ fib(🥸 n) {
        🤔 (n 👇 2) {
            🫡 n;
        }
        🫡 👀fib(n ➖ 1) ➕ 👀fib(n ➖ 2);
    }
    🗣️ 👀fib(10);
    "#;
    assert_eq!(output_of(source), "55.0\n");
}

#[test]
fn shadowing_inside_loop_iterations() {
    let source = r#"
    🥸 i ✍️ 5;
    🥸 shadow_var ✍️ 100;
    🔁(i ☝️ 0) {
        🥸 shadow_var ✍️ i ➕ 10;
        🗣️(shadow_var);
        i ✍️ i ➖ 1;
    }
    🗣️(shadow_var);
    "#;
    assert_eq!(
        output_of(source),
        "15.0\n14.0\n13.0\n12.0\n11.0\n100.0\n"
    );
}

#[test]
fn conditional_variable_does_not_escape() {
    let source = r#"
    🥸 x ✍️ 10;
    🤔(x 🤝 10) {
        🥸 if_var ✍️ x ➕ 20;
        🗣️(if_var);
    }
    🗣️(if_var);
    "#;
    match error_of(source) {
        Error::Runtime(e) => {
            assert_eq!(e.line, 7);
            assert_eq!(
                e.kind,
                RuntimeErrorKind::UndefinedVariable("if_var".to_string())
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn nested_conditionals_see_outer_frames() {
    let source = r#"
    🥸 x ✍️ 10;
    🤔(x 🤝 10) {
        🥸 y ✍️ x ➕ 5;
        🤔(y 🤝 15) {
            🥸 z ✍️ y ➕ 10 ➕ x;
            🤔(z 🤝 35) {
                🗣️(z);
            }
        }
    }
    "#;
    assert_eq!(output_of(source), "35.0\n");
}

#[test]
fn reassign_global_inside_loop() {
    let source = r#"
    🥸 global_var ✍️ 0;
    🥸 i ✍️ 3;
    🔁(i ☝️ 0) {
        global_var ✍️ global_var ➕ i;
        i ✍️ i ➖ 1;
    }
    🗣️(global_var);
    "#;
    assert_eq!(output_of(source), "6.0\n");
}

#[test]
fn nested_loop_scopes() {
    let source = r#"
    🥸 i ✍️ 2;
    🔁(i ☝️ 0) {
        🥸 inner_i ✍️ 5;
        🗣️(inner_i);
        🔁(inner_i ☝️ 0) {
            🥸 nested_var ✍️ inner_i ➕ i;
            🗣️(nested_var);
            inner_i ✍️ inner_i ➖ 1;
        }
        i ✍️ i ➖ 1;
    }
    "#;
    assert_eq!(
        output_of(source),
        "5.0\n7.0\n6.0\n5.0\n4.0\n3.0\n5.0\n6.0\n5.0\n4.0\n3.0\n2.0\n"
    );
}

#[test]
fn if_else_arms() {
    let program = |age: u32| {
        format!(
            r#"
    🥸 age ✍️ {};
    🤔(age ☝️ 21) {{
        🗣️("You can drink 😤!");
    }} 💅 {{
        🗣️("You can't drink 😔!");
    }}
    "#,
            age
        )
    };
    assert_eq!(output_of(&program(25)), "You can drink 😤!\n");
    assert_eq!(output_of(&program(20)), "You can't drink 😔!\n");
}

#[test]
fn if_without_else_prints_nothing() {
    let source = r#"
    🥸 age ✍️ 20;
    🤔(age ☝️ 21) {
        🗣️("You can drink 😤!");
    }
    "#;
    assert_eq!(output_of(source), "");
}

#[test]
fn elseif_picks_first_truthy_arm() {
    let source = r#"
    🥸 score ✍️ 72;
    🤔 (score ☝️🤝 90) {
        🗣️ "A";
    } 🙈 (score ☝️🤝 70) {
        🗣️ "C";
    } 🙈 (score ☝️🤝 50) {
        🗣️ "D";
    } 💅 {
        🗣️ "F";
    }
    "#;
    assert_eq!(output_of(source), "C\n");
}

#[test]
fn boolean_expressions() {
    let source = r#"
    🥸 isTrueAnd ✍️ 😤 and 😔;
    🗣️(isTrueAnd);
    🥸 isTrueOr ✍️ 😤 or 😔;
    🗣️(isTrueOr);
    🥸 isEquivalent ✍️ 4 🙅🤝 (8 ➗ 2) ✖️3;
    🗣️(isEquivalent);
    🥸 isGreater ✍️ 4 ☝️ (8 ➗ 2) ✖️3;
    🗣️(isGreater);
    🥸 isLess ✍️ 4 👇 (8 ➗ 2) ✖️3;
    🗣️(isLess);
    🥸 notIsLess ✍️ 🙅isLess;
    🗣️(notIsLess);
    "#;
    assert_eq!(output_of(source), "😔\n😤\n😤\n😔\n😤\n😔\n");
}

#[test]
fn reassignments() {
    let source = r#"
    🥸 x ✍️ 10;
    🗣️(x);
    x ✍️ 20;
    🗣️(x);
    x ✍️ x ➕ 10;
    🗣️(x);
    "#;
    assert_eq!(output_of(source), "10.0\n20.0\n30.0\n");
}

#[test]
fn reassignment_without_declaration() {
    let e = error_of("\n    x ✍️ 20;\n    ");
    assert_eq!(
        e.to_string(),
        "line 2, mojilang Runtime Error: Variable 'x' has not been declared yet."
    );
}

#[test]
fn missing_semicolon_is_a_syntax_error() {
    let e = error_of("\n    🥸 a ✍️ 10;\n    a ✍️ 20 \n    ");
    match e {
        Error::Syntax(e) => assert!(e
            .to_string()
            .contains("Expected ';' to terminate the statement.")),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn scan_errors_are_collected() {
    match error_of("🗣️ 1 $ 2;\n🗣️ \"open;") {
        Error::Scan(errors) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].line, 1);
            assert_eq!(errors[1].line, 2);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn string_concatenation_and_mixed_types() {
    assert_eq!(
        output_of("🥸 who ✍️ \"world\";\n🗣️ \"hello \" ➕ who;"),
        "hello world\n"
    );
    match error_of("🗣️ \"n = \" ➕ 1;") {
        Error::Runtime(e) => assert!(matches!(
            e.kind,
            RuntimeErrorKind::TypeMismatch { .. }
        )),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn input_feeds_program() {
    let source = r#"
    🥸 name ✍️ 🖊("Who? ");
    🗣️ "Hi " ➕ name;
    "#;
    assert_eq!(output_with_input(source, "Grace\n"), "Who? Hi Grace\n");
}

#[test]
fn comments_and_invisible_characters_are_ignored() {
    let source = "🧐 nothing here runs\n🥸\u{200B} x ✍️ 2; 🧐 trailing\n🗣️ x ✖\u{FE0F} 3;\n";
    assert_eq!(output_of(source), "6.0\n");
}

#[test]
fn side_effects_run_left_to_right() {
    let source = r#"
    🛠️ tag(🥸 v) {
        🗣️ v;
        🫡 v;
    }
    🛠️ pair(🥸 a, 🥸 b) {
        🫡 a ➖ b;
    }
    🗣️ 👀tag(1) ➕ 👀tag(2);
    🗣️ 👀pair(👀tag(1), 👀tag(2));
    "#;
    assert_eq!(output_of(source), "1.0\n2.0\n3.0\n1.0\n2.0\n-1.0\n");
}

#[test]
fn break_in_function_called_from_loop() {
    let source = "🛠️ stop() {\n💥;\n}\n🥸 i ✍️ 0;\n🔁 (i 👇 3) {\n🗣️ i;\n👀stop();\n}";
    let mut output: Vec<u8> = Vec::new();
    let result = run_with_io(source, &mut output, "".as_bytes());
    assert_eq!(String::from_utf8(output).expect("output is utf-8"), "0.0\n");
    match result {
        Err(Error::Runtime(e)) => {
            assert_eq!(e.line, 7);
            assert_eq!(e.kind, RuntimeErrorKind::BreakOutsideLoop);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn runaway_recursion_reports_the_call_line() {
    let e = error_of("🛠 up(🥸 n) {\n🫡 👀up(n ➕ 1);\n}\n🗣️ 👀up(0);");
    assert_eq!(
        e.to_string(),
        "line 2, mojilang Runtime Error: Maximum recursion depth of 1000 calls exceeded."
    );
}

#[test]
fn deeply_nested_groups_are_a_syntax_error() {
    let source = format!("🗣️ {}1{};", "(".repeat(200_000), ")".repeat(200_000));
    match error_of(&source) {
        Error::Syntax(e) => assert!(e.message.starts_with("Nesting exceeds the limit")),
        other => panic!("unexpected error: {}", other),
    }
}
