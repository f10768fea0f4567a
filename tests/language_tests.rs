use minic::interpreter::Value;

type TestResult = Result<(), minic::Error>;

// Run a program with a captured output sink; returns main's value and
// everything the program printed.
fn run(code: &str) -> Result<(Value, String), minic::Error> {
    let mut buffer = Vec::new();
    let value = minic::execute(code, &mut buffer)?;
    let output = String::from_utf8(buffer).expect("program output should be utf-8");
    Ok((value, output))
}

#[test]
fn for_loop_sums_and_returns() -> TestResult {
    let code = "int main(){ int i=0; int s=0; for(i=0;i<5;i++){ s=s+i; } print(s); return s; }";
    let (value, output) = run(code)?;
    assert_eq!("10\n", output);
    assert_eq!(Value::Int(10), value);
    Ok(())
}

#[test]
fn function_call_prints_sum() -> TestResult {
    let code = "int add(int a,int b){ return a+b; } int main(){ print(add(2,3)); return 0; }";
    let (value, output) = run(code)?;
    assert_eq!("5\n", output);
    assert_eq!(Value::Int(0), value);
    Ok(())
}

#[test]
fn postfix_increment_yields_old_value() -> TestResult {
    let code = "\
        int main() {\n\
            int x = 5;\n\
            print(x++);\n\
            print(x);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("5\n6\n", output);
    Ok(())
}

#[test]
fn prefix_increment_yields_new_value() -> TestResult {
    let code = "\
        int main() {\n\
            int x = 5;\n\
            print(++x);\n\
            print(x);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("6\n6\n", output);
    Ok(())
}

#[test]
fn decrement_works_both_ways() -> TestResult {
    let code = "\
        int main() {\n\
            int x = 5;\n\
            print(x--);\n\
            print(--x);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("5\n3\n", output);
    Ok(())
}

#[test]
fn increment_steps_floats_by_one() -> TestResult {
    let code = "int main() { float f = 1.5; f++; print(f); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("2.5\n", output);
    Ok(())
}

#[test]
fn array_assignment_within_bounds() -> TestResult {
    let code = "int main() { int a[3]; a[2] = 1; print(a[2]); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("1\n", output);
    Ok(())
}

#[test]
fn array_elements_default_to_zero() -> TestResult {
    let code = "int main() { int a[3]; print(a[0]); print(a[1]); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("0\n0\n", output);
    Ok(())
}

#[test]
fn array_element_increment() -> TestResult {
    let code = "\
        int main() {\n\
            int a[3];\n\
            a[0] = 5;\n\
            print(a[0]++);\n\
            print(a[0]);\n\
            print(++a[1]);\n\
            a[2]++;\n\
            print(a[2]);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("5\n6\n1\n1\n", output);
    Ok(())
}

#[test]
fn multi_dimension_arrays() -> TestResult {
    let code = "\
        int main() {\n\
            int grid[2][3];\n\
            grid[0][0] = 1;\n\
            grid[1][2] = 5;\n\
            print(grid[1][2]);\n\
            print(grid[0][1]);\n\
            grid[1][2]++;\n\
            print(grid[1][2]);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("5\n0\n6\n", output);
    Ok(())
}

#[test]
fn integer_division_truncates_toward_zero() -> TestResult {
    let code = "int main() { print(7/2); print(-7/2); print(7.0/2); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("3\n-3\n3.5\n", output);
    Ok(())
}

#[test]
fn numeric_promotion_in_arithmetic() -> TestResult {
    let code = "int main() { print(2 + 3); print(2 + 0.5); print(2 * 3); print(1.5 * 2); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("5\n2.5\n6\n3\n", output);
    Ok(())
}

#[test]
fn comparisons_normalize_to_one_or_zero() -> TestResult {
    let code = "\
        int main() {\n\
            print(3 > 2);\n\
            print(2 > 3);\n\
            print(5 == 5);\n\
            print(5 != 5);\n\
            print(2 <= 2);\n\
            print(1 && 0);\n\
            print(0 || 1);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("1\n0\n1\n0\n1\n0\n1\n", output);
    Ok(())
}

#[test]
fn call_isolation_leaves_caller_untouched() -> TestResult {
    let code = "\
        int bump(int n) {\n\
            n = n + 1;\n\
            return n;\n\
        }\n\
        int main() {\n\
            int n = 1;\n\
            bump(n);\n\
            print(n);\n\
            n = bump(n);\n\
            print(n);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("1\n2\n", output);
    Ok(())
}

#[test]
fn zero_iteration_for_loop() -> TestResult {
    let code = "int main() { int i = 0; int c = 0; for(i=9;i<5;i++){ c = c + 1; } print(c); return c; }";
    let (value, output) = run(code)?;
    assert_eq!("0\n", output);
    assert_eq!(Value::Int(0), value);
    Ok(())
}

#[test]
fn while_loop_with_break() -> TestResult {
    let code = "\
        int main() {\n\
            int i = 0;\n\
            while (1) {\n\
                i++;\n\
                if (i == 5) { break; }\n\
            }\n\
            print(i);\n\
            return i;\n\
        }";
    let (value, output) = run(code)?;
    assert_eq!("5\n", output);
    assert_eq!(Value::Int(5), value);
    Ok(())
}

#[test]
fn continue_still_runs_for_update() -> TestResult {
    // sums the odd numbers below ten
    let code = "\
        int main() {\n\
            int s = 0;\n\
            for (int i = 0; i < 10; i++) {\n\
                if (i / 2 * 2 == i) { continue; }\n\
                s = s + i;\n\
            }\n\
            print(s);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("25\n", output);
    Ok(())
}

#[test]
fn break_exits_nearest_loop_only() -> TestResult {
    let code = "\
        int main() {\n\
            int total = 0;\n\
            int i = 0;\n\
            int j = 0;\n\
            for (i = 0; i < 3; i++) {\n\
                for (j = 0; j < 10; j++) {\n\
                    if (j == 2) { break; }\n\
                    total = total + 1;\n\
                }\n\
            }\n\
            print(total);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("6\n", output);
    Ok(())
}

#[test]
fn else_if_chain_selects_one_branch() -> TestResult {
    let code = "\
        int grade(int s) {\n\
            if (s >= 90) { return 4; }\n\
            else if (s >= 80) { return 3; }\n\
            else if (s >= 70) { return 2; }\n\
            else { return 1; }\n\
        }\n\
        int main() {\n\
            print(grade(95));\n\
            print(grade(85));\n\
            print(grade(75));\n\
            print(grade(10));\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("4\n3\n2\n1\n", output);
    Ok(())
}

#[test]
fn switch_breaks_falls_through_and_defaults() -> TestResult {
    let code = "\
        int classify(int x) {\n\
            int r = 0;\n\
            switch (x) {\n\
                case 1:\n\
                    r = 10;\n\
                    break;\n\
                case 2:\n\
                    r = 20;\n\
                case 3:\n\
                    r = r + 3;\n\
                    break;\n\
                default:\n\
                    r = 99;\n\
            }\n\
            return r;\n\
        }\n\
        int main() {\n\
            print(classify(1));\n\
            print(classify(2));\n\
            print(classify(3));\n\
            print(classify(7));\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("10\n23\n3\n99\n", output);
    Ok(())
}

#[test]
fn switch_falls_through_into_default() -> TestResult {
    let code = "\
        int main() {\n\
            int r = 0;\n\
            switch (1) {\n\
                case 1:\n\
                    r = 1;\n\
                default:\n\
                    r = r + 100;\n\
            }\n\
            print(r);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("101\n", output);
    Ok(())
}

#[test]
fn break_in_switch_stays_in_loop() -> TestResult {
    let code = "\
        int main() {\n\
            int i = 0;\n\
            int hits = 0;\n\
            for (i = 0; i < 3; i++) {\n\
                switch (i) {\n\
                    case 0:\n\
                        hits = hits + 1;\n\
                        break;\n\
                    case 1:\n\
                        hits = hits + 10;\n\
                        break;\n\
                }\n\
            }\n\
            print(hits);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("11\n", output);
    Ok(())
}

#[test]
fn return_unwinds_nested_blocks() -> TestResult {
    let code = "\
        int find(int limit) {\n\
            int i = 0;\n\
            while (1) {\n\
                if (i == limit) { return i; }\n\
                i++;\n\
            }\n\
        }\n\
        int main() { print(find(4)); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("4\n", output);
    Ok(())
}

#[test]
fn recursive_factorial() -> TestResult {
    let code = "\
        int fact(int n) {\n\
            if (n <= 1) { return 1; }\n\
            return n * fact(n - 1);\n\
        }\n\
        int main() { print(fact(10)); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("3628800\n", output);
    Ok(())
}

#[test]
fn recursive_fibonacci() -> TestResult {
    let code = "\
        int fib(int n) {\n\
            if (n < 2) { return n; }\n\
            return fib(n - 1) + fib(n - 2);\n\
        }\n\
        int main() { print(fib(10)); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("55\n", output);
    Ok(())
}

#[test]
fn declarations_default_to_zero_values() -> TestResult {
    let code = "\
        int main() {\n\
            int i;\n\
            float f;\n\
            bool b;\n\
            string s;\n\
            print(i);\n\
            print(f);\n\
            print(b);\n\
            print(s == \"\");\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("0\n0\nfalse\n1\n", output);
    Ok(())
}

#[test]
fn string_concatenation_and_comparison() -> TestResult {
    let code = "\
        string greet(string who) { return \"Hello, \" + who; }\n\
        int main() {\n\
            string s = greet(\"world\");\n\
            print(s);\n\
            print(s == \"Hello, world\");\n\
            print(\"abc\" < \"abd\");\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("Hello, world\n1\n1\n", output);
    Ok(())
}

#[test]
fn char_literals_compare_and_print() -> TestResult {
    let code = "\
        int main() {\n\
            char c = 'A';\n\
            print(c);\n\
            print(c == 'A');\n\
            print(c < 'B');\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("A\n1\n1\n", output);
    Ok(())
}

#[test]
fn escape_sequences_stay_verbatim() -> TestResult {
    let code = r#"int main() { print("a\nb"); return 0; }"#;
    let (_, output) = run(code)?;
    assert_eq!("a\\nb\n", output);
    Ok(())
}

#[test]
fn unary_minus_negates_numbers() -> TestResult {
    let code = "int main() { int x = -5; print(-x); print(x + 10); print(-1.5); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("5\n5\n-1.5\n", output);
    Ok(())
}

#[test]
fn main_without_return_yields_void() -> TestResult {
    let code = "int main() { print(1); }";
    let (value, output) = run(code)?;
    assert_eq!("1\n", output);
    assert_eq!(Value::Void, value);
    Ok(())
}

#[test]
fn truthiness_is_nonzero_nonempty() -> TestResult {
    let code = "\
        int main() {\n\
            int hits = 0;\n\
            if (3) { hits = hits + 1; }\n\
            if (0.0) { hits = hits + 10; }\n\
            if (\"x\") { hits = hits + 100; }\n\
            if (\"\") { hits = hits + 1000; }\n\
            print(hits);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("101\n", output);
    Ok(())
}

#[test]
fn booleans_count_as_numbers() -> TestResult {
    let code = "int main() { print(true + 1); print(true == 1); print(false); return 0; }";
    let (_, output) = run(code)?;
    assert_eq!("2\n1\nfalse\n", output);
    Ok(())
}

#[test]
fn print_order_is_program_order() -> TestResult {
    let code = "\
        int side(int n) { print(n); return n; }\n\
        int main() {\n\
            int a = side(1) + side(2);\n\
            print(a);\n\
            return 0;\n\
        }";
    let (_, output) = run(code)?;
    assert_eq!("1\n2\n3\n", output);
    Ok(())
}
