use indoc::indoc;
use treeshake_core::TreeshakeOptions;
use treeshake_test_helpers::fixtures;
use treeshake_test_helpers::{shake, shake_with};

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_unused_declarations_are_removed() {
    let output = shake(fixtures::unused_declarations()).unwrap();
    assert_eq!(
        output,
        indoc! {"
            const used = 1;
            function helper() { return used; }
            console.log(helper());
        "}
    );
}

#[test]
fn test_everything_unused_renders_nothing() {
    let output = shake("let x = 1;\nconst read = x;\nfunction f() {}\n").unwrap();
    assert_eq!(output, "");
}

#[test]
fn test_disabled_treeshake_keeps_everything() {
    let source = "const unused = 1;\nfunction dead() {}\n";
    let options = TreeshakeOptions {
        enabled: false,
        ..Default::default()
    };
    assert_eq!(shake_with(source, options).unwrap(), source);
}

#[test]
fn test_recursive_function_without_effects() {
    let output = shake("function loop() { loop(); }\nloop();\n").unwrap();
    assert_eq!(output, "");
}

#[test]
fn test_called_function_effects_follow_the_body() {
    let source = indoc! {"
        function pure(a) { return a + 1; }
        function impure() { sideEffect(); }
        const x = pure(1);
        const y = impure();
    "};
    assert_eq!(
        shake(source).unwrap(),
        indoc! {"
            function impure() { sideEffect(); }
            impure();
        "}
    );
}

// =============================================================================
// Variable declarators
// =============================================================================

#[test]
fn test_declarator_with_effect_is_split_out() {
    let output = shake(fixtures::mixed_declarators()).unwrap();
    assert_eq!(output, "var a = 1; sideEffect();\nconsole.log(a);\n");
}

#[test]
fn test_keyword_repeated_after_dropped_binding() {
    let output = shake("let a = f(), b = 2;\nlog(b);\n").unwrap();
    assert_eq!(output, "f(); let b = 2;\nlog(b);\n");
}

#[test]
fn test_leading_unused_declarator_is_dropped() {
    let output = shake("const unused = 1, kept = 2;\nlog(kept);\n").unwrap();
    assert_eq!(output, "const kept = 2;\nlog(kept);\n");
}

#[test]
fn test_gap_between_kept_declarators() {
    let output = shake("var a = 1, b = 2, c = 3;\nlog(a, c);\n").unwrap();
    assert_eq!(output, "var a = 1, c = 3;\nlog(a, c);\n");
}

#[test]
fn test_exported_let_without_init_gets_undefined() {
    let output = shake("export let x;\nx = 1;\n").unwrap();
    assert_eq!(output, "let x = void 0;\nx = 1;\n\nexport { x };\n");
}

#[test]
fn test_unused_binding_with_effectful_init() {
    let output = shake("let x = compute();\n").unwrap();
    assert_eq!(output, "compute();\n");
}

#[test]
fn test_conflicting_redeclaration_is_kept() {
    let output = shake("var a = 1;\nlet a = 2;\n").unwrap();
    assert_eq!(output, "var a = 1;\nlet a = 2;\n");
}

// =============================================================================
// Effects
// =============================================================================

#[test]
fn test_pure_annotations() {
    let output = shake(fixtures::pure_annotated_calls()).unwrap();
    assert_eq!(
        output,
        "create();\nconst c = /*#__PURE__*/ create();\n\nexport { c };\n"
    );
}

#[test]
fn test_pure_annotations_ignored_when_disabled() {
    let options = TreeshakeOptions {
        annotations: false,
        ..Default::default()
    };
    let output = shake_with(fixtures::pure_annotated_calls(), options).unwrap();
    assert_eq!(
        output,
        "/*#__PURE__*/ create();\ncreate();\nconst c = /*#__PURE__*/ create();\n\nexport { c };\n"
    );
}

#[test]
fn test_read_before_declaration_is_kept() {
    let output = shake("const read = x;\nlet x = 1;\n").unwrap();
    assert_eq!(output, "x;\nlet x = 1;\n");
}

#[test]
fn test_read_after_declaration_is_dropped() {
    let output = shake("let x = 1;\nconst read = x;\n").unwrap();
    assert_eq!(output, "");
}

#[test]
fn test_unknown_global_reads() {
    let source = "const t = unknownGlobal;\nconst m = Math;\n";
    assert_eq!(shake(source).unwrap(), "unknownGlobal;\n");

    let options = TreeshakeOptions {
        unknown_global_side_effects: false,
        ..Default::default()
    };
    assert_eq!(shake_with(source, options).unwrap(), "");
}

#[test]
fn test_property_reads_on_unknown_values() {
    let source = "let o;\nconst v = o.x;\n";
    assert_eq!(shake(source).unwrap(), "let o;\no.x;\n");

    let options = TreeshakeOptions {
        property_read_side_effects: false,
        ..Default::default()
    };
    assert_eq!(shake_with(source, options).unwrap(), "");
}

#[test]
fn test_reading_through_missing_property() {
    let source = indoc! {"
        const o = { a: 1 };
        const w = o.a;
        const v = o.b.c;
    "};
    assert_eq!(shake(source).unwrap(), "const o = { a: 1 };\no.b.c;\n");
}

#[test]
fn test_getter_read_is_an_effect() {
    let source = indoc! {"
        const g = { get x() { sideEffect(); return 1; } };
        const v = g.x;
    "};
    assert_eq!(
        shake(source).unwrap(),
        "const g = { get x() { sideEffect(); return 1; } };\ng.x;\n"
    );
}

#[test]
fn test_relational_operator_on_non_object() {
    let output = shake("const has = 'a' in {};\nconst bad = 'a' in 1;\n").unwrap();
    assert_eq!(output, "'a' in 1;\n");
}

#[test]
fn test_array_destructuring_of_unknown_iterable() {
    let source = indoc! {"
        const [a] = [1];
        let list = [];
        const [b] = list;
    "};
    assert_eq!(shake(source).unwrap(), "let list = [];\nconst [b] = list;\n");
}

#[test]
fn test_computed_pattern_key_with_effect() {
    let source = "const { [k()]: a } = {};\n";
    assert_eq!(shake(source).unwrap(), source);
}

#[test]
fn test_destructuring_through_getter_with_effect() {
    let source = "const { a } = { get a() { s(); } };\n";
    assert_eq!(shake(source).unwrap(), source);
}

// =============================================================================
// Object paths
// =============================================================================

#[test]
fn test_mutation_of_included_object_is_kept() {
    let output = shake(fixtures::object_mutation()).unwrap();
    assert_eq!(
        output,
        indoc! {"
            const obj = { a: 1, b: { c: 2 } };
            obj.b.c = 3;
            console.log(obj.a);
        "}
    );
}

#[test]
fn test_unused_class_is_removed() {
    let output = shake(fixtures::class_program()).unwrap();
    assert_eq!(
        output,
        indoc! {"
            class Used {
                static create() { return new Used(); }
            }
            const instance = Used.create();

            export { instance };
        "}
    );
}

#[test]
fn test_class_with_static_effect_is_kept() {
    let output = shake("class A { static x = sideEffect(); }\n").unwrap();
    assert_eq!(output, "class A { static x = sideEffect(); }\n");
}
