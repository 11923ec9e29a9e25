use treeshake_core::ast::Program;
use treeshake_core::{
    render_bundle, Bundle, HasEffectsContext, IncludeChildren, InclusionContext, NodeId, NodeKind,
    OutputOptions, TreeshakeOptions,
};
use treeshake_test_helpers::{bind_modules, shake};

fn entry_body(bundle: &Bundle) -> Vec<NodeId> {
    let module = bundle.module_by_name("main.js").unwrap();
    match bundle.kind(bundle.module(module).program) {
        NodeKind::Program(Program { body }) => body.clone(),
        other => panic!("expected a program, found {}", other.name()),
    }
}

#[test]
fn test_declaration_reached_when_init_has_effects() {
    let bundle = bind_modules(&[("main.js", "const x = sideEffect();\n")], TreeshakeOptions::default()).unwrap();
    let module = bundle.module_by_name("main.js").unwrap();
    let x = bundle.top_level_variable(module, "x").unwrap();
    assert!(!bundle.variable(x).is_declaration_reached());

    let body = entry_body(&bundle);
    assert!(bundle.has_effects(body[0], &mut HasEffectsContext::new()));
    assert!(bundle.variable(x).is_declaration_reached());
}

#[test]
fn test_include_is_idempotent() {
    let bundle = bind_modules(
        &[("main.js", "const a = 1, b = f();\nlog(a);\nexport default a;\n")],
        TreeshakeOptions::default(),
    )
    .unwrap();
    bundle.shake().unwrap();
    let first = render_bundle(&bundle, &OutputOptions::default()).unwrap();
    let included: Vec<bool> = entry_body(&bundle).iter().map(|&stmt| bundle.is_included(stmt)).collect();

    let mut ctx = InclusionContext::new();
    for (_, module) in bundle.modules() {
        bundle.include(module.program, &mut ctx, IncludeChildren::Needed);
    }
    let second = render_bundle(&bundle, &OutputOptions::default()).unwrap();
    assert_eq!(first.code, second.code);
    assert_eq!(
        entry_body(&bundle).iter().map(|&stmt| bundle.is_included(stmt)).collect::<Vec<_>>(),
        included
    );
}

#[test]
fn test_mutually_recursive_functions_reach_fixed_point() {
    let source = "function a() { return b(); }\nfunction b() { return a(); }\nexport const run = a;\n";
    assert_eq!(
        shake(source).unwrap(),
        "function a() { return b(); }\nfunction b() { return a(); }\nconst run = a;\n\nexport { run };\n"
    );
}

#[test]
fn test_export_reassigned_inside_function() {
    let source = "export let x;\nexport function reset() { x = 2; }\n";
    assert_eq!(
        shake(source).unwrap(),
        "let x = void 0;\nfunction reset() { x = 2; }\n\nexport { x, reset };\n"
    );
}

#[test]
fn test_deoptimized_path_stays_effectful() {
    let source = "const o = { a: { b: 1 } };\nmutate(o.a);\nconst read = o.a.b;\n";
    // `mutate` may replace `o.a.b` with a getter
    assert_eq!(
        shake(source).unwrap(),
        "const o = { a: { b: 1 } };\nmutate(o.a);\no.a.b;\n"
    );
}
