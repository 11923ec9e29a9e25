use indoc::indoc;
use treeshake_core::config::{GeneratedCodeOptions, GeneratedCodePreset};
use treeshake_core::render::Snippets;
use treeshake_core::{render_bundle, Bundle, OutputOptions, ShakeConfig, ShakeError, TreeshakeOptions};
use treeshake_test_helpers::{bind_modules, fixtures, parse_module, shake_modules};

fn shake_bundle(modules: &[(&str, &str)]) -> String {
    shake_modules(modules, TreeshakeOptions::default(), &OutputOptions::default())
        .unwrap()
        .code
}

// =============================================================================
// Modules and names
// =============================================================================

#[test]
fn test_imports_resolve_across_modules() {
    let output = shake_bundle(&[
        ("math.js", fixtures::library_math()),
        ("main.js", fixtures::library_entry()),
    ]);
    insta::assert_snapshot!(output.trim_end(), @r"
    function add(a, b) { return a + b; }
    log('loaded');

    const result = add(1, 2);

    export { result };
    ");
}

#[test]
fn test_renamed_binding_keeps_class_name_in_sync() {
    let output = shake_bundle(&[
        ("dep.js", "export const Foo = 42;\n"),
        (
            "main.js",
            "import { Foo as bar } from './dep.js';\nlet Foo = class {};\nlog(Foo, bar);\n",
        ),
    ]);
    insta::assert_snapshot!(output.trim_end(), @r"
    const Foo = 42;

    let Foo$1 = class Foo$1 {};
    log(Foo$1, Foo);
    ");
}

#[test]
fn test_globals_are_never_claimed() {
    let output = shake_bundle(&[
        ("dep.js", "export const log = 1;\n"),
        ("main.js", "import { log as value } from './dep';\nlog(value);\n"),
    ]);
    assert_eq!(output, "const log$1 = 1;\n\nlog(log$1);\n");
}

#[test]
fn test_render_base_prefixes_references() {
    let bundle = bind_modules(&[("main.js", "let value = 1;\nlog(value);\n")], TreeshakeOptions::default()).unwrap();
    let module = bundle.module_by_name("main.js").unwrap();
    let value = bundle.top_level_variable(module, "value").unwrap();
    assert!(bundle.variable(value).set_render_base("ns"));
    assert!(!bundle.variable(value).set_render_base("other"));

    bundle.shake().unwrap();
    let output = render_bundle(&bundle, &OutputOptions::default()).unwrap();
    assert_eq!(output.code, "let value = 1;\nlog(ns.value);\n");

    // names that are not identifiers fall back to computed access
    let snippets = Snippets::default();
    assert_eq!(format!("ns{}", snippets.property_access("my-name")), r#"ns["my-name"]"#);
}

#[test]
fn test_side_effect_import_keeps_module_effects() {
    let output = shake_bundle(&[
        ("dep.js", "export default class { static x = sideEffect(); }\n"),
        ("main.js", "import './dep.js';\nlog(1);\n"),
    ]);
    assert_eq!(output, "(class { static x = sideEffect(); });\n\nlog(1);\n");
}

// =============================================================================
// Export default
// =============================================================================

#[test]
fn test_export_default_expression_binding() {
    let output = shake_bundle(&[("main.js", "export default 42;\n")]);
    assert_eq!(output, "var main = 42;\n\nexport { main as default };\n");
}

#[test]
fn test_export_default_with_const_bindings() {
    let output_options = OutputOptions {
        compact: false,
        generated_code: GeneratedCodeOptions::from(GeneratedCodePreset::Es2015),
    };
    let output = shake_modules(
        &[("main.js", "export default 42;\n")],
        TreeshakeOptions::default(),
        &output_options,
    )
    .unwrap();
    assert_eq!(output.code, "const main = 42;\n\nexport { main as default };\n");
}

#[test]
fn test_export_default_named_function() {
    let output = shake_bundle(&[("main.js", "export default function run() { return 1; }\n")]);
    assert_eq!(
        output,
        "function run() { return 1; }\n\nexport { run as default };\n"
    );
}

#[test]
fn test_compact_output() {
    let output = shake_modules(
        &[("main.js", "export default 42;\n")],
        TreeshakeOptions::default(),
        &OutputOptions {
            compact: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(output.code, "var main=42;\n\nexport{main as default};\n");
}

// =============================================================================
// Rendered modules
// =============================================================================

#[test]
fn test_position_map_points_into_source() {
    let output = shake_modules(
        &[("main.js", "const unused = 1;\nlog(2);\n")],
        TreeshakeOptions::default(),
        &OutputOptions::default(),
    )
    .unwrap();
    assert_eq!(output.code, "log(2);\n");

    let module = &output.bundle.modules[0];
    assert_eq!(module.id, "main.js");
    assert_eq!(module.offset, 0);
    assert_eq!(module.positions.original_offset(0), Some(18));
    assert_eq!(module.positions.original_offset(4), Some(22));
}

#[test]
fn test_module_offsets_in_bundle() {
    let output = shake_modules(
        &[("a.js", "log('a');\n"), ("main.js", "log('main');\n")],
        TreeshakeOptions::default(),
        &OutputOptions::default(),
    )
    .unwrap();
    assert_eq!(output.code, "log('a');\n\nlog('main');\n");
    let offsets: Vec<u32> = output.bundle.modules.iter().map(|m| m.offset).collect();
    assert_eq!(offsets, vec![0, 11]);
}

#[test]
fn test_stats_are_serializable() {
    let output = shake_modules(
        &[("main.js", fixtures::unused_declarations())],
        TreeshakeOptions::default(),
        &OutputOptions::default(),
    )
    .unwrap();
    let stats = output.stats;
    assert!(stats.passes >= 2);
    assert!(stats.included_nodes < stats.total_nodes);
    assert_eq!(stats.included_variables, 2);

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["passes"], stats.passes);
}

// =============================================================================
// Run order
// =============================================================================

#[test]
fn test_render_before_shake_is_an_error() {
    let bundle = bind_modules(&[("main.js", "log(1);")], TreeshakeOptions::default()).unwrap();
    let err = render_bundle(&bundle, &OutputOptions::default()).unwrap_err();
    assert_eq!(err, ShakeError::RenderBeforeFixedPoint);
}

#[test]
fn test_shake_before_bind_is_an_error() {
    let mut bundle = Bundle::new(TreeshakeOptions::default());
    parse_module(&mut bundle, "main.js", "log(1);", true).unwrap();
    assert_eq!(bundle.shake().unwrap_err(), ShakeError::Unbound);
}

#[test]
fn test_second_shake_is_a_no_op() {
    let bundle = bind_modules(&[("main.js", "log(1);")], TreeshakeOptions::default()).unwrap();
    let first = bundle.shake().unwrap();
    let second = bundle.shake().unwrap();
    assert!(first.passes > 0);
    assert_eq!(second.passes, 0);
    assert_eq!(first.included_nodes, second.included_nodes);
}

#[test]
fn test_config_drives_a_run() {
    let config = ShakeConfig::from_json(
        r#"{"treeshake": {"annotations": false}, "output": {"generatedCode": "es2015"}}"#,
    )
    .unwrap();
    let source = indoc! {"
        const a = /*#__PURE__*/ create();
        export default a;
    "};
    let output = shake_modules(&[("entry.js", source)], config.treeshake, &config.output).unwrap();
    assert_eq!(
        output.code,
        "const a = /*#__PURE__*/ create();\nconst entry = a;\n\nexport { entry as default };\n"
    );
}
