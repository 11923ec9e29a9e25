//! Test fixtures - module sources for tree-shaking tests

/// Programs with a mix of used and unused declarations
pub fn unused_declarations() -> &'static str {
    r#"const used = 1;
const unused = 2;
function helper() { return used; }
function dead() { return unused; }
console.log(helper());
"#
}

pub fn pure_annotated_calls() -> &'static str {
    r#"const a = /*#__PURE__*/ create();
const b = create();
export const c = /*#__PURE__*/ create();
"#
}

pub fn mixed_declarators() -> &'static str {
    r#"var a = 1, b = sideEffect(), c = 3;
console.log(a);
"#
}

/// Object property paths
pub fn object_mutation() -> &'static str {
    r#"const obj = { a: 1, b: { c: 2 } };
const other = { x: 1 };
obj.b.c = 3;
other.x = 2;
console.log(obj.a);
"#
}

pub fn class_program() -> &'static str {
    r#"class Unused {
    constructor() { log('init'); }
}
class Used {
    static create() { return new Used(); }
}
export const instance = Used.create();
"#
}

/// A two-module bundle: `library_math` is imported by `library_entry`
pub fn library_entry() -> &'static str {
    r#"import { add, unusedExport } from './math.js';
export const result = add(1, 2);
"#
}

pub fn library_math() -> &'static str {
    r#"export function add(a, b) { return a + b; }
export function unusedExport() { return 0; }
export const sideEffect = log('loaded');
"#
}
