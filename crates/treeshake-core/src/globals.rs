//! Built-in globals whose reads, and some of whose calls, never have effects.

use crate::path_tracker::PathKey;

const KNOWN_GLOBALS: &[&str] = &[
    "Array", "ArrayBuffer", "BigInt", "Boolean", "DataView", "Date", "Error", "EvalError",
    "Float32Array", "Float64Array", "Function", "Infinity", "Int8Array", "Int16Array",
    "Int32Array", "JSON", "Map", "Math", "NaN", "Number", "Object", "Promise", "Proxy",
    "RangeError", "ReferenceError", "Reflect", "RegExp", "Set", "String", "Symbol",
    "SyntaxError", "TypeError", "URIError", "Uint8Array", "Uint8ClampedArray", "Uint16Array",
    "Uint32Array", "WeakMap", "WeakSet", "console", "decodeURI", "decodeURIComponent",
    "encodeURI", "encodeURIComponent", "globalThis", "isFinite", "isNaN", "parseFloat",
    "parseInt", "undefined",
];

/// Calls that neither throw nor mutate anything reachable.
const PURE_CALLS: &[&[&str]] = &[
    &["Array", "isArray"],
    &["Array", "of"],
    &["Boolean"],
    &["Date", "now"],
    &["Math", "abs"],
    &["Math", "ceil"],
    &["Math", "floor"],
    &["Math", "max"],
    &["Math", "min"],
    &["Math", "pow"],
    &["Math", "random"],
    &["Math", "round"],
    &["Math", "sign"],
    &["Math", "sqrt"],
    &["Math", "trunc"],
    &["Number"],
    &["Number", "isFinite"],
    &["Number", "isInteger"],
    &["Number", "isNaN"],
    &["Object", "create"],
    &["Object", "freeze"],
    &["Object", "getPrototypeOf"],
    &["Object", "is"],
    &["Object", "isFrozen"],
    &["Object", "keys"],
    &["String"],
    &["String", "fromCharCode"],
    &["Symbol"],
    &["Symbol", "for"],
    &["isFinite"],
    &["isNaN"],
    &["parseFloat"],
    &["parseInt"],
];

/// Constructors that are pure when invoked with `new`.
const PURE_CONSTRUCTORS: &[&str] = &[
    "Array", "ArrayBuffer", "Date", "Error", "Map", "Object", "RangeError", "RegExp", "Set",
    "TypeError", "WeakMap", "WeakSet",
];

pub fn is_known_global(name: &str) -> bool {
    KNOWN_GLOBALS.contains(&name)
}

fn names<'p>(global: &'p str, path: &'p [PathKey]) -> Option<Vec<&'p str>> {
    std::iter::once(Some(global))
        .chain(path.iter().map(PathKey::as_name))
        .collect()
}

/// Whether reading `global.<path>` is effect-free.
pub fn is_pure_global_access(global: &str, path: &[PathKey]) -> bool {
    // one level below a known global is a plain (possibly undefined) property
    is_known_global(global) && path.len() <= 1
}

/// Whether calling `global.<path>(...)` is effect-free, given effect-free
/// arguments.
pub fn is_pure_global_call(global: &str, path: &[PathKey], is_new: bool) -> bool {
    let Some(names) = names(global, path) else {
        return false;
    };
    if is_new {
        return names.len() == 1 && PURE_CONSTRUCTORS.contains(&names[0]);
    }
    PURE_CALLS.iter().any(|pure| *pure == names.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_global_reads() {
        assert!(is_pure_global_access("Math", &[PathKey::named("PI")]));
        assert!(is_pure_global_access("undefined", &[]));
        assert!(!is_pure_global_access("Math", &[PathKey::named("a"), PathKey::named("b")]));
        assert!(!is_pure_global_access("document", &[]));
    }

    #[test]
    fn test_pure_calls() {
        assert!(is_pure_global_call("Math", &[PathKey::named("max")], false));
        assert!(is_pure_global_call("parseInt", &[], false));
        assert!(!is_pure_global_call("console", &[PathKey::named("log")], false));
        assert!(!is_pure_global_call("Math", &[PathKey::Unknown], false));
    }

    #[test]
    fn test_pure_constructors() {
        assert!(is_pure_global_call("Map", &[], true));
        assert!(!is_pure_global_call("Promise", &[], true));
        assert!(!is_pure_global_call("Map", &[], false));
    }
}
