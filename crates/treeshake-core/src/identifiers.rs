//! JavaScript identifier rules used when naming generated bindings.

const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally", "for",
    "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
    "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
    "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "with",
    "yield", "arguments", "NaN", "Infinity",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_alphanumeric()
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_part),
        _ => false,
    }
}

/// Turns an arbitrary string into a usable binding name.
pub fn make_legal(raw: &str) -> String {
    let mut legal: String = raw
        .chars()
        .map(|c| if is_identifier_part(c) { c } else { '_' })
        .collect();
    if legal.is_empty() || legal.starts_with(|c: char| c.is_ascii_digit()) || is_reserved_word(&legal) {
        legal.insert(0, '_');
    }
    legal
}

/// The binding name derived from a module id: `src/my-util.js` -> `my_util`.
pub fn module_binding_name(module_id: &str) -> String {
    let file = module_id.rsplit(['/', '\\']).next().unwrap_or(module_id);
    let stem = match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    };
    make_legal(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_valid_identifier("foo"));
        assert!(is_valid_identifier("$el"));
        assert!(is_valid_identifier("_1"));
        assert!(!is_valid_identifier("1a"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_make_legal() {
        assert_eq!(make_legal("my-util"), "my_util");
        assert_eq!(make_legal("2d"), "_2d");
        assert_eq!(make_legal("class"), "_class");
    }

    #[test]
    fn test_module_binding_name() {
        assert_eq!(module_binding_name("src/main.js"), "main");
        assert_eq!(module_binding_name("lib/my-util.mjs"), "my_util");
        assert_eq!(module_binding_name("index"), "index");
    }
}
