//! Source scanning used to place edits between tokens.
//!
//! These assume that inside the scanned region every `/` starts a comment,
//! which holds for the gaps between AST nodes they are applied to.

/// Offset of the first `search` at or after `start` that is not inside a
/// comment.
pub fn find_first_occurrence_outside_comment(code: &str, search: &str, start: usize) -> Option<usize> {
    let mut search_pos = find_from(code, search, start)?;
    let mut pos = start;
    loop {
        let slash = match find_from(code, "/", pos) {
            Some(slash) if slash < search_pos => slash,
            _ => return Some(search_pos),
        };
        let after_slash = code.as_bytes().get(slash + 1).copied();
        pos = if after_slash == Some(b'/') {
            find_from(code, "\n", slash + 2).map_or(code.len(), |nl| nl + 1)
        } else {
            find_from(code, "*/", slash + 2).map_or(code.len(), |end| end + 2)
        };
        if pos > search_pos {
            search_pos = find_from(code, search, pos)?;
        }
    }
}

fn find_from(code: &str, needle: &str, from: usize) -> Option<usize> {
    code.get(from..)?.find(needle).map(|i| i + from)
}

/// Offset of the first non-whitespace character at or after `index`, or the
/// end of the source.
pub fn find_non_whitespace(code: &str, index: usize) -> usize {
    code.get(index..)
        .and_then(|rest| rest.find(|c: char| !c.is_whitespace()))
        .map_or(code.len(), |i| i + index)
}

/// Where the slot of a statement starts, given the end of the previous one:
/// just after the first line break in the gap, or at the statement itself when
/// both share a line.
pub fn statement_boundary(code: &str, previous_end: usize, next_start: usize) -> usize {
    code.get(previous_end..next_start)
        .and_then(|gap| gap.find('\n'))
        .map_or(next_start, |nl| previous_end + nl + 1)
}

/// Whether an expression starting at `start` would parse as a declaration or
/// block if it began a statement.
pub fn starts_like_statement(code: &str, start: usize) -> bool {
    let rest = code.get(start..).unwrap_or_default();
    rest.starts_with('{')
        || starts_with_keyword(rest, "function")
        || starts_with_keyword(rest, "class")
        || rest
            .strip_prefix("async")
            .is_some_and(|tail| starts_with_keyword(tail.trim_start(), "function"))
}

fn starts_with_keyword(code: &str, keyword: &str) -> bool {
    code.strip_prefix(keyword).is_some_and(|tail| {
        !tail.starts_with(|c: char| c == '_' || c == '$' || c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_skips_comments() {
        let code = "x /* = */ // =\n = 1";
        assert_eq!(find_first_occurrence_outside_comment(code, "=", 1), Some(16));
        assert_eq!(find_first_occurrence_outside_comment("a = 1", "=", 0), Some(2));
        assert_eq!(find_first_occurrence_outside_comment("a /* = */", "=", 0), None);
    }

    #[test]
    fn test_find_non_whitespace() {
        assert_eq!(find_non_whitespace("=   f()", 1), 4);
        assert_eq!(find_non_whitespace("=   ", 1), 4);
    }

    #[test]
    fn test_statement_boundary() {
        let code = "a();\n  b();";
        assert_eq!(statement_boundary(code, 4, 7), 5);
        assert_eq!(statement_boundary("a(); b();", 4, 5), 5);
    }

    #[test]
    fn test_starts_like_statement() {
        assert!(starts_like_statement("{}", 0));
        assert!(starts_like_statement("x = class {}", 4));
        assert!(starts_like_statement("async function () {}", 0));
        assert!(!starts_like_statement("classic()", 0));
        assert!(!starts_like_statement("f()", 0));
    }
}
