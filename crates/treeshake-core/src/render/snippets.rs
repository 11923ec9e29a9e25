use crate::config::OutputOptions;
use crate::identifiers::{is_reserved_word, is_valid_identifier};

/// Formatting tokens for generated code.
#[derive(Debug, Clone)]
pub struct Snippets {
    /// Optional whitespace: `" "`, or empty in compact mode.
    pub space: &'static str,
    pub newline: &'static str,
    /// Emitted wherever an explicit `undefined` value is needed.
    pub undefined: &'static str,
    pub binding_keyword: &'static str,
    reserved_names_as_props: bool,
}

impl Snippets {
    pub fn new(options: &OutputOptions) -> Self {
        Snippets {
            space: if options.compact { "" } else { " " },
            newline: if options.compact { "" } else { "\n" },
            undefined: "void 0",
            binding_keyword: if options.generated_code.const_bindings {
                "const"
            } else {
                "var"
            },
            reserved_names_as_props: options.generated_code.reserved_names_as_props,
        }
    }

    /// `.name` where that is valid syntax, `["name"]` otherwise.
    pub fn property_access(&self, name: &str) -> String {
        if is_valid_identifier(name) && (self.reserved_names_as_props || !is_reserved_word(name)) {
            format!(".{name}")
        } else {
            let quoted = serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""));
            format!("[{quoted}]")
        }
    }

    /// `, ` between items of one declaration.
    pub fn list_separator(&self) -> String {
        format!(",{}", self.space)
    }

    /// `; ` between statements split out of one declaration.
    pub fn statement_separator(&self) -> String {
        format!(";{}", self.space)
    }
}

impl Default for Snippets {
    fn default() -> Self {
        Snippets::new(&OutputOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratedCodeOptions, GeneratedCodePreset};

    #[test]
    fn test_property_access() {
        let snippets = Snippets::default();
        assert_eq!(snippets.property_access("foo"), ".foo");
        assert_eq!(snippets.property_access("default"), ".default");
        assert_eq!(snippets.property_access("my-name"), "[\"my-name\"]");
    }

    #[test]
    fn test_reserved_names_quoted_for_es5() {
        let options = OutputOptions {
            compact: true,
            generated_code: GeneratedCodeOptions::from(GeneratedCodePreset::Es5),
        };
        let snippets = Snippets::new(&options);
        assert_eq!(snippets.property_access("default"), "[\"default\"]");
        assert_eq!(snippets.space, "");
        assert_eq!(snippets.statement_separator(), ";");
    }
}
