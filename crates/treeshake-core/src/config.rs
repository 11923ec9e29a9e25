use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Invalid value \"{0}\" for option \"output.generatedCode\" - valid values are \"es2015\" and \"es5\". You can also supply an object for more fine-grained control."
    )]
    InvalidGeneratedCodePreset(String),

    #[error("Failed to parse options: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options that control how much code is removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeshakeOptions {
    /// Remove unused code at all (default: true). When disabled every
    /// statement is kept.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Honor `/*#__PURE__*/` call annotations (default: true)
    #[serde(default = "default_true")]
    pub annotations: bool,

    /// Treat property reads on unknown values as effects (default: true)
    #[serde(default = "default_true")]
    pub property_read_side_effects: bool,

    /// Treat reads of unknown global variables as effects (default: true)
    #[serde(default = "default_true")]
    pub unknown_global_side_effects: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TreeshakeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            annotations: true,
            property_read_side_effects: true,
            unknown_global_side_effects: true,
        }
    }
}

impl TreeshakeOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratedCodePreset {
    #[serde(rename = "es5")]
    Es5,
    #[serde(rename = "es2015")]
    Es2015,
}

impl GeneratedCodePreset {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "es5" => Ok(GeneratedCodePreset::Es5),
            "es2015" => Ok(GeneratedCodePreset::Es2015),
            other => Err(ConfigError::InvalidGeneratedCodePreset(other.to_string())),
        }
    }
}

/// Syntax features the renderer may use in code it generates itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCodeOptions {
    /// Use `const` for bindings introduced by rendering (default: false)
    #[serde(default)]
    pub const_bindings: bool,

    /// Render reserved words as plain `.name` property accesses (default: true)
    #[serde(default = "default_true")]
    pub reserved_names_as_props: bool,
}

impl Default for GeneratedCodeOptions {
    fn default() -> Self {
        Self {
            const_bindings: false,
            reserved_names_as_props: true,
        }
    }
}

impl From<GeneratedCodePreset> for GeneratedCodeOptions {
    fn from(preset: GeneratedCodePreset) -> Self {
        match preset {
            GeneratedCodePreset::Es5 => Self {
                const_bindings: false,
                reserved_names_as_props: false,
            },
            GeneratedCodePreset::Es2015 => Self {
                const_bindings: true,
                reserved_names_as_props: true,
            },
        }
    }
}

/// `generatedCode` accepts either a preset name or an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedCodeInput {
    Preset(String),
    Options {
        #[serde(default)]
        preset: Option<String>,
        #[serde(default, rename = "constBindings")]
        const_bindings: Option<bool>,
        #[serde(default, rename = "reservedNamesAsProps")]
        reserved_names_as_props: Option<bool>,
    },
}

impl GeneratedCodeInput {
    fn resolve(self) -> Result<GeneratedCodeOptions, ConfigError> {
        match self {
            GeneratedCodeInput::Preset(name) => Ok(GeneratedCodePreset::parse(&name)?.into()),
            GeneratedCodeInput::Options {
                preset,
                const_bindings,
                reserved_names_as_props,
            } => {
                let base = match preset {
                    Some(name) => GeneratedCodePreset::parse(&name)?.into(),
                    None => GeneratedCodeOptions::default(),
                };
                Ok(GeneratedCodeOptions {
                    const_bindings: const_bindings.unwrap_or(base.const_bindings),
                    reserved_names_as_props: reserved_names_as_props
                        .unwrap_or(base.reserved_names_as_props),
                })
            }
        }
    }
}

/// Options for rendering the shaken bundle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputOptions {
    /// Omit optional whitespace in generated code (default: false)
    pub compact: bool,

    pub generated_code: GeneratedCodeOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutputOptions {
    #[serde(default)]
    compact: bool,
    #[serde(default)]
    generated_code: Option<GeneratedCodeInput>,
}

impl RawOutputOptions {
    fn resolve(self) -> Result<OutputOptions, ConfigError> {
        let generated_code = match self.generated_code {
            Some(input) => input.resolve()?,
            None => GeneratedCodeOptions::default(),
        };
        Ok(OutputOptions {
            compact: self.compact,
            generated_code,
        })
    }
}

impl OutputOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<RawOutputOptions>(json)?.resolve()
    }
}

/// Everything a run can be configured with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShakeConfig {
    pub treeshake: TreeshakeOptions,
    pub output: OutputOptions,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawShakeConfig {
    #[serde(default)]
    treeshake: TreeshakeOptions,
    #[serde(default)]
    output: Option<RawOutputOptions>,
}

impl ShakeConfig {
    /// Parses `{ "treeshake": {...}, "output": {...} }`; both keys are optional.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawShakeConfig = serde_json::from_str(json)?;
        let output = match raw.output {
            Some(output) => output.resolve()?,
            None => OutputOptions::default(),
        };
        Ok(ShakeConfig {
            treeshake: raw.treeshake,
            output,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treeshake_defaults() {
        let options = TreeshakeOptions::from_json("{}").unwrap();
        assert_eq!(options, TreeshakeOptions::default());
        assert!(options.enabled);
        assert!(options.property_read_side_effects);
    }

    #[test]
    fn test_treeshake_camel_case_keys() {
        let options =
            TreeshakeOptions::from_json(r#"{"unknownGlobalSideEffects": false, "annotations": false}"#)
                .unwrap();
        assert!(!options.unknown_global_side_effects);
        assert!(!options.annotations);
        assert!(options.enabled);
    }

    #[test]
    fn test_generated_code_preset_string() {
        let options = OutputOptions::from_json(r#"{"generatedCode": "es2015"}"#).unwrap();
        assert!(options.generated_code.const_bindings);
        assert!(options.generated_code.reserved_names_as_props);

        let options = OutputOptions::from_json(r#"{"generatedCode": "es5"}"#).unwrap();
        assert!(!options.generated_code.reserved_names_as_props);
    }

    #[test]
    fn test_generated_code_object_overrides_preset() {
        let options = OutputOptions::from_json(
            r#"{"compact": true, "generatedCode": {"preset": "es5", "constBindings": true}}"#,
        )
        .unwrap();
        assert!(options.compact);
        assert!(options.generated_code.const_bindings);
        assert!(!options.generated_code.reserved_names_as_props);
    }

    #[test]
    fn test_shake_config_sections() {
        let config = ShakeConfig::from_json(
            r#"{"treeshake": {"propertyReadSideEffects": false}, "output": {"generatedCode": "es2015"}}"#,
        )
        .unwrap();
        assert!(!config.treeshake.property_read_side_effects);
        assert!(config.treeshake.enabled);
        assert!(config.output.generated_code.const_bindings);

        assert_eq!(ShakeConfig::from_json("{}").unwrap(), ShakeConfig::default());
        assert!(matches!(
            ShakeConfig::from_json(r#"{"treeshaking": {}}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_shake_config_missing_file() {
        let err = ShakeConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to read config file does/not/exist.json"));
    }

    #[test]
    fn test_invalid_preset_message() {
        let err = OutputOptions::from_json(r#"{"generatedCode": "es3"}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value \"es3\" for option \"output.generatedCode\" - valid values are \"es2015\" and \"es5\". You can also supply an object for more fine-grained control."
        );
    }
}
