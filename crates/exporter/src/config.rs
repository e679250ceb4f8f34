use crate::encoding::TextEncoding;
use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Resolved export configuration.
///
/// `root` and `output_dir` are kept as written in the file; they are resolved
/// against the config file's directory by the export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub include: IncludeConfig,
    #[serde(default)]
    pub exclude: ExcludeConfig,
    pub bundle: BundleConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeConfig {
    pub dirs: Vec<String>,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeConfig {
    #[serde(default)]
    pub dirs: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    pub max_bytes: u64,
    #[serde(default)]
    pub encoding: TextEncoding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// 0 disables the per-file size limit.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub max_file_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub emit_summary: bool,
    #[serde(default)]
    pub emit_tree: bool,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Copy)]
enum Expect {
    String,
    Object,
    Array,
    Unsigned,
}

impl Expect {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Unsigned => value.is_u64(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Object => "an object",
            Self::Array => "a list",
            Self::Unsigned => "a non-negative integer",
        }
    }
}

const REQUIRED_KEYS: &[(&str, Expect)] = &[
    ("root", Expect::String),
    ("output_dir", Expect::String),
    ("include", Expect::Object),
    ("include.dirs", Expect::Array),
    ("include.extensions", Expect::Array),
    ("bundle", Expect::Object),
    ("bundle.max_bytes", Expect::Unsigned),
];

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

/// Collect every structural problem at once instead of failing on the first.
fn check_shape(value: &Value) -> Vec<String> {
    if !value.is_object() {
        return vec!["top level must be an object".to_string()];
    }

    let mut problems = Vec::new();
    for (key, expect) in REQUIRED_KEYS {
        match lookup(value, key) {
            None => {
                // A missing parent already explains its children.
                let parent_missing = key
                    .rsplit_once('.')
                    .is_some_and(|(parent, _)| lookup(value, parent).is_none());
                if !parent_missing {
                    problems.push(format!("missing required key `{key}`"));
                }
            }
            Some(found) if !expect.matches(found) => {
                problems.push(format!("`{key}` must be {}", expect.describe()));
            }
            Some(_) => {}
        }
    }

    match lookup(value, "bundle.encoding") {
        None => {}
        Some(Value::String(label)) if TextEncoding::from_label(label).is_some() => {}
        Some(Value::String(label)) => {
            problems.push(format!("unsupported `bundle.encoding` `{label}`"));
        }
        Some(_) => problems.push("`bundle.encoding` must be a string".to_string()),
    }

    problems
}

impl ExportConfig {
    /// Load from a JSON file, or TOML when the extension is `.toml`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&text, path)
        } else {
            Self::from_json_str(&text, path)
        }
    }

    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text).map_err(|err| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_value(value, origin)
    }

    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let parsed: toml::Value = toml::from_str(text).map_err(|err| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })?;
        let value = serde_json::to_value(parsed).map_err(|err| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_value(value, origin)
    }

    pub fn from_value(value: Value, origin: &Path) -> Result<Self, ConfigError> {
        let problems = check_shape(&value);
        if !problems.is_empty() {
            return Err(ConfigError::Invalid {
                path: origin.to_path_buf(),
                problems,
            });
        }

        serde_json::from_value(value).map_err(|err| ConfigError::Invalid {
            path: origin.to_path_buf(),
            problems: vec![err.to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn origin() -> &'static Path {
        Path::new("export_config.json")
    }

    fn minimal() -> Value {
        json!({
            "root": "..",
            "output_dir": "_export",
            "include": { "dirs": ["src"], "extensions": [".rs"] },
            "bundle": { "max_bytes": 1000 }
        })
    }

    #[test]
    fn applies_defaults_for_optional_sections() {
        let cfg = ExportConfig::from_value(minimal(), origin()).expect("valid config");
        assert_eq!(cfg.bundle.encoding, TextEncoding::Utf8);
        assert_eq!(cfg.limits.max_file_bytes, 0);
        assert_eq!(cfg.exclude, ExcludeConfig::default());
        assert_eq!(cfg.output, OutputConfig::default());
    }

    #[test]
    fn null_max_file_bytes_means_unlimited() {
        let mut value = minimal();
        value["limits"] = json!({ "max_file_bytes": null });
        let cfg = ExportConfig::from_value(value, origin()).unwrap();
        assert_eq!(cfg.limits.max_file_bytes, 0);
    }

    #[test]
    fn aggregates_every_missing_key() {
        let value = json!({
            "output_dir": "_export",
            "include": { "dirs": [] }
        });
        let err = ExportConfig::from_value(value, origin()).unwrap_err();
        let ConfigError::Invalid { problems, .. } = &err else {
            panic!("expected invalid config, got {err:?}");
        };
        assert_eq!(
            problems,
            &vec![
                "missing required key `root`".to_string(),
                "missing required key `include.extensions`".to_string(),
                "missing required key `bundle`".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_wrong_types_and_unknown_encoding() {
        let mut value = minimal();
        value["bundle"] = json!({ "max_bytes": -5, "encoding": "ebcdic" });
        let err = ExportConfig::from_value(value, origin()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("`bundle.max_bytes` must be a non-negative integer"));
        assert!(message.contains("unsupported `bundle.encoding` `ebcdic`"));
    }

    #[test]
    fn parses_toml_config() {
        let text = r#"
root = "."
output_dir = "out"

[include]
dirs = ["."]
extensions = [".py"]

[bundle]
max_bytes = 120
encoding = "Latin-1"

[output]
emit_tree = true
"#;
        let cfg = ExportConfig::from_toml_str(text, Path::new("export.toml")).unwrap();
        assert_eq!(cfg.bundle.encoding, TextEncoding::Latin1);
        assert!(cfg.output.emit_tree);
        assert!(!cfg.output.emit_summary);
    }

    #[test]
    fn serializes_resolved_encoding_label() {
        let mut value = minimal();
        value["bundle"]["encoding"] = json!("UTF8");
        let cfg = ExportConfig::from_value(value, origin()).unwrap();
        let out = serde_json::to_value(&cfg).unwrap();
        assert_eq!(out["bundle"]["encoding"], "utf-8");
        assert_eq!(out["limits"]["max_file_bytes"], 0);
    }
}
