use log::{debug, trace};
use serde_json::Value;
use thiserror::Error;

/// One include/exclude pattern.
///
/// Patterns arriving as JSON are plain strings; a string delimited by `/` on
/// both ends is treated as a regular expression, anything else as a glob.
/// Compilation happens when the filter is built, so an invalid pattern is a
/// construction-time error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPattern {
    Glob(String),
    Regex(String),
}

impl FilterPattern {
    /// Parse one pattern string, using `/.../` delimiters to mark a regex.
    pub fn parse(raw: &str) -> Self {
        if raw.len() > 1 && raw.starts_with('/') && raw.ends_with('/') {
            FilterPattern::Regex(raw[1..raw.len() - 1].to_string())
        } else {
            FilterPattern::Glob(raw.to_string())
        }
    }
}

/// Transform options, fixed at construction time.
///
/// `None` for include/exclude means "use the defaults"; an explicit empty
/// list is honored as-is. `imports` are extra module names merged with the
/// built-in `prop-types` target.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub include: Option<Vec<FilterPattern>>,
    pub exclude: Option<Vec<FilterPattern>>,
    pub imports: Vec<String>,
    pub source_map: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{component} | options.{field} | invalid type: expected {expected}")]
    InvalidType { component: String, field: String, expected: &'static str },

    #[error("{component} | options.{field} | unknown option")]
    UnknownOption { component: String, field: String },

    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("invalid regex pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

impl Options {
    /// Validate and convert a JSON options object.
    ///
    /// This is the single validation pass over caller-supplied configuration:
    /// it fails on the first violation and never partially applies anything.
    /// `component` names the embedding plugin/tool in error messages.
    pub fn from_json(component: &str, value: &Value) -> Result<Options, ConfigError> {
        debug!("Validating options for {}", component);
        let Some(object) = value.as_object() else {
            return Err(ConfigError::InvalidType {
                component: component.to_string(),
                field: "<root>".to_string(),
                expected: "object",
            });
        };

        let mut options = Options::default();
        for (key, entry) in object {
            trace!("Validating options.{}", key);
            match key.as_str() {
                "include" => options.include = Some(patterns_from_json(component, key, entry)?),
                "exclude" => options.exclude = Some(patterns_from_json(component, key, entry)?),
                "imports" => options.imports = strings_from_json(component, key, entry)?,
                "sourceMap" => {
                    options.source_map = entry.as_bool().ok_or_else(|| ConfigError::InvalidType {
                        component: component.to_string(),
                        field: key.clone(),
                        expected: "boolean",
                    })?;
                }
                _ => {
                    return Err(ConfigError::UnknownOption {
                        component: component.to_string(),
                        field: key.clone(),
                    });
                }
            }
        }

        Ok(options)
    }
}

/// A pattern option is a string or an array of strings, nothing else.
fn patterns_from_json(
    component: &str,
    field: &str,
    value: &Value,
) -> Result<Vec<FilterPattern>, ConfigError> {
    match value {
        Value::String(s) => Ok(vec![FilterPattern::parse(s)]),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                entry.as_str().map(FilterPattern::parse).ok_or_else(|| ConfigError::InvalidType {
                    component: component.to_string(),
                    field: field.to_string(),
                    expected: "string, or array of strings",
                })
            })
            .collect(),
        _ => Err(ConfigError::InvalidType {
            component: component.to_string(),
            field: field.to_string(),
            expected: "string, or array of strings",
        }),
    }
}

fn strings_from_json(component: &str, field: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    let invalid = || ConfigError::InvalidType {
        component: component.to_string(),
        field: field.to_string(),
        expected: "array of strings",
    };
    let entries = value.as_array().ok_or_else(invalid)?;
    entries.iter().map(|entry| entry.as_str().map(str::to_string).ok_or_else(invalid)).collect()
}
