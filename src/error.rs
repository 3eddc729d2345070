use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which side of a configuration supplies an input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputScope {
    /// Supplied by the caller of [`Blueprint::get`](crate::Blueprint::get).
    Global,
    /// Supplied by the blueprint that creates the owning config.
    Local,
}

impl fmt::Display for InputScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputScope::Global => write!(f, "Global"),
            InputScope::Local => write!(f, "Local"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SpecfigError {
    #[error("{scope} input not set: '{key}'")]
    InputNotSet { scope: InputScope, key: String },

    #[error("Provided extra global inputs not specified in configs: {}", .0.join(", "))]
    ExtraGlobalInputs(Vec<String>),

    #[error("Found global input collision: '{key}'")]
    GlobalInputCollision { key: String },

    #[error("Cannot perturb frozen config: key='{key}'")]
    Frozen { key: String },

    #[error("Cannot set child config: key='{key}'")]
    SetChildConfig { key: String },

    #[error("Cannot add new keys to a loaded config: key='{key}'")]
    NewKey { key: String },

    #[error("Invalid declaration '{key}' in {config}: {reason}")]
    Declaration {
        config: &'static str,
        key: String,
        reason: String,
    },

    #[error("{description}: expected {expected}, got {found}")]
    TypeMismatch {
        description: String,
        expected: String,
        found: String,
    },

    #[error("Key not found in {config}: '{key}'")]
    KeyNotFound { config: &'static str, key: String },

    #[error("'{key}' is a spec, not a child config")]
    NotAConfig { key: String },

    #[error("'{key}' is a child config, not a spec")]
    NotASpec { key: String },

    #[error("Cyclic config nesting: {}", .chain.join(" -> "))]
    CyclicConfig { chain: Vec<String> },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid inputs: {reason}")]
    InvalidInputs { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_not_set_names_scope_and_key() {
        let err = SpecfigError::InputNotSet {
            scope: InputScope::Local,
            key: "pool_size".into(),
        };
        assert_eq!(err.to_string(), "Local input not set: 'pool_size'");
    }

    #[test]
    fn extra_global_inputs_lists_every_key() {
        let err = SpecfigError::ExtraGlobalInputs(vec!["typo".into(), "stale".into()]);
        let msg = err.to_string();
        assert!(msg.contains("typo"));
        assert!(msg.contains("stale"));
    }

    #[test]
    fn cyclic_config_formats_chain() {
        let err = SpecfigError::CyclicConfig {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert!(err.to_string().ends_with("A -> B -> A"));
    }
}
