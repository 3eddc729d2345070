//! Global input values, assembled from layered sources.
//!
//! [`Inputs`] is what the caller hands to [`Blueprint::get`](crate::Blueprint::get).
//! It can be filled from explicit values, TOML text or files, prefixed
//! environment variables, or any `Serialize` struct. Layers are applied in call
//! order; each one is deep-merged on top of what is already there:
//!
//! ```text
//! .toml_file("base.toml")      lowest
//!        ↑ overridden by
//! .env("MYAPP", vars)
//!        ↑ overridden by
//! .set("port", 9000)           highest
//! ```
//!
//! Tables merge key by key; any other value replaces what was below it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::{Table, Value};

use crate::error::SpecfigError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: Table,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one input, replacing any earlier value for `key`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Merge a TOML document on top. `path` only labels parse errors.
    pub fn toml_str(self, path: impl Into<PathBuf>, content: &str) -> Result<Self, SpecfigError> {
        let table: Table = toml::from_str(content).map_err(|e| SpecfigError::ParseError {
            path: path.into(),
            source: e,
        })?;
        Ok(self.merge(table))
    }

    /// Merge a TOML file on top.
    pub fn toml_file(self, path: impl AsRef<Path>) -> Result<Self, SpecfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SpecfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.toml_str(path, &content)
    }

    /// Merge variables named `{prefix}__*` on top.
    ///
    /// `MYAPP__PORT=80` sets `port = 80`. Further `__` separators nest into
    /// tables (`MYAPP__DB__URL` sets `db = { url = ... }`). Names are lowercased.
    /// Values are parsed as bool, then integer, then float, then string.
    ///
    /// Takes an iterator so callers can pass `std::env::vars()` or synthetic data.
    /// Fails if one variable names a value and another nests below it
    /// (`MYAPP__DB=1` with `MYAPP__DB__URL=x`), since the outcome would depend
    /// on iteration order.
    pub fn env(
        self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, SpecfigError> {
        let needle = format!("{prefix}__");
        let mut table = Table::new();

        for (key, value) in vars {
            let Some(rest) = key.strip_prefix(&needle) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let segments: Vec<&str> = rest.split("__").collect();
            insert_nested(&mut table, &segments, parse_env_value(&value)).map_err(|path| {
                SpecfigError::InvalidInputs {
                    reason: format!("{key} conflicts with another variable at '{path}'"),
                }
            })?;
        }

        Ok(self.merge(table))
    }

    /// Merge the top-level fields of a serializable struct on top.
    ///
    /// `None` fields are skipped, so an all-optional CLI args struct only
    /// contributes what the user actually passed.
    pub fn serialized<S: Serialize>(self, source: &S) -> Result<Self, SpecfigError> {
        let value = Value::try_from(source).map_err(|e| SpecfigError::InvalidInputs {
            reason: e.to_string(),
        })?;
        match value {
            Value::Table(table) => Ok(self.merge(table)),
            other => Err(SpecfigError::InvalidInputs {
                reason: format!("expected a struct or map, got {}", other.type_str()),
            }),
        }
    }

    /// Deep-merge `overlay` on top of these inputs.
    pub fn merge(mut self, overlay: impl Into<Inputs>) -> Self {
        self.values = deep_merge(self.values, overlay.into().values);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Table> for Inputs {
    fn from(values: Table) -> Self {
        Self { values }
    }
}

impl From<BTreeMap<String, Value>> for Inputs {
    fn from(map: BTreeMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Inputs {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(Value::Table(below)), Value::Table(above)) => {
                Value::Table(deep_merge(below, above))
            }
            (_, above) => above,
        };
        base.insert(key, merged);
    }
    base
}

/// On a scalar/table conflict, returns the dotted path where it happened.
fn insert_nested(table: &mut Table, segments: &[&str], value: Value) -> Result<(), String> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(());
    };
    let key = first.to_lowercase();

    if rest.is_empty() {
        if matches!(table.get(&key), Some(Value::Table(_))) {
            return Err(key);
        }
        table.insert(key, value);
        return Ok(());
    }

    let sub = table
        .entry(key.as_str())
        .or_insert_with(|| Value::Table(Table::new()));
    match sub {
        Value::Table(sub_table) => {
            insert_nested(sub_table, rest, value).map_err(|path| format!("{key}.{path}"))
        }
        _ => Err(key),
    }
}

fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    // Require a dot so "inf" and "NaN" stay strings.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}
