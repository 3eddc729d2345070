use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use toml::Value;

static NEXT_SPEC_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a declared slot.
///
/// Assigned once when a [`Spec`](crate::Spec) is constructed. Overrides and
/// input rewrites carry the id over to the replacement, so anything keyed on a
/// `SpecId` keeps pointing at the same logical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SpecId(u64);

impl SpecId {
    pub(crate) fn next() -> Self {
        SpecId(NEXT_SPEC_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Expected type of an input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Accepts any value.
    #[default]
    Any,
    Boolean,
    Integer,
    Float,
    String,
    Datetime,
    Array,
    Table,
}

impl InputType {
    /// The type a concrete value belongs to. Never returns [`InputType::Any`].
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Boolean(_) => InputType::Boolean,
            Value::Integer(_) => InputType::Integer,
            Value::Float(_) => InputType::Float,
            Value::String(_) => InputType::String,
            Value::Datetime(_) => InputType::Datetime,
            Value::Array(_) => InputType::Array,
            Value::Table(_) => InputType::Table,
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        self == InputType::Any || self == InputType::of(value)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputType::Any => "any",
            InputType::Boolean => "boolean",
            InputType::Integer => "integer",
            InputType::Float => "float",
            InputType::String => "string",
            InputType::Datetime => "datetime",
            InputType::Array => "array",
            InputType::Table => "table",
        };
        write!(f, "{name}")
    }
}

/// Default of an input spec.
///
/// `Required` is a marker, not a value: every TOML value (including an empty
/// string or an empty table) is a legitimate default.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputDefault {
    #[default]
    Required,
    Value(Value),
}

impl InputDefault {
    pub fn value(&self) -> Option<&Value> {
        match self {
            InputDefault::Required => None,
            InputDefault::Value(v) => Some(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_ids_are_unique_and_increasing() {
        let a = SpecId::next();
        let b = SpecId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn any_accepts_everything() {
        assert!(InputType::Any.accepts(&Value::Integer(1)));
        assert!(InputType::Any.accepts(&Value::Table(Default::default())));
    }

    #[test]
    fn integer_is_not_float() {
        assert!(!InputType::Float.accepts(&Value::Integer(1)));
        assert!(InputType::Float.accepts(&Value::Float(1.0)));
    }

    #[test]
    fn input_type_deserializes_lowercase() {
        let ty: InputType = toml::Value::String("table".into()).try_into().unwrap();
        assert_eq!(ty, InputType::Table);
    }

    #[test]
    fn empty_string_default_is_not_required() {
        let default = InputDefault::Value(Value::String(String::new()));
        assert_ne!(default, InputDefault::Required);
        assert_eq!(default.value().and_then(Value::as_str), Some(""));
    }
}
