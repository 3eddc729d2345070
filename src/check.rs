//! Type checking of supplied input values.

use toml::Value;

use crate::error::SpecfigError;
use crate::types::InputType;

/// Check that `value` matches `expected`.
///
/// `description` names what is being checked and leads the error message,
/// e.g. `"Global input 'port'"`.
pub fn check(value: &Value, expected: InputType, description: &str) -> Result<(), SpecfigError> {
    if expected.accepts(value) {
        return Ok(());
    }
    Err(SpecfigError::TypeMismatch {
        description: description.to_string(),
        expected: expected.to_string(),
        found: InputType::of(value).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_type_passes() {
        assert!(check(&Value::Integer(3), InputType::Integer, "x").is_ok());
        assert!(check(&Value::String("a".into()), InputType::Any, "x").is_ok());
    }

    #[test]
    fn mismatch_reports_both_types() {
        let err = check(&Value::String("3".into()), InputType::Integer, "Global input 'x'")
            .unwrap_err();
        match &err {
            SpecfigError::TypeMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "integer");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Global input 'x'"));
    }
}
