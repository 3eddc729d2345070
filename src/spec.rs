//! Specs: the declared, not-yet-evaluated units a configuration is made of.
//!
//! Every spec carries a [`SpecId`]. The resolution engine recognizes three
//! special kinds ([`SpecKind::GlobalInput`], [`SpecKind::LocalInput`] and
//! [`SpecKind::Config`]) and rewrites them while loading. Everything else is a
//! value spec and is left for a downstream evaluator.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use toml::Value;

use crate::blueprint::Blueprint;
use crate::types::{InputDefault, InputType, SpecId};

/// Expected type and default of an input spec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Input {
    pub ty: InputType,
    pub default: InputDefault,
}

impl Input {
    /// A required input of the given type.
    pub fn of(ty: InputType) -> Self {
        Self {
            ty,
            default: InputDefault::Required,
        }
    }

    /// Use `value` when the input is not supplied.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = InputDefault::Value(value.into());
        self
    }
}

#[derive(Clone)]
pub enum SpecKind {
    /// Value supplied by the top-level caller.
    GlobalInput(Input),
    /// Value supplied by the blueprint that creates the owning config.
    LocalInput(Input),
    /// A nested configuration.
    Config(Blueprint),
    /// A plain value.
    Object(Value),
    /// Any other value spec. The payload is opaque here; evaluators downcast it.
    Deferred {
        label: Cow<'static, str>,
        payload: Arc<dyn Any + Send + Sync>,
    },
}

impl fmt::Debug for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecKind::GlobalInput(input) => f.debug_tuple("GlobalInput").field(input).finish(),
            SpecKind::LocalInput(input) => f.debug_tuple("LocalInput").field(input).finish(),
            SpecKind::Config(bp) => f.debug_tuple("Config").field(bp).finish(),
            SpecKind::Object(value) => f.debug_tuple("Object").field(value).finish(),
            SpecKind::Deferred { label, .. } => {
                f.debug_struct("Deferred").field("label", label).finish_non_exhaustive()
            }
        }
    }
}

/// A declared slot: an identity plus what the slot holds.
#[derive(Debug, Clone)]
pub struct Spec {
    id: SpecId,
    kind: SpecKind,
}

impl Spec {
    fn new(kind: SpecKind) -> Self {
        Self {
            id: SpecId::next(),
            kind,
        }
    }

    pub fn object(value: impl Into<Value>) -> Self {
        Self::new(SpecKind::Object(value.into()))
    }

    pub fn global_input(input: Input) -> Self {
        Self::new(SpecKind::GlobalInput(input))
    }

    pub fn local_input(input: Input) -> Self {
        Self::new(SpecKind::LocalInput(input))
    }

    pub fn config(blueprint: Blueprint) -> Self {
        Self::new(SpecKind::Config(blueprint))
    }

    /// A value spec this crate does not interpret, e.g. a lazily computed
    /// singleton. `label` is shown in listings.
    pub fn deferred<T: Any + Send + Sync>(label: impl Into<Cow<'static, str>>, payload: T) -> Self {
        Self::new(SpecKind::Deferred {
            label: label.into(),
            payload: Arc::new(payload),
        })
    }

    pub fn id(&self) -> SpecId {
        self.id
    }

    pub fn kind(&self) -> &SpecKind {
        &self.kind
    }

    /// Short name of the spec kind.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SpecKind::GlobalInput(_) => "global_input",
            SpecKind::LocalInput(_) => "local_input",
            SpecKind::Config(_) => "config",
            SpecKind::Object(_) => "object",
            SpecKind::Deferred { .. } => "deferred",
        }
    }

    /// The held value, for object specs.
    pub fn as_object(&self) -> Option<&Value> {
        match &self.kind {
            SpecKind::Object(value) => Some(value),
            _ => None,
        }
    }

    /// The payload of a deferred spec, if it is a `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        match &self.kind {
            SpecKind::Deferred { payload, .. } => payload.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Same slot identity, different contents.
    pub(crate) fn with_id(mut self, id: SpecId) -> Self {
        self.id = id;
        self
    }
}

/// The replacement written by [`ConfigGraph::set`](crate::ConfigGraph::set).
///
/// Plain values are wrapped in an object spec on write.
#[derive(Debug, Clone)]
pub enum Perturbation {
    Spec(Spec),
    Value(Value),
}

impl Perturbation {
    pub(crate) fn into_spec(self) -> Spec {
        match self {
            Perturbation::Spec(spec) => spec,
            Perturbation::Value(value) => Spec::object(value),
        }
    }
}

impl From<Spec> for Perturbation {
    fn from(spec: Spec) -> Self {
        Perturbation::Spec(spec)
    }
}

impl From<Value> for Perturbation {
    fn from(value: Value) -> Self {
        Perturbation::Value(value)
    }
}

macro_rules! perturbation_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Perturbation {
                fn from(value: $ty) -> Self {
                    Perturbation::Value(Value::from(value))
                }
            }
        )*
    };
}

perturbation_from_value!(bool, i32, i64, u32, f64, &str, String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_spec_gets_a_fresh_id() {
        let a = Spec::object(1);
        let b = Spec::object(1);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clone_keeps_identity() {
        let a = Spec::object("x");
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn input_builder_sets_default() {
        let input = Input::of(InputType::Integer).with_default(5);
        assert_eq!(input.default, InputDefault::Value(Value::Integer(5)));
        assert_eq!(Input::of(InputType::Integer).default, InputDefault::Required);
    }

    #[test]
    fn deferred_payload_downcasts() {
        #[derive(Debug, PartialEq)]
        struct Factory(&'static str);

        let spec = Spec::deferred("singleton", Factory("pool"));
        assert_eq!(spec.payload::<Factory>(), Some(&Factory("pool")));
        assert_eq!(spec.payload::<String>(), None);
        assert_eq!(spec.kind_name(), "deferred");
    }

    #[test]
    fn plain_values_wrap_into_objects() {
        let spec = Perturbation::from(42_i64).into_spec();
        assert_eq!(spec.as_object(), Some(&Value::Integer(42)));
    }
}
