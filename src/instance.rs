//! Realized configuration instances and their load algorithm.
//!
//! An instance is built exactly once, from a blueprint, by [`ConfigLocator`].
//! Loading walks the configuration type's declarations in order and classifies
//! each slot:
//!
//! - global inputs are looked up in the session's global inputs,
//! - local inputs are looked up in the blueprint's local inputs,
//! - nested blueprints are realized through the locator and become children,
//! - everything else is kept as declared.
//!
//! Resolved inputs are rewritten into object specs that keep the input's
//! [`SpecId`]. After loading, the set of names is fixed: specs may be replaced
//! until the instance is frozen, children never.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use toml::Value;
use tracing::trace;

use crate::blueprint::{Blueprint, ConfigType, Declared};
use crate::check::check;
use crate::error::{InputScope, SpecfigError};
use crate::locator::{ConfigId, ConfigLocator};
use crate::spec::{Input, Perturbation, Spec, SpecKind};
use crate::types::SpecId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unloaded,
    Loaded,
    Frozen,
}

/// A named slot of one instance.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    Spec(&'a Spec),
    Child(ConfigId),
}

#[derive(Debug)]
pub struct ConfigInstance {
    config_type: ConfigType,
    /// spec id -> declared name
    keys: HashMap<SpecId, String>,
    specs: IndexMap<String, Spec>,
    child_configs: IndexMap<String, ConfigId>,
    /// global input name -> spec id, for inputs this instance declares itself
    global_inputs: IndexMap<String, SpecId>,
    state: State,
}

impl ConfigInstance {
    fn empty(config_type: ConfigType) -> Self {
        Self {
            config_type,
            keys: HashMap::new(),
            specs: IndexMap::new(),
            child_configs: IndexMap::new(),
            global_inputs: IndexMap::new(),
            state: State::Unloaded,
        }
    }

    pub(crate) fn load(
        blueprint: &Blueprint,
        locator: &mut ConfigLocator,
    ) -> Result<Self, SpecfigError> {
        let config_type = blueprint.config_type();
        let declarations = config_type.declarations();
        let mut instance = Self::empty(config_type);
        let mut seen = HashSet::new();

        for (name, declared) in declarations.iter() {
            let spec = match declared {
                Declared::Spec(spec) => spec,
                Declared::Partial(_) => {
                    trace!(config = config_type.name(), name, "skipping partial group");
                    continue;
                }
            };

            validate_name(config_type, name)?;
            if !seen.insert(name) {
                return Err(declaration_error(config_type, name, "declared more than once"));
            }

            instance.keys.insert(spec.id(), name.to_string());
            trace!(
                config = config_type.name(),
                name,
                kind = spec.kind_name(),
                id = %spec.id(),
                "loading slot"
            );

            match spec.kind() {
                SpecKind::GlobalInput(input) => {
                    instance.global_inputs.insert(name.to_string(), spec.id());
                    let supplied = locator.global_inputs().get(name);
                    let resolved =
                        process_input(name, spec.id(), input, supplied, InputScope::Global)?;
                    instance.specs.insert(name.to_string(), resolved);
                }
                SpecKind::LocalInput(input) => {
                    let supplied = blueprint.local_inputs().get(name);
                    let resolved =
                        process_input(name, spec.id(), input, supplied, InputScope::Local)?;
                    instance.specs.insert(name.to_string(), resolved);
                }
                SpecKind::Config(child) => {
                    let child_id = locator.realize(child)?;
                    instance.child_configs.insert(name.to_string(), child_id);
                }
                SpecKind::Object(_) | SpecKind::Deferred { .. } => {
                    instance.specs.insert(name.to_string(), spec.clone());
                }
            }
        }

        instance.state = State::Loaded;
        Ok(instance)
    }

    pub fn config_type(&self) -> ConfigType {
        self.config_type
    }

    pub fn is_loaded(&self) -> bool {
        self.state != State::Unloaded
    }

    pub fn is_frozen(&self) -> bool {
        self.state == State::Frozen
    }

    /// Look up a single (undotted) name. Children shadow specs.
    pub fn slot(&self, name: &str) -> Option<Slot<'_>> {
        if let Some(&child) = self.child_configs.get(name) {
            return Some(Slot::Child(child));
        }
        self.specs.get(name).map(Slot::Spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.child_configs.contains_key(name) || self.specs.contains_key(name)
    }

    /// Sorted spec and child names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .specs
            .keys()
            .chain(self.child_configs.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Specs in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = (&str, &Spec)> {
        self.specs.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Children in declaration order.
    pub fn child_configs(&self) -> impl Iterator<Item = (&str, ConfigId)> {
        self.child_configs.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Global inputs declared by this instance (not its children).
    pub fn global_inputs(&self) -> impl Iterator<Item = (&str, SpecId)> {
        self.global_inputs.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Declared name of the slot with the given id.
    pub fn key_of(&self, id: SpecId) -> Option<&str> {
        self.keys.get(&id).map(String::as_str)
    }

    /// Replace the spec under `name`, keeping its id.
    pub(crate) fn set(&mut self, name: &str, value: Perturbation) -> Result<SpecId, SpecfigError> {
        if self.is_frozen() {
            return Err(SpecfigError::Frozen { key: name.into() });
        }

        let Some(slot) = self.specs.get_mut(name) else {
            if self.child_configs.contains_key(name) {
                return Err(SpecfigError::SetChildConfig { key: name.into() });
            }
            return Err(SpecfigError::NewKey { key: name.into() });
        };

        let id = slot.id();
        *slot = value.into_spec().with_id(id);
        trace!(config = self.config_type.name(), name, %id, "perturbed spec");
        Ok(id)
    }

    /// Idempotent.
    pub(crate) fn freeze(&mut self) {
        self.state = State::Frozen;
    }
}

fn process_input(
    name: &str,
    id: SpecId,
    input: &Input,
    supplied: Option<&Value>,
    scope: InputScope,
) -> Result<Spec, SpecfigError> {
    let value = supplied
        .or_else(|| input.default.value())
        .ok_or_else(|| SpecfigError::InputNotSet {
            scope,
            key: name.to_string(),
        })?;

    check(value, input.ty, &format!("{scope} input '{name}'"))?;

    Ok(Spec::object(value.clone()).with_id(id))
}

fn validate_name(config_type: ConfigType, name: &str) -> Result<(), SpecfigError> {
    if name.is_empty() {
        return Err(declaration_error(config_type, name, "name is empty"));
    }
    if name.contains('.') {
        return Err(declaration_error(
            config_type,
            name,
            "name contains '.', which is reserved for nested paths",
        ));
    }
    Ok(())
}

fn declaration_error(config_type: ConfigType, name: &str, reason: &str) -> SpecfigError {
    SpecfigError::Declaration {
        config: config_type.name(),
        key: name.to_string(),
        reason: reason.to_string(),
    }
}
