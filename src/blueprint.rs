//! Configuration types, their declarations, and blueprints.
//!
//! A configuration type is any `'static` type implementing [`Config`]. Its
//! [`declare`](Config::declare) function lists the type's slots once per
//! process; the resulting [`Declarations`] are cached so every instance of the
//! type shares the same [`SpecId`](crate::SpecId)s.
//!
//! A [`Blueprint`] is the *description* "build configuration type `C` with
//! these local inputs". Building one has no side effects: nothing is loaded,
//! no input is validated. Realization happens in [`Blueprint::get`], which
//! drives a [`ConfigLocator`] over the whole tree.

use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use toml::{Table, Value};
use tracing::debug;

use crate::error::SpecfigError;
use crate::graph::ConfigGraph;
use crate::inputs::Inputs;
use crate::locator::ConfigLocator;
use crate::spec::{Input, Spec};

/// A declarative configuration type.
///
/// ```ignore
/// struct ServerConfig;
///
/// impl Config for ServerConfig {
///     fn declare(decl: &mut Declarations) {
///         decl.global_input("port", Input::of(InputType::Integer))
///             .local_input("workers", Input::of(InputType::Integer).with_default(4))
///             .config("db", Blueprint::new::<DbConfig>().input("pool", 8));
///     }
/// }
/// ```
pub trait Config: 'static {
    fn declare(decl: &mut Declarations);
}

/// Runtime handle on a [`Config`] implementor. Compared by type identity.
#[derive(Clone, Copy)]
pub struct ConfigType {
    id: TypeId,
    name: &'static str,
    declare: fn(&mut Declarations),
}

impl ConfigType {
    pub fn of<C: Config>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
            declare: C::declare,
        }
    }

    /// Full type path of the configuration type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    pub(crate) fn declarations(&self) -> Arc<Declarations> {
        declarations_of(self)
    }
}

impl PartialEq for ConfigType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConfigType {}

impl Hash for ConfigType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One declared entry of a configuration type.
#[derive(Debug, Clone)]
pub enum Declared {
    Spec(Spec),
    /// Pre-bound keyword group for partial application. Not a slot: loading
    /// skips it without registering anything.
    Partial(Table),
}

/// Ordered registry of a configuration type's declared entries.
#[derive(Debug, Default)]
pub struct Declarations {
    entries: Vec<(String, Declared)>,
}

impl Declarations {
    pub fn spec(&mut self, name: impl Into<String>, spec: Spec) -> &mut Self {
        self.entries.push((name.into(), Declared::Spec(spec)));
        self
    }

    pub fn object(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.spec(name, Spec::object(value))
    }

    pub fn global_input(&mut self, name: impl Into<String>, input: Input) -> &mut Self {
        self.spec(name, Spec::global_input(input))
    }

    pub fn local_input(&mut self, name: impl Into<String>, input: Input) -> &mut Self {
        self.spec(name, Spec::local_input(input))
    }

    pub fn config(&mut self, name: impl Into<String>, blueprint: Blueprint) -> &mut Self {
        self.spec(name, Spec::config(blueprint))
    }

    pub fn partial(&mut self, name: impl Into<String>, kwargs: Table) -> &mut Self {
        self.entries.push((name.into(), Declared::Partial(kwargs)));
        self
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Declared)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static DECLARATIONS: LazyLock<RwLock<HashMap<TypeId, Arc<Declarations>>>> =
    LazyLock::new(Default::default);

/// Declarations for `ty`, built on first use.
///
/// `declare` runs outside the lock. If two threads race, the first insert wins
/// and the other result (with its fresh ids) is dropped.
fn declarations_of(ty: &ConfigType) -> Arc<Declarations> {
    if let Some(decl) = DECLARATIONS.read().get(&ty.id) {
        return Arc::clone(decl);
    }

    let mut decl = Declarations::default();
    (ty.declare)(&mut decl);
    debug!(config = ty.name, entries = decl.len(), "declared config type");

    Arc::clone(
        DECLARATIONS
            .write()
            .entry(ty.id)
            .or_insert_with(|| Arc::new(decl)),
    )
}

/// "Build configuration type `C` with these local inputs."
///
/// Blueprints are value-comparable: two blueprints are equal when they name the
/// same configuration type and carry equal local inputs. Within one resolution
/// session, equal blueprints realize to one shared instance.
#[derive(Clone)]
pub struct Blueprint {
    config_type: ConfigType,
    local_inputs: BTreeMap<String, Value>,
}

impl Blueprint {
    pub fn new<C: Config>() -> Self {
        Self {
            config_type: ConfigType::of::<C>(),
            local_inputs: BTreeMap::new(),
        }
    }

    /// Add a local input. A later value for the same key replaces the earlier one.
    pub fn input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.local_inputs.insert(key.into(), value.into());
        self
    }

    pub fn config_type(&self) -> ConfigType {
        self.config_type
    }

    pub fn local_inputs(&self) -> &BTreeMap<String, Value> {
        &self.local_inputs
    }

    /// Realize this blueprint with the given global inputs.
    ///
    /// Fails if a required input is missing, if an input has the wrong type,
    /// or if `inputs` contains a key that no config in the tree declares as a
    /// global input.
    pub fn get(&self, inputs: impl Into<Inputs>) -> Result<ConfigGraph, SpecfigError> {
        let inputs = inputs.into();
        debug!(
            config = self.config_type.name,
            global_inputs = inputs.len(),
            "resolving config"
        );

        let mut locator = ConfigLocator::new(inputs);
        let root = locator.realize(self)?;
        let graph = ConfigGraph::new(locator, root);

        let declared = graph.global_input_keys()?;
        let extra: Vec<String> = graph
            .global_inputs()
            .keys()
            .filter(|key| !declared.contains(key.as_str()))
            .cloned()
            .collect();
        if !extra.is_empty() {
            return Err(SpecfigError::ExtraGlobalInputs(extra));
        }

        Ok(graph)
    }
}

impl PartialEq for Blueprint {
    fn eq(&self, other: &Self) -> bool {
        self.config_type == other.config_type
            && self.local_inputs.len() == other.local_inputs.len()
            && self
                .local_inputs
                .iter()
                .zip(&other.local_inputs)
                .all(|((ka, va), (kb, vb))| ka == kb && same_value(va, vb))
    }
}

impl Eq for Blueprint {}

/// Total equality on input values: floats compare bitwise, so NaN equals
/// itself and `0.0` differs from `-0.0`.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Table(xs), Value::Table(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

impl Hash for Blueprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.config_type.hash(state);
        for key in self.local_inputs.keys() {
            key.hash(state);
        }
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("config", &self.config_type)
            .field("local_inputs", &self.local_inputs)
            .finish()
    }
}

impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config_type.short_name())?;
        if !self.local_inputs.is_empty() {
            let args: Vec<String> = self
                .local_inputs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}

/// Shorthand for [`Blueprint::new`].
pub fn blueprint<C: Config>() -> Blueprint {
    Blueprint::new::<C>()
}

/// Realize configuration type `C` with the given global inputs.
pub fn get_config<C: Config>(inputs: impl Into<Inputs>) -> Result<ConfigGraph, SpecfigError> {
    Blueprint::new::<C>().get(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{AppConfig, DbConfig, InputsConfig};
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(bp: &Blueprint) -> u64 {
        let mut h = DefaultHasher::new();
        bp.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equal_blueprints_hash_equal() {
        let a = Blueprint::new::<DbConfig>().input("pool", 8);
        let b = Blueprint::new::<DbConfig>().input("pool", 8);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn different_local_inputs_are_unequal() {
        let a = Blueprint::new::<DbConfig>().input("pool", 8);
        let b = Blueprint::new::<DbConfig>().input("pool", 9);
        assert_ne!(a, b);
    }

    #[test]
    fn nan_inputs_equal_themselves() {
        let a = Blueprint::new::<DbConfig>().input("ratio", f64::NAN);
        assert_eq!(a, a.clone());
        assert_eq!(hash_of(&a), hash_of(&a.clone()));
    }

    #[test]
    fn floats_inside_arrays_and_tables_compare_bitwise() {
        let mut table = toml::Table::new();
        table.insert("w".into(), Value::Float(f64::NAN));
        let a = Blueprint::new::<DbConfig>()
            .input("weights", vec![Value::Float(f64::NAN)])
            .input("opts", table);
        assert_eq!(a, a.clone());

        let zero = Blueprint::new::<DbConfig>().input("ratio", 0.0);
        let neg_zero = Blueprint::new::<DbConfig>().input("ratio", -0.0);
        assert_ne!(zero, neg_zero);
    }

    #[test]
    fn different_types_are_unequal() {
        assert_ne!(Blueprint::new::<DbConfig>(), Blueprint::new::<AppConfig>());
    }

    #[test]
    fn blueprint_construction_does_not_validate() {
        // Missing required inputs only surface at resolution time.
        let bp = blueprint::<InputsConfig>();
        assert!(bp.local_inputs().is_empty());
        assert!(bp.get(Inputs::new()).is_err());
    }

    #[test]
    fn declarations_are_built_once_per_type() {
        let a = ConfigType::of::<DbConfig>().declarations();
        let b = ConfigType::of::<DbConfig>().declarations();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn display_uses_short_name_and_inputs() {
        let bp = Blueprint::new::<DbConfig>().input("pool", 8);
        assert_eq!(bp.to_string(), "DbConfig(pool=8)");
    }
}
