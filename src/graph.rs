//! The realized configuration graph of one resolution session.
//!
//! [`ConfigGraph`] owns every instance the session realized and exposes the
//! root through dotted-path access: `graph.get("db.pool")` walks the `db`
//! child and reads its `pool` spec. Reads go through [`ConfigView`], a cheap
//! borrowed handle on one instance. Writes go through the graph itself, since
//! a shared child may be reachable from several parents.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use tracing::debug;

use crate::blueprint::ConfigType;
use crate::error::SpecfigError;
use crate::inputs::Inputs;
use crate::instance::{ConfigInstance, Slot};
use crate::locator::{ConfigId, ConfigLocator};
use crate::ops::{self, Listing};
use crate::spec::{Perturbation, Spec};
use crate::types::SpecId;

/// What a path resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Spec(&'a Spec),
    Config(ConfigView<'a>),
}

impl<'a> Entry<'a> {
    pub fn as_spec(&self) -> Option<&'a Spec> {
        match self {
            Entry::Spec(spec) => Some(*spec),
            Entry::Config(_) => None,
        }
    }

    pub fn as_config(&self) -> Option<ConfigView<'a>> {
        match self {
            Entry::Spec(_) => None,
            Entry::Config(view) => Some(*view),
        }
    }
}

#[derive(Debug)]
pub struct ConfigGraph {
    locator: ConfigLocator,
    root: ConfigId,
}

impl ConfigGraph {
    pub(crate) fn new(locator: ConfigLocator, root: ConfigId) -> Self {
        Self { locator, root }
    }

    pub fn root_id(&self) -> ConfigId {
        self.root
    }

    pub fn root(&self) -> ConfigView<'_> {
        ConfigView {
            graph: self,
            id: self.root,
        }
    }

    /// View on any instance of this session.
    pub fn view(&self, id: ConfigId) -> Option<ConfigView<'_>> {
        self.locator.get(id).map(|_| ConfigView { graph: self, id })
    }

    pub fn instance(&self, id: ConfigId) -> Option<&ConfigInstance> {
        self.locator.get(id)
    }

    /// Number of distinct instances in the graph. Shared children count once.
    pub fn len(&self) -> usize {
        self.locator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locator.is_empty()
    }

    /// The global inputs the session was resolved with.
    pub fn global_inputs(&self) -> &Inputs {
        self.locator.global_inputs()
    }

    pub fn get(&self, path: &str) -> Result<Entry<'_>, SpecfigError> {
        self.root().get(path)
    }

    pub fn spec(&self, path: &str) -> Result<&Spec, SpecfigError> {
        self.root().spec(path)
    }

    pub fn child(&self, path: &str) -> Result<ConfigView<'_>, SpecfigError> {
        self.root().child(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.root().contains(path)
    }

    pub fn names(&self) -> Vec<&str> {
        self.root().names()
    }

    /// Replace the spec at `path` before the owning instance is frozen.
    ///
    /// Plain values are wrapped in an object spec. The replacement keeps the
    /// replaced spec's [`SpecId`], which is returned.
    pub fn set(
        &mut self,
        path: &str,
        value: impl Into<Perturbation>,
    ) -> Result<SpecId, SpecfigError> {
        let (id, leaf) = self.walk(self.root, path)?;
        self.instance_mut(id).set(leaf, value.into())
    }

    /// Freeze the root instance. Children stay mutable; see [`freeze_at`](Self::freeze_at).
    pub fn freeze(&mut self) {
        self.instance_mut(self.root).freeze();
        debug!(config = self.root().config_type().name(), "froze config");
    }

    /// Freeze the child config at `path`.
    pub fn freeze_at(&mut self, path: &str) -> Result<(), SpecfigError> {
        let id = self.child(path)?.id();
        self.instance_mut(id).freeze();
        debug!(path, "froze config");
        Ok(())
    }

    /// Freeze every instance of the session.
    pub fn freeze_all(&mut self) {
        for instance in self.locator.instances_mut() {
            instance.freeze();
        }
        debug!(instances = self.len(), "froze all configs");
    }

    /// Names of every global input declared anywhere in the tree.
    ///
    /// Fails if two instances declare the same global input name backed by
    /// different specs.
    pub fn global_input_keys(&self) -> Result<BTreeSet<String>, SpecfigError> {
        let mut seen: BTreeMap<&str, SpecId> = BTreeMap::new();
        let mut visited = HashSet::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let instance = self.inst(id);
            for (key, spec_id) in instance.global_inputs() {
                if let Some(&existing) = seen.get(key)
                    && existing != spec_id
                {
                    return Err(SpecfigError::GlobalInputCollision { key: key.into() });
                }
                seen.insert(key, spec_id);
            }
            // Reverse so children are visited in declaration order.
            let children: Vec<ConfigId> = instance.child_configs().map(|(_, c)| c).collect();
            stack.extend(children.into_iter().rev());
        }

        Ok(seen.into_keys().map(str::to_string).collect())
    }

    /// Dotted path of the slot with the given id, searching depth-first in
    /// declaration order.
    pub fn path_of(&self, spec_id: SpecId) -> Option<String> {
        self.path_of_in(self.root, spec_id, &mut HashSet::new())
    }

    fn path_of_in(
        &self,
        id: ConfigId,
        spec_id: SpecId,
        visited: &mut HashSet<ConfigId>,
    ) -> Option<String> {
        if !visited.insert(id) {
            return None;
        }
        let instance = self.inst(id);
        if let Some(key) = instance.key_of(spec_id) {
            return Some(key.to_string());
        }
        instance.child_configs().find_map(|(name, child)| {
            self.path_of_in(child, spec_id, visited)
                .map(|rest| format!("{name}.{rest}"))
        })
    }

    /// Flattened listing of every spec reachable from the root.
    pub fn list(&self) -> Listing {
        ops::list_specs(self.root())
    }

    fn inst(&self, id: ConfigId) -> &ConfigInstance {
        self.locator
            .get(id)
            .unwrap_or_else(|| unreachable!("config id {id:?} not in this graph"))
    }

    fn instance_mut(&mut self, id: ConfigId) -> &mut ConfigInstance {
        self.locator
            .get_mut(id)
            .unwrap_or_else(|| unreachable!("config id {id:?} not in this graph"))
    }

    /// Resolve all but the last segment of `path` to an instance.
    fn walk<'p>(
        &self,
        start: ConfigId,
        path: &'p str,
    ) -> Result<(ConfigId, &'p str), SpecfigError> {
        let Some((parents, leaf)) = path.rsplit_once('.') else {
            return Ok((start, path));
        };

        let mut id = start;
        for segment in parents.split('.') {
            let instance = self.inst(id);
            id = match instance.slot(segment) {
                Some(Slot::Child(child)) => child,
                Some(Slot::Spec(_)) => {
                    return Err(SpecfigError::NotAConfig {
                        key: segment.into(),
                    });
                }
                None => {
                    return Err(SpecfigError::KeyNotFound {
                        config: instance.config_type().name(),
                        key: segment.into(),
                    });
                }
            };
        }
        Ok((id, leaf))
    }
}

/// Borrowed handle on one realized instance.
#[derive(Clone, Copy)]
pub struct ConfigView<'a> {
    graph: &'a ConfigGraph,
    id: ConfigId,
}

impl<'a> ConfigView<'a> {
    pub fn id(&self) -> ConfigId {
        self.id
    }

    pub fn instance(&self) -> &'a ConfigInstance {
        self.graph.inst(self.id)
    }

    pub fn config_type(&self) -> ConfigType {
        self.instance().config_type()
    }

    pub fn is_frozen(&self) -> bool {
        self.instance().is_frozen()
    }

    /// Read the child config or spec at `path`, relative to this instance.
    pub fn get(&self, path: &str) -> Result<Entry<'a>, SpecfigError> {
        let graph = self.graph;
        let (id, leaf) = graph.walk(self.id, path)?;
        let instance = graph.inst(id);
        match instance.slot(leaf) {
            Some(Slot::Child(child)) => Ok(Entry::Config(ConfigView { graph, id: child })),
            Some(Slot::Spec(spec)) => Ok(Entry::Spec(spec)),
            None => Err(SpecfigError::KeyNotFound {
                config: instance.config_type().name(),
                key: leaf.into(),
            }),
        }
    }

    pub fn spec(&self, path: &str) -> Result<&'a Spec, SpecfigError> {
        match self.get(path)? {
            Entry::Spec(spec) => Ok(spec),
            Entry::Config(_) => Err(SpecfigError::NotASpec { key: path.into() }),
        }
    }

    pub fn child(&self, path: &str) -> Result<ConfigView<'a>, SpecfigError> {
        match self.get(path)? {
            Entry::Config(view) => Ok(view),
            Entry::Spec(_) => Err(SpecfigError::NotAConfig { key: path.into() }),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        match self.graph.walk(self.id, path) {
            Ok((id, leaf)) => self.graph.inst(id).contains(leaf),
            Err(_) => false,
        }
    }

    /// Sorted spec and child names.
    pub fn names(&self) -> Vec<&'a str> {
        self.instance().names()
    }

    /// Specs in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = (&'a str, &'a Spec)> + 'a {
        self.instance().specs()
    }

    /// Children in declaration order.
    pub fn child_configs(&self) -> impl Iterator<Item = (&'a str, ConfigView<'a>)> + 'a {
        let graph = self.graph;
        self.instance()
            .child_configs()
            .map(move |(name, id)| (name, ConfigView { graph, id }))
    }
}

impl fmt::Debug for ConfigView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigView")
            .field("config", &self.config_type())
            .field("id", &self.id)
            .finish()
    }
}
