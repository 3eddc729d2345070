//! Per-session cache from blueprints to realized configuration instances.
//!
//! The locator owns every instance realized during one resolution session in
//! an arena, addressed by [`ConfigId`]. Realizing a blueprint that is equal to
//! one already realized returns the existing id, so sibling configs that nest
//! the same blueprint share one sub-graph.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::blueprint::Blueprint;
use crate::error::SpecfigError;
use crate::inputs::Inputs;
use crate::instance::ConfigInstance;

/// Handle on a realized configuration instance within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigId(usize);

impl ConfigId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct ConfigLocator {
    global_inputs: Inputs,
    cache: HashMap<Blueprint, ConfigId>,
    instances: Vec<ConfigInstance>,
    /// Blueprints currently being loaded, outermost first.
    in_progress: Vec<Blueprint>,
}

impl ConfigLocator {
    pub fn new(global_inputs: Inputs) -> Self {
        Self {
            global_inputs,
            cache: HashMap::new(),
            instances: Vec::new(),
            in_progress: Vec::new(),
        }
    }

    pub fn global_inputs(&self) -> &Inputs {
        &self.global_inputs
    }

    /// Realize `blueprint`, reusing the session's instance if an equal
    /// blueprint was realized before.
    ///
    /// A blueprint that (transitively) nests itself fails with
    /// [`SpecfigError::CyclicConfig`]. A failed load caches nothing.
    pub fn realize(&mut self, blueprint: &Blueprint) -> Result<ConfigId, SpecfigError> {
        if let Some(&id) = self.cache.get(blueprint) {
            trace!(%blueprint, ?id, "config cache hit");
            return Ok(id);
        }

        if let Some(start) = self.in_progress.iter().position(|b| b == blueprint) {
            let mut chain: Vec<String> = self.in_progress[start..]
                .iter()
                .map(ToString::to_string)
                .collect();
            chain.push(blueprint.to_string());
            return Err(SpecfigError::CyclicConfig { chain });
        }

        self.in_progress.push(blueprint.clone());
        let loaded = ConfigInstance::load(blueprint, self);
        self.in_progress.pop();
        let instance = loaded?;

        let id = ConfigId(self.instances.len());
        self.instances.push(instance);
        self.cache.insert(blueprint.clone(), id);
        debug!(%blueprint, ?id, "realized config");
        Ok(id)
    }

    pub fn get(&self, id: ConfigId) -> Option<&ConfigInstance> {
        self.instances.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ConfigId) -> Option<&mut ConfigInstance> {
        self.instances.get_mut(id.0)
    }

    /// Number of distinct instances realized so far.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub(crate) fn instances_mut(&mut self) -> impl Iterator<Item = &mut ConfigInstance> {
        self.instances.iter_mut()
    }
}
