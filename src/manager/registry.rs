//! Name-keyed machine registry owned by the drain loop.

use crate::core::StateSnapshot;
use crate::machine::Machine;
use crate::manager::error::ManagerError;
use std::collections::HashMap;

pub(crate) struct Registry {
    manager: String,
    machines: HashMap<String, Box<dyn Machine>>,
}

impl Registry {
    pub(crate) fn new(manager: impl Into<String>) -> Self {
        Self {
            manager: manager.into(),
            machines: HashMap::new(),
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.machines.contains_key(name)
    }

    /// Install under the machine's own name. Callers check `contains` first.
    pub(crate) fn insert(&mut self, machine: Box<dyn Machine>) {
        self.machines.insert(machine.name().to_string(), machine);
    }

    /// Swap the entry for `name`, used by restarts.
    pub(crate) fn replace(&mut self, name: &str, machine: Box<dyn Machine>) {
        self.machines.insert(name.to_string(), machine);
    }

    pub(crate) fn get(&self, name: &str) -> Result<&dyn Machine, ManagerError> {
        match self.machines.get(name) {
            Some(machine) => Ok(&**machine),
            None => Err(self.not_found(name)),
        }
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn Machine>> {
        self.machines.get_mut(name)
    }

    pub(crate) fn snapshot(&self, name: &str) -> Result<StateSnapshot, ManagerError> {
        self.get(name)?
            .current_state()
            .map_err(|source| ManagerError::Snapshot {
                machine: name.to_string(),
                source,
            })
    }

    /// Registered names, sorted.
    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.machines.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn not_found(&self, name: &str) -> ManagerError {
        ManagerError::NotFound {
            manager: self.manager.clone(),
            machine: name.to_string(),
            known: self.names(),
        }
    }
}
