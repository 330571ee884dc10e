use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::task::TaskDefinition;

/// In-memory task store: atomic definitions plus named composites that
/// expand, at resolution time, to an ordered sequence of other task names.
///
/// Registration is write-once: a name can be taken by exactly one atomic
/// task or one composite for the process lifetime. Composites are stored as
/// raw references and only checked when resolved.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, TaskDefinition>,
    composites: HashMap<String, Vec<String>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: TaskDefinition) -> Result<()> {
        if self.tasks.contains_key(&def.name) || self.composites.contains_key(&def.name) {
            return Err(Error::task_duplicate(&def.name));
        }
        self.tasks.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn define_composite<I, S>(&mut self, name: impl Into<String>, members: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.tasks.contains_key(&name) || self.composites.contains_key(&name) {
            return Err(Error::task_duplicate(&name));
        }
        self.composites
            .insert(name, members.into_iter().map(Into::into).collect());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&TaskDefinition> {
        self.tasks
            .get(name)
            .ok_or_else(|| Error::task_unknown(name, None))
    }

    pub fn is_composite(&self, name: &str) -> bool {
        self.composites.contains_key(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name) || self.composites.contains_key(name)
    }

    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn composite_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.composites.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn composite_members(&self, name: &str) -> Option<&[String]> {
        self.composites.get(name).map(|m| m.as_slice())
    }

    /// Flatten a task name into the ordered list of atomic task names to
    /// execute. An atomic name resolves to itself; a composite expands
    /// depth-first, left to right.
    ///
    /// Repeated atomic names are emitted once, at their first position: a
    /// name maps to exactly one registered definition, so repetition can
    /// never denote a different configuration (brand-distinct configurations
    /// carry brand-distinct `stage:brand` names).
    ///
    /// Expansion is purely structural; environment-driven selection happens
    /// when the `test` composite is assembled, never here.
    pub fn resolve(&self, name: &str) -> Result<Vec<String>> {
        let mut ordered = Vec::new();
        let mut emitted = HashSet::new();
        let mut stack = Vec::new();
        self.expand(name, None, &mut stack, &mut emitted, &mut ordered)?;
        Ok(ordered)
    }

    fn expand(
        &self,
        name: &str,
        referenced_by: Option<&str>,
        stack: &mut Vec<String>,
        emitted: &mut HashSet<String>,
        ordered: &mut Vec<String>,
    ) -> Result<()> {
        if let Some(members) = self.composites.get(name) {
            if stack.iter().any(|n| n == name) {
                return Err(Error::task_cyclic(name, stack.clone()));
            }
            stack.push(name.to_string());
            for member in members {
                self.expand(member, Some(name), stack, emitted, ordered)?;
            }
            stack.pop();
            return Ok(());
        }

        if self.tasks.contains_key(name) {
            if emitted.insert(name.to_string()) {
                ordered.push(name.to_string());
            }
            return Ok(());
        }

        Err(Error::task_unknown(
            name,
            referenced_by.map(|s| s.to_string()),
        ))
    }
}
