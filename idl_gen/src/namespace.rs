//! Scoped, collision-free identifier allocation.
//!
//! A [`Namespace`] hands out identifiers that collide neither with names
//! already taken in the same scope or any enclosing scope nor with Go
//! reserved words. Child scopes see every ancestor reservation, but their
//! own reservations stay invisible to the ancestors.

use crate::naming::GO_RESERVED;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Package initializer hook: Go allows any number of `func init()` per file.
pub const INIT_HOOK: &str = "init";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("name {0:?} is already taken")]
    NameTaken(String),

    #[error("no names have been generated for {0:?}")]
    NotFound(String),
}

#[derive(Debug, Default)]
pub struct Namespace<'p> {
    parent: Option<&'p Namespace<'p>>,
    taken: HashSet<String>,
    /* base name -> names generated for it, oldest first */
    generated: HashMap<String, VecDeque<String>>,
}

impl<'p> Namespace<'p> {
    pub fn new() -> Self {
        Self { parent: None, taken: HashSet::new(), generated: HashMap::new() }
    }

    /// Nested scope over `self`.
    pub fn child(&self) -> Namespace<'_> {
        Namespace { parent: Some(self), taken: HashSet::new(), generated: HashMap::new() }
    }

    /// Whether `name` is reserved here, in an ancestor, or by the language.
    pub fn is_taken(&self, name: &str) -> bool {
        GO_RESERVED.contains(&name) || self.taken_in_scope_chain(name)
    }

    fn taken_in_scope_chain(&self, name: &str) -> bool {
        self.taken.contains(name) || self.parent.is_some_and(|p| p.taken_in_scope_chain(name))
    }

    /// Claim `name` in this scope.
    pub fn reserve(&mut self, name: &str) -> Result<(), NamespaceError> {
        if name == INIT_HOOK {
            return Ok(());
        }
        if self.is_taken(name) {
            return Err(NamespaceError::NameTaken(name.to_string()));
        }
        self.taken.insert(name.to_string());
        Ok(())
    }

    /// Claim `base`, or `base` followed by the smallest free integer from 2 up.
    pub fn new_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 2;
        while self.is_taken(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        self.taken.insert(name.clone());
        self.generated.entry(base.to_string()).or_default().push_back(name.clone());
        name
    }

    /// Release `name` in this scope only. Ancestor reservations are untouched.
    pub fn forget(&mut self, name: &str) {
        self.taken.remove(name);
        for queue in self.generated.values_mut() {
            queue.retain(|n| n != name);
        }
    }

    /// Oldest name generated for `base` that is still held; it moves to the
    /// back of the queue so successive calls cycle through all of them.
    pub fn rotate(&mut self, base: &str) -> Result<String, NamespaceError> {
        let queue = self
            .generated
            .get_mut(base)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| NamespaceError::NotFound(base.to_string()))?;
        let name = queue.pop_front().ok_or_else(|| NamespaceError::NotFound(base.to_string()))?;
        queue.push_back(name.clone());
        Ok(name)
    }
}
