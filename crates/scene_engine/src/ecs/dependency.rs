//! Per-entity dependency graph
//!
//! Maps a provider capability to the component types that declared a
//! dependency on it, in registration order. An entry exists while at least
//! one attached component declares the provider.

use super::component::ComponentType;

/// Provider capability to ordered dependents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    entries: Vec<(ComponentType, Vec<ComponentType>)>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` depends on each of `providers`
    pub fn register(&mut self, dependent: ComponentType, providers: &[ComponentType]) {
        for provider in providers {
            match self.entries.iter_mut().find(|(existing, _)| existing == provider) {
                Some((_, dependents)) => {
                    if !dependents.contains(&dependent) {
                        dependents.push(dependent);
                    }
                }
                None => self.entries.push((*provider, vec![dependent])),
            }
        }
    }

    /// Remove `dependent` from every list, dropping entries that become empty
    pub fn unregister(&mut self, dependent: ComponentType) {
        for (_, dependents) in &mut self.entries {
            dependents.retain(|existing| *existing != dependent);
        }
        self.entries.retain(|(_, dependents)| !dependents.is_empty());
    }

    /// Dependents of `provider` in registration order
    pub fn dependents_of(&self, provider: ComponentType) -> &[ComponentType] {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == provider)
            .map_or(&[], |(_, dependents)| dependents.as_slice())
    }

    /// Whether any component declares `provider`
    pub fn contains(&self, provider: ComponentType) -> bool {
        self.entries.iter().any(|(existing, _)| *existing == provider)
    }

    /// Declared providers in first-registration order
    pub fn providers(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.entries.iter().map(|(provider, _)| *provider)
    }

    /// Number of provider entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no dependencies are declared
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
