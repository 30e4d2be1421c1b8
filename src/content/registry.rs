//! BossRegistry resource providing lookup by id for loaded boss definitions.

use bevy::prelude::*;
use std::collections::HashMap;

use super::data::BossDef;

/// All loaded boss archetypes, in file order.
#[derive(Resource, Debug, Default, Clone)]
pub struct BossRegistry {
    bosses: HashMap<String, BossDef>,
    order: Vec<String>,
}

impl BossRegistry {
    /// Registry holding only the built-in hound.
    pub fn with_default() -> Self {
        let mut registry = Self::default();
        registry.insert(BossDef::default());
        registry
    }

    /// Insert or replace a definition.
    pub fn insert(&mut self, def: BossDef) {
        if !self.bosses.contains_key(&def.id) {
            self.order.push(def.id.clone());
        }
        self.bosses.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&BossDef> {
        self.bosses.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bosses.contains_key(id)
    }

    /// First definition in file order.
    pub fn first(&self) -> Option<&BossDef> {
        self.order.first().and_then(|id| self.bosses.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BossDef> {
        self.order.iter().filter_map(|id| self.bosses.get(id))
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns a summary of loaded content for logging.
    pub fn summary(&self) -> String {
        format!(
            "BossRegistry loaded {} boss(es): {}",
            self.len(),
            self.order.join(", ")
        )
    }
}
