//! Content domain: boss definitions loaded from RON, with validation.

mod data;
mod loader;
mod registry;
mod validation;

pub use data::{
    BandPoolDef, BandsDef, BarrageDef, BossDef, DataFile, FacingDef, JumpDef, MovementDef,
    PhaseDef, PoolEntryDef, RetreatDef, SelectorDef, ShieldDef, VolleyDef,
};
pub use loader::{
    BOSSES_FILE, ContentLoadError, DEFAULT_DATA_DIR, load_bosses, parse_data_file,
    registry_from_defs,
};
pub use registry::BossRegistry;
pub use validation::{ValidationError, validate_boss, validate_registry};

use std::path::PathBuf;

use bevy::prelude::*;

/// Loads the boss registry at build time. Invalid or missing files fall back to the
/// built-in hound so the game can always start.
pub struct ContentPlugin {
    pub data_dir: PathBuf,
}

impl Default for ContentPlugin {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        let registry = load_validated(&self.data_dir);
        info!("{}", registry.summary());
        app.insert_resource(registry);
    }
}

/// Load and validate, dropping invalid bosses and falling back to the default.
pub fn load_validated(data_dir: &std::path::Path) -> BossRegistry {
    let loaded = match load_bosses(data_dir) {
        Ok(registry) => registry,
        Err(errors) => {
            for error in &errors {
                warn!("{}", error);
            }
            return BossRegistry::with_default();
        }
    };

    let mut registry = BossRegistry::default();
    for def in loaded.iter() {
        let errors = validate_boss(def);
        if errors.is_empty() {
            registry.insert(def.clone());
        } else {
            for error in &errors {
                error!("{}", error);
            }
        }
    }

    if registry.is_empty() {
        warn!("No valid boss definitions, using the built-in default");
        return BossRegistry::with_default();
    }
    registry
}
