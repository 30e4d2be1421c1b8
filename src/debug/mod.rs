//! Debug domain: forced transitions, kill/heal and JSON snapshots for bosses.
//!
//! Features:
//! - Force retreat, shield pattern or phase transition
//! - Kill or fully heal a boss
//! - Capture a JSON snapshot of controller state

mod state;
mod systems;

pub use state::{DebugAction, DebugCommand, DebugState};
pub use systems::snapshot_json;

use bevy::prelude::*;

use crate::debug::systems::{handle_debug_commands, update_status_message};

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>()
            .add_message::<DebugCommand>()
            .add_systems(Update, (handle_debug_commands, update_status_message).chain());
    }
}
