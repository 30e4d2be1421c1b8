//! Combat domain: the top-level combat state.

use serde::Serialize;

use crate::combat::attacks::ActionKind;

/// Exactly one of these is active per boss; illegal flag combinations cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CombatState {
    /// Chasing or waiting; the only state that asks the selector for actions
    #[default]
    Idle,
    RotatingToFace,
    /// A strike or the stationary barrage
    Executing(ActionKind),
    Retreating,
    ShieldPattern,
    JumpSequence,
    PhaseTransition,
    Dead,
}

impl CombatState {
    /// State entered when `action` starts running.
    pub fn for_action(action: ActionKind) -> Self {
        match action {
            ActionKind::Retreat => CombatState::Retreating,
            ActionKind::ShieldPattern => CombatState::ShieldPattern,
            ActionKind::Jump => CombatState::JumpSequence,
            ActionKind::Melee | ActionKind::Heavy | ActionKind::Dash | ActionKind::Barrage => {
                CombatState::Executing(action)
            }
        }
    }

    /// Whether a sequence or transition owns the boss, so no new action is picked.
    pub fn is_busy(self) -> bool {
        !matches!(self, CombatState::Idle | CombatState::RotatingToFace)
    }

    pub fn is_dead(self) -> bool {
        self == CombatState::Dead
    }

    pub fn label(self) -> &'static str {
        match self {
            CombatState::Idle => "idle",
            CombatState::RotatingToFace => "rotating_to_face",
            CombatState::Executing(_) => "executing",
            CombatState::Retreating => "retreating",
            CombatState::ShieldPattern => "shield_pattern",
            CombatState::JumpSequence => "jump_sequence",
            CombatState::PhaseTransition => "phase_transition",
            CombatState::Dead => "dead",
        }
    }
}
