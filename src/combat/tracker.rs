//! Combat domain: target tracking (position, velocity, distance, facing error).

use bevy::math::Vec2;

/// Resolved view of the target for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFix {
    pub position: Vec2,
    pub velocity: Vec2,
    pub distance: f32,
    /// Unsigned angle between the boss facing and the direction to the target, degrees
    pub facing_error: f32,
}

impl TargetFix {
    /// Where the target will be after `seconds` at its current velocity.
    pub fn predict(&self, seconds: f32) -> Vec2 {
        self.position + self.velocity * seconds.max(0.0)
    }

    pub fn is_facing(&self, threshold_degrees: f32) -> bool {
        self.facing_error <= threshold_degrees
    }
}

/// Caches the last known target state and derives velocity between ticks.
#[derive(Debug, Clone, Default)]
pub struct TargetTracker {
    last: Option<TargetFix>,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from the boss pose and the target position, `None` if the target is gone.
    pub fn update(
        &mut self,
        origin: Vec2,
        facing: Vec2,
        target: Option<Vec2>,
        dt: f32,
    ) -> Option<TargetFix> {
        let Some(position) = target.filter(|p| p.is_finite()) else {
            self.last = None;
            return None;
        };

        let velocity = match self.last {
            Some(last) if dt > 0.0 => (position - last.position) / dt,
            Some(last) => last.velocity,
            None => Vec2::ZERO,
        };

        let to_target = position - origin;
        let fix = TargetFix {
            position,
            velocity,
            distance: to_target.length(),
            facing_error: facing_error_degrees(facing, to_target),
        };
        self.last = Some(fix);
        Some(fix)
    }

    pub fn last(&self) -> Option<&TargetFix> {
        self.last.as_ref()
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

/// Unsigned angle in degrees between `facing` and `to_target`.
/// A zero-length vector on either side counts as already facing.
pub fn facing_error_degrees(facing: Vec2, to_target: Vec2) -> f32 {
    if facing.length_squared() <= f32::EPSILON || to_target.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    facing
        .perp_dot(to_target)
        .atan2(facing.dot(to_target))
        .abs()
        .to_degrees()
}
