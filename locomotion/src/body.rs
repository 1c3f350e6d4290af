use crate::types::{CapsuleSpec, Quat, Vec3};

/// The physical body a controller drives.
///
/// `position` is the capsule center. `move_with_velocity` performs the collide-and-slide for
/// one tick and must be called at most once per tick; the velocity it actually achieved is
/// what `velocity` reports on the next tick.
pub trait CharacterBody {
    fn position(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn set_rotation(&mut self, rotation: Quat);

    /// Actual velocity achieved by the last move.
    fn velocity(&self) -> Vec3;

    /// Whether the last move ended in contact with walkable ground.
    fn is_grounded(&self) -> bool;

    fn capsule(&self) -> CapsuleSpec;

    /// Steepest walkable slope, degrees.
    fn slope_limit_deg(&self) -> f32;

    fn set_step_offset_enabled(&mut self, enabled: bool);

    fn move_with_velocity(&mut self, velocity: Vec3, dt: f32);

    /// Place the body at `position` with zero velocity.
    fn teleport(&mut self, position: Vec3);
}
