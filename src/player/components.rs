use bevy::prelude::*;

/// Marker component for the player's rigid body.
#[derive(Component)]
pub struct Player;

/// Marker for the player's visual container (model root).
#[derive(Component)]
pub struct PlayerModel;

/// Links the player body to its visual container.
#[derive(Component)]
pub struct PlayerVisual(pub Entity);

/// Animation-facing movement state, inferred from physics feedback every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Moving,
    Airborne,
}

/// Per-tick controller readings kept on the player body.
#[derive(Component, Debug, Default)]
pub struct MovementState {
    /// Scaled horizontal intention (x, z) from the last tick.
    pub intention: Vec2,
    pub grounded: bool,
    pub animation: AnimationState,
    /// Seconds the body has spent below the airborne speed threshold.
    pub settled_for: f32,
}

impl MovementState {
    pub fn is_moving(&self) -> bool {
        self.intention != Vec2::ZERO
    }
}
