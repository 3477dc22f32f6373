use avian3d::prelude::*;
use bevy::prelude::*;

use super::components::{AnimationState, MovementState, Player, PlayerModel, PlayerVisual};
use super::input::PlayerInput;
use crate::config::PlayerConfig;

/// Scales the raw key intention to a target horizontal velocity.
///
/// Diagonals are normalized so they are no faster than a single axis.
pub fn movement_intention(raw: Vec2, move_speed: f32) -> Vec2 {
    let direction = if raw.x != 0.0 && raw.y != 0.0 {
        raw.normalize()
    } else {
        raw
    };
    direction * move_speed
}

/// Yaw that turns the model's +Z axis toward `intention` (x, z).
pub fn facing_rotation(intention: Vec2) -> Quat {
    Quat::from_rotation_y(intention.x.atan2(intention.y))
}

/// Height/velocity proxy for ground contact used to gate jumps.
pub fn is_grounded(vertical_velocity: f32, height: f32, config: &PlayerConfig) -> bool {
    vertical_velocity.abs() < config.grounded_velocity_epsilon
        && height < config.ground_height_threshold
}

/// Next animation state from physics feedback.
///
/// Fast vertical motion is always airborne. Once airborne, the state is held until the
/// body is grounded or has stayed vertically slow for `airborne_settle_seconds`, so the
/// slow stretch around a jump apex does not count as landing.
pub fn infer_animation_state(
    previous: AnimationState,
    vertical_velocity: f32,
    moving: bool,
    grounded: bool,
    settled_for: f32,
    config: &PlayerConfig,
) -> AnimationState {
    let still_in_air = previous == AnimationState::Airborne
        && !grounded
        && settled_for < config.airborne_settle_seconds;

    if vertical_velocity.abs() > config.airborne_velocity_threshold || still_in_air {
        AnimationState::Airborne
    } else if moving {
        AnimationState::Moving
    } else {
        AnimationState::Idle
    }
}

pub fn resolve_movement(
    config: Res<PlayerConfig>,
    input: Res<PlayerInput>,
    mut bodies: Query<(&mut LinearVelocity, &mut MovementState, &PlayerVisual), With<Player>>,
    mut visuals: Query<&mut Transform, (With<PlayerModel>, Without<Player>)>,
) {
    for (mut velocity, mut state, visual) in bodies.iter_mut() {
        let intention = movement_intention(input.raw_intention(), config.move_speed);
        state.intention = intention;

        // Horizontal control is absolute; vertical stays with gravity and impulses.
        velocity.x = intention.x;
        velocity.z = intention.y;

        if intention != Vec2::ZERO {
            if let Ok(mut transform) = visuals.get_mut(visual.0) {
                transform.rotation = facing_rotation(intention);
            }
        }
    }
}

pub fn resolve_jump(
    config: Res<PlayerConfig>,
    mut input: ResMut<PlayerInput>,
    mut bodies: Query<
        (&LinearVelocity, &Position, &mut ExternalImpulse, &mut MovementState),
        With<Player>,
    >,
) {
    for (velocity, position, mut impulse, mut state) in bodies.iter_mut() {
        state.grounded = is_grounded(velocity.y, position.y, &config);

        if state.grounded && input.consume_jump() {
            impulse.apply_impulse(Vec3::Y * config.jump_impulse);
            debug!("Jump impulse applied at height {:.2}", position.y);
        }
    }
}

pub fn update_animation_state(
    time: Res<Time>,
    config: Res<PlayerConfig>,
    mut bodies: Query<(&LinearVelocity, &mut MovementState), With<Player>>,
) {
    for (velocity, mut state) in bodies.iter_mut() {
        if velocity.y.abs() > config.airborne_velocity_threshold {
            state.settled_for = 0.0;
        } else {
            state.settled_for += time.delta_secs();
        }

        let next = infer_animation_state(
            state.animation,
            velocity.y,
            state.is_moving(),
            state.grounded,
            state.settled_for,
            &config,
        );
        if next != state.animation {
            debug!("Player state {:?} -> {:?}", state.animation, next);
            state.animation = next;
        }
    }
}

/// Copies the simulated body position onto the visual container. Never the reverse.
pub fn sync_visual_to_body(
    config: Res<PlayerConfig>,
    bodies: Query<(&Position, &PlayerVisual), With<Player>>,
    mut visuals: Query<&mut Transform, (With<PlayerModel>, Without<Player>)>,
) {
    for (position, visual) in bodies.iter() {
        if let Ok(mut transform) = visuals.get_mut(visual.0) {
            transform.translation = position.0 + Vec3::Y * config.model_offset_y;
        }
    }
}
