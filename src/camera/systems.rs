use bevy::prelude::*;

use crate::config::PlayerConfig;
use crate::game_state::SessionEntity;
use crate::player::PlayerModel;

/// Trailing camera that eases toward a fixed offset from the player model.
#[derive(Component, Debug, Clone)]
pub struct ThirdPersonCamera {
    pub offset: Vec3,
    /// Height above the model origin the camera looks at.
    pub look_height: f32,
    /// Exponential approach rate, per second.
    pub smoothing: f32,
}

impl ThirdPersonCamera {
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            offset: config.camera_offset(),
            look_height: config.camera_look_height,
            smoothing: config.camera_smoothing,
        }
    }

    /// Camera position after `delta` seconds of easing from `current` toward `target + offset`.
    pub fn step(&self, current: Vec3, target: Vec3, delta: f32) -> Vec3 {
        let blend = 1.0 - (-self.smoothing * delta).exp();
        current.lerp(target + self.offset, blend.clamp(0.0, 1.0))
    }
}

pub fn spawn_camera(mut commands: Commands, config: Res<PlayerConfig>) {
    let camera = ThirdPersonCamera::from_config(&config);
    let focus = Vec3::new(0.0, config.spawn_height, 0.0);
    commands.spawn((
        SessionEntity,
        Camera3d::default(),
        Transform::from_translation(focus + camera.offset)
            .looking_at(focus + Vec3::Y * camera.look_height, Vec3::Y),
        camera,
    ));
}

pub fn follow_player(
    time: Res<Time>,
    models: Query<&Transform, (With<PlayerModel>, Without<ThirdPersonCamera>)>,
    mut cameras: Query<(&mut Transform, &ThirdPersonCamera)>,
) {
    let Ok(model) = models.get_single() else {
        return;
    };
    for (mut transform, camera) in cameras.iter_mut() {
        transform.translation =
            camera.step(transform.translation, model.translation, time.delta_secs());
        transform.look_at(model.translation + Vec3::Y * camera.look_height, Vec3::Y);
    }
}
