pub mod systems;

use bevy::prelude::*;

use crate::game_state::AppState;
use crate::player::PlayerSystems;
use systems::{follow_player, spawn_camera};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), spawn_camera).add_systems(
            Update,
            follow_player
                .after(PlayerSystems)
                .run_if(in_state(AppState::InGame)),
        );
    }
}
