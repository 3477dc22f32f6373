pub mod setup;

use bevy::prelude::*;

use crate::game_state::{cleanup_session, AppState};
use setup::setup_world;

// Ground dimensions
pub const GROUND_SIZE: f32 = 50.0;
pub const GROUND_THICKNESS: f32 = 1.0;

pub const CRATE_SIZE: f32 = 1.0;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 300.0,
        })
        .add_systems(OnEnter(AppState::InGame), setup_world)
        .add_systems(OnExit(AppState::InGame), cleanup_session);
    }
}
