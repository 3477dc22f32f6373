mod camera;
mod character;
mod config;
mod game_state;
mod player;
mod world;

use avian3d::prelude::*;
use bevy::{
    diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin},
    prelude::*,
    window::PresentMode,
};

use camera::CameraPlugin;
use character::CharacterPlugin;
use config::ConfigPlugin;
use game_state::AppState;
use player::PlayerPlugin;
use world::WorldPlugin;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Capyrun".to_string(),
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins(PhysicsPlugins::default())
        .add_plugins((
            FrameTimeDiagnosticsPlugin::default(),
            LogDiagnosticsPlugin::default(),
        ))
        .init_state::<AppState>()
        .add_plugins((
            ConfigPlugin,
            CharacterPlugin,
            WorldPlugin,
            PlayerPlugin,
            CameraPlugin,
        ))
        .run();
}
