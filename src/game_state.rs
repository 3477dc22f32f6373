use bevy::prelude::*;

/// Main application states controlling game flow.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    /// Character model and clips are still being resolved.
    #[default]
    Loading,
    InGame,
}

/// Marker for entities that belong to one play session and are despawned on leaving `InGame`.
#[derive(Component)]
pub struct SessionEntity;

pub fn cleanup_session(mut commands: Commands, query: Query<Entity, With<SessionEntity>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
