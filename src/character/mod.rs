pub mod clips;

use bevy::{asset::LoadState, gltf::Gltf, prelude::*};

pub use clips::{ClipKind, ClipLibrary};

use crate::config::PlayerConfig;
use crate::game_state::AppState;

/// Resource holding the character GLTF handle while it loads.
#[derive(Resource)]
pub struct CharacterGltfHandle(pub Handle<Gltf>);

/// Why the character fell back to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    LoadFailed(String),
    NoScene,
}

/// Resolved character assets. Inserted once loading settles either way.
#[derive(Resource, Debug, Clone)]
pub enum CharacterModel {
    Loaded {
        scene: Handle<Scene>,
        animation_graph: Handle<AnimationGraph>,
        clips: ClipLibrary,
    },
    Fallback(FallbackReason),
}

impl CharacterModel {
    /// Clip library for the model. A placeholder has none.
    pub fn clips(&self) -> ClipLibrary {
        match self {
            CharacterModel::Loaded { clips, .. } => clips.clone(),
            CharacterModel::Fallback(_) => ClipLibrary::default(),
        }
    }
}

/// Marks a visual container whose scene has not yet been wired to its animation graph.
#[derive(Component)]
pub struct NeedsAnimationSetup;

/// Links a visual container to the entity holding its `AnimationPlayer`.
#[derive(Component)]
pub struct CharacterAnimationLink(pub Entity);

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, start_loading_character)
            .add_systems(Update, resolve_character.run_if(in_state(AppState::Loading)))
            .add_systems(
                Update,
                setup_character_animation_graph.run_if(in_state(AppState::InGame)),
            );
    }
}

fn start_loading_character(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<PlayerConfig>,
) {
    let gltf_handle: Handle<Gltf> = asset_server.load(config.model_path.clone());
    commands.insert_resource(CharacterGltfHandle(gltf_handle));
    info!("Character GLTF loading started: {}", config.model_path);
}

/// Waits for the GLTF to settle, then publishes a `CharacterModel` and enters the game.
fn resolve_character(
    mut commands: Commands,
    gltf_handle: Option<Res<CharacterGltfHandle>>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = gltf_handle else {
        return;
    };

    let model = if let Some(gltf) = gltfs.get(&handle.0) {
        build_character_model(gltf, &mut graphs)
    } else if let LoadState::Failed(err) = asset_server.load_state(handle.0.id()) {
        CharacterModel::Fallback(FallbackReason::LoadFailed(err.to_string()))
    } else {
        return;
    };

    match &model {
        CharacterModel::Loaded { clips, .. } => {
            for kind in clips.missing() {
                warn!("No {:?} clip in character model, transitions to it will be skipped", kind);
            }
        }
        CharacterModel::Fallback(reason) => {
            warn!("Character model unavailable ({:?}), using placeholder", reason);
        }
    }

    commands.insert_resource(model);
    commands.remove_resource::<CharacterGltfHandle>();
    next_state.set(AppState::InGame);
}

fn build_character_model(gltf: &Gltf, graphs: &mut Assets<AnimationGraph>) -> CharacterModel {
    let Some(scene) = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
    else {
        return CharacterModel::Fallback(FallbackReason::NoScene);
    };

    info!(
        "Character GLTF loaded: {} animations found",
        gltf.named_animations.len()
    );

    let mut graph = AnimationGraph::new();
    let root = graph.root;
    let clips = ClipLibrary::from_named_clips(
        gltf.named_animations
            .iter()
            .map(|(name, clip)| (&**name, clip.clone())),
        |clip| graph.add_clip(clip, 1.0, root),
    );

    CharacterModel::Loaded {
        scene,
        animation_graph: graphs.add(graph),
        clips,
    }
}

/// Finds the AnimationPlayer spawned by the scene and gives it the character's graph.
fn setup_character_animation_graph(
    mut commands: Commands,
    model: Option<Res<CharacterModel>>,
    query: Query<Entity, With<NeedsAnimationSetup>>,
    children_query: Query<&Children>,
    animation_player_query: Query<Entity, With<AnimationPlayer>>,
) {
    let Some(model) = model else {
        return;
    };
    let CharacterModel::Loaded { animation_graph, .. } = &*model else {
        return;
    };

    for root_entity in query.iter() {
        let Some(anim_entity) =
            find_entity_with_component(root_entity, &children_query, &animation_player_query)
        else {
            continue;
        };

        info!(
            "Found AnimationPlayer for character {:?} at entity {:?}",
            root_entity, anim_entity
        );

        commands
            .entity(anim_entity)
            .insert(AnimationGraphHandle(animation_graph.clone()));
        commands
            .entity(root_entity)
            .insert(CharacterAnimationLink(anim_entity))
            .remove::<NeedsAnimationSetup>();
    }
}

/// Recursively finds an entity with the specified component in the hierarchy.
fn find_entity_with_component<T: Component>(
    entity: Entity,
    children_query: &Query<&Children>,
    component_query: &Query<Entity, With<T>>,
) -> Option<Entity> {
    if component_query.get(entity).is_ok() {
        return Some(entity);
    }

    if let Ok(children) = children_query.get(entity) {
        for &child in children.iter() {
            if let Some(result) =
                find_entity_with_component(child, children_query, component_query)
            {
                return Some(result);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    #[test]
    fn animation_player_deep_in_scene_is_linked() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<AppState>()
            .insert_resource(CharacterModel::Loaded {
                scene: Handle::default(),
                animation_graph: Handle::default(),
                clips: ClipLibrary::default(),
            })
            .add_systems(Update, setup_character_animation_graph);

        let player = app.world_mut().spawn(AnimationPlayer::default()).id();
        let armature = app.world_mut().spawn_empty().add_child(player).id();
        let root = app
            .world_mut()
            .spawn(NeedsAnimationSetup)
            .add_child(armature)
            .id();

        app.update();

        let link = app.world().get::<CharacterAnimationLink>(root).expect("linked");
        assert_eq!(link.0, player);
        assert!(app.world().get::<NeedsAnimationSetup>(root).is_none());
        assert!(app.world().get::<AnimationGraphHandle>(player).is_some());
    }

    #[test]
    fn placeholder_model_has_no_clips() {
        let model = CharacterModel::Fallback(FallbackReason::NoScene);
        assert!(model.clips().is_empty());
    }
}
