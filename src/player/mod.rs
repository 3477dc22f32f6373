pub mod animation;
pub mod components;
pub mod input;
pub mod systems;

use avian3d::prelude::*;
use bevy::prelude::*;

pub use animation::ActionMixer;
pub use components::{MovementState, Player, PlayerModel, PlayerVisual};
pub use input::PlayerInput;

use crate::character::{CharacterModel, NeedsAnimationSetup};
use crate::config::PlayerConfig;
use crate::game_state::{AppState, SessionEntity};
use animation::{advance_crossfades, drive_animation};
use input::{capture_keyboard, reset_input};
use systems::{resolve_jump, resolve_movement, sync_visual_to_body, update_animation_state};

/// Per-frame controller systems. Anything that reads the synced model runs after this.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerSystems;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .configure_sets(Update, PlayerSystems.run_if(in_state(AppState::InGame)))
            .add_systems(OnEnter(AppState::InGame), spawn_player)
            .add_systems(OnExit(AppState::InGame), reset_input)
            .add_systems(Update, controller_systems().in_set(PlayerSystems));
    }
}

/// One controller tick, in order: input, velocity, jump, state, animation, position sync.
pub fn controller_systems() -> impl IntoSystemConfigs<()> {
    (
        capture_keyboard,
        resolve_movement,
        resolve_jump,
        update_animation_state,
        drive_animation,
        advance_crossfades,
        sync_visual_to_body,
    )
        .chain()
}

fn spawn_player(
    mut commands: Commands,
    config: Res<PlayerConfig>,
    model: Res<CharacterModel>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mixer = ActionMixer::new(
        model.clips(),
        config.crossfade_seconds,
        config.animation_time_scale,
    );
    let container = (
        PlayerModel,
        SessionEntity,
        mixer,
        Transform::from_xyz(0.0, config.spawn_height + config.model_offset_y, 0.0)
            .with_scale(Vec3::splat(config.model_scale)),
        Visibility::default(),
    );

    let visual = match model.as_ref() {
        CharacterModel::Loaded { scene, .. } => commands
            .spawn((container, SceneRoot(scene.clone()), NeedsAnimationSetup))
            .id(),
        CharacterModel::Fallback(_) => {
            // Placeholder capsule, centered on the body.
            let mesh = meshes.add(Capsule3d::new(config.capsule_radius, config.capsule_length));
            let material = materials.add(StandardMaterial {
                base_color: Color::srgb(0.55, 0.4, 0.25),
                ..default()
            });
            commands
                .spawn(container)
                .with_children(|parent| {
                    parent.spawn((
                        Mesh3d(mesh),
                        MeshMaterial3d(material),
                        Transform::from_xyz(0.0, -config.model_offset_y, 0.0),
                    ));
                })
                .id()
        }
    };

    commands.spawn((
        Player,
        SessionEntity,
        MovementState::default(),
        PlayerVisual(visual),
        RigidBody::Dynamic,
        Collider::capsule(config.capsule_radius, config.capsule_length),
        LockedAxes::ROTATION_LOCKED,
        Mass(config.body_mass),
        LinearVelocity::default(),
        ExternalImpulse::default(),
        Transform::from_xyz(0.0, config.spawn_height, 0.0),
    ));

    info!("Player spawned at height {}", config.spawn_height);
}

#[cfg(test)]
mod tests {
    use super::*;

    use bevy::animation::graph::AnimationNodeIndex;

    use super::components::AnimationState;
    use super::input::ControlKey;
    use crate::character::{CharacterAnimationLink, ClipKind, ClipLibrary};

    struct Harness {
        app: App,
        body: Entity,
        visual: Entity,
        anim: Entity,
    }

    /// Player body and model without the physics engine; tests drive velocity/position by hand.
    fn harness(clip_names: &[&str]) -> Harness {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(PlayerConfig::default())
            .init_resource::<PlayerInput>()
            .add_systems(Update, controller_systems());

        let mut next = 0;
        let clips = ClipLibrary::from_named_clips(clip_names.iter().map(|n| (*n, ())), |_| {
            next += 1;
            AnimationNodeIndex::new(next)
        });

        let anim = app.world_mut().spawn(AnimationPlayer::default()).id();
        let visual = app
            .world_mut()
            .spawn((
                PlayerModel,
                ActionMixer::new(clips, 0.2, 1.0),
                CharacterAnimationLink(anim),
                Transform::default(),
            ))
            .id();
        let body = app
            .world_mut()
            .spawn((
                Player,
                MovementState::default(),
                PlayerVisual(visual),
                LinearVelocity::default(),
                ExternalImpulse::default(),
                Position::from_xyz(0.0, 0.8, 0.0),
            ))
            .id();

        Harness { app, body, visual, anim }
    }

    impl Harness {
        fn input(&mut self) -> Mut<'_, PlayerInput> {
            self.app.world_mut().resource_mut::<PlayerInput>()
        }

        /// One frame, with key edges cleared afterwards as the input plugin would.
        fn tick(&mut self) {
            self.app.update();
            self.keys().clear();
        }

        fn keys(&mut self) -> Mut<'_, ButtonInput<KeyCode>> {
            self.app.world_mut().resource_mut::<ButtonInput<KeyCode>>()
        }

        fn set_vertical(&mut self, vy: f32, y: f32) {
            let mut entity = self.app.world_mut().entity_mut(self.body);
            entity.get_mut::<LinearVelocity>().unwrap().y = vy;
            entity.get_mut::<Position>().unwrap().y = y;
        }

        fn state(&self) -> AnimationState {
            self.app.world().get::<MovementState>(self.body).unwrap().animation
        }

        fn mixer(&self) -> &ActionMixer {
            self.app.world().get::<ActionMixer>(self.visual).unwrap()
        }

        /// Reads and clears the impulse a physics step would have consumed.
        fn take_impulse(&mut self) -> Vec3 {
            let mut impulse = self
                .app
                .world_mut()
                .get_mut::<ExternalImpulse>(self.body)
                .unwrap();
            let value = impulse.impulse();
            impulse.clear();
            value
        }
    }

    #[test]
    fn one_forward_tick_moves_and_faces_forward() {
        let mut h = harness(&["Idle", "Walk"]);
        h.input().forward = true;
        h.app.update();

        let velocity = h.app.world().get::<LinearVelocity>(h.body).unwrap();
        assert!(velocity.z < 0.0);
        assert_eq!(velocity.x, 0.0);
        assert_eq!(h.state(), AnimationState::Moving);

        let transform = h.app.world().get::<Transform>(h.visual).unwrap();
        let facing = transform.rotation * Vec3::Z;
        assert!((facing - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(h.mixer().current(), Some(ClipKind::Walk));
    }

    #[test]
    fn vertical_velocity_is_preserved() {
        let mut h = harness(&[]);
        h.set_vertical(-3.0, 2.0);
        h.input().right = true;
        h.app.update();

        let velocity = h.app.world().get::<LinearVelocity>(h.body).unwrap();
        assert_eq!(velocity.y, -3.0);
        assert_eq!(velocity.x, PlayerConfig::default().move_speed);
    }

    #[test]
    fn heading_is_kept_when_input_stops() {
        let mut h = harness(&[]);
        h.input().left = true;
        h.app.update();
        h.input().left = false;
        h.app.update();

        let transform = h.app.world().get::<Transform>(h.visual).unwrap();
        assert!((transform.rotation * Vec3::Z - Vec3::NEG_X).length() < 1e-5);
        assert_eq!(h.state(), AnimationState::Idle);
    }

    #[test]
    fn held_jump_applies_one_impulse() {
        let mut h = harness(&[]);
        h.input().on_key_down(ControlKey::Jump);

        h.app.update();
        assert!(h.take_impulse().y > 0.0);

        // Still grounded and key still held: no second impulse.
        h.input().on_key_down(ControlKey::Jump);
        h.app.update();
        h.app.update();
        assert_eq!(h.take_impulse(), Vec3::ZERO);

        h.input().on_key_up(ControlKey::Jump);
        h.input().on_key_down(ControlKey::Jump);
        h.app.update();
        assert!(h.take_impulse().y > 0.0);
    }

    #[test]
    fn jump_waits_for_ground() {
        let mut h = harness(&[]);
        h.set_vertical(2.0, 1.6);
        h.input().on_key_down(ControlKey::Jump);
        h.app.update();
        assert_eq!(h.take_impulse(), Vec3::ZERO);
        assert!(h.app.world().resource::<PlayerInput>().jump);
    }

    #[test]
    fn airborne_then_landing_while_moving() {
        let mut h = harness(&["Idle", "Jump", "Run", "Walk"]);
        h.input().forward = true;
        h.set_vertical(4.0, 1.5);
        h.app.update();
        assert_eq!(h.state(), AnimationState::Airborne);
        assert_eq!(h.mixer().current(), Some(ClipKind::Jump));

        h.set_vertical(0.0, 0.8);
        h.app.update();
        assert_eq!(h.state(), AnimationState::Moving);
        assert_eq!(h.mixer().current(), Some(ClipKind::Run));
        assert!(h.mixer().is_fading());

        let player = h.app.world().get::<AnimationPlayer>(h.anim).unwrap();
        // Sorted names give Idle=1, Jump=2, Run=3, Walk=4.
        assert!(player.is_playing_animation(AnimationNodeIndex::new(3)));
    }

    #[test]
    fn model_follows_body_position() {
        let mut h = harness(&[]);
        h.set_vertical(0.0, 3.0);
        h.app.update();

        let config = PlayerConfig::default();
        let transform = h.app.world().get::<Transform>(h.visual).unwrap();
        assert!((transform.translation.y - (3.0 + config.model_offset_y)).abs() < 1e-5);
    }

    #[test]
    fn arrow_key_runs_player_until_released() {
        let mut h = harness(&["Idle", "Run"]);
        h.keys().press(KeyCode::ArrowUp);
        h.tick();

        let velocity = h.app.world().get::<LinearVelocity>(h.body).unwrap();
        assert!(velocity.z < 0.0);
        assert_eq!(h.mixer().current(), Some(ClipKind::Run));

        h.keys().release(KeyCode::ArrowUp);
        h.tick();
        let velocity = h.app.world().get::<LinearVelocity>(h.body).unwrap();
        assert_eq!(velocity.z, 0.0);
        assert_eq!(h.state(), AnimationState::Idle);
    }

    #[test]
    fn focus_loss_stops_running_player() {
        let mut h = harness(&[]);
        h.keys().press(KeyCode::KeyW);
        h.tick();
        h.tick();
        assert!(h.input().forward);

        h.keys().release_all();
        h.tick();
        assert!(!h.input().forward);
        let velocity = h.app.world().get::<LinearVelocity>(h.body).unwrap();
        assert_eq!(velocity.z, 0.0);
    }

    #[test]
    fn held_space_key_jumps_once() {
        let mut h = harness(&[]);
        h.keys().press(KeyCode::Space);
        h.tick();
        assert!(h.take_impulse().y > 0.0);

        h.tick();
        h.tick();
        assert_eq!(h.take_impulse(), Vec3::ZERO);

        h.keys().release(KeyCode::Space);
        h.tick();
        h.keys().press(KeyCode::Space);
        h.tick();
        assert!(h.take_impulse().y > 0.0);
    }

    #[test]
    fn unmapped_key_does_nothing() {
        let mut h = harness(&[]);
        h.keys().press(KeyCode::KeyQ);
        h.tick();
        assert_eq!(*h.input(), PlayerInput::default());
        assert_eq!(h.take_impulse(), Vec3::ZERO);
    }
}
