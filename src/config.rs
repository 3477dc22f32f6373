use std::{fmt, fs, io, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the tuning file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/config/player.json";

/// Tuning values for the player controller, camera and character assets.
///
/// Every field has a default, so a config file only needs the values it overrides.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Asset path of the character glTF.
    pub model_path: String,
    /// Uniform scale applied to the visual container.
    pub model_scale: f32,
    /// Vertical offset from the body center to the model origin.
    pub model_offset_y: f32,
    /// Horizontal speed in units per second.
    pub move_speed: f32,
    /// Upward impulse applied on jump.
    pub jump_impulse: f32,
    /// Mass of the player body.
    pub body_mass: f32,
    pub capsule_radius: f32,
    pub capsule_length: f32,
    /// Spawn height of the body center.
    pub spawn_height: f32,
    /// Jump gating: `|vy|` must be below this.
    pub grounded_velocity_epsilon: f32,
    /// Jump gating: body center height must be below this.
    pub ground_height_threshold: f32,
    /// `|vy|` above this counts as airborne for animation.
    pub airborne_velocity_threshold: f32,
    /// How long an airborne body must stay vertically slow before it counts as landed
    /// without passing the grounded check.
    pub airborne_settle_seconds: f32,
    pub crossfade_seconds: f32,
    pub animation_time_scale: f32,
    /// Upper bound for a single frame step, in seconds.
    pub max_frame_delta: f32,
    pub camera_offset: [f32; 3],
    pub camera_look_height: f32,
    pub camera_smoothing: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            model_path: "models/capybara.glb".to_string(),
            model_scale: 1.0,
            model_offset_y: -0.8,
            move_speed: 5.0,
            jump_impulse: 5.0,
            body_mass: 1.0,
            capsule_radius: 0.4,
            capsule_length: 0.8,
            spawn_height: 2.0,
            grounded_velocity_epsilon: 0.1,
            ground_height_threshold: 1.0,
            airborne_velocity_threshold: 0.5,
            airborne_settle_seconds: 0.15,
            crossfade_seconds: 0.2,
            animation_time_scale: 1.0,
            max_frame_delta: 0.1,
            camera_offset: [0.0, 3.0, 6.0],
            camera_look_height: 0.5,
            camera_smoothing: 5.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl PlayerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads the config, falling back to defaults when the file is absent or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded player config from {}", path.display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{} ({}), using defaults", e, path.display());
                Self::default()
            }
        }
    }

    pub fn camera_offset(&self) -> Vec3 {
        Vec3::from_array(self.camera_offset)
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<PlayerConfig>() {
            app.insert_resource(PlayerConfig::load_or_default(CONFIG_PATH));
        }
        app.add_systems(Startup, clamp_frame_delta);
    }
}

/// Bounds the virtual clock step so a long stall never produces one oversized tick.
fn clamp_frame_delta(config: Res<PlayerConfig>, mut time: ResMut<Time<Virtual>>) {
    let max = config.max_frame_delta.max(f32::EPSILON);
    time.set_max_delta(std::time::Duration::from_secs_f32(max));
    debug!("Max frame delta set to {}s", max);
}
