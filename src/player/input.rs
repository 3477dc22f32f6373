use bevy::prelude::*;

/// Logical controls the player responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Forward,
    Back,
    Left,
    Right,
    Jump,
}

impl ControlKey {
    /// Maps physical keys to controls. Letter keys and arrows both steer.
    pub fn from_key_code(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(ControlKey::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(ControlKey::Back),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(ControlKey::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(ControlKey::Right),
            KeyCode::Space => Some(ControlKey::Jump),
            _ => None,
        }
    }
}

/// Discrete input flags, written from key presses/releases and read once per tick.
///
/// Movement flags follow the key. `jump` is a one-shot request: a press arms it only
/// if the key was released since the last press, and the controller clears it when
/// it applies the impulse.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct PlayerInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    jump_held: bool,
}

impl PlayerInput {
    pub fn on_key_down(&mut self, key: ControlKey) {
        match key {
            ControlKey::Forward => self.forward = true,
            ControlKey::Back => self.back = true,
            ControlKey::Left => self.left = true,
            ControlKey::Right => self.right = true,
            ControlKey::Jump => {
                if !self.jump_held {
                    self.jump = true;
                }
                self.jump_held = true;
            }
        }
    }

    pub fn on_key_up(&mut self, key: ControlKey) {
        match key {
            ControlKey::Forward => self.forward = false,
            ControlKey::Back => self.back = false,
            ControlKey::Left => self.left = false,
            ControlKey::Right => self.right = false,
            ControlKey::Jump => {
                self.jump = false;
                self.jump_held = false;
            }
        }
    }

    /// Takes a pending jump request, leaving it cleared.
    pub fn consume_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump)
    }

    /// Raw intention (x, z): forward is -z, right is +x. Opposite keys cancel.
    pub fn raw_intention(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.forward, self.back))
    }
}

/// Feeds this frame's key presses and releases into the input flags.
///
/// `ButtonInput` releases every key when the window loses keyboard focus, so a key held
/// during alt-tab is cleared here too.
pub fn capture_keyboard(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    for key in keys.get_just_pressed().filter_map(|&k| ControlKey::from_key_code(k)) {
        input.on_key_down(key);
    }
    for key in keys.get_just_released().filter_map(|&k| ControlKey::from_key_code(k)) {
        input.on_key_up(key);
    }
}

pub fn reset_input(mut input: ResMut<PlayerInput>) {
    *input = PlayerInput::default();
}
