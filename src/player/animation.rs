use bevy::{animation::graph::AnimationNodeIndex, prelude::*};

use super::components::{AnimationState, MovementState, Player, PlayerVisual};
use crate::character::{CharacterAnimationLink, ClipKind, ClipLibrary};

/// Clips to try for each state, most preferred first.
pub fn clip_preference(state: AnimationState) -> &'static [ClipKind] {
    match state {
        AnimationState::Idle => &[ClipKind::Idle],
        AnimationState::Moving => &[ClipKind::Run, ClipKind::Walk],
        AnimationState::Airborne => &[ClipKind::Jump],
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CurrentAction {
    kind: ClipKind,
    node: AnimationNodeIndex,
}

#[derive(Debug, Clone, Copy)]
struct WeightFade {
    node: AnimationNodeIndex,
    from: f32,
    to: f32,
    elapsed: f32,
}

/// Cross-fading front end over the character's `AnimationPlayer`.
///
/// Holds at most one current action. Switching actions restarts the incoming clip and
/// ramps its weight up while the outgoing one ramps down, then stops the outgoing clip.
#[derive(Component, Debug)]
pub struct ActionMixer {
    clips: ClipLibrary,
    fade_seconds: f32,
    time_scale: f32,
    current: Option<CurrentAction>,
    requested: Option<AnimationState>,
    fades: Vec<WeightFade>,
}

impl ActionMixer {
    pub fn new(clips: ClipLibrary, fade_seconds: f32, time_scale: f32) -> Self {
        Self {
            clips,
            fade_seconds,
            time_scale,
            current: None,
            requested: None,
            fades: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<ClipKind> {
        self.current.map(|c| c.kind)
    }

    pub fn is_fading(&self) -> bool {
        !self.fades.is_empty()
    }

    /// Plays the best clip for `state`. A state with no matching clip leaves the
    /// current action playing. Returns whether a new action started.
    pub fn request(&mut self, state: AnimationState, player: &mut AnimationPlayer) -> bool {
        if self.requested == Some(state) {
            return false;
        }
        self.requested = Some(state);

        let Some((kind, node)) = self.clips.resolve(clip_preference(state)) else {
            debug!("No clip for {:?}, keeping {:?}", state, self.current());
            return false;
        };
        self.crossfade_to(kind, node, player)
    }

    /// Switches to `kind`. Already current means no restart and no fade.
    pub fn crossfade_to(
        &mut self,
        kind: ClipKind,
        node: AnimationNodeIndex,
        player: &mut AnimationPlayer,
    ) -> bool {
        if self.current() == Some(kind) {
            return false;
        }
        let outgoing = self.current.replace(CurrentAction { kind, node });
        let fade = outgoing.is_some() && self.fade_seconds > 0.0;

        self.fades
            .retain(|f| f.node != node && Some(f.node) != outgoing.map(|o| o.node));

        let incoming = player.start(node);
        incoming
            .set_speed(self.time_scale)
            .set_weight(if fade { 0.0 } else { 1.0 });
        if kind.loops() {
            incoming.repeat();
        }

        if let Some(out) = outgoing {
            if fade {
                let from = player.animation(out.node).map_or(1.0, |a| a.weight());
                self.fades.push(WeightFade { node: out.node, from, to: 0.0, elapsed: 0.0 });
                self.fades.push(WeightFade { node, from: 0.0, to: 1.0, elapsed: 0.0 });
            } else {
                player.stop(out.node);
            }
        }

        debug!("Animation {:?} -> {:?}", outgoing.map(|o| o.kind), kind);
        true
    }

    /// Advances running fades by `delta` seconds and stops clips that faded out.
    pub fn advance(&mut self, delta: f32, player: &mut AnimationPlayer) {
        let duration = self.fade_seconds;
        self.fades.retain_mut(|fade| {
            fade.elapsed += delta;
            let t = if duration > 0.0 {
                (fade.elapsed / duration).min(1.0)
            } else {
                1.0
            };
            if let Some(active) = player.animation_mut(fade.node) {
                active.set_weight(fade.from + (fade.to - fade.from) * t);
            }
            if t < 1.0 {
                return true;
            }
            if fade.to == 0.0 {
                player.stop(fade.node);
            }
            false
        });
    }
}

pub fn drive_animation(
    bodies: Query<(&MovementState, &PlayerVisual), With<Player>>,
    mut visuals: Query<(&mut ActionMixer, &CharacterAnimationLink)>,
    mut players: Query<&mut AnimationPlayer>,
) {
    for (state, visual) in bodies.iter() {
        let Ok((mut mixer, link)) = visuals.get_mut(visual.0) else {
            continue;
        };
        let Ok(mut player) = players.get_mut(link.0) else {
            continue;
        };
        mixer.request(state.animation, &mut player);
    }
}

pub fn advance_crossfades(
    time: Res<Time>,
    mut visuals: Query<(&mut ActionMixer, &CharacterAnimationLink)>,
    mut players: Query<&mut AnimationPlayer>,
) {
    let delta = time.delta_secs();
    for (mut mixer, link) in visuals.iter_mut() {
        if !mixer.is_fading() {
            continue;
        }
        if let Ok(mut player) = players.get_mut(link.0) {
            mixer.advance(delta, &mut player);
        }
    }
}
