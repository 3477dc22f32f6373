use std::collections::HashMap;

use bevy::{animation::graph::AnimationNodeIndex, prelude::*};

/// Canonical animation kinds the controller knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipKind {
    Idle,
    Walk,
    Run,
    Jump,
}

impl ClipKind {
    pub const ALL: [ClipKind; 4] = [ClipKind::Idle, ClipKind::Walk, ClipKind::Run, ClipKind::Jump];

    /// Name tokens that identify each kind, matched against lowercase clip name tokens.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            ClipKind::Idle => &["idle", "static", "stand", "standing", "rest"],
            ClipKind::Walk => &["walk", "walking"],
            ClipKind::Run => &["run", "running", "sprint", "gallop", "trot"],
            ClipKind::Jump => &["jump", "jumping", "fall", "falling", "air", "airborne"],
        }
    }

    /// Classifies a source clip name, e.g. `Armature|Run` or `CapybaraWalkCycle`.
    ///
    /// The first name token that matches an alias decides the kind.
    pub fn from_clip_name(name: &str) -> Option<ClipKind> {
        name_tokens(name).into_iter().find_map(|token| {
            ClipKind::ALL
                .into_iter()
                .find(|kind| kind.aliases().contains(&token.as_str()))
        })
    }

    /// Whether the clip should loop once started.
    pub fn loops(self) -> bool {
        !matches!(self, ClipKind::Jump)
    }
}

/// Splits on non-alphanumeric characters, on lower-to-upper camel case boundaries and
/// between letters and digits.
fn name_tokens(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            let camel = p.is_ascii_lowercase() && c.is_ascii_uppercase();
            let digit_edge = p.is_ascii_digit() != c.is_ascii_digit();
            if camel || digit_edge {
                tokens.push(std::mem::take(&mut current));
            }
        }
        prev = Some(c);
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Enum-keyed mapping from clip kind to its node in the character's animation graph.
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    nodes: HashMap<ClipKind, AnimationNodeIndex>,
}

impl ClipLibrary {
    /// Builds the library from named clips.
    ///
    /// Names are visited in sorted order so the winner for a contested kind is stable.
    /// `add` is only called for clips that claim a kind, and returns the graph node for it.
    pub fn from_named_clips<'a, C>(
        clips: impl IntoIterator<Item = (&'a str, C)>,
        mut add: impl FnMut(C) -> AnimationNodeIndex,
    ) -> Self {
        let mut clips: Vec<(&str, C)> = clips.into_iter().collect();
        clips.sort_by(|a, b| a.0.cmp(b.0));

        let mut nodes = HashMap::new();
        for (name, clip) in clips {
            let Some(kind) = ClipKind::from_clip_name(name) else {
                debug!("Clip '{}' matches no animation kind", name);
                continue;
            };
            if nodes.contains_key(&kind) {
                debug!("Clip '{}' ignored, {:?} already assigned", name, kind);
                continue;
            }
            info!("Clip '{}' -> {:?}", name, kind);
            nodes.insert(kind, add(clip));
        }
        Self { nodes }
    }

    pub fn get(&self, kind: ClipKind) -> Option<AnimationNodeIndex> {
        self.nodes.get(&kind).copied()
    }

    /// First available kind from `preferred`, with its node.
    pub fn resolve(&self, preferred: &[ClipKind]) -> Option<(ClipKind, AnimationNodeIndex)> {
        preferred
            .iter()
            .find_map(|&kind| self.get(kind).map(|node| (kind, node)))
    }

    pub fn missing(&self) -> Vec<ClipKind> {
        ClipKind::ALL
            .into_iter()
            .filter(|kind| !self.nodes.contains_key(kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
