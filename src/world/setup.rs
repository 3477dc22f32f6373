use avian3d::prelude::*;
use bevy::prelude::*;

use crate::game_state::SessionEntity;

use super::{CRATE_SIZE, GROUND_SIZE, GROUND_THICKNESS};

/// Static props to walk around, as (x, z) positions.
const CRATE_POSITIONS: [(f32, f32); 4] = [(4.0, -3.0), (-5.0, -6.0), (6.0, 5.0), (-3.0, 4.0)];

pub fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Materials
    let ground_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.55, 0.3),
        perceptual_roughness: 0.9,
        ..default()
    });
    let crate_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.6, 0.45, 0.3),
        ..default()
    });

    // Ground: visual plane at y = 0, collider slab below it
    commands.spawn((
        SessionEntity,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(ground_material),
        Transform::default(),
    ));
    commands.spawn((
        SessionEntity,
        RigidBody::Static,
        Collider::cuboid(GROUND_SIZE, GROUND_THICKNESS, GROUND_SIZE),
        Transform::from_xyz(0.0, -GROUND_THICKNESS / 2.0, 0.0),
    ));

    // Crates
    let crate_mesh = meshes.add(Cuboid::new(CRATE_SIZE, CRATE_SIZE, CRATE_SIZE));
    for (x, z) in CRATE_POSITIONS {
        commands.spawn((
            SessionEntity,
            RigidBody::Static,
            Collider::cuboid(CRATE_SIZE, CRATE_SIZE, CRATE_SIZE),
            Mesh3d(crate_mesh.clone()),
            MeshMaterial3d(crate_material.clone()),
            Transform::from_xyz(x, CRATE_SIZE / 2.0, z),
        ));
    }

    // Sun
    commands.spawn((
        SessionEntity,
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 15.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("World ready");
}
