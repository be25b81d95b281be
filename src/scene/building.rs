//! Five storey condominium block: slabs, columns, glazing, roof and basement.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::{solid, srgb_hex, translucent, Part, RenderableRegistry, SceneBuilder, Shape, Surface};

pub const FLOORS: usize = 5;
pub const FLOOR_HEIGHT: f32 = 3.0;
pub const BUILDING_WIDTH: f32 = 16.0;
pub const BUILDING_DEPTH: f32 = 10.0;

/// Height of the roof slab's top face.
pub fn roof_level() -> f32 {
    FLOORS as f32 * FLOOR_HEIGHT + 0.5
}

fn column_positions() -> [(f32, f32); 6] {
    let x = BUILDING_WIDTH / 2.0 - 0.5;
    let z = BUILDING_DEPTH / 2.0 - 0.5;
    [(-x, z), (x, z), (-x, -z), (x, -z), (0.0, z), (0.0, -z)]
}

pub fn spawn_building(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut registry: ResMut<RenderableRegistry>,
) {
    let concrete = materials.add(solid(0xf8f9fa, 0.6, 0.1));
    let floor = materials.add(solid(0xe9ecef, 0.8, 0.1));
    let glass = materials.add(StandardMaterial {
        base_color: srgb_hex(0x88ccff).with_alpha(0.4),
        perceptual_roughness: 0.05,
        metallic: 0.2,
        clearcoat: 1.0,
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    });
    let partition = materials.add(translucent(0xffffff, 0.2, 0.8));
    let basement = materials.add(translucent(0x495057, 0.3, 0.8));

    let mut builder = SceneBuilder {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &mut materials,
        registry: &mut registry,
    };

    for level in 0..FLOORS {
        let base = level as f32 * FLOOR_HEIGHT;

        builder.spawn(
            Part::new(
                "Floor Slab",
                Shape::Box(Vec3::new(BUILDING_WIDTH, 0.3, BUILDING_DEPTH)),
                Surface::Shared(floor.clone()),
            )
            .at(Vec3::new(0.0, base, 0.0)),
        );

        for (x, z) in column_positions() {
            builder.spawn(
                Part::new(
                    "Column",
                    Shape::Box(Vec3::new(0.5, FLOOR_HEIGHT - 0.3, 0.5)),
                    Surface::Shared(concrete.clone()),
                )
                .at(Vec3::new(x, base + FLOOR_HEIGHT / 2.0, z)),
            );
        }

        // Ground floor is open; upper floors get four windows per facade.
        if level > 0 {
            for w in 0..4 {
                let x = -4.5 + w as f32 * 3.0;
                builder.spawn(
                    Part::new("Window", Shape::Panel(Vec2::splat(2.0)), Surface::Shared(glass.clone()))
                        .at(Vec3::new(x, base + 1.5, BUILDING_DEPTH / 2.0 + 0.01))
                        .no_shadows(),
                );
                builder.spawn(
                    Part::new("Window", Shape::Panel(Vec2::splat(2.0)), Surface::Shared(glass.clone()))
                        .at(Vec3::new(x, base + 1.5, -BUILDING_DEPTH / 2.0 - 0.01))
                        .rotated(Quat::from_rotation_y(PI))
                        .no_shadows(),
                );
            }
        }

        // Wall between the corridor and the apartment
        builder.spawn(
            Part::new(
                "Partition Wall",
                Shape::Box(Vec3::new(0.1, FLOOR_HEIGHT - 0.2, 4.0)),
                Surface::Shared(partition.clone()),
            )
            .at(Vec3::new(4.85, base + FLOOR_HEIGHT / 2.0, 0.0))
            .no_shadows(),
        );
    }

    builder.spawn(
        Part::new(
            "Roof",
            Shape::Box(Vec3::new(BUILDING_WIDTH + 1.0, 0.5, BUILDING_DEPTH + 1.0)),
            Surface::Shared(concrete),
        )
        .at(Vec3::new(0.0, FLOORS as f32 * FLOOR_HEIGHT + 0.25, 0.0)),
    );

    builder.spawn(
        Part::new(
            "Basement",
            Shape::Box(Vec3::new(BUILDING_WIDTH - 0.5, 2.0, BUILDING_DEPTH - 0.5)),
            Surface::Shared(basement),
        )
        .at(Vec3::new(0.0, -1.0, 0.0))
        .no_shadows(),
    );

    info!("Building spawned: {} floors", FLOORS);
}
