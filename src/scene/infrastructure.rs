//! RIT elements: chambers, ducts, technical rooms, cabinets, outlets and antenna.
//!
//! Per-floor elements exist on every floor; the catalog points at one
//! representative floor for each of them.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use super::building::{roof_level, FLOORS, FLOOR_HEIGHT};
use super::{flat, solid, srgb_hex, Part, RenderableRegistry, SceneBuilder, Shape, Surface};
use crate::catalog::RitId;
use crate::flow::{floor_fiber_path, main_fiber_path, vertical_fiber_path};
use crate::selection::highlight::EmissiveChannel;

const DUCT_ORANGE: u32 = 0xff4d00;
const LATERAL_CYAN: u32 = 0x00b4d8;
const CHAMBER_GREY: u32 = 0x6c757d;

/// Floor whose BUDI, lateral duct, CTR and internal duct stand for all floors.
pub const REPRESENTATIVE_FLOOR: usize = 1;
/// Floor whose user outlets stand for all floors.
pub const OUTLET_FLOOR: usize = 2;

/// Self-lit marker whose glow oscillates continuously.
#[derive(Component, Clone, Copy, Debug)]
pub struct Beacon {
    pub base_intensity: f32,
}

fn orange_duct() -> (StandardMaterial, EmissiveChannel) {
    (
        solid(DUCT_ORANGE, 0.3, 0.3),
        EmissiveChannel::new(srgb_hex(DUCT_ORANGE), 0.1),
    )
}

fn cyan_duct() -> (StandardMaterial, EmissiveChannel) {
    (
        solid(LATERAL_CYAN, 0.3, 0.4),
        EmissiveChannel::new(srgb_hex(LATERAL_CYAN), 0.1),
    )
}

/// Horizontal cylinder along X.
fn horizontal_pipe(name: &'static str, radius: f32, length: f32, look: (StandardMaterial, EmissiveChannel)) -> Part {
    let (material, channel) = look;
    Part::new(name, Shape::Cylinder { radius, height: length }, Surface::Unique(material))
        .rotated(Quat::from_rotation_z(FRAC_PI_2))
        .emissive(channel)
}

/// Surface with a dark emissive channel, so the selection can light it up.
fn highlightable(name: &'static str, shape: Shape, material: StandardMaterial) -> Part {
    Part::new(name, shape, Surface::Unique(material)).emissive(EmissiveChannel::dark())
}

fn chamber(name: &'static str, x: f32) -> Part {
    highlightable(
        name,
        Shape::Box(Vec3::new(1.8, 1.4, 1.8)),
        solid(CHAMBER_GREY, 0.6, 0.4),
    )
    .at(Vec3::new(x, -1.3, 0.0))
}

pub fn spawn_infrastructure(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut registry: ResMut<RenderableRegistry>,
) {
    let lid = materials.add(solid(0x495057, 0.5, 0.6));
    let door = materials.add(solid(0x343a40, 0.5, 0.0));
    let nameplate = materials.add(flat(LATERAL_CYAN));
    let status_led = materials.add(flat(0x00cc00));

    let mut builder = SceneBuilder {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &mut materials,
        registry: &mut registry,
    };

    spawn_street_side(&mut builder, &lid);
    spawn_technical_rooms(&mut builder, &door);
    spawn_floor_elements(&mut builder, &nameplate, &status_led);
    spawn_antenna(&mut builder);
    spawn_fiber(&mut builder);

    info!(
        "Infrastructure spawned: {} RIT elements registered",
        builder.registry.len()
    );
}

fn spawn_street_side(builder: &mut SceneBuilder, lid: &Handle<StandardMaterial>) {
    builder.spawn_entry(RitId(1), chamber("Access Chamber", 18.0));
    builder.spawn_entry(
        RitId(2),
        horizontal_pipe("External Duct", 0.2, 8.0, orange_duct()).at(Vec3::new(14.0, -1.5, 0.0)),
    );
    builder.spawn_entry(RitId(3), chamber("Pass Chamber", 8.0));
    builder.spawn_entry(
        RitId(4),
        horizontal_pipe("Link Duct", 0.2, 8.0, orange_duct()).at(Vec3::new(4.0, -1.2, 0.0)),
    );

    for x in [18.0, 8.0] {
        builder.spawn(
            Part::new("Chamber Lid", Shape::Box(Vec3::new(2.0, 0.15, 2.0)), Surface::Shared(lid.clone()))
                .at(Vec3::new(x, -0.55, 0.0)),
        );
    }
}

fn spawn_technical_rooms(builder: &mut SceneBuilder, door: &Handle<StandardMaterial>) {
    let (room, channel) = orange_duct();
    let room = StandardMaterial {
        perceptual_roughness: 0.4,
        metallic: 0.5,
        ..room
    };

    // SOTI in the basement and SOTS on the roof form one element.
    builder.spawn_entry_group(
        RitId(5),
        "SOTI / SOTS",
        Transform::IDENTITY,
        vec![
            Part::new("SOTI", Shape::Box(Vec3::new(3.5, 1.9, 3.0)), Surface::Unique(room.clone()))
                .at(Vec3::new(0.0, -1.05, 0.0))
                .emissive(channel),
            Part::new("SOTS", Shape::Box(Vec3::new(3.0, 2.2, 2.5)), Surface::Unique(room))
                .at(Vec3::new(0.0, FLOORS as f32 * FLOOR_HEIGHT + 1.6, 0.0))
                .emissive(channel),
        ],
    );
    builder.spawn(
        Part::new("SOTI Door", Shape::Panel(Vec2::new(1.2, 1.5)), Surface::Shared(door.clone()))
            .at(Vec3::new(0.0, -1.2, 1.51))
            .no_shadows(),
    );

    let (shaft, channel) = orange_duct();
    let shaft_height = FLOORS as f32 * FLOOR_HEIGHT - 2.0;
    builder.spawn_entry(
        RitId(6),
        Part::new(
            "Trunk Shaft",
            Shape::Cylinder {
                radius: 0.5,
                height: shaft_height,
            },
            Surface::Unique(StandardMaterial { metallic: 0.4, ..shaft }),
        )
        .at(Vec3::new(0.0, FLOORS as f32 * FLOOR_HEIGHT / 2.0 + 1.0, 0.0))
        .emissive(channel),
    );
}

fn spawn_floor_elements(
    builder: &mut SceneBuilder,
    nameplate: &Handle<StandardMaterial>,
    status_led: &Handle<StandardMaterial>,
) {
    for level in 0..FLOORS {
        let base = level as f32 * FLOOR_HEIGHT;
        let representative = level == REPRESENTATIVE_FLOOR;

        // BUDI cabinet with its nameplate
        let budi = highlightable(
            "BUDI",
            Shape::Box(Vec3::new(1.0, 1.2, 0.6)),
            solid(CHAMBER_GREY, 0.5, 0.5),
        )
        .at(Vec3::new(0.8, base + 1.0, 1.0));
        let plate = Part::new("BUDI Nameplate", Shape::Panel(Vec2::new(0.6, 0.3)), Surface::Shared(nameplate.clone()))
            .at(Vec3::new(0.8, base + 1.3, 1.31))
            .no_shadows();
        if representative {
            builder.spawn_entry_group(RitId(7), "BUDI", Transform::IDENTITY, vec![budi, plate]);
        } else {
            builder.spawn(budi);
            builder.spawn(plate);
        }

        let lateral = horizontal_pipe("Lateral Duct", 0.12, 3.5, cyan_duct()).at(Vec3::new(2.8, base + 1.2, 1.0));
        spawn_maybe_entry(builder, representative.then_some(RitId(9)), lateral);

        // CTR with its status LED
        let ctr = highlightable(
            "CTR",
            Shape::Box(Vec3::new(0.6, 0.7, 0.18)),
            solid(0xf0f0f0, 0.3, 0.1),
        )
        .at(Vec3::new(4.8, base + 1.2, 1.0));
        spawn_maybe_entry(builder, representative.then_some(RitId(10)), ctr);
        builder.spawn(
            Part::new("CTR Status LED", Shape::Disc(0.08), Surface::Shared(status_led.clone()))
                .at(Vec3::new(4.8, base + 1.4, 1.1))
                .no_shadows(),
        );

        let internal = horizontal_pipe("Internal Duct", 0.08, 2.7, cyan_duct()).at(Vec3::new(6.3, base + 1.2, 2.0));
        spawn_maybe_entry(builder, representative.then_some(RitId(11)), internal);

        let outlets: Vec<Part> = [2.0, 3.0]
            .into_iter()
            .map(|z| {
                highlightable(
                    "User Outlet",
                    Shape::Box(Vec3::new(0.3, 0.4, 0.1)),
                    solid(0xffc107, 0.3, 0.5),
                )
                .at(Vec3::new(7.8, base + 1.2, z))
            })
            .collect();
        if level == OUTLET_FLOOR {
            builder.spawn_entry_group(RitId(12), "User Outlets", Transform::IDENTITY, outlets);
        } else {
            for outlet in outlets {
                builder.spawn(outlet);
            }
        }

        builder.spawn(
            Part::new(
                "Floor Fiber",
                Shape::Tube {
                    path: floor_fiber_path(level),
                    radius: 0.04,
                },
                Surface::Unique(solid(LATERAL_CYAN, 0.3, 0.5)),
            )
            .no_shadows(),
        );
    }
}

fn spawn_maybe_entry(builder: &mut SceneBuilder, id: Option<RitId>, part: Part) -> Entity {
    match id {
        Some(id) => builder.spawn_entry(id, part),
        None => builder.spawn(part),
    }
}

fn spawn_antenna(builder: &mut SceneBuilder) {
    let tilt = Quat::from_rotation_x(PI - 0.5);
    let beacon_intensity = 0.8;

    builder.spawn_entry_group(
        RitId(8),
        "Antenna Mast",
        Transform::from_xyz(0.0, roof_level(), 0.0),
        vec![
            highlightable(
                "Satellite Dish",
                Shape::Sphere(1.2),
                StandardMaterial {
                    double_sided: true,
                    cull_mode: None,
                    ..solid(0xffffff, 0.2, 0.8)
                },
            )
            .at(Vec3::new(-2.0, 1.0, 0.0))
            .rotated(tilt)
            .scaled(Vec3::new(1.0, 0.35, 1.0)),
            highlightable(
                "Dish Arm",
                Shape::Cylinder {
                    radius: 0.08,
                    height: 1.8,
                },
                solid(0x666666, 0.5, 0.0),
            )
            .at(Vec3::new(-2.0, 1.5, 0.5))
            .rotated(tilt),
            highlightable(
                "Mast",
                Shape::Frustum {
                    radius_top: 0.08,
                    radius_bottom: 0.12,
                    height: 2.5,
                },
                solid(0xaaaabb, 0.5, 0.9),
            )
            .at(Vec3::new(2.0, 1.25, 0.0)),
            Part::new("Beacon", Shape::Sphere(0.2), Surface::Unique(solid(0xff0000, 0.5, 0.0)))
                .at(Vec3::new(2.0, 2.6, 0.0))
                .emissive(EmissiveChannel::new(srgb_hex(0xff0000), beacon_intensity)),
        ],
    );

    // The beacon is the last leaf of the mast group.
    if let Some(&beacon) = builder.registry.leaves(RitId(8)).last() {
        builder.commands.entity(beacon).insert(Beacon {
            base_intensity: beacon_intensity,
        });
    }
}

fn spawn_fiber(builder: &mut SceneBuilder) {
    for (name, path) in [("Main Fiber", main_fiber_path()), ("Riser Fiber", vertical_fiber_path())] {
        builder.spawn(
            Part::new(name, Shape::Tube { path, radius: 0.04 }, Surface::Unique(solid(DUCT_ORANGE, 0.3, 0.5)))
                .no_shadows(),
        );
    }
}
