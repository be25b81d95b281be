//! Daylight lighting, ground, street and lot boundary.

use bevy::{pbr::DirectionalLightShadowMap, prelude::*};

use super::{flat, solid, srgb_hex, Part, RenderableRegistry, SceneBuilder, Shape, Surface};

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnvironmentConfig>()
            .insert_resource(ClearColor(srgb_hex(0xf0f2f5)))
            .insert_resource(DirectionalLightShadowMap { size: 2048 })
            .add_systems(Startup, (setup_lighting, spawn_ground))
            .add_systems(Update, draw_ground_grid);
    }
}

#[derive(Resource)]
pub struct EnvironmentConfig {
    pub ambient_brightness: f32,
    pub sun_illuminance: f32,
    pub fill_illuminance: f32,
    /// Ground grid extent in world units.
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub show_grid: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            ambient_brightness: 500.0,
            sun_illuminance: 9000.0,
            fill_illuminance: 2500.0,
            grid_size: 100.0,
            grid_divisions: 50,
            show_grid: true,
        }
    }
}

/// Level of the ground plane.
pub const GROUND_Y: f32 = -2.0;

fn setup_lighting(mut commands: Commands, config: Res<EnvironmentConfig>) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: config.ambient_brightness,
    });

    // Warm key light with shadows
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            color: srgb_hex(0xffffee),
            illuminance: config.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 50.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Cool fill from the opposite side
    commands.spawn((
        Name::new("Fill Light"),
        DirectionalLight {
            color: srgb_hex(0xddeeff),
            illuminance: config.fill_illuminance,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-10.0, 10.0, -10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut registry: ResMut<RenderableRegistry>,
) {
    let ground = materials.add(solid(0xe3e6e8, 1.0, 0.0));
    let street = materials.add(solid(0x343a40, 0.8, 0.0));
    let lane = materials.add(flat(0xffffff));
    let boundary = materials.add(StandardMaterial {
        base_color: srgb_hex(0xff4d00).with_alpha(0.7),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    let mut builder = SceneBuilder {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &mut materials,
        registry: &mut registry,
    };

    builder.spawn(
        Part::new("Ground", Shape::Plane(Vec2::new(100.0, 100.0)), Surface::Shared(ground))
            .at(Vec3::new(0.0, GROUND_Y, 0.0))
            .no_shadows(),
    );
    builder.spawn(
        Part::new("Street", Shape::Plane(Vec2::new(8.0, 100.0)), Surface::Shared(street))
            .at(Vec3::new(22.0, GROUND_Y + 0.05, 0.0))
            .no_shadows(),
    );

    // Dashed centre line
    for z in (-40..40).step_by(8) {
        builder.spawn(
            Part::new("Lane Marking", Shape::Plane(Vec2::new(0.2, 3.0)), Surface::Shared(lane.clone()))
                .at(Vec3::new(22.0, GROUND_Y + 0.1, z as f32))
                .no_shadows(),
        );
    }

    // Property line between the public street and the condominium
    builder.spawn(
        Part::new("Property Boundary", Shape::Plane(Vec2::new(0.15, 60.0)), Surface::Shared(boundary))
            .at(Vec3::new(10.0, GROUND_Y + 0.1, 0.0))
            .no_shadows(),
    );

    info!("Environment spawned");
}

/// Reference grid on the ground plane.
fn draw_ground_grid(config: Res<EnvironmentConfig>, mut gizmos: Gizmos) {
    if !config.show_grid || config.grid_divisions == 0 {
        return;
    }

    let half = config.grid_size / 2.0;
    let step = config.grid_size / config.grid_divisions as f32;
    let y = GROUND_Y + 0.01;
    let center_color = srgb_hex(0xadb5bd);
    let line_color = srgb_hex(0xcfd4da);

    for i in 0..=config.grid_divisions {
        let offset = -half + i as f32 * step;
        let color = if offset.abs() < step * 0.5 {
            center_color
        } else {
            line_color
        };
        gizmos.line(Vec3::new(offset, y, -half), Vec3::new(offset, y, half), color);
        gizmos.line(Vec3::new(-half, y, offset), Vec3::new(half, y, offset), color);
    }
}
