//! Data-flow particles running along the cable that serves the selection.

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::catalog::RitId;
use crate::scene::building::{FLOORS, FLOOR_HEIGHT};

pub mod curve;

pub use curve::FlowPath;

pub struct FlowPlugin;

impl Plugin for FlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlowConfig>()
            .init_resource::<ActiveFlow>()
            .insert_resource(FlowPaths::rit())
            .add_systems(Startup, spawn_particles)
            .add_systems(Update, (toggle_particles, advance_particles).chain());
    }
}

/// Cable run a particle stream can follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowRoute {
    /// Street access chamber to the SOTI.
    Main,
    /// Up the trunk shaft.
    Vertical,
    /// Along one floor, from the BUDI to the user outlets.
    Lateral,
}

impl FlowRoute {
    /// Route that carries signal to the given element.
    pub fn for_entry(id: RitId) -> FlowRoute {
        match id.0 {
            1..=4 => FlowRoute::Main,
            5 | 6 | 8 => FlowRoute::Vertical,
            _ => FlowRoute::Lateral,
        }
    }
}

/// Route currently animated, `None` when nothing is selected.
#[derive(Resource, Default, Debug)]
pub struct ActiveFlow(pub Option<FlowRoute>);

#[derive(Resource)]
pub struct FlowConfig {
    pub particle_count: usize,
    /// Slowest progress per frame along a route.
    pub min_speed: f32,
    /// Extra random progress per frame on top of `min_speed`.
    pub speed_jitter: f32,
    pub particle_radius: f32,
    pub seed: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            min_speed: 0.002,
            speed_jitter: 0.003,
            particle_radius: 0.125,
            seed: 4242,
        }
    }
}

/// The three representative cable runs of the building.
#[derive(Resource, Clone, Debug)]
pub struct FlowPaths {
    pub main: FlowPath,
    pub vertical: FlowPath,
    pub lateral: FlowPath,
}

impl FlowPaths {
    pub fn rit() -> Self {
        Self {
            main: main_fiber_path(),
            vertical: vertical_fiber_path(),
            lateral: floor_fiber_path(1),
        }
    }

    pub fn get(&self, route: FlowRoute) -> &FlowPath {
        match route {
            FlowRoute::Main => &self.main,
            FlowRoute::Vertical => &self.vertical,
            FlowRoute::Lateral => &self.lateral,
        }
    }
}

/// Underground feed from the street into the SOTI.
pub fn main_fiber_path() -> FlowPath {
    FlowPath::new([
        Vec3::new(18.0, -1.5, 0.0),
        Vec3::new(8.0, -1.5, 0.0),
        Vec3::new(7.0, -1.3, 0.0),
        Vec3::new(4.0, -1.2, 0.0),
        Vec3::new(0.0, -1.2, 0.0),
        Vec3::new(0.0, -1.05, 0.0),
    ])
}

/// Riser from the SOTI up the trunk shaft.
pub fn vertical_fiber_path() -> FlowPath {
    let top = (FLOORS as f32 - 1.0) * FLOOR_HEIGHT + 2.0;
    FlowPath::new([
        Vec3::new(0.0, -1.05, 0.0),
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(0.0, 8.0, 0.0),
        Vec3::new(0.0, 11.0, 0.0),
        Vec3::new(0.0, top, 0.0),
    ])
}

/// Horizontal fiber run on one floor, BUDI to outlets.
pub fn floor_fiber_path(floor: usize) -> FlowPath {
    let y = floor as f32 * FLOOR_HEIGHT + 1.2;
    FlowPath::new([
        Vec3::new(0.9, y, 1.0),
        Vec3::new(2.8, y, 1.0),
        Vec3::new(4.7, y, 1.0),
        Vec3::new(4.9, y, 1.0),
        Vec3::new(5.3, y, 1.8),
        Vec3::new(6.3, y, 2.0),
        Vec3::new(7.8, y, 2.0),
    ])
}

#[derive(Component)]
pub struct FlowParticle {
    /// Position along the active route in `[0, 1]`.
    pub progress: f32,
    /// Progress added per frame.
    pub speed: f32,
}

fn spawn_particles(
    mut commands: Commands,
    config: Res<FlowConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mesh = meshes.add(Sphere::new(config.particle_radius));

    for _ in 0..config.particle_count {
        let green = rng.gen_range(0.8..1.0);
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.0, green, 0.2),
            emissive: LinearRgba::rgb(0.0, green * 2.0, 0.4),
            unlit: true,
            alpha_mode: AlphaMode::Add,
            ..default()
        });

        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material),
            Transform::from_xyz(0.0, -100.0, 0.0),
            Visibility::Hidden,
            FlowParticle {
                progress: rng.gen::<f32>(),
                speed: config.min_speed + rng.gen::<f32>() * config.speed_jitter,
            },
        ));
    }

    info!("Spawned {} flow particles", config.particle_count);
}

fn toggle_particles(
    active: Res<ActiveFlow>,
    mut particles: Query<&mut Visibility, With<FlowParticle>>,
) {
    if !active.is_changed() {
        return;
    }

    let visibility = if active.0.is_some() {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    for mut vis in &mut particles {
        *vis = visibility;
    }
}

fn advance_particles(
    active: Res<ActiveFlow>,
    paths: Res<FlowPaths>,
    mut particles: Query<(&mut FlowParticle, &mut Transform)>,
) {
    let Some(route) = active.0 else {
        return;
    };
    let path = paths.get(route);

    for (mut particle, mut transform) in &mut particles {
        particle.progress += particle.speed;
        if particle.progress > 1.0 {
            particle.progress = 0.0;
        }
        transform.translation = path.point_at(particle.progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_follow_the_network_segment() {
        for id in 1..=4 {
            assert_eq!(FlowRoute::for_entry(RitId(id)), FlowRoute::Main);
        }
        for id in [5, 6, 8] {
            assert_eq!(FlowRoute::for_entry(RitId(id)), FlowRoute::Vertical);
        }
        for id in [7, 9, 10, 11, 12] {
            assert_eq!(FlowRoute::for_entry(RitId(id)), FlowRoute::Lateral);
        }
    }

    #[test]
    fn routes_connect_end_to_end() {
        let paths = FlowPaths::rit();
        // Street feed ends where the riser starts.
        assert_eq!(paths.main.point_at(1.0), paths.vertical.point_at(0.0));
        // The riser reaches the top floor.
        assert!(paths.vertical.point_at(1.0).y >= (FLOORS as f32 - 1.0) * FLOOR_HEIGHT);
        assert_eq!(paths.lateral.point_at(0.0).y, FLOOR_HEIGHT + 1.2);
    }
}
