//! Static scene construction: environment, building and RIT elements.
//!
//! Geometry is described as [`Part`]s (a shape, a surface and a transform)
//! and spawned through a [`SceneBuilder`], which also records which entities
//! represent each catalog entry.

use bevy::pbr::NotShadowCaster;
use bevy::picking::mesh_picking::RayCastPickable;
use bevy::prelude::*;
use smallvec::SmallVec;

use crate::catalog::{Catalog, RitId};
use crate::flow::FlowPath;
use crate::selection::highlight::EmissiveChannel;

pub mod building;
pub mod environment;
pub mod infrastructure;
pub mod registry;

pub use registry::{Renderable, RenderableRegistry};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderableRegistry>()
            .add_plugins(environment::EnvironmentPlugin)
            .add_systems(
                Startup,
                (
                    building::spawn_building,
                    infrastructure::spawn_infrastructure,
                    report_unplaced_entries,
                )
                    .chain(),
            );
    }
}

/// Geometry primitives used by the scene.
#[derive(Clone, Debug)]
pub enum Shape {
    Box(Vec3),
    Cylinder { radius: f32, height: f32 },
    Frustum { radius_top: f32, radius_bottom: f32, height: f32 },
    Sphere(f32),
    /// Horizontal plane facing +Y.
    Plane(Vec2),
    /// Vertical rectangle facing +Z.
    Panel(Vec2),
    /// Disc facing +Z.
    Disc(f32),
    Tube { path: FlowPath, radius: f32 },
}

impl Shape {
    pub fn mesh(&self) -> Mesh {
        match self {
            Shape::Box(size) => Mesh::from(Cuboid::new(size.x, size.y, size.z)),
            Shape::Cylinder { radius, height } => Mesh::from(Cylinder::new(*radius, *height)),
            Shape::Frustum {
                radius_top,
                radius_bottom,
                height,
            } => Mesh::from(ConicalFrustum {
                radius_top: *radius_top,
                radius_bottom: *radius_bottom,
                height: *height,
            }),
            Shape::Sphere(radius) => Mesh::from(Sphere::new(*radius)),
            Shape::Plane(size) => Mesh::from(Plane3d::new(Vec3::Y, *size / 2.0)),
            Shape::Panel(size) => Mesh::from(Rectangle::new(size.x, size.y)),
            Shape::Disc(radius) => Mesh::from(Circle::new(*radius)),
            Shape::Tube { path, radius } => path.tube_mesh(*radius, 64, 8),
        }
    }
}

/// Material of a part: shared between parts, or owned by this one.
#[derive(Clone, Debug)]
pub enum Surface {
    Shared(Handle<StandardMaterial>),
    Unique(StandardMaterial),
}

/// One mesh of the scene.
#[derive(Clone, Debug)]
pub struct Part {
    pub name: &'static str,
    pub shape: Shape,
    pub surface: Surface,
    pub transform: Transform,
    pub emissive: Option<EmissiveChannel>,
    pub cast_shadows: bool,
}

impl Part {
    pub fn new(name: &'static str, shape: Shape, surface: Surface) -> Self {
        Self {
            name,
            shape,
            surface,
            transform: Transform::IDENTITY,
            emissive: None,
            cast_shadows: true,
        }
    }

    pub fn at(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Give the part an emissive channel the selection can override.
    pub fn emissive(mut self, channel: EmissiveChannel) -> Self {
        self.emissive = Some(channel);
        self
    }

    pub fn no_shadows(mut self) -> Self {
        self.cast_shadows = false;
        self
    }
}

/// Spawns parts and registers the ones that draw catalog entries.
pub struct SceneBuilder<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub registry: &'a mut RenderableRegistry,
}

impl SceneBuilder<'_, '_, '_> {
    pub fn spawn(&mut self, part: Part) -> Entity {
        self.spawn_inner(part, false)
    }

    /// Spawn a single mesh that represents a catalog entry.
    pub fn spawn_entry(&mut self, id: RitId, part: Part) -> Entity {
        let entity = self.spawn_inner(part, true);
        self.registry.insert(
            id,
            Renderable {
                root: entity,
                leaves: SmallVec::from_slice(&[entity]),
            },
        );
        entity
    }

    /// Spawn a group of meshes that together represent a catalog entry.
    pub fn spawn_entry_group(
        &mut self,
        id: RitId,
        name: &'static str,
        transform: Transform,
        parts: Vec<Part>,
    ) -> Entity {
        let leaves: SmallVec<[Entity; 4]> = parts
            .into_iter()
            .map(|part| self.spawn_inner(part, true))
            .collect();

        let root = self
            .commands
            .spawn((Name::new(name), transform, Visibility::default()))
            .add_children(&leaves)
            .id();

        self.registry.insert(id, Renderable { root, leaves });
        root
    }

    fn spawn_inner(&mut self, part: Part, pickable: bool) -> Entity {
        let mesh = self.meshes.add(part.shape.mesh());
        let material = match part.surface {
            Surface::Shared(handle) => {
                debug_assert!(
                    part.emissive.is_none(),
                    "emissive part {} must own its material",
                    part.name
                );
                handle
            }
            Surface::Unique(mut material) => {
                if let Some(channel) = part.emissive {
                    material.emissive = channel.radiance(1.0);
                }
                self.materials.add(material)
            }
        };

        let mut entity = self.commands.spawn((
            Name::new(part.name),
            Mesh3d(mesh),
            MeshMaterial3d(material),
            part.transform,
        ));
        if let Some(channel) = part.emissive {
            entity.insert(channel);
        }
        if !part.cast_shadows {
            entity.insert(NotShadowCaster);
        }
        if pickable {
            entity.insert(RayCastPickable);
        }
        entity.id()
    }
}

/// Solid PBR surface with the given sRGB colour.
pub fn solid(color: u32, roughness: f32, metallic: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: srgb_hex(color),
        perceptual_roughness: roughness,
        metallic,
        ..default()
    }
}

/// Alpha-blended surface visible from both sides.
pub fn translucent(color: u32, alpha: f32, roughness: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: srgb_hex(color).with_alpha(alpha),
        perceptual_roughness: roughness,
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

/// Flat colour unaffected by lighting.
pub fn flat(color: u32) -> StandardMaterial {
    StandardMaterial {
        base_color: srgb_hex(color),
        unlit: true,
        ..default()
    }
}

pub fn srgb_hex(color: u32) -> Color {
    let [_, r, g, b] = color.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

fn report_unplaced_entries(catalog: Res<Catalog>, registry: Res<RenderableRegistry>) {
    let mut missing = 0;
    for entry in catalog.entries() {
        match registry.get(entry.id) {
            Some(renderable) => debug!("RIT {} drawn by {} meshes", entry.id, renderable.leaves.len()),
            None => {
                error!("RIT {} ({}) has no 3D representation", entry.id, entry.name);
                missing += 1;
            }
        }
    }
    info!(
        "Scene built: {} of {} RIT elements placed",
        catalog.len() - missing,
        catalog.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_decode() {
        let orange = srgb_hex(0xff4d00).to_srgba();
        assert_eq!(orange.red, 1.0);
        assert!((orange.green - 0x4d as f32 / 255.0).abs() < 1e-6);
        assert_eq!(orange.blue, 0.0);
    }

    #[test]
    fn part_builders_compose() {
        let part = Part::new("pipe", Shape::Cylinder { radius: 0.2, height: 8.0 }, Surface::Unique(solid(0xff4d00, 0.3, 0.3)))
            .at(Vec3::new(14.0, -1.5, 0.0))
            .emissive(EmissiveChannel::new(srgb_hex(0xff4d00), 0.1))
            .no_shadows();
        assert_eq!(part.transform.translation, Vec3::new(14.0, -1.5, 0.0));
        assert!(part.emissive.is_some());
        assert!(!part.cast_shadows);
    }

    #[test]
    fn shapes_produce_geometry() {
        for shape in [
            Shape::Box(Vec3::ONE),
            Shape::Cylinder { radius: 0.5, height: 13.0 },
            Shape::Frustum { radius_top: 0.08, radius_bottom: 0.12, height: 2.5 },
            Shape::Sphere(0.2),
            Shape::Plane(Vec2::new(100.0, 100.0)),
            Shape::Panel(Vec2::new(2.0, 2.0)),
            Shape::Disc(0.08),
        ] {
            assert!(shape.mesh().count_vertices() > 0, "{shape:?}");
        }
    }
}
