//! Smooth cable paths through a list of control points.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use smallvec::SmallVec;

/// Catmull-Rom curve passing through every control point.
///
/// `t` in `[0, 1]` is spread evenly over the segments, not over arc length.
#[derive(Clone, Debug)]
pub struct FlowPath {
    points: SmallVec<[Vec3; 8]>,
}

impl FlowPath {
    pub fn new(points: impl IntoIterator<Item = Vec3>) -> Self {
        let points: SmallVec<[Vec3; 8]> = points.into_iter().collect();
        debug_assert!(points.len() >= 2, "a path needs two points");
        Self { points }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        let n = self.points.len();
        match n {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }

        let p = (n - 1) as f32 * t.clamp(0.0, 1.0);
        let mut index = p.floor() as usize;
        let mut weight = p - index as f32;
        if index >= n - 1 {
            index = n - 2;
            weight = 1.0;
        }

        let p1 = self.points[index];
        let p2 = self.points[index + 1];
        // Ends are extended by mirroring the neighbouring point.
        let p0 = if index > 0 {
            self.points[index - 1]
        } else {
            2.0 * p1 - p2
        };
        let p3 = if index + 2 < n {
            self.points[index + 2]
        } else {
            2.0 * p2 - p1
        };

        catmull_rom(p0, p1, p2, p3, weight)
    }

    /// Tube of constant radius following the path.
    pub fn tube_mesh(&self, radius: f32, tubular_segments: usize, radial_segments: usize) -> Mesh {
        let tubular_segments = tubular_segments.max(1);
        let radial_segments = radial_segments.max(3);

        let centers: Vec<Vec3> = (0..=tubular_segments)
            .map(|i| self.point_at(i as f32 / tubular_segments as f32))
            .collect();

        let mut positions = Vec::with_capacity(centers.len() * (radial_segments + 1));
        let mut normals = Vec::with_capacity(positions.capacity());
        let mut uvs = Vec::with_capacity(positions.capacity());

        let mut normal = Vec3::ZERO;
        for (i, &center) in centers.iter().enumerate() {
            let tangent = tangent_at(&centers, i);
            normal = if i == 0 {
                tangent.any_orthonormal_vector()
            } else {
                // Carry the previous frame along so the tube does not twist.
                (normal - tangent * normal.dot(tangent)).normalize_or(tangent.any_orthonormal_vector())
            };
            let binormal = tangent.cross(normal);

            for j in 0..=radial_segments {
                let angle = j as f32 / radial_segments as f32 * std::f32::consts::TAU;
                let dir = normal * angle.cos() + binormal * angle.sin();
                positions.push((center + dir * radius).to_array());
                normals.push(dir.to_array());
                uvs.push([i as f32 / tubular_segments as f32, j as f32 / radial_segments as f32]);
            }
        }

        let ring = (radial_segments + 1) as u32;
        let mut indices = Vec::with_capacity(tubular_segments * radial_segments * 6);
        for i in 0..tubular_segments as u32 {
            for j in 0..radial_segments as u32 {
                let a = i * ring + j;
                let b = (i + 1) * ring + j;
                let c = (i + 1) * ring + j + 1;
                let d = i * ring + j + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
            .with_inserted_indices(Indices::U32(indices))
    }
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

fn tangent_at(samples: &[Vec3], i: usize) -> Vec3 {
    let prev = samples[i.saturating_sub(1)];
    let next = samples[(i + 1).min(samples.len() - 1)];
    (next - prev).normalize_or(Vec3::X)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> FlowPath {
        FlowPath::new([
            Vec3::new(0.0, -1.05, 0.0),
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, 8.0, 0.0),
            Vec3::new(3.0, 11.0, 1.0),
            Vec3::new(0.0, 14.0, 0.0),
        ])
    }

    #[test]
    fn passes_through_control_points() {
        let path = sample_path();
        let n = path.points().len();
        for (i, &point) in path.points().iter().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            assert!(path.point_at(t).distance(point) < 1e-4, "point {i}");
        }
    }

    #[test]
    fn out_of_range_t_is_clamped() {
        let path = sample_path();
        assert_eq!(path.point_at(-1.0), path.point_at(0.0));
        assert_eq!(path.point_at(2.0), path.point_at(1.0));
    }

    #[test]
    fn straight_path_stays_on_the_line() {
        let path = FlowPath::new([Vec3::ZERO, Vec3::X * 2.0]);
        for i in 0..=10 {
            let p = path.point_at(i as f32 / 10.0);
            assert!(p.y.abs() < 1e-6 && p.z.abs() < 1e-6);
            assert!((p.x - i as f32 / 5.0).abs() < 1e-5);
        }
    }

    #[test]
    fn tube_mesh_has_one_ring_per_sample() {
        let mesh = sample_path().tube_mesh(0.04, 64, 8);
        assert_eq!(mesh.count_vertices(), 65 * 9);
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("tube mesh should use u32 indices");
        };
        assert_eq!(indices.len(), 64 * 8 * 6);
    }
}
