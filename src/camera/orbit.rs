//! Damped orbit controller around a look-at target.
//!
//! Mirrors the feel of a classic web orbit control: drag deltas are
//! accumulated and bled into the view a fraction per frame, zoom is applied
//! at once, and the polar angle and distance are clamped after user input.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::tween::Viewpoint;

/// Keeps the polar angle away from the poles where `looking_at` degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Offset from the target in spherical coordinates (Y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from +Y.
    pub phi: f32,
    /// Azimuth around Y, measured from +Z toward +X.
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi * self.theta.cos(),
        )
    }
}

/// Limits applied after user input.
#[derive(Clone, Copy, Debug)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar_angle: f32,
    /// Fraction of the pending motion applied per frame.
    pub damping: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 10.0,
            max_distance: 60.0,
            max_polar_angle: PI * 0.85,
            damping: 0.05,
        }
    }
}

/// Orbit state attached to the scene camera.
#[derive(Component, Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub spherical: Spherical,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    pending_zoom: f32,
    /// Set when user input moved the view since the last update.
    dirty: bool,
}

impl OrbitCamera {
    pub fn new(view: Viewpoint) -> Self {
        Self {
            target: view.target,
            spherical: Spherical::from_offset(view.position - view.target),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            pending_zoom: 1.0,
            dirty: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.spherical.to_offset()
    }

    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint::new(self.position(), self.target)
    }

    /// Jump to an exact viewpoint, discarding pending drag motion.
    pub fn set_viewpoint(&mut self, view: Viewpoint) {
        self.target = view.target;
        self.spherical = Spherical::from_offset(view.position - view.target);
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_zoom = 1.0;
        self.dirty = false;
    }

    /// Queue a damped rotation (mouse drag).
    pub fn drag_rotate(&mut self, d_theta: f32, d_phi: f32) {
        self.pending_theta += d_theta;
        self.pending_phi += d_phi;
        self.dirty = true;
    }

    /// Queue a damped translation of camera and target (mouse drag).
    pub fn drag_pan(&mut self, offset: Vec3) {
        self.pending_pan += offset;
        self.dirty = true;
    }

    /// Scale the distance to the target on the next update.
    pub fn dolly(&mut self, scale: f32) {
        self.pending_zoom *= scale;
        self.dirty = true;
    }

    /// Rotate immediately, keeping the polar angle inside `[min_phi, max_phi]`.
    pub fn orbit_by(&mut self, d_theta: f32, d_phi: f32, min_phi: f32, max_phi: f32) {
        self.spherical.theta += d_theta;
        self.spherical.phi = (self.spherical.phi + d_phi).clamp(min_phi, max_phi);
        self.dirty = true;
    }

    /// Move the camera a fraction of the way toward the target.
    pub fn zoom_toward(&mut self, fraction: f32) {
        self.spherical.radius *= 1.0 - fraction.clamp(0.0, 1.0);
        self.dirty = true;
    }

    /// Move the camera away from the target by `distance` units.
    pub fn zoom_away(&mut self, distance: f32) {
        self.spherical.radius += distance;
        self.dirty = true;
    }

    /// Translate camera and target together, immediately.
    pub fn translate(&mut self, offset: Vec3) {
        self.target += offset;
        self.dirty = true;
    }

    /// Horizontal screen-right direction for the current azimuth.
    pub fn right(&self) -> Vec3 {
        let theta = self.spherical.theta;
        Vec3::new(theta.cos(), 0.0, -theta.sin())
    }

    /// Apply damping and limits. Returns `true` while motion is pending.
    pub fn update(&mut self, limits: &OrbitLimits) -> bool {
        if !self.dirty {
            return false;
        }

        let damping = limits.damping.clamp(0.0, 1.0);
        self.spherical.theta += self.pending_theta * damping;
        self.spherical.phi += self.pending_phi * damping;
        self.target += self.pending_pan * damping;
        self.pending_theta *= 1.0 - damping;
        self.pending_phi *= 1.0 - damping;
        self.pending_pan *= 1.0 - damping;

        self.spherical.radius *= self.pending_zoom;
        self.pending_zoom = 1.0;

        self.spherical.phi = self
            .spherical
            .phi
            .clamp(POLE_EPSILON, limits.max_polar_angle.min(PI - POLE_EPSILON));
        self.spherical.radius = self
            .spherical
            .radius
            .clamp(limits.min_distance, limits.max_distance);

        let settled = self.pending_theta.abs() < 1e-5
            && self.pending_phi.abs() < 1e-5
            && self.pending_pan.length_squared() < 1e-10;
        self.dirty = !settled;
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn spherical_round_trip() {
        for offset in [
            Vec3::new(35.0, 14.0, 35.0),
            Vec3::new(0.0, 0.0, 40.0),
            Vec3::new(40.0, 0.0, 0.0),
            Vec3::new(0.0, 45.0, 0.1),
            Vec3::new(-3.0, -2.0, 7.0),
        ] {
            assert!(approx(Spherical::from_offset(offset).to_offset(), offset));
        }
    }

    #[test]
    fn viewpoint_is_exact_without_input() {
        let view = Viewpoint::new(Vec3::new(6.0, 7.0, 6.0), Vec3::new(0.0, 7.0, 0.0));
        let mut orbit = OrbitCamera::new(view);
        // Closer than the user zoom limit, but programmatic views are honoured.
        assert!(!orbit.update(&OrbitLimits::default()));
        assert!(approx(orbit.position(), view.position));
        assert!(approx(orbit.target, view.target));
    }

    #[test]
    fn drag_is_damped_and_clamped() {
        let limits = OrbitLimits::default();
        let mut orbit = OrbitCamera::new(Viewpoint::new(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO));
        orbit.drag_rotate(0.0, 10.0);
        orbit.update(&limits);
        // First frame moves only a fraction of the requested delta.
        assert!((orbit.spherical.phi - (PI / 2.0 + 0.5)).abs() < 1e-4);
        for _ in 0..500 {
            orbit.update(&limits);
        }
        assert!(orbit.spherical.phi <= limits.max_polar_angle + 1e-6);
    }

    #[test]
    fn zoom_is_limited_after_user_input() {
        let limits = OrbitLimits::default();
        let mut orbit = OrbitCamera::new(Viewpoint::new(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO));
        orbit.zoom_away(100.0);
        orbit.update(&limits);
        assert_eq!(orbit.spherical.radius, limits.max_distance);
        orbit.dolly(0.01);
        orbit.update(&limits);
        assert_eq!(orbit.spherical.radius, limits.min_distance);
    }

    #[test]
    fn right_vector_matches_camera_heading() {
        let orbit = OrbitCamera::new(Viewpoint::new(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO));
        assert!(approx(orbit.right(), Vec3::X));
        let side = OrbitCamera::new(Viewpoint::new(Vec3::new(40.0, 8.0, 0.0), Vec3::new(0.0, 8.0, 0.0)));
        assert!(approx(side.right(), Vec3::NEG_Z));
    }
}
