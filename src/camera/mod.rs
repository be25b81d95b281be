//! Perspective orbit camera with animated focus moves.
//!
//! User input feeds a damped [`OrbitCamera`]; programmatic moves (selection
//! focus, presets, reset) go through a single [`CameraTween`] slot, so a new
//! request always replaces the one in flight.

use std::f32::consts::PI;

use bevy::{
    core_pipeline::tonemapping::Tonemapping,
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    pbr::{DistanceFog, FogFalloff},
    picking::mesh_picking::RayCastPickable,
    prelude::*,
    window::PrimaryWindow,
};

pub mod orbit;
pub mod tween;

pub use orbit::{OrbitCamera, OrbitLimits};
pub use tween::{CameraTween, Viewpoint};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraConfig>()
            .init_resource::<ActiveTween>()
            .add_event::<AnimateCamera>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    start_camera_tween,
                    step_camera_tween,
                    orbit_mouse_input,
                    update_orbit,
                    apply_orbit_transform,
                )
                    .chain()
                    .in_set(CameraSet),
            );
    }
}

/// Systems that move the camera; run after anything that requests a move.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraSet;

/// The isometric overview the viewer opens with and resets to.
pub const HOME_VIEW: Viewpoint = Viewpoint::new(Vec3::new(35.0, 20.0, 35.0), Vec3::new(0.0, 6.0, 0.0));

#[derive(Resource)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub limits: OrbitLimits,
    /// Frames a focus move takes.
    pub tween_frames: u32,
    /// Radians per pixel of drag, relative to window height.
    pub rotate_speed: f32,
    /// Angle per press of a rotate button.
    pub nav_angle: f32,
    /// Fraction of the distance covered by one zoom-in press.
    pub nav_zoom_in: f32,
    /// Units added by one zoom-out press.
    pub nav_zoom_out: f32,
    /// Units moved by one pan press.
    pub nav_pan: f32,
    pub fog_color: Color,
    pub fog_start: f32,
    pub fog_end: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            limits: OrbitLimits::default(),
            tween_frames: 60,
            rotate_speed: 1.0,
            nav_angle: 0.1,
            nav_zoom_in: 0.1,
            nav_zoom_out: 2.0,
            nav_pan: 0.5,
            fog_color: Color::srgb_u8(0xf0, 0xf2, 0xf5),
            fog_start: 30.0,
            fog_end: 90.0,
        }
    }
}

/// Request to glide the camera to a viewpoint.
#[derive(Event, Clone, Copy, Debug)]
pub struct AnimateCamera(pub Viewpoint);

/// The camera move in progress, if any.
#[derive(Resource, Default)]
pub struct ActiveTween(pub Option<CameraTween>);

/// Named viewpoints offered by the preset buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPreset {
    Front,
    Side,
    Top,
    Iso,
}

impl CameraPreset {
    pub const ALL: [CameraPreset; 4] = [
        CameraPreset::Front,
        CameraPreset::Side,
        CameraPreset::Top,
        CameraPreset::Iso,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CameraPreset::Front => "Frontal",
            CameraPreset::Side => "Lateral",
            CameraPreset::Top => "Superior",
            CameraPreset::Iso => "Isométrica",
        }
    }

    pub fn viewpoint(&self) -> Viewpoint {
        match self {
            CameraPreset::Front => Viewpoint::new(Vec3::new(0.0, 8.0, 40.0), Vec3::new(0.0, 8.0, 0.0)),
            CameraPreset::Side => Viewpoint::new(Vec3::new(40.0, 8.0, 0.0), Vec3::new(0.0, 8.0, 0.0)),
            // Slight Z offset keeps the look-at direction off the up axis.
            CameraPreset::Top => Viewpoint::new(Vec3::new(0.0, 45.0, 0.1), Vec3::ZERO),
            CameraPreset::Iso => HOME_VIEW,
        }
    }
}

/// Step-wise moves triggered by the navigation pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
}

impl NavAction {
    pub fn apply(self, orbit: &mut OrbitCamera, config: &CameraConfig) {
        let angle = config.nav_angle;
        let (min_phi, max_phi) = (0.1, PI - 0.1);
        match self {
            NavAction::RotateLeft => orbit.orbit_by(-angle, 0.0, min_phi, max_phi),
            NavAction::RotateRight => orbit.orbit_by(angle, 0.0, min_phi, max_phi),
            NavAction::RotateUp => orbit.orbit_by(0.0, -angle, min_phi, max_phi),
            NavAction::RotateDown => orbit.orbit_by(0.0, angle, min_phi, max_phi),
            NavAction::ZoomIn => orbit.zoom_toward(config.nav_zoom_in),
            NavAction::ZoomOut => orbit.zoom_away(config.nav_zoom_out),
            NavAction::PanLeft => orbit.translate(-orbit.right() * config.nav_pan),
            NavAction::PanRight => orbit.translate(orbit.right() * config.nav_pan),
            NavAction::PanUp => orbit.translate(Vec3::Y * config.nav_pan),
            NavAction::PanDown => orbit.translate(Vec3::NEG_Y * config.nav_pan),
        }
    }
}

fn setup_camera(mut commands: Commands, config: Res<CameraConfig>) {
    let orbit = OrbitCamera::new(HOME_VIEW);

    commands.spawn((
        Name::new("Scene Camera"),
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            ..default()
        }),
        Transform::from_translation(orbit.position()).looking_at(orbit.target, Vec3::Y),
        DistanceFog {
            color: config.fog_color,
            falloff: FogFalloff::Linear {
                start: config.fog_start,
                end: config.fog_end,
            },
            directional_light_color: Color::NONE,
            directional_light_exponent: 8.0,
        },
        Tonemapping::AcesFitted,
        RayCastPickable,
        orbit,
    ));

    info!("Camera ready at {:?} looking at {:?}", HOME_VIEW.position, HOME_VIEW.target);
}

/// Capture the current view and start gliding toward the latest request.
fn start_camera_tween(
    mut requests: EventReader<AnimateCamera>,
    mut active: ResMut<ActiveTween>,
    config: Res<CameraConfig>,
    query: Query<&OrbitCamera>,
) {
    let Some(AnimateCamera(end)) = requests.read().last().copied() else {
        return;
    };
    let Ok(orbit) = query.get_single() else {
        return;
    };

    if let Some(previous) = &active.0 {
        debug!("Camera move toward {:?} superseded", previous.end().target);
    }
    active.0 = Some(CameraTween::new(orbit.viewpoint(), end, config.tween_frames));
}

fn step_camera_tween(mut active: ResMut<ActiveTween>, mut query: Query<&mut OrbitCamera>) {
    let Some(tween) = active.0.as_mut() else {
        return;
    };

    let view = tween.step();
    for mut orbit in &mut query {
        orbit.set_viewpoint(view);
    }

    if tween.is_finished() {
        active.0 = None;
    }
}

fn orbit_mouse_input(
    mut query: Query<(&mut OrbitCamera, &Projection)>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    ui_interactions: Query<&Interaction, With<Node>>,
    active: Res<ActiveTween>,
    config: Res<CameraConfig>,
) {
    let over_ui = ui_interactions.iter().any(|i| *i != Interaction::None);
    if over_ui || active.0.is_some() {
        mouse_motion.clear();
        scroll_events.clear();
        return;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    let height = window.height().max(1.0);

    let mut drag = Vec2::ZERO;
    for event in mouse_motion.read() {
        drag += event.delta;
    }

    let scroll: f32 = scroll_events
        .read()
        .map(|e| match e.unit {
            MouseScrollUnit::Line => e.y,
            MouseScrollUnit::Pixel => e.y / 100.0,
        })
        .sum();

    for (mut orbit, projection) in &mut query {
        if drag != Vec2::ZERO {
            if mouse_buttons.pressed(MouseButton::Left) {
                let scale = 2.0 * PI * config.rotate_speed / height;
                orbit.drag_rotate(-drag.x * scale, -drag.y * scale);
            } else if mouse_buttons.pressed(MouseButton::Right)
                || mouse_buttons.pressed(MouseButton::Middle)
            {
                // Screen-space pan: one window height covers the visible span at the target.
                let fov = match projection {
                    Projection::Perspective(p) => p.fov,
                    _ => config.fov_degrees.to_radians(),
                };
                let span = 2.0 * orbit.spherical.radius * (fov / 2.0).tan() / height;
                let right = orbit.right();
                let forward = (orbit.target - orbit.position()).normalize_or_zero();
                let up = right.cross(forward).normalize_or_zero();
                orbit.drag_pan((-right * drag.x + up * drag.y) * span);
            }
        }

        if scroll != 0.0 {
            orbit.dolly(0.95_f32.powf(scroll));
        }
    }
}

fn update_orbit(mut query: Query<&mut OrbitCamera>, config: Res<CameraConfig>) {
    for mut orbit in &mut query {
        orbit.update(&config.limits);
    }
}

fn apply_orbit_transform(mut query: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (orbit, mut transform) in &mut query {
        *transform = Transform::from_translation(orbit.position()).looking_at(orbit.target, Vec3::Y);
    }
}
