//! Frame-stepped camera glide between two viewpoints.

use bevy::prelude::*;

/// Where the camera sits and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    pub target: Vec3,
}

impl Viewpoint {
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

/// Ease-out cubic: fast start, soft landing.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// An in-flight camera animation.
///
/// Progress advances by a fixed step per rendered frame, so the glide lasts
/// the same number of frames regardless of frame time.
#[derive(Clone, Debug)]
pub struct CameraTween {
    start: Viewpoint,
    end: Viewpoint,
    frame: u32,
    frames: u32,
}

impl CameraTween {
    pub fn new(start: Viewpoint, end: Viewpoint, frames: u32) -> Self {
        Self {
            start,
            end,
            frame: 0,
            frames: frames.max(1),
        }
    }

    pub fn end(&self) -> Viewpoint {
        self.end
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.frame as f32 / self.frames as f32
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.frames
    }

    /// Advance one frame and return the viewpoint to display.
    pub fn step(&mut self) -> Viewpoint {
        self.frame = (self.frame + 1).min(self.frames);
        self.sample()
    }

    fn sample(&self) -> Viewpoint {
        if self.is_finished() {
            return self.end;
        }
        let t = ease_out_cubic(self.progress());
        Viewpoint {
            position: self.start.position.lerp(self.end.position, t),
            target: self.start.target.lerp(self.end.target, t),
        }
    }
}
