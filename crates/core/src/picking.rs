// Pointer ray construction and shape intersection.
// The ray is built from the instance's CameraRig rather than bevy's Camera so it works headless.

use bevy::prelude::*;

use crate::{CameraRig, Drifter, HitShape};

/// Map a window cursor position (top-left origin, logical px) to normalized device coordinates.
/// Returns `None` for a degenerate surface.
pub fn cursor_to_ndc(cursor: Vec2, surface: Vec2) -> Option<Vec2> {
    if surface.x <= 0.0 || surface.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        cursor.x / surface.x * 2.0 - 1.0,
        -(cursor.y / surface.y) * 2.0 + 1.0,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

impl PointerRay {
    /// Ray from the rig's eye through `ndc`, for a camera looking down -Z at the origin.
    pub fn from_ndc(rig: &CameraRig, ndc: Vec2) -> Self {
        let half = (rig.fov_y * 0.5).tan();
        let dir = Vec3::new(ndc.x * half * rig.aspect, ndc.y * half, -1.0).normalize();
        Self {
            origin: rig.eye,
            dir,
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    pub fn hits_sphere(&self, center: Vec3, radius: f32) -> bool {
        let oc = self.origin - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return false;
        }
        // Far root in front of the origin covers both "ahead" and "origin inside".
        -b + disc.sqrt() >= 0.0
    }

    /// Axis-aligned quad in the plane `z = center.z`.
    pub fn hits_quad(&self, center: Vec3, half_extents: Vec2) -> bool {
        if self.dir.z.abs() < f32::EPSILON {
            return false;
        }
        let t = (center.z - self.origin.z) / self.dir.z;
        if t < 0.0 {
            return false;
        }
        let p = self.at(t);
        (p.x - center.x).abs() <= half_extents.x && (p.y - center.y).abs() <= half_extents.y
    }
}

impl HitShape {
    /// Test against the member's current position and scale.
    pub fn hit_by(&self, ray: &PointerRay, d: &Drifter) -> bool {
        match *self {
            HitShape::Sphere { radius } => ray.hits_sphere(d.position, radius * d.scale.max_element()),
            HitShape::Quad { half_extents } => {
                ray.hits_quad(d.position, half_extents * d.scale.truncate())
            }
            HitShape::Unpickable => false,
        }
    }
}
