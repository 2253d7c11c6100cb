//! Drift integration, boundary reflection and hover response.
//!
//! Everything here is plain math over [`Drifter`] so it can be stepped without an `App`.
//! Steps are per frame; there is no delta-time scaling.

use bevy::prelude::*;
use fb_config::{LabelFieldConfig, SphereFieldConfig};
use rand::Rng;

use crate::Drifter;

/// How a member's scale reacts while the pointer ray hits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverResponse {
    /// Jump straight to `rest_scale * factor`.
    Snap { factor: f32 },
    /// Grow by `growth` every hovered frame until `rest_scale * max_factor`.
    Ratchet { growth: f32, max_factor: f32 },
    /// Scale never changes (particle clouds).
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    pub spawn_speed: f32,
    pub hover_jitter: f32,
    pub speed_cap: f32,
    pub hover: HoverResponse,
}

impl MotionProfile {
    pub fn spheres(cfg: &SphereFieldConfig) -> Self {
        Self {
            spawn_speed: cfg.spawn_speed,
            hover_jitter: cfg.hover_jitter,
            speed_cap: cfg.speed_cap,
            hover: HoverResponse::Snap {
                factor: cfg.hover_scale,
            },
        }
    }

    pub fn labels(cfg: &LabelFieldConfig) -> Self {
        Self {
            spawn_speed: cfg.spawn_speed,
            hover_jitter: cfg.hover_jitter,
            speed_cap: cfg.speed_cap,
            hover: HoverResponse::Ratchet {
                growth: cfg.hover_growth,
                max_factor: cfg.hover_max_factor,
            },
        }
    }

    pub fn still() -> Self {
        Self {
            spawn_speed: 0.0,
            hover_jitter: 0.0,
            speed_cap: 0.0,
            hover: HoverResponse::None,
        }
    }
}

/// `position += velocity`.
pub fn integrate(d: &mut Drifter) {
    d.position += d.velocity;
}

/// Clamp each axis to `[-boundary, boundary]`, negating that axis of the velocity.
/// Returns which axes bounced.
pub fn reflect(d: &mut Drifter, boundary: f32) -> BVec3 {
    let mut bounced = [false; 3];
    for (axis, hit) in bounced.iter_mut().enumerate() {
        let p = d.position[axis];
        if p > boundary {
            d.position[axis] = boundary;
            d.velocity[axis] = -d.velocity[axis];
            *hit = true;
        } else if p < -boundary {
            d.position[axis] = -boundary;
            d.velocity[axis] = -d.velocity[axis];
            *hit = true;
        }
    }
    BVec3::from(bounced)
}

/// Integrate then reflect; the first half of a frame step.
pub fn advance(d: &mut Drifter, boundary: f32) -> BVec3 {
    integrate(d);
    reflect(d, boundary)
}

/// Uniform sample in `[-amplitude, amplitude]^3`.
pub fn sample_jitter(rng: &mut impl Rng, amplitude: f32) -> Vec3 {
    if amplitude <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-amplitude..=amplitude),
        rng.gen_range(-amplitude..=amplitude),
        rng.gen_range(-amplitude..=amplitude),
    )
}

/// Hovered frame: perturb velocity by `jitter`, cap speed, then grow scale.
pub fn apply_hover(d: &mut Drifter, profile: &MotionProfile, jitter: Vec3) {
    d.velocity = (d.velocity + jitter).clamp_length_max(profile.speed_cap);
    match profile.hover {
        HoverResponse::Snap { factor } => d.scale = d.rest_scale * factor,
        HoverResponse::Ratchet { growth, max_factor } => {
            let ceiling = d.rest_scale * max_factor;
            d.scale = (d.scale * growth).min(ceiling);
        }
        HoverResponse::None => {}
    }
}

/// Not hovered: snap straight back to the rest scale.
pub fn relax(d: &mut Drifter) {
    d.scale = d.rest_scale;
}

/// Second half of a frame step, after the hit test.
pub fn respond(d: &mut Drifter, profile: &MotionProfile, hovered: bool, rng: &mut impl Rng) {
    if hovered {
        let jitter = sample_jitter(rng, profile.hover_jitter);
        apply_hover(d, profile, jitter);
    } else {
        relax(d);
    }
}
