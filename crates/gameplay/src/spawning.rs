//! Member generation for each field variant.
//!
//! Generators only build records and assets; [`spawn_members`] turns them into child entities of
//! an instance root. Label textures are painted up front so a failing symbol leaves nothing
//! half-built.

use bevy::prelude::*;
use fb_config::{BackdropConfig, ThemeMode};
use fb_core::{Drifter, FieldMember, HitShape, ParticleCloud};
use fb_rendering::{
    label_image, paint_label,
    palette::{label_ink, particle_color, sphere_color},
    scene::{label_assets, particle_assets, sphere_assets},
    FieldStores, GlyphSource, LabelError, MemberAssets,
};
use rand::Rng;

/// A member ready to be spawned.
#[derive(Debug, Clone)]
pub struct MemberSeed {
    pub name: String,
    pub drifter: Drifter,
    pub shape: HitShape,
    pub assets: MemberAssets,
}

/// Uniform sample in `[-half, half]^3`.
pub fn uniform_cube(rng: &mut impl Rng, half: f32) -> Vec3 {
    if half <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-half..=half),
        rng.gen_range(-half..=half),
        rng.gen_range(-half..=half),
    )
}

fn sample_range(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

pub fn sphere_members(
    stores: &mut FieldStores,
    rng: &mut impl Rng,
    cfg: &BackdropConfig,
    theme: ThemeMode,
) -> Vec<MemberSeed> {
    let s = &cfg.spheres;
    let color = sphere_color(&s.colors, theme);
    (0..s.count)
        .map(|i| {
            let radius = sample_range(rng, s.radius_range.min, s.radius_range.max);
            let position = uniform_cube(rng, cfg.field.boundary);
            let velocity = uniform_cube(rng, s.spawn_speed);
            MemberSeed {
                name: format!("sphere_{i}"),
                drifter: Drifter::at(position, velocity),
                shape: HitShape::Sphere { radius },
                assets: sphere_assets(stores, radius, color, s),
            }
        })
        .collect()
}

pub fn label_members(
    stores: &mut FieldStores,
    rng: &mut impl Rng,
    glyphs: &dyn GlyphSource,
    cfg: &BackdropConfig,
    theme: ThemeMode,
) -> Result<Vec<MemberSeed>, LabelError> {
    let l = &cfg.labels;
    let ink = label_ink(&l.colors, theme);
    let mut painted = Vec::with_capacity(l.symbols.len());
    for symbol in &l.symbols {
        if painted.iter().any(|(s, _)| s == symbol) {
            continue;
        }
        painted.push((symbol.clone(), paint_label(glyphs, symbol, l.texture_size, ink)?));
    }

    let half = l.plane_size * 0.5;
    Ok(painted
        .into_iter()
        .map(|(symbol, bitmap)| {
            let position = uniform_cube(rng, cfg.field.boundary);
            let velocity = uniform_cube(rng, l.spawn_speed);
            let rest = Vec3::new(
                sample_range(rng, l.rest_scale_range.min, l.rest_scale_range.max),
                sample_range(rng, l.rest_scale_range.min, l.rest_scale_range.max),
                sample_range(rng, l.rest_scale_range.min, l.rest_scale_range.max),
            );
            MemberSeed {
                name: format!("label_{symbol}"),
                drifter: Drifter::at(position, velocity).with_rest_scale(rest),
                shape: HitShape::Quad {
                    half_extents: Vec2::splat(half),
                },
                assets: label_assets(stores, label_image(bitmap), l),
            }
        })
        .collect())
}

pub fn particle_cloud(stores: &mut FieldStores, rng: &mut impl Rng, cfg: &BackdropConfig) -> MemberAssets {
    let p = &cfg.particles;
    let points = (0..p.count)
        .map(|_| uniform_cube(rng, p.spread * 0.5).to_array())
        .collect();
    particle_assets(stores, points, particle_color(&p.color, p.opacity))
}

/// Spawn seeds as children of `root`, preserving order.
pub fn spawn_members(commands: &mut Commands, root: Entity, seeds: Vec<MemberSeed>) -> Vec<Entity> {
    seeds
        .into_iter()
        .map(|seed| {
            let transform =
                Transform::from_translation(seed.drifter.position).with_scale(seed.drifter.scale);
            commands
                .spawn((
                    Name::new(seed.name),
                    FieldMember { instance: root },
                    seed.drifter,
                    seed.shape,
                    seed.assets.bundle(),
                    seed.assets,
                    transform,
                    ChildOf(root),
                ))
                .id()
        })
        .collect()
}

pub fn spawn_particle_cloud(commands: &mut Commands, root: Entity, assets: MemberAssets) -> Entity {
    commands
        .spawn((
            Name::new("particle_cloud"),
            FieldMember { instance: root },
            ParticleCloud::default(),
            HitShape::Unpickable,
            assets.bundle(),
            assets,
            Transform::default(),
            ChildOf(root),
        ))
        .id()
}
