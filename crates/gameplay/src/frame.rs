// Per-frame member update: drift, bounce, hover, then write transforms.
// No delta-time scaling; one step per rendered frame.

use bevy::prelude::*;
use fb_config::FieldVariant;
use fb_core::{
    motion, BackdropConfigRes, CameraRig, Drifter, FieldInstance, FieldRng, HitShape,
    ParticleCloud, PointerNdc, PointerRay, ScrollDepth,
};

/// Step every member of every running drifting field, in member order.
pub fn step_fields(
    instances: Query<(&FieldInstance, &PointerNdc, &CameraRig)>,
    mut members: Query<(&mut Drifter, &HitShape)>,
    mut rng: ResMut<FieldRng>,
) {
    for (instance, ndc, rig) in &instances {
        if !instance.is_running() || instance.variant == FieldVariant::Particles {
            continue;
        }
        let ray = PointerRay::from_ndc(rig, ndc.0);
        for &member in &instance.members {
            let Ok((mut drifter, shape)) = members.get_mut(member) else {
                continue;
            };
            motion::advance(&mut drifter, instance.boundary);
            let hovered = shape.hit_by(&ray, &drifter);
            motion::respond(&mut drifter, &instance.motion, hovered, &mut rng.0);
        }
    }
}

/// Spin the cloud with the pointer and push it along Z with scroll depth.
pub fn spin_particles(
    instances: Query<(&FieldInstance, &PointerNdc, &ScrollDepth)>,
    mut clouds: Query<(&mut ParticleCloud, &mut Transform)>,
    cfg: Res<BackdropConfigRes>,
) {
    let p = &cfg.0.particles;
    for (instance, ndc, depth) in &instances {
        if !instance.is_running() || instance.variant != FieldVariant::Particles {
            continue;
        }
        for &member in &instance.members {
            let Ok((mut cloud, mut transform)) = clouds.get_mut(member) else {
                continue;
            };
            cloud.spin.y += p.base_spin + ndc.x * p.pointer_spin;
            cloud.spin.x += p.base_spin + ndc.y * p.pointer_spin;
            transform.rotation = Quat::from_euler(EulerRot::XYZ, cloud.spin.x, cloud.spin.y, 0.0);
            transform.translation.z = depth.0 * p.scroll_depth;
        }
    }
}

pub fn sync_transforms(mut q: Query<(&Drifter, &mut Transform), Changed<Drifter>>) {
    for (drifter, mut transform) in &mut q {
        transform.translation = drifter.position;
        transform.scale = drifter.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::field_app;
    use fb_core::FieldState;

    fn first_instance(app: &mut App) -> (Entity, FieldInstance) {
        let world = app.world_mut();
        let mut q = world.query::<(Entity, &FieldInstance)>();
        let (e, i) = q.single(world).expect("one instance");
        (e, i.clone())
    }

    /// Park every member far from the view axis so only the one under test can be hovered.
    fn park_members(app: &mut App, instance: &FieldInstance) {
        for &m in &instance.members {
            let mut d = app.world_mut().get_mut::<Drifter>(m).unwrap();
            d.position = Vec3::new(-30.0, -30.0, -30.0);
            d.velocity = Vec3::ZERO;
        }
    }

    #[test]
    fn member_bounces_and_transform_follows() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        let (_, instance) = first_instance(&mut app);
        park_members(&mut app, &instance);
        let m = instance.members[0];
        {
            let mut d = app.world_mut().get_mut::<Drifter>(m).unwrap();
            d.position = Vec3::new(41.0, 0.0, 0.0);
            d.velocity = Vec3::new(0.02, 0.0, 0.0);
        }
        app.update();
        let d = *app.world().get::<Drifter>(m).unwrap();
        assert_eq!(d.position, Vec3::new(40.0, 0.0, 0.0));
        assert_eq!(d.velocity, Vec3::new(-0.02, 0.0, 0.0));
        assert_eq!(app.world().get::<Transform>(m).unwrap().translation, d.position);
        app.update();
        let x = app.world().get::<Drifter>(m).unwrap().position.x;
        assert!((x - 39.98).abs() < 1e-4);
    }

    #[test]
    fn hovered_sphere_grows_and_snaps_back() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        let (root, instance) = first_instance(&mut app);
        park_members(&mut app, &instance);
        let m = instance.members[0];
        app.world_mut().get_mut::<Drifter>(m).unwrap().position = Vec3::ZERO;
        app.update();
        assert_eq!(app.world().get::<Drifter>(m).unwrap().scale, Vec3::splat(1.5));
        assert_eq!(app.world().get::<Transform>(m).unwrap().scale, Vec3::splat(1.5));
        let speed = app.world().get::<Drifter>(m).unwrap().velocity.length();
        assert!(speed <= 0.1 + 1e-6);

        app.world_mut().get_mut::<PointerNdc>(root).unwrap().0 = Vec2::new(0.95, 0.95);
        app.update();
        assert_eq!(app.world().get::<Drifter>(m).unwrap().scale, Vec3::ONE);
    }

    #[test]
    fn disposed_instance_is_not_stepped() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        let (root, instance) = first_instance(&mut app);
        let before: Vec<Drifter> = instance
            .members
            .iter()
            .map(|&m| *app.world().get::<Drifter>(m).unwrap())
            .collect();
        app.world_mut().get_mut::<FieldInstance>(root).unwrap().state = FieldState::Disposed;
        for _ in 0..5 {
            app.update();
        }
        let after: Vec<Drifter> = instance
            .members
            .iter()
            .map(|&m| *app.world().get::<Drifter>(m).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn particles_spin_and_follow_scroll() {
        let mut app = field_app(FieldVariant::Particles);
        app.update();
        let (root, instance) = first_instance(&mut app);
        let cloud = instance.members[0];
        let spin_after_mount = app.world().get::<ParticleCloud>(cloud).unwrap().spin;

        app.world_mut().get_mut::<ScrollDepth>(root).unwrap().0 = 150.0;
        app.world_mut().get_mut::<PointerNdc>(root).unwrap().0 = Vec2::new(1.0, -1.0);
        app.update();
        let spin = app.world().get::<ParticleCloud>(cloud).unwrap().spin - spin_after_mount;
        assert!((spin.y - 0.012).abs() < 1e-6, "{spin:?}");
        assert!((spin.x - (0.002 - 0.01)).abs() < 1e-6, "{spin:?}");
        let tf = app.world().get::<Transform>(cloud).unwrap();
        assert!((tf.translation.z - 1.5).abs() < 1e-5);
    }
}
