// Mount / teardown of field instances.
// A mount builds root, camera, light and members in one command batch; teardown marks the
// instance Disposed first so nothing steps it again, releases member assets, then despawns
// the whole hierarchy.

use bevy::ecs::error::BevyError;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use fb_config::{BackdropConfig, FieldVariant, ThemeMode};
use fb_core::{
    ActiveTheme, BackdropConfigRes, CameraRig, FieldInstance, FieldRng, FieldState, MotionProfile,
    MountField, PointerNdc, ScrollDepth, Surface, TeardownField,
};
use fb_rendering::{
    release_member_assets, restore_ambient,
    scene::{spawn_field_camera, spawn_field_lights},
    FieldStores, LabelError, LabelGlyphs, MemberAssets, PriorAmbient,
};
use rand::Rng;

use crate::spawning::{
    label_members, particle_cloud, spawn_members, spawn_particle_cloud, sphere_members,
};

const LOG_TARGET: &str = "fb_gameplay::lifecycle";

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("no primary window to mount on")]
    NoWindow,
    #[error("window surface is {width}x{height}; cannot size the field")]
    ZeroSurface { width: f32, height: f32 },
    #[error(transparent)]
    Label(#[from] LabelError),
}

/// Everything a mount needs besides the command buffer and asset stores.
pub struct MountRequest<'a> {
    pub variant: FieldVariant,
    pub window: Entity,
    pub surface: Vec2,
    pub theme: ThemeMode,
    pub cfg: &'a BackdropConfig,
    pub glyphs: Option<&'a LabelGlyphs>,
    /// Ambient light in effect before this mount; restored on teardown.
    pub ambient: Option<AmbientLight>,
}

/// Build a complete instance. Nothing is spawned when an error is returned.
pub fn mount_field(
    commands: &mut Commands,
    stores: &mut FieldStores,
    rng: &mut impl Rng,
    req: MountRequest,
) -> Result<Entity, MountError> {
    if req.surface.x <= 0.0 || req.surface.y <= 0.0 {
        return Err(MountError::ZeroSurface {
            width: req.surface.x,
            height: req.surface.y,
        });
    }
    let cfg = req.cfg;
    let surface = Surface {
        width: req.surface.x,
        height: req.surface.y,
    };

    // Fallible work first.
    let (motion, distance) = match req.variant {
        FieldVariant::Spheres => (MotionProfile::spheres(&cfg.spheres), cfg.camera.field_distance),
        FieldVariant::Labels => (MotionProfile::labels(&cfg.labels), cfg.camera.field_distance),
        FieldVariant::Particles => (MotionProfile::still(), cfg.camera.particle_distance),
    };
    let label_seeds = match req.variant {
        FieldVariant::Labels => {
            let glyphs = req.glyphs.ok_or(LabelError::NoGlyphSource)?;
            Some(label_members(stores, rng, glyphs.0.as_ref(), cfg, req.theme)?)
        }
        _ => None,
    };

    let rig = CameraRig::new(distance, cfg.camera.fov_degrees.to_radians(), surface.aspect());
    let root = commands
        .spawn((
            Name::new(format!("field_{}", req.variant.label())),
            Transform::default(),
            Visibility::default(),
        ))
        .id();
    let camera = spawn_field_camera(commands, root, &rig, &cfg.camera);
    spawn_field_lights(commands, root, &cfg.lighting, req.ambient);

    let members = match req.variant {
        FieldVariant::Spheres => {
            let seeds = sphere_members(stores, rng, cfg, req.theme);
            spawn_members(commands, root, seeds)
        }
        FieldVariant::Labels => spawn_members(commands, root, label_seeds.unwrap_or_default()),
        FieldVariant::Particles => {
            let assets = particle_cloud(stores, rng, cfg);
            vec![spawn_particle_cloud(commands, root, assets)]
        }
    };

    commands.entity(root).insert((
        FieldInstance {
            variant: req.variant,
            boundary: cfg.field.boundary,
            motion,
            members,
            window: req.window,
            camera,
            theme: req.theme,
            state: FieldState::Running,
        },
        PointerNdc::default(),
        ScrollDepth::default(),
        surface,
        rig,
    ));
    Ok(root)
}

/// Mount on the primary window. Label failures are fatal; a missing or unsized window is not.
#[allow(clippy::too_many_arguments)]
pub fn handle_mount_requests(
    mut commands: Commands,
    mut requests: EventReader<MountField>,
    windows: Query<(Entity, &Window), With<PrimaryWindow>>,
    existing: Query<&FieldInstance>,
    mut stores: FieldStores,
    mut rng: ResMut<FieldRng>,
    cfg: Res<BackdropConfigRes>,
    theme: Res<ActiveTheme>,
    glyphs: Option<Res<LabelGlyphs>>,
    ambient: Option<Res<AmbientLight>>,
) -> Result<(), BevyError> {
    let mut mounted = existing.iter().any(FieldInstance::is_running);
    for req in requests.read() {
        if mounted {
            debug!(target: LOG_TARGET, "field already mounted; ignoring {:?}", req.variant);
            continue;
        }
        let result = match windows.single() {
            Ok((window_entity, window)) => mount_field(
                &mut commands,
                &mut stores,
                &mut rng.0,
                MountRequest {
                    variant: req.variant,
                    window: window_entity,
                    surface: Vec2::new(window.width(), window.height()),
                    theme: theme.0,
                    cfg: &cfg.0,
                    glyphs: glyphs.as_deref(),
                    ambient: ambient.as_deref().cloned(),
                },
            ),
            Err(_) => Err(MountError::NoWindow),
        };
        match result {
            Ok(root) => {
                mounted = true;
                info!(target: LOG_TARGET, "mounted {} field ({:?} theme) as {root}", req.variant.label(), theme.0);
            }
            Err(e @ MountError::Label(_)) => return Err(e.into()),
            Err(e) => warn!(target: LOG_TARGET, "field not mounted: {e}"),
        }
    }
    Ok(())
}

/// Dispose, release and despawn. Unknown or already-disposed instances are ignored.
pub fn handle_teardown_requests(
    mut commands: Commands,
    mut requests: EventReader<TeardownField>,
    mut instances: Query<(&mut FieldInstance, Option<&PriorAmbient>)>,
    member_assets: Query<&MemberAssets>,
    mut stores: FieldStores,
) {
    for req in requests.read() {
        let Ok((mut instance, prior)) = instances.get_mut(req.instance) else {
            debug!(target: LOG_TARGET, "teardown of unknown instance {}; ignoring", req.instance);
            continue;
        };
        if !instance.is_running() {
            debug!(target: LOG_TARGET, "instance {} already disposed", req.instance);
            continue;
        }
        instance.state = FieldState::Disposed;
        let mut released = 0;
        for &member in &instance.members {
            if let Ok(assets) = member_assets.get(member) {
                release_member_assets(&mut stores, assets);
                released += 1;
            }
        }
        if let Some(prior) = prior {
            restore_ambient(&mut commands, prior);
        }
        commands.entity(req.instance).despawn();
        info!(target: LOG_TARGET, "tore down {} field ({released} members released)", instance.variant.label());
    }
}

/// Queue teardown for instances whose window has gone away.
pub fn retire_orphaned_fields(
    instances: Query<(Entity, &FieldInstance)>,
    windows: Query<(), With<Window>>,
    mut teardown: EventWriter<TeardownField>,
) {
    for (entity, instance) in &instances {
        if instance.is_running() && windows.get(instance.window).is_err() {
            debug!(target: LOG_TARGET, "window {} gone; retiring field", instance.window);
            teardown.write(TeardownField { instance: entity });
        }
    }
}

/// Startup: mount the configured variant unless disabled.
pub fn request_initial_mount(cfg: Res<BackdropConfigRes>, mut mount: EventWriter<MountField>) {
    if cfg.0.field.enabled {
        mount.write(MountField {
            variant: cfg.0.field.variant,
        });
    } else {
        info!(target: LOG_TARGET, "field disabled in config; press M to mount");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::field_app;
    use bevy::window::WindowResolution;
    use fb_core::{Drifter, FieldMember};

    fn instances(app: &mut App) -> Vec<(Entity, FieldInstance)> {
        let world = app.world_mut();
        let mut q = world.query::<(Entity, &FieldInstance)>();
        q.iter(world).map(|(e, i)| (e, i.clone())).collect()
    }

    fn asset_counts(app: &App) -> (usize, usize, usize) {
        let world = app.world();
        (
            world.resource::<Assets<Mesh>>().len(),
            world.resource::<Assets<StandardMaterial>>().len(),
            world.resource::<Assets<Image>>().len(),
        )
    }

    #[test]
    fn mounts_configured_spheres_on_startup() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        let all = instances(&mut app);
        assert_eq!(all.len(), 1);
        let (root, instance) = &all[0];
        assert_eq!(instance.members.len(), 20);
        assert!(instance.is_running());
        let world = app.world_mut();
        let mut q = world.query::<(&FieldMember, &Drifter)>();
        assert_eq!(q.iter(world).filter(|(m, _)| m.instance == *root).count(), 20);
        assert!(world.get::<Camera>(instance.camera).is_some());
        assert_eq!(asset_counts(&app), (20, 20, 0));
    }

    #[test]
    fn labels_mount_one_member_per_symbol() {
        let mut app = field_app(FieldVariant::Labels);
        app.update();
        let all = instances(&mut app);
        let symbols = app.world().resource::<BackdropConfigRes>().0.labels.symbols.len();
        assert_eq!(all[0].1.members.len(), symbols);
        assert_eq!(asset_counts(&app).2, symbols);
    }

    #[test]
    fn particles_mount_a_single_cloud_closer_in() {
        let mut app = field_app(FieldVariant::Particles);
        app.update();
        let (root, instance) = instances(&mut app).remove(0);
        assert_eq!(instance.members.len(), 1);
        let rig = app.world().get::<CameraRig>(root).unwrap();
        assert_eq!(rig.eye.z, 5.0);
    }

    #[test]
    fn second_mount_is_ignored_while_running() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        app.world_mut().send_event(MountField {
            variant: FieldVariant::Particles,
        });
        app.update();
        assert_eq!(instances(&mut app).len(), 1);
    }

    #[test]
    fn missing_window_mounts_nothing() {
        let mut app = field_app(FieldVariant::Spheres);
        let window = {
            let world = app.world_mut();
            let mut q = world.query_filtered::<Entity, With<PrimaryWindow>>();
            q.single(world).expect("primary window")
        };
        app.world_mut().despawn(window);
        app.update();
        assert!(instances(&mut app).is_empty());
    }

    #[test]
    fn zero_sized_window_mounts_nothing() {
        let mut app = field_app(FieldVariant::Spheres);
        {
            let world = app.world_mut();
            let mut q = world.query_filtered::<&mut Window, With<PrimaryWindow>>();
            let mut window = q.single_mut(world).expect("primary window");
            window.resolution = WindowResolution::new(0.0, 600.0);
        }
        app.update();
        assert!(instances(&mut app).is_empty());
        assert_eq!(asset_counts(&app), (0, 0, 0));
    }

    #[test]
    #[should_panic]
    fn labels_without_glyphs_fail_hard() {
        let mut app = field_app(FieldVariant::Labels);
        app.world_mut().remove_resource::<LabelGlyphs>();
        app.update();
    }

    #[test]
    fn teardown_releases_everything_and_is_idempotent() {
        let mut app = field_app(FieldVariant::Labels);
        app.update();
        let (root, _) = instances(&mut app).remove(0);
        app.world_mut().send_event(TeardownField { instance: root });
        app.world_mut().send_event(TeardownField { instance: root });
        app.update();
        assert!(app.world().get_entity(root).is_err());
        assert!(instances(&mut app).is_empty());
        assert_eq!(asset_counts(&app), (0, 0, 0));
        let world = app.world_mut();
        assert_eq!(world.query::<&FieldMember>().iter(world).count(), 0);
        assert_eq!(world.query::<&Camera>().iter(world).count(), 0);

        // Stale request for a despawned instance is a no-op.
        app.world_mut().send_event(TeardownField { instance: root });
        app.update();
    }

    #[test]
    fn teardown_restores_the_prior_ambient_light() {
        let mut app = field_app(FieldVariant::Spheres);
        app.insert_resource(AmbientLight {
            brightness: 42.0,
            ..default()
        });
        app.update();
        let mounted = app.world().resource::<AmbientLight>().brightness;
        let cfg_brightness = app
            .world()
            .resource::<BackdropConfigRes>()
            .0
            .lighting
            .ambient_brightness;
        assert_eq!(mounted, cfg_brightness);

        let (root, _) = instances(&mut app).remove(0);
        app.world_mut().send_event(TeardownField { instance: root });
        app.update();
        assert_eq!(app.world().resource::<AmbientLight>().brightness, 42.0);
    }

    #[test]
    fn teardown_without_prior_ambient_removes_it() {
        let mut app = field_app(FieldVariant::Particles);
        app.update();
        assert!(app.world().contains_resource::<AmbientLight>());
        let (root, _) = instances(&mut app).remove(0);
        app.world_mut().send_event(TeardownField { instance: root });
        app.update();
        assert!(!app.world().contains_resource::<AmbientLight>());
    }

    #[test]
    fn closing_the_window_retires_the_field() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        let (_, instance) = instances(&mut app).remove(0);
        app.world_mut().despawn(instance.window);
        app.update();
        app.update();
        assert!(instances(&mut app).is_empty());
        assert_eq!(asset_counts(&app), (0, 0, 0));
    }

    #[test]
    fn disabled_field_waits_for_request() {
        let mut app = field_app(FieldVariant::Spheres);
        app.world_mut().resource_mut::<BackdropConfigRes>().0.field.enabled = false;
        app.update();
        assert!(instances(&mut app).is_empty());
        app.world_mut().send_event(MountField {
            variant: FieldVariant::Spheres,
        });
        app.update();
        assert_eq!(instances(&mut app).len(), 1);
    }
}
