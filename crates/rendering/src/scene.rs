// Scene plumbing for a field instance: camera, lights, per-member assets, resize handling.

use bevy::asset::RenderAssetUsages;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::window::WindowResized;
use fb_config::{CameraConfig, LabelFieldConfig, LightingConfig, SphereFieldConfig};
use fb_core::{CameraRig, FieldCamera, FieldInstance, Surface};

const LOG_TARGET: &str = "fb_rendering::scene";

/// Asset stores touched when members are built, recolored or released.
#[derive(SystemParam)]
pub struct FieldStores<'w> {
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
    pub images: ResMut<'w, Assets<Image>>,
}

/// Renderable owned by exactly one member. Released explicitly on teardown / rebuild.
#[derive(Component, Debug, Clone)]
pub struct MemberAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
    pub texture: Option<Handle<Image>>,
}

impl MemberAssets {
    pub fn bundle(&self) -> (Mesh3d, MeshMaterial3d<StandardMaterial>) {
        (
            Mesh3d(self.mesh.clone()),
            MeshMaterial3d(self.material.clone()),
        )
    }
}

/// Drop the member's mesh, material and texture from their stores.
pub fn release_member_assets(stores: &mut FieldStores, assets: &MemberAssets) {
    stores.meshes.remove(&assets.mesh);
    stores.materials.remove(&assets.material);
    if let Some(texture) = &assets.texture {
        stores.images.remove(texture);
    }
}

pub fn sphere_assets(
    stores: &mut FieldStores,
    radius: f32,
    color: Color,
    cfg: &SphereFieldConfig,
) -> MemberAssets {
    let mesh = stores.meshes.add(Sphere::new(radius).mesh().uv(32, 32));
    let material = stores.materials.add(StandardMaterial {
        base_color: color,
        perceptual_roughness: cfg.roughness,
        metallic: cfg.metallic,
        ..default()
    });
    MemberAssets {
        mesh,
        material,
        texture: None,
    }
}

pub fn label_assets(stores: &mut FieldStores, texture: Image, cfg: &LabelFieldConfig) -> MemberAssets {
    let texture = stores.images.add(texture);
    let mesh = stores
        .meshes
        .add(Rectangle::new(cfg.plane_size, cfg.plane_size));
    let material = stores.materials.add(StandardMaterial {
        base_color_texture: Some(texture.clone()),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    });
    MemberAssets {
        mesh,
        material,
        texture: Some(texture),
    }
}

/// One point-list mesh holding every particle.
pub fn particle_assets(stores: &mut FieldStores, points: Vec<[f32; 3]>, color: Color) -> MemberAssets {
    let normals = vec![[0.0, 0.0, 1.0]; points.len()];
    let mut mesh = Mesh::new(
        PrimitiveTopology::PointList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, points);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    let mesh = stores.meshes.add(mesh);
    let material = stores.materials.add(StandardMaterial {
        base_color: color,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });
    MemberAssets {
        mesh,
        material,
        texture: None,
    }
}

/// Set the base color of a member's own material.
pub fn recolor_member(stores: &mut FieldStores, assets: &MemberAssets, color: Color) -> bool {
    match stores.materials.get_mut(&assets.material) {
        Some(material) => {
            material.base_color = color;
            true
        }
        None => false,
    }
}

pub fn perspective(cfg: &CameraConfig, aspect: f32) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: cfg.fov_degrees.to_radians(),
        aspect_ratio: aspect,
        near: cfg.near,
        far: cfg.far,
        ..default()
    })
}

/// Camera on +Z looking at the origin; clears to transparent so the window shows through.
pub fn spawn_field_camera(
    commands: &mut Commands,
    root: Entity,
    rig: &CameraRig,
    cfg: &CameraConfig,
) -> Entity {
    commands
        .spawn((
            Name::new("field_camera"),
            FieldCamera,
            Camera3d::default(),
            Camera {
                clear_color: ClearColorConfig::Custom(Color::NONE),
                ..default()
            },
            perspective(cfg, rig.aspect),
            Transform::from_translation(rig.eye).looking_at(Vec3::ZERO, Vec3::Y),
            ChildOf(root),
        ))
        .id()
}

/// Ambient term that was active before an instance took over the global `AmbientLight`.
#[derive(Component, Debug, Clone)]
pub struct PriorAmbient(pub Option<AmbientLight>);

/// Directional light from `(0,1,1)` toward the origin, plus the global ambient term.
/// `previous` is stashed on the root so teardown can put it back.
pub fn spawn_field_lights(
    commands: &mut Commands,
    root: Entity,
    cfg: &LightingConfig,
    previous: Option<AmbientLight>,
) -> Entity {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: cfg.ambient_brightness,
        ..default()
    });
    commands.entity(root).insert(PriorAmbient(previous));
    commands
        .spawn((
            Name::new("field_light"),
            DirectionalLight {
                illuminance: cfg.directional_illuminance,
                ..default()
            },
            Transform::from_xyz(0.0, 1.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
            ChildOf(root),
        ))
        .id()
}

/// Undo the ambient override of a torn-down instance.
pub fn restore_ambient(commands: &mut Commands, prior: &PriorAmbient) {
    match &prior.0 {
        Some(ambient) => commands.insert_resource(ambient.clone()),
        None => commands.remove_resource::<AmbientLight>(),
    }
}

/// Follow window resizes: surface size, rig aspect and camera projection.
pub fn apply_window_resize(
    mut resized: EventReader<WindowResized>,
    mut instances: Query<(&FieldInstance, &mut Surface, &mut CameraRig)>,
    mut projections: Query<&mut Projection, With<FieldCamera>>,
) {
    for ev in resized.read() {
        if ev.width <= 0.0 || ev.height <= 0.0 {
            continue;
        }
        for (instance, mut surface, mut rig) in &mut instances {
            if instance.window != ev.window || !instance.is_running() {
                continue;
            }
            *surface = Surface {
                width: ev.width,
                height: ev.height,
            };
            rig.aspect = surface.aspect();
            if let Ok(mut projection) = projections.get_mut(instance.camera) {
                if let Projection::Perspective(p) = projection.as_mut() {
                    p.aspect_ratio = rig.aspect;
                }
            }
            debug!(target: LOG_TARGET, "resized to {}x{} (aspect {:.3})", ev.width, ev.height, rig.aspect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use fb_config::{BackdropConfig, FieldVariant, ThemeMode};
    use fb_core::{FieldState, MotionProfile};

    fn asset_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        app.init_asset::<Mesh>();
        app.init_asset::<StandardMaterial>();
        app.init_asset::<Image>();
        app
    }

    fn store_counts(world: &World) -> (usize, usize, usize) {
        (
            world.resource::<Assets<Mesh>>().len(),
            world.resource::<Assets<StandardMaterial>>().len(),
            world.resource::<Assets<Image>>().len(),
        )
    }

    #[test]
    fn builds_and_releases_member_assets() {
        let mut app = asset_app();
        let cfg = BackdropConfig::default();
        let built = app
            .world_mut()
            .run_system_once(move |mut stores: FieldStores| {
                let a = sphere_assets(&mut stores, 2.0, Color::WHITE, &cfg.spheres);
                let b = label_assets(&mut stores, Image::default(), &cfg.labels);
                let c = particle_assets(&mut stores, vec![[0.0; 3]; 10], Color::WHITE);
                vec![a, b, c]
            })
            .expect("system ran");
        assert_eq!(store_counts(app.world()), (3, 3, 1));
        app.world_mut()
            .run_system_once(move |mut stores: FieldStores| {
                for assets in &built {
                    release_member_assets(&mut stores, assets);
                }
            })
            .expect("system ran");
        assert_eq!(store_counts(app.world()), (0, 0, 0));
    }

    #[test]
    fn recolor_mutates_in_place() {
        let mut app = asset_app();
        let cfg = BackdropConfig::default();
        let assets = app
            .world_mut()
            .run_system_once(move |mut stores: FieldStores| {
                sphere_assets(&mut stores, 1.0, Color::WHITE, &cfg.spheres)
            })
            .expect("system ran");
        let handle = assets.material.clone();
        let recolored = app
            .world_mut()
            .run_system_once(move |mut stores: FieldStores| {
                recolor_member(&mut stores, &assets, Color::BLACK)
            })
            .expect("system ran");
        assert!(recolored);
        let materials = app.world().resource::<Assets<StandardMaterial>>();
        assert_eq!(materials.get(&handle).map(|m| m.base_color), Some(Color::BLACK));
        assert_eq!(materials.len(), 1);
    }

    #[test]
    fn resize_updates_owning_instance_only() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_event::<WindowResized>();
        app.add_systems(Update, apply_window_resize);

        let window = app.world_mut().spawn(Window::default()).id();
        let other = app.world_mut().spawn(Window::default()).id();
        let cam_cfg = CameraConfig::default();
        let camera = app
            .world_mut()
            .spawn((FieldCamera, perspective(&cam_cfg, 1.0)))
            .id();
        let root = app
            .world_mut()
            .spawn((
                FieldInstance {
                    variant: FieldVariant::Spheres,
                    boundary: 40.0,
                    motion: MotionProfile::still(),
                    members: Vec::new(),
                    window,
                    camera,
                    theme: ThemeMode::Light,
                    state: FieldState::Running,
                },
                Surface {
                    width: 100.0,
                    height: 100.0,
                },
                CameraRig::new(50.0, 75f32.to_radians(), 1.0),
            ))
            .id();

        app.world_mut().send_event(WindowResized {
            window: other,
            width: 10.0,
            height: 500.0,
        });
        app.update();
        assert_eq!(app.world().get::<CameraRig>(root).unwrap().aspect, 1.0);

        app.world_mut().send_event(WindowResized {
            window,
            width: 1920.0,
            height: 1080.0,
        });
        app.update();
        let rig = app.world().get::<CameraRig>(root).unwrap();
        assert!((rig.aspect - 16.0 / 9.0).abs() < 1e-5);
        assert_eq!(app.world().get::<Surface>(root).unwrap().width, 1920.0);
        match app.world().get::<Projection>(camera).unwrap() {
            Projection::Perspective(p) => assert!((p.aspect_ratio - 16.0 / 9.0).abs() < 1e-5),
            other => panic!("unexpected projection {other:?}"),
        }
    }
}
