// Core crate: shared ECS vocabulary for the backdrop field.
// Records, instance state, events, system sets and the pure motion / picking math.

use bevy::prelude::*;
use fb_config::{FieldVariant, ThemeMode};
use rand::{rngs::StdRng, SeedableRng};

pub mod motion;
pub mod picking;

pub use motion::{HoverResponse, MotionProfile};
pub use picking::{cursor_to_ndc, PointerRay};

/// Plain kinematic record of one field member. The rendered `Transform` is written from it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Drifter {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Current per-axis scale; equals `rest_scale` unless hovered.
    pub scale: Vec3,
    pub rest_scale: Vec3,
}

impl Drifter {
    pub fn at(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            scale: Vec3::ONE,
            rest_scale: Vec3::ONE,
        }
    }

    pub fn with_rest_scale(mut self, rest: Vec3) -> Self {
        self.rest_scale = rest;
        self.scale = rest;
        self
    }
}

/// Unscaled pick geometry of a member.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum HitShape {
    Sphere { radius: f32 },
    Quad { half_extents: Vec2 },
    Unpickable,
}

/// Back-reference from a member to its instance root.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMember {
    pub instance: Entity,
}

/// The single point-cloud member of a particle field.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct ParticleCloud {
    /// Accumulated rotation about X (`.x`) and Y (`.y`), radians, applied in XYZ order.
    pub spin: Vec2,
}

/// Marker for the camera owned by an instance.
#[derive(Component, Debug, Default)]
pub struct FieldCamera;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Running,
    Disposed,
}

/// One mounted field. Lives on the instance root; camera, light and members are its children.
#[derive(Component, Debug, Clone)]
pub struct FieldInstance {
    pub variant: FieldVariant,
    pub boundary: f32,
    pub motion: MotionProfile,
    /// Members in spawn order; the frame step walks them in this order.
    pub members: Vec<Entity>,
    pub window: Entity,
    pub camera: Entity,
    /// Theme the members were last built / colored for.
    pub theme: ThemeMode,
    pub state: FieldState,
}

impl FieldInstance {
    pub fn is_running(&self) -> bool {
        self.state == FieldState::Running
    }
}

/// Pointer position in normalized device coordinates, `(0,0)` until the cursor moves.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Deref, DerefMut)]
pub struct PointerNdc(pub Vec2);

/// Accumulated vertical scroll in pixels, never negative.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Deref, DerefMut)]
pub struct ScrollDepth(pub f32);

/// Logical size of the owning window.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Surface {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Camera parameters needed to cast pointer rays. Mirrors the spawned camera's projection.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub eye: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub aspect: f32,
}

impl CameraRig {
    pub fn new(distance: f32, fov_y: f32, aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, distance),
            fov_y,
            aspect,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveTheme(pub ThemeMode);

impl ActiveTheme {
    pub fn toggle(&mut self) -> ThemeMode {
        self.0 = self.0.toggled();
        self.0
    }
}

/// Single source of randomness for spawning and hover jitter.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct FieldRng(pub StdRng);

impl FieldRng {
    pub fn seeded(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self(StdRng::seed_from_u64(s)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl Default for FieldRng {
    fn default() -> Self {
        Self::seeded(None)
    }
}

// Wrapper Bevy resource for the pure-data BackdropConfig (keeps fb_config free of bevy dependency).
#[derive(Resource, Debug, Clone, Default)]
pub struct BackdropConfigRes(pub fb_config::BackdropConfig);

/// Ask for a field to be mounted on the primary window.
#[derive(Event, Debug, Clone, Copy)]
pub struct MountField {
    pub variant: FieldVariant,
}

/// Ask for an instance to be torn down. Stale or repeated requests are ignored.
#[derive(Event, Debug, Clone, Copy)]
pub struct TeardownField {
    pub instance: Entity,
}

/// Per-frame ordering: mount/teardown, fold input, step members, write transforms.
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum FieldSet {
    Lifecycle,
    Input,
    Step,
    Sync,
}

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                FieldSet::Lifecycle,
                FieldSet::Input,
                FieldSet::Step,
                FieldSet::Sync,
            )
                .chain(),
        );
        app.add_event::<MountField>();
        app.add_event::<TeardownField>();
        app.init_resource::<BackdropConfigRes>();
        if !app.world().contains_resource::<ActiveTheme>() {
            let theme = app.world().resource::<BackdropConfigRes>().0.field.theme;
            app.insert_resource(ActiveTheme(theme));
        }
        if !app.world().contains_resource::<FieldRng>() {
            let seed = app.world().resource::<BackdropConfigRes>().0.field.seed;
            app.insert_resource(FieldRng::seeded(seed));
        }
    }
}
