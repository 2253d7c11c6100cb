// Gameplay crate: field lifecycle, input folding, per-frame stepping, theme binding and controls.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use fb_core::FieldSet;

pub mod controls;
pub mod frame;
pub mod lifecycle;
pub mod pointer;
pub mod spawning;
pub mod theme;

pub use lifecycle::{mount_field, MountError, MountRequest};

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        // Registered by WindowPlugin / InputPlugin in a full app; needed headless too.
        app.add_event::<CursorMoved>();
        app.add_event::<MouseWheel>();
        app.init_resource::<ButtonInput<KeyCode>>();

        app.add_systems(Startup, lifecycle::request_initial_mount);
        app.add_systems(
            Update,
            (
                controls::theme_hotkey,
                controls::mount_hotkey,
                lifecycle::retire_orphaned_fields,
                lifecycle::handle_teardown_requests,
                lifecycle::handle_mount_requests,
                theme::apply_theme,
            )
                .chain()
                .in_set(FieldSet::Lifecycle),
        );
        app.add_systems(
            Update,
            (pointer::fold_cursor, pointer::fold_scroll).in_set(FieldSet::Input),
        );
        app.add_systems(
            Update,
            (frame::step_fields, frame::spin_particles).in_set(FieldSet::Step),
        );
        app.add_systems(Update, frame::sync_transforms.in_set(FieldSet::Sync));
    }
}
