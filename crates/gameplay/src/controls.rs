// Keyboard controls: T toggles the theme, M mounts / unmounts the configured field.

use bevy::prelude::*;
use fb_core::{ActiveTheme, BackdropConfigRes, FieldInstance, MountField, TeardownField};

const LOG_TARGET: &str = "fb_gameplay::controls";

pub const THEME_KEY: KeyCode = KeyCode::KeyT;
pub const MOUNT_KEY: KeyCode = KeyCode::KeyM;

pub fn theme_hotkey(keys: Res<ButtonInput<KeyCode>>, mut theme: ResMut<ActiveTheme>) {
    if keys.just_pressed(THEME_KEY) {
        let now = theme.toggle();
        info!(target: LOG_TARGET, "Theme -> {:?}", now);
    }
}

pub fn mount_hotkey(
    keys: Res<ButtonInput<KeyCode>>,
    instances: Query<(Entity, &FieldInstance)>,
    cfg: Res<BackdropConfigRes>,
    mut mount: EventWriter<MountField>,
    mut teardown: EventWriter<TeardownField>,
) {
    if !keys.just_pressed(MOUNT_KEY) {
        return;
    }
    let mut running = instances.iter().filter(|(_, i)| i.is_running()).peekable();
    if running.peek().is_none() {
        info!(target: LOG_TARGET, "Mount -> {}", cfg.0.field.variant.label());
        mount.write(MountField {
            variant: cfg.0.field.variant,
        });
        return;
    }
    for (entity, instance) in running {
        info!(target: LOG_TARGET, "Unmount -> {}", instance.variant.label());
        teardown.write(TeardownField { instance: entity });
    }
}
