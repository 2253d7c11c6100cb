// Exits the app after `window.autoClose` seconds when > 0 (smoke runs, screenshots).
// 0.0 (default) => disabled.

use bevy::prelude::*;
use fb_core::BackdropConfigRes;

const LOG_TARGET: &str = "folio_backdrop::auto_close";

#[derive(Resource, Deref, DerefMut)]
struct AutoCloseTimer(Timer);

pub struct AutoClosePlugin;

impl Plugin for AutoClosePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, arm_auto_close)
            .add_systems(Update, tick_auto_close);
    }
}

fn arm_auto_close(mut commands: Commands, cfg: Res<BackdropConfigRes>) {
    let secs = cfg.0.window.auto_close;
    if secs > 0.0 {
        info!(target: LOG_TARGET, seconds = secs, "AutoClose: exiting after {secs} seconds");
        commands.insert_resource(AutoCloseTimer(Timer::from_seconds(secs, TimerMode::Once)));
    }
}

fn tick_auto_close(
    time: Res<Time>,
    timer: Option<ResMut<AutoCloseTimer>>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(mut timer) = timer else {
        return;
    };
    if timer.tick(time.delta()).just_finished() {
        info!(target: LOG_TARGET, "AutoClose: timer finished, requesting app exit");
        exit.write(AppExit::Success);
    }
}
