// integration_tests crate
// Black-box tests across the published plugin APIs: compose every plugin headlessly,
// drive frames, and check the field invariants from the outside.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResolution};
use fb_config::BackdropConfig;
use fb_core::{BackdropConfigRes, CorePlugin};
use fb_gameplay::GameplayPlugin;
use fb_rendering::{BlockGlyphs, LabelGlyphs, RenderingPlugin};

/// Headless app: minimal plugins, asset stores, input, one primary window and block glyphs.
pub fn build_minimal_app(cfg: BackdropConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    // AssetPlugin -> asset stores for meshes / materials / label textures
    // InputPlugin -> ButtonInput<KeyCode> and wheel events as in a windowed run
    app.add_plugins((
        bevy::asset::AssetPlugin::default(),
        bevy::input::InputPlugin,
    ));
    app.init_asset::<Mesh>();
    app.init_asset::<StandardMaterial>();
    app.init_asset::<Image>();

    let (width, height) = (cfg.window.width, cfg.window.height);
    app.world_mut().spawn((
        Window {
            resolution: WindowResolution::new(width, height),
            ..default()
        },
        PrimaryWindow,
    ));
    app.insert_resource(LabelGlyphs::new(BlockGlyphs));
    app.insert_resource(BackdropConfigRes(cfg));
    app.add_plugins((CorePlugin, RenderingPlugin, GameplayPlugin));
    app
}
