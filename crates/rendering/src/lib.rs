// Rendering crate: colors, label textures and per-instance scene plumbing.
// Gameplay decides what to spawn; this crate owns how members look and how their assets live and die.

use bevy::prelude::*;
use bevy::window::WindowResized;
use fb_core::FieldSet;

pub mod labels;
pub mod palette;
pub mod scene;

pub use labels::{
    label_font_px, label_image, paint_label, BlockGlyphs, FontGlyphs, GlyphSource, LabelError,
    LabelGlyphs,
};
pub use palette::Palette;
pub use scene::{release_member_assets, restore_ambient, FieldStores, MemberAssets, PriorAmbient};

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        // Normally registered by WindowPlugin; headless apps need it too.
        app.add_event::<WindowResized>();
        app.add_systems(
            Update,
            scene::apply_window_resize.in_set(FieldSet::Input),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_adds() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(fb_core::CorePlugin);
        app.add_plugins(RenderingPlugin);
        app.update();
        assert!(app.world().contains_resource::<Events<WindowResized>>());
    }
}
