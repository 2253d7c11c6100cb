// Re-theme running instances when ActiveTheme changes.
// Spheres keep their members and only recolor; labels are rebuilt with fresh textures.

use bevy::ecs::error::BevyError;
use bevy::prelude::*;
use fb_config::FieldVariant;
use fb_core::{ActiveTheme, BackdropConfigRes, FieldInstance, FieldRng};
use fb_rendering::{
    palette::sphere_color, release_member_assets, scene::recolor_member, FieldStores, LabelError,
    LabelGlyphs, MemberAssets,
};

use crate::spawning::{label_members, spawn_members};

const LOG_TARGET: &str = "fb_gameplay::theme";

#[allow(clippy::too_many_arguments)]
pub fn apply_theme(
    mut commands: Commands,
    theme: Res<ActiveTheme>,
    mut instances: Query<(Entity, &mut FieldInstance)>,
    member_assets: Query<&MemberAssets>,
    mut stores: FieldStores,
    mut rng: ResMut<FieldRng>,
    cfg: Res<BackdropConfigRes>,
    glyphs: Option<Res<LabelGlyphs>>,
) -> Result<(), BevyError> {
    let theme = theme.0;
    for (root, mut instance) in &mut instances {
        if !instance.is_running() || instance.theme == theme {
            continue;
        }
        match instance.variant {
            FieldVariant::Spheres => {
                let color = sphere_color(&cfg.0.spheres.colors, theme);
                for &member in &instance.members {
                    let Ok(assets) = member_assets.get(member) else {
                        continue;
                    };
                    if !recolor_member(&mut stores, assets, color) {
                        debug!(target: LOG_TARGET, "member {member} has no material; skipped recolor");
                    }
                }
            }
            FieldVariant::Labels => {
                let glyphs = glyphs.as_deref().ok_or(LabelError::NoGlyphSource)?;
                // Paint the new set before touching the old one.
                let seeds =
                    label_members(&mut stores, &mut rng.0, glyphs.0.as_ref(), &cfg.0, theme)?;
                for &member in &instance.members {
                    if let Ok(assets) = member_assets.get(member) {
                        release_member_assets(&mut stores, assets);
                    }
                    commands.entity(member).despawn();
                }
                instance.members = spawn_members(&mut commands, root, seeds);
            }
            FieldVariant::Particles => {}
        }
        instance.theme = theme;
        info!(target: LOG_TARGET, "{} field re-themed to {:?}", instance.variant.label(), theme);
    }
    Ok(())
}
