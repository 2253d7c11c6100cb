//! Theme-keyed colors for field members.
//! Config carries `#rrggbb` strings; anything unparsable falls back to the built-in pair.

use bevy::prelude::*;
use fb_config::{ThemeColors, ThemeMode};

pub struct Palette;
impl Palette {
    /// Tailwind primary-500.
    pub const SPHERE_DARK: [u8; 3] = [0x0e, 0xa5, 0xe9];
    /// hsl(0, 0%, 95%).
    pub const SPHERE_LIGHT: [u8; 3] = [0xf2, 0xf2, 0xf2];
    pub const LABEL_DARK: [u8; 3] = [0x38, 0xbd, 0xf8];
    pub const LABEL_LIGHT: [u8; 3] = [0x0c, 0x4a, 0x6e];
    pub const PARTICLE: [u8; 3] = [0x00, 0xaa, 0xff];
}

/// Parse `#rrggbb` / `rrggbb`.
pub fn hex_rgb(s: &str) -> Option<[u8; 3]> {
    let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Resolve the themed entry of `colors`, or `fallback` for that theme.
pub fn themed_rgb(colors: &ThemeColors, theme: ThemeMode, fallback: ([u8; 3], [u8; 3])) -> [u8; 3] {
    hex_rgb(colors.for_theme(theme)).unwrap_or(match theme {
        ThemeMode::Light => fallback.0,
        ThemeMode::Dark => fallback.1,
    })
}

pub fn sphere_color(colors: &ThemeColors, theme: ThemeMode) -> Color {
    to_color(themed_rgb(
        colors,
        theme,
        (Palette::SPHERE_LIGHT, Palette::SPHERE_DARK),
    ))
}

/// Label ink as raw sRGB bytes, painted straight into the texture.
pub fn label_ink(colors: &ThemeColors, theme: ThemeMode) -> [u8; 3] {
    themed_rgb(colors, theme, (Palette::LABEL_LIGHT, Palette::LABEL_DARK))
}

pub fn particle_color(hex: &str, opacity: f32) -> Color {
    let [r, g, b] = hex_rgb(hex).unwrap_or(Palette::PARTICLE);
    Color::srgba_u8(r, g, b, (opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[inline]
pub fn to_color([r, g, b]: [u8; 3]) -> Color {
    Color::srgb_u8(r, g, b)
}
