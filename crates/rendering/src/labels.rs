//! Runtime label textures.
//!
//! Each symbol becomes a square RGBA bitmap: transparent background, centered faux-bold text in
//! the theme ink. Rasterization goes through [`GlyphSource`] so the painter can run without a
//! font file; production uses [`FontGlyphs`] over an `ab_glyph` font.
//!
//! Sizing: the font size starts inversely proportional to symbol length and is shrunk further
//! if the measured line would take more than 90% of the texture width.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{Rgba, RgbaImage};

/// Fraction of the texture width a label line may occupy.
pub const MAX_LINE_FRACTION: f32 = 0.9;
/// Upper bound on font size relative to texture size (short symbols).
const MAX_PX_FRACTION: f32 = 0.6;

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("label texture size must be > 0")]
    ZeroTextureSize,
    #[error("label symbol is empty")]
    EmptySymbol,
    #[error("no glyph source installed; labels need a font")]
    NoGlyphSource,
    #[error("read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decode font {path}: {reason}")]
    FontDecode { path: PathBuf, reason: String },
}

/// Text measurement and coverage rasterization.
pub trait GlyphSource: Send + Sync + 'static {
    /// Advance width of `text` at `px`.
    fn measure(&self, text: &str, px: f32) -> f32;
    /// `(ascent, descent)` at `px`; descent is negative below the baseline.
    fn vertical_metrics(&self, px: f32) -> (f32, f32);
    /// Draw `text` with its baseline starting at `origin`, reporting per-pixel coverage in `0..=1`.
    fn rasterize(&self, text: &str, px: f32, origin: Vec2, plot: &mut dyn FnMut(i32, i32, f32));
}

pub struct FontGlyphs {
    font: FontArc,
}

impl FontGlyphs {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LabelError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes).map_err(|reason| LabelError::FontDecode {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, String> {
        FontArc::try_from_vec(bytes)
            .map(|font| Self { font })
            .map_err(|e| e.to_string())
    }
}

impl GlyphSource for FontGlyphs {
    fn measure(&self, text: &str, px: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn vertical_metrics(&self, px: f32) -> (f32, f32) {
        let scaled = self.font.as_scaled(PxScale::from(px));
        (scaled.ascent(), scaled.descent())
    }

    fn rasterize(&self, text: &str, px: f32, origin: Vec2, plot: &mut dyn FnMut(i32, i32, f32)) {
        let scale = PxScale::from(px);
        let scaled = self.font.as_scaled(scale);
        let mut caret = origin.x;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, origin.y));
            caret += scaled.h_advance(id);
            prev = Some(id);
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue; // whitespace
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, c| {
                plot(bounds.min.x as i32 + x as i32, bounds.min.y as i32 + y as i32, c);
            });
        }
    }
}

/// Installed glyph source. Absent when labels are not in use.
#[derive(Resource, Clone)]
pub struct LabelGlyphs(pub Arc<dyn GlyphSource>);

impl LabelGlyphs {
    pub fn new(source: impl GlyphSource) -> Self {
        Self(Arc::new(source))
    }
}

/// Starting font size for a symbol of `chars` characters on a `size` px texture.
pub fn label_font_px(chars: usize, size: u32) -> f32 {
    let size = size as f32;
    (size * 1.2 / chars.max(1) as f32).min(size * MAX_PX_FRACTION)
}

/// Paint `symbol` centered on a transparent `size`×`size` bitmap.
pub fn paint_label(
    glyphs: &dyn GlyphSource,
    symbol: &str,
    size: u32,
    ink: [u8; 3],
) -> Result<RgbaImage, LabelError> {
    if size == 0 {
        return Err(LabelError::ZeroTextureSize);
    }
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(LabelError::EmptySymbol);
    }

    let limit = size as f32 * MAX_LINE_FRACTION;
    let mut px = label_font_px(symbol.chars().count(), size);
    let mut width = glyphs.measure(symbol, px);
    if width > limit {
        px *= limit / width;
        width = glyphs.measure(symbol, px);
    }

    let (ascent, descent) = glyphs.vertical_metrics(px);
    let origin = Vec2::new(
        (size as f32 - width) * 0.5,
        size as f32 * 0.5 + (ascent + descent) * 0.5,
    );
    // Faux bold: strike twice, the second pass nudged right.
    let embolden = (px / 48.0).round().max(1.0);

    let mut img = RgbaImage::from_pixel(size, size, Rgba([ink[0], ink[1], ink[2], 0]));
    for dx in [0.0, embolden] {
        glyphs.rasterize(symbol, px, origin + Vec2::new(dx, 0.0), &mut |x, y, c| {
            if x < 0 || y < 0 || x >= size as i32 || y >= size as i32 {
                return;
            }
            let a = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            let pixel = img.get_pixel_mut(x as u32, y as u32);
            pixel.0[3] = pixel.0[3].max(a);
        });
    }
    Ok(img)
}

/// Upload-ready texture from a painted label.
pub fn label_image(img: RgbaImage) -> Image {
    let (width, height) = img.dimensions();
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        img.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Monospace block glyphs: every character is a filled box. Used where no font file exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockGlyphs;

impl BlockGlyphs {
    const ADVANCE: f32 = 0.6;
    const INK: f32 = 0.5;
    const CAP: f32 = 0.7;
}

impl GlyphSource for BlockGlyphs {
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * Self::ADVANCE
    }

    fn vertical_metrics(&self, px: f32) -> (f32, f32) {
        (px * 0.8, -px * 0.2)
    }

    fn rasterize(&self, text: &str, px: f32, origin: Vec2, plot: &mut dyn FnMut(i32, i32, f32)) {
        let top = (origin.y - px * Self::CAP).round() as i32;
        let bottom = origin.y.round() as i32;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = (origin.x + i as f32 * px * Self::ADVANCE).round() as i32;
            let right = left + (px * Self::INK).round() as i32;
            for y in top..bottom {
                for x in left..right {
                    plot(x, y, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inked_columns(img: &RgbaImage) -> (u32, u32) {
        let mut min = u32::MAX;
        let mut max = 0;
        for (x, _, p) in img.enumerate_pixels() {
            if p.0[3] > 0 {
                min = min.min(x);
                max = max.max(x);
            }
        }
        (min, max)
    }

    #[test]
    fn font_px_shrinks_with_length() {
        assert!(label_font_px(2, 256) > label_font_px(6, 256));
        assert_eq!(label_font_px(1, 256), 256.0 * MAX_PX_FRACTION);
        assert_eq!(label_font_px(0, 256), label_font_px(1, 256));
    }

    #[test]
    fn paints_centered_ink_on_transparent_background() {
        let img = paint_label(&BlockGlyphs, "Rust", 256, [12, 74, 110]).unwrap();
        assert_eq!(img.dimensions(), (256, 256));
        // Corners stay transparent.
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(255, 255).0[3], 0);
        let (min, max) = inked_columns(&img);
        assert!(min < max, "something was drawn");
        // Roughly symmetric horizontal margins.
        let left = min as i32;
        let right = 255 - max as i32;
        assert!((left - right).abs() <= 24, "left {left} right {right}");
        let center = img.get_pixel((min + 2).min(255), 128);
        assert_eq!(&center.0[..3], &[12, 74, 110]);
    }

    #[test]
    fn long_symbols_fit_within_margin() {
        let img = paint_label(&BlockGlyphs, "Kubernetes", 128, [255, 255, 255]).unwrap();
        let (min, max) = inked_columns(&img);
        let span = (max - min + 1) as f32;
        assert!(span <= 128.0 * MAX_LINE_FRACTION + 4.0, "span {span}");
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(matches!(
            paint_label(&BlockGlyphs, "JS", 0, [0, 0, 0]),
            Err(LabelError::ZeroTextureSize)
        ));
        assert!(matches!(
            paint_label(&BlockGlyphs, "  ", 64, [0, 0, 0]),
            Err(LabelError::EmptySymbol)
        ));
    }

    #[test]
    fn missing_font_file_is_reported() {
        let err = FontGlyphs::from_file("no/such/font.ttf").err().expect("error");
        assert!(matches!(err, LabelError::FontRead { .. }));
        assert!(err.to_string().contains("no/such/font.ttf"));
        assert!(FontGlyphs::from_bytes(vec![0, 1, 2, 3]).is_err());
    }

    #[test]
    fn image_has_expected_layout() {
        let img = paint_label(&BlockGlyphs, "Git", 64, [1, 2, 3]).unwrap();
        let image = label_image(img);
        assert_eq!(image.width(), 64);
        assert_eq!(image.height(), 64);
        assert_eq!(image.texture_descriptor.format, TextureFormat::Rgba8UnormSrgb);
    }

    // Default config points at the font under assets/fonts; paths are relative to the workspace root.
    #[test]
    fn default_font_path_loads_and_paints() {
        let cfg = fb_config::BackdropConfig::default();
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join(&cfg.labels.font_path);
        let glyphs = FontGlyphs::from_file(&path).expect("shipped label font loads");
        for symbol in &cfg.labels.symbols {
            let img =
                paint_label(&glyphs, symbol, cfg.labels.texture_size, [56, 189, 248]).unwrap();
            let (min, max) = inked_columns(&img);
            assert!(min < max, "{symbol} drew nothing");
            let span = (max - min + 1) as f32;
            let limit = cfg.labels.texture_size as f32 * MAX_LINE_FRACTION;
            assert!(span <= limit + 6.0, "{symbol} span {span}");
        }
    }
}
