// Pure-data configuration crate (no Bevy dependency).
// Provides: data structures, layered loading, validation producing warnings (non-fatal), and tests.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
    /// Request a compositor-transparent window so the field overlays the desktop.
    pub transparent: bool,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Folio Backdrop".into(),
            auto_close: 0.0,
            transparent: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` EnvFilter directives appended to Bevy's default filter.
    pub filter: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "wgpu=error,naga=warn".into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldVariant {
    #[default]
    Spheres,
    Labels,
    Particles,
}

impl FieldVariant {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spheres" | "balls" => Some(FieldVariant::Spheres),
            "labels" | "logos" => Some(FieldVariant::Labels),
            "particles" => Some(FieldVariant::Particles),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldVariant::Spheres => "spheres",
            FieldVariant::Labels => "labels",
            FieldVariant::Particles => "particles",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnRange<T> {
    pub min: T,
    pub max: T,
}
impl<T: Default> Default for SpawnRange<T> {
    fn default() -> Self {
        Self {
            min: Default::default(),
            max: Default::default(),
        }
    }
}

/// Light / dark color pair, `#rrggbb` hex strings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ThemeColors {
    pub light: String,
    pub dark: String,
}
impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            light: "#f2f2f2".into(),
            dark: "#0ea5e9".into(),
        }
    }
}

impl ThemeColors {
    pub fn for_theme(&self, theme: ThemeMode) -> &str {
        match theme {
            ThemeMode::Light => &self.light,
            ThemeMode::Dark => &self.dark,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Mount a field at startup (the `M` key toggles it at runtime).
    pub enabled: bool,
    pub variant: FieldVariant,
    /// Half extent of the cube confining every member position.
    pub boundary: f32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub theme: ThemeMode,
}
impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            variant: FieldVariant::Spheres,
            boundary: 40.0,
            seed: None,
            theme: ThemeMode::Light,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Eye distance on +Z for sphere / label fields (keeps the whole boundary cube in view).
    pub field_distance: f32,
    /// Eye distance on +Z for the particle cloud.
    pub particle_distance: f32,
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            field_distance: 50.0,
            particle_distance: 5.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_brightness: f32,
    pub directional_illuminance: f32,
}
impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_brightness: 600.0,
            directional_illuminance: 8000.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SphereFieldConfig {
    pub count: usize,
    pub radius_range: SpawnRange<f32>,
    /// Initial velocity per axis is uniform in `[-spawn_speed, spawn_speed]`.
    pub spawn_speed: f32,
    pub hover_jitter: f32,
    pub speed_cap: f32,
    /// Uniform scale applied while hovered.
    pub hover_scale: f32,
    pub roughness: f32,
    pub metallic: f32,
    pub colors: ThemeColors,
}
impl Default for SphereFieldConfig {
    fn default() -> Self {
        Self {
            count: 20,
            radius_range: SpawnRange { min: 1.0, max: 4.0 },
            spawn_speed: 0.02,
            hover_jitter: 0.05,
            speed_cap: 0.1,
            hover_scale: 1.5,
            roughness: 0.5,
            metallic: 0.5,
            colors: ThemeColors::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LabelFieldConfig {
    /// Ordered symbol list; one quad per symbol.
    pub symbols: Vec<String>,
    pub font_path: String,
    /// Square texture edge in pixels.
    pub texture_size: u32,
    /// Quad edge in world units before scaling.
    pub plane_size: f32,
    pub spawn_speed: f32,
    pub hover_jitter: f32,
    pub speed_cap: f32,
    pub rest_scale_range: SpawnRange<f32>,
    /// Multiplicative growth per hovered frame.
    pub hover_growth: f32,
    /// Growth stops at `rest_scale * hover_max_factor`.
    pub hover_max_factor: f32,
    pub colors: ThemeColors,
}
impl Default for LabelFieldConfig {
    fn default() -> Self {
        Self {
            symbols: [
                "JS", "TS", "React", "Node", "Rust", "HTML", "CSS", "Git", "SQL", "Mongo",
                "Docker", "Vite", "Three", "Python",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            font_path: "assets/fonts/DejaVuSans-Bold.ttf".into(),
            texture_size: 256,
            plane_size: 6.0,
            spawn_speed: 0.01,
            hover_jitter: 0.005,
            speed_cap: 0.03,
            rest_scale_range: SpawnRange { min: 0.5, max: 1.5 },
            hover_growth: 1.02,
            hover_max_factor: 3.0,
            colors: ThemeColors {
                light: "#0c4a6e".into(),
                dark: "#38bdf8".into(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ParticleFieldConfig {
    pub count: usize,
    /// Edge of the cube particles are scattered in (centered on the origin).
    pub spread: f32,
    /// Constant spin per frame (radians) on both X and Y.
    pub base_spin: f32,
    /// Extra spin per frame per unit of pointer NDC.
    pub pointer_spin: f32,
    /// World units of Z offset per scrolled pixel.
    pub scroll_depth: f32,
    pub color: String,
    pub opacity: f32,
}
impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            count: 500,
            spread: 20.0,
            base_spin: 0.002,
            pointer_spin: 0.01,
            scroll_depth: 0.01,
            color: "#00aaff".into(),
            opacity: 0.7,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BackdropConfig {
    pub window: WindowConfig,
    pub log: LogConfig,
    pub field: FieldConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub spheres: SphereFieldConfig,
    pub labels: LabelFieldConfig,
    pub particles: ParticleFieldConfig,
}

/// `#rrggbb` (or `rrggbb`) check without pulling a color crate into this data-only crate.
pub fn is_hex_color(s: &str) -> bool {
    let digits = s.strip_prefix('#').unwrap_or(s);
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

impl BackdropConfig {
    /// Load from a single RON file (errors contain human-readable context).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        Self::from_ron_str(&data)
    }

    /// Parse an in-memory RON document (embedded configs on wasm).
    pub fn from_ron_str(data: &str) -> Result<Self, String> {
        ron::from_str(data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Load file; on failure returns default config plus error string.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple layers; later overrides earlier (deep merge).
    /// Skips missing files; returns (config, used_paths, errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let existing = bm.iter_mut().find(|(ek, _)| **ek == k).map(|(_, ev)| ev);
                        match existing {
                            Some(ev) => merge_value(ev, v),
                            None => {
                                bm.insert(k, v);
                            }
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        match merged {
            Some(val) => match val.into_rust::<BackdropConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (BackdropConfig::default(), used, errors)
                }
            },
            None => (BackdropConfig::default(), used, errors),
        }
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        } else if self.window.auto_close > 0.0 && self.window.auto_close < 0.01 {
            w.push(format!(
                "window.autoClose {} very small; closes almost immediately",
                self.window.auto_close
            ));
        }
        if self.field.boundary <= 0.0 {
            w.push(format!("field.boundary {} must be > 0", self.field.boundary));
        }
        if self.camera.fov_degrees <= 1.0 || self.camera.fov_degrees >= 179.0 {
            w.push(format!(
                "camera.fov_degrees {} outside 1..179",
                self.camera.fov_degrees
            ));
        }
        if self.camera.near <= 0.0 || self.camera.near >= self.camera.far {
            w.push(format!(
                "camera near/far invalid ({} / {})",
                self.camera.near, self.camera.far
            ));
        }
        if self.camera.field_distance <= self.field.boundary {
            w.push(format!(
                "camera.field_distance {} inside the boundary cube ({}); members can pass behind the eye",
                self.camera.field_distance, self.field.boundary
            ));
        }

        fn check_range_f32(w: &mut Vec<String>, label: &str, r: &SpawnRange<f32>) {
            if r.min > r.max {
                w.push(format!("{label} min ({}) greater than max ({})", r.min, r.max));
            }
        }
        fn check_motion(w: &mut Vec<String>, label: &str, spawn: f32, jitter: f32, cap: f32) {
            if spawn < 0.0 {
                w.push(format!("{label}.spawn_speed negative"));
            }
            if jitter < 0.0 {
                w.push(format!("{label}.hover_jitter negative"));
            }
            if cap <= 0.0 {
                w.push(format!("{label}.speed_cap must be > 0"));
            }
        }
        fn check_colors(w: &mut Vec<String>, label: &str, c: &ThemeColors) {
            for (name, value) in [("light", &c.light), ("dark", &c.dark)] {
                if !is_hex_color(value) {
                    w.push(format!("{label}.colors.{name} '{value}' is not #rrggbb"));
                }
            }
        }

        let s = &self.spheres;
        if s.count == 0 {
            w.push("spheres.count is 0; nothing will spawn".into());
        }
        check_range_f32(&mut w, "spheres.radius_range", &s.radius_range);
        if s.radius_range.min <= 0.0 {
            w.push("spheres.radius_range.min must be > 0".into());
        }
        check_motion(&mut w, "spheres", s.spawn_speed, s.hover_jitter, s.speed_cap);
        if s.hover_scale <= 0.0 {
            w.push("spheres.hover_scale must be > 0".into());
        }
        check_colors(&mut w, "spheres", &s.colors);

        let l = &self.labels;
        if l.symbols.is_empty() {
            w.push("labels.symbols is empty; nothing will spawn".into());
        }
        for (i, sym) in l.symbols.iter().enumerate() {
            if sym.trim().is_empty() {
                w.push(format!("labels.symbols[{i}] is blank"));
            }
            if l.symbols[..i].contains(sym) {
                w.push(format!("labels.symbols[{i}] '{sym}' duplicates an earlier symbol"));
            }
        }
        if l.texture_size < 16 {
            w.push(format!("labels.texture_size {} too small (min 16)", l.texture_size));
        }
        if l.plane_size <= 0.0 {
            w.push("labels.plane_size must be > 0".into());
        }
        check_range_f32(&mut w, "labels.rest_scale_range", &l.rest_scale_range);
        if l.rest_scale_range.min <= 0.0 {
            w.push("labels.rest_scale_range.min must be > 0".into());
        }
        check_motion(&mut w, "labels", l.spawn_speed, l.hover_jitter, l.speed_cap);
        if l.hover_growth < 1.0 {
            w.push(format!("labels.hover_growth {} < 1 shrinks on hover", l.hover_growth));
        }
        if l.hover_max_factor < 1.0 {
            w.push(format!("labels.hover_max_factor {} < 1", l.hover_max_factor));
        }
        check_colors(&mut w, "labels", &l.colors);

        let p = &self.particles;
        if p.count == 0 {
            w.push("particles.count is 0; nothing will spawn".into());
        }
        if p.spread <= 0.0 {
            w.push("particles.spread must be > 0".into());
        }
        if !(0.0..=1.0).contains(&p.opacity) {
            w.push(format!("particles.opacity {} outside 0..1", p.opacity));
        }
        if !is_hex_color(&p.color) {
            w.push(format!("particles.color '{}' is not #rrggbb", p.color));
        }
        w
    }
}
