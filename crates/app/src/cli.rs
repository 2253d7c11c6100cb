// Command-line overrides applied on top of the layered RON config.

use std::path::PathBuf;

use clap::Parser;
use fb_config::{BackdropConfig, FieldVariant, ThemeMode};

#[derive(Parser, Debug, Default)]
#[command(about = "Interactive 3D backdrop: drifting spheres, text labels or a particle cloud", version)]
pub struct Cli {
    /// Extra RON config layer, merged after assets/config/backdrop(.local).ron.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Field to mount: spheres | labels | particles.
    #[arg(long, value_parser = parse_variant)]
    pub variant: Option<FieldVariant>,
    /// Initial theme: light | dark.
    #[arg(long, value_parser = parse_theme)]
    pub theme: Option<ThemeMode>,
    /// Fixed RNG seed for reproducible layouts.
    #[arg(long)]
    pub seed: Option<u64>,
    /// tracing filter directives, e.g. "fb_gameplay=debug".
    #[arg(long)]
    pub log_filter: Option<String>,
    /// Exit after this many seconds (0 disables).
    #[arg(long)]
    pub auto_close: Option<f32>,
    /// Start without a mounted field (press M to mount).
    #[arg(long)]
    pub no_field: bool,
}

fn parse_variant(s: &str) -> Result<FieldVariant, String> {
    FieldVariant::parse(s).ok_or_else(|| format!("unknown variant '{s}' (spheres|labels|particles)"))
}

fn parse_theme(s: &str) -> Result<ThemeMode, String> {
    ThemeMode::parse(s).ok_or_else(|| format!("unknown theme '{s}' (light|dark)"))
}

impl Cli {
    pub fn apply(&self, cfg: &mut BackdropConfig) {
        if let Some(variant) = self.variant {
            cfg.field.variant = variant;
        }
        if let Some(theme) = self.theme {
            cfg.field.theme = theme;
        }
        if self.seed.is_some() {
            cfg.field.seed = self.seed;
        }
        if let Some(filter) = &self.log_filter {
            cfg.log.filter = filter.clone();
        }
        if let Some(secs) = self.auto_close {
            cfg.window.auto_close = secs;
        }
        if self.no_field {
            cfg.field.enabled = false;
        }
    }
}
