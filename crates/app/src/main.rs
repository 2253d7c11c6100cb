/*!
folio_backdrop: interactive 3D backdrop as a Bevy app.

* Config loading (native layered + wasm embed) using fb_config::BackdropConfig.
* CLI overrides (clap) and validation warnings logged at startup.
* Transparent primary window; LogPlugin filter from config / CLI.
* Label font loaded up front so a bad font path fails before any window opens.
*/

mod auto_close;
mod cli;

use anyhow::Context;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;
use fb_config::{BackdropConfig, FieldVariant};
use fb_core::{BackdropConfigRes, CorePlugin};
use fb_gameplay::GameplayPlugin;
use fb_rendering::{FontGlyphs, LabelGlyphs, RenderingPlugin};

use crate::auto_close::AutoClosePlugin;
use crate::cli::Cli;

const LOG_TARGET: &str = "folio_backdrop";

/// Config loading outcome, logged once logging is up.
#[derive(Resource, Debug, Default)]
struct ConfigReport {
    used: Vec<String>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

// ---------------- Config Loading ----------------

#[cfg(target_arch = "wasm32")]
fn load_config(_extra: Option<&std::path::Path>) -> (BackdropConfig, ConfigReport) {
    // Embed base config (no layered local override on wasm).
    const RAW: &str = include_str!("../../../assets/config/backdrop.ron");
    match BackdropConfig::from_ron_str(RAW) {
        Ok(cfg) => (
            cfg,
            ConfigReport {
                used: vec!["embedded backdrop.ron".into()],
                ..default()
            },
        ),
        Err(e) => (
            BackdropConfig::default(),
            ConfigReport {
                errors: vec![format!("embedded config: {e}; using defaults")],
                ..default()
            },
        ),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(extra: Option<&std::path::Path>) -> (BackdropConfig, ConfigReport) {
    let mut layers = vec![
        std::path::PathBuf::from("assets/config/backdrop.ron"),
        std::path::PathBuf::from("assets/config/backdrop.local.ron"),
    ];
    layers.extend(extra.map(|p| p.to_path_buf()));
    let (cfg, used, errors) = BackdropConfig::load_layered(layers);
    (
        cfg,
        ConfigReport {
            used,
            errors,
            warnings: Vec::new(),
        },
    )
}

fn report_startup(report: Res<ConfigReport>, cfg: Res<BackdropConfigRes>) {
    for e in &report.errors {
        warn!(target: LOG_TARGET, "CONFIG LOAD ISSUE: {e}");
    }
    if report.used.is_empty() {
        info!(target: LOG_TARGET, "No config layers found; using defaults");
    } else {
        info!(target: LOG_TARGET, used = ?report.used, "Config layers loaded");
    }
    for w in &report.warnings {
        warn!(target: LOG_TARGET, "CONFIG WARNING: {w}");
    }
    let c = &cfg.0;
    info!(target: LOG_TARGET, window = ?c.window, "Window config");
    info!(
        target: LOG_TARGET,
        variant = c.field.variant.label(),
        enabled = c.field.enabled,
        theme = ?c.field.theme,
        seed = ?c.field.seed,
        "Runtime summary"
    );
}

// ---------------- Main ----------------

fn main() -> anyhow::Result<()> {
    #[cfg(target_arch = "wasm32")]
    {
        // Better panic messages on wasm
        console_error_panic_hook::set_once();
    }

    let cli = Cli::parse();
    if let Some(path) = &cli.config {
        anyhow::ensure!(path.exists(), "config file {} not found", path.display());
    }
    let (mut cfg, mut report) = load_config(cli.config.as_deref());
    cli.apply(&mut cfg);
    report.warnings = cfg.validate();

    // Only the label field needs a font; the M key remounts the same variant.
    let glyphs = if cfg.field.variant == FieldVariant::Labels {
        let font = FontGlyphs::from_file(&cfg.labels.font_path).with_context(|| {
            format!(
                "label field needs a TrueType font; point labels.font_path at one (currently '{}')",
                cfg.labels.font_path
            )
        })?;
        Some(LabelGlyphs::new(font))
    } else {
        None
    };

    let mut app = App::new();
    app.insert_resource(BackdropConfigRes(cfg.clone()))
        .insert_resource(ClearColor(Color::NONE))
        .insert_resource(report)
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: cfg.window.title.clone(),
                        resolution: (cfg.window.width, cfg.window.height).into(),
                        resizable: true,
                        transparent: cfg.window.transparent,
                        fit_canvas_to_parent: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: cfg.log.filter.clone(),
                    ..default()
                }),
        )
        .add_plugins((CorePlugin, RenderingPlugin, GameplayPlugin, AutoClosePlugin))
        .add_systems(Startup, report_startup);
    if let Some(glyphs) = glyphs {
        app.insert_resource(glyphs);
    }

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("app exited with code {code}"),
    }
}
