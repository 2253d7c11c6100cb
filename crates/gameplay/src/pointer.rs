// Fold raw window input into per-instance pointer and scroll state.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use fb_core::{cursor_to_ndc, FieldInstance, PointerNdc, ScrollDepth, Surface};

/// Pixels per wheel "line", roughly one browser scroll step.
pub const LINE_HEIGHT_PX: f32 = 40.0;

pub fn fold_cursor(
    mut moved: EventReader<CursorMoved>,
    mut instances: Query<(&FieldInstance, &Surface, &mut PointerNdc)>,
) {
    for ev in moved.read() {
        for (instance, surface, mut ndc) in &mut instances {
            if instance.window != ev.window || !instance.is_running() {
                continue;
            }
            if let Some(mapped) = cursor_to_ndc(ev.position, surface.size()) {
                ndc.0 = mapped;
            }
        }
    }
}

/// Wheel down (negative `y`) scrolls deeper; depth never goes below zero.
pub fn fold_scroll(
    mut wheel: EventReader<MouseWheel>,
    mut instances: Query<(&FieldInstance, &mut ScrollDepth)>,
) {
    for ev in wheel.read() {
        let dy = match ev.unit {
            MouseScrollUnit::Line => ev.y * LINE_HEIGHT_PX,
            MouseScrollUnit::Pixel => ev.y,
        };
        for (instance, mut depth) in &mut instances {
            if instance.window != ev.window || !instance.is_running() {
                continue;
            }
            depth.0 = (depth.0 - dy).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::field_app;
    use fb_config::FieldVariant;

    fn instance_of(app: &mut App) -> (Entity, Entity) {
        let world = app.world_mut();
        let mut q = world.query::<(Entity, &FieldInstance)>();
        let (e, i) = q.single(world).expect("one instance");
        (e, i.window)
    }

    #[test]
    fn cursor_maps_to_ndc_last_event_wins() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        let (root, window) = instance_of(&mut app);
        for position in [Vec2::new(0.0, 0.0), Vec2::new(600.0, 150.0)] {
            app.world_mut().send_event(CursorMoved {
                window,
                position,
                delta: None,
            });
        }
        app.update();
        // 800x600 window.
        let ndc = app.world().get::<PointerNdc>(root).unwrap().0;
        assert!((ndc - Vec2::new(0.5, 0.5)).length() < 1e-6, "{ndc:?}");
    }

    #[test]
    fn other_window_is_ignored() {
        let mut app = field_app(FieldVariant::Spheres);
        app.update();
        let (root, _) = instance_of(&mut app);
        let other = app.world_mut().spawn(Window::default()).id();
        app.world_mut().send_event(CursorMoved {
            window: other,
            position: Vec2::ZERO,
            delta: None,
        });
        app.update();
        assert_eq!(app.world().get::<PointerNdc>(root).unwrap().0, Vec2::ZERO);
    }

    #[test]
    fn scroll_accumulates_and_clamps_at_zero() {
        let mut app = field_app(FieldVariant::Particles);
        app.update();
        let (root, window) = instance_of(&mut app);
        let wheel = |unit, y| MouseWheel {
            unit,
            x: 0.0,
            y,
            window,
        };
        app.world_mut().send_event(wheel(MouseScrollUnit::Line, -3.0));
        app.world_mut().send_event(wheel(MouseScrollUnit::Pixel, -30.0));
        app.update();
        assert_eq!(app.world().get::<ScrollDepth>(root).unwrap().0, 150.0);
        app.world_mut().send_event(wheel(MouseScrollUnit::Line, 10.0));
        app.update();
        assert_eq!(app.world().get::<ScrollDepth>(root).unwrap().0, 0.0);
    }
}
