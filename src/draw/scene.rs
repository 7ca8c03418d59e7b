use super::{Color, Surface};
use crate::engine::EpicycleEngine;
use crate::viewport::Viewport;

const POINT_RADIUS: f64 = 1.0;
const TRACE_WIDTH: f64 = 5.0;

/// Issues one frame of draw requests for the engine's current state.
///
/// Order: drawn points, then each gear circle with its rod, then the
/// visible traces on top.
pub fn paint_scene<S: Surface + ?Sized>(engine: &EpicycleEngine, view: &Viewport, surface: &mut S) {
    surface.clear();
    let (cx, cy) = view.center();
    surface.translate(cx, cy);
    surface.scale(view.scale, view.scale_y());

    surface.set_stroke_color(Color::WHITE);
    for p in engine.points() {
        surface.begin_path();
        surface.arc(p.x, p.y, POINT_RADIUS);
        surface.stroke();
    }

    for (rank, (gear, center)) in engine.gears().iter().zip(engine.centers()).enumerate() {
        let pivot = engine.pivot(rank);
        surface.begin_path();
        surface.arc(pivot.x, pivot.y, gear.radius);
        surface.stroke();
        if engine.rod_visible(rank) {
            surface.begin_path();
            surface.move_to(pivot.x, pivot.y);
            surface.line_to(center.x, center.y);
            surface.stroke();
        }
    }

    surface.set_line_width(TRACE_WIDTH);
    for (rank, trace) in engine.traces().iter().enumerate() {
        if !engine.trace_visible(rank) {
            continue;
        }
        let mut pts = trace.iter();
        let Some(first) = pts.next() else {
            continue;
        };
        surface.set_stroke_color(Color::hsl(engine.trace_hue(rank), 0.5, 0.5));
        surface.begin_path();
        surface.move_to(first.x, first.y);
        for p in pts {
            surface.line_to(p.x, p.y);
        }
        surface.stroke();
    }
}
