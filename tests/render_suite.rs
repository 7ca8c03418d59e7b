use epicycles::app::build_hud;
use epicycles::draw::{paint_scene, Canvas, Color, Surface};
use epicycles::engine::EpicycleEngine;
use epicycles::geometry::Point;
use epicycles::render::{
    draw_overlay_popup, AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer,
};
use epicycles::viewport::{CellGrid, Viewport, MAX_SCALE, MIN_SCALE};

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px.copy_from_slice(&[r, g, b, 255]);
    }
    buf
}

fn make_frame<'a>(cols: u16, visual_rows: u16, pw: usize, ph: usize, pixels: &'a [u8], sync: bool) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 1,
        visual_rows,
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        hud: "pts 4 | gears 4",
        hud_rows: 1,
        overlay: None,
        sync_updates: sync,
    }
}

fn square_engine() -> EpicycleEngine {
    let mut engine = EpicycleEngine::default();
    for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
        engine.add_point(Point::new(x, y));
    }
    engine
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Clear,
    Translate,
    Scale,
    Color(Color),
    Width(f64),
    Begin,
    Move,
    Line,
    Arc(f64),
    Stroke,
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
}

impl Recorder {
    fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface for Recorder {
    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }
    fn translate(&mut self, _dx: f64, _dy: f64) {
        self.ops.push(Op::Translate);
    }
    fn scale(&mut self, _sx: f64, _sy: f64) {
        self.ops.push(Op::Scale);
    }
    fn set_stroke_color(&mut self, color: Color) {
        self.ops.push(Op::Color(color));
    }
    fn set_line_width(&mut self, width: f64) {
        self.ops.push(Op::Width(width));
    }
    fn begin_path(&mut self) {
        self.ops.push(Op::Begin);
    }
    fn move_to(&mut self, _x: f64, _y: f64) {
        self.ops.push(Op::Move);
    }
    fn line_to(&mut self, _x: f64, _y: f64) {
        self.ops.push(Op::Line);
    }
    fn arc(&mut self, _cx: f64, _cy: f64, radius: f64) {
        self.ops.push(Op::Arc(radius));
    }
    fn stroke(&mut self) {
        self.ops.push(Op::Stroke);
    }
}

// ── Colors ─────────────────────────────────────────────────────────────────

#[test]
fn hsl_matches_css_reference_values() {
    assert_eq!(Color::hsl(0.0, 0.5, 0.5), Color::rgb(191, 64, 64));
    assert_eq!(Color::hsl(120.0, 0.5, 0.5), Color::rgb(64, 191, 64));
    assert_eq!(Color::hsl(240.0, 0.5, 0.5), Color::rgb(64, 64, 191));
    assert_eq!(Color::hsl(0.0, 0.0, 1.0), Color::WHITE);
}

#[test]
fn hsl_hue_wraps_in_both_directions() {
    assert_eq!(Color::hsl(-240.0, 0.5, 0.5), Color::hsl(120.0, 0.5, 0.5));
    assert_eq!(Color::hsl(480.0, 0.5, 0.5), Color::hsl(120.0, 0.5, 0.5));
}

#[test]
fn hex_colors_parse_short_and_long_forms() {
    assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
    assert_eq!(Color::from_hex("1a2b3c"), Some(Color::rgb(0x1a, 0x2b, 0x3c)));
    assert_eq!(Color::from_hex("#12345"), None);
    assert_eq!(Color::from_hex("#ggg"), None);
}

// ── Scene ──────────────────────────────────────────────────────────────────

#[test]
fn scene_draws_points_gears_rods_and_primary_trace() {
    let mut engine = square_engine();
    engine.tick();
    let view = Viewport::new(80, 60, 0.25, 1.0);
    let mut rec = Recorder::default();
    paint_scene(&engine, &view, &mut rec);

    assert_eq!(rec.ops[0], Op::Clear);
    // 4 raw points (radius 1) + 4 gear circles.
    assert_eq!(rec.count(|op| matches!(op, Op::Arc(_))), 8);
    assert_eq!(rec.count(|op| *op == Op::Arc(1.0)), 4);
    // Every rod is visible at the default limit; the one-point trace has no segments.
    assert_eq!(rec.count(|op| *op == Op::Line), 4);
    assert!(rec.ops.contains(&Op::Width(5.0)));
    assert!(rec.ops.contains(&Op::Color(Color::hsl(0.0, 0.5, 0.5))));
}

#[test]
fn scene_hides_rods_beyond_the_gear_limit_but_keeps_circles() {
    let mut engine = square_engine();
    engine.decrease_gear_limit();
    engine.decrease_gear_limit();
    engine.tick();
    engine.tick();
    let view = Viewport::new(80, 60, 0.25, 1.0);
    let mut rec = Recorder::default();
    paint_scene(&engine, &view, &mut rec);

    assert_eq!(rec.count(|op| matches!(op, Op::Arc(_))), 8);
    // Two rods plus one segment of the rank-1 trace.
    assert_eq!(rec.count(|op| *op == Op::Line), 3);
}

#[test]
fn scene_on_empty_engine_only_clears() {
    let engine = EpicycleEngine::default();
    let view = Viewport::new(10, 10, 1.0, 1.0);
    let mut rec = Recorder::default();
    paint_scene(&engine, &view, &mut rec);
    assert_eq!(rec.count(|op| *op == Op::Stroke), 0);
}

// ── Canvas ─────────────────────────────────────────────────────────────────

#[test]
fn canvas_strokes_lines_in_the_current_color() {
    let mut canvas = Canvas::new(10, 10);
    let red = Color::rgb(255, 0, 0);
    canvas.set_stroke_color(red);
    canvas.begin_path();
    canvas.move_to(1.0, 5.0);
    canvas.line_to(8.0, 5.0);
    canvas.stroke();
    assert_eq!(canvas.pixel(4, 5), Some(red));
    assert_eq!(canvas.pixel(4, 1), Some(Color::BLACK));
    assert_eq!(canvas.pixel(10, 5), None);

    canvas.clear();
    assert_eq!(canvas.pixel(4, 5), Some(Color::BLACK));
}

#[test]
fn canvas_arc_is_an_outline() {
    let mut canvas = Canvas::new(100, 100);
    canvas.translate(50.0, 50.0);
    canvas.begin_path();
    canvas.arc(0.0, 0.0, 20.0);
    canvas.stroke();
    assert_eq!(canvas.pixel(70, 50), Some(Color::WHITE));
    assert_eq!(canvas.pixel(50, 50), Some(Color::BLACK));
}

#[test]
fn canvas_survives_far_offscreen_geometry() {
    let mut canvas = Canvas::new(16, 16);
    canvas.begin_path();
    canvas.move_to(-1e12, -1e12);
    canvas.line_to(1e12, 1e12);
    canvas.arc(0.0, 0.0, 1e9);
    canvas.stroke();
    assert_eq!(canvas.pixel(8, 8), Some(Color::WHITE));
}

#[test]
fn painted_scene_lights_pixels() {
    let mut engine = square_engine();
    engine.tick();
    let view = Viewport::fit(120, 80, 1.0, engine.points());
    let mut canvas = Canvas::new(120, 80);
    paint_scene(&engine, &view, &mut canvas);
    assert!(canvas.pixels().chunks_exact(4).any(|px| px[..3] != [0, 0, 0]));
}

// ── Viewport ───────────────────────────────────────────────────────────────

#[test]
fn viewport_recenters_host_coordinates() {
    let view = Viewport::new(200, 100, 2.0, 1.0);
    assert_eq!(view.pixel_to_world(100.0, 50.0), Point::ORIGIN);
    assert_eq!(view.pixel_to_world(120.0, 40.0), Point::new(10.0, -5.0));
    let p = Point::new(-13.5, 7.25);
    let (px, py) = view.world_to_pixel(p);
    assert!(view.pixel_to_world(px, py).distance(p) < 1e-12);
}

#[test]
fn viewport_fit_keeps_points_on_screen() {
    let pts = vec![Point::new(-400.0, 10.0), Point::new(250.0, -120.0)];
    let view = Viewport::fit(160, 90, 1.0, &pts);
    for p in &pts {
        let (x, y) = view.world_to_pixel(*p);
        assert!((0.0..160.0).contains(&x) && (0.0..90.0).contains(&y));
    }
}

#[test]
fn zoom_is_clamped_both_ways() {
    let mut view = Viewport::new(200, 100, 1.0, 1.0);
    for _ in 0..100 {
        view = view.zoomed(1.25);
    }
    assert_eq!(view.scale, MAX_SCALE);
    for _ in 0..200 {
        view = view.zoomed(0.8);
    }
    assert_eq!(view.scale, MIN_SCALE);
}

#[test]
fn fully_zoomed_scene_with_full_traces_still_paints() {
    let mut engine = square_engine();
    for _ in 0..1200 {
        engine.tick();
    }
    let view = Viewport::new(200, 100, MAX_SCALE, 1.0);
    let mut canvas = Canvas::new(200, 100);
    paint_scene(&engine, &view, &mut canvas);
    assert!(canvas.pixels().chunks_exact(4).any(|px| px[..3] != [0, 0, 0]));
}

#[test]
fn cell_grid_maps_cells_to_pixel_centers() {
    let grid = BrailleRenderer::new().cell_grid();
    assert_eq!(grid, CellGrid { px_per_col: 2, px_per_row: 4 });
    assert_eq!(grid.pixel_size(10, 5), (20, 20));
    assert_eq!(grid.cell_center(3, 1), (7.0, 6.0));
    assert_eq!(AsciiRenderer::new().cell_grid().pixel_aspect(), 2.0);
    assert_eq!(HalfBlockRenderer::new().cell_grid().pixel_aspect(), 1.0);
}

// ── Terminal renderers ─────────────────────────────────────────────────────

#[test]
fn halfblock_renders_frame_with_hud() {
    let pixels = solid_pixels(8, 8, 200, 100, 50);
    let frame = make_frame(8, 4, 8, 8, &pixels, true);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[?2026h"), "missing sync-begin");
    assert!(s.contains("\x1b[?2026l"), "missing sync-end");
    assert!(s.contains('\u{2580}'), "missing half-block char");
    assert!(s.contains("38;2;200;100;50"), "missing FG color");
    assert!(s.contains("48;2;200;100;50"), "missing BG color");
    assert!(s.contains("pts 4"), "HUD text missing");
}

#[test]
fn braille_lights_all_dots_for_a_solid_cell() {
    let pixels = solid_pixels(4, 4, 255, 255, 255);
    let frame = make_frame(2, 1, 4, 4, &pixels, false);
    let mut out = Vec::new();
    BrailleRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains('\u{28FF}'));
    assert!(!s.contains("\x1b[?2026h"));
}

#[test]
fn braille_black_cell_is_blank() {
    let pixels = solid_pixels(2, 4, 0, 0, 0);
    let frame = make_frame(1, 1, 2, 4, &pixels, false);
    let mut out = Vec::new();
    BrailleRenderer::new().render(&frame, &mut out).unwrap();
    assert!(String::from_utf8_lossy(&out).contains('\u{2800}'));
}

#[test]
fn ascii_black_frame_is_spaces_without_color() {
    let pixels = solid_pixels(6, 3, 0, 0, 0);
    let frame = make_frame(6, 3, 6, 3, &pixels, false);
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("      \r\n"));
    assert!(!s.contains("38;2;"));
}

#[test]
fn renderers_skip_zero_size_and_mismatched_frames() {
    let pixels = solid_pixels(4, 4, 0, 0, 0);
    let mut renderers: Vec<Box<dyn Renderer>> = vec![
        Box::new(AsciiRenderer::new()),
        Box::new(HalfBlockRenderer::new()),
        Box::new(BrailleRenderer::new()),
    ];
    for r in renderers.iter_mut() {
        let mut out = Vec::new();
        r.render(&make_frame(0, 0, 0, 0, &pixels, true), &mut out).unwrap();
        assert!(out.is_empty(), "{} wrote for zero-size frame", r.name());
        r.render(&make_frame(3, 3, 4, 4, &pixels, true), &mut out).unwrap();
        assert!(out.is_empty(), "{} wrote for mismatched frame", r.name());
    }
}

#[test]
fn short_pixel_buffer_reports_instead_of_panicking() {
    let pixels = vec![0u8; 16];
    let frame = make_frame(8, 4, 8, 8, &pixels, true);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("pixel buffer too small"));
    assert!(s.ends_with("\x1b[?2026l"));
}

#[test]
fn overlay_popup_draws_title_and_box() {
    let mut out = Vec::new();
    draw_overlay_popup(&mut out, 40, 12, "Epicycles\nq quit").unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("Epicycles"));
    assert!(s.contains("q quit"));
    assert!(s.contains("+-"));

    let mut tiny = Vec::new();
    draw_overlay_popup(&mut tiny, 4, 2, "Epicycles").unwrap();
    assert!(tiny.is_empty());
}

#[test]
fn hud_reports_engine_state() {
    let engine = square_engine();
    let hud = build_hud(&engine, 111.0, "halfblock", Some("saved"));
    assert!(hud.starts_with("pts 4 | gears 4 | Q 3 | multi off"));
    assert!(hud.contains("111 fps"));
    assert!(hud.ends_with("| saved"));
}
