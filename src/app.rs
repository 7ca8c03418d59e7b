use crate::config::{Config, RendererMode};
use crate::draw::{Canvas, paint_scene};
use crate::engine::EpicycleEngine;
use crate::points_file::save_points;
use crate::render::{AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::terminal::TerminalGuard;
use crate::viewport::{CellGrid, Viewport};
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const ZOOM_STEP: f64 = 1.25;
const STATUS_TTL: Duration = Duration::from_secs(3);

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let points = cfg.initial_points().with_context(|| match &cfg.points {
        Some(p) => format!("load points from {}", p.display()),
        None => "load starting points".to_string(),
    })?;
    info!(points = points.len(), renderer = ?cfg.renderer, "starting");
    let mut engine = EpicycleEngine::with_points(cfg.engine_settings(), points);

    let mut renderer = make_renderer(cfg.renderer);
    let grid = renderer.cell_grid();

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut size = crossterm::terminal::size().context("get terminal size")?;
    if size.0 < 4 || size.1 < 2 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            size.0,
            size.1
        ));
    }

    let mut ui = UiState::new();
    let (w, h) = grid.pixel_size(size.0, visual_rows(size, ui.show_hud));
    let mut view = match cfg.zoom {
        Some(z) => Viewport::new(w, h, z, grid.pixel_aspect()),
        None => Viewport::fit(w, h, grid.pixel_aspect(), engine.points()),
    };
    let mut canvas = Canvas::new(w, h);
    let mut fps = FpsCounter::new();
    let period = cfg.tick_period();

    loop {
        let now = Instant::now();

        // Drain input without blocking the tick.
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let old_hud = ui.show_hud;
                    let action = handle_key(k.code, k.modifiers, &mut engine, &mut ui);
                    match action {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Save => save(&engine, cfg.save_to.as_deref(), &mut ui),
                        KeyAction::Zoom(f) => view = view.zoomed(f),
                        KeyAction::Refit => {
                            view = Viewport::fit(view.width, view.height, view.aspect, engine.points())
                        }
                        KeyAction::None => {}
                    }
                    if ui.show_hud != old_hud {
                        view = relayout(&mut canvas, view, grid, size, ui.show_hud);
                    }
                }
                Event::Mouse(m) => handle_mouse(m, &mut engine, &view, grid),
                Event::Resize(c, r) => {
                    size = (c, r);
                    view = relayout(&mut canvas, view, grid, size, ui.show_hud);
                }
                _ => {}
            }
        }

        // Some terminals drop resize events.
        let sz = crossterm::terminal::size()?;
        if sz != size {
            size = sz;
            view = relayout(&mut canvas, view, grid, size, ui.show_hud);
        }

        engine.tick();
        paint_scene(&engine, &view, &mut canvas);

        let hud = if ui.show_hud {
            build_hud(&engine, fps.fps(), renderer.name(), ui.status(now))
        } else {
            String::new()
        };
        let vis_rows = visual_rows(size, ui.show_hud);
        let frame = Frame {
            term_cols: size.0,
            term_rows: size.1,
            visual_rows: vis_rows,
            pixel_width: canvas.width(),
            pixel_height: canvas.height(),
            pixels_rgba: canvas.pixels(),
            hud: &hud,
            hud_rows: size.1.saturating_sub(vis_rows),
            overlay: ui.show_help.then(help_popup_text),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        // Fixed-period pacing: a late tick is not made up for.
        let elapsed = now.elapsed();
        if elapsed < period {
            std::thread::sleep(period - elapsed);
        }
    }
}

fn make_renderer(mode: RendererMode) -> Box<dyn Renderer> {
    match mode {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    }
}

pub fn hud_rows(size: (u16, u16), show_hud: bool) -> u16 {
    if show_hud && size.1 > 1 { 1 } else { 0 }
}

fn visual_rows(size: (u16, u16), show_hud: bool) -> u16 {
    size.1.saturating_sub(hud_rows(size, show_hud)).max(1)
}

/// Resizes the canvas for a new terminal layout; world scale is kept.
fn relayout(
    canvas: &mut Canvas,
    view: Viewport,
    grid: CellGrid,
    size: (u16, u16),
    show_hud: bool,
) -> Viewport {
    let (w, h) = grid.pixel_size(size.0, visual_rows(size, show_hud));
    canvas.resize(w, h);
    view.resized(w, h)
}

struct UiState {
    show_hud: bool,
    show_help: bool,
    status: Option<(String, Instant)>,
}

impl UiState {
    fn new() -> Self {
        Self {
            show_hud: true,
            show_help: false,
            status: None,
        }
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.status = Some((msg.into(), Instant::now()));
    }

    fn status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| now.duration_since(*at) < STATUS_TTL)
            .map(|(s, _)| s.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyAction {
    None,
    Quit,
    Save,
    Zoom(f64),
    Refit,
}

fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    engine: &mut EpicycleEngine,
    ui: &mut UiState,
) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return KeyAction::Quit,
        KeyCode::Left => engine.toggle_multi_path(),
        KeyCode::Up => engine.increase_gear_limit(),
        KeyCode::Right => engine.reset(),
        KeyCode::Down => engine.decrease_gear_limit(),
        KeyCode::Char('i') | KeyCode::Char('I') => ui.show_hud = !ui.show_hud,
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            ui.show_help = !ui.show_help
        }
        KeyCode::Char('w') | KeyCode::Char('W') => return KeyAction::Save,
        KeyCode::Char('+') | KeyCode::Char('=') => return KeyAction::Zoom(ZOOM_STEP),
        KeyCode::Char('-') | KeyCode::Char('_') => return KeyAction::Zoom(1.0 / ZOOM_STEP),
        KeyCode::Char('0') => return KeyAction::Refit,
        _ => {}
    }
    KeyAction::None
}

fn handle_mouse(m: MouseEvent, engine: &mut EpicycleEngine, view: &Viewport, grid: CellGrid) {
    let (px, py) = grid.cell_center(m.column, m.row);
    let p = view.pixel_to_world(px, py);
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) => engine.begin_stroke(),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            engine.continue_stroke(p);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            engine.end_stroke(p);
        }
        _ => {}
    }
}

fn save(engine: &EpicycleEngine, path: Option<&Path>, ui: &mut UiState) {
    let Some(path) = path else {
        ui.flash("no --save-to path configured");
        return;
    };
    match save_points(path, engine.points()) {
        Ok(()) => {
            info!(points = engine.points().len(), path = %path.display(), "saved points");
            ui.flash(format!("saved {} points to {}", engine.points().len(), path.display()));
        }
        Err(err) => {
            warn!(%err, path = %path.display(), "save failed");
            ui.flash(format!("save failed: {err}"));
        }
    }
}

pub fn build_hud(engine: &EpicycleEngine, fps: f32, renderer: &str, status: Option<&str>) -> String {
    let mut hud = format!(
        "pts {} | gears {} | Q {} | multi {} | T {:.3} | {:.0} fps | {} | h help",
        engine.points().len(),
        engine.gears().len(),
        engine.gear_limit(),
        if engine.multi_path() { "on" } else { "off" },
        engine.clock(),
        fps,
        renderer,
    );
    if let Some(s) = status {
        hud.push_str(" | ");
        hud.push_str(s);
    }
    hud
}

fn help_popup_text() -> &'static str {
    "Epicycles\n\
click/drag  add points to the path\n\
up/down  more/fewer gears traced\n\
left  toggle intermediate paths (every 8th gear)\n\
right  clear the scene\n\
+ / -  zoom in/out, 0 refit\n\
w  save points (--save-to)\n\
i  show/hide HUD\n\
? or h or F1  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
