//! Terminal back-ends: turn an RGBA pixel grid plus HUD text into ANSI output.

mod ascii;
mod braille;
mod halfblock;

pub use ascii::AsciiRenderer;
pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;

use crate::viewport::CellGrid;
use std::io::Write;

pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    /// Pixels this renderer packs into one terminal cell.
    fn cell_grid(&self) -> CellGrid;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Shared frame preamble. Returns `(cols, visual_rows)` when the frame is
/// paintable, `None` when there is nothing (or nothing safe) to draw.
pub(crate) fn begin_frame(
    frame: &Frame<'_>,
    grid: CellGrid,
    out: &mut dyn Write,
) -> anyhow::Result<Option<(usize, usize)>> {
    let cols = frame.term_cols as usize;
    let rows = frame.visual_rows as usize;
    let (w, h) = (frame.pixel_width, frame.pixel_height);
    if cols == 0 || rows == 0 || w == 0 || h == 0 {
        return Ok(None);
    }
    if (w, h) != grid.pixel_size(frame.term_cols, frame.visual_rows) {
        return Ok(None);
    }

    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    let need = w.saturating_mul(h).saturating_mul(4);
    if frame.pixels_rgba.len() < need {
        out.write_all(b"\x1b[H\x1b[0m\x1b[2J")?;
        write!(
            out,
            "pixel buffer too small (need {need}, got {})",
            frame.pixels_rgba.len()
        )?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        return Ok(None);
    }

    // Home, reset, and no autowrap while full-width rows are painted.
    out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
    Ok(Some((cols, rows)))
}

/// HUD rows, optional overlay, then restore terminal modes and flush.
pub(crate) fn end_frame(
    frame: &Frame<'_>,
    cols: usize,
    visual_rows: usize,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut hud_lines = frame.hud.lines();
    for i in 0..frame.hud_rows as usize {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + i + 1)?;
        if let Some(line) = hud_lines.next() {
            let clipped: String = line.chars().take(cols).collect();
            out.write_all(clipped.as_bytes())?;
        }
    }

    if let Some(text) = frame.overlay {
        draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
    }

    out.write_all(b"\x1b[0m\x1b[?7h")?;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

#[inline]
pub(crate) fn rgb_at(pixels: &[u8], w: usize, x: usize, y: usize) -> (u8, u8, u8) {
    let i = (y * w + x) * 4;
    (pixels[i], pixels[i + 1], pixels[i + 2])
}

/// Approx Rec.709 luma in integer math.
#[inline]
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u8
}

/// Emits SGR color changes only when the color differs from the last one.
#[derive(Default)]
pub(crate) struct ColorState {
    fg: Option<(u8, u8, u8)>,
    bg: Option<(u8, u8, u8)>,
}

impl ColorState {
    pub(crate) fn fg(&mut self, out: &mut dyn Write, c: (u8, u8, u8)) -> std::io::Result<()> {
        if self.fg != Some(c) {
            write!(out, "\x1b[38;2;{};{};{}m", c.0, c.1, c.2)?;
            self.fg = Some(c);
        }
        Ok(())
    }

    pub(crate) fn bg(&mut self, out: &mut dyn Write, c: (u8, u8, u8)) -> std::io::Result<()> {
        if self.bg != Some(c) {
            write!(out, "\x1b[48;2;{};{};{}m", c.0, c.1, c.2)?;
            self.bg = Some(c);
        }
        Ok(())
    }
}

/// Centered boxed text over a dimmed backdrop. The first line is the title.
pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if text.trim().is_empty() || cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner = cols.saturating_sub(6).max(1);
    let lines: Vec<String> = text
        .lines()
        .flat_map(|raw| {
            let chars: Vec<char> = raw.chars().collect();
            if chars.is_empty() {
                vec![String::new()]
            } else {
                chars
                    .chunks(max_inner)
                    .map(|c| c.iter().collect::<String>())
                    .collect::<Vec<_>>()
            }
        })
        .collect();

    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, max_inner);
    let box_w = inner + 4;
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = body_h + 2;
    let left = (cols.saturating_sub(box_w)) / 2 + 1;
    let top = (rows.saturating_sub(box_h)) / 2 + 1;
    let edge = format!("+{}+", "-".repeat(box_w - 2));
    let blank = " ".repeat(inner);

    out.write_all(b"\x1b[0m\x1b[38;2;236;242;255m\x1b[48;2;10;14;24m")?;
    write!(out, "\x1b[{top};{left}H{edge}")?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = top + 1 + i;
        write!(out, "\x1b[{row};{left}H| {blank} |")?;
        if i == 0 {
            write!(
                out,
                "\x1b[{row};{}H\x1b[1m\x1b[38;2;255;236;160m{line}\x1b[22m\x1b[38;2;236;242;255m",
                left + 2
            )?;
        } else {
            write!(out, "\x1b[{row};{}H{line}", left + 2)?;
        }
    }
    write!(out, "\x1b[{};{left}H{edge}", top + box_h - 1)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
