use crate::render::{begin_frame, end_frame, rgb_at, ColorState, Frame, Renderer};
use crate::viewport::CellGrid;
use std::io::Write;

/// One cell = two stacked pixels: fg paints the top, bg the bottom.
pub struct HalfBlockRenderer {
    colors: ColorState,
}

impl HalfBlockRenderer {
    pub const GRID: CellGrid = CellGrid {
        px_per_col: 1,
        px_per_row: 2,
    };

    pub fn new() -> Self {
        Self {
            colors: ColorState::default(),
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn cell_grid(&self) -> CellGrid {
        Self::GRID
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, rows)) = begin_frame(frame, Self::GRID, out)? else {
            return Ok(());
        };
        self.colors = ColorState::default();
        let w = frame.pixel_width;

        for row in 0..rows {
            for x in 0..cols {
                let top = rgb_at(frame.pixels_rgba, w, x, row * 2);
                let bot = rgb_at(frame.pixels_rgba, w, x, row * 2 + 1);
                self.colors.fg(out, top)?;
                self.colors.bg(out, bot)?;
                out.write_all("\u{2580}".as_bytes())?;
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, cols, rows, out)
    }
}
