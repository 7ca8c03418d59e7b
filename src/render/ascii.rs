use crate::render::{begin_frame, end_frame, luma, rgb_at, ColorState, Frame, Renderer};
use crate::viewport::CellGrid;
use std::io::Write;

/// Dark -> bright ramp, ASCII only.
const RAMP: &[u8] = b" .,:;irsXA253hMHGS#9B&@";

pub struct AsciiRenderer {
    colors: ColorState,
}

impl AsciiRenderer {
    pub const GRID: CellGrid = CellGrid {
        px_per_col: 1,
        px_per_row: 1,
    };

    pub fn new() -> Self {
        Self {
            colors: ColorState::default(),
        }
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for AsciiRenderer {
    fn name(&self) -> &'static str {
        "ascii"
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

        for y in 0..rows {
            for x in 0..cols {
                let c = rgb_at(frame.pixels_rgba, w, x, y);
                let ch = RAMP[luma(c.0, c.1, c.2) as usize * (RAMP.len() - 1) / 255];
                if ch != b' ' {
                    // Blank cells need no color change.
                    self.colors.fg(out, c)?;
                }
                out.write_all(&[ch])?;
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, cols, rows, out)
    }
}
