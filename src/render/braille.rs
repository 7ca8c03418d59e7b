use crate::render::{begin_frame, end_frame, luma, rgb_at, ColorState, Frame, Renderer};
use crate::viewport::CellGrid;
use std::io::Write;

/// Bit for each dot, indexed `dy * 2 + dx`.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// Pixels at or below this luma count as background.
const LUMA_FLOOR: u8 = 12;

/// One cell = a 2x4 dot matrix; lit dots share the averaged fg color.
pub struct BrailleRenderer {
    colors: ColorState,
}

impl BrailleRenderer {
    pub const GRID: CellGrid = CellGrid {
        px_per_col: 2,
        px_per_row: 4,
    };

    pub fn new() -> Self {
        Self {
            colors: ColorState::default(),
        }
    }
}

impl Default for BrailleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
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
            for col in 0..cols {
                let mut rgb = [(0u8, 0u8, 0u8); 8];
                let mut lum = [0u8; 8];
                for (i, (c, l)) in rgb.iter_mut().zip(lum.iter_mut()).enumerate() {
                    *c = rgb_at(frame.pixels_rgba, w, col * 2 + i % 2, row * 4 + i / 2);
                    *l = luma(c.0, c.1, c.2);
                }
                let lo = lum.iter().copied().min().unwrap_or(0);
                let hi = lum.iter().copied().max().unwrap_or(0);
                let thr = if hi - lo < LUMA_FLOOR { LUMA_FLOOR } else { lo + (hi - lo) / 2 };

                let mut bits = 0u8;
                let mut on = Mean::default();
                let mut off = Mean::default();
                for i in 0..8 {
                    if lum[i] > thr {
                        bits |= DOT_BITS[i];
                        on.add(rgb[i]);
                    } else {
                        off.add(rgb[i]);
                    }
                }

                let bg = off.get().unwrap_or((0, 0, 0));
                let fg = on.get().unwrap_or(bg);
                self.colors.fg(out, fg)?;
                self.colors.bg(out, bg)?;
                let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, cols, rows, out)
    }
}

#[derive(Default)]
struct Mean {
    sum: (u32, u32, u32),
    n: u32,
}

impl Mean {
    fn add(&mut self, c: (u8, u8, u8)) {
        self.sum.0 += c.0 as u32;
        self.sum.1 += c.1 as u32;
        self.sum.2 += c.2 as u32;
        self.n += 1;
    }

    fn get(&self) -> Option<(u8, u8, u8)> {
        (self.n > 0).then(|| {
            (
                (self.sum.0 / self.n) as u8,
                (self.sum.1 / self.n) as u8,
                (self.sum.2 / self.n) as u8,
            )
        })
    }
}
