use crate::render::{PixelGrid, Rgb, Scene, TextGrid};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

pub(crate) const BG: Color = Color::Black;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: BG,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Scene -> cells. Pixels pack two rows per cell with half blocks.
------------------------------ */

fn to_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Terminal cells a scene occupies.
pub(crate) fn scene_size(scene: &Scene) -> (u16, u16) {
    match scene {
        Scene::Pixels(g) => (g.w, g.h.div_ceil(2)),
        Scene::Text(g) => (g.w, g.h),
    }
}

pub(crate) fn scene_to_cells(
    scene: &Scene,
    out: &mut CellBuffer,
    x0: u16,
    y0: u16,
    enable_color: bool,
) {
    match scene {
        Scene::Pixels(g) => pixels_to_cells(g, out, x0, y0, enable_color),
        Scene::Text(g) => text_to_cells(g, out, x0, y0),
    }
}

fn pixels_to_cells(g: &PixelGrid, out: &mut CellBuffer, x0: u16, y0: u16, enable_color: bool) {
    for cy in 0..g.h.div_ceil(2) {
        for x in 0..g.w {
            let upper = g.get(x, cy * 2);
            let lower = g.get(x, cy * 2 + 1);
            let cell = match (upper, lower, enable_color) {
                (None, None, _) => continue,
                (Some(u), Some(l), true) => Cell {
                    ch: '▀',
                    fg: to_color(u),
                    bg: to_color(l),
                },
                (Some(_), Some(_), false) => Cell {
                    ch: '█',
                    fg: Color::White,
                    bg: BG,
                },
                (Some(u), None, _) => Cell {
                    ch: '▀',
                    fg: if enable_color { to_color(u) } else { Color::White },
                    bg: BG,
                },
                (None, Some(l), _) => Cell {
                    ch: '▄',
                    fg: if enable_color { to_color(l) } else { Color::White },
                    bg: BG,
                },
            };
            out.set(x0.saturating_add(x), y0.saturating_add(cy), cell);
        }
    }
}

fn text_to_cells(g: &TextGrid, out: &mut CellBuffer, x0: u16, y0: u16) {
    for y in 0..g.h {
        for x in 0..g.w {
            let ch = g.get(x, y);
            if ch == ' ' {
                continue;
            }
            out.set(
                x0.saturating_add(x),
                y0.saturating_add(y),
                Cell {
                    ch,
                    fg: Color::White,
                    bg: BG,
                },
            );
        }
    }
}
