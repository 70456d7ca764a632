use super::{Tone, RESET};

/// Contents of a single screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blank,
    Plain(char),
    Styled(char, Tone),
}

/// Fixed-size grid of cells, redrawn from scratch every tick.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    output_buf: String,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Blank; width * height],
            // Escapes per cell are at most ~6 bytes plus a multi-byte glyph.
            output_buf: String::with_capacity(width * height * 12),
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Blank);
    }

    /// Writes `cell` at the truncated position. Returns false and leaves the
    /// grid untouched when the point falls outside it.
    pub fn put(&mut self, x: f32, y: f32, cell: Cell) -> bool {
        // Also rejects NaN.
        if !(x >= 0.0 && y >= 0.0) {
            return false;
        }
        let (col, row) = (x as usize, y as usize);
        if col >= self.width || row >= self.height {
            return false;
        }
        self.cells[row * self.width + col] = cell;
        true
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    /// Appends the grid as newline-joined rows. A tone escape is only emitted
    /// when the tone changes, and any styled run is reset before the row ends.
    pub fn render_into(&self, out: &mut String) {
        for (row_idx, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            if row_idx > 0 {
                out.push('\n');
            }
            let mut current: Option<Tone> = None;
            for cell in row {
                match *cell {
                    Cell::Styled(ch, tone) => {
                        if current != Some(tone) {
                            out.push_str(tone.escape());
                            current = Some(tone);
                        }
                        out.push(ch);
                    }
                    Cell::Plain(ch) => {
                        if current.take().is_some() {
                            out.push_str(RESET);
                        }
                        out.push(ch);
                    }
                    Cell::Blank => {
                        if current.take().is_some() {
                            out.push_str(RESET);
                        }
                        out.push(' ');
                    }
                }
            }
            if current.is_some() {
                out.push_str(RESET);
            }
        }
    }

    /// Full frame ready for the terminal: cursor home without clearing, the
    /// grid, and the cursor put back where the lyric typing left it.
    pub fn to_frame_string(&mut self) -> &str {
        let mut out = std::mem::take(&mut self.output_buf);
        out.clear();
        out.push_str("\x1b7\x1b[H");
        self.render_into(&mut out);
        out.push_str("\x1b8");
        self.output_buf = out;
        &self.output_buf
    }
}
