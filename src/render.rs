use crate::types::{Placement, Rect};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// Draws one sheet instance and its panels, labelled by panel id.
pub fn render_sheet(stock: Rect, placements: &[&Placement]) -> String {
    if stock.w <= 0.0 || stock.h <= 0.0 {
        return String::new();
    }
    let scale = f64::min(MAX_WIDTH / stock.w, MAX_HEIGHT / stock.h);
    let cells = |inches: f64| (inches * scale).round() as usize;
    let (cols, rows) = (cells(stock.w), cells(stock.h));
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut canvas = Canvas::new(cols, rows);
    canvas.outline(0, 0, cols, rows);
    for p in placements {
        let (col, row, w, h) = (cells(p.x), cells(p.y), cells(p.width), cells(p.height));
        if w == 0 || h == 0 {
            continue;
        }
        canvas.outline(col, row, w, h);
        canvas.label(col, row, w, h, &p.panel_id);
    }
    canvas.render()
}

/// Character grid one cell larger than the scaled sheet in each direction.
struct Canvas {
    cells: Vec<Vec<char>>,
}

impl Canvas {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cells: vec![vec![' '; cols + 1]; rows + 1],
        }
    }

    fn cell(&mut self, col: usize, row: usize) -> Option<&mut char> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Where a horizontal and a vertical edge cross the cell becomes a corner.
    fn stroke(&mut self, col: usize, row: usize, glyph: char) {
        if let Some(cell) = self.cell(col, row) {
            *cell = match *cell {
                '+' => '+',
                edge @ ('-' | '|') if edge != glyph => '+',
                _ => glyph,
            };
        }
    }

    fn outline(&mut self, col: usize, row: usize, w: usize, h: usize) {
        let (right, bottom) = (col + w, row + h);
        for c in col..=right {
            self.stroke(c, row, '-');
            self.stroke(c, bottom, '-');
        }
        for r in row..=bottom {
            self.stroke(col, r, '|');
            self.stroke(right, r, '|');
        }
        for (c, r) in [(col, row), (right, row), (col, bottom), (right, bottom)] {
            self.stroke(c, r, '+');
        }
    }

    /// Centres `text` on the middle row of a box, clipped to its interior.
    fn label(&mut self, col: usize, row: usize, w: usize, h: usize, text: &str) {
        if w <= 2 || h < 2 {
            return;
        }
        let mid = row + h / 2;
        let start = (col + w / 2).saturating_sub(text.chars().count() / 2);
        for (c, ch) in (start..).zip(text.chars()) {
            if c <= col || c >= col + w {
                continue;
            }
            if let Some(cell) = self.cell(c, mid) {
                *cell = ch;
            }
        }
    }

    fn render(&self) -> String {
        self.cells.iter().fold(String::new(), |mut out, row| {
            let line: String = row.iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
            out
        })
    }
}
