/// Geometry of the glyph grid, in points, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub cell_size: u32,
    pub margin: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 10,
            cell_size: 35,
            margin: 10,
        }
    }
}

impl GridLayout {
    pub fn with_columns(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            ..Self::default()
        }
    }

    /// Cell index under a point. Points in the margin, right of the last
    /// column, non-finite or too far down to index hit nothing.
    pub fn index_at(&self, x: f64, y: f64) -> Option<usize> {
        let margin = f64::from(self.margin);
        let cell = f64::from(self.cell_size.max(1));
        if !x.is_finite() || !y.is_finite() || x < margin || y < margin {
            return None;
        }

        let column = ((x - margin) / cell).floor() as usize;
        let row = ((y - margin) / cell).floor() as usize;
        if column >= self.columns {
            return None;
        }
        row.checked_mul(self.columns)?.checked_add(column)
    }

    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let columns = self.columns.max(1);
        let column = (index % columns) as u32;
        let row = (index / columns) as u32;
        (
            self.margin + column * self.cell_size,
            self.margin + row * self.cell_size,
        )
    }

    pub fn content_width(&self) -> u32 {
        self.columns as u32 * self.cell_size + self.margin * 2
    }

    pub fn content_height(&self, count: usize) -> u32 {
        let rows = count.div_ceil(self.columns.max(1)) as u32;
        rows * self.cell_size + self.margin * 2
    }
}
