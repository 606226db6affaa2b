//! Working grid for the diffusion solver.

use rayon::prelude::*;

/// One grid cell: straight RGBA plus the blur channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    pub color: [f32; 4],
    pub blur: f32,
}

impl Cell {
    pub fn new(color: [f32; 4], blur: f32) -> Self {
        Self { color, blur }
    }

    fn scaled(self, s: f32) -> Self {
        Self {
            color: self.color.map(|c| c * s),
            blur: self.blur * s,
        }
    }

    fn add(self, other: Cell) -> Self {
        Self {
            color: [
                self.color[0] + other.color[0],
                self.color[1] + other.color[1],
                self.color[2] + other.color[2],
                self.color[3] + other.color[3],
            ],
            blur: self.blur + other.blur,
        }
    }
}

/// Row-major grid of cells with a mask of fixed (constrained) cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    constrained: Vec<bool>,
}

impl Field {
    /// Unconstrained, fully transparent grid. Zero sizes are raised to 1.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); n],
            constrained: vec![false; n],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn cell(&self, x: u32, y: u32) -> Cell {
        self.cells[self.index(x, y)]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_constrained(&self, x: u32, y: u32) -> bool {
        self.constrained[self.index(x, y)]
    }

    pub fn constrained_count(&self) -> usize {
        self.constrained.iter().filter(|&&c| c).count()
    }

    /// Fix a cell's value. Out-of-range coordinates are ignored.
    pub fn constrain(&mut self, x: i64, y: i64, cell: Cell) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = self.index(x as u32, y as u32);
        self.cells[i] = cell;
        self.constrained[i] = true;
    }

    /// Overwrite only the blur channel of a cell.
    pub fn set_blur(&mut self, x: i64, y: i64, blur: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = self.index(x as u32, y as u32);
        self.cells[i].blur = blur;
    }

    /// Half-resolution grid (rounding up). Each coarse cell averages its
    /// constrained children and is constrained if any child is.
    pub fn restrict(&self) -> Field {
        let cw = self.width.div_ceil(2);
        let ch = self.height.div_ceil(2);
        let mut coarse = Field::new(cw, ch);
        let fine = self;
        coarse
            .cells
            .par_chunks_mut(cw as usize)
            .zip(coarse.constrained.par_chunks_mut(cw as usize))
            .enumerate()
            .for_each(|(cy, (cells, mask))| {
                for cx in 0..cw {
                    let mut sum = Cell::default();
                    let mut count = 0u32;
                    for (fx, fy) in children(cx, cy as u32, fine.width, fine.height) {
                        if fine.is_constrained(fx, fy) {
                            sum = sum.add(fine.cell(fx, fy));
                            count += 1;
                        }
                    }
                    if count > 0 {
                        cells[cx as usize] = sum.scaled(1.0 / count as f32);
                        mask[cx as usize] = true;
                    }
                }
            });
        coarse
    }

    /// Bilinear resample to `width x height`, sampling at cell centers.
    /// The result carries no constraints.
    pub fn resample(&self, width: u32, height: u32) -> Field {
        let mut out = Field::new(width, height);
        let (ow, oh) = (out.width, out.height);
        let sx = self.width as f32 / ow as f32;
        let sy = self.height as f32 / oh as f32;
        out.cells
            .par_chunks_mut(ow as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let fy = (y as f32 + 0.5) * sy - 0.5;
                for (x, cell) in row.iter_mut().enumerate() {
                    let fx = (x as f32 + 0.5) * sx - 0.5;
                    *cell = self.sample_bilinear(fx, fy);
                }
            });
        out
    }

    fn sample_bilinear(&self, fx: f32, fy: f32) -> Cell {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let fx = fx.clamp(0.0, max_x);
        let fy = fy.clamp(0.0, max_y);
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self
            .cell(x0, y0)
            .scaled(1.0 - tx)
            .add(self.cell(x1, y0).scaled(tx));
        let bottom = self
            .cell(x0, y1)
            .scaled(1.0 - tx)
            .add(self.cell(x1, y1).scaled(tx));
        top.scaled(1.0 - ty).add(bottom.scaled(ty))
    }

    /// Take over the constraints of `constraints`: its fixed cells are
    /// copied in and become fixed here. Both grids must have the same size.
    pub fn impose(&mut self, constraints: &Field) {
        debug_assert_eq!((self.width, self.height), (constraints.width, constraints.height));
        for (i, &fixed) in constraints.constrained.iter().enumerate() {
            if fixed {
                self.cells[i] = constraints.cells[i];
            }
            self.constrained[i] = fixed;
        }
    }

    /// Fill unconstrained cells with the mean of the constrained ones
    /// (transparent when nothing is constrained).
    pub fn fill_unconstrained_with_mean(&mut self) {
        let mut sum = Cell::default();
        let mut count = 0u32;
        for (cell, &fixed) in self.cells.iter().zip(&self.constrained) {
            if fixed {
                sum = sum.add(*cell);
                count += 1;
            }
        }
        let mean = if count > 0 {
            sum.scaled(1.0 / count as f32)
        } else {
            Cell::default()
        };
        for (cell, &fixed) in self.cells.iter_mut().zip(&self.constrained) {
            if !fixed {
                *cell = mean;
            }
        }
    }

    /// One Jacobi sweep into `out`: constrained cells keep their value,
    /// others take the mean of their in-bounds 4-neighbors.
    pub fn jacobi_into(&self, out: &mut Field) {
        let (w, h) = (self.width, self.height);
        out.cells
            .par_chunks_mut(w as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as u32;
                for (x, cell) in row.iter_mut().enumerate() {
                    let x = x as u32;
                    if self.is_constrained(x, y) {
                        *cell = self.cell(x, y);
                        continue;
                    }
                    let mut sum = Cell::default();
                    let mut count = 0u32;
                    for (nx, ny) in neighbors4(x, y, w, h) {
                        sum = sum.add(self.cell(nx, ny));
                        count += 1;
                    }
                    *cell = if count > 0 {
                        sum.scaled(1.0 / count as f32)
                    } else {
                        self.cell(x, y)
                    };
                }
            });
        out.constrained.copy_from_slice(&self.constrained);
    }
}

/// The up-to-four fine cells under coarse cell `(cx, cy)`.
fn children(cx: u32, cy: u32, w: u32, h: u32) -> impl Iterator<Item = (u32, u32)> {
    [(0, 0), (1, 0), (0, 1), (1, 1)]
        .into_iter()
        .map(move |(dx, dy)| (2 * cx + dx, 2 * cy + dy))
        .filter(move |&(x, y)| x < w && y < h)
}

fn neighbors4(x: u32, y: u32, w: u32, h: u32) -> impl Iterator<Item = (u32, u32)> {
    let (x, y) = (x as i64, y as i64);
    [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
        .into_iter()
        .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64)
        .map(|(nx, ny)| (nx as u32, ny as u32))
}
