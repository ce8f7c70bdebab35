//! Double-buffered cell grid with toroidal addressing.
//!
//! Cell `(x, y)` lives at position `(x, y)` with `y` pointing up, so row 0 is
//! the bottom of the domain. Every lookup wraps on both axes.

use crate::error::{SimError, SimResult};
use crate::pass::GridPass;
use glam::Vec2;
use rayon::prelude::*;
use std::ops::{Add, Mul};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell {
    pub velocity: Vec2,
    pub pressure: f32,
    /// Always within [0, 1].
    pub dye: f32,
}

impl Cell {
    pub const ZERO: Cell = Cell {
        velocity: Vec2::ZERO,
        pressure: 0.0,
        dye: 0.0,
    };

    pub fn is_finite(&self) -> bool {
        self.velocity.is_finite() && self.pressure.is_finite() && self.dye.is_finite()
    }
}

/// The four axis neighbours of a cell, fetched with wrap-around.
#[derive(Debug, Clone, Copy)]
pub struct Neighbors {
    pub top: Cell,
    pub left: Cell,
    pub right: Cell,
    pub bottom: Cell,
}

/// One full snapshot of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl GridBuffer {
    pub fn new(width: usize, height: usize) -> SimResult<Self> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::ZERO; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Index of `(x, y)` after wrapping both coordinates onto the torus.
    pub fn wrap_index(&self, x: isize, y: isize) -> usize {
        let wx = x.rem_euclid(self.width as isize) as usize;
        let wy = y.rem_euclid(self.height as isize) as usize;
        wy * self.width + wx
    }

    pub fn get(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    pub fn get_wrapped(&self, x: isize, y: isize) -> &Cell {
        &self.cells[self.wrap_index(x, y)]
    }

    pub fn neighbors(&self, x: usize, y: usize) -> Neighbors {
        let (x, y) = (x as isize, y as isize);
        Neighbors {
            top: *self.get_wrapped(x, y + 1),
            left: *self.get_wrapped(x - 1, y),
            right: *self.get_wrapped(x + 1, y),
            bottom: *self.get_wrapped(x, y - 1),
        }
    }

    /// Bilinear interpolation of the velocity field at an arbitrary position.
    pub fn sample_velocity(&self, pos: Vec2) -> Vec2 {
        self.bilinear(pos, |cell| cell.velocity)
    }

    /// Bilinear interpolation of the dye field at an arbitrary position.
    pub fn sample_dye(&self, pos: Vec2) -> f32 {
        self.bilinear(pos, |cell| cell.dye)
    }

    fn bilinear<T, F>(&self, pos: Vec2, field: F) -> T
    where
        T: Copy + Add<Output = T> + Mul<f32, Output = T>,
        F: Fn(&Cell) -> T,
    {
        let px = wrap_coordinate(pos.x, self.width);
        let py = wrap_coordinate(pos.y, self.height);
        let x0 = px.floor();
        let y0 = py.floor();
        let sx = px - x0;
        let sy = py - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);

        let v00 = field(self.get_wrapped(x0, y0));
        let v10 = field(self.get_wrapped(x0 + 1, y0));
        let v01 = field(self.get_wrapped(x0, y0 + 1));
        let v11 = field(self.get_wrapped(x0 + 1, y0 + 1));

        v00 * ((1.0 - sx) * (1.0 - sy))
            + v10 * (sx * (1.0 - sy))
            + v01 * ((1.0 - sx) * sy)
            + v11 * (sx * sy)
    }

    pub fn total_dye(&self) -> f32 {
        self.cells.iter().map(|cell| cell.dye).sum()
    }

    pub fn is_finite(&self) -> bool {
        self.cells.par_iter().all(Cell::is_finite)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::ZERO);
    }
}

/// Folds a sample coordinate onto `[0, extent]` before it is cast to an index.
/// Non-finite coordinates land on 0; the cell values around them are already
/// non-finite and the tick's recovery takes it from there.
fn wrap_coordinate(value: f32, extent: usize) -> f32 {
    if value.is_finite() {
        value.rem_euclid(extent as f32)
    } else {
        0.0
    }
}

/// Which of the two buffers holds the readable state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BufferIndex {
    #[default]
    A,
    B,
}

impl BufferIndex {
    pub fn other(self) -> Self {
        match self {
            BufferIndex::A => BufferIndex::B,
            BufferIndex::B => BufferIndex::A,
        }
    }

    fn slot(self) -> usize {
        match self {
            BufferIndex::A => 0,
            BufferIndex::B => 1,
        }
    }
}

/// Exactly two buffers plus the tag naming the readable one.
#[derive(Debug, Clone)]
pub struct GridState {
    buffers: [GridBuffer; 2],
    current: BufferIndex,
    passes_executed: u64,
}

impl GridState {
    pub fn new(width: usize, height: usize) -> SimResult<Self> {
        let a = GridBuffer::new(width, height)?;
        let b = a.clone();
        Ok(Self {
            buffers: [a, b],
            current: BufferIndex::A,
            passes_executed: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.buffers[0].width
    }

    pub fn height(&self) -> usize {
        self.buffers[0].height
    }

    pub fn current_index(&self) -> BufferIndex {
        self.current
    }

    pub fn current(&self) -> &GridBuffer {
        &self.buffers[self.current.slot()]
    }

    /// Mutable access to the readable buffer, for seeding initial conditions.
    pub fn current_mut(&mut self) -> &mut GridBuffer {
        &mut self.buffers[self.current.slot()]
    }

    pub fn passes_executed(&self) -> u64 {
        self.passes_executed
    }

    /// Read the current buffer, write the other one. The two never alias.
    fn split(&mut self) -> (&GridBuffer, &mut GridBuffer) {
        let [a, b] = &mut self.buffers;
        match self.current {
            BufferIndex::A => (&*a, b),
            BufferIndex::B => (&*b, a),
        }
    }

    /// Runs `pass` over every cell in parallel, then flips the buffer tag once.
    ///
    /// The parallel map completes before this returns, which is the barrier
    /// separating consecutive passes.
    pub fn execute<P: GridPass>(&mut self, pass: &P) {
        let (src, dst) = self.split();
        let width = src.width;
        dst.cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    *out = pass.evaluate(src, x, y);
                }
            });
        self.current = self.current.other();
        self.passes_executed += 1;
    }

    /// Zeroes both buffers and starts counting passes from scratch.
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
        self.current = BufferIndex::A;
        self.passes_executed = 0;
    }
}
