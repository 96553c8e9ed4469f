use crate::math::{GridPoint, GridRect, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One tile of the walkability grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    /// Tile classification (e.g. a tileset index).
    pub index: u32,
    /// Dynamic obstacle override; a blocked cell is never walkable regardless of `index`.
    pub blocked: bool,
}

/// External grid seam: anything that can describe a rectangular tile layer.
///
/// Implementations must not change while a `generate` call is reading them.
pub trait TileSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn cell(&self, x: i32, y: i32) -> Option<Cell>;

    /// World-space size of one cell.
    fn cell_size(&self) -> Vec2;

    /// World-space position of lattice point `(0, 0)`.
    fn origin(&self) -> Vec2 {
        Vec2::ZERO
    }
}

/// Owned, row-major tile grid.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileGrid {
    width: i32,
    height: i32,
    cell_size: Vec2,
    origin: Vec2,
    cells: Vec<Cell>,
}

impl TileGrid {
    /// A grid where every cell has classification `0`.
    pub fn new(width: u32, height: u32, cell_size: Vec2) -> Self {
        Self::from_indices(width, height, cell_size, &vec![0; (width * height) as usize])
    }

    /// Build from row-major classification indices (`indices.len() == width * height`).
    pub fn from_indices(width: u32, height: u32, cell_size: Vec2, indices: &[u32]) -> Self {
        assert!(
            indices.len() == (width as usize) * (height as usize),
            "indices must cover the whole grid"
        );
        assert!(
            cell_size.x > 0.0 && cell_size.y > 0.0,
            "cell_size must be > 0"
        );
        let width = width as i32;
        let height = height as i32;
        let cells = indices
            .iter()
            .enumerate()
            .map(|(i, &index)| Cell {
                x: i as i32 % width.max(1),
                y: i as i32 / width.max(1),
                index,
                blocked: false,
            })
            .collect();
        Self {
            width,
            height,
            cell_size,
            origin: Vec2::ZERO,
            cells,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn set_index(&mut self, x: i32, y: i32, index: u32) {
        if let Some(idx) = self.idx(x, y) {
            self.cells[idx].index = index;
        }
    }

    pub fn set_blocked(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(idx) = self.idx(x, y) {
            self.cells[idx].blocked = blocked;
        }
    }

    /// Set the override to `blocked` if given, otherwise flip it.
    pub fn toggle_blocked(&mut self, x: i32, y: i32, blocked: Option<bool>) {
        if let Some(idx) = self.idx(x, y) {
            let cell = &mut self.cells[idx];
            cell.blocked = blocked.unwrap_or(!cell.blocked);
        }
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }
}

impl TileSource for TileGrid {
    fn width(&self) -> u32 {
        self.width as u32
    }

    fn height(&self) -> u32 {
        self.height as u32
    }

    fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.idx(x, y).map(|idx| self.cells[idx])
    }

    fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    fn origin(&self) -> Vec2 {
        self.origin
    }
}

/// Read-only view of a tile source under one collision classification.
pub struct GridView<'a, G: ?Sized> {
    grid: &'a G,
    collision_indices: &'a [u32],
}

impl<'a, G: TileSource + ?Sized> GridView<'a, G> {
    pub fn new(grid: &'a G, collision_indices: &'a [u32]) -> Self {
        Self {
            grid,
            collision_indices,
        }
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn bounds(&self) -> GridRect {
        GridRect::from_size(self.width(), self.height())
    }

    pub fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        self.grid.cell(x, y)
    }

    /// `None` outside the grid, otherwise whether the cell is blocked.
    pub fn blocked_at(&self, x: i32, y: i32) -> Option<bool> {
        self.cell_at(x, y)
            .map(|cell| cell.blocked || self.collision_indices.contains(&cell.index))
    }

    /// Out-of-bounds cells are reported as not blocked; tracing treats them as outside every region.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.blocked_at(x, y).unwrap_or(false)
    }

    pub fn to_world(&self, p: GridPoint) -> Vec2 {
        let size = self.grid.cell_size();
        let origin = self.grid.origin();
        Vec2::new(
            origin.x + p.x as f32 * size.x,
            origin.y + p.y as f32 * size.y,
        )
    }

    /// Inverse of [`GridView::to_world`], in fractional lattice units.
    pub fn to_grid(&self, p: Vec2) -> Vec2 {
        let size = self.grid.cell_size();
        let origin = self.grid.origin();
        Vec2::new((p.x - origin.x) / size.x, (p.y - origin.y) / size.y)
    }

    /// Longest walk a single contour can take: every lattice edge at most once.
    pub fn contour_step_limit(&self) -> usize {
        let w = self.width() as usize + 1;
        let h = self.height() as usize + 1;
        2 * w * h
    }
}
