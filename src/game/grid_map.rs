use super::math::Vector2F;

pub const CELL_SIZE: i32 = 128;

// Cell indices whose origin still fits in an i32.
const MIN_CELL: i32 = i32::MIN / CELL_SIZE;
const MAX_CELL: i32 = i32::MAX / CELL_SIZE;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridLine {
    pub from: Vector2F,
    pub to: Vector2F,
}

/// Snapping uses floor division, so the returned cell contains the input
/// point for negative inputs too. Points beyond the i32 range land on the
/// outermost cell.
#[derive(Debug, Default, Copy, Clone)]
pub struct GridMap;

impl GridMap {
    pub fn snap(x: f32, y: f32) -> (i32, i32) {
        let (column, row) = Self::cell_of(x, y);
        Self::cell_origin(column, row)
    }

    pub fn cell_of(x: f32, y: f32) -> (i32, i32) {
        fn cell_index(coord: f32) -> i32 {
            ((coord / CELL_SIZE as f32).floor() as i32).clamp(MIN_CELL, MAX_CELL)
        }

        (cell_index(x), cell_index(y))
    }

    pub fn cell_origin(column: i32, row: i32) -> (i32, i32) {
        (column.clamp(MIN_CELL, MAX_CELL) * CELL_SIZE, row.clamp(MIN_CELL, MAX_CELL) * CELL_SIZE)
    }

    // Vertical lines first, then horizontal, both starting at offset 0.
    pub fn grid_lines(width: u32, height: u32) -> impl Iterator<Item = GridLine> {
        let (w, h) = (width as f32, height as f32);

        let vertical = (0..width).step_by(CELL_SIZE as usize).map(move |x| GridLine {
            from: Vector2F::new(x as f32, 0.0),
            to: Vector2F::new(x as f32, h),
        });

        let horizontal = (0..height).step_by(CELL_SIZE as usize).map(move |y| GridLine {
            from: Vector2F::new(0.0, y as f32),
            to: Vector2F::new(w, y as f32),
        });

        vertical.chain(horizontal)
    }
}
