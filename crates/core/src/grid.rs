//! Grid: a dense 2D array of cells.
//!
//! Storage is row-major. Point access is bounds-checked and returns
//! [`GridError::OutOfBounds`] rather than clamping; area copies either fail
//! or clip depending on [`CopyMode`].

use crate::error::{GridError, PixelError};
use crate::pixel::Pixel;
use crate::types::{ColorSet, IntVector, Rect};

/// How an area copy treats a source or destination rectangle that overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Any overflow is an error.
    #[default]
    Strict,
    /// Overflowing parts are clipped away.
    Trim,
}

/// What happens to existing cells on [`Grid::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Every cell is reset to the fill value.
    Clear,
    /// Cells keep their position relative to the top-left corner.
    Preserve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> IntVector {
        IntVector::new(self.width as i32, self.height as i32)
    }

    /// The grid's own bounds, at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::at(IntVector::ZERO, self.size())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(&self.cells[start..start + self.width])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // `chunks` rejects a zero size; a zero-width grid has no cells anyway.
        self.cells.chunks(self.width.max(1))
    }

    #[inline(always)]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize) * self.width + (x as usize))
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> GridError {
        GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Result<&T, GridError> {
        match self.idx(x, y) {
            Some(i) => Ok(&self.cells[i]),
            None => Err(self.out_of_bounds(x, y)),
        }
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Result<&mut T, GridError> {
        match self.idx(x, y) {
            Some(i) => Ok(&mut self.cells[i]),
            None => Err(self.out_of_bounds(x, y)),
        }
    }

    pub fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        *self.get_mut(x, y)? = value;
        Ok(())
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// Resize the grid, reusing the allocation when possible.
    pub fn resize(&mut self, width: usize, height: usize, fill: T, mode: ResizeMode) {
        if self.width == width && self.height == height {
            if mode == ResizeMode::Clear {
                self.cells.fill(fill);
            }
            return;
        }

        match mode {
            ResizeMode::Clear => {
                self.cells.clear();
                self.cells.resize(width * height, fill);
            }
            ResizeMode::Preserve => {
                let mut cells = vec![fill; width * height];
                let keep_w = self.width.min(width);
                for y in 0..self.height.min(height) {
                    let from = y * self.width;
                    let to = y * width;
                    cells[to..to + keep_w].clone_from_slice(&self.cells[from..from + keep_w]);
                }
                self.cells = cells;
            }
        }
        self.width = width;
        self.height = height;
    }

    /// Copy `area` of `src` into this grid with its top-left corner at `at`.
    pub fn copy_from(
        &mut self,
        src: &Grid<T>,
        area: Rect,
        at: IntVector,
        mode: CopyMode,
    ) -> Result<(), GridError> {
        self.merge_from(src, area, at, mode, |top, _| top.clone())
    }

    /// Like [`Grid::copy_from`], but each destination cell becomes
    /// `f(source_cell, destination_cell)`.
    pub fn merge_from(
        &mut self,
        src: &Grid<T>,
        area: Rect,
        at: IntVector,
        mode: CopyMode,
        mut f: impl FnMut(&T, &T) -> T,
    ) -> Result<(), GridError> {
        let Some((from, to)) = self.plan_copy(src, area, at, mode)? else {
            return Ok(());
        };

        for dy in 0..from.height as usize {
            let s_row = (from.y as usize + dy) * src.width + from.x as usize;
            let d_row = (to.y as usize + dy) * self.width + to.x as usize;
            for dx in 0..from.width as usize {
                let d = &mut self.cells[d_row + dx];
                *d = f(&src.cells[s_row + dx], &*d);
            }
        }
        Ok(())
    }

    /// Resolve the source rectangle and destination corner of a copy.
    ///
    /// `Ok(None)` means there is nothing to copy.
    fn plan_copy(
        &self,
        src: &Grid<T>,
        area: Rect,
        at: IntVector,
        mode: CopyMode,
    ) -> Result<Option<(Rect, IntVector)>, GridError> {
        if area.is_empty() {
            return Ok(None);
        }

        match mode {
            CopyMode::Strict => {
                if area.intersect(&src.bounds()) != Some(area) {
                    return Err(GridError::AreaOutOfBounds {
                        x: area.x,
                        y: area.y,
                        width: area.width,
                        height: area.height,
                        target_width: src.width,
                        target_height: src.height,
                    });
                }
                let dest = Rect::new(at.x, at.y, area.width, area.height);
                if dest.intersect(&self.bounds()) != Some(dest) {
                    return Err(GridError::AreaOutOfBounds {
                        x: dest.x,
                        y: dest.y,
                        width: dest.width,
                        height: dest.height,
                        target_width: self.width,
                        target_height: self.height,
                    });
                }
                Ok(Some((area, at)))
            }
            CopyMode::Trim => {
                let Some(src_clip) = area.intersect(&src.bounds()) else {
                    return Ok(None);
                };
                let shift = IntVector::new(src_clip.x - area.x, src_clip.y - area.y);
                let Some(dest_at) = at.checked_add(shift) else {
                    return Ok(None);
                };
                let dest = Rect::at(dest_at, IntVector::new(src_clip.width, src_clip.height));
                let Some(dest_clip) = dest.intersect(&self.bounds()) else {
                    return Ok(None);
                };
                let from = Rect::new(
                    src_clip.x + (dest_clip.x - dest.x),
                    src_clip.y + (dest_clip.y - dest.y),
                    dest_clip.width,
                    dest_clip.height,
                );
                Ok(Some((from, IntVector::new(dest_clip.x, dest_clip.y))))
            }
        }
    }
}

impl Grid<Pixel> {
    /// Write `s` left to right from `(x, y)`, clipped to the row.
    ///
    /// Returns the number of cells written.
    pub fn put_str(&mut self, x: i32, y: i32, s: &str, colors: ColorSet) -> Result<usize, PixelError> {
        let mut written = 0;
        for (i, ch) in s.chars().enumerate() {
            let px = Pixel::new(ch, colors.fg, colors.bg)?;
            let cx = x + i as i32;
            if cx >= self.width as i32 {
                break;
            }
            if let Some(idx) = self.idx(cx, y) {
                self.cells[idx] = px;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Glyphs of one row as a string, for assertions and debugging.
    pub fn row_text(&self, y: usize) -> String {
        self.row(y)
            .map(|r| r.iter().map(Pixel::glyph).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: usize, h: usize) -> Grid<u32> {
        Grid::from_fn(w, h, |x, y| (y * 100 + x) as u32)
    }

    #[test]
    fn point_access_is_bounds_checked() {
        let mut g: Grid<u8> = Grid::new(3, 2);
        assert!(g.set(2, 1, 7).is_ok());
        assert_eq!(*g.get(2, 1).unwrap(), 7);
        assert_eq!(
            g.get(3, 0),
            Err(GridError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert!(g.set(-1, 0, 1).is_err());
        assert!(g.get(0, 2).is_err());
    }

    #[test]
    fn strict_copy_rejects_overflow() {
        let src = numbered(4, 4);
        let mut dst: Grid<u32> = Grid::new(3, 3);
        let err = dst
            .copy_from(&src, Rect::new(0, 0, 2, 2), IntVector::new(2, 2), CopyMode::Strict)
            .unwrap_err();
        assert!(matches!(err, GridError::AreaOutOfBounds { .. }));

        let err = dst
            .copy_from(&src, Rect::new(3, 3, 2, 2), IntVector::ZERO, CopyMode::Strict)
            .unwrap_err();
        assert!(matches!(err, GridError::AreaOutOfBounds { target_width: 4, .. }));
    }

    #[test]
    fn trim_copy_clips_both_sides() {
        let src = numbered(4, 4);
        let mut dst: Grid<u32> = Grid::filled(3, 3, 9999);
        dst.copy_from(&src, Rect::new(0, 0, 4, 4), IntVector::new(-1, 1), CopyMode::Trim)
            .unwrap();

        assert_eq!(dst.row(0).unwrap(), &[9999, 9999, 9999]);
        assert_eq!(dst.row(1).unwrap(), &[1, 2, 3]);
        assert_eq!(dst.row(2).unwrap(), &[101, 102, 103]);
    }

    #[test]
    fn trim_copy_entirely_outside_is_noop() {
        let src = numbered(2, 2);
        let mut dst: Grid<u32> = Grid::new(2, 2);
        dst.copy_from(&src, src.bounds(), IntVector::new(5, 5), CopyMode::Trim)
            .unwrap();
        assert!(dst.cells().iter().all(|c| *c == 0));
    }

    #[test]
    fn merge_from_sees_destination_cell() {
        let src = Grid::filled(2, 1, 10u32);
        let mut dst = Grid::filled(2, 1, 5u32);
        dst.merge_from(&src, src.bounds(), IntVector::ZERO, CopyMode::Strict, |a, b| a + b)
            .unwrap();
        assert_eq!(dst.cells(), &[15, 15]);
    }

    #[test]
    fn resize_preserve_keeps_top_left() {
        let mut g = numbered(3, 3);
        g.resize(2, 4, 0, ResizeMode::Preserve);
        assert_eq!((g.width(), g.height()), (2, 4));
        assert_eq!(g.row(0).unwrap(), &[0, 1]);
        assert_eq!(g.row(2).unwrap(), &[200, 201]);
        assert_eq!(g.row(3).unwrap(), &[0, 0]);
    }

    #[test]
    fn resize_clear_resets_everything() {
        let mut g = numbered(3, 3);
        g.resize(3, 3, 1, ResizeMode::Clear);
        assert!(g.cells().iter().all(|c| *c == 1));
        g.resize(1, 1, 2, ResizeMode::Clear);
        assert_eq!(g.cells(), &[2]);
    }

    #[test]
    fn put_str_clips_at_row_end() {
        let mut g: Grid<Pixel> = Grid::new(4, 1);
        let n = g.put_str(2, 0, "hello", ColorSet::FALLBACK).unwrap();
        assert_eq!(n, 2);
        assert_eq!(g.row_text(0), "  he");
        assert!(g.put_str(0, 0, "a\tb", ColorSet::FALLBACK).is_err());
    }

    #[test]
    fn trimmed_copy_far_off_grid_is_a_no_op() {
        let src = numbered(3, 2);
        let mut dst: Grid<u32> = Grid::filled(4, 4, 7);
        dst.copy_from(&src, src.bounds(), IntVector::new(i32::MAX - 1, 0), CopyMode::Trim)
            .unwrap();
        dst.copy_from(&src, Rect::new(-5, 0, 8, 2), IntVector::new(i32::MAX, 0), CopyMode::Trim)
            .unwrap();
        assert!(dst.cells().iter().all(|c| *c == 7));
        assert!(dst
            .copy_from(&src, src.bounds(), IntVector::new(i32::MAX - 1, 0), CopyMode::Strict)
            .is_err());
    }
}
