/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`, `x` runs along the width.
pub type Coord2 = (Coord, Coord);

/// Index into the cell grid, which is laid out `[x, y]`.
pub(crate) fn grid_index((x, y): Coord2) -> [usize; 2] {
    [usize::from(x), usize::from(y)]
}

/// Number of cells on a board of `size`, 255x255 still fits a `CellCount`.
pub const fn area(size: Coord2) -> CellCount {
    size.0 as CellCount * size.1 as CellCount
}

/// Walks the 3x3 window around a cell, clipped to the board, skipping the cell itself.
///
/// Positions come out row by row, top-left first.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    left: Coord,
    right: Coord,
    bottom: Coord,
    cursor: Option<Coord2>,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        let (x, y) = center;
        let (width, height) = bounds;
        let left = x.saturating_sub(1);
        let top = y.saturating_sub(1);
        let inside = x < width && y < height;

        Self {
            center,
            left,
            right: x.saturating_add(1).min(width.saturating_sub(1)),
            bottom: y.saturating_add(1).min(height.saturating_sub(1)),
            cursor: inside.then_some((left, top)),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current @ (x, y) = self.cursor?;
            self.cursor = if x < self.right {
                Some((x + 1, y))
            } else if y < self.bottom {
                Some((self.left, y + 1))
            } else {
                None
            };

            if current != self.center {
                return Some(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_cell_has_eight_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((1, 1), (3, 3)).collect();

        assert_eq!(
            neighbors,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)]
        );
    }

    #[test]
    fn corner_and_edge_cells_are_clipped() {
        assert_eq!(NeighborIter::new((0, 0), (3, 3)).count(), 3);
        assert_eq!(NeighborIter::new((2, 2), (3, 3)).count(), 3);
        assert_eq!(NeighborIter::new((1, 0), (3, 3)).count(), 5);
        assert_eq!(NeighborIter::new((0, 0), (1, 1)).count(), 0);
    }

    #[test]
    fn single_row_board() {
        let neighbors: Vec<_> = NeighborIter::new((2, 0), (4, 1)).collect();
        assert_eq!(neighbors, vec![(1, 0), (3, 0)]);
    }

    #[test]
    fn far_edge_of_the_largest_board() {
        let neighbors: Vec<_> = NeighborIter::new((254, 254), (255, 255)).collect();
        assert_eq!(neighbors, vec![(253, 253), (254, 253), (253, 254)]);
    }

    #[test]
    fn outside_center_has_no_neighbors() {
        assert_eq!(NeighborIter::new((3, 0), (3, 3)).count(), 0);
    }

    #[test]
    fn area_of_the_largest_board() {
        assert_eq!(area((9, 9)), 81);
        assert_eq!(area((255, 255)), 65025);
    }
}
