//! Neighbor counting on square and hex lattices.

use crate::schema::Lattice;

/// Moore neighborhood for the square lattice.
const SQUARE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Hex offsets for even rows under the odd-row-offset layout
/// (odd rows are shifted half a cell to the right).
const HEX_EVEN_OFFSETS: [(i32, i32); 6] = [
    (-1, -1),
    (0, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
];

/// Hex offsets for odd rows.
const HEX_ODD_OFFSETS: [(i32, i32); 6] = [
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (0, 1),
    (1, 1),
];

/// Neighbor offsets for a cell in row `y` of the given lattice.
#[inline]
pub fn offsets(lattice: Lattice, y: usize) -> &'static [(i32, i32)] {
    match lattice {
        Lattice::Square => &SQUARE_OFFSETS,
        Lattice::Hex if y & 1 == 0 => &HEX_EVEN_OFFSETS,
        Lattice::Hex => &HEX_ODD_OFFSETS,
    }
}

/// Count live neighbors of `(x, y)` under the configured boundary policy.
///
/// With `toroidal` set, neighbor coordinates wrap modulo the grid
/// dimensions; otherwise out-of-range neighbors are skipped.
pub fn count_neighbors(
    cells: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    lattice: Lattice,
    toroidal: bool,
) -> u8 {
    let (w, h) = (width as i32, height as i32);
    let mut count = 0u8;

    for &(dx, dy) in offsets(lattice, y) {
        let mut nx = x as i32 + dx;
        let mut ny = y as i32 + dy;

        if toroidal {
            nx = nx.rem_euclid(w);
            ny = ny.rem_euclid(h);
        } else if nx < 0 || nx >= w || ny < 0 || ny >= h {
            continue;
        }

        count += cells[(ny * w + nx) as usize];
    }

    count
}
