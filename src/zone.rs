// src/zone.rs
//
// Pixel location of a pitch marker -> discrete strike-zone cell. Pure
// function, no I/O.
//
// The location chart is a fixed 160x200 px box subdivided 5x5; markers are
// 18 px circles positioned by their top-left corner. Zones are numbered
// row-major from the chart's top-left (1..=25) and are absolute to the
// chart, with no batter-handedness mirroring.

pub const CHART_WIDTH: f64 = 160.0;
pub const CHART_HEIGHT: f64 = 200.0;
pub const GRID: i32 = 5;
pub const MARKER_RADIUS: f64 = 9.0;

const CELL_W: f64 = CHART_WIDTH / GRID as f64;
const CELL_H: f64 = CHART_HEIGHT / GRID as f64;

/// Map a marker's (top, left) pixel offsets to a zone id 1..=25.
/// Negative offsets clamp into the first row/column.
pub fn zone_for_marker(top: i32, left: i32) -> u8 {
    let cx = left as f64 + MARKER_RADIUS;
    let cy = top as f64 + MARKER_RADIUS;

    let mut col = (cx / CELL_W) as i32;
    let mut row = (cy / CELL_H) as i32;

    if top < 0 {
        row = 0;
    }
    if left < 0 {
        col = 0;
    }
    col = col.clamp(0, GRID - 1);
    row = row.clamp(0, GRID - 1);

    (row * GRID + col + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners() {
        assert_eq!(zone_for_marker(0, 0), 1);
        assert_eq!(zone_for_marker(199, 159), 25);
    }

    #[test]
    fn negative_offsets_clamp_to_first_row_and_column() {
        assert_eq!(zone_for_marker(-5, 0), 1);
        assert_eq!(zone_for_marker(0, -12), 1);
        assert_eq!(zone_for_marker(-5, 159), 5);
    }

    #[test]
    fn centers_land_in_their_cells() {
        // Center of the middle cell (col 2, row 2) -> zone 13.
        assert_eq!(zone_for_marker(91, 71), 13);
        // The marker center, not its corner, decides the cell: the first
        // column ends once left + radius reaches the cell width.
        assert_eq!(zone_for_marker(0, 22), 1);
        assert_eq!(zone_for_marker(0, 23), 2);
    }
}
