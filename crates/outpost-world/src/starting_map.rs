//! Built-in 10x10 map used when no map file is configured.

use crate::map_rows::MapRow;

/// Authored resource tiles: `(x, y, code)`.
const RESOURCES: [(u32, u32, &str); 16] = [
    (1, 2, "A"),
    (4, 1, "B"),
    (6, 1, "A"),
    (8, 0, "C"),
    (0, 5, "A"),
    (3, 5, "B"),
    (5, 4, "B"),
    (9, 4, "A"),
    (4, 6, "C"),
    (8, 6, "A"),
    (1, 8, "B"),
    (7, 8, "B"),
    (5, 8, "A"),
    (2, 9, "C"),
    (0, 9, "B"),
    (9, 9, "C"),
];

/// Authored hazard centers: `(x, y, id)`.
const HAZARDS: [(u32, u32, u32); 4] = [(3, 3, 1), (7, 2, 2), (2, 7, 3), (6, 6, 4)];

/// The default map rows: sixteen resources of mixed kind and four hazard
/// centers on a 10x10 grid.
pub fn starting_map() -> Vec<MapRow> {
    RESOURCES
        .iter()
        .map(|&(x, y, code)| MapRow::with_resource(x, y, code))
        .chain(HAZARDS.iter().map(|&(x, y, id)| MapRow::with_hazard(x, y, id)))
        .collect()
}
