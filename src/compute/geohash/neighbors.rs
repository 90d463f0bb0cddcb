//! Neighbor expansion for geohash cells.
//!
//! The last character of an odd-length geohash spans an 8 × 4 (longitude ×
//! latitude) sub-grid; for an even-length geohash the sub-grid is 4 × 8. Each
//! parity therefore has its own per-direction neighbor tables and border sets.
//! Stepping off a border wraps within the sub-grid and carries the step into
//! the preceding character.

use super::codec::{ALPHABET, char_index};
use crate::compute::validation::validate_geohash;
use crate::error::{Result, SpotError};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use spothash_types::direction::Direction;

/// A cell followed by its (deduplicated) neighbors. One ring holds at most 9
/// entries inline; wider ring expansions spill to the heap.
pub type CoveringSet = SmallVec<[String; 9]>;

/// Neighbor and border tables for one length parity, ordered N, E, S, W.
///
/// `neighbors[d]` lists, in alphabet order of the result, the character whose
/// neighbor in direction `d` is that alphabet entry. `borders[d]` lists the
/// characters on the edge of the sub-grid in direction `d`.
#[derive(Debug)]
pub struct ParityTables {
    pub neighbors: [&'static [u8; 32]; 4],
    pub borders: [&'static [u8]; 4],
}

/// Tables for a geohash whose length (up to and including the character being
/// stepped) is even.
pub const EVEN_TABLES: ParityTables = ParityTables {
    neighbors: [
        b"p0r21436x8zb9dcf5h7kjnmqesgutwvy",
        b"bc01fg45238967deuvhjyznpkmstqrwx",
        b"14365h7k9dcfesgujnmqp0r2twvyx8zb",
        b"238967debc01fg45kmstqrwxuvhjyznp",
    ],
    borders: [b"prxz", b"bcfguvyz", b"028b", b"0145hjnp"],
};

/// Tables for a geohash whose length (up to and including the character being
/// stepped) is odd.
pub const ODD_TABLES: ParityTables = ParityTables {
    neighbors: [
        b"bc01fg45238967deuvhjyznpkmstqrwx",
        b"p0r21436x8zb9dcf5h7kjnmqesgutwvy",
        b"238967debc01fg45kmstqrwxuvhjyznp",
        b"14365h7k9dcfesgujnmqp0r2twvyx8zb",
    ],
    borders: [b"bcfguvyz", b"prxz", b"0145hjnp", b"028b"],
};

/// Index-based form of [`ParityTables`]: `step[d][i]` is the alphabet index of
/// the neighbor of alphabet index `i`, and bit `i` of `border[d]` is set when
/// `i` lies on the edge in direction `d`.
struct Lookup {
    step: [[u8; 32]; 4],
    border: [u32; 4],
}

const fn index_of(byte: u8) -> usize {
    match char_index(byte) {
        Some(idx) => idx as usize,
        None => panic!("table character outside the geohash alphabet"),
    }
}

const fn build_lookup(tables: &ParityTables) -> Lookup {
    let mut step = [[0u8; 32]; 4];
    let mut border = [0u32; 4];
    let mut dir = 0;
    while dir < 4 {
        let table = tables.neighbors[dir];
        let mut pos = 0;
        while pos < 32 {
            step[dir][index_of(table[pos])] = pos as u8;
            pos += 1;
        }
        let edge = tables.borders[dir];
        let mut i = 0;
        while i < edge.len() {
            border[dir] |= 1 << index_of(edge[i]);
            i += 1;
        }
        dir += 1;
    }
    Lookup { step, border }
}

const EVEN_LOOKUP: Lookup = build_lookup(&EVEN_TABLES);
const ODD_LOOKUP: Lookup = build_lookup(&ODD_TABLES);

/// A single-axis step. Slots index the N, E, S, W table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cardinal {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Cardinal {
    const fn slot(self) -> usize {
        self as usize
    }

    /// North/south steps stop at a pole; east/west steps wrap.
    const fn stops_at_pole(self) -> bool {
        matches!(self, Cardinal::North | Cardinal::South)
    }
}

/// Split a direction into its north/south step and optional east/west step.
/// Diagonals step north or south first, so NE is the east neighbor of the
/// north neighbor.
const fn cardinal_steps(direction: Direction) -> (Cardinal, Option<Cardinal>) {
    match direction {
        Direction::North => (Cardinal::North, None),
        Direction::NorthEast => (Cardinal::North, Some(Cardinal::East)),
        Direction::East => (Cardinal::East, None),
        Direction::SouthEast => (Cardinal::South, Some(Cardinal::East)),
        Direction::South => (Cardinal::South, None),
        Direction::SouthWest => (Cardinal::South, Some(Cardinal::West)),
        Direction::West => (Cardinal::West, None),
        Direction::NorthWest => (Cardinal::North, Some(Cardinal::West)),
    }
}

/// Move `hash` one cell in a cardinal direction, in place.
///
/// Returns `Ok(false)` when the step carries past the first character in a
/// north/south direction, i.e. off a pole. East/west carries wrap around the
/// antimeridian. A byte outside the alphabet is an error; `hash` may then be
/// partially stepped and must be discarded.
fn step_cardinal(hash: &mut [u8], step: Cardinal) -> Result<bool> {
    let slot = step.slot();
    let mut pos = hash.len();

    while pos > 0 {
        pos -= 1;
        let lookup = if (pos + 1) % 2 == 0 {
            &EVEN_LOOKUP
        } else {
            &ODD_LOOKUP
        };
        let Some(idx) = char_index(hash[pos]).map(usize::from) else {
            return Err(SpotError::invalid_geohash(
                &String::from_utf8_lossy(hash),
                format!("byte 0x{:02x} at position {} is not in the alphabet", hash[pos], pos),
            ));
        };
        let crosses_border = lookup.border[slot] & (1 << idx) != 0;
        hash[pos] = ALPHABET[lookup.step[slot][idx] as usize];
        if !crosses_border {
            return Ok(true);
        }
    }

    Ok(!step.stops_at_pole())
}

fn to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn step(geohash: &str, direction: Direction) -> Result<Option<String>> {
    let mut buf = geohash.as_bytes().to_vec();
    let (first, second) = cardinal_steps(direction);
    if !step_cardinal(&mut buf, first)? {
        return Ok(None);
    }
    if let Some(second) = second
        && !step_cardinal(&mut buf, second)?
    {
        return Ok(None);
    }
    Ok(Some(to_string(&buf)))
}

/// The cell adjacent to `geohash` in `direction`, at the same precision.
///
/// Returns `Ok(None)` when the step would cross a pole.
///
/// # Examples
///
/// ```
/// use spothash::compute::geohash::adjacent;
/// use spothash::Direction;
///
/// assert_eq!(adjacent("u4pruy", Direction::North)?.as_deref(), Some("u4pruz"));
/// // Wraps around the antimeridian
/// assert_eq!(adjacent("b", Direction::West)?.as_deref(), Some("z"));
/// // Nothing lies north of the north pole
/// assert_eq!(adjacent("b", Direction::North)?, None);
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn adjacent(geohash: &str, direction: Direction) -> Result<Option<String>> {
    validate_geohash(geohash)?;
    step(geohash, direction)
}

/// The eight neighbors of a cell in fixed order N, NE, E, SE, S, SW, W, NW.
///
/// Directions that would cross a pole are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    cells: [Option<String>; 8],
}

impl Neighbors {
    pub fn get(&self, direction: Direction) -> Option<&str> {
        self.cells[direction.index()].as_deref()
    }

    /// Present neighbors with their direction, in neighbor order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &str)> + '_ {
        Direction::ALL
            .iter()
            .zip(self.cells.iter())
            .filter_map(|(dir, cell)| cell.as_deref().map(|c| (*dir, c)))
    }

    /// Number of neighbors present: 8 away from the poles.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no direction was cut off by a pole.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Present neighbors in order, dropping polar gaps.
    pub fn into_vec(self) -> Vec<String> {
        self.cells.into_iter().flatten().collect()
    }
}

/// Compute the neighbors of `geohash`.
///
/// Diagonals are derived by composing two cardinal steps: NE is the east
/// neighbor of the north neighbor, SW the west neighbor of the south one, and
/// so on.
///
/// # Examples
///
/// ```
/// use spothash::compute::geohash::neighbors;
/// use spothash::Direction;
///
/// let nb = neighbors("u4pruy")?;
/// assert_eq!(nb.get(Direction::NorthEast), Some("u4prvp"));
/// assert_eq!(nb.get(Direction::West), Some("u4pruw"));
/// assert!(nb.is_complete());
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn neighbors(geohash: &str) -> Result<Neighbors> {
    validate_geohash(geohash)?;

    let north = step(geohash, Direction::North)?;
    let south = step(geohash, Direction::South)?;
    let east = step(geohash, Direction::East)?;
    let west = step(geohash, Direction::West)?;

    let side = |cell: &Option<String>, dir: Direction| -> Result<Option<String>> {
        match cell {
            Some(c) => step(c, dir),
            None => Ok(None),
        }
    };
    let north_east = side(&north, Direction::East)?;
    let south_east = side(&south, Direction::East)?;
    let south_west = side(&south, Direction::West)?;
    let north_west = side(&north, Direction::West)?;

    Ok(Neighbors {
        cells: [
            north, north_east, east, south_east, south, south_west, west, north_west,
        ],
    })
}

/// The covering set of a cell: the cell itself followed by its neighbors.
///
/// Duplicate cells are dropped, keeping first occurrence order.
///
/// # Examples
///
/// ```
/// use spothash::compute::geohash::neighbors_with_self;
///
/// let cover = neighbors_with_self("u4pruy")?;
/// assert_eq!(cover.len(), 9);
/// assert_eq!(cover[0], "u4pruy");
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn neighbors_with_self(geohash: &str) -> Result<CoveringSet> {
    let nb = neighbors(geohash)?;
    let mut cover = CoveringSet::new();
    cover.push(geohash.to_string());
    for cell in nb.into_vec() {
        if !cover.contains(&cell) {
            cover.push(cell);
        }
    }
    Ok(cover)
}

/// All cells within `rings` neighbor steps of `geohash`, nearest rings first.
///
/// `rings == 0` yields just the cell; `rings == 1` matches
/// [`neighbors_with_self`]. Use more rings when a search radius exceeds what
/// one ring of neighbors covers at the stored precision.
pub fn expand_rings(geohash: &str, rings: usize) -> Result<Vec<String>> {
    validate_geohash(geohash)?;

    let mut seen = FxHashSet::default();
    seen.insert(geohash.to_string());
    let mut cells = vec![geohash.to_string()];
    let mut frontier = vec![geohash.to_string()];

    for _ in 0..rings {
        let mut next = Vec::new();
        for cell in &frontier {
            for neighbor in neighbors(cell)?.into_vec() {
                if seen.insert(neighbor.clone()) {
                    next.push(neighbor);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        cells.extend(next.iter().cloned());
        frontier = next;
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(geohash: &str) -> Vec<Option<String>> {
        let nb = neighbors(geohash).unwrap();
        Direction::ALL
            .iter()
            .map(|d| nb.get(*d).map(str::to_string))
            .collect()
    }

    fn some(cells: &[&str]) -> Vec<Option<String>> {
        cells.iter().map(|c| Some(c.to_string())).collect()
    }

    #[test]
    fn test_interior_cell() {
        assert_eq!(
            all("u4pruy"),
            some(&[
                "u4pruz", "u4prvp", "u4prvn", "u4prvj", "u4pruv", "u4prut", "u4pruw", "u4prux"
            ])
        );
    }

    #[test]
    fn test_odd_length_cell() {
        assert_eq!(
            all("u173zt5"),
            some(&[
                "u173zt7", "u173ztk", "u173zth", "u173zsu", "u173zsg", "u173zsf", "u173zt4",
                "u173zt6"
            ])
        );
        assert_eq!(
            all("dr5re"),
            some(&["dr5rg", "dr5ru", "dr5rs", "dr5rk", "dr5r7", "dr5r6", "dr5rd", "dr5rf"])
        );
    }

    #[test]
    fn test_carry_propagates_through_prefix() {
        assert_eq!(
            all("ezzz"),
            some(&["gbpb", "u000", "spbp", "spbn", "ezzy", "ezzw", "ezzx", "gbp8"])
        );
        assert_eq!(
            all("kpbp"),
            some(&["s000", "s002", "kpbr", "kpbq", "kpbn", "7zzy", "7zzz", "ebpb"])
        );
    }

    #[test]
    fn test_single_character_grid() {
        assert_eq!(
            all("s"),
            some(&["u", "v", "t", "m", "k", "7", "e", "g"])
        );
    }

    #[test]
    fn test_polar_cells_have_gaps() {
        assert_eq!(
            all("z"),
            vec![
                None,
                None,
                Some("b".to_string()),
                Some("8".to_string()),
                Some("x".to_string()),
                Some("w".to_string()),
                Some("y".to_string()),
                None,
            ]
        );
        let nb = neighbors("b").unwrap();
        assert_eq!(nb.len(), 5);
        assert!(!nb.is_complete());
        assert_eq!(nb.get(Direction::West), Some("z"));
    }

    #[test]
    fn test_antimeridian_wrap() {
        assert_eq!(adjacent("0", Direction::West).unwrap().as_deref(), Some("p"));
        assert_eq!(adjacent("p", Direction::East).unwrap().as_deref(), Some("0"));
        assert_eq!(adjacent("0", Direction::South).unwrap(), None);
    }

    #[test]
    fn test_tables_are_parity_specific_not_shared() {
        // A single table shared by all directions cannot be right: within one
        // parity, each direction must map characters differently.
        for tables in [&EVEN_TABLES, &ODD_TABLES] {
            for a in 0..4 {
                for b in (a + 1)..4 {
                    assert_ne!(tables.neighbors[a], tables.neighbors[b]);
                }
            }
        }
        // Latitude and longitude swap roles between parities.
        assert_eq!(EVEN_TABLES.neighbors[0], ODD_TABLES.neighbors[1]);
        assert_eq!(EVEN_TABLES.neighbors[1], ODD_TABLES.neighbors[0]);
        // So the same character steps differently at different lengths.
        assert_eq!(adjacent("s", Direction::North).unwrap().as_deref(), Some("u"));
        assert_eq!(adjacent("ss", Direction::North).unwrap().as_deref(), Some("st"));
    }

    #[test]
    fn test_cardinal_steps_invert() {
        for hash in ["u4pruy", "u173zt5", "dr5re", "gbsuv", "ezzz", "kpbp"] {
            for dir in Direction::CARDINAL {
                let there = adjacent(hash, dir).unwrap().unwrap();
                let back = adjacent(&there, dir.opposite()).unwrap().unwrap();
                assert_eq!(back, hash, "{} then {} from {}", dir, dir.opposite(), hash);
            }
        }
    }

    #[test]
    fn test_covering_set() {
        let cover = neighbors_with_self("dr5re").unwrap();
        assert_eq!(cover.len(), 9);
        assert_eq!(cover[0], "dr5re");
        assert!(!cover.spilled());

        let polar = neighbors_with_self("z").unwrap();
        assert_eq!(polar.len(), 6);
        assert_eq!(polar[0], "z");
    }

    #[test]
    fn test_expand_rings() {
        assert_eq!(expand_rings("u4pruy", 0).unwrap(), vec!["u4pruy"]);

        let one = expand_rings("u4pruy", 1).unwrap();
        let cover = neighbors_with_self("u4pruy").unwrap();
        assert_eq!(one.len(), 9);
        assert!(cover.iter().all(|c| one.contains(c)));

        let two = expand_rings("u4pruy", 2).unwrap();
        assert_eq!(two.len(), 25);
        assert_eq!(&two[..9], &one[..]);
    }

    #[test]
    fn test_step_rejects_bytes_outside_alphabet() {
        let mut buf = *b"u4pa";
        assert!(matches!(
            step_cardinal(&mut buf, Cardinal::North),
            Err(SpotError::InvalidGeohash { .. })
        ));
        assert!(matches!(
            step("u4pa", Direction::NorthEast),
            Err(SpotError::InvalidGeohash { .. })
        ));
        // Carry reaches the bad byte only after stepping the valid suffix
        assert!(step("a0", Direction::West).is_err());
        assert_eq!(step("u4pz", Direction::North).unwrap().as_deref(), Some("u4rb"));
    }

    #[test]
    fn test_diagonals_step_north_south_first() {
        assert_eq!(cardinal_steps(Direction::NorthEast), (Cardinal::North, Some(Cardinal::East)));
        assert_eq!(cardinal_steps(Direction::SouthWest), (Cardinal::South, Some(Cardinal::West)));
        assert_eq!(cardinal_steps(Direction::East), (Cardinal::East, None));
        for direction in Direction::ALL {
            let (first, second) = cardinal_steps(direction);
            assert_eq!(second.is_none(), direction.is_cardinal());
            if second.is_some() {
                assert!(first.stops_at_pole());
            }
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(neighbors("").is_err());
        assert!(adjacent("u4pa", Direction::North).is_err());
        assert!(neighbors_with_self("U4PRUY").is_err());
    }
}
