//! N-Puzzle Engine
//!
//! Seeded shuffling with a solvability guarantee, move validation and
//! application, solved detection and a greedy hint. Everything here is pure:
//! a move returns a new [`PuzzleState`] and never touches the input.

use serde::Serialize;
use thiserror::Error;

use crate::core::rng::SeededRng;
use crate::game::difficulty::Difficulty;

/// Shuffle attempts before falling back to the fixed near-solved board.
pub const MAX_SHUFFLE_ATTEMPTS: u32 = 100;

/// Rejected move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Tile is not orthogonally next to the empty cell (or is off the board).
    #[error("tile {tile_index} is not adjacent to the empty cell at {empty_index}")]
    NotAdjacent {
        /// Requested tile position.
        tile_index: usize,
        /// Current empty cell.
        empty_index: usize,
    },
    /// The puzzle was already solved; further moves are ignored.
    #[error("puzzle already solved")]
    AlreadySolved,
}

/// Direction a neighbour sits in, relative to the empty cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor {
    /// Cell above the empty cell
    Up,
    /// Cell below the empty cell
    Down,
    /// Cell left of the empty cell
    Left,
    /// Cell right of the empty cell
    Right,
}

impl Neighbor {
    /// Hint evaluation order; earlier wins ties.
    pub const ORDER: [Neighbor; 4] = [Neighbor::Up, Neighbor::Down, Neighbor::Left, Neighbor::Right];
}

/// Immutable board snapshot.
///
/// Value `v` at position `p` means tile `v` currently sits in cell `p` and
/// belongs in cell `v`. The empty cell holds the value `size² - 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleState {
    board: Vec<u8>,
    empty_index: usize,
    size: usize,
}

impl PuzzleState {
    /// The solved board for a difficulty.
    pub fn solved(difficulty: Difficulty) -> Self {
        let cells = difficulty.cell_count();
        Self {
            board: (0..cells as u8).collect(),
            empty_index: cells - 1,
            size: difficulty.size(),
        }
    }

    /// Build a state from an explicit board.
    ///
    /// Returns `None` unless `board` is a permutation of `0..size²` for a
    /// supported size.
    pub fn from_board(board: Vec<u8>) -> Option<Self> {
        let size = (1..=5).find(|s| s * s == board.len())?;
        Difficulty::from_size(size as u8)?;

        let mut seen = vec![false; board.len()];
        for &v in &board {
            let slot = seen.get_mut(v as usize)?;
            if *slot {
                return None;
            }
            *slot = true;
        }

        let empty_value = (board.len() - 1) as u8;
        let empty_index = board.iter().position(|&v| v == empty_value)?;
        Some(Self { board, empty_index, size })
    }

    /// Tile values by cell.
    pub fn board(&self) -> &[u8] {
        &self.board
    }

    /// Cell currently holding the empty tile.
    pub fn empty_index(&self) -> usize {
        self.empty_index
    }

    /// Edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value used for the empty cell.
    #[inline]
    pub fn empty_value(&self) -> u8 {
        (self.board.len() - 1) as u8
    }

    /// Whether the tile at `tile_index` may slide into the empty cell.
    ///
    /// Only orthogonal neighbours qualify; no wraparound across row edges.
    /// Out-of-range indices are simply not adjacent.
    pub fn is_adjacent(&self, tile_index: usize) -> bool {
        if tile_index >= self.board.len() {
            return false;
        }
        let (tr, tc) = (tile_index / self.size, tile_index % self.size);
        let (er, ec) = (self.empty_index / self.size, self.empty_index % self.size);
        tr.abs_diff(er) + tc.abs_diff(ec) == 1
    }

    /// Cell index of the neighbour in `direction`, if it exists.
    pub fn neighbor(&self, direction: Neighbor) -> Option<usize> {
        let (row, col) = (self.empty_index / self.size, self.empty_index % self.size);
        match direction {
            Neighbor::Up if row > 0 => Some(self.empty_index - self.size),
            Neighbor::Down if row + 1 < self.size => Some(self.empty_index + self.size),
            Neighbor::Left if col > 0 => Some(self.empty_index - 1),
            Neighbor::Right if col + 1 < self.size => Some(self.empty_index + 1),
            _ => None,
        }
    }

    /// Cells that can currently move, in hint order.
    pub fn movable_tiles(&self) -> Vec<usize> {
        Neighbor::ORDER
            .iter()
            .filter_map(|&d| self.neighbor(d))
            .collect()
    }

    /// Slide the tile at `tile_index` into the empty cell.
    pub fn make_move(&self, tile_index: usize) -> Result<PuzzleState, MoveError> {
        if !self.is_adjacent(tile_index) {
            return Err(MoveError::NotAdjacent {
                tile_index,
                empty_index: self.empty_index,
            });
        }

        let mut board = self.board.clone();
        board.swap(tile_index, self.empty_index);
        Ok(PuzzleState {
            board,
            empty_index: tile_index,
            size: self.size,
        })
    }

    /// True iff every tile sits on its own index.
    pub fn is_solved(&self) -> bool {
        self.board.iter().enumerate().all(|(i, &v)| v as usize == i)
    }

    /// Manhattan distance of `value` from its home if it sat at `position`.
    #[inline]
    fn tile_distance(&self, value: u8, position: usize) -> usize {
        let target = value as usize;
        let (r, c) = (position / self.size, position % self.size);
        let (tr, tc) = (target / self.size, target % self.size);
        r.abs_diff(tr) + c.abs_diff(tc)
    }

    /// Sum of tile distances, empty cell excluded.
    pub fn manhattan_distance(&self) -> usize {
        let empty = self.empty_value();
        self.board
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != empty)
            .map(|(p, &v)| self.tile_distance(v, p))
            .sum()
    }

    /// Greedy hint: the neighbour whose slide most reduces its own distance.
    ///
    /// Candidates are scored `distance_before - distance_after`, evaluated
    /// up, down, left, right; the first maximum wins. On a solved board every
    /// candidate scores -1 and one is still returned. The heuristic is local
    /// and may lead nowhere.
    pub fn suggest_hint(&self) -> Option<usize> {
        let mut best: Option<(usize, isize)> = None;

        for direction in Neighbor::ORDER {
            let Some(tile_index) = self.neighbor(direction) else {
                continue;
            };
            let value = self.board[tile_index];
            let before = self.tile_distance(value, tile_index) as isize;
            let after = self.tile_distance(value, self.empty_index) as isize;
            let score = before - after;

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((tile_index, score));
            }
        }

        best.map(|(tile_index, _)| tile_index)
    }
}

/// Inversions over non-empty tiles.
pub fn count_inversions(board: &[u8]) -> usize {
    let empty = (board.len().saturating_sub(1)) as u8;
    let tiles: Vec<u8> = board.iter().copied().filter(|&v| v != empty).collect();

    let mut inversions = 0;
    for i in 0..tiles.len() {
        for j in (i + 1)..tiles.len() {
            if tiles[i] > tiles[j] {
                inversions += 1;
            }
        }
    }
    inversions
}

/// Parity test for whether `board` can reach the solved state.
///
/// Odd width: inversions must be even. Even width: inversions plus the
/// empty cell's row counted from the bottom (1-based) must be odd.
pub fn is_solvable(board: &[u8], size: usize) -> bool {
    let empty = (board.len().saturating_sub(1)) as u8;
    let Some(empty_index) = board.iter().position(|&v| v == empty) else {
        return false;
    };
    let inversions = count_inversions(board);

    if size % 2 == 1 {
        inversions % 2 == 0
    } else {
        let row_from_bottom = size - empty_index / size;
        (inversions + row_from_bottom) % 2 == 1
    }
}

/// Derive the daily board for `difficulty` from `seed`.
///
/// Each attempt reshuffles a fresh identity permutation while the RNG stream
/// keeps advancing. After [`MAX_SHUFFLE_ATTEMPTS`] unsolvable draws the board
/// falls back to the identity with its last two cells swapped.
pub fn create_shuffled_puzzle(difficulty: Difficulty, seed: u32) -> PuzzleState {
    shuffle_with_attempts(&mut SeededRng::new(seed), difficulty, MAX_SHUFFLE_ATTEMPTS)
}

/// Shuffle until solvable, giving up after `max_attempts` draws.
pub fn shuffle_with_attempts(rng: &mut SeededRng, difficulty: Difficulty, max_attempts: u32) -> PuzzleState {
    let size = difficulty.size();
    let cells = difficulty.cell_count();

    for _ in 0..max_attempts {
        let mut board: Vec<u8> = (0..cells as u8).collect();
        rng.shuffle(&mut board);

        if is_solvable(&board, size) {
            return with_empty_located(board, size);
        }
    }

    let mut board: Vec<u8> = (0..cells as u8).collect();
    board.swap(cells - 2, cells - 1);
    with_empty_located(board, size)
}

fn with_empty_located(board: Vec<u8>, size: usize) -> PuzzleState {
    let empty = (board.len() - 1) as u8;
    // Shuffles are permutations, so the empty value is always present.
    let empty_index = board.iter().position(|&v| v == empty).unwrap_or(board.len() - 1);
    PuzzleState { board, empty_index, size }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_permutation(state: &PuzzleState) -> bool {
        let mut sorted = state.board().to_vec();
        sorted.sort_unstable();
        sorted == (0..state.board().len() as u8).collect::<Vec<u8>>()
    }

    #[test]
    fn test_known_shuffles() {
        // Regression values; changing them breaks every client's daily board.
        let easy = create_shuffled_puzzle(Difficulty::Easy, 12345);
        assert_eq!(easy.board(), &[1, 3, 2, 7, 8, 4, 0, 6, 5]);
        assert_eq!(easy.empty_index(), 4);

        let medium = create_shuffled_puzzle(Difficulty::Medium, 12345);
        assert_eq!(
            medium.board(),
            &[2, 11, 6, 13, 3, 14, 5, 12, 9, 4, 1, 10, 8, 7, 15, 0]
        );
        assert_eq!(medium.empty_index(), 14);

        let easy_zero = create_shuffled_puzzle(Difficulty::Easy, 0);
        assert_eq!(easy_zero.board(), &[0, 3, 6, 7, 1, 4, 5, 8, 2]);
    }

    #[test]
    fn test_solved_board_is_solvable_for_all_sizes() {
        for difficulty in Difficulty::ALL {
            let solved = PuzzleState::solved(difficulty);
            assert!(is_solvable(solved.board(), difficulty.size()));
            assert!(solved.is_solved());
        }
    }

    #[test]
    fn test_exhausted_attempts_use_fallback_board() {
        let mut rng = SeededRng::new(12345);
        let state = shuffle_with_attempts(&mut rng, Difficulty::Easy, 0);
        assert_eq!(state.board(), &[0, 1, 2, 3, 4, 5, 6, 8, 7]);
        assert_eq!(state.empty_index(), 7);
        // No draws were made
        assert_eq!(rng.state(), 12345);

        for difficulty in Difficulty::ALL {
            let state = shuffle_with_attempts(&mut SeededRng::new(1), difficulty, 0);
            let cells = difficulty.cell_count();
            assert_eq!(state.empty_index(), cells - 2);
            assert_eq!(state.board()[cells - 1] as usize, cells - 2);
            assert!(is_solvable(state.board(), difficulty.size()));
            // One slide from solved
            assert!(state.make_move(cells - 1).unwrap().is_solved());
        }
    }

    #[test]
    fn test_create_uses_full_attempt_budget() {
        for seed in [0, 42, 12345] {
            let expected = shuffle_with_attempts(&mut SeededRng::new(seed), Difficulty::Medium, MAX_SHUFFLE_ATTEMPTS);
            assert_eq!(create_shuffled_puzzle(Difficulty::Medium, seed), expected);
        }
    }

    #[test]
    fn test_classic_unsolvable_15_puzzle() {
        // 14 and 15 swapped (Sam Loyd): one inversion, blank on bottom row.
        let board: Vec<u8> = vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 13, 15];
        assert_eq!(count_inversions(&board), 1);
        assert!(!is_solvable(&board, 4));
    }

    #[test]
    fn test_inversions_skip_empty() {
        // Empty (8) first would add 8 inversions if it were counted.
        let board: Vec<u8> = vec![8, 0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(count_inversions(&board), 0);
    }

    #[test]
    fn test_adjacency_has_no_wraparound() {
        // 3x3 with empty at index 3 (row 1, col 0)
        let state = PuzzleState::from_board(vec![0, 1, 2, 8, 4, 5, 6, 7, 3]).unwrap();
        assert!(state.is_adjacent(0));
        assert!(state.is_adjacent(4));
        assert!(state.is_adjacent(6));
        assert!(!state.is_adjacent(2)); // previous row's last cell
        assert!(!state.is_adjacent(3)); // the empty cell itself
        assert!(!state.is_adjacent(7)); // diagonal
        assert!(!state.is_adjacent(99)); // off the board
    }

    #[test]
    fn test_make_move_swaps_and_keeps_input() {
        let solved = PuzzleState::solved(Difficulty::Easy);
        let moved = solved.make_move(7).unwrap();

        assert_eq!(moved.board(), &[0, 1, 2, 3, 4, 5, 6, 8, 7]);
        assert_eq!(moved.empty_index(), 7);
        assert_eq!(solved.board(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_invalid_move_signal() {
        let solved = PuzzleState::solved(Difficulty::Medium);
        let before = solved.clone();

        assert_eq!(
            solved.make_move(0),
            Err(MoveError::NotAdjacent { tile_index: 0, empty_index: 15 })
        );
        assert!(solved.make_move(16).is_err());
        assert_eq!(solved, before);
    }

    #[test]
    fn test_solved_only_for_identity() {
        for difficulty in Difficulty::ALL {
            let solved = PuzzleState::solved(difficulty);
            for tile in solved.movable_tiles() {
                assert!(!solved.make_move(tile).unwrap().is_solved());
            }
        }
    }

    #[test]
    fn test_hint_picks_improving_tile() {
        let state = PuzzleState::from_board(vec![0, 1, 2, 3, 4, 5, 6, 8, 7]).unwrap();
        // Up (4) and left (6) would leave home; right (7) goes home.
        assert_eq!(state.suggest_hint(), Some(8));
        assert!(state.make_move(8).unwrap().is_solved());
    }

    #[test]
    fn test_hint_on_solved_board_prefers_first_candidate() {
        // Every neighbour scores -1; ties go to the earliest direction (up).
        let solved = PuzzleState::solved(Difficulty::Easy);
        assert_eq!(solved.suggest_hint(), Some(5));
    }

    #[test]
    fn test_from_board_rejects_bad_boards() {
        assert!(PuzzleState::from_board(vec![0, 1, 2]).is_none());
        assert!(PuzzleState::from_board(vec![0, 0, 2, 3, 4, 5, 6, 7, 8]).is_none());
        assert!(PuzzleState::from_board(vec![0, 1, 2, 3]).is_none()); // 2x2 unsupported
        assert!(PuzzleState::from_board(vec![0, 1, 2, 3, 4, 5, 6, 7, 9]).is_none());
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(PuzzleState::solved(Difficulty::Hard).manhattan_distance(), 0);
        let state = PuzzleState::from_board(vec![0, 1, 2, 3, 4, 5, 6, 8, 7]).unwrap();
        assert_eq!(state.manhattan_distance(), 1);
    }

    fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Easy),
            Just(Difficulty::Medium),
            Just(Difficulty::Hard),
        ]
    }

    proptest! {
        #[test]
        fn prop_shuffle_is_solvable_permutation(seed in any::<u32>(), difficulty in difficulty_strategy()) {
            let state = create_shuffled_puzzle(difficulty, seed);
            prop_assert!(is_permutation(&state));
            prop_assert!(is_solvable(state.board(), state.size()));
            prop_assert_eq!(state.board()[state.empty_index()], state.empty_value());
        }

        #[test]
        fn prop_shuffle_is_deterministic(seed in any::<u32>(), difficulty in difficulty_strategy()) {
            prop_assert_eq!(
                create_shuffled_puzzle(difficulty, seed),
                create_shuffled_puzzle(difficulty, seed)
            );
        }

        #[test]
        fn prop_move_then_inverse_restores(seed in any::<u32>(), difficulty in difficulty_strategy(), pick in 0usize..4) {
            let state = create_shuffled_puzzle(difficulty, seed);
            let movable = state.movable_tiles();
            let tile = movable[pick % movable.len()];
            let old_empty = state.empty_index();

            let moved = state.make_move(tile).unwrap();
            let restored = moved.make_move(old_empty).unwrap();
            prop_assert_eq!(restored, state);
        }

        #[test]
        fn prop_non_adjacent_is_rejected(seed in any::<u32>(), difficulty in difficulty_strategy(), tile in 0usize..30) {
            let state = create_shuffled_puzzle(difficulty, seed);
            prop_assume!(!state.is_adjacent(tile));
            let before = state.clone();
            prop_assert!(state.make_move(tile).is_err());
            prop_assert_eq!(state, before);
        }

        #[test]
        fn prop_moves_preserve_solvability(seed in any::<u32>(), difficulty in difficulty_strategy(), walk in proptest::collection::vec(0usize..4, 0..50)) {
            let mut state = create_shuffled_puzzle(difficulty, seed);
            for pick in walk {
                let movable = state.movable_tiles();
                state = state.make_move(movable[pick % movable.len()]).unwrap();
            }
            prop_assert!(is_solvable(state.board(), state.size()));
        }
    }
}
