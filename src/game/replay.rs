//! Solution Replay
//!
//! Re-derives the daily board from its seed and replays a submitted move log.
//! A score that arrives with a log is only accepted if the log actually
//! solves the board everyone else got.

use thiserror::Error;

use crate::game::difficulty::Difficulty;
use crate::game::puzzle::{create_shuffled_puzzle, MoveError, PuzzleState};

/// Longest log accepted (guards against oversized submissions).
pub const MAX_REPLAY_MOVES: usize = 100_000;

/// Why a move log was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// No moves submitted.
    #[error("move log is empty")]
    EmptyLog,
    /// Log longer than [`MAX_REPLAY_MOVES`].
    #[error("move log too long ({0} moves)")]
    TooLong(usize),
    /// A step was not a legal slide.
    #[error("illegal move at step {step}: {source}")]
    IllegalMove {
        /// 0-based position in the log.
        step: usize,
        /// Underlying move rejection.
        #[source]
        source: MoveError,
    },
    /// All moves were legal but the board is not solved.
    #[error("move log does not solve the puzzle")]
    NotSolved,
    /// Claimed move count differs from the log.
    #[error("claimed {claimed} moves but log has {actual}")]
    MoveCountMismatch {
        /// Moves claimed in the submission.
        claimed: u32,
        /// Length of the log.
        actual: usize,
    },
}

/// Replay `moves` from an arbitrary starting board.
///
/// Returns the final state; does not require it to be solved.
pub fn replay_moves(start: &PuzzleState, moves: &[usize]) -> Result<PuzzleState, ReplayError> {
    let mut state = start.clone();
    for (step, &tile_index) in moves.iter().enumerate() {
        state = state
            .make_move(tile_index)
            .map_err(|source| ReplayError::IllegalMove { step, source })?;
    }
    Ok(state)
}

/// Verify that `moves` solves the daily board for `(difficulty, seed)`.
pub fn verify_solution(
    difficulty: Difficulty,
    seed: u32,
    moves: &[usize],
) -> Result<PuzzleState, ReplayError> {
    if moves.is_empty() {
        return Err(ReplayError::EmptyLog);
    }
    if moves.len() > MAX_REPLAY_MOVES {
        return Err(ReplayError::TooLong(moves.len()));
    }

    let start = create_shuffled_puzzle(difficulty, seed);
    let end = replay_moves(&start, moves)?;

    if !end.is_solved() {
        return Err(ReplayError::NotSolved);
    }
    Ok(end)
}

/// Verify a submission's log and its claimed move count together.
pub fn verify_claim(
    difficulty: Difficulty,
    seed: u32,
    claimed_moves: u32,
    moves: &[usize],
) -> Result<(), ReplayError> {
    if claimed_moves as usize != moves.len() {
        return Err(ReplayError::MoveCountMismatch {
            claimed: claimed_moves,
            actual: moves.len(),
        });
    }
    verify_solution(difficulty, seed, moves).map(|_| ())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};

    /// Shortest solution by BFS over 3x3 states (at most 9!/2 reachable).
    pub(crate) fn solve_easy(start: &PuzzleState) -> Vec<usize> {
        let mut parents: HashMap<Vec<u8>, (Vec<u8>, usize)> = HashMap::new();
        let mut queue = VecDeque::new();
        parents.insert(start.board().to_vec(), (Vec::new(), usize::MAX));
        queue.push_back(start.clone());

        while let Some(state) = queue.pop_front() {
            if state.is_solved() {
                let mut path = Vec::new();
                let mut key = state.board().to_vec();
                while let Some((parent, tile)) = parents.get(&key) {
                    if *tile == usize::MAX {
                        break;
                    }
                    path.push(*tile);
                    key = parent.clone();
                }
                path.reverse();
                return path;
            }
            for tile in state.movable_tiles() {
                let next = state.make_move(tile).unwrap();
                if !parents.contains_key(next.board()) {
                    parents.insert(next.board().to_vec(), (state.board().to_vec(), tile));
                    queue.push_back(next);
                }
            }
        }
        panic!("unsolvable board: {:?}", start.board());
    }

    #[test]
    fn test_real_solution_verifies() {
        let seed = 12345;
        let start = create_shuffled_puzzle(Difficulty::Easy, seed);
        let moves = solve_easy(&start);

        assert!(!moves.is_empty());
        let end = verify_solution(Difficulty::Easy, seed, &moves).unwrap();
        assert!(end.is_solved());
        assert!(verify_claim(Difficulty::Easy, seed, moves.len() as u32, &moves).is_ok());
    }

    #[test]
    fn test_solution_for_other_seed_rejected() {
        let start = create_shuffled_puzzle(Difficulty::Easy, 12345);
        let moves = solve_easy(&start);

        let result = verify_solution(Difficulty::Easy, 54321, &moves);
        assert!(matches!(
            result,
            Err(ReplayError::NotSolved) | Err(ReplayError::IllegalMove { .. })
        ));
    }

    #[test]
    fn test_truncated_log_not_solved() {
        let start = create_shuffled_puzzle(Difficulty::Easy, 12345);
        let mut moves = solve_easy(&start);
        moves.pop();

        assert_eq!(
            verify_solution(Difficulty::Easy, 12345, &moves),
            Err(ReplayError::NotSolved)
        );
    }

    #[test]
    fn test_illegal_step_reported() {
        let start = create_shuffled_puzzle(Difficulty::Easy, 12345);
        let far = (0..9).find(|&i| !start.is_adjacent(i)).unwrap();

        match verify_solution(Difficulty::Easy, 12345, &[far]) {
            Err(ReplayError::IllegalMove { step, .. }) => assert_eq!(step, 0),
            other => panic!("expected illegal move, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_log_rejected() {
        assert_eq!(
            verify_solution(Difficulty::Hard, 1, &[]),
            Err(ReplayError::EmptyLog)
        );
    }

    #[test]
    fn test_move_count_mismatch() {
        let start = create_shuffled_puzzle(Difficulty::Easy, 12345);
        let moves = solve_easy(&start);

        assert_eq!(
            verify_claim(Difficulty::Easy, 12345, moves.len() as u32 - 1, &moves),
            Err(ReplayError::MoveCountMismatch {
                claimed: moves.len() as u32 - 1,
                actual: moves.len(),
            })
        );
    }

    #[test]
    fn test_random_walk_undone_by_replay() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        for difficulty in Difficulty::ALL {
            let mut state = PuzzleState::solved(difficulty);
            let mut undo = Vec::new();
            for _ in 0..200 {
                let movable = state.movable_tiles();
                let tile = movable[rng.gen_range(0..movable.len())];
                undo.push(state.empty_index());
                state = state.make_move(tile).unwrap();
            }
            undo.reverse();

            let end = replay_moves(&state, &undo).unwrap();
            assert!(end.is_solved());
        }
    }

    #[test]
    fn test_replay_moves_from_solved() {
        let solved = PuzzleState::solved(Difficulty::Medium);
        let end = replay_moves(&solved, &[14, 15]).unwrap();
        assert_eq!(end, solved);
    }
}
