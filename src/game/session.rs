//! Play Session
//!
//! Everything one player needs while solving today's board: the current
//! snapshot, move counter and log, hints taken and the running timer. The
//! session is an owned value handed to whatever drives input and rendering;
//! there is no global game state.

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::debug;

use crate::game::daily::DailyState;
use crate::game::difficulty::Difficulty;
use crate::game::puzzle::{create_shuffled_puzzle, MoveError, PuzzleState};
use crate::game::timer::SessionTimer;

/// Final numbers for a solved session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Solve time in whole seconds.
    pub time: u32,
    /// Slides taken.
    pub moves: u32,
}

/// Result of a successful slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideOutcome {
    /// Tile moved; puzzle still open.
    Moved,
    /// This slide solved the puzzle.
    Solved(Completion),
}

/// One player's attempt at the daily board.
#[derive(Debug)]
pub struct PlaySession {
    date: NaiveDate,
    difficulty: Difficulty,
    seed: u32,
    puzzle: PuzzleState,
    moves: u32,
    move_log: Vec<usize>,
    hints_used: u32,
    timer: SessionTimer,
    completion: Option<Completion>,
}

impl PlaySession {
    /// Start on today's board. Must be called inside a tokio runtime.
    ///
    /// Returns the session and a receiver of elapsed seconds for display.
    pub fn start(daily: &DailyState, difficulty: Difficulty) -> (Self, watch::Receiver<u32>) {
        let (timer, elapsed_rx) = SessionTimer::start();
        let session = Self {
            date: daily.date,
            difficulty,
            seed: daily.shuffle_seed,
            puzzle: daily.puzzle(difficulty),
            moves: 0,
            move_log: Vec::new(),
            hints_used: 0,
            timer,
            completion: None,
        };
        debug!(date = %session.date, %difficulty, "Play session started");
        (session, elapsed_rx)
    }

    /// Current board.
    pub fn puzzle(&self) -> &PuzzleState {
        &self.puzzle
    }

    /// Board size.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Puzzle day.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Slides so far.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Tile indices slid, in order.
    pub fn move_log(&self) -> &[usize] {
        &self.move_log
    }

    /// Hints requested so far.
    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// Elapsed whole seconds.
    pub fn elapsed_secs(&self) -> u32 {
        self.timer.elapsed_secs()
    }

    /// Final numbers, once solved.
    pub fn completion(&self) -> Option<Completion> {
        self.completion
    }

    /// Slide a tile. The timer stops on the solving move.
    pub fn slide(&mut self, tile_index: usize) -> Result<SlideOutcome, MoveError> {
        if self.completion.is_some() {
            return Err(MoveError::AlreadySolved);
        }

        self.puzzle = self.puzzle.make_move(tile_index)?;
        self.moves += 1;
        self.move_log.push(tile_index);

        if !self.puzzle.is_solved() {
            return Ok(SlideOutcome::Moved);
        }

        let time = self.timer.stop().as_secs() as u32;
        let completion = Completion { time, moves: self.moves };
        self.completion = Some(completion);
        debug!(time, moves = self.moves, "Puzzle solved");
        Ok(SlideOutcome::Solved(completion))
    }

    /// Suggest a tile to slide; counts toward the hint total.
    pub fn hint(&mut self) -> Option<usize> {
        if self.completion.is_some() {
            return None;
        }
        let hint = self.puzzle.suggest_hint();
        if hint.is_some() {
            self.hints_used += 1;
        }
        hint
    }

    /// Start the same daily board over with a fresh timer.
    pub fn reset(&mut self) -> watch::Receiver<u32> {
        let (timer, elapsed_rx) = SessionTimer::start();
        // Replacing the timer drops (and cancels) the old one
        self.timer = timer;
        self.puzzle = create_shuffled_puzzle(self.difficulty, self.seed);
        self.moves = 0;
        self.move_log.clear();
        self.hints_used = 0;
        self.completion = None;
        elapsed_rx
    }
}
